pub mod dto;
pub mod payment_service;

pub use dto::{
    ErrorBody, OutcomeApplication, OutcomeReport, OutcomeStatus, PaymentOutcome,
    ProcessPaymentRequest, ProcessPaymentResponse, WebhookAck,
};
pub use payment_service::PaymentService;
