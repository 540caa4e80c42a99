use super::handlers::*;
use crate::ports::{CartPort, OrderRepositoryPort, PayOsPort};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router<P, O, C>(state: AppState<P, O, C>) -> Router
where
    P: PayOsPort + 'static,
    O: OrderRepositoryPort + 'static,
    C: CartPort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/payment/process", post(process_payment))
        .route("/payment/payment-result", get(payment_result))
        .route("/payment/webhook", post(payos_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
