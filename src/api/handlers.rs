use crate::api::extract::CurrentUser;
use crate::application::{
    ErrorBody, OutcomeReport, OutcomeStatus, PaymentOutcome, PaymentService,
    ProcessPaymentRequest, ProcessPaymentResponse, WebhookAck,
};
use crate::domain::errors::{DomainError, ProviderFailure};
use crate::ports::{CartPort, OrderRepositoryPort, PayOsPort};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 应用状态
pub struct AppState<P: PayOsPort, O: OrderRepositoryPort, C: CartPort> {
    pub payment_service: Arc<PaymentService<P, O, C>>,
}

impl<P: PayOsPort, O: OrderRepositoryPort, C: CartPort> Clone for AppState<P, O, C> {
    fn clone(&self) -> Self {
        Self {
            payment_service: self.payment_service.clone(),
        }
    }
}

/// 发起支付
pub async fn process_payment<P, O, C>(
    State(state): State<AppState<P, O, C>>,
    user: CurrentUser,
    Json(request): Json<ProcessPaymentRequest>,
) -> Result<Json<ProcessPaymentResponse>, (StatusCode, Json<ErrorBody>)>
where
    P: PayOsPort + 'static,
    O: OrderRepositoryPort + 'static,
    C: CartPort + 'static,
{
    state
        .payment_service
        .process_payment(user.id, request)
        .await
        .map(Json)
        .map_err(|err| {
            let status = error_status(&err);
            let message = client_message(
                &err,
                status,
                "An error occurred while processing your payment",
            );
            (status, Json(ErrorBody::new(message)))
        })
}

/// 渠道回跳参数
#[derive(Debug, Deserialize)]
pub struct PaymentResultParams {
    pub status: Option<String>,
    #[serde(rename = "orderCode")]
    pub order_code: Option<String>,
    #[serde(rename = "errorCode")]
    pub error_code: Option<String>,
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
}

/// 渠道收银台回跳落地页。无论订单是否存在都渲染结果页，
/// 不向未认证调用方泄露订单存在性；归属人会话则改为站内跳转。
pub async fn payment_result<P, O, C>(
    State(state): State<AppState<P, O, C>>,
    user: Option<CurrentUser>,
    Query(params): Query<PaymentResultParams>,
) -> Response
where
    P: PayOsPort + 'static,
    O: OrderRepositoryPort + 'static,
    C: CartPort + 'static,
{
    let status_raw = params.status.as_deref().unwrap_or("unknown");
    info!(
        "Payment result received: status={}, order_id={:?}",
        status_raw, params.order_code
    );

    let order_code = params
        .order_code
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok());

    if let Some(order_code) = order_code {
        let outcome = PaymentOutcome {
            order_code,
            status: OutcomeStatus::parse(status_raw),
            transaction_id: params.transaction_id.clone(),
            error_code: params.error_code.clone(),
        };

        match state.payment_service.apply_outcome(&outcome).await {
            Ok(report) => {
                if let Some(user) = user {
                    if user.id == report.order.user_id {
                        return owner_redirect(&report).into_response();
                    }
                }
            }
            Err(err) => {
                // 回跳只是尽力而为的信号（Webhook才是权威通道）；
                // 失败只记录，结果页照常渲染
                warn!("Error processing payment result: {}", err);
            }
        }
    }

    render_result_page(
        status_raw,
        params.transaction_id.as_deref(),
        params.error_code.as_deref(),
    )
    .into_response()
}

fn owner_redirect(report: &OutcomeReport) -> Redirect {
    // 具体的flash文案由外部UX层根据payment参数渲染
    match report.outcome {
        OutcomeStatus::Success => {
            Redirect::to(&format!("/orders/{}?payment=success", report.order.id))
        }
        OutcomeStatus::Cancelled => Redirect::to("/cart/checkout?payment=cancelled"),
        _ => Redirect::to("/cart/checkout?payment=failed"),
    }
}

fn render_result_page(
    status: &str,
    transaction_id: Option<&str>,
    error_code: Option<&str>,
) -> Html<String> {
    let mut body = String::from(
        "<!DOCTYPE html><html><head><title>Payment result</title></head><body>",
    );
    body.push_str(&format!("<h1>Payment {}</h1>", escape_html(status)));
    if let Some(transaction_id) = transaction_id {
        body.push_str(&format!(
            "<p>Transaction: {}</p>",
            escape_html(transaction_id)
        ));
    }
    if let Some(error_code) = error_code {
        body.push_str(&format!("<p>Error code: {}</p>", escape_html(error_code)));
    }
    body.push_str(r#"<p><a href="/">Back to shop</a></p></body></html>"#);
    Html(body)
}

// 回跳参数不可信，进页面前转义
fn escape_html(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// PayOS Webhook通知。与会话完全无关，信任仅来自签名。
pub async fn payos_webhook<P, O, C>(
    State(state): State<AppState<P, O, C>>,
    body: String,
) -> Result<Json<WebhookAck>, (StatusCode, Json<WebhookAck>)>
where
    P: PayOsPort + 'static,
    O: OrderRepositoryPort + 'static,
    C: CartPort + 'static,
{
    if body.trim().is_empty() {
        return Err(webhook_error(StatusCode::BAD_REQUEST, "No data received"));
    }

    let payload: Value = serde_json::from_str(&body)
        .map_err(|_| webhook_error(StatusCode::BAD_REQUEST, "Invalid JSON payload"))?;

    state
        .payment_service
        .handle_webhook(payload)
        .await
        .map(Json)
        .map_err(|err| {
            let status = error_status(&err);
            let message = client_message(&err, status, "Error processing webhook");
            webhook_error(status, &message)
        })
}

fn webhook_error(status: StatusCode, message: &str) -> (StatusCode, Json<WebhookAck>) {
    (
        status,
        Json(WebhookAck {
            success: false,
            message: message.to_string(),
        }),
    )
}

/// 健康检查
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// 错误种类到HTTP状态码的唯一映射（穷举，不留catch-all分支）
fn error_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::InvalidArgument(_)
        | DomainError::SignatureInvalid
        | DomainError::Provider(_) => StatusCode::BAD_REQUEST,
        DomainError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Configuration(_)
        | DomainError::Database(_)
        | DomainError::Serialization(_)
        | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 客户端可见的错误描述。5xx一律用调用方提供的笼统文案，
/// 内部细节只进服务端日志。
fn client_message(err: &DomainError, status: StatusCode, generic: &str) -> String {
    if status.is_server_error() {
        error!("Request failed: {}", err);
        return generic.to_string();
    }

    match err {
        DomainError::InvalidArgument(message) => message.clone(),
        DomainError::OrderNotFound(_) => "Order not found".to_string(),
        DomainError::SignatureInvalid => "Invalid signature".to_string(),
        DomainError::Provider(failure) => provider_message(failure),
        _ => generic.to_string(),
    }
}

/// 渠道失败里只有业务拒绝原因适合透出；传输层细节留在日志
fn provider_message(failure: &ProviderFailure) -> String {
    match failure {
        ProviderFailure::Rejected { desc, .. } => desc.clone(),
        ProviderFailure::InvalidRequest(message) => message.clone(),
        ProviderFailure::Http { .. }
        | ProviderFailure::Transport(_)
        | ProviderFailure::Malformed(_) => "Payment initialization failed".to_string(),
    }
}
