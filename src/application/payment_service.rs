use crate::application::dto::{
    OutcomeApplication, OutcomeReport, OutcomeStatus, PaymentOutcome, ProcessPaymentRequest,
    ProcessPaymentResponse, WebhookAck,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{OrderStatus, PaymentMethod};
use crate::domain::Order;
use crate::ports::{CartPort, OrderRepositoryPort, PayOsPort};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 支付服务：订单与渠道支付状态之间的对账中枢。
///
/// 回跳与Webhook可能乱序、重复或并发到达；所有状态流转都经由仓储的
/// 条件更新裁决，赢家执行副作用，输家就地短路。
pub struct PaymentService<P: PayOsPort, O: OrderRepositoryPort, C: CartPort> {
    provider: Arc<P>,
    orders: Arc<O>,
    carts: Arc<C>,
}

impl<P: PayOsPort, O: OrderRepositoryPort, C: CartPort> PaymentService<P, O, C> {
    pub fn new(provider: Arc<P>, orders: Arc<O>, carts: Arc<C>) -> Self {
        Self {
            provider,
            orders,
            carts,
        }
    }

    /// 发起支付。归属校验失败视同订单不存在，不向调用方泄露订单存在性。
    pub async fn process_payment(
        &self,
        user_id: i64,
        request: ProcessPaymentRequest,
    ) -> DomainResult<ProcessPaymentResponse> {
        let order_id = request
            .order_id
            .ok_or_else(|| DomainError::InvalidArgument("Missing order ID".to_string()))?;

        let order = self
            .orders
            .find_for_user(order_id, user_id)
            .await?
            .ok_or(DomainError::OrderNotFound(order_id))?;

        match request.payment_method.as_deref().unwrap_or("payos") {
            "payos" => self.start_hosted_checkout(order).await,
            "cod" => self.confirm_cash_on_delivery(order).await,
            other => Err(DomainError::InvalidArgument(format!(
                "Invalid payment method: {}",
                other
            ))),
        }
    }

    /// 渠道支付：创建托管收银台会话，客户端跳转到渠道页面完成支付。
    /// 渠道调用成功前订单不发生任何变更，失败或超时都不留下半截状态。
    async fn start_hosted_checkout(&self, order: Order) -> DomainResult<ProcessPaymentResponse> {
        order.ensure_chargeable()?;
        if !order.awaiting_payment() {
            return Err(DomainError::InvalidArgument(format!(
                "Order {} can no longer be paid (status {})",
                order.id, order.status
            )));
        }

        info!(
            "Creating PayOS payment for order {} with amount {}",
            order.id, order.total
        );

        let description = format!("Order #{}", order.id);
        let session = self
            .provider
            .create_payment(order.id, order.total.to_minor_units(), &description)
            .await
            .map_err(|failure| {
                error!("PayOS payment creation failed: {}", failure);
                DomainError::Provider(failure)
            })?;

        self.orders
            .set_payment_method(order.id, PaymentMethod::PayOs)
            .await?;

        Ok(ProcessPaymentResponse {
            success: true,
            redirect_url: Some(session.payment_url),
            requires_redirect: true,
            message: None,
        })
    }

    /// 货到付款：订单直接进入处理中并立即清空购物车（订单已承诺履约）。
    async fn confirm_cash_on_delivery(&self, order: Order) -> DomainResult<ProcessPaymentResponse> {
        let moved = self
            .orders
            .transition(
                order.id,
                &[OrderStatus::Created],
                OrderStatus::Processing,
                None,
                Some(PaymentMethod::Cod),
            )
            .await?;

        if moved {
            let removed = self.carts.clear_for_user(order.user_id).await?;
            info!(
                "Order {} confirmed for cash on delivery, cart cleared ({} items)",
                order.id, removed
            );
        } else {
            debug!(
                "Order {} already left the created state, COD confirmation skipped",
                order.id
            );
        }

        Ok(ProcessPaymentResponse {
            success: true,
            redirect_url: Some(format!("/orders/{}", order.id)),
            requires_redirect: false,
            message: Some("Your order has been placed successfully!".to_string()),
        })
    }

    /// 将渠道上报的支付结果对账到订单状态。回跳与Webhook共用；
    /// 先到者完成流转，后到者检测到已生效状态后短路。
    pub async fn apply_outcome(&self, outcome: &PaymentOutcome) -> DomainResult<OutcomeReport> {
        let order = self
            .orders
            .find_by_id(outcome.order_code)
            .await?
            .ok_or(DomainError::OrderNotFound(outcome.order_code))?;

        let application = match &outcome.status {
            OutcomeStatus::Success => {
                self.settle_success(&order, outcome.transaction_id.as_deref())
                    .await?
            }
            OutcomeStatus::Failed | OutcomeStatus::Cancelled => {
                self.settle_failure(&order, outcome).await?
            }
            OutcomeStatus::Unknown(raw) => {
                debug!(
                    "Unhandled payment status '{}' for order {}, state untouched",
                    raw, order.id
                );
                OutcomeApplication::Ignored
            }
        };

        let refreshed = self.orders.find_by_id(order.id).await?.unwrap_or(order);
        Ok(OutcomeReport {
            order: refreshed,
            application,
            outcome: outcome.status.clone(),
        })
    }

    async fn settle_success(
        &self,
        order: &Order,
        transaction_id: Option<&str>,
    ) -> DomainResult<OutcomeApplication> {
        let moved = self
            .orders
            .transition(
                order.id,
                &[OrderStatus::Created, OrderStatus::Processing],
                OrderStatus::Paid,
                transaction_id,
                None,
            )
            .await?;

        if moved {
            let removed = self.carts.clear_for_user(order.user_id).await?;
            info!(
                "Payment confirmed for order {}, cart cleared ({} items)",
                order.id, removed
            );
            return Ok(OutcomeApplication::Applied);
        }

        // 条件更新未命中：区分重复投递与已取消
        match self.orders.find_by_id(order.id).await? {
            Some(current) if current.is_paid() => {
                debug!(
                    "Order {} already paid, duplicate success notification acknowledged",
                    order.id
                );
                Ok(OutcomeApplication::AlreadySettled)
            }
            _ => {
                warn!(
                    "Success notification for order {} conflicts with its terminal state, ignored",
                    order.id
                );
                Ok(OutcomeApplication::Ignored)
            }
        }
    }

    async fn settle_failure(
        &self,
        order: &Order,
        outcome: &PaymentOutcome,
    ) -> DomainResult<OutcomeApplication> {
        warn!(
            "Payment failed for order {}, status: {}, error: {:?}",
            order.id, outcome.status, outcome.error_code
        );

        let moved = self
            .orders
            .transition(
                order.id,
                &[OrderStatus::Created, OrderStatus::Processing],
                OrderStatus::Cancelled,
                None,
                None,
            )
            .await?;

        if moved {
            return Ok(OutcomeApplication::Applied);
        }

        match self.orders.find_by_id(order.id).await? {
            Some(current) if current.status == OrderStatus::Cancelled => {
                Ok(OutcomeApplication::AlreadySettled)
            }
            _ => Ok(OutcomeApplication::Ignored),
        }
    }

    /// 处理渠道Webhook：验签、取字段、对账。服务端到服务端的调用没有
    /// 用户会话，信任完全来自签名。
    pub async fn handle_webhook(&self, payload: Value) -> DomainResult<WebhookAck> {
        if !self.provider.verify_webhook(&payload) {
            warn!("Invalid webhook signature");
            return Err(DomainError::SignatureInvalid);
        }

        let order_code = payload
            .get("orderCode")
            .and_then(order_code_value)
            .ok_or_else(|| DomainError::InvalidArgument("Missing required fields".to_string()))?;
        let status = payload
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::InvalidArgument("Missing required fields".to_string()))?;

        let outcome = PaymentOutcome {
            order_code,
            status: OutcomeStatus::parse(status),
            transaction_id: payload
                .get("transactionId")
                .and_then(Value::as_str)
                .map(String::from),
            error_code: payload
                .get("errorCode")
                .and_then(Value::as_str)
                .map(String::from),
        };

        self.apply_outcome(&outcome).await?;

        info!("Webhook processed for order {} with status {}", order_code, status);
        Ok(WebhookAck {
            success: true,
            message: "Webhook processed successfully".to_string(),
        })
    }
}

/// orderCode在线上同时出现过数字和数字字符串两种形态，都接受
fn order_code_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}
