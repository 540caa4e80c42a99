use crate::domain::errors::{DomainError, DomainResult, ProviderFailure};
use crate::infrastructure::config::PayOsConfig;
use crate::infrastructure::signature;
use crate::ports::payos_port::{CheckoutSession, PayOsPort, RemotePaymentStatus};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 渠道业务层成功应答码
const PROVIDER_SUCCESS_CODE: &str = "00";

/// PayOS渠道适配器实现。每次调用无状态；HTTP客户端带超时、构造一次复用。
#[derive(Clone)]
pub struct PayOsAdapter {
    config: Arc<PayOsConfig>,
    client: Client,
}

impl std::fmt::Debug for PayOsAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayOsAdapter").finish_non_exhaustive()
    }
}

impl PayOsAdapter {
    /// 构造适配器。凭证缺失按名报配置错误；凭证内容不进日志。
    pub fn new(config: Arc<PayOsConfig>) -> DomainResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                DomainError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        info!("PayOS client initialized for {}", config.base_url);
        Ok(Self { config, client })
    }

    fn decode_body(status: reqwest::StatusCode, body: &str) -> Result<Value, ProviderFailure> {
        if !status.is_success() {
            // 非2xx时尽量取渠道的message字段，取不到就原样截断
            let message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|value| {
                    value
                        .get("message")
                        .or_else(|| value.get("desc"))
                        .and_then(Value::as_str)
                        .map(String::from)
                })
                .unwrap_or_else(|| truncated(body));

            return Err(ProviderFailure::Http {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(body)
            .map_err(|e| ProviderFailure::Malformed(format!("invalid JSON: {}", e)))
    }
}

#[async_trait]
impl PayOsPort for PayOsAdapter {
    /// 创建托管收银台支付会话
    async fn create_payment(
        &self,
        order_code: i64,
        amount: i64,
        description: &str,
    ) -> Result<CheckoutSession, ProviderFailure> {
        if order_code <= 0 {
            return Err(ProviderFailure::InvalidRequest(format!(
                "orderCode must be a positive integer, got {}",
                order_code
            )));
        }
        if amount <= 0 {
            return Err(ProviderFailure::InvalidRequest(format!(
                "amount must be a positive integer, got {}",
                amount
            )));
        }

        let signature = signature::payment_request_signature(
            &self.config.checksum_key,
            amount,
            &self.config.cancel_url,
            description,
            order_code,
            &self.config.return_url,
        )
        .map_err(|e| ProviderFailure::InvalidRequest(e.to_string()))?;

        let body = json!({
            "orderCode": order_code,
            "amount": amount,
            "description": description,
            "returnUrl": self.config.return_url,
            "cancelUrl": self.config.cancel_url,
            "items": [
                {
                    "name": description,
                    "price": amount,
                    "quantity": 1
                }
            ]
        });

        debug!("Creating PayOS payment request for orderCode {}", order_code);

        let url = format!("{}/v2/payment-requests", self.config.base_url);
        let response = match self
            .client
            .post(&url)
            .header("x-client-id", &self.config.client_id)
            .header("x-api-key", &self.config.api_key)
            .header("x-signature", signature)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("PayOS payment request timed out for orderCode {}", order_code);
                return Err(ProviderFailure::Transport(format!("request timed out: {}", e)));
            }
            Err(e) => {
                error!("PayOS payment request failed: {}", e);
                return Err(ProviderFailure::Transport(e.to_string()));
            }
        };

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderFailure::Transport(e.to_string()))?;
        debug!("PayOS response code: {}", status);

        let payload = Self::decode_body(status, &text)?;

        let code = payload["code"].as_str().unwrap_or_default();
        if code != PROVIDER_SUCCESS_CODE {
            let desc = payload["desc"]
                .as_str()
                .unwrap_or("Payment initialization failed")
                .to_string();
            return Err(ProviderFailure::Rejected {
                code: code.to_string(),
                desc,
            });
        }

        let data = &payload["data"];
        let payment_url = data["checkoutUrl"]
            .as_str()
            .ok_or_else(|| ProviderFailure::Malformed("missing data.checkoutUrl".to_string()))?
            .to_string();
        let payment_id = data["paymentLinkId"]
            .as_str()
            .ok_or_else(|| ProviderFailure::Malformed("missing data.paymentLinkId".to_string()))?
            .to_string();
        let qr_code = data["qrCode"].as_str().map(String::from);

        info!("PayOS payment created for orderCode {}", order_code);
        Ok(CheckoutSession {
            payment_url,
            payment_id,
            qr_code,
        })
    }

    /// 查询渠道侧支付状态
    async fn verify_payment(
        &self,
        payment_id: &str,
    ) -> Result<RemotePaymentStatus, ProviderFailure> {
        let url = format!("{}/v2/payment-requests/{}", self.config.base_url, payment_id);

        let response = self
            .client
            .get(&url)
            .header("x-client-id", &self.config.client_id)
            .header("x-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderFailure::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderFailure::Transport(e.to_string()))?;

        let payload = Self::decode_body(status, &text)?;

        let remote_status = payload["status"]
            .as_str()
            .or_else(|| payload["data"]["status"].as_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        Ok(RemotePaymentStatus {
            status: remote_status,
            raw: payload,
        })
    }

    /// 校验Webhook签名
    fn verify_webhook(&self, payload: &Value) -> bool {
        let Some(claimed) = payload.get("signature").and_then(Value::as_str) else {
            warn!("Webhook payload carries no signature field");
            return false;
        };

        signature::verify(&self.config.checksum_key, payload, claimed)
    }
}

fn truncated(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    }
}
