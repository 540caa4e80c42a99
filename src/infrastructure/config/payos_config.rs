use crate::domain::errors::{DomainError, DomainResult};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// 缺省渠道地址
const DEFAULT_API_URL: &str = "https://api-merchant.payos.vn";

/// 缺省站点地址（回跳URL由它导出，生产环境必须覆盖）
const DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:3000";

/// 缺省渠道请求超时（秒）
const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

/// PayOS渠道配置。启动时装配一次、随后按引用传递，不在调用点临时读环境变量。
#[derive(Clone)]
pub struct PayOsConfig {
    /// API Key
    pub api_key: String,

    /// 商户Client ID
    pub client_id: String,

    /// 签名密钥（checksum key）
    pub checksum_key: String,

    /// 渠道API基础URL
    pub base_url: String,

    /// 支付完成后的浏览器回跳地址
    pub return_url: String,

    /// 支付取消后的浏览器回跳地址
    pub cancel_url: String,

    /// 渠道请求超时
    pub request_timeout: Duration,
}

impl PayOsConfig {
    /// 从环境变量装配配置。必填凭证缺失时报错并指明缺少项。
    ///
    /// 读取：PAYOS_API_KEY、PAYOS_CLIENT_ID、PAYOS_SECRET_KEY（必填），
    /// PAYOS_API_URL、PUBLIC_BASE_URL、PAYOS_RETURN_URL、PAYOS_CANCEL_URL、
    /// PAYOS_TIMEOUT_SECONDS（可选）。
    pub fn from_env() -> DomainResult<Arc<Self>> {
        let api_key = require_env("PAYOS_API_KEY")?;
        let client_id = require_env("PAYOS_CLIENT_ID")?;
        let checksum_key = require_env("PAYOS_SECRET_KEY")?;

        let base_url = env_or("PAYOS_API_URL", DEFAULT_API_URL);
        let public_base_url = env_or("PUBLIC_BASE_URL", DEFAULT_PUBLIC_BASE_URL);
        let result_url = format!(
            "{}/payment/payment-result",
            public_base_url.trim_end_matches('/')
        );

        let return_url = env_or("PAYOS_RETURN_URL", &result_url);
        let cancel_url = env_or("PAYOS_CANCEL_URL", &result_url);

        let timeout_seconds = std::env::var("PAYOS_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        Ok(Arc::new(Self {
            api_key,
            client_id,
            checksum_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            return_url,
            cancel_url,
            request_timeout: Duration::from_secs(timeout_seconds),
        }))
    }

    /// 校验凭证完备性；适配器构造时调用，缺失项按名报错
    pub fn validate(&self) -> DomainResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(missing("PAYOS_API_KEY"));
        }
        if self.client_id.trim().is_empty() {
            return Err(missing("PAYOS_CLIENT_ID"));
        }
        if self.checksum_key.trim().is_empty() {
            return Err(missing("PAYOS_SECRET_KEY"));
        }
        if self.base_url.trim().is_empty() {
            return Err(DomainError::Configuration(
                "PayOS base URL must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// 凭证绝不进入日志，Debug输出一律打码
impl fmt::Debug for PayOsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayOsConfig")
            .field("api_key", &"***")
            .field("client_id", &"***")
            .field("checksum_key", &"***")
            .field("base_url", &self.base_url)
            .field("return_url", &self.return_url)
            .field("cancel_url", &self.cancel_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn require_env(key: &str) -> DomainResult<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(missing(key)),
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

fn missing(key: &str) -> DomainError {
    DomainError::Configuration(format!(
        "Missing {}. Please set it in your environment or .env file.",
        key
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PayOsConfig {
        PayOsConfig {
            api_key: "key".to_string(),
            client_id: "client".to_string(),
            checksum_key: "secret".to_string(),
            base_url: DEFAULT_API_URL.to_string(),
            return_url: "http://127.0.0.1:3000/payment/payment-result".to_string(),
            cancel_url: "http://127.0.0.1:3000/payment/payment-result".to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_names_missing_credential() {
        let mut incomplete = config();
        incomplete.client_id = String::new();

        let err = incomplete.validate().unwrap_err();
        assert!(err.to_string().contains("PAYOS_CLIENT_ID"));
    }

    #[test]
    fn test_debug_masks_credentials() {
        let mut sensitive = config();
        sensitive.api_key = "live-api-key-1234".to_string();
        sensitive.client_id = "client-5678".to_string();
        sensitive.checksum_key = "checksum-abcd".to_string();

        let rendered = format!("{:?}", sensitive);
        assert!(!rendered.contains("live-api-key-1234"), "api key leaked: {}", rendered);
        assert!(!rendered.contains("client-5678"), "client id leaked: {}", rendered);
        assert!(!rendered.contains("checksum-abcd"), "checksum key leaked: {}", rendered);
        assert!(rendered.contains("api-merchant.payos.vn"));
    }
}
