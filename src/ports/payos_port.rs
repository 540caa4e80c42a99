use crate::domain::errors::ProviderFailure;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 托管收银台会话（渠道下单成功后返回）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// 收银台页面地址，客户端跳转到这里完成支付
    pub payment_url: String,

    /// 渠道支付单ID
    pub payment_id: String,

    /// 二维码内容（可选）
    pub qr_code: Option<String>,
}

/// 渠道侧支付单状态（轮询接口返回）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePaymentStatus {
    /// 渠道上报的状态字符串
    pub status: String,

    /// 渠道原始应答
    pub raw: serde_json::Value,
}

/// PayOS渠道端口接口。所有方法保证不panic：传输、解析、渠道拒绝
/// 一律以ProviderFailure值返回。
#[async_trait]
pub trait PayOsPort: Send + Sync {
    /// 创建托管收银台支付会话
    async fn create_payment(
        &self,
        order_code: i64,
        amount: i64,
        description: &str,
    ) -> Result<CheckoutSession, ProviderFailure>;

    /// 查询渠道侧支付状态
    async fn verify_payment(&self, payment_id: &str)
        -> Result<RemotePaymentStatus, ProviderFailure>;

    /// 校验Webhook签名；任何畸形输入返回false
    fn verify_webhook(&self, payload: &serde_json::Value) -> bool;
}
