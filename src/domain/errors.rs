use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 配置错误（凭证缺失，构造期致命，不重试）
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 参数无效
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 订单未找到（含归属校验失败，避免泄露订单存在性）
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    /// Webhook签名校验失败
    #[error("Webhook signature verification failed")]
    SignatureInvalid,

    /// 支付渠道调用失败
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderFailure),

    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 领域结果类型
pub type DomainResult<T> = Result<T, DomainError>;

/// 渠道调用失败。以值的形式跨越渠道端口边界，调用方据此渲染用户可见错误；
/// 传输、解析、渠道拒绝一律收敛到这里，端口方法不panic。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// 请求参数不被渠道接受
    #[error("invalid payment request: {0}")]
    InvalidRequest(String),

    /// 渠道业务层拒绝（应答码非"00"）
    #[error("payment rejected by provider: {desc} (code {code})")]
    Rejected { code: String, desc: String },

    /// 渠道返回非2xx
    #[error("provider returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 网络失败或超时
    #[error("transport error: {0}")]
    Transport(String),

    /// 应答无法解析
    #[error("malformed provider response: {0}")]
    Malformed(String),
}
