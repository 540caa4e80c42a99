use crate::domain::Order;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 发起支付请求
#[derive(Debug, Deserialize)]
pub struct ProcessPaymentRequest {
    /// 订单ID
    pub order_id: Option<i64>,

    /// 支付方式（缺省为payos）
    pub payment_method: Option<String>,
}

/// 发起支付响应
#[derive(Debug, Serialize)]
pub struct ProcessPaymentResponse {
    pub success: bool,

    /// 客户端下一步跳转地址
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,

    /// 是否需要跳出到渠道收银台
    pub requires_redirect: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 渠道上报的支付状态（来自回跳query或Webhook body，均不可信）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Failed,
    Cancelled,
    /// 无法识别的状态原文，只记录不流转
    Unknown(String),
}

impl OutcomeStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "success" => OutcomeStatus::Success,
            "failed" => OutcomeStatus::Failed,
            "cancel" => OutcomeStatus::Cancelled,
            other => OutcomeStatus::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "success"),
            OutcomeStatus::Failed => write!(f, "failed"),
            OutcomeStatus::Cancelled => write!(f, "cancel"),
            OutcomeStatus::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// 一次渠道支付结果通知（回跳与Webhook共用的内部表示）
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub order_code: i64,
    pub status: OutcomeStatus,
    pub transaction_id: Option<String>,
    pub error_code: Option<String>,
}

/// 对账后该通知的实际效果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeApplication {
    /// 本次通知完成了状态流转（副作用随之执行）
    Applied,
    /// 目标终态早已生效：重复投递，无副作用的成功
    AlreadySettled,
    /// 与已生效的终态冲突、或状态无法识别：忽略
    Ignored,
}

/// 对账报告。附带刷新后的订单，供边界层决定跳转与提示。
#[derive(Debug)]
pub struct OutcomeReport {
    pub order: Order,
    pub application: OutcomeApplication,
    pub outcome: OutcomeStatus,
}

/// Webhook处理确认
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

/// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
