use serde::{Deserialize, Serialize};
use std::fmt;

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 已创建（待支付）
    Created,
    /// 处理中（货到付款已确认）
    Processing,
    /// 支付成功
    Paid,
    /// 已取消
    Cancelled,
}

impl OrderStatus {
    /// 从持久化字符串还原
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(OrderStatus::Created),
            "processing" => Some(OrderStatus::Processing),
            "paid" => Some(OrderStatus::Paid),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "created"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// 货到付款
    Cod,
    /// PayOS托管收银台
    PayOs,
}

impl PaymentMethod {
    /// 从持久化字符串还原
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cod" => Some(PaymentMethod::Cod),
            "payos" => Some(PaymentMethod::PayOs),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "cod"),
            PaymentMethod::PayOs => write!(f, "payos"),
        }
    }
}

/// 货币金额（最小货币单位整数，避免浮点数精度问题；VND无小数位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// 金额（最小货币单位）
    pub minor_units: i64,
}

impl Money {
    /// 以最小货币单位创建金额对象
    pub fn from_minor_units(minor_units: i64) -> Self {
        Self { minor_units }
    }

    /// 转换为最小货币单位
    pub fn to_minor_units(&self) -> i64 {
        self.minor_units
    }

    /// 金额是否为正
    pub fn is_positive(&self) -> bool {
        self.minor_units > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} VND", self.minor_units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_minor_units() {
        let money = Money::from_minor_units(150_000);
        assert_eq!(money.to_minor_units(), 150_000);
        assert!(money.is_positive());
        assert!(!Money::from_minor_units(0).is_positive());
    }

    #[test]
    fn test_money_display() {
        let money = Money::from_minor_units(150_000);
        assert_eq!(format!("{}", money), "150000 VND");
    }

    #[test]
    fn test_order_status_roundtrip() {
        for status in [
            OrderStatus::Created,
            OrderStatus::Processing,
            OrderStatus::Paid,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(&status.to_string()), Some(status));
        }
        assert_eq!(OrderStatus::parse("refunded"), None);
    }

    #[test]
    fn test_payment_method_roundtrip() {
        assert_eq!(PaymentMethod::parse("cod"), Some(PaymentMethod::Cod));
        assert_eq!(PaymentMethod::parse("payos"), Some(PaymentMethod::PayOs));
        assert_eq!(PaymentMethod::parse("bank_transfer"), None);
    }
}
