use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{Money, OrderStatus, PaymentMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 订单聚合根。由上游结账流程创建，本服务只负责支付相关的状态流转，
/// 不在这里创建或删除订单。状态只能沿时间向前推进，payment_id至多写入一次
/// （仅在进入paid时）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// 订单ID（渠道orderCode由它导出，必须为正整数）
    pub id: i64,

    /// 归属用户ID
    pub user_id: i64,

    /// 订单总额（含运费）
    pub total: Money,

    /// 订单状态
    pub status: OrderStatus,

    /// 支付方式（发起支付前为空）
    pub payment_method: Option<PaymentMethod>,

    /// 渠道交易号（支付成功后写入）
    pub payment_id: Option<String>,

    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 更新时间
    pub updated_at: DateTime<Utc>,

    /// 支付完成时间
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    /// 是否仍可接受支付结果（created或processing）
    pub fn awaiting_payment(&self) -> bool {
        matches!(self.status, OrderStatus::Created | OrderStatus::Processing)
    }

    /// 是否已支付
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    /// 校验订单可发起渠道支付：orderCode必须是渠道可接受的正整数，金额必须为正
    pub fn ensure_chargeable(&self) -> DomainResult<()> {
        if self.id <= 0 {
            return Err(DomainError::InvalidArgument(format!(
                "Order id {} cannot be used as a provider order code",
                self.id
            )));
        }
        if !self.total.is_positive() {
            return Err(DomainError::InvalidArgument(format!(
                "Order total must be greater than 0, got {}",
                self.total
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i64, total: i64, status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id,
            user_id: 1,
            total: Money::from_minor_units(total),
            status,
            payment_method: None,
            payment_id: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
        }
    }

    #[test]
    fn test_awaiting_payment() {
        assert!(order(1, 1000, OrderStatus::Created).awaiting_payment());
        assert!(order(1, 1000, OrderStatus::Processing).awaiting_payment());
        assert!(!order(1, 1000, OrderStatus::Paid).awaiting_payment());
        assert!(!order(1, 1000, OrderStatus::Cancelled).awaiting_payment());
    }

    #[test]
    fn test_ensure_chargeable() {
        assert!(order(42, 150_000, OrderStatus::Created).ensure_chargeable().is_ok());
        assert!(order(0, 150_000, OrderStatus::Created).ensure_chargeable().is_err());
        assert!(order(-3, 150_000, OrderStatus::Created).ensure_chargeable().is_err());
        assert!(order(42, 0, OrderStatus::Created).ensure_chargeable().is_err());
    }
}
