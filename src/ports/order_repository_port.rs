use crate::domain::value_objects::{OrderStatus, PaymentMethod};
use crate::domain::{DomainResult, Order};
use async_trait::async_trait;

/// 订单仓储端口接口。订单由上游结账流程创建，这里只有查询与
/// 支付相关的状态更新。
#[async_trait]
pub trait OrderRepositoryPort: Send + Sync {
    /// 根据ID查找订单
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Order>>;

    /// 根据ID和归属用户查找（归属不符时视同不存在）
    async fn find_for_user(&self, id: i64, user_id: i64) -> DomainResult<Option<Order>>;

    /// 记录所选支付方式
    async fn set_payment_method(&self, id: i64, method: PaymentMethod) -> DomainResult<()>;

    /// 状态条件更新（compare-and-swap）。仅当当前状态命中expected时写入next，
    /// 返回是否真正发生了流转；payment_id至多写入一次。回跳与Webhook并发到达时
    /// 以此裁决唯一赢家。
    async fn transition(
        &self,
        id: i64,
        expected: &[OrderStatus],
        next: OrderStatus,
        payment_id: Option<&str>,
        payment_method: Option<PaymentMethod>,
    ) -> DomainResult<bool>;
}
