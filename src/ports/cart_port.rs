use crate::domain::DomainResult;
use async_trait::async_trait;

/// 购物车仓储端口接口。购物车归结账流程所有，本服务只消费清空操作。
#[async_trait]
pub trait CartPort: Send + Sync {
    /// 清空用户购物车，返回删除的条目数
    async fn clear_for_user(&self, user_id: i64) -> DomainResult<u64>;
}
