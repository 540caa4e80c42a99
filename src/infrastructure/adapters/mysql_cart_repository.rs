use crate::domain::DomainResult;
use crate::ports::cart_port::CartPort;
use async_trait::async_trait;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tracing::debug;

/// MySQL购物车仓储实现。购物车条目归结账流程所有，这里只执行清空。
#[derive(Clone)]
pub struct MySqlCartRepository {
    pool: Arc<Pool<MySql>>,
}

impl MySqlCartRepository {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartPort for MySqlCartRepository {
    /// 清空用户购物车
    async fn clear_for_user(&self, user_id: i64) -> DomainResult<u64> {
        let query = "DELETE FROM cart_items WHERE user_id = ?";

        let rows_affected = sqlx::query(query)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        debug!("Cart cleared for user {} ({} items)", user_id, rows_affected);
        Ok(rows_affected)
    }
}
