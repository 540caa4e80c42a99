use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{Money, OrderStatus, PaymentMethod};
use crate::domain::Order;
use crate::ports::order_repository_port::OrderRepositoryPort;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tracing::debug;

/// MySQL订单仓储实现
#[derive(Clone)]
pub struct MySqlOrderRepository {
    pool: Arc<Pool<MySql>>,
}

impl MySqlOrderRepository {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, total, status, payment_method, payment_id,
           created_at, updated_at, paid_at
    FROM orders
"#;

#[async_trait]
impl OrderRepositoryPort for MySqlOrderRepository {
    /// 根据ID查找订单
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Order>> {
        let query = format!("{} WHERE id = ?", SELECT_COLUMNS);

        let row = sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// 根据ID和归属用户查找
    async fn find_for_user(&self, id: i64, user_id: i64) -> DomainResult<Option<Order>> {
        let query = format!("{} WHERE id = ? AND user_id = ?", SELECT_COLUMNS);

        let row = sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// 记录所选支付方式
    async fn set_payment_method(&self, id: i64, method: PaymentMethod) -> DomainResult<()> {
        let query = "UPDATE orders SET payment_method = ?, updated_at = ? WHERE id = ?";

        let rows_affected = sqlx::query(query)
            .bind(method.to_string())
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(DomainError::OrderNotFound(id));
        }

        debug!("Order {} payment method set to {}", id, method);
        Ok(())
    }

    /// 状态条件更新。单条UPDATE以当前status为条件裁决并发赢家，
    /// 不做读-改-写；payment_id/paid_at用COALESCE保证只写一次。
    async fn transition(
        &self,
        id: i64,
        expected: &[OrderStatus],
        next: OrderStatus,
        payment_id: Option<&str>,
        payment_method: Option<PaymentMethod>,
    ) -> DomainResult<bool> {
        if expected.is_empty() {
            return Ok(false);
        }

        let placeholders = vec!["?"; expected.len()].join(", ");
        let query = format!(
            r#"
            UPDATE orders
            SET status = ?,
                payment_id = COALESCE(payment_id, ?),
                payment_method = COALESCE(?, payment_method),
                paid_at = COALESCE(paid_at, ?),
                updated_at = ?
            WHERE id = ? AND status IN ({})
            "#,
            placeholders
        );

        let now = Utc::now();
        let paid_at = (next == OrderStatus::Paid).then_some(now);

        let mut statement = sqlx::query(&query)
            .bind(next.to_string())
            .bind(payment_id)
            .bind(payment_method.map(|method| method.to_string()))
            .bind(paid_at)
            .bind(now)
            .bind(id);
        for status in expected {
            statement = statement.bind(status.to_string());
        }

        let rows_affected = statement
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        debug!(
            "Order {} transition to {}: {}",
            id,
            next,
            if rows_affected == 1 { "applied" } else { "skipped" }
        );
        Ok(rows_affected == 1)
    }
}

/// 数据库行结构体
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    total: i64,
    status: String,
    payment_method: Option<String>,
    payment_id: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    paid_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl OrderRow {
    fn into_order(self) -> DomainResult<Order> {
        let status = OrderStatus::parse(&self.status).ok_or_else(|| {
            DomainError::Internal(format!("Invalid order status in database: {}", self.status))
        })?;

        let payment_method = self
            .payment_method
            .as_deref()
            .map(|raw| {
                PaymentMethod::parse(raw).ok_or_else(|| {
                    DomainError::Internal(format!("Invalid payment method in database: {}", raw))
                })
            })
            .transpose()?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            total: Money::from_minor_units(self.total),
            status,
            payment_method,
            payment_id: self.payment_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            paid_at: self.paid_at,
        })
    }
}
