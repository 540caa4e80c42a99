//! 测试用内存实现：以互斥锁内存仓储复刻SQL条件更新的CAS语义，
//! 以脚本化渠道桩替代真实HTTP调用。

use crate::domain::errors::ProviderFailure;
use crate::domain::value_objects::{Money, OrderStatus, PaymentMethod};
use crate::domain::{DomainResult, Order};
use crate::ports::payos_port::{CheckoutSession, PayOsPort, RemotePaymentStatus};
use crate::ports::{CartPort, OrderRepositoryPort};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn order(id: i64, user_id: i64, total: i64, status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id,
        user_id,
        total: Money::from_minor_units(total),
        status,
        payment_method: None,
        payment_id: None,
        created_at: now,
        updated_at: now,
        paid_at: None,
    }
}

/// 内存订单仓储。transition与MySQL实现同语义：
/// 单锁临界区内判定预期状态并写入，payment_id只写一次。
#[derive(Default)]
pub struct InMemoryOrders {
    rows: Mutex<HashMap<i64, Order>>,
}

impl InMemoryOrders {
    pub fn with(orders: Vec<Order>) -> Self {
        Self {
            rows: Mutex::new(orders.into_iter().map(|order| (order.id, order)).collect()),
        }
    }

    pub fn get(&self, id: i64) -> Option<Order> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl OrderRepositoryPort for InMemoryOrders {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Order>> {
        Ok(self.get(id))
    }

    async fn find_for_user(&self, id: i64, user_id: i64) -> DomainResult<Option<Order>> {
        Ok(self.get(id).filter(|order| order.user_id == user_id))
    }

    async fn set_payment_method(&self, id: i64, method: PaymentMethod) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let order = rows
            .get_mut(&id)
            .ok_or(crate::domain::DomainError::OrderNotFound(id))?;
        order.payment_method = Some(method);
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn transition(
        &self,
        id: i64,
        expected: &[OrderStatus],
        next: OrderStatus,
        payment_id: Option<&str>,
        payment_method: Option<PaymentMethod>,
    ) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let Some(order) = rows.get_mut(&id) else {
            return Ok(false);
        };
        if !expected.contains(&order.status) {
            return Ok(false);
        }

        order.status = next;
        if order.payment_id.is_none() {
            order.payment_id = payment_id.map(String::from);
        }
        if let Some(method) = payment_method {
            order.payment_method = Some(method);
        }
        if next == OrderStatus::Paid && order.paid_at.is_none() {
            order.paid_at = Some(Utc::now());
        }
        order.updated_at = Utc::now();
        Ok(true)
    }
}

/// 按用户计数清空次数的内存购物车
#[derive(Default)]
pub struct CountingCart {
    clears: Mutex<HashMap<i64, u64>>,
}

impl CountingCart {
    pub fn clears_for(&self, user_id: i64) -> u64 {
        self.clears.lock().unwrap().get(&user_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl CartPort for CountingCart {
    async fn clear_for_user(&self, user_id: i64) -> DomainResult<u64> {
        *self.clears.lock().unwrap().entry(user_id).or_insert(0) += 1;
        Ok(3)
    }
}

/// 脚本化渠道桩
pub struct StubProvider {
    decline: Option<ProviderFailure>,
    accept_signatures: bool,
}

impl StubProvider {
    /// 下单成功、验签通过
    pub fn approving() -> Self {
        Self {
            decline: None,
            accept_signatures: true,
        }
    }

    /// 下单固定失败
    pub fn declining(failure: ProviderFailure) -> Self {
        Self {
            decline: Some(failure),
            accept_signatures: true,
        }
    }

    /// 验签一律失败
    pub fn rejecting_signatures() -> Self {
        Self {
            decline: None,
            accept_signatures: false,
        }
    }
}

#[async_trait]
impl PayOsPort for StubProvider {
    async fn create_payment(
        &self,
        _order_code: i64,
        _amount: i64,
        _description: &str,
    ) -> Result<CheckoutSession, ProviderFailure> {
        match &self.decline {
            Some(failure) => Err(failure.clone()),
            None => Ok(CheckoutSession {
                payment_url: "https://pay.example/checkout".to_string(),
                payment_id: "pl-test".to_string(),
                qr_code: None,
            }),
        }
    }

    async fn verify_payment(
        &self,
        _payment_id: &str,
    ) -> Result<RemotePaymentStatus, ProviderFailure> {
        Ok(RemotePaymentStatus {
            status: "PAID".to_string(),
            raw: serde_json::json!({}),
        })
    }

    fn verify_webhook(&self, _payload: &Value) -> bool {
        self.accept_signatures
    }
}
