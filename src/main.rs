mod api;
mod application;
mod domain;
mod infrastructure;
mod ports;
#[cfg(test)]
mod test_support;

use api::AppState;
use application::PaymentService;
use infrastructure::{MySqlCartRepository, MySqlOrderRepository, PayOsAdapter, PayOsConfig};
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    // 加载环境变量
    dotenvy::dotenv().ok();

    info!("Starting Checkout Payment Service...");

    // 创建数据库连接池
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    info!("Connecting to database...");

    let pool = Arc::new(MySqlPool::connect(&database_url).await?);
    info!("Database connected successfully");

    // 装配PayOS配置；凭证缺失时立即失败并指明缺少项，凭证内容不进日志
    let payos_config = PayOsConfig::from_env()?;
    info!("PayOS configuration loaded, endpoint: {}", payos_config.base_url);

    // 创建渠道适配器与仓储
    let provider = Arc::new(PayOsAdapter::new(payos_config)?);
    let orders = Arc::new(MySqlOrderRepository::new(pool.clone()));
    let carts = Arc::new(MySqlCartRepository::new(pool));

    // 创建支付服务
    let payment_service = Arc::new(PaymentService::new(provider, orders, carts));

    // 创建路由
    let app = api::create_router(AppState { payment_service });

    // 启动服务器
    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    info!("Server listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET  /health - Health check");
    info!("  POST /payment/process - Start payment for an order");
    info!("  GET  /payment/payment-result - Hosted checkout redirect target");
    info!("  POST /payment/webhook - PayOS webhook notifications");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
