//! Minemon API 入口：装配配置、存储、认证、授权、监测与采集链路。

mod handlers;
mod ingest;
mod middleware;
mod routes;
mod utils;

use minemon_access::AccessControl;
use minemon_auth::{AuthService, JwtManager};
use minemon_config::AppConfig;
use minemon_monitoring::{AlertGenerator, AlertPolicy, MonitoringService, ThresholdTable};
use minemon_storage::{
    AlertStore, AuditLogStore, InMemoryRealtimeStore, MessageStore, MineStore, PgAlertStore,
    PgAuditLogStore, PgMessageStore, PgMineStore, PgSectorStore, PgSensorStore, PgUserStore,
    RbacStore, RealtimeStore, RedisRealtimeStore, SectorStore, SensorStore, UserStore,
};
use minemon_telemetry::init_tracing;
use std::sync::Arc;

/// 应用状态：handler 可见的全部依赖。
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub access: Arc<AccessControl>,
    pub db_pool: Option<sqlx::PgPool>,
    pub user_store: Arc<dyn UserStore>,
    pub rbac_store: Arc<dyn RbacStore>,
    pub mine_store: Arc<dyn MineStore>,
    pub sector_store: Arc<dyn SectorStore>,
    pub sensor_store: Arc<dyn SensorStore>,
    pub alert_store: Arc<dyn AlertStore>,
    pub message_store: Arc<dyn MessageStore>,
    pub realtime_store: Arc<dyn RealtimeStore>,
    pub audit_log_store: Arc<dyn AuditLogStore>,
    pub monitoring: Arc<MonitoringService>,
    pub thresholds: ThresholdTable,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 阈值表：默认值 + 环境变量 JSON 覆盖；非法配置在启动期失败
    let thresholds = match config.thresholds_json.as_deref() {
        Some(json) => ThresholdTable::defaults_with_overrides_json(json)?,
        None => ThresholdTable::defaults(),
    };

    // Postgres 存储（需先执行 migrations/seed）
    let pool = minemon_storage::connect_pool(&config.database_url).await?;
    let pg_users = Arc::new(PgUserStore::new(pool.clone()));
    let user_store: Arc<dyn UserStore> = pg_users.clone();
    let rbac_store: Arc<dyn RbacStore> = pg_users;
    let mine_store: Arc<dyn MineStore> = Arc::new(PgMineStore::new(pool.clone()));
    let sector_store: Arc<dyn SectorStore> = Arc::new(PgSectorStore::new(pool.clone()));
    let sensor_store: Arc<dyn SensorStore> = Arc::new(PgSensorStore::new(pool.clone()));
    let alert_store: Arc<dyn AlertStore> = Arc::new(PgAlertStore::new(pool.clone()));
    let message_store: Arc<dyn MessageStore> = Arc::new(PgMessageStore::new(pool.clone()));
    let audit_log_store: Arc<dyn AuditLogStore> = Arc::new(PgAuditLogStore::new(pool.clone()));

    // 实时读数：优先 Redis，未配置时退回进程内存储
    let realtime_store: Arc<dyn RealtimeStore> = match config.redis_url.as_deref() {
        Some(redis_url) => Arc::new(RedisRealtimeStore::connect_with_ttl(
            redis_url,
            config.redis_last_reading_ttl_seconds,
        )?),
        None => Arc::new(InMemoryRealtimeStore::new()),
    };

    // 认证与授权
    let jwt = JwtManager::new(
        config.jwt_secret.clone(),
        config.jwt_access_ttl_seconds,
        config.jwt_refresh_ttl_seconds,
    );
    let auth = Arc::new(AuthService::new(user_store.clone(), jwt));
    let access = Arc::new(AccessControl::new(user_store.clone(), rbac_store.clone()));

    // 监测链路：阈值评估 + 实时存储 + 告警生成
    let generator = AlertGenerator::new(
        alert_store.clone(),
        AlertPolicy {
            debounce_ms: config.alert_debounce_ms,
        },
    );
    let monitoring = Arc::new(MonitoringService::new(
        thresholds.clone(),
        realtime_store.clone(),
        generator,
    ));

    let state = AppState {
        auth,
        access,
        db_pool: Some(pool),
        user_store,
        rbac_store,
        mine_store,
        sector_store,
        sensor_store,
        alert_store,
        message_store,
        realtime_store,
        audit_log_store,
        monitoring,
        thresholds,
    };

    // 采集链路：MQTT 与/或模拟数据源
    ingest::spawn_sources(&config, &state);

    // 路由同时暴露 / 与 /api/ 两种前缀
    let api = routes::create_api_router();
    let app = axum::Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(axum::middleware::from_fn(middleware::request_context));

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!(target: "minemon.api", addr = %config.http_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
