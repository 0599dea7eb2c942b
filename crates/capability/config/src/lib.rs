//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub redis_last_reading_ttl_seconds: Option<u64>,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_readings_topic_prefix: String,
    pub ingest_enabled: bool,
    pub simulate_enabled: bool,
    pub simulate_interval_ms: u64,
    pub alert_debounce_ms: i64,
    /// 阈值覆盖（JSON 字符串，由监测层解析与校验）。
    pub thresholds_json: Option<String>,
    pub jwt_secret: String,
    pub jwt_access_ttl_seconds: u64,
    pub jwt_refresh_ttl_seconds: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("MINEMON_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("MINEMON_DATABASE_URL".to_string()))?;
        let jwt_secret = env::var("MINEMON_JWT_SECRET")
            .map_err(|_| ConfigError::Missing("MINEMON_JWT_SECRET".to_string()))?;
        let jwt_access_ttl_seconds = read_u64("MINEMON_JWT_ACCESS_TTL_SECONDS")?;
        let jwt_refresh_ttl_seconds = read_u64("MINEMON_JWT_REFRESH_TTL_SECONDS")?;
        let http_addr =
            env::var("MINEMON_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let redis_url = read_optional("MINEMON_REDIS_URL");
        let redis_last_reading_ttl_seconds =
            read_optional_u64("MINEMON_REDIS_LAST_READING_TTL_SECONDS")?
                .filter(|value| *value > 0);
        let mqtt_host = env::var("MINEMON_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("MINEMON_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("MINEMON_MQTT_USERNAME");
        let mqtt_password = read_optional("MINEMON_MQTT_PASSWORD");
        let mqtt_readings_topic_prefix = env::var("MINEMON_MQTT_READINGS_TOPIC_PREFIX")
            .unwrap_or_else(|_| "minemon/readings".to_string());
        let ingest_enabled = read_bool_with_default("MINEMON_INGEST", false);
        let simulate_enabled = read_bool_with_default("MINEMON_SIMULATE", false);
        let simulate_interval_ms = read_u64_with_default("MINEMON_SIMULATE_INTERVAL_MS", 5_000)?;
        let alert_debounce_ms = read_i64_with_default("MINEMON_ALERT_DEBOUNCE_MS", 60_000)?;
        let thresholds_json = read_optional("MINEMON_THRESHOLDS");

        Ok(Self {
            http_addr,
            database_url,
            redis_url,
            redis_last_reading_ttl_seconds,
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_readings_topic_prefix,
            ingest_enabled,
            simulate_enabled,
            simulate_interval_ms,
            alert_debounce_ms,
            thresholds_json,
            jwt_secret,
            jwt_access_ttl_seconds,
            jwt_refresh_ttl_seconds,
        })
    }
}

/// 读取 u64 类型环境变量。
fn read_u64(key: &str) -> Result<u64, ConfigError> {
    let value = env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))?;
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_i64_with_default(key: &str, default: i64) -> Result<i64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<i64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_optional_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        Err(_) => Ok(None),
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
