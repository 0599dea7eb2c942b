//! 追踪与请求 ID 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub readings_received: u64,
    pub readings_dropped_invalid: u64,
    pub readings_dropped_unmapped: u64,
    pub readings_dropped_inactive: u64,
    pub readings_evaluated: u64,
    pub realtime_write_success: u64,
    pub realtime_write_failure: u64,
    pub alerts_raised: u64,
    pub alerts_suppressed_debounce: u64,
    pub alerts_deduplicated: u64,
    pub alerts_acknowledged: u64,
    pub authz_checks: u64,
    pub authz_denied: u64,
    pub last_admin_blocks: u64,
    pub messages_sent: u64,
    pub evaluate_latency_ms_total: u64,
    pub evaluate_latency_ms_count: u64,
    pub end_to_end_latency_ms_total: u64,
    pub end_to_end_latency_ms_count: u64,
}

/// 基础指标。
pub struct TelemetryMetrics {
    readings_received: AtomicU64,
    readings_dropped_invalid: AtomicU64,
    readings_dropped_unmapped: AtomicU64,
    readings_dropped_inactive: AtomicU64,
    readings_evaluated: AtomicU64,
    realtime_write_success: AtomicU64,
    realtime_write_failure: AtomicU64,
    alerts_raised: AtomicU64,
    alerts_suppressed_debounce: AtomicU64,
    alerts_deduplicated: AtomicU64,
    alerts_acknowledged: AtomicU64,
    authz_checks: AtomicU64,
    authz_denied: AtomicU64,
    last_admin_blocks: AtomicU64,
    messages_sent: AtomicU64,
    evaluate_latency_ms_total: AtomicU64,
    evaluate_latency_ms_count: AtomicU64,
    end_to_end_latency_ms_total: AtomicU64,
    end_to_end_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            readings_received: AtomicU64::new(0),
            readings_dropped_invalid: AtomicU64::new(0),
            readings_dropped_unmapped: AtomicU64::new(0),
            readings_dropped_inactive: AtomicU64::new(0),
            readings_evaluated: AtomicU64::new(0),
            realtime_write_success: AtomicU64::new(0),
            realtime_write_failure: AtomicU64::new(0),
            alerts_raised: AtomicU64::new(0),
            alerts_suppressed_debounce: AtomicU64::new(0),
            alerts_deduplicated: AtomicU64::new(0),
            alerts_acknowledged: AtomicU64::new(0),
            authz_checks: AtomicU64::new(0),
            authz_denied: AtomicU64::new(0),
            last_admin_blocks: AtomicU64::new(0),
            messages_sent: AtomicU64::new(0),
            evaluate_latency_ms_total: AtomicU64::new(0),
            evaluate_latency_ms_count: AtomicU64::new(0),
            end_to_end_latency_ms_total: AtomicU64::new(0),
            end_to_end_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            readings_received: self.readings_received.load(Ordering::Relaxed),
            readings_dropped_invalid: self.readings_dropped_invalid.load(Ordering::Relaxed),
            readings_dropped_unmapped: self.readings_dropped_unmapped.load(Ordering::Relaxed),
            readings_dropped_inactive: self.readings_dropped_inactive.load(Ordering::Relaxed),
            readings_evaluated: self.readings_evaluated.load(Ordering::Relaxed),
            realtime_write_success: self.realtime_write_success.load(Ordering::Relaxed),
            realtime_write_failure: self.realtime_write_failure.load(Ordering::Relaxed),
            alerts_raised: self.alerts_raised.load(Ordering::Relaxed),
            alerts_suppressed_debounce: self.alerts_suppressed_debounce.load(Ordering::Relaxed),
            alerts_deduplicated: self.alerts_deduplicated.load(Ordering::Relaxed),
            alerts_acknowledged: self.alerts_acknowledged.load(Ordering::Relaxed),
            authz_checks: self.authz_checks.load(Ordering::Relaxed),
            authz_denied: self.authz_denied.load(Ordering::Relaxed),
            last_admin_blocks: self.last_admin_blocks.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            evaluate_latency_ms_total: self.evaluate_latency_ms_total.load(Ordering::Relaxed),
            evaluate_latency_ms_count: self.evaluate_latency_ms_count.load(Ordering::Relaxed),
            end_to_end_latency_ms_total: self.end_to_end_latency_ms_total.load(Ordering::Relaxed),
            end_to_end_latency_ms_count: self.end_to_end_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录原始读数接收次数。
pub fn record_reading_received() {
    metrics().readings_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录非法读数丢弃次数。
pub fn record_reading_dropped_invalid() {
    metrics()
        .readings_dropped_invalid
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录未登记传感器读数丢弃次数。
pub fn record_reading_dropped_unmapped() {
    metrics()
        .readings_dropped_unmapped
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录失活/维护中传感器读数丢弃次数。
pub fn record_reading_dropped_inactive() {
    metrics()
        .readings_dropped_inactive
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录完成阈值评估的读数次数。
pub fn record_reading_evaluated() {
    metrics().readings_evaluated.fetch_add(1, Ordering::Relaxed);
}

/// 记录实时存储写入成功次数。
pub fn record_realtime_write_success() {
    metrics()
        .realtime_write_success
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录实时存储写入失败次数。
pub fn record_realtime_write_failure() {
    metrics()
        .realtime_write_failure
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录新告警产生次数。
pub fn record_alert_raised() {
    metrics().alerts_raised.fetch_add(1, Ordering::Relaxed);
}

/// 记录去抖窗口抑制次数。
pub fn record_alert_suppressed_debounce() {
    metrics()
        .alerts_suppressed_debounce
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录插入竞态落败次数（按成功空操作处理）。
pub fn record_alert_deduplicated() {
    metrics().alerts_deduplicated.fetch_add(1, Ordering::Relaxed);
}

/// 记录告警确认次数。
pub fn record_alert_acknowledged() {
    metrics()
        .alerts_acknowledged
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录授权判定次数。
pub fn record_authz_check() {
    metrics().authz_checks.fetch_add(1, Ordering::Relaxed);
}

/// 记录授权拒绝次数。
pub fn record_authz_denied() {
    metrics().authz_denied.fetch_add(1, Ordering::Relaxed);
}

/// 记录最后管理员保护拦截次数。
pub fn record_last_admin_block() {
    metrics().last_admin_blocks.fetch_add(1, Ordering::Relaxed);
}

/// 记录站内消息发送次数。
pub fn record_message_sent() {
    metrics().messages_sent.fetch_add(1, Ordering::Relaxed);
}

/// 记录单条读数评估耗时（毫秒）。
pub fn record_evaluate_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .evaluate_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .evaluate_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录端到端延迟（毫秒，读数产生到处理完成）。
pub fn record_end_to_end_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .end_to_end_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .end_to_end_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
