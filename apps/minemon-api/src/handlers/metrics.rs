//! Telemetry 指标快照
//!
//! - GET /metrics（view_reports）

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;
use minemon_telemetry::metrics;

use crate::AppState;
use crate::middleware::{require_auth_context, require_global_permission};

pub async fn get_metrics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::VIEW_REPORTS).await
    {
        return response;
    }

    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            readings_received: snapshot.readings_received,
            readings_dropped_invalid: snapshot.readings_dropped_invalid,
            readings_dropped_unmapped: snapshot.readings_dropped_unmapped,
            readings_dropped_inactive: snapshot.readings_dropped_inactive,
            readings_evaluated: snapshot.readings_evaluated,
            realtime_write_success: snapshot.realtime_write_success,
            realtime_write_failure: snapshot.realtime_write_failure,
            alerts_raised: snapshot.alerts_raised,
            alerts_suppressed_debounce: snapshot.alerts_suppressed_debounce,
            alerts_deduplicated: snapshot.alerts_deduplicated,
            alerts_acknowledged: snapshot.alerts_acknowledged,
            authz_checks: snapshot.authz_checks,
            authz_denied: snapshot.authz_denied,
            last_admin_blocks: snapshot.last_admin_blocks,
            messages_sent: snapshot.messages_sent,
            evaluate_latency_ms_total: snapshot.evaluate_latency_ms_total,
            evaluate_latency_ms_count: snapshot.evaluate_latency_ms_count,
            end_to_end_latency_ms_total: snapshot.end_to_end_latency_ms_total,
            end_to_end_latency_ms_count: snapshot.end_to_end_latency_ms_count,
        })),
    )
        .into_response()
}
