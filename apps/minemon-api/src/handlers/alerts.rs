//! 告警 handlers
//!
//! - GET /alerts - 告警列表；带 sectorId 过滤时按分区作用域判权，
//!   否则要求全局 view_alerts
//! - POST /alerts/{id}/acknowledge - 确认告警（幂等）；
//!   分区级告警按分区 manage_sector_alerts 判权，矿井级按全局 manage_alerts

use crate::AppState;
use crate::middleware::{
    require_auth_context, require_global_permission, require_sector_permission,
};
use crate::utils::response::{alert_to_dto, bad_request_error, monitor_error, not_found_error, storage_error};
use api_contract::{AlertDto, AlertsQuery, ApiResponse};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::{AlertSeverity, permissions};
use minemon_telemetry::record_alert_acknowledged;

#[derive(serde::Deserialize)]
pub struct AlertPath {
    pub(crate) alert_id: String,
}

/// 告警列表
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    // 分区过滤需要 mineId + sectorId 成对出现
    match (&query.mine_id, &query.sector_id) {
        (Some(mine_id), Some(sector_id)) => {
            if let Err(response) = require_sector_permission(
                &state,
                &ctx,
                permissions::VIEW_SECTOR_ALERTS,
                mine_id,
                sector_id,
            )
            .await
            {
                return response;
            }
        }
        (None, Some(_)) => return bad_request_error("sectorId requires mineId"),
        _ => {
            if let Err(response) =
                require_global_permission(&state, &ctx, permissions::VIEW_ALERTS).await
            {
                return response;
            }
        }
    }

    if let Some(severity) = query.severity.as_deref() {
        if AlertSeverity::parse(severity).is_none() {
            return bad_request_error("severity must be info|warning|critical");
        }
    }
    let limit = query.limit.unwrap_or(100);
    if limit <= 0 || limit > 1000 {
        return bad_request_error("limit out of range");
    }

    let filter = minemon_storage::AlertFilter {
        mine_id: query.mine_id,
        sector_id: query.sector_id,
        severity: query.severity,
        acknowledged: query.acknowledged,
        limit,
    };
    match state.alert_store.list_alerts(&ctx, filter).await {
        Ok(items) => {
            let data: Vec<AlertDto> = items.into_iter().map(alert_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 确认告警（幂等：重复确认返回当前状态，不报错）
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(path): Path<AlertPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let alert = match state.alert_store.find_alert(&ctx, &path.alert_id).await {
        Ok(Some(alert)) => alert,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };

    // 分区级告警按分区作用域判权，矿井级按全局
    match alert.sector_id.as_deref() {
        Some(sector_id) => {
            if let Err(response) = require_sector_permission(
                &state,
                &ctx,
                permissions::MANAGE_SECTOR_ALERTS,
                &alert.mine_id,
                sector_id,
            )
            .await
            {
                return response;
            }
        }
        None => {
            if let Err(response) =
                require_global_permission(&state, &ctx, permissions::MANAGE_ALERTS).await
            {
                return response;
            }
        }
    }

    match state
        .monitoring
        .generator()
        .acknowledge(&ctx, &path.alert_id, &ctx.user_id, super::rbac::now_epoch_ms())
        .await
    {
        Ok(Some(updated)) => {
            record_alert_acknowledged();
            super::rbac::append_audit(
                &state,
                &ctx,
                "alert.acknowledge",
                format!("acknowledged alert {}", path.alert_id),
            )
            .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(alert_to_dto(updated))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => monitor_error(err),
    }
}
