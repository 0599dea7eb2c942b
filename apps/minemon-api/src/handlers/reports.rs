//! 报表 handlers
//!
//! - GET /reports/summary - 全局汇总（view_reports）
//! - GET /mines/{id}/reports/summary - 矿井汇总（view_reports）
//! - GET /mines/{id}/sectors/{sid}/reports/summary - 分区汇总（分区 view_sector_reports）
//! - GET /reports/predictive - 接近 warning 阈值的传感器清单（view_predective_data）
//!
//! 汇总全部从资产清单、实时存储与告警计数现场推导。

use crate::AppState;
use crate::middleware::{
    require_auth_context, require_global_permission, require_mine_scope,
    require_sector_permission,
};
use crate::utils::response::{not_found_error, storage_error};
use api_contract::{ApiResponse, ReportSummaryDto};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::{AuthContext, SensorType, StatusTier, permissions};
use minemon_storage::{SensorReadingRecord, StorageError};

#[derive(serde::Deserialize)]
pub struct MinePath {
    pub(crate) mine_id: String,
}

#[derive(serde::Deserialize)]
pub struct SectorPath {
    pub(crate) mine_id: String,
    pub(crate) sector_id: String,
}

fn tier_counts(readings: &[SensorReadingRecord]) -> (i64, i64, i64) {
    let mut normal = 0;
    let mut warning = 0;
    let mut critical = 0;
    for reading in readings {
        match StatusTier::parse(&reading.tier).unwrap_or_default() {
            StatusTier::Normal => normal += 1,
            StatusTier::Warning => warning += 1,
            StatusTier::Critical => critical += 1,
        }
    }
    (normal, warning, critical)
}

async fn mine_summary(
    state: &AppState,
    ctx: &AuthContext,
    mine_id: &str,
) -> Result<ReportSummaryDto, StorageError> {
    let sectors = state.sector_store.list_sectors(ctx, mine_id).await?;
    let sensors = state.sensor_store.list_mine_sensors(ctx, mine_id).await?;
    let readings = state.realtime_store.list_mine_readings(ctx, mine_id).await?;
    let (normal, warning, critical) = tier_counts(&readings);
    let open_alerts = state.alert_store.count_open(ctx, Some(mine_id)).await?;
    let acknowledged_alerts = state
        .alert_store
        .count_acknowledged(ctx, Some(mine_id))
        .await?;
    Ok(ReportSummaryDto {
        mine_id: Some(mine_id.to_string()),
        mines: 1,
        sectors: sectors.len() as i64,
        sensors: sensors.len() as i64,
        sensors_normal: normal,
        sensors_warning: warning,
        sensors_critical: critical,
        open_alerts,
        acknowledged_alerts,
    })
}

/// 全局汇总
pub async fn global_report_summary(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::VIEW_REPORTS).await
    {
        return response;
    }

    let mines = match state.mine_store.list_mines(&ctx).await {
        Ok(mines) => mines,
        Err(err) => return storage_error(err),
    };

    let mut total = ReportSummaryDto {
        mine_id: None,
        mines: mines.len() as i64,
        sectors: 0,
        sensors: 0,
        sensors_normal: 0,
        sensors_warning: 0,
        sensors_critical: 0,
        open_alerts: 0,
        acknowledged_alerts: 0,
    };
    for mine in &mines {
        match mine_summary(&state, &ctx, &mine.mine_id).await {
            Ok(summary) => {
                total.sectors += summary.sectors;
                total.sensors += summary.sensors;
                total.sensors_normal += summary.sensors_normal;
                total.sensors_warning += summary.sensors_warning;
                total.sensors_critical += summary.sensors_critical;
                total.open_alerts += summary.open_alerts;
                total.acknowledged_alerts += summary.acknowledged_alerts;
            }
            Err(err) => return storage_error(err),
        }
    }
    (StatusCode::OK, Json(ApiResponse::success(total))).into_response()
}

/// 矿井汇总
pub async fn mine_report_summary(
    State(state): State<AppState>,
    Path(path): Path<MinePath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::VIEW_REPORTS).await
    {
        return response;
    }
    match mine_summary(&state, &ctx, &path.mine_id).await {
        Ok(summary) => (StatusCode::OK, Json(ApiResponse::success(summary))).into_response(),
        Err(err) => storage_error(err),
    }
}

/// 分区汇总
pub async fn sector_report_summary(
    State(state): State<AppState>,
    Path(path): Path<SectorPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_sector_permission(
        &state,
        &ctx,
        permissions::VIEW_SECTOR_REPORTS,
        &path.mine_id,
        &path.sector_id,
    )
    .await
    {
        return response;
    }
    match state
        .sector_store
        .find_sector(&ctx, &path.mine_id, &path.sector_id)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    }

    let sensors = match state
        .sensor_store
        .list_sectors_sensors(&ctx, &path.mine_id, &path.sector_id)
        .await
    {
        Ok(sensors) => sensors,
        Err(err) => return storage_error(err),
    };
    let readings = match state
        .realtime_store
        .list_sector_readings(&ctx, &path.mine_id, &path.sector_id)
        .await
    {
        Ok(readings) => readings,
        Err(err) => return storage_error(err),
    };
    let (normal, warning, critical) = tier_counts(&readings);
    let open_alerts = match state.alert_store.count_open(&ctx, Some(&path.mine_id)).await {
        Ok(count) => count,
        Err(err) => return storage_error(err),
    };
    let acknowledged_alerts = match state
        .alert_store
        .count_acknowledged(&ctx, Some(&path.mine_id))
        .await
    {
        Ok(count) => count,
        Err(err) => return storage_error(err),
    };

    let summary = ReportSummaryDto {
        mine_id: Some(path.mine_id),
        mines: 1,
        sectors: 1,
        sensors: sensors.len() as i64,
        sensors_normal: normal,
        sensors_warning: warning,
        sensors_critical: critical,
        open_alerts,
        acknowledged_alerts,
    };
    (StatusCode::OK, Json(ApiResponse::success(summary))).into_response()
}

/// 接近 warning 阈值的传感器清单（headroom >= 80% 视为有风险）
pub async fn predictive_report(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) =
        require_global_permission(&state, &ctx, permissions::VIEW_PREDECTIVE_DATA).await
    {
        return response;
    }

    let mines = match state.mine_store.list_mines(&ctx).await {
        Ok(mines) => mines,
        Err(err) => return storage_error(err),
    };

    let mut at_risk = Vec::new();
    for mine in &mines {
        let readings = match state
            .realtime_store
            .list_mine_readings(&ctx, &mine.mine_id)
            .await
        {
            Ok(readings) => readings,
            Err(err) => return storage_error(err),
        };
        for reading in readings {
            let Some(sensor_type) = SensorType::parse(&reading.sensor_type) else {
                continue;
            };
            let Some(bounds) = state.thresholds.bounds(sensor_type) else {
                continue;
            };
            // 仍在 normal 区间但已逼近 warning 边界
            let ratio = reading.value / bounds.warning;
            if (0.8..1.0).contains(&ratio) {
                at_risk.push(serde_json::json!({
                    "mineId": reading.mine_id,
                    "sectorId": reading.sector_id,
                    "sensorId": reading.sensor_id,
                    "sensorType": reading.sensor_type,
                    "value": reading.value,
                    "warningBound": bounds.warning,
                    "headroomRatio": ratio,
                }));
            }
        }
    }
    (StatusCode::OK, Json(ApiResponse::success(at_risk))).into_response()
}
