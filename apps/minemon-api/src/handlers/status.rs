//! 实时状态 handlers（仪表盘与地图着色的数据来源）
//!
//! - GET /overview - 全矿井总览（view_all_mines）
//! - GET /mines/{id}/status - 矿井状态树：矿井分层 + 各分区分层 + 传感器读数
//! - GET /mines/{id}/sectors/{sid}/status - 单个分区状态（分区 view_sector）
//!
//! 分层一律从实时存储现场聚合（最差值），不落任何缓存副本。

use crate::AppState;
use crate::middleware::{
    require_auth_context, require_global_permission, require_mine_scope,
    require_sector_permission,
};
use crate::utils::response::{not_found_error, storage_error};
use api_contract::{ApiResponse, MineOverviewDto, MineStatusDto, SectorStatusDto, SensorStatusDto};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::{AuthContext, SensorType, permissions};
use minemon_monitoring::aggregate_reading_tiers;
use minemon_storage::{SectorRecord, SensorReadingRecord, SensorRecord, StorageError};

#[derive(serde::Deserialize)]
pub struct MinePath {
    pub(crate) mine_id: String,
}

#[derive(serde::Deserialize)]
pub struct SectorPath {
    pub(crate) mine_id: String,
    pub(crate) sector_id: String,
}

fn sensor_status_dto(
    sensor: &SensorRecord,
    reading: Option<&SensorReadingRecord>,
) -> SensorStatusDto {
    let unit = SensorType::parse(&sensor.sensor_type)
        .map(|sensor_type| sensor_type.unit())
        .unwrap_or("")
        .to_string();
    SensorStatusDto {
        sensor_id: sensor.sensor_id.clone(),
        sensor_type: sensor.sensor_type.clone(),
        unit,
        location: sensor.location.clone(),
        value: reading.map(|reading| reading.value),
        ts_ms: reading.map(|reading| reading.ts_ms),
        // 无读数的传感器按 normal 渲染（无数据不是告警）
        tier: reading
            .map(|reading| reading.tier.clone())
            .unwrap_or_else(|| "normal".to_string()),
    }
}

async fn build_sector_status(
    state: &AppState,
    ctx: &AuthContext,
    sector: &SectorRecord,
) -> Result<SectorStatusDto, StorageError> {
    let sensors = state
        .sensor_store
        .list_sectors_sensors(ctx, &sector.mine_id, &sector.sector_id)
        .await?;
    let readings = state
        .realtime_store
        .list_sector_readings(ctx, &sector.mine_id, &sector.sector_id)
        .await?;
    let tier = aggregate_reading_tiers(&readings);
    let sensors = sensors
        .iter()
        .map(|sensor| {
            let reading = readings
                .iter()
                .find(|reading| reading.sensor_id == sensor.sensor_id);
            sensor_status_dto(sensor, reading)
        })
        .collect();
    Ok(SectorStatusDto {
        sector_id: sector.sector_id.clone(),
        name: sector.name.clone(),
        level: sector.level,
        tier: tier.as_str().to_string(),
        sensors,
    })
}

/// 矿井状态树
pub async fn mine_status(
    State(state): State<AppState>,
    Path(path): Path<MinePath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) =
        require_global_permission(&state, &ctx, permissions::VIEW_ALL_MINES).await
    {
        return response;
    }

    let mine = match state.mine_store.find_mine(&ctx, &path.mine_id).await {
        Ok(Some(mine)) => mine,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    let sectors = match state.sector_store.list_sectors(&ctx, &path.mine_id).await {
        Ok(sectors) => sectors,
        Err(err) => return storage_error(err),
    };

    let mut sector_dtos = Vec::with_capacity(sectors.len());
    for sector in &sectors {
        match build_sector_status(&state, &ctx, sector).await {
            Ok(dto) => sector_dtos.push(dto),
            Err(err) => return storage_error(err),
        }
    }

    let readings = match state
        .realtime_store
        .list_mine_readings(&ctx, &path.mine_id)
        .await
    {
        Ok(readings) => readings,
        Err(err) => return storage_error(err),
    };
    let tier = aggregate_reading_tiers(&readings);

    let dto = MineStatusDto {
        mine_id: mine.mine_id,
        name: mine.name,
        status: mine.status,
        tier: tier.as_str().to_string(),
        sectors: sector_dtos,
    };
    (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
}

/// 单个分区状态
pub async fn sector_status(
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
        permissions::VIEW_SECTOR,
        &path.mine_id,
        &path.sector_id,
    )
    .await
    {
        return response;
    }
    let sector = match state
        .sector_store
        .find_sector(&ctx, &path.mine_id, &path.sector_id)
        .await
    {
        Ok(Some(sector)) => sector,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    match build_sector_status(&state, &ctx, &sector).await {
        Ok(dto) => (StatusCode::OK, Json(ApiResponse::success(dto))).into_response(),
        Err(err) => storage_error(err),
    }
}

/// 全矿井总览（地图着色 + 仪表盘列表）
pub async fn mines_overview(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) =
        require_global_permission(&state, &ctx, permissions::VIEW_ALL_MINES).await
    {
        return response;
    }

    let mines = match state.mine_store.list_mines(&ctx).await {
        Ok(mines) => mines,
        Err(err) => return storage_error(err),
    };

    let mut overview = Vec::with_capacity(mines.len());
    for mine in mines {
        let readings = match state
            .realtime_store
            .list_mine_readings(&ctx, &mine.mine_id)
            .await
        {
            Ok(readings) => readings,
            Err(err) => return storage_error(err),
        };
        let tier = aggregate_reading_tiers(&readings);
        let open_alerts = match state
            .alert_store
            .count_open(&ctx, Some(&mine.mine_id))
            .await
        {
            Ok(count) => count,
            Err(err) => return storage_error(err),
        };
        overview.push(MineOverviewDto {
            mine_id: mine.mine_id,
            name: mine.name,
            status: mine.status,
            tier: tier.as_str().to_string(),
            latitude: mine.latitude,
            longitude: mine.longitude,
            open_alerts,
        });
    }
    (StatusCode::OK, Json(ApiResponse::success(overview))).into_response()
}
