//! 传感器 CRUD handlers
//!
//! - GET /mines/{id}/sectors/{sid}/sensors - 列出传感器（分区 view_sector_sensors）
//! - POST /mines/{id}/sectors/{sid}/sensors - 创建传感器（分区 manage_sector_sensors）
//! - GET /mines/{id}/sectors/{sid}/sensors/{snid} - 详情（分区 view_sector_sensors）
//! - PUT /mines/{id}/sectors/{sid}/sensors/{snid} - 更新（分区 manage_sector_sensors）
//! - DELETE /mines/{id}/sectors/{sid}/sensors/{snid} - 删除（分区 manage_sector_sensors）
//!
//! 传感器类型是封闭枚举；创建时校验类型与分区存在。

use crate::AppState;
use crate::middleware::{require_mine_scope, require_sector_permission};
use crate::utils::response::{bad_request_error, not_found_error, sensor_to_dto, storage_error};
use crate::utils::{normalize_optional, normalize_required, validate_choice};
use api_contract::{ApiResponse, CreateSensorRequest, SensorDto, UpdateSensorRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::{SensorType, permissions};
use uuid::Uuid;

const SENSOR_STATUSES: &[&str] = &["active", "inactive", "maintenance"];

#[derive(serde::Deserialize)]
pub struct SectorPath {
    pub(crate) mine_id: String,
    pub(crate) sector_id: String,
}

#[derive(serde::Deserialize)]
pub struct SensorPath {
    pub(crate) mine_id: String,
    pub(crate) sector_id: String,
    pub(crate) sensor_id: String,
}

/// 列出传感器
pub async fn list_sensors(
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
        permissions::VIEW_SECTOR_SENSORS,
        &path.mine_id,
        &path.sector_id,
    )
    .await
    {
        return response;
    }
    match state
        .sensor_store
        .list_sectors_sensors(&ctx, &path.mine_id, &path.sector_id)
        .await
    {
        Ok(items) => {
            let data: Vec<SensorDto> = items.into_iter().map(sensor_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建传感器
pub async fn create_sensor(
    State(state): State<AppState>,
    Path(path): Path<SectorPath>,
    headers: HeaderMap,
    Json(req): Json<CreateSensorRequest>,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_sector_permission(
        &state,
        &ctx,
        permissions::MANAGE_SECTOR_SENSORS,
        &path.mine_id,
        &path.sector_id,
    )
    .await
    {
        return response;
    }
    let sensor_type = match normalize_required(req.sensor_type, "sensorType") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if SensorType::parse(&sensor_type).is_none() {
        return bad_request_error(format!("unknown sensor type: {sensor_type}"));
    }
    let location = match normalize_required(req.location, "location") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let status = match req.status {
        Some(status) => match validate_choice(status, "status", SENSOR_STATUSES) {
            Ok(value) => value,
            Err(response) => return response,
        },
        None => "active".to_string(),
    };
    // 分区必须存在
    match state
        .sector_store
        .find_sector(&ctx, &path.mine_id, &path.sector_id)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => return bad_request_error("sector not found"),
        Err(err) => return storage_error(err),
    }
    let record = minemon_storage::SensorRecord {
        sensor_id: Uuid::new_v4().to_string(),
        mine_id: path.mine_id,
        sector_id: path.sector_id,
        sensor_type,
        location,
        latitude: req.latitude,
        longitude: req.longitude,
        status,
        calibration_scale: req.calibration_scale.unwrap_or(1.0),
        calibration_offset: req.calibration_offset.unwrap_or(0.0),
        calibrated_at_ms: None,
        manufacturer: req.manufacturer,
        model: req.model,
        range_min: req.range_min,
        range_max: req.range_max,
    };
    match state.sensor_store.create_sensor(&ctx, record).await {
        Ok(item) => (
            StatusCode::OK,
            Json(ApiResponse::success(sensor_to_dto(item))),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

/// 传感器详情
pub async fn get_sensor(
    State(state): State<AppState>,
    Path(path): Path<SensorPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_sector_permission(
        &state,
        &ctx,
        permissions::VIEW_SECTOR_SENSORS,
        &path.mine_id,
        &path.sector_id,
    )
    .await
    {
        return response;
    }
    match state
        .sensor_store
        .find_sensor(&ctx, &path.mine_id, &path.sector_id, &path.sensor_id)
        .await
    {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(ApiResponse::success(sensor_to_dto(item))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 更新传感器（位置、状态、标定、厂商规格）
pub async fn update_sensor(
    State(state): State<AppState>,
    Path(path): Path<SensorPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateSensorRequest>,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_sector_permission(
        &state,
        &ctx,
        permissions::MANAGE_SECTOR_SENSORS,
        &path.mine_id,
        &path.sector_id,
    )
    .await
    {
        return response;
    }
    let location = match normalize_optional(req.location, "location") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let status = match req.status {
        Some(status) => match validate_choice(status, "status", SENSOR_STATUSES) {
            Ok(value) => Some(value),
            Err(response) => return response,
        },
        None => None,
    };
    let manufacturer = match normalize_optional(req.manufacturer, "manufacturer") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let model = match normalize_optional(req.model, "model") {
        Ok(value) => value,
        Err(response) => return response,
    };
    // 标定系数变化即视为一次重新标定
    let calibrated_at_ms = if req.calibration_scale.is_some() || req.calibration_offset.is_some() {
        Some(now_epoch_ms())
    } else {
        None
    };
    let update = minemon_storage::SensorUpdate {
        location,
        latitude: req.latitude,
        longitude: req.longitude,
        status,
        calibration_scale: req.calibration_scale,
        calibration_offset: req.calibration_offset,
        calibrated_at_ms,
        manufacturer,
        model,
        range_min: req.range_min,
        range_max: req.range_max,
    };
    match state
        .sensor_store
        .update_sensor(&ctx, &path.mine_id, &path.sector_id, &path.sensor_id, update)
        .await
    {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(ApiResponse::success(sensor_to_dto(item))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除传感器
pub async fn delete_sensor(
    State(state): State<AppState>,
    Path(path): Path<SensorPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_sector_permission(
        &state,
        &ctx,
        permissions::MANAGE_SECTOR_SENSORS,
        &path.mine_id,
        &path.sector_id,
    )
    .await
    {
        return response;
    }
    match state
        .sensor_store
        .delete_sensor(&ctx, &path.mine_id, &path.sector_id, &path.sensor_id)
        .await
    {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
