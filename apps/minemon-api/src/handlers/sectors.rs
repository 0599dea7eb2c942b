//! 分区 CRUD handlers
//!
//! - GET /mines/{id}/sectors - 列出分区（view_all_mines）
//! - POST /mines/{id}/sectors - 创建分区（manage_mines；层级在矿井内唯一）
//! - GET /mines/{id}/sectors/{sid} - 分区详情（分区 view_sector）
//! - PUT /mines/{id}/sectors/{sid} - 更新分区（分区 manage_sector）
//! - DELETE /mines/{id}/sectors/{sid} - 删除分区并级联删除传感器（manage_mines）
//!
//! 层级冲突（DuplicateSectorLevel）作为 422 校验失败返回，不会重试。

use crate::AppState;
use crate::middleware::{
    require_global_permission, require_mine_scope, require_sector_permission,
};
use crate::utils::response::{not_found_error, sector_to_dto, storage_error};
use crate::utils::{normalize_optional, normalize_required, validate_choice};
use api_contract::{ApiResponse, CreateSectorRequest, SectorDto, UpdateSectorRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;
use uuid::Uuid;

const SECTOR_STATUSES: &[&str] = &["active", "maintenance", "emergency"];

#[derive(serde::Deserialize)]
pub struct MinePath {
    pub(crate) mine_id: String,
}

#[derive(serde::Deserialize)]
pub struct SectorPath {
    pub(crate) mine_id: String,
    pub(crate) sector_id: String,
}

/// 列出分区
pub async fn list_sectors(
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
    match state.sector_store.list_sectors(&ctx, &path.mine_id).await {
        Ok(items) => {
            let data: Vec<SectorDto> = items.into_iter().map(sector_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建分区
pub async fn create_sector(
    State(state): State<AppState>,
    Path(path): Path<MinePath>,
    headers: HeaderMap,
    Json(req): Json<CreateSectorRequest>,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_MINES).await
    {
        return response;
    }
    let name = match normalize_required(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let status = match req.status {
        Some(status) => match validate_choice(status, "status", SECTOR_STATUSES) {
            Ok(value) => value,
            Err(response) => return response,
        },
        None => "active".to_string(),
    };
    let record = minemon_storage::SectorRecord {
        sector_id: Uuid::new_v4().to_string(),
        mine_id: path.mine_id,
        name,
        level: req.level,
        status,
    };
    match state.sector_store.create_sector(&ctx, record).await {
        Ok(item) => (
            StatusCode::OK,
            Json(ApiResponse::success(sector_to_dto(item))),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

/// 分区详情
pub async fn get_sector(
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
    match state
        .sector_store
        .find_sector(&ctx, &path.mine_id, &path.sector_id)
        .await
    {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(ApiResponse::success(sector_to_dto(item))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 更新分区
pub async fn update_sector(
    State(state): State<AppState>,
    Path(path): Path<SectorPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateSectorRequest>,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_sector_permission(
        &state,
        &ctx,
        permissions::MANAGE_SECTOR,
        &path.mine_id,
        &path.sector_id,
    )
    .await
    {
        return response;
    }
    let name = match normalize_optional(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let status = match req.status {
        Some(status) => match validate_choice(status, "status", SECTOR_STATUSES) {
            Ok(value) => Some(value),
            Err(response) => return response,
        },
        None => None,
    };
    let update = minemon_storage::SectorUpdate {
        name,
        level: req.level,
        status,
    };
    match state
        .sector_store
        .update_sector(&ctx, &path.mine_id, &path.sector_id, update)
        .await
    {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(ApiResponse::success(sector_to_dto(item))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除分区（级联删除分区内传感器）
pub async fn delete_sector(
    State(state): State<AppState>,
    Path(path): Path<SectorPath>,
    headers: HeaderMap,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_MINES).await
    {
        return response;
    }
    if let Err(err) = state
        .sensor_store
        .delete_sensors_of_sector(&ctx, &path.mine_id, &path.sector_id)
        .await
    {
        return storage_error(err);
    }
    match state
        .sector_store
        .delete_sector(&ctx, &path.mine_id, &path.sector_id)
        .await
    {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}
