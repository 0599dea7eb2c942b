//! 矿井 CRUD handlers
//!
//! - GET /mines - 列出矿井（view_all_mines）
//! - POST /mines - 创建矿井（manage_mines）
//! - GET /mines/{id} - 矿井详情（view_all_mines）
//! - PUT /mines/{id} - 更新矿井（manage_mines）
//! - DELETE /mines/{id} - 删除矿井并级联删除分区与传感器（manage_mines）

use crate::AppState;
use crate::middleware::{require_auth_context, require_global_permission, require_mine_scope};
use crate::utils::response::{mine_to_dto, not_found_error, storage_error};
use crate::utils::{normalize_optional, normalize_required, validate_choice};
use api_contract::{ApiResponse, CreateMineRequest, MineDto, UpdateMineRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::permissions;
use uuid::Uuid;

const MINE_STATUSES: &[&str] = &["active", "maintenance", "emergency"];

#[derive(serde::Deserialize)]
pub struct MinePath {
    pub(crate) mine_id: String,
}

/// 列出矿井
pub async fn list_mines(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) =
        require_global_permission(&state, &ctx, permissions::VIEW_ALL_MINES).await
    {
        return response;
    }
    match state.mine_store.list_mines(&ctx).await {
        Ok(items) => {
            let data: Vec<MineDto> = items.into_iter().map(mine_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建矿井
pub async fn create_mine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateMineRequest>,
) -> Response {
    let ctx = match require_auth_context(&state, &headers) {
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
    let location = match normalize_required(req.location, "location") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let status = match req.status {
        Some(status) => match validate_choice(status, "status", MINE_STATUSES) {
            Ok(value) => value,
            Err(response) => return response,
        },
        None => "active".to_string(),
    };
    let record = minemon_storage::MineRecord {
        mine_id: Uuid::new_v4().to_string(),
        name,
        location,
        status,
        latitude: req.latitude,
        longitude: req.longitude,
        depth_m: req.depth_m,
    };
    match state.mine_store.create_mine(&ctx, record).await {
        Ok(item) => (
            StatusCode::OK,
            Json(ApiResponse::success(mine_to_dto(item))),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

/// 矿井详情
pub async fn get_mine(
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
    match state.mine_store.find_mine(&ctx, &path.mine_id).await {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(ApiResponse::success(mine_to_dto(item))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 更新矿井
pub async fn update_mine(
    State(state): State<AppState>,
    Path(path): Path<MinePath>,
    headers: HeaderMap,
    Json(req): Json<UpdateMineRequest>,
) -> Response {
    let ctx = match require_mine_scope(&state, &headers, &path.mine_id).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_global_permission(&state, &ctx, permissions::MANAGE_MINES).await
    {
        return response;
    }
    let name = match normalize_optional(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let location = match normalize_optional(req.location, "location") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let status = match req.status {
        Some(status) => match validate_choice(status, "status", MINE_STATUSES) {
            Ok(value) => Some(value),
            Err(response) => return response,
        },
        None => None,
    };
    let update = minemon_storage::MineUpdate {
        name,
        location,
        status,
        latitude: req.latitude,
        longitude: req.longitude,
        depth_m: req.depth_m,
    };
    match state
        .mine_store
        .update_mine(&ctx, &path.mine_id, update)
        .await
    {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(ApiResponse::success(mine_to_dto(item))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除矿井（级联：先传感器、再分区、最后矿井）
pub async fn delete_mine(
    State(state): State<AppState>,
    Path(path): Path<MinePath>,
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
        .delete_sensors_of_mine(&ctx, &path.mine_id)
        .await
    {
        return storage_error(err);
    }
    if let Err(err) = state
        .sector_store
        .delete_sectors_of_mine(&ctx, &path.mine_id)
        .await
    {
        return storage_error(err);
    }
    match state.mine_store.delete_mine(&ctx, &path.mine_id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}
