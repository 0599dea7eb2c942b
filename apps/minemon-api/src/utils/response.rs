//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数：
//! - 错误响应：auth_error, forbidden_error, last_admin_error, bad_request_error,
//!   duplicate_level_error, not_found_error, internal_auth_error, storage_error,
//!   access_error, monitor_error
//! - DTO 转换：mine_to_dto, sector_to_dto, sensor_to_dto, rbac 用户/角色,
//!   alert_to_dto, message_to_dto, audit_log_to_dto
//!
//! 设计原则：
//! - 所有错误返回统一的 ApiResponse 格式
//! - 结构性拒绝（最后管理员）与普通 403 使用不同错误码，前端可以解释原因
//! - 分区层级冲突是 422 校验失败，不是 500

use api_contract::{
    AlertDto, ApiResponse, AuditLogDto, MessageDto, MineDto, RbacRoleDto, RbacUserDto, SectorDto,
    SensorDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::SensorType;
use minemon_access::AccessError;
use minemon_auth::AuthError;
use minemon_monitoring::MonitorError;
use minemon_storage::{
    AlertRecord, AuditLogRecord, MessageRecord, MineRecord, RbacUserRecord, RoleRecord,
    SectorRecord, SensorRecord, StorageError,
};

/// 认证错误响应
pub fn auth_error(status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()>::error(
            "AUTH.UNAUTHORIZED",
            "unauthorized",
        )),
    )
        .into_response()
}

/// 禁止访问错误响应
pub fn forbidden_error() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error("AUTH.FORBIDDEN", "forbidden")),
    )
        .into_response()
}

/// 最后管理员保护：与普通 403 区分，前端据此解释"为什么"
pub fn last_admin_error() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error(
            "AUTH.LAST_ADMIN_PROTECTED",
            "the last administrator cannot be removed or demoted",
        )),
    )
        .into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 分区层级冲突：校验失败（422）
pub fn duplicate_level_error() -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::<()>::error(
            "SECTOR.DUPLICATE_LEVEL",
            "sector level already used in this mine",
        )),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// 认证内部错误响应
pub fn internal_auth_error(err: AuthError) -> Response {
    let message = err.to_string();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// 存储错误响应（可辨识冲突单独映射）
pub fn storage_error(err: StorageError) -> Response {
    match err {
        StorageError::DuplicateSectorLevel => duplicate_level_error(),
        err => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error("INTERNAL.ERROR", err.to_string())),
        )
            .into_response(),
    }
}

/// 授权能力错误响应
pub fn access_error(err: AccessError) -> Response {
    match err {
        AccessError::LastAdminProtected => {
            minemon_telemetry::record_last_admin_block();
            last_admin_error()
        }
        AccessError::UnknownPermission(code) => {
            bad_request_error(format!("unknown permission: {code}"))
        }
        AccessError::Storage(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
        )
            .into_response(),
    }
}

/// 监测链路错误响应
pub fn monitor_error(err: MonitorError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", err.to_string())),
    )
        .into_response()
}

/// MineRecord 转 MineDto
pub fn mine_to_dto(record: MineRecord) -> MineDto {
    MineDto {
        mine_id: record.mine_id,
        name: record.name,
        location: record.location,
        status: record.status,
        latitude: record.latitude,
        longitude: record.longitude,
        depth_m: record.depth_m,
    }
}

/// SectorRecord 转 SectorDto
pub fn sector_to_dto(record: SectorRecord) -> SectorDto {
    SectorDto {
        sector_id: record.sector_id,
        mine_id: record.mine_id,
        name: record.name,
        level: record.level,
        status: record.status,
    }
}

/// SensorRecord 转 SensorDto
pub fn sensor_to_dto(record: SensorRecord) -> SensorDto {
    let unit = SensorType::parse(&record.sensor_type)
        .map(|sensor_type| sensor_type.unit())
        .unwrap_or("")
        .to_string();
    SensorDto {
        sensor_id: record.sensor_id,
        mine_id: record.mine_id,
        sector_id: record.sector_id,
        sensor_type: record.sensor_type,
        unit,
        location: record.location,
        latitude: record.latitude,
        longitude: record.longitude,
        status: record.status,
        calibration_scale: record.calibration_scale,
        calibration_offset: record.calibration_offset,
        calibrated_at_ms: record.calibrated_at_ms,
        manufacturer: record.manufacturer,
        model: record.model,
        range_min: record.range_min,
        range_max: record.range_max,
    }
}

/// RbacUserRecord 转 RbacUserDto
pub fn rbac_user_to_dto(record: RbacUserRecord) -> RbacUserDto {
    RbacUserDto {
        user_id: record.user_id,
        username: record.username,
        email: record.email,
        status: record.status,
        role: record.role_code,
    }
}

/// RoleRecord 转 RbacRoleDto
pub fn role_to_dto(record: RoleRecord) -> RbacRoleDto {
    RbacRoleDto {
        role_code: record.role_code,
        name: record.name,
        permissions: record.permissions,
    }
}

/// AlertRecord 转 AlertDto
pub fn alert_to_dto(record: AlertRecord) -> AlertDto {
    AlertDto {
        alert_id: record.alert_id,
        severity: record.severity,
        message: record.message,
        location: record.location,
        mine_id: record.mine_id,
        sector_id: record.sector_id,
        sensor_id: record.sensor_id,
        raised_at_ms: record.raised_at_ms,
        acknowledged: record.acknowledged,
        acknowledged_by: record.acknowledged_by,
        acknowledged_at_ms: record.acknowledged_at_ms,
    }
}

/// MessageRecord 转 MessageDto
pub fn message_to_dto(record: MessageRecord) -> MessageDto {
    MessageDto {
        message_id: record.message_id,
        sender_id: record.sender_id,
        sender_name: record.sender_name,
        recipient_id: record.recipient_id,
        subject: record.subject,
        body: record.body,
        sent_at_ms: record.sent_at_ms,
        read: record.read,
    }
}

/// AuditLogRecord 转 AuditLogDto
pub fn audit_log_to_dto(record: AuditLogRecord) -> AuditLogDto {
    AuditLogDto {
        audit_id: record.audit_id,
        user_id: record.user_id,
        action: record.action,
        detail: record.detail,
        ts_ms: record.ts_ms,
    }
}
