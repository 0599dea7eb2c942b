//! 权限词汇表与作用域。
//!
//! 权限码分两个互不相交的命名空间：
//! - 全局权限：随角色授予，作用于整个系统
//! - 分区权限：随 SectorAccess 覆盖授予，只作用于指定 (矿井, 分区)
//!
//! 部分全局权限隐含分区内的可见性（见 implied_sector_permissions）。
//! 权限判定一律在读取时从角色 + 覆盖推导，任何地方不落盘用户级权限副本。

/// 管理员角色码（最后一名持有者受结构性保护）。
pub const ROLE_ADMIN: &str = "admin";

// ---- 全局权限 ----

pub const VIEW_ALL_MINES: &str = "view_all_mines";
pub const MANAGE_MINES: &str = "manage_mines";
pub const MANAGE_USERS: &str = "manage_users";
pub const VIEW_SENSORS: &str = "view_sensors";
pub const MANAGE_SENSORS: &str = "manage_sensors";
pub const VIEW_ALERTS: &str = "view_alerts";
pub const MANAGE_ALERTS: &str = "manage_alerts";
pub const VIEW_REPORTS: &str = "view_reports";
pub const ACCESS_MESSAGING: &str = "access_messaging";
// 保留原系统的拼写，改掉会破坏已有前端与数据。
pub const VIEW_PREDECTIVE_DATA: &str = "view_predective_data";

// ---- 分区权限 ----

pub const VIEW_SECTOR: &str = "view_sector";
pub const MANAGE_SECTOR: &str = "manage_sector";
pub const VIEW_SECTOR_SENSORS: &str = "view_sector_sensors";
pub const MANAGE_SECTOR_SENSORS: &str = "manage_sector_sensors";
pub const VIEW_SECTOR_ALERTS: &str = "view_sector_alerts";
pub const MANAGE_SECTOR_ALERTS: &str = "manage_sector_alerts";
pub const VIEW_SECTOR_REPORTS: &str = "view_sector_reports";

/// 全局权限码清单。
pub const GLOBAL_PERMISSION_CODES: &[&str] = &[
    VIEW_ALL_MINES,
    MANAGE_MINES,
    MANAGE_USERS,
    VIEW_SENSORS,
    MANAGE_SENSORS,
    VIEW_ALERTS,
    MANAGE_ALERTS,
    VIEW_REPORTS,
    ACCESS_MESSAGING,
    VIEW_PREDECTIVE_DATA,
];

/// 分区权限码清单。
pub const SECTOR_PERMISSION_CODES: &[&str] = &[
    VIEW_SECTOR,
    MANAGE_SECTOR,
    VIEW_SECTOR_SENSORS,
    MANAGE_SECTOR_SENSORS,
    VIEW_SECTOR_ALERTS,
    MANAGE_SECTOR_ALERTS,
    VIEW_SECTOR_REPORTS,
];

/// 是否为已知全局权限码。
pub fn is_global_permission(code: &str) -> bool {
    GLOBAL_PERMISSION_CODES.contains(&code)
}

/// 是否为已知分区权限码。
pub fn is_sector_permission(code: &str) -> bool {
    SECTOR_PERMISSION_CODES.contains(&code)
}

/// 全局权限隐含的分区权限（固定映射）。
///
/// 拿到映射结果即认为该用户在所有分区内持有这些分区权限。
pub fn implied_sector_permissions(global_code: &str) -> &'static [&'static str] {
    match global_code {
        VIEW_ALL_MINES => &[
            VIEW_SECTOR,
            VIEW_SECTOR_SENSORS,
            VIEW_SECTOR_ALERTS,
            VIEW_SECTOR_REPORTS,
        ],
        MANAGE_MINES => &[VIEW_SECTOR, MANAGE_SECTOR],
        VIEW_SENSORS => &[VIEW_SECTOR_SENSORS],
        MANAGE_SENSORS => &[VIEW_SECTOR_SENSORS, MANAGE_SECTOR_SENSORS],
        VIEW_ALERTS => &[VIEW_SECTOR_ALERTS],
        MANAGE_ALERTS => &[VIEW_SECTOR_ALERTS, MANAGE_SECTOR_ALERTS],
        VIEW_REPORTS => &[VIEW_SECTOR_REPORTS],
        _ => &[],
    }
}

/// 权限码的人读描述（权限目录接口使用）。
pub fn describe(code: &str) -> &'static str {
    match code {
        VIEW_ALL_MINES => "view every mine and its sectors",
        MANAGE_MINES => "create and edit mines and their sectors",
        MANAGE_USERS => "manage users, roles and sector access",
        VIEW_SENSORS => "view sensors across mines",
        MANAGE_SENSORS => "create and edit sensors across mines",
        VIEW_ALERTS => "view alerts across mines",
        MANAGE_ALERTS => "acknowledge and manage alerts across mines",
        VIEW_REPORTS => "view report summaries",
        ACCESS_MESSAGING => "use the internal messaging inbox",
        VIEW_PREDECTIVE_DATA => "view predictive analysis data",
        VIEW_SECTOR => "view a granted sector",
        MANAGE_SECTOR => "manage a granted sector",
        VIEW_SECTOR_SENSORS => "view sensors in a granted sector",
        MANAGE_SECTOR_SENSORS => "manage sensors in a granted sector",
        VIEW_SECTOR_ALERTS => "view alerts in a granted sector",
        MANAGE_SECTOR_ALERTS => "acknowledge alerts in a granted sector",
        VIEW_SECTOR_REPORTS => "view reports for a granted sector",
        _ => "unknown permission",
    }
}

/// 权限判定作用域：全局或某个具体 (矿井, 分区)。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Sector { mine_id: String, sector_id: String },
}

impl Scope {
    pub fn sector(mine_id: impl Into<String>, sector_id: impl Into<String>) -> Self {
        Scope::Sector {
            mine_id: mine_id.into(),
            sector_id: sector_id.into(),
        }
    }
}
