// ==========================================
// 出勤登记系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一个 SQLite 连接
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{AttendanceApi, PlanApi, ReportApi};
use crate::config::config_manager::ConfigManager;
use crate::config::report_config_trait::ReportConfigReader;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::repository::{
    MemberRepository, NamdanAttendanceRepository, PlanRepository, RegularAttendanceRepository,
    ScopeRepository, SqliteMemberRepository, SqliteNamdanAttendanceRepository,
    SqlitePlanRepository, SqliteRegularAttendanceRepository, SqliteScopeRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "NAMDAN_ATTENDANCE_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 出勤登记API
    pub attendance_api: Arc<AttendanceApi>,

    /// 出勤报表API
    pub report_api: Arc<ReportApi>,

    /// 活动计划API
    pub plan_api: Arc<PlanApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径 (不存在时自动建库建表)
    ///
    /// # 返回
    /// - Ok(AppState): 初始化成功
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;
        match read_schema_version(&conn) {
            Ok(Some(v)) if v > CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    db_version = v,
                    expected = CURRENT_SCHEMA_VERSION,
                    "数据库 schema_version 高于当前程序版本"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("读取 schema_version 失败(将继续启动): {}", e),
        }

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接装配所有仓储与API
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let members: Arc<dyn MemberRepository> =
            Arc::new(SqliteMemberRepository::from_connection(conn.clone()));
        let scopes: Arc<dyn ScopeRepository> =
            Arc::new(SqliteScopeRepository::from_connection(conn.clone()));
        let records: Arc<dyn NamdanAttendanceRepository> =
            Arc::new(SqliteNamdanAttendanceRepository::from_connection(conn.clone()));
        let plans: Arc<dyn PlanRepository> =
            Arc::new(SqlitePlanRepository::from_connection(conn.clone()));
        let regular: Arc<dyn RegularAttendanceRepository> =
            Arc::new(SqliteRegularAttendanceRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config: Arc<dyn ReportConfigReader> = config_manager.clone();

        // ==========================================
        // 初始化API层
        // ==========================================
        let attendance_api = Arc::new(AttendanceApi::new(
            members.clone(),
            scopes.clone(),
            records.clone(),
            plans.clone(),
            regular.clone(),
            config.clone(),
        ));
        let report_api = Arc::new(ReportApi::new(members, scopes.clone(), records, config.clone()));
        let plan_api = Arc::new(PlanApi::new(plans, scopes, regular, config));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            config_manager,
            attendance_api,
            report_api,
            plan_api,
        })
    }

    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 NAMDAN_ATTENDANCE_DB_PATH (非空时)
/// - 否则: 用户数据目录/namdan-attendance/namdan_attendance.db
/// - 无法获取数据目录时: ./namdan_attendance.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./namdan_attendance.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("namdan-attendance");
        // 目录创建失败时回落到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("namdan_attendance.db");
        }
    }

    path.to_string_lossy().to_string()
}
