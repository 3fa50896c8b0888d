// ==========================================
// 出勤登记系统 - 核心库
// ==========================================
// 按日出勤登记、区间汇总报表、工作簿导出
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导出层 - 工作簿
pub mod exporter;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AttendanceStatus, DayStatus, MemberType, PercentageBasis, RankMetric, ScopeKind};

// 领域实体
pub use domain::{
    AttendanceRecord, AttendanceReport, BatchMarkOutcome, DailyStatus, DayRoster, Member,
    MemberAttendanceSummary, Plan, PlanResolution, RegularMarkOutcome, Scope,
};

// 引擎
pub use engine::{
    AttendanceAggregator, AttendanceStateMachine, BatchMarker, CancellationToken,
    DateRangeGenerator, PlanResolver, ReportSupersession,
};

// API
pub use api::{ApiError, ApiResult, AttendanceApi, PlanApi, ReportApi, ReportRequest};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Namdan Attendance";
