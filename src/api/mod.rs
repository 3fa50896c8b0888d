// ==========================================
// 出勤登记系统 - API 层
// ==========================================
// 职责: 面向调用方的业务接口, 校验先于 I/O, 错误集合封闭
// ==========================================

pub mod attendance_api;
pub mod error;
pub mod plan_api;
pub mod report_api;

// 重导出核心类型
pub use attendance_api::{outcome_message, skipped_message, AttendanceApi};
pub use error::{ApiError, ApiResult};
pub use plan_api::PlanApi;
pub use report_api::{ReportApi, ReportRequest};
