// ==========================================
// 出勤登记系统 - 引擎层
// ==========================================
// 职责: 日期序列、登记状态机、计划解析、批量登记、区间汇总
// 红线: Engine 不拼 SQL
// ==========================================

pub mod aggregator;
pub mod batch_marker;
pub mod cancel;
pub mod date_range;
pub mod error;
pub mod marking;
pub mod plan_resolver;

// 重导出核心引擎
pub use aggregator::{rank_by, AggregateRequest, AttendanceAggregator};
pub use batch_marker::BatchMarker;
pub use cancel::{CancellationToken, ReportSupersession};
pub use date_range::DateRangeGenerator;
pub use error::{EngineError, EngineResult};
pub use marking::{AttendanceStateMachine, DayState, MarkAction, MarkFlow, MarkResult};
pub use plan_resolver::PlanResolver;
