// ==========================================
// 出勤登记系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod attendance;
pub mod member;
pub mod plan;
pub mod report;
pub mod scope;
pub mod types;

// 重导出核心类型
pub use attendance::{AttendanceRecord, NewRegularAttendance};
pub use member::Member;
pub use plan::{NewPlan, Plan, PlanFilter, PlanResolution};
pub use report::{
    AttendanceReport, BatchMarkOutcome, DailyStatus, DayRoster, DayRosterEntry,
    MemberAttendanceSummary, PlanAttendanceRow, RegularMarkOutcome,
};
pub use scope::Scope;
pub use types::{AttendanceStatus, DayStatus, MemberType, PercentageBasis, RankMetric, ScopeKind};
