// ==========================================
// 出勤登记系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod member_repo;
pub mod namdan_attendance_repo;
pub mod plan_repo;
pub mod regular_attendance_repo;
pub mod scope_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use member_repo::{MemberRepository, SqliteMemberRepository};
pub use namdan_attendance_repo::{NamdanAttendanceRepository, SqliteNamdanAttendanceRepository};
pub use plan_repo::{PlanRepository, SqlitePlanRepository};
pub use regular_attendance_repo::{RegularAttendanceRepository, SqliteRegularAttendanceRepository};
pub use scope_repo::{ScopeRepository, SqliteScopeRepository};
