// ==========================================
// 出勤登记系统 - 出勤状态机
// ==========================================
// 状态 (会员, 中心, 日):
//   Unmarked -> Present / Absent
//   Present <-> Absent (重复登记 = 原地更新)
//   Present / Absent -> Unmarked (仅中心流程, 删除记录)
// 每次调用恰好一次存储写入, 同日并发登记由存储层 UPSERT 串行化
// ==========================================

use crate::domain::attendance::mark_instant;
use crate::domain::types::{AttendanceStatus, DayStatus};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::namdan_attendance_repo::NamdanAttendanceRepository;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// 登记流程
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkFlow {
    Centre, // namdan 中心按日登记
    Plan,   // access 地点计划制登记
}

/// 单日状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayState {
    Unmarked,
    Present,
    Absent,
}

impl From<DayState> for DayStatus {
    fn from(state: DayState) -> Self {
        match state {
            DayState::Unmarked => DayStatus::NotFilled,
            DayState::Present => DayStatus::Present,
            DayState::Absent => DayStatus::Absent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkAction {
    MarkPresent,
    MarkAbsent,
    Unmark,
}

impl fmt::Display for MarkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkAction::MarkPresent => write!(f, "MARK_PRESENT"),
            MarkAction::MarkAbsent => write!(f, "MARK_ABSENT"),
            MarkAction::Unmark => write!(f, "UNMARK"),
        }
    }
}

/// 状态转换表
///
/// 目标状态只取决于动作; 起始状态不影响结果 (幂等)
pub fn transition(flow: MarkFlow, _from: DayState, action: MarkAction) -> EngineResult<DayState> {
    match (flow, action) {
        (_, MarkAction::MarkPresent) => Ok(DayState::Present),
        (_, MarkAction::MarkAbsent) => Ok(DayState::Absent),
        (MarkFlow::Centre, MarkAction::Unmark) => Ok(DayState::Unmarked),
        (MarkFlow::Plan, MarkAction::Unmark) => Err(EngineError::InvalidTransition {
            flow: format!("{:?}", flow),
            action: action.to_string(),
        }),
    }
}

/// 一次登记的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkResult {
    pub record_id: Option<String>, // Unmark 后为 None
    pub state: DayState,
}

// ==========================================
// AttendanceStateMachine - 中心出勤状态机
// ==========================================
pub struct AttendanceStateMachine {
    repo: Arc<dyn NamdanAttendanceRepository>,
}

impl AttendanceStateMachine {
    pub fn new(repo: Arc<dyn NamdanAttendanceRepository>) -> Self {
        Self { repo }
    }

    /// 登记出勤, 返回记录 id
    pub async fn mark_present(
        &self,
        member_id: i64,
        scope_id: i64,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> EngineResult<String> {
        self.write_status(member_id, scope_id, day, AttendanceStatus::Present, now)
            .await
    }

    /// 登记缺勤, 返回记录 id
    pub async fn mark_absent(
        &self,
        member_id: i64,
        scope_id: i64,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> EngineResult<String> {
        self.write_status(member_id, scope_id, day, AttendanceStatus::Absent, now)
            .await
    }

    /// 取消登记 (删除当日记录); 原本无记录也视为成功
    ///
    /// # 返回
    /// - true: 删除了记录
    /// - false: 当日本就未登记
    #[instrument(skip(self))]
    pub async fn unmark(&self, member_id: i64, scope_id: i64, day: NaiveDate) -> EngineResult<bool> {
        transition(MarkFlow::Centre, DayState::Unmarked, MarkAction::Unmark)?;
        let removed = self.repo.delete_for_day(member_id, scope_id, day).await?;
        info!(member_id, scope_id, %day, removed, "取消出勤登记");
        Ok(removed > 0)
    }

    /// 按动作统一分派
    pub async fn apply(
        &self,
        member_id: i64,
        scope_id: i64,
        day: NaiveDate,
        action: MarkAction,
        now: DateTime<Utc>,
    ) -> EngineResult<MarkResult> {
        let state = transition(MarkFlow::Centre, DayState::Unmarked, action)?;
        let record_id = match action {
            MarkAction::MarkPresent => Some(self.mark_present(member_id, scope_id, day, now).await?),
            MarkAction::MarkAbsent => Some(self.mark_absent(member_id, scope_id, day, now).await?),
            MarkAction::Unmark => {
                self.unmark(member_id, scope_id, day).await?;
                None
            }
        };
        Ok(MarkResult { record_id, state })
    }

    #[instrument(skip(self, now))]
    async fn write_status(
        &self,
        member_id: i64,
        scope_id: i64,
        day: NaiveDate,
        status: AttendanceStatus,
        now: DateTime<Utc>,
    ) -> EngineResult<String> {
        let occurred_at = mark_instant(day, now);
        let record_id = self
            .repo
            .upsert_status(member_id, scope_id, status, occurred_at)
            .await?;
        info!(member_id, scope_id, %day, %status, record_id = %record_id, "出勤登记完成");
        Ok(record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_are_idempotent_in_both_flows() {
        for flow in [MarkFlow::Centre, MarkFlow::Plan] {
            for from in [DayState::Unmarked, DayState::Present, DayState::Absent] {
                assert_eq!(transition(flow, from, MarkAction::MarkPresent).unwrap(), DayState::Present);
                assert_eq!(transition(flow, from, MarkAction::MarkAbsent).unwrap(), DayState::Absent);
            }
        }
    }

    #[test]
    fn test_unmark_only_in_centre_flow() {
        assert_eq!(
            transition(MarkFlow::Centre, DayState::Present, MarkAction::Unmark).unwrap(),
            DayState::Unmarked
        );
        let err = transition(MarkFlow::Plan, DayState::Present, MarkAction::Unmark).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn test_unmarked_maps_to_not_filled() {
        assert_eq!(DayStatus::from(DayState::Unmarked), DayStatus::NotFilled);
        assert_eq!(DayStatus::from(DayState::Absent), DayStatus::Absent);
    }
}
