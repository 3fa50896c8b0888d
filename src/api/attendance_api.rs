// ==========================================
// 出勤登记系统 - 出勤登记 API
// ==========================================
// 职责: 中心按日登记、计划制批量登记、当日名册视图
// 说明: 校验在任何 I/O 之前完成
// ==========================================

use crate::api::error::{require_id, ApiError, ApiResult};
use crate::config::report_config_trait::ReportConfigReader;
use crate::domain::member::{is_valid_mobile, Member};
use crate::domain::plan::PlanResolution;
use crate::domain::report::{BatchMarkOutcome, DayRoster, DayRosterEntry, RegularMarkOutcome};
use crate::domain::types::DayStatus;
use crate::engine::batch_marker::BatchMarker;
use crate::engine::marking::{AttendanceStateMachine, MarkAction, MarkResult};
use crate::engine::plan_resolver::PlanResolver;
use crate::i18n::{t, t_with_args};
use crate::repository::member_repo::MemberRepository;
use crate::repository::namdan_attendance_repo::NamdanAttendanceRepository;
use crate::repository::plan_repo::PlanRepository;
use crate::repository::regular_attendance_repo::RegularAttendanceRepository;
use crate::repository::scope_repo::ScopeRepository;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// 批量登记中被跳过会员的提示, 无跳过时为 None
///
/// 例: "Skipped: Alice, Bob (already marked)"
pub fn skipped_message(outcome: &BatchMarkOutcome) -> Option<String> {
    if !outcome.has_conflicts() {
        return None;
    }
    let names = outcome.skipped_names().join(", ");
    Some(t_with_args(
        "attendance.skipped_already_marked",
        &[("names", names.as_str())],
    ))
}

/// 计划制提交结果的提示文本
pub fn outcome_message(outcome: &RegularMarkOutcome) -> String {
    match outcome {
        RegularMarkOutcome::NoActivePlan => t("attendance.no_active_plan"),
        RegularMarkOutcome::Marked { outcome, .. } => {
            let count = outcome.inserted.len().to_string();
            let marked = t_with_args("attendance.marked_count", &[("count", count.as_str())]);
            match skipped_message(outcome) {
                Some(skipped) => format!("{} {}", marked, skipped),
                None => marked,
            }
        }
    }
}

// ==========================================
// AttendanceApi
// ==========================================
pub struct AttendanceApi {
    members: Arc<dyn MemberRepository>,
    scopes: Arc<dyn ScopeRepository>,
    records: Arc<dyn NamdanAttendanceRepository>,
    config: Arc<dyn ReportConfigReader>,
    state_machine: AttendanceStateMachine,
    resolver: PlanResolver,
    batch_marker: BatchMarker,
}

impl AttendanceApi {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        scopes: Arc<dyn ScopeRepository>,
        records: Arc<dyn NamdanAttendanceRepository>,
        plans: Arc<dyn PlanRepository>,
        regular: Arc<dyn RegularAttendanceRepository>,
        config: Arc<dyn ReportConfigReader>,
    ) -> Self {
        Self {
            state_machine: AttendanceStateMachine::new(records.clone()),
            resolver: PlanResolver::new(plans),
            batch_marker: BatchMarker::new(members.clone(), regular),
            members,
            scopes,
            records,
            config,
        }
    }

    // ==========================================
    // 中心按日登记
    // ==========================================

    /// 登记出勤, 返回记录 id
    pub async fn mark_present(&self, member_id: i64, centre_id: i64, day: NaiveDate) -> ApiResult<String> {
        self.mark_at(member_id, centre_id, day, MarkAction::MarkPresent, Utc::now())
            .await?
            .record_id
            .ok_or_else(|| ApiError::PersistenceError("登记未返回记录 id".to_string()))
    }

    /// 登记缺勤, 返回记录 id
    pub async fn mark_absent(&self, member_id: i64, centre_id: i64, day: NaiveDate) -> ApiResult<String> {
        self.mark_at(member_id, centre_id, day, MarkAction::MarkAbsent, Utc::now())
            .await?
            .record_id
            .ok_or_else(|| ApiError::PersistenceError("登记未返回记录 id".to_string()))
    }

    /// 取消登记; 当日无记录也视为成功
    pub async fn unmark(&self, member_id: i64, centre_id: i64, day: NaiveDate) -> ApiResult<bool> {
        require_id("member_id", member_id)?;
        require_id("centre_id", centre_id)?;
        self.require_centre(centre_id).await?;
        Ok(self.state_machine.unmark(member_id, centre_id, day).await?)
    }

    /// 按动作登记, 显式传入当前时刻
    pub async fn mark_at(
        &self,
        member_id: i64,
        centre_id: i64,
        day: NaiveDate,
        action: MarkAction,
        now: DateTime<Utc>,
    ) -> ApiResult<MarkResult> {
        require_id("member_id", member_id)?;
        require_id("centre_id", centre_id)?;
        self.require_centre(centre_id).await?;
        Ok(self
            .state_machine
            .apply(member_id, centre_id, day, action, now)
            .await?)
    }

    /// 当日登记视图: 名册中每人当日状态
    pub async fn day_roster(&self, centre_id: i64, day: NaiveDate) -> ApiResult<DayRoster> {
        require_id("centre_id", centre_id)?;
        self.require_centre(centre_id).await?;

        let member_type = self.config.get_roster_member_type().await?;
        let (roster, records) = tokio::try_join!(
            self.members.find_by_type(member_type),
            self.records.find_for_day(centre_id, day),
        )?;

        // 按插入顺序, 后写覆盖先写
        let by_member: HashMap<i64, _> = records
            .into_iter()
            .map(|r| (r.member_id, r))
            .collect();

        let entries = roster
            .into_iter()
            .map(|member| {
                let record = by_member.get(&member.id);
                DayRosterEntry {
                    record_id: record.map(|r| r.id.clone()),
                    status: record
                        .map(|r| DayStatus::from(r.status))
                        .unwrap_or(DayStatus::NotFilled),
                    member,
                }
            })
            .collect();

        Ok(DayRoster {
            scope_id: centre_id,
            day,
            entries,
        })
    }

    // ==========================================
    // 计划制登记
    // ==========================================

    pub async fn active_plan(&self, access_id: i64, today: NaiveDate) -> ApiResult<PlanResolution> {
        require_id("access_id", access_id)?;
        Ok(self.resolver.resolve_for(access_id, today).await?)
    }

    /// 按手机号查找会员 (10 位数字)
    pub async fn find_members_by_mobile(&self, mobile: &str) -> ApiResult<Vec<Member>> {
        let mobile = mobile.trim();
        if !is_valid_mobile(mobile) {
            return Err(ApiError::validation(format!("手机号必须为 10 位数字: {}", mobile)));
        }
        Ok(self.members.find_by_mobile(mobile).await?)
    }

    /// 提交计划制出勤
    ///
    /// # 返回
    /// - NoActivePlan: 当日无有效计划, 未写入任何记录
    /// - Marked: 写入/跳过明细
    pub async fn submit_regular_attendance(
        &self,
        access_id: i64,
        member_ids: &[i64],
        now: NaiveDateTime,
    ) -> ApiResult<RegularMarkOutcome> {
        require_id("access_id", access_id)?;
        if member_ids.is_empty() {
            return Err(ApiError::validation("未选择任何会员"));
        }
        for id in member_ids {
            require_id("member_id", *id)?;
        }

        let plan = match self.resolver.resolve_for(access_id, now.date()).await? {
            PlanResolution::Active(plan) => plan,
            PlanResolution::NoActivePlan => {
                info!(access_id, today = %now.date(), "无有效计划, 拒绝登记");
                return Ok(RegularMarkOutcome::NoActivePlan);
            }
        };

        let outcome = self.batch_marker.mark_batch(&plan, member_ids, now).await?;
        Ok(RegularMarkOutcome::Marked {
            plan_id: plan.id,
            outcome,
        })
    }

    async fn require_centre(&self, centre_id: i64) -> ApiResult<()> {
        if self.scopes.find_centre(centre_id).await?.is_none() {
            return Err(ApiError::validation(format!("中心不存在: {}", centre_id)));
        }
        Ok(())
    }
}
