// ==========================================
// 出勤登记系统 - 计划制批量登记
// ==========================================
// 选中多人一次提交:
// 1. 已在该计划下登记过的会员 -> skipped
// 2. 其余单事务写入; 并发中被唯一约束忽略的也归入 skipped
// 部分成功是正常结果, 不是错误
// ==========================================

use crate::domain::attendance::NewRegularAttendance;
use crate::domain::member::Member;
use crate::domain::plan::Plan;
use crate::domain::report::BatchMarkOutcome;
use crate::engine::error::EngineResult;
use crate::repository::member_repo::MemberRepository;
use crate::repository::regular_attendance_repo::RegularAttendanceRepository;
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct BatchMarker {
    members: Arc<dyn MemberRepository>,
    attendance: Arc<dyn RegularAttendanceRepository>,
}

impl BatchMarker {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        attendance: Arc<dyn RegularAttendanceRepository>,
    ) -> Self {
        Self { members, attendance }
    }

    /// 为选中会员登记计划出勤
    ///
    /// # 参数
    /// - plan: 已解析的有效计划
    /// - member_ids: 选中会员 (重复 id 只处理一次)
    /// - now: 登记时刻 (写入 date/time 列)
    #[instrument(skip(self, plan, member_ids), fields(plan_id = plan.id, selected = member_ids.len()))]
    pub async fn mark_batch(
        &self,
        plan: &Plan,
        member_ids: &[i64],
        now: NaiveDateTime,
    ) -> EngineResult<BatchMarkOutcome> {
        let mut seen = HashSet::new();
        let selected: Vec<i64> = member_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let known: HashMap<i64, Member> = self
            .members
            .find_by_ids(&selected)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut ordered: Vec<Member> = Vec::with_capacity(selected.len());
        for id in &selected {
            match known.get(id) {
                Some(member) => ordered.push(member.clone()),
                None => warn!(member_id = id, "选中会员不存在, 已忽略"),
            }
        }

        let ids: Vec<i64> = ordered.iter().map(|m| m.id).collect();
        let already = self.attendance.find_marked_member_ids(plan.id, &ids).await?;

        let (skipped, pending): (Vec<Member>, Vec<Member>) =
            ordered.into_iter().partition(|m| already.contains(&m.id));

        let rows: Vec<NewRegularAttendance> = pending
            .iter()
            .map(|m| NewRegularAttendance {
                member_id: m.id,
                access_id: plan.access_id,
                plan_id: plan.id,
                date: now.date(),
                time: now.time(),
            })
            .collect();

        let written: HashSet<i64> = self
            .attendance
            .insert_batch(&rows)
            .await?
            .into_iter()
            .collect();

        let mut outcome = BatchMarkOutcome {
            inserted: Vec::with_capacity(pending.len()),
            skipped,
        };
        for member in pending {
            if written.contains(&member.id) {
                outcome.inserted.push(member);
            } else {
                // 读取与写入之间被并发登记
                outcome.skipped.push(member);
            }
        }

        info!(
            inserted = outcome.inserted.len(),
            skipped = outcome.skipped.len(),
            "批量登记完成"
        );
        Ok(outcome)
    }
}
