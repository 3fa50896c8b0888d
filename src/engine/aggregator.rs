// ==========================================
// 出勤登记系统 - 出勤汇总引擎
// ==========================================
// 流程:
// 1. 生成日期序列 (to < from 立即失败)
// 2. 并发拉取名册与区间记录 (join 后才开始折叠)
// 3. 按 member_id -> UTC 日 分组, 同日多条取插入顺序最后一条
// 4. 逐日映射 Present / Absent / NotFilled 并计数
// 红线: Engine 不拼 SQL
// ==========================================

use crate::domain::attendance::{utc_range_bounds, AttendanceRecord};
use crate::domain::member::Member;
use crate::domain::report::{AttendanceReport, DailyStatus, MemberAttendanceSummary};
use crate::domain::types::{AttendanceStatus, DayStatus, MemberType, PercentageBasis, RankMetric};
use crate::engine::cancel::CancellationToken;
use crate::engine::date_range::DateRangeGenerator;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::member_repo::MemberRepository;
use crate::repository::namdan_attendance_repo::NamdanAttendanceRepository;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 汇总请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRequest {
    pub scope_id: i64,
    pub member_type: MemberType,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub basis: PercentageBasis,
}

/// 出勤率 (四舍五入到整数百分比)
///
/// 分母为 0 时返回 0
pub fn attendance_percentage(present: u32, absent: u32, total: u32, basis: PercentageBasis) -> u32 {
    let denominator = match basis {
        PercentageBasis::TotalDays => total,
        PercentageBasis::FilledDays => present + absent,
    };
    if denominator == 0 {
        return 0;
    }
    let (p, t) = (u64::from(present), u64::from(denominator));
    ((200 * p + t) / (2 * t)) as u32
}

/// 单个会员逐日折叠
pub fn summarize_member(
    member: Member,
    days: &[NaiveDate],
    by_day: Option<&HashMap<NaiveDate, Option<AttendanceStatus>>>,
    basis: PercentageBasis,
) -> MemberAttendanceSummary {
    let daily_attendance: Vec<DailyStatus> = days
        .iter()
        .map(|day| {
            let status = match by_day.and_then(|m| m.get(day)) {
                Some(recorded) => DayStatus::from(*recorded),
                None => DayStatus::NotFilled,
            };
            DailyStatus { date: *day, status }
        })
        .collect();

    let count = |wanted: DayStatus| {
        daily_attendance
            .iter()
            .filter(|d| d.status == wanted)
            .count() as u32
    };
    let present_days = count(DayStatus::Present);
    let absent_days = count(DayStatus::Absent);
    let not_filled_days = count(DayStatus::NotFilled);
    let total_days = daily_attendance.len() as u32;

    MemberAttendanceSummary {
        member,
        total_days,
        present_days,
        absent_days,
        not_filled_days,
        attendance_percentage: attendance_percentage(present_days, absent_days, total_days, basis),
        daily_attendance,
    }
}

/// 名册 × 记录 × 日期序列 -> 汇总行 (按姓名升序, 同名按 id)
pub fn fold(
    roster: Vec<Member>,
    records: &[AttendanceRecord],
    days: &[NaiveDate],
    basis: PercentageBasis,
) -> Vec<MemberAttendanceSummary> {
    let mut grouped: HashMap<i64, HashMap<NaiveDate, Option<AttendanceStatus>>> = HashMap::new();
    for record in records {
        let day = record.day();
        let per_member = grouped.entry(record.member_id).or_default();
        if per_member.insert(day, record.status).is_some() {
            warn!(
                member_id = record.member_id,
                %day,
                record_id = %record.id,
                "同日存在多条出勤记录, 取最后一条"
            );
        }
    }

    let mut summaries: Vec<MemberAttendanceSummary> = roster
        .into_iter()
        .map(|member| {
            let by_day = grouped.get(&member.id);
            summarize_member(member, days, by_day, basis)
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.member
            .name
            .cmp(&b.member.name)
            .then(a.member.id.cmp(&b.member.id))
    });
    summaries
}

/// 按指标降序排行 (同值按姓名升序)
pub fn rank_by(summaries: &[MemberAttendanceSummary], metric: RankMetric) -> Vec<MemberAttendanceSummary> {
    let value = |s: &MemberAttendanceSummary| match metric {
        RankMetric::Present => s.present_days,
        RankMetric::Absent => s.absent_days,
        RankMetric::NotFilled => s.not_filled_days,
    };
    let mut ranked = summaries.to_vec();
    ranked.sort_by(|a, b| {
        value(b)
            .cmp(&value(a))
            .then_with(|| a.member.name.cmp(&b.member.name))
            .then(a.member.id.cmp(&b.member.id))
    });
    ranked
}

// ==========================================
// AttendanceAggregator - 区间汇总
// ==========================================
pub struct AttendanceAggregator {
    members: Arc<dyn MemberRepository>,
    records: Arc<dyn NamdanAttendanceRepository>,
}

impl AttendanceAggregator {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        records: Arc<dyn NamdanAttendanceRepository>,
    ) -> Self {
        Self { members, records }
    }

    /// 生成区间报表
    ///
    /// # 错误
    /// - InvalidRange: to < from (不触发任何查询)
    /// - Cancelled: 令牌在拉取期间或折叠后被取消
    /// - Repository: 任一拉取失败, 整体中止
    #[instrument(skip(self, token), fields(scope_id = request.scope_id, from = %request.from, to = %request.to))]
    pub async fn aggregate(
        &self,
        request: &AggregateRequest,
        token: &CancellationToken,
    ) -> EngineResult<AttendanceReport> {
        let days = DateRangeGenerator::generate(request.from, request.to)?;
        if token.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let (start, end) = utc_range_bounds(request.from, request.to);
        let fetch = async {
            tokio::try_join!(
                self.members.find_by_type(request.member_type),
                self.records.find_in_range(request.scope_id, start, end),
            )
        };

        let (roster, records) = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(EngineError::Cancelled),
            fetched = fetch => fetched?,
        };
        debug!(roster = roster.len(), records = records.len(), days = days.len(), "拉取完成");

        let summaries = fold(roster, &records, &days, request.basis);
        if token.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        info!(members = summaries.len(), "出勤汇总完成");
        Ok(AttendanceReport {
            scope_id: request.scope_id,
            member_type: request.member_type,
            from: request.from,
            to: request.to,
            days,
            summaries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn member(id: i64, name: &str) -> Member {
        Member {
            id,
            name: name.to_string(),
            mobile: format!("98765432{:02}", id),
            village: "Village".to_string(),
            taluk: String::new(),
            district: "District".to_string(),
            state: "State".to_string(),
            member_type: MemberType::Namdan,
        }
    }

    fn record(id: &str, member_id: i64, day: u32, hour: u32, status: Option<AttendanceStatus>) -> AttendanceRecord {
        AttendanceRecord {
            id: id.to_string(),
            member_id,
            scope_id: 1,
            status,
            occurred_at: Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(attendance_percentage(1, 0, 2, PercentageBasis::TotalDays), 50);
        assert_eq!(attendance_percentage(1, 0, 3, PercentageBasis::TotalDays), 33);
        assert_eq!(attendance_percentage(2, 0, 3, PercentageBasis::TotalDays), 67);
        assert_eq!(attendance_percentage(0, 0, 0, PercentageBasis::TotalDays), 0);
        assert_eq!(attendance_percentage(1, 1, 5, PercentageBasis::FilledDays), 50);
        assert_eq!(attendance_percentage(0, 0, 5, PercentageBasis::FilledDays), 0);
    }

    #[test]
    fn test_scenario_present_on_first_day_only() {
        let days = vec![d(1), d(2)];
        let roster = vec![member(1, "Xavier"), member(2, "Asha"), member(3, "Mohan")];
        let records = vec![record("r1", 1, 1, 9, Some(AttendanceStatus::Present))];

        let summaries = fold(roster, &records, &days, PercentageBasis::TotalDays);
        assert_eq!(summaries.len(), 3);

        let x = summaries.iter().find(|s| s.member.id == 1).unwrap();
        assert_eq!(x.present_days, 1);
        assert_eq!(x.absent_days, 0);
        assert_eq!(x.not_filled_days, 1);
        assert_eq!(x.total_days, 2);
        assert_eq!(x.attendance_percentage, 50);
        assert!(summaries.iter().all(|s| s.is_consistent()));
    }

    #[test]
    fn test_duplicate_same_day_records_count_once_last_wins() {
        let days = vec![d(1), d(2)];
        let records = vec![
            record("r1", 1, 1, 8, Some(AttendanceStatus::Present)),
            record("r2", 1, 1, 18, Some(AttendanceStatus::Absent)),
        ];
        let summaries = fold(vec![member(1, "A")], &records, &days, PercentageBasis::TotalDays);

        let s = &summaries[0];
        assert_eq!(s.daily_attendance.len(), 2);
        assert_eq!(s.daily_attendance[0].status, DayStatus::Absent);
        assert_eq!(s.absent_days, 1);
        assert!(s.is_consistent());
    }

    #[test]
    fn test_null_status_and_foreign_records() {
        let days = vec![d(1)];
        let records = vec![
            record("r1", 1, 1, 8, None),
            record("r2", 99, 1, 8, Some(AttendanceStatus::Present)),
        ];
        let summaries = fold(vec![member(1, "A")], &records, &days, PercentageBasis::TotalDays);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].daily_attendance[0].status, DayStatus::NotFilled);
    }

    #[test]
    fn test_sorted_by_name_then_id() {
        let days = vec![d(1)];
        let roster = vec![member(3, "Bina"), member(2, "Amar"), member(1, "Bina")];
        let summaries = fold(roster, &[], &days, PercentageBasis::TotalDays);
        let order: Vec<i64> = summaries.iter().map(|s| s.member.id).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_rank_by_metric() {
        let days = vec![d(1), d(2)];
        let records = vec![
            record("r1", 1, 1, 8, Some(AttendanceStatus::Present)),
            record("r2", 2, 1, 8, Some(AttendanceStatus::Present)),
            record("r3", 2, 2, 8, Some(AttendanceStatus::Present)),
        ];
        let summaries = fold(
            vec![member(1, "A"), member(2, "B"), member(3, "C")],
            &records,
            &days,
            PercentageBasis::TotalDays,
        );

        let by_present: Vec<i64> = rank_by(&summaries, RankMetric::Present)
            .iter()
            .map(|s| s.member.id)
            .collect();
        assert_eq!(by_present, vec![2, 1, 3]);

        let by_not_filled: Vec<i64> = rank_by(&summaries, RankMetric::NotFilled)
            .iter()
            .map(|s| s.member.id)
            .collect();
        assert_eq!(by_not_filled, vec![3, 1, 2]);
    }
}
