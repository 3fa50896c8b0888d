// ==========================================
// 出勤登记系统 - 有效计划解析
// ==========================================
// 规则: valid_from <= today <= valid_to, 多个时取 created_at 最新 (同刻取 id 大者)
// 无匹配返回 NoActivePlan (合法终态, 不是错误)
// ==========================================

use crate::domain::plan::{Plan, PlanResolution};
use crate::engine::error::EngineResult;
use crate::repository::plan_repo::PlanRepository;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

/// 从候选计划中选出 today 的有效计划
pub fn resolve(candidates: &[Plan], today: NaiveDate) -> PlanResolution {
    candidates
        .iter()
        .filter(|plan| plan.covers(today))
        .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
        .cloned()
        .map(PlanResolution::Active)
        .unwrap_or(PlanResolution::NoActivePlan)
}

pub struct PlanResolver {
    plans: Arc<dyn PlanRepository>,
}

impl PlanResolver {
    pub fn new(plans: Arc<dyn PlanRepository>) -> Self {
        Self { plans }
    }

    pub async fn resolve_for(&self, access_id: i64, today: NaiveDate) -> EngineResult<PlanResolution> {
        let candidates = self.plans.find_covering(access_id, today).await?;
        let resolution = resolve(&candidates, today);
        debug!(
            access_id,
            %today,
            candidates = candidates.len(),
            active_plan = ?resolution.active().map(|p| p.id),
            "有效计划解析"
        );
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn plan(id: i64, from: NaiveDate, to: NaiveDate, created_hour: u32) -> Plan {
        Plan {
            id,
            access_id: 1,
            description: format!("plan {}", id),
            valid_from: from,
            valid_to: to,
            tags: vec!["Satsang".to_string()],
            created_at: d(1, 1).and_hms_opt(created_hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_no_candidate_is_no_active_plan() {
        assert_eq!(resolve(&[], d(3, 1)), PlanResolution::NoActivePlan);
        let expired = plan(1, d(2, 1), d(2, 28), 8);
        assert_eq!(resolve(&[expired], d(3, 1)), PlanResolution::NoActivePlan);
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let p = plan(1, d(3, 1), d(3, 5), 8);
        assert!(resolve(std::slice::from_ref(&p), d(3, 1)).active().is_some());
        assert!(resolve(std::slice::from_ref(&p), d(3, 5)).active().is_some());
    }

    #[test]
    fn test_most_recent_creation_wins() {
        let older = plan(1, d(3, 1), d(3, 31), 8);
        let newer = plan(2, d(3, 10), d(3, 20), 9);
        let resolved = resolve(&[older.clone(), newer], d(3, 15));
        assert_eq!(resolved.active().map(|p| p.id), Some(2));

        // 只有旧计划覆盖当日
        let resolved = resolve(&[older, plan(3, d(4, 1), d(4, 2), 10)], d(3, 25));
        assert_eq!(resolved.active().map(|p| p.id), Some(1));
    }
}
