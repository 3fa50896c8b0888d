// ==========================================
// 出勤登记系统 - 活动计划领域模型
// ==========================================
// 计划定义某 access 地点的有效日期窗口 (含两端),
// 仅在存在有效计划时允许登记计划制出勤
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 标签在 plans.tag 中的拼接分隔符
pub const TAG_SEPARATOR: &str = "-";

// ==========================================
// Plan - 活动计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,                   // 计划ID
    pub access_id: i64,            // 关联 access 地点
    pub description: String,       // 计划说明
    pub valid_from: NaiveDate,     // 生效起始日 (含)
    pub valid_to: NaiveDate,       // 生效截止日 (含)
    pub tags: Vec<String>,         // 标签 (Satsang / Rally / ...)
    pub created_at: NaiveDateTime, // 创建时间 (并列时取最新)
}

impl Plan {
    /// 判断计划窗口是否覆盖指定日期
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.valid_from <= day && day <= self.valid_to
    }
}

/// 新建计划请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlan {
    pub access_id: i64,
    pub description: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub tags: Vec<String>,
}

/// 计划列表过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFilter {
    pub access_id: Option<i64>,
    pub tags: Vec<String>,           // 任一匹配
    pub from: Option<NaiveDate>,     // valid_from >= from
    pub to: Option<NaiveDate>,       // valid_to <= to
}

// ==========================================
// PlanResolution - 有效计划解析结果
// ==========================================
// NoActivePlan 是合法终态 (当日禁止登记), 不是错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanResolution {
    Active(Plan),
    NoActivePlan,
}

impl PlanResolution {
    pub fn active(&self) -> Option<&Plan> {
        match self {
            PlanResolution::Active(plan) => Some(plan),
            PlanResolution::NoActivePlan => None,
        }
    }
}

pub fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(TAG_SEPARATOR)
}

pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_SEPARATOR)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(from: (i32, u32, u32), to: (i32, u32, u32)) -> Plan {
        Plan {
            id: 1,
            access_id: 7,
            description: "Weekly satsang".to_string(),
            valid_from: NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap(),
            valid_to: NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap(),
            tags: vec!["Satsang".to_string(), "Rally".to_string()],
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_covers_is_inclusive() {
        let p = plan((2024, 3, 1), (2024, 3, 3));
        assert!(p.covers(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(p.covers(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()));
        assert!(!p.covers(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()));
    }

    #[test]
    fn test_tags_join_and_split() {
        let tags = vec!["Satsang".to_string(), " Rally ".to_string(), "".to_string()];
        let joined = join_tags(&tags);
        assert_eq!(joined, "Satsang-Rally");
        assert_eq!(split_tags(&joined), vec!["Satsang", "Rally"]);
    }
}
