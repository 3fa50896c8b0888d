// ==========================================
// 出勤登记系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 会员类型 (Member Type)
// ==========================================
// member_info.type 判别列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberType {
    General, // 普通会员
    Namdan,  // 已受 namdan 的会员
}

impl MemberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::General => "GENERAL",
            MemberType::Namdan => "NAMDAN",
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            // 历史数据中 type 为空的按 GENERAL 处理
            "" | "GENERAL" => Ok(MemberType::General),
            "NAMDAN" => Ok(MemberType::Namdan),
            other => Err(format!("未知会员类型: {}", other)),
        }
    }
}

// ==========================================
// 作用域类型 (Scope Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeKind {
    Location, // 固定 access 地点 (计划制出勤)
    Centre,   // namdan 中心 (按日出勤)
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Location => write!(f, "LOCATION"),
            ScopeKind::Centre => write!(f, "CENTRE"),
        }
    }
}

// ==========================================
// 出勤状态 (持久化)
// ==========================================
// 对应 namdan_attendance.state: true / false; NULL 表示未设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn from_state(state: Option<bool>) -> Option<Self> {
        state.map(|present| {
            if present {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Absent
            }
        })
    }

    pub fn as_state(&self) -> bool {
        matches!(self, AttendanceStatus::Present)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "PRESENT"),
            AttendanceStatus::Absent => write!(f, "ABSENT"),
        }
    }
}

// ==========================================
// 日状态 (派生, 不持久化)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    Present,
    Absent,
    NotFilled,
}

impl DayStatus {
    /// 矩阵报表单元格代码
    pub fn code(&self) -> &'static str {
        match self {
            DayStatus::Present => "P",
            DayStatus::Absent => "A",
            DayStatus::NotFilled => "NF",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayStatus::Present => "Present",
            DayStatus::Absent => "Absent",
            DayStatus::NotFilled => "Not Filled",
        }
    }
}

impl From<Option<AttendanceStatus>> for DayStatus {
    fn from(status: Option<AttendanceStatus>) -> Self {
        match status {
            Some(AttendanceStatus::Present) => DayStatus::Present,
            Some(AttendanceStatus::Absent) => DayStatus::Absent,
            None => DayStatus::NotFilled,
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 出勤率口径 (Percentage Basis)
// ==========================================
// TOTAL_DAYS 为标准口径; FILLED_DAYS 仅在配置显式开启时使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PercentageBasis {
    #[default]
    TotalDays,  // present / total_days
    FilledDays, // present / (present + absent)
}

impl FromStr for PercentageBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TOTAL_DAYS" => Ok(PercentageBasis::TotalDays),
            "FILLED_DAYS" => Ok(PercentageBasis::FilledDays),
            other => Err(format!("未知出勤率口径: {}", other)),
        }
    }
}

impl fmt::Display for PercentageBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentageBasis::TotalDays => write!(f, "TOTAL_DAYS"),
            PercentageBasis::FilledDays => write!(f, "FILLED_DAYS"),
        }
    }
}

// ==========================================
// 排行指标 (Rank Metric)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankMetric {
    Present,
    Absent,
    NotFilled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_type_parse() {
        assert_eq!("NAMDAN".parse::<MemberType>().unwrap(), MemberType::Namdan);
        assert_eq!("namdan".parse::<MemberType>().unwrap(), MemberType::Namdan);
        assert_eq!("".parse::<MemberType>().unwrap(), MemberType::General);
        assert!("VIP".parse::<MemberType>().is_err());
    }

    #[test]
    fn test_day_status_codes() {
        assert_eq!(DayStatus::Present.code(), "P");
        assert_eq!(DayStatus::Absent.code(), "A");
        assert_eq!(DayStatus::NotFilled.code(), "NF");
    }

    #[test]
    fn test_null_state_is_not_filled() {
        assert_eq!(DayStatus::from(AttendanceStatus::from_state(None)), DayStatus::NotFilled);
        assert_eq!(
            DayStatus::from(AttendanceStatus::from_state(Some(false))),
            DayStatus::Absent
        );
    }

    #[test]
    fn test_percentage_basis_default() {
        assert_eq!(PercentageBasis::default(), PercentageBasis::TotalDays);
        assert_eq!(
            "filled_days".parse::<PercentageBasis>().unwrap(),
            PercentageBasis::FilledDays
        );
    }
}
