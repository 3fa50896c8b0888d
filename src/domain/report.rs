// ==========================================
// 出勤登记系统 - 报表领域模型
// ==========================================
// 报表行每次请求重新计算, 从不持久化
// 不变量: present + absent + not_filled == total_days == daily_attendance.len()
// ==========================================

use crate::domain::member::Member;
use crate::domain::types::{DayStatus, MemberType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// DailyStatus - 单日状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatus {
    pub date: NaiveDate,
    pub status: DayStatus,
}

// ==========================================
// MemberAttendanceSummary - 会员出勤汇总行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAttendanceSummary {
    pub member: Member,                       // 会员快照
    pub total_days: u32,                      // 区间天数
    pub present_days: u32,                    // 出勤天数
    pub absent_days: u32,                     // 缺勤天数
    pub not_filled_days: u32,                 // 未登记天数
    pub attendance_percentage: u32,           // 出勤率 (四舍五入整数)
    pub daily_attendance: Vec<DailyStatus>,   // 按日期升序
}

impl MemberAttendanceSummary {
    /// 校验计数不变量
    pub fn is_consistent(&self) -> bool {
        self.present_days + self.absent_days + self.not_filled_days == self.total_days
            && self.daily_attendance.len() == self.total_days as usize
    }
}

// ==========================================
// AttendanceReport - 区间报表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceReport {
    pub scope_id: i64,
    pub member_type: MemberType,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: Vec<NaiveDate>,                     // 区间日期序列
    pub summaries: Vec<MemberAttendanceSummary>,  // 按姓名升序
}

impl AttendanceReport {
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

// ==========================================
// DayRoster - 单日登记视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRosterEntry {
    pub member: Member,
    pub record_id: Option<String>,
    pub status: DayStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRoster {
    pub scope_id: i64,
    pub day: NaiveDate,
    pub entries: Vec<DayRosterEntry>,
}

impl DayRoster {
    pub fn present_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == DayStatus::Present)
            .count()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }
}

// ==========================================
// BatchMarkOutcome - 批量登记结果
// ==========================================
// 部分成功 (部分已登记被跳过) 是正常结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMarkOutcome {
    pub inserted: Vec<Member>,
    pub skipped: Vec<Member>,
}

impl BatchMarkOutcome {
    pub fn inserted_names(&self) -> Vec<String> {
        self.inserted.iter().map(|m| m.name.clone()).collect()
    }

    pub fn skipped_names(&self) -> Vec<String> {
        self.skipped.iter().map(|m| m.name.clone()).collect()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// 计划制出勤提交结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegularMarkOutcome {
    NoActivePlan,
    Marked { plan_id: i64, outcome: BatchMarkOutcome },
}

// ==========================================
// PlanAttendanceRow - 计划出勤导出行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanAttendanceRow {
    pub date: NaiveDate,
    pub time: chrono::NaiveTime,
    pub member: Member,
}
