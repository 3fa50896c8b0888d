// ==========================================
// 出勤登记系统 - 出勤记录领域模型
// ==========================================
// 不变量: 同一 (会员, 作用域, UTC 日历日) 至多一条记录
// 日边界: UTC [00:00:00.000, 23:59:59.999]
// ==========================================

use crate::domain::types::AttendanceStatus;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// AttendanceRecord - 中心制出勤记录 (namdan_attendance)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,                       // 记录ID (UUID)
    pub member_id: i64,                   // 会员ID
    pub scope_id: i64,                    // namdan 中心ID
    pub status: Option<AttendanceStatus>, // None = 未设置
    pub occurred_at: DateTime<Utc>,       // 登记时刻 (UTC)
}

impl AttendanceRecord {
    /// 记录所属的 UTC 日历日
    pub fn day(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}

/// 新增的计划制出勤 (attendance, 未入库)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegularAttendance {
    pub member_id: i64,
    pub access_id: i64,
    pub plan_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

// ==========================================
// 日边界工具
// ==========================================

/// 指定日历日的 UTC 边界 (含两端)
pub fn utc_day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    let end_time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    let end = Utc.from_utc_datetime(&day.and_time(end_time));
    (start, end)
}

/// 区间 [from, to] 的 UTC 边界
pub fn utc_range_bounds(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let (start, _) = utc_day_bounds(from);
    let (_, end) = utc_day_bounds(to);
    (start, end)
}

/// 登记时刻: 目标日 + 当前 UTC 时分秒
pub fn mark_instant(day: NaiveDate, now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(now.time()))
}

/// 存储格式: RFC 3339, 毫秒精度, 'Z' 结尾 (可按字典序比较)
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_day_bounds() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (start, end) = utc_day_bounds(day);
        assert_eq!(format_instant(&start), "2024-03-01T00:00:00.000Z");
        assert_eq!(format_instant(&end), "2024-03-01T23:59:59.999Z");
    }

    #[test]
    fn test_record_day_uses_utc() {
        // 印度时间 2024-03-02 01:00 (+05:30) = UTC 2024-03-01 19:30
        let local = DateTime::parse_from_rfc3339("2024-03-02T01:00:00+05:30").unwrap();
        let record = AttendanceRecord {
            id: "r1".to_string(),
            member_id: 1,
            scope_id: 1,
            status: Some(AttendanceStatus::Present),
            occurred_at: local.with_timezone(&Utc),
        };
        assert_eq!(record.day(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_instant_round_trip_text() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let now = parse_instant("2030-07-07T10:11:12.345Z").unwrap();
        let at = mark_instant(day, now);
        let text = format_instant(&at);
        assert_eq!(text, "2024-01-05T10:11:12.345Z");
        assert_eq!(parse_instant(&text), Some(at));
    }
}
