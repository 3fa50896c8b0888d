// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、建表、种子数据 (会员/中心/地点/计划/配置)、故障仓储
// ==========================================
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use namdan_attendance::app::AppState;
use namdan_attendance::db::{init_schema, open_sqlite_connection};
use namdan_attendance::domain::{AttendanceRecord, Member};
use namdan_attendance::repository::{
    MemberRepository, NamdanAttendanceRepository, RepositoryError, RepositoryResult,
};
use namdan_attendance::{AttendanceStatus, MemberType};
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试连接（统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 创建测试数据库 + AppState
pub fn create_test_state() -> (NamedTempFile, String, AppState) {
    namdan_attendance::logging::init_test();
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path.clone()).expect("Failed to create AppState");
    (temp_file, db_path, state)
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("invalid date")
}

pub fn dt(y: i32, m: u32, day: u32, h: u32, min: u32) -> NaiveDateTime {
    d(y, m, day).and_hms_opt(h, min, 0).expect("invalid time")
}

// ==========================================
// 种子数据
// ==========================================

/// 插入会员, 返回 id
pub fn insert_member(conn: &Connection, name: &str, mobile: &str, member_type: &str) -> i64 {
    conn.execute(
        r#"
        INSERT INTO member_info (name, mobile, village, taluk, district, state, type)
        VALUES (?1, ?2, 'Rampur', 'Sadar', 'Jaipur', 'Rajasthan', ?3)
        "#,
        params![name, mobile, member_type],
    )
    .expect("Failed to insert member");
    conn.last_insert_rowid()
}

/// 插入会员并指定登记时间 (用于手机号查询排序)
pub fn insert_member_at(conn: &Connection, name: &str, mobile: &str, created_at: &str) -> i64 {
    conn.execute(
        r#"
        INSERT INTO member_info (name, mobile, type, created_at)
        VALUES (?1, ?2, 'GENERAL', ?3)
        "#,
        params![name, mobile, created_at],
    )
    .expect("Failed to insert member");
    conn.last_insert_rowid()
}

/// 插入 namdan 中心, 返回 centre_id
pub fn insert_centre(conn: &Connection, centre_name: &str, state: &str) -> i64 {
    conn.execute(
        r#"
        INSERT INTO namdan (centre_name, area, taluk, district, state)
        VALUES (?1, 'Area', 'Taluk', 'District', ?2)
        "#,
        params![centre_name, state],
    )
    .expect("Failed to insert centre");
    conn.last_insert_rowid()
}

/// 插入 access 地点, 返回 id
pub fn insert_location(conn: &Connection, area: &str) -> i64 {
    conn.execute(
        "INSERT INTO access (area, taluk, district, state) VALUES (?1, 'Taluk', 'District', 'State')",
        params![area],
    )
    .expect("Failed to insert location");
    conn.last_insert_rowid()
}

/// 插入计划, 返回 id
pub fn insert_plan(
    conn: &Connection,
    access_id: i64,
    from: NaiveDate,
    to: NaiveDate,
    created_at: NaiveDateTime,
) -> i64 {
    conn.execute(
        r#"
        INSERT INTO plans (access_id, plan_description, planned_from, planned_to, tag, created_at)
        VALUES (?1, 'Weekly satsang', ?2, ?3, 'Satsang', ?4)
        "#,
        params![
            access_id,
            from.format("%Y-%m-%d").to_string(),
            to.format("%Y-%m-%d").to_string(),
            created_at.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        ],
    )
    .expect("Failed to insert plan");
    conn.last_insert_rowid()
}

/// 插入计划制出勤记录
pub fn insert_regular_attendance(conn: &Connection, member_id: i64, access_id: i64, plan_id: i64, date: NaiveDate) {
    conn.execute(
        "INSERT INTO attendance (member_id, access_id, plan_id, date, time) VALUES (?1, ?2, ?3, ?4, '09:00:00')",
        params![member_id, access_id, plan_id, date.format("%Y-%m-%d").to_string()],
    )
    .expect("Failed to insert attendance");
}

/// 写入 global 配置
pub fn insert_config(conn: &Connection, key: &str, value: &str) {
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))",
        params![key, value],
    )
    .expect("Failed to insert config");
}

pub fn count_rows(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0))
        .expect("Failed to count rows")
}

// ==========================================
// 故障仓储: 每次调用都返回存储错误
// ==========================================

fn store_down() -> RepositoryError {
    RepositoryError::DatabaseQueryError("disk I/O error".to_string())
}

pub struct FailingMemberRepository;

#[async_trait]
impl MemberRepository for FailingMemberRepository {
    async fn find_by_type(&self, _member_type: MemberType) -> RepositoryResult<Vec<Member>> {
        Err(store_down())
    }

    async fn find_by_mobile(&self, _mobile: &str) -> RepositoryResult<Vec<Member>> {
        Err(store_down())
    }

    async fn find_by_ids(&self, _ids: &[i64]) -> RepositoryResult<Vec<Member>> {
        Err(store_down())
    }
}

/// 记录调用次数, 用于确认失败后没有重试
#[derive(Default)]
pub struct FailingNamdanAttendanceRepository {
    pub calls: AtomicUsize,
}

impl FailingNamdanAttendanceRepository {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> RepositoryResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(store_down())
    }
}

#[async_trait]
impl NamdanAttendanceRepository for FailingNamdanAttendanceRepository {
    async fn upsert_status(
        &self,
        _member_id: i64,
        _scope_id: i64,
        _status: AttendanceStatus,
        _occurred_at: DateTime<Utc>,
    ) -> RepositoryResult<String> {
        self.fail()
    }

    async fn delete_for_day(
        &self,
        _member_id: i64,
        _scope_id: i64,
        _day: NaiveDate,
    ) -> RepositoryResult<usize> {
        self.fail()
    }

    async fn find_in_range(
        &self,
        _scope_id: i64,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<AttendanceRecord>> {
        self.fail()
    }
}
