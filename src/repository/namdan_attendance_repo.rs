// ==========================================
// 出勤登记系统 - 中心出勤记录仓储 (namdan_attendance)
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: UNIQUE(member_id, namdan_id, attendance_date),
//       登记为单条 UPSERT 语句, 不做先读后写
// ==========================================

use crate::domain::attendance::{format_instant, parse_instant, utc_day_bounds, AttendanceRecord};
use crate::domain::types::AttendanceStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// NamdanAttendanceRepository Trait
// ==========================================
#[async_trait]
pub trait NamdanAttendanceRepository: Send + Sync {
    /// 写入 (会员, 中心, occurred_at 所在 UTC 日) 的状态
    ///
    /// # 返回
    /// - 该日记录的 id (新建或已存在)
    async fn upsert_status(
        &self,
        member_id: i64,
        scope_id: i64,
        status: AttendanceStatus,
        occurred_at: DateTime<Utc>,
    ) -> RepositoryResult<String>;

    /// 删除某日记录, 返回删除行数 (0 表示原本就没有)
    async fn delete_for_day(
        &self,
        member_id: i64,
        scope_id: i64,
        day: NaiveDate,
    ) -> RepositoryResult<usize>;

    /// 查询 created_at 落在 [start, end] (含两端) 的记录, 按插入顺序
    async fn find_in_range(
        &self,
        scope_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<AttendanceRecord>>;

    /// 查询某 UTC 日的全部记录
    async fn find_for_day(
        &self,
        scope_id: i64,
        day: NaiveDate,
    ) -> RepositoryResult<Vec<AttendanceRecord>> {
        let (start, end) = utc_day_bounds(day);
        self.find_in_range(scope_id, start, end).await
    }
}

// ==========================================
// SqliteNamdanAttendanceRepository
// ==========================================
pub struct SqliteNamdanAttendanceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteNamdanAttendanceRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl NamdanAttendanceRepository for SqliteNamdanAttendanceRepository {
    async fn upsert_status(
        &self,
        member_id: i64,
        scope_id: i64,
        status: AttendanceStatus,
        occurred_at: DateTime<Utc>,
    ) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let new_id = Uuid::new_v4().to_string();
        let day = occurred_at.date_naive().format("%Y-%m-%d").to_string();

        let id: String = conn.query_row(
            r#"
            INSERT INTO namdan_attendance (
                id, member_id, namdan_id, state, created_at, attendance_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(member_id, namdan_id, attendance_date) DO UPDATE SET
                state = excluded.state
            RETURNING id
            "#,
            params![
                new_id,
                member_id,
                scope_id,
                status.as_state(),
                format_instant(&occurred_at),
                day,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    async fn delete_for_day(
        &self,
        member_id: i64,
        scope_id: i64,
        day: NaiveDate,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let (start, end) = utc_day_bounds(day);
        let affected = conn.execute(
            r#"
            DELETE FROM namdan_attendance
            WHERE member_id = ?1 AND namdan_id = ?2 AND created_at BETWEEN ?3 AND ?4
            "#,
            params![member_id, scope_id, format_instant(&start), format_instant(&end)],
        )?;
        Ok(affected)
    }

    async fn find_in_range(
        &self,
        scope_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<AttendanceRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, member_id, namdan_id, state, created_at
            FROM namdan_attendance
            WHERE namdan_id = ?1 AND created_at BETWEEN ?2 AND ?3
            ORDER BY rowid ASC
            "#,
        )?;

        let rows = stmt
            .query_map(
                params![scope_id, format_instant(&start), format_instant(&end)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<bool>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, member_id, scope_id, state, created_at)| {
                let occurred_at = parse_instant(&created_at).ok_or_else(|| {
                    RepositoryError::field("created_at", format!("无法解析时间: {}", created_at))
                })?;
                Ok(AttendanceRecord {
                    id,
                    member_id,
                    scope_id,
                    status: AttendanceStatus::from_state(state),
                    occurred_at,
                })
            })
            .collect()
    }
}
