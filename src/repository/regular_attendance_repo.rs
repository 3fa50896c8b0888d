// ==========================================
// 出勤登记系统 - 计划制出勤仓储 (attendance)
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: UNIQUE(member_id, plan_id)
// ==========================================

use crate::domain::attendance::NewRegularAttendance;
use crate::domain::report::PlanAttendanceRow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::member_repo::map_member_row;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

// ==========================================
// RegularAttendanceRepository Trait
// ==========================================
#[async_trait]
pub trait RegularAttendanceRepository: Send + Sync {
    /// 给定会员中, 已在该计划下登记过的会员 id
    async fn find_marked_member_ids(
        &self,
        plan_id: i64,
        member_ids: &[i64],
    ) -> RepositoryResult<HashSet<i64>>;

    /// 单事务批量写入 (INSERT OR IGNORE)
    ///
    /// # 返回
    /// - 实际写入的会员 id; 被唯一约束忽略的不在其中
    async fn insert_batch(&self, rows: &[NewRegularAttendance]) -> RepositoryResult<Vec<i64>>;

    /// 计划下全部出勤 (按 date, time 升序) 及会员信息
    async fn find_by_plan(&self, plan_id: i64) -> RepositoryResult<Vec<PlanAttendanceRow>>;
}

// ==========================================
// SqliteRegularAttendanceRepository
// ==========================================
pub struct SqliteRegularAttendanceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRegularAttendanceRepository {
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
impl RegularAttendanceRepository for SqliteRegularAttendanceRepository {
    async fn find_marked_member_ids(
        &self,
        plan_id: i64,
        member_ids: &[i64],
    ) -> RepositoryResult<HashSet<i64>> {
        if member_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let conn = self.get_conn()?;
        let placeholders = vec!["?"; member_ids.len()].join(", ");
        let sql = format!(
            "SELECT member_id FROM attendance WHERE plan_id = ? AND member_id IN ({})",
            placeholders
        );

        let mut values: Vec<Value> = Vec::with_capacity(member_ids.len() + 1);
        values.push(Value::Integer(plan_id));
        values.extend(member_ids.iter().map(|id| Value::Integer(*id)));

        let mut stmt = conn.prepare(&sql)?;
        let marked = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get::<_, i64>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(marked)
    }

    async fn insert_batch(&self, rows: &[NewRegularAttendance]) -> RepositoryResult<Vec<i64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut inserted = Vec::with_capacity(rows.len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO attendance (member_id, access_id, plan_id, date, time)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for row in rows {
                let affected = stmt.execute(params![
                    row.member_id,
                    row.access_id,
                    row.plan_id,
                    row.date.format(DATE_FORMAT).to_string(),
                    row.time.format(TIME_FORMAT).to_string(),
                ])?;
                if affected > 0 {
                    inserted.push(row.member_id);
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(inserted)
    }

    async fn find_by_plan(&self, plan_id: i64) -> RepositoryResult<Vec<PlanAttendanceRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT a.date, a.time,
                   m.id, m.name, m.mobile, m.village, m.taluk, m.district, m.state, m.type
            FROM attendance a
            JOIN member_info m ON m.id = a.member_id
            WHERE a.plan_id = ?1
            ORDER BY a.date ASC, a.time ASC, a.id ASC
            "#,
        )?;

        let rows = stmt
            .query_map(params![plan_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    map_member_row(row, 2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(date, time, member)| {
                let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
                    .map_err(|e| RepositoryError::field("date", e.to_string()))?;
                let time = NaiveTime::parse_from_str(&time, TIME_FORMAT)
                    .map_err(|e| RepositoryError::field("time", e.to_string()))?;
                Ok(PlanAttendanceRow { date, time, member })
            })
            .collect()
    }
}
