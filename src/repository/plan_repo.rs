// ==========================================
// 出勤登记系统 - 活动计划仓储 (plans)
// ==========================================
// 红线: Repository 不含业务逻辑 (有效计划的取舍在引擎层)
// ==========================================

use crate::domain::plan::{join_tags, split_tags, NewPlan, Plan, PlanFilter};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const DATE_FORMAT: &str = "%Y-%m-%d";
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const PLAN_COLUMNS: &str =
    "id, access_id, plan_description, planned_from, planned_to, tag, created_at";

#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn insert(&self, plan: &NewPlan, created_at: NaiveDateTime) -> RepositoryResult<i64>;

    async fn find_by_id(&self, plan_id: i64) -> RepositoryResult<Option<Plan>>;

    /// 窗口覆盖 day 的全部计划 (created_at 降序)
    async fn find_covering(&self, access_id: i64, day: NaiveDate) -> RepositoryResult<Vec<Plan>>;

    /// 按条件列出计划 (created_at 降序)
    async fn list(&self, filter: &PlanFilter) -> RepositoryResult<Vec<Plan>>;
}

type PlanRow = (i64, i64, String, String, String, Option<String>, String);

fn read_plan_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlanRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_plan(raw: PlanRow) -> RepositoryResult<Plan> {
    let (id, access_id, description, from, to, tag, created_at) = raw;
    let parse_date = |field: &str, value: &str| {
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|e| RepositoryError::field(field, format!("{}: {}", value, e)))
    };

    Ok(Plan {
        id,
        access_id,
        description,
        valid_from: parse_date("planned_from", &from)?,
        valid_to: parse_date("planned_to", &to)?,
        tags: split_tags(tag.as_deref().unwrap_or_default()),
        created_at: NaiveDateTime::parse_from_str(&created_at, CREATED_AT_FORMAT)
            .map_err(|e| RepositoryError::field("created_at", format!("{}: {}", created_at, e)))?,
    })
}

// ==========================================
// SqlitePlanRepository
// ==========================================
pub struct SqlitePlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlanRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn query_plans(&self, sql: &str, values: Vec<Value>) -> RepositoryResult<Vec<Plan>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), read_plan_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(into_plan).collect()
    }
}

#[async_trait]
impl PlanRepository for SqlitePlanRepository {
    async fn insert(&self, plan: &NewPlan, created_at: NaiveDateTime) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO plans (
                access_id, plan_description, planned_from, planned_to, tag, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                plan.access_id,
                plan.description,
                plan.valid_from.format(DATE_FORMAT).to_string(),
                plan.valid_to.format(DATE_FORMAT).to_string(),
                join_tags(&plan.tags),
                created_at.format(CREATED_AT_FORMAT).to_string(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn find_by_id(&self, plan_id: i64) -> RepositoryResult<Option<Plan>> {
        let raw = {
            let conn = self.get_conn()?;
            let sql = format!("SELECT {} FROM plans WHERE id = ?1", PLAN_COLUMNS);
            conn.query_row(&sql, params![plan_id], read_plan_row)
                .optional()?
        };
        raw.map(into_plan).transpose()
    }

    async fn find_covering(&self, access_id: i64, day: NaiveDate) -> RepositoryResult<Vec<Plan>> {
        let sql = format!(
            r#"
            SELECT {} FROM plans
            WHERE access_id = ?1 AND planned_from <= ?2 AND planned_to >= ?2
            ORDER BY created_at DESC, id DESC
            "#,
            PLAN_COLUMNS
        );
        self.query_plans(
            &sql,
            vec![
                Value::Integer(access_id),
                Value::Text(day.format(DATE_FORMAT).to_string()),
            ],
        )
    }

    async fn list(&self, filter: &PlanFilter) -> RepositoryResult<Vec<Plan>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(access_id) = filter.access_id {
            conditions.push("access_id = ?".to_string());
            values.push(Value::Integer(access_id));
        }
        if let Some(from) = filter.from {
            conditions.push("planned_from >= ?".to_string());
            values.push(Value::Text(from.format(DATE_FORMAT).to_string()));
        }
        if let Some(to) = filter.to {
            conditions.push("planned_to <= ?".to_string());
            values.push(Value::Text(to.format(DATE_FORMAT).to_string()));
        }

        let tags: Vec<&str> = filter
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            let any_tag = vec!["tag LIKE ?"; tags.len()].join(" OR ");
            conditions.push(format!("({})", any_tag));
            values.extend(tags.iter().map(|t| Value::Text(format!("%{}%", t))));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM plans {} ORDER BY created_at DESC, id DESC",
            PLAN_COLUMNS, where_clause
        );
        self.query_plans(&sql, values)
    }
}
