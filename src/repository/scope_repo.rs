// ==========================================
// 出勤登记系统 - 作用域仓储 (access 地点 / namdan 中心)
// ==========================================

use crate::domain::scope::Scope;
use crate::domain::types::ScopeKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

#[async_trait]
pub trait ScopeRepository: Send + Sync {
    async fn find_location(&self, access_id: i64) -> RepositoryResult<Option<Scope>>;

    async fn find_centre(&self, centre_id: i64) -> RepositoryResult<Option<Scope>>;

    /// 全部中心, 按 state 再按 centre_name 升序
    async fn list_centres(&self) -> RepositoryResult<Vec<Scope>>;
}

fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn map_location(row: &Row<'_>) -> rusqlite::Result<Scope> {
    let area = text(row, 1)?;
    Ok(Scope {
        id: row.get(0)?,
        kind: ScopeKind::Location,
        name: area.clone(),
        area,
        taluk: text(row, 2)?,
        district: text(row, 3)?,
        state: text(row, 4)?,
    })
}

fn map_centre(row: &Row<'_>) -> rusqlite::Result<Scope> {
    Ok(Scope {
        id: row.get(0)?,
        kind: ScopeKind::Centre,
        name: text(row, 1)?,
        area: text(row, 2)?,
        taluk: text(row, 3)?,
        district: text(row, 4)?,
        state: text(row, 5)?,
    })
}

// ==========================================
// SqliteScopeRepository
// ==========================================
pub struct SqliteScopeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteScopeRepository {
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
impl ScopeRepository for SqliteScopeRepository {
    async fn find_location(&self, access_id: i64) -> RepositoryResult<Option<Scope>> {
        let conn = self.get_conn()?;
        let scope = conn
            .query_row(
                "SELECT id, area, taluk, district, state FROM access WHERE id = ?1",
                params![access_id],
                map_location,
            )
            .optional()?;
        Ok(scope)
    }

    async fn find_centre(&self, centre_id: i64) -> RepositoryResult<Option<Scope>> {
        let conn = self.get_conn()?;
        let scope = conn
            .query_row(
                r#"
                SELECT centre_id, centre_name, area, taluk, district, state
                FROM namdan WHERE centre_id = ?1
                "#,
                params![centre_id],
                map_centre,
            )
            .optional()?;
        Ok(scope)
    }

    async fn list_centres(&self) -> RepositoryResult<Vec<Scope>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT centre_id, centre_name, area, taluk, district, state
            FROM namdan
            ORDER BY state ASC, centre_name ASC, centre_id ASC
            "#,
        )?;
        let centres = stmt
            .query_map([], map_centre)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(centres)
    }
}
