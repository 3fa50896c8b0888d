// ==========================================
// 出勤登记系统 - 会员名册仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 会员登记/编辑属于外部协作方, 此处只读
// ==========================================

use crate::domain::member::Member;
use crate::domain::types::MemberType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::sync::{Arc, Mutex};

const MEMBER_COLUMNS: &str = "id, name, mobile, village, taluk, district, state, type";

// ==========================================
// MemberRepository Trait
// ==========================================
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// 按会员类型查询名册 (按姓名升序, 同名按 id)
    async fn find_by_type(&self, member_type: MemberType) -> RepositoryResult<Vec<Member>>;

    /// 按手机号查询 (最新登记在前)
    async fn find_by_mobile(&self, mobile: &str) -> RepositoryResult<Vec<Member>>;

    /// 按 id 批量查询, 顺序与 id 升序一致
    async fn find_by_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<Member>>;
}

pub(crate) fn map_member_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Member> {
    let raw_type: Option<String> = row.get(offset + 7)?;
    let member_type = raw_type
        .unwrap_or_default()
        .parse::<MemberType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(offset + 7, Type::Text, e.into()))?;

    Ok(Member {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        mobile: row.get::<_, Option<String>>(offset + 2)?.unwrap_or_default(),
        village: row.get::<_, Option<String>>(offset + 3)?.unwrap_or_default(),
        taluk: row.get::<_, Option<String>>(offset + 4)?.unwrap_or_default(),
        district: row.get::<_, Option<String>>(offset + 5)?.unwrap_or_default(),
        state: row.get::<_, Option<String>>(offset + 6)?.unwrap_or_default(),
        member_type,
    })
}

// ==========================================
// SqliteMemberRepository
// ==========================================
pub struct SqliteMemberRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMemberRepository {
    /// 从已有连接创建仓储实例
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
impl MemberRepository for SqliteMemberRepository {
    async fn find_by_type(&self, member_type: MemberType) -> RepositoryResult<Vec<Member>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM member_info WHERE type = ?1 ORDER BY name ASC, id ASC",
            MEMBER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let members = stmt
            .query_map(params![member_type.as_str()], |row| map_member_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    async fn find_by_mobile(&self, mobile: &str) -> RepositoryResult<Vec<Member>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM member_info WHERE mobile = ?1 ORDER BY created_at DESC, id DESC",
            MEMBER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let members = stmt
            .query_map(params![mobile], |row| map_member_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<Member>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM member_info WHERE id IN ({}) ORDER BY id ASC",
            MEMBER_COLUMNS, placeholders
        );
        let mut stmt = conn.prepare(&sql)?;
        let members = stmt
            .query_map(params_from_iter(ids.iter()), |row| map_member_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }
}
