// ==========================================
// 出勤登记系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope), 缺失或格式错误时回落默认值
// ==========================================

use crate::config::report_config_trait::ReportConfigReader;
use crate::domain::types::{MemberType, PercentageBasis};
use crate::exporter::workbook::DEFAULT_MAX_COLUMN_WIDTH;
use crate::exporter::writer::ExportFormat;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式, 键有序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let config_map = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        serde_json::to_string(&json!(config_map))
            .map_err(|e| RepositoryError::InternalError(e.to_string()))
    }

    /// 读取并解析, 缺失或格式错误时使用默认值
    fn parse_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: FromStr + Display,
    {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };
        match raw.parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }
}

// ==========================================
// ReportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ReportConfigReader for ConfigManager {
    async fn get_percentage_basis(&self) -> RepositoryResult<PercentageBasis> {
        self.parse_or_default(config_keys::PERCENTAGE_BASIS, PercentageBasis::TotalDays)
    }

    async fn get_roster_member_type(&self) -> RepositoryResult<MemberType> {
        self.parse_or_default(config_keys::ROSTER_MEMBER_TYPE, MemberType::Namdan)
    }

    async fn get_max_column_width(&self) -> RepositoryResult<usize> {
        let width = self.parse_or_default(config_keys::MAX_COLUMN_WIDTH, DEFAULT_MAX_COLUMN_WIDTH)?;
        // 0 会让所有列不可见
        Ok(if width == 0 { DEFAULT_MAX_COLUMN_WIDTH } else { width })
    }

    async fn get_include_matrix(&self) -> RepositoryResult<bool> {
        self.parse_or_default(config_keys::INCLUDE_MATRIX, true)
    }

    async fn get_export_format(&self) -> RepositoryResult<ExportFormat> {
        self.parse_or_default(config_keys::EXPORT_FORMAT, ExportFormat::Xlsx)
    }

    async fn get_locale(&self) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(config_keys::LOCALE)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "en".to_string()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 报表
    pub const PERCENTAGE_BASIS: &str = "report.percentage_basis";
    pub const ROSTER_MEMBER_TYPE: &str = "report.roster_member_type";

    // 导出
    pub const MAX_COLUMN_WIDTH: &str = "export.max_column_width";
    pub const INCLUDE_MATRIX: &str = "export.include_matrix";
    pub const EXPORT_FORMAT: &str = "export.format";

    // 界面
    pub const LOCALE: &str = "ui.locale";
}
