// ==========================================
// 出勤登记系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为 (外键/busy_timeout)
// - 幂等建表, 唯一约束由存储层保证 "每人每日一条"
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表脚本
///
/// - namdan_attendance.attendance_date 为 created_at 的 UTC 日历日
/// - attendance 以 (member_id, plan_id) 唯一, 批量登记用 INSERT OR IGNORE
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS member_info (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    mobile      TEXT NOT NULL DEFAULT '',
    village     TEXT NOT NULL DEFAULT '',
    taluk       TEXT NOT NULL DEFAULT '',
    district    TEXT NOT NULL DEFAULT '',
    state       TEXT NOT NULL DEFAULT '',
    type        TEXT NOT NULL DEFAULT 'GENERAL',
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
CREATE INDEX IF NOT EXISTS idx_member_info_type ON member_info(type);
CREATE INDEX IF NOT EXISTS idx_member_info_mobile ON member_info(mobile);

CREATE TABLE IF NOT EXISTS access (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    area        TEXT NOT NULL,
    taluk       TEXT NOT NULL DEFAULT '',
    district    TEXT NOT NULL DEFAULT '',
    state       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS namdan (
    centre_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    centre_name TEXT NOT NULL,
    area        TEXT NOT NULL DEFAULT '',
    taluk       TEXT NOT NULL DEFAULT '',
    district    TEXT NOT NULL DEFAULT '',
    state       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS namdan_attendance (
    id              TEXT PRIMARY KEY,
    member_id       INTEGER NOT NULL REFERENCES member_info(id),
    namdan_id       INTEGER NOT NULL REFERENCES namdan(centre_id),
    state           INTEGER,
    created_at      TEXT NOT NULL,
    attendance_date TEXT NOT NULL,
    UNIQUE(member_id, namdan_id, attendance_date)
);
CREATE INDEX IF NOT EXISTS idx_namdan_attendance_scope_time
    ON namdan_attendance(namdan_id, created_at);

CREATE TABLE IF NOT EXISTS plans (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    access_id        INTEGER NOT NULL REFERENCES access(id),
    plan_description TEXT NOT NULL,
    planned_from     TEXT NOT NULL,
    planned_to       TEXT NOT NULL,
    tag              TEXT NOT NULL DEFAULT '',
    created_at       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_plans_access_window
    ON plans(access_id, planned_from, planned_to);

CREATE TABLE IF NOT EXISTS attendance (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id   INTEGER NOT NULL REFERENCES member_info(id),
    access_id   INTEGER NOT NULL REFERENCES access(id),
    plan_id     INTEGER NOT NULL REFERENCES plans(id),
    date        TEXT NOT NULL,
    time        TEXT NOT NULL,
    UNIQUE(member_id, plan_id)
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL DEFAULT 'global',
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// 幂等建表并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_unique_day_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO member_info (id, name) VALUES (1, 'A');
             INSERT INTO namdan (centre_id, centre_name) VALUES (1, 'C');
             INSERT INTO namdan_attendance VALUES ('r1', 1, 1, 1, '2024-03-01T08:00:00.000Z', '2024-03-01');",
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO namdan_attendance VALUES ('r2', 1, 1, 0, '2024-03-01T18:00:00.000Z', '2024-03-01')",
            [],
        );
        assert!(dup.is_err());
    }
}
