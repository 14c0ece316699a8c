// ==========================================
// 教室容量分配系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一建表（rooms / allocation_history / config_kv）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "CLASS_OPTIMA_DB_PATH";

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：foreign_keys / busy_timeout 需要“每个连接”单独配置
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

/// 默认数据库路径
///
/// 优先级: CLASS_OPTIMA_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(crate::DB_FILE_NAME);
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("class-optima");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(crate::DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}

/// 建表（幂等）
///
/// position 保存目录顺序，分配顺序依赖它
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rooms (
            room_id   INTEGER PRIMARY KEY,
            position  INTEGER NOT NULL,
            name      TEXT NOT NULL,
            category  TEXT NOT NULL,
            capacity  INTEGER NOT NULL CHECK (capacity > 0),
            occupancy INTEGER NOT NULL CHECK (occupancy >= 0)
        );

        CREATE TABLE IF NOT EXISTS allocation_history (
            entry_id    TEXT PRIMARY KEY,
            action      TEXT NOT NULL,
            recorded_at TEXT NOT NULL,
            session     TEXT,
            summary     TEXT NOT NULL,
            detail_json TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_allocation_history_recorded_at
            ON allocation_history (recorded_at DESC);

        -- 单行: 当前场次序号
        CREATE TABLE IF NOT EXISTS session_state (
            id          INTEGER PRIMARY KEY CHECK (id = 1),
            session_idx INTEGER NOT NULL CHECK (session_idx >= 0)
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key      TEXT NOT NULL,
            value    TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;

    if read_schema_version(conn)?.map_or(true, |v| v < CURRENT_SCHEMA_VERSION) {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_SCHEMA_VERSION],
        )?;
    }
    Ok(())
}

/// 读取 schema_version（若表不存在或为空则返回 None）
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

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
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
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
