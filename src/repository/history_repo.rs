// ==========================================
// 教室容量分配系统 - 分配历史数据仓储
// ==========================================
// 红线: 只插入，不更新/删除; 查询最新在前
// ==========================================

use crate::domain::history::{HistoryAction, HistoryEntry};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ==========================================
// HistoryRepository - 分配历史仓储
// ==========================================
pub struct HistoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HistoryRepository {
    /// 创建新的分配历史仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入历史记录
    ///
    /// # 返回
    /// - `Ok(entry_id)`: 成功插入
    pub fn insert(&self, entry: &HistoryEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO allocation_history (
                entry_id, action, recorded_at, session, summary, detail_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                entry.entry_id,
                entry.action.as_str(),
                entry.timestamp.format(TS_FORMAT).to_string(),
                entry.session,
                entry.summary,
                entry.detail_json.as_ref().map(|v| v.to_string()),
            ],
        )?;

        Ok(entry.entry_id.clone())
    }

    /// 最近的历史记录（最新在前）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<HistoryEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT entry_id, action, recorded_at, session, summary, detail_json
            FROM allocation_history
            ORDER BY recorded_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let raw = stmt
            .query_map(params![limit as i64], read_raw)?
            .collect::<rusqlite::Result<Vec<RawEntry>>>()?;
        raw.into_iter().map(RawEntry::into_entry).collect()
    }

    /// 按场次查询（最新在前）
    pub fn list_by_session(&self, session: &str) -> RepositoryResult<Vec<HistoryEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT entry_id, action, recorded_at, session, summary, detail_json
            FROM allocation_history
            WHERE session = ?1
            ORDER BY recorded_at DESC, rowid DESC
            "#,
        )?;

        let raw = stmt
            .query_map(params![session], read_raw)?
            .collect::<rusqlite::Result<Vec<RawEntry>>>()?;
        raw.into_iter().map(RawEntry::into_entry).collect()
    }
}

struct RawEntry {
    entry_id: String,
    action: String,
    recorded_at: String,
    session: Option<String>,
    summary: String,
    detail_json: Option<String>,
}

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok(RawEntry {
        entry_id: row.get(0)?,
        action: row.get(1)?,
        recorded_at: row.get(2)?,
        session: row.get(3)?,
        summary: row.get(4)?,
        detail_json: row.get(5)?,
    })
}

impl RawEntry {
    fn into_entry(self) -> RepositoryResult<HistoryEntry> {
        let action =
            HistoryAction::from_str(&self.action).ok_or_else(|| RepositoryError::FieldValueError {
                field: "action".to_string(),
                message: format!("未知操作类型: {}", self.action),
            })?;
        let timestamp = NaiveDateTime::parse_from_str(&self.recorded_at, TS_FORMAT).map_err(|e| {
            RepositoryError::FieldValueError {
                field: "recorded_at".to_string(),
                message: e.to_string(),
            }
        })?;
        let detail_json = match self.detail_json {
            Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| {
                RepositoryError::FieldValueError {
                    field: "detail_json".to_string(),
                    message: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(HistoryEntry {
            entry_id: self.entry_id,
            action,
            timestamp,
            session: self.session,
            summary: self.summary,
            detail_json,
        })
    }
}
