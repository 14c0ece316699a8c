// ==========================================
// 教室容量分配系统 - 教室数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑; 读取顺序 = 目录顺序 (position)
// ==========================================

use crate::domain::catalog::RoomCatalog;
use crate::domain::room::Room;
use crate::domain::types::{RoomCategory, RoomId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::{Arc, Mutex};

// ==========================================
// RoomRepository - 教室仓储
// ==========================================

/// 教室仓储
/// 职责: 管理 rooms 表
pub struct RoomRepository {
    conn: Arc<Mutex<Connection>>,
}

/// 数据库原始行
struct RoomRow {
    room_id: i64,
    name: String,
    category: String,
    capacity: i64,
    occupancy: i64,
}

impl RoomRow {
    fn into_room(self) -> RepositoryResult<Room> {
        let category =
            RoomCategory::from_str(&self.category).ok_or_else(|| RepositoryError::FieldValueError {
                field: "category".to_string(),
                message: format!("未知类别: {}", self.category),
            })?;
        let room_id = u32::try_from(self.room_id).map_err(|_| RepositoryError::FieldValueError {
            field: "room_id".to_string(),
            message: format!("编号越界: {}", self.room_id),
        })?;
        let capacity = u32::try_from(self.capacity).map_err(|_| RepositoryError::FieldValueError {
            field: "capacity".to_string(),
            message: format!("容量越界: {}", self.capacity),
        })?;
        let occupancy =
            u32::try_from(self.occupancy).map_err(|_| RepositoryError::FieldValueError {
                field: "occupancy".to_string(),
                message: format!("人数越界: {}", self.occupancy),
            })?;

        Room::with_occupancy(room_id, self.name, category, capacity, occupancy).map_err(|e| {
            RepositoryError::FieldValueError {
                field: "capacity".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl RoomRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按目录顺序读取全部教室
    pub fn load_catalog(&self) -> RepositoryResult<RoomCatalog> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT room_id, name, category, capacity, occupancy
            FROM rooms
            ORDER BY position, room_id
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RoomRow {
                    room_id: row.get(0)?,
                    name: row.get(1)?,
                    category: row.get(2)?,
                    capacity: row.get(3)?,
                    occupancy: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<RoomRow>>>()?;

        let rooms = rows
            .into_iter()
            .map(RoomRow::into_room)
            .collect::<RepositoryResult<Vec<Room>>>()?;

        RoomCatalog::new(rooms).map_err(|e| RepositoryError::FieldValueError {
            field: "room_id".to_string(),
            message: e.to_string(),
        })
    }

    /// 按编号查询单间教室
    pub fn find_by_id(&self, room_id: RoomId) -> RepositoryResult<Option<Room>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT room_id, name, category, capacity, occupancy
                FROM rooms
                WHERE room_id = ?1
                "#,
                params![room_id],
                |row| {
                    Ok(RoomRow {
                        room_id: row.get(0)?,
                        name: row.get(1)?,
                        category: row.get(2)?,
                        capacity: row.get(3)?,
                        occupancy: row.get(4)?,
                    })
                },
            )
            .optional()?;

        row.map(RoomRow::into_room).transpose()
    }

    /// 批量更新人数（分配/人工修改后调用）
    ///
    /// # 返回
    /// - Ok(usize): 成功更新的记录数
    pub fn update_occupancies(&self, rooms: &[Room]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut updated = 0;
        for room in rooms {
            let affected = tx.execute(
                "UPDATE rooms SET occupancy = ?1 WHERE room_id = ?2",
                params![room.occupancy(), room.id()],
            )?;
            if affected == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "Room".to_string(),
                    id: room.id().to_string(),
                });
            }
            updated += affected;
        }

        tx.commit()?;
        Ok(updated)
    }

    /// 整体替换目录（目录导入）
    ///
    /// 单事务执行，失败时回滚，不出现半替换状态
    pub fn replace_catalog(&self, catalog: &RoomCatalog) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let inserted = write_catalog(&tx, catalog)?;
        tx.commit()?;
        Ok(inserted)
    }

    /// 整体替换目录并记录场次序号（首次播种/场次切换）
    ///
    /// 目录与场次同一事务提交
    pub fn replace_catalog_for_session(
        &self,
        catalog: &RoomCatalog,
        session_idx: usize,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let inserted = write_catalog(&tx, catalog)?;
        tx.execute(
            r#"
            INSERT INTO session_state (id, session_idx) VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET session_idx = excluded.session_idx
            "#,
            params![session_idx as i64],
        )?;
        tx.commit()?;
        Ok(inserted)
    }

    /// 已保存的场次序号（从未切换过时为 None）
    pub fn load_session_index(&self) -> RepositoryResult<Option<usize>> {
        let conn = self.get_conn()?;
        let idx: Option<i64> = conn
            .query_row("SELECT session_idx FROM session_state WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        idx.map(|v| {
            usize::try_from(v).map_err(|_| RepositoryError::FieldValueError {
                field: "session_idx".to_string(),
                message: format!("场次序号越界: {}", v),
            })
        })
        .transpose()
    }

    /// 教室数量
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn write_catalog(tx: &Transaction<'_>, catalog: &RoomCatalog) -> rusqlite::Result<usize> {
    tx.execute("DELETE FROM rooms", [])?;
    let mut inserted = 0;
    for (position, room) in catalog.rooms().iter().enumerate() {
        inserted += tx.execute(
            r#"
            INSERT INTO rooms (room_id, position, name, category, capacity, occupancy)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                room.id(),
                position as i64,
                room.name(),
                room.category().to_db_str(),
                room.capacity(),
                room.occupancy(),
            ],
        )?;
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::manual_override::ManualOverride;

    fn setup_repo() -> RoomRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        RoomRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_replace_and_load_keeps_order() {
        let repo = setup_repo();
        let catalog = RoomCatalog::default_catalog();
        assert_eq!(repo.replace_catalog(&catalog).unwrap(), 9);

        let loaded = repo.load_catalog().unwrap();
        assert_eq!(loaded, catalog);
        assert_eq!(repo.count().unwrap(), 9);
    }

    #[test]
    fn test_update_occupancies() {
        let repo = setup_repo();
        let mut catalog = RoomCatalog::default_catalog();
        repo.replace_catalog(&catalog).unwrap();

        let room = ManualOverride::new().set_occupancy(&mut catalog, 8, 100).unwrap();
        assert_eq!(repo.update_occupancies(&[room]).unwrap(), 1);

        let stored = repo.find_by_id(8).unwrap().unwrap();
        assert_eq!(stored.occupancy(), 100);
        assert!(repo.find_by_id(404).unwrap().is_none());
    }

    #[test]
    fn test_update_unknown_room_rolls_back() {
        let repo = setup_repo();
        repo.replace_catalog(&RoomCatalog::default_catalog()).unwrap();

        let ghost = Room::with_occupancy(99, "Ghost", RoomCategory::Lab, 10, 5).unwrap();
        let real = Room::with_occupancy(1, "G-8 CSE A", RoomCategory::Classroom, 72, 30).unwrap();
        let err = repo.update_occupancies(&[real, ghost]).unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(repo.find_by_id(1).unwrap().unwrap().occupancy(), 0);
    }

    #[test]
    fn test_session_index_saved_with_catalog() {
        let repo = setup_repo();
        assert_eq!(repo.load_session_index().unwrap(), None);

        repo.replace_catalog_for_session(&RoomCatalog::default_catalog(), 1)
            .unwrap();
        assert_eq!(repo.load_session_index().unwrap(), Some(1));

        repo.replace_catalog_for_session(&RoomCatalog::default_catalog(), 0)
            .unwrap();
        assert_eq!(repo.load_session_index().unwrap(), Some(0));

        // 目录导入不改变场次
        repo.replace_catalog(&RoomCatalog::default_catalog()).unwrap();
        assert_eq!(repo.load_session_index().unwrap(), Some(0));
    }

    #[test]
    fn test_anomaly_round_trips() {
        let repo = setup_repo();
        let rooms = vec![Room::with_occupancy(1, "G-8 CSE A", RoomCategory::Classroom, 72, 80).unwrap()];
        repo.replace_catalog(&RoomCatalog::new(rooms).unwrap()).unwrap();

        let loaded = repo.load_catalog().unwrap();
        assert_eq!(loaded.capacity_anomalies(), vec![1]);
    }
}
