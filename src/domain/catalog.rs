// ==========================================
// 教室容量分配系统 - 教室目录
// ==========================================
// 红线: 目录顺序即分配顺序; 整体替换，不做逐间替换
// ==========================================

use crate::domain::room::{CapacityConstraint, Room};
use crate::domain::types::{RoomCategory, RoomId};
use crate::engine::error::{AllocationError, AllocationResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// CategoryFilter - 类别筛选
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(RoomCategory),
}

impl CategoryFilter {
    pub fn matches(&self, room: &Room) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => room.category() == *category,
        }
    }

    /// 从筛选栏文本解析（"All" 或类别名）
    pub fn from_str(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(CategoryFilter::All);
        }
        RoomCategory::from_str(s).map(CategoryFilter::Only)
    }
}

// ==========================================
// RoomCatalog - 教室目录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
}

impl RoomCatalog {
    /// 从教室列表构建目录
    ///
    /// # 错误
    /// - `DuplicateRoomId`: 编号重复
    pub fn new(rooms: Vec<Room>) -> AllocationResult<Self> {
        let mut seen = HashSet::with_capacity(rooms.len());
        for room in &rooms {
            if !seen.insert(room.id()) {
                return Err(AllocationError::DuplicateRoomId { room_id: room.id() });
            }
        }
        Ok(Self { rooms })
    }

    /// 默认目录（原部署的 9 间教室，全部为空）
    pub fn default_catalog() -> Self {
        const ROOMS: [(RoomId, &str, RoomCategory, u32); 9] = [
            (1, "G-8 CSE A", RoomCategory::Classroom, 72),
            (2, "G-9 CSE B", RoomCategory::Classroom, 72),
            (3, "G-11 CSE C", RoomCategory::Classroom, 72),
            (4, "G-12 CSE D", RoomCategory::Classroom, 72),
            (5, "G-15 CSE E", RoomCategory::Classroom, 72),
            (6, "G-16 CSE F", RoomCategory::Classroom, 72),
            (7, "G-7 AI Nexus Lab", RoomCategory::Lab, 72),
            (8, "G-13/14 Combined Lab", RoomCategory::Lab, 134),
            (9, "G-10 Seminar Hall 1", RoomCategory::SeminarHall, 90),
        ];

        let rooms = ROOMS
            .iter()
            .filter_map(|(id, name, category, capacity)| {
                Room::new(*id, *name, *category, *capacity).ok()
            })
            .collect();
        Self { rooms }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// 按编号查找
    pub fn get(&self, room_id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id() == room_id)
    }

    /// 编号对应的目录位置
    pub fn index_of(&self, room_id: RoomId) -> AllocationResult<usize> {
        self.rooms
            .iter()
            .position(|r| r.id() == room_id)
            .ok_or(AllocationError::RoomNotFound { room_id })
    }

    pub(crate) fn room_at_mut(&mut self, index: usize) -> Option<&mut Room> {
        self.rooms.get_mut(index)
    }

    /// 按类别筛选（保持目录顺序）
    pub fn filter(&self, filter: CategoryFilter) -> Vec<&Room> {
        self.rooms.iter().filter(|r| filter.matches(r)).collect()
    }

    /// 全部剩余空位
    pub fn total_free_space(&self) -> u64 {
        self.rooms.iter().map(|r| r.free_space() as u64).sum()
    }

    /// 处于容量异常的教室编号（只报告，不纠正）
    pub fn capacity_anomalies(&self) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|r| r.has_capacity_anomaly())
            .map(|r| r.id())
            .collect()
    }

    /// 整体替换目录内容
    ///
    /// 新列表先完整校验，校验失败时原目录保持不变
    pub fn replace_all(&mut self, rooms: Vec<Room>) -> AllocationResult<()> {
        let replacement = RoomCatalog::new(rooms)?;
        *self = replacement;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_shape() {
        let catalog = RoomCatalog::default_catalog();
        let capacities: Vec<u32> = catalog.rooms().iter().map(|r| r.capacity()).collect();
        assert_eq!(capacities, vec![72, 72, 72, 72, 72, 72, 72, 134, 90]);
        assert_eq!(catalog.total_free_space(), 728);
        assert_eq!(catalog.filter(CategoryFilter::Only(RoomCategory::Lab)).len(), 2);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let rooms = vec![
            Room::new(1, "A", RoomCategory::Classroom, 10).unwrap(),
            Room::new(1, "B", RoomCategory::Lab, 10).unwrap(),
        ];
        assert!(matches!(
            RoomCatalog::new(rooms),
            Err(AllocationError::DuplicateRoomId { room_id: 1 })
        ));
    }

    #[test]
    fn test_replace_all_keeps_original_on_error() {
        let mut catalog = RoomCatalog::default_catalog();
        let bad = vec![
            Room::new(3, "A", RoomCategory::Classroom, 10).unwrap(),
            Room::new(3, "B", RoomCategory::Classroom, 10).unwrap(),
        ];
        assert!(catalog.replace_all(bad).is_err());
        assert_eq!(catalog.len(), 9);
    }

    #[test]
    fn test_index_of_unknown_room() {
        let catalog = RoomCatalog::default_catalog();
        assert_eq!(catalog.index_of(8).unwrap(), 7);
        assert!(matches!(
            catalog.index_of(42),
            Err(AllocationError::RoomNotFound { room_id: 42 })
        ));
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!(CategoryFilter::from_str("All"), Some(CategoryFilter::All));
        assert_eq!(
            CategoryFilter::from_str("Seminar Hall"),
            Some(CategoryFilter::Only(RoomCategory::SeminarHall))
        );
    }
}
