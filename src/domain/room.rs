// ==========================================
// 教室容量分配系统 - 教室领域模型
// ==========================================
// 红线: capacity 创建后不可变; status 永远由 occupancy 推导
// ==========================================

use crate::domain::types::{RoomCategory, RoomId, RoomStatus};
use crate::engine::error::{AllocationError, AllocationResult};
use serde::{Deserialize, Serialize};

// ==========================================
// Room - 教室
// ==========================================
// 用途: 容量约束的分配目标
// 反序列化经 RoomRecord 校验 capacity > 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoomRecord")]
pub struct Room {
    id: RoomId,                 // 稳定唯一编号
    name: String,               // 展示名
    category: RoomCategory,     // 类别
    capacity: u32,              // 容量 (>0, 不可变)
    occupancy: u32,             // 当前人数 (正常 <= capacity)
}

/// 反序列化中间结构
#[derive(Deserialize)]
struct RoomRecord {
    id: RoomId,
    name: String,
    category: RoomCategory,
    capacity: u32,
    #[serde(default)]
    occupancy: u32,
}

impl TryFrom<RoomRecord> for Room {
    type Error = AllocationError;

    fn try_from(record: RoomRecord) -> AllocationResult<Self> {
        Room::with_occupancy(
            record.id,
            record.name,
            record.category,
            record.capacity,
            record.occupancy,
        )
    }
}

impl Room {
    /// 创建空教室
    ///
    /// # 错误
    /// - `InvalidCapacity`: capacity = 0 属于配置错误
    pub fn new(
        id: RoomId,
        name: impl Into<String>,
        category: RoomCategory,
        capacity: u32,
    ) -> AllocationResult<Self> {
        Self::with_occupancy(id, name, category, capacity, 0)
    }

    /// 创建带初始人数的教室（加载/导入使用）
    ///
    /// 初始人数原样保留，超过容量时即为可检测的容量异常
    pub fn with_occupancy(
        id: RoomId,
        name: impl Into<String>,
        category: RoomCategory,
        capacity: u32,
        occupancy: u32,
    ) -> AllocationResult<Self> {
        if capacity == 0 {
            return Err(AllocationError::InvalidCapacity { room_id: id });
        }
        Ok(Self {
            id,
            name: name.into(),
            category,
            capacity,
            occupancy,
        })
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> RoomCategory {
        self.category
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }

    /// 当前状态（由 occupancy/capacity 推导）
    pub fn status(&self) -> RoomStatus {
        RoomStatus::derive(self.occupancy, self.capacity)
    }

    /// 写入人数
    ///
    /// 仅限引擎内部调用，调用方负责截断策略；状态随之推导，无需单独维护
    pub(crate) fn write_occupancy(&mut self, occupancy: u32) {
        self.occupancy = occupancy;
    }
}

// ==========================================
// Trait: CapacityConstraint
// ==========================================
// 用途: 分析器与分配引擎的容量检查接口
pub trait CapacityConstraint {
    /// 剩余空位（容量异常时为 0）
    fn free_space(&self) -> u32;

    /// 单间是否可容纳全部请求
    fn can_absorb(&self, count: u32) -> bool;

    /// 是否已满
    fn is_full(&self) -> bool;

    /// 是否处于容量异常 (occupancy > capacity)
    fn has_capacity_anomaly(&self) -> bool;

    /// 占用比例
    fn fill_ratio(&self) -> f64;
}

impl CapacityConstraint for Room {
    fn free_space(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }

    fn can_absorb(&self, count: u32) -> bool {
        self.free_space() >= count
    }

    fn is_full(&self) -> bool {
        self.status() == RoomStatus::Occupied
    }

    fn has_capacity_anomaly(&self) -> bool {
        self.occupancy > self.capacity
    }

    fn fill_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.occupancy as f64 / self.capacity as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let err = Room::new(1, "G-8", RoomCategory::Classroom, 0).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidCapacity { room_id: 1 }));
    }

    #[test]
    fn test_deserialize_validates_capacity() {
        let room: Room = serde_json::from_str(
            r#"{"id":8,"name":"G-13/14 Combined Lab","category":"Lab","capacity":134,"occupancy":20}"#,
        )
        .unwrap();
        assert_eq!(room.free_space(), 114);
        assert_eq!(serde_json::from_str::<Room>(&serde_json::to_string(&room).unwrap()).unwrap(), room);

        let err = serde_json::from_str::<Room>(
            r#"{"id":3,"name":"Broken","category":"Classroom","capacity":0,"occupancy":0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("room_id=3"));
    }

    #[test]
    fn test_free_space_and_status() {
        let mut room = Room::with_occupancy(1, "G-8 CSE A", RoomCategory::Classroom, 72, 70).unwrap();
        assert_eq!(room.free_space(), 2);
        assert!(room.can_absorb(2));
        assert!(!room.can_absorb(3));
        assert_eq!(room.status(), RoomStatus::Available);

        room.write_occupancy(72);
        assert_eq!(room.free_space(), 0);
        assert!(room.is_full());
        assert!(!room.has_capacity_anomaly());
    }

    #[test]
    fn test_anomaly_is_detectable() {
        let room = Room::with_occupancy(9, "G-10 Seminar Hall 1", RoomCategory::SeminarHall, 90, 95).unwrap();
        assert!(room.has_capacity_anomaly());
        assert_eq!(room.free_space(), 0);
        assert_eq!(room.status(), RoomStatus::Occupied);
        assert!(room.fill_ratio() > 1.0);
    }
}
