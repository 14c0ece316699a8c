// ==========================================
// 教室容量分配系统 - 教室展示视图
// ==========================================
// 职责: Room -> 展示 DTO（状态、风险、空位、高亮、异常）
// 红线: 只读投影，不回写目录
// ==========================================

use crate::domain::room::{CapacityConstraint, Room};
use crate::domain::types::{RiskTier, RoomCategory, RoomId, RoomStatus};
use crate::engine::capacity_analyzer::HighlightSet;
use crate::engine::error::AllocationResult;
use crate::engine::risk::RiskClassifier;
use serde::{Deserialize, Serialize};

/// 教室展示视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomView {
    pub room_id: RoomId,
    pub name: String,
    pub category: RoomCategory,
    pub capacity: u32,
    pub occupancy: u32,
    pub status: RoomStatus,
    pub risk: RiskTier,
    pub free_space: u32,
    pub fill_ratio: f64,
    pub highlighted: bool,
    pub anomaly: bool,
}

impl RoomView {
    /// 构造展示视图
    ///
    /// # 错误
    /// - `InvalidCapacity`: capacity = 0
    pub fn project(
        room: &Room,
        classifier: &RiskClassifier,
        highlights: &HighlightSet,
    ) -> AllocationResult<Self> {
        Ok(Self {
            room_id: room.id(),
            name: room.name().to_string(),
            category: room.category(),
            capacity: room.capacity(),
            occupancy: room.occupancy(),
            status: room.status(),
            risk: classifier.classify(room)?,
            free_space: room.free_space(),
            fill_ratio: room.fill_ratio(),
            highlighted: highlights.contains(room.id()),
            anomaly: room.has_capacity_anomaly(),
        })
    }
}
