// ==========================================
// 教室容量分配系统 - 人工修改人数
// ==========================================
// 红线: 默认截断到 [0, capacity]; 超容量仅在显式开启的异常测试模式下允许
// ==========================================

use crate::domain::catalog::RoomCatalog;
use crate::domain::room::{CapacityConstraint, Room};
use crate::domain::types::RoomId;
use crate::engine::error::{AllocationError, AllocationResult};
use tracing::{info, warn};

// ==========================================
// ManualOverride - 人工修改
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualOverride {
    anomaly_test_mode: bool,
}

impl ManualOverride {
    /// 常规模式（截断到容量）
    pub fn new() -> Self {
        Self {
            anomaly_test_mode: false,
        }
    }

    /// 容量异常测试模式（允许超过容量，用于验证异常检测）
    pub fn with_anomaly_test_mode() -> Self {
        Self {
            anomaly_test_mode: true,
        }
    }

    pub fn anomaly_test_mode(&self) -> bool {
        self.anomaly_test_mode
    }

    /// 设置教室人数
    ///
    /// 不依赖分析步骤的高亮集合
    ///
    /// # 返回
    /// 修改后的教室
    ///
    /// # 错误
    /// - `RoomNotFound`: 教室不存在（不做任何修改）
    pub fn set_occupancy(
        &self,
        catalog: &mut RoomCatalog,
        room_id: RoomId,
        new_value: i64,
    ) -> AllocationResult<Room> {
        let index = catalog.index_of(room_id)?;
        let room = catalog
            .room_at_mut(index)
            .ok_or(AllocationError::RoomNotFound { room_id })?;

        let occupancy = self.clamp(new_value, room.capacity());
        let previous = room.occupancy();
        room.write_occupancy(occupancy);

        if room.has_capacity_anomaly() {
            warn!(
                room_id,
                occupancy,
                capacity = room.capacity(),
                "容量异常: 人数超过容量（异常测试模式）"
            );
        }
        info!(room_id, previous, occupancy, status = %room.status(), "人工修改人数");

        Ok(room.clone())
    }

    /// 截断规则
    fn clamp(&self, new_value: i64, capacity: u32) -> u32 {
        let non_negative = new_value.max(0);
        if self.anomaly_test_mode {
            non_negative.min(u32::MAX as i64) as u32
        } else {
            non_negative.min(capacity as i64) as u32
        }
    }
}
