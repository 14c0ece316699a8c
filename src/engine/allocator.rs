// ==========================================
// 教室容量分配系统 - 分配引擎
// ==========================================
// 红线: 容量约束优先; 人数只增不减; 不超过单间剩余空位
// ==========================================
// 职责: 人数驱动的教室填充
// 输入: 教室目录 + 分配请求 + 分配策略
// 输出: AllocationOutcome + 更新后的教室人数
// ==========================================

use crate::domain::allocation::{AllocationOutcome, AllocationRequest, AllocationStrategy};
use crate::domain::catalog::RoomCatalog;
use crate::domain::room::{CapacityConstraint, Room};
use crate::domain::types::RoomId;
use crate::engine::error::{AllocationError, AllocationResult};
use tracing::{debug, info, instrument, warn};

// ==========================================
// AllocationEngine - 分配引擎
// ==========================================
pub struct AllocationEngine {
    // 无状态引擎，目录由调用方持有
}

impl AllocationEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 按策略分配
    ///
    /// 规则：
    /// 1) 访问顺序由策略决定（指定教室 / 目录顺序 / 剩余空位降序）
    /// 2) 每间教室分配 min(剩余空位, 待分配人数)
    /// 3) 待分配人数归零或教室耗尽时停止
    ///
    /// # 错误
    /// - `RoomNotFound`: 指定教室/起始教室不存在（不做任何修改）
    /// - `AllocationExhausted`: 没有任何教室有空位（不做任何修改）
    #[instrument(skip(self, catalog), fields(
        strategy = %strategy,
        requested = request.requested_count(),
        rooms = catalog.len()
    ))]
    pub fn allocate(
        &self,
        catalog: &mut RoomCatalog,
        request: &AllocationRequest,
        strategy: AllocationStrategy,
    ) -> AllocationResult<AllocationOutcome> {
        let requested = request.requested_count();

        // 1. 先确定访问顺序（目录校验在任何修改之前完成）
        let order = self.visit_order(catalog, strategy)?;

        // 2. 逐间填充
        let mut outcome = AllocationOutcome::empty(strategy, requested);
        for index in order {
            if outcome.remaining == 0 {
                break;
            }
            let Some(room) = catalog.room_at_mut(index) else {
                continue;
            };

            let free = room.free_space();
            if free == 0 {
                debug!(room_id = room.id(), "教室已满，跳过");
                continue;
            }

            let amount = free.min(outcome.remaining);
            Self::assign(room, amount);
            debug!(
                room_id = room.id(),
                amount,
                occupancy = room.occupancy(),
                status = %room.status(),
                "教室分配完成"
            );
            outcome.push(room.id(), room.name(), amount);
        }

        // 3. 无任何分配 => 容量耗尽
        if outcome.assigned_total == 0 {
            warn!(requested, "无可用空位");
            return Err(AllocationError::AllocationExhausted {
                requested,
                remaining: requested,
            });
        }

        info!(
            assigned_total = outcome.assigned_total,
            remaining = outcome.remaining,
            rooms_touched = outcome.per_room_detail.len(),
            "分配完成"
        );
        Ok(outcome)
    }

    /// 指定教室分配，溢出部分以 remaining 退回
    pub fn allocate_direct(
        &self,
        catalog: &mut RoomCatalog,
        request: &AllocationRequest,
        room_id: RoomId,
    ) -> AllocationResult<AllocationOutcome> {
        self.allocate(catalog, request, AllocationStrategy::Direct { room_id })
    }

    /// 瀑布分配（从起始教室按目录顺序，不回绕）
    pub fn allocate_waterfall(
        &self,
        catalog: &mut RoomCatalog,
        request: &AllocationRequest,
        start: Option<RoomId>,
    ) -> AllocationResult<AllocationOutcome> {
        self.allocate(catalog, request, AllocationStrategy::Waterfall { start })
    }

    /// 最大空位优先分配
    pub fn allocate_best_fit(
        &self,
        catalog: &mut RoomCatalog,
        request: &AllocationRequest,
    ) -> AllocationResult<AllocationOutcome> {
        self.allocate(catalog, request, AllocationStrategy::BestFit)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 计算访问顺序（目录下标）
    fn visit_order(
        &self,
        catalog: &RoomCatalog,
        strategy: AllocationStrategy,
    ) -> AllocationResult<Vec<usize>> {
        match strategy {
            AllocationStrategy::Direct { room_id } => Ok(vec![catalog.index_of(room_id)?]),
            AllocationStrategy::Waterfall { start } => {
                let start_index = match start {
                    Some(room_id) => catalog.index_of(room_id)?,
                    None => 0,
                };
                Ok((start_index..catalog.len()).collect())
            }
            AllocationStrategy::BestFit => {
                let rooms = catalog.rooms();
                let mut order: Vec<usize> = (0..rooms.len())
                    .filter(|&i| rooms[i].free_space() > 0)
                    .collect();
                // 稳定排序: 空位相同时保持目录顺序
                order.sort_by(|&a, &b| rooms[b].free_space().cmp(&rooms[a].free_space()));
                Ok(order)
            }
        }
    }

    /// 写入分配人数（状态随 occupancy 推导）
    fn assign(room: &mut Room, amount: u32) {
        let occupancy = room.occupancy().saturating_add(amount);
        room.write_occupancy(occupancy);
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new()
    }
}
