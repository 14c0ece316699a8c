// ==========================================
// 教室容量分配系统 - 可用性分析引擎
// ==========================================
// 职责: 根据请求人数标出可用教室
// 输入: 教室列表 + 请求人数 + 分析模式
// 输出: 高亮集合（仅供展示，不回流到分配决策）
// 红线: 无副作用，同一输入重复分析结果一致
// ==========================================

use crate::domain::allocation::AllocationRequest;
use crate::domain::room::{CapacityConstraint, Room};
use crate::domain::types::{AnalyzeMode, RoomId};
use crate::engine::error::AllocationResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ==========================================
// HighlightSet - 高亮集合
// ==========================================
// 顺序: 目录顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSet {
    mode: Option<AnalyzeMode>,
    requested: Option<u32>, // 产生该高亮的请求人数
    room_ids: Vec<RoomId>,
}

impl HighlightSet {
    pub fn contains(&self, room_id: RoomId) -> bool {
        self.room_ids.contains(&room_id)
    }

    pub fn is_empty(&self) -> bool {
        self.room_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.room_ids.len()
    }

    pub fn room_ids(&self) -> &[RoomId] {
        &self.room_ids
    }

    pub fn mode(&self) -> Option<AnalyzeMode> {
        self.mode
    }

    pub fn requested(&self) -> Option<u32> {
        self.requested
    }
}

// ==========================================
// CapacityAnalyzer - 可用性分析
// ==========================================
pub struct CapacityAnalyzer {
    // 无状态引擎
}

impl CapacityAnalyzer {
    pub fn new() -> Self {
        Self {}
    }

    /// 分析可用教室
    ///
    /// - `ExactFit`: capacity - occupancy >= requested
    /// - `AnySpace`: capacity - occupancy > 0
    pub fn analyze(
        &self,
        rooms: &[Room],
        request: &AllocationRequest,
        mode: AnalyzeMode,
    ) -> HighlightSet {
        let requested = request.requested_count();
        let room_ids: Vec<RoomId> = rooms
            .iter()
            .filter(|room| match mode {
                AnalyzeMode::ExactFit => room.can_absorb(requested),
                AnalyzeMode::AnySpace => room.free_space() > 0,
            })
            .map(|room| room.id())
            .collect();

        debug!(
            requested,
            mode = %mode,
            matched = room_ids.len(),
            "可用性分析完成"
        );

        HighlightSet {
            mode: Some(mode),
            requested: Some(requested),
            room_ids,
        }
    }

    /// 分析输入框文本
    ///
    /// # 错误
    /// - `InvalidRequest`: 非正数或非数字，不标出任何教室
    pub fn analyze_input(
        &self,
        rooms: &[Room],
        input: &str,
        mode: AnalyzeMode,
    ) -> AllocationResult<HighlightSet> {
        let request = AllocationRequest::parse(input)?;
        Ok(self.analyze(rooms, &request, mode))
    }

    /// 剩余空位总数
    pub fn free_capacity(&self, rooms: &[Room]) -> u64 {
        rooms.iter().map(|r| r.free_space() as u64).sum()
    }
}

impl Default for CapacityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
