// ==========================================
// 教室容量分配系统 - 引擎层事件发布
// ==========================================
// 职责: 定义分配事件发布 trait，实现依赖倒置
// 说明: Engine 层定义 trait，HistoryLog / 仓储层实现
// ==========================================

use crate::domain::allocation::AllocationOutcome;
use crate::domain::history::HistoryAction;
use crate::domain::types::RoomId;
use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// 分配事件
// ==========================================

/// 分配事件
///
/// 每次成功修改教室人数后由引擎发出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AllocationEvent {
    /// 分配完成（含部分完成）
    Allocated(AllocationOutcome),
    /// 人工修改人数
    OccupancyOverridden {
        room_id: RoomId,
        room_name: String,
        previous: u32,
        current: u32,
    },
    /// 场次切换后整体重新播种
    CatalogReseeded { session: String, total_occupancy: u64 },
}

impl AllocationEvent {
    /// 对应的历史操作类型
    pub fn action(&self) -> HistoryAction {
        match self {
            AllocationEvent::Allocated(outcome) => match outcome.strategy {
                crate::domain::AllocationStrategy::Direct { .. } => HistoryAction::Direct,
                crate::domain::AllocationStrategy::Waterfall { .. } => HistoryAction::Waterfall,
                crate::domain::AllocationStrategy::BestFit => HistoryAction::BestFit,
            },
            AllocationEvent::OccupancyOverridden { .. } => HistoryAction::ManualOverride,
            AllocationEvent::CatalogReseeded { .. } => HistoryAction::SessionReseed,
        }
    }

    /// 人类可读的摘要
    pub fn summary(&self) -> String {
        match self {
            AllocationEvent::Allocated(outcome) => outcome.summary(),
            AllocationEvent::OccupancyOverridden {
                room_name,
                previous,
                current,
                ..
            } => format!("OVERRIDE {}: {} -> {}", room_name, previous, current),
            AllocationEvent::CatalogReseeded {
                session,
                total_occupancy,
            } => format!("RESEED {}: total {}", session, total_occupancy),
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 分配事件发布者 Trait
pub trait AllocationEventPublisher {
    /// 发布分配事件
    fn publish(&mut self, event: &AllocationEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要事件发布的场景（如单元测试）
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl AllocationEventPublisher for NoOpEventPublisher {
    fn publish(&mut self, event: &AllocationEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!("NoOpEventPublisher: 跳过事件发布 - {}", event.summary());
        Ok(())
    }
}
