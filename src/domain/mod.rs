// ==========================================
// 教室容量分配系统 - 领域模型层
// ==========================================
// 职责: 定义教室、目录、分配请求/结果、历史记录
// 红线: 不含数据访问逻辑; 分配算法放在引擎层
// ==========================================

pub mod allocation;
pub mod catalog;
pub mod history;
pub mod room;
pub mod types;

// 重导出核心类型
pub use allocation::{
    AllocationOutcome, AllocationRequest, AllocationStrategy, OutcomeKind, RoomAssignment,
};
pub use catalog::{CategoryFilter, RoomCatalog};
pub use history::{HistoryAction, HistoryEntry};
pub use room::{CapacityConstraint, Room};
pub use types::{AnalyzeMode, RiskTier, RoomCategory, RoomId, RoomStatus};
