// ==========================================
// 教室容量分配系统 - 引擎层
// ==========================================
// 职责: 风险分级、可用性分析、分配、人工修改、历史、播种
// 红线: 单线程同步执行; 引擎不持有锁，不做持久化
// ==========================================

pub mod allocator;
pub mod capacity_analyzer;
pub mod error;
pub mod events;
pub mod history_log;
pub mod manual_override;
pub mod risk;
pub mod seeding;

// 重导出核心引擎
pub use allocator::AllocationEngine;
pub use capacity_analyzer::{CapacityAnalyzer, HighlightSet};
pub use error::{AllocationError, AllocationResult};
pub use events::{AllocationEvent, AllocationEventPublisher, NoOpEventPublisher};
pub use history_log::HistoryLog;
pub use manual_override::ManualOverride;
pub use risk::RiskClassifier;
pub use seeding::{reseed_catalog, FixedSeeder, OccupancySeeder, RandomSeeder};
