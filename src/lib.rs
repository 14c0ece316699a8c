// ==========================================
// 教室容量分配系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 教室人数分配与可用性分析
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 分配规则
pub mod engine;

// 导入层 - 外部目录
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 会话接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AnalyzeMode, RiskTier, RoomCategory, RoomId, RoomStatus};

// 领域实体
pub use domain::{
    AllocationOutcome, AllocationRequest, AllocationStrategy, CategoryFilter, HistoryAction,
    HistoryEntry, Room, RoomCatalog,
};

// 引擎
pub use engine::{
    AllocationEngine, AllocationError, CapacityAnalyzer, HighlightSet, HistoryLog,
    ManualOverride, RiskClassifier,
};

// API
pub use api::{AllocationApi, ApiError, CommandResult, RoomView};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "教室容量分配系统";

// 数据库文件名
pub const DB_FILE_NAME: &str = "class_optima.db";
