// ==========================================
// 教室容量分配系统 - 配置层
// ==========================================
// 职责: 引擎配置（风险阈值、异常测试模式、播种比例、场次、默认策略）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod engine_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use engine_config::{
    ConfigError, ConfigResult, DefaultStrategy, EngineConfig, RiskThresholds, SeedingConfig,
};
