// ==========================================
// 教室容量分配系统 - 引擎配置对象
// ==========================================
// 存储位置: config_kv（scope_id='global'），由 ConfigManager 组装
// ==========================================

use crate::domain::allocation::AllocationStrategy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置值无效 (key={key}): {message}")]
    InvalidValue { key: String, message: String },

    #[error("配置库锁获取失败: {0}")]
    LockError(String),

    #[error("配置库访问失败: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("配置 JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 风险阈值（比例严格大于阈值才升级）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 0.6,
            high: 0.85,
        }
    }
}

/// 播种参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedingConfig {
    /// 初始人数上限占容量比例
    pub max_ratio: f64,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self { max_ratio: 0.45 }
    }
}

/// 默认拆分策略（未指定教室时使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultStrategy {
    #[default]
    Waterfall,
    BestFit,
}

impl DefaultStrategy {
    /// 从配置值解析（WATERFALL / BEST_FIT，大小写与分隔符不敏感）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "WATERFALL" => Some(DefaultStrategy::Waterfall),
            "BEST_FIT" | "BESTFIT" => Some(DefaultStrategy::BestFit),
            _ => None,
        }
    }

    /// 转换为分配策略（瀑布从目录首间开始）
    pub fn to_strategy(self) -> AllocationStrategy {
        match self {
            DefaultStrategy::Waterfall => AllocationStrategy::Waterfall { start: None },
            DefaultStrategy::BestFit => AllocationStrategy::BestFit,
        }
    }
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub risk: RiskThresholds,

    /// 容量异常测试模式（人工修改允许超过容量），默认关闭
    #[serde(default)]
    pub anomaly_test_mode: bool,

    #[serde(default)]
    pub seeding: SeedingConfig,

    /// 场次名称（切换时循环）
    #[serde(default = "default_sessions")]
    pub sessions: Vec<String>,

    #[serde(default)]
    pub default_strategy: DefaultStrategy,
}

fn default_sessions() -> Vec<String> {
    vec!["Morning Session".to_string(), "Afternoon Session".to_string()]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk: RiskThresholds::default(),
            anomaly_test_mode: false,
            seeding: SeedingConfig::default(),
            sessions: default_sessions(),
            default_strategy: DefaultStrategy::default(),
        }
    }
}

impl EngineConfig {
    /// 校验配置
    pub fn validate(&self) -> ConfigResult<()> {
        let RiskThresholds { medium, high } = self.risk;
        if !(medium > 0.0 && medium < 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "risk/medium_threshold".to_string(),
                message: format!("{} 不在 (0, 1) 区间", medium),
            });
        }
        if !(high > medium && high <= 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "risk/high_threshold".to_string(),
                message: format!("{} 必须大于 medium({}) 且不超过 1", high, medium),
            });
        }
        if !(0.0..=1.0).contains(&self.seeding.max_ratio) {
            return Err(ConfigError::InvalidValue {
                key: "seeding/max_ratio".to_string(),
                message: format!("{} 不在 [0, 1] 区间", self.seeding.max_ratio),
            });
        }
        if self.sessions.is_empty() || self.sessions.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "session/names".to_string(),
                message: "场次名称不能为空".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.anomaly_test_mode);
        assert_eq!(config.sessions.len(), 2);
        assert_eq!(
            config.default_strategy.to_strategy(),
            AllocationStrategy::Waterfall { start: None }
        );
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = EngineConfig {
            risk: RiskThresholds {
                medium: 0.9,
                high: 0.8,
            },
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "risk/high_threshold"
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"anomaly_test_mode": true}"#).unwrap();
        assert!(config.anomaly_test_mode);
        assert_eq!(config.risk, RiskThresholds::default());
        assert_eq!(config.sessions[0], "Morning Session");
    }
}
