// ==========================================
// 教室容量分配系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::engine_config::{ConfigError, ConfigResult, DefaultStrategy, EngineConfig};
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const RISK_MEDIUM_THRESHOLD: &str = "risk/medium_threshold";
    pub const RISK_HIGH_THRESHOLD: &str = "risk/high_threshold";
    pub const ANOMALY_TEST_MODE: &str = "allocation/anomaly_test_mode";
    pub const SEEDING_MAX_RATIO: &str = "seeding/max_ratio";
    pub const SESSION_NAMES: &str = "session/names";
    pub const DEFAULT_STRATEGY: &str = "allocation/default_strategy";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> ConfigResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 组装引擎配置（未配置的项使用默认值），并校验
    pub fn load_engine_config(&self) -> ConfigResult<EngineConfig> {
        let mut config = EngineConfig::default();

        if let Some(v) = self.get_global_config_value(config_keys::RISK_MEDIUM_THRESHOLD)? {
            config.risk.medium = parse_f64(config_keys::RISK_MEDIUM_THRESHOLD, &v)?;
        }
        if let Some(v) = self.get_global_config_value(config_keys::RISK_HIGH_THRESHOLD)? {
            config.risk.high = parse_f64(config_keys::RISK_HIGH_THRESHOLD, &v)?;
        }
        if let Some(v) = self.get_global_config_value(config_keys::ANOMALY_TEST_MODE)? {
            config.anomaly_test_mode = parse_bool(config_keys::ANOMALY_TEST_MODE, &v)?;
        }
        if let Some(v) = self.get_global_config_value(config_keys::SEEDING_MAX_RATIO)? {
            config.seeding.max_ratio = parse_f64(config_keys::SEEDING_MAX_RATIO, &v)?;
        }
        if let Some(v) = self.get_global_config_value(config_keys::SESSION_NAMES)? {
            config.sessions = serde_json::from_str(&v)?;
        }
        if let Some(v) = self.get_global_config_value(config_keys::DEFAULT_STRATEGY)? {
            config.default_strategy =
                DefaultStrategy::from_str(&v).ok_or_else(|| ConfigError::InvalidValue {
                    key: config_keys::DEFAULT_STRATEGY.to_string(),
                    message: format!("未知策略: {}", v),
                })?;
        }

        config.validate()?;
        tracing::debug!(?config, "引擎配置加载完成");
        Ok(config)
    }
}

fn parse_f64(key: &str, raw: &str) -> ConfigResult<f64> {
    raw.trim().parse::<f64>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{} ({})", raw, e),
    })
}

fn parse_bool(key: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{} 不是布尔值", raw),
        }),
    }
}
