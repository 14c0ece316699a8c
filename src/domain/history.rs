// ==========================================
// 教室容量分配系统 - 分配历史领域模型
// ==========================================
// 红线: 只追加; 最新在前
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// HistoryAction - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryAction {
    Direct,         // 指定教室分配
    Waterfall,      // 顺序瀑布分配
    BestFit,        // 最大空位优先分配
    ManualOverride, // 人工修改人数
    SessionReseed,  // 切换场次重新播种
}

impl HistoryAction {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Direct => "Direct",
            HistoryAction::Waterfall => "Waterfall",
            HistoryAction::BestFit => "BestFit",
            HistoryAction::ManualOverride => "ManualOverride",
            HistoryAction::SessionReseed => "SessionReseed",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Direct" => Some(HistoryAction::Direct),
            "Waterfall" => Some(HistoryAction::Waterfall),
            "BestFit" => Some(HistoryAction::BestFit),
            "ManualOverride" => Some(HistoryAction::ManualOverride),
            "SessionReseed" => Some(HistoryAction::SessionReseed),
            _ => None,
        }
    }
}

// ==========================================
// HistoryEntry - 历史记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub entry_id: String,            // UUID
    pub action: HistoryAction,       // 操作类型
    pub timestamp: NaiveDateTime,    // 记录时间 (UTC)
    pub session: Option<String>,     // 所属场次
    pub summary: String,             // 明细摘要
    pub detail_json: Option<JsonValue>, // 分配明细 (JSON)
}

impl HistoryEntry {
    /// 创建新的历史记录（时间戳取当前 UTC）
    pub fn new(action: HistoryAction, summary: impl Into<String>) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            action,
            timestamp: chrono::Utc::now().naive_utc(),
            session: None,
            summary: summary.into(),
            detail_json: None,
        }
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn with_detail(mut self, detail: JsonValue) -> Self {
        self.detail_json = Some(detail);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trip_names() {
        for action in [
            HistoryAction::Direct,
            HistoryAction::Waterfall,
            HistoryAction::BestFit,
            HistoryAction::ManualOverride,
            HistoryAction::SessionReseed,
        ] {
            assert_eq!(HistoryAction::from_str(action.as_str()), Some(action));
        }
        assert_eq!(HistoryAction::from_str("Import"), None);
    }

    #[test]
    fn test_entry_builder() {
        let entry = HistoryEntry::new(HistoryAction::Direct, "DIRECT 10: G-8 CSE A+2")
            .with_session("Morning Session");
        assert_eq!(entry.session.as_deref(), Some("Morning Session"));
        assert!(!entry.entry_id.is_empty());
        assert!(entry.detail_json.is_none());
    }
}
