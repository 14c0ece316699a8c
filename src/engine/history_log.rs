// ==========================================
// 教室容量分配系统 - 分配历史日志
// ==========================================
// 红线: 只追加，最新在前; 仅供展示，不参与分配决策
// ==========================================

use crate::domain::history::{HistoryAction, HistoryEntry};
use crate::engine::events::{AllocationEvent, AllocationEventPublisher};
use std::collections::VecDeque;
use std::error::Error;

// ==========================================
// HistoryLog - 会话内历史（无淘汰策略）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    session: Option<String>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置当前场次（之后的记录带上场次名）
    pub fn set_session(&mut self, session: impl Into<String>) {
        self.session = Some(session.into());
    }

    /// 追加记录到最前
    pub fn record(&mut self, action: HistoryAction, summary: impl Into<String>) -> &HistoryEntry {
        let mut entry = HistoryEntry::new(action, summary);
        if let Some(session) = &self.session {
            entry = entry.with_session(session.clone());
        }
        self.record_entry(entry)
    }

    /// 追加已构造的记录到最前
    pub fn record_entry(&mut self, entry: HistoryEntry) -> &HistoryEntry {
        self.entries.push_front(entry);
        &self.entries[0]
    }

    /// 最新在前
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AllocationEventPublisher for HistoryLog {
    fn publish(&mut self, event: &AllocationEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut entry = HistoryEntry::new(event.action(), event.summary());
        if let Some(session) = &self.session {
            entry = entry.with_session(session.clone());
        }
        if let AllocationEvent::Allocated(outcome) = event {
            entry = entry.with_detail(serde_json::to_value(&outcome.per_room_detail)?);
        }
        self.record_entry(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::{AllocationOutcome, AllocationStrategy, RoomAssignment};

    #[test]
    fn test_newest_first() {
        let mut log = HistoryLog::new();
        log.record(HistoryAction::Direct, "first");
        log.record(HistoryAction::Waterfall, "second");

        let summaries: Vec<&str> = log.entries().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, vec!["second", "first"]);
        assert_eq!(log.latest().unwrap().action, HistoryAction::Waterfall);
    }

    #[test]
    fn test_publish_allocation_event() {
        let mut log = HistoryLog::new();
        log.set_session("Morning Session");

        let outcome = AllocationOutcome {
            strategy: AllocationStrategy::BestFit,
            requested: 4,
            assigned_total: 4,
            remaining: 0,
            per_room_detail: vec![RoomAssignment {
                room_id: 8,
                room_name: "G-13/14 Combined Lab".to_string(),
                amount: 4,
            }],
        };
        log.publish(&AllocationEvent::Allocated(outcome)).unwrap();

        let entry = log.latest().unwrap();
        assert_eq!(entry.action, HistoryAction::BestFit);
        assert_eq!(entry.session.as_deref(), Some("Morning Session"));
        assert_eq!(entry.summary, "BEST_FIT 4: G-13/14 Combined Lab+4");
        let detail = entry.detail_json.as_ref().unwrap();
        assert_eq!(detail[0]["amount"], 4);
    }
}
