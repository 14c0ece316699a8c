// ==========================================
// 教室容量分配系统 - 分配请求与结果
// ==========================================

use crate::domain::types::{AnalyzeMode, RoomId};
use crate::engine::error::{AllocationError, AllocationResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// AllocationRequest - 分配请求
// ==========================================
// 红线: 非正数/非数字请求在任何修改前被拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    requested_count: u32,
}

impl AllocationRequest {
    /// 由整数构造请求
    pub fn new(count: i64) -> AllocationResult<Self> {
        if count <= 0 || count > u32::MAX as i64 {
            return Err(AllocationError::InvalidRequest {
                input: count.to_string(),
            });
        }
        Ok(Self {
            requested_count: count as u32,
        })
    }

    /// 由输入框文本构造请求
    pub fn parse(input: &str) -> AllocationResult<Self> {
        let count = input
            .trim()
            .parse::<i64>()
            .map_err(|_| AllocationError::InvalidRequest {
                input: input.to_string(),
            })?;
        Self::new(count)
    }

    pub fn requested_count(&self) -> u32 {
        self.requested_count
    }
}

// ==========================================
// AllocationStrategy - 分配策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationStrategy {
    /// 指定教室，溢出部分退回调用方
    Direct { room_id: RoomId },
    /// 从起始教室开始按目录顺序依次填满，不回绕
    Waterfall { start: Option<RoomId> },
    /// 按剩余空位降序贪心填充
    BestFit,
}

impl AllocationStrategy {
    /// 该策略在“添加到此处”之前使用的分析模式
    pub fn analyze_mode(&self) -> AnalyzeMode {
        match self {
            AllocationStrategy::Direct { .. } => AnalyzeMode::ExactFit,
            AllocationStrategy::Waterfall { .. } => AnalyzeMode::AnySpace,
            AllocationStrategy::BestFit => AnalyzeMode::AnySpace,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::Direct { .. } => "DIRECT",
            AllocationStrategy::Waterfall { .. } => "WATERFALL",
            AllocationStrategy::BestFit => "BEST_FIT",
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// RoomAssignment - 单间分配明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAssignment {
    pub room_id: RoomId,
    pub room_name: String,
    pub amount: u32,
}

// ==========================================
// OutcomeKind - 结果分类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Complete,  // remaining == 0
    Partial,   // 部分分配
    Exhausted, // 无任何分配
}

// ==========================================
// AllocationOutcome - 分配结果（上报，不落库）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub strategy: AllocationStrategy,
    pub requested: u32,
    pub assigned_total: u32,
    pub remaining: u32,
    pub per_room_detail: Vec<RoomAssignment>, // 顺序 = 分配顺序
}

impl AllocationOutcome {
    pub(crate) fn empty(strategy: AllocationStrategy, requested: u32) -> Self {
        Self {
            strategy,
            requested,
            assigned_total: 0,
            remaining: requested,
            per_room_detail: Vec::new(),
        }
    }

    /// 记录一次分配
    pub(crate) fn push(&mut self, room_id: RoomId, room_name: &str, amount: u32) {
        self.assigned_total += amount;
        self.remaining -= amount;
        self.per_room_detail.push(RoomAssignment {
            room_id,
            room_name: room_name.to_string(),
            amount,
        });
    }

    pub fn kind(&self) -> OutcomeKind {
        if self.remaining == 0 {
            OutcomeKind::Complete
        } else if self.assigned_total > 0 {
            OutcomeKind::Partial
        } else {
            OutcomeKind::Exhausted
        }
    }

    /// 明细摘要，例如 "WATERFALL 700: G-8 CSE A+72, G-9 CSE B+72"
    pub fn summary(&self) -> String {
        let detail = self
            .per_room_detail
            .iter()
            .map(|a| format!("{}+{}", a.room_name, a.amount))
            .collect::<Vec<_>>()
            .join(", ");
        if self.remaining > 0 {
            format!(
                "{} {}: {} (remaining {})",
                self.strategy, self.requested, detail, self.remaining
            )
        } else {
            format!("{} {}: {}", self.strategy, self.requested, detail)
        }
    }
}
