// ==========================================
// 教室容量分配系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 教室编号
pub type RoomId = u32;

// ==========================================
// 教室类别 (Room Category)
// ==========================================
// 序列化格式: 与原系统展示名一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomCategory {
    Classroom,   // 普通教室
    Lab,         // 实验室
    #[serde(rename = "Seminar Hall")]
    SeminarHall, // 报告厅
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl RoomCategory {
    /// 全部类别（筛选栏顺序）
    pub const ALL: [RoomCategory; 3] = [
        RoomCategory::Classroom,
        RoomCategory::Lab,
        RoomCategory::SeminarHall,
    ];

    /// 从字符串解析类别（大小写、空格不敏感）
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "CLASSROOM" => Some(RoomCategory::Classroom),
            "LAB" => Some(RoomCategory::Lab),
            "SEMINARHALL" => Some(RoomCategory::SeminarHall),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RoomCategory::Classroom => "Classroom",
            RoomCategory::Lab => "Lab",
            RoomCategory::SeminarHall => "Seminar Hall",
        }
    }
}

// ==========================================
// 教室状态 (Room Status)
// ==========================================
// 红线: 由 occupancy/capacity 推导，不独立存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Available, // 有空位
    Occupied,  // 已满
}

impl RoomStatus {
    /// 唯一的状态推导规则
    ///
    /// occupancy >= capacity 即为 Occupied（含容量异常）
    pub fn derive(occupancy: u32, capacity: u32) -> Self {
        if occupancy >= capacity {
            RoomStatus::Occupied
        } else {
            RoomStatus::Available
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomStatus::Available => write!(f, "Available"),
            RoomStatus::Occupied => write!(f, "Occupied"),
        }
    }
}

// ==========================================
// 风险等级 (Risk Tier)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,    // 宽松
    Medium, // 紧张
    High,   // 危险
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "LOW"),
            RiskTier::Medium => write!(f, "MEDIUM"),
            RiskTier::High => write!(f, "HIGH"),
        }
    }
}

// ==========================================
// 可用性分析模式 (Analyze Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyzeMode {
    ExactFit, // 单间教室必须容纳全部请求
    AnySpace, // 有任意空位即可（用于拆分分配）
}

impl fmt::Display for AnalyzeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzeMode::ExactFit => write!(f, "EXACT_FIT"),
            AnalyzeMode::AnySpace => write!(f, "ANY_SPACE"),
        }
    }
}
