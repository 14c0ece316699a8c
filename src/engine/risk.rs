// ==========================================
// 教室容量分配系统 - 风险分级引擎
// ==========================================
// 职责: 占用比例 -> 风险等级
// 输入: 教室 (occupancy / capacity)
// 输出: RiskTier
// ==========================================

use crate::config::RiskThresholds;
use crate::domain::room::{CapacityConstraint, Room};
use crate::domain::types::RiskTier;
use crate::engine::error::{AllocationError, AllocationResult};

// ==========================================
// RiskClassifier - 风险分级
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskClassifier {
    thresholds: RiskThresholds,
}

impl RiskClassifier {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// 教室风险等级
    ///
    /// 规则: ratio > high → High; ratio > medium → Medium; 其余 Low
    ///
    /// # 错误
    /// - `InvalidCapacity`: capacity = 0（配置错误，不参与风险计算）
    pub fn classify(&self, room: &Room) -> AllocationResult<RiskTier> {
        if room.capacity() == 0 {
            return Err(AllocationError::InvalidCapacity { room_id: room.id() });
        }
        Ok(self.classify_ratio(room.fill_ratio()))
    }

    /// 按比例直接分级（纯函数）
    pub fn classify_ratio(&self, ratio: f64) -> RiskTier {
        if ratio > self.thresholds.high {
            RiskTier::High
        } else if ratio > self.thresholds.medium {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn thresholds(&self) -> RiskThresholds {
        self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RoomCategory;

    fn room(capacity: u32, occupancy: u32) -> Room {
        Room::with_occupancy(1, "G-8 CSE A", RoomCategory::Classroom, capacity, occupancy).unwrap()
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let classifier = RiskClassifier::default();
        // 60/100 = 0.6 不大于 0.6
        assert_eq!(classifier.classify(&room(100, 60)).unwrap(), RiskTier::Low);
        assert_eq!(classifier.classify(&room(100, 61)).unwrap(), RiskTier::Medium);
        // 85/100 = 0.85 不大于 0.85
        assert_eq!(classifier.classify(&room(100, 85)).unwrap(), RiskTier::Medium);
        assert_eq!(classifier.classify(&room(100, 86)).unwrap(), RiskTier::High);
    }

    #[test]
    fn test_empty_and_anomaly() {
        let classifier = RiskClassifier::default();
        assert_eq!(classifier.classify(&room(72, 0)).unwrap(), RiskTier::Low);
        assert_eq!(classifier.classify(&room(72, 90)).unwrap(), RiskTier::High);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = RiskClassifier::new(RiskThresholds {
            medium: 0.5,
            high: 0.75,
        });
        assert_eq!(classifier.classify_ratio(0.55), RiskTier::Medium);
        assert_eq!(classifier.classify_ratio(0.8), RiskTier::High);
    }
}
