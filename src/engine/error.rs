// ==========================================
// 教室容量分配系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 引擎内所有错误均可恢复，返回前不修改任何教室
// ==========================================

use crate::domain::types::RoomId;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    // ===== 请求错误 =====
    #[error("无效的分配请求: input={input}（人数必须为正整数）")]
    InvalidRequest { input: String },

    #[error("教室不存在: room_id={room_id}")]
    RoomNotFound { room_id: RoomId },

    // ===== 容量错误 =====
    #[error("无可用空位: requested={requested}, remaining={remaining}")]
    AllocationExhausted { requested: u32, remaining: u32 },

    // ===== 配置错误 =====
    #[error("教室容量配置错误: room_id={room_id}, capacity 必须大于 0")]
    InvalidCapacity { room_id: RoomId },

    #[error("教室编号重复: room_id={room_id}")]
    DuplicateRoomId { room_id: RoomId },
}

/// Result 类型别名
pub type AllocationResult<T> = Result<T, AllocationError>;
