// ==========================================
// 教室容量分配系统 - API 层
// ==========================================
// 职责: 分配会话接口，供 CLI 或其他前端调用
// ==========================================

pub mod allocation_api;
pub mod error;
pub mod room_view;

// 重导出核心类型
pub use allocation_api::{AllocationApi, CommandResult, PendingRemainder};
pub use error::{ApiError, ApiResult};
pub use room_view::RoomView;
