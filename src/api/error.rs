// ==========================================
// 教室容量分配系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为面向调用方的错误消息
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::config::ConfigError;
use crate::engine::error::AllocationError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 分配规则错误（可恢复，状态未修改）
    // ==========================================
    #[error("无效的人数输入: {0}")]
    InvalidRequest(String),

    #[error("教室不存在: room_id={room_id}")]
    RoomNotFound { room_id: u32 },

    #[error("没有可用空位: requested={requested}, remaining={remaining}")]
    AllocationExhausted { requested: u32, remaining: u32 },

    #[error("教室未被标出: room_id={room_id}（请先执行可用性分析）")]
    RoomNotHighlighted { room_id: u32 },

    #[error("没有待分配的剩余人数")]
    NoPendingRemainder,

    // ==========================================
    // 数据/配置错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("配置错误: {0}")]
    ConfigurationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 AllocationError 转换
// ==========================================
impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::InvalidRequest { input } => ApiError::InvalidRequest(input),
            AllocationError::RoomNotFound { room_id } => ApiError::RoomNotFound { room_id },
            AllocationError::AllocationExhausted {
                requested,
                remaining,
            } => ApiError::AllocationExhausted {
                requested,
                remaining,
            },
            AllocationError::InvalidCapacity { .. } | AllocationError::DuplicateRoomId { .. } => {
                ApiError::ValidationError(err.to_string())
            }
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigurationError(err.to_string())
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::from(RepositoryError::from(err))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_keeps_counts() {
        let err: ApiError = AllocationError::AllocationExhausted {
            requested: 10,
            remaining: 10,
        }
        .into();
        assert!(matches!(
            err,
            ApiError::AllocationExhausted {
                requested: 10,
                remaining: 10
            }
        ));
    }

    #[test]
    fn test_repository_not_found_message() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "Room".to_string(),
            id: "7".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "资源未找到: Room(id=7)不存在");
    }

    #[test]
    fn test_invalid_capacity_is_validation_error() {
        let err: ApiError = AllocationError::InvalidCapacity { room_id: 3 }.into();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
