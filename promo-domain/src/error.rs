//! 领域层统一错误定义
//!
//! 聚焦事件类型校验、载荷序列化与事件处理器失败等最小必要集合，
//! 便于调用方统一转换为 `DomainError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 事件系统 ---
    #[error("invalid event type: {reason}")]
    InvalidEventType { reason: String },
    #[error("event handler error: handler={handler}, event_type={event_type}, reason={reason}")]
    EventHandler {
        handler: String,
        event_type: String,
        reason: String,
    },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn invalid_event_type(reason: impl Into<String>) -> Self {
        DomainError::InvalidEventType {
            reason: reason.into(),
        }
    }
}
