//! 处理器失败上报（HandlerFailureSink）
//!
//! 处理器返回错误或 panic 时，发布器将其包装为 `HandlerFailure` 交给上报通道，
//! 然后继续分发下一个处理器。失败从不回传给 `publish` 的调用方。
//!
use super::subscription::SubscriptionId;
use crate::domain_event::EventType;
use crate::error::DomainError;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use uuid::Uuid;

/// 失败原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// 处理器返回了 `Err`
    Error(String),
    /// 处理器执行中 panic
    Panicked(String),
}

impl FailureReason {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let msg = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        FailureReason::Panicked(msg)
    }

    pub fn message(&self) -> &str {
        match self {
            FailureReason::Error(msg) | FailureReason::Panicked(msg) => msg,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Error(msg) => write!(f, "{msg}"),
            FailureReason::Panicked(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

/// 一次处理器失败的完整描述
#[derive(Debug, Clone)]
pub struct HandlerFailure {
    pub event_type: EventType,
    pub event_id: Uuid,
    pub subscription: SubscriptionId,
    pub handler: String,
    pub reason: FailureReason,
}

impl HandlerFailure {
    pub fn into_error(self) -> DomainError {
        DomainError::EventHandler {
            handler: self.handler,
            event_type: self.event_type.into(),
            reason: self.reason.to_string(),
        }
    }
}

/// 失败上报通道
#[async_trait]
pub trait HandlerFailureSink: Send + Sync {
    async fn report(&self, failure: &HandlerFailure);
}

/// 默认上报通道：写入 `tracing` 错误日志
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureSink;

#[async_trait]
impl HandlerFailureSink for TracingFailureSink {
    async fn report(&self, failure: &HandlerFailure) {
        tracing::error!(
            event_type = %failure.event_type,
            event_id = %failure.event_id,
            subscription = %failure.subscription,
            handler = %failure.handler,
            reason = %failure.reason,
            "event handler failed"
        );
    }
}
