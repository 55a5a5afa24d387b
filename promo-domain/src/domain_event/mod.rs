//! 领域事件（Domain Event）
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`）、经过校验的事件类型
//! `EventType`，以及发布器实际路由的不可变通知单元 `EventEnvelope`。

mod domain_event_trait;
mod event_envelope;
mod event_type;

pub use domain_event_trait::DomainEvent;
pub use event_envelope::EventEnvelope;
pub use event_type::EventType;
