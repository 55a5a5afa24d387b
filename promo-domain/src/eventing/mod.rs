//! 事件子系统（eventing）
//!
//! 进程内发布/订阅：
//! - `EventPublisher`：订阅、退订与发布的统一接口；
//! - `InMemoryEventPublisher`：基于快照分发、逐个隔离处理器失败的内存实现；
//! - `EventHandler`：对事件进行消费处理，可由闭包适配；
//! - `Subscription` / `SubscriptionGuard`：显式退订凭证与作用域退订；
//! - `HandlerFailureSink`：处理器失败的上报通道，默认写入 tracing 日志。
//!
//! 不提供持久化、重放、跨进程投递或背压控制。
//!
pub mod failure;
pub mod global;
pub mod handler;
pub mod publisher;
pub mod publisher_inmemory;
mod registry;
pub mod subscription;

pub use failure::{FailureReason, HandlerFailure, HandlerFailureSink, TracingFailureSink};
pub use global::global;
pub use handler::{EventHandler, FnHandler, SyncFnHandler};
pub use publisher::EventPublisher;
pub use publisher_inmemory::{DispatchMode, InMemoryEventPublisher, PublisherConfig};
pub use subscription::{Subscription, SubscriptionGuard, SubscriptionId};
