//! 事件处理器（EventHandler）
//!
//! 定义消费事件的处理逻辑与名称，并提供将闭包适配为处理器的
//! `FnHandler`（异步）与 `SyncFnHandler`（同步）。
//!
//! ```
//! use promo_domain::domain_event::EventEnvelope;
//! use promo_domain::eventing::{EventHandler, FnHandler, SyncFnHandler};
//! use std::sync::Arc;
//!
//! let audit: Arc<dyn EventHandler> = FnHandler::arc("audit", |event: EventEnvelope| async move {
//!     let _ = event.event_id();
//!     anyhow::Ok(())
//! });
//! let counter: Arc<dyn EventHandler> = SyncFnHandler::arc("counter", |_event| Ok(()));
//!
//! assert_eq!(audit.handler_name(), "audit");
//! assert_eq!(counter.handler_name(), "counter");
//! ```
use crate::domain_event::EventEnvelope;
use async_trait::async_trait;
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

/// 事件处理器：处理某一类型的事件
///
/// 返回 `Err` 或在执行中 panic 都会被发布器捕获并上报，不会影响其他处理器。
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理器名称（用于失败上报与日志）
    fn handler_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// 处理事件
    async fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()>;
}

/// 异步闭包处理器：`F: Fn(EventEnvelope) -> Fut`
///
/// 每次调用收到事件的一份拷贝，生成的 future 不借用发布器状态。
pub struct FnHandler<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F, Fut> FnHandler<F>
where
    F: Fn(EventEnvelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(EventEnvelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn handler_name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()> {
        (self.f)(event.clone()).await
    }
}

/// 同步闭包处理器：`F: Fn(&EventEnvelope) -> anyhow::Result<()>`
pub struct SyncFnHandler<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SyncFnHandler<F>
where
    F: Fn(&EventEnvelope) -> anyhow::Result<()> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F> EventHandler for SyncFnHandler<F>
where
    F: Fn(&EventEnvelope) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn handler_name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()> {
        (self.f)(event)
    }
}
