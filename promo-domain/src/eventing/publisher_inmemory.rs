//! 内存版事件发布器（InMemoryEventPublisher）
//!
//! - `subscribe`：把处理器追加到事件类型对应的序列末尾；
//! - `unsubscribe`：按凭证移除一条登记，可重复调用；
//! - `publish`：在分发开始时对处理器序列做快照，依次（或按配置并发）执行，
//!   捕获每个处理器的错误与 panic 并上报，全部结束后返回。
//!
//! 分发期间的订阅/退订（包括处理器退订自身）只影响之后的发布。
//! 不提供超时与取消：挂起的处理器会让本次 `publish` 一直等待。
//!
use super::failure::{FailureReason, HandlerFailure, HandlerFailureSink, TracingFailureSink};
use super::handler::EventHandler;
use super::publisher::EventPublisher;
use super::registry::{HandlerRegistry, Registration};
use super::subscription::{Subscription, SubscriptionGuard};
use crate::domain_event::{EventEnvelope, EventType};
use crate::error::DomainResult;
use async_trait::async_trait;
use bon::Builder;
use futures_util::{FutureExt, StreamExt, stream};
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// 单次发布内处理器的执行方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DispatchMode {
    /// 按登记顺序逐个执行，前一个结束后才开始下一个
    #[default]
    Sequential,
    /// 按登记顺序启动，最多 `limit` 个同时执行（0 视为 1）
    Concurrent { limit: usize },
}

/// 发布器配置
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub dispatch: DispatchMode,
}

/// 内存版发布器
///
/// ```
/// use promo_domain::eventing::{DispatchMode, InMemoryEventPublisher, PublisherConfig};
///
/// let publisher = InMemoryEventPublisher::builder()
///     .config(PublisherConfig {
///         dispatch: DispatchMode::Concurrent { limit: 4 },
///     })
///     .build();
/// assert_eq!(publisher.subscriber_count("promotion.published"), 0);
/// ```
#[derive(Builder)]
pub struct InMemoryEventPublisher {
    #[builder(skip)]
    registry: Arc<HandlerRegistry>,
    #[builder(default = Arc::new(TracingFailureSink))]
    failure_sink: Arc<dyn HandlerFailureSink>,
    #[builder(default)]
    config: PublisherConfig,
}

impl Default for InMemoryEventPublisher {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// 订阅并返回作用域守卫，守卫释放即退订
    pub fn subscribe_scoped(
        &self,
        event_type: &str,
        handler: Arc<dyn EventHandler>,
    ) -> DomainResult<SubscriptionGuard> {
        let subscription = self.subscribe(event_type, handler)?;
        Ok(SubscriptionGuard::new(
            Arc::downgrade(&self.registry),
            subscription,
        ))
    }

    /// 某事件类型当前登记的处理器数量（重复登记分别计数）
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.registry.count(event_type)
    }

    /// 当前至少有一条登记的事件类型（只读视图，无序）
    pub fn registered_event_types(&self) -> Vec<EventType> {
        self.registry.event_types()
    }

    async fn dispatch_one(&self, event: &EventEnvelope, registration: &Registration) {
        let handler = &registration.handler;

        // 调用本身也放进 async 块，使同步 panic 同样在 catch_unwind 之内
        let outcome = AssertUnwindSafe(async { handler.handle(event).await })
            .catch_unwind()
            .await;

        let reason = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => FailureReason::Error(format!("{err:#}")),
            Err(panic) => FailureReason::from_panic(panic),
        };

        let failure = HandlerFailure {
            event_type: event.event_type().clone(),
            event_id: event.event_id(),
            subscription: registration.id,
            handler: handler.handler_name().to_string(),
            reason,
        };

        if AssertUnwindSafe(self.failure_sink.report(&failure))
            .catch_unwind()
            .await
            .is_err()
        {
            tracing::error!(
                event_type = %failure.event_type,
                handler = %failure.handler,
                reason = %failure.reason,
                "failure sink panicked while reporting handler failure"
            );
        }
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    fn subscribe(
        &self,
        event_type: &str,
        handler: Arc<dyn EventHandler>,
    ) -> DomainResult<Subscription> {
        let event_type = EventType::new(event_type)?;
        let handler_name = handler.handler_name().to_string();
        let subscription = self.registry.insert(event_type, handler);

        tracing::debug!(
            event_type = %subscription.event_type(),
            subscription = %subscription.id(),
            handler = %handler_name,
            "handler subscribed"
        );
        Ok(subscription)
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let removed = self.registry.remove(subscription);
        tracing::debug!(
            event_type = %subscription.event_type(),
            subscription = %subscription.id(),
            removed,
            "handler unsubscribed"
        );
        removed
    }

    async fn publish(&self, event: &EventEnvelope) {
        let snapshot = self.registry.snapshot(event.event_type().as_str());
        if snapshot.is_empty() {
            tracing::trace!(event_type = %event.event_type(), "no subscribers");
            return;
        }

        tracing::trace!(
            event_type = %event.event_type(),
            event_id = %event.event_id(),
            handlers = snapshot.len(),
            "dispatching event"
        );

        match self.config.dispatch {
            DispatchMode::Sequential => {
                for registration in &snapshot {
                    self.dispatch_one(event, registration).await;
                }
            }
            DispatchMode::Concurrent { limit } => {
                stream::iter(snapshot.iter())
                    .for_each_concurrent(Some(limit.max(1)), |registration| {
                        self.dispatch_one(event, registration)
                    })
                    .await;
            }
        }
    }
}
