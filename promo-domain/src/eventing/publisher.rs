//! 事件发布器（EventPublisher）协议
//!
//! 订阅：按事件类型登记处理器，返回用于退订的凭证；
//! 发布：按登记顺序调用该类型当前的全部处理器，待全部处理器结束后返回。
//!
use super::handler::EventHandler;
use super::subscription::Subscription;
use crate::domain_event::EventEnvelope;
use crate::error::DomainResult;
use async_trait::async_trait;
use std::sync::Arc;

/// 事件发布器：负责登记处理器与分发事件
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// 登记处理器；事件类型为空时立即返回 `InvalidEventType`
    fn subscribe(
        &self,
        event_type: &str,
        handler: Arc<dyn EventHandler>,
    ) -> DomainResult<Subscription>;

    /// 移除凭证对应的那一条登记；已移除或不存在时返回 false
    fn unsubscribe(&self, subscription: &Subscription) -> bool;

    /// 分发事件；处理器失败只进入上报通道，不会使发布失败
    async fn publish(&self, event: &EventEnvelope);

    async fn publish_batch(&self, events: &[EventEnvelope]) {
        for event in events {
            self.publish(event).await;
        }
    }
}

#[async_trait]
impl<P> EventPublisher for Arc<P>
where
    P: EventPublisher + ?Sized,
{
    fn subscribe(
        &self,
        event_type: &str,
        handler: Arc<dyn EventHandler>,
    ) -> DomainResult<Subscription> {
        (**self).subscribe(event_type, handler)
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        (**self).unsubscribe(subscription)
    }

    async fn publish(&self, event: &EventEnvelope) {
        (**self).publish(event).await
    }

    async fn publish_batch(&self, events: &[EventEnvelope]) {
        (**self).publish_batch(events).await
    }
}
