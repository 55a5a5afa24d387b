//! 消费者：列表视图、浏览计数、审计轨迹与一个不稳定的推荐器
//!
//! 视图在 `attach` 时订阅，返回的守卫释放即退订。
//!
use crate::catalog::{PROMOTION_EXPIRED, PROMOTION_PUBLISHED, PROMOTION_VIEWED, PromotionEvent};
use async_trait::async_trait;
use promo_domain::domain_event::EventEnvelope;
use promo_domain::error::DomainResult;
use promo_domain::eventing::{
    EventHandler, InMemoryEventPublisher, SubscriptionGuard, SyncFnHandler,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// 当前有效促销的列表视图（id -> 标题与折扣）
#[derive(Clone, Default)]
pub struct PromotionListView {
    rows: Arc<Mutex<BTreeMap<String, String>>>,
}

impl PromotionListView {
    pub fn attach(
        &self,
        publisher: &InMemoryEventPublisher,
    ) -> DomainResult<Vec<SubscriptionGuard>> {
        let handler: Arc<dyn EventHandler> = {
            let rows = self.rows.clone();
            SyncFnHandler::arc("promotion-list-view", move |event| {
                let mut rows = rows.lock().map_err(|_| anyhow::anyhow!("view state poisoned"))?;
                match event.payload_as::<PromotionEvent>()? {
                    PromotionEvent::Published {
                        promotion_id,
                        title,
                        discount_percent,
                    } => {
                        rows.insert(promotion_id, format!("{title} (-{discount_percent}%)"));
                    }
                    PromotionEvent::Expired { promotion_id } => {
                        rows.remove(&promotion_id);
                    }
                    PromotionEvent::Viewed { .. } => {}
                }
                Ok(())
            })
        };

        Ok(vec![
            publisher.subscribe_scoped(PROMOTION_PUBLISHED, handler.clone())?,
            publisher.subscribe_scoped(PROMOTION_EXPIRED, handler)?,
        ])
    }

    pub fn rows(&self) -> Vec<String> {
        self.rows
            .lock()
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }
}

/// 每个促销的浏览次数
#[derive(Clone, Default)]
pub struct ViewCounter {
    counts: Arc<Mutex<BTreeMap<String, usize>>>,
}

impl ViewCounter {
    pub fn attach(&self, publisher: &InMemoryEventPublisher) -> DomainResult<SubscriptionGuard> {
        let counts = self.counts.clone();
        publisher.subscribe_scoped(
            PROMOTION_VIEWED,
            SyncFnHandler::arc("view-counter", move |event| {
                let viewed: PromotionEvent = event.payload_as()?;
                let mut counts = counts
                    .lock()
                    .map_err(|_| anyhow::anyhow!("view counter poisoned"))?;
                *counts.entry(viewed.promotion_id().to_string()).or_default() += 1;
                Ok(())
            }),
        )
    }

    pub fn count(&self, promotion_id: &str) -> usize {
        self.counts
            .lock()
            .ok()
            .and_then(|counts| counts.get(promotion_id).copied())
            .unwrap_or(0)
    }
}

/// 审计轨迹：记录所有促销事件
#[derive(Default)]
pub struct AuditTrail {
    entries: Mutex<Vec<String>>,
}

impl AuditTrail {
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventHandler for AuditTrail {
    fn handler_name(&self) -> &str {
        "audit-trail"
    }

    async fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()> {
        tracing::info!(
            event_type = %event.event_type(),
            event_id = %event.event_id(),
            "audit"
        );
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("audit trail poisoned"))?
            .push(format!("{} {}", event.occurred_at().to_rfc3339(), event.event_type()));
        Ok(())
    }
}

/// 推荐器：外部服务不可用时总是失败，用于演示失败隔离
pub struct FlakyRecommender;

#[async_trait]
impl EventHandler for FlakyRecommender {
    fn handler_name(&self) -> &str {
        "recommender"
    }

    async fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()> {
        let viewed: PromotionEvent = event.payload_as()?;
        anyhow::bail!(
            "recommendation service unavailable for {}",
            viewed.promotion_id()
        )
    }
}
