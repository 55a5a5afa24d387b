//! 促销目录：状态变更的生产者
//!
//! 每次成功变更后发布对应的领域事件；发布时不持有目录锁。
//!
use promo_domain::domain_event::{DomainEvent, EventEnvelope};
use promo_domain::error::DomainError;
use promo_domain::eventing::EventPublisher;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use ulid::Ulid;

pub const PROMOTION_PUBLISHED: &str = "promotion.published";
pub const PROMOTION_EXPIRED: &str = "promotion.expired";
pub const PROMOTION_VIEWED: &str = "promotion.viewed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromotionEvent {
    Published {
        promotion_id: String,
        title: String,
        discount_percent: u8,
    },
    Expired {
        promotion_id: String,
    },
    Viewed {
        promotion_id: String,
        viewer: String,
    },
}

impl PromotionEvent {
    pub fn promotion_id(&self) -> &str {
        match self {
            PromotionEvent::Published { promotion_id, .. }
            | PromotionEvent::Expired { promotion_id }
            | PromotionEvent::Viewed { promotion_id, .. } => promotion_id,
        }
    }
}

impl DomainEvent for PromotionEvent {
    fn event_type(&self) -> &str {
        match self {
            PromotionEvent::Published { .. } => PROMOTION_PUBLISHED,
            PromotionEvent::Expired { .. } => PROMOTION_EXPIRED,
            PromotionEvent::Viewed { .. } => PROMOTION_VIEWED,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("promotion not found: {0}")]
    NotFound(String),
    #[error("promotion already expired: {0}")]
    AlreadyExpired(String),
    #[error("invalid discount: {0}%")]
    InvalidDiscount(u8),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Clone)]
struct Promotion {
    active: bool,
}

pub struct PromotionCatalog<P> {
    promotions: Mutex<HashMap<String, Promotion>>,
    publisher: P,
}

impl<P: EventPublisher> PromotionCatalog<P> {
    pub fn new(publisher: P) -> Self {
        Self {
            promotions: Mutex::new(HashMap::new()),
            publisher,
        }
    }

    pub async fn publish_promotion(
        &self,
        title: &str,
        discount_percent: u8,
    ) -> Result<String, CatalogError> {
        if discount_percent == 0 || discount_percent > 100 {
            return Err(CatalogError::InvalidDiscount(discount_percent));
        }

        let promotion_id = Ulid::new().to_string();
        let envelope = EventEnvelope::from_event(&PromotionEvent::Published {
            promotion_id: promotion_id.clone(),
            title: title.to_string(),
            discount_percent,
        })?;
        self.promotions()
            .insert(promotion_id.clone(), Promotion { active: true });

        self.publisher.publish(&envelope).await;
        Ok(promotion_id)
    }

    pub async fn expire(&self, promotion_id: &str) -> Result<(), CatalogError> {
        let envelope = EventEnvelope::from_event(&PromotionEvent::Expired {
            promotion_id: promotion_id.to_string(),
        })?;
        {
            let mut promotions = self.promotions();
            let promotion = promotions
                .get_mut(promotion_id)
                .ok_or_else(|| CatalogError::NotFound(promotion_id.to_string()))?;
            if !promotion.active {
                return Err(CatalogError::AlreadyExpired(promotion_id.to_string()));
            }
            promotion.active = false;
        }

        self.publisher.publish(&envelope).await;
        Ok(())
    }

    pub fn is_active(&self, promotion_id: &str) -> bool {
        self.promotions()
            .get(promotion_id)
            .is_some_and(|p| p.active)
    }

    pub async fn view(&self, promotion_id: &str, viewer: &str) -> Result<(), CatalogError> {
        let active = self
            .promotions()
            .get(promotion_id)
            .map(|p| p.active)
            .ok_or_else(|| CatalogError::NotFound(promotion_id.to_string()))?;
        if !active {
            return Err(CatalogError::AlreadyExpired(promotion_id.to_string()));
        }

        let envelope = EventEnvelope::from_event(&PromotionEvent::Viewed {
            promotion_id: promotion_id.to_string(),
            viewer: viewer.to_string(),
        })?;
        self.publisher.publish(&envelope).await;
        Ok(())
    }

    fn promotions(&self) -> std::sync::MutexGuard<'_, HashMap<String, Promotion>> {
        // 目录状态只做简单插入/翻转，毒化后的数据仍可继续使用
        self.promotions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_domain::eventing::{InMemoryEventPublisher, SyncFnHandler};
    use std::sync::Arc;

    #[tokio::test]
    async fn lifecycle_emits_events_in_order() {
        let publisher = Arc::new(InMemoryEventPublisher::new());
        let seen: Arc<std::sync::Mutex<Vec<PromotionEvent>>> = Arc::default();
        for ty in [PROMOTION_PUBLISHED, PROMOTION_EXPIRED, PROMOTION_VIEWED] {
            let s = seen.clone();
            publisher
                .subscribe(
                    ty,
                    SyncFnHandler::arc("collect", move |event| {
                        s.lock().unwrap().push(event.payload_as()?);
                        Ok(())
                    }),
                )
                .unwrap();
        }

        let catalog = PromotionCatalog::new(publisher.clone());
        let id = catalog.publish_promotion("Spring sale", 20).await.unwrap();
        catalog.view(&id, "u-1").await.unwrap();
        catalog.expire(&id).await.unwrap();

        let kinds: Vec<_> = seen
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type().to_string())
            .collect();
        assert_eq!(
            kinds,
            vec![PROMOTION_PUBLISHED, PROMOTION_VIEWED, PROMOTION_EXPIRED]
        );
        assert!(seen.lock().unwrap().iter().all(|e| e.promotion_id() == id));
    }

    #[tokio::test]
    async fn subscribers_observe_committed_state() {
        let publisher = Arc::new(InMemoryEventPublisher::new());
        let catalog = Arc::new(PromotionCatalog::new(publisher.clone()));
        let observed: Arc<std::sync::Mutex<Vec<bool>>> = Arc::default();

        let (c, o) = (catalog.clone(), observed.clone());
        publisher
            .subscribe(
                PROMOTION_PUBLISHED,
                SyncFnHandler::arc("state-check", move |event| {
                    let published: PromotionEvent = event.payload_as()?;
                    o.lock().unwrap().push(c.is_active(published.promotion_id()));
                    Ok(())
                }),
            )
            .unwrap();
        let (c, o) = (catalog.clone(), observed.clone());
        publisher
            .subscribe(
                PROMOTION_EXPIRED,
                SyncFnHandler::arc("state-check", move |event| {
                    let expired: PromotionEvent = event.payload_as()?;
                    o.lock().unwrap().push(c.is_active(expired.promotion_id()));
                    Ok(())
                }),
            )
            .unwrap();

        let id = catalog.publish_promotion("Spring sale", 20).await.unwrap();
        catalog.expire(&id).await.unwrap();

        assert_eq!(*observed.lock().unwrap(), vec![true, false]);
        assert!(!catalog.is_active(&id));
        assert!(!catalog.is_active("missing"));
    }

    #[tokio::test]
    async fn rejected_mutations_publish_nothing() {
        let publisher = Arc::new(InMemoryEventPublisher::new());
        let catalog = PromotionCatalog::new(publisher.clone());

        assert!(matches!(
            catalog.publish_promotion("Free", 0).await,
            Err(CatalogError::InvalidDiscount(0))
        ));
        assert!(matches!(
            catalog.view("missing", "u-1").await,
            Err(CatalogError::NotFound(_))
        ));

        let id = catalog.publish_promotion("Flash", 50).await.unwrap();
        catalog.expire(&id).await.unwrap();
        assert!(matches!(
            catalog.expire(&id).await,
            Err(CatalogError::AlreadyExpired(_))
        ));
        assert!(matches!(
            catalog.view(&id, "u-2").await,
            Err(CatalogError::AlreadyExpired(_))
        ));
    }
}
