use promo_domain::domain_event::{DomainEvent, EventEnvelope};
use promo_domain::eventing::{self, EventPublisher, SyncFnHandler};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PromotionViewed {
    promotion_id: String,
    viewer: String,
}

impl DomainEvent for PromotionViewed {
    fn event_type(&self) -> &str {
        "global-test.promotion.viewed"
    }
}

#[tokio::test]
async fn global_publisher_is_shared_and_typed_payloads_round_trip() {
    let seen: Arc<Mutex<Vec<PromotionViewed>>> = Arc::default();

    let s = seen.clone();
    let guard = eventing::global()
        .subscribe_scoped(
            "global-test.promotion.viewed",
            SyncFnHandler::arc("viewer-log", move |event| {
                s.lock().unwrap().push(event.payload_as()?);
                Ok(())
            }),
        )
        .unwrap();

    let viewed = PromotionViewed {
        promotion_id: "promo-1".into(),
        viewer: "u-1".into(),
    };
    let envelope = EventEnvelope::from_event(&viewed).unwrap();

    // 同一个进程级实例
    assert!(std::ptr::eq(eventing::global(), eventing::global()));
    eventing::global().publish(&envelope).await;
    assert_eq!(*seen.lock().unwrap(), vec![viewed.clone()]);

    drop(guard);
    eventing::global().publish(&envelope).await;
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(
        eventing::global().subscriber_count("global-test.promotion.viewed"),
        0
    );
}
