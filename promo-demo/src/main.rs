mod catalog;
mod observability;
mod views;

use catalog::{PROMOTION_EXPIRED, PROMOTION_PUBLISHED, PROMOTION_VIEWED, PromotionCatalog};
use promo_domain::eventing::{EventPublisher, InMemoryEventPublisher};
use std::sync::Arc;
use views::{AuditTrail, FlakyRecommender, PromotionListView, ViewCounter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let publisher = Arc::new(InMemoryEventPublisher::new());
    let catalog = PromotionCatalog::new(publisher.clone());

    // consumers
    let list_view = PromotionListView::default();
    let list_guards = list_view.attach(&publisher)?;
    let counter = ViewCounter::default();
    let _counter_guard = counter.attach(&publisher)?;
    let audit = Arc::new(AuditTrail::default());
    for ty in [PROMOTION_PUBLISHED, PROMOTION_EXPIRED, PROMOTION_VIEWED] {
        publisher.subscribe(ty, audit.clone())?;
    }
    publisher.subscribe(PROMOTION_VIEWED, Arc::new(FlakyRecommender))?;

    let spring = catalog.publish_promotion("Spring sale", 20).await?;
    let flash = catalog.publish_promotion("Flash deal", 50).await?;
    println!("listing: {:?}", list_view.rows());

    catalog.view(&spring, "u-1").await?;
    catalog.view(&spring, "u-2").await?;
    catalog.view(&flash, "u-1").await?;
    println!(
        "views: spring={} flash={}",
        counter.count(&spring),
        counter.count(&flash)
    );

    catalog.expire(&flash).await?;
    println!(
        "active: spring={} flash={}",
        catalog.is_active(&spring),
        catalog.is_active(&flash)
    );
    println!("listing after expiry: {:?}", list_view.rows());

    // 列表视图销毁：之后的变更不再反映到视图
    drop(list_guards);
    catalog.publish_promotion("Weekend bundle", 30).await?;
    println!("listing after teardown: {:?}", list_view.rows());

    println!("audit entries: {}", audit.entries().len());
    for entry in audit.entries() {
        println!("  {entry}");
    }
    Ok(())
}
