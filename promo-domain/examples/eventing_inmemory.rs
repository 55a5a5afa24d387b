/// 内存发布器示例
/// 展示订阅 -> 发布 -> 处理器失败隔离 -> 退订的完整流程
use anyhow::Result as AnyResult;
use async_trait::async_trait;
use promo_domain::domain_event::EventEnvelope;
use promo_domain::eventing::{
    EventPublisher, FnHandler, HandlerFailure, HandlerFailureSink, InMemoryEventPublisher,
    SyncFnHandler,
};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// 失败上报（打印到控制台）
// ============================================================================

struct PrintSink;

#[async_trait]
impl HandlerFailureSink for PrintSink {
    async fn report(&self, failure: &HandlerFailure) {
        println!(
            "❌ handler={} type={} reason={}",
            failure.handler, failure.event_type, failure.reason
        );
    }
}

// ============================================================================
// 工具函数
// ============================================================================

fn mk_event(ty: &str, promotion_id: &str) -> AnyResult<EventEnvelope> {
    Ok(EventEnvelope::new(
        ty,
        serde_json::json!({"promotionId": promotion_id, "discount": 15}),
    )?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> AnyResult<()> {
    println!("=== 内存发布器示例 ===\n");

    let publisher = InMemoryEventPublisher::builder()
        .failure_sink(Arc::new(PrintSink))
        .build();

    let printer = publisher.subscribe(
        "promotion.published",
        SyncFnHandler::arc("printer", |event| {
            println!(
                "handler=printer type={} payload={}",
                event.event_type(),
                event.payload()
            );
            Ok(())
        }),
    )?;

    publisher.subscribe(
        "promotion.published",
        FnHandler::arc("slow_indexer", |event: EventEnvelope| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            println!("handler=slow_indexer indexed {}", event.event_id());
            anyhow::Ok(())
        }),
    )?;

    publisher.subscribe(
        "promotion.published",
        SyncFnHandler::arc("sometimes_fail", |_event| {
            anyhow::bail!("search index unavailable")
        }),
    )?;

    publisher.publish(&mk_event("promotion.published", "p-1")?).await;
    println!("✅ 第一次发布完成（3 个处理器均已结束）\n");

    publisher.unsubscribe(&printer);
    publisher.publish(&mk_event("promotion.published", "p-2")?).await;
    println!("✅ 退订 printer 后再次发布\n");

    publisher.publish(&mk_event("promotion.expired", "p-1")?).await;
    println!("✅ 无订阅者的事件类型：静默完成");
    Ok(())
}
