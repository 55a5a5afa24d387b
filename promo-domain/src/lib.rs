//! 促销领域基础库（promo-domain）
//!
//! 提供促销浏览应用中领域状态变化的通知机制：
//! - 领域事件（`domain_event`）：校验后的事件类型与不可变事件信封；
//! - 事件系统（`eventing`）：进程内发布/订阅，按登记顺序分发、逐个隔离处理器失败；
//! - 统一错误（`error`）。
//!
//! 生产者构造 `EventEnvelope` 并调用 `publish`，消费者（视图、审计、副作用）
//! 在初始化阶段 `subscribe`，在销毁阶段退订。
//!
//! ```
//! use promo_domain::domain_event::EventEnvelope;
//! use promo_domain::eventing::{EventPublisher, InMemoryEventPublisher, SyncFnHandler};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let publisher = InMemoryEventPublisher::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//!
//! let counter = seen.clone();
//! let sub = publisher.subscribe(
//!     "OrderPlaced",
//!     SyncFnHandler::arc("counter", move |_event| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }),
//! )?;
//!
//! publisher
//!     .publish(&EventEnvelope::new("OrderPlaced", serde_json::json!({"orderId": 42}))?)
//!     .await;
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//!
//! assert!(publisher.unsubscribe(&sub));
//! assert!(!publisher.unsubscribe(&sub));
//! # Ok(())
//! # }
//! ```
//!
pub mod domain_event;
pub mod error;
pub mod eventing;
