//! 进程级发布器
//!
//! 首次访问时以默认配置惰性创建，随进程存活。需要隔离的场景
//! （测试、多租户等）请自行持有 `InMemoryEventPublisher` 实例。
//!
use super::publisher_inmemory::InMemoryEventPublisher;
use std::sync::OnceLock;

static GLOBAL: OnceLock<InMemoryEventPublisher> = OnceLock::new();

pub fn global() -> &'static InMemoryEventPublisher {
    GLOBAL.get_or_init(InMemoryEventPublisher::new)
}
