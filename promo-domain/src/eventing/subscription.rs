//! 订阅凭证（Subscription）与作用域守卫（SubscriptionGuard）
//!
//! 每次 `subscribe` 都会分配一个进程内唯一的 `SubscriptionId`，
//! 凭证 = 事件类型 + 订阅 ID，退订即按凭证精确移除一条登记。
//! 同一个处理器多次订阅会得到多个凭证，互不影响。
//!
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

use super::registry::HandlerRegistry;
use crate::domain_event::EventType;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// 订阅 ID（进程内单调递增，不复用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// 订阅凭证：用于显式退订
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    event_type: EventType,
    id: SubscriptionId,
}

impl Subscription {
    pub(crate) fn new(event_type: EventType, id: SubscriptionId) -> Self {
        Self { event_type, id }
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// 作用域订阅：Drop 时自动退订
///
/// 只持有注册表的弱引用，发布器被丢弃后守卫的释放是空操作。
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct SubscriptionGuard {
    registry: Weak<HandlerRegistry>,
    subscription: Subscription,
    armed: bool,
}

impl SubscriptionGuard {
    pub(crate) fn new(registry: Weak<HandlerRegistry>, subscription: Subscription) -> Self {
        Self {
            registry,
            subscription,
            armed: true,
        }
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// 立即退订，返回是否确实移除了登记
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    /// 放弃自动退订，转为普通凭证
    pub fn detach(mut self) -> Subscription {
        self.armed = false;
        self.subscription.clone()
    }

    fn release(&mut self) -> bool {
        if !std::mem::replace(&mut self.armed, false) {
            return false;
        }
        match self.registry.upgrade() {
            Some(registry) => registry.remove(&self.subscription),
            None => false,
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("subscription", &self.subscription)
            .field("armed", &self.armed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = SubscriptionId::next();
        let b = SubscriptionId::next();
        assert!(b > a);
        assert_ne!(a, b);
    }
}
