//! 处理器注册表（HandlerRegistry）
//!
//! 事件类型 -> 按登记顺序排列的处理器序列，允许重复登记。
//! 分发时只读取快照，锁从不跨越处理器的执行，因此处理器内部
//! 订阅/退订是安全的，且变更从下一次发布开始生效。
//!
use super::handler::EventHandler;
use super::subscription::{Subscription, SubscriptionId};
use crate::domain_event::EventType;
use dashmap::DashMap;
use std::sync::Arc;

/// 一条登记：订阅 ID + 处理器
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: SubscriptionId,
    pub(crate) handler: Arc<dyn EventHandler>,
}

#[derive(Default)]
pub(crate) struct HandlerRegistry {
    by_type: DashMap<EventType, Vec<Registration>>,
}

impl HandlerRegistry {
    pub(crate) fn insert(
        &self,
        event_type: EventType,
        handler: Arc<dyn EventHandler>,
    ) -> Subscription {
        let id = SubscriptionId::next();
        self.by_type
            .entry(event_type.clone())
            .or_default()
            .push(Registration { id, handler });
        Subscription::new(event_type, id)
    }

    /// 按凭证移除恰好一条登记；不存在时返回 false
    pub(crate) fn remove(&self, subscription: &Subscription) -> bool {
        let key = subscription.event_type().as_str();

        // get_mut 的分片写锁须在 remove_if 之前释放
        let removed = match self.by_type.get_mut(key) {
            Some(mut list) => match list.iter().position(|r| r.id == subscription.id()) {
                Some(idx) => {
                    list.remove(idx);
                    true
                }
                None => false,
            },
            None => false,
        };

        if removed {
            self.by_type.remove_if(key, |_, list| list.is_empty());
        }
        removed
    }

    /// 分发开始时的稳定快照
    pub(crate) fn snapshot(&self, event_type: &str) -> Vec<Registration> {
        self.by_type
            .get(event_type)
            .map(|list| list.value().clone())
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, event_type: &str) -> usize {
        self.by_type
            .get(event_type)
            .map(|list| list.len())
            .unwrap_or(0)
    }

    pub(crate) fn event_types(&self) -> Vec<EventType> {
        self.by_type.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventing::SyncFnHandler;

    fn noop() -> Arc<dyn EventHandler> {
        SyncFnHandler::arc("noop", |_event| Ok(()))
    }

    fn ty(s: &str) -> EventType {
        EventType::new(s).unwrap()
    }

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let registry = HandlerRegistry::default();
        let h = noop();
        let a = registry.insert(ty("X"), h.clone());
        let b = registry.insert(ty("X"), h.clone());
        let c = registry.insert(ty("X"), noop());

        let ids: Vec<_> = registry.snapshot("X").iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id(), b.id(), c.id()]);
        assert!(Arc::ptr_eq(&registry.snapshot("X")[0].handler, &h));
        assert!(Arc::ptr_eq(&registry.snapshot("X")[1].handler, &h));
    }

    #[test]
    fn remove_takes_exactly_one_and_is_idempotent() {
        let registry = HandlerRegistry::default();
        let h = noop();
        let a = registry.insert(ty("X"), h.clone());
        let b = registry.insert(ty("X"), h);

        assert!(registry.remove(&a));
        assert!(!registry.remove(&a));
        let ids: Vec<_> = registry.snapshot("X").iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b.id()]);
    }

    #[test]
    fn empty_sequences_are_pruned() {
        let registry = HandlerRegistry::default();
        let a = registry.insert(ty("X"), noop());
        registry.insert(ty("Y"), noop());

        assert!(registry.remove(&a));
        assert_eq!(registry.count("X"), 0);
        assert_eq!(registry.event_types(), vec![ty("Y")]);
    }

    #[test]
    fn snapshot_is_detached_from_later_mutation() {
        let registry = HandlerRegistry::default();
        let a = registry.insert(ty("X"), noop());
        let snap = registry.snapshot("X");

        registry.remove(&a);
        registry.insert(ty("X"), noop());
        registry.insert(ty("X"), noop());

        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id, a.id());
        assert_eq!(registry.count("X"), 2);
    }

    #[test]
    fn unknown_type_yields_empty_snapshot() {
        let registry = HandlerRegistry::default();
        assert!(registry.snapshot("nothing").is_empty());
        assert!(!registry.remove(&Subscription::new(ty("nothing"), SubscriptionId::next())));
    }
}
