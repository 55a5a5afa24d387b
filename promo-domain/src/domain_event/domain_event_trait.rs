use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// 领域事件载荷需要满足的通用能力边界
///
/// 发布前通过 [`EventEnvelope::from_event`](super::EventEnvelope::from_event)
/// 封装为信封，发布器本身从不检查载荷内容。
pub trait DomainEvent: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync {
    /// 事件类型（形如 `promotion.published`），决定路由
    fn event_type(&self) -> &str;

    /// 事件载荷版本
    fn event_version(&self) -> usize {
        1
    }
}
