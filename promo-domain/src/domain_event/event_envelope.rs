use bon::Builder;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{DomainEvent, EventType};
use crate::error::DomainResult;

/// 事件信封：发布器路由与分发的通知单元
///
/// 一经构造即不可变；`payload` 对发布器不透明，仅由消费方解读。
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// 事件唯一标识符
    #[builder(default = Uuid::new_v4())]
    event_id: Uuid,
    /// 事件类型，用于路由
    event_type: EventType,
    /// 事件载荷版本
    #[builder(default = 1)]
    event_version: usize,
    /// 事件发生时间
    #[builder(default = Utc::now())]
    occurred_at: DateTime<Utc>,
    /// 关联 ID，用于将多个事件关联到同一个业务操作
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    /// 触发事件的主体 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actor_id: Option<String>,
    /// 事件负载
    #[builder(default)]
    payload: Value,
}

impl EventEnvelope {
    /// 以事件类型与载荷快速创建信封，事件类型非法时立即失败
    pub fn new(event_type: &str, payload: Value) -> DomainResult<Self> {
        Ok(Self::builder()
            .event_type(EventType::new(event_type)?)
            .payload(payload)
            .build())
    }

    /// 将强类型领域事件序列化为信封
    pub fn from_event<E: DomainEvent>(event: &E) -> DomainResult<Self> {
        Ok(Self::builder()
            .event_type(EventType::new(event.event_type())?)
            .event_version(event.event_version())
            .payload(serde_json::to_value(event)?)
            .build())
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn event_version(&self) -> usize {
        self.event_version
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 将载荷反序列化为具体类型
    pub fn payload_as<T: DeserializeOwned>(&self) -> DomainResult<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct OrderPlaced {
        order_id: u64,
    }

    impl DomainEvent for OrderPlaced {
        fn event_type(&self) -> &str {
            "OrderPlaced"
        }

        fn event_version(&self) -> usize {
            2
        }
    }

    #[test]
    fn from_event_carries_type_version_and_payload() {
        let env = EventEnvelope::from_event(&OrderPlaced { order_id: 42 }).unwrap();
        assert_eq!(env.event_type().as_str(), "OrderPlaced");
        assert_eq!(env.event_version(), 2);
        assert_eq!(env.payload(), &json!({"order_id": 42}));
        assert_eq!(
            env.payload_as::<OrderPlaced>().unwrap(),
            OrderPlaced { order_id: 42 }
        );
    }

    #[test]
    fn new_fails_fast_on_empty_type() {
        let err = EventEnvelope::new("", json!({})).unwrap_err();
        assert!(matches!(err, DomainError::InvalidEventType { .. }));
    }

    #[test]
    fn payload_as_reports_serde_error() {
        let env = EventEnvelope::new("OrderPlaced", json!({"order_id": "x"})).unwrap();
        let err = env.payload_as::<OrderPlaced>().unwrap_err();
        assert!(matches!(err, DomainError::Serde { .. }));
    }

    #[test]
    fn builder_keeps_optional_context() {
        let env = EventEnvelope::builder()
            .event_type(EventType::new("promotion.viewed").unwrap())
            .correlation_id("cor-1".to_string())
            .actor_id("u-1".to_string())
            .build();
        assert_eq!(env.correlation_id(), Some("cor-1"));
        assert_eq!(env.actor_id(), Some("u-1"));
        assert_eq!(env.event_version(), 1);
        assert!(env.payload().is_null());
    }
}
