use chrono::{DateTime, Utc};
use uuid::Uuid;

pub trait DomainEvent: Send + Sync + Clone {
    fn event_type(&self) -> &'static str;
    fn avatar_id(&self) -> Uuid;
    fn occurred_at(&self) -> DateTime<Utc>;
}
