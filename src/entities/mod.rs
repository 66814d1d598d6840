// Entity Models
//
// Every record carries a canonical integer id. Ids are accepted as JSON
// numbers or numeric strings at the store boundary and never re-coerced
// after that.

pub mod crop;
pub mod farm;
pub mod task;
pub mod transaction;
pub mod weather;

pub use crop::{Crop, CropStatus};
pub use farm::{Farm, FarmType};
pub use task::{Task, TaskPriority, TaskType};
pub use transaction::{Transaction, TransactionType, EXPENSE_CATEGORIES, INCOME_CATEGORIES};
pub use weather::{WeatherCondition, WeatherDay};

use crate::error::StoreResult;
use serde::{Deserialize, Deserializer};

/// Canonical record identifier.
pub type RecordId = i64;

/// Common surface the record store needs from every farm-scoped entity.
pub trait Record: Clone {
    /// Entity name used in errors and audit events.
    const ENTITY: &'static str;

    fn id(&self) -> RecordId;
    fn set_id(&mut self, id: RecordId);

    /// Owning farm, `None` for farms themselves.
    fn farm_id(&self) -> Option<RecordId>;

    /// Linked crop, only tasks have one.
    fn crop_id(&self) -> Option<RecordId> {
        None
    }

    /// Field-level invariants (referential checks live in the store).
    fn validate(&self) -> StoreResult<()>;
}

// ============================================================================
// ID DESERIALIZATION
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    fn into_id<E: serde::de::Error>(self) -> Result<RecordId, E> {
        match self {
            RawId::Int(id) => Ok(id),
            RawId::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| E::custom(format!("invalid record id: {:?}", text))),
        }
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer)?.into_id()
}

pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(raw) => raw.into_id().map(Some),
    }
}
