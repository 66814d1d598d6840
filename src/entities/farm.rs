// 🚜 Farm Entity - Top-level work site owning crops, tasks and transactions

use super::{deserialize_id, Record, RecordId};
use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// FARM TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FarmType {
    /// Arable / row crops
    #[default]
    Crop,

    Livestock,

    /// Crops and livestock on the same site
    Mixed,

    Orchard,

    Vineyard,
}

impl FarmType {
    pub const ALL: [FarmType; 5] = [
        FarmType::Crop,
        FarmType::Livestock,
        FarmType::Mixed,
        FarmType::Orchard,
        FarmType::Vineyard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FarmType::Crop => "crop",
            FarmType::Livestock => "livestock",
            FarmType::Mixed => "mixed",
            FarmType::Orchard => "orchard",
            FarmType::Vineyard => "vineyard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FarmType::Crop => "Crop Farm",
            FarmType::Livestock => "Livestock Farm",
            FarmType::Mixed => "Mixed Farm",
            FarmType::Orchard => "Orchard",
            FarmType::Vineyard => "Vineyard",
        }
    }
}

impl FromStr for FarmType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::invalid(format!("unknown farm type: {}", s)))
    }
}

// ============================================================================
// FARM ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    #[serde(alias = "Id", deserialize_with = "deserialize_id")]
    pub id: RecordId,

    #[serde(alias = "Name")]
    pub name: String,

    pub location: String,

    /// Area in acres; must be positive
    pub size: f64,

    #[serde(rename = "type", default)]
    pub farm_type: FarmType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Farm {
    /// New farm with id 0; the store assigns the real id on create.
    pub fn new(name: &str, location: &str, size: f64, farm_type: FarmType) -> Self {
        Farm {
            id: 0,
            name: name.to_string(),
            location: location.to_string(),
            size,
            farm_type,
            description: None,
            created_at: None,
        }
    }

    /// Case-insensitive match on name or location. Empty term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.location.to_lowercase().contains(&term)
    }
}

impl Record for Farm {
    const ENTITY: &'static str = "farm";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn farm_id(&self) -> Option<RecordId> {
        None
    }

    fn validate(&self) -> StoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::invalid("farm name must not be empty"));
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(StoreError::invalid(format!(
                "farm size must be greater than zero (got {})",
                self.size
            )));
        }
        Ok(())
    }
}
