// 🌱 Crop Entity - A planting on one field of one farm

use super::{deserialize_id, Record, RecordId};
use crate::dates::{days_between, parse_record_date};
use crate::error::{StoreError, StoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// CROP STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropStatus {
    Planted,
    Growing,
    Harvested,
    Failed,
}

impl CropStatus {
    pub const ALL: [CropStatus; 4] = [
        CropStatus::Planted,
        CropStatus::Growing,
        CropStatus::Harvested,
        CropStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropStatus::Planted => "planted",
            CropStatus::Growing => "growing",
            CropStatus::Harvested => "harvested",
            CropStatus::Failed => "failed",
        }
    }

    /// Still in the ground.
    pub fn is_active(&self) -> bool {
        matches!(self, CropStatus::Planted | CropStatus::Growing)
    }
}

impl FromStr for CropStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::invalid(format!("unknown crop status: {}", s)))
    }
}

// ============================================================================
// CROP ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    #[serde(alias = "Id", deserialize_with = "deserialize_id")]
    pub id: RecordId,

    #[serde(deserialize_with = "deserialize_id")]
    pub farm_id: RecordId,

    /// Display name; falls back to "type - variety"
    #[serde(alias = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// e.g. corn, tomato, wheat
    #[serde(rename = "type")]
    pub crop_type: String,

    #[serde(default)]
    pub variety: String,

    pub planting_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_harvest: Option<String>,

    #[serde(default)]
    pub field_location: String,

    pub status: CropStatus,
}

impl Crop {
    pub fn new(farm_id: RecordId, crop_type: &str, variety: &str, planting_date: &str, status: CropStatus) -> Self {
        Crop {
            id: 0,
            farm_id,
            name: None,
            crop_type: crop_type.to_string(),
            variety: variety.to_string(),
            planting_date: planting_date.to_string(),
            expected_harvest: None,
            field_location: String::new(),
            status,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("{} - {}", self.crop_type, self.variety),
        }
    }

    pub fn planted_on(&self) -> Option<NaiveDate> {
        parse_record_date(&self.planting_date)
    }

    pub fn harvest_on(&self) -> Option<NaiveDate> {
        self.expected_harvest.as_deref().and_then(parse_record_date)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Days from `reference` until the expected harvest (negative once it has
    /// passed). `None` without a usable expected-harvest date.
    pub fn days_to_harvest(&self, reference: NaiveDate) -> Option<i64> {
        self.harvest_on().map(|harvest| days_between(reference, harvest))
    }
}

impl Record for Crop {
    const ENTITY: &'static str = "crop";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn farm_id(&self) -> Option<RecordId> {
        Some(self.farm_id)
    }

    fn validate(&self) -> StoreResult<()> {
        if self.crop_type.trim().is_empty() {
            return Err(StoreError::invalid("crop type must not be empty"));
        }
        Ok(())
    }
}
