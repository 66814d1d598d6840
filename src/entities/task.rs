// ✅ Task Entity - Scheduled farm work, optionally tied to one crop

use super::{deserialize_id, deserialize_optional_id, Record, RecordId};
use crate::dates::{is_same_day, parse_record_date};
use crate::error::{StoreError, StoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// TASK TYPE / PRIORITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Watering,
    Fertilizing,
    Harvesting,
    Planting,
    Pruning,
    Weeding,
    PestControl,
    Other,
}

impl TaskType {
    pub const ALL: [TaskType; 8] = [
        TaskType::Watering,
        TaskType::Fertilizing,
        TaskType::Harvesting,
        TaskType::Planting,
        TaskType::Pruning,
        TaskType::Weeding,
        TaskType::PestControl,
        TaskType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Watering => "watering",
            TaskType::Fertilizing => "fertilizing",
            TaskType::Harvesting => "harvesting",
            TaskType::Planting => "planting",
            TaskType::Pruning => "pruning",
            TaskType::Weeding => "weeding",
            TaskType::PestControl => "pest_control",
            TaskType::Other => "other",
        }
    }
}

impl FromStr for TaskType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::invalid(format!("unknown task type: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

// ============================================================================
// TASK ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(alias = "Id", deserialize_with = "deserialize_id")]
    pub id: RecordId,

    #[serde(deserialize_with = "deserialize_id")]
    pub farm_id: RecordId,

    #[serde(default, deserialize_with = "deserialize_optional_id", skip_serializing_if = "Option::is_none")]
    pub crop_id: Option<RecordId>,

    #[serde(alias = "Name")]
    pub title: String,

    #[serde(rename = "type")]
    pub task_type: TaskType,

    pub due_date: String,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Task {
    pub fn new(farm_id: RecordId, title: &str, task_type: TaskType, due_date: &str) -> Self {
        Task {
            id: 0,
            farm_id,
            crop_id: None,
            title: title.to_string(),
            task_type,
            due_date: due_date.to_string(),
            priority: TaskPriority::default(),
            completed: false,
            notes: None,
        }
    }

    pub fn due_on(&self) -> Option<NaiveDate> {
        parse_record_date(&self.due_date)
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    /// Not completed and due strictly before `reference` (day granularity).
    pub fn is_overdue(&self, reference: NaiveDate) -> bool {
        !self.completed && self.due_on().map_or(false, |due| due < reference)
    }

    /// Not completed and due strictly after `reference` (day granularity).
    pub fn is_upcoming(&self, reference: NaiveDate) -> bool {
        !self.completed && self.due_on().map_or(false, |due| due > reference)
    }

    /// Not completed and due on `reference`.
    pub fn is_due_on(&self, reference: NaiveDate) -> bool {
        !self.completed && is_same_day(&self.due_date, reference)
    }
}

impl Record for Task {
    const ENTITY: &'static str = "task";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn farm_id(&self) -> Option<RecordId> {
        Some(self.farm_id)
    }

    fn crop_id(&self) -> Option<RecordId> {
        self.crop_id
    }

    fn validate(&self) -> StoreResult<()> {
        if self.title.trim().is_empty() {
            return Err(StoreError::invalid("task title must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_date_states() {
        let reference = ymd(2024, 3, 15);
        let mut task = Task::new(1, "Irrigate north field", TaskType::Watering, "2024-03-10");

        assert!(task.is_overdue(reference));
        assert!(!task.is_upcoming(reference));
        assert!(!task.is_due_on(reference));

        task.due_date = "2024-03-15T17:00:00".to_string();
        assert!(!task.is_overdue(reference));
        assert!(!task.is_upcoming(reference));
        assert!(task.is_due_on(reference));

        task.due_date = "2024-03-16".to_string();
        assert!(task.is_upcoming(reference));

        task.completed = true;
        assert!(!task.is_upcoming(reference));
        assert!(!task.is_pending());
    }

    #[test]
    fn test_unparsable_due_date_is_never_dated() {
        let task = Task::new(1, "Mystery", TaskType::Other, "whenever");
        let reference = ymd(2024, 3, 15);

        assert!(task.is_pending());
        assert!(!task.is_overdue(reference));
        assert!(!task.is_upcoming(reference));
        assert!(!task.is_due_on(reference));
    }

    #[test]
    fn test_task_deserializes_pest_control() {
        let json = r#"{"Id": 3, "farmId": 1, "cropId": "9", "title": "Spray aphids",
                       "type": "pest_control", "dueDate": "2024-05-01", "priority": "high",
                       "completed": false}"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.task_type, TaskType::PestControl);
        assert_eq!(task.crop_id, Some(9));
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!("PEST_CONTROL".parse::<TaskType>().unwrap(), TaskType::PestControl);
    }
}
