// 🔎 List Filters - Task, crop and farm views
//
// Day-granularity comparisons only: time-of-day on a due date never changes
// which filter a task falls into.

use crate::entities::{Crop, CropStatus, Farm, Task};
use crate::error::StoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// TASK FILTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    /// Open and due before the reference day
    Overdue,
    /// Open and due on the reference day
    Today,
}

impl TaskFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Pending => "pending",
            TaskFilter::Completed => "completed",
            TaskFilter::Overdue => "overdue",
            TaskFilter::Today => "today",
        }
    }
}

impl FromStr for TaskFilter {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(TaskFilter::All),
            "pending" => Ok(TaskFilter::Pending),
            "completed" => Ok(TaskFilter::Completed),
            "overdue" => Ok(TaskFilter::Overdue),
            "today" => Ok(TaskFilter::Today),
            other => Err(StoreError::invalid(format!("unknown task filter: {}", other))),
        }
    }
}

/// Membership test for one task under `filter`.
pub fn task_filter_predicate(task: &Task, filter: TaskFilter, reference: NaiveDate) -> bool {
    match filter {
        TaskFilter::All => true,
        TaskFilter::Pending => task.is_pending(),
        TaskFilter::Completed => task.completed,
        TaskFilter::Overdue => task.is_overdue(reference),
        TaskFilter::Today => task.is_due_on(reference),
    }
}

/// Tasks matching `filter`, input order preserved.
pub fn filter_tasks(tasks: &[Task], filter: TaskFilter, reference: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| task_filter_predicate(task, filter, reference))
        .collect()
}

// ============================================================================
// CROP FILTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropFilter {
    #[default]
    All,
    Status(CropStatus),
}

impl CropFilter {
    pub fn matches(&self, crop: &Crop) -> bool {
        match self {
            CropFilter::All => true,
            CropFilter::Status(status) => crop.status == *status,
        }
    }
}

impl FromStr for CropFilter {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(CropFilter::All),
            all if all.eq_ignore_ascii_case("all") => Ok(CropFilter::All),
            status => status.parse::<CropStatus>().map(CropFilter::Status),
        }
    }
}

pub fn filter_crops(crops: &[Crop], filter: CropFilter) -> Vec<&Crop> {
    crops.iter().filter(|crop| filter.matches(crop)).collect()
}

// ============================================================================
// FARM SEARCH
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FarmSort {
    #[default]
    Name,
    Location,
    /// Largest first
    Size,
    Type,
}

impl FromStr for FarmSort {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "name" => Ok(FarmSort::Name),
            "location" => Ok(FarmSort::Location),
            "size" => Ok(FarmSort::Size),
            "type" => Ok(FarmSort::Type),
            other => Err(StoreError::invalid(format!("unknown farm sort: {}", other))),
        }
    }
}

/// Farms whose name or location contains `term` (case-insensitive), sorted.
pub fn search_farms<'a>(farms: &'a [Farm], term: &str, sort: FarmSort) -> Vec<&'a Farm> {
    let mut found: Vec<&Farm> = farms.iter().filter(|farm| farm.matches_search(term)).collect();

    match sort {
        FarmSort::Name => found.sort_by_key(|farm| farm.name.to_lowercase()),
        FarmSort::Location => found.sort_by_key(|farm| farm.location.to_lowercase()),
        FarmSort::Size => found.sort_by(|a, b| b.size.total_cmp(&a.size)),
        FarmSort::Type => found.sort_by_key(|farm| farm.farm_type.as_str()),
    }

    found
}

// ============================================================================
// TESTS
// ============================================================================
