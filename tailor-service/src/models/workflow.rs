//! Workflow job model: production tracking for a bill.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bill::Bill;

/// Production pipeline stage. The order is total and fixed:
/// cutting < stitching < finishing < packaging < delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Cutting,
    Stitching,
    Finishing,
    Packaging,
    Delivered,
}

impl Stage {
    pub const ORDER: [Stage; 5] = [
        Stage::Cutting,
        Stage::Stitching,
        Stage::Finishing,
        Stage::Packaging,
        Stage::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Cutting => "cutting",
            Stage::Stitching => "stitching",
            Stage::Finishing => "finishing",
            Stage::Packaging => "packaging",
            Stage::Delivered => "delivered",
        }
    }

    /// Next stage in the pipeline; `None` at the terminal stage.
    pub fn next(&self) -> Option<Stage> {
        let idx = Self::ORDER.iter().position(|s| s == self)?;
        Self::ORDER.get(idx + 1).copied()
    }

    /// Previous stage; `None` at the first stage.
    pub fn prev(&self) -> Option<Stage> {
        let idx = Self::ORDER.iter().position(|s| s == self)?;
        idx.checked_sub(1).map(|i| Self::ORDER[i])
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cutting" => Ok(Stage::Cutting),
            "stitching" => Ok(Stage::Stitching),
            "finishing" => Ok(Stage::Finishing),
            "packaging" => Ok(Stage::Packaging),
            "delivered" => Ok(Stage::Delivered),
            other => Err(format!("Unknown stage: {}", other)),
        }
    }
}

/// Completion marker, a second status axis independent of `stage`.
/// A job can be marked completed while still sitting at any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowJob {
    #[serde(rename = "_id")]
    pub id: String,
    pub bill_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub stage: Stage,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub status: Option<JobStatus>,
    pub completed_at: Option<mongodb::bson::DateTime>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a job manually (validated at the boundary).
#[derive(Debug, Clone)]
pub struct NewJob {
    pub bill_id: String,
    pub customer_name: String,
    pub stage: Option<Stage>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub images: Vec<String>,
}

impl WorkflowJob {
    pub fn new(input: NewJob) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            bill_id: input.bill_id,
            customer_name: input.customer_name,
            stage: input.stage.unwrap_or_default(),
            assigned_to: input.assigned_to,
            notes: input.notes,
            images: input.images,
            status: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Job spawned automatically when a bill is created: first stage,
    /// customer name copied from the bill.
    pub fn spawned_for(bill: &Bill) -> Self {
        Self::new(NewJob {
            bill_id: bill.id.clone(),
            customer_name: bill.customer_name.clone(),
            stage: None,
            assigned_to: None,
            notes: None,
            images: Vec::new(),
        })
    }
}
