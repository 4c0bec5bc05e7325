//! Request/response types for the workflow endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::bills::BillResponse;
use crate::models::{Bill, JobStatus, NewJob, Stage, WorkflowJob};
use crate::services::store::JobPatch;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(
        required(message = "bill_id is required"),
        length(min = 1, message = "bill_id must not be empty")
    )]
    pub bill_id: Option<String>,
    #[validate(
        required(message = "customer_name is required"),
        length(min = 1, message = "customer_name must not be empty")
    )]
    pub customer_name: Option<String>,
    pub stage: Option<Stage>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl CreateJobRequest {
    /// Call after `validate()`; the required fields are present by then.
    pub fn into_new_job(self) -> NewJob {
        NewJob {
            bill_id: self.bill_id.unwrap_or_default(),
            customer_name: self.customer_name.unwrap_or_default(),
            stage: self.stage,
            assigned_to: self.assigned_to,
            notes: self.notes,
            images: self.images,
        }
    }
}

/// Field merge for a job. There is deliberately no `stage` here: one-step
/// moves go through the advance/regress routes and arbitrary jumps through
/// the stage override route.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, message = "customer_name must not be empty"))]
    pub customer_name: Option<String>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub images: Option<Vec<String>>,
}

impl UpdateJobRequest {
    pub fn into_patch(self) -> JobPatch {
        JobPatch {
            customer_name: self.customer_name,
            assigned_to: self.assigned_to,
            notes: self.notes,
            images: self.images,
            stage: None,
            status: None,
            completed_at: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StageOverrideRequest {
    pub stage: Stage,
}

#[derive(Debug, Deserialize)]
pub struct JobListParams {
    pub stage: Option<Stage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: String,
    pub bill_id: String,
    pub customer_name: String,
    pub stage: Stage,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub images: Vec<String>,
    pub status: Option<JobStatus>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<WorkflowJob> for JobResponse {
    fn from(job: WorkflowJob) -> Self {
        Self {
            id: job.id,
            bill_id: job.bill_id,
            customer_name: job.customer_name,
            stage: job.stage,
            assigned_to: job.assigned_to,
            notes: job.notes,
            images: job.images,
            status: job.status,
            completed_at: job.completed_at.map(|d| d.to_chrono().to_rfc3339()),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

/// A job with its bill joined in. The bill key is absent when the bill no
/// longer exists.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobWithBillResponse {
    #[serde(flatten)]
    pub job: JobResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill: Option<BillResponse>,
}

impl From<(WorkflowJob, Option<Bill>)> for JobWithBillResponse {
    fn from((job, bill): (WorkflowJob, Option<Bill>)) -> Self {
        Self {
            job: JobResponse::from(job),
            bill: bill.map(BillResponse::from),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobListResponse {
    pub workflows: Vec<JobWithBillResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_requires_bill_and_customer() {
        let req: CreateJobRequest = serde_json::from_str("{}").unwrap();
        let errors = req.validate().unwrap_err();

        let fields = errors.field_errors();
        assert!(fields.contains_key("bill_id"));
        assert!(fields.contains_key("customer_name"));
    }

    #[test]
    fn test_create_request_parses_stage_names() {
        let req: CreateJobRequest = serde_json::from_str(
            r#"{ "bill_id": "b1", "customer_name": "Asha", "stage": "finishing" }"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.stage, Some(Stage::Finishing));
    }

    #[test]
    fn test_update_request_has_no_stage_path() {
        // A stage field in the body of a plain update is ignored, not applied.
        let req: UpdateJobRequest =
            serde_json::from_str(r#"{ "notes": "rush order", "stage": "delivered" }"#).unwrap();

        let patch = req.into_patch();
        assert_eq!(patch.notes.as_deref(), Some("rush order"));
        assert!(patch.stage.is_none());
    }

    #[test]
    fn test_job_with_missing_bill_omits_bill_key() {
        let job = WorkflowJob::new(NewJob {
            bill_id: "ghost".to_string(),
            customer_name: "Orphan".to_string(),
            stage: None,
            assigned_to: None,
            notes: None,
            images: Vec::new(),
        });

        let rendered =
            serde_json::to_value(JobWithBillResponse::from((job, None))).unwrap();
        assert!(rendered.get("bill").is_none());
        assert_eq!(rendered["stage"], "cutting");
    }
}
