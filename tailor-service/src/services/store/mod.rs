//! Document-store abstraction: one trait, two backends.
//!
//! Handlers and services hold an `Arc<dyn Store>` chosen once at startup.
//! [`MongoStore`] is the production backend; [`MemStore`] backs tests and
//! the development fallback when no database is reachable.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;

use crate::models::{Bill, BillStatus, JobStatus, Measurements, Setting, Stage, WorkflowJob};

mod memory;
mod mongo;

pub use memory::MemStore;
pub use mongo::MongoStore;

/// Filters for bill listings and counts. All criteria are ANDed.
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    /// Case-insensitive substring over customer name or phone.
    pub search: Option<String>,
    /// Keep only bills whose status is in the set.
    pub status_any_of: Option<Vec<BillStatus>>,
    /// Drop bills whose status is in the set.
    pub status_none_of: Option<Vec<BillStatus>>,
}

/// One page of bills plus the total match count across all pages.
#[derive(Debug)]
pub struct BillPage {
    pub bills: Vec<Bill>,
    pub total: u64,
}

/// Partial update for a bill; `None` fields are left untouched.
/// `subtotal` and `balance` are derived fields, set only by the order
/// service after recomputation.
#[derive(Debug, Clone, Default)]
pub struct BillPatch {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub garment_type: Option<String>,
    pub quantity: Option<i64>,
    pub rate: Option<f64>,
    pub advance: Option<f64>,
    pub subtotal: Option<f64>,
    pub balance: Option<f64>,
    pub status: Option<BillStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub tailor_notes: Option<String>,
    pub measurements: Option<Measurements>,
    pub images: Option<Vec<String>>,
    pub drawings: Option<Vec<String>>,
}

/// Partial update for a workflow job. `stage` only flows in from the stage
/// transition and override paths, never from the plain field-merge route.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub customer_name: Option<String>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub images: Option<Vec<String>>,
    pub stage: Option<Stage>,
    pub status: Option<JobStatus>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Persistence operations for bills, workflow jobs and settings.
///
/// Both implementations stamp `updated_at` on every successful update.
/// Update and delete methods report a missing record through their return
/// value (`None` / `false`) rather than an error; callers decide whether
/// that is a 404.
#[async_trait]
pub trait Store: Send + Sync {
    // Bills
    async fn insert_bill(&self, bill: &Bill) -> Result<(), AppError>;
    async fn find_bill(&self, id: &str) -> Result<Option<Bill>, AppError>;
    async fn bills_by_ids(&self, ids: &[String]) -> Result<Vec<Bill>, AppError>;
    /// Newest-first page of matching bills plus the total match count.
    async fn list_bills(
        &self,
        filter: &BillFilter,
        page: u64,
        limit: u64,
    ) -> Result<BillPage, AppError>;
    async fn count_bills(&self, filter: &BillFilter) -> Result<u64, AppError>;
    async fn update_bill(&self, id: &str, patch: BillPatch) -> Result<Option<Bill>, AppError>;
    async fn delete_bill(&self, id: &str) -> Result<bool, AppError>;
    async fn recent_bills(&self, limit: i64) -> Result<Vec<Bill>, AppError>;
    async fn count_distinct_customers(&self) -> Result<u64, AppError>;
    async fn sum_subtotals(&self) -> Result<f64, AppError>;

    // Workflow jobs
    async fn insert_job(&self, job: &WorkflowJob) -> Result<(), AppError>;
    async fn find_job(&self, id: &str) -> Result<Option<WorkflowJob>, AppError>;
    /// All jobs, most recently updated first, optionally narrowed to a stage.
    async fn list_jobs(&self, stage: Option<Stage>) -> Result<Vec<WorkflowJob>, AppError>;
    async fn update_job(&self, id: &str, patch: JobPatch)
        -> Result<Option<WorkflowJob>, AppError>;
    async fn delete_job(&self, id: &str) -> Result<bool, AppError>;
    /// Cascade helper: removes every job referencing the bill and returns
    /// how many were removed. Zero matches is not an error.
    async fn delete_jobs_for_bill(&self, bill_id: &str) -> Result<u64, AppError>;
    async fn count_jobs_by_stage(&self) -> Result<HashMap<Stage, u64>, AppError>;

    // Settings
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, AppError>;
    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), AppError>;

    // Liveness
    async fn ping(&self) -> Result<(), AppError>;
}
