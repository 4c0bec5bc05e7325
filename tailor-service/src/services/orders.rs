//! Order lifecycle coordination between bills and workflow jobs.
//!
//! Invariants enforced here: creating a bill spawns its tracking job at the
//! first stage; deleting a bill removes every job referencing it; stage
//! transitions move exactly one step along the fixed pipeline order. The
//! reverse direction is intentionally absent: deleting a job never touches
//! the bill, which is the financial record and outlives its tracking entry.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use service_core::error::AppError;

use crate::models::{Bill, JobStatus, NewBill, NewJob, Stage, WorkflowJob};
use crate::services::store::{BillFilter, BillPage, BillPatch, JobPatch, Store};

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates the bill, then spawns its tracking job at the first stage.
    ///
    /// The two writes are sequential, not transactional. When the spawn
    /// fails the bill stands and the gap is logged; the job can be created
    /// manually afterwards.
    pub async fn create_bill(&self, input: NewBill) -> Result<Bill, AppError> {
        let bill = Bill::new(input);
        self.store.insert_bill(&bill).await?;

        metrics::counter!("bills_created_total").increment(1);

        let job = WorkflowJob::spawned_for(&bill);
        match self.store.insert_job(&job).await {
            Ok(()) => {
                metrics::counter!("workflow_jobs_spawned_total").increment(1);
                tracing::info!(
                    bill_id = %bill.id,
                    job_id = %job.id,
                    "Created bill and spawned workflow job"
                );
            }
            Err(e) => {
                tracing::warn!(
                    bill_id = %bill.id,
                    error = %e,
                    "Bill stored but workflow job spawn failed; order has no pipeline entry"
                );
            }
        }

        Ok(bill)
    }

    pub async fn get_bill(&self, id: &str) -> Result<Bill, AppError> {
        self.store
            .find_bill(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Bill not found")))
    }

    pub async fn list_bills(
        &self,
        filter: &BillFilter,
        page: u64,
        limit: u64,
    ) -> Result<BillPage, AppError> {
        self.store.list_bills(filter, page, limit).await
    }

    /// Partial update. Whenever quantity, rate or advance changes, the
    /// current record is reloaded and subtotal/balance recomputed from the
    /// merged values, so the stored arithmetic never drifts.
    pub async fn update_bill(&self, id: &str, mut patch: BillPatch) -> Result<Bill, AppError> {
        if patch.quantity.is_some() || patch.rate.is_some() || patch.advance.is_some() {
            let current = self.get_bill(id).await?;
            let quantity = patch.quantity.unwrap_or(current.quantity);
            let rate = patch.rate.unwrap_or(current.rate);
            let advance = patch.advance.unwrap_or(current.advance);

            let (subtotal, balance) = Bill::compute_totals(quantity, rate, advance);
            patch.subtotal = Some(subtotal);
            patch.balance = Some(balance);
        }

        self.store
            .update_bill(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Bill not found")))
    }

    /// Deletes the bill and every job referencing it. Jobs go first; zero
    /// matching jobs is not an error.
    pub async fn delete_bill(&self, id: &str) -> Result<(), AppError> {
        let removed = self.store.delete_jobs_for_bill(id).await?;

        if !self.store.delete_bill(id).await? {
            return Err(AppError::NotFound(anyhow!("Bill not found")));
        }

        metrics::counter!("bills_deleted_total").increment(1);
        tracing::info!(
            bill_id = %id,
            jobs_removed = removed,
            "Deleted bill and cascaded to workflow jobs"
        );
        Ok(())
    }

    pub async fn create_job(&self, input: NewJob) -> Result<WorkflowJob, AppError> {
        let job = WorkflowJob::new(input);
        self.store.insert_job(&job).await?;
        tracing::info!(job_id = %job.id, bill_id = %job.bill_id, "Created workflow job");
        Ok(job)
    }

    pub async fn get_job(&self, id: &str) -> Result<WorkflowJob, AppError> {
        self.store
            .find_job(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Workflow job not found")))
    }

    /// All jobs joined with their bill. A job whose bill is gone still
    /// lists; it simply carries no bill data.
    pub async fn list_jobs_with_bills(
        &self,
        stage: Option<Stage>,
    ) -> Result<Vec<(WorkflowJob, Option<Bill>)>, AppError> {
        let jobs = self.store.list_jobs(stage).await?;

        let ids: Vec<String> = jobs.iter().map(|j| j.bill_id.clone()).collect();
        let by_id: HashMap<String, Bill> = self
            .store
            .bills_by_ids(&ids)
            .await?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        Ok(jobs
            .into_iter()
            .map(|job| {
                let bill = by_id.get(&job.bill_id).cloned();
                (job, bill)
            })
            .collect())
    }

    /// Plain field merge. The patch built from the public update route
    /// never carries a stage; arbitrary stage writes go through
    /// [`Self::override_stage`].
    pub async fn update_job(&self, id: &str, patch: JobPatch) -> Result<WorkflowJob, AppError> {
        self.store
            .update_job(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Workflow job not found")))
    }

    /// Sets the completion marker and timestamp. The stage is untouched: a
    /// job can be completed while still sitting anywhere in the pipeline.
    pub async fn mark_job_completed(&self, id: &str) -> Result<WorkflowJob, AppError> {
        let patch = JobPatch {
            status: Some(JobStatus::Completed),
            completed_at: Some(Utc::now()),
            ..JobPatch::default()
        };
        let job = self
            .store
            .update_job(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Workflow job not found")))?;

        tracing::info!(job_id = %id, stage = job.stage.as_str(), "Workflow job marked completed");
        Ok(job)
    }

    /// One step forward. At the terminal stage this is a no-op returning
    /// the job unchanged.
    pub async fn advance_stage(&self, id: &str) -> Result<WorkflowJob, AppError> {
        let job = self.get_job(id).await?;
        match job.stage.next() {
            Some(next) => self.set_stage(job, next, "advance").await,
            None => Ok(job),
        }
    }

    /// One step back. At the first stage this is a no-op returning the job
    /// unchanged.
    pub async fn regress_stage(&self, id: &str) -> Result<WorkflowJob, AppError> {
        let job = self.get_job(id).await?;
        match job.stage.prev() {
            Some(prev) => self.set_stage(job, prev, "regress").await,
            None => Ok(job),
        }
    }

    /// Administrative write that jumps to any stage, skipping the one-step
    /// rule. Kept on its own path so the ordinary routes stay checked.
    pub async fn override_stage(&self, id: &str, stage: Stage) -> Result<WorkflowJob, AppError> {
        let patch = JobPatch {
            stage: Some(stage),
            ..JobPatch::default()
        };
        let job = self
            .store
            .update_job(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Workflow job not found")))?;

        let labels = [("direction", "override".to_string())];
        metrics::counter!("workflow_stage_transitions_total", &labels).increment(1);
        tracing::warn!(
            job_id = %id,
            stage = stage.as_str(),
            "Stage override applied, ordering checks bypassed"
        );
        Ok(job)
    }

    async fn set_stage(
        &self,
        job: WorkflowJob,
        stage: Stage,
        direction: &'static str,
    ) -> Result<WorkflowJob, AppError> {
        let patch = JobPatch {
            stage: Some(stage),
            ..JobPatch::default()
        };
        match self.store.update_job(&job.id, patch).await? {
            Some(updated) => {
                let labels = [("direction", direction.to_string())];
                metrics::counter!("workflow_stage_transitions_total", &labels).increment(1);
                tracing::info!(
                    job_id = %updated.id,
                    from = job.stage.as_str(),
                    to = stage.as_str(),
                    "Stage transition"
                );
                Ok(updated)
            }
            // Deleted between the read and the write; surface as a miss.
            None => Err(AppError::NotFound(anyhow!("Workflow job not found"))),
        }
    }

    /// Deletes the job alone. No reverse cascade.
    pub async fn delete_job(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete_job(id).await? {
            return Err(AppError::NotFound(anyhow!("Workflow job not found")));
        }
        tracing::info!(job_id = %id, "Deleted workflow job");
        Ok(())
    }
}
