//! In-memory [`Store`] backend: test double and development fallback when
//! no MongoDB is reachable. State lives in process memory and resets on
//! restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use service_core::error::AppError;
use tokio::sync::RwLock;

use super::{BillFilter, BillPage, BillPatch, JobPatch, Store};
use crate::models::{Bill, BillStatus, Measurements, NewBill, Setting, Stage, WorkflowJob};

#[derive(Default)]
struct State {
    bills: Vec<Bill>,
    jobs: Vec<WorkflowJob>,
    settings: HashMap<String, Setting>,
}

pub struct MemStore {
    state: RwLock<State>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    /// Pre-seeded with two sample orders so the UI has something to show
    /// when running without a database.
    pub fn with_demo_data() -> Self {
        let mut store = Self::new();
        seed_demo(store.state.get_mut());
        store
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_demo(state: &mut State) {
    let now = Utc::now();

    let mut john = Bill::new(NewBill {
        bill_no: None,
        customer_name: "John Doe".to_string(),
        phone: "+91 9876543210".to_string(),
        garment_type: "shirt".to_string(),
        quantity: 2,
        rate: 800.0,
        advance: 500.0,
        due_date: Some(now + Duration::days(14)),
        tailor_notes: None,
        measurements: Measurements {
            length: Some(30.0),
            shoulder: Some(18.0),
            sleeve: Some(24.0),
            chest: Some(40.0),
            ..Measurements::default()
        },
        images: Vec::new(),
        drawings: Vec::new(),
    });
    john.created_at = now - Duration::minutes(2);
    john.updated_at = john.created_at;

    let mut jane = Bill::new(NewBill {
        bill_no: None,
        customer_name: "Jane Smith".to_string(),
        phone: "+91 8765432109".to_string(),
        garment_type: "dress".to_string(),
        quantity: 1,
        rate: 1200.0,
        advance: 600.0,
        due_date: Some(now + Duration::days(19)),
        tailor_notes: None,
        measurements: Measurements {
            length: Some(42.0),
            chest: Some(36.0),
            waist: Some(28.0),
            hips: Some(38.0),
            ..Measurements::default()
        },
        images: Vec::new(),
        drawings: Vec::new(),
    });
    jane.status = BillStatus::InProgress;
    jane.created_at = now - Duration::minutes(1);
    jane.updated_at = jane.created_at;

    let john_job = WorkflowJob::spawned_for(&john);
    let mut jane_job = WorkflowJob::spawned_for(&jane);
    jane_job.stage = Stage::Stitching;

    state.bills.push(john);
    state.bills.push(jane);
    state.jobs.push(john_job);
    state.jobs.push(jane_job);
}

fn matches(bill: &Bill, filter: &BillFilter) -> bool {
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let hit = bill.customer_name.to_lowercase().contains(&needle)
            || bill.phone.to_lowercase().contains(&needle);
        if !hit {
            return false;
        }
    }
    if let Some(any_of) = &filter.status_any_of {
        if !any_of.contains(&bill.status) {
            return false;
        }
    }
    if let Some(none_of) = &filter.status_none_of {
        if none_of.contains(&bill.status) {
            return false;
        }
    }
    true
}

fn apply_bill_patch(bill: &mut Bill, patch: BillPatch) {
    if let Some(v) = patch.customer_name {
        bill.customer_name = v;
    }
    if let Some(v) = patch.phone {
        bill.phone = v;
    }
    if let Some(v) = patch.garment_type {
        bill.garment_type = v;
    }
    if let Some(v) = patch.quantity {
        bill.quantity = v;
    }
    if let Some(v) = patch.rate {
        bill.rate = v;
    }
    if let Some(v) = patch.advance {
        bill.advance = v;
    }
    if let Some(v) = patch.subtotal {
        bill.subtotal = v;
    }
    if let Some(v) = patch.balance {
        bill.balance = v;
    }
    if let Some(v) = patch.status {
        bill.status = v;
    }
    if let Some(v) = patch.due_date {
        bill.due_date = Some(mongodb::bson::DateTime::from_chrono(v));
    }
    if let Some(v) = patch.tailor_notes {
        bill.tailor_notes = Some(v);
    }
    if let Some(v) = patch.measurements {
        bill.measurements = v;
    }
    if let Some(v) = patch.images {
        bill.images = v;
    }
    if let Some(v) = patch.drawings {
        bill.drawings = v;
    }
    bill.updated_at = Utc::now();
}

fn apply_job_patch(job: &mut WorkflowJob, patch: JobPatch) {
    if let Some(v) = patch.customer_name {
        job.customer_name = v;
    }
    if let Some(v) = patch.assigned_to {
        job.assigned_to = Some(v);
    }
    if let Some(v) = patch.notes {
        job.notes = Some(v);
    }
    if let Some(v) = patch.images {
        job.images = v;
    }
    if let Some(v) = patch.stage {
        job.stage = v;
    }
    if let Some(v) = patch.status {
        job.status = Some(v);
    }
    if let Some(v) = patch.completed_at {
        job.completed_at = Some(mongodb::bson::DateTime::from_chrono(v));
    }
    job.updated_at = Utc::now();
}

#[async_trait]
impl Store for MemStore {
    async fn insert_bill(&self, bill: &Bill) -> Result<(), AppError> {
        self.state.write().await.bills.push(bill.clone());
        Ok(())
    }

    async fn find_bill(&self, id: &str) -> Result<Option<Bill>, AppError> {
        let state = self.state.read().await;
        Ok(state.bills.iter().find(|b| b.id == id).cloned())
    }

    async fn bills_by_ids(&self, ids: &[String]) -> Result<Vec<Bill>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .bills
            .iter()
            .filter(|b| ids.contains(&b.id))
            .cloned()
            .collect())
    }

    async fn list_bills(
        &self,
        filter: &BillFilter,
        page: u64,
        limit: u64,
    ) -> Result<BillPage, AppError> {
        let state = self.state.read().await;
        let mut bills: Vec<Bill> = state
            .bills
            .iter()
            .filter(|b| matches(b, filter))
            .cloned()
            .collect();
        bills.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = bills.len() as u64;
        let skip = (page.saturating_sub(1) * limit) as usize;
        let bills = bills
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .collect();

        Ok(BillPage { bills, total })
    }

    async fn count_bills(&self, filter: &BillFilter) -> Result<u64, AppError> {
        let state = self.state.read().await;
        Ok(state.bills.iter().filter(|b| matches(b, filter)).count() as u64)
    }

    async fn update_bill(&self, id: &str, patch: BillPatch) -> Result<Option<Bill>, AppError> {
        let mut state = self.state.write().await;
        match state.bills.iter_mut().find(|b| b.id == id) {
            Some(bill) => {
                apply_bill_patch(bill, patch);
                Ok(Some(bill.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_bill(&self, id: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.bills.len();
        state.bills.retain(|b| b.id != id);
        Ok(state.bills.len() < before)
    }

    async fn recent_bills(&self, limit: i64) -> Result<Vec<Bill>, AppError> {
        let state = self.state.read().await;
        let mut bills: Vec<Bill> = state.bills.clone();
        bills.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bills.truncate(limit.max(0) as usize);
        Ok(bills)
    }

    async fn count_distinct_customers(&self) -> Result<u64, AppError> {
        let state = self.state.read().await;
        let names: std::collections::HashSet<&str> = state
            .bills
            .iter()
            .map(|b| b.customer_name.as_str())
            .collect();
        Ok(names.len() as u64)
    }

    async fn sum_subtotals(&self) -> Result<f64, AppError> {
        let state = self.state.read().await;
        Ok(state.bills.iter().map(|b| b.subtotal).sum())
    }

    async fn insert_job(&self, job: &WorkflowJob) -> Result<(), AppError> {
        self.state.write().await.jobs.push(job.clone());
        Ok(())
    }

    async fn find_job(&self, id: &str) -> Result<Option<WorkflowJob>, AppError> {
        let state = self.state.read().await;
        Ok(state.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list_jobs(&self, stage: Option<Stage>) -> Result<Vec<WorkflowJob>, AppError> {
        let state = self.state.read().await;
        let mut jobs: Vec<WorkflowJob> = state
            .jobs
            .iter()
            .filter(|j| stage.map_or(true, |s| j.stage == s))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(jobs)
    }

    async fn update_job(
        &self,
        id: &str,
        patch: JobPatch,
    ) -> Result<Option<WorkflowJob>, AppError> {
        let mut state = self.state.write().await;
        match state.jobs.iter_mut().find(|j| j.id == id) {
            Some(job) => {
                apply_job_patch(job, patch);
                Ok(Some(job.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_job(&self, id: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.jobs.len();
        state.jobs.retain(|j| j.id != id);
        Ok(state.jobs.len() < before)
    }

    async fn delete_jobs_for_bill(&self, bill_id: &str) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let before = state.jobs.len();
        state.jobs.retain(|j| j.bill_id != bill_id);
        Ok((before - state.jobs.len()) as u64)
    }

    async fn count_jobs_by_stage(&self) -> Result<HashMap<Stage, u64>, AppError> {
        let state = self.state.read().await;
        let mut counts = HashMap::new();
        for job in &state.jobs {
            *counts.entry(job.stage).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, AppError> {
        let state = self.state.read().await;
        Ok(state.settings.get(key).cloned())
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        state.settings.insert(key.to_string(), Setting::new(key, value));
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
