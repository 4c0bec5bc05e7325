//! MongoDB-backed [`Store`] implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument, UpdateOptions};
use service_core::error::AppError;

use super::{BillFilter, BillPage, BillPatch, JobPatch, Store};
use crate::models::{Bill, BillStatus, Setting, Stage, WorkflowJob};
use crate::services::database::MongoDb;

pub struct MongoStore {
    db: MongoDb,
}

impl MongoStore {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

/// Mongo's `$regex` has no literal mode; escape the metacharacters so a
/// search term stays a plain substring match.
fn regex_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if r"\.^$|?*+()[]{}".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn status_values(statuses: &[BillStatus]) -> Vec<Bson> {
    statuses
        .iter()
        .map(|s| Bson::String(s.as_str().to_string()))
        .collect()
}

fn bill_filter_doc(filter: &BillFilter) -> Document {
    let mut query = Document::new();

    if let Some(search) = &filter.search {
        let pattern = regex_escape(search);
        query.insert(
            "$or",
            vec![
                doc! { "customer_name": { "$regex": &pattern, "$options": "i" } },
                doc! { "phone": { "$regex": &pattern, "$options": "i" } },
            ],
        );
    }

    let mut status = Document::new();
    if let Some(any_of) = &filter.status_any_of {
        status.insert("$in", status_values(any_of));
    }
    if let Some(none_of) = &filter.status_none_of {
        status.insert("$nin", status_values(none_of));
    }
    if !status.is_empty() {
        query.insert("status", status);
    }

    query
}

fn bill_patch_doc(patch: BillPatch) -> Result<Document, AppError> {
    let mut set = Document::new();
    if let Some(v) = patch.customer_name {
        set.insert("customer_name", v);
    }
    if let Some(v) = patch.phone {
        set.insert("phone", v);
    }
    if let Some(v) = patch.garment_type {
        set.insert("garment_type", v);
    }
    if let Some(v) = patch.quantity {
        set.insert("quantity", v);
    }
    if let Some(v) = patch.rate {
        set.insert("rate", v);
    }
    if let Some(v) = patch.advance {
        set.insert("advance", v);
    }
    if let Some(v) = patch.subtotal {
        set.insert("subtotal", v);
    }
    if let Some(v) = patch.balance {
        set.insert("balance", v);
    }
    if let Some(v) = patch.status {
        set.insert("status", v.as_str());
    }
    if let Some(v) = patch.due_date {
        set.insert("due_date", mongodb::bson::DateTime::from_chrono(v));
    }
    if let Some(v) = patch.tailor_notes {
        set.insert("tailor_notes", v);
    }
    if let Some(v) = patch.measurements {
        let value = mongodb::bson::to_bson(&v).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to serialize measurements: {}", e))
        })?;
        set.insert("measurements", value);
    }
    if let Some(v) = patch.images {
        set.insert("images", v);
    }
    if let Some(v) = patch.drawings {
        set.insert("drawings", v);
    }
    Ok(set)
}

fn job_patch_doc(patch: JobPatch) -> Document {
    let mut set = Document::new();
    if let Some(v) = patch.customer_name {
        set.insert("customer_name", v);
    }
    if let Some(v) = patch.assigned_to {
        set.insert("assigned_to", v);
    }
    if let Some(v) = patch.notes {
        set.insert("notes", v);
    }
    if let Some(v) = patch.images {
        set.insert("images", v);
    }
    if let Some(v) = patch.stage {
        set.insert("stage", v.as_str());
    }
    if let Some(v) = patch.status {
        set.insert("status", v.as_str());
    }
    if let Some(v) = patch.completed_at {
        set.insert("completed_at", mongodb::bson::DateTime::from_chrono(v));
    }
    set
}

/// Aggregation rows come back with whatever numeric width the server
/// picked; normalize to f64.
fn numeric(doc: &Document, key: &str) -> f64 {
    match doc.get(key) {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn insert_bill(&self, bill: &Bill) -> Result<(), AppError> {
        self.db
            .bills()
            .insert_one(bill, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert bill: {}", e)))?;
        Ok(())
    }

    async fn find_bill(&self, id: &str) -> Result<Option<Bill>, AppError> {
        self.db
            .bills()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch bill: {}", e)))
    }

    async fn bills_by_ids(&self, ids: &[String]) -> Result<Vec<Bill>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut cursor = self
            .db
            .bills()
            .find(doc! { "_id": { "$in": ids } }, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch bills: {}", e)))?;

        let mut bills = Vec::new();
        while let Some(bill) = cursor.try_next().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to read bill cursor: {}", e))
        })? {
            bills.push(bill);
        }
        Ok(bills)
    }

    async fn list_bills(
        &self,
        filter: &BillFilter,
        page: u64,
        limit: u64,
    ) -> Result<BillPage, AppError> {
        let query = bill_filter_doc(filter);

        let total = self
            .db
            .bills()
            .count_documents(query.clone(), None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count bills: {}", e)))?;

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(page.saturating_sub(1) * limit)
            .limit(limit as i64)
            .build();

        let mut cursor = self
            .db
            .bills()
            .find(query, options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list bills: {}", e)))?;

        let mut bills = Vec::new();
        while let Some(bill) = cursor.try_next().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to read bill cursor: {}", e))
        })? {
            bills.push(bill);
        }

        Ok(BillPage { bills, total })
    }

    async fn count_bills(&self, filter: &BillFilter) -> Result<u64, AppError> {
        self.db
            .bills()
            .count_documents(bill_filter_doc(filter), None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count bills: {}", e)))
    }

    async fn update_bill(&self, id: &str, patch: BillPatch) -> Result<Option<Bill>, AppError> {
        let mut set = bill_patch_doc(patch)?;
        set.insert("updated_at", mongodb::bson::DateTime::now());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.db
            .bills()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update bill: {}", e)))
    }

    async fn delete_bill(&self, id: &str) -> Result<bool, AppError> {
        let result = self
            .db
            .bills()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete bill: {}", e)))?;
        Ok(result.deleted_count > 0)
    }

    async fn recent_bills(&self, limit: i64) -> Result<Vec<Bill>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .build();

        let mut cursor = self.db.bills().find(None, options).await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch recent bills: {}", e))
        })?;

        let mut bills = Vec::new();
        while let Some(bill) = cursor.try_next().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to read bill cursor: {}", e))
        })? {
            bills.push(bill);
        }
        Ok(bills)
    }

    async fn count_distinct_customers(&self) -> Result<u64, AppError> {
        let pipeline = vec![
            doc! { "$group": { "_id": "$customer_name" } },
            doc! { "$count": "total" },
        ];

        let mut cursor = self.db.bills().aggregate(pipeline, None).await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to count customers: {}", e))
        })?;

        // An empty collection yields no row at all.
        let total = match cursor.try_next().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to read aggregation: {}", e))
        })? {
            Some(row) => numeric(&row, "total") as u64,
            None => 0,
        };
        Ok(total)
    }

    async fn sum_subtotals(&self) -> Result<f64, AppError> {
        let pipeline = vec![doc! {
            "$group": { "_id": null, "revenue": { "$sum": "$subtotal" } }
        }];

        let mut cursor = self.db.bills().aggregate(pipeline, None).await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to sum revenue: {}", e))
        })?;

        let revenue = match cursor.try_next().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to read aggregation: {}", e))
        })? {
            Some(row) => numeric(&row, "revenue"),
            None => 0.0,
        };
        Ok(revenue)
    }

    async fn insert_job(&self, job: &WorkflowJob) -> Result<(), AppError> {
        self.db
            .jobs()
            .insert_one(job, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert job: {}", e)))?;
        Ok(())
    }

    async fn find_job(&self, id: &str) -> Result<Option<WorkflowJob>, AppError> {
        self.db
            .jobs()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch job: {}", e)))
    }

    async fn list_jobs(&self, stage: Option<Stage>) -> Result<Vec<WorkflowJob>, AppError> {
        let filter = stage.map(|s| doc! { "stage": s.as_str() });
        let options = FindOptions::builder()
            .sort(doc! { "updated_at": -1 })
            .build();

        let mut cursor = self
            .db
            .jobs()
            .find(filter, options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list jobs: {}", e)))?;

        let mut jobs = Vec::new();
        while let Some(job) = cursor.try_next().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to read job cursor: {}", e))
        })? {
            jobs.push(job);
        }
        Ok(jobs)
    }

    async fn update_job(
        &self,
        id: &str,
        patch: JobPatch,
    ) -> Result<Option<WorkflowJob>, AppError> {
        let mut set = job_patch_doc(patch);
        set.insert("updated_at", mongodb::bson::DateTime::now());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.db
            .jobs()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update job: {}", e)))
    }

    async fn delete_job(&self, id: &str) -> Result<bool, AppError> {
        let result = self
            .db
            .jobs()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete job: {}", e)))?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_jobs_for_bill(&self, bill_id: &str) -> Result<u64, AppError> {
        let result = self
            .db
            .jobs()
            .delete_many(doc! { "bill_id": bill_id }, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to cascade job delete: {}", e))
            })?;
        Ok(result.deleted_count)
    }

    async fn count_jobs_by_stage(&self) -> Result<HashMap<Stage, u64>, AppError> {
        let pipeline = vec![doc! {
            "$group": { "_id": "$stage", "count": { "$sum": 1 } }
        }];

        let mut cursor = self.db.jobs().aggregate(pipeline, None).await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to group jobs by stage: {}", e))
        })?;

        let mut counts = HashMap::new();
        while let Some(row) = cursor.try_next().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to read aggregation: {}", e))
        })? {
            match row.get_str("_id").ok().map(str::parse::<Stage>) {
                Some(Ok(stage)) => {
                    counts.insert(stage, numeric(&row, "count") as u64);
                }
                // Legacy rows with a stage outside the pipeline are skipped
                // rather than miscounted under some default stage.
                _ => {
                    tracing::warn!(row = ?row, "Skipping workflow row with unrecognized stage");
                }
            }
        }
        Ok(counts)
    }

    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, AppError> {
        self.db
            .settings()
            .find_one(doc! { "key": key }, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch setting: {}", e)))
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.db
            .settings()
            .update_one(
                doc! { "key": key },
                doc! { "$set": {
                    "key": key,
                    "value": value,
                    "updated_at": mongodb::bson::DateTime::now(),
                } },
                options,
            )
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to upsert setting: {}", e))
            })?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_escape_neutralizes_metacharacters() {
        assert_eq!(regex_escape("Asha"), "Asha");
        assert_eq!(regex_escape("a.b"), "a\\.b");
        assert_eq!(regex_escape("(91) 555"), "\\(91\\) 555");
        assert_eq!(regex_escape("x*+?"), "x\\*\\+\\?");
    }

    #[test]
    fn test_bill_filter_doc_search_covers_name_and_phone() {
        let filter = BillFilter {
            search: Some("asha".to_string()),
            ..BillFilter::default()
        };
        let query = bill_filter_doc(&filter);

        let or = query.get_array("$or").unwrap();
        assert_eq!(or.len(), 2);
        assert!(query.get("status").is_none());
    }

    #[test]
    fn test_bill_filter_doc_status_sets() {
        let filter = BillFilter {
            search: None,
            status_any_of: Some(vec![BillStatus::Completed, BillStatus::Delivered]),
            status_none_of: None,
        };
        let query = bill_filter_doc(&filter);

        let status = query.get_document("status").unwrap();
        let any_of = status.get_array("$in").unwrap();
        assert_eq!(any_of.len(), 2);
        assert_eq!(any_of[0], Bson::String("completed".to_string()));
    }

    #[test]
    fn test_bill_patch_doc_skips_unset_fields() {
        let patch = BillPatch {
            rate: Some(600.0),
            tailor_notes: Some("hem shorter".to_string()),
            ..BillPatch::default()
        };
        let set = bill_patch_doc(patch).unwrap();

        assert_eq!(set.get_f64("rate").unwrap(), 600.0);
        assert_eq!(set.get_str("tailor_notes").unwrap(), "hem shorter");
        assert!(set.get("quantity").is_none());
        assert!(set.get("subtotal").is_none());
    }

    #[test]
    fn test_job_patch_doc_stage_and_completion() {
        let patch = JobPatch {
            stage: Some(Stage::Packaging),
            status: Some(crate::models::JobStatus::Completed),
            completed_at: Some(chrono::Utc::now()),
            ..JobPatch::default()
        };
        let set = job_patch_doc(patch);

        assert_eq!(set.get_str("stage").unwrap(), "packaging");
        assert_eq!(set.get_str("status").unwrap(), "Completed");
        assert!(set.get_datetime("completed_at").is_ok());
    }
}
