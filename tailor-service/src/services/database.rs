//! MongoDB connection handling and collection access.

use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client as MongoClient, Collection, Database, IndexModel};
use service_core::error::AppError;

use crate::models::{Bill, Setting, WorkflowJob};

/// Shared handle to the shop database. Cheap to clone.
#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    database: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!("MongoDB connection failed: {}", e))
        })?;

        let database = client.database(db_name);
        tracing::info!("Connected to MongoDB database: {}", db_name);

        Ok(Self { client, database })
    }

    /// Creates the indexes the query paths rely on. Safe to run on every
    /// startup; MongoDB treats existing identical indexes as a no-op.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        // Every bill listing sorts newest-first.
        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("bills_created_at_desc".to_string())
                    .build(),
            )
            .build();
        self.bills()
            .create_index(created_at_index, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create bill index: {}", e))
            })?;

        // Cascade deletes and the job/bill join look up jobs by bill_id.
        let bill_id_index = IndexModel::builder()
            .keys(doc! { "bill_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("workflow_bill_id".to_string())
                    .build(),
            )
            .build();
        self.jobs()
            .create_index(bill_id_index, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create workflow index: {}", e))
            })?;

        // Settings are fetched and upserted by key.
        let key_index = IndexModel::builder()
            .keys(doc! { "key": 1 })
            .options(
                IndexOptions::builder()
                    .name("settings_key_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.settings()
            .create_index(key_index, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create settings index: {}", e))
            })?;

        tracing::info!("MongoDB indexes initialized");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("MongoDB health check failed: {}", e))
            })?;
        Ok(())
    }

    pub fn bills(&self) -> Collection<Bill> {
        self.database.collection("bills")
    }

    pub fn jobs(&self) -> Collection<WorkflowJob> {
        self.database.collection("workflow")
    }

    pub fn settings(&self) -> Collection<Setting> {
        self.database.collection("settings")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}
