#![allow(dead_code)]

use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use tailor_service::config::{MongoConfig, StoreBackend, StoreConfig, TailorConfig};
use tailor_service::startup::Application;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawns the application on a random port against an empty in-memory
    /// store, so tests run without a live MongoDB.
    pub async fn spawn() -> Self {
        let config = TailorConfig {
            common: CoreConfig {
                port: 0, // Random port for testing
                environment: "dev".to_string(),
            },
            mongodb: MongoConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "tailor_test".to_string(),
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                seed_demo_data: false,
                fallback_to_memory: false,
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to come up by polling the health endpoint.
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_empty(&self, path: &str) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a bill and returns its JSON body.
    pub async fn create_bill(&self, customer: &str, phone: &str, quantity: i64, rate: f64) -> Value {
        let response = self
            .post(
                "/bills",
                &json!({
                    "customer_name": customer,
                    "phone": phone,
                    "garment_type": "shirt",
                    "quantity": quantity,
                    "rate": rate,
                }),
            )
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Bill response was not JSON")
    }

    /// Finds the id of a workflow job referencing the given bill.
    pub async fn job_for_bill(&self, bill_id: &str) -> Option<String> {
        let body: Value = self
            .get("/workflow")
            .await
            .json()
            .await
            .expect("Workflow response was not JSON");

        body["workflows"].as_array().and_then(|jobs| {
            jobs.iter()
                .find(|j| j["bill_id"] == bill_id)
                .and_then(|j| j["id"].as_str().map(String::from))
        })
    }
}
