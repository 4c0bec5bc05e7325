//! Application assembly: store selection, router wiring and the server
//! lifecycle.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{StoreBackend, TailorConfig};
use crate::handlers;
use crate::services::database::MongoDb;
use crate::services::orders::OrderService;
use crate::services::stats::StatsService;
use crate::services::store::{MemStore, MongoStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub config: TailorConfig,
    pub store: Arc<dyn Store>,
    pub orders: OrderService,
    pub stats: StatsService,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: TailorConfig) -> Result<Self, AppError> {
        let store = select_store(&config).await?;

        let state = AppState {
            config: config.clone(),
            store: store.clone(),
            orders: OrderService::new(store.clone()),
            stats: StatsService::new(store),
        };

        let app = router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn store(&self) -> Arc<dyn Store> {
        self.state.store.clone()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

/// Picks the store backend once, at startup. Everything downstream works
/// against `Arc<dyn Store>` and never branches on the backend again.
async fn select_store(config: &TailorConfig) -> Result<Arc<dyn Store>, AppError> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!(
                seeded = config.store.seed_demo_data,
                "Using the in-memory store backend"
            );
            Ok(memory_store(config.store.seed_demo_data))
        }
        StoreBackend::Mongo => {
            let connect = async {
                let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database).await?;
                // with_uri_str only parses the URI; ping to force a real
                // round trip before committing to this backend.
                db.health_check().await?;
                db.initialize_indexes().await?;
                Ok::<MongoDb, AppError>(db)
            };

            match connect.await {
                Ok(db) => Ok(Arc::new(MongoStore::new(db)) as Arc<dyn Store>),
                Err(e) if config.store.fallback_to_memory => {
                    tracing::warn!(
                        error = %e,
                        "MongoDB unreachable, falling back to the seeded in-memory store; state resets on restart"
                    );
                    Ok(memory_store(true))
                }
                Err(e) => {
                    tracing::error!("Failed to initialize MongoDB store: {}", e);
                    Err(e)
                }
            }
        }
    }
}

fn memory_store(seed: bool) -> Arc<dyn Store> {
    if seed {
        Arc::new(MemStore::with_demo_data())
    } else {
        Arc::new(MemStore::new())
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics_endpoint))
        .route(
            "/bills",
            post(handlers::bills::create_bill).get(handlers::bills::list_bills),
        )
        .route(
            "/bills/:id",
            get(handlers::bills::get_bill)
                .put(handlers::bills::update_bill)
                .delete(handlers::bills::delete_bill),
        )
        .route(
            "/workflow",
            post(handlers::workflow::create_job).get(handlers::workflow::list_jobs),
        )
        .route(
            "/workflow/:id",
            put(handlers::workflow::update_job).delete(handlers::workflow::delete_job),
        )
        .route("/workflow/:id/complete", post(handlers::workflow::mark_completed))
        .route("/workflow/:id/advance", post(handlers::workflow::advance_stage))
        .route("/workflow/:id/regress", post(handlers::workflow::regress_stage))
        .route("/workflow/:id/stage", put(handlers::workflow::override_stage))
        .route("/dashboard", get(handlers::dashboard::dashboard_summary))
        .route(
            "/settings/upi",
            get(handlers::settings::get_upi).put(handlers::settings::update_upi),
        )
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
