//! service-core: Shared infrastructure for the star-tailors services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use mongodb;
pub use serde;
pub use tracing;
pub use validator;
