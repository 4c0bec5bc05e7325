pub mod database;
pub mod metrics;
pub mod orders;
pub mod stats;
pub mod store;

pub use database::MongoDb;
pub use metrics::{get_metrics, init_metrics};
pub use orders::OrderService;
pub use stats::{DashboardSummary, StatsService};
