//! Response type for the dashboard endpoint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::bills::BillResponse;
use crate::services::stats::DashboardSummary;

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_customers: u64,
    pub active_orders: u64,
    pub completed_orders: u64,
    pub revenue: f64,
    pub recent_bills: Vec<BillResponse>,
    /// Stage name to job count; stages with no jobs are absent.
    pub workflow_stages: HashMap<String, u64>,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            total_customers: summary.total_customers,
            active_orders: summary.active_orders,
            completed_orders: summary.completed_orders,
            revenue: summary.revenue,
            recent_bills: summary
                .recent_bills
                .into_iter()
                .map(BillResponse::from)
                .collect(),
            workflow_stages: summary
                .workflow_stages
                .into_iter()
                .map(|(stage, count)| (stage.as_str().to_string(), count))
                .collect(),
        }
    }
}
