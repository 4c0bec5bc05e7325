//! Dashboard aggregation, recomputed from live data on every request.

use std::collections::HashMap;
use std::sync::Arc;

use service_core::error::AppError;

use crate::models::{Bill, BillStatus, Stage};
use crate::services::store::{BillFilter, Store};

/// How many of the newest bills the dashboard shows.
const RECENT_BILLS: i64 = 5;

#[derive(Debug)]
pub struct DashboardSummary {
    pub total_customers: u64,
    pub active_orders: u64,
    pub completed_orders: u64,
    pub revenue: f64,
    pub recent_bills: Vec<Bill>,
    /// Stage to job count; stages with no jobs are absent.
    pub workflow_stages: HashMap<Stage, u64>,
}

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn Store>,
}

impl StatsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Collects the dashboard figures. Active and completed counts
    /// partition the bills: every bill lands in exactly one of the two.
    /// Revenue sums subtotals (not balances), so advances do not shift it.
    pub async fn collect(&self) -> Result<DashboardSummary, AppError> {
        let fulfilled = BillStatus::FULFILLED.to_vec();

        let total_customers = self.store.count_distinct_customers().await?;

        let active_orders = self
            .store
            .count_bills(&BillFilter {
                status_none_of: Some(fulfilled.clone()),
                ..BillFilter::default()
            })
            .await?;

        let completed_orders = self
            .store
            .count_bills(&BillFilter {
                status_any_of: Some(fulfilled),
                ..BillFilter::default()
            })
            .await?;

        let revenue = round2(self.store.sum_subtotals().await?);
        let recent_bills = self.store.recent_bills(RECENT_BILLS).await?;
        let workflow_stages = self.store.count_jobs_by_stage().await?;

        Ok(DashboardSummary {
            total_customers,
            active_orders,
            completed_orders,
            revenue,
            recent_bills,
            workflow_stages,
        })
    }
}

/// Round to two decimals for currency display.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1234.5678), 1234.57);
        assert_eq!(round2(10.333), 10.33);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(99.999), 100.0);
    }

    #[tokio::test]
    async fn test_collect_on_empty_store_is_all_zeroes() {
        use crate::services::store::MemStore;

        let stats = StatsService::new(Arc::new(MemStore::new()));
        let summary = stats.collect().await.unwrap();

        assert_eq!(summary.total_customers, 0);
        assert_eq!(summary.active_orders, 0);
        assert_eq!(summary.completed_orders, 0);
        assert_eq!(summary.revenue, 0.0);
        assert!(summary.recent_bills.is_empty());
        assert!(summary.workflow_stages.is_empty());
    }
}
