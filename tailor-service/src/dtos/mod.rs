pub mod bills;
pub mod dashboard;
pub mod settings;
pub mod workflow;

pub use bills::{
    BillListParams, BillListResponse, BillResponse, CreateBillRequest, Pagination,
    UpdateBillRequest,
};
pub use dashboard::DashboardResponse;
pub use settings::{UpdateUpiRequest, UpiResponse};
pub use workflow::{
    CreateJobRequest, JobListParams, JobListResponse, JobResponse, JobWithBillResponse,
    StageOverrideRequest, UpdateJobRequest,
};
