//! Request/response types for the settings endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize)]
pub struct UpiResponse {
    /// Empty string when no address has been configured yet.
    pub upi: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUpiRequest {
    #[validate(
        required(message = "upi is required"),
        length(min = 1, message = "upi must not be empty")
    )]
    pub upi: Option<String>,
}
