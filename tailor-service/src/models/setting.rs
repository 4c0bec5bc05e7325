//! Key-value settings storage (shop configuration such as the payment
//! address).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The settings key holding the shop's UPI payment address.
pub const UPI_KEY: &str = "upi";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            updated_at: Utc::now(),
        }
    }
}
