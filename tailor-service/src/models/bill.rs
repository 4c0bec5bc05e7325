//! Bill model: a customer order with derived payment arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status carried on the bill itself, independent of the production
/// stage on the linked workflow job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillStatus {
    Pending,
    InProgress,
    Completed,
    Delivered,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::InProgress => "in-progress",
            BillStatus::Completed => "completed",
            BillStatus::Delivered => "delivered",
        }
    }

    /// The two statuses that count an order as done for reporting purposes.
    pub const FULFILLED: [BillStatus; 2] = [BillStatus::Completed, BillStatus::Delivered];
}

/// Garment measurement set; every field is optional and unit-free.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Measurements {
    pub length: Option<f64>,
    pub shoulder: Option<f64>,
    pub sleeve: Option<f64>,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub front_neck: Option<f64>,
    pub back_neck: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    #[serde(rename = "_id")]
    pub id: String,
    pub bill_no: String,
    pub customer_name: String,
    pub phone: String,
    pub garment_type: String,
    pub quantity: i64,
    pub rate: f64,
    pub advance: f64,
    pub subtotal: f64,
    pub balance: f64,
    pub status: BillStatus,
    pub due_date: Option<mongodb::bson::DateTime>,
    pub tailor_notes: Option<String>,
    #[serde(default)]
    pub measurements: Measurements,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub drawings: Vec<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a bill (validated at the boundary).
#[derive(Debug, Clone)]
pub struct NewBill {
    pub bill_no: Option<String>,
    pub customer_name: String,
    pub phone: String,
    pub garment_type: String,
    pub quantity: i64,
    pub rate: f64,
    pub advance: f64,
    pub due_date: Option<DateTime<Utc>>,
    pub tailor_notes: Option<String>,
    pub measurements: Measurements,
    pub images: Vec<String>,
    pub drawings: Vec<String>,
}

impl Bill {
    pub fn new(input: NewBill) -> Self {
        let now = Utc::now();
        let (subtotal, balance) =
            Self::compute_totals(input.quantity, input.rate, input.advance);
        Self {
            id: Uuid::new_v4().to_string(),
            bill_no: input.bill_no.unwrap_or_else(next_bill_no),
            customer_name: input.customer_name,
            phone: input.phone,
            garment_type: input.garment_type,
            quantity: input.quantity,
            rate: input.rate,
            advance: input.advance,
            subtotal,
            balance,
            status: BillStatus::Pending,
            due_date: input.due_date.map(mongodb::bson::DateTime::from_chrono),
            tailor_notes: input.tailor_notes,
            measurements: input.measurements,
            images: input.images,
            drawings: input.drawings,
            created_at: now,
            updated_at: now,
        }
    }

    /// Line arithmetic: `subtotal = quantity * rate`,
    /// `balance = subtotal - advance`. Balance may go negative
    /// (over-advance) and is never clamped.
    pub fn compute_totals(quantity: i64, rate: f64, advance: f64) -> (f64, f64) {
        let subtotal = quantity as f64 * rate;
        (subtotal, subtotal - advance)
    }
}

/// Short human-readable bill number: `ST` plus the last six digits of the
/// epoch-millis clock.
pub fn next_bill_no() -> String {
    let millis = Utc::now().timestamp_millis();
    format!("ST{:06}", millis % 1_000_000)
}
