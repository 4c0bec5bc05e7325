//! Request/response types for the bill endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Bill, BillStatus, Measurements, NewBill};
use crate::services::store::BillPatch;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBillRequest {
    #[validate(
        required(message = "customer_name is required"),
        length(min = 1, message = "customer_name must not be empty")
    )]
    pub customer_name: Option<String>,
    #[validate(
        required(message = "phone is required"),
        length(min = 1, message = "phone must not be empty")
    )]
    pub phone: Option<String>,
    #[validate(
        required(message = "garment_type is required"),
        length(min = 1, message = "garment_type must not be empty")
    )]
    pub garment_type: Option<String>,
    #[validate(
        required(message = "quantity is required"),
        range(min = 1, message = "quantity must be at least 1")
    )]
    pub quantity: Option<i64>,
    #[validate(
        required(message = "rate is required"),
        range(min = 0.0, message = "rate must not be negative")
    )]
    pub rate: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "advance must not be negative"))]
    pub advance: f64,
    pub bill_no: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub tailor_notes: Option<String>,
    #[serde(default)]
    pub measurements: Measurements,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub drawings: Vec<String>,
}

impl CreateBillRequest {
    /// Call after `validate()`; the required fields are present by then.
    pub fn into_new_bill(self) -> NewBill {
        NewBill {
            bill_no: self.bill_no,
            customer_name: self.customer_name.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            garment_type: self.garment_type.unwrap_or_default(),
            quantity: self.quantity.unwrap_or_default(),
            rate: self.rate.unwrap_or_default(),
            advance: self.advance,
            due_date: self.due_date,
            tailor_notes: self.tailor_notes,
            measurements: self.measurements,
            images: self.images,
            drawings: self.drawings,
        }
    }
}

/// Partial update; absent fields keep their stored values. Subtotal and
/// balance are not accepted from the wire, they are always recomputed.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBillRequest {
    #[validate(length(min = 1, message = "customer_name must not be empty"))]
    pub customer_name: Option<String>,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "garment_type must not be empty"))]
    pub garment_type: Option<String>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: Option<i64>,
    #[validate(range(min = 0.0, message = "rate must not be negative"))]
    pub rate: Option<f64>,
    #[validate(range(min = 0.0, message = "advance must not be negative"))]
    pub advance: Option<f64>,
    pub status: Option<BillStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub tailor_notes: Option<String>,
    pub measurements: Option<Measurements>,
    pub images: Option<Vec<String>>,
    pub drawings: Option<Vec<String>>,
}

impl UpdateBillRequest {
    pub fn into_patch(self) -> BillPatch {
        BillPatch {
            customer_name: self.customer_name,
            phone: self.phone,
            garment_type: self.garment_type,
            quantity: self.quantity,
            rate: self.rate,
            advance: self.advance,
            subtotal: None,
            balance: None,
            status: self.status,
            due_date: self.due_date,
            tailor_notes: self.tailor_notes,
            measurements: self.measurements,
            images: self.images,
            drawings: self.drawings,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BillListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BillResponse {
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
    pub due_date: Option<String>,
    pub tailor_notes: Option<String>,
    pub measurements: Measurements,
    pub images: Vec<String>,
    pub drawings: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Bill> for BillResponse {
    fn from(bill: Bill) -> Self {
        Self {
            id: bill.id,
            bill_no: bill.bill_no,
            customer_name: bill.customer_name,
            phone: bill.phone,
            garment_type: bill.garment_type,
            quantity: bill.quantity,
            rate: bill.rate,
            advance: bill.advance,
            subtotal: bill.subtotal,
            balance: bill.balance,
            status: bill.status,
            due_date: bill.due_date.map(|d| d.to_chrono().to_rfc3339()),
            tailor_notes: bill.tailor_notes,
            measurements: bill.measurements,
            images: bill.images,
            drawings: bill.drawings,
            created_at: bill.created_at.to_rfc3339(),
            updated_at: bill.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BillListResponse {
    pub bills: Vec<BillResponse>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_requires_core_fields() {
        let req: CreateBillRequest = serde_json::from_str(r#"{ "phone": "999" }"#).unwrap();
        let errors = req.validate().unwrap_err();

        let fields = errors.field_errors();
        assert!(fields.contains_key("customer_name"));
        assert!(fields.contains_key("garment_type"));
        assert!(fields.contains_key("quantity"));
        assert!(fields.contains_key("rate"));
        assert!(!fields.contains_key("phone"));
    }

    #[test]
    fn test_create_request_rejects_zero_quantity() {
        let req: CreateBillRequest = serde_json::from_str(
            r#"{
                "customer_name": "Asha",
                "phone": "999",
                "garment_type": "shirt",
                "quantity": 0,
                "rate": 500.0
            }"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
    }

    #[test]
    fn test_update_request_maps_to_patch_without_derived_fields() {
        let req: UpdateBillRequest =
            serde_json::from_str(r#"{ "rate": 600.0, "tailor_notes": "hem" }"#).unwrap();
        assert!(req.validate().is_ok());

        let patch = req.into_patch();
        assert_eq!(patch.rate, Some(600.0));
        assert_eq!(patch.tailor_notes.as_deref(), Some("hem"));
        assert!(patch.subtotal.is_none());
        assert!(patch.balance.is_none());
        assert!(patch.quantity.is_none());
    }

    #[test]
    fn test_bill_response_renders_timestamps_as_rfc3339() {
        let bill = Bill::new(NewBill {
            bill_no: Some("ST123456".to_string()),
            customer_name: "Asha".to_string(),
            phone: "999".to_string(),
            garment_type: "shirt".to_string(),
            quantity: 2,
            rate: 500.0,
            advance: 200.0,
            due_date: None,
            tailor_notes: None,
            measurements: Measurements::default(),
            images: Vec::new(),
            drawings: Vec::new(),
        });

        let response = BillResponse::from(bill);
        assert_eq!(response.bill_no, "ST123456");
        assert!(response.created_at.contains('T'));
        assert!(response.due_date.is_none());
        assert_eq!(response.subtotal, 1000.0);
    }
}
