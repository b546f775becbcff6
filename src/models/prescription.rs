use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A prescription record. Staff-issued records are approved immediately;
/// patient repeat requests start unapproved and link back to the record
/// they were derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub prescriber_id: Uuid,
    pub patient_id: Uuid,
    pub price: Decimal,
    pub payment_required: bool,
    pub is_repeating: bool,
    pub is_approved: bool,
    /// Set on repeat requests: the approved prescription this repeats.
    pub previous_prescription_id: Option<Uuid>,
    /// Set on the predecessor while a repeat of it is pending.
    pub repeat_requested: bool,
    pub prescribed_at: NaiveDateTime,
}
