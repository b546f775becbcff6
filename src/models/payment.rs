use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Card details captured when a patient pays for an appointment or
/// prescription. Recorded only, never verified against a gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_name: String,
    pub card_number: String,
    pub expiry_date: NaiveDate,
    pub cvv2: String,
}
