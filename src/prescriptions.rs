//! Prescription lifecycle: issue, repeat-request, approve, reject.
//!
//! Staff-issued prescriptions are approved on creation. A patient may
//! request a repeat of an approved prescription, which creates a new
//! unapproved record linked to its predecessor and flags the predecessor as
//! repeat-requested. Staff then approve the repeat, or reject it, which
//! deletes it and clears the predecessor's flag so a fresh repeat can be
//! requested.

use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::db::repository::{payment, prescription, user};
use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::{PaymentCard, Prescription, User};
use crate::scheduling::now_local;

/// Field-tagged validation failure. Nothing is persisted when raised.
#[derive(Debug, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum PrescriptionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Staff-entered details for a new prescription.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub patient_id: Uuid,
    pub price: Decimal,
    pub payment_required: bool,
    pub is_repeating: bool,
}

fn validate(prescriber: &User, patient: &User, price: Decimal) -> Result<(), ValidationError> {
    if prescriber.role == Role::Patient {
        return Err(ValidationError {
            field: "prescriber",
            reason: "a patient cannot issue prescriptions".into(),
        });
    }
    if patient.role != Role::Patient {
        return Err(ValidationError {
            field: "patient",
            reason: format!("prescriptions can only be issued to patients, not {}", patient.role.as_str()),
        });
    }
    if price < Decimal::ZERO {
        return Err(ValidationError {
            field: "price",
            reason: "price cannot be negative".into(),
        });
    }
    Ok(())
}

/// Issue a prescription as medical staff. Auto-approved.
pub fn issue(
    conn: &Connection,
    prescriber_id: &Uuid,
    request: IssueRequest,
) -> Result<Prescription, PrescriptionError> {
    let prescriber = user::get_user(conn, prescriber_id)?;
    let patient = user::get_user(conn, &request.patient_id)?;
    validate(&prescriber, &patient, request.price)?;

    let record = Prescription {
        id: Uuid::new_v4(),
        prescriber_id: *prescriber_id,
        patient_id: request.patient_id,
        price: request.price,
        payment_required: request.payment_required,
        is_repeating: request.is_repeating,
        is_approved: true,
        previous_prescription_id: None,
        repeat_requested: false,
        prescribed_at: now_local(),
    };
    prescription::insert_prescription(conn, &record)?;
    info!(prescription = %record.id, patient = %record.patient_id, "prescription issued");
    Ok(record)
}

/// Patient-side repeat request. Clones the approved predecessor into a new
/// unapproved record linked back to it, and marks the predecessor as
/// repeat-requested. Non-NHS patients always pay for repeats.
pub fn request_repeat(
    conn: &mut Connection,
    previous_id: &Uuid,
) -> Result<Prescription, PrescriptionError> {
    let previous = prescription::get_prescription(conn, previous_id)?;
    if !previous.is_approved {
        return Err(ValidationError {
            field: "previous_prescription",
            reason: "only an approved prescription can be repeated".into(),
        }
        .into());
    }
    if previous.repeat_requested {
        return Err(ValidationError {
            field: "repeat_requested",
            reason: "a repeat of this prescription is already pending".into(),
        }
        .into());
    }
    let patient = user::get_user(conn, &previous.patient_id)?;

    let repeat = Prescription {
        id: Uuid::new_v4(),
        prescriber_id: previous.prescriber_id,
        patient_id: previous.patient_id,
        price: previous.price,
        payment_required: previous.payment_required || !patient.is_nhs,
        is_repeating: previous.is_repeating,
        is_approved: false,
        previous_prescription_id: Some(previous.id),
        repeat_requested: false,
        prescribed_at: now_local(),
    };

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;
    prescription::insert_prescription(&tx, &repeat)?;
    prescription::set_repeat_requested(&tx, &previous.id, true)?;
    tx.commit().map_err(DatabaseError::from)?;

    info!(prescription = %repeat.id, previous = %previous.id, "repeat requested");
    Ok(repeat)
}

/// Staff approval of a pending repeat.
pub fn approve(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    prescription::set_approved(conn, id, true)?;
    info!(prescription = %id, "prescription approved");
    Ok(())
}

/// Staff rejection: delete the record and, if it was a repeat, clear the
/// predecessor's flag so the patient can request again.
pub fn reject(conn: &mut Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let record = prescription::get_prescription(conn, id)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if let Some(previous_id) = record.previous_prescription_id {
        prescription::set_repeat_requested(&tx, &previous_id, false)?;
    }
    prescription::delete_prescription(&tx, id)?;
    tx.commit()?;

    info!(prescription = %id, "prescription rejected");
    Ok(())
}

/// Capture card details and clear the payment-required flag. A prescription
/// with nothing owed is a no-op.
pub fn pay_prescription(
    conn: &Connection,
    id: &Uuid,
    card: &PaymentCard,
) -> Result<(), DatabaseError> {
    let record = prescription::get_prescription(conn, id)?;
    if !record.payment_required {
        return Ok(());
    }
    payment::insert_card(conn, card)?;
    prescription::set_payment_required(conn, id, false)
}
