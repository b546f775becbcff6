//! Appointment scheduling: slot-conflict checking and booking.
//!
//! A slot is the exact (practitioner, date, time) triple; two appointments
//! that merely overlap but start at different times do not conflict. The
//! conflict check and the insert run inside one IMMEDIATE transaction and
//! the schema carries a unique slot index, so two concurrent bookings for
//! the same slot cannot both land; the loser surfaces as `SlotConflict`.

use chrono::{Local, NaiveDate, NaiveTime};
use rusqlite::{Connection, TransactionBehavior};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::db::repository::{appointment, payment, rate_table, user};
use crate::db::DatabaseError;
use crate::models::enums::Duration;
use crate::models::{Appointment, PaymentCard};
use crate::pricing::{self, PricingError};

#[derive(Debug, Error)]
pub enum BookingError {
    /// Surfaced to the patient as "this slot is unavailable". Nothing is
    /// persisted and nothing is retried.
    #[error("this slot is unavailable")]
    SlotConflict,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// A patient's booking request. The price is not part of the request; it is
/// resolved from the rate table at booking time.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub patient_id: Uuid,
    pub practitioner_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: Duration,
    pub description: String,
}

/// True iff an existing appointment occupies the identical slot.
pub fn has_conflict(
    conn: &Connection,
    practitioner_id: &Uuid,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<bool, DatabaseError> {
    appointment::exists_at(conn, practitioner_id, date, time)
}

/// Book an appointment: validate the practitioner, resolve the price from
/// the current rate table, then check-and-insert in one transaction.
pub fn book_appointment(
    conn: &mut Connection,
    request: BookingRequest,
) -> Result<Appointment, BookingError> {
    let practitioner = user::get_user(conn, &request.practitioner_id)?;
    let rates = rate_table::get_or_create(conn)?;
    let price = pricing::resolve_price(practitioner.role, request.duration, &rates)?;

    let appt = Appointment {
        id: Uuid::new_v4(),
        patient_id: request.patient_id,
        practitioner_id: request.practitioner_id,
        price,
        date: request.date,
        time: request.time,
        duration: request.duration,
        description: request.description,
        is_paid: false,
        forward_reason: String::new(),
    };

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    if appointment::exists_at(&tx, &appt.practitioner_id, appt.date, appt.time)? {
        return Err(BookingError::SlotConflict);
    }
    if let Err(e) = appointment::insert_appointment(&tx, &appt) {
        // The unique slot index catches whatever raced past the check.
        if e.is_constraint_violation() {
            return Err(BookingError::SlotConflict);
        }
        return Err(e.into());
    }
    tx.commit().map_err(DatabaseError::from)?;

    info!(
        appointment = %appt.id,
        practitioner = %appt.practitioner_id,
        date = %appt.date,
        "appointment booked"
    );
    Ok(appt)
}

/// Delete a booking and return the removed record so the caller can push
/// the cancellation to the remote calendar.
pub fn cancel_appointment(conn: &Connection, id: &Uuid) -> Result<Appointment, DatabaseError> {
    let appt = appointment::get_appointment(conn, id)?;
    appointment::delete_appointment(conn, id)?;
    info!(appointment = %id, "appointment cancelled");
    Ok(appt)
}

/// Record a forwarding reason on the appointment. Local-only: the remote
/// calendar event is not updated.
pub fn forward_appointment(
    conn: &Connection,
    id: &Uuid,
    reason: &str,
) -> Result<Appointment, DatabaseError> {
    appointment::set_forward_reason(conn, id, reason)?;
    appointment::get_appointment(conn, id)
}

/// Capture card details and mark the appointment paid. A second payment
/// attempt on a paid appointment is a no-op.
pub fn pay_appointment(
    conn: &Connection,
    id: &Uuid,
    card: &PaymentCard,
) -> Result<(), DatabaseError> {
    let appt = appointment::get_appointment(conn, id)?;
    if appt.is_paid {
        return Ok(());
    }
    payment::insert_card(conn, card)?;
    appointment::mark_paid(conn, id)
}

/// Timestamp helper for records created "now" in local clinic time.
pub fn now_local() -> chrono::NaiveDateTime {
    Local::now().naive_local()
}
