use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{decimal_column, uuid_column};
use crate::db::DatabaseError;
use crate::models::enums::Duration;
use crate::models::Appointment;

const APPOINTMENT_COLUMNS: &str = "id, patient_id, practitioner_id, price, date, time, \
     duration, description, is_paid, forward_reason";

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<(Appointment, i64)> {
    let appt = Appointment {
        id: uuid_column(row, 0)?,
        patient_id: uuid_column(row, 1)?,
        practitioner_id: uuid_column(row, 2)?,
        price: decimal_column(row, 3)?,
        date: row.get(4)?,
        time: row.get(5)?,
        duration: Duration::TenMinutes,
        description: row.get(7)?,
        is_paid: row.get(8)?,
        forward_reason: row.get(9)?,
    };
    Ok((appt, row.get(6)?))
}

fn finish_appointment(parts: (Appointment, i64)) -> Result<Appointment, DatabaseError> {
    let (mut appt, minutes) = parts;
    appt.duration = Duration::from_minutes(minutes)?;
    Ok(appt)
}

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, practitioner_id, price, date, time,
         duration, description, is_paid, forward_reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.practitioner_id.to_string(),
            appt.price.to_string(),
            appt.date,
            appt.time,
            appt.duration.minutes(),
            appt.description,
            appt.is_paid as i32,
            appt.forward_reason,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Appointment, DatabaseError> {
    let parts = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id.to_string()],
            appointment_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
                entity_type: "Appointment".into(),
                id: id.to_string(),
            },
            other => DatabaseError::from(other),
        })?;
    finish_appointment(parts)
}

/// True when a non-cancelled appointment already occupies the exact
/// (practitioner, date, time) slot. Exact equality only, no interval
/// overlap check.
pub fn exists_at(
    conn: &Connection,
    practitioner_id: &Uuid,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments
         WHERE practitioner_id = ?1 AND date = ?2 AND time = ?3",
        params![practitioner_id.to_string(), date, time],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn list_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE patient_id = ?1 ORDER BY date, time"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], appointment_from_row)?;

    let mut appts = Vec::new();
    for row in rows {
        appts.push(finish_appointment(row?)?);
    }
    Ok(appts)
}

pub fn list_for_practitioner(
    conn: &Connection,
    practitioner_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE practitioner_id = ?1 ORDER BY date, time"
    ))?;
    let rows = stmt.query_map(params![practitioner_id.to_string()], appointment_from_row)?;

    let mut appts = Vec::new();
    for row in rows {
        appts.push(finish_appointment(row?)?);
    }
    Ok(appts)
}

/// All appointments ordered by date then time, for the admin overview.
pub fn list_all(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY date, time"
    ))?;
    let rows = stmt.query_map([], appointment_from_row)?;

    let mut appts = Vec::new();
    for row in rows {
        appts.push(finish_appointment(row?)?);
    }
    Ok(appts)
}

pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn set_forward_reason(
    conn: &Connection,
    id: &Uuid,
    reason: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET forward_reason = ?2 WHERE id = ?1",
        params![id.to_string(), reason],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn mark_paid(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET is_paid = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Sum of appointment prices with date in [start, end], inclusive both ends.
/// Summed in Decimal to avoid floating-point currency drift.
pub fn sum_price_between(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Decimal, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT price FROM appointments WHERE date >= ?1 AND date <= ?2")?;
    let rows = stmt.query_map(params![start, end], |row| decimal_column(row, 0))?;

    let mut total = Decimal::ZERO;
    for row in rows {
        total += row?;
    }
    Ok(total)
}
