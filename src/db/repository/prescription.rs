use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{decimal_column, opt_uuid_column, uuid_column};
use crate::db::DatabaseError;
use crate::models::Prescription;

const PRESCRIPTION_COLUMNS: &str = "id, prescriber_id, patient_id, price, payment_required, \
     is_repeating, is_approved, previous_prescription_id, repeat_requested, prescribed_at";

fn prescription_from_row(row: &Row<'_>) -> rusqlite::Result<Prescription> {
    Ok(Prescription {
        id: uuid_column(row, 0)?,
        prescriber_id: uuid_column(row, 1)?,
        patient_id: uuid_column(row, 2)?,
        price: decimal_column(row, 3)?,
        payment_required: row.get(4)?,
        is_repeating: row.get(5)?,
        is_approved: row.get(6)?,
        previous_prescription_id: opt_uuid_column(row, 7)?,
        repeat_requested: row.get(8)?,
        prescribed_at: row.get(9)?,
    })
}

pub fn insert_prescription(
    conn: &Connection,
    prescription: &Prescription,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, prescriber_id, patient_id, price, payment_required,
         is_repeating, is_approved, previous_prescription_id, repeat_requested, prescribed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            prescription.id.to_string(),
            prescription.prescriber_id.to_string(),
            prescription.patient_id.to_string(),
            prescription.price.to_string(),
            prescription.payment_required as i32,
            prescription.is_repeating as i32,
            prescription.is_approved as i32,
            prescription.previous_prescription_id.map(|id| id.to_string()),
            prescription.repeat_requested as i32,
            prescription.prescribed_at,
        ],
    )?;
    Ok(())
}

pub fn get_prescription(conn: &Connection, id: &Uuid) -> Result<Prescription, DatabaseError> {
    conn.query_row(
        &format!("SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE id = ?1"),
        params![id.to_string()],
        prescription_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        },
        other => DatabaseError::from(other),
    })
}

/// Prescriptions received by a patient, newest first.
pub fn list_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions
         WHERE patient_id = ?1 ORDER BY prescribed_at DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], prescription_from_row)?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Prescriptions written by a member of staff, newest first.
pub fn list_by_prescriber(
    conn: &Connection,
    prescriber_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions
         WHERE prescriber_id = ?1 ORDER BY prescribed_at DESC"
    ))?;
    let rows = stmt.query_map(params![prescriber_id.to_string()], prescription_from_row)?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn set_approved(conn: &Connection, id: &Uuid, approved: bool) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET is_approved = ?2 WHERE id = ?1",
        params![id.to_string(), approved as i32],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn set_repeat_requested(
    conn: &Connection,
    id: &Uuid,
    requested: bool,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET repeat_requested = ?2 WHERE id = ?1",
        params![id.to_string(), requested as i32],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn set_payment_required(
    conn: &Connection,
    id: &Uuid,
    required: bool,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET payment_required = ?2 WHERE id = ?1",
        params![id.to_string(), required as i32],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_prescription(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM prescriptions WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Sum of prescription prices whose creation timestamp falls on a day in
/// [start, end], inclusive both ends. Summed in Decimal.
pub fn sum_price_between(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Decimal, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT price FROM prescriptions
         WHERE date(prescribed_at) >= date(?1) AND date(prescribed_at) <= date(?2)",
    )?;
    let rows = stmt.query_map(params![start, end], |row| decimal_column(row, 0))?;

    let mut total = Decimal::ZERO;
    for row in rows {
        total += row?;
    }
    Ok(total)
}
