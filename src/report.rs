//! PDF reports: turnover summary and invoices.
//!
//! Fixed-layout A4 documents via `printpdf` builtin fonts: a clinic header
//! block, a rule, then the figures. Returned as bytes for the presentation
//! layer to serve.

use chrono::NaiveDate;
use printpdf::*;
use rusqlite::Connection;
use std::io::BufWriter;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::db::repository::{appointment, prescription, user};
use crate::db::DatabaseError;
use crate::turnover;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

struct Page {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
}

fn new_page(title: &str) -> Result<Page, ReportError> {
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Render(e.to_string()))?;
    Ok(Page { doc, layer, font })
}

fn clinic_header(page: &Page, first_line: &str) {
    page.layer.use_text(first_line, 12.0, Mm(20.0), Mm(270.0), &page.font);
    page.layer
        .use_text(config::CLINIC_ADDRESS, 12.0, Mm(20.0), Mm(263.0), &page.font);
    page.layer
        .use_text(config::CLINIC_PHONE, 12.0, Mm(20.0), Mm(256.0), &page.font);
    page.layer
        .use_text(config::CLINIC_EMAIL, 12.0, Mm(20.0), Mm(249.0), &page.font);
    rule(page, Mm(245.0));
}

fn rule(page: &Page, y: Mm) {
    let line = Line {
        points: vec![
            (Point::new(Mm(20.0), y), false),
            (Point::new(Mm(190.0), y), false),
        ],
        is_closed: false,
    };
    page.layer.add_line(line);
}

fn finish(page: Page) -> Result<Vec<u8>, ReportError> {
    let mut buf = BufWriter::new(Vec::new());
    page.doc
        .save(&mut buf)
        .map_err(|e| ReportError::Render(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| ReportError::Render(e.to_string()))
}

/// Turnover summary for the admin: the three average lines over the month
/// and year containing `date`.
pub fn turnover_report_pdf(conn: &Connection, date: NaiveDate) -> Result<Vec<u8>, ReportError> {
    let average_daily = turnover::average(&turnover::daily(conn, date)?);
    let average_weekly = turnover::average(&turnover::weekly(conn, date)?);
    let average_monthly = turnover::average(&turnover::monthly(conn, date)?);

    let title = format!(
        "{}: Turnover {}",
        config::APP_NAME,
        date.format("%Y-%m-%d")
    );
    let page = new_page(&title)?;
    clinic_header(&page, &title);

    page.layer.use_text(
        format!("Average Daily Turnover: {average_daily:.2}"),
        12.0,
        Mm(20.0),
        Mm(230.0),
        &page.font,
    );
    rule(&page, Mm(222.0));
    page.layer.use_text(
        format!("Average Weekly Turnover: {average_weekly:.2}"),
        12.0,
        Mm(20.0),
        Mm(214.0),
        &page.font,
    );
    rule(&page, Mm(206.0));
    page.layer.use_text(
        format!("Average Monthly Turnover: {average_monthly:.2}"),
        12.0,
        Mm(20.0),
        Mm(198.0),
        &page.font,
    );

    finish(page)
}

/// Invoice for one appointment: bill-to block, appointment details, total.
pub fn appointment_invoice_pdf(conn: &Connection, id: &Uuid) -> Result<Vec<u8>, ReportError> {
    let appt = appointment::get_appointment(conn, id)?;
    let patient = user::get_user(conn, &appt.patient_id)?;
    let practitioner = user::get_user(conn, &appt.practitioner_id)?;

    let page = new_page(config::APP_NAME)?;
    clinic_header(&page, config::APP_NAME);

    let lines = [
        format!("Appointment No: {}", appt.id),
        format!("Date: {}", appt.date),
        format!("Bill To: {}", patient.full_name()),
        format!("Address: {}", patient.address),
    ];
    let mut y = Mm(232.0);
    for line in &lines {
        page.layer.use_text(line, 12.0, Mm(20.0), y, &page.font);
        y -= Mm(7.0);
    }
    rule(&page, y);
    y -= Mm(8.0);

    let details = [
        format!("Appointment Details: {}", appt.description),
        format!("Practitioner: {}", practitioner.full_name()),
        format!("Date: {}", appt.date),
        format!("Time: {}", appt.time),
        format!("Price: £{}", appt.price),
    ];
    for line in &details {
        page.layer.use_text(line, 12.0, Mm(20.0), y, &page.font);
        y -= Mm(7.0);
    }
    rule(&page, y);
    y -= Mm(8.0);
    page.layer.use_text(
        format!("Total: £{}", appt.price),
        12.0,
        Mm(150.0),
        y,
        &page.font,
    );

    finish(page)
}

/// Invoice for one prescription.
pub fn prescription_invoice_pdf(conn: &Connection, id: &Uuid) -> Result<Vec<u8>, ReportError> {
    let record = prescription::get_prescription(conn, id)?;
    let patient = user::get_user(conn, &record.patient_id)?;
    let prescriber = user::get_user(conn, &record.prescriber_id)?;

    let page = new_page(config::APP_NAME)?;
    clinic_header(&page, config::APP_NAME);

    let lines = [
        format!("Prescription No: {}", record.id),
        format!("Date: {}", record.prescribed_at.date()),
        format!("Bill To: {}", patient.full_name()),
        format!("Address: {}", patient.address),
        format!("Practitioner: {}", prescriber.full_name()),
        format!("Price: £{}", record.price),
    ];
    let mut y = Mm(232.0);
    for line in &lines {
        page.layer.use_text(line, 12.0, Mm(20.0), y, &page.font);
        y -= Mm(7.0);
    }
    rule(&page, y);
    y -= Mm(8.0);
    page.layer.use_text(
        format!("Total: £{}", record.price),
        12.0,
        Mm(150.0),
        y,
        &page.font,
    );

    finish(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn seed(conn: &Connection) -> (Uuid, Uuid) {
        let patient = Uuid::new_v4();
        let doctor = Uuid::new_v4();
        conn.execute(
            "INSERT INTO users (id, username, first_name, last_name, role, date_joined)
             VALUES (?1, 'pat', 'Pat', 'Smith', 'patient', '2024-01-01T00:00:00')",
            rusqlite::params![patient.to_string()],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO users (id, username, first_name, last_name, role, date_joined)
             VALUES (?1, 'doc', 'Dana', 'Jones', 'doctor', '2024-01-01T00:00:00')",
            rusqlite::params![doctor.to_string()],
        )
        .unwrap();
        (patient, doctor)
    }

    #[test]
    fn turnover_report_renders() {
        let conn = open_memory_database().unwrap();
        let bytes =
            turnover_report_pdf(&conn, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn appointment_invoice_renders() {
        let conn = open_memory_database().unwrap();
        let (patient, doctor) = seed(&conn);
        let appt_id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO appointments (id, patient_id, practitioner_id, price, date, time, duration, description)
             VALUES (?1, ?2, ?3, '60.00', '2024-02-10', '09:00:00', 10, 'check-up')",
            rusqlite::params![appt_id.to_string(), patient.to_string(), doctor.to_string()],
        )
        .unwrap();

        let bytes = appointment_invoice_pdf(&conn, &appt_id).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn prescription_invoice_renders() {
        let conn = open_memory_database().unwrap();
        let (patient, doctor) = seed(&conn);
        let rx_id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO prescriptions (id, prescriber_id, patient_id, price, is_approved, prescribed_at)
             VALUES (?1, ?2, ?3, '20.00', 1, '2024-02-10T11:00:00')",
            rusqlite::params![rx_id.to_string(), doctor.to_string(), patient.to_string()],
        )
        .unwrap();

        let bytes = prescription_invoice_pdf(&conn, &rx_id).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn invoice_for_missing_appointment_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = appointment_invoice_pdf(&conn, &Uuid::new_v4());
        assert!(matches!(
            result,
            Err(ReportError::Database(DatabaseError::NotFound { .. }))
        ));
    }
}
