use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::DatabaseError;
use crate::models::RateTable;

/// Fetch the singleton rate table, inserting the default rates on first
/// access. Fetched once per request and threaded into the pricing resolver
/// rather than cached process-wide.
pub fn get_or_create(conn: &Connection) -> Result<RateTable, DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO rate_table (id, doctor_rate, nurse_rate)
         VALUES (0, '60.00', '30.00')",
        [],
    )?;
    let (doctor_text, nurse_text): (String, String) = conn.query_row(
        "SELECT doctor_rate, nurse_rate FROM rate_table WHERE id = 0",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(RateTable {
        doctor_rate: parse_rate("doctor_rate", &doctor_text)?,
        nurse_rate: parse_rate("nurse_rate", &nurse_text)?,
    })
}

/// Admin edit of the shared rates. Takes effect for the next booking.
pub fn update_rates(conn: &Connection, rates: &RateTable) -> Result<(), DatabaseError> {
    // get_or_create first so an edit before any booking still lands.
    get_or_create(conn)?;
    conn.execute(
        "UPDATE rate_table SET doctor_rate = ?1, nurse_rate = ?2 WHERE id = 0",
        params![rates.doctor_rate.to_string(), rates.nurse_rate.to_string()],
    )?;
    Ok(())
}

fn parse_rate(field: &str, text: &str) -> Result<Decimal, DatabaseError> {
    Decimal::from_str(text).map_err(|_| DatabaseError::InvalidEnum {
        field: field.into(),
        value: text.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn lazily_created_with_defaults() {
        let conn = open_memory_database().unwrap();
        let rates = get_or_create(&conn).unwrap();
        assert_eq!(rates, RateTable::default());
    }

    #[test]
    fn update_persists() {
        let conn = open_memory_database().unwrap();
        let new_rates = RateTable {
            doctor_rate: Decimal::new(7550, 2),
            nurse_rate: Decimal::new(4025, 2),
        };
        update_rates(&conn, &new_rates).unwrap();
        assert_eq!(get_or_create(&conn).unwrap(), new_rates);
    }

    #[test]
    fn singleton_row_only() {
        let conn = open_memory_database().unwrap();
        get_or_create(&conn).unwrap();
        get_or_create(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM rate_table", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
