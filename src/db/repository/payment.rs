use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::PaymentCard;

pub fn insert_card(conn: &Connection, card: &PaymentCard) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO payment_cards (id, user_id, card_name, card_number, expiry_date, cvv2)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            card.id.to_string(),
            card.user_id.to_string(),
            card.card_name,
            card.card_number,
            card.expiry_date,
            card.cvv2,
        ],
    )?;
    Ok(())
}
