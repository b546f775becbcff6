use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Duration;

/// A booked slot with a practitioner. The price is computed once at booking
/// time from the rate table and never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub practitioner_id: Uuid,
    pub price: Decimal,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: Duration,
    pub description: String,
    pub is_paid: bool,
    /// Free-text annotation set when staff forward the appointment.
    pub forward_reason: String,
}

impl Appointment {
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start() + TimeDelta::minutes(self.duration.minutes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_is_start_plus_duration() {
        let appt = Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            practitioner_id: Uuid::new_v4(),
            price: Decimal::new(6000, 2),
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            duration: Duration::TwentyMinutes,
            description: String::new(),
            is_paid: false,
            forward_reason: String::new(),
        };
        assert_eq!(
            appt.end(),
            NaiveDate::from_ymd_opt(2024, 3, 4)
                .unwrap()
                .and_hms_opt(9, 50, 0)
                .unwrap()
        );
    }
}
