//! Pricing resolver: derives an appointment price from the shared rate
//! table, scaled by duration.
//!
//! The rate table holds one base rate per practitioner role for a ten-minute
//! unit, so a thirty-minute doctor appointment costs three doctor units.
//! Rates are fixed-point currency; arithmetic stays in `Decimal` end to end
//! and the result rounds half-up to two places.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::models::enums::{Duration, Role};
use crate::models::RateTable;

#[derive(Debug, Error)]
pub enum PricingError {
    /// Patients and admins cannot be booked as practitioners. The booking
    /// path rejects them upstream; the resolver rejects them again here.
    #[error("role '{0}' cannot be booked as a practitioner")]
    InvalidRole(&'static str),
}

/// Price for one appointment: base rate for the role times duration/10.
pub fn resolve_price(
    role: Role,
    duration: Duration,
    rates: &RateTable,
) -> Result<Decimal, PricingError> {
    let base = match role {
        Role::Doctor => rates.doctor_rate,
        Role::Nurse => rates.nurse_rate,
        Role::Patient | Role::Admin => return Err(PricingError::InvalidRole(role.as_str())),
    };
    let units = Decimal::from(duration.minutes()) / Decimal::TEN;
    Ok((base * units).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> RateTable {
        RateTable {
            doctor_rate: Decimal::new(6000, 2),
            nurse_rate: Decimal::new(3000, 2),
        }
    }

    #[test]
    fn doctor_and_nurse_scale_by_duration() {
        let rates = rates();
        let cases = [
            (Role::Doctor, Duration::TenMinutes, "60.00"),
            (Role::Doctor, Duration::TwentyMinutes, "120.00"),
            (Role::Doctor, Duration::ThirtyMinutes, "180.00"),
            (Role::Nurse, Duration::TenMinutes, "30.00"),
            (Role::Nurse, Duration::TwentyMinutes, "60.00"),
            (Role::Nurse, Duration::ThirtyMinutes, "90.00"),
        ];
        for (role, duration, expected) in cases {
            let price = resolve_price(role, duration, &rates).unwrap();
            assert_eq!(price.to_string(), expected, "{role:?} {duration:?}");
        }
    }

    #[test]
    fn no_floating_point_drift() {
        // 33.33 * 3 must be exactly 99.99, not 99.98999...
        let rates = RateTable {
            doctor_rate: Decimal::new(3333, 2),
            nurse_rate: Decimal::new(3000, 2),
        };
        let price = resolve_price(Role::Doctor, Duration::ThirtyMinutes, &rates).unwrap();
        assert_eq!(price.to_string(), "99.99");
    }

    #[test]
    fn half_up_rounding() {
        // A sub-cent admin-entered rate: 33.335 * 1 unit rounds to 33.34.
        let rates = RateTable {
            doctor_rate: Decimal::new(33335, 3),
            nurse_rate: Decimal::new(3000, 2),
        };
        let price = resolve_price(Role::Doctor, Duration::TenMinutes, &rates).unwrap();
        assert_eq!(price.to_string(), "33.34");
    }

    #[test]
    fn patients_and_admins_rejected() {
        let rates = rates();
        assert!(resolve_price(Role::Patient, Duration::TenMinutes, &rates).is_err());
        assert!(resolve_price(Role::Admin, Duration::TenMinutes, &rates).is_err());
    }
}
