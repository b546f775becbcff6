use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Admin-editable base rates per ten-minute appointment unit. A single row
/// pinned to id 0, created lazily on first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    pub doctor_rate: Decimal,
    pub nurse_rate: Decimal,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            doctor_rate: Decimal::new(6000, 2),
            nurse_rate: Decimal::new(3000, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rates() {
        let rates = RateTable::default();
        assert_eq!(rates.doctor_rate.to_string(), "60.00");
        assert_eq!(rates.nurse_rate.to_string(), "30.00");
    }
}
