use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Doctor => "doctor",
    Nurse => "nurse",
    Patient => "patient",
    Admin => "admin",
});

impl Role {
    /// Doctors and nurses can be booked for appointments and issue
    /// prescriptions.
    pub fn is_medical_staff(self) -> bool {
        matches!(self, Self::Doctor | Self::Nurse)
    }
}

str_enum!(Title {
    Mr => "Mr",
    Master => "Master",
    Mrs => "Mrs",
    Ms => "Ms",
    Miss => "Miss",
    Dr => "Dr",
    Prof => "Prof",
    Mx => "Mx",
});

/// Bookable appointment lengths. The database stores the minute count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    TenMinutes,
    TwentyMinutes,
    ThirtyMinutes,
}

impl Duration {
    pub fn minutes(self) -> i64 {
        match self {
            Self::TenMinutes => 10,
            Self::TwentyMinutes => 20,
            Self::ThirtyMinutes => 30,
        }
    }

    pub fn from_minutes(minutes: i64) -> Result<Self, DatabaseError> {
        match minutes {
            10 => Ok(Self::TenMinutes),
            20 => Ok(Self::TwentyMinutes),
            30 => Ok(Self::ThirtyMinutes),
            other => Err(DatabaseError::InvalidEnum {
                field: "Duration".into(),
                value: other.to_string(),
            }),
        }
    }
}
