pub mod appointment;
pub mod enums;
pub mod payment;
pub mod prescription;
pub mod rate_table;
pub mod user;

pub use appointment::Appointment;
pub use enums::{Duration, Role, Title};
pub use payment::PaymentCard;
pub use prescription::Prescription;
pub use rate_table::RateTable;
pub use user::User;
