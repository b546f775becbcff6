use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "SmartCare Surgery";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Clinic contact block printed on reports and invoices.
pub const CLINIC_ADDRESS: &str = "123 Lorem Ipsum, Ana Has Apples, UK";
pub const CLINIC_PHONE: &str = "Phone: 07840123456";
pub const CLINIC_EMAIL: &str = "Email: info@smartcaresurgery.com";

/// Remote calendar service.
pub const CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const PRIMARY_CALENDAR_ID: &str = "primary";
pub const CALENDAR_TIMEOUT_SECS: u64 = 10;
/// Appointments are booked in clinic-local wall time, pinned to GMT.
pub const CALENDAR_TIME_ZONE: &str = "GMT";

pub fn default_log_filter() -> String {
    "smartcare=info".to_string()
}

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("SmartCare")
}

/// Path of the clinic database file
pub fn database_path() -> PathBuf {
    app_data_dir().join("smartcare.db")
}
