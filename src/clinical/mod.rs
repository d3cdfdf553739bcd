//! Clinical records engine: prescriptions with their medicine lines, and
//! scheduled visits.

pub mod prescriptions;
pub mod visits;

pub use prescriptions::*;
pub use visits::*;

use chrono::{NaiveDate, NaiveDateTime};

/// Format used for every date shown to users.
pub const DISPLAY_DATE_FORMAT: &str = "%d-%m-%Y";

/// Calendar date on the server's clock; "upcoming" is relative to this.
pub fn today() -> NaiveDate {
    now().date()
}

/// Server-local wall clock. Prescription dates and "today" share it so a
/// prescription written today never shows another calendar day.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
