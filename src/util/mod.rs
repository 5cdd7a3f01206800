//! Helpers used by pages rendering API results.

pub mod debounce;
pub mod format;
pub mod notify;
pub mod validate;

pub use debounce::Debouncer;
pub use format::{format_currency, format_date, format_date_str, time_ago};
pub use notify::{Notification, NotificationKind};
pub use validate::{is_valid_email, is_valid_phone};
