use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Public mount point of the upload directory.
pub const UPLOADS_ROUTE: &str = "/uploads";
