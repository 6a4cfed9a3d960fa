//! Configuration for the enrollment service module

use serde::Deserialize;

/// Enrollment service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Page size used when a list request does not give one
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Upper bound for any requested page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// Reject enrollments without a slot when the activity has slots
    #[serde(default = "default_true")]
    pub require_slot_when_scheduled: bool,

    /// Maximum rows accepted by a single enrollment import
    #[serde(default = "default_max_import_rows")]
    pub max_import_rows: usize,

    /// Maximum records accepted by a single attendance batch
    #[serde(default = "default_max_attendance_batch")]
    pub max_attendance_batch: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            require_slot_when_scheduled: true,
            max_import_rows: default_max_import_rows(),
            max_attendance_batch: default_max_attendance_batch(),
        }
    }
}

fn default_page_size() -> u64 {
    50
}

fn default_max_page_size() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

fn default_max_import_rows() -> usize {
    1000
}

fn default_max_attendance_batch() -> usize {
    500
}
