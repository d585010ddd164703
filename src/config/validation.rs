//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0)
//! - Check the bind address parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatchConfig → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted into the system

use std::net::SocketAddr;

use crate::config::schema::WatchConfig;

/// A single semantic problem with the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn positive(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError {
            field,
            message: "must be greater than zero".to_string(),
        });
    }
}

/// Check settings for semantic errors.
pub fn validate_config(config: &WatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    positive(&mut errors, "schedule.scrape_interval_secs", config.schedule.scrape_interval_secs);
    positive(&mut errors, "probe.connection_timeout_secs", config.probe.connection_timeout_secs);
    positive(&mut errors, "probe.lookup_timeout_secs", config.probe.lookup_timeout_secs);
    positive(&mut errors, "schedule.sweep_concurrency", config.schedule.sweep_concurrency as u64);

    if config.source.config_dir.is_empty() {
        errors.push(ValidationError {
            field: "source.config_dir",
            message: "must not be empty".to_string(),
        });
    }

    if config.source.config_file_suffix.is_empty() {
        errors.push(ValidationError {
            field: "source.config_file_suffix",
            message: "must not be empty".to_string(),
        });
    }

    if config.observability.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "observability.bind_address",
            message: format!("{:?} is not a socket address", config.observability.bind_address),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
