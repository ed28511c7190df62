//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limits > 0)
//! - Check that permission grants name known actions
//! - Keep the routes artifact a plain file name inside the settings directory
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::ServiceConfig;
use crate::permissions::Action;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::new("listener.bind_address", "must not be empty"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.validation.max_value_bytes == 0 {
        errors.push(ValidationError::new("validation.max_value_bytes", "must be greater than 0"));
    }

    let routes_file = &config.content.routes_file;
    if routes_file.is_empty() || routes_file.contains('/') || routes_file.contains('\\') {
        errors.push(ValidationError::new("content.routes_file", "must be a plain file name"));
    }

    for (i, token) in config.auth.tokens.iter().enumerate() {
        if token.token.is_empty() {
            errors.push(ValidationError::new(format!("auth.tokens[{}].token", i), "must not be empty"));
        }
    }

    for (role, actions) in &config.permissions.roles {
        for action in actions {
            if action.parse::<Action>().is_err() {
                errors.push(ValidationError::new(
                    format!("permissions.roles.{}", role),
                    format!("unknown action '{}'", action),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
