//! Configuration validation.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::schema::{ActivationConfig, Config};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Fails with the first error, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_logging(config, &mut result);
        Self::validate_names("tools", &config.tools, &mut result);
        Self::validate_names("resources", &config.resources, &mut result);
        Self::validate_names("hooks", &config.hooks, &mut result);
        Self::validate_wildcards("tools", &config.tools, &mut result);
        Self::validate_wildcards("hooks", &config.hooks, &mut result);

        Ok(result)
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.trim();
        // Filter directives such as "plugboard_core=debug" are passed through.
        if !level.contains('=') && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            result.add_error(ValidationError::new(
                "logging.level",
                format!("Unknown log level '{}', valid values: {:?}", level, LOG_LEVELS),
            ));
        }

        let format = config.logging.format.to_ascii_lowercase();
        if !LOG_FORMATS.contains(&format.as_str()) {
            result.add_error(ValidationError::new(
                "logging.format",
                format!(
                    "Unknown log format '{}', valid values: {:?}",
                    config.logging.format, LOG_FORMATS
                ),
            ));
        }
    }

    fn validate_names(section: &str, activation: &ActivationConfig, result: &mut ValidationResult) {
        let mut seen = HashSet::new();
        for (i, name) in activation.enabled.iter().enumerate() {
            if name.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.enabled[{}]", section, i),
                    "Name cannot be empty",
                ));
            } else if !seen.insert(name.as_str()) {
                result.add_warning(ValidationWarning::new(
                    format!("{}.enabled[{}]", section, i),
                    format!("'{}' is listed more than once", name),
                ));
            }
        }
    }

    /// Only resources understand prefix wildcards.
    fn validate_wildcards(section: &str, activation: &ActivationConfig, result: &mut ValidationResult) {
        for (i, name) in activation.enabled.iter().enumerate() {
            if name.ends_with('*') {
                result.add_warning(ValidationWarning::new(
                    format!("{}.enabled[{}]", section, i),
                    format!("'{}' is matched literally; wildcards apply to resources only", name),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
