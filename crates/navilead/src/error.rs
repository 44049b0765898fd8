//! Error types for the navilead library
//!
//! Errors are organized by domain so callers (and the HTTP layer) can tell a
//! bad price from a broken merchant template without string matching.

use thiserror::Error;

/// Main error type for the navilead library
///
/// Root of the error hierarchy. Each variant wraps the errors of one domain.
#[derive(Error, Debug)]
pub enum NavileadError {
    /// Price calculation input errors
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Offer template structure and binding errors
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Quote data errors (lookups, viewer mutations, serialization)
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Template persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Price calculation input errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("{field} must not be negative, got {value}")]
    NegativeValue { field: String, value: f64 },

    #[error("{field} must be between 0 and 100 percent, got {value}")]
    PercentOutOfRange { field: String, value: f64 },

    #[error("Quantity must be at least 1, got {quantity}")]
    InvalidQuantity { quantity: u32 },

    #[error("{field} is too large to use as an amount, got {value}")]
    OutOfRange { field: String, value: f64 },

    #[error("{field} is too large to calculate")]
    Overflow { field: String },
}

/// Offer template errors
///
/// Raised while validating or binding a merchant HTML template.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Template not found: {id}")]
    NotFound { id: String },

    #[error("Template is missing required placeholders: {}", missing.join(", "))]
    MissingPlaceholders { missing: Vec<String> },

    #[error("Invalid template structure: {message}")]
    InvalidStructure { message: String },

    #[error("Invalid template: {reason}")]
    InvalidContent { reason: String },
}

/// Quote data errors
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Service not found: {id}")]
    ServiceNotFound { id: String },

    #[error("Service '{id}' is required and cannot be changed by the viewer")]
    ServiceLocked { id: String },

    #[error("Unsupported currency: {code}")]
    UnsupportedCurrency { code: String },

    #[error("JSON serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("JSON deserialization failed: {reason}")]
    Deserialization { reason: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

/// Template persistence errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Corrupt metadata for template {id}: {reason}")]
    CorruptMetadata { id: String, reason: String },

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {setting} - {reason}")]
    InvalidConfig { setting: String, reason: String },
}

/// Shorthand result type for navilead operations
pub type Result<T> = std::result::Result<T, NavileadError>;

/// Create a template error for a set of missing placeholders
pub fn missing_placeholders<I, S>(missing: I) -> NavileadError
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    NavileadError::Template(TemplateError::MissingPlaceholders {
        missing: missing.into_iter().map(Into::into).collect(),
    })
}

/// Create a structure error for a malformed template
pub fn invalid_structure(message: impl Into<String>) -> NavileadError {
    NavileadError::Template(TemplateError::InvalidStructure {
        message: message.into(),
    })
}

/// Create a pricing error for an amount that no longer fits a `Decimal`
pub fn overflow(field: impl Into<String>) -> NavileadError {
    NavileadError::Pricing(PricingError::Overflow {
        field: field.into(),
    })
}

// ============================================================================
// From Implementations for External Error Types
// ============================================================================

/// Convert serde_json::Error to NavileadError
impl From<serde_json::Error> for NavileadError {
    fn from(error: serde_json::Error) -> Self {
        let reason = error.to_string();
        if error.is_syntax() || error.is_data() || error.is_eof() {
            NavileadError::Data(DataError::Deserialization { reason })
        } else {
            NavileadError::Data(DataError::Serialization { reason })
        }
    }
}

// ============================================================================
// Error Helper Functions
// ============================================================================

impl NavileadError {
    /// Get a user-friendly error message, suitable for a toast notification
    pub fn user_message(&self) -> String {
        match self {
            NavileadError::Pricing(e) => format!("Could not calculate the price: {}", e),
            NavileadError::Template(e) => match e {
                TemplateError::NotFound { id } => format!("Template not found: {}", id),
                TemplateError::MissingPlaceholders { missing } => format!(
                    "The template is missing {} required placeholder(s): {}",
                    missing.len(),
                    missing.join(", ")
                ),
                _ => format!("Template error: {}", e),
            },
            NavileadError::Data(e) => match e {
                DataError::ServiceLocked { .. } => {
                    "This service is required and cannot be changed.".to_string()
                }
                DataError::Deserialization { .. } => {
                    "Failed to parse data. Please check your JSON format.".to_string()
                }
                _ => format!("Data error: {}", e),
            },
            NavileadError::Storage(_) => {
                "The template could not be stored. Please try again.".to_string()
            }
            NavileadError::Config(e) => format!("Configuration error: {}", e),
        }
    }

    /// Check if this error is recoverable by correcting the input
    pub fn is_recoverable(&self) -> bool {
        match self {
            NavileadError::Template(TemplateError::NotFound { .. }) => false,
            NavileadError::Storage(StorageError::Poisoned) => false,
            NavileadError::Config(_) => false,
            _ => true,
        }
    }

    /// Get error suggestions for common problems
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            NavileadError::Template(TemplateError::MissingPlaceholders { .. }) => vec![
                "Add the missing placeholders to the template HTML".to_string(),
                "Service rows need an element with id=\"services-row\"".to_string(),
            ],
            NavileadError::Template(TemplateError::InvalidStructure { .. }) => vec![
                "Check that every element with a known id has a closing tag".to_string(),
            ],
            NavileadError::Pricing(PricingError::PercentOutOfRange { .. }) => vec![
                "Discounts and VAT are percentages between 0 and 100".to_string(),
            ],
            NavileadError::Pricing(PricingError::OutOfRange { .. } | PricingError::Overflow { .. }) => {
                vec!["Split very large amounts across several services or quotes".to_string()]
            }
            NavileadError::Data(DataError::Deserialization { .. }) => vec![
                "Verify your JSON syntax is valid".to_string(),
                "Check for missing quotes or trailing commas".to_string(),
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_placeholders_lists_every_token() {
        let err = missing_placeholders(["{Totalprice}", "#services-row"]);
        assert_eq!(
            err.to_string(),
            "Template error: Template is missing required placeholders: {Totalprice}, #services-row"
        );
        assert!(err.is_recoverable());
        assert_eq!(err.suggestions().len(), 2);
    }

    #[test]
    fn json_errors_map_to_deserialization() {
        let err: NavileadError = serde_json::from_str::<serde_json::Value>("{bad")
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            NavileadError::Data(DataError::Deserialization { .. })
        ));
    }
}
