// src/error.rs - Error Handling for the MiVi Special Length Tool
//
// Pointer and render handlers never fail; errors only surface at the edges:
// configuration loading, gesture script replay and command line validation.

use std::fmt;

/// Main error type for the special length tool
#[derive(Debug, thiserror::Error)]
pub enum SpecialLengthError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors (command line, viewport parameters)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Gesture script errors
    #[error("Script error: {0}")]
    Script(String),

    /// File system errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("Error in {context}: {source}")]
    WithContext {
        context: String,
        source: Box<SpecialLengthError>,
    },
}

impl SpecialLengthError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        SpecialLengthError::Configuration(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        SpecialLengthError::Validation(msg.into())
    }

    /// Create a new script error
    pub fn script(msg: impl Into<String>) -> Self {
        SpecialLengthError::Script(msg.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SpecialLengthError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // A bad script step or unreadable file can be fixed and retried
            SpecialLengthError::Script(_) => true,
            SpecialLengthError::FileSystem(_) => true,

            SpecialLengthError::Configuration(_) => false,
            SpecialLengthError::Validation(_) => false,
            SpecialLengthError::Json(_) => false,

            SpecialLengthError::WithContext { source, .. } => source.is_recoverable(),
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SpecialLengthError::Configuration(_) | SpecialLengthError::FileSystem(_) => {
                ErrorSeverity::High
            }
            SpecialLengthError::Json(_) | SpecialLengthError::Script(_) => ErrorSeverity::Medium,
            SpecialLengthError::Validation(_) => ErrorSeverity::Low,
            SpecialLengthError::WithContext { source, .. } => source.severity(),
        }
    }

    /// Get suggested user action for this error
    pub fn suggested_action(&self) -> &'static str {
        match self {
            SpecialLengthError::Configuration(_) => "Check the tool configuration file",
            SpecialLengthError::Validation(_) => "Correct the command line arguments and try again",
            SpecialLengthError::Script(_) => "Fix the gesture script step reported above",
            SpecialLengthError::FileSystem(_) => "Check file paths and permissions",
            SpecialLengthError::Json(_) => "Check the JSON syntax of the input file",
            SpecialLengthError::WithContext { source, .. } => source.suggested_action(),
        }
    }

    /// Get error code for external systems
    pub fn error_code(&self) -> u32 {
        match self {
            SpecialLengthError::Configuration(_) => 5000,
            SpecialLengthError::Validation(_) => 5100,
            SpecialLengthError::Script(_) => 5200,
            SpecialLengthError::FileSystem(_) => 7000,
            SpecialLengthError::Json(_) => 7100,
            SpecialLengthError::WithContext { source, .. } => source.error_code(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Low severity - minimal impact on functionality
    Low,
    /// Medium severity - partial impact on functionality
    Medium,
    /// High severity - the tool cannot run as requested
    High,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Low => write!(f, "LOW"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::High => write!(f, "HIGH"),
        }
    }
}

/// Result type alias for special length operations
pub type SpecialLengthResult<T> = Result<T, SpecialLengthError>;

/// Extension trait for Results to add context
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context(self, context: impl Into<String>) -> SpecialLengthResult<T>;

    /// Add context using a closure (for lazy evaluation)
    fn with_context_lazy<F>(self, f: F) -> SpecialLengthResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<SpecialLengthError>,
{
    fn with_context(self, context: impl Into<String>) -> SpecialLengthResult<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context_lazy<F>(self, f: F) -> SpecialLengthResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

/// Logs errors with their code, severity and suggested action
pub struct ErrorReporter;

impl ErrorReporter {
    /// Report an error
    pub fn report(error: &SpecialLengthError) {
        use tracing::{error, info, warn};

        let severity = error.severity();
        let code = error.error_code();

        match severity {
            ErrorSeverity::High => {
                error!(
                    error_code = code,
                    severity = %severity,
                    "{} | Action: {}",
                    error,
                    error.suggested_action()
                );
            }
            ErrorSeverity::Medium => {
                warn!(
                    error_code = code,
                    severity = %severity,
                    "{} | Action: {}",
                    error,
                    error.suggested_action()
                );
            }
            ErrorSeverity::Low => {
                info!(
                    error_code = code,
                    severity = %severity,
                    "{} | Action: {}",
                    error,
                    error.suggested_action()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = SpecialLengthError::config("Test configuration error");
        assert!(matches!(error, SpecialLengthError::Configuration(_)));

        let error = SpecialLengthError::script("step 3: unknown op");
        assert!(matches!(error, SpecialLengthError::Script(_)));
    }

    #[test]
    fn test_error_with_context() {
        let contextual_error = SpecialLengthError::script("bad step").with_context("Replaying gestures");

        assert!(matches!(contextual_error, SpecialLengthError::WithContext { .. }));
        assert!(contextual_error.to_string().contains("Replaying gestures"));
        assert_eq!(contextual_error.error_code(), 5200);
        assert!(contextual_error.is_recoverable());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(SpecialLengthError::config("x").severity() > SpecialLengthError::validation("x").severity());
        assert_eq!(SpecialLengthError::validation("x").severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_result_ext() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "File not found"));
        let contextual_result = result.with_context("Reading gesture script");

        assert!(contextual_result.is_err());
        assert!(contextual_result.unwrap_err().to_string().contains("Reading gesture script"));
    }

    #[test]
    fn test_error_reporter() {
        // Logging without a subscriber must not panic
        ErrorReporter::report(&SpecialLengthError::config("Test error"));
    }
}
