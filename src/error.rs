//! # Error Types
//!
//! Custom error types for the Gamesboy controller using `thiserror`.

use thiserror::Error;

use crate::registry::PinId;

/// Main error type for the Gamesboy controller
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The button table lists the same pin twice
    #[error("Duplicate pin {0} in button table")]
    DuplicatePin(PinId),

    /// A GPIO pin could not be claimed
    #[error("Failed to acquire GPIO pin {pin}: {reason}")]
    PinAcquisition { pin: PinId, reason: String },

    /// The GPIO controller itself could not be opened
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// A pin read failed while sampling
    #[error("Failed to read GPIO pin {pin}: {reason}")]
    PinRead { pin: PinId, reason: String },

    /// An edge arrived for a pin the registry does not know
    #[error("Edge received for unregistered pin {0}")]
    UnknownPin(PinId),

    /// The keyboard collaborator rejected a press or release
    #[error("Keyboard emission error: {0}")]
    Emission(String),

    /// A background task died instead of returning
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// A GPIO pin could not be released during shutdown
    #[error("Failed to release GPIO pin {pin}: {reason}")]
    PinRelease { pin: PinId, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How an error affects the running controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Aborts before the controller starts running
    Startup,
    /// Registry and monitors disagree; aborts the process
    RuntimeDispatch,
    /// A single keystroke was lost; steady state continues
    Emission,
    /// A single pin sample was skipped; monitoring continues
    Sampling,
    /// A resource leaked during shutdown; remaining releases continue
    Shutdown,
}

impl ControllerError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ControllerError::DuplicatePin(_)
            | ControllerError::PinAcquisition { .. }
            | ControllerError::Gpio(_)
            | ControllerError::Config(_)
            | ControllerError::Io(_) => ErrorCategory::Startup,
            ControllerError::UnknownPin(_) | ControllerError::TaskFailed(_) => {
                ErrorCategory::RuntimeDispatch
            }
            ControllerError::Emission(_) => ErrorCategory::Emission,
            ControllerError::PinRead { .. } => ErrorCategory::Sampling,
            ControllerError::PinRelease { .. } => ErrorCategory::Shutdown,
        }
    }

    /// Returns true if the error must stop the process.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Startup | ErrorCategory::RuntimeDispatch
        )
    }
}

/// Result type alias for the Gamesboy controller
pub type Result<T> = std::result::Result<T, ControllerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_errors_are_fatal() {
        assert!(ControllerError::DuplicatePin(26).is_fatal());
        assert!(ControllerError::PinAcquisition { pin: 5, reason: "busy".into() }.is_fatal());
        assert_eq!(ControllerError::DuplicatePin(26).category(), ErrorCategory::Startup);
    }

    #[test]
    fn test_unknown_pin_is_fatal() {
        let err = ControllerError::UnknownPin(99);
        assert_eq!(err.category(), ErrorCategory::RuntimeDispatch);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_task_failure_is_fatal() {
        let err = ControllerError::TaskFailed("dispatcher panicked".into());
        assert_eq!(err.category(), ErrorCategory::RuntimeDispatch);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_recoverable_errors() {
        let emission = ControllerError::Emission("device gone".into());
        assert_eq!(emission.category(), ErrorCategory::Emission);
        assert!(!emission.is_fatal());

        let read = ControllerError::PinRead { pin: 26, reason: "EIO".into() };
        assert_eq!(read.category(), ErrorCategory::Sampling);
        assert!(!read.is_fatal());

        let release = ControllerError::PinRelease { pin: 6, reason: "busy".into() };
        assert_eq!(release.category(), ErrorCategory::Shutdown);
        assert!(!release.is_fatal());
    }

    #[test]
    fn test_error_messages_name_the_pin() {
        let err = ControllerError::PinAcquisition { pin: 13, reason: "pin already in use".into() };
        let msg = err.to_string();
        assert!(msg.contains("13"));
        assert!(msg.contains("pin already in use"));
    }
}
