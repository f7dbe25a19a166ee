use std::fmt;

/// Opaque native status code. Zero means success.
///
/// The SDK layer never interprets individual codes; it only distinguishes
/// success from failure and carries the code through for callers that want
/// to match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub fn is_error(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when interacting with the sensor SDK.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// Failure reported by the native SDK (registration, replay control,
    /// sensor queries). The code is opaque; the message is whatever the
    /// native layer supplied.
    #[error("SDK error {code}: {message}")]
    Native { code: ErrorCode, message: String },

    #[error("listener id {0} is already registered on this manager")]
    DuplicateListener(u64),

    #[error("callback manager is already registered with the SDK")]
    AlreadyInitialized,

    #[error("sensor with serial number {serial_number} not found")]
    SensorNotFound { serial_number: u64 },

    #[error("capture replay is not open")]
    ReplayNotOpen,

    #[error("event stream stopped")]
    StreamStopped,

    #[error("timeout waiting for data")]
    Timeout,
}

impl SensorError {
    /// Build a `Native` error from an opaque code and message.
    pub fn native(code: ErrorCode, message: impl Into<String>) -> SensorError {
        SensorError::Native {
            code,
            message: message.into(),
        }
    }

    /// The native code carried by this error, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            SensorError::Native { code, .. } => Some(*code),
            _ => None,
        }
    }
}
