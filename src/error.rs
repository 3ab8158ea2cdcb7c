//! Unified error handling for the bridge.
//!
//! Every failure a bridge request can hit is a [`BridgeError`]. The
//! dispatcher never lets one escape as a panic or an `Err` across its
//! boundary: each is folded into a wire-level error string by
//! [`BridgeError::response_message`].

use crate::security::AuthenticationFailure;
use thiserror::Error;

/// Wire string for unknown methods and unauthenticated callers.
pub const UNKNOWN_METHOD: &str = "Unknown method";

/// Wire string for callers whose context does not satisfy the method's level.
pub const SECURITY_ERROR: &str = "SecurityError";

// ============================================================================
// Parameter Errors (request decoding)
// ============================================================================

/// A required parameter was missing or had the wrong JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("missing parameter: {0}")]
    Missing(String),

    #[error("parameter {name} must be {expected}")]
    WrongType { name: String, expected: &'static str },

    #[error("parameter {name} out of range: {value}")]
    OutOfRange { name: String, value: String },
}

// ============================================================================
// Bridge Errors (request processing)
// ============================================================================

/// Errors that can occur while processing a bridge request.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// The token failed verification. Surfaced to the caller exactly like
    /// [`BridgeError::UnknownMethod`].
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthenticationFailure),

    #[error("method {0} not allowed in the caller's context")]
    Authorization(String),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownMethod(_) => "unknown_method",
            Self::Authentication(_) => "authentication",
            Self::Authorization(_) => "authorization",
            Self::Parameter(_) => "parameter",
            Self::Internal(_) => "internal_error",
        }
    }

    /// The error string returned to the caller.
    pub fn response_message(&self) -> String {
        match self {
            Self::UnknownMethod(_) | Self::Authentication(_) => UNKNOWN_METHOD.to_string(),
            Self::Authorization(_) => SECURITY_ERROR.to_string(),
            Self::Parameter(e) => e.to_string(),
            Self::Internal(msg) => msg.clone(),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(format!("result encoding failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_codes() {
        assert_eq!(BridgeError::UnknownMethod("x".into()).error_code(), "unknown_method");
        assert_eq!(BridgeError::Authorization("x".into()).error_code(), "authorization");
        assert_eq!(BridgeError::Internal("x".into()).error_code(), "internal_error");
    }

    #[test]
    fn test_authentication_failure_looks_like_unknown_method() {
        let unknown = BridgeError::UnknownMethod("Nope.nothing".into());
        let forged = BridgeError::Authentication(AuthenticationFailure::SignatureMismatch);
        assert_eq!(unknown.response_message(), forged.response_message());
        assert_eq!(forged.response_message(), "Unknown method");
    }

    #[test]
    fn test_parameter_error_message_is_propagated() {
        let err = BridgeError::from(ParameterError::Missing("ccid".into()));
        assert_eq!(err.response_message(), "missing parameter: ccid");

        let err = BridgeError::from(ParameterError::WrongType {
            name: "quiet".into(),
            expected: "an integer",
        });
        assert_eq!(err.response_message(), "parameter quiet must be an integer");
    }

    #[test]
    fn test_authorization_message() {
        let err = BridgeError::Authorization("Broadcast.setChannelToNull".into());
        assert_eq!(err.response_message(), "SecurityError");
    }
}
