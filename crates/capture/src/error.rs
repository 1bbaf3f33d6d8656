use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Failure reported by a native collaborator (deserializer, verifier).
///
/// The bridge forwards these untouched to the command result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NativeError {
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    #[error("Verification failed: {0}")]
    Verification(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Required parameter '{0}' is missing")]
    MissingParameter(String),

    #[error("Parameter '{name}' must be {expected}")]
    InvalidParameter { name: String, expected: &'static str },

    #[error("Method not recognized: {0}")]
    MethodNotRecognized(String),

    #[error(transparent)]
    Native(#[from] NativeError),

    #[error("DataCaptureContext is not available")]
    ContextUnavailable,

    #[error("No verification provider is configured")]
    VerificationUnavailable,

    #[error("AAMVA barcode verifier has not been created")]
    VerifierNotCreated,

    #[error("Verifier returned neither a result nor an error")]
    UnknownVerificationResult,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl BridgeError {
    /// Stable code the host matches on.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::MissingParameter(_) => "MISSING_PARAMETER",
            BridgeError::InvalidParameter { .. } => "INVALID_PARAMETER",
            BridgeError::MethodNotRecognized(_) => "METHOD_NOT_RECOGNIZED",
            BridgeError::Native(_) => "NATIVE_ERROR",
            BridgeError::ContextUnavailable => "CONTEXT_UNAVAILABLE",
            BridgeError::VerificationUnavailable => "VERIFICATION_UNAVAILABLE",
            BridgeError::VerifierNotCreated => "VERIFIER_NOT_CREATED",
            BridgeError::UnknownVerificationResult => "UNKNOWN_VERIFICATION_RESULT",
            BridgeError::Json(_) => "JSON_ERROR",
            BridgeError::Runtime(_) => "RUNTIME_ERROR",
        }
    }
}

impl Serialize for BridgeError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("BridgeError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_serializes_with_code() {
        let err = BridgeError::MissingParameter("modeJson".to_string());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "MISSING_PARAMETER");
        assert_eq!(json["message"], "Required parameter 'modeJson' is missing");
    }

    #[test]
    fn test_native_error_message_is_forwarded_as_is() {
        let native = NativeError::Deserialization("unknown key 'foo'".to_string());
        let err = BridgeError::from(native.clone());

        assert_eq!(err.code(), "NATIVE_ERROR");
        assert_eq!(err.to_string(), native.to_string());
    }
}
