//! Error taxonomy for plan synthesis.

use thiserror::Error;

use crate::model::PlanValidationError;

/// Why a synthesis call did not produce a plan.
///
/// [`SynthesisError::MissingCredential`] never leaves
/// [`super::SynthesisService`]: it is turned into the deterministic mock
/// plan. The other three are surfaced to the caller unchanged.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("no Gemini API key is configured")]
    MissingCredential,

    #[error("synthesis yielded no text")]
    EmptyResponse,

    #[error("malformed plan response: {0}")]
    MalformedResponse(#[from] ResponseDefect),

    #[error("transport failure: {0}")]
    TransportFailure(#[from] TransportError),
}

impl SynthesisError {
    /// Whether this error reaches callers of the synthesis boundary.
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, Self::MissingCredential)
    }

    /// Short machine-friendly label, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::EmptyResponse => "empty_response",
            Self::MalformedResponse(_) => "malformed_response",
            Self::TransportFailure(_) => "transport_failure",
        }
    }
}

/// The response text was present but could not become a valid plan.
#[derive(Debug, Error)]
pub enum ResponseDefect {
    #[error("response is not valid plan JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plan failed validation: {0}")]
    Invalid(#[from] PlanValidationError),
}

/// The call to the generative API itself failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Gemini API error: {message}")]
    Api { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_credential_is_internal() {
        assert!(!SynthesisError::MissingCredential.is_surfaced());
        assert!(SynthesisError::EmptyResponse.is_surfaced());
        let malformed: SynthesisError = ResponseDefect::from(
            serde_json::from_str::<serde_json::Value>("not json").unwrap_err(),
        )
        .into();
        assert!(malformed.is_surfaced());
        assert_eq!(malformed.kind(), "malformed_response");
    }

    #[test]
    fn error_chain_keeps_underlying_cause() {
        use std::error::Error as _;

        let err: SynthesisError = TransportError::Status {
            status: 503,
            message: "overloaded".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "transport failure: Gemini API returned HTTP 503: overloaded"
        );
        assert!(err.source().is_some());
    }
}
