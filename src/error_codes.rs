use std::fmt;

use anyhow::Error;
use serde::Serialize;
use serde_json::Value;

pub const MISSING_MODE: &str = "MISSING_MODE";
pub const INVALID_CONFIG: &str = "INVALID_CONFIG";
pub const BATCH_FAILURES: &str = "BATCH_FAILURES";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodedErrorKind {
    Usage,
    Config,
    Batch,
}

/// An error with a stable machine-readable code. The binary looks for one in
/// the error chain to pick the exit status and the JSON envelope.
#[derive(Debug, Clone)]
pub struct CodedError {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
    pub kind: CodedErrorKind,
}

impl CodedError {
    pub fn usage(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, message, CodedErrorKind::Usage)
    }

    pub fn config(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, message, CodedErrorKind::Config)
    }

    pub fn batch(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, message, CodedErrorKind::Batch)
    }

    fn new(code: &'static str, message: impl Into<String>, kind: CodedErrorKind) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            kind,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            CodedErrorKind::Usage | CodedErrorKind::Batch => 1,
            CodedErrorKind::Config => 2,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            ok: false,
            error: ErrorEnvelopeBody {
                code: self.code.to_owned(),
                message: self.message.clone(),
                details: self.details.clone(),
            },
        }
    }
}

impl fmt::Display for CodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CodedError {}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: ErrorEnvelopeBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelopeBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

pub fn find_coded_error(error: &Error) -> Option<&CodedError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CodedError>())
}
