// Diagnostic Result Model

use serde::{Deserialize, Serialize};

use super::error::DiagnosticError;
use super::fallible::Fallible;
use super::ping::PingResult;

/// Typed success payload of a diagnostic, tagged by variant name on the wire.
///
/// A new diagnostic kind adds a variant here and a `Fallible` impl for its
/// result type; the runner does not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagnosticPayload {
    Ping(PingResult),
}

impl Fallible for DiagnosticPayload {
    fn has_errors(&self) -> bool {
        match self {
            DiagnosticPayload::Ping(result) => result.has_errors(),
        }
    }
}

/// Outcome of one diagnostic in a suite.
///
/// Exactly one of `result` and `error` is set. The constructors are the only
/// way to build one; decoding rejects slots with neither or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", try_from = "RawDiagnosticResult")]
pub struct DiagnosticResult {
    /// Type tag of the diagnostic that produced this result
    diagnostic: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<DiagnosticPayload>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Wire shape before the one-of check
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDiagnosticResult {
    diagnostic: String,
    #[serde(default)]
    result: Option<DiagnosticPayload>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawDiagnosticResult> for DiagnosticResult {
    type Error = String;

    fn try_from(raw: RawDiagnosticResult) -> Result<Self, Self::Error> {
        match (raw.result, raw.error) {
            (Some(payload), None) => Ok(Self::success(raw.diagnostic, payload)),
            (None, Some(error)) => Ok(Self {
                diagnostic: raw.diagnostic,
                result: None,
                error: Some(error),
            }),
            (None, None) => Err(format!(
                "{} result has neither Result nor Error",
                raw.diagnostic
            )),
            (Some(_), Some(_)) => Err(format!(
                "{} result has both Result and Error",
                raw.diagnostic
            )),
        }
    }
}

impl DiagnosticResult {
    pub fn success(diagnostic: impl Into<String>, payload: DiagnosticPayload) -> Self {
        Self {
            diagnostic: diagnostic.into(),
            result: Some(payload),
            error: None,
        }
    }

    pub fn failure(diagnostic: impl Into<String>, error: &DiagnosticError) -> Self {
        Self {
            diagnostic: diagnostic.into(),
            result: None,
            error: Some(error.to_string()),
        }
    }

    pub fn from_outcome(
        diagnostic: impl Into<String>,
        outcome: Result<DiagnosticPayload, DiagnosticError>,
    ) -> Self {
        match outcome {
            Ok(payload) => Self::success(diagnostic, payload),
            Err(e) => Self::failure(diagnostic, &e),
        }
    }

    pub fn diagnostic(&self) -> &str {
        &self.diagnostic
    }

    /// Success payload, None on failure
    pub fn result(&self) -> Option<&DiagnosticPayload> {
        self.result.as_ref()
    }

    /// Error message, None on success
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl Fallible for DiagnosticResult {
    fn has_errors(&self) -> bool {
        self.error.is_some() || self.result.has_errors()
    }
}
