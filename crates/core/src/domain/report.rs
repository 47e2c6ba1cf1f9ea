// Report - the aggregated outcome of one suite run

use serde::{Deserialize, Serialize};

use super::diagnostic::DiagnosticResult;
use super::fallible::Fallible;

/// Results of a suite, in the order the diagnostics were submitted.
///
/// This is the document the diagnostics executable prints and the bridge
/// decodes, so both paths go through `to_json` / `from_json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report {
    #[serde(default)]
    pub results: Vec<DiagnosticResult>,
}

impl Report {
    pub fn new(results: Vec<DiagnosticResult>) -> Self {
        Self { results }
    }

    /// True if any diagnostic in the report failed
    pub fn has_errors(&self) -> bool {
        Fallible::has_errors(self)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Encode the report: one line, or two-space indented when `indent` is set
    pub fn to_json(&self, indent: bool) -> serde_json::Result<String> {
        if indent {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

impl Fallible for Report {
    fn has_errors(&self) -> bool {
        self.results.has_errors()
    }
}
