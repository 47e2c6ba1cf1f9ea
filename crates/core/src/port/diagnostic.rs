// Diagnostic Port
// The capability every check implements so the runner can schedule it

use async_trait::async_trait;

use crate::domain::{DiagnosticError, DiagnosticPayload};

/// A single self-contained check.
///
/// Implementations may run concurrently with other diagnostics and must not
/// keep mutable state between runs. Expected failures are returned as
/// `DiagnosticError`, never raised as panics.
#[async_trait]
pub trait Diagnostic: Send + Sync {
    /// Stable type tag recorded in each result (e.g. "Ping")
    fn diagnostic_type(&self) -> &'static str;

    /// Run this diagnostic as part of a suite
    async fn run_in_suite(&self) -> Result<DiagnosticPayload, DiagnosticError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{Ping, PingResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Mock diagnostic behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Succeed with a ping payload addressed to the label
        Success,
        /// Fail with a probe error carrying the message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Mock Diagnostic for testing
    pub struct MockDiagnostic {
        label: String,
        behavior: MockBehavior,
        delay: Duration,
        call_count: Arc<AtomicUsize>,
    }

    impl MockDiagnostic {
        pub fn new(label: impl Into<String>, behavior: MockBehavior) -> Self {
            Self {
                label: label.into(),
                behavior,
                delay: Duration::ZERO,
                call_count: Arc::new(AtomicUsize::new(0)),
            }
        }
        pub fn new_success(label: impl Into<String>) -> Self {
            Self::new(label, MockBehavior::Success)
        }
        pub fn new_fail(label: impl Into<String>, message: impl Into<String>) -> Self {
            Self::new(label, MockBehavior::Fail(message.into()))
        }
        pub fn new_panic_inducing(label: impl Into<String>, message: impl Into<String>) -> Self {
            Self::new(label, MockBehavior::Panic(message.into()))
        }
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
        /// Label the mock was created with, recovered from a success payload
        pub fn label_of(payload: &DiagnosticPayload) -> &str {
            match payload {
                DiagnosticPayload::Ping(result) => &result.ping.address,
            }
        }
    }

    #[async_trait]
    impl Diagnostic for MockDiagnostic {
        fn diagnostic_type(&self) -> &'static str {
            "Mock"
        }

        async fn run_in_suite(&self) -> Result<DiagnosticPayload, DiagnosticError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match &self.behavior {
                MockBehavior::Success => Ok(DiagnosticPayload::Ping(PingResult {
                    ping: Ping::new(self.label.clone()),
                    statistics: None,
                })),
                MockBehavior::Fail(msg) => Err(DiagnosticError::Probe(msg.clone())),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
            }
        }
    }
}
