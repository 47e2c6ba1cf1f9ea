// Ping Probe Port
// Sends ICMP echo requests; the ping diagnostic only validates and delegates

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{DiagnosticError, PingStatistics};

/// Probe errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("could not resolve {address}: {reason}")]
    Resolve { address: String, reason: String },

    #[error("could not open ICMP socket: {0}")]
    Socket(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<ProbeError> for DiagnosticError {
    fn from(e: ProbeError) -> Self {
        DiagnosticError::Probe(e.to_string())
    }
}

/// ICMP probe port
#[async_trait]
pub trait PingProbe: Send + Sync {
    /// Ping `address` with `count` packets, giving up after `timeout`.
    ///
    /// Lost packets are reported through the statistics, not as errors.
    ///
    /// # Errors
    /// - ProbeError::Resolve if the address is malformed or cannot be resolved
    /// - ProbeError::Socket if the process lacks permission for ICMP sockets
    async fn ping(
        &self,
        address: &str,
        count: u32,
        timeout: Duration,
    ) -> Result<PingStatistics, ProbeError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock PingProbe for testing
    ///
    /// Replies with a fixed round-trip time for every packet, unless the
    /// address was registered as failing.
    pub struct MockPingProbe {
        rtt: Duration,
        failures: HashMap<String, ProbeError>,
        calls: Mutex<Vec<String>>,
    }

    impl MockPingProbe {
        pub fn new(rtt: Duration) -> Self {
            Self {
                rtt,
                failures: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }
        pub fn with_failure(mut self, address: impl Into<String>, error: ProbeError) -> Self {
            self.failures.insert(address.into(), error);
            self
        }
        /// Addresses pinged so far, in call order
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PingProbe for MockPingProbe {
        async fn ping(
            &self,
            address: &str,
            count: u32,
            _timeout: Duration,
        ) -> Result<PingStatistics, ProbeError> {
            self.calls.lock().unwrap().push(address.to_string());

            if let Some(error) = self.failures.get(address) {
                return Err(error.clone());
            }

            let rtts = vec![self.rtt; count as usize];
            Ok(PingStatistics::from_rtts(address, address, count, &rtts))
        }
    }
}
