// Ping Diagnostic - validates the request, then delegates ICMP work to the probe

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::constants::PING_DIAGNOSTIC_TYPE;
use crate::domain::{DiagnosticError, DiagnosticPayload, Ping, PingResult};
use crate::port::{Diagnostic, PingProbe};

/// Runs one `Ping` through a `PingProbe`
pub struct PingDiagnostic {
    ping: Ping,
    probe: Arc<dyn PingProbe>,
    on_windows: bool,
}

impl PingDiagnostic {
    pub fn new(ping: Ping, probe: Arc<dyn PingProbe>) -> Self {
        Self {
            ping,
            probe,
            on_windows: cfg!(windows),
        }
    }

    /// Override host platform detection (for testing)
    pub fn with_windows_host(mut self, on_windows: bool) -> Self {
        self.on_windows = on_windows;
        self
    }

    pub fn ping(&self) -> &Ping {
        &self.ping
    }

    pub async fn run(&self) -> Result<PingResult, DiagnosticError> {
        self.ping.check(self.on_windows)?;

        let count = self.ping.effective_count();
        let timeout = self.ping.timeout();
        debug!(
            address = %self.ping.address,
            count = count,
            timeout_ms = timeout.as_millis() as u64,
            "Pinging"
        );

        let statistics = self
            .probe
            .ping(&self.ping.address, count, timeout)
            .await?;

        info!(
            address = %self.ping.address,
            sent = statistics.packets_sent,
            received = statistics.packets_recv,
            "Ping completed"
        );

        Ok(PingResult {
            ping: self.ping.clone(),
            statistics: Some(statistics),
        })
    }
}

#[async_trait]
impl Diagnostic for PingDiagnostic {
    fn diagnostic_type(&self) -> &'static str {
        PING_DIAGNOSTIC_TYPE
    }

    async fn run_in_suite(&self) -> Result<DiagnosticPayload, DiagnosticError> {
        self.run().await.map(DiagnosticPayload::Ping)
    }
}
