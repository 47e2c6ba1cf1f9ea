// Diagnostic Suite - turns a Config into diagnostics and assembles the Report

use std::sync::Arc;
use tracing::info;

use super::constants::DEFAULT_PARALLELISM;
use super::ping::PingDiagnostic;
use super::runner::Runner;
use crate::domain::{Config, Ping, Report};
use crate::port::{Diagnostic, PingProbe};

/// Runs every family enabled in a `Config` and returns one `Report`.
///
/// This is the in-process path; the diagnostics executable runs exactly this
/// in the elevated child.
pub struct DiagnosticSuite {
    probe: Arc<dyn PingProbe>,
    runner: Runner,
    force: bool,
    on_windows: bool,
}

impl DiagnosticSuite {
    /// # Example
    /// ```ignore
    /// let suite = DiagnosticSuite::new(Arc::new(IcmpPingProbe::new()), 4);
    /// let report = suite.run(&config).await;
    /// ```
    pub fn new(probe: Arc<dyn PingProbe>, parallelism: usize) -> Self {
        Self {
            probe,
            runner: Runner::new(parallelism),
            force: false,
            on_windows: cfg!(windows),
        }
    }

    pub fn with_default_parallelism(probe: Arc<dyn PingProbe>) -> Self {
        Self::new(probe, DEFAULT_PARALLELISM)
    }

    /// Force pings on non-Windows hosts (requires raw socket permissions)
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Override host platform detection (for testing)
    pub fn with_windows_host(mut self, on_windows: bool) -> Self {
        self.on_windows = on_windows;
        self
    }

    /// Expand the configuration into diagnostics, in configuration order
    pub fn diagnostics_for(&self, config: &Config) -> Vec<Arc<dyn Diagnostic>> {
        let mut diagnostics: Vec<Arc<dyn Diagnostic>> = Vec::new();

        if let Some(ping) = &config.ping {
            for address in &ping.addresses {
                let request = Ping::new(address.clone())
                    .with_count(ping.count)
                    .with_force(self.force);
                let diagnostic = PingDiagnostic::new(request, Arc::clone(&self.probe))
                    .with_windows_host(self.on_windows);
                diagnostics.push(Arc::new(diagnostic));
            }
        }

        diagnostics
    }

    pub async fn run(&self, config: &Config) -> Report {
        let diagnostics = self.diagnostics_for(config);
        let report = Report::new(self.runner.run(diagnostics).await);

        info!(
            results = report.results.len(),
            has_errors = report.has_errors(),
            "Report assembled"
        );

        report
    }
}
