// Runner - executes a batch of diagnostics on a fixed pool of workers

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::domain::{DiagnosticError, DiagnosticResult};
use crate::port::Diagnostic;

/// A diagnostic tagged with its submission index
struct DiagnosticRequest {
    diagnostic: Arc<dyn Diagnostic>,
    order: usize,
}

/// Runs diagnostics with bounded parallelism.
///
/// Results come back in submission order whatever the completion order. A
/// failing (or panicking) diagnostic becomes an error in its own slot and
/// never stops its siblings. There is no timeout here: diagnostics bound
/// their own I/O.
pub struct Runner {
    parallelism: usize,
}

impl Runner {
    /// Create a runner with `parallelism` workers (0 is treated as 1)
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
        }
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Run every diagnostic and wait for all of them.
    ///
    /// Returns exactly one result per diagnostic, at the diagnostic's index.
    pub async fn run(&self, diagnostics: Vec<Arc<dyn Diagnostic>>) -> Vec<DiagnosticResult> {
        let total = diagnostics.len();
        let tags: Vec<&'static str> = diagnostics.iter().map(|d| d.diagnostic_type()).collect();

        let queue: VecDeque<DiagnosticRequest> = diagnostics
            .into_iter()
            .enumerate()
            .map(|(order, diagnostic)| DiagnosticRequest { diagnostic, order })
            .collect();
        let queue = Arc::new(Mutex::new(queue));
        let slots: Arc<Mutex<Vec<Option<DiagnosticResult>>>> =
            Arc::new(Mutex::new(vec![None; total]));

        info!(
            diagnostics = total,
            parallelism = self.parallelism,
            "Running diagnostics"
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..self.parallelism.min(total) {
            let queue = Arc::clone(&queue);
            let slots = Arc::clone(&slots);
            workers.spawn(async move {
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(request) = next else {
                        break;
                    };
                    let result = Self::execute(worker_id, request.diagnostic).await;
                    // Each index is written by exactly one worker
                    slots.lock().await[request.order] = Some(result);
                }
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = ?e, "Diagnostic worker exited abnormally");
            }
        }

        let slots = std::mem::take(&mut *slots.lock().await);
        let results: Vec<DiagnosticResult> = slots
            .into_iter()
            .zip(tags)
            .map(|(slot, tag)| {
                slot.unwrap_or_else(|| {
                    DiagnosticResult::failure(
                        tag,
                        &DiagnosticError::Panicked("worker exited before completion".to_string()),
                    )
                })
            })
            .collect();

        let failed = results.iter().filter(|r| r.error().is_some()).count();
        info!(diagnostics = total, failed = failed, "Diagnostics completed");

        results
    }

    /// Run one diagnostic in its own task so a panic stays inside its slot
    async fn execute(worker_id: usize, diagnostic: Arc<dyn Diagnostic>) -> DiagnosticResult {
        let tag = diagnostic.diagnostic_type();
        debug!(worker_id = worker_id, diagnostic = tag, "Starting diagnostic");

        let handle = tokio::spawn(async move { diagnostic.run_in_suite().await });

        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(join_err) if join_err.is_panic() => {
                let msg = panic_message(join_err.into_panic());
                error!(diagnostic = tag, panic_msg = %msg, "Diagnostic panicked");
                Err(DiagnosticError::Panicked(msg))
            }
            Err(join_err) => {
                error!(diagnostic = tag, error = ?join_err, "Diagnostic cancelled");
                Err(DiagnosticError::Panicked(join_err.to_string()))
            }
        };

        debug!(
            worker_id = worker_id,
            diagnostic = tag,
            success = outcome.is_ok(),
            "Diagnostic finished"
        );

        DiagnosticResult::from_outcome(tag, outcome)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
