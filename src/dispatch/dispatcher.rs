use super::{AnswerService, DispatchResult, RequestId};
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Issues queries to the answer service without blocking the caller.
///
/// Each `submit` spawns one task on the runtime; the task always sends exactly
/// one [`DispatchResult`] back, tagged with the request id. The frame loop
/// drains results with [`try_results`](Self::try_results), which never waits.
pub struct AnswerDispatcher {
    /// Channel name for logs ("synthesis" or "manual")
    channel: &'static str,
    service: Arc<dyn AnswerService>,
    runtime: Handle,
    error_text: String,
    results_tx: mpsc::UnboundedSender<DispatchResult>,
    results_rx: mpsc::UnboundedReceiver<DispatchResult>,
    /// Tasks spawned but not yet finished
    in_flight: Arc<AtomicUsize>,
}

impl AnswerDispatcher {
    pub fn new(
        channel: &'static str,
        service: Arc<dyn AnswerService>,
        error_text: impl Into<String>,
        runtime: Handle,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            channel,
            service,
            runtime,
            error_text: error_text.into(),
            results_tx,
            results_rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a dispatcher bound to the runtime of the calling context.
    pub fn on_current_runtime(
        channel: &'static str,
        service: Arc<dyn AnswerService>,
        error_text: impl Into<String>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().context("Answer dispatcher needs a tokio runtime")?;
        Ok(Self::new(channel, service, error_text, runtime))
    }

    /// Submit a query; returns immediately with the id its result will carry.
    pub fn submit(&mut self, query: impl Into<String>) -> RequestId {
        let query = query.into();
        let request_id = RequestId::new();
        let channel = self.channel;
        let service = Arc::clone(&self.service);
        let error_text = self.error_text.clone();
        let results_tx = self.results_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);

        debug!(channel, request_id = %request_id, query = %query, "Dispatching query");
        in_flight.fetch_add(1, Ordering::SeqCst);

        self.runtime.spawn(async move {
            // Inner task so a panicking service still yields a result
            let call = tokio::spawn(async move { service.answer(&query).await });

            let result = match call.await {
                Ok(Ok(answer)) => DispatchResult::answered(request_id, answer),
                Ok(Err(e)) => {
                    warn!(channel, request_id = %request_id, error = %e, "Answer request failed");
                    DispatchResult::failed(request_id, error_text)
                }
                Err(e) => {
                    error!(channel, request_id = %request_id, error = %e, "Answer task aborted");
                    DispatchResult::failed(request_id, error_text)
                }
            };

            // Receiver lives as long as the dispatcher; a send error only
            // means the loop has shut down.
            let _ = results_tx.send(result);
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });

        request_id
    }

    /// Drain every result completed so far, in arrival order. Never blocks.
    pub fn try_results(&mut self) -> Vec<DispatchResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.results_rx.try_recv() {
            results.push(result);
        }
        results
    }

    /// Wait for the next result.
    pub async fn next_result(&mut self) -> Option<DispatchResult> {
        self.results_rx.recv().await
    }

    /// Requests whose task has not finished yet
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}
