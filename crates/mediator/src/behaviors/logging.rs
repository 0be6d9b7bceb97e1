//! Timing and outcome logging around each request.

use std::time::Instant;

use async_trait::async_trait;

use crate::cancellation::CancellationToken;
use crate::error::Result;
use crate::pipeline::{Next, PipelineBehavior};
use crate::request::Request;

/// Logs each request's outcome and records its duration.
///
/// Records `mediator_request_duration_seconds` labelled by request name.
/// The result passes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBehavior;

#[async_trait]
impl<R: Request> PipelineBehavior<R> for LoggingBehavior {
    async fn handle(
        &self,
        _request: &R,
        _cancel: &CancellationToken,
        next: Next<'_, R>,
    ) -> Result<R::Response> {
        let request = R::request_name();
        let started = Instant::now();
        tracing::debug!(request, "handling request");

        let result = next.run().await;

        let elapsed = started.elapsed();
        metrics::histogram!("mediator_request_duration_seconds", "request" => request)
            .record(elapsed.as_secs_f64());

        match &result {
            Ok(_) => tracing::info!(
                request,
                elapsed_ms = elapsed.as_millis() as u64,
                "request handled"
            ),
            Err(error) => tracing::warn!(
                request,
                elapsed_ms = elapsed.as_millis() as u64,
                %error,
                "request failed"
            ),
        }

        result
    }
}
