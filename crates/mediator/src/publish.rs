//! Concurrent fan-out of one notification to its handlers.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use futures_util::future::join_all;

use crate::cancellation::CancellationToken;
use crate::config::PublishStrategy;
use crate::error::{MediatorError, NotificationFailure, Result};
use crate::handler::NotificationHandler;
use crate::registry::Registered;
use crate::request::Notification;

/// Runs every handler concurrently and waits for all of them.
///
/// A failing or panicking handler never stops its siblings. Failures are
/// collected in registration order and reported according to `strategy`.
pub(crate) async fn fan_out<N: Notification>(
    handlers: &[Registered<dyn NotificationHandler<N>>],
    notification: &N,
    cancel: &CancellationToken,
    strategy: PublishStrategy,
) -> Result<()> {
    if handlers.is_empty() {
        tracing::debug!("no handlers registered");
        return Ok(());
    }

    let runs = handlers.iter().map(|registered| async move {
        let outcome = AssertUnwindSafe(registered.handler.handle(notification, cancel))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(NotificationFailure {
                handler: registered.name,
                error,
            }),
            Err(panic) => Some(NotificationFailure {
                handler: registered.name,
                error: anyhow::anyhow!("handler panicked: {}", panic_message(panic.as_ref())),
            }),
        }
    });

    let mut failures: Vec<NotificationFailure> =
        join_all(runs).await.into_iter().flatten().collect();

    if failures.is_empty() {
        tracing::debug!(handlers = handlers.len(), "notification handled");
        return Ok(());
    }

    for failure in &failures {
        tracing::warn!(
            handler = failure.handler,
            error = %failure.error,
            "notification handler failed"
        );
    }
    metrics::counter!(
        "mediator_notification_handler_failures_total",
        "notification" => N::notification_name()
    )
    .increment(failures.len() as u64);

    if strategy == PublishStrategy::FirstFailure {
        failures.truncate(1);
    }

    Err(MediatorError::NotificationFailed {
        notification_type: N::notification_name(),
        failures,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
