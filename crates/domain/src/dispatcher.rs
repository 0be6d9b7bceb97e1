//! Publishes the events aggregates raised during a unit of work.

use std::sync::Arc;

use mediator::{CancellationToken, Mediator, MediatorError, Result};

use crate::aggregate::Aggregate;
use crate::event::DomainEvent;

/// Drains aggregates and publishes their events one at a time.
///
/// Typically invoked by the persistence layer right after a successful save.
/// Events are removed from the aggregate before the first publish, so a
/// failing handler never causes redelivery on a later dispatch. Each event's
/// handlers run concurrently with each other, but the next event is only
/// published after the previous one completed.
#[derive(Debug, Clone)]
pub struct DomainEventDispatcher {
    mediator: Mediator,
}

impl DomainEventDispatcher {
    pub fn new(mediator: Mediator) -> Self {
        Self { mediator }
    }

    pub fn mediator(&self) -> &Mediator {
        &self.mediator
    }

    /// Drains one aggregate and publishes its events in the order they were raised.
    ///
    /// Returns the number of events published. Stops at the first failure;
    /// events after it are dropped, not re-queued.
    #[tracing::instrument(skip_all, fields(aggregate = aggregate.aggregate_type()))]
    pub async fn dispatch_events<A>(
        &self,
        aggregate: &mut A,
        cancel: &CancellationToken,
    ) -> Result<usize>
    where
        A: Aggregate + ?Sized,
    {
        let events = aggregate.take_pending_events();
        self.publish_in_order(events, cancel).await
    }

    /// Drains every aggregate, then publishes all of their events.
    ///
    /// Aggregates are drained in the order given, each keeping its own event
    /// order, before anything is published.
    #[tracing::instrument(skip_all, fields(aggregates = aggregates.len()))]
    pub async fn dispatch_all(
        &self,
        aggregates: &mut [&mut dyn Aggregate],
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let events: Vec<Arc<dyn DomainEvent>> = aggregates
            .iter_mut()
            .flat_map(|aggregate| aggregate.take_pending_events())
            .collect();
        self.publish_in_order(events, cancel).await
    }

    async fn publish_in_order(
        &self,
        events: Vec<Arc<dyn DomainEvent>>,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        if events.is_empty() {
            tracing::debug!("no pending events");
            return Ok(0);
        }

        for event in &events {
            if cancel.is_cancelled() {
                return Err(MediatorError::Cancelled {
                    operation: "domain event dispatch",
                });
            }

            let event_type = event.event_type();
            event
                .publish(&self.mediator, cancel)
                .await
                .inspect_err(|error| {
                    tracing::warn!(event = event_type, %error, "domain event dispatch failed");
                })?;
            metrics::counter!("domain_events_dispatched_total", "event" => event_type)
                .increment(1);
        }

        tracing::info!(events = events.len(), "domain events dispatched");
        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DomainEvents;
    use async_trait::async_trait;
    use mediator::{Notification, NotificationHandler, Registry};
    use std::sync::Mutex;

    struct Happened(&'static str);

    impl Notification for Happened {}

    type Log = Arc<Mutex<Vec<&'static str>>>;

    struct Record {
        log: Log,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl NotificationHandler<Happened> for Record {
        async fn handle(&self, event: &Happened, _cancel: &CancellationToken) -> anyhow::Result<()> {
            if self.fail_on == Some(event.0) {
                anyhow::bail!("rejected {}", event.0);
            }
            self.log.lock().unwrap().push(event.0);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Ledger {
        events: DomainEvents,
    }

    impl Ledger {
        fn with(names: &[&'static str]) -> Self {
            let mut ledger = Self::default();
            for &name in names {
                ledger.events.record(Happened(name));
            }
            ledger
        }
    }

    impl Aggregate for Ledger {
        fn pending_events(&self) -> Vec<Arc<dyn DomainEvent>> {
            self.events.pending().to_vec()
        }

        fn clear_pending_events(&mut self) {
            self.events.clear();
        }
    }

    fn dispatcher(fail_on: Option<&'static str>) -> (DomainEventDispatcher, Log) {
        let log = Log::default();
        let registry = Registry::builder()
            .notification_handler::<Happened, _>(Record {
                log: log.clone(),
                fail_on,
            })
            .build()
            .unwrap();
        (DomainEventDispatcher::new(Mediator::new(registry)), log)
    }

    #[tokio::test]
    async fn test_dispatch_publishes_in_order_and_drains() {
        let (dispatcher, log) = dispatcher(None);
        let mut ledger = Ledger::with(&["E1", "E2", "E3"]);

        let published = dispatcher
            .dispatch_events(&mut ledger, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(published, 3);
        assert_eq!(*log.lock().unwrap(), vec!["E1", "E2", "E3"]);
        assert!(ledger.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_second_dispatch_publishes_nothing() {
        let (dispatcher, log) = dispatcher(None);
        let mut ledger = Ledger::with(&["E1"]);
        let cancel = CancellationToken::new();

        dispatcher.dispatch_events(&mut ledger, &cancel).await.unwrap();
        let published = dispatcher.dispatch_events(&mut ledger, &cancel).await.unwrap();

        assert_eq!(published, 0);
        assert_eq!(*log.lock().unwrap(), vec!["E1"]);
    }

    #[tokio::test]
    async fn test_dispatch_all_concatenates_in_given_order() {
        let (dispatcher, log) = dispatcher(None);
        let mut a = Ledger::with(&["E1", "E2"]);
        let mut b = Ledger::with(&["E3"]);

        let mut aggregates: [&mut dyn Aggregate; 2] = [&mut a, &mut b];
        let published = dispatcher
            .dispatch_all(&mut aggregates, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(published, 3);
        assert_eq!(*log.lock().unwrap(), vec!["E1", "E2", "E3"]);
        assert!(a.pending_events().is_empty());
        assert!(b.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_failure_stops_dispatch_without_requeue() {
        let (dispatcher, log) = dispatcher(Some("E2"));
        let mut ledger = Ledger::with(&["E1", "E2", "E3"]);

        let err = dispatcher
            .dispatch_events(&mut ledger, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MediatorError::NotificationFailed { .. }));
        assert!(err.to_string().contains("rejected E2"));
        assert_eq!(*log.lock().unwrap(), vec!["E1"]);
        assert!(ledger.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_dispatch_still_drains() {
        let (dispatcher, log) = dispatcher(None);
        let mut ledger = Ledger::with(&["E1", "E2"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = dispatcher
            .dispatch_events(&mut ledger, &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(log.lock().unwrap().is_empty());
        assert!(ledger.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_events_without_handlers_are_no_ops() {
        struct Unobserved;
        impl Notification for Unobserved {}

        let (dispatcher, _log) = dispatcher(None);
        let mut ledger = Ledger::default();
        ledger.events.record(Unobserved);

        let published = dispatcher
            .dispatch_events(&mut ledger, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(published, 1);
    }
}
