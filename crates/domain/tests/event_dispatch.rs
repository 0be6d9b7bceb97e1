//! Integration tests for publishing aggregate events through a mediator.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use domain::{Aggregate, DomainEvent, DomainEventDispatcher, DomainEvents};
use mediator::{
    CancellationToken, Mediator, MediatorConfig, Notification, NotificationHandler,
    PublishStrategy, Registry,
};

type Trace = Arc<Mutex<Vec<String>>>;

struct StockReserved(u32);

impl Notification for StockReserved {}

struct StockReleased(u32);

impl Notification for StockReleased {}

/// Records start and end of each handling, sleeping in between.
struct Slow {
    label: &'static str,
    delay: Duration,
    trace: Trace,
}

impl Slow {
    async fn run(&self, id: u32) {
        self.trace
            .lock()
            .unwrap()
            .push(format!("{}:{id}:start", self.label));
        tokio::time::sleep(self.delay).await;
        self.trace
            .lock()
            .unwrap()
            .push(format!("{}:{id}:end", self.label));
    }
}

#[async_trait]
impl NotificationHandler<StockReserved> for Slow {
    async fn handle(&self, event: &StockReserved, _cancel: &CancellationToken) -> anyhow::Result<()> {
        self.run(event.0).await;
        Ok(())
    }
}

struct Flaky;

#[async_trait]
impl NotificationHandler<StockReleased> for Flaky {
    async fn handle(&self, event: &StockReleased, _cancel: &CancellationToken) -> anyhow::Result<()> {
        anyhow::bail!("release {} rejected", event.0)
    }
}

struct AlsoFlaky;

#[async_trait]
impl NotificationHandler<StockReleased> for AlsoFlaky {
    async fn handle(&self, _event: &StockReleased, _cancel: &CancellationToken) -> anyhow::Result<()> {
        anyhow::bail!("ledger closed")
    }
}

#[derive(Default)]
struct Inventory {
    events: DomainEvents,
}

impl Aggregate for Inventory {
    fn pending_events(&self) -> Vec<Arc<dyn DomainEvent>> {
        self.events.pending().to_vec()
    }

    fn clear_pending_events(&mut self) {
        self.events.clear();
    }
}

mod sequencing {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn events_run_one_at_a_time_handlers_run_together() {
        let trace = Trace::default();
        let registry = Registry::builder()
            .notification_handler::<StockReserved, _>(Slow {
                label: "fast",
                delay: Duration::from_millis(10),
                trace: trace.clone(),
            })
            .notification_handler::<StockReserved, _>(Slow {
                label: "slow",
                delay: Duration::from_millis(50),
                trace: trace.clone(),
            })
            .build()
            .unwrap();
        let dispatcher = DomainEventDispatcher::new(Mediator::new(registry));

        let mut inventory = Inventory::default();
        inventory.events.record(StockReserved(1));
        inventory.events.record(StockReserved(2));

        let published = dispatcher
            .dispatch_events(&mut inventory, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(published, 2);

        let trace = trace.lock().unwrap().clone();
        assert_eq!(trace.len(), 8);

        // Both handlers start before either finishes.
        assert_eq!(&trace[..2], &["fast:1:start", "slow:1:start"]);

        // Nothing for event 2 begins before event 1 is fully handled.
        let last_of_first = trace.iter().rposition(|t| t.contains(":1:")).unwrap();
        let first_of_second = trace.iter().position(|t| t.contains(":2:")).unwrap();
        assert!(last_of_first < first_of_second, "{trace:?}");
    }
}

mod failures {
    use super::*;

    fn dispatcher(strategy: PublishStrategy) -> DomainEventDispatcher {
        let registry = Registry::builder()
            .notification_handler::<StockReleased, _>(Flaky)
            .notification_handler::<StockReleased, _>(AlsoFlaky)
            .build()
            .unwrap();
        let config = MediatorConfig::default().with_publish_strategy(strategy);
        DomainEventDispatcher::new(Mediator::with_config(registry, config))
    }

    #[tokio::test]
    async fn aggregate_strategy_reports_every_handler() {
        let mut inventory = Inventory::default();
        inventory.events.record(StockReleased(7));

        let err = dispatcher(PublishStrategy::Aggregate)
            .dispatch_events(&mut inventory, &CancellationToken::new())
            .await
            .unwrap_err();

        let failures = err.notification_failures();
        assert_eq!(failures.len(), 2);
        assert!(failures[0].handler.ends_with("::Flaky"));
        assert!(failures[1].handler.ends_with("::AlsoFlaky"));
        assert!(inventory.pending_events().is_empty());
    }

    #[tokio::test]
    async fn first_failure_strategy_reports_one_handler() {
        let mut inventory = Inventory::default();
        inventory.events.record(StockReleased(7));

        let err = dispatcher(PublishStrategy::FirstFailure)
            .dispatch_events(&mut inventory, &CancellationToken::new())
            .await
            .unwrap_err();

        let failures = err.notification_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].error.to_string(), "release 7 rejected");
    }
}
