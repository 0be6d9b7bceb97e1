use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mediator::{
    CancellationToken, LoggingBehavior, Mediator, Next, Notification, NotificationHandler,
    PipelineBehavior, Registry, Request, RequestHandler,
};

struct Add(u64, u64);

impl Request for Add {
    type Response = u64;
}

struct AddHandler;

#[async_trait]
impl RequestHandler<Add> for AddHandler {
    async fn handle(&self, request: &Add, _cancel: &CancellationToken) -> anyhow::Result<u64> {
        Ok(request.0 + request.1)
    }
}

struct PassThrough;

#[async_trait]
impl<R: Request> PipelineBehavior<R> for PassThrough {
    async fn handle(
        &self,
        _request: &R,
        _cancel: &CancellationToken,
        next: Next<'_, R>,
    ) -> mediator::Result<R::Response> {
        next.run().await
    }
}

struct Ticked;

impl Notification for Ticked {}

struct Ignore;

#[async_trait]
impl NotificationHandler<Ticked> for Ignore {
    async fn handle(&self, _notification: &Ticked, _cancel: &CancellationToken) -> anyhow::Result<()> {
        Ok(())
    }
}

fn mediator_with_behaviors(depth: usize) -> Mediator {
    let mut builder = Registry::builder().handler::<Add, _>(AddHandler);
    for _ in 0..depth {
        builder = builder.behavior::<Add, _>(PassThrough);
    }
    Mediator::new(builder.build().unwrap())
}

fn bench_send(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("mediator/send");

    for depth in [0, 1, 4, 16] {
        let mediator = mediator_with_behaviors(depth);
        group.bench_with_input(BenchmarkId::new("behaviors", depth), &depth, |b, _| {
            b.iter(|| {
                rt.block_on(async {
                    mediator.send(Add(2, 3)).await.unwrap();
                });
            });
        });
    }

    group.finish();
}

fn bench_send_with_logging(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let registry = Registry::builder()
        .handler::<Add, _>(AddHandler)
        .behavior::<Add, _>(LoggingBehavior)
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);

    c.bench_function("mediator/send_logging", |b| {
        b.iter(|| {
            rt.block_on(async {
                mediator.send(Add(2, 3)).await.unwrap();
            });
        });
    });
}

fn bench_publish(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("mediator/publish");

    for handlers in [1, 8, 32] {
        let mut builder = Registry::builder();
        for _ in 0..handlers {
            builder = builder.notification_handler::<Ticked, _>(Ignore);
        }
        let mediator = Mediator::new(builder.build().unwrap());

        group.bench_with_input(BenchmarkId::new("handlers", handlers), &handlers, |b, _| {
            b.iter(|| {
                rt.block_on(async {
                    mediator.publish(&Ticked).await.unwrap();
                });
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_send, bench_send_with_logging, bench_publish);
criterion_main!(benches);
