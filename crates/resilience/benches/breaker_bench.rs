use common::EntityKind;
use criterion::{Criterion, criterion_group, criterion_main};
use resilience::{
    BreakerConfig, BreakerRegistry, CallOutcome, CircuitBreaker, InMemoryLookup, ResilientClient,
};

fn bench_permit_closed(c: &mut Criterion) {
    let breaker = CircuitBreaker::new("cargo-service", BreakerConfig::default()).unwrap();

    c.bench_function("breaker/permit_and_record_closed", |b| {
        b.iter(|| {
            let permit = breaker.try_acquire().unwrap();
            breaker.record(permit, CallOutcome::Success);
        });
    });
}

fn bench_permit_open(c: &mut Criterion) {
    let breaker = CircuitBreaker::new("cargo-service", BreakerConfig::default()).unwrap();
    for _ in 0..5 {
        breaker.record_outcome(CallOutcome::Failure);
    }

    c.bench_function("breaker/reject_open", |b| {
        b.iter(|| assert!(!breaker.permit()));
    });
}

fn bench_client_exists(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let registry = BreakerRegistry::default();
    let lookup = InMemoryLookup::new();
    lookup.insert(42, ());
    let client = ResilientClient::new("cargo-service", EntityKind::Cargo, lookup, &registry);

    c.bench_function("client/exists_in_memory", |b| {
        b.iter(|| {
            rt.block_on(async {
                assert!(client.exists(42).await.unwrap());
            });
        });
    });
}

criterion_group!(
    benches,
    bench_permit_closed,
    bench_permit_open,
    bench_client_exists
);
criterion_main!(benches);
