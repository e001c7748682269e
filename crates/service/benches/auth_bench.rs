use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::{flow, AuthConfig, AuthService, NewUser, StoreAuthService};
use service::auth::repository::mock::MockUserRepository;

fn bench_sign_in(c: &mut Criterion) {
    let repo = Arc::new(MockUserRepository::default());
    let svc = StoreAuthService::new(repo, AuthConfig::with_secret("secret"));

    // pre-create user outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(flow::sign_up(&svc, NewUser::new("bench", "Benchmark1"))).unwrap();

    c.bench_function("auth_sign_in", |b| {
        b.iter(|| {
            rt.block_on(flow::sign_in(&svc, NewUser::new("bench", "Benchmark1"))).unwrap();
        });
    });

    let token = svc.generate_jwt(1).unwrap();
    c.bench_function("auth_validate_jwt", |b| {
        b.iter(|| svc.validate_jwt(&token).unwrap());
    });
}

criterion_group!(benches, bench_sign_in);
criterion_main!(benches);
