use criterion::{black_box, criterion_group, criterion_main, Criterion};
use voyage_core::store::ListQuery;
use voyage_core::testing::{user_with, Agency};
use voyage_core::{authorize, PermissionId, Request, ResourceKind};

fn guard_benchmarks(c: &mut Criterion) {
    let user = user_with(&["view_client", "add_client", "change_client", "view_package", "view_reservation"]);
    let granted: PermissionId = "view_package".parse().unwrap();
    let missing: PermissionId = "delete_package".parse().unwrap();

    c.bench_function("authorize_granted", |b| {
        b.iter(|| authorize(black_box(&user), black_box(Some(&granted))))
    });

    c.bench_function("authorize_denied", |b| {
        b.iter(|| authorize(black_box(&user), black_box(Some(&missing))))
    });
}

fn list_benchmarks(c: &mut Criterion) {
    let mut agency = Agency::new().unwrap();
    agency.seed_catalog();
    let token = agency.login(agency.root).unwrap();
    let request = Request::List { resource: ResourceKind::Product, query: ListQuery::search("cusco") };

    c.bench_function("product_search", |b| {
        b.iter(|| agency.office.handle(Some(&token), black_box(&request)).unwrap())
    });
}

criterion_group!(benches, guard_benchmarks, list_benchmarks);
criterion_main!(benches);
