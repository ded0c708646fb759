use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::Method;
use routrie::Router;

fn build_router() -> Router {
    let mut router = Router::new();
    let routes = [
        "/",
        "/zoo/animals",
        "/zoo/animals/:id",
        "/zoo/animals/:id/toys/:toy_id",
        "/zoo/:category/animals/:id/habitats/:habitat_id",
        "/inventory/:warehouse_id/feeds/:feed_id/items/:item_id",
        "/complex/:a/:b/:c/:d/:e/:f/:g/:h",
        "/zoo/health",
        "/static/*",
    ];
    for pattern in routes {
        router.get(pattern, |_| {}).unwrap();
    }
    router.post("/zoo/animals", |_| {}).unwrap();
    router
}

fn bench_route_matching(c: &mut Criterion) {
    let router = build_router();

    c.bench_function("match_static", |b| {
        b.iter(|| {
            let hit = router
                .route(black_box(&Method::GET), black_box("/zoo/health"))
                .unwrap();
            black_box(hit)
        })
    });

    c.bench_function("match_params", |b| {
        b.iter(|| {
            let hit = router
                .route(
                    black_box(&Method::GET),
                    black_box("/zoo/animals/123/toys/456"),
                )
                .unwrap();
            black_box(hit)
        })
    });

    c.bench_function("match_deep_params", |b| {
        b.iter(|| {
            let hit = router
                .route(
                    black_box(&Method::GET),
                    black_box("/complex/1/2/3/4/5/6/7/8"),
                )
                .unwrap();
            black_box(hit)
        })
    });

    c.bench_function("match_wildcard", |b| {
        b.iter(|| {
            let hit = router
                .route(
                    black_box(&Method::GET),
                    black_box("/static/css/site/main.css"),
                )
                .unwrap();
            black_box(hit)
        })
    });

    c.bench_function("miss", |b| {
        b.iter(|| {
            let hit = router
                .route(black_box(&Method::GET), black_box("/nope/not/here"))
                .unwrap();
            black_box(hit)
        })
    });
}

criterion_group!(benches, bench_route_matching);
criterion_main!(benches);
