use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use stackrouter::{handler, param_handler, Context, Handler, Router};
use std::hint::black_box;

fn pass() -> Handler {
    handler(|ctx, next| next.run(ctx))
}

fn zoo_router() -> Router {
    let mut animals = Router::new();
    animals.get("/list", [pass()]).unwrap();
    animals.post("/list", [pass()]).unwrap();
    animals.get("/:id", [pass()]).unwrap();
    animals.put("/:id", [pass()]).unwrap();
    animals.delete("/:id", [pass()]).unwrap();
    animals.get("/:id/toys/:toy_id", [pass()]).unwrap();

    let mut zoo = Router::new();
    zoo.prefix("/zoo").unwrap();
    zoo.use_middleware([pass(), pass()]).unwrap();
    zoo.param("id", param_handler(|_id, ctx, next| next.run(ctx)));
    zoo.use_at("/animals", [animals.routes()]).unwrap();
    zoo.get(
        "/:category/animals/:id/habitats/:habitat_id/sections/:section_id",
        [pass()],
    )
    .unwrap();
    zoo.get("/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i", [pass()])
        .unwrap();
    zoo
}

const PATHS: [(&str, &str); 5] = [
    ("get", "/zoo/animals/123"),
    ("get", "/zoo/animals/123/toys/456"),
    ("get", "/zoo/cats/animals/123/habitats/88/sections/5"),
    ("delete", "/zoo/animals/9"),
    ("get", "/zoo/complex/1/2/3/4/5/6/7/8/9"),
];

fn bench_route_match(c: &mut Criterion) {
    let router = zoo_router();
    c.bench_function("route_match", |b| {
        b.iter(|| {
            for (method, path) in PATHS {
                black_box(router.match_route(path, method));
            }
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = zoo_router().routes();
    let requests: Vec<(Method, &str)> = PATHS
        .iter()
        .map(|(method, path)| {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).unwrap();
            (method, *path)
        })
        .collect();

    c.bench_function("dispatch", |b| {
        b.iter(|| {
            for (method, path) in &requests {
                let mut ctx = Context::new(method.clone(), *path);
                dispatcher.handle(&mut ctx).unwrap();
                black_box(&ctx.params);
            }
        })
    });
}

criterion_group!(benches, bench_route_match, bench_dispatch);
criterion_main!(benches);
