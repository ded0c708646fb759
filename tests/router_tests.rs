use std::sync::{Arc, Mutex};

use http::{Method, StatusCode};
use routrie::{ChainContext, RouteOutcome, Router};

use tracing_util::TestTracing;

/// Records which handler fired (and with which params) so tests can assert
/// on routing decisions end to end.
#[derive(Clone, Default)]
struct Trace {
    events: Arc<Mutex<Vec<String>>>,
}

impl Trace {
    fn handler(
        &self,
        label: &'static str,
        params: &'static [&'static str],
    ) -> impl Fn(&mut ChainContext<'_>) + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        move |ctx| {
            let mut event = label.to_string();
            for name in params {
                if let Some(value) = ctx.param(name) {
                    event.push_str(&format!(" {name}={value}"));
                }
            }
            events.lock().unwrap().push(event);
        }
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

fn assert_matched(router: &Router, method: &Method, path: &str) {
    match router.dispatch(method, path, None).unwrap() {
        RouteOutcome::Matched { .. } => {}
        other => panic!("{method} {path}: expected a match, got {other:?}"),
    }
}

#[test]
fn literal_routes_beat_parameters_regardless_of_order() {
    let _tracing = TestTracing::init();
    let trace = Trace::default();
    let mut router = Router::new();
    router
        .get("/user/:id", trace.handler("param", &["id"]))
        .unwrap();
    router.get("/user/name", trace.handler("literal", &[])).unwrap();

    assert_matched(&router, &Method::GET, "/user/name");
    assert_matched(&router, &Method::GET, "/user/42");
    assert_eq!(trace.take(), vec!["literal", "param id=42"]);
}

#[test]
fn static_beats_param_beats_wildcard() {
    let _tracing = TestTracing::init();
    let trace = Trace::default();
    let mut router = Router::new();
    router.get("/user/*", trace.handler("top", &["*"])).unwrap();
    router
        .get("/user/:name/*", trace.handler("nested", &["name", "*"]))
        .unwrap();
    router
        .get("/user/:name/id", trace.handler("literal", &["name"]))
        .unwrap();

    assert_matched(&router, &Method::GET, "/user/red");
    assert_matched(&router, &Method::GET, "/user/john/id");
    assert_matched(&router, &Method::GET, "/user/john/extra");
    assert_eq!(
        trace.take(),
        vec![
            "top *=red",
            "literal name=john",
            "nested name=john *=extra"
        ]
    );
}

#[test]
fn later_registration_wins_for_the_same_pattern() {
    let _tracing = TestTracing::init();
    let trace = Trace::default();
    let mut router = Router::new();
    router.get("/dup", trace.handler("first", &[])).unwrap();
    router.get("/dup", trace.handler("second", &[])).unwrap();

    assert_matched(&router, &Method::GET, "/dup");
    assert_eq!(trace.take(), vec!["second"]);
}

#[test]
fn multiple_params_extract_in_order() {
    let _tracing = TestTracing::init();
    let trace = Trace::default();
    let mut router = Router::new();
    router
        .get("/user/:id/:name", trace.handler("both", &["id", "name"]))
        .unwrap();

    match router.dispatch(&Method::GET, "/user/123/alice", None).unwrap() {
        RouteOutcome::Matched { params } => {
            let pairs: Vec<(String, String)> = params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            assert_eq!(
                pairs,
                vec![
                    ("id".to_string(), "123".to_string()),
                    ("name".to_string(), "alice".to_string())
                ]
            );
        }
        other => panic!("expected a match, got {other:?}"),
    }
    assert_eq!(trace.take(), vec!["both id=123 name=alice"]);
}

#[test]
fn trailing_slash_redirect_round_trips() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.get("/posts/", |_| {}).unwrap();

    let location = match router.dispatch(&Method::GET, "/posts", None).unwrap() {
        RouteOutcome::TrailingSlashRedirect { location, status } => {
            assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
            location
        }
        other => panic!("expected a redirect, got {other:?}"),
    };
    assert_eq!(location, "/posts/");
    assert_matched(&router, &Method::GET, &location);
}

#[test]
fn case_correction_round_trips() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.redirect_fixed_path = true;
    router.get("/userName", |_| {}).unwrap();

    let location = match router.dispatch(&Method::GET, "/username", None).unwrap() {
        RouteOutcome::CaseCorrectedRedirect { location, .. } => location,
        other => panic!("expected a case redirect, got {other:?}"),
    };
    assert_eq!(location, "/userName");
    assert_matched(&router, &Method::GET, &location);
}

#[test]
fn method_not_allowed_enumerates_registered_methods() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.get("/x", |_| {}).unwrap();
    router.put("/x", |_| {}).unwrap();
    router.delete("/x", |_| {}).unwrap();

    match router.dispatch(&Method::POST, "/x", None).unwrap() {
        RouteOutcome::MethodNotAllowed { allow } => assert_eq!(allow, "GET, PUT, DELETE"),
        other => panic!("expected method-not-allowed, got {other:?}"),
    }

    // a path registered nowhere stays a plain 404
    assert!(matches!(
        router.dispatch(&Method::POST, "/y", None).unwrap(),
        RouteOutcome::NotFound
    ));
}

#[test]
fn methods_route_to_their_own_trees() {
    let _tracing = TestTracing::init();
    let trace = Trace::default();
    let mut router = Router::new();
    router.get("/items", trace.handler("list", &[])).unwrap();
    router.post("/items", trace.handler("create", &[])).unwrap();

    assert_matched(&router, &Method::GET, "/items");
    assert_matched(&router, &Method::POST, "/items");
    assert_eq!(trace.take(), vec!["list", "create"]);
}

#[test]
fn groups_compose_prefixes_and_middleware() {
    let _tracing = TestTracing::init();
    let trace = Trace::default();
    let mut router = Router::new();

    let mut api = router.group("/api");
    let events = Arc::clone(&trace.events);
    api.use_middleware(move |ctx| {
        events.lock().unwrap().push("mw".to_string());
        ctx.advance();
    });
    let mut v1 = api.bind("/v1");
    v1.get("/posts/:id", trace.handler("post", &["id"])).unwrap();

    assert_matched(&router, &Method::GET, "/api/v1/posts/7");
    assert_eq!(trace.take(), vec!["mw", "post id=7"]);
}

#[test]
fn wildcard_captures_the_remainder_including_slashes() {
    let _tracing = TestTracing::init();
    let trace = Trace::default();
    let mut router = Router::new();
    router
        .get("/static/*", trace.handler("file", &["*"]))
        .unwrap();

    assert_matched(&router, &Method::GET, "/static/css/site/main.css");
    assert_eq!(trace.take(), vec!["file *=css/site/main.css"]);
}
