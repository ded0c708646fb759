//! Route groups: shared path prefixes and middleware for a family of routes.
//!
//! A group accumulates a base path and an ordered middleware list; nothing
//! is inserted into the tree until a handler is registered through it.
//! Groups are cheap copy-on-branch views over the router: [`RouteGroup::bind`]
//! produces a child group with a joined prefix and the parent's middleware
//! steps (shared by `Arc`), leaving the parent reusable afterwards.

use std::sync::Arc;

use http::Method;

use crate::chain::{ChainContext, HandlerChain, Step};
use crate::error::RouterError;
use crate::path::join_paths;
use crate::router::Router;

pub struct RouteGroup<'r> {
    router: &'r mut Router,
    base_path: String,
    middlewares: Vec<Step>,
}

impl<'r> RouteGroup<'r> {
    pub(crate) fn new(router: &'r mut Router, base_path: &str) -> Self {
        Self {
            router,
            base_path: join_paths("/", base_path),
            middlewares: Vec::new(),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Branch a child group at `base + suffix`.
    ///
    /// The child starts with this group's middleware steps; middleware
    /// added to either group afterwards does not affect the other.
    pub fn bind(&mut self, suffix: &str) -> RouteGroup<'_> {
        RouteGroup {
            base_path: join_paths(&self.base_path, suffix),
            middlewares: self.middlewares.clone(),
            router: &mut *self.router,
        }
    }

    /// Append a middleware step; it runs before the handler of every route
    /// registered through this group afterwards.
    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Register `handler` at the joined `base + path` under `method`,
    /// chained behind this group's middleware.
    pub fn register<F>(&mut self, method: Method, path: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        let combined = join_paths(&self.base_path, path);
        let mut steps = self.middlewares.clone();
        steps.push(Arc::new(handler));
        self.router
            .add_route(&method, &combined, HandlerChain::new(steps))
    }

    pub fn get<F>(&mut self, path: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.register(Method::GET, path, handler)
    }

    pub fn post<F>(&mut self, path: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.register(Method::POST, path, handler)
    }

    pub fn put<F>(&mut self, path: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.register(Method::PUT, path, handler)
    }

    pub fn patch<F>(&mut self, path: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.register(Method::PATCH, path, handler)
    }

    pub fn delete<F>(&mut self, path: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.register(Method::DELETE, path, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RouteOutcome;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn base_paths_join_and_branch() {
        let mut router = Router::new();
        let mut api = router.group("/api");
        assert_eq!(api.base_path(), "/api");

        let mut v1 = api.bind("v1/");
        assert_eq!(v1.base_path(), "/api/v1/");

        let users = v1.bind("/users");
        assert_eq!(users.base_path(), "/api/v1/users");
    }

    #[test]
    fn registered_routes_carry_the_joined_prefix() {
        let mut router = Router::new();
        let mut api = router.group("/api");
        api.get("/posts", |_| {}).unwrap();
        let mut admin = api.bind("/admin");
        admin.get("/stats", |_| {}).unwrap();

        assert!(router
            .route(&Method::GET, "/api/posts")
            .unwrap()
            .is_some());
        assert!(router
            .route(&Method::GET, "/api/admin/stats")
            .unwrap()
            .is_some());
        assert!(router.route(&Method::GET, "/posts").unwrap().is_none());
    }

    #[test]
    fn middleware_runs_before_the_handler() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (mw, handler) = (Arc::clone(&order), Arc::clone(&order));

        let mut router = Router::new();
        let mut api = router.group("/api");
        api.use_middleware(move |ctx| {
            mw.lock().unwrap().push("auth");
            ctx.advance();
        });
        api.get("/posts", move |_| {
            handler.lock().unwrap().push("handler");
        })
        .unwrap();

        match router.dispatch(&Method::GET, "/api/posts", None).unwrap() {
            RouteOutcome::Matched { .. } => {}
            other => panic!("expected a match, got {other:?}"),
        }
        assert_eq!(*order.lock().unwrap(), vec!["auth", "handler"]);
    }

    #[test]
    fn bound_groups_inherit_middleware_at_branch_time() {
        let parent_hits = Arc::new(AtomicUsize::new(0));
        let late_hits = Arc::new(AtomicUsize::new(0));

        let mut router = Router::new();
        let mut api = router.group("/api");
        let counter = Arc::clone(&parent_hits);
        api.use_middleware(move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.advance();
        });

        let mut child = api.bind("/child");
        child.get("/route", |_| {}).unwrap();

        // middleware added to the parent after branching stays out of the
        // child's already-registered chains
        let late = Arc::clone(&late_hits);
        api.use_middleware(move |ctx| {
            late.fetch_add(1, Ordering::SeqCst);
            ctx.advance();
        });
        api.get("/own", |_| {}).unwrap();

        router
            .dispatch(&Method::GET, "/api/child/route", None)
            .unwrap();
        assert_eq!(parent_hits.load(Ordering::SeqCst), 1);
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);

        router.dispatch(&Method::GET, "/api/own", None).unwrap();
        assert_eq!(parent_hits.load(Ordering::SeqCst), 2);
        assert_eq!(late_hits.load(Ordering::SeqCst), 1);
    }
}
