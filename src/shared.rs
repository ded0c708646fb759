//! Lock-free publication of a rebuilt router.
//!
//! The router itself supports no concurrent mutation: routes are registered
//! through `&mut Router`, traffic is served through `&Router`. When routes
//! must change after serving has started, the supported pattern is
//! build-then-publish: construct a fresh [`Router`], then swap it into a
//! [`SharedRouter`]. Readers load the current router without locking;
//! requests already in flight keep the router they loaded.

use std::sync::Arc;

use arc_swap::ArcSwap;
use http::Method;

use crate::error::RouterError;
use crate::router::{RouteOutcome, Router};

pub struct SharedRouter {
    current: ArcSwap<Router>,
}

impl SharedRouter {
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Snapshot the current router. The snapshot stays valid across any
    /// number of subsequent [`SharedRouter::store`] calls.
    #[must_use]
    pub fn load(&self) -> Arc<Router> {
        self.current.load_full()
    }

    /// Atomically publish a rebuilt router.
    pub fn store(&self, router: Router) {
        self.current.store(Arc::new(router));
    }

    /// Dispatch against the currently published router.
    pub fn dispatch(
        &self,
        method: &Method,
        path: &str,
        forwarded_prefix: Option<&str>,
    ) -> Result<RouteOutcome, RouterError> {
        self.current.load().dispatch(method, path, forwarded_prefix)
    }
}
