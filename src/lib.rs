//! # routrie
//!
//! A radix-tree URL path router. Given a request's method and path, it
//! selects the registered handler chain (with bound path parameters) in
//! time proportional to the path length, not the number of routes.
//!
//! ## Overview
//!
//! - **[`router`]** - one radix tree per HTTP method, plus the dispatch
//!   state machine (match, trailing-slash redirect, case-corrected
//!   redirect, method-not-allowed, not-found)
//! - **[`group`]** - route groups accumulating a path prefix and a
//!   middleware list
//! - **[`chain`]** - the per-route handler chain with explicit
//!   continuation (`advance()`)
//! - **[`shared`]** - lock-free publication of a rebuilt router via
//!   `ArcSwap`
//!
//! ## Pattern grammar
//!
//! Patterns are absolute paths built from literal bytes, `:name` parameter
//! segments (matching one `/`-free run and binding it to `name`) and a
//! single trailing `*` wildcard (capturing the whole remainder, slashes
//! included, under the name `*`). Literal segments always beat parameters,
//! which beat the wildcard, regardless of registration order.
//!
//! ## Quick start
//!
//! ```
//! use http::Method;
//! use routrie::{RouteOutcome, Router};
//!
//! # fn main() -> Result<(), routrie::RouterError> {
//! let mut router = Router::new();
//! router.get("/users/:id", |ctx| {
//!     let _id = ctx.param("id");
//!     // hand the request off, render a response, ...
//! })?;
//!
//! let mut api = router.group("/api");
//! api.use_middleware(|ctx| {
//!     // authenticate, then continue the chain
//!     ctx.advance();
//! });
//! api.get("/health", |_ctx| {})?;
//!
//! match router.dispatch(&Method::GET, "/users/42", None)? {
//!     RouteOutcome::Matched { params } => assert_eq!(params[0].1, "42"),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Lifecycle and concurrency
//!
//! Routes are registered through `&mut Router` and served through
//! `&Router`: build the full route table during startup, then dispatch
//! from any number of threads - matching never mutates a node. To change
//! routes after serving has started, rebuild a router and publish it with
//! [`SharedRouter`]; in-place mutation of a live tree is deliberately not
//! supported.
//!
//! The dispatcher recognizes four independently togglable policy flags:
//! `redirect_trailing_slash`, `redirect_fixed_path` (case-insensitive
//! correction), `remove_extra_slash` and `handle_method_not_allowed`.

pub mod chain;
pub mod error;
pub mod group;
mod path;
pub mod router;
pub mod shared;

pub use chain::{ChainContext, HandlerChain, Step};
pub use error::RouterError;
pub use group::RouteGroup;
pub use router::{ParamVec, RouteMatch, RouteOutcome, Router, MAX_INLINE_PARAMS};
pub use shared::SharedRouter;
