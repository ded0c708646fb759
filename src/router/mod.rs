//! # Router Module
//!
//! Path matching and request dispatch. The router keeps one radix tree per
//! HTTP method; matching a request is a single traversal of the method's
//! tree, so lookup cost is bounded by path length rather than by the number
//! of registered routes.
//!
//! Dispatch is a small state machine on top of the tree: an exact match
//! runs the route's handler chain, a trailing-slash or wrong-case near-miss
//! becomes a redirect (when the corresponding flag is enabled), and a full
//! miss becomes method-not-allowed or not-found.

mod core;
mod radix;

pub use core::{ParamVec, RouteMatch, RouteOutcome, Router, MAX_INLINE_PARAMS};
