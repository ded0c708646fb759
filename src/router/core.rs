//! Router core - per-request dispatch over the per-method radix trees.

use std::sync::Arc;

use http::{Method, StatusCode};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::chain::{ChainContext, HandlerChain, Step};
use crate::error::RouterError;
use crate::group::RouteGroup;
use crate::path::clean;

use super::radix::PathNode;

/// Maximum number of path parameters before heap allocation.
/// Most routes bind no more than a handful; the inline capacity keeps the
/// dispatch hot path allocation-free for them.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Names are `Arc<str>` because they come from the route tree built at
/// startup; cloning one is an atomic increment, not a string copy. Values
/// are per-request data extracted from the URL and stay `String`.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of matching a request path against one method's tree.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The handler chain registered at the matched endpoint.
    pub chain: HandlerChain,
    /// Parameters extracted from the path, in pattern order.
    pub params: ParamVec,
    /// Set when the match succeeded only modulo one trailing slash.
    pub tsr: bool,
}

impl RouteMatch {
    /// Get an extracted path parameter by name.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Terminal outcome of dispatching one request.
#[derive(Debug)]
pub enum RouteOutcome {
    /// A route matched exactly and its handler chain ran.
    Matched {
        /// Parameters bound by the match, for the transport's accessor.
        params: ParamVec,
    },
    /// The path matches modulo one trailing slash; redirect to `location`.
    TrailingSlashRedirect {
        location: String,
        status: StatusCode,
    },
    /// The path matches a registered route under a different casing;
    /// redirect to the registered spelling.
    CaseCorrectedRedirect {
        location: String,
        status: StatusCode,
    },
    /// No route under this method, but other methods match the same path.
    MethodNotAllowed {
        /// Matching methods, comma-joined in registry order.
        allow: String,
    },
    /// No route matched at all.
    NotFound,
}

/// Mapping from HTTP method to its radix tree root.
///
/// The method set is fixed at construction; entries are only ever mutated
/// by inserting into their tree. Iteration order is construction order,
/// which is also the order method-not-allowed enumeration reports.
pub(crate) struct MethodRoutes {
    entries: Vec<(Method, PathNode)>,
}

impl MethodRoutes {
    fn new<I>(methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        let mut entries: Vec<(Method, PathNode)> = Vec::new();
        for method in methods {
            if entries.iter().any(|(m, _)| *m == method) {
                continue;
            }
            entries.push((method, PathNode::root()));
        }
        Self { entries }
    }

    fn root(&self, method: &Method) -> Option<&PathNode> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, node)| node)
    }

    fn root_mut(&mut self, method: &Method) -> Option<&mut PathNode> {
        self.entries
            .iter_mut()
            .find(|(m, _)| m == method)
            .map(|(_, node)| node)
    }

    fn iter(&self) -> impl Iterator<Item = (&Method, &PathNode)> {
        self.entries.iter().map(|(m, node)| (m, node))
    }
}

/// URL-path router: one radix tree per HTTP method plus the dispatch
/// policy flags.
///
/// The intended lifecycle is build-then-serve: register every route on one
/// thread (`&mut self`), then dispatch read-only traffic (`&self`) from as
/// many threads as desired. The borrow rules enforce exactly that split;
/// for post-startup route changes, rebuild a router and publish it through
/// [`crate::SharedRouter`].
pub struct Router {
    methods: MethodRoutes,
    /// Redirect `/path/` to `/path` (and vice versa) when only the
    /// trailing slash differs.
    pub redirect_trailing_slash: bool,
    /// Fall back to case-insensitive matching and redirect to the
    /// registered casing.
    pub redirect_fixed_path: bool,
    /// Normalize the request path (collapse duplicate slashes, resolve
    /// dot segments) before matching.
    pub remove_extra_slash: bool,
    /// Probe other methods' trees on a miss and report 405 with an Allow
    /// list instead of 404.
    pub handle_method_not_allowed: bool,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Router over the default method set: GET, POST, PUT, PATCH, DELETE.
    #[must_use]
    pub fn new() -> Self {
        Self::with_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
    }

    /// Router over a caller-chosen method set. Duplicates are ignored;
    /// the surviving order is the method-not-allowed enumeration order.
    pub fn with_methods<I>(methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        Self {
            methods: MethodRoutes::new(methods),
            redirect_trailing_slash: true,
            redirect_fixed_path: false,
            remove_extra_slash: false,
            handle_method_not_allowed: true,
        }
    }

    /// Start a route group at `base_path` with no middleware.
    pub fn group(&mut self, base_path: &str) -> RouteGroup<'_> {
        RouteGroup::new(self, base_path)
    }

    /// Register `handler` for `pattern` under `method`, with no middleware.
    pub fn register<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        let step: Step = Arc::new(handler);
        self.add_route(&method, pattern, HandlerChain::new(vec![step]))
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.register(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.register(Method::POST, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.register(Method::PUT, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.register(Method::PATCH, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&mut ChainContext<'_>) + Send + Sync + 'static,
    {
        self.register(Method::DELETE, pattern, handler)
    }

    /// Insert a prebuilt chain; used by [`RouteGroup`] after path joining.
    pub(crate) fn add_route(
        &mut self,
        method: &Method,
        pattern: &str,
        chain: HandlerChain,
    ) -> Result<(), RouterError> {
        let Some(root) = self.methods.root_mut(method) else {
            return Err(RouterError::UnregisteredMethod {
                method: method.clone(),
            });
        };
        root.insert(pattern, chain)?;
        debug!(method = %method, pattern = %pattern, "route registered");
        Ok(())
    }

    /// Pure lookup: match `path` against `method`'s tree without running
    /// the handler chain. Transports that drive chains themselves use this
    /// instead of [`Router::dispatch`].
    pub fn route(&self, method: &Method, path: &str) -> Result<Option<RouteMatch>, RouterError> {
        match self.methods.root(method) {
            Some(root) => root.at(path),
            None => Ok(None),
        }
    }

    /// Dispatch one request: resolve `path` under `method`, run the
    /// matched handler chain, or report the redirect / 405 / 404 outcome.
    ///
    /// `forwarded_prefix` is the inbound `X-Forwarded-Prefix` header value
    /// (if the transport saw one); it is re-prepended to trailing-slash
    /// redirect locations so redirects issued behind a stripping proxy
    /// point at the externally visible path.
    pub fn dispatch(
        &self,
        method: &Method,
        path: &str,
        forwarded_prefix: Option<&str>,
    ) -> Result<RouteOutcome, RouterError> {
        let cleaned;
        let mut path = path;
        if self.remove_extra_slash {
            cleaned = clean(path);
            path = &cleaned;
        }

        debug!(method = %method, path = %path, "route match attempt");

        let Some(root) = self.methods.root(method) else {
            return self.unmatched(method, path);
        };

        match root.at(path)? {
            Some(found) if !found.tsr => {
                found.chain.run(&found.params)?;
                debug!(method = %method, path = %path, params = ?found.params, "route matched");
                Ok(RouteOutcome::Matched {
                    params: found.params,
                })
            }
            Some(_) => {
                if self.redirect_trailing_slash {
                    let location =
                        prepend_prefix(toggle_trailing_slash(path), forwarded_prefix);
                    Ok(RouteOutcome::TrailingSlashRedirect {
                        location,
                        status: redirect_status(method),
                    })
                } else {
                    warn!(method = %method, path = %path, "trailing slash mismatch, redirect disabled");
                    Ok(RouteOutcome::NotFound)
                }
            }
            None => {
                if self.redirect_fixed_path {
                    if let Some(location) =
                        root.find_case_insensitive(path, self.redirect_trailing_slash)
                    {
                        return Ok(RouteOutcome::CaseCorrectedRedirect {
                            location,
                            status: redirect_status(method),
                        });
                    }
                }
                self.unmatched(method, path)
            }
        }
    }

    fn unmatched(&self, method: &Method, path: &str) -> Result<RouteOutcome, RouterError> {
        if self.handle_method_not_allowed {
            let mut allowed: Vec<&str> = Vec::new();
            for (m, root) in self.methods.iter() {
                if m == method {
                    continue;
                }
                if root.at(path)?.is_some() {
                    allowed.push(m.as_str());
                }
            }
            if !allowed.is_empty() {
                return Ok(RouteOutcome::MethodNotAllowed {
                    allow: allowed.join(", "),
                });
            }
        }
        warn!(method = %method, path = %path, "no route matched");
        Ok(RouteOutcome::NotFound)
    }
}

/// 301 keeps retrieval semantics for GET/HEAD; 308 preserves the method
/// and body on replay for everything else.
fn redirect_status(method: &Method) -> StatusCode {
    if method == Method::GET || method == Method::HEAD {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::PERMANENT_REDIRECT
    }
}

fn toggle_trailing_slash(path: &str) -> String {
    match path.strip_suffix('/') {
        Some("") => "/".to_string(),
        Some(stripped) => stripped.to_string(),
        None => format!("{path}/"),
    }
}

fn prepend_prefix(path: String, forwarded_prefix: Option<&str>) -> String {
    match forwarded_prefix {
        Some(raw) if !raw.is_empty() => {
            let prefix = clean(raw);
            if prefix == "/" {
                path
            } else {
                format!("{prefix}{path}")
            }
        }
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_not_allowed_scan_surfaces_sibling_tree_corruption() {
        let mut router = Router::new();
        router.get("/x", |_| {}).unwrap();
        // simulate a construction bug in the GET tree's endpoint bookkeeping
        if let Some(root) = router.methods.root_mut(&Method::GET) {
            root.skew_param_names();
        }

        let err = router.dispatch(&Method::POST, "/x", None).unwrap_err();
        assert_eq!(
            err,
            RouterError::ParamCountMismatch {
                expected: 1,
                found: 0
            }
        );
    }
}
