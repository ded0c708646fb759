//! Handler chains: the ordered middleware-plus-handler sequence bound to one
//! registered route.
//!
//! A chain is built once at registration time and shared read-only across
//! every request that matches its route. Execution uses explicit
//! continuation: each step receives the per-request [`ChainContext`] and
//! calls [`ChainContext::advance`] to run the next step, or simply returns
//! to short-circuit the rest of the chain.

use std::fmt;
use std::sync::Arc;

use tracing::error;

use crate::error::RouterError;
use crate::router::ParamVec;

/// One step of a handler chain: a middleware or the terminal handler.
pub type Step = Arc<dyn Fn(&mut ChainContext<'_>) + Send + Sync>;

/// Ordered steps for one route, shared across all requests matching it.
#[derive(Clone)]
pub struct HandlerChain {
    steps: Arc<[Step]>,
}

impl HandlerChain {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run the chain against the parameters bound by a route match.
    ///
    /// Returns `Err(RouterError::ChainExhausted)` if any step (or the
    /// initial kick-off on an empty chain) advanced past the final step.
    /// A step that declines to call `advance()` is a normal early exit,
    /// not an error.
    pub fn run(&self, params: &ParamVec) -> Result<(), RouterError> {
        let mut ctx = ChainContext {
            steps: &self.steps,
            params,
            next: 0,
            overrun: false,
        };
        ctx.advance();
        if ctx.overrun {
            error!(
                steps = self.steps.len(),
                "handler chain exhausted: advance() called past the final step"
            );
            return Err(RouterError::ChainExhausted {
                steps: self.steps.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// Per-request execution state of one handler chain.
///
/// Owned exclusively by the in-flight request; the chain itself is never
/// mutated.
pub struct ChainContext<'a> {
    steps: &'a [Step],
    params: &'a ParamVec,
    /// Index of the next step to run.
    next: usize,
    overrun: bool,
}

impl ChainContext<'_> {
    /// Invoke the next step of the chain, passing this context along so the
    /// step can continue the chain in turn. Advancing past the final step
    /// flags the chain as exhausted; the flag is surfaced by
    /// [`HandlerChain::run`].
    pub fn advance(&mut self) {
        if self.next >= self.steps.len() {
            self.overrun = true;
            return;
        }
        let step = Arc::clone(&self.steps[self.next]);
        self.next += 1;
        step(self);
    }

    /// Look up a path parameter bound by the route match.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}
