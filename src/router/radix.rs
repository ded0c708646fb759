//! Radix tree for URL path matching.
//!
//! One tree exists per HTTP method. Each node consumes a variable-length
//! byte string of the path, so lookup cost is bounded by path length rather
//! than route count: shared prefixes (e.g. `/api/v1/`) are stored once and
//! inserting unrelated patterns splits nodes at the diverging byte.
//!
//! Three kinds of children hang off a node, tried in a fixed priority order
//! during matching:
//!
//! - static children, indexed by the first byte of their segment; exact
//!   literals always win;
//! - at most one parameter child (segment `:`), matching one `/`-free run
//!   of bytes and binding it to a name;
//! - at most one wildcard child (segment `*`), always a leaf, capturing the
//!   whole remaining path under the name `*`.
//!
//! A match that would succeed with exactly one trailing `/` added or
//! removed is reported with the `tsr` flag set instead of failing, so the
//! dispatcher can decide whether to redirect.

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::chain::HandlerChain;
use crate::error::RouterError;

use super::core::{ParamVec, RouteMatch, MAX_INLINE_PARAMS};

/// Captured parameter values, borrowing the request path during traversal.
type ValueVec<'p> = SmallVec<[&'p str; MAX_INLINE_PARAMS]>;

/// Node in one method's radix tree.
///
/// A node with a handler chain is a registration endpoint ("leaf" in the
/// matching sense, though it may still have children); a node without one
/// is a pure path-prefix junction.
pub(crate) struct PathNode {
    /// Path fragment consumed by this node, relative to its parent. Always
    /// non-empty; the tree root holds `"/"`.
    segment: String,
    /// Static children, keyed by the first byte of the child's segment.
    children: HashMap<u8, PathNode>,
    /// Parameter child (`:name` segments), at most one per node.
    param_child: Option<Box<PathNode>>,
    /// Wildcard child (trailing `*`), at most one per node, always a leaf.
    wild_child: Option<Box<PathNode>>,
    /// Present only on registration endpoints.
    chain: Option<HandlerChain>,
    /// Parameter names collected from the root down to this endpoint.
    param_names: Vec<Arc<str>>,
}

impl PathNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            children: HashMap::new(),
            param_child: None,
            wild_child: None,
            chain: None,
            param_names: Vec::new(),
        }
    }

    pub(crate) fn root() -> Self {
        Self::new("/")
    }

    fn is_leaf(&self) -> bool {
        self.chain.is_some()
    }

    /// Register `chain` as the endpoint for `pattern` under this subtree.
    ///
    /// The pattern is validated in full before the tree is mutated, so a
    /// malformed pattern leaves the tree untouched. Registering the same
    /// pattern twice replaces the earlier endpoint.
    pub(crate) fn insert(
        &mut self,
        pattern: &str,
        chain: HandlerChain,
    ) -> Result<(), RouterError> {
        validate_pattern(pattern)?;
        self.insert_at(pattern, chain, Vec::new());
        Ok(())
    }

    fn insert_at(&mut self, mut path: &str, chain: HandlerChain, mut names: Vec<Arc<str>>) {
        let l = longest_common_prefix(&self.segment, path);

        // The pattern diverges inside this node's segment: split off the
        // suffix into a child and turn this node into a junction.
        if l < self.segment.len() {
            self.split(l);
        }

        if path.as_bytes()[0] == b':' {
            let end = path.find('/').unwrap_or(path.len());
            names.push(Arc::from(&path[1..end]));
            path = &path[end..];
        } else {
            path = &path[l..];
        }

        if path.is_empty() {
            // Endpoint reached; a later registration for the same pattern
            // replaces the earlier one.
            self.chain = Some(chain);
            self.param_names = names;
            return;
        }

        let first = path.as_bytes()[0];
        if let Some(child) = self.children.get_mut(&first) {
            child.insert_at(path, chain, names);
            return;
        }
        if first == b':' {
            if let Some(param) = self.param_child.as_deref_mut() {
                param.insert_at(path, chain, names);
                return;
            }
        }
        if first == b'*' {
            if let Some(wild) = self.wild_child.as_deref_mut() {
                wild.chain = Some(chain);
                wild.param_names = names;
                return;
            }
        }

        self.insert_child(path, chain, names);
    }

    /// Split this node at byte offset `at`: the suffix keeps the node's
    /// endpoint and children, the prefix becomes a pure junction.
    fn split(&mut self, at: usize) {
        let suffix = PathNode {
            segment: self.segment.split_off(at),
            children: std::mem::take(&mut self.children),
            param_child: self.param_child.take(),
            wild_child: self.wild_child.take(),
            chain: self.chain.take(),
            param_names: std::mem::take(&mut self.param_names),
        };
        self.children.insert(suffix.segment.as_bytes()[0], suffix);
    }

    /// Insert a fresh subtree for `path`, which shares no prefix with any
    /// existing child: literal runs become their own nodes and each `:` or
    /// `*` token becomes a dedicated single-byte node.
    fn insert_child(&mut self, path: &str, chain: HandlerChain, mut names: Vec<Arc<str>>) {
        let Some((start, end)) = first_param_token(path) else {
            let mut leaf = PathNode::new(path);
            leaf.chain = Some(chain);
            leaf.param_names = names;
            self.add_child(leaf);
            return;
        };

        if path.as_bytes()[start] == b':' {
            names.push(Arc::from(&path[start + 1..end]));
        }

        let mut dynam = PathNode::new(&path[start..=start]);
        if end == path.len() {
            dynam.chain = Some(chain);
            dynam.param_names = names;
        } else {
            dynam.insert_child(&path[end..], chain, names);
        }

        if start > 0 {
            let mut prior = PathNode::new(&path[..start]);
            prior.add_child(dynam);
            self.add_child(prior);
        } else {
            self.add_child(dynam);
        }
    }

    fn add_child(&mut self, child: PathNode) {
        match child.segment.as_str() {
            ":" => self.param_child = Some(Box::new(child)),
            "*" => self.wild_child = Some(Box::new(child)),
            _ => {
                self.children.insert(child.segment.as_bytes()[0], child);
            }
        }
    }

    /// Match `path` against this subtree with a single read-only traversal.
    ///
    /// `Ok(None)` is the routine not-found outcome. `Err` is reserved for
    /// the internal name/value count invariant.
    pub(crate) fn at(&self, path: &str) -> Result<Option<RouteMatch>, RouterError> {
        let mut values = ValueVec::new();
        let Some((node, tsr)) = self.match_route(path, &mut values) else {
            return Ok(None);
        };
        let Some(chain) = node.chain.clone() else {
            return Ok(None);
        };

        let is_wild = node.segment == "*";
        let expected = node.param_names.len() + usize::from(is_wild);
        if values.len() != expected {
            return Err(RouterError::ParamCountMismatch {
                expected,
                found: values.len(),
            });
        }

        let mut params = ParamVec::new();
        for (name, value) in node.param_names.iter().zip(values.iter()) {
            params.push((Arc::clone(name), (*value).to_string()));
        }
        if is_wild {
            if let Some(rest) = values.last() {
                params.push((Arc::from("*"), (*rest).to_string()));
            }
        }

        Ok(Some(RouteMatch { chain, params, tsr }))
    }

    fn match_route<'n, 'p>(
        &'n self,
        mut path: &'p str,
        values: &mut ValueVec<'p>,
    ) -> Option<(&'n PathNode, bool)> {
        if self.segment == ":" {
            // Consume one /-free run as this parameter's value.
            let end = path.find('/').unwrap_or(path.len());
            values.push(&path[..end]);
            path = &path[end..];
        } else if path.len() >= self.segment.len()
            && path.as_bytes()[..self.segment.len()] == *self.segment.as_bytes()
        {
            path = &path[self.segment.len()..];
        } else {
            // Registered segment is the remaining path plus a trailing '/':
            // report the near-miss so the caller can redirect.
            let (l, k) = (self.segment.len(), path.len());
            if l == k + 1
                && self.segment.as_bytes()[k] == b'/'
                && self.segment.as_bytes()[..k] == *path.as_bytes()
                && self.is_leaf()
            {
                return Some((self, true));
            }
            return None;
        }

        if path.is_empty() {
            // A junction with no chain is not a match.
            return self.is_leaf().then_some((self, false));
        }

        let first = path.as_bytes()[0];
        if let Some(child) = self.children.get(&first) {
            let mark = values.len();
            if let Some(hit) = child.match_route(path, values) {
                return Some(hit);
            }
            values.truncate(mark);
        }
        if let Some(param) = self.param_child.as_deref() {
            let mark = values.len();
            if let Some(hit) = param.match_route(path, values) {
                return Some(hit);
            }
            values.truncate(mark);
        }
        if let Some(wild) = self.wild_child.as_deref() {
            if wild.is_leaf() {
                values.push(path);
                return Some((wild, false));
            }
        }

        // Nothing below matched; a lone '/' remainder at an endpoint is a
        // trailing-slash mismatch rather than a failure.
        if path == "/" && self.is_leaf() {
            return Some((self, true));
        }
        None
    }

    /// Test hook: append a parameter name with no matching capture to every
    /// endpoint in this subtree, simulating a tree-construction bug.
    #[cfg(test)]
    pub(crate) fn skew_param_names(&mut self) {
        if self.chain.is_some() {
            self.param_names.push(Arc::from("phantom"));
        }
        for child in self.children.values_mut() {
            child.skew_param_names();
        }
        if let Some(param) = self.param_child.as_deref_mut() {
            param.skew_param_names();
        }
        if let Some(wild) = self.wild_child.as_deref_mut() {
            wild.skew_param_names();
        }
    }

    /// Recover the registered casing of `path`, comparing literal segments
    /// case-insensitively. Mirrors the exact traversal's priority order;
    /// parameter values and wildcard fragments are echoed verbatim since
    /// they are not validated against any registered literal. When
    /// `fix_trailing_slash` is set, a trailing-slash mismatch is folded
    /// into the corrected path.
    pub(crate) fn find_case_insensitive(
        &self,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        let mut fixed = String::with_capacity(path.len() + 1);
        self.case_fold_into(path, &mut fixed, fix_trailing_slash)
            .then_some(fixed)
    }

    fn case_fold_into(&self, mut path: &str, out: &mut String, fix_ts: bool) -> bool {
        if self.segment == ":" {
            let end = path.find('/').unwrap_or(path.len());
            out.push_str(&path[..end]);
            path = &path[end..];
        } else if path.len() >= self.segment.len()
            && path.as_bytes()[..self.segment.len()].eq_ignore_ascii_case(self.segment.as_bytes())
        {
            // Accumulate the registered spelling, not the requested one.
            out.push_str(&self.segment);
            path = &path[self.segment.len()..];
        } else {
            let (l, k) = (self.segment.len(), path.len());
            if fix_ts
                && l == k + 1
                && self.segment.as_bytes()[k] == b'/'
                && self.segment.as_bytes()[..k].eq_ignore_ascii_case(path.as_bytes())
                && self.is_leaf()
            {
                out.push_str(&self.segment);
                return true;
            }
            return false;
        }

        if path.is_empty() {
            return self.is_leaf();
        }

        let first = path.as_bytes()[0];
        let mark = out.len();
        let lower = first.to_ascii_lowercase();
        if let Some(child) = self.children.get(&lower) {
            if child.case_fold_into(path, out, fix_ts) {
                return true;
            }
            out.truncate(mark);
        }
        let upper = first.to_ascii_uppercase();
        if upper != lower {
            if let Some(child) = self.children.get(&upper) {
                if child.case_fold_into(path, out, fix_ts) {
                    return true;
                }
                out.truncate(mark);
            }
        }
        if let Some(param) = self.param_child.as_deref() {
            if param.case_fold_into(path, out, fix_ts) {
                return true;
            }
            out.truncate(mark);
        }
        if let Some(wild) = self.wild_child.as_deref() {
            if wild.is_leaf() {
                out.push_str(path);
                return true;
            }
        }
        if fix_ts && path == "/" && self.is_leaf() {
            return true;
        }
        false
    }
}

/// Length of the longest common prefix of `a` and `b`, in bytes.
fn longest_common_prefix(a: &str, b: &str) -> usize {
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Locate the first `:` or `*` token in `path`, returning its start and its
/// end (the next `/` or the end of the string). Assumes `path` already
/// passed [`validate_pattern`].
fn first_param_token(path: &str) -> Option<(usize, usize)> {
    let bytes = path.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b':' || b == b'*' {
            let mut end = i;
            while end < bytes.len() && bytes[end] != b'/' {
                end += 1;
            }
            return Some((i, end));
        }
    }
    None
}

/// Reject malformed patterns before any tree mutation.
fn validate_pattern(pattern: &str) -> Result<(), RouterError> {
    if !pattern.starts_with('/') {
        return Err(RouterError::PatternMustStartWithSlash {
            pattern: pattern.to_string(),
        });
    }

    let bytes = pattern.as_bytes();
    let mut seen: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b':' => {
                let mut end = i + 1;
                while end < bytes.len() && bytes[end] != b'/' {
                    end += 1;
                }
                if end == i + 1 {
                    return Err(RouterError::MissingParamName {
                        pattern: pattern.to_string(),
                    });
                }
                let name = &pattern[i + 1..end];
                if seen.contains(&name) {
                    return Err(RouterError::DuplicateParamName {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
                seen.push(name);
                i = end;
            }
            b'*' => {
                if i + 1 != bytes.len() {
                    return Err(RouterError::WildcardNotAtEnd {
                        pattern: pattern.to_string(),
                    });
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    Ok(())
}
