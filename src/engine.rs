//! Engine - Nock evaluation
//!
//! The reference evaluator for the combinator model, plus the [`Interpreter`]
//! seam the nest layer dispatches through.

mod reduce;
mod types;
mod unparse;


pub use reduce::{loobean, nock};
pub use types::{EvalContext, NockError, NockResult, DEFAULT_DEPTH_LIMIT, DEFAULT_STEP_LIMIT};
pub use unparse::{debug_unparse, node_kind, unparse};

use crate::arena::{Graph, NodeId};
use crate::config::NestConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Evaluates a term-encoded program against a term-encoded environment.
///
/// Implementations must be pure: the same `(subject, formula)` always yields
/// the same product.
pub trait Interpreter {
    fn nock_on(&self, g: &mut Graph, subject: NodeId, formula: NodeId) -> NockResult;
}

impl<I: Interpreter + ?Sized> Interpreter for &I {
    fn nock_on(&self, g: &mut Graph, subject: NodeId, formula: NodeId) -> NockResult {
        (**self).nock_on(g, subject, formula)
    }
}

/// The reference Nock 4K evaluator.
#[derive(Clone, Copy, Debug)]
pub struct Nock {
    pub step_limit: usize,
    pub depth_limit: usize,
}

impl Default for Nock {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

impl Nock {
    pub fn new(step_limit: usize, depth_limit: usize) -> Self {
        Self {
            step_limit,
            depth_limit,
        }
    }

    pub fn from_config(config: &NestConfig) -> Self {
        Self::new(config.step_limit, config.depth_limit)
    }
}

impl Interpreter for Nock {
    fn nock_on(&self, g: &mut Graph, subject: NodeId, formula: NodeId) -> NockResult {
        let mut ctx = EvalContext::with_limits(self.step_limit, self.depth_limit);
        let out = nock(g, subject, formula, &mut ctx);
        match &out {
            Ok(product) => debug!(
                steps = ctx.steps,
                max_depth = ctx.max_depth,
                product = %debug_unparse(g, *product),
                "nock_on done"
            ),
            Err(err) => debug!(steps = ctx.steps, error = %err, "nock_on failed"),
        }
        out
    }
}

/// Wraps an interpreter and counts how often it is entered.
#[derive(Debug, Default)]
pub struct Counting<I> {
    inner: I,
    calls: AtomicUsize,
}

impl<I> Counting<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl<I: Interpreter> Interpreter for Counting<I> {
    fn nock_on(&self, g: &mut Graph, subject: NodeId, formula: NodeId) -> NockResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.nock_on(g, subject, formula)
    }
}
