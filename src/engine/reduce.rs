use crate::arena::{Graph, NodeId};
use crate::engine::types::{EvalContext, NockError, NockResult};
use crate::engine::unparse::debug_unparse;
use crate::trace::RuleId;

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};
use tracing::trace;

// Remaining stack below which a nested evaluation moves to a fresh segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// `*[subject formula]`.
///
/// Tail positions (2, 6, 7, 8, 9, 11) rebind `subject`/`formula` and loop;
/// everything else recurses, bounded by `ctx.depth_limit`. The native stack
/// grows on demand, so the depth limit is the only bound on nesting.
pub fn nock(g: &mut Graph, subject: NodeId, formula: NodeId, ctx: &mut EvalContext) -> NockResult {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || nock_nested(g, subject, formula, ctx))
}

fn nock_nested(g: &mut Graph, subject: NodeId, formula: NodeId, ctx: &mut EvalContext) -> NockResult {
    ctx.depth += 1;
    if ctx.depth > ctx.max_depth {
        ctx.max_depth = ctx.depth;
    }
    let out = if ctx.depth > ctx.depth_limit {
        Err(NockError::DepthLimit(ctx.depth_limit))
    } else {
        nock_loop(g, subject, formula, ctx)
    };
    ctx.depth -= 1;
    if ctx.depth == 0 {
        if let (Ok(product), Some(trace)) = (&out, &mut ctx.exec_trace) {
            trace.set_result(*product);
        }
    }
    out
}

fn nock_loop(g: &mut Graph, mut subject: NodeId, mut formula: NodeId, ctx: &mut EvalContext) -> NockResult {
    loop {
        if ctx.steps >= ctx.step_limit {
            return Err(NockError::StepLimit(ctx.step_limit));
        }
        ctx.steps += 1;

        let (op, args) = g.as_cell(formula).ok_or(NockError::AtomFormula)?;

        if g.is_cell(op) {
            record(ctx, RuleId::Autocons, subject, formula);
            let head = nock(g, subject, op, ctx)?;
            let tail = nock(g, subject, args, ctx)?;
            return Ok(g.cell(head, tail));
        }

        let code = g.as_u64(op).ok_or(NockError::BadOpcode(u64::MAX))?;
        let rule = RuleId::from_opcode(code).ok_or(NockError::BadOpcode(code))?;
        record(ctx, rule, subject, formula);
        if tracing::enabled!(tracing::Level::TRACE) {
            trace!(step = ctx.steps, depth = ctx.depth, op = code, formula = %debug_unparse(g, formula), "nock");
        }

        match code {
            0 => {
                let axis = g.as_atom(args).ok_or(NockError::BadArgs { op: code })?.clone();
                return g
                    .at_big(subject, &axis)
                    .ok_or_else(|| NockError::missing_axis(&axis));
            }
            1 => return Ok(args),
            2 => {
                let (b, c) = pair(g, args, code)?;
                let new_subject = nock(g, subject, b, ctx)?;
                let new_formula = nock(g, subject, c, ctx)?;
                subject = new_subject;
                formula = new_formula;
            }
            3 => {
                let product = nock(g, subject, args, ctx)?;
                let loob = if g.is_cell(product) { 0 } else { 1 };
                return Ok(g.atom(loob));
            }
            4 => {
                let product = nock(g, subject, args, ctx)?;
                let n = g.as_atom(product).ok_or(NockError::NotAnAtom)?;
                let next = n + BigUint::one();
                return Ok(g.atom_big(next));
            }
            5 => {
                let (b, c) = pair(g, args, code)?;
                let left = nock(g, subject, b, ctx)?;
                let right = nock(g, subject, c, ctx)?;
                // hash-consed: same id iff same noun
                let loob = if left == right { 0 } else { 1 };
                return Ok(g.atom(loob));
            }
            6 => {
                let (b, cd) = pair(g, args, code)?;
                let (c, d) = pair(g, cd, code)?;
                let test = nock(g, subject, b, ctx)?;
                formula = match g.as_u64(test) {
                    Some(0) => c,
                    Some(1) => d,
                    _ => return Err(NockError::NotLoobean),
                };
            }
            7 => {
                let (b, c) = pair(g, args, code)?;
                subject = nock(g, subject, b, ctx)?;
                formula = c;
            }
            8 => {
                let (b, c) = pair(g, args, code)?;
                let pushed = nock(g, subject, b, ctx)?;
                subject = g.cell(pushed, subject);
                formula = c;
            }
            9 => {
                let (b, c) = pair(g, args, code)?;
                let axis = g.as_atom(b).ok_or(NockError::BadArgs { op: code })?.clone();
                let core = nock(g, subject, c, ctx)?;
                let arm = g
                    .at_big(core, &axis)
                    .ok_or_else(|| NockError::missing_axis(&axis))?;
                subject = core;
                formula = arm;
            }
            10 => {
                let (bc, d) = pair(g, args, code)?;
                let (b, c) = pair(g, bc, code)?;
                let axis = g.as_atom(b).ok_or(NockError::BadArgs { op: code })?.clone();
                let value = nock(g, subject, c, ctx)?;
                let target = nock(g, subject, d, ctx)?;
                return g
                    .edit_big(target, &axis, value)
                    .ok_or_else(|| NockError::missing_axis(&axis));
            }
            11 => {
                let (hint, body) = pair(g, args, code)?;
                if let Some((_, clue)) = g.as_cell(hint) {
                    // dynamic hint: computed for effect, product discarded
                    nock(g, subject, clue, ctx)?;
                }
                formula = body;
            }
            _ => return Err(NockError::BadOpcode(code)),
        }
    }
}

fn pair(g: &Graph, id: NodeId, op: u64) -> Result<(NodeId, NodeId), NockError> {
    g.as_cell(id).ok_or(NockError::BadArgs { op })
}

fn record(ctx: &mut EvalContext, rule: RuleId, subject: NodeId, formula: NodeId) {
    if let Some(trace) = &mut ctx.exec_trace {
        trace.record(rule, subject, formula);
    }
}

/// Loobean product as a Rust bool: 0 is yes, 1 is no.
pub fn loobean(g: &Graph, id: NodeId) -> Option<bool> {
    match g.as_atom(id).and_then(|n| n.to_u8()) {
        Some(0) => Some(true),
        Some(1) => Some(false),
        _ => None,
    }
}
