//! # Trace - Execution Path Recording
//!
//! Records which Nock rules fired while a formula was evaluated. Traces are
//! optional and cost nothing when the `EvalContext` carries none.

use crate::arena::NodeId;
use std::collections::HashMap;

/// Identifies which reduction rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    /// [[b c] d]: cons the results of two formulas
    Autocons,
    /// 0: slot lookup
    Slot,
    /// 1: constant
    Quote,
    /// 2: evaluate a computed formula against a computed subject
    Eval,
    /// 3: cell test
    IsCell,
    /// 4: increment
    Inc,
    /// 5: structural equality
    Same,
    /// 6: if-then-else on a loobean
    If,
    /// 7: composition
    Compose,
    /// 8: push onto the subject
    Push,
    /// 9: pull an arm out of a core
    Pull,
    /// 10: edit a slot
    Edit,
    /// 11: hint
    Hint,
}

impl RuleId {
    pub fn from_opcode(op: u64) -> Option<Self> {
        Some(match op {
            0 => RuleId::Slot,
            1 => RuleId::Quote,
            2 => RuleId::Eval,
            3 => RuleId::IsCell,
            4 => RuleId::Inc,
            5 => RuleId::Same,
            6 => RuleId::If,
            7 => RuleId::Compose,
            8 => RuleId::Push,
            9 => RuleId::Pull,
            10 => RuleId::Edit,
            11 => RuleId::Hint,
            _ => return None,
        })
    }
}

/// A single event in the execution trace
#[derive(Debug, Clone)]
pub struct TraceEvent {
    /// Which rule fired
    pub rule: RuleId,
    /// Subject the formula ran against
    pub subject: NodeId,
    /// The formula itself
    pub formula: NodeId,
    /// Step number in the execution
    pub step: usize,
}

/// Execution trace: a sequence of reduction events
#[derive(Debug, Clone, Default)]
pub struct ExecutionTrace {
    /// Ordered list of events
    pub events: Vec<TraceEvent>,
    /// Final product, if evaluation completed
    pub result: Option<NodeId>,
}

impl ExecutionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, rule: RuleId, subject: NodeId, formula: NodeId) {
        let step = self.events.len();
        self.events.push(TraceEvent {
            rule,
            subject,
            formula,
            step,
        });
    }

    pub fn set_result(&mut self, result: NodeId) {
        self.result = Some(result);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn rule_counts(&self) -> HashMap<RuleId, usize> {
        let mut counts = HashMap::new();
        for ev in &self.events {
            *counts.entry(ev.rule).or_insert(0) += 1;
        }
        counts
    }

    pub fn count(&self, rule: RuleId) -> usize {
        self.events.iter().filter(|ev| ev.rule == rule).count()
    }
}
