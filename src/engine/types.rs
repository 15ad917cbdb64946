use crate::arena::NodeId;
use crate::trace::ExecutionTrace;
use thiserror::Error;

pub const DEFAULT_STEP_LIMIT: usize = 10_000_000;
pub const DEFAULT_DEPTH_LIMIT: usize = 10_000;

// EvalContext cannot derive Clone because it holds a mutable trace reference.
pub struct EvalContext<'a> {
    pub step_limit: usize,
    pub depth_limit: usize,
    pub steps: usize,
    pub depth: usize,
    pub max_depth: usize,
    pub exec_trace: Option<&'a mut ExecutionTrace>,
}

impl Default for EvalContext<'_> {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            steps: 0,
            depth: 0,
            max_depth: 0,
            exec_trace: None,
        }
    }
}

impl<'a> EvalContext<'a> {
    pub fn with_limits(step_limit: usize, depth_limit: usize) -> Self {
        Self {
            step_limit,
            depth_limit,
            ..Self::default()
        }
    }

    pub fn with_trace(mut self, trace: &'a mut ExecutionTrace) -> Self {
        self.exec_trace = Some(trace);
        self
    }
}

/// Ways a formula can fail to produce a product.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NockError {
    #[error("formula is an atom")]
    AtomFormula,
    #[error("unknown opcode {0}")]
    BadOpcode(u64),
    #[error("malformed arguments to opcode {op}")]
    BadArgs { op: u64 },
    #[error("no slot at axis {axis}")]
    MissingAxis { axis: String },
    #[error("increment of a cell")]
    NotAnAtom,
    #[error("if-test produced a non-loobean")]
    NotLoobean,
    #[error("step limit {0} exceeded")]
    StepLimit(usize),
    #[error("depth limit {0} exceeded")]
    DepthLimit(usize),
}

impl NockError {
    pub fn missing_axis(axis: impl ToString) -> Self {
        NockError::MissingAxis {
            axis: axis.to_string(),
        }
    }
}

pub type NockResult = Result<NodeId, NockError>;
