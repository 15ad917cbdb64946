//! Nest - accelerated subtype dispatch
//!
//! A nest call arrives as a gate `[battery [[tel ref] van]]`. The dispatcher
//! validates it, consults the memo cache and, on a miss, builds the nest core
//! out of `van` and runs it through the interpreter:
//!
//! ```text
//! validate -> lookup -> hit: return
//!                    -> miss: build core -> invoke -> store -> return
//! ```
//!
//! The accelerated path never computes anything itself; with the cache off
//! (or through [`Nest::call_direct`]) the products are identical.

mod build;
mod dispatch;
mod invoke;
mod validate;


pub use build::build_core;
pub use dispatch::Nest;
pub use invoke::invoke;
pub use validate::{validate, NestArgs};

use crate::engine::NockError;
use thiserror::Error;

pub const AXIS_WHOLE: u64 = 1;
pub const AXIS_BATTERY: u64 = 2;
pub const AXIS_SAMPLE: u64 = 6;
pub const AXIS_CONTEXT: u64 = 7;
pub const AXIS_SAMPLE_HEAD: u64 = 12;
pub const AXIS_SAMPLE_TAIL: u64 = 13;

/// Why a raw nest call was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedCall {
    #[error("call has no slot at axis {axis}")]
    MissingAxis { axis: u64 },
    #[error("tel is a cell")]
    TelNotAtom,
    #[error("tel is not 0 or 1")]
    TelOutOfRange,
    #[error("van has no subject type at axis 6")]
    MissingSubject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NestError {
    /// Fatal: the whole dispatch is aborted and the cache is left untouched.
    #[error("malformed nest call: {0}")]
    MalformedCall(#[from] MalformedCall),
    #[error("interpreter: {0}")]
    Interpreter(#[from] NockError),
}

impl NestError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, NestError::MalformedCall(_))
    }
}

pub type NestResult<T> = Result<T, NestError>;
