pub mod arena;
pub mod config;
pub mod engine;
pub mod memo;
pub mod nest;
pub mod parser;
pub mod trace;

pub use arena::{Graph, Node, NodeId};
pub use config::NestConfig;
pub use engine::{Counting, Interpreter, Nock, NockError};
pub use memo::{MemoCache, MemoKey, MemoStats, NestMemo, NEST_FUN};
pub use nest::{MalformedCall, Nest, NestArgs, NestError, NestResult};
pub use parser::{parse_noun, ParseError};
