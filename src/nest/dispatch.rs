use super::{build_core, invoke, validate, NestArgs, NestResult};
use crate::arena::{Graph, NodeId};
use crate::config::NestConfig;
use crate::engine::{debug_unparse, Interpreter};
use crate::memo::{MemoKey, NestMemo, NEST_FUN};
use tracing::{debug, trace};

/// The nest dispatcher. Holds the interpreter and the cache handle of the
/// context it serves; the graph is passed per call.
pub struct Nest<'a, I: Interpreter + ?Sized> {
    interp: &'a I,
    memo: &'a dyn NestMemo,
    config: NestConfig,
}

impl<'a, I: Interpreter + ?Sized> Nest<'a, I> {
    pub fn new(interp: &'a I, memo: &'a dyn NestMemo, config: NestConfig) -> Self {
        Self { interp, memo, config }
    }

    pub fn config(&self) -> &NestConfig {
        &self.config
    }

    /// Accelerated entry point: a raw call gate in, the nest product out.
    pub fn call(&self, g: &mut Graph, cor: NodeId) -> NestResult<NodeId> {
        let args = validate(g, cor)?;
        self.nest(g, &args)
    }

    /// Same contract as [`Nest::call`], never touching the cache.
    pub fn call_direct(&self, g: &mut Graph, cor: NodeId) -> NestResult<NodeId> {
        let args = validate(g, cor)?;
        self.nest_direct(g, &args)
    }

    pub fn nest(&self, g: &mut Graph, args: &NestArgs) -> NestResult<NodeId> {
        if !self.config.cache {
            return self.nest_direct(g, args);
        }
        let key = self.key(g, args);
        if let Some(pro) = self.memo.find(g, &key) {
            trace!(sut = key.sut.0, ref_ = key.ref_.0, pro = pro.0, "nest hit");
            return Ok(pro);
        }
        trace!(sut = key.sut.0, ref_ = key.ref_.0, "nest miss");
        let pro = self.nest_direct(g, args)?;
        self.memo.save(g, key, pro);
        debug!(pro = %debug_unparse(g, pro), "nest stored");
        Ok(pro)
    }

    pub fn nest_direct(&self, g: &mut Graph, args: &NestArgs) -> NestResult<NodeId> {
        let core = build_core(g, self.interp, self.config.nest_arm, args)?;
        invoke(g, self.interp, core)
    }

    /// Cache key for `args`. A `van` without the configured key axis is keyed
    /// whole.
    fn key(&self, g: &Graph, args: &NestArgs) -> MemoKey {
        let van = match g.at(args.van(), self.config.key_axis) {
            Some(projected) => projected,
            None => {
                trace!(axis = self.config.key_axis, "key axis absent, keying on whole van");
                args.van()
            }
        };
        MemoKey {
            fun: NEST_FUN,
            van,
            sut: args.sut(),
            tel: args.tel(),
            ref_: args.ref_(),
        }
    }
}
