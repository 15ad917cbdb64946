#![allow(dead_code)]

use nest_jet::{parse_noun, Graph, NodeId};
use tracing_subscriber::EnvFilter;

/// Nest gate battery over a toy type algebra. In the gate, tel is /12,
/// ref is /13 and sut is /30.
///
/// tel=0: ref nests in sut if sut is %noun or sut equals ref.
/// tel=1: only if sut equals ref.
pub const GATE: &str = "[6 [5 [1 0] [0 12]] \
                           [6 [5 [1 %noun] [0 30]] [1 0] [5 [0 13] [0 30]]] \
                           [5 [0 13] [0 30]]]";

pub const YES: u64 = 0;
pub const NO: u64 = 1;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `van` core: the nest arm in the battery, `sut` in the sample, `ctx` as payload.
pub fn van(g: &mut Graph, sut: &str, ctx: &str) -> NodeId {
    let text = format!("[[[1 {}] [1 0 0] [0 1]] {} {}]", GATE, sut, ctx);
    parse_noun(g, &text).unwrap()
}

/// Raw call gate `[battery [[tel ref] van]]`.
pub fn call(g: &mut Graph, van: NodeId, tel: u64, ref_: &str) -> NodeId {
    let ref_ = parse_noun(g, ref_).unwrap();
    let tel = g.atom(tel);
    let sample = g.cell(tel, ref_);
    let battery = g.cord("nest");
    g.trel(battery, sample, van)
}

/// What the toy algebra should answer, computed without the interpreter.
pub fn expected(sut: &str, tel: u64, ref_: &str) -> u64 {
    let mut g = Graph::new();
    let s = parse_noun(&mut g, sut).unwrap();
    let r = parse_noun(&mut g, ref_).unwrap();
    let top = g.cord("noun");
    let nests = s == r || (tel == 0 && s == top);
    if nests { YES } else { NO }
}
