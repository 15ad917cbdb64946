use super::{NestArgs, NestResult, AXIS_SAMPLE, AXIS_SAMPLE_HEAD, AXIS_SAMPLE_TAIL, AXIS_WHOLE};
use crate::arena::{Graph, NodeId};
use crate::engine::{Interpreter, NockError};
use tracing::trace;

/// Build the nest core for one call.
///
/// `van` gets `sut` at its sample, the nest arm is pulled from the result, and
/// the pulled gate gets `tel` and `ref` in its sample. Every step is a
/// copy-on-write edit; `van` itself is unchanged.
pub fn build_core<I: Interpreter + ?Sized>(
    g: &mut Graph,
    interp: &I,
    nest_arm: u64,
    args: &NestArgs,
) -> NestResult<NodeId> {
    let von = g
        .edit(args.van(), AXIS_SAMPLE, args.sut())
        .ok_or_else(|| NockError::missing_axis(AXIS_SAMPLE))?;

    // [9 nest_arm [0 1]]
    let arm = g.atom(nest_arm);
    let nine = g.atom(9);
    let zero = g.atom(0);
    let one = g.atom(AXIS_WHOLE);
    let whole = g.cell(zero, one);
    let pull = g.trel(nine, arm, whole);
    let gat = interp.nock_on(g, von, pull)?;
    trace!(gate = gat.0, "nest arm pulled");

    let gat = g
        .edit(gat, AXIS_SAMPLE_HEAD, args.tel())
        .ok_or_else(|| NockError::missing_axis(AXIS_SAMPLE_HEAD))?;
    let gat = g
        .edit(gat, AXIS_SAMPLE_TAIL, args.ref_())
        .ok_or_else(|| NockError::missing_axis(AXIS_SAMPLE_TAIL))?;
    Ok(gat)
}
