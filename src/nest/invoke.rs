use super::{NestResult, AXIS_BATTERY};
use crate::arena::{Graph, NodeId};
use crate::engine::{Interpreter, NockError};

/// Run a built core: its battery against the whole core. The product is
/// returned as the interpreter produced it.
pub fn invoke<I: Interpreter + ?Sized>(g: &mut Graph, interp: &I, core: NodeId) -> NestResult<NodeId> {
    let battery = g
        .at(core, AXIS_BATTERY)
        .ok_or_else(|| NockError::missing_axis(AXIS_BATTERY))?;
    Ok(interp.nock_on(g, core, battery)?)
}
