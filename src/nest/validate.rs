use super::{MalformedCall, AXIS_CONTEXT, AXIS_SAMPLE, AXIS_SAMPLE_HEAD, AXIS_SAMPLE_TAIL};
use crate::arena::{Graph, NodeId};

/// The four logical inputs of a nest call. Only [`NestArgs::new`] and
/// [`validate`] build one, so `tel` is always 0 or 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NestArgs {
    van: NodeId,
    sut: NodeId,
    tel: NodeId,
    ref_: NodeId,
}

impl NestArgs {
    /// Inputs supplied directly rather than read from a call gate. Same
    /// domain checks as [`validate`]: `tel` in {0, 1} and a sample slot on `van`.
    pub fn new(g: &Graph, van: NodeId, sut: NodeId, tel: NodeId, ref_: NodeId) -> Result<Self, MalformedCall> {
        check_tel(g, tel)?;
        if g.at(van, AXIS_SAMPLE).is_none() {
            return Err(MalformedCall::MissingSubject);
        }
        Ok(Self { van, sut, tel, ref_ })
    }

    pub fn van(&self) -> NodeId {
        self.van
    }

    pub fn sut(&self) -> NodeId {
        self.sut
    }

    pub fn tel(&self) -> NodeId {
        self.tel
    }

    pub fn ref_(&self) -> NodeId {
        self.ref_
    }
}

/// Pull `tel`, `ref` and `van` out of the call gate, then `sut` out of `van`.
pub fn validate(g: &Graph, cor: NodeId) -> Result<NestArgs, MalformedCall> {
    let axes = [AXIS_SAMPLE_HEAD, AXIS_SAMPLE_TAIL, AXIS_CONTEXT];
    let slots = match g.mean(cor, &axes) {
        Some(slots) => slots,
        None => {
            let axis = axes
                .iter()
                .copied()
                .find(|&axis| g.at(cor, axis).is_none())
                .unwrap_or(AXIS_SAMPLE_HEAD);
            return Err(MalformedCall::MissingAxis { axis });
        }
    };
    let (tel, ref_, van) = (slots[0], slots[1], slots[2]);
    check_tel(g, tel)?;
    let sut = g.at(van, AXIS_SAMPLE).ok_or(MalformedCall::MissingSubject)?;
    Ok(NestArgs { van, sut, tel, ref_ })
}

fn check_tel(g: &Graph, tel: NodeId) -> Result<(), MalformedCall> {
    if !g.is_atom(tel) {
        return Err(MalformedCall::TelNotAtom);
    }
    if !matches!(g.as_u64(tel), Some(0) | Some(1)) {
        return Err(MalformedCall::TelOutOfRange);
    }
    Ok(())
}
