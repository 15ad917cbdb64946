//! Arena - Hash-consed Noun Storage
//!
//! Every noun is an atom or a cell, stored once per [`Graph`]. Interning makes
//! structural equality the same thing as `NodeId` equality.
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Lightweight NodeId
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Core Node Enum
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    Atom(BigUint),
    Cell(NodeId, NodeId),
}

pub struct Graph {
    nodes: Vec<Node>,
    interner: FxHashMap<Node, NodeId>,
    /// Process-unique identity; `NodeId`s are only meaningful against the graph that issued them.
    pub id: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(1024),
            interner: FxHashMap::default(),
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Intern `node`, returning the existing id when it is already stored.
    ///
    /// # Panics
    ///
    /// If the graph already holds `u32::MAX` nodes.
    pub fn add(&mut self, node: Node) -> NodeId {
        if let Some(&id) = self.interner.get(&node) {
            return id;
        }
        let index = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("graph {} is out of node ids", self.id));
        let id = NodeId(index);
        self.nodes.push(node.clone());
        self.interner.insert(node, id);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn atom(&mut self, n: u64) -> NodeId {
        self.add(Node::Atom(BigUint::from(n)))
    }

    pub fn atom_big(&mut self, n: BigUint) -> NodeId {
        self.add(Node::Atom(n))
    }

    /// Atom whose little-endian bytes spell `s`, e.g. `%nest`.
    pub fn cord(&mut self, s: &str) -> NodeId {
        self.add(Node::Atom(BigUint::from_bytes_le(s.as_bytes())))
    }

    pub fn cell(&mut self, head: NodeId, tail: NodeId) -> NodeId {
        self.add(Node::Cell(head, tail))
    }

    /// `[a b c]`, i.e. `[a [b c]]`.
    pub fn trel(&mut self, a: NodeId, b: NodeId, c: NodeId) -> NodeId {
        let bc = self.cell(b, c);
        self.cell(a, bc)
    }

    pub fn is_atom(&self, id: NodeId) -> bool {
        matches!(self.get(id), Node::Atom(_))
    }

    pub fn is_cell(&self, id: NodeId) -> bool {
        matches!(self.get(id), Node::Cell(_, _))
    }

    pub fn as_atom(&self, id: NodeId) -> Option<&BigUint> {
        match self.get(id) {
            Node::Atom(n) => Some(n),
            Node::Cell(_, _) => None,
        }
    }

    pub fn as_u64(&self, id: NodeId) -> Option<u64> {
        self.as_atom(id).and_then(|n| n.to_u64())
    }

    pub fn as_cell(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match self.get(id) {
            Node::Cell(h, t) => Some((*h, *t)),
            Node::Atom(_) => None,
        }
    }

    /// Slot `axis` of `root`. `None` for axis 0 or when the path runs into an atom.
    pub fn at(&self, root: NodeId, axis: u64) -> Option<NodeId> {
        self.walk(root, AxisPath::from_u64(axis)?)
    }

    pub fn at_big(&self, root: NodeId, axis: &BigUint) -> Option<NodeId> {
        self.walk(root, AxisPath::from_big(axis)?)
    }

    fn walk(&self, root: NodeId, path: AxisPath) -> Option<NodeId> {
        let mut curr = root;
        for go_tail in path {
            let (h, t) = self.as_cell(curr)?;
            curr = if go_tail { t } else { h };
        }
        Some(curr)
    }

    /// Read several axes at once; all of them must exist.
    pub fn mean(&self, root: NodeId, axes: &[u64]) -> Option<SmallVec<[NodeId; 4]>> {
        axes.iter().map(|&axis| self.at(root, axis)).collect()
    }

    /// Copy of `root` with slot `axis` replaced by `value`. The input is left alone;
    /// everything off the edited path is shared.
    pub fn edit(&mut self, root: NodeId, axis: u64, value: NodeId) -> Option<NodeId> {
        let path = AxisPath::from_u64(axis)?;
        self.edit_path(root, path, value)
    }

    pub fn edit_big(&mut self, root: NodeId, axis: &BigUint, value: NodeId) -> Option<NodeId> {
        let path = AxisPath::from_big(axis)?;
        self.edit_path(root, path, value)
    }

    fn edit_path(&mut self, root: NodeId, path: AxisPath, value: NodeId) -> Option<NodeId> {
        // (went_tail, sibling) from the root down to the edited slot.
        let mut spine: Vec<(bool, NodeId)> = Vec::new();
        let mut curr = root;
        for go_tail in path {
            let (h, t) = self.as_cell(curr)?;
            if go_tail {
                spine.push((true, h));
                curr = t;
            } else {
                spine.push((false, t));
                curr = h;
            }
        }
        let mut acc = value;
        for (went_tail, sibling) in spine.into_iter().rev() {
            acc = if went_tail {
                self.cell(sibling, acc)
            } else {
                self.cell(acc, sibling)
            };
        }
        Some(acc)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Graph {
    /// The clone allocates on its own from here on, so it gets its own identity.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            interner: self.interner.clone(),
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// Head/tail steps of an axis, most significant bit after the leading 1 first.
struct AxisPath {
    bits: SmallVec<[bool; 64]>,
    pos: usize,
}

impl AxisPath {
    fn from_u64(axis: u64) -> Option<Self> {
        if axis == 0 {
            return None;
        }
        let width = 64 - axis.leading_zeros() as usize;
        let bits = (0..width - 1)
            .rev()
            .map(|i| (axis >> i) & 1 == 1)
            .collect();
        Some(Self { bits, pos: 0 })
    }

    fn from_big(axis: &BigUint) -> Option<Self> {
        if axis.is_zero() {
            return None;
        }
        let width = axis.bits();
        let bits = (0..width - 1).rev().map(|i| axis.bit(i)).collect();
        Some(Self { bits, pos: 0 })
    }
}

impl Iterator for AxisPath {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let bit = self.bits.get(self.pos).copied();
        self.pos += 1;
        bit
    }
}

/// Axis of slot `b` inside slot `a`. `None` for a zero axis or when the
/// result does not fit in 64 bits.
pub const fn peg(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return None;
    }
    let shift = 63 - b.leading_zeros();
    if a.leading_zeros() < shift {
        return None;
    }
    let low = b ^ (1u64 << shift);
    Some((a << shift) | low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning() {
        let mut g = Graph::new();
        let n1 = g.atom(7);
        let n2 = g.atom(7);
        assert_eq!(n1, n2);

        let c1 = g.cell(n1, n2);
        let a = g.atom(7);
        let c2 = g.cell(a, a);
        assert_eq!(c1, c2);
    }

    #[test]
    fn test_cord_is_little_endian() {
        let mut g = Graph::new();
        let nest = g.cord("nest");
        assert_eq!(g.as_u64(nest), Some(0x7473_656e));
    }

    #[test]
    fn test_axis_lookup() {
        let mut g = Graph::new();
        let a = g.atom(1);
        let b = g.atom(2);
        let c = g.atom(3);
        let abc = g.trel(a, b, c);
        assert_eq!(g.at(abc, 1), Some(abc));
        assert_eq!(g.at(abc, 2), Some(a));
        assert_eq!(g.at(abc, 6), Some(b));
        assert_eq!(g.at(abc, 7), Some(c));
        assert_eq!(g.at(abc, 0), None);
        assert_eq!(g.at(abc, 4), None);
        assert_eq!(g.at_big(abc, &BigUint::from(7u32)), Some(c));
    }

    #[test]
    fn test_mean_is_all_or_nothing() {
        let mut g = Graph::new();
        let a = g.atom(1);
        let b = g.atom(2);
        let ab = g.cell(a, b);
        assert_eq!(g.mean(ab, &[2, 3]).map(|v| v.to_vec()), Some(vec![a, b]));
        assert!(g.mean(ab, &[2, 6]).is_none());
    }

    #[test]
    fn test_edit_shares_untouched_structure() {
        let mut g = Graph::new();
        let a = g.atom(1);
        let b = g.atom(2);
        let c = g.atom(3);
        let z = g.atom(9);
        let abc = g.trel(a, b, c);
        let before = g.len();

        let edited = g.edit(abc, 6, z).unwrap();
        assert_eq!(g.at(edited, 6), Some(z));
        assert_eq!(g.at(edited, 7), Some(c));
        assert_eq!(g.at(edited, 2), Some(a));
        // input untouched
        assert_eq!(g.at(abc, 6), Some(b));
        // [z c] and [a [z c]]
        assert_eq!(g.len(), before + 2);

        assert_eq!(g.edit(abc, 1, z), Some(z));
        assert_eq!(g.edit(abc, 4, z), None);
        assert_eq!(g.edit(abc, 0, z), None);
    }

    #[test]
    fn test_peg() {
        assert_eq!(peg(7, 6), Some(30));
        assert_eq!(peg(6, 2), Some(12));
        assert_eq!(peg(1, 13), Some(13));
        assert_eq!(peg(3, 1), Some(3));
    }

    #[test]
    fn test_peg_rejects_zero_and_overflow() {
        assert_eq!(peg(7, 0), None);
        assert_eq!(peg(0, 6), None);
        assert_eq!(peg(1 << 62, 2), Some(1 << 63));
        assert_eq!(peg(1 << 62, 4), None);
        assert_eq!(peg(u64::MAX, 1), Some(u64::MAX));
    }

    #[test]
    fn test_reads_go_through_interned_nodes() {
        let mut g = Graph::new();
        let a = g.atom(1);
        let c = g.cell(a, a);
        assert_eq!(g.len(), 2);
        assert_eq!(g.get(c), &Node::Cell(a, a));
        assert_eq!(g.add(Node::Cell(a, a)), c);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_clone_gets_new_identity() {
        let g = Graph::new();
        let h = g.clone();
        assert_ne!(g.id, h.id);
    }
}
