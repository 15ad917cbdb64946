//! Memo cache for accelerated operations.
//!
//! Entries never expire: a result stays valid for as long as the graph its
//! ids point into. Dropping the cache is the only teardown.
use crate::arena::{Graph, NodeId};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use tracing::warn;

/// Little-endian cord of an ASCII tag, as a `u64`.
pub const fn mote(tag: &[u8]) -> u64 {
    let mut out = 0u64;
    let mut i = tag.len();
    while i > 0 {
        i -= 1;
        out = (out << 8) | tag[i] as u64;
    }
    out
}

/// Operation identity of the nest check in a shared cache namespace.
pub const NEST_FUN: u64 = 141 + mote(b"nest");

#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub struct MemoKey {
    pub fun: u64,
    pub van: NodeId,
    pub sut: NodeId,
    pub tel: NodeId,
    pub ref_: NodeId,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub entries: usize,
}

/// The cache seam the dispatcher talks to.
pub trait NestMemo: Sync {
    fn find(&self, g: &Graph, key: &MemoKey) -> Option<NodeId>;
    fn save(&self, g: &Graph, key: MemoKey, pro: NodeId);
}

pub struct MemoCache {
    table: Mutex<FxHashMap<MemoKey, NodeId>>,
    /// Id of the graph whose `NodeId`s the table holds; set by the first store.
    graph_id: OnceLock<u64>,
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
}

impl MemoCache {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(FxHashMap::default()),
            graph_id: OnceLock::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stores: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<MemoKey, NodeId>> {
        // Entries are written whole under the lock, so a poisoned table is still consistent.
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn owns(&self, g: &Graph) -> bool {
        match self.graph_id.get() {
            None => true,
            Some(&id) => id == g.id,
        }
    }
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NestMemo for MemoCache {
    fn find(&self, g: &Graph, key: &MemoKey) -> Option<NodeId> {
        if !self.owns(g) {
            warn!(graph = g.id, "memo lookup from a foreign graph, treating as absent");
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        let found = self.lock().get(key).copied();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    fn save(&self, g: &Graph, key: MemoKey, pro: NodeId) {
        let owner = *self.graph_id.get_or_init(|| g.id);
        if owner != g.id {
            warn!(graph = g.id, owner, "memo store from a foreign graph, dropped");
            return;
        }
        self.stores.fetch_add(1, Ordering::Relaxed);
        // last writer wins; purity makes every writer agree anyway
        self.lock().insert(key, pro);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(g: &mut Graph, van: u64, sut: u64, tel: u64, ref_: u64) -> MemoKey {
        MemoKey {
            fun: NEST_FUN,
            van: g.atom(van),
            sut: g.atom(sut),
            tel: g.atom(tel),
            ref_: g.atom(ref_),
        }
    }

    #[test]
    fn test_nest_fun_constant() {
        assert_eq!(mote(b"nest"), 0x7473_656e);
        assert_eq!(NEST_FUN, 1_953_719_662 + 141);
    }

    #[test]
    fn test_absent_key_is_none() {
        let mut g = Graph::new();
        let cache = MemoCache::new();
        let k = key(&mut g, 1, 2, 0, 3);
        assert_eq!(cache.find(&g, &k), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_store_is_idempotent() {
        let mut g = Graph::new();
        let cache = MemoCache::new();
        let k = key(&mut g, 1, 2, 0, 3);
        let pro = g.atom(0);
        cache.save(&g, k, pro);
        cache.save(&g, k, pro);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.find(&g, &k), Some(pro));
    }

    #[test]
    fn test_keys_differing_in_one_component_do_not_collide() {
        let mut g = Graph::new();
        let cache = MemoCache::new();
        let base = key(&mut g, 1, 2, 0, 3);
        let yes = g.atom(0);
        let no = g.atom(1);
        cache.save(&g, base, yes);

        let other_fun = MemoKey { fun: NEST_FUN + 1, ..base };
        let other_van = MemoKey { van: g.atom(10), ..base };
        let other_sut = MemoKey { sut: g.atom(20), ..base };
        let other_tel = MemoKey { tel: g.atom(1), ..base };
        let other_ref = MemoKey { ref_: g.atom(30), ..base };
        for k in [other_fun, other_van, other_sut, other_tel, other_ref] {
            assert_eq!(cache.find(&g, &k), None);
            cache.save(&g, k, no);
        }
        assert_eq!(cache.find(&g, &base), Some(yes));
        assert_eq!(cache.len(), 6);
    }

    #[test]
    fn test_foreign_graph_is_ignored() {
        let mut g = Graph::new();
        let mut h = Graph::new();
        let cache = MemoCache::new();
        let k = key(&mut g, 1, 2, 0, 3);
        let pro = g.atom(0);
        cache.save(&g, k, pro);

        let k2 = key(&mut h, 1, 2, 0, 3);
        assert_eq!(cache.find(&h, &k2), None);
        let pro2 = h.atom(0);
        cache.save(&h, k2, pro2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_stores_agree() {
        let mut g = Graph::new();
        let cache = MemoCache::new();
        let k = key(&mut g, 1, 2, 0, 3);
        let pro = g.atom(0);
        let g = &g;
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    if cache.find(g, &k).is_none() {
                        cache.save(g, k, pro);
                    }
                });
            }
        });
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.find(g, &k), Some(pro));
    }
}
