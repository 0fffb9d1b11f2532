//! DP state handoff between graph nodes.
//!
//! When a node has been filled, its last matrix column becomes the seed for
//! every successor. At a branch merge the successor takes the lane-wise
//! elementwise maximum over all predecessor seeds. Seeds live in a store
//! keyed by node id; a pinched node bounds how long they are kept.

use std::collections::HashMap;

use crate::error::AlignError;
use crate::graph::NodeId;
use crate::simd::SimdVec;

/// Final `(S, I)` columns of a filled node, `read_len + 1` vectors each.
/// Row 0 carries the bias constant and is never touched by merging.
#[derive(Debug, Clone)]
pub struct Seed<V: SimdVec> {
    pub s_col: Vec<V>,
    pub i_col: Vec<V>,
}

impl<V: SimdVec> Seed<V> {
    pub fn new(read_len: usize, fill: V) -> Self {
        Seed {
            s_col: vec![fill; read_len + 1],
            i_col: vec![fill; read_len + 1],
        }
    }

    pub fn copy_from(&mut self, other: &Seed<V>) {
        self.s_col.copy_from_slice(&other.s_col);
        self.i_col.copy_from_slice(&other.i_col);
    }
}

/// Seeds of already-visited nodes, keyed by node id.
///
/// The store is cleared whenever a pinched node is processed: every later
/// node draws its seed from the pinch or beyond, so memory stays bounded by
/// the widest bubble between pinch points rather than the whole graph.
#[derive(Debug)]
pub struct SeedStore<V: SimdVec> {
    seeds: HashMap<NodeId, Seed<V>>,
}

impl<V: SimdVec> SeedStore<V> {
    pub fn new() -> Self {
        SeedStore {
            seeds: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.seeds.clear();
    }

    pub fn insert(&mut self, id: NodeId, seed: Seed<V>) {
        self.seeds.insert(id, seed);
    }

    /// Write the elementwise maximum over the predecessors' seeds into
    /// `out` (rows `1..=read_len`; row 0 is left alone).
    ///
    /// A missing predecessor seed means the node stream was not
    /// topologically ordered and aborts the alignment.
    pub fn merge_into(
        &self,
        preds: &[NodeId],
        read_len: usize,
        out: &mut Seed<V>,
    ) -> Result<(), AlignError> {
        let missing = |id: NodeId| {
            AlignError::Topology(format!(
                "no seed for predecessor node {}; graph is not topologically ordered",
                id
            ))
        };

        let first = self.seeds.get(&preds[0]).ok_or_else(|| missing(preds[0]))?;
        out.s_col[1..].copy_from_slice(&first.s_col[1..]);
        out.i_col[1..].copy_from_slice(&first.i_col[1..]);

        for &id in &preds[1..] {
            let seed = self.seeds.get(&id).ok_or_else(|| missing(id))?;
            for i in 1..=read_len {
                out.s_col[i] = out.s_col[i].max(seed.s_col[i]);
                out.i_col[i] = out.i_col[i].max(seed.i_col[i]);
            }
        }
        Ok(())
    }
}

impl<V: SimdVec> Default for SeedStore<V> {
    fn default() -> Self {
        SeedStore::new()
    }
}
