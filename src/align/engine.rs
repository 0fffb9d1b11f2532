//! The aligner: per-node DP fill and the graph driver.
//!
//! [`AlignerT`] is generic over the vector shape and three const flags:
//! `ETE` (end-to-end instead of local), `MSONLY` (max score only) and
//! `MAXONLY` (no second-best). The public aliases in [`crate::align`] cover
//! the shapes that matter in practice.
//!
//! ## Bias
//!
//! Scores live in fixed-width signed lanes, shifted by a *bias* so the
//! interesting range never wraps:
//!
//! - Local mode: the bias is the lane minimum. Saturating subtraction clamps
//!   every cell at the bias, which is exactly the zero floor of local
//!   alignment; no explicit `max(0, ..)` is needed.
//! - End-to-end mode: the bias is the lane maximum minus the best possible
//!   score (`read_len * match`), leaving headroom for a perfect read while
//!   maximizing room below for penalties. If the penalty budget can still
//!   hit the floor, a one-shot warning is logged and clamped lanes simply
//!   stick at the minimum.
//!
//! Emitted scores have the bias subtracted back out.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::align::profile::AlignmentGroup;
use crate::align::seed::{Seed, SeedStore};
use crate::align::tracker::Tracker;
use crate::base::{self, Base};
use crate::error::AlignError;
use crate::graph::{Graph, Node};
use crate::scoring::{Results, ScoreProfile};
use crate::simd::{SimdLane, SimdVec};

static SATURATION_WARNED: AtomicBool = AtomicBool::new(false);

/// Batch aligner for one read length and scoring profile.
///
/// Scratch buffers (`read_len + 1` column vectors for the score, horizontal
/// and vertical gap matrices) are allocated once and reused across batches;
/// results are copied out into the caller's [`Results`] packet at the end of
/// each batch, so nothing borrows the aligner between calls.
pub struct AlignerT<V: SimdVec, const ETE: bool, const MSONLY: bool, const MAXONLY: bool> {
    prof: ScoreProfile,
    read_len: usize,
    bias: V::Lane,
    group: AlignmentGroup<V>,
    s: Vec<V>,
    dc: Vec<V>,
    ic: Vec<V>,
    gap_extend_rd: V,
    gap_open_extend_rd: V,
    gap_extend_ref: V,
    gap_open_extend_ref: V,
    tracker: Tracker<V, MSONLY, MAXONLY>,
}

impl<V: SimdVec, const ETE: bool, const MSONLY: bool, const MAXONLY: bool>
    AlignerT<V, ETE, MSONLY, MAXONLY>
{
    /// Build an aligner for reads of at most `read_len` bases.
    pub fn new(read_len: usize, prof: ScoreProfile) -> Result<Self, AlignError> {
        if read_len == 0 {
            return Err(AlignError::Config("read length must be positive".into()));
        }
        let mut aligner = AlignerT {
            prof: ScoreProfile::default(),
            read_len,
            bias: <V::Lane>::MIN,
            group: AlignmentGroup::new(read_len),
            s: vec![V::min_value(); read_len + 1],
            dc: vec![V::min_value(); read_len + 1],
            ic: vec![V::min_value(); read_len + 1],
            gap_extend_rd: V::splat(<V::Lane>::ZERO),
            gap_open_extend_rd: V::splat(<V::Lane>::ZERO),
            gap_extend_ref: V::splat(<V::Lane>::ZERO),
            gap_open_extend_ref: V::splat(<V::Lane>::ZERO),
            tracker: Tracker::new(read_len),
        };
        aligner.configure(&prof)?;
        Ok(aligner)
    }

    /// Shorthand for a symmetric profile.
    pub fn with_penalties(
        read_len: usize,
        match_score: i32,
        mismatch: i32,
        gap_open: i32,
        gap_extend: i32,
    ) -> Result<Self, AlignError> {
        Self::new(
            read_len,
            ScoreProfile::new(match_score, mismatch, gap_open, gap_extend),
        )
    }

    /// Number of reads scored per group, one per SIMD lane.
    pub const fn read_capacity() -> usize {
        V::LANES
    }

    /// Maximum read length this aligner accepts.
    pub fn read_len(&self) -> usize {
        self.read_len
    }

    /// Install a new scoring profile. The profile's `end_to_end` flag is
    /// overridden by this aligner's mode.
    pub fn set_scores(&mut self, prof: &ScoreProfile) -> Result<(), AlignError> {
        self.configure(prof)
    }

    /// Align a batch forward-only, without qualities.
    pub fn align(&mut self, reads: &[&[u8]], graph: &Graph) -> Result<Results, AlignError> {
        let mut results = Results::default();
        self.run_alignment(reads, &[], graph, &mut results, true)?;
        Ok(results)
    }

    /// Align a batch with full control over qualities and strand handling.
    pub fn align_with(
        &mut self,
        reads: &[&[u8]],
        quals: &[&[u8]],
        graph: &Graph,
        fwdonly: bool,
    ) -> Result<Results, AlignError> {
        let mut results = Results::default();
        self.run_alignment(reads, quals, graph, &mut results, fwdonly)?;
        Ok(results)
    }

    /// Align a batch into an existing results packet.
    pub fn align_into(
        &mut self,
        reads: &[&[u8]],
        quals: &[&[u8]],
        graph: &Graph,
        results: &mut Results,
        fwdonly: bool,
    ) -> Result<(), AlignError> {
        self.run_alignment(reads, quals, graph, results, fwdonly)
    }

    fn configure(&mut self, prof: &ScoreProfile) -> Result<(), AlignError> {
        prof.validate()?;
        self.prof = prof.clone();
        self.prof.end_to_end = ETE;
        self.bias = Self::compute_bias(self.read_len, &self.prof)?;
        self.s[0] = V::splat(self.bias);
        // a horizontal gap can never precede the first read base
        self.dc[0] = V::min_value();
        let lane = |v: i32| V::splat(<V::Lane>::from_i32_saturating(v));
        self.gap_extend_rd = lane(self.prof.read_gap_extend);
        self.gap_open_extend_rd = lane(self.prof.read_gap_open + self.prof.read_gap_extend);
        self.gap_extend_ref = lane(self.prof.ref_gap_extend);
        self.gap_open_extend_ref = lane(self.prof.ref_gap_open + self.prof.ref_gap_extend);
        Ok(())
    }

    fn compute_bias(read_len: usize, prof: &ScoreProfile) -> Result<V::Lane, AlignError> {
        let rl = read_len as i32;
        if rl * prof.match_score > <V::Lane>::dynamic_range() {
            return Err(AlignError::Config(format!(
                "read length {} with match score {} exceeds the dynamic range of {}-bit lanes",
                read_len,
                prof.match_score,
                8 * std::mem::size_of::<V::Lane>()
            )));
        }
        if !ETE {
            return Ok(<V::Lane>::MIN);
        }

        let bias = <V::Lane>::MAX.to_i32() - rl * prof.match_score;
        let worst_gap = prof.read_gap_open + (rl - 1) * prof.read_gap_extend;
        let worst_mismatch = rl * prof.mismatch_max;
        if (worst_gap > bias || worst_mismatch > bias)
            && !SATURATION_WARNED.swap(true, Ordering::Relaxed)
        {
            log::warn!(
                "possible score saturation in end-to-end mode: bias {}, worst-case gap {}, \
                 worst-case mismatch {}; clamped lanes will stick at the minimum score",
                bias,
                worst_gap,
                worst_mismatch
            );
        }
        Ok(<V::Lane>::from_i32_saturating(bias))
    }

    /// Synthesize the seed for a node with no predecessors.
    ///
    /// Local mode starts every row at the bias (effective zero). End-to-end
    /// mode charges the first column for skipping read bases: row `i` pays a
    /// gap of length `i`.
    fn seed_matrix(&self, seed: &mut Seed<V>) {
        if ETE {
            seed.s_col[0] = V::splat(self.bias);
            for i in 1..=self.read_len {
                let v = self.bias.to_i32()
                    - self.prof.ref_gap_open
                    - i as i32 * self.prof.ref_gap_extend;
                seed.s_col[i] = V::splat(<V::Lane>::from_i32_saturating(v));
            }
        } else {
            for v in seed.s_col.iter_mut() {
                *v = V::splat(self.bias);
            }
        }
        seed.i_col.copy_from_slice(&seed.s_col);
    }

    /// Score one node, reading the seed columns and producing the node's
    /// output seed. Every committed cell is offered to the tracker: all
    /// rows in local mode, only the full-read row in end-to-end mode.
    fn fill_node(&mut self, node: &Node, seed_in: &Seed<V>, out: &mut Seed<V>) {
        // empty nodes are deletion paths: state passes through untouched
        if node.is_empty() {
            out.copy_from(seed_in);
            return;
        }

        let mut curr_pos = node.begin_pos();
        self.s.copy_from_slice(&seed_in.s_col);
        self.ic.copy_from_slice(&seed_in.i_col);

        for &ref_base in node.seq() {
            // previous-diagonal register, reset at each column start
            let mut sd = V::splat(self.bias);
            for r in 1..=self.read_len {
                let qp = self.group.table(r - 1)[ref_base.index()];
                self.dc[r] = self.dc[r - 1]
                    .saturating_sub(self.gap_extend_ref)
                    .max(self.s[r - 1].saturating_sub(self.gap_open_extend_ref));
                self.ic[r] = self.ic[r]
                    .saturating_sub(self.gap_extend_rd)
                    .max(self.s[r].saturating_sub(self.gap_open_extend_rd));
                let m = sd.saturating_add(qp);
                sd = self.s[r];
                self.s[r] = self.ic[r].max(self.dc[r].max(m));
                if !ETE {
                    self.tracker.observe(self.s[r], curr_pos);
                }
            }
            if ETE {
                self.tracker.observe(self.s[self.read_len], curr_pos);
            }
            curr_pos += 1;
        }

        out.s_col.copy_from_slice(&self.s);
        out.i_col.copy_from_slice(&self.ic);
    }

    /// One full traversal of the graph for the currently loaded profile.
    fn run_pass(
        &mut self,
        graph: &Graph,
        store: &mut SeedStore<V>,
        scratch: &mut Seed<V>,
    ) -> Result<(), AlignError> {
        for (id, node, incoming) in graph.iter() {
            if incoming.is_empty() {
                self.seed_matrix(scratch);
            } else {
                store.merge_into(incoming, self.read_len, scratch)?;
            }
            // past a pinch, no later node can reach back before it
            if node.is_pinched() {
                store.clear();
            }
            let mut out = Seed::new(self.read_len, V::splat(self.bias));
            self.fill_node(node, scratch, &mut out);
            store.insert(id, out);
        }
        Ok(())
    }

    fn run_alignment(
        &mut self,
        reads: &[&[u8]],
        quals: &[&[u8]],
        graph: &Graph,
        results: &mut Results,
        fwdonly: bool,
    ) -> Result<(), AlignError> {
        results.profile = self.prof.clone();
        if reads.is_empty() {
            results.resize(0);
            return Ok(());
        }
        if !quals.is_empty() && quals.len() != reads.len() {
            return Err(AlignError::Config(format!(
                "{} quality strings for {} reads",
                quals.len(),
                reads.len()
            )));
        }

        let mut encoded: Vec<Vec<Base>> = Vec::with_capacity(reads.len());
        for (i, r) in reads.iter().enumerate() {
            if r.len() > self.read_len {
                return Err(AlignError::Config(format!(
                    "read {} has {} bases but the aligner was built for {}",
                    i,
                    r.len(),
                    self.read_len
                )));
            }
            if !quals.is_empty() && !quals[i].is_empty() && quals[i].len() != r.len() {
                return Err(AlignError::Config(format!(
                    "read {} has {} bases but {} quality values",
                    i,
                    r.len(),
                    quals[i].len()
                )));
            }
            encoded.push(base::encode(r));
        }

        let cap = V::LANES;
        let num_groups = 1 + (reads.len() - 1) / cap;
        results.resize(num_groups * cap);

        let mut store = SeedStore::new();
        let mut scratch = Seed::new(self.read_len, V::splat(self.bias));

        for g in 0..num_groups {
            let beg = g * cap;
            let end = ((g + 1) * cap).min(reads.len());
            let live = end - beg;
            let group_reads = &encoded[beg..end];
            let group_quals: &[&[u8]] = if quals.is_empty() {
                &[]
            } else {
                &quals[beg..end]
            };

            store.clear();
            self.tracker.reset();
            self.group
                .load_reads(group_reads, group_quals, &self.prof, false);
            self.run_pass(graph, &mut store, &mut scratch)?;
            self.tracker.finish();

            if !MSONLY {
                for r in 0..live {
                    results.max_pos_fwd[beg + r] = self.tracker.max_positions(r).to_vec();
                    if !MAXONLY {
                        results.sub_pos_fwd[beg + r] = self.tracker.sub_positions(r).to_vec();
                    }
                }
            }

            if !fwdonly {
                let fwd_max = self.tracker.max_score_vec();
                let fwd_sub = self.tracker.sub_score_vec();

                store.clear();
                self.group
                    .load_reads(group_reads, group_quals, &self.prof, true);
                self.tracker.begin_reverse();
                self.run_pass(graph, &mut store, &mut scratch)?;
                self.tracker.finish();

                if !MSONLY {
                    for r in 0..live {
                        results.max_pos_rev[beg + r] = self.tracker.max_positions(r).to_vec();
                        if !MAXONLY {
                            results.sub_pos_rev[beg + r] =
                                self.tracker.sub_positions(r).to_vec();
                        }
                    }
                    // a strictly better reverse score invalidates the
                    // forward positions; ties keep both strands
                    let rev_max = self.tracker.max_score_vec();
                    let rev_sub = self.tracker.sub_score_vec();
                    for r in 0..live {
                        if rev_max.extract(r) > fwd_max.extract(r) {
                            results.max_pos_fwd[beg + r].clear();
                        }
                        if !MAXONLY && rev_sub.extract(r) > fwd_sub.extract(r) {
                            results.sub_pos_fwd[beg + r].clear();
                        }
                    }
                }
            }

            let bias = self.bias.to_i32();
            let max_score = self.tracker.max_score_vec();
            let sub_score = self.tracker.sub_score_vec();
            for r in 0..live {
                results.max_score[beg + r] = max_score.extract(r).to_i32() - bias;
                if !MSONLY && !MAXONLY {
                    results.sub_score[beg + r] = sub_score.extract(r).to_i32() - bias;
                }
            }
        }

        // crop the partial-group overhang
        results.resize(reads.len());
        Ok(())
    }
}
