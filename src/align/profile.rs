//! Lane-interleaved query profile for a read batch.
//!
//! A batch of up to `LANES` reads is packed so that lane `l` of every vector
//! belongs to read `l`. For each read position the profile stores one vector
//! per reference base: the score contribution if that read position is
//! aligned to that base. The DP kernel then scores a column with a single
//! table lookup per cell instead of comparing bases.

use crate::base::Base;
use crate::scoring::ScoreProfile;
use crate::simd::{SimdLane, SimdVec};

/// Per-position score tables for a packed read batch.
///
/// Index 0 selects the read position (after front padding), index 1 the
/// reference base. Reads shorter than the profile length are front-padded
/// with score-neutral entries so every read ends at the last position.
/// Lanes beyond the loaded read count keep whatever the previous load left
/// there; the driver never reads their results.
pub struct AlignmentGroup<V: SimdVec> {
    tables: Vec<[V; Base::COUNT]>,
    read_len: usize,
}

impl<V: SimdVec> AlignmentGroup<V> {
    pub fn new(read_len: usize) -> Self {
        AlignmentGroup {
            tables: vec![[V::splat(<V::Lane>::ZERO); Base::COUNT]; read_len],
            read_len,
        }
    }

    /// Number of reads packed per group, one per SIMD lane.
    pub const fn group_size() -> usize {
        V::LANES
    }

    /// Pack a batch of reads into the profile.
    ///
    /// `quals` is either empty (flat `mismatch_max` penalty) or parallel to
    /// `reads`; an empty entry opts a single read out of quality scaling.
    /// With `revcomp` set, each read is consumed from its last base to its
    /// first and complemented on the fly, so the reverse-complement strand
    /// needs no separate storage.
    ///
    /// Callers guarantee `reads.len() <= LANES` and every read fits in
    /// `read_len`; the aligner validates both before packing.
    pub fn load_reads(
        &mut self,
        reads: &[Vec<Base>],
        quals: &[&[u8]],
        prof: &ScoreProfile,
        revcomp: bool,
    ) {
        debug_assert!(reads.len() <= V::LANES);
        let lane_of = |v: i32| <V::Lane>::from_i32_saturating(v);

        for (lane, read) in reads.iter().enumerate() {
            let pad = self.read_len - read.len();
            for row in &mut self.tables[..pad] {
                for table in row.iter_mut() {
                    *table = table.insert(lane, <V::Lane>::ZERO);
                }
            }

            let qual: &[u8] = quals.get(lane).copied().unwrap_or(&[]);
            for p in 0..read.len() {
                let idx = if revcomp { read.len() - 1 - p } else { p };
                let read_base = if revcomp {
                    read[idx].complement()
                } else {
                    read[idx]
                };

                let row = &mut self.tables[pad + p];
                row[Base::N.index()] =
                    row[Base::N.index()].insert(lane, lane_of(-prof.ambig_penalty));
                for b in Base::ACGT {
                    let v = if read_base == Base::N {
                        -prof.ambig_penalty
                    } else if read_base == b {
                        prof.match_score
                    } else if qual.is_empty() {
                        -prof.mismatch_max
                    } else {
                        -prof.penalty(qual[idx])
                    };
                    row[b.index()] = row[b.index()].insert(lane, lane_of(v));
                }
            }
        }
    }

    /// Score table for profile position `i` (0-based).
    #[inline]
    pub fn table(&self, i: usize) -> &[V; Base::COUNT] {
        &self.tables[i]
    }
}
