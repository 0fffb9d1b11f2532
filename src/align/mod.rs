//! Alignment engine: query profiles, seeds, trackers, the DP kernel and the
//! batch drivers.

pub mod batch;
pub mod engine;
pub mod profile;
pub mod seed;
pub mod tracker;

pub use batch::align_concurrent;
pub use engine::AlignerT;

use crate::error::AlignError;
use crate::graph::Graph;
use crate::scoring::{Results, ScoreProfile};
use crate::simd::{Int16Fast, Int8Fast};

/// 8-bit lanes, local mode, full best/second-best tracking.
pub type Aligner = AlignerT<Int8Fast, false, false, false>;
/// 16-bit lanes, local mode, full tracking.
pub type WordAligner = AlignerT<Int16Fast, false, false, false>;
/// 8-bit lanes, end-to-end mode, full tracking.
pub type AlignerEte = AlignerT<Int8Fast, true, false, false>;
/// 16-bit lanes, end-to-end mode, full tracking.
pub type WordAlignerEte = AlignerT<Int16Fast, true, false, false>;

/// 8-bit lanes, local mode, max score only (no positions).
pub type ScoreOnlyAligner = AlignerT<Int8Fast, false, true, false>;
/// 16-bit lanes, local mode, max score only.
pub type ScoreOnlyWordAligner = AlignerT<Int16Fast, false, true, false>;
/// 8-bit lanes, end-to-end mode, max score only.
pub type ScoreOnlyAlignerEte = AlignerT<Int8Fast, true, true, false>;
/// 16-bit lanes, end-to-end mode, max score only.
pub type ScoreOnlyWordAlignerEte = AlignerT<Int16Fast, true, true, false>;

/// Capability shared by every aligner shape, suitable for runtime
/// selection behind `Box<dyn GraphAligner>`.
pub trait GraphAligner: Send {
    /// Install a new scoring profile.
    fn set_scores(&mut self, prof: &ScoreProfile) -> Result<(), AlignError>;

    /// Align a batch of reads into `results`. `quals` is empty or parallel
    /// to `reads`; with `fwdonly` false the reverse-complement strand is
    /// scored as well.
    fn align_into(
        &mut self,
        reads: &[&[u8]],
        quals: &[&[u8]],
        graph: &Graph,
        results: &mut Results,
        fwdonly: bool,
    ) -> Result<(), AlignError>;

    /// Reads per SIMD group.
    fn read_capacity(&self) -> usize;

    /// Maximum read length this aligner accepts.
    fn read_len(&self) -> usize;

    /// Convenience wrapper: forward-only, no qualities.
    fn align(&mut self, reads: &[&[u8]], graph: &Graph) -> Result<Results, AlignError> {
        let mut results = Results::default();
        self.align_into(reads, &[], graph, &mut results, true)?;
        Ok(results)
    }
}

impl<V, const ETE: bool, const MSONLY: bool, const MAXONLY: bool> GraphAligner
    for AlignerT<V, ETE, MSONLY, MAXONLY>
where
    V: crate::simd::SimdVec,
{
    fn set_scores(&mut self, prof: &ScoreProfile) -> Result<(), AlignError> {
        AlignerT::set_scores(self, prof)
    }

    fn align_into(
        &mut self,
        reads: &[&[u8]],
        quals: &[&[u8]],
        graph: &Graph,
        results: &mut Results,
        fwdonly: bool,
    ) -> Result<(), AlignError> {
        AlignerT::align_into(self, reads, quals, graph, results, fwdonly)
    }

    fn read_capacity(&self) -> usize {
        V::LANES
    }

    fn read_len(&self) -> usize {
        AlignerT::read_len(self)
    }
}

/// Build an aligner for the requested shape: lane width from `word_lanes`
/// (16-bit instead of 8-bit cells), mode from `prof.end_to_end`, tracker
/// degeneration from `msonly`/`maxonly` (`msonly` wins when both are set).
pub fn make_aligner(
    prof: &ScoreProfile,
    read_len: usize,
    word_lanes: bool,
    msonly: bool,
    maxonly: bool,
) -> Result<Box<dyn GraphAligner>, AlignError> {
    fn boxed<A: GraphAligner + 'static>(a: A) -> Box<dyn GraphAligner> {
        Box::new(a)
    }
    let p = prof.clone();
    let ete = prof.end_to_end;
    Ok(match (word_lanes, ete, msonly, maxonly) {
        (false, false, true, _) => boxed(ScoreOnlyAligner::new(read_len, p)?),
        (false, true, true, _) => boxed(ScoreOnlyAlignerEte::new(read_len, p)?),
        (true, false, true, _) => boxed(ScoreOnlyWordAligner::new(read_len, p)?),
        (true, true, true, _) => boxed(ScoreOnlyWordAlignerEte::new(read_len, p)?),
        (false, false, false, true) => {
            boxed(AlignerT::<Int8Fast, false, false, true>::new(read_len, p)?)
        }
        (false, true, false, true) => {
            boxed(AlignerT::<Int8Fast, true, false, true>::new(read_len, p)?)
        }
        (true, false, false, true) => {
            boxed(AlignerT::<Int16Fast, false, false, true>::new(read_len, p)?)
        }
        (true, true, false, true) => {
            boxed(AlignerT::<Int16Fast, true, false, true>::new(read_len, p)?)
        }
        (false, false, false, false) => boxed(Aligner::new(read_len, p)?),
        (false, true, false, false) => boxed(AlignerEte::new(read_len, p)?),
        (true, false, false, false) => boxed(WordAligner::new(read_len, p)?),
        (true, true, false, false) => boxed(WordAlignerEte::new(read_len, p)?),
    })
}
