//! Scoring parameters and the per-read results packet.
//!
//! A note on sign conventions: "score" means something that is added,
//! "penalty" something that is subtracted. Every penalty field holds a
//! positive magnitude; the kernels do the subtraction.

use std::fmt;
use std::str::FromStr;

use crate::error::AlignError;

/// Highest Phred quality that still changes the mismatch penalty; larger
/// values are clamped.
const PHRED_CAP: i32 = 40;

/// Affine-gap scoring parameters.
///
/// Gap penalties may differ between gaps in the read and gaps in the
/// reference. The mismatch penalty is a range: with per-base qualities the
/// penalty is interpolated between `mismatch_min` and `mismatch_max` by
/// [`ScoreProfile::penalty`]; without qualities `mismatch_max` applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreProfile {
    /// Match bonus.
    pub match_score: i32,
    /// Mismatch penalty at Phred quality 0.
    pub mismatch_min: i32,
    /// Mismatch penalty at Phred quality 40+, and the flat penalty when no
    /// qualities are supplied.
    pub mismatch_max: i32,
    /// Penalty for opening a gap in the read.
    pub read_gap_open: i32,
    /// Penalty for extending a gap in the read.
    pub read_gap_extend: i32,
    /// Penalty for opening a gap in the reference.
    pub ref_gap_open: i32,
    /// Penalty for extending a gap in the reference.
    pub ref_gap_extend: i32,
    /// Penalty applied when either side of a column is `N`.
    pub ambig_penalty: i32,
    /// End-to-end mode: the whole read must align; only full-length scores
    /// are reported.
    pub end_to_end: bool,
}

impl Default for ScoreProfile {
    fn default() -> Self {
        ScoreProfile::new(2, 2, 3, 1)
    }
}

impl ScoreProfile {
    /// Symmetric profile: one open/extend pair for both gap kinds, and a
    /// flat mismatch penalty.
    pub fn new(match_score: i32, mismatch: i32, gap_open: i32, gap_extend: i32) -> Self {
        ScoreProfile {
            match_score,
            mismatch_min: mismatch,
            mismatch_max: mismatch,
            read_gap_open: gap_open,
            read_gap_extend: gap_extend,
            ref_gap_open: gap_open,
            ref_gap_extend: gap_extend,
            ambig_penalty: 0,
            end_to_end: false,
        }
    }

    /// Asymmetric profile: separate open/extend penalties for gaps in the
    /// read and gaps in the reference.
    pub fn asymmetric(
        match_score: i32,
        mismatch: i32,
        read_gap_open: i32,
        read_gap_extend: i32,
        ref_gap_open: i32,
        ref_gap_extend: i32,
    ) -> Self {
        ScoreProfile {
            match_score,
            mismatch_min: mismatch,
            mismatch_max: mismatch,
            read_gap_open,
            read_gap_extend,
            ref_gap_open,
            ref_gap_extend,
            ambig_penalty: 0,
            end_to_end: false,
        }
    }

    /// Mismatch penalty for a base of Phred quality `q`, linearly
    /// interpolated over `[mismatch_min, mismatch_max]` with `q` clamped to
    /// `[0, 40]` and the fraction rounded up.
    #[inline]
    pub fn penalty(&self, q: u8) -> i32 {
        let q = (q as i32).min(PHRED_CAP);
        let span = self.mismatch_max - self.mismatch_min;
        self.mismatch_min + (span * q + PHRED_CAP - 1) / PHRED_CAP
    }

    /// Check field consistency. Called by aligner construction; exposed so
    /// collaborators can validate profiles they parse.
    pub fn validate(&self) -> Result<(), AlignError> {
        let fields = [
            ("match", self.match_score),
            ("mismatch_min", self.mismatch_min),
            ("mismatch_max", self.mismatch_max),
            ("read_gap_open", self.read_gap_open),
            ("read_gap_extend", self.read_gap_extend),
            ("ref_gap_open", self.ref_gap_open),
            ("ref_gap_extend", self.ref_gap_extend),
            ("ambig_penalty", self.ambig_penalty),
        ];
        for (name, v) in fields {
            if v < 0 {
                return Err(AlignError::Config(format!(
                    "{} must be non-negative, got {}",
                    name, v
                )));
            }
        }
        if self.mismatch_min > self.mismatch_max {
            return Err(AlignError::Config(format!(
                "mismatch_min ({}) exceeds mismatch_max ({})",
                self.mismatch_min, self.mismatch_max
            )));
        }
        Ok(())
    }
}

/// Textual tag of the form `M:m:rgo:rge:qgo:qge:amb:E` (`E` for end-to-end,
/// `L` for local), usable as an annotation token by I/O layers.
impl fmt::Display for ScoreProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}:{}:{}",
            self.match_score,
            self.mismatch_max,
            self.read_gap_open,
            self.read_gap_extend,
            self.ref_gap_open,
            self.ref_gap_extend,
            self.ambig_penalty,
            if self.end_to_end { 'E' } else { 'L' }
        )
    }
}

impl FromStr for ScoreProfile {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = |s: &str| AlignError::Config(format!("malformed score profile tag: {:?}", s));
        let tokens: Vec<&str> = s.split(':').collect();
        if tokens.len() != 8 {
            return Err(bad(s));
        }
        let mut ints = [0i32; 7];
        for (slot, tok) in ints.iter_mut().zip(&tokens[..7]) {
            *slot = tok.parse().map_err(|_| bad(s))?;
        }
        let end_to_end = match tokens[7] {
            "E" => true,
            "L" => false,
            _ => return Err(bad(s)),
        };
        let prof = ScoreProfile {
            match_score: ints[0],
            mismatch_min: ints[1],
            mismatch_max: ints[1],
            read_gap_open: ints[2],
            read_gap_extend: ints[3],
            ref_gap_open: ints[4],
            ref_gap_extend: ints[5],
            ambig_penalty: ints[6],
            end_to_end,
        };
        prof.validate()?;
        Ok(prof)
    }
}

/// Per-read alignment results, the sink filled by
/// [`GraphAligner::align_into`](crate::align::GraphAligner::align_into).
///
/// Indexing is by read within the batch. Position lists hold 1-based
/// genomic coordinates of the last aligned base, in ascending order, each
/// entry more than `2 * read_len` from its neighbors. A lane whose best
/// score was found on the reverse strand has an empty forward list and
/// vice versa; equal-scoring strands keep both lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Results {
    /// Best score per read (bias already stripped).
    pub max_score: Vec<i32>,
    /// Second-best score per read.
    pub sub_score: Vec<i32>,
    /// Positions of the best score, forward strand.
    pub max_pos_fwd: Vec<Vec<u32>>,
    /// Positions of the best score, reverse strand.
    pub max_pos_rev: Vec<Vec<u32>>,
    /// Positions of the second-best score, forward strand.
    pub sub_pos_fwd: Vec<Vec<u32>>,
    /// Positions of the second-best score, reverse strand.
    pub sub_pos_rev: Vec<Vec<u32>>,
    /// Profile the alignment was produced under.
    pub profile: ScoreProfile,
}

impl Results {
    pub fn len(&self) -> usize {
        self.max_score.len()
    }

    pub fn is_empty(&self) -> bool {
        self.max_score.is_empty()
    }

    /// Resize every per-read vector, truncating or zero-filling.
    pub fn resize(&mut self, n: usize) {
        self.max_score.resize(n, 0);
        self.sub_score.resize(n, 0);
        self.max_pos_fwd.resize(n, Vec::new());
        self.max_pos_rev.resize(n, Vec::new());
        self.sub_pos_fwd.resize(n, Vec::new());
        self.sub_pos_rev.resize(n, Vec::new());
    }

    /// Append another packet's reads after this one's, preserving order.
    pub fn append(&mut self, mut other: Results) {
        self.max_score.append(&mut other.max_score);
        self.sub_score.append(&mut other.sub_score);
        self.max_pos_fwd.append(&mut other.max_pos_fwd);
        self.max_pos_rev.append(&mut other.max_pos_rev);
        self.sub_pos_fwd.append(&mut other.sub_pos_fwd);
        self.sub_pos_rev.append(&mut other.sub_pos_rev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_interpolates_phred() {
        let mut prof = ScoreProfile::new(2, 2, 10, 10);
        prof.mismatch_min = 2;
        prof.mismatch_max = 6;
        assert_eq!(prof.penalty(0), 2);
        assert_eq!(prof.penalty(10), 3);
        assert_eq!(prof.penalty(20), 4);
        assert_eq!(prof.penalty(30), 5);
        assert_eq!(prof.penalty(40), 6);
        assert_eq!(prof.penalty(60), 6, "quality clamps at 40");
    }

    #[test]
    fn penalty_flat_without_range() {
        let prof = ScoreProfile::new(2, 6, 5, 3);
        for q in [0u8, 20, 40] {
            assert_eq!(prof.penalty(q), 6);
        }
    }

    #[test]
    fn tag_roundtrip() {
        let mut prof = ScoreProfile::asymmetric(2, 6, 4, 1, 2, 1);
        prof.ambig_penalty = 1;
        prof.end_to_end = true;
        let tag = prof.to_string();
        assert_eq!(tag, "2:6:4:1:2:1:1:E");
        let back: ScoreProfile = tag.parse().expect("tag must parse");
        assert_eq!(back, prof);
    }

    #[test]
    fn malformed_tags_rejected() {
        assert!("2:2:3:1:3:1:0".parse::<ScoreProfile>().is_err());
        assert!("2:2:3:1:3:1:0:X".parse::<ScoreProfile>().is_err());
        assert!("a:2:3:1:3:1:0:L".parse::<ScoreProfile>().is_err());
    }

    #[test]
    fn validate_rejects_negative_and_inverted() {
        let mut prof = ScoreProfile::new(2, 2, 3, 1);
        assert!(prof.validate().is_ok());
        prof.ref_gap_open = -1;
        assert!(matches!(prof.validate(), Err(AlignError::Config(_))));

        let mut prof = ScoreProfile::new(2, 2, 3, 1);
        prof.mismatch_min = 7;
        prof.mismatch_max = 3;
        assert!(matches!(prof.validate(), Err(AlignError::Config(_))));
    }
}
