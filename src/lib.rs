//! Vectorized Smith-Waterman alignment of short-read batches to variation
//! graphs.
//!
//! A variation graph is a reference sequence enriched with variant branches:
//! a directed acyclic graph of sequence nodes visited in topological order.
//! This crate scores a batch of short reads against such a graph under an
//! affine-gap scheme, one read per SIMD lane, and reports the best and
//! second-best score per read together with the genomic end positions at
//! which they occur, on both strands.
//!
//! The heavy lifting happens in four layers:
//! - [`simd`]: a lane abstraction over `wide`'s saturating integer vectors
//!   (8- or 16-bit lanes, 8/16/32 lanes per vector).
//! - [`align::profile`]: the lane-interleaved query profile for a read batch.
//! - [`align::engine`]: the per-node DP fill and the graph driver that
//!   merges partial DP state across branch points.
//! - [`align::tracker`]: running best/second-best bookkeeping with a
//!   minimum-separation rule between reported positions.
//!
//! Graph construction from FASTA/VCF, read I/O, and SAM output are the
//! caller's concern; the engine consumes a [`graph::Graph`] and plain byte
//! sequences and fills a [`scoring::Results`] packet.
//!
//! ```
//! use graphalign::{Aligner, Graph, Node};
//!
//! let mut g = Graph::new();
//! let a = g.add_node(Node::new(b"AAA", 3));
//! let r = g.add_node(Node::new(b"CCC", 6));
//! let v = g.add_node(Node::new(b"GGG", 6));
//! let t = g.add_node(Node::new(b"TTTA", 10));
//! for (from, to) in [(a, r), (a, v), (r, t), (v, t)] {
//!     g.add_edge(from, to).unwrap();
//! }
//!
//! let mut aligner = Aligner::with_penalties(7, 2, 2, 3, 1).unwrap();
//! let res = aligner.align(&[b"CCTT".as_slice()], &g).unwrap();
//! assert_eq!(res.max_score[0], 8);
//! assert_eq!(res.max_pos_fwd[0], vec![8]);
//! ```

pub mod align;
pub mod base;
pub mod error;
pub mod graph;
pub mod scoring;
pub mod simd;

pub use align::{
    align_concurrent, make_aligner, Aligner, AlignerEte, AlignerT, GraphAligner,
    ScoreOnlyAligner, ScoreOnlyAlignerEte, ScoreOnlyWordAligner, ScoreOnlyWordAlignerEte,
    WordAligner, WordAlignerEte,
};
pub use base::Base;
pub use error::AlignError;
pub use graph::{Graph, Node, NodeId};
pub use scoring::{Results, ScoreProfile};
