//! Multi-group batch driver.
//!
//! The engine itself is single-threaded within a batch; thread-level
//! parallelism belongs to the caller. This helper is that caller for the
//! common case: it splits a read set into lane-capacity groups, aligns each
//! group with its own engine instance on the rayon pool (the graph is shared
//! read-only, all scratch is per-instance), and stitches the results back in
//! input order.

use rayon::prelude::*;

use crate::align::{make_aligner, Aligner, WordAligner};
use crate::error::AlignError;
use crate::graph::Graph;
use crate::scoring::{Results, ScoreProfile};

/// Align `reads` against `graph` in parallel, returning results in input
/// order. `quals` is empty or parallel to `reads`; `word_lanes` selects
/// 16-bit cells; `fwdonly` skips the reverse-complement pass.
pub fn align_concurrent(
    graph: &Graph,
    reads: &[&[u8]],
    quals: &[&[u8]],
    prof: &ScoreProfile,
    read_len: usize,
    word_lanes: bool,
    fwdonly: bool,
) -> Result<Results, AlignError> {
    if reads.is_empty() {
        let mut empty = Results::default();
        empty.profile = prof.clone();
        return Ok(empty);
    }
    if !quals.is_empty() && quals.len() != reads.len() {
        return Err(AlignError::Config(format!(
            "{} quality strings for {} reads",
            quals.len(),
            reads.len()
        )));
    }

    let cap = if word_lanes {
        WordAligner::read_capacity()
    } else {
        Aligner::read_capacity()
    };

    let partials: Result<Vec<Results>, AlignError> = reads
        .par_chunks(cap)
        .enumerate()
        .map(|(i, chunk)| {
            let qchunk: &[&[u8]] = if quals.is_empty() {
                &[]
            } else {
                let beg = i * cap;
                &quals[beg..(beg + chunk.len())]
            };
            let mut aligner = make_aligner(prof, read_len, word_lanes, false, false)?;
            let mut results = Results::default();
            aligner.align_into(chunk, qchunk, graph, &mut results, fwdonly)?;
            Ok(results)
        })
        .collect();

    let mut merged = Results::default();
    merged.profile = prof.clone();
    for part in partials? {
        merged.append(part);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    fn diamond() -> Graph {
        let mut g = Graph::new();
        let a = g.add_node(Node::new(b"AAA", 3));
        let r = g.add_node(Node::new(b"CCC", 6));
        let v = g.add_node(Node::new(b"GGG", 6));
        let t = g.add_node(Node::new(b"TTTA", 10));
        g.add_edge(a, r).unwrap();
        g.add_edge(a, v).unwrap();
        g.add_edge(r, t).unwrap();
        g.add_edge(v, t).unwrap();
        g
    }

    #[test]
    fn concurrent_matches_single_instance() {
        let g = diamond();
        let prof = ScoreProfile::new(2, 2, 3, 1);

        // enough reads to span several 32-lane groups
        let mut reads: Vec<&[u8]> = Vec::new();
        for _ in 0..40 {
            reads.extend_from_slice(&[
                b"CCTT".as_slice(),
                b"GGTT".as_slice(),
                b"AGGGT".as_slice(),
            ]);
        }

        let parallel =
            align_concurrent(&g, &reads, &[], &prof, 7, false, true).expect("parallel run");

        let mut aligner = Aligner::new(7, prof).unwrap();
        let serial = aligner.align(&reads, &g).expect("serial run");

        assert_eq!(parallel.max_score, serial.max_score);
        assert_eq!(parallel.max_pos_fwd, serial.max_pos_fwd);
        assert_eq!(parallel.sub_score, serial.sub_score);
    }

    #[test]
    fn empty_read_set_is_a_noop() {
        let g = diamond();
        let prof = ScoreProfile::new(2, 2, 3, 1);
        let res = align_concurrent(&g, &[], &[], &prof, 7, false, true).unwrap();
        assert!(res.is_empty());
    }
}
