// benches/align_perf.rs
// Criterion benchmarks for the graph DP kernel across lane widths and modes.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};

use graphalign::{Aligner, AlignerEte, Graph, Node, ScoreProfile, WordAligner};

const ALPHA: [u8; 4] = [b'A', b'C', b'G', b'T'];

fn random_seq(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| ALPHA[rng.gen_range(0..4)]).collect()
}

/// A reference backbone with a SNP bubble every ~60 bases.
fn build_graph(rng: &mut StdRng, ref_len: usize) -> Graph {
    let mut g = Graph::new();
    let mut cursor: u32 = 0;
    let mut tails: Vec<u32> = Vec::new();

    while (cursor as usize) < ref_len {
        let seg = 60.min(ref_len - cursor as usize);
        let mut node = Node::new(&random_seq(rng, seg), cursor + seg as u32);
        node.set_reference(true);
        let id = g.add_node(node);
        for t in tails.drain(..) {
            g.add_edge(t, id).unwrap();
        }
        cursor += seg as u32;

        if (cursor as usize) < ref_len {
            let mut reference = Node::new(&random_seq(rng, 1), cursor + 1);
            reference.set_reference(true);
            let r = g.add_node(reference);
            let a = g.add_node(Node::new(&random_seq(rng, 1), cursor + 1));
            g.add_edge(id, r).unwrap();
            g.add_edge(id, a).unwrap();
            cursor += 1;
            tails.push(r);
            tails.push(a);
        }
    }
    g
}

fn random_reads(rng: &mut StdRng, n: usize, len: usize) -> Vec<Vec<u8>> {
    (0..n).map(|_| random_seq(rng, len)).collect()
}

fn bench_local_8bit(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xB0A7);
    let g = build_graph(&mut rng, 2_000);
    let reads = random_reads(&mut rng, 32, 100);
    let read_refs: Vec<&[u8]> = reads.iter().map(|r| r.as_slice()).collect();
    let mut aligner = Aligner::with_penalties(100, 2, 2, 3, 1).unwrap();

    let mut group = c.benchmark_group("local");
    group.throughput(Throughput::Elements(reads.len() as u64));
    group.bench_function("int8x32_batch32", |b| {
        b.iter(|| {
            let res = aligner.align(black_box(&read_refs), &g).unwrap();
            black_box(res.max_score[0])
        })
    });
    group.finish();
}

fn bench_local_16bit(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xB0A7);
    let g = build_graph(&mut rng, 2_000);
    let reads = random_reads(&mut rng, 16, 100);
    let read_refs: Vec<&[u8]> = reads.iter().map(|r| r.as_slice()).collect();
    let mut aligner = WordAligner::with_penalties(100, 2, 2, 3, 1).unwrap();

    let mut group = c.benchmark_group("local");
    group.throughput(Throughput::Elements(reads.len() as u64));
    group.bench_function("int16x16_batch16", |b| {
        b.iter(|| {
            let res = aligner.align(black_box(&read_refs), &g).unwrap();
            black_box(res.max_score[0])
        })
    });
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xE7E);
    let g = build_graph(&mut rng, 2_000);
    let reads = random_reads(&mut rng, 32, 50);
    let read_refs: Vec<&[u8]> = reads.iter().map(|r| r.as_slice()).collect();
    let mut aligner = AlignerEte::new(50, ScoreProfile::new(2, 6, 5, 3)).unwrap();

    let mut group = c.benchmark_group("end_to_end");
    group.throughput(Throughput::Elements(reads.len() as u64));
    group.bench_function("int8x32_batch32", |b| {
        b.iter(|| {
            let res = aligner.align(black_box(&read_refs), &g).unwrap();
            black_box(res.max_score[0])
        })
    });
    group.finish();
}

fn bench_both_strands(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5712);
    let g = build_graph(&mut rng, 1_000);
    let reads = random_reads(&mut rng, 32, 100);
    let read_refs: Vec<&[u8]> = reads.iter().map(|r| r.as_slice()).collect();
    let mut aligner = Aligner::with_penalties(100, 2, 2, 3, 1).unwrap();

    let mut group = c.benchmark_group("local");
    group.throughput(Throughput::Elements(reads.len() as u64));
    group.bench_function("int8x32_fwd_rev", |b| {
        b.iter(|| {
            let res = aligner
                .align_with(black_box(&read_refs), &[], &g, false)
                .unwrap();
            black_box(res.max_score[0])
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_local_8bit,
    bench_local_16bit,
    bench_end_to_end,
    bench_both_strands
);
criterion_main!(benches);
