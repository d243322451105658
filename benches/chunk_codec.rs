//! Criterion benchmarks for splitting files into chunks and reassembling
//! them.

use criterion::{BenchmarkId, Criterion, Throughput, black_box};
use chunkpost::{UploadSplitter, reassemble};

/// Payload sizes paired with a wire limit yielding a realistic chunk count.
const WORKLOADS: [(&str, usize, usize); 3] = [
    ("64KiB/8", 64 * 1024, 8 * 1024 + 4),
    ("8MiB/8", 8 * 1024 * 1024, 1024 * 1024 + 4),
    ("25MiB/256", 25 * 1024 * 1024, 100 * 1024 + 4),
];

fn payload(len: usize) -> Vec<u8> { (0..len).map(|i| (i % 251) as u8).collect() }

fn splitter(max_wire_size: usize) -> UploadSplitter {
    match UploadSplitter::new(max_wire_size) {
        Ok(splitter) => splitter,
        Err(err) => panic!("splitter setup failed: {err}"),
    }
}

fn benchmark_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk/split");

    for (label, len, wire) in WORKLOADS {
        let data = payload(len);
        let splitter = splitter(wire);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            b.iter(|| match splitter.split("bench.bin", black_box(&data)) {
                Ok(set) => black_box(set.len()),
                Err(err) => panic!("split failed: {err}"),
            });
        });
    }

    group.finish();
}

fn benchmark_reassemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk/reassemble");

    for (label, len, wire) in WORKLOADS {
        let set = match splitter(wire).split("bench.bin", &payload(len)) {
            Ok(set) => set,
            Err(err) => panic!("split failed: {err}"),
        };
        let mut buffers: Vec<_> = set.blobs().iter().map(|b| b.bytes().clone()).collect();
        buffers.reverse();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            b.iter(|| match reassemble(black_box(&buffers)) {
                Ok(data) => black_box(data.len()),
                Err(err) => panic!("reassemble failed: {err}"),
            });
        });
    }

    group.finish();
}

/// Entrypoint for chunk split and reassembly benchmarks.
fn main() {
    let mut criterion = Criterion::default().configure_from_args();
    benchmark_split(&mut criterion);
    benchmark_reassemble(&mut criterion);
    criterion.final_summary();
}
