//! Generated round-trip checks for splitting and reassembly.

use std::num::NonZeroUsize;

use chunkpost::{
    ReassemblyError,
    UploadSplitter,
    chunk::{ChunkIndex, chunk_count_for, split_payload},
    reassemble,
};
use proptest::{
    collection::vec,
    prelude::*,
    test_runner::{Config as ProptestConfig, RngAlgorithm, TestRng, TestRunner},
};
use rstest::rstest;

fn deterministic_runner(cases: u32) -> TestRunner {
    let config = ProptestConfig {
        cases,
        ..ProptestConfig::default()
    };
    let rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
    TestRunner::new_with_rng(config, rng)
}

/// A payload cap, a file that fits in at most 256 chunks of that cap, and a
/// delivery order for the chunks.
fn shuffled_file_strategy() -> impl Strategy<Value = (usize, Vec<u8>, Vec<usize>)> {
    (1usize..=48)
        .prop_flat_map(|cap| (Just(cap), vec(any::<u8>(), 0..=cap * 256)))
        .prop_flat_map(|(cap, data)| {
            let count = data.len().div_ceil(cap).max(1);
            let order = Just((0..count).collect::<Vec<_>>()).prop_shuffle();
            (Just(cap), Just(data), order)
        })
}

#[rstest]
#[case(96)]
#[case(160)]
fn split_slices_concatenate_to_input(#[case] cases: u32) {
    let mut runner = deterministic_runner(cases);
    let strategy = (vec(any::<u8>(), 0..4_096), 1usize..512);

    runner
        .run(&strategy, |(data, cap)| {
            let cap = NonZeroUsize::new(cap).expect("strategy yields non-zero caps");
            let slices = split_payload(&data, cap);
            prop_assert_eq!(slices.len(), chunk_count_for(data.len(), cap));
            prop_assert!(slices.iter().all(|s| s.len() <= cap.get()));
            prop_assert_eq!(slices.concat(), data);
            Ok(())
        })
        .expect("split slices should concatenate to the input");
}

#[rstest]
#[case(64)]
#[case(128)]
fn chunk_sets_reassemble_in_any_order(#[case] cases: u32) {
    let mut runner = deterministic_runner(cases);

    runner
        .run(&shuffled_file_strategy(), |(cap, data, order)| {
            let splitter = UploadSplitter::new(cap + 4).expect("usable limit");
            let set = splitter.split("file.bin", &data).expect("at most 256 chunks");
            prop_assert_eq!(set.len(), order.len());

            let shuffled: Vec<_> = order
                .iter()
                .map(|&i| set.blobs()[i].bytes().clone())
                .collect();
            prop_assert_eq!(reassemble(&shuffled).expect("complete set"), data);
            Ok(())
        })
        .expect("chunk sets should reassemble regardless of order");
}

#[rstest]
#[case(48)]
fn dropping_a_chunk_reports_it_missing(#[case] cases: u32) {
    let mut runner = deterministic_runner(cases);
    let strategy = (2usize..=40).prop_flat_map(|count| (Just(count), 0..count));

    runner
        .run(&strategy, |(count, dropped)| {
            let splitter = UploadSplitter::new(5).expect("one byte per chunk");
            let data: Vec<u8> = (0..count).map(|i| i as u8).collect();
            let mut blobs: Vec<_> = splitter
                .split("gap.bin", &data)
                .expect("split")
                .into_blobs()
                .into_iter()
                .map(|b| b.bytes().clone())
                .collect();
            blobs.remove(dropped);

            prop_assert_eq!(
                reassemble(&blobs),
                Err(ReassemblyError::MissingChunks {
                    missing: vec![ChunkIndex::new(dropped as u8)],
                    expected: count,
                })
            );
            Ok(())
        })
        .expect("a dropped chunk should be reported missing");
}

#[test]
fn zero_length_file_round_trips() {
    let splitter = UploadSplitter::new(100).expect("usable limit");
    let set = splitter.split("empty", &[]).expect("split");
    assert_eq!(set.len(), 1);
    let buffers: Vec<_> = set.blobs().iter().map(|b| b.bytes().clone()).collect();
    assert_eq!(reassemble(&buffers).expect("reassemble"), Vec::<u8>::new());
}
