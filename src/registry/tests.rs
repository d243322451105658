//! Unit tests for grouping and validation of chunk attachments.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rstest::rstest;

use super::*;
use crate::{
    chunk::ChunkIndex,
    host::{Attachment, AttachmentId, ChannelId, Message, MessageId, UserId},
};

fn at(secs: u64) -> SystemTime { UNIX_EPOCH + Duration::from_secs(secs) }

fn message(id: u64, secs: u64, files: &[&str]) -> Message {
    Message {
        id: MessageId::new(id),
        channel: ChannelId::new(1),
        timestamp: at(secs),
        author: UserId::new(100 + id),
        attachments: files
            .iter()
            .enumerate()
            .map(|(n, name)| Attachment {
                id: AttachmentId::new(id * 10 + n as u64),
                filename: (*name).to_owned(),
                url: format!("mem://{id}/{name}"),
                size: 1_000_000,
            })
            .collect(),
    }
}

#[test]
fn report_scenario_yields_one_ready_group() {
    let messages = vec![
        message(2, 20, &["1-2_report.pdf.dlfc"]),
        message(3, 30, &["2-2_report.pdf.dlfc"]),
        message(1, 10, &["0-2_report.pdf.dlfc"]),
    ];
    let scan = DownloadRegistry::new().scan(&messages);

    assert!(scan.incomplete().is_empty());
    let [group] = scan.ready() else {
        panic!("expected exactly one ready group");
    };
    assert_eq!(group.filename(), "report.pdf");
    assert_eq!(group.primary_message(), Some(MessageId::new(1)));
    assert_eq!(
        group.hidden_messages().collect::<Vec<_>>(),
        [MessageId::new(2), MessageId::new(3)]
    );
    assert_eq!(group.owner(), UserId::new(101));
    assert_eq!(group.size_label(), "3.00 MB Chunk File");
    let indices: Vec<_> = group.sources().iter().map(|s| s.index.get()).collect();
    assert_eq!(indices, [0, 1, 2]);

    assert!(scan.is_hidden(MessageId::new(3)));
    assert!(!scan.is_hidden(MessageId::new(1)));
    assert_eq!(scan.hidden_messages().len(), 2);
}

#[test]
fn gap_in_coverage_is_incomplete() {
    let messages = vec![
        message(1, 1, &["0-4_a.bin.dlfc", "1-4_a.bin.dlfc"]),
        message(2, 2, &["3-4_a.bin.dlfc", "4-4_a.bin.dlfc"]),
    ];
    let scan = DownloadRegistry::new().scan(&messages);

    assert!(scan.ready().is_empty());
    let incomplete = scan
        .incomplete_for_message(MessageId::new(2))
        .expect("incomplete group");
    assert_eq!(
        incomplete.defect(),
        &GroupDefect::MissingChunks {
            missing: vec![ChunkIndex::new(2)],
            total: 5,
        }
    );
    assert_eq!(incomplete.group().messages().len(), 2);
}

#[test]
fn identical_uploads_form_separate_groups() {
    let messages = vec![
        message(1, 1, &["0-1_same.txt.dlfc", "1-1_same.txt.dlfc"]),
        message(2, 2, &["0-1_same.txt.dlfc", "1-1_same.txt.dlfc"]),
    ];
    let scan = DownloadRegistry::new().scan(&messages);

    assert_eq!(scan.ready_named("same.txt").count(), 2);
    let first = scan.group_for_message(MessageId::new(1)).expect("first");
    let second = scan.group_for_message(MessageId::new(2)).expect("second");
    assert_ne!(first.id(), second.id());
    assert!(scan.hidden_messages().is_empty());
}

#[rstest]
#[case::count_mismatch(
    &["0-2_x.dlfc", "1-3_x.dlfc", "2-2_x.dlfc"],
    GroupDefect::CountMismatch { expected: ChunkIndex::new(2), found: ChunkIndex::new(3) }
)]
#[case::index_beyond_count(
    &["0-1_x.dlfc", "1-1_x.dlfc", "5-1_x.dlfc"],
    GroupDefect::IndexOutOfRange { index: ChunkIndex::new(5), count: ChunkIndex::new(1) }
)]
fn conflicting_names_are_incomplete(#[case] files: &[&str], #[case] expected: GroupDefect) {
    let scan = DownloadRegistry::new().scan(&[message(1, 1, files)]);
    assert!(scan.ready().is_empty());
    assert_eq!(scan.incomplete().len(), 1);
    assert_eq!(scan.incomplete()[0].defect(), &expected);
}

#[test]
fn malformed_names_are_ignored() {
    let messages = vec![message(
        1,
        1,
        &["photo.png", "3_legacy.txt.dlfc", "x-1_bad.dlfc", "0-0_good.txt.dlfc"],
    )];
    let scan = DownloadRegistry::new().scan(&messages);
    assert_eq!(scan.ready().len(), 1);
    assert!(scan.incomplete().is_empty());
    assert_eq!(scan.ready()[0].filename(), "good.txt");
}

#[test]
fn messages_without_chunks_are_memoised() {
    let registry = DownloadRegistry::new();
    let plain = message(7, 1, &["photo.png"]);
    let _ = registry.scan(std::slice::from_ref(&plain));
    assert!(registry.is_skipped(MessageId::new(7)));

    // An edited message that now carries a chunk stays skipped until forgotten.
    let edited = message(7, 1, &["0-0_late.txt.dlfc"]);
    assert!(registry.scan(std::slice::from_ref(&edited)).ready().is_empty());

    registry.forget(MessageId::new(7));
    assert_eq!(registry.scan(&[edited]).ready().len(), 1);
}

#[test]
fn generations_increase_and_groups_are_rebuilt() {
    let registry = DownloadRegistry::new();
    let messages = vec![message(1, 1, &["0-0_a.dlfc"])];
    let first = registry.scan(&messages);
    let second = registry.scan(&messages);
    assert!(second.generation() > first.generation());
    assert_eq!(second.ready().len(), 1);
    assert_ne!(first.ready()[0].id(), second.ready()[0].id());
}

#[test]
fn one_message_with_many_chunks_is_listed_once() {
    let scan = DownloadRegistry::new().scan(&[message(
        1,
        1,
        &["0-2_m.dlfc", "1-2_m.dlfc", "2-2_m.dlfc"],
    )]);
    let group = &scan.ready()[0];
    assert_eq!(group.messages().len(), 1);
    assert_eq!(group.hidden_messages().count(), 0);
    assert_eq!(group.urls().count(), 3);
}
