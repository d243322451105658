//! Scans over message histories built from fixtures.

use std::collections::HashSet;

use chunkpost::{
    DownloadRegistry,
    GroupDefect,
    chunk::ChunkIndex,
    host::{MessageId, UserId},
};
use chunkpost_testing::chunk_message;
use rstest::rstest;

#[rstest]
#[case::sent_order(&[1, 4, 2, 3])]
#[case::reversed(&[3, 2, 4, 1])]
#[case::shuffled(&[2, 3, 1, 4])]
fn report_group_is_ready_whatever_the_listing_order(#[case] order: &[u64]) {
    let all = [
        chunk_message(1, 10, &["0-2_report.pdf.dlfc"]),
        chunk_message(2, 20, &["1-2_report.pdf.dlfc"]),
        chunk_message(3, 30, &["2-2_report.pdf.dlfc"]),
        chunk_message(4, 15, &["screenshot.png"]),
    ];
    let messages: Vec<_> = order
        .iter()
        .map(|id| all[usize::try_from(id - 1).expect("small id")].clone())
        .collect();

    let scan = DownloadRegistry::new().scan(&messages);
    assert_eq!(scan.ready().len(), 1);
    let group = &scan.ready()[0];
    assert_eq!(group.primary_message(), Some(MessageId::new(1)));
    assert_eq!(group.owner(), UserId::new(1));
    assert_eq!(
        scan.hidden_messages(),
        HashSet::from([MessageId::new(2), MessageId::new(3)])
    );
}

#[test]
fn missing_middle_chunk_leaves_group_incomplete() {
    let messages = [
        chunk_message(1, 1, &["0-4_set.tar.dlfc", "1-4_set.tar.dlfc"]),
        chunk_message(2, 2, &["3-4_set.tar.dlfc", "4-4_set.tar.dlfc"]),
    ];
    let scan = DownloadRegistry::new().scan(&messages);

    assert!(scan.ready().is_empty());
    assert!(scan.hidden_messages().is_empty());
    let incomplete = scan
        .incomplete_for_message(MessageId::new(1))
        .expect("incomplete");
    assert!(matches!(
        incomplete.defect(),
        GroupDefect::MissingChunks { missing, total: 5 } if missing == &[ChunkIndex::new(2)]
    ));
}

#[test]
fn reupload_after_partial_upload_completes_the_newest_copy() {
    let messages = [
        chunk_message(1, 1, &["0-1_doc.txt.dlfc"]),
        chunk_message(2, 2, &["0-1_doc.txt.dlfc"]),
        chunk_message(3, 3, &["1-1_doc.txt.dlfc"]),
    ];
    let scan = DownloadRegistry::new().scan(&messages);

    let ready = scan.group_for_message(MessageId::new(3)).expect("ready");
    assert_eq!(ready.primary_message(), Some(MessageId::new(2)));
    assert_eq!(scan.incomplete().len(), 1);
    assert!(scan.incomplete_for_message(MessageId::new(1)).is_some());
}

#[test]
fn plain_attachments_are_untouched() {
    let messages = [
        chunk_message(1, 1, &["holiday.jpg"]),
        chunk_message(2, 2, &["notes.dlfc", "0-0_.dlfc"]),
    ];
    let registry = DownloadRegistry::new();
    let scan = registry.scan(&messages);

    assert!(scan.ready().is_empty());
    assert!(scan.incomplete().is_empty());
    assert!(registry.is_skipped(MessageId::new(1)));
    assert!(registry.is_skipped(MessageId::new(2)));
}
