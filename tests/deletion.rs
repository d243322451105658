//! Tests for staggered deletion of chunk messages.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use chunkpost::{
    ChunkSession,
    DeletionError,
    Settings,
    deletion::{delete_staggered, plan_deletion},
    host::{ChannelId, MessageId, UserId},
};
use chunkpost_testing::{InMemoryHost, chunk_message, host};
use rstest::rstest;
use tokio::time::Instant;

const CHANNEL: ChannelId = ChannelId::new(3);

/// Upload a file split across three messages and scan it back.
async fn three_message_upload(host: &Arc<InMemoryHost>) -> ChunkSession {
    let settings = Settings::builder()
        .upload_batch_size(1)
        .deletion_delay_secs(6)
        .build()
        .expect("settings");
    let session = ChunkSession::new(settings, host.capabilities());
    session
        .upload("movie.mkv", Bytes::from(vec![5_u8; 2_500]), CHANNEL)
        .await
        .expect("upload");
    let scan = session.refresh(CHANNEL).await.expect("refresh");
    assert_eq!(scan.ready()[0].messages().len(), 3);
    session
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn owner_deletes_newest_first_with_delays(host: Arc<InMemoryHost>) {
    let session = three_message_upload(&host).await;
    let group = session.latest_scan().ready()[0].clone();
    let ids: Vec<_> = group.messages().iter().map(|m| m.id).collect();

    let started = Instant::now();
    let report = session
        .delete_download(&group, None)
        .await
        .expect("owner may delete");

    assert!(report.is_complete());
    assert_eq!(report.deleted, [ids[2], ids[1], ids[0]]);
    let deletions = host.deletions();
    assert!(deletions[0].at.duration_since(started) >= Duration::from_secs(6));
    for pair in deletions.windows(2) {
        assert!(pair[1].at.duration_since(pair[0].at) >= Duration::from_secs(6));
    }
    assert!(host.messages().is_empty());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn strangers_may_not_delete(host: Arc<InMemoryHost>) {
    let session = three_message_upload(&host).await;
    let group = session.latest_scan().ready()[0].clone();
    host.set_current_user(Some(UserId::new(42)));

    assert!(!session.can_delete(&group));
    let err = session
        .delete_download(&group, None)
        .await
        .expect_err("not permitted");
    assert!(matches!(err, DeletionError::NotPermitted { .. }));
    assert!(host.deletions().is_empty());

    host.set_manager(true);
    assert!(session.can_delete(&group));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn deleting_one_message_cascades_to_its_siblings(host: Arc<InMemoryHost>) {
    let session = three_message_upload(&host).await;
    let group = session.latest_scan().ready()[0].clone();
    let primary = group.primary_message().expect("primary");

    let report = session
        .on_message_deleted(primary)
        .await
        .expect("cascade runs");
    assert_eq!(report.deleted.len(), 2);
    assert!(!report.deleted.contains(&primary));
    assert!(host.deletions().iter().all(|d| d.message != primary));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn unrelated_deletions_do_not_cascade(host: Arc<InMemoryHost>) {
    let session = three_message_upload(&host).await;
    assert!(session.on_message_deleted(MessageId::new(9_999)).await.is_none());
    assert!(host.deletions().is_empty());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn failures_do_not_stop_the_run(host: Arc<InMemoryHost>) {
    let session = three_message_upload(&host).await;
    let group = session.latest_scan().ready()[0].clone();
    let targets = plan_deletion(&group, None);
    host.fail_delete(targets[1]);

    let report = delete_staggered(
        host.as_ref(),
        CHANNEL,
        targets.clone(),
        Duration::from_secs(6),
    )
    .await;
    assert_eq!(report.failed, [targets[1]]);
    assert_eq!(report.deleted, [targets[0], targets[2]]);
    assert!(!report.is_complete());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn plan_skips_the_excluded_message(host: Arc<InMemoryHost>) {
    let session = three_message_upload(&host).await;
    let group = session.latest_scan().ready()[0].clone();
    let middle = group.messages()[1].id;

    let plan = plan_deletion(&group, Some(middle));
    assert_eq!(plan.len(), 2);
    assert!(!plan.contains(&middle));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn deleted_messages_leave_the_skip_memo(host: Arc<InMemoryHost>) {
    let mut plain = chunk_message(500, 500, &["notes.txt"]);
    plain.channel = CHANNEL;
    host.push_message(plain);
    let session = three_message_upload(&host).await;
    let skipped = MessageId::new(500);
    assert!(session.registry().is_skipped(skipped));

    assert!(session.on_message_deleted(skipped).await.is_none());
    assert!(!session.registry().is_skipped(skipped));
}
