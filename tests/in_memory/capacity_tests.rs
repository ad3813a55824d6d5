//! Ceiling enforcement and threshold alert tests.

use super::helpers::{
    TestError, drain, manager_for, originator, seed_session, session_id, sink, small_limits,
    store,
};
use colloquy::session::{
    adapters::memory::{InMemorySessionStore, RecordingAlertSink},
    domain::{AlertPolicy, AlertSeverity, SessionId},
    services::{ErrorKind, SessionManagerError},
};
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn filling_a_session_alerts_from_the_threshold_onwards(
    store: InMemorySessionStore,
    sink: RecordingAlertSink,
    session_id: SessionId,
) -> Result<(), TestError> {
    seed_session(&store, &session_id, 0).await?;
    let (manager, worker) = manager_for(&store, &sink, small_limits(10)?);

    for turn in 1..=10 {
        let session = manager
            .append_message(&session_id, originator(&format!("turn {turn}")))
            .await?;
        assert_eq!(session.message_count(), turn);
    }
    let overflow = manager
        .append_message(&session_id, originator("turn 11"))
        .await
        .expect_err("the eleventh append exceeds the ceiling");
    drain(manager, worker).await?;

    assert!(matches!(
        overflow,
        SessionManagerError::LimitExceeded {
            max_messages: 10,
            ..
        }
    ));
    let usages: Vec<_> = sink.alerts().iter().map(|alert| alert.usage()).collect();
    assert_eq!(usages, vec![(9, 10), (10, 10)]);
    assert!(
        sink.alerts()
            .iter()
            .all(|alert| alert.severity() == AlertSeverity::Warning
                && alert.session_id() == &session_id)
    );
    assert_eq!(store.write_count(), 10);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn on_crossing_policy_alerts_once_per_fill(
    store: InMemorySessionStore,
    sink: RecordingAlertSink,
    session_id: SessionId,
) -> Result<(), TestError> {
    seed_session(&store, &session_id, 0).await?;
    let limits = small_limits(10)?.with_policy(AlertPolicy::OnCrossing);
    let (manager, worker) = manager_for(&store, &sink, limits);

    for turn in 1..=10 {
        manager
            .append_message(&session_id, originator(&format!("turn {turn}")))
            .await?;
    }
    drain(manager, worker).await?;

    let alerts = sink.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(
        alerts.first().map(|alert| alert.message()),
        Some(format!("session {session_id} holds 9 of 10 messages"))
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn full_session_can_still_be_read_and_archived(
    store: InMemorySessionStore,
    sink: RecordingAlertSink,
    session_id: SessionId,
) -> Result<(), TestError> {
    seed_session(&store, &session_id, 3).await?;
    let (manager, worker) = manager_for(&store, &sink, small_limits(3)?);

    let rejected = manager
        .append_message(&session_id, originator("no room"))
        .await
        .expect_err("session is already full");
    let archived = manager.archive_session(&session_id).await?;
    let closed = manager
        .append_message(&session_id, originator("still no room"))
        .await
        .expect_err("archived takes precedence over the ceiling");

    assert_eq!(rejected.kind(), ErrorKind::LimitExceeded);
    assert_eq!(archived.message_count(), 3);
    assert_eq!(closed.kind(), ErrorKind::Archived);
    drain(manager, worker).await?;
    assert!(sink.is_empty());
    Ok(())
}
