//! The session manager running over the `PostgreSQL` store.

use std::sync::Arc;
use std::time::Duration;

use super::helpers::{BoxError, prepared_store, session_id};
use colloquy::session::{
    adapters::memory::RecordingAlertSink,
    domain::{AlertPolicy, Message, Role, Session, SessionLimits},
    ports::store::SessionStore,
    services::{AlertDispatcher, ErrorKind, SessionManager},
};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manager_fills_alerts_and_archives_a_stored_session() -> Result<(), BoxError> {
    let prepared = prepared_store(2).await?;
    let id = session_id("pg-manager-fill")?;
    prepared
        .store
        .create(&Session::new(id.clone(), &DefaultClock))
        .await?;
    let sink = RecordingAlertSink::new();
    let (alerts, worker) =
        AlertDispatcher::spawn(Arc::new(sink.clone()), 8, Duration::from_secs(1));
    let limits = SessionLimits::try_new(4, 0.75, AlertPolicy::EveryAppend)?;
    let manager = SessionManager::new(
        Arc::new(prepared.store.clone()),
        Arc::new(DefaultClock),
        limits,
        alerts,
    );

    for turn in 1..=4 {
        let message = Message::new(Role::Originator, format!("turn {turn}"), &DefaultClock);
        let stored = manager.append_message(&id, message).await?;
        assert_eq!(stored.message_count(), turn);
    }
    let overflow = manager
        .append_message(&id, Message::new(Role::Originator, "turn 5", &DefaultClock))
        .await
        .expect_err("the ceiling is four messages");
    let archived = manager.archive_session(&id).await?;
    let closed = manager
        .append_message(&id, Message::new(Role::Originator, "late", &DefaultClock))
        .await
        .expect_err("archived sessions accept nothing");
    drop(manager);
    worker.await?;

    assert_eq!(overflow.kind(), ErrorKind::LimitExceeded);
    assert_eq!(closed.kind(), ErrorKind::Archived);
    assert!(archived.is_archived());
    assert_eq!(archived.message_count(), 4);
    let usages: Vec<_> = sink.alerts().iter().map(|alert| alert.usage()).collect();
    assert_eq!(usages, vec![(3, 4), (4, 4)]);
    Ok(())
}
