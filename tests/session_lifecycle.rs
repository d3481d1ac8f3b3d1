//! Session lifecycle integration tests.
//!
//! Exercises the full engine flow: issue, deliver, expire, purge, reset.
//! Timing-sensitive tests run on a paused tokio clock.

use std::time::Duration;

use vapormail::config::MailboxConfig;
use vapormail::{NewMessage, SessionEngine, SessionState, VapormailError, ALLOWED_TTL_MINUTES};

fn create_engine() -> SessionEngine {
    SessionEngine::new(&MailboxConfig::default())
}

/// Wait until the session reaches the given state.
async fn wait_for_state(engine: &SessionEngine, state: SessionState) {
    let mut rx = engine.subscribe();
    tokio::time::timeout(Duration::from_secs(2 * 3600), async {
        loop {
            if rx.borrow().state == state {
                return;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for state {:?}", state));
}

#[tokio::test]
async fn test_start_session_for_all_allowed_ttls() {
    for ttl in ALLOWED_TTL_MINUTES {
        let engine = create_engine();
        let before = chrono::Utc::now();

        let ticket = engine.start(ttl).unwrap();

        // Fresh mailbox is empty
        let mailbox = engine.inbox_snapshot(&ticket.address).unwrap();
        assert!(mailbox.is_empty());

        // expires_at equals start time + TTL, within the scheduler error bound
        let expected = before + chrono::Duration::minutes(i64::from(ttl));
        let drift = (ticket.expires_at - expected).num_seconds().abs();
        assert!(drift <= 1, "ttl {ttl}: drift {drift}s");
    }
}

#[tokio::test]
async fn test_invalid_ttl_rejected_without_side_effects() {
    let engine = create_engine();

    let result = engine.start(42);
    assert!(matches!(result, Err(VapormailError::InvalidDuration(42))));
    assert_eq!(engine.snapshot().state, SessionState::Idle);
    assert!(engine.snapshot().address.is_none());
}

#[tokio::test]
async fn test_messages_arrive_in_order() {
    let engine = create_engine();
    let ticket = engine.start(10).unwrap();

    for i in 0..5 {
        engine
            .deliver(
                &ticket.address,
                NewMessage::new("sender@example.com", format!("message {i}"), "body"),
            )
            .unwrap();
    }

    let mailbox = engine.inbox_snapshot(&ticket.address).unwrap();
    assert_eq!(mailbox.len(), 5);

    let ids: Vec<_> = mailbox.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    let subjects: Vec<_> = mailbox
        .messages()
        .iter()
        .map(|m| m.subject.as_str())
        .collect();
    assert_eq!(
        subjects,
        vec!["message 0", "message 1", "message 2", "message 3", "message 4"]
    );
}

#[tokio::test]
async fn test_mark_read_is_idempotent() {
    let engine = create_engine();
    let ticket = engine.start(10).unwrap();

    let delivered = engine
        .deliver(&ticket.address, NewMessage::new("a@x.com", "subject", "body"))
        .unwrap();

    engine.mark_read(&ticket.address, delivered.id).unwrap();
    engine.mark_read(&ticket.address, delivered.id).unwrap();

    let mailbox = engine.inbox_snapshot(&ticket.address).unwrap();
    assert!(mailbox.message(delivered.id).unwrap().is_read);
    assert_eq!(mailbox.unread_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_expiration_is_total() {
    let engine = create_engine();
    let ticket = engine.start(10).unwrap();

    let delivered = engine
        .deliver(
            &ticket.address,
            NewMessage::new("secret@example.com", "confidential", "do not keep this"),
        )
        .unwrap();

    wait_for_state(&engine, SessionState::Expired).await;

    // No prior message content is recoverable by any call
    assert!(matches!(
        engine.inbox_snapshot(&ticket.address),
        Err(VapormailError::MailboxNotFound)
    ));
    assert!(matches!(
        engine.message(&ticket.address, delivered.id),
        Err(VapormailError::MailboxNotFound)
    ));
    assert!(matches!(
        engine.mark_read(&ticket.address, delivered.id),
        Err(VapormailError::MailboxNotFound)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_delivery_after_expiry_rejected() {
    let engine = create_engine();
    let ticket = engine.start(10).unwrap();

    wait_for_state(&engine, SessionState::Expired).await;

    let result = engine.deliver(
        &ticket.address,
        NewMessage::new("late@example.com", "too late", "body"),
    );
    assert!(matches!(result, Err(VapormailError::MailboxNotFound)));

    // Nothing was queued or stored
    assert!(engine.inbox_snapshot(&ticket.address).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_expired_session_resets_to_idle() {
    let engine = create_engine();
    engine.start(10).unwrap();

    wait_for_state(&engine, SessionState::Expired).await;
    wait_for_state(&engine, SessionState::Idle).await;

    let snapshot = engine.snapshot();
    assert!(snapshot.address.is_none());
    assert!(snapshot.expires_at.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_session_can_restart_after_expiry() {
    let engine = create_engine();
    let first = engine.start(10).unwrap();

    wait_for_state(&engine, SessionState::Idle).await;

    let second = engine.start(30).unwrap();
    assert_ne!(first.address, second.address);
    assert!(engine.inbox_snapshot(&second.address).unwrap().is_empty());
}

#[tokio::test]
async fn test_new_session_abandons_previous_mailbox() {
    let engine = create_engine();

    let first = engine.start(10).unwrap();
    engine
        .deliver(&first.address, NewMessage::new("a@x.com", "old mail", "body"))
        .unwrap();

    let second = engine.start(60).unwrap();

    // The old address is unconditionally unreachable
    assert!(matches!(
        engine.inbox_snapshot(&first.address),
        Err(VapormailError::MailboxNotFound)
    ));
    assert!(matches!(
        engine.deliver(&first.address, NewMessage::new("a@x.com", "s", "b")),
        Err(VapormailError::MailboxNotFound)
    ));

    // The new one is live, empty, and active
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.state, SessionState::Active);
    assert_eq!(snapshot.address.as_deref(), Some(second.address.as_str()));
    assert!(engine.inbox_snapshot(&second.address).unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_timer_never_disturbs_new_session() {
    let engine = create_engine();

    engine.start(10).unwrap();
    let second = engine.start(60).unwrap();

    // Run past the abandoned 10-minute deadline; the 60-minute session
    // must still be active.
    tokio::time::sleep(Duration::from_secs(20 * 60)).await;

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.state, SessionState::Active);
    assert_eq!(snapshot.address.as_deref(), Some(second.address.as_str()));
    assert!(engine.inbox_snapshot(&second.address).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_lifecycle_notifications_reach_subscriber() {
    let engine = create_engine();
    let mut rx = engine.subscribe();

    engine.start(10).unwrap();

    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2 * 3600);
    while seen.last() != Some(&SessionState::Idle) {
        tokio::time::timeout_at(deadline, rx.changed())
            .await
            .expect("lifecycle stalled")
            .unwrap();
        let state = rx.borrow().state;
        if seen.last() != Some(&state) {
            seen.push(state);
        }
    }

    // The subscriber observes expiry and the reset offer
    assert!(seen.contains(&SessionState::Active));
    assert!(seen.contains(&SessionState::Expired));
    assert_eq!(seen.last(), Some(&SessionState::Idle));
}
