use videoroom_core::{JoinOptions, SessionState};
use videoroom_session::SessionError;

use crate::integration::{TestSession, init_tracing};
use crate::utils::{JoinBehavior, MockSignaling, MockTransportFactory};

#[tokio::test]
async fn test_join_failure_creates_no_transport() {
    init_tracing();

    let session = TestSession::with(
        MockSignaling::new(JoinBehavior::Fail("No such feed".into())),
        MockTransportFactory::new(),
    );

    let err = session
        .subscriber
        .start(JoinOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Signaling { op: "join", .. }));
    assert!(err.to_string().contains("No such feed"));
    assert_eq!(session.subscriber.state().await, SessionState::Failed);
    assert_eq!(session.factory.created().await, 0);
    assert_eq!(session.signaling.start_count().await, 0);
}

#[tokio::test]
async fn test_failed_start_cancels_session() {
    init_tracing();

    let session = TestSession::with(
        MockSignaling::new(JoinBehavior::Fail("No such room".into())),
        MockTransportFactory::new(),
    );

    assert!(session
        .subscriber
        .start(JoinOptions::default())
        .await
        .is_err());

    assert_eq!(session.subscriber.state().await, SessionState::Failed);
    assert!(session.subscriber.cancel_token().is_cancelled());
}

#[tokio::test]
async fn test_missing_offer_is_negotiation_error() {
    init_tracing();

    let session = TestSession::with(
        MockSignaling::new(JoinBehavior::NoOffer),
        MockTransportFactory::new(),
    );

    let err = session
        .subscriber
        .start(JoinOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Negotiation(_)));
    assert_eq!(session.subscriber.state().await, SessionState::Failed);
    assert_eq!(session.factory.created().await, 0);
}

#[tokio::test]
async fn test_transport_creation_failure() {
    init_tracing();

    let session = TestSession::with(
        MockSignaling::new(JoinBehavior::default()),
        MockTransportFactory::failing(),
    );

    let err = session
        .subscriber
        .start(JoinOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SessionError::Transport {
            op: "create_peer",
            ..
        }
    ));
    assert_eq!(session.subscriber.state().await, SessionState::Failed);
    assert_eq!(session.signaling.start_count().await, 0);
}

#[tokio::test]
async fn test_rejected_start_closes_transport() {
    init_tracing();

    let session = TestSession::with(MockSignaling::failing_commands(), MockTransportFactory::new());

    let err = session
        .subscriber
        .start(JoinOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Signaling { op: "start", .. }));
    assert_eq!(session.subscriber.state().await, SessionState::Failed);
    assert_eq!(session.factory.peer().await.close_count(), 1);
}
