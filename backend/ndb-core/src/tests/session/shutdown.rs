// Unit tests for termination signalling

use crate::error::session::SessionError;
use crate::session::shutdown::{self, Termination};

use std::time::Duration;

#[tokio::test]
async fn given_exit_request_when_watching_then_clean_exit() {
    let (signal, watch) = shutdown::channel();

    signal.request_exit();

    assert!(watch.wait().await.is_clean());
}

/// **VALUE**: Only the first error is observed, and a second sender never blocks.
///
/// **WHY THIS MATTERS**: Both loops can fail at nearly the same time (the
/// channel drops while input is also closing). The late loop must still be
/// able to exit.
///
/// **BUG THIS CATCHES**: Would catch a blocking `send` on a full slot, which
/// would hang the second failing loop forever.
#[tokio::test]
async fn given_two_errors_when_reported_then_first_wins_and_second_does_not_block() {
    // GIVEN: A shutdown channel with two clones of the signal
    let (signal, watch) = shutdown::channel();
    let other = signal.clone();

    // WHEN: Both report errors
    let reported = tokio::time::timeout(Duration::from_secs(1), async {
        signal.report_error(SessionError::transport_read("first"));
        other.report_error(SessionError::input("second"));
    })
    .await;

    // THEN: Neither call blocked
    assert!(reported.is_ok(), "report_error must not block");

    // AND: The first error is the one observed
    match watch.wait().await {
        Termination::Failed(SessionError::TransportRead { message, .. }) => {
            assert_eq!(message, "first")
        }
        other => panic!("Expected first error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_watch_dropped_when_signalling_then_does_not_panic() {
    let (signal, watch) = shutdown::channel();
    drop(watch);

    signal.request_exit();
    signal.report_error(SessionError::decode("late"));
}

#[tokio::test]
async fn given_all_signals_dropped_when_watching_then_reports_failure() {
    let (signal, watch) = shutdown::channel();
    drop(signal);

    assert!(matches!(watch.wait().await, Termination::Failed(_)));
}
