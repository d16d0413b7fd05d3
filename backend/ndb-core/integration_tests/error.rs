use ndb_core::error::discovery::DiscoveryError;
use ndb_core::error::session::SessionError;

use common::{ErrorLocation, HttpStatusCode};

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;

/// **VALUE**: Session errors report where they were raised.
///
/// **WHY THIS MATTERS**: The entry point prints the error once and exits; the
/// location is the only pointer to which loop and which step failed.
///
/// **BUG THIS CATCHES**: Would catch a constructor losing `#[track_caller]`,
/// which would make every error point into the error module itself.
#[test]
fn given_session_error_constructor_when_formatted_then_points_at_caller() {
    // GIVEN: An error built here
    let err = SessionError::transport_read("Channel closed");

    // WHEN: Formatting it
    let text = err.to_string();

    // THEN: Category, message and this file's location are present
    assert!(text.contains("Transport Read Error"));
    assert!(text.contains("Channel closed"));
    assert!(text.contains("error.rs"), "location missing in: {text}");
    assert_eq!(err.category(), "transport_read");
}

#[test]
fn given_each_session_error_kind_then_category_matches() {
    assert_eq!(SessionError::decode("x").category(), "decode");
    assert_eq!(SessionError::input("x").category(), "input");
}

#[test]
fn given_http_discovery_error_when_inspected_then_preserves_source_chain() {
    // GIVEN: A discovery error wrapping an IO failure
    let err = DiscoveryError::Http {
        message: String::from("connect failed"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::ConnectionRefused, "refused")),
    };

    // WHEN: Walking to the source
    let source = err.source();

    // THEN: The underlying error is still there
    assert!(source.is_some());
    assert!(source.unwrap().to_string().contains("refused"));
    assert_eq!(err.status_code(), None);
}

#[test]
fn given_status_error_when_formatted_then_shows_code() {
    let err = DiscoveryError::Status {
        message: String::from("gone"),
        status_code: HttpStatusCode(404),
        location: ErrorLocation::from(Location::caller()),
    };

    assert!(err.to_string().contains("HTTP 404"));
    assert_eq!(err.status_code(), Some(404));
}
