use crate::helpers::{inspector_config_for, mock_discovery};

use ndb_core::config::InspectorConfig;
use ndb_core::discovery::TargetLocator;
use ndb_core::error::discovery::DiscoveryError;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **VALUE**: The first listed target is the one the session attaches to.
///
/// **BUG THIS CATCHES**: Would catch picking the last target or dropping the
/// debugger URL while decoding.
#[tokio::test]
async fn given_several_targets_when_locating_then_returns_first() {
    // GIVEN: A discovery endpoint listing two targets
    let server = mock_discovery(json!([
        { "url": "file:///a.js", "webSocketDebuggerUrl": "ws://127.0.0.1:9229/a" },
        { "url": "file:///b.js", "webSocketDebuggerUrl": "ws://127.0.0.1:9229/b" }
    ]))
    .await;
    let locator = TargetLocator::new(&inspector_config_for(&server)).unwrap();

    // WHEN: Locating
    let target = locator.locate().await.unwrap();

    // THEN: The first target wins
    assert_eq!(target.url, "file:///a.js");
    assert_eq!(target.web_socket_debugger_url, "ws://127.0.0.1:9229/a");
}

#[tokio::test]
async fn given_empty_target_list_when_locating_then_no_targets_error() {
    let server = mock_discovery(json!([])).await;
    let locator = TargetLocator::new(&inspector_config_for(&server)).unwrap();

    let result = locator.locate().await;

    assert!(matches!(result, Err(DiscoveryError::NoTargets { .. })));
}

#[tokio::test]
async fn given_server_error_when_locating_then_status_error_keeps_code() {
    // GIVEN: A discovery endpoint that fails
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("inspector exploded"))
        .mount(&server)
        .await;
    let locator = TargetLocator::new(&inspector_config_for(&server)).unwrap();

    // WHEN: Locating
    let err = locator.locate().await.unwrap_err();

    // THEN: The status code is preserved
    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("inspector exploded"));
}

#[tokio::test]
async fn given_non_json_body_when_locating_then_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not here</html>"))
        .mount(&server)
        .await;
    let locator = TargetLocator::new(&inspector_config_for(&server)).unwrap();

    let result = locator.list_targets().await;

    assert!(matches!(result, Err(DiscoveryError::Decode { .. })));
}

#[tokio::test]
async fn given_nothing_listening_when_locating_then_http_error() {
    // GIVEN: A port nothing listens on
    let config = InspectorConfig {
        port: 1,
        request_timeout_secs: 2,
        ..InspectorConfig::default()
    };
    let locator = TargetLocator::new(&config).unwrap();

    // WHEN: Locating
    let result = locator.locate().await;

    // THEN: The request itself failed
    assert!(matches!(result, Err(DiscoveryError::Http { .. })));
}

#[test]
fn given_custom_path_when_building_locator_then_url_is_normalized() {
    let config = InspectorConfig {
        host: String::from("localhost"),
        port: 9333,
        discovery_path: String::from("/json/list"),
        ..InspectorConfig::default()
    };

    let locator = TargetLocator::new(&config).unwrap();

    assert_eq!(
        locator.discovery_url().as_str(),
        "http://localhost:9333/json/list"
    );
}
