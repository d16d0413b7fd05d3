// Unit tests for session state: id allocation, correlation, script log

use crate::protocol::ScriptRecord;
use crate::session::state::SessionState;

const INTERNAL: &str = "node:internal";

/// **VALUE**: Correlation ids start at 1 and strictly increase.
///
/// **WHY THIS MATTERS**: Replies are matched to requests by id alone. A repeated
/// id would route a reply to the wrong request.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one start (0 is treated as
/// "no id" on the wire) or a counter that resets after resolution.
#[tokio::test]
async fn given_fresh_state_when_allocating_then_ids_count_up_from_one() {
    // GIVEN: A fresh session state
    let state = SessionState::new(INTERNAL);

    // WHEN: Allocating several ids, resolving some in between
    let mut ids = Vec::new();
    for _ in 0..5 {
        let id = state.allocate().await;
        state.register(id, "Runtime.enable").await;
        state.resolve(id).await;
        ids.push(id);
    }

    // THEN: Ids are 1..=5 with no repeats
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn given_issued_request_when_resolved_then_returns_it_and_evicts() {
    // GIVEN: One issued request
    let state = SessionState::new(INTERNAL);
    let issued = state.issue("Debugger.getScriptSource").await;
    assert_eq!(state.pending_count().await, 1);

    // WHEN: Resolving it twice
    let first = state.resolve(issued.id).await;
    let second = state.resolve(issued.id).await;

    // THEN: The first lookup finds it, the second does not
    assert_eq!(first, Some(issued));
    assert_eq!(second, None);
    assert_eq!(state.pending_count().await, 0);
}

/// **VALUE**: Replies for ids the session never issued are reported as absent.
///
/// **BUG THIS CATCHES**: Would catch a registry that fabricates entries or
/// panics on a missing key.
#[tokio::test]
async fn given_unknown_id_when_resolved_then_not_found() {
    let state = SessionState::new(INTERNAL);
    state.issue("Debugger.enable").await;

    assert_eq!(state.resolve(99).await, None);
    assert_eq!(state.pending_count().await, 1, "Known request must stay pending");
}

#[tokio::test]
async fn given_concurrent_issuers_when_issuing_then_every_id_is_unique() {
    // GIVEN: Several tasks sharing one state
    let state = SessionState::new(INTERNAL);

    // WHEN: Each issues requests concurrently
    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for _ in 0..25 {
                ids.push(state.issue("Runtime.enable").await.id);
            }
            ids
        }));
    }

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.await.unwrap());
    }

    // THEN: 200 distinct ids covering 1..=200
    all.sort_unstable();
    assert_eq!(all, (1..=200).collect::<Vec<u64>>());
    assert_eq!(state.pending_count().await, 200);
}

#[tokio::test]
async fn given_recorded_scripts_when_listing_then_preserves_discovery_order() {
    // GIVEN: Two scripts recorded in order
    let state = SessionState::new(INTERNAL);
    state.record_script(ScriptRecord::new("1", "app.js")).await;
    state.record_script(ScriptRecord::new("2", "lib.js")).await;

    // WHEN: Listing
    let listing = state.list_scripts(false).await;

    // THEN: Same order as recorded
    let ids: Vec<&str> = listing.iter().map(|s| s.script_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

/// **VALUE**: Internal runtime scripts are hidden unless explicitly requested.
///
/// **WHY THIS MATTERS**: A node process parses hundreds of `node:internal/*`
/// modules; without filtering the operator's own files are lost in the noise.
#[tokio::test]
async fn given_internal_and_user_scripts_when_listing_then_filters_by_prefix() {
    // GIVEN: A mix of internal and user scripts
    let state = SessionState::new(INTERNAL);
    state
        .record_script(ScriptRecord::new("10", "node:internal/main/run_main_module"))
        .await;
    state.record_script(ScriptRecord::new("11", "file:///app/main.js")).await;
    state.record_script(ScriptRecord::new("12", "node:internal/timers")).await;

    // WHEN: Listing with and without internal scripts
    let filtered = state.list_scripts(false).await;
    let everything = state.list_scripts(true).await;

    // THEN: The filtered listing holds only the user script
    let filtered_ids: Vec<&str> = filtered.iter().map(|s| s.script_id.as_str()).collect();
    assert_eq!(filtered_ids, vec!["11"]);

    // AND: The full listing holds all three in order
    let all_ids: Vec<&str> = everything.iter().map(|s| s.script_id.as_str()).collect();
    assert_eq!(all_ids, vec!["10", "11", "12"]);
}

#[tokio::test]
async fn given_duplicate_script_ids_when_recorded_then_both_are_kept() {
    let state = SessionState::new(INTERNAL);
    state.record_script(ScriptRecord::new("7", "a.js")).await;
    state.record_script(ScriptRecord::new("7", "a.js")).await;

    assert_eq!(state.script_count().await, 2);
}

#[tokio::test]
async fn given_listing_when_iterated_twice_then_yields_same_records() {
    // GIVEN: A listing taken once
    let state = SessionState::new(INTERNAL);
    state.record_script(ScriptRecord::new("1", "app.js")).await;
    let listing = state.list_scripts(false).await;

    // WHEN: Recording another script after the listing was taken
    state.record_script(ScriptRecord::new("2", "late.js")).await;

    // THEN: The listing can be walked repeatedly and is a stable snapshot
    let first: Vec<_> = listing.iter().cloned().collect();
    let second: Vec<_> = listing.iter().cloned().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[tokio::test]
async fn given_only_internal_scripts_when_listing_filtered_then_empty() {
    let state = SessionState::new(INTERNAL);
    state
        .record_script(ScriptRecord::new("42", "node:internal/foo.js"))
        .await;

    assert!(state.list_scripts(false).await.is_empty());
    assert!(!state.list_scripts(true).await.is_empty());
}
