// Unit tests for the command loop
// Input comes from an in-memory reader, output is captured in a buffer

use crate::error::session::SessionError;
use crate::protocol::ScriptRecord;
use crate::session::input::LineReader;
use crate::session::repl::{read_commands, run};
use crate::session::shutdown::{self, Termination};
use crate::session::state::SessionState;

use std::io::Cursor;

fn lines(input: &str) -> LineReader {
    LineReader::from_reader(Cursor::new(input.as_bytes().to_vec()))
}

/// Drop terminal color sequences so assertions see plain text.
fn strip_ansi(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let mut plain = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }

    plain
}

async fn state_with(records: &[(&str, &str)]) -> SessionState {
    let state = SessionState::new("node:internal");
    for (id, url) in records {
        state.record_script(ScriptRecord::new(*id, *url)).await;
    }
    state
}

/// **VALUE**: Internal scripts are hidden from `sources` and shown by `sources --all`.
///
/// **WHY THIS MATTERS**: This is the operator-facing contract of the listing
/// command, including its exact line format.
#[tokio::test]
async fn given_internal_script_when_listing_sources_then_only_all_shows_it() {
    // GIVEN: One internal script has been discovered
    let state = state_with(&[("42", "node:internal/foo.js")]).await;
    let mut out = Vec::new();

    // WHEN: The operator runs `sources`, then `sources --all`, then `exit`
    let result = read_commands(lines("sources\nsources --all\nexit\n"), &mut out, &state).await;

    // THEN: Only the second listing printed the script
    assert!(result.is_ok());
    assert_eq!(
        strip_ansi(&out),
        "(ndb) (ndb) 42: node:internal/foo.js\n(ndb) "
    );
}

#[tokio::test]
async fn given_user_scripts_when_listing_sources_then_prints_in_discovery_order() {
    let state = state_with(&[("1", "app.js"), ("2", "lib.js")]).await;
    let mut out = Vec::new();

    read_commands(lines("sources\nexit\n"), &mut out, &state)
        .await
        .unwrap();

    assert_eq!(strip_ansi(&out), "(ndb) 1: app.js\n2: lib.js\n(ndb) ");
}

/// **VALUE**: Listing twice without new events prints the same thing twice.
///
/// **BUG THIS CATCHES**: Would catch a listing that drains or mutates the
/// script log.
#[tokio::test]
async fn given_no_new_events_when_sources_runs_twice_then_output_is_identical() {
    // GIVEN: Recorded scripts
    let state = state_with(&[("1", "app.js"), ("9", "node:internal/x"), ("2", "lib.js")]).await;
    let mut out = Vec::new();

    // WHEN: Listing twice
    read_commands(lines("sources\nsources\nexit\n"), &mut out, &state)
        .await
        .unwrap();

    // THEN: Both listings match
    let plain = strip_ansi(&out);
    let listings: Vec<&str> = plain.split("(ndb) ").filter(|s| !s.is_empty()).collect();
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0], listings[1]);
    assert_eq!(listings[0], "1: app.js\n2: lib.js\n");
}

/// **VALUE**: A blank line re-prompts instead of faulting.
///
/// **BUG THIS CATCHES**: Would catch indexing the first field of an empty
/// split, which panics on a bare Enter.
#[tokio::test]
async fn given_empty_lines_when_read_then_reprompts() {
    let state = state_with(&[]).await;
    let mut out = Vec::new();

    let result = read_commands(lines("\n   \nexit\n"), &mut out, &state).await;

    assert!(result.is_ok());
    assert_eq!(strip_ansi(&out), "(ndb) (ndb) (ndb) ");
}

#[tokio::test]
async fn given_unknown_command_when_read_then_silently_ignored() {
    let state = state_with(&[("1", "app.js")]).await;
    let mut out = Vec::new();

    read_commands(lines("step\nbreak main.js:3\nexit\n"), &mut out, &state)
        .await
        .unwrap();

    assert_eq!(strip_ansi(&out), "(ndb) (ndb) (ndb) ");
}

#[tokio::test]
async fn given_input_ends_without_exit_when_read_then_input_error() {
    // GIVEN: Input that ends after one command
    let state = state_with(&[]).await;
    let mut out = Vec::new();

    // WHEN: Reading commands
    let result = read_commands(lines("sources\n"), &mut out, &state).await;

    // THEN: End of input is an input failure
    match result {
        Err(SessionError::Input { message, .. }) => {
            assert!(message.contains("end of input"), "unexpected message: {message}");
        }
        other => panic!("Expected input error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_exit_command_when_loop_runs_then_signals_clean_exit() {
    let state = state_with(&[]).await;
    let (signal, watch) = shutdown::channel();

    run(lines("exit\n"), Vec::new(), state, signal).await;

    assert!(watch.wait().await.is_clean());
}

#[tokio::test]
async fn given_closed_input_when_loop_runs_then_signals_failure_not_exit() {
    let state = state_with(&[]).await;
    let (signal, watch) = shutdown::channel();

    run(lines(""), Vec::new(), state, signal).await;

    assert!(matches!(
        watch.wait().await,
        Termination::Failed(SessionError::Input { .. })
    ));
}
