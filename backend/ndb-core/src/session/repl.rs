//! Interactive command loop.
//!
//! Prompts, reads one line, runs the command, repeats. `exit` ends the loop
//! cleanly; failing to read input ends it with an error.

use crate::error::session::SessionError;
use crate::session::command::Command;
use crate::session::input::LineReader;
use crate::session::shutdown::ShutdownSignal;
use crate::session::state::SessionState;

use std::io::Write;

use crossterm::style::Stylize;
use log::{debug, info};

const PROMPT: &str = "(ndb)";

/// Run the loop and turn its outcome into a termination signal.
pub async fn run<W>(lines: LineReader, out: W, state: SessionState, signal: ShutdownSignal)
where
    W: Write,
{
    match read_commands(lines, out, &state).await {
        Ok(()) => signal.request_exit(),
        Err(e) => signal.report_error(e),
    }
}

/// Process commands until `exit` (returns `Ok`) or an I/O failure.
pub async fn read_commands<W>(
    mut lines: LineReader,
    mut out: W,
    state: &SessionState,
) -> Result<(), SessionError>
where
    W: Write,
{
    info!("Command loop started");

    loop {
        print_prompt(&mut out)?;

        let line = lines
            .next_line()
            .await
            .map_err(|e| SessionError::input(format!("Failed to read command: {e}")))?;

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Exit => {
                info!("Exit requested by operator");
                return Ok(());
            }
            Command::Sources { all } => list_sources(&mut out, state, all).await?,
            Command::Unknown(name) => debug!("Ignoring unknown command {name}"),
        }
    }
}

/// Print every recorded script as `<scriptId>: <url>`.
pub async fn list_sources<W>(out: &mut W, state: &SessionState, all: bool) -> Result<(), SessionError>
where
    W: Write,
{
    let listing = state.list_scripts(all).await;

    for script in listing.iter() {
        writeln!(out, "{}: {}", script.script_id.as_str().green(), script.url)
            .map_err(output_error)?;
    }

    out.flush().map_err(output_error)
}

fn print_prompt<W: Write>(out: &mut W) -> Result<(), SessionError> {
    write!(out, "{} ", PROMPT.cyan()).map_err(output_error)?;
    out.flush().map_err(output_error)
}

#[track_caller]
fn output_error(e: std::io::Error) -> SessionError {
    SessionError::input(format!("Failed to write to terminal: {e}"))
}
