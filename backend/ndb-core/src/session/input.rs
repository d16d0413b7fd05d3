//! Operator input as an async line source.
//!
//! A blocking read on stdin cannot be cancelled, so lines are read on a
//! dedicated thread and handed to the command loop over a channel. When the
//! session ends, that thread is simply left behind.

use std::io::{BufRead, Error as IoError, ErrorKind};
use std::thread;

use log::debug;
use tokio::sync::mpsc;

pub struct LineReader {
    lines: mpsc::Receiver<Result<String, IoError>>,
}

impl LineReader {
    /// Read lines from the process's standard input.
    pub fn stdin() -> Self {
        Self::from_reader(std::io::BufReader::new(std::io::stdin()))
    }

    /// Read lines from any blocking reader on a background thread.
    ///
    /// End of input is delivered as an [`ErrorKind::UnexpectedEof`] error.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);

        thread::spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    return;
                }
            }

            let _ = tx.blocking_send(Err(IoError::new(
                ErrorKind::UnexpectedEof,
                "end of input",
            )));
            debug!("Input reader thread finished");
        });

        Self { lines: rx }
    }

    /// Wrap an existing channel of lines.
    pub fn from_channel(lines: mpsc::Receiver<Result<String, IoError>>) -> Self {
        Self { lines }
    }

    /// Wait for the next line.
    ///
    /// # Errors
    ///
    /// Returns the reader's error, end of input, or
    /// [`ErrorKind::BrokenPipe`] if the producer went away silently.
    pub async fn next_line(&mut self) -> Result<String, IoError> {
        match self.lines.recv().await {
            Some(line) => line,
            None => Err(IoError::new(ErrorKind::BrokenPipe, "input closed")),
        }
    }
}
