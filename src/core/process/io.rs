// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! I/O streaming and output capture for processes.
//!
//! ```text
//! run_child()
//!   stdout/stderr reader tasks
//!   one unbounded channel buffers lines in arrival order
//!   wait (or timeout -> kill)
//!   --> ProcessOutput { exit_code, output, timed_out }
//! ```
//!
//! Lines are drained only after the child exits, so the channel is unbounded.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use super::builder::{ProcessBuilder, ProcessOutput};

/// How long readers may keep draining pipes after a timed-out child is killed.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Spawns a reader task for one stream.
fn spawn_reader<R>(
    stream: Option<R>,
    process_name: &str,
    stream_name: &'static str,
    tx: mpsc::UnboundedSender<String>,
) -> Option<JoinHandle<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let name = process_name.to_string();
    stream.map(|stream| {
        tokio::spawn(async move {
            read_stream(stream, &name, stream_name, tx).await;
        })
    })
}

/// Collects buffered lines from the channel into a newline-joined string.
fn collect_output(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    let mut lines = Vec::new();
    while let Ok(line) = rx.try_recv() {
        lines.push(line);
    }
    lines.join("\n")
}

async fn await_readers(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

impl ProcessBuilder {
    /// Runs the child process, handling I/O streaming and waiting for completion.
    pub(super) async fn run_child(
        &self,
        name: &str,
        child: &mut Child,
    ) -> std::io::Result<ProcessOutput> {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let handles: Vec<JoinHandle<()>> = [
            spawn_reader(child.stdout.take(), name, "stdout", tx.clone()),
            spawn_reader(child.stderr.take(), name, "stderr", tx),
        ]
        .into_iter()
        .flatten()
        .collect();

        let (exit_status, timed_out) = if let Some(timeout_duration) = self.timeout_duration() {
            tokio::select! {
                status = child.wait() => (status?, false),
                () = tokio::time::sleep(timeout_duration) => {
                    warn!(process = %name, timeout = ?timeout_duration, "process timed out");
                    child.kill().await?;
                    (child.wait().await?, true)
                }
            }
        } else {
            (child.wait().await?, false)
        };

        if timed_out {
            if tokio::time::timeout(DRAIN_GRACE, await_readers(handles))
                .await
                .is_err()
            {
                warn!(process = %name, "output readers still open after kill");
            }
        } else {
            await_readers(handles).await;
        }

        let exit_code = if timed_out {
            -1
        } else {
            exit_status.code().unwrap_or(-1)
        };

        Ok(ProcessOutput::new(exit_code, collect_output(&mut rx), timed_out))
    }
}

/// Reads lines (lossily decoded) from a stream, logging and keeping each one.
async fn read_stream<R>(
    reader: R,
    process_name: &str,
    stream_name: &str,
    tx: mpsc::UnboundedSender<String>,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(strip_line_ending(&buf)).into_owned();
                trace!(process = %process_name, stream = %stream_name, line = %line, "output");
                let _ = tx.send(line);
            }
            Err(e) => {
                warn!(
                    process = %process_name,
                    stream = %stream_name,
                    error = %e,
                    "error reading stream"
                );
                break;
            }
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
