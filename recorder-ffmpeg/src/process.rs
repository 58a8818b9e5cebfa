//! tokio child-process implementation of [`ProcessSpawner`].
//!
//! One driver task per child multiplexes three things:
//!
//! ```text
//! ProcessControl ──▶ Stop: "q\n" on stdin, Kill: start_kill()
//! stderr bytes   ──▶ DiagnosticLines ──▶ ProcessEvent::Line
//! stderr EOF     ──▶ child.wait()    ──▶ ProcessEvent::Exited
//! ```

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, Command};

use recorder_core::models::error::CaptureError;
use recorder_core::process::{ExitStatus, ProcessControl, ProcessDriver, ProcessEvent, ProcessHandle};
use recorder_core::traits::process_spawner::ProcessSpawner;

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

const READ_CHUNK: usize = 4096;

/// Longest line held back waiting for a terminator.
pub const MAX_PENDING_LINE: usize = 64 * 1024;

/// Spawns the capture binary as a tokio child process.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct FfmpegSpawner {
    binary: PathBuf,
}

impl FfmpegSpawner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl ProcessSpawner for FfmpegSpawner {
    fn spawn(&self, args: &[String]) -> Result<ProcessHandle, CaptureError> {
        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(target_os = "windows")]
        command.creation_flags(CREATE_NO_WINDOW);

        let mut child = command
            .spawn()
            .map_err(|e| CaptureError::Spawn(format!("{}: {}", self.binary.display(), e)))?;
        let stdin = child.stdin.take();
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CaptureError::Spawn("stderr was not captured".into()))?;

        let pid = child.id();
        log::debug!("Spawned {} (pid {:?})", self.binary.display(), pid);

        let (handle, driver) = ProcessHandle::channel(pid);
        tokio::spawn(drive(child, stdin, stderr, driver));
        Ok(handle)
    }
}

async fn drive(
    mut child: Child,
    mut stdin: Option<ChildStdin>,
    stderr: ChildStderr,
    mut driver: ProcessDriver,
) {
    let mut lines = DiagnosticLines::new(stderr);
    let mut stream_open = true;
    let mut handle_open = true;

    loop {
        tokio::select! {
            control = driver.next_control(), if handle_open => match control {
                Some(ProcessControl::Stop) => {
                    // Dropping the pipe afterwards closes stdin.
                    if let Some(mut pipe) = stdin.take() {
                        if let Err(e) = pipe.write_all(b"q\n").await {
                            log::debug!("Failed to send quit to child: {}", e);
                        }
                    }
                }
                Some(ProcessControl::Kill) => kill(&mut child),
                None => {
                    handle_open = false;
                    kill(&mut child);
                }
            },
            line = lines.next_line(), if stream_open => match line {
                Ok(Some(line)) => {
                    driver.send(ProcessEvent::Line(line));
                }
                Ok(None) => stream_open = false,
                Err(e) => {
                    kill(&mut child);
                    driver.send(ProcessEvent::Error(format!("failed to read diagnostics: {}", e)));
                    return;
                }
            },
            status = child.wait(), if !stream_open => {
                let event = match status {
                    Ok(status) => ProcessEvent::Exited(ExitStatus::from_code(status.code())),
                    Err(e) => ProcessEvent::Error(format!("failed to wait for child: {}", e)),
                };
                driver.send(event);
                return;
            }
        }
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        log::debug!("Kill request ignored: {}", e);
    }
}

/// Splits a diagnostic byte stream into lines.
///
/// Both `\n` and `\r` end a line, since ffmpeg redraws its progress line with
/// bare carriage returns. Blank lines are skipped and invalid UTF-8 is
/// replaced. Unterminated output longer than [`MAX_PENDING_LINE`] is split
/// into lines of that size. `next_line` is cancel-safe.
pub struct DiagnosticLines<R> {
    reader: R,
    buf: Vec<u8>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> DiagnosticLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            eof: false,
        }
    }

    /// Next non-blank line, or `None` at end of stream.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(Some(line));
            }
            if self.eof {
                let rest = std::mem::take(&mut self.buf);
                return Ok(non_blank(&rest));
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = self.reader.read(&mut chunk).await?;
            if n == 0 {
                self.eof = true;
            } else {
                self.buf.extend_from_slice(&chunk[..n]);
            }
        }
    }

    fn take_line(&mut self) -> Option<String> {
        loop {
            let end = self.buf.iter().position(|b| matches!(b, b'\n' | b'\r'));
            let raw: Vec<u8> = match end {
                Some(end) => {
                    let mut raw: Vec<u8> = self.buf.drain(..=end).collect();
                    raw.pop();
                    raw
                }
                None if self.buf.len() >= MAX_PENDING_LINE => {
                    self.buf.drain(..MAX_PENDING_LINE).collect()
                }
                None => return None,
            };
            if let Some(line) = non_blank(&raw) {
                return Some(line);
            }
        }
    }
}

fn non_blank(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    if line.trim().is_empty() {
        None
    } else {
        Some(line.trim_end().to_string())
    }
}
