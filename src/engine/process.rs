// External process execution: captured output for ffprobe, streamed output for HandBrakeCLI

use super::core::{QueueError, Result};
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Locate an executable on PATH
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| QueueError::ProcessNotFound {
        program: name.to_string(),
    })
}

/// Run a program to completion and return its stdout
///
/// A non-zero exit becomes `ProcessFailed` carrying stderr (or stdout when
/// stderr is empty). With a timeout, the child is killed once it elapses.
pub fn run_capture<I, S>(program: &str, args: I, timeout: Option<Duration>) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!(command = %format_command(&cmd), "running");

    let mut child = cmd.spawn().map_err(|e| spawn_error(program, e))?;

    let stdout_reader = child.stdout.take().map(|out| thread::spawn(move || read_all(out)));
    let stderr_reader = child.stderr.take().map(|err| thread::spawn(move || read_all(err)));

    let status = match timeout {
        Some(limit) => wait_with_timeout(&mut child, program, limit)?,
        None => child.wait().map_err(|e| QueueError::io(program, e))?,
    };

    let stdout = join_output(stdout_reader);
    let stderr = join_output(stderr_reader);

    if !status.success() {
        let output = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(QueueError::ProcessFailed {
            program: program.to_string(),
            status,
            output,
        });
    }

    Ok(stdout)
}

/// Start a program and stream its merged stdout/stderr line by line
pub fn run_stream<I, S>(program: &str, args: I) -> Result<LineStream>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!(command = %format_command(&cmd), "streaming");

    let mut child = cmd.spawn().map_err(|e| spawn_error(program, e))?;

    let (tx, rx) = mpsc::channel();
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(forward_lines(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(forward_lines(stderr, tx));
    }

    Ok(LineStream {
        program: program.to_string(),
        child,
        rx,
        readers,
    })
}

/// Lines from a running process, yielded as they arrive
///
/// Iteration ends once both output pipes close. Call `finish` to reap the
/// process and get its exit status.
pub struct LineStream {
    program: String,
    child: Child,
    rx: Receiver<String>,
    readers: Vec<JoinHandle<()>>,
}

impl LineStream {
    /// Wait for the process to exit
    pub fn finish(mut self) -> Result<ExitStatus> {
        let status = self
            .child
            .wait()
            .map_err(|e| QueueError::io(self.program.as_str(), e))?;
        for reader in self.readers.drain(..) {
            let _ = reader.join();
        }
        Ok(status)
    }
}

impl Iterator for LineStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.rx.recv().ok()
    }
}

fn forward_lines<R: Read + Send + 'static>(source: R, tx: Sender<String>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']).to_string();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

fn wait_with_timeout(child: &mut Child, program: &str, limit: Duration) -> Result<ExitStatus> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().map_err(|e| QueueError::io(program, e))? {
            return Ok(status);
        }
        if started.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(program, seconds = limit.as_secs(), "killed after timeout");
            return Err(QueueError::ProcessTimeout {
                program: program.to_string(),
                seconds: limit.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_all<R: Read>(mut source: R) -> String {
    let mut buf = Vec::new();
    let _ = source.read_to_end(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn join_output(reader: Option<JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn spawn_error(program: &str, err: std::io::Error) -> QueueError {
    if err.kind() == std::io::ErrorKind::NotFound {
        QueueError::ProcessNotFound {
            program: program.to_string(),
        }
    } else {
        QueueError::io(program, err)
    }
}

/// Shell-style rendering of a command line for logs
pub fn format_command(cmd: &Command) -> String {
    let parts: Vec<String> = std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect();
    shlex::try_join(parts.iter().map(String::as_str)).unwrap_or_else(|_| parts.join(" "))
}
