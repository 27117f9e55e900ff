// Hand a generated queue to HandBrakeCLI

use super::core::{QueueError, Result};
use super::process::run_stream;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::Path;

/// Trailing output lines kept for the failure message
const TAIL_LINES: usize = 20;

/// Command-line arguments for importing a queue file into HandBrakeCLI
///
/// `extra_args` is split shell-style (quotes respected); if it cannot be
/// parsed it falls back to plain whitespace splitting.
pub fn queue_import_args(queue_file: &Path, extra_args: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    let trimmed = extra_args.trim();
    if !trimmed.is_empty() {
        let extra = shlex::split(trimmed)
            .unwrap_or_else(|| trimmed.split_whitespace().map(str::to_string).collect());
        args.extend(extra.into_iter().map(OsString::from));
    }

    args.push("--queue-import-file".into());
    args.push(queue_file.as_os_str().to_os_string());
    args
}

/// Run every job of `queue_file` through the transcoder, forwarding output lines
pub fn run_queue<F>(
    program: &str,
    queue_file: &Path,
    extra_args: &str,
    mut on_line: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    if !queue_file.is_file() {
        return Err(QueueError::InputNotFound {
            path: queue_file.to_path_buf(),
        });
    }

    let mut stream = run_stream(program, queue_import_args(queue_file, extra_args))?;
    let mut tail: VecDeque<String> = VecDeque::with_capacity(TAIL_LINES + 1);
    for line in stream.by_ref() {
        on_line(&line);
        tail.push_back(line);
        if tail.len() > TAIL_LINES {
            tail.pop_front();
        }
    }

    let status = stream.finish()?;
    if !status.success() {
        return Err(QueueError::ProcessFailed {
            program: program.to_string(),
            status,
            output: Vec::from(tail).join("\n"),
        });
    }
    Ok(())
}
