#![allow(dead_code)]

use hbqueue::engine::{Prober, QueueError, QueueOptions, Result, StreamInfo};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Create `rel` under `root` (with parents) holding `contents`
pub fn touch(root: &Path, rel: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture dir");
    }
    fs::write(&path, contents).expect("Failed to write fixture file");
    path
}

/// Queue options for a test tree with an explicit 1280x720 resolution
pub fn options_for(input: &Path, output: Option<&Path>) -> QueueOptions {
    QueueOptions {
        input_root: input.to_path_buf(),
        output_root: output.map(Path::to_path_buf),
        ..Default::default()
    }
}

/// Read a queue file and parse it as a JSON array
pub fn read_queue(path: &Path) -> Vec<serde_json::Value> {
    let text = fs::read_to_string(path).expect("Failed to read queue file");
    let value: serde_json::Value =
        serde_json::from_str(&text).expect("Queue file is not valid JSON");
    value.as_array().expect("Queue file is not a JSON array").clone()
}

/// Source paths of every job in a parsed queue
pub fn job_sources(jobs: &[serde_json::Value]) -> Vec<String> {
    jobs.iter()
        .map(|job| job["Task"]["Source"].as_str().unwrap_or_default().to_string())
        .collect()
}

/// Prober double keyed by file name; unknown files fail like a broken ffprobe run
#[derive(Default)]
pub struct FakeProber {
    streams: HashMap<String, StreamInfo>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stream(
        mut self,
        file_name: &str,
        width: u32,
        height: u32,
        rotate: Option<&str>,
    ) -> Self {
        self.streams.insert(
            file_name.to_string(),
            StreamInfo {
                width,
                height,
                rotate_tag: rotate.map(str::to_string),
                side_data_rotation: None,
            },
        );
        self
    }

    /// Sleep per probe, longer for names sorting first, to scramble completion order
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Prober for FakeProber {
    fn probe(&self, path: &Path) -> Result<StreamInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if let Some(delay) = self.delay {
            let rank = self.streams.len().saturating_sub(
                self.streams.keys().filter(|k| **k < name).count(),
            );
            thread::sleep(delay * rank as u32);
        }

        self.streams
            .get(&name)
            .cloned()
            .ok_or_else(|| QueueError::ProbeFailed {
                path: path.to_path_buf(),
                reason: "no fixture stream".to_string(),
            })
    }
}
