// Input probing using ffprobe

use super::core::{QueueError, Result};
use super::process::run_capture;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

/// First video stream metadata needed to size a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    /// Raw `tags.rotate` value, as written by the muxer
    pub rotate_tag: Option<String>,
    /// Display matrix rotation reported by newer ffprobe builds
    pub side_data_rotation: Option<i64>,
}

impl StreamInfo {
    /// Rotation in degrees, if the stream carries a usable one
    ///
    /// A `rotate` tag that is not an integer is ignored rather than treated as
    /// an error.
    pub fn rotation(&self) -> Option<i64> {
        let tag = self.rotate_tag.as_deref().and_then(|raw| {
            let parsed = raw.trim().parse::<i64>().ok();
            if parsed.is_none() {
                tracing::debug!(tag = raw, "ignoring non-integer rotate tag");
            }
            parsed
        });
        tag.or(self.side_data_rotation)
    }
}

/// Source of stream metadata for automatic resolutions
pub trait Prober: Send + Sync {
    fn probe(&self, path: &Path) -> Result<StreamInfo>;
}

/// `Prober` backed by the ffprobe executable
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: String,
    timeout: Option<Duration>,
}

impl Ffprobe {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Prober for Ffprobe {
    fn probe(&self, path: &Path) -> Result<StreamInfo> {
        let args = [
            "-loglevel",
            "panic",
            "-select_streams",
            "v:0", // First video stream only
            "-show_streams",
            "-print_format",
            "json",
        ];
        let output = run_capture(
            &self.program,
            args.iter()
                .map(OsStr::new)
                .chain(std::iter::once(path.as_os_str())),
            self.timeout,
        )
        .map_err(|e| match e {
            QueueError::ProcessNotFound { .. } => e,
            other => QueueError::ProbeFailed {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;

        parse_ffprobe_streams(&output, path)
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    tags: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    side_data_list: Vec<FfprobeSideData>,
}

#[derive(Debug, Deserialize)]
struct FfprobeSideData {
    rotation: Option<serde_json::Value>,
}

/// Parse `ffprobe -show_streams -print_format json` output for `path`
pub fn parse_ffprobe_streams(json: &str, path: &Path) -> Result<StreamInfo> {
    let probe_failed = |reason: String| QueueError::ProbeFailed {
        path: path.to_path_buf(),
        reason,
    };

    let parsed: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| probe_failed(format!("Failed to parse ffprobe JSON: {}", e)))?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| QueueError::NoVideoStream {
            path: path.to_path_buf(),
        })?;

    let width = stream
        .width
        .ok_or_else(|| probe_failed("Failed to get video width".to_string()))?;
    let height = stream
        .height
        .ok_or_else(|| probe_failed("Failed to get video height".to_string()))?;

    let rotate_tag = stream.tags.get("rotate").map(|value| match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    });

    let side_data_rotation = stream
        .side_data_list
        .iter()
        .filter_map(|side| side.rotation.as_ref())
        .find_map(|value| value.as_i64().or_else(|| value.as_f64().map(|f| f.round() as i64)));

    Ok(StreamInfo {
        width,
        height,
        rotate_tag,
        side_data_rotation,
    })
}
