use super::error::{QueueError, Result};
use crate::engine::probe::{Prober, StreamInfo};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// Output geometry written into a job record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn swapped(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn halved(self) -> Self {
        Self::new(self.width / 2, self.height / 2)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How each job's output width/height is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Fixed `WxH` for every file
    Explicit(Resolution),
    /// Source geometry from ffprobe
    Auto,
    /// Source geometry from ffprobe, both sides halved
    AutoHalf,
}

impl ResolutionPolicy {
    /// Whether resolving needs the external probe
    pub fn is_auto(&self) -> bool {
        !matches!(self, ResolutionPolicy::Explicit(_))
    }

    /// Determine the output resolution for one source file
    pub fn resolve(&self, path: &Path, prober: &dyn Prober) -> Result<Resolution> {
        let resolution = match self {
            ResolutionPolicy::Explicit(resolution) => return Ok(*resolution),
            ResolutionPolicy::Auto | ResolutionPolicy::AutoHalf => {
                let unreadable = || QueueError::SourceUnreadable {
                    path: path.to_path_buf(),
                };
                if !path.is_file() {
                    return Err(unreadable());
                }
                File::open(path).map_err(|_| unreadable())?;
                let info = prober.probe(path)?;
                display_resolution(&info)
            }
        };

        if *self == ResolutionPolicy::AutoHalf {
            Ok(resolution.halved())
        } else {
            Ok(resolution)
        }
    }
}

/// Stream geometry corrected for portrait recordings stored as rotated landscape
pub fn display_resolution(info: &StreamInfo) -> Resolution {
    let resolution = Resolution::new(info.width, info.height);
    match info.rotation() {
        Some(degrees) if degrees.abs() == 90 => resolution.swapped(),
        _ => resolution,
    }
}

impl FromStr for ResolutionPolicy {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "auto" => Ok(ResolutionPolicy::Auto),
            "auto-half" => Ok(ResolutionPolicy::AutoHalf),
            other => parse_dimensions(other)
                .map(ResolutionPolicy::Explicit)
                .ok_or_else(|| QueueError::InvalidResolutionFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionPolicy::Explicit(resolution) => resolution.fmt(f),
            ResolutionPolicy::Auto => f.write_str("auto"),
            ResolutionPolicy::AutoHalf => f.write_str("auto-half"),
        }
    }
}

fn parse_dimensions(s: &str) -> Option<Resolution> {
    let (w, h) = s.split_once('x')?;
    let width: u32 = w.parse().ok()?;
    let height: u32 = h.parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some(Resolution::new(width, height))
}
