use super::error::{QueueError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};
use std::path::Path;

/// HandBrake job template, zlib-compressed and base64-encoded by build.rs
const BUILTIN_TEMPLATE: &str = include_str!(concat!(env!("OUT_DIR"), "/hb_job.enc"));

/// Decoded job template with `{in}`, `{out}`, `{fps}`, `{resx}`, `{resy}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    /// Decode the template compiled into the binary
    pub fn builtin() -> Result<Self> {
        decode(BUILTIN_TEMPLATE).map(|text| Self { text })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Compress and encode text into the stored template representation
pub fn encode(text: &str) -> String {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    // Writes into a Vec cannot fail
    let compressed = encoder
        .write_all(text.as_bytes())
        .and_then(|_| encoder.finish())
        .unwrap_or_default();
    STANDARD.encode(compressed)
}

/// Reverse `encode`
pub fn decode(blob: &str) -> Result<String> {
    let compressed = STANDARD
        .decode(blob.trim())
        .map_err(|e| QueueError::TemplateCorrupt(format!("invalid base64: {}", e)))?;

    let mut text = String::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_string(&mut text)
        .map_err(|e| QueueError::TemplateCorrupt(format!("invalid compressed data: {}", e)))?;

    Ok(text)
}

/// Read the text handed to `--template-enc`: the given file, or `fallback` (stdin)
pub fn read_encode_input<R: Read>(path: Option<&Path>, mut fallback: R) -> Result<String> {
    match path {
        Some(path) => {
            if !path.is_file() {
                return Err(QueueError::InputNotFound {
                    path: path.to_path_buf(),
                });
            }
            std::fs::read_to_string(path).map_err(|e| QueueError::io(path, e))
        }
        None => {
            let mut text = String::new();
            fallback
                .read_to_string(&mut text)
                .map_err(|e| QueueError::io("<stdin>", e))?;
            Ok(text)
        }
    }
}
