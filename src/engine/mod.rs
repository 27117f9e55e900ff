// Queue generation engine - independent of the CLI

pub mod core;
pub mod probe;
pub mod process;
pub mod transcode;

pub use self::core::*;
pub use probe::{Ffprobe, Prober, StreamInfo, parse_ffprobe_streams};
