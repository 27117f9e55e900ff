mod error;
mod queue;
mod render;
mod resolution;
mod scan;
mod template;

pub use error::{QueueError, Result};
pub use queue::{
    FileRecord, QueueOptions, QueueReport, build_queue, copy_out_files, make_out_dirs,
    resolve_all, resolve_roots, write_queue_file,
};
pub use render::{JobContext, escape_json_str, render};
pub use resolution::{Resolution, ResolutionPolicy, display_resolution};
pub use scan::{
    DEFAULT_EXTENSIONS, Partition, discover, has_extension, normalize_extensions, partition,
    scan_streaming,
};
pub use template::{Template, decode, encode, read_encode_input};
