//! Generate HandBrake JSON queues for whole directory trees.
//!
//! The [`engine`] walks an input root, picks files by extension, resolves
//! each file's output geometry (fixed, or probed with ffprobe) and renders
//! one job per file from the built-in template into a single queue file.

pub mod config;
pub mod engine;
