use super::error::{QueueError, Result};
use super::render::{JobContext, render};
use super::resolution::{Resolution, ResolutionPolicy};
use super::scan::{DEFAULT_EXTENSIONS, partition};
use super::template::Template;
use crate::engine::probe::Prober;
use rayon::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Immutable settings for one queue-generation run
#[derive(Debug, Clone)]
pub struct QueueOptions {
    pub input_root: PathBuf,
    /// Mirror root for encoded output, defaults to `input_root`
    pub output_root: Option<PathBuf>,
    /// Queue file path, defaults to `<output root>/<queue_file_name>`
    pub queue_file: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub resolution: ResolutionPolicy,
    pub fps: u32,
    pub output_extension: String,
    pub queue_file_name: String,
    /// Upper bound on concurrent probe processes
    pub probe_jobs: usize,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("."),
            output_root: None,
            queue_file: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            resolution: ResolutionPolicy::Explicit(Resolution::new(1280, 720)),
            fps: 10,
            output_extension: "m4v".to_string(),
            queue_file_name: "hb.json".to_string(),
            probe_jobs: 1,
        }
    }
}

/// One selected source and where its encode will land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub input: PathBuf,
    pub relative: PathBuf,
    pub output: PathBuf,
}

impl FileRecord {
    pub fn new(
        input_root: &Path,
        output_root: &Path,
        input: PathBuf,
        output_ext: &str,
    ) -> Result<Self> {
        let relative = relative_path(input_root, &input)?;
        let output = output_root.join(&relative).with_extension(output_ext);
        Ok(Self {
            input,
            relative,
            output,
        })
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueReport {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub queue_file: PathBuf,
    /// Files that got a queue entry
    pub selected: usize,
    /// Excluded files copied into the output root
    pub copied: usize,
}

/// Scan, mirror, resolve and render, then write the queue file
///
/// Nothing is rolled back on failure, but the queue file itself is only
/// replaced once every record has rendered.
pub fn build_queue(
    options: &QueueOptions,
    template: &Template,
    prober: &dyn Prober,
) -> Result<QueueReport> {
    let (input_root, output_root) = resolve_roots(options)?;
    let queue_file = match &options.queue_file {
        Some(path) => std::path::absolute(path).map_err(|e| QueueError::io(path, e))?,
        None => output_root.join(&options.queue_file_name),
    };

    // An output root nested inside the input root must not be rescanned
    let skip = (output_root != input_root && output_root.starts_with(&input_root))
        .then_some(output_root.as_path());

    let mut files = partition(&input_root, &options.extensions, skip)?;
    files.selected.retain(|path| *path != queue_file);

    if files.selected.is_empty() {
        return Err(QueueError::NothingToEncode { root: input_root });
    }
    tracing::info!(count = files.selected.len(), "found files to be encoded");

    let mut copied = 0;
    if output_root != input_root {
        copied = copy_out_files(&input_root, &output_root, &files.excluded)?;
        make_out_dirs(&input_root, &output_root, &files.selected)?;
    }

    let records = files
        .selected
        .into_iter()
        .map(|input| FileRecord::new(&input_root, &output_root, input, &options.output_extension))
        .collect::<Result<Vec<_>>>()?;

    let resolutions = resolve_all(&records, options.resolution, prober, options.probe_jobs)?;

    let rendered = records
        .iter()
        .zip(resolutions)
        .map(|(record, resolution)| {
            let context =
                JobContext::for_job(&record.input, &record.output, options.fps, resolution);
            render(template, &context)
        })
        .collect::<Result<Vec<_>>>()?;

    write_queue_file(&queue_file, &rendered)?;
    tracing::info!(path = %queue_file.display(), records = rendered.len(), "wrote queue file");

    Ok(QueueReport {
        input_root,
        output_root,
        queue_file,
        selected: records.len(),
        copied,
    })
}

/// Absolute input and output roots; the output root is never created here
pub fn resolve_roots(options: &QueueOptions) -> Result<(PathBuf, PathBuf)> {
    let input_root = fs::canonicalize(&options.input_root)
        .ok()
        .filter(|path| path.is_dir())
        .ok_or_else(|| QueueError::InputNotFound {
            path: options.input_root.clone(),
        })?;

    let output_root = match &options.output_root {
        None => input_root.clone(),
        Some(path) => fs::canonicalize(path)
            .ok()
            .filter(|path| path.is_dir())
            .ok_or_else(|| QueueError::OutputRootMissing { path: path.clone() })?,
    };

    Ok((input_root, output_root))
}

/// Copy files that will not be encoded to their mirrored location
pub fn copy_out_files(input_root: &Path, output_root: &Path, files: &[PathBuf]) -> Result<usize> {
    if files.is_empty() {
        return Ok(0);
    }
    tracing::info!(
        count = files.len(),
        dest = %output_root.display(),
        "copying files that are not to be encoded"
    );

    for file in files {
        let target = mirrored_path(input_root, output_root, file)?;
        ensure_parent(&target)?;
        fs::copy(file, &target).map_err(|e| QueueError::io(file, e))?;
    }
    Ok(files.len())
}

/// Create the mirrored directory of each file without copying it
pub fn make_out_dirs(input_root: &Path, output_root: &Path, files: &[PathBuf]) -> Result<()> {
    for file in files {
        let target = mirrored_path(input_root, output_root, file)?;
        ensure_parent(&target)?;
    }
    Ok(())
}

fn relative_path(input_root: &Path, file: &Path) -> Result<PathBuf> {
    file.strip_prefix(input_root)
        .map(Path::to_path_buf)
        .map_err(|_| {
            QueueError::io(
                file,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "outside the input root"),
            )
        })
}

fn mirrored_path(input_root: &Path, output_root: &Path, file: &Path) -> Result<PathBuf> {
    Ok(output_root.join(relative_path(input_root, file)?))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| QueueError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Resolve every record, probing up to `jobs` files at once; order is preserved
pub fn resolve_all(
    records: &[FileRecord],
    policy: ResolutionPolicy,
    prober: &dyn Prober,
    jobs: usize,
) -> Result<Vec<Resolution>> {
    let resolve_one = |record: &FileRecord| -> Result<Resolution> {
        let resolution = policy.resolve(&record.input, prober)?;
        if policy.is_auto() {
            tracing::debug!(file = %record.relative.display(), %resolution, "probed");
        }
        Ok(resolution)
    };

    if !policy.is_auto() || jobs <= 1 {
        return records.iter().map(resolve_one).collect();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| QueueError::io("probe pool", std::io::Error::other(e.to_string())))?;

    pool.install(|| records.par_iter().map(resolve_one).collect())
}

/// Write `[` + records + `]` through a temporary file, then rename into place
pub fn write_queue_file(path: &Path, records: &[String]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut body = String::from("[\n");
    body.push_str(&records.join(",\n"));
    body.push_str("\n]\n");

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| QueueError::io(parent, e))?;
    tmp.write_all(body.as_bytes())
        .map_err(|e| QueueError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| QueueError::io(path, e.error))?;
    Ok(())
}
