use std::fs;
use std::path::Path;

/// Check that two files hold the same bytes
#[allow(dead_code)]
pub fn assert_same_contents(expected: &Path, actual: &Path) {
    let expected_bytes = fs::read(expected)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", expected.display(), e));
    let actual_bytes = fs::read(actual)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", actual.display(), e));
    assert!(
        expected_bytes == actual_bytes,
        "Expected {} to be a byte-identical copy of {}",
        actual.display(),
        expected.display()
    );
}

/// Check that a job targets the given geometry
#[allow(dead_code)]
pub fn assert_job_resolution(job: &serde_json::Value, width: u64, height: u64) {
    assert_eq!(
        (job["Task"]["Width"].as_u64(), job["Task"]["Height"].as_u64()),
        (Some(width), Some(height)),
        "Unexpected resolution in job for {}",
        job["Task"]["Source"]
    );
}

/// Check that no file or directory exists at `path`
#[allow(dead_code)]
pub fn assert_missing(path: &Path) {
    assert!(
        !path.exists(),
        "Expected {} not to exist",
        path.display()
    );
}
