use hbqueue::engine::{QueueError, ResolutionPolicy, Template, build_queue};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

use crate::common::assertions::*;
use crate::common::helpers::*;

#[test]
fn test_explicit_resolution_never_probes() {
    let input = TempDir::new().unwrap();
    touch(input.path(), "a.mp4", b"");
    touch(input.path(), "b.mov", b"");

    let mut options = options_for(input.path(), None);
    options.resolution = "1440x810".parse().unwrap();
    let prober = FakeProber::new();

    let report = build_queue(&options, &Template::builtin().unwrap(), &prober).unwrap();

    assert_eq!(prober.calls(), 0);
    for job in read_queue(&report.queue_file) {
        assert_job_resolution(&job, 1440, 810);
        assert_eq!(job["Task"]["DisplayWidth"], 1440.0);
    }
}

#[test]
fn test_auto_uses_rotation_corrected_geometry() {
    let input = TempDir::new().unwrap();
    touch(input.path(), "landscape.mp4", b"");
    touch(input.path(), "portrait.mp4", b"");
    touch(input.path(), "upside_down.mp4", b"");

    let mut options = options_for(input.path(), None);
    options.resolution = ResolutionPolicy::Auto;
    let prober = FakeProber::new()
        .with_stream("landscape.mp4", 1920, 1080, None)
        .with_stream("portrait.mp4", 1920, 1080, Some("90"))
        .with_stream("upside_down.mp4", 1920, 1080, Some("180"));

    let report = build_queue(&options, &Template::builtin().unwrap(), &prober).unwrap();

    assert_eq!(prober.calls(), 3);
    let jobs = read_queue(&report.queue_file);
    assert_job_resolution(&jobs[0], 1920, 1080);
    assert_job_resolution(&jobs[1], 1080, 1920);
    assert_job_resolution(&jobs[2], 1920, 1080);
}

#[test]
fn test_auto_half_halves_probed_geometry() {
    let input = TempDir::new().unwrap();
    touch(input.path(), "a.mp4", b"");
    touch(input.path(), "b.mp4", b"");

    let mut options = options_for(input.path(), None);
    options.resolution = ResolutionPolicy::AutoHalf;
    let prober = FakeProber::new()
        .with_stream("a.mp4", 1920, 1080, None)
        .with_stream("b.mp4", 1081, 721, Some("-90"));

    let report = build_queue(&options, &Template::builtin().unwrap(), &prober).unwrap();

    let jobs = read_queue(&report.queue_file);
    assert_job_resolution(&jobs[0], 960, 540);
    assert_job_resolution(&jobs[1], 360, 540);
}

#[test]
fn test_parallel_probing_keeps_discovery_order() {
    let input = TempDir::new().unwrap();
    let mut prober = FakeProber::new().with_delay(Duration::from_millis(5));
    for i in 0..8u32 {
        let name = format!("clip{}.mp4", i);
        touch(input.path(), &name, b"");
        prober = prober.with_stream(&name, 100 + i * 2, 50 + i * 2, None);
    }

    let mut options = options_for(input.path(), None);
    options.resolution = ResolutionPolicy::Auto;
    options.probe_jobs = 4;

    let report = build_queue(&options, &Template::builtin().unwrap(), &prober).unwrap();

    assert_eq!(prober.calls(), 8);
    let jobs = read_queue(&report.queue_file);
    assert_eq!(jobs.len(), 8);
    for (i, job) in jobs.iter().enumerate() {
        let i = i as u64;
        assert!(job_sources(std::slice::from_ref(job))[0].ends_with(&format!("clip{}.mp4", i)));
        assert_job_resolution(job, 100 + i * 2, 50 + i * 2);
    }
}

#[test]
fn test_probe_failure_aborts_without_queue_file() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    touch(input.path(), "good.mp4", b"");
    touch(input.path(), "broken.mp4", b"");

    let mut options = options_for(input.path(), Some(output.path()));
    options.resolution = ResolutionPolicy::Auto;
    let prober = FakeProber::new().with_stream("good.mp4", 640, 480, None);

    let err = build_queue(&options, &Template::builtin().unwrap(), &prober).unwrap_err();

    assert!(matches!(err, QueueError::ProbeFailed { .. }));
    assert_missing(&output.path().join("hb.json"));
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}
