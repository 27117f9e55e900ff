use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

const TEMPLATE_SOURCE: &str = "assets/hb_job.json";

fn main() {
    // Tell Cargo to rerun if the job template changes
    println!("cargo:rerun-if-changed={}", TEMPLATE_SOURCE);

    let template = fs::read_to_string(TEMPLATE_SOURCE)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", TEMPLATE_SOURCE, e));

    validate_template(&template);

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set by cargo");
    let dest = Path::new(&out_dir).join("hb_job.enc");
    fs::write(&dest, encode(&template))
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", dest.display(), e));
}

/// Every placeholder the queue builder fills in must be present
fn validate_template(template: &str) {
    for key in ["in", "out", "fps", "resx", "resy"] {
        assert!(
            template.contains(&format!("{{{}}}", key)),
            "Template {} is missing placeholder {{{}}}",
            TEMPLATE_SOURCE,
            key
        );
    }

    let trimmed = template.trim();
    assert!(
        trimmed.starts_with('{') && trimmed.ends_with('}'),
        "Template {} must render a single JSON object",
        TEMPLATE_SOURCE
    );
}

/// Same representation as `engine::template::encode`: zlib, then base64
fn encode(text: &str) -> String {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(text.as_bytes())
        .expect("Failed to compress template");
    let compressed = encoder.finish().expect("Failed to finish compression");
    STANDARD.encode(compressed)
}
