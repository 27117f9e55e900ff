use super::error::{QueueError, Result};
use super::resolution::Resolution;
use super::template::Template;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Values substituted into one job record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobContext {
    vars: BTreeMap<String, String>,
}

impl JobContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a single queue entry
    ///
    /// Paths are stored JSON-escaped so they stay valid inside the template's
    /// string literals (Windows separators become `\\`).
    pub fn for_job(input: &Path, output: &Path, fps: u32, resolution: Resolution) -> Self {
        Self::new()
            .with_var("in", &escape_json_str(&input.to_string_lossy()))
            .with_var("out", &escape_json_str(&output.to_string_lossy()))
            .with_var("fps", &fps.to_string())
            .with_var("resx", &resolution.width.to_string())
            .with_var("resy", &resolution.height.to_string())
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Substitute every `{name}` in the template with its context value
///
/// Unknown names fail the render; extra context keys are ignored. Braces that
/// do not wrap an identifier (JSON objects, `{}`) are left alone.
pub fn render(template: &Template, context: &JobContext) -> Result<String> {
    let re = placeholder_regex();

    if let Some(missing) = re
        .captures_iter(template.as_str())
        .map(|caps| caps[1].to_string())
        .find(|key| context.get(key).is_none())
    {
        return Err(QueueError::MissingPlaceholder(missing));
    }

    let rendered = re.replace_all(template.as_str(), |caps: &Captures| {
        context.get(&caps[1]).unwrap_or_default().to_string()
    });

    Ok(rendered.into_owned())
}

/// Escape text for embedding inside a JSON string literal
pub fn escape_json_str(s: &str) -> String {
    let quoted = serde_json::Value::String(s.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
