// Global configuration management

use crate::engine::{DEFAULT_EXTENSIONS, ResolutionPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Output frame rates HandBrake jobs may be generated with
pub const FPS_CHOICES: &[u32] = &[5, 10, 12, 15, 20, 25];

/// Resolution policies offered on the command line
pub const RESOLUTION_CHOICES: &[&str] = &["auto", "auto-half", "1280x720", "1440x810"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub transcoder: TranscoderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Source extensions selected for encoding (case-insensitive)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Output frame rate, one of FPS_CHOICES
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// `auto`, `auto-half` or an explicit `WIDTHxHEIGHT`
    #[serde(default = "default_resolution")]
    pub resolution: String,

    /// Extension of the files HandBrake will write
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Queue file name used when no queue path is given
    #[serde(default = "default_queue_file_name")]
    pub queue_file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// ffprobe executable name or path
    #[serde(default = "default_probe_program")]
    pub program: String,

    /// Kill a probe that runs longer than this (0 disables the limit)
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent probe processes
    #[serde(default = "default_probe_jobs")]
    pub jobs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// HandBrakeCLI executable name or path
    #[serde(default = "default_transcoder_program")]
    pub program: String,

    /// Extra arguments passed before `--queue-import-file` (shell quoting allowed)
    #[serde(default)]
    pub extra_args: String,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_fps() -> u32 {
    10
}

fn default_resolution() -> String {
    "1280x720".to_string()
}

fn default_output_extension() -> String {
    "m4v".to_string()
}

fn default_queue_file_name() -> String {
    "hb.json".to_string()
}

fn default_probe_program() -> String {
    "ffprobe".to_string()
}

fn default_probe_timeout() -> u64 {
    30
}

fn default_probe_jobs() -> usize {
    1
}

fn default_transcoder_program() -> String {
    "HandBrakeCLI".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            fps: default_fps(),
            resolution: default_resolution(),
            output_extension: default_output_extension(),
            queue_file_name: default_queue_file_name(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            program: default_probe_program(),
            timeout_secs: default_probe_timeout(),
            jobs: default_probe_jobs(),
        }
    }
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: default_transcoder_program(),
            extra_args: String::new(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("hbqueue")
        } else {
            // Linux, Windows and others
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("hbqueue")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user config, falling back to built-in defaults when it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load and validate config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save config to a specific file, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Check values that serde alone cannot constrain
    pub fn validate(&self) -> Result<()> {
        validate_fps(self.defaults.fps)?;
        self.resolution_policy()?;

        if self.defaults.output_extension.trim().is_empty() {
            anyhow::bail!("defaults.output_extension must not be empty");
        }
        if self.defaults.queue_file_name.trim().is_empty() {
            anyhow::bail!("defaults.queue_file_name must not be empty");
        }
        if self.probe.jobs == 0 {
            anyhow::bail!("probe.jobs must be at least 1");
        }
        Ok(())
    }

    pub fn resolution_policy(&self) -> Result<ResolutionPolicy> {
        Ok(self.defaults.resolution.parse::<ResolutionPolicy>()?)
    }
}

/// Reject frame rates outside FPS_CHOICES
pub fn validate_fps(fps: u32) -> Result<u32> {
    if FPS_CHOICES.contains(&fps) {
        Ok(fps)
    } else {
        anyhow::bail!("fps {} is not one of {:?}", fps, FPS_CHOICES)
    }
}
