use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context};
use console_core::UploadPolicy;
use console_engine::{ApiSettings, EngineConfig, PollSettings};
use console_logging::console_info;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "./upload_console.ron";

/// Settings read from the RON configuration file. Missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// `None` polls until the server reports a terminal status.
    pub poll_cutoff_secs: Option<u64>,
    pub message_dismiss_ms: u64,
    pub allowed_extensions: Vec<String>,
    pub max_file_mib: u64,
    pub max_files: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        let poll = PollSettings::default();
        let policy = UploadPolicy::default();
        Self {
            base_url: api.base_url,
            request_timeout_secs: api.request_timeout.as_secs(),
            connect_timeout_secs: api.connect_timeout.as_secs(),
            poll_interval_ms: poll.interval.as_millis() as u64,
            poll_cutoff_secs: poll.max_duration.map(|max| max.as_secs()),
            message_dismiss_ms: console_core::DEFAULT_DISMISS_AFTER.as_millis() as u64,
            allowed_extensions: policy.allowed_extensions,
            max_file_mib: policy.max_file_bytes / (1024 * 1024),
            max_files: policy.max_files,
        }
    }
}

impl ConsoleConfig {
    pub fn from_ron(text: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.base_url.trim().is_empty(), "base_url must not be empty");
        ensure!(self.poll_interval_ms > 0, "poll_interval_ms must be positive");
        ensure!(self.max_files > 0, "max_files must be positive");
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            api: ApiSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                ..ApiSettings::default()
            },
            poll: PollSettings {
                interval: Duration::from_millis(self.poll_interval_ms),
                max_duration: self.poll_cutoff_secs.map(Duration::from_secs),
            },
        }
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            allowed_extensions: self
                .allowed_extensions
                .iter()
                .map(|extension| normalize_extension(extension))
                .collect(),
            max_file_bytes: self.max_file_mib.saturating_mul(1024 * 1024),
            max_files: self.max_files,
        }
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.message_dismiss_ms)
    }
}

/// Loads `path` when given (it must exist), otherwise the default file if
/// present, otherwise built-in defaults.
pub fn load(path: Option<&Path>) -> anyhow::Result<ConsoleConfig> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ConsoleConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()));
        }
    };

    let config = ConsoleConfig::from_ron(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    console_info!("Loaded configuration from {:?}", path);
    Ok(config)
}

fn normalize_extension(extension: &str) -> String {
    let extension = extension.trim().to_ascii_lowercase();
    if extension.starts_with('.') {
        extension
    } else {
        format!(".{extension}")
    }
}
