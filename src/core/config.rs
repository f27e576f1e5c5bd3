//! Application configuration management

use anyhow::{Context, Result};
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::core::file_parser::FileParserConfig;
use crate::core::submitter::SubmitterConfig;
use crate::utils::network::DEFAULT_TIMEOUT;
use crate::utils::validation::{is_http_url, validate_url};

/// Largest accepted `intake.max_file_size_mb`
pub const MAX_FILE_SIZE_MB: u64 = 1024 * 1024;

/// Main application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub submit: SubmitConfig,
    pub intake: IntakeConfig,
    pub output: OutputConfig,
    pub advanced: AdvancedConfig,
}

/// Where and how submissions are sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Location of the page hosting the picker; relative post URLs resolve against it
    pub page_url: String,
    /// POST target; `None` means the page location itself
    pub post_url: Option<String>,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// File intake settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    pub preview_rows: usize,
    /// 0 disables the limit
    pub max_file_size_mb: u64,
}

/// Where received documents are stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: String,
}

/// Advanced configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    pub log_level: String, // "error", "warn", "info", "debug", "trace"
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            submit: SubmitConfig::default(),
            intake: IntakeConfig::default(),
            output: OutputConfig::default(),
            advanced: AdvancedConfig::default(),
        }
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            page_url: "http://127.0.0.1:5005/".to_string(),
            post_url: None,
            timeout_seconds: DEFAULT_TIMEOUT.as_secs(),
            user_agent: crate::utils::network::get_user_agent().to_string(),
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            max_file_size_mb: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        let directory = UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(|dir| dir.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            directory: directory.to_string_lossy().into_owned(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file, creating default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: AppConfig =
                serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;

            tracing::info!("Loaded configuration from: {:?}", config_path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = self.export()?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        tracing::info!("Saved configuration to: {:?}", config_path);
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "csvgeocode", "picker")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Reset configuration to defaults
    pub fn reset() -> Result<Self> {
        let config = Self::default();
        config.save()?;
        tracing::info!("Reset configuration to defaults");
        Ok(config)
    }

    /// Export configuration as JSON string
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to export configuration")
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(json).with_context(|| "Failed to parse imported configuration")?;
        config
            .validate()
            .with_context(|| "Imported configuration is invalid")?;
        Ok(config)
    }

    /// Apply `CSVGEOCODE_*` environment variables on top of the loaded values
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(page_url) = lookup("CSVGEOCODE_PAGE_URL") {
            self.submit.page_url = page_url;
        }
        if let Some(post_url) = lookup("CSVGEOCODE_POST_URL") {
            self.submit.post_url = Some(post_url);
        }
        if let Some(directory) = lookup("CSVGEOCODE_OUTPUT_DIR") {
            self.output.directory = directory;
        }
        if let Some(timeout) = lookup("CSVGEOCODE_TIMEOUT") {
            match timeout.parse() {
                Ok(seconds) => self.submit.timeout_seconds = seconds,
                Err(_) => tracing::warn!("Ignoring invalid CSVGEOCODE_TIMEOUT: {}", timeout),
            }
        }
    }

    /// Resolve the POST target against the page location
    pub fn endpoint(&self) -> Result<Url> {
        let page = validate_url(&self.submit.page_url)?;
        let target = self.submit.post_url.as_deref().unwrap_or(".");
        page.join(target)
            .with_context(|| format!("Invalid post URL: {}", target))
    }

    pub fn submitter_config(&self) -> SubmitterConfig {
        SubmitterConfig {
            timeout: self.submit.timeout_seconds,
            user_agent: self.submit.user_agent.clone(),
        }
    }

    pub fn parser_config(&self) -> FileParserConfig {
        FileParserConfig {
            preview_rows: self.intake.preview_rows,
            max_file_size: self.intake.max_file_size_mb.saturating_mul(1024 * 1024),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint()?;
        if !is_http_url(endpoint.as_str()) {
            anyhow::bail!("Endpoint must use http or https, got {}", endpoint.scheme());
        }

        if self.submit.timeout_seconds == 0 || self.submit.timeout_seconds > 600 {
            anyhow::bail!("Timeout should be between 1 and 600 seconds");
        }

        if self.intake.preview_rows > 1000 {
            anyhow::bail!("Preview rows should not exceed 1000");
        }

        if self.intake.max_file_size_mb > MAX_FILE_SIZE_MB {
            anyhow::bail!("Max file size should not exceed {} MB", MAX_FILE_SIZE_MB);
        }

        if self.output.directory.trim().is_empty() {
            anyhow::bail!("Output directory must not be empty");
        }

        if !["error", "warn", "info", "debug", "trace"].contains(&self.advanced.log_level.as_str())
        {
            anyhow::bail!(
                "Invalid log level: must be 'error', 'warn', 'info', 'debug', or 'trace'"
            );
        }

        Ok(())
    }
}
