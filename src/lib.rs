//! CSV Geocode Picker - Core Library
//!
//! Pick the columns of a CSV file that describe an address and send the file
//! to a geocoding endpoint, then keep the CSV it answers with.

pub mod commands;
pub mod core;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use core::{
    columns::{ColumnBoard, ColumnContainer, ColumnList},
    config::AppConfig,
    document::{DetachedPresenter, DocumentPresenter, FileDocumentPresenter},
    file_parser::FileParser,
    file_source::{FileSource, MemoryFileSource, PathFileSource},
    models::{
        AppError, AppResult, ColumnSide, CsvDocument, PickerNotification, PickerPhase,
        PickerSnapshot,
    },
    picker::{ColumnPicker, PickerEffect, PickerEvent},
    runtime::{spawn_picker_runtime, PickerRuntimeHandle, PickerServices},
    submitter::{HttpSubmitter, ReqwestSubmitter},
};

use std::sync::Arc;
use std::time::Duration;

/// Application state shared between commands
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<tokio::sync::RwLock<AppConfig>>,
    pub picker: PickerRuntimeHandle,
}

impl AppState {
    /// Load configuration and start a picker backed by the real HTTP client.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> anyhow::Result<Self> {
        Self::from_config(Self::load_config())
    }

    /// Stored configuration with `CSVGEOCODE_*` overrides applied
    pub fn load_config() -> AppConfig {
        let mut config = Self::load_or_initialize_config();
        config.apply_env_overrides();
        config
    }

    /// Start a picker that saves received documents into the output directory
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let presenter = Arc::new(FileDocumentPresenter::new(&config.output.directory));
        Self::with_presenter(config, presenter)
    }

    pub fn with_presenter(
        config: AppConfig,
        presenter: Arc<dyn DocumentPresenter>,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let submitter = ReqwestSubmitter::new(config.submitter_config())
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        let services = PickerServices {
            submitter: Arc::new(submitter),
            presenter,
            endpoint: config.endpoint()?,
        };
        Self::with_services(config, services)
    }

    /// Start a picker with custom collaborators
    pub fn with_services(config: AppConfig, services: PickerServices) -> anyhow::Result<Self> {
        let picker = ColumnPicker::new(FileParser::with_config(config.parser_config()));
        tracing::info!("Picker will submit to {}", services.endpoint);
        let picker = spawn_picker_runtime(picker, services)?;

        Ok(Self {
            config: Arc::new(tokio::sync::RwLock::new(config)),
            picker,
        })
    }

    /// How long commands wait for a load or submission outcome
    pub async fn wait_timeout(&self) -> Duration {
        let config = self.config.read().await;
        Duration::from_secs(config.submit.timeout_seconds + 5)
    }

    fn load_or_initialize_config() -> AppConfig {
        match AppConfig::load() {
            Ok(cfg) => {
                if let Err(err) = cfg.validate() {
                    tracing::warn!(
                        "Invalid configuration detected ({}), falling back to defaults",
                        err
                    );
                    AppConfig::default()
                } else {
                    cfg
                }
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to load configuration from disk: {}. Using defaults",
                    err
                );
                AppConfig::default()
            }
        }
    }
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the library with default settings
pub fn init() -> anyhow::Result<()> {
    utils::logging::init_tracing(None);
    tracing::info!("📚 {} v{} initialized", NAME, VERSION);
    Ok(())
}
