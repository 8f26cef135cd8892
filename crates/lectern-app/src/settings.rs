//! Application settings, read from a TOML file and overridden by flags.

use crate::cli::Cli;
use crate::error::AppError;
use kurbo::Size;
use lectern_core::ViewerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file used when `--config` is not given and it exists.
pub const DEFAULT_CONFIG_FILE: &str = "lectern.toml";

/// Size of the virtual viewport the shell renders into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// `lectern.toml` contents.
///
/// ```toml
/// library = "docs"
/// response_language = "German"
///
/// [container]
/// width = 1024
/// height = 768
///
/// [viewer]
/// max_scale = 4.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Directory with one sub-directory of page images per document.
    pub library: PathBuf,
    /// Region memory directory. `None` uses the platform data directory.
    pub storage: Option<PathBuf>,
    /// Language answers are requested in.
    pub response_language: String,
    pub container: ContainerSettings,
    pub viewer: ViewerConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            library: PathBuf::from("library"),
            storage: None,
            response_language: lectern_core::attachment::DEFAULT_RESPONSE_LANGUAGE.to_string(),
            container: ContainerSettings::default(),
            viewer: ViewerConfig::default(),
        }
    }
}

impl AppSettings {
    /// Read settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::ConfigIo(path.to_path_buf(), e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Settings for a command line: the config file (explicit or default),
    /// then path flags on top.
    pub fn load(cli: &Cli) -> Result<Self, AppError> {
        let mut settings = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        settings.apply_cli(cli);
        Ok(settings)
    }

    /// Flags win over the config file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(library) = &cli.library {
            self.library = library.clone();
        }
        if let Some(storage) = &cli.storage {
            self.storage = Some(storage.clone());
        }
    }

    pub fn container_size(&self) -> Size {
        Size::new(self.container.width, self.container.height)
    }
}
