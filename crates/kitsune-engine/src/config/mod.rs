//! Configuration system.
//!
//! Settings are plain serde structs whose `Default` reproduces the shipped
//! experience; any of them can be overridden from a `.ron` or `.toml` file.

mod engine;

pub use engine::{
    parse_hex_color,
    CameraConfig,
    CharacterConfig,
    ControlsConfig,
    EngineConfig,
    EnvironmentConfig,
    FloorConfig,
    RendererConfig,
    ShadowMapKind,
    TimeConfig,
    ToneMapping,
};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Configuration file support for any serde settings type.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Loads the configuration from a `.ron` or `.toml` file, picked by extension.
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: display.clone(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigurationError::Parse {
                path: display,
                message: e.to_string(),
            }),
            Some("ron") => Self::from_ron_str(&contents).map_err(|e| match e {
                ConfigurationError::Parse { message, .. } => ConfigurationError::Parse {
                    path: display,
                    message,
                },
                other => other,
            }),
            _ => Err(ConfigurationError::UnsupportedFormat(display)),
        }
    }

    fn from_ron_str(contents: &str) -> Result<Self, ConfigurationError> {
        ron::from_str(contents).map_err(|e| ConfigurationError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Writes the configuration next to the format implied by the extension.
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigurationError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let contents = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigurationError::Parse {
                path: display.clone(),
                message: e.to_string(),
            })?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigurationError::Parse {
                    path: display.clone(),
                    message: e.to_string(),
                })?,
            _ => return Err(ConfigurationError::UnsupportedFormat(display)),
        };

        std::fs::write(path, contents).map_err(|source| ConfigurationError::Io { path: display, source })
    }
}

impl Config for EngineConfig {}
