//! Error taxonomy of the engine core.
//!
//! Fatal kinds (`ConfigurationError`, `LookupError`, `BackendError`) abort scene
//! construction and surface to the host through [`EngineError`]. `LoadError` is
//! non-fatal: the asset pipeline logs and collects it, then keeps going.

use crate::assets::SourceType;

/// Result alias used across the engine core.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Malformed manifest, unknown resource kind or unreadable configuration.
///
/// Raised synchronously, before any load request leaves the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("cannot load '{name}' ({kind}): missing `path` property, check the source list")]
    MissingPath { name: String, kind: SourceType },

    #[error("cannot load '{name}' ({kind}): missing or empty `path_list` property, check the source list")]
    MissingPathList { name: String, kind: SourceType },

    #[error("no loader registered for resource kind '{kind}' (source '{name}')")]
    UnknownKind { name: String, kind: SourceType },

    #[error("the asset pipeline was already started")]
    AlreadyStarted,

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

/// A single resource failed to load. Logged and collected, never fatal.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("there was an error loading {url} ('{name}'): {reason}")]
pub struct LoadError {
    pub name: String,
    pub url: String,
    pub reason: String,
}

/// A consumer asked for a named item or clip that does not exist.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("resource '{name}' is not loaded")]
    MissingItem { name: String },

    #[error("resource '{name}' is not a {expected}")]
    WrongItemType { name: String, expected: &'static str },

    #[error("animation '{name}' does not exist")]
    MissingClip { name: String },

    #[error("model '{model}' provides {available} animation clips, {required} are required")]
    NotEnoughClips {
        model: String,
        available: usize,
        required: usize,
    },
}

/// Failure reported by the graphics backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("graphics backend: {0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Umbrella error surfaced to the host.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
