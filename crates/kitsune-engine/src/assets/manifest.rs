use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::LoadRequest;
use crate::config::Config;
use crate::error::ConfigurationError;

/// Kind of a declared resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceType {
    GltfModel,
    Texture,
    CubeTexture,
}

impl SourceType {
    /// Multi-file kinds take an ordered `path_list` instead of a single `path`.
    pub fn is_multi_file(&self) -> bool {
        matches!(self, SourceType::CubeTexture)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::GltfModel => "gltfModel",
            SourceType::Texture => "texture",
            SourceType::CubeTexture => "cubeTexture",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub kind: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_list: Option<Vec<String>>,
}

impl SourceEntry {
    pub fn single(name: impl Into<String>, kind: SourceType, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: Some(path.into()),
            path_list: None,
        }
    }

    pub fn multi(name: impl Into<String>, kind: SourceType, paths: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: None,
            path_list: Some(paths),
        }
    }

    /// Checks the path arity against the kind and builds the load request.
    pub fn to_request(&self) -> Result<LoadRequest, ConfigurationError> {
        let urls = if self.kind.is_multi_file() {
            match &self.path_list {
                Some(list) if !list.is_empty() => list.clone(),
                _ => {
                    return Err(ConfigurationError::MissingPathList {
                        name: self.name.clone(),
                        kind: self.kind,
                    });
                }
            }
        } else {
            match &self.path {
                Some(path) if !path.is_empty() => vec![path.clone()],
                _ => {
                    return Err(ConfigurationError::MissingPath {
                        name: self.name.clone(),
                        kind: self.kind,
                    });
                }
            }
        };

        Ok(LoadRequest {
            name: self.name.clone(),
            kind: self.kind,
            urls,
        })
    }
}

/// Ordered list of resources to load before the world can be built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub sources: Vec<SourceEntry>,
}

impl Manifest {
    pub fn new(sources: Vec<SourceEntry>) -> Self {
        Self { sources }
    }

    /// The four resources the shipped world is built from, relative to the
    /// asset root.
    pub fn default_scene() -> Self {
        let faces = ["px", "nx", "py", "ny", "pz", "nz"]
            .iter()
            .map(|f| format!("textures/environmentMap/{f}.png"))
            .collect();

        Self::new(vec![
            SourceEntry::multi("environmentMapTexture", SourceType::CubeTexture, faces),
            SourceEntry::single("grassColorTexture", SourceType::Texture, "textures/dirt/color.png"),
            SourceEntry::single("grassNormalTexture", SourceType::Texture, "textures/dirt/normal.png"),
            SourceEntry::single("foxModel", SourceType::GltfModel, "models/Fox/fox.ron"),
        ])
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Config for Manifest {}
