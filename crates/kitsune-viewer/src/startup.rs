use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use kitsune_engine::assets::{LoaderRegistry, Manifest, SourceType};
use kitsune_engine::backend::headless::{LoaderMode, MemoryLoader};
use kitsune_engine::config::EngineConfig;
use kitsune_engine::debug::{DebugMode, SharedDebugPanel};
use kitsune_engine::EngineOptions;

use crate::loader::FsLoader;
use crate::panel::KeyboardPanel;

/// Where resources come from.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetSource {
    /// Manifest paths resolved under this directory.
    Directory(PathBuf),
    /// Built-in stand-ins for the default scene.
    Builtin,
}

/// Everything decided on the command line before the engine starts.
#[derive(Debug, Clone)]
pub struct Startup {
    pub config: EngineConfig,
    pub manifest: Manifest,
    pub assets: AssetSource,
    pub debug: DebugMode,
}

impl Startup {
    /// One loader per resource kind.
    pub fn loaders(&self) -> LoaderRegistry {
        match &self.assets {
            AssetSource::Directory(root) => {
                let loader = FsLoader::new(root.clone());
                log::info!("loading assets from {}", loader.root().display());
                LoaderRegistry::new()
                    .with(SourceType::Texture, loader.clone())
                    .with(SourceType::CubeTexture, loader.clone())
                    .with(SourceType::GltfModel, loader)
            }
            AssetSource::Builtin => {
                log::info!("using built-in assets");
                let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
                LoaderRegistry::new()
                    .with(SourceType::Texture, loader.clone())
                    .with(SourceType::CubeTexture, loader.clone())
                    .with(SourceType::GltfModel, loader)
            }
        }
    }

    /// The keyboard panel, when debug mode is on.
    pub fn panel(&self) -> Option<Rc<RefCell<KeyboardPanel>>> {
        self.debug
            .is_enabled()
            .then(|| Rc::new(RefCell::new(KeyboardPanel::new())))
    }

    pub fn options(&self, panel: Option<&Rc<RefCell<KeyboardPanel>>>) -> EngineOptions {
        let debug = panel.map(|p| -> SharedDebugPanel { p.clone() });
        EngineOptions::new(self.loaders())
            .with_config(self.config.clone())
            .with_manifest(self.manifest.clone())
            .with_debug(debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn startup(debug: DebugMode) -> Startup {
        Startup {
            config: EngineConfig::default(),
            manifest: Manifest::default_scene(),
            assets: AssetSource::Builtin,
            debug,
        }
    }

    #[test]
    fn panel_only_in_debug_mode() {
        assert!(startup(DebugMode::disabled()).panel().is_none());
        assert!(startup(DebugMode::from_location("http://localhost/#debug")).panel().is_some());
    }

    #[test]
    fn every_kind_has_a_loader() {
        let registry = startup(DebugMode::disabled()).loaders();
        for kind in [SourceType::Texture, SourceType::CubeTexture, SourceType::GltfModel] {
            assert!(registry.supports(kind));
        }
    }
}
