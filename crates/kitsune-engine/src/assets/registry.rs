use std::collections::HashMap;

use crate::backend::AssetLoader;

use super::manifest::SourceType;

/// Maps each resource kind to the backend loader that handles it.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: HashMap<SourceType, Box<dyn AssetLoader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `loader` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: SourceType, loader: impl AssetLoader + 'static) -> &mut Self {
        self.loaders.insert(kind, Box::new(loader));
        self
    }

    pub fn with(mut self, kind: SourceType, loader: impl AssetLoader + 'static) -> Self {
        self.register(kind, loader);
        self
    }

    pub fn get(&self, kind: SourceType) -> Option<&dyn AssetLoader> {
        self.loaders.get(&kind).map(|l| l.as_ref())
    }

    pub fn supports(&self, kind: SourceType) -> bool {
        self.loaders.contains_key(&kind)
    }
}
