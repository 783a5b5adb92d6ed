use std::collections::HashMap;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::backend::{Completed, Completion, LoadRequest, LoadedPayload};
use crate::core::{Destroyable, Listenable};
use crate::error::{ConfigurationError, LoadError, LookupError};
use crate::event::{EventSource, Subscription};
use crate::scene::{Scene, SharedScene, Texture, TextureId};

use super::item::{LoadedItem, Model};
use super::manifest::SourceEntry;
use super::model::instantiate_model;
use super::registry::LoaderRegistry;

/// Advisory progress report, one per settled request.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProgress {
    pub url: String,
    /// Requests settled so far, failures included.
    pub loaded: usize,
    pub total: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Loading,
    Ready,
    Destroyed,
}

/// Loads a manifest and reports readiness exactly once.
///
/// Loaders complete from wherever they like; completions queue up on a channel
/// and are only applied by [`AssetPipeline::poll`], on the caller's timeline.
pub struct AssetPipeline {
    loaders: LoaderRegistry,
    scene: SharedScene,
    state: PipelineState,

    requests: Vec<LoadRequest>,
    settled: usize,
    items: HashMap<String, LoadedItem>,
    errors: Vec<LoadError>,

    tx: Sender<Completed>,
    rx: Receiver<Completed>,
    ready: EventSource<()>,
    progress: EventSource<LoadProgress>,
}

impl AssetPipeline {
    pub fn new(loaders: LoaderRegistry, scene: SharedScene) -> Self {
        let (tx, rx) = unbounded();
        Self {
            loaders,
            scene,
            state: PipelineState::Idle,
            requests: Vec::new(),
            settled: 0,
            items: HashMap::new(),
            errors: Vec::new(),
            tx,
            rx,
            ready: EventSource::new(),
            progress: EventSource::new(),
        }
    }

    /// Validates every entry, then dispatches each to its loader.
    ///
    /// Nothing is requested unless the whole manifest is valid.
    pub fn start(&mut self, sources: &[SourceEntry]) -> Result<(), ConfigurationError> {
        if self.state != PipelineState::Idle {
            return Err(ConfigurationError::AlreadyStarted);
        }

        let mut requests = Vec::with_capacity(sources.len());
        for entry in sources {
            let request = entry.to_request()?;
            if !self.loaders.supports(request.kind) {
                return Err(ConfigurationError::UnknownKind {
                    name: entry.name.clone(),
                    kind: entry.kind,
                });
            }
            requests.push(request);
        }

        self.state = PipelineState::Loading;
        self.requests = requests;
        log::debug!("asset pipeline: dispatching {} requests", self.requests.len());

        for (ticket, request) in self.requests.iter().enumerate() {
            let Some(loader) = self.loaders.get(request.kind) else {
                continue;
            };
            let completion = Completion::new(ticket, request.display_url(), self.tx.clone());
            loader.load(request.clone(), completion);
        }
        Ok(())
    }

    /// Applies every completion received since the last call.
    ///
    /// Fires the ready event when the last request settles; an empty manifest is
    /// ready on the first poll. Returns the number of completions applied.
    pub fn poll(&mut self) -> usize {
        match self.state {
            PipelineState::Loading => {}
            PipelineState::Destroyed => {
                // Late completions of an abandoned pipeline are discarded.
                return self.rx.try_iter().count();
            }
            PipelineState::Idle | PipelineState::Ready => return 0,
        }

        let completed: Vec<Completed> = self.rx.try_iter().collect();
        for done in &completed {
            self.settle(done);
        }

        if self.settled >= self.requests.len() {
            self.state = PipelineState::Ready;
            log::info!(
                "Loading complete! {} loaded, {} failed",
                self.items.len(),
                self.errors.len()
            );
            self.ready.emit(());
        }
        completed.len()
    }

    fn settle(&mut self, done: &Completed) {
        let Some(request) = self.requests.get(done.ticket).cloned() else {
            log::warn!("asset pipeline: completion for unknown ticket {}", done.ticket);
            return;
        };
        self.settled += 1;

        let outcome = match &done.result {
            Ok(payload) => self.admit(&request, payload),
            Err(reason) => Err(reason.clone()),
        };

        match outcome {
            Ok(item) => {
                if let Some(previous) = self.items.insert(request.name.clone(), item) {
                    log::debug!("asset pipeline: '{}' overwritten", request.name);
                    self.release(previous);
                }
            }
            Err(reason) => {
                let error = LoadError {
                    name: request.name.clone(),
                    url: done.url.clone(),
                    reason,
                };
                log::warn!("{error}");
                self.errors.push(error);
            }
        }

        log::info!(
            "Loading file: {}. Loaded {} of {} files.",
            done.url,
            self.settled,
            self.requests.len()
        );
        self.progress.emit(LoadProgress {
            url: done.url.clone(),
            loaded: self.settled,
            total: self.requests.len(),
        });
    }

    /// Turns a payload into scene resources, checking it matches the requested kind.
    fn admit(&self, request: &LoadRequest, payload: &LoadedPayload) -> Result<LoadedItem, String> {
        use crate::assets::SourceType;

        let mut scene = self.scene.borrow_mut();
        match (request.kind, payload) {
            (SourceType::Texture, LoadedPayload::Texture(image)) => {
                if !image.is_consistent() {
                    return Err("image buffer does not match its dimensions".to_string());
                }
                let id = scene.resources.add_texture(Texture::image(&request.name, image.clone()));
                Ok(LoadedItem::Texture(id))
            }
            (SourceType::CubeTexture, LoadedPayload::CubeTexture(faces)) => {
                if faces.len() != 6 || !faces.iter().all(|f| f.is_consistent()) {
                    return Err(format!("cube texture needs 6 consistent faces, got {}", faces.len()));
                }
                let id = scene.resources.add_texture(Texture::cube(&request.name, faces.clone()));
                Ok(LoadedItem::CubeTexture(id))
            }
            (SourceType::GltfModel, LoadedPayload::Model(data)) => {
                instantiate_model(&mut scene, &request.name, data).map(LoadedItem::Model)
            }
            (kind, other) => Err(format!("expected a {kind} payload, got a {}", other.kind_name())),
        }
    }

    fn release(&self, item: LoadedItem) {
        let mut scene = self.scene.borrow_mut();
        release_item(&mut scene, item);
    }

    // ── queries ───────────────────────────────────────────────────────────

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == PipelineState::Ready
    }

    /// Number of resolved items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn errors(&self) -> &[LoadError] {
        &self.errors
    }

    /// Progress stream; advisory only.
    pub fn progress(&mut self) -> &mut impl Listenable<LoadProgress> {
        &mut self.progress
    }

    pub fn item(&self, name: &str) -> Result<&LoadedItem, LookupError> {
        self.items.get(name).ok_or_else(|| LookupError::MissingItem {
            name: name.to_string(),
        })
    }

    pub fn texture(&self, name: &str) -> Result<TextureId, LookupError> {
        match self.item(name)? {
            LoadedItem::Texture(id) => Ok(*id),
            _ => Err(wrong_type(name, "texture")),
        }
    }

    pub fn cube_texture(&self, name: &str) -> Result<TextureId, LookupError> {
        match self.item(name)? {
            LoadedItem::CubeTexture(id) => Ok(*id),
            _ => Err(wrong_type(name, "cube texture")),
        }
    }

    pub fn model(&self, name: &str) -> Result<&Model, LookupError> {
        match self.item(name)? {
            LoadedItem::Model(model) => Ok(model),
            _ => Err(wrong_type(name, "model")),
        }
    }
}

fn wrong_type(name: &str, expected: &'static str) -> LookupError {
    LookupError::WrongItemType {
        name: name.to_string(),
        expected,
    }
}

/// Frees the scene resources backing `item`. Model subtrees are walked and every
/// mesh has its geometry and material disposed; textures are disposed directly.
fn release_item(scene: &mut Scene, item: LoadedItem) {
    match item {
        LoadedItem::Texture(id) | LoadedItem::CubeTexture(id) => {
            scene.resources.dispose_texture(id);
        }
        LoadedItem::Model(model) => {
            scene.dispose_meshes_under(model.root, false);
            scene.remove_subtree(model.root);
        }
    }
}

impl Listenable<()> for AssetPipeline {
    /// Fires once, when every request has settled.
    fn listen(&mut self) -> Subscription<()> {
        self.ready.subscribe()
    }
}

impl Destroyable for AssetPipeline {
    fn destroy(&mut self) {
        if self.state == PipelineState::Destroyed {
            return;
        }
        self.state = PipelineState::Destroyed;

        let items: Vec<LoadedItem> = self.items.drain().map(|(_, item)| item).collect();
        let mut scene = self.scene.borrow_mut();
        for item in items {
            release_item(&mut scene, item);
        }
        self.ready.close();
        self.progress.close();
        log::debug!("asset pipeline destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SourceType;
    use crate::backend::headless::{LoaderMode, MemoryLoader};
    use crate::backend::{ModelData, ModelNode};
    use crate::scene::ImageData;

    fn image() -> LoadedPayload {
        LoadedPayload::Texture(ImageData::solid(2, 2, [200, 180, 120, 255]))
    }

    fn cube() -> LoadedPayload {
        LoadedPayload::CubeTexture(vec![ImageData::solid(1, 1, [90, 90, 120, 255]); 6])
    }

    fn cube_entry() -> SourceEntry {
        SourceEntry::multi(
            "environmentMapTexture",
            SourceType::CubeTexture,
            ["px", "nx", "py", "ny", "pz", "nz"].iter().map(|f| format!("{f}.png")).collect(),
        )
    }

    fn pipeline(loader: &MemoryLoader) -> AssetPipeline {
        let registry = LoaderRegistry::new()
            .with(SourceType::Texture, loader.clone())
            .with(SourceType::CubeTexture, loader.clone())
            .with(SourceType::GltfModel, loader.clone());
        AssetPipeline::new(registry, Scene::shared())
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn invalid_entry_aborts_before_any_request() {
        let loader = MemoryLoader::new(LoaderMode::Immediate);
        let mut p = pipeline(&loader);
        let sources = vec![
            SourceEntry::single("ok", SourceType::Texture, "ok.png"),
            SourceEntry {
                name: "grassColorTexture".into(),
                kind: SourceType::Texture,
                path: None,
                path_list: None,
            },
        ];

        let err = p.start(&sources).unwrap_err();
        assert!(err.to_string().contains("grassColorTexture"));
        assert!(loader.requests().is_empty());
        assert_eq!(p.state(), PipelineState::Idle);
    }

    #[test]
    fn kind_without_loader_is_a_configuration_error() {
        let loader = MemoryLoader::new(LoaderMode::Immediate);
        let registry = LoaderRegistry::new().with(SourceType::Texture, loader.clone());
        let mut p = AssetPipeline::new(registry, Scene::shared());

        let err = p.start(&[cube_entry()]).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownKind { .. }));
        assert!(loader.requests().is_empty());
    }

    #[test]
    fn second_start_is_rejected() {
        let loader = MemoryLoader::new(LoaderMode::Immediate);
        let mut p = pipeline(&loader);
        p.start(&[]).unwrap();
        assert!(matches!(p.start(&[]), Err(ConfigurationError::AlreadyStarted)));
    }

    // ── readiness ─────────────────────────────────────────────────────────

    #[test]
    fn ready_fires_once_after_every_entry_settles() {
        let loader = MemoryLoader::new(LoaderMode::Deferred)
            .with_payload("grassColorTexture", image())
            .with_payload("environmentMapTexture", cube());
        let mut p = pipeline(&loader);
        let ready = p.listen();

        p.start(&[
            SourceEntry::single("grassColorTexture", SourceType::Texture, "dirt/color.png"),
            cube_entry(),
        ])
        .unwrap();

        p.poll();
        assert_eq!(ready.pending(), 0);

        loader.complete_next();
        p.poll();
        assert_eq!(ready.pending(), 0);

        loader.complete_next();
        p.poll();
        p.poll();
        assert_eq!(ready.drain().len(), 1);

        assert_eq!(p.len(), 2);
        assert!(p.texture("grassColorTexture").is_ok());
        assert!(p.cube_texture("environmentMapTexture").is_ok());
    }

    #[test]
    fn empty_manifest_is_ready_on_first_poll() {
        let loader = MemoryLoader::new(LoaderMode::Immediate);
        let mut p = pipeline(&loader);
        let ready = p.listen();
        p.start(&[]).unwrap();
        p.poll();
        assert_eq!(ready.drain().len(), 1);
        assert!(p.is_ready());
    }

    #[test]
    fn failed_entry_is_logged_and_absent() {
        let loader = MemoryLoader::new(LoaderMode::Immediate)
            .with_payload("a", image())
            .with_failure("b", "404 not found");
        let mut p = pipeline(&loader);
        let ready = p.listen();
        p.start(&[
            SourceEntry::single("a", SourceType::Texture, "a.png"),
            SourceEntry::single("b", SourceType::Texture, "b.png"),
        ])
        .unwrap();
        p.poll();

        assert_eq!(ready.drain().len(), 1);
        assert_eq!(p.errors().len(), 1);
        assert_eq!(p.errors()[0].url, "b.png");
        assert_eq!(p.texture("b"), Err(LookupError::MissingItem { name: "b".into() }));
    }

    #[test]
    fn mismatched_payload_is_a_load_error() {
        let loader = MemoryLoader::new(LoaderMode::Immediate).with_payload("fox", image());
        let mut p = pipeline(&loader);
        p.start(&[SourceEntry::single("fox", SourceType::GltfModel, "fox.ron")])
            .unwrap();
        p.poll();
        assert!(p.is_ready());
        assert!(p.errors()[0].reason.contains("gltfModel"));
    }

    #[test]
    fn progress_reports_each_settled_request() {
        let loader = MemoryLoader::new(LoaderMode::Immediate)
            .with_payload("a", image())
            .with_payload("b", image());
        let mut p = pipeline(&loader);
        let progress = p.progress().listen();
        p.start(&[
            SourceEntry::single("a", SourceType::Texture, "a.png"),
            SourceEntry::single("b", SourceType::Texture, "b.png"),
        ])
        .unwrap();
        p.poll();

        let reports = progress.drain();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1], LoadProgress { url: "b.png".into(), loaded: 2, total: 2 });
    }

    // ── items ─────────────────────────────────────────────────────────────

    #[test]
    fn duplicate_names_keep_the_last_writer() {
        let loader = MemoryLoader::new(LoaderMode::Immediate).with_payload("dup", image());
        let mut p = pipeline(&loader);
        p.start(&[
            SourceEntry::single("dup", SourceType::Texture, "first.png"),
            SourceEntry::single("dup", SourceType::Texture, "second.png"),
        ])
        .unwrap();
        p.poll();

        assert_eq!(p.len(), 1);
        assert_eq!(p.scene.borrow().resources.texture_count(), 1);
    }

    #[test]
    fn wrong_getter_reports_the_expected_type() {
        let loader = MemoryLoader::new(LoaderMode::Immediate).with_payload("t", image());
        let mut p = pipeline(&loader);
        p.start(&[SourceEntry::single("t", SourceType::Texture, "t.png")]).unwrap();
        p.poll();
        assert!(matches!(
            p.model("t"),
            Err(LookupError::WrongItemType { expected: "model", .. })
        ));
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn destroy_releases_items_once() {
        let model = ModelData {
            nodes: vec![ModelNode {
                name: "body".into(),
                parent: None,
                translation: [0.0; 3],
                rotation: [0.0, 0.0, 0.0, 1.0],
                scale: [1.0; 3],
                mesh: Some(crate::backend::MeshData {
                    shape: crate::backend::MeshShape::Cuboid { size: [1.0; 3] },
                    material: Default::default(),
                }),
            }],
            animations: vec![],
        };
        let loader = MemoryLoader::new(LoaderMode::Immediate)
            .with_payload("t", image())
            .with_payload("fox", LoadedPayload::Model(model));
        let mut p = pipeline(&loader);
        p.start(&[
            SourceEntry::single("t", SourceType::Texture, "t.png"),
            SourceEntry::single("fox", SourceType::GltfModel, "fox.ron"),
        ])
        .unwrap();
        p.poll();

        let scene = p.scene.clone();
        p.destroy();
        p.destroy();
        // texture + geometry + material
        assert_eq!(scene.borrow_mut().resources.take_released().len(), 3);
        assert_eq!(scene.borrow().node_count(), 1);
        assert!(p.is_empty());
        assert_eq!(p.state(), PipelineState::Destroyed);
    }

    #[test]
    fn late_completions_after_destroy_are_discarded() {
        let loader = MemoryLoader::new(LoaderMode::Deferred).with_payload("t", image());
        let mut p = pipeline(&loader);
        p.start(&[SourceEntry::single("t", SourceType::Texture, "t.png")]).unwrap();
        p.destroy();

        loader.complete_all();
        assert_eq!(p.poll(), 1);
        assert!(p.is_empty());
        assert!(p.scene.borrow().resources.is_empty());
    }
}
