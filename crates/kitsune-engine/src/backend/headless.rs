//! In-memory backend.
//!
//! `HeadlessSurface` creates renderers that draw nothing but record what they were
//! asked to do; `MemoryLoader` serves preset payloads. Both back the tests and the
//! viewer's `--headless-frames` mode.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::camera::PerspectiveCamera;
use crate::error::{BackendError, Result};
use crate::scene::{ImageData, ReleasedResource, Scene};

use super::loader::{AssetLoader, Completion, LoadRequest, LoadedPayload};
use super::model::{ClipData, MaterialData, MeshData, MeshShape, ModelData, ModelNode, TrackData, TrackProperty};
use super::render::{DrawingSurface, RenderDevice, RendererSettings};

/// Everything the headless renderer observed.
#[derive(Debug, Default, Clone)]
pub struct HeadlessStats {
    pub renderers_created: usize,
    pub settings: Option<RendererSettings>,
    pub size: (f64, f64),
    pub pixel_ratio: f64,
    pub renders: usize,
    pub meshes_last_frame: usize,
    pub lights_last_frame: usize,
    pub released: Vec<ReleasedResource>,
    pub disposals: usize,
}

#[derive(Debug, Default)]
pub struct HeadlessSurface {
    stats: Rc<RefCell<HeadlessStats>>,
    fail_creation: bool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose renderer creation always fails.
    pub fn failing() -> Self {
        Self {
            fail_creation: true,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> Rc<RefCell<HeadlessStats>> {
        self.stats.clone()
    }
}

impl DrawingSurface for HeadlessSurface {
    fn create_renderer(&mut self, settings: &RendererSettings) -> Result<Box<dyn RenderDevice>> {
        if self.fail_creation {
            return Err(BackendError::new("headless surface refused to create a renderer").into());
        }
        let mut stats = self.stats.borrow_mut();
        stats.renderers_created += 1;
        stats.settings = Some(settings.clone());
        Ok(Box::new(HeadlessRenderer {
            stats: self.stats.clone(),
        }))
    }
}

pub struct HeadlessRenderer {
    stats: Rc<RefCell<HeadlessStats>>,
}

impl RenderDevice for HeadlessRenderer {
    fn set_size(&mut self, width: f64, height: f64) {
        self.stats.borrow_mut().size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.stats.borrow_mut().pixel_ratio = ratio;
    }

    fn render(&mut self, scene: &mut Scene, _camera: &PerspectiveCamera) -> Result<()> {
        let released = scene.resources.take_released();
        let meshes = scene
            .visible_meshes()
            .into_iter()
            .filter(|m| scene.resources.geometry(m.geometry).is_some())
            .count();
        let lights = scene.lights().len();

        let mut stats = self.stats.borrow_mut();
        stats.released.extend(released);
        stats.renders += 1;
        stats.meshes_last_frame = meshes;
        stats.lights_last_frame = lights;
        Ok(())
    }

    fn dispose(&mut self) {
        self.stats.borrow_mut().disposals += 1;
    }
}

/// How a [`MemoryLoader`] answers requests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoaderMode {
    /// Completes inside `load`.
    Immediate,
    /// Holds completions until `complete_next`/`complete_all`.
    Deferred,
}

#[derive(Default)]
struct MemoryLoaderState {
    payloads: HashMap<String, std::result::Result<LoadedPayload, String>>,
    requests: Vec<LoadRequest>,
    pending: Vec<(LoadRequest, Completion)>,
}

/// Loader serving preset payloads keyed by resource name.
///
/// Clones share state, so a test can hand one clone to the pipeline and keep
/// another to inspect requests or release deferred completions.
#[derive(Clone)]
pub struct MemoryLoader {
    mode: LoaderMode,
    state: Rc<RefCell<MemoryLoaderState>>,
}

impl MemoryLoader {
    pub fn new(mode: LoaderMode) -> Self {
        Self {
            mode,
            state: Rc::default(),
        }
    }

    pub fn with_payload(self, name: impl Into<String>, payload: LoadedPayload) -> Self {
        self.state.borrow_mut().payloads.insert(name.into(), Ok(payload));
        self
    }

    pub fn with_failure(self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.state
            .borrow_mut()
            .payloads
            .insert(name.into(), Err(reason.into()));
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<LoadRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Completes the oldest deferred request. Returns false when none is pending.
    pub fn complete_next(&self) -> bool {
        let next = {
            let mut state = self.state.borrow_mut();
            if state.pending.is_empty() {
                None
            } else {
                Some(state.pending.remove(0))
            }
        };
        match next {
            Some((request, completion)) => {
                self.answer(&request, completion);
                true
            }
            None => false,
        }
    }

    pub fn complete_all(&self) -> usize {
        let mut n = 0;
        while self.complete_next() {
            n += 1;
        }
        n
    }

    fn answer(&self, request: &LoadRequest, completion: Completion) {
        let outcome = self.state.borrow().payloads.get(&request.name).cloned();
        match outcome {
            Some(Ok(payload)) => completion.resolve(payload),
            Some(Err(reason)) => completion.fail(reason),
            None => completion.fail(format!("no payload registered for '{}'", request.name)),
        }
    }
}

impl MemoryLoader {
    /// Registers stand-in payloads for every source of `Manifest::default_scene`.
    pub fn with_default_scene(self) -> Self {
        let face = |rgba| ImageData::solid(4, 4, rgba);
        self.with_payload(
            "environmentMapTexture",
            LoadedPayload::CubeTexture(vec![face([200, 210, 230, 255]); 6]),
        )
        .with_payload("grassColorTexture", LoadedPayload::Texture(face([96, 80, 60, 255])))
        .with_payload("grassNormalTexture", LoadedPayload::Texture(face([128, 128, 255, 255])))
        .with_payload("foxModel", LoadedPayload::Model(sample_fox()))
    }
}

/// Two-box fox with `Survey`, `Walk` and `Run` clips on its body.
pub fn sample_fox() -> ModelData {
    let orange = MaterialData {
        color: [0.9, 0.45, 0.1],
        ..MaterialData::default()
    };
    let node = |name: &str, parent, translation, size| ModelNode {
        name: name.to_string(),
        parent,
        translation,
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
        mesh: Some(MeshData {
            shape: MeshShape::Cuboid { size },
            material: orange.clone(),
        }),
    };
    let bob = |name: &str, period: f32, height: f32| ClipData {
        name: name.to_string(),
        tracks: vec![TrackData {
            node: 0,
            property: TrackProperty::Translation,
            times: vec![0.0, period * 0.5, period],
            values: vec![0.0, 20.0, 0.0, 0.0, 20.0 + height, 0.0, 0.0, 20.0, 0.0],
        }],
    };

    ModelData {
        nodes: vec![
            node("body", None, [0.0, 20.0, 0.0], [20.0, 16.0, 40.0]),
            node("head", Some(0), [0.0, 12.0, 24.0], [14.0, 14.0, 14.0]),
        ],
        animations: vec![bob("Survey", 2.0, 0.5), bob("Walk", 1.0, 2.0), bob("Run", 0.5, 4.0)],
    }
}

impl AssetLoader for MemoryLoader {
    fn load(&self, request: LoadRequest, completion: Completion) {
        self.state.borrow_mut().requests.push(request.clone());
        match self.mode {
            LoaderMode::Immediate => self.answer(&request, completion),
            LoaderMode::Deferred => self.state.borrow_mut().pending.push((request, completion)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SourceType;
    use crate::backend::Completed;
    use crate::scene::{Geometry, Material, Node};
    use crossbeam_channel::unbounded;

    fn request(name: &str) -> LoadRequest {
        LoadRequest {
            name: name.to_string(),
            kind: SourceType::Texture,
            urls: vec![format!("{name}.png")],
        }
    }

    fn outcomes(rx: &crossbeam_channel::Receiver<Completed>) -> Vec<bool> {
        rx.try_iter().map(|c| c.result.is_ok()).collect()
    }

    #[test]
    fn immediate_loader_answers_inside_load() {
        let loader = MemoryLoader::new(LoaderMode::Immediate)
            .with_payload("a", LoadedPayload::Texture(ImageData::solid(1, 1, [0; 4])));
        let (tx, rx) = unbounded();

        loader.load(request("a"), Completion::new(0, "a.png".into(), tx.clone()));
        loader.load(request("b"), Completion::new(1, "b.png".into(), tx));

        assert_eq!(outcomes(&rx), vec![true, false]);
        assert_eq!(loader.requests().len(), 2);
    }

    #[test]
    fn deferred_loader_waits_for_the_test() {
        let loader = MemoryLoader::new(LoaderMode::Deferred).with_failure("a", "404");
        let (tx, rx) = unbounded();
        loader.load(request("a"), Completion::new(0, "a.png".into(), tx));

        assert!(rx.try_recv().is_err());
        assert_eq!(loader.pending(), 1);
        assert_eq!(loader.complete_all(), 1);
        assert_eq!(outcomes(&rx), vec![false]);
    }

    #[test]
    fn renderer_records_frames_and_releases() {
        let mut surface = HeadlessSurface::new();
        let stats = surface.stats();
        let mut renderer = surface.create_renderer(&RendererSettings::default()).unwrap();

        let mut scene = Scene::new();
        let g = scene.resources.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0));
        let m = scene.resources.add_material(Material::standard());
        let root = scene.root();
        scene.spawn(root, Node::mesh("box", g, m));

        let camera = PerspectiveCamera::new(35.0, 1.0, 0.1, 100.0);
        renderer.render(&mut scene, &camera).unwrap();
        assert_eq!(stats.borrow().meshes_last_frame, 1);

        scene.resources.dispose_geometry(g);
        renderer.render(&mut scene, &camera).unwrap();
        let stats = stats.borrow();
        assert_eq!(stats.renders, 2);
        assert_eq!(stats.meshes_last_frame, 0);
        assert_eq!(stats.released, vec![ReleasedResource::Geometry(g)]);
    }

    #[test]
    fn failing_surface_reports_backend_error() {
        let mut surface = HeadlessSurface::failing();
        let err = surface.create_renderer(&RendererSettings::default()).err().unwrap();
        assert!(err.to_string().contains("graphics backend"));
    }
}
