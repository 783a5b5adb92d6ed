use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::{LoaderRegistry, Manifest};
use crate::backend::DrawingSurface;
use crate::config::EngineConfig;
use crate::core::{Destroyable, Listenable, Registry, Shared};
use crate::debug::SharedDebugPanel;
use crate::error::Result;
use crate::event::Subscription;
use crate::holder::{CameraHolder, ControlsHolder, RendererHolder};
use crate::input::PointerEvent;
use crate::scene::{Scene, SharedScene};
use crate::size::{SizeSource, ViewportSize};
use crate::time::{Clock, FrameTime, TimeSource};
use crate::world::World;

/// Everything the host chooses when creating an [`Engine`].
pub struct EngineOptions {
    pub config: EngineConfig,
    pub manifest: Manifest,
    pub loaders: LoaderRegistry,
    pub debug: Option<SharedDebugPanel>,
}

impl EngineOptions {
    pub fn new(loaders: LoaderRegistry) -> Self {
        Self {
            config: EngineConfig::default(),
            manifest: Manifest::default_scene(),
            loaders,
            debug: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_debug(mut self, debug: Option<SharedDebugPanel>) -> Self {
        self.debug = debug;
        self
    }
}

/// Root orchestrator of the experience.
///
/// Owns the holders and the world, listens to the time and size sources, and fans
/// every tick, resize and pointer event out to the registered participants:
///
/// - updatables: controls, world, then the renderer as the frame's render pass
/// - resizables: camera, renderer
/// - destroyables: controls, renderer, world
/// - pointer-sensible: controls
pub struct Engine {
    scene: SharedScene,
    camera: Shared<CameraHolder>,
    world: Shared<World>,
    registry: Registry,

    sizes: Subscription<ViewportSize>,
    ticks: Subscription<FrameTime>,

    debug: Option<SharedDebugPanel>,
    destroyed: bool,
}

impl Engine {
    pub fn new<C: Clock>(
        surface: &mut dyn DrawingSurface,
        time: &mut TimeSource<C>,
        size: &mut SizeSource,
        options: EngineOptions,
    ) -> Result<Self> {
        let EngineOptions {
            config,
            manifest,
            loaders,
            debug,
        } = options;
        let viewport = size.size();

        let scene = Scene::shared();
        let camera = Rc::new(RefCell::new(CameraHolder::new(&config.camera, viewport)));
        let renderer = Rc::new(RefCell::new(RendererHolder::new(
            scene.clone(),
            camera.clone(),
            surface,
            viewport,
            &config.renderer,
        )?));
        let controls = Rc::new(RefCell::new(ControlsHolder::new(camera.clone(), &config.controls)));

        let world = match World::new(scene.clone(), loaders, &manifest, &config, debug.clone()) {
            Ok(world) => Rc::new(RefCell::new(world)),
            Err(err) => {
                renderer.borrow_mut().destroy();
                return Err(err.into());
            }
        };

        let mut registry = Registry::new();
        registry
            .add_updatable(controls.clone())
            .add_updatable(world.clone())
            .set_render_pass(renderer.clone())
            .add_resizable(camera.clone())
            .add_resizable(renderer.clone())
            .add_destroyable(controls.clone())
            .add_destroyable(renderer)
            .add_destroyable(world.clone())
            .add_pointer_sensible(controls);

        log::info!(
            "engine created: {}x{} @{}x, {} sources",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio,
            manifest.len()
        );

        Ok(Self {
            scene,
            camera,
            world,
            registry,
            sizes: size.listen(),
            ticks: time.listen(),
            debug,
            destroyed: false,
        })
    }

    /// Dispatches the size and time events queued since the last call.
    ///
    /// Only the latest size is applied; every tick is dispatched in order.
    pub fn pump(&mut self) -> Result<()> {
        if let Some(size) = self.sizes.latest() {
            self.resize(&size);
        }
        for time in self.ticks.drain() {
            self.update(&time)?;
        }
        Ok(())
    }

    pub fn resize(&mut self, size: &ViewportSize) {
        self.registry.resize(size);
    }

    pub fn update(&mut self, time: &FrameTime) -> Result<()> {
        self.registry.update(time)
    }

    pub fn react_to_pointer(&mut self, event: &PointerEvent) {
        self.registry.react_to_pointer(event);
    }

    /// Tears the experience down. Calling it again does nothing.
    ///
    /// Subscriptions go first, so no queued event reaches a half-destroyed
    /// participant. Then every mesh in the scene releases its geometry, material
    /// and textures, every destroyable is destroyed in registration order, and
    /// the debug panel is released.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        self.sizes.unsubscribe();
        self.ticks.unsubscribe();

        let released = {
            let mut scene = self.scene.borrow_mut();
            let root = scene.root();
            scene.dispose_meshes_under(root, true)
        };
        log::debug!("engine: released {released} scene resources");

        self.registry.destroy();
        self.registry.clear();

        if let Some(panel) = self.debug.take() {
            panel.borrow_mut().destroy();
        }
        log::info!("engine destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn scene(&self) -> &SharedScene {
        &self.scene
    }

    pub fn camera(&self) -> &Shared<CameraHolder> {
        &self.camera
    }

    pub fn world(&self) -> &Shared<World> {
        &self.world
    }

    pub fn world_is_ready(&self) -> bool {
        self.world.borrow().is_ready()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.destroy();
    }
}
