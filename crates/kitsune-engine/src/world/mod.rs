//! The world: everything that appears once the asset pipeline is ready.
//!
//! Until then the world only polls the pipeline. On the ready event it builds
//! the floor, the character and the environment (in that order, so the
//! environment map reaches every material), then forwards each tick to them.

mod character;
mod environment;
mod floor;

pub use character::Character;
pub use environment::Environment;
pub use floor::Floor;

use crate::assets::{AssetPipeline, LoaderRegistry, Manifest};
use crate::config::{CharacterConfig, EngineConfig, EnvironmentConfig, FloorConfig};
use crate::core::{Destroyable, Listenable, Updatable};
use crate::debug::SharedDebugPanel;
use crate::error::{ConfigurationError, LookupError, Result};
use crate::event::Subscription;
use crate::scene::SharedScene;
use crate::time::FrameTime;

/// Content built once resources are ready.
pub struct WorldContent {
    pub floor: Floor,
    pub character: Character,
    pub environment: Environment,
}

impl WorldContent {
    fn update(&mut self, time: &FrameTime) -> Result<()> {
        self.character.update(time)?;
        self.environment.update(time)
    }

    fn destroy(&mut self) {
        self.character.destroy();
        self.environment.destroy();
        self.floor.destroy();
    }
}

enum WorldState {
    Loading { ready: Subscription<()> },
    Ready(WorldContent),
    Failed,
    Destroyed,
}

#[derive(Debug, Clone)]
struct WorldConfig {
    floor: FloorConfig,
    character: CharacterConfig,
    environment: EnvironmentConfig,
}

pub struct World {
    scene: SharedScene,
    pipeline: AssetPipeline,
    config: WorldConfig,
    debug: Option<SharedDebugPanel>,
    state: WorldState,
}

impl World {
    /// Starts loading `manifest`. Fails before any request is sent if an entry is
    /// malformed or has no loader.
    pub fn new(
        scene: SharedScene,
        loaders: LoaderRegistry,
        manifest: &Manifest,
        config: &EngineConfig,
        debug: Option<SharedDebugPanel>,
    ) -> Result<Self, ConfigurationError> {
        let mut pipeline = AssetPipeline::new(loaders, scene.clone());
        let ready = pipeline.listen();
        pipeline.start(&manifest.sources)?;

        Ok(Self {
            scene,
            pipeline,
            config: WorldConfig {
                floor: config.floor.clone(),
                character: config.character.clone(),
                environment: config.environment.clone(),
            },
            debug,
            state: WorldState::Loading { ready },
        })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, WorldState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, WorldState::Failed)
    }

    pub fn content(&self) -> Option<&WorldContent> {
        match &self.state {
            WorldState::Ready(content) => Some(content),
            _ => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut WorldContent> {
        match &mut self.state {
            WorldState::Ready(content) => Some(content),
            _ => None,
        }
    }

    pub fn pipeline(&self) -> &AssetPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut AssetPipeline {
        &mut self.pipeline
    }

    /// Builds every piece of content, tearing down what was built if a later
    /// piece fails.
    fn build_content(&self) -> Result<WorldContent, LookupError> {
        let debug = self.debug.as_ref();
        let mut floor = Floor::build(&self.scene, &self.pipeline, &self.config.floor)?;

        let mut character =
            match Character::build(&self.scene, &self.pipeline, &self.config.character, debug) {
                Ok(character) => character,
                Err(err) => {
                    floor.destroy();
                    return Err(err);
                }
            };

        let environment =
            match Environment::build(&self.scene, &self.pipeline, &self.config.environment, debug) {
                Ok(environment) => environment,
                Err(err) => {
                    character.destroy();
                    floor.destroy();
                    return Err(err);
                }
            };

        Ok(WorldContent {
            floor,
            character,
            environment,
        })
    }
}

impl Updatable for World {
    /// Polls the pipeline while loading, then drives the content.
    ///
    /// A lookup failure while building leaves the world `Failed` and is returned
    /// once; later ticks do nothing.
    fn update(&mut self, time: &FrameTime) -> Result<()> {
        let became_ready = match &self.state {
            WorldState::Loading { ready } => {
                self.pipeline.poll();
                ready.try_recv().is_some()
            }
            _ => false,
        };

        if became_ready {
            log::info!("Resources are ready");
            match self.build_content() {
                Ok(content) => self.state = WorldState::Ready(content),
                Err(err) => {
                    log::error!("failed to build the world: {err}");
                    self.state = WorldState::Failed;
                    return Err(err.into());
                }
            }
        }

        if let WorldState::Ready(content) = &mut self.state {
            content.update(time)?;
        }
        Ok(())
    }
}

impl Destroyable for World {
    fn destroy(&mut self) {
        match std::mem::replace(&mut self.state, WorldState::Destroyed) {
            WorldState::Destroyed => return,
            WorldState::Loading { mut ready } => ready.unsubscribe(),
            WorldState::Ready(mut content) => content.destroy(),
            WorldState::Failed => {}
        }
        self.pipeline.destroy();
        log::debug!("world destroyed");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::assets::SourceType;
    use crate::backend::headless::{LoaderMode, MemoryLoader};
    use crate::debug::{DebugPanel, TunableRange, Tweak};
    use crate::scene::{NodeKind, Scene};

    fn loaders(loader: &MemoryLoader) -> LoaderRegistry {
        LoaderRegistry::new()
            .with(SourceType::Texture, loader.clone())
            .with(SourceType::CubeTexture, loader.clone())
            .with(SourceType::GltfModel, loader.clone())
    }

    fn frame(delta: f64) -> FrameTime {
        FrameTime {
            delta,
            ..FrameTime::default()
        }
    }

    fn world(loader: &MemoryLoader, debug: Option<SharedDebugPanel>) -> (SharedScene, World) {
        let scene = Scene::shared();
        let world = World::new(
            scene.clone(),
            loaders(loader),
            &Manifest::default_scene(),
            &EngineConfig::default(),
            debug,
        )
        .unwrap();
        (scene, world)
    }

    #[derive(Default)]
    struct RecordingPanel {
        tunables: Vec<(String, String, Tweak)>,
        actions: Vec<(String, String, Box<dyn FnMut()>)>,
    }

    impl DebugPanel for RecordingPanel {
        fn add_tunable(&mut self, folder: &str, tweak: Tweak, range: TunableRange) {
            self.tunables.push((folder.to_string(), range.label, tweak));
        }

        fn add_action(&mut self, folder: &str, label: &str, action: Box<dyn FnMut()>) {
            self.actions.push((folder.to_string(), label.to_string(), action));
        }

        fn destroy(&mut self) {}
    }

    // ── loading ───────────────────────────────────────────────────────────

    #[test]
    fn content_waits_for_every_resource() {
        let loader = MemoryLoader::new(LoaderMode::Deferred).with_default_scene();
        let (_scene, mut w) = world(&loader, None);

        loader.complete_next();
        w.update(&frame(16.0)).unwrap();
        assert!(!w.is_ready());

        loader.complete_all();
        w.update(&frame(16.0)).unwrap();
        assert!(w.is_ready());
    }

    #[test]
    fn ready_world_populates_the_scene() {
        let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
        let (scene, mut w) = world(&loader, None);
        w.update(&frame(0.0)).unwrap();

        let content = w.content().unwrap();
        assert_eq!(content.character.current_animation(), "idle");

        let scene = scene.borrow();
        // floor + body + head
        assert_eq!(scene.visible_meshes().len(), 3);
        assert_eq!(scene.lights().len(), 1);
        assert!(scene.environment().is_some());

        let floor = scene.node(content.floor.mesh().unwrap()).unwrap();
        assert!(floor.receive_shadow);
        let (_, material) = floor.mesh_parts().unwrap();
        assert!(scene.resources.material(material).unwrap().env_map.is_some());
    }

    #[test]
    fn missing_texture_fails_the_build_and_cleans_up() {
        let loader = MemoryLoader::new(LoaderMode::Immediate)
            .with_default_scene()
            .with_failure("environmentMapTexture", "404");
        let (scene, mut w) = world(&loader, None);

        let err = w.update(&frame(0.0)).unwrap_err();
        assert!(err.to_string().contains("environmentMapTexture"));
        assert!(w.is_failed());
        assert!(scene.borrow().visible_meshes().is_empty());

        // Later ticks are inert.
        w.update(&frame(16.0)).unwrap();
    }

    // ── content ───────────────────────────────────────────────────────────

    #[test]
    fn debug_actions_switch_clips() {
        let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
        let panel = Rc::new(RefCell::new(RecordingPanel::default()));
        let shared: SharedDebugPanel = panel.clone();
        let (_scene, mut w) = world(&loader, Some(shared));
        w.update(&frame(0.0)).unwrap();

        {
            let mut panel = panel.borrow_mut();
            let labels: Vec<_> = panel.actions.iter().map(|(f, l, _)| (f.as_str(), l.as_str())).collect();
            assert_eq!(labels, vec![("fox", "playIdle"), ("fox", "playWalking"), ("fox", "playRunning")]);
            (panel.actions[2].2)();
        }
        w.update(&frame(16.0)).unwrap();
        assert_eq!(w.content().unwrap().character.current_animation(), "running");
    }

    #[test]
    fn sun_intensity_tweak_reaches_the_light() {
        let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
        let panel = Rc::new(RefCell::new(RecordingPanel::default()));
        let shared: SharedDebugPanel = panel.clone();
        let (scene, mut w) = world(&loader, Some(shared));
        w.update(&frame(0.0)).unwrap();

        let labels: Vec<String> = panel.borrow().tunables.iter().map(|(_, l, _)| l.clone()).collect();
        assert_eq!(
            labels,
            vec!["sunLightIntensity", "sunLightX", "sunLightY", "sunLightZ", "envMapIntensity"]
        );

        panel.borrow().tunables[0].2.set(7.5);
        w.update(&frame(16.0)).unwrap();

        let sun = w.content().unwrap().environment.sun().unwrap();
        let scene = scene.borrow();
        match &scene.node(sun).unwrap().kind {
            NodeKind::DirectionalLight(light) => assert_eq!(light.intensity, 7.5),
            other => panic!("unexpected node kind {other:?}"),
        }
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn destroy_clears_the_scene_and_is_idempotent() {
        let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
        let (scene, mut w) = world(&loader, None);
        w.update(&frame(0.0)).unwrap();

        w.destroy();
        w.destroy();

        let scene = scene.borrow();
        assert_eq!(scene.node_count(), 1);
        assert!(scene.environment().is_none());
        assert!(scene.resources.is_empty());
    }

    #[test]
    fn destroy_while_loading_discards_late_completions() {
        let loader = MemoryLoader::new(LoaderMode::Deferred).with_default_scene();
        let (scene, mut w) = world(&loader, None);

        w.destroy();
        loader.complete_all();
        w.update(&frame(16.0)).unwrap();

        assert!(!w.is_ready());
        assert_eq!(scene.borrow().node_count(), 1);
    }
}
