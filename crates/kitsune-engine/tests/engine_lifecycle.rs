use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use kitsune_engine::assets::{LoaderRegistry, Manifest, SourceEntry, SourceType};
use kitsune_engine::backend::headless::{HeadlessStats, HeadlessSurface, LoaderMode, MemoryLoader};
use kitsune_engine::debug::{DebugPanel, SharedDebugPanel, TunableRange, Tweak};
use kitsune_engine::error::{ConfigurationError, LookupError};
use kitsune_engine::input::{MouseButton, PointerEvent};
use kitsune_engine::size::SizeSource;
use kitsune_engine::time::{FrameTime, ManualClock, TimeSource};
use kitsune_engine::{Engine, EngineError, EngineOptions};

struct Harness {
    engine: Engine,
    clock: ManualClock,
    time: TimeSource<ManualClock>,
    size: SizeSource,
    stats: Rc<RefCell<HeadlessStats>>,
}

impl Harness {
    fn frame(&mut self) {
        self.clock.advance(16.0);
        self.time.tick();
        self.engine.pump().unwrap();
    }
}

fn loaders(loader: &MemoryLoader) -> LoaderRegistry {
    LoaderRegistry::new()
        .with(SourceType::Texture, loader.clone())
        .with(SourceType::CubeTexture, loader.clone())
        .with(SourceType::GltfModel, loader.clone())
}

fn try_start(loader: &MemoryLoader, manifest: Manifest, debug: Option<SharedDebugPanel>) -> (Result<Engine, EngineError>, HeadlessSurface) {
    let mut surface = HeadlessSurface::new();
    let clock = ManualClock::new(1_000.0);
    let mut time = TimeSource::with_clock(clock);
    let mut size = SizeSource::new(800.0, 600.0, 1.0);
    let options = EngineOptions::new(loaders(loader))
        .with_manifest(manifest)
        .with_debug(debug);
    let engine = Engine::new(&mut surface, &mut time, &mut size, options);
    (engine, surface)
}

fn start(loader: &MemoryLoader, debug: Option<SharedDebugPanel>) -> Harness {
    let mut surface = HeadlessSurface::new();
    let stats = surface.stats();
    let clock = ManualClock::new(1_000.0);
    let mut time = TimeSource::with_clock(clock.clone());
    let mut size = SizeSource::new(800.0, 600.0, 1.0);
    let options = EngineOptions::new(loaders(loader)).with_debug(debug);
    let engine = Engine::new(&mut surface, &mut time, &mut size, options).unwrap();
    Harness {
        engine,
        clock,
        time,
        size,
        stats,
    }
}

fn ready_harness() -> Harness {
    let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
    let mut h = start(&loader, None);
    h.frame();
    assert!(h.engine.world_is_ready());
    h
}

#[derive(Default)]
struct RecordingPanel {
    tunables: Vec<(String, String, Tweak)>,
    actions: Vec<(String, String)>,
    destroyed: usize,
}

impl DebugPanel for RecordingPanel {
    fn add_tunable(&mut self, folder: &str, tweak: Tweak, range: TunableRange) {
        self.tunables.push((folder.to_string(), range.label, tweak));
    }

    fn add_action(&mut self, folder: &str, label: &str, _action: Box<dyn FnMut()>) {
        self.actions.push((folder.to_string(), label.to_string()));
    }

    fn destroy(&mut self) {
        self.destroyed += 1;
    }
}

// ── loading ──────────────────────────────────────────────────────────────

#[test]
fn world_is_built_once_after_every_source_settles() {
    let loader = MemoryLoader::new(LoaderMode::Deferred).with_default_scene();
    let mut h = start(&loader, None);

    h.frame();
    assert!(!h.engine.world_is_ready());
    assert_eq!(loader.requests().len(), 4);

    loader.complete_all();
    for _ in 0..4 {
        h.frame();
    }

    assert!(h.engine.world_is_ready());
    let scene = h.engine.scene().borrow();
    assert_eq!(scene.lights().len(), 1);
    assert_eq!(scene.visible_meshes().len(), 3);
    assert_eq!(h.stats.borrow().renders, 5);
}

#[test]
fn single_and_multi_file_sources_yield_two_items() {
    let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
    let manifest = Manifest::new(vec![
        SourceEntry::single("grassColorTexture", SourceType::Texture, "textures/dirt/color.png"),
        SourceEntry::multi(
            "environmentMapTexture",
            SourceType::CubeTexture,
            (0..6).map(|i| format!("textures/environmentMap/{i}.png")).collect(),
        ),
    ]);
    let (engine, _surface) = try_start(&loader, manifest, None);
    let mut engine = engine.unwrap();

    // The floor needs a normal map this manifest does not declare.
    let err = engine.update(&FrameTime::default()).unwrap_err();
    assert!(matches!(err, EngineError::Lookup(LookupError::MissingItem { .. })));

    let world = engine.world().borrow();
    let pipeline = world.pipeline();
    assert_eq!(pipeline.len(), 2);
    assert!(pipeline.texture("grassColorTexture").is_ok());
    assert!(pipeline.cube_texture("environmentMapTexture").is_ok());
    assert!(world.is_failed());
}

#[test]
fn missing_path_is_rejected_before_any_request() {
    let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
    let mut sources = Manifest::default_scene().sources;
    sources[1].path = None;

    let (engine, surface) = try_start(&loader, Manifest::new(sources), None);
    let Err(err) = engine else {
        panic!("engine started with an invalid manifest");
    };

    assert!(matches!(
        err,
        EngineError::Configuration(ConfigurationError::MissingPath { .. })
    ));
    assert!(loader.requests().is_empty());
    // The renderer created before the world is released again.
    assert_eq!(surface.stats().borrow().disposals, 1);
}

#[test]
fn backend_failure_surfaces_to_the_host() {
    let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
    let mut surface = HeadlessSurface::failing();
    let mut time = TimeSource::with_clock(ManualClock::new(0.0));
    let mut size = SizeSource::new(800.0, 600.0, 1.0);

    let result = Engine::new(&mut surface, &mut time, &mut size, EngineOptions::new(loaders(&loader)));
    assert!(matches!(result, Err(EngineError::Backend(_))));
    assert!(loader.requests().is_empty());
}

// ── per-frame dispatch ───────────────────────────────────────────────────

#[test]
fn resize_and_update_before_content_are_harmless() {
    let loader = MemoryLoader::new(LoaderMode::Deferred).with_default_scene();
    let mut h = start(&loader, None);

    h.size.resize(1024.0, 768.0, 3.0);
    h.engine.pump().unwrap();
    h.engine.update(&FrameTime::default()).unwrap();

    let stats = h.stats.borrow();
    assert_eq!(stats.size, (1024.0, 768.0));
    assert_eq!(stats.pixel_ratio, 2.0);
    let aspect = h.engine.camera().borrow().camera().aspect;
    assert!((aspect - 1024.0 / 768.0).abs() < 1e-6);
}

#[test]
fn render_pass_sees_the_world_built_in_the_same_frame() {
    let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
    let mut h = start(&loader, None);

    h.frame();

    let stats = h.stats.borrow();
    assert_eq!(stats.renders, 1);
    assert_eq!(stats.meshes_last_frame, 3);
    assert_eq!(stats.lights_last_frame, 1);
}

#[test]
fn pointer_drag_orbits_the_camera() {
    let mut h = ready_harness();
    let before = h.engine.camera().borrow().camera().position;

    h.engine.react_to_pointer(&PointerEvent::pressed(MouseButton::Left, 100.0, 100.0));
    h.engine.react_to_pointer(&PointerEvent::moved(160.0, 100.0));
    h.engine.react_to_pointer(&PointerEvent::released(MouseButton::Left, 160.0, 100.0));
    h.frame();

    let after = h.engine.camera().borrow().camera().position;
    assert!(before.distance(after) > 1e-3);
}

// ── character ────────────────────────────────────────────────────────────

#[test]
fn clips_switch_by_name() {
    let h = ready_harness();
    let mut world = h.engine.world().borrow_mut();
    let character = &mut world.content_mut().unwrap().character;
    assert_eq!(character.current_animation(), "idle");

    character.play("walking").unwrap();
    character.play("running").unwrap();
    assert_eq!(character.current_animation(), "running");
    assert!(character.animation().clip("idle").is_some());
    assert!(character.animation().clip("walking").is_some());

    let err = character.play("jump").unwrap_err();
    assert_eq!(err, LookupError::MissingClip { name: "jump".to_string() });
    assert_eq!(character.current_animation(), "running");
}

#[test]
fn debug_panel_receives_tunables_and_actions() {
    let loader = MemoryLoader::new(LoaderMode::Immediate).with_default_scene();
    let panel = Rc::new(RefCell::new(RecordingPanel::default()));
    let shared: SharedDebugPanel = panel.clone();
    let mut h = start(&loader, Some(shared));
    h.frame();

    {
        let panel = panel.borrow();
        assert_eq!(panel.actions.len(), 3);
        assert!(panel.actions.iter().all(|(folder, _)| folder == "fox"));
        assert_eq!(panel.tunables.len(), 5);
        assert!(panel.tunables.iter().all(|(folder, _, _)| folder == "environment"));
    }

    h.engine.destroy();
    h.engine.destroy();
    assert_eq!(panel.borrow().destroyed, 1);
}

// ── teardown ─────────────────────────────────────────────────────────────

#[test]
fn destroy_is_idempotent_and_releases_each_resource_once() {
    let mut h = ready_harness();
    h.frame();

    h.engine.destroy();
    h.engine.destroy();
    assert!(h.engine.is_destroyed());

    assert_eq!(h.stats.borrow().disposals, 1);

    let mut scene = h.engine.scene().borrow_mut();
    let released = scene.resources.take_released();
    let unique: HashSet<_> = released.iter().copied().collect();
    assert_eq!(unique.len(), released.len());
    // floor: 2 textures, geometry, material; fox: 2 geometries, 2 materials; env map
    assert_eq!(released.len(), 9);
    assert!(scene.resources.is_empty());
    assert_eq!(scene.node_count(), 1);
}

#[test]
fn ticks_after_destroy_are_ignored() {
    let mut h = ready_harness();
    h.engine.destroy();
    let renders = h.stats.borrow().renders;

    h.frame();
    h.size.resize(400.0, 300.0, 1.0);
    h.engine.pump().unwrap();

    assert_eq!(h.stats.borrow().renders, renders);
    assert_eq!(h.time.subscriber_count(), 0);
}
