use glam::Vec3;

use crate::assets::AssetPipeline;
use crate::config::EnvironmentConfig;
use crate::core::{Destroyable, Updatable};
use crate::debug::{SharedDebugPanel, TunableRange, Tweak};
use crate::error::{LookupError, Result};
use crate::scene::{ColorSpace, DirectionalLight, Node, NodeId, NodeKind, Scene, SharedScene, TextureId, Transform};
use crate::time::FrameTime;

const FOLDER: &str = "environment";
const STEP: f32 = 0.001;

struct Tweaks {
    sun_intensity: Tweak,
    sun_x: Tweak,
    sun_y: Tweak,
    sun_z: Tweak,
    env_map_intensity: Tweak,
}

impl Tweaks {
    fn new(config: &EnvironmentConfig) -> Self {
        let [x, y, z] = config.sun_position;
        Self {
            sun_intensity: Tweak::new(config.sun_intensity),
            sun_x: Tweak::new(x),
            sun_y: Tweak::new(y),
            sun_z: Tweak::new(z),
            env_map_intensity: Tweak::new(config.env_map_intensity),
        }
    }

    fn register(&self, panel: &SharedDebugPanel) {
        let mut panel = panel.borrow_mut();
        let entries = [
            (&self.sun_intensity, TunableRange::new("sunLightIntensity", 0.0, 10.0, STEP)),
            (&self.sun_x, TunableRange::new("sunLightX", -5.0, 5.0, STEP)),
            (&self.sun_y, TunableRange::new("sunLightY", -5.0, 5.0, STEP)),
            (&self.sun_z, TunableRange::new("sunLightZ", -5.0, 5.0, STEP)),
            (&self.env_map_intensity, TunableRange::new("envMapIntensity", 0.0, 4.0, STEP)),
        ];
        for (tweak, range) in entries {
            panel.add_tunable(FOLDER, tweak.clone(), range);
        }
    }

    fn sun_position(&self) -> Vec3 {
        Vec3::new(self.sun_x.get(), self.sun_y.get(), self.sun_z.get())
    }
}

/// Sun light plus the environment map applied to every lit material.
pub struct Environment {
    scene: SharedScene,
    sun: Option<NodeId>,
    env_map: TextureId,
    tweaks: Tweaks,
}

impl Environment {
    pub fn build(
        scene: &SharedScene,
        assets: &AssetPipeline,
        config: &EnvironmentConfig,
        debug: Option<&SharedDebugPanel>,
    ) -> Result<Self, LookupError> {
        let env_map = assets.cube_texture(&config.env_map_texture)?;
        let tweaks = Tweaks::new(config);

        let mut light = DirectionalLight::new(config.sun_color, config.sun_intensity);
        light.shadow.camera_far = config.shadow_camera_far;
        light.shadow.map_size = config.shadow_map_size;
        light.shadow.normal_bias = config.shadow_normal_bias;

        let mut node = Node::new("sunLight", NodeKind::DirectionalLight(light))
            .with_transform(Transform::from_translation(tweaks.sun_position()));
        node.cast_shadow = true;

        let mut s = scene.borrow_mut();
        let root = s.root();
        let sun = s.spawn(root, node);

        if let Some(texture) = s.resources.texture_mut(env_map) {
            texture.configure(|t| t.color_space = ColorSpace::Srgb);
        }
        s.set_environment(Some(env_map));
        let updated = update_materials(&mut s, env_map, tweaks.env_map_intensity.get());
        log::debug!("environment map applied to {updated} materials");
        drop(s);

        if let Some(panel) = debug {
            tweaks.register(panel);
        }

        Ok(Self {
            scene: scene.clone(),
            sun: Some(sun),
            env_map,
            tweaks,
        })
    }

    pub fn sun(&self) -> Option<NodeId> {
        self.sun
    }

    pub fn sun_intensity(&self) -> Tweak {
        self.tweaks.sun_intensity.clone()
    }

    pub fn env_map_intensity(&self) -> Tweak {
        self.tweaks.env_map_intensity.clone()
    }

    /// Re-applies the environment map to every lit mesh material in the scene.
    pub fn update_materials(&self) -> usize {
        let mut scene = self.scene.borrow_mut();
        update_materials(&mut scene, self.env_map, self.tweaks.env_map_intensity.get())
    }
}

fn update_materials(scene: &mut Scene, env_map: TextureId, intensity: f32) -> usize {
    let root = scene.root();
    let mut updated = 0;
    for (_, _, material) in scene.meshes_under(root) {
        let Some(material) = scene.resources.material_mut(material) else {
            continue;
        };
        if !material.is_env_mappable() {
            continue;
        }
        material.env_map = Some(env_map);
        material.env_map_intensity = intensity;
        material.needs_update = true;
        updated += 1;
    }
    updated
}

impl Updatable for Environment {
    fn update(&mut self, _time: &FrameTime) -> Result<()> {
        let Some(sun) = self.sun else {
            return Ok(());
        };
        let t = &self.tweaks;
        let intensity_changed = t.sun_intensity.take_changed();
        // Non-short-circuiting so every flag is cleared.
        let moved = t.sun_x.take_changed() | t.sun_y.take_changed() | t.sun_z.take_changed();

        if intensity_changed || moved {
            let mut scene = self.scene.borrow_mut();
            if let Some(node) = scene.node_mut(sun) {
                node.transform.translation = t.sun_position();
                if let NodeKind::DirectionalLight(light) = &mut node.kind {
                    light.intensity = t.sun_intensity.get();
                }
            }
        }
        if t.env_map_intensity.take_changed() {
            self.update_materials();
        }
        Ok(())
    }
}

impl Destroyable for Environment {
    /// Removes the sun and clears the scene environment. The cube texture itself
    /// belongs to the asset pipeline.
    fn destroy(&mut self) {
        let Some(sun) = self.sun.take() else {
            return;
        };
        let mut scene = self.scene.borrow_mut();
        scene.remove_subtree(sun);
        if scene.environment() == Some(self.env_map) {
            scene.set_environment(None);
        }
    }
}
