use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec2};

use crate::assets::AssetPipeline;
use crate::config::FloorConfig;
use crate::core::Destroyable;
use crate::error::LookupError;
use crate::scene::{ColorSpace, Geometry, GeometryId, Material, MaterialId, Node, NodeId, SharedScene, Transform, Wrapping};

/// Textured ground disc lying flat under the character.
pub struct Floor {
    scene: SharedScene,
    mesh: Option<NodeId>,
    geometry: GeometryId,
    material: MaterialId,
}

impl Floor {
    /// Builds the floor from the resolved color and normal textures.
    pub fn build(scene: &SharedScene, assets: &AssetPipeline, config: &FloorConfig) -> Result<Self, LookupError> {
        let color = assets.texture(&config.color_texture)?;
        let normal = assets.texture(&config.normal_texture)?;
        let repeat = Vec2::from_array(config.texture_repeat);

        let mut s = scene.borrow_mut();
        if let Some(texture) = s.resources.texture_mut(color) {
            texture.configure(|t| {
                t.color_space = ColorSpace::Srgb;
                t.repeat = repeat;
                t.wrap_s = Wrapping::Repeat;
                t.wrap_t = Wrapping::Repeat;
            });
        }
        if let Some(texture) = s.resources.texture_mut(normal) {
            texture.configure(|t| {
                t.repeat = repeat;
                t.wrap_s = Wrapping::Repeat;
                t.wrap_t = Wrapping::Repeat;
            });
        }

        let geometry = s.resources.add_geometry(Geometry::circle(config.radius, config.segments));
        let material = s
            .resources
            .add_material(Material::standard().with_map(color).with_normal_map(normal));

        let mut node = Node::mesh("floor", geometry, material)
            .with_transform(Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)));
        node.receive_shadow = true;
        let root = s.root();
        let mesh = s.spawn(root, node);

        Ok(Self {
            scene: scene.clone(),
            mesh: Some(mesh),
            geometry,
            material,
        })
    }

    pub fn mesh(&self) -> Option<NodeId> {
        self.mesh
    }
}

impl Destroyable for Floor {
    fn destroy(&mut self) {
        let Some(mesh) = self.mesh.take() else {
            return;
        };
        let mut scene = self.scene.borrow_mut();
        scene.remove_subtree(mesh);
        scene.resources.dispose_geometry(self.geometry);
        scene.resources.dispose_material(self.material);
    }
}
