use slotmap::SlotMap;

use super::geometry::Geometry;
use super::material::Material;
use super::texture::Texture;

slotmap::new_key_type! {
    pub struct GeometryId;
    pub struct MaterialId;
    pub struct TextureId;
}

/// A resource the renderer must free its GPU copy of.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReleasedResource {
    Geometry(GeometryId),
    Material(MaterialId),
    Texture(TextureId),
}

/// Storage for every geometry, material and texture referenced by the scene.
///
/// Disposing removes the resource and queues a [`ReleasedResource`]. Disposing a
/// handle that is already gone does nothing, so no resource is released twice.
#[derive(Debug, Default)]
pub struct Resources {
    geometries: SlotMap<GeometryId, Geometry>,
    materials: SlotMap<MaterialId, Material>,
    textures: SlotMap<TextureId, Texture>,
    released: Vec<ReleasedResource>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    // ── geometry ──────────────────────────────────────────────────────────

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.insert(geometry)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id)
    }

    pub fn dispose_geometry(&mut self, id: GeometryId) -> bool {
        let removed = self.geometries.remove(id).is_some();
        if removed {
            self.released.push(ReleasedResource::Geometry(id));
        }
        removed
    }

    // ── material ──────────────────────────────────────────────────────────

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.insert(material)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Removes the material only. Textures it references stay alive.
    pub fn dispose_material(&mut self, id: MaterialId) -> bool {
        let removed = self.materials.remove(id).is_some();
        if removed {
            self.released.push(ReleasedResource::Material(id));
        }
        removed
    }

    // ── texture ───────────────────────────────────────────────────────────

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.insert(texture)
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id)
    }

    pub fn texture_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(id)
    }

    pub fn dispose_texture(&mut self, id: TextureId) -> bool {
        let removed = self.textures.remove(id).is_some();
        if removed {
            self.released.push(ReleasedResource::Texture(id));
        }
        removed
    }

    // ── bookkeeping ───────────────────────────────────────────────────────

    /// Takes the release queue accumulated since the previous call.
    pub fn take_released(&mut self) -> Vec<ReleasedResource> {
        std::mem::take(&mut self.released)
    }

    pub fn pending_releases(&self) -> usize {
        self.released.len()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty() && self.materials.is_empty() && self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ImageData;

    #[test]
    fn dispose_queues_one_release_per_resource() {
        let mut res = Resources::new();
        let g = res.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0));
        let t = res.add_texture(Texture::image("t", ImageData::solid(1, 1, [255; 4])));

        assert!(res.dispose_geometry(g));
        assert!(!res.dispose_geometry(g));
        assert!(res.dispose_texture(t));
        assert!(!res.dispose_texture(t));

        assert_eq!(
            res.take_released(),
            vec![ReleasedResource::Geometry(g), ReleasedResource::Texture(t)]
        );
        assert!(res.take_released().is_empty());
        assert!(res.is_empty());
    }

    #[test]
    fn disposing_a_material_keeps_its_textures() {
        let mut res = Resources::new();
        let t = res.add_texture(Texture::image("t", ImageData::solid(1, 1, [255; 4])));
        let m = res.add_material(Material::standard().with_map(t));

        res.dispose_material(m);
        assert!(res.material(m).is_none());
        assert!(res.texture(t).is_some());
    }
}
