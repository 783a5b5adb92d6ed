use super::resources::TextureId;

/// Shading model of a material.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MaterialKind {
    /// Unlit.
    Basic,
    Lambert,
    Phong,
    Standard,
    Physical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    /// Linear RGB.
    pub color: [f32; 3],
    pub map: Option<TextureId>,
    pub normal_map: Option<TextureId>,
    pub env_map: Option<TextureId>,
    pub env_map_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    /// Set on any change the renderer has to pick up.
    pub needs_update: bool,
}

impl Material {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            color: [1.0, 1.0, 1.0],
            map: None,
            normal_map: None,
            env_map: None,
            env_map_intensity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
            needs_update: true,
        }
    }

    pub fn standard() -> Self {
        Self::new(MaterialKind::Standard)
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn with_map(mut self, map: TextureId) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_normal_map(mut self, normal_map: TextureId) -> Self {
        self.normal_map = Some(normal_map);
        self
    }

    /// Lit materials accept an environment map; unlit ones don't.
    pub fn is_env_mappable(&self) -> bool {
        !matches!(self.kind, MaterialKind::Basic)
    }

    /// Every texture slot in use.
    pub fn textures(&self) -> impl Iterator<Item = TextureId> + '_ {
        [self.map, self.normal_map, self.env_map].into_iter().flatten()
    }
}
