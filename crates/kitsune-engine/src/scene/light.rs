use glam::Vec3;

/// Shadow map parameters of a shadow-casting light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowSettings {
    pub camera_near: f32,
    pub camera_far: f32,
    /// Half extent of the orthographic shadow frustum.
    pub camera_extent: f32,
    pub map_size: u32,
    pub normal_bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            camera_near: 0.5,
            camera_far: 500.0,
            camera_extent: 5.0,
            map_size: 512,
            normal_bias: 0.0,
        }
    }
}

/// Light shining from the node position towards `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub target: Vec3,
    pub shadow: ShadowSettings,
}

impl DirectionalLight {
    pub fn new(color: [f32; 3], intensity: f32) -> Self {
        Self {
            color,
            intensity,
            target: Vec3::ZERO,
            shadow: ShadowSettings::default(),
        }
    }
}

/// A directional light resolved to world space for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LightInstance {
    pub position: Vec3,
    /// Unit vector from the light towards its target.
    pub direction: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
    pub cast_shadow: bool,
    pub shadow: ShadowSettings,
}
