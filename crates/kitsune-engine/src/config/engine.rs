use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::scene::ColorSpace;

/// Every tunable constant of the experience, grouped by owner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub camera: CameraConfig,
    pub renderer: RendererConfig,
    pub controls: ControlsConfig,
    pub floor: FloorConfig,
    pub environment: EnvironmentConfig,
    pub character: CharacterConfig,
    pub time: TimeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// Orbit target, also the point the camera looks at initially.
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 35.0,
            near: 0.1,
            far: 100.0,
            position: [6.0, 4.0, 8.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToneMapping {
    None,
    Linear,
    Reinhard,
    AcesFilmic,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadowMapKind {
    Basic,
    Pcf,
    PcfSoft,
}

/// Renderer creation settings handed to the graphics backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub antialias: bool,
    pub physically_correct_lights: bool,
    pub output_color_space: ColorSpace,
    pub tone_mapping: ToneMapping,
    pub tone_mapping_exposure: f32,
    pub shadows_enabled: bool,
    pub shadow_map: ShadowMapKind,
    /// `#rrggbb`.
    pub clear_color: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            physically_correct_lights: true,
            output_color_space: ColorSpace::Srgb,
            tone_mapping: ToneMapping::Reinhard,
            tone_mapping_exposure: 3.0,
            shadows_enabled: true,
            shadow_map: ShadowMapKind::Pcf,
            clear_color: "#211d20".to_string(),
        }
    }
}

impl RendererConfig {
    /// Clear color as sRGB components in `[0, 1]`.
    pub fn clear_rgb(&self) -> Result<[f32; 3], ConfigurationError> {
        parse_hex_color(&self.clear_color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    pub radius: f32,
    pub segments: u32,
    pub texture_repeat: [f32; 2],
    pub color_texture: String,
    pub normal_texture: String,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            segments: 64,
            texture_repeat: [1.5, 1.5],
            color_texture: "grassColorTexture".to_string(),
            normal_texture: "grassNormalTexture".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub sun_color: [f32; 3],
    pub sun_intensity: f32,
    pub sun_position: [f32; 3],
    pub shadow_camera_far: f32,
    pub shadow_map_size: u32,
    pub shadow_normal_bias: f32,
    pub env_map_texture: String,
    pub env_map_intensity: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            sun_color: [1.0, 1.0, 1.0],
            sun_intensity: 3.0,
            sun_position: [0.25, 3.0, -2.25],
            shadow_camera_far: 15.0,
            shadow_map_size: 1024,
            shadow_normal_bias: 0.02,
            env_map_texture: "environmentMapTexture".to_string(),
            env_map_intensity: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub model: String,
    pub scale: f32,
    /// Names given to the model's first clips, in order. The first one plays on spawn.
    pub clips: Vec<String>,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            model: "foxModel".to_string(),
            scale: 0.02,
            clips: vec!["idle".to_string(), "walking".to_string(), "running".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Upper bound for a single frame delta, milliseconds.
    pub max_delta: Option<f64>,
}

/// Parses `#rrggbb` (leading `#` optional) into `[0, 1]` components.
pub fn parse_hex_color(value: &str) -> Result<[f32; 3], ConfigurationError> {
    let invalid = || ConfigurationError::Parse {
        path: "clear_color".to_string(),
        message: format!("'{value}' is not a #rrggbb color"),
    };

    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }

    let mut out = [0.0; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        *slot = f32::from(byte) / 255.0;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_the_shipped_scene() {
        let config = EngineConfig::default();
        assert_eq!(config.camera.fov, 35.0);
        assert_eq!(config.camera.position, [6.0, 4.0, 8.0]);
        assert_eq!(config.renderer.tone_mapping, ToneMapping::Reinhard);
        assert_eq!(config.renderer.tone_mapping_exposure, 3.0);
        assert_eq!(config.floor.texture_repeat, [1.5, 1.5]);
        assert_eq!(config.environment.shadow_map_size, 1024);
        assert_eq!(config.character.clips.len(), 3);
        assert_eq!(config.time.max_delta, None);
    }

    #[test]
    fn clear_color_parses() {
        let rgb = RendererConfig::default().clear_rgb().unwrap();
        assert_relative_eq!(rgb[0], 0x21 as f32 / 255.0);
        assert_relative_eq!(rgb[1], 0x1d as f32 / 255.0);
        assert_relative_eq!(rgb[2], 0x20 as f32 / 255.0);
    }

    #[test]
    fn malformed_colors_are_rejected() {
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
        assert!(parse_hex_color("ffffff").is_ok());
    }
}
