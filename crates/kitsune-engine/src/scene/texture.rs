use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Color space the texel values are encoded in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    #[default]
    Linear,
    Srgb,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Wrapping {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self { width, height, rgba }
    }

    /// A `width`x`height` image filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let texels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            rgba: rgba.repeat(texels),
        }
    }

    /// True when the buffer holds exactly `width * height` RGBA texels.
    pub fn is_consistent(&self) -> bool {
        self.rgba.len() == (self.width as usize) * (self.height as usize) * 4
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    Image(ImageData),
    /// Faces in `+x, -x, +y, -y, +z, -z` order.
    Cube(Vec<ImageData>),
}

/// Sampling settings of a texture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureSettings {
    pub repeat: Vec2,
    pub wrap_s: Wrapping,
    pub wrap_t: Wrapping,
    pub color_space: ColorSpace,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            repeat: Vec2::ONE,
            wrap_s: Wrapping::ClampToEdge,
            wrap_t: Wrapping::ClampToEdge,
            color_space: ColorSpace::Linear,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub source: TextureSource,
    pub settings: TextureSettings,
    /// Set whenever the settings change; the renderer clears it after re-upload.
    pub needs_update: bool,
}

impl Texture {
    pub fn image(name: impl Into<String>, image: ImageData) -> Self {
        Self {
            name: name.into(),
            source: TextureSource::Image(image),
            settings: TextureSettings::default(),
            needs_update: true,
        }
    }

    pub fn cube(name: impl Into<String>, faces: Vec<ImageData>) -> Self {
        Self {
            name: name.into(),
            source: TextureSource::Cube(faces),
            settings: TextureSettings::default(),
            needs_update: true,
        }
    }

    pub fn is_cube(&self) -> bool {
        matches!(self.source, TextureSource::Cube(_))
    }

    /// Applies `edit` to the settings and flags the texture for re-upload.
    pub fn configure(&mut self, edit: impl FnOnce(&mut TextureSettings)) {
        edit(&mut self.settings);
        self.needs_update = true;
    }
}
