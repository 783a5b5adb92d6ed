//! Holders: each owns one backend object and adapts it to the capability
//! contracts.

mod camera;
mod controls;
mod renderer;

pub use camera::CameraHolder;
pub use controls::ControlsHolder;
pub use renderer::RendererHolder;
