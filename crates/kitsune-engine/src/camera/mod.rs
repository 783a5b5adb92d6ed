//! Camera math: a perspective projection and orbit controls around a target.

mod orbit;
mod perspective;

pub use orbit::OrbitControls;
pub use perspective::PerspectiveCamera;
