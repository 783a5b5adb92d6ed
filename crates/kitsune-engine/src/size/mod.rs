//! Viewport size subsystem.
//!
//! The host feeds raw window metrics into a [`SizeSource`]; participants query
//! the current [`ViewportSize`] on demand or subscribe to genuine resizes.

mod size_source;
mod viewport;

pub use size_source::SizeSource;
pub use viewport::{ViewportSize, MAX_PIXEL_RATIO};
