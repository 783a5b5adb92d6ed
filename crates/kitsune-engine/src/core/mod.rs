//! Core engine-facing contracts.
//!
//! This module defines the small capability contracts every scene participant
//! can implement independently of its concrete type, and the registry the
//! engine uses to fan frame, resize and destroy events out to them.

mod capability;
mod registry;

pub use capability::{Destroyable, Listenable, PointerSensible, Resizable, Updatable};
pub use registry::{Registry, Shared};
