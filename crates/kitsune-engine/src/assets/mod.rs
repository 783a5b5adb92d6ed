//! Asset pipeline.
//!
//! A [`Manifest`] declares named resources; the [`AssetPipeline`] validates it,
//! dispatches every entry to the loader registered for its kind, turns the
//! payloads into scene resources as they arrive and fires a single ready event
//! once every entry has settled.

mod item;
mod manifest;
mod model;
mod pipeline;
mod registry;

pub use item::{LoadedItem, Model};
pub use manifest::{Manifest, SourceEntry, SourceType};
pub use model::instantiate_model;
pub use pipeline::{AssetPipeline, LoadProgress, PipelineState};
pub use registry::LoaderRegistry;
