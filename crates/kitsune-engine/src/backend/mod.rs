//! Graphics backend contracts.
//!
//! The core never talks to a GPU or a file system directly: the host hands it a
//! [`DrawingSurface`] to create the renderer from and one [`AssetLoader`] per
//! resource kind. `headless` provides in-memory implementations of both.

pub mod headless;
mod loader;
mod model;
mod render;

pub use loader::{AssetLoader, Completed, Completion, LoadRequest, LoadedPayload};
pub use model::{
    ClipData,
    MaterialData,
    MeshData,
    MeshShape,
    ModelData,
    ModelNode,
    TrackData,
    TrackProperty,
};
pub use render::{DrawingSurface, RenderDevice, RendererSettings};
