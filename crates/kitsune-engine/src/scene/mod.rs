//! Scene graph model.
//!
//! An arena of nodes addressed by `NodeId`, plus the geometry, material and
//! texture resources those nodes reference. The graphics backend reads it to draw
//! a frame; holders, the world and the character each mutate their own subtree.

mod geometry;
mod graph;
mod light;
mod material;
mod node;
mod resources;
mod texture;

pub use geometry::Geometry;
pub use graph::{MeshInstance, Scene, SharedScene};
pub use light::{DirectionalLight, LightInstance, ShadowSettings};
pub use material::{Material, MaterialKind};
pub use node::{Node, NodeId, NodeKind, Transform};
pub use resources::{GeometryId, MaterialId, ReleasedResource, Resources, TextureId};
pub use texture::{ColorSpace, ImageData, Texture, TextureSettings, TextureSource, Wrapping};
