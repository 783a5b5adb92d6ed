use std::rc::Rc;

use crate::animation::AnimationClip;
use crate::scene::{NodeId, TextureId};

/// Instantiated model: a detached scene subtree plus its clips, in source order.
#[derive(Debug, Clone)]
pub struct Model {
    pub root: NodeId,
    pub animations: Vec<Rc<AnimationClip>>,
}

/// Resolved resource, stored under its declared name.
#[derive(Debug, Clone)]
pub enum LoadedItem {
    Texture(TextureId),
    CubeTexture(TextureId),
    Model(Model),
}

impl LoadedItem {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LoadedItem::Texture(_) => "texture",
            LoadedItem::CubeTexture(_) => "cube texture",
            LoadedItem::Model(_) => "model",
        }
    }
}
