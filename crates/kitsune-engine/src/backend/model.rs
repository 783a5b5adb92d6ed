use serde::{Deserialize, Serialize};

/// Decoded model: a node hierarchy with inline meshes plus keyframe clips.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelData {
    pub nodes: Vec<ModelNode>,
    #[serde(default)]
    pub animations: Vec<ClipData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNode {
    pub name: String,
    /// Index of the parent in `ModelData::nodes`. Parents come before children.
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub translation: [f32; 3],
    /// Quaternion `[x, y, z, w]`.
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub mesh: Option<MeshData>,
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub shape: MeshShape,
    #[serde(default)]
    pub material: MaterialData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshShape {
    Cuboid {
        size: [f32; 3],
    },
    Buffers {
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        #[serde(default)]
        uvs: Vec<[f32; 2]>,
        indices: Vec<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    pub color: [f32; 3],
    #[serde(default = "full")]
    pub roughness: f32,
    #[serde(default)]
    pub metalness: f32,
}

fn full() -> f32 {
    1.0
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipData {
    pub name: String,
    pub tracks: Vec<TrackData>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackProperty {
    Translation,
    Rotation,
    Scale,
}

impl TrackProperty {
    /// Number of floats per keyframe value.
    pub fn stride(&self) -> usize {
        match self {
            TrackProperty::Rotation => 4,
            TrackProperty::Translation | TrackProperty::Scale => 3,
        }
    }
}

/// Keyframes for one property of one node. `values` holds `stride` floats per time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackData {
    pub node: usize,
    pub property: TrackProperty,
    pub times: Vec<f32>,
    pub values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_ron_model_uses_defaults() {
        let src = r#"(
            nodes: [
                (name: "root"),
                (name: "body", parent: Some(0), mesh: Some((shape: Cuboid(size: (1.0, 1.0, 2.0))))),
            ],
        )"#;
        let model: ModelData = ron::from_str(src).unwrap();
        assert_eq!(model.nodes.len(), 2);
        assert_eq!(model.nodes[0].rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(model.nodes[1].scale, [1.0, 1.0, 1.0]);
        assert_eq!(model.nodes[1].mesh.as_ref().unwrap().material, MaterialData::default());
        assert!(model.animations.is_empty());
    }

    #[test]
    fn rotation_tracks_have_four_components() {
        assert_eq!(TrackProperty::Rotation.stride(), 4);
        assert_eq!(TrackProperty::Scale.stride(), 3);
    }
}
