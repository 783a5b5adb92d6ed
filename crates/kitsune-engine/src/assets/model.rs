use std::rc::Rc;

use glam::{Quat, Vec3};

use crate::animation::{AnimationClip, KeyframeTrack, TrackValues};
use crate::backend::{MeshShape, ModelData, TrackProperty};
use crate::scene::{Geometry, Material, MaterialKind, Node, NodeId, Scene, Transform};

use super::item::Model;

/// Builds `data` into `scene` as a detached subtree rooted at a group named `name`.
///
/// Every node, mesh and clip is validated before anything is inserted, so a
/// malformed model leaves the scene untouched.
pub fn instantiate_model(scene: &mut Scene, name: &str, data: &ModelData) -> Result<Model, String> {
    validate(data)?;

    let root = scene.add_node(Node::group(name));
    let mut ids: Vec<NodeId> = Vec::with_capacity(data.nodes.len());

    for node in &data.nodes {
        let transform = Transform {
            translation: Vec3::from_array(node.translation),
            rotation: Quat::from_array(node.rotation).normalize(),
            scale: Vec3::from_array(node.scale),
        };

        let mut built = match &node.mesh {
            Some(mesh) => {
                let geometry = scene.resources.add_geometry(geometry_of(&mesh.shape));
                let mut material = Material::new(MaterialKind::Standard).with_color(mesh.material.color);
                material.roughness = mesh.material.roughness;
                material.metalness = mesh.material.metalness;
                let material = scene.resources.add_material(material);
                Node::mesh(node.name.clone(), geometry, material)
            }
            None => Node::group(node.name.clone()),
        };
        built.transform = transform;

        let parent = node.parent.map_or(root, |p| ids[p]);
        ids.push(scene.spawn(parent, built));
    }

    let animations = data
        .animations
        .iter()
        .map(|clip| {
            let tracks = clip
                .tracks
                .iter()
                .map(|t| KeyframeTrack {
                    target: ids[t.node],
                    times: t.times.clone(),
                    values: values_of(t.property, &t.values),
                })
                .collect();
            Rc::new(AnimationClip::new(clip.name.clone(), tracks))
        })
        .collect();

    Ok(Model { root, animations })
}

fn validate(data: &ModelData) -> Result<(), String> {
    for (i, node) in data.nodes.iter().enumerate() {
        if let Some(p) = node.parent {
            if p >= i {
                return Err(format!("node '{}' references parent {p} declared after it", node.name));
            }
        }
        if let Some(mesh) = &node.mesh {
            if !geometry_of(&mesh.shape).is_valid() {
                return Err(format!("mesh of node '{}' has inconsistent buffers", node.name));
            }
        }
    }

    for clip in &data.animations {
        for track in &clip.tracks {
            if track.node >= data.nodes.len() {
                return Err(format!("clip '{}' targets missing node {}", clip.name, track.node));
            }
            if track.times.is_empty() {
                return Err(format!("clip '{}' has a track without keyframes", clip.name));
            }
            if track.times.iter().chain(&track.values).any(|v| !v.is_finite()) {
                return Err(format!("clip '{}' has non-finite keyframe data", clip.name));
            }
            if track.times.windows(2).any(|w| w[1] <= w[0]) {
                return Err(format!("clip '{}' has unordered keyframe times", clip.name));
            }
            if track.values.len() != track.times.len() * track.property.stride() {
                return Err(format!(
                    "clip '{}' has {} values for {} keyframes",
                    clip.name,
                    track.values.len(),
                    track.times.len()
                ));
            }
        }
    }
    Ok(())
}

fn geometry_of(shape: &MeshShape) -> Geometry {
    match shape {
        MeshShape::Cuboid { size } => Geometry::cuboid(size[0], size[1], size[2]),
        MeshShape::Buffers {
            positions,
            normals,
            uvs,
            indices,
        } => Geometry {
            positions: positions.clone(),
            normals: normals.clone(),
            uvs: if uvs.is_empty() {
                vec![[0.0, 0.0]; positions.len()]
            } else {
                uvs.clone()
            },
            indices: indices.clone(),
        },
    }
}

fn values_of(property: TrackProperty, raw: &[f32]) -> TrackValues {
    match property {
        TrackProperty::Translation => {
            TrackValues::Translation(raw.chunks_exact(3).map(Vec3::from_slice).collect())
        }
        TrackProperty::Scale => TrackValues::Scale(raw.chunks_exact(3).map(Vec3::from_slice).collect()),
        TrackProperty::Rotation => TrackValues::Rotation(
            raw.chunks_exact(4)
                .map(|q| Quat::from_slice(q).normalize())
                .collect(),
        ),
    }
}
