use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use slotmap::SlotMap;

use super::light::LightInstance;
use super::node::{Node, NodeId, NodeKind};
use super::resources::{GeometryId, MaterialId, Resources, TextureId};

/// Scene container shared by the holders, the world and the engine.
pub type SharedScene = Rc<RefCell<Scene>>;

/// A visible mesh resolved to world space for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshInstance {
    pub node: NodeId,
    pub world: Mat4,
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// Arena scene graph rooted at a single group node.
///
/// Nodes can exist detached from the root (freshly instantiated models, for
/// example); only the root's subtree is drawn.
#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    environment: Option<TextureId>,
    pub resources: Resources,
}

impl Scene {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::group("scene"));
        Self {
            nodes,
            root,
            environment: None,
            resources: Resources::new(),
        }
    }

    pub fn shared() -> SharedScene {
        Rc::new(RefCell::new(Self::new()))
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ── structure ─────────────────────────────────────────────────────────

    /// Inserts `node` without a parent.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    /// Inserts `node` as the last child of `parent`.
    pub fn spawn(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.add_node(node);
        self.attach(parent, id);
        id
    }

    /// Moves `child` under `parent`, detaching it from its previous parent.
    ///
    /// Refuses (returns `false`) when either node is missing, when `child` is the
    /// root, or when the move would create a cycle.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> bool {
        if child == self.root || !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            return false;
        }

        self.detach(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Unlinks `child` from its parent. The subtree stays alive.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get(child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Removes `id` and all its descendants. The root cannot be removed.
    ///
    /// Resources referenced by the removed nodes are left untouched.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<Node> {
        if id == self.root || !self.contains(id) {
            return Vec::new();
        }
        self.detach(id);
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.nodes.remove(n))
            .collect()
    }

    // ── traversal ─────────────────────────────────────────────────────────

    /// Depth-first, pre-order walk of `start` and its descendants.
    pub fn traverse(&self, start: NodeId, mut visit: impl FnMut(NodeId, &Node)) {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            visit(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// `start` followed by every descendant, in traversal order.
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.traverse(start, |id, _| out.push(id));
        out
    }

    /// Every mesh node under `start`, `start` included.
    pub fn meshes_under(&self, start: NodeId) -> Vec<(NodeId, GeometryId, MaterialId)> {
        let mut out = Vec::new();
        self.traverse(start, |id, node| {
            if let Some((g, m)) = node.mesh_parts() {
                out.push((id, g, m));
            }
        });
        out
    }

    pub fn find_by_name(&self, start: NodeId, name: &str) -> Option<NodeId> {
        let mut found = None;
        self.traverse(start, |id, node| {
            if found.is_none() && node.name == name {
                found = Some(id);
            }
        });
        found
    }

    /// Composed transform from `id` up to its topmost ancestor.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(current) else {
                break;
            };
            matrix = node.transform.matrix() * matrix;
            cursor = node.parent;
        }
        matrix
    }

    // ── frame extraction ──────────────────────────────────────────────────

    /// Visible meshes reachable from the root. Hidden nodes hide their subtree.
    pub fn visible_meshes(&self) -> Vec<MeshInstance> {
        let mut out = Vec::new();
        self.walk_visible(|id, node, world| {
            if let NodeKind::Mesh { geometry, material } = node.kind {
                out.push(MeshInstance {
                    node: id,
                    world,
                    geometry,
                    material,
                    cast_shadow: node.cast_shadow,
                    receive_shadow: node.receive_shadow,
                });
            }
        });
        out
    }

    /// Visible directional lights reachable from the root.
    pub fn lights(&self) -> Vec<LightInstance> {
        let mut out = Vec::new();
        self.walk_visible(|_, node, world| {
            if let NodeKind::DirectionalLight(light) = &node.kind {
                let position = world.transform_point3(Vec3::ZERO);
                let direction = (light.target - position).try_normalize().unwrap_or(Vec3::NEG_Y);
                out.push(LightInstance {
                    position,
                    direction,
                    color: light.color,
                    intensity: light.intensity,
                    cast_shadow: node.cast_shadow,
                    shadow: light.shadow,
                });
            }
        });
        out
    }

    fn walk_visible(&self, mut visit: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack = vec![(self.root, Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            visit(id, node, world);
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
    }

    // ── environment ───────────────────────────────────────────────────────

    pub fn environment(&self) -> Option<TextureId> {
        self.environment
    }

    pub fn set_environment(&mut self, texture: Option<TextureId>) {
        self.environment = texture;
    }

    // ── disposal ──────────────────────────────────────────────────────────

    /// Disposes geometry and material of every mesh under `start`.
    ///
    /// With `with_textures`, every texture the materials reference is disposed too.
    /// Returns the number of resources actually released.
    pub fn dispose_meshes_under(&mut self, start: NodeId, with_textures: bool) -> usize {
        let mut released = 0;
        for (_, geometry, material) in self.meshes_under(start) {
            if with_textures {
                let textures: Vec<TextureId> = self
                    .resources
                    .material(material)
                    .map(|m| m.textures().collect())
                    .unwrap_or_default();
                for texture in textures {
                    released += usize::from(self.resources.dispose_texture(texture));
                }
            }
            released += usize::from(self.resources.dispose_geometry(geometry));
            released += usize::from(self.resources.dispose_material(material));
        }
        released
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
