//! Arena scene graph.

use std::fmt;
use std::sync::Arc;

use corona_mesh::Geometry;
use glam::Mat4;

use crate::material::ShaderMaterial;
use crate::transform::Transform;

/// Handle to a node in a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("unknown scene node {0}")]
    UnknownNode(NodeId),
    #[error("scene node {0} already has a parent or is a root")]
    AlreadyAttached(NodeId),
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Geometry drawn with a material.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: ShaderMaterial,
}

impl Mesh {
    pub fn new(geometry: impl Into<Arc<Geometry>>, material: ShaderMaterial) -> Self {
        Self {
            geometry: geometry.into(),
            material,
        }
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn group(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::with_kind(name, NodeKind::Mesh(mesh))
    }

    fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    /// The node's material, if it is a mesh.
    pub fn material_mut(&mut self) -> Option<&mut ShaderMaterial> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(&mut mesh.material),
            NodeKind::Group => None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Owns every node. Nodes are never removed, so a [`NodeId`] handed out by a
/// graph stays valid for that graph's lifetime.
///
/// Nodes can be inserted detached and attached later; only nodes reachable
/// from a root are drawn.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Store `node` without attaching it anywhere.
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        id
    }

    /// Store `node` as a new root.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = self.insert(node);
        self.roots.push(id);
        id
    }

    /// Store `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        self.check(parent)?;
        let id = self.insert(node);
        self.nodes[id.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Make a detached node a root.
    pub fn attach_root(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.check_detached(id)?;
        self.roots.push(id);
        Ok(())
    }

    /// Move a detached node under `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.check(parent)?;
        self.check_detached(child)?;
        if self.ancestors(parent).any(|id| id == child) {
            return Err(SceneError::Cycle { parent, child });
        }
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Whether `id` hangs off one of the roots.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).is_some() && self.ancestors(id).any(|a| self.roots.contains(&a))
    }

    /// Product of every transform from the root down to `id`.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        self.check(id)?;
        Ok(self
            .ancestors(id)
            .fold(Mat4::IDENTITY, |acc, a| self.nodes[a.index()].transform.matrix() * acc))
    }

    /// Every visible mesh reachable from a root, depth first, with its world
    /// matrix.
    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &Mesh, Mat4)> + '_ {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Mat4::IDENTITY))
            .collect();

        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.index()];
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            if let NodeKind::Mesh(mesh) = &node.kind {
                out.push((id, mesh, world));
            }
            stack.extend(node.children.iter().rev().map(|&child| (child, world)));
        }

        out.into_iter()
    }

    /// `id` followed by its parent chain.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| {
            self.nodes.get(current.index()).and_then(|node| node.parent)
        })
    }

    fn check(&self, id: NodeId) -> Result<(), SceneError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(SceneError::UnknownNode(id))
        }
    }

    fn check_detached(&self, id: NodeId) -> Result<(), SceneError> {
        self.check(id)?;
        if self.nodes[id.index()].parent.is_some() || self.roots.contains(&id) {
            return Err(SceneError::AlreadyAttached(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{LayerUniforms, ShaderProgram};
    use corona_mesh::sphere_geometry;
    use glam::Vec3;

    fn sphere_mesh() -> Mesh {
        Mesh::new(
            sphere_geometry(1.0, 8, 4),
            ShaderMaterial::opaque(ShaderProgram::Photosphere, LayerUniforms::default()),
        )
    }

    #[test]
    fn test_add_makes_root() {
        let mut scene = SceneGraph::new();
        let a = scene.add(Node::group("a"));
        let b = scene.add(Node::group("b"));
        assert_eq!(scene.roots(), &[a, b]);
        assert!(scene.is_attached(a));
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let mut scene = SceneGraph::new();
        let group = scene.add(Node::group("group"));
        let child = scene.add_child(group, Node::mesh("ball", sphere_mesh())).unwrap();
        assert_eq!(scene.node(child).unwrap().parent(), Some(group));
        assert_eq!(scene.node(group).unwrap().children(), &[child]);
        assert!(scene.is_attached(child));
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let mut scene = SceneGraph::new();
        let bogus = NodeId(7);
        let err = scene.add_child(bogus, Node::group("x")).unwrap_err();
        assert_eq!(err, SceneError::UnknownNode(bogus));
        assert!(scene.is_empty());
        assert!(scene.world_matrix(bogus).is_err());
    }

    #[test]
    fn test_detached_nodes_are_not_drawn() {
        let mut scene = SceneGraph::new();
        let mesh = scene.insert(Node::mesh("loose", sphere_mesh()));
        assert!(!scene.is_attached(mesh));
        assert_eq!(scene.meshes().count(), 0);

        scene.attach_root(mesh).unwrap();
        assert_eq!(scene.meshes().count(), 1);
        assert_eq!(
            scene.attach_root(mesh),
            Err(SceneError::AlreadyAttached(mesh))
        );
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut scene = SceneGraph::new();
        let parent = scene.insert(Node::group("parent"));
        let child = scene.insert(Node::group("child"));
        scene.attach(parent, child).unwrap();
        assert_eq!(
            scene.attach(child, parent),
            Err(SceneError::Cycle { parent: child, child: parent })
        );
        assert_eq!(
            scene.attach(parent, parent),
            Err(SceneError::Cycle { parent, child: parent })
        );
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut scene = SceneGraph::new();
        let group = scene.add(
            Node::group("group").with_transform(Transform::from_position(Vec3::new(10.0, 0.0, 0.0))),
        );
        let child = scene
            .add_child(
                group,
                Node::mesh("ball", sphere_mesh())
                    .with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 0.0))),
            )
            .unwrap();

        let world = scene.world_matrix(child).unwrap();
        let origin = world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(10.0, 2.0, 0.0)).length() < 1e-5);

        let (_, _, drawn) = scene.meshes().next().unwrap();
        assert_eq!(drawn, world);
    }

    #[test]
    fn test_meshes_walk_depth_first_in_insertion_order() {
        let mut scene = SceneGraph::new();
        let first = scene.add(Node::mesh("first", sphere_mesh()));
        let group = scene.add(Node::group("group"));
        let inner = scene.add_child(group, Node::mesh("inner", sphere_mesh())).unwrap();
        let last = scene.add(Node::mesh("last", sphere_mesh()));

        let order: Vec<_> = scene.meshes().map(|(id, _, _)| id).collect();
        assert_eq!(order, vec![first, inner, last]);
    }

    #[test]
    fn test_hidden_subtree_is_skipped() {
        let mut scene = SceneGraph::new();
        let group = scene.add(Node::group("group"));
        scene.add_child(group, Node::mesh("inner", sphere_mesh())).unwrap();
        scene.node_mut(group).unwrap().visible = false;
        assert_eq!(scene.meshes().count(), 0);
    }

    #[test]
    fn test_material_mut_only_on_meshes() {
        let mut scene = SceneGraph::new();
        let group = scene.add(Node::group("group"));
        let mesh = scene.add(Node::mesh("ball", sphere_mesh()));
        assert!(scene.node_mut(group).unwrap().material_mut().is_none());
        scene.node_mut(mesh).unwrap().material_mut().unwrap().uniforms.time = 3.0;
        let (_, drawn, _) = scene.meshes().next().unwrap();
        assert_eq!(drawn.material.uniforms.time, 3.0);
    }
}
