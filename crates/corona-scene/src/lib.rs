//! Minimal scene graph the sun layers register into.
//!
//! Nodes live in an arena owned by [`SceneGraph`] and are addressed by
//! copyable [`NodeId`] handles, so effect controllers can keep handles to
//! meshes buried inside groups without sharing ownership of them.

pub mod graph;
pub mod material;
pub mod transform;

pub use graph::{Mesh, Node, NodeId, NodeKind, SceneError, SceneGraph};
pub use material::{Blending, LayerUniforms, ShaderMaterial, ShaderProgram, Side};
pub use transform::Transform;
