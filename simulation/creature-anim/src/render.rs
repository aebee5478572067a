//! Collaborator interfaces toward an external renderer
//!
//! The animation core never talks to a graphics API. It describes what to
//! draw through these traits and the host implements them on top of its
//! own shader, buffer and texture wrappers.

use glam::{Mat4, Vec3};

use crate::object::Material;
use crate::skeleton::{MAX_JOINTS, NodeIndex};
use crate::skinning::MeshInstance;

/// Which pass a draw belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// Lit, textured geometry
    Color,
    /// Geometry only, for shadow depth maps
    Depth,
}

/// One mesh instance draw
#[derive(Debug, Clone, Copy)]
pub struct DrawCommand<'a> {
    pub pass: RenderPass,
    pub instance: &'a MeshInstance,
    pub material: Option<&'a Material>,
    /// `root * instance.transform`
    pub model: Mat4,
    /// Joint matrices expressed in the instance's space, indexed by joint id
    pub joints: &'a [Mat4; MAX_JOINTS],
}

/// Draws skinned meshes
pub trait MeshRenderer {
    fn draw(&mut self, cmd: &DrawCommand<'_>);
}

/// Draws skeleton debug geometry
pub trait DebugRenderer {
    /// Marker for a node; `transform` is the node's world transform scaled
    /// down to marker size
    fn joint_marker(&mut self, node: NodeIndex, transform: Mat4);

    /// Line from `start` to `end`, both given in the space of `parent_world`
    fn bone_segment(&mut self, node: NodeIndex, parent_world: Mat4, start: Vec3, end: Vec3);
}

/// Renderer that records everything it is asked to draw
///
/// Useful for headless frame drivers and for inspecting draw output in
/// tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub draws: Vec<RecordedDraw>,
    pub markers: Vec<(NodeIndex, Mat4)>,
    pub segments: Vec<(NodeIndex, Vec3, Vec3)>,
}

/// A draw captured by [`RecordingRenderer`]
#[derive(Debug, Clone)]
pub struct RecordedDraw {
    pub pass: RenderPass,
    pub mesh: String,
    pub model: Mat4,
    /// First joint matrix of the instance-space array
    pub first_joint: Mat4,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.draws.clear();
        self.markers.clear();
        self.segments.clear();
    }
}

impl MeshRenderer for RecordingRenderer {
    fn draw(&mut self, cmd: &DrawCommand<'_>) {
        self.draws.push(RecordedDraw {
            pass: cmd.pass,
            mesh: cmd.instance.mesh().name.clone(),
            model: cmd.model,
            first_joint: cmd.joints[0],
        });
    }
}

impl DebugRenderer for RecordingRenderer {
    fn joint_marker(&mut self, node: NodeIndex, transform: Mat4) {
        self.markers.push((node, transform));
    }

    fn bone_segment(&mut self, node: NodeIndex, parent_world: Mat4, start: Vec3, end: Vec3) {
        self.segments.push((
            node,
            parent_world.transform_point3(start),
            parent_world.transform_point3(end),
        ));
    }
}
