//! Mesh instances and vertex skinning
//!
//! A [`MeshInstance`] places a shared mesh relative to the object root and
//! binds it to skeleton joints through per-joint weight sets. Given the
//! object's joint matrices it can deform its vertices on the CPU, or pack
//! its weights for a GPU skinning shader. Both paths consume the same joint
//! matrix array.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use creature_anim::skinning::{JointInfluence, MeshData, MeshInstance, Vertex, Weights};
//! use creature_anim::skeleton::{JointId, NodeIndex, MAX_JOINTS};
//! use glam::{Mat4, Vec3};
//!
//! let mesh = Arc::new(MeshData::new("quad", vec![Vertex::new(Vec3::ZERO, Vec3::Y)], vec![]));
//! let instance = MeshInstance::new(
//!     mesh,
//!     Mat4::IDENTITY,
//!     vec![JointInfluence::new(NodeIndex(1), JointId(0), Weights::Uniform(1.0))],
//! );
//!
//! let mut joints = [Mat4::IDENTITY; MAX_JOINTS];
//! joints[0] = Mat4::from_translation(Vec3::X);
//!
//! let skinned = instance.skin(&joints);
//! assert!((skinned[0].position - Vec3::X).length() < 1e-6);
//! ```

use std::sync::Arc;

use glam::{Mat3, Mat4, Vec2, Vec3};
use log::{debug, warn};

use crate::asset::{InstanceDesc, MeshDesc, WeightValues, mat4_from_rows};
use crate::error::{AnimError, Result};
use crate::skeleton::{JointId, MAX_JOINTS, NodeIndex, Skeleton};

/// Joint influences per vertex in the GPU weight layout
pub const MAX_WEIGHTS_PER_VERTEX: usize = 8;

/// A rest-pose mesh vertex
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal,
            uv: Vec2::ZERO,
        }
    }
}

/// CPU-side copy of a mesh's geometry
///
/// Shared between every instance that places it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    /// Triangle list
    pub indices: Vec<u32>,
    /// Index into the owning object's material table
    pub material: Option<usize>,
}

impl MeshData {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
            material: None,
        }
    }

    /// Build mesh geometry, checking face and material indices
    pub fn from_desc(desc: &MeshDesc, material_count: usize) -> Result<Self> {
        let vertex_count = desc.vertices.len();

        if let Some(face) = desc
            .faces
            .iter()
            .find(|f| f.iter().any(|&i| i as usize >= vertex_count))
        {
            return Err(AnimError::InvalidMesh(format!(
                "mesh '{}' has face {:?} but only {} vertices",
                desc.name, face, vertex_count
            )));
        }

        if let Some(material) = desc.material {
            if material >= material_count {
                return Err(AnimError::InvalidMesh(format!(
                    "mesh '{}' uses material {} but the object has {} materials",
                    desc.name, material, material_count
                )));
            }
        }

        let vertices = desc
            .vertices
            .iter()
            .map(|v| Vertex {
                position: Vec3::from_array(v.position),
                normal: Vec3::from_array(v.normal),
                uv: Vec2::from_array(v.uv),
            })
            .collect();

        Ok(Self {
            name: desc.name.clone(),
            vertices,
            indices: desc.faces.iter().flatten().copied().collect(),
            material: desc.material,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Weights of one joint over the vertices of a mesh
#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    /// Same weight for every vertex
    Uniform(f32),
    /// One weight per vertex
    PerVertex(Vec<f32>),
}

impl Weights {
    /// Weight for a vertex; vertices past the end of a per-vertex list
    /// carry no weight
    pub fn get(&self, vertex: usize) -> f32 {
        match self {
            Self::Uniform(w) => *w,
            Self::PerVertex(ws) => ws.get(vertex).copied().unwrap_or(0.0),
        }
    }

    /// Resolve an asset weight set against a mesh with `vertex_count`
    /// vertices
    fn from_values(
        values: &WeightValues,
        vertex_count: usize,
    ) -> std::result::Result<Self, String> {
        match values {
            WeightValues::Uniform(w) => {
                if !w.is_finite() {
                    return Err(format!("uniform weight {w} is not finite"));
                }
                Ok(Self::Uniform(*w))
            }
            WeightValues::PerVertex(ws) => {
                if ws.len() != vertex_count {
                    return Err(format!(
                        "{} per-vertex weights for {} vertices",
                        ws.len(),
                        vertex_count
                    ));
                }
                if let Some(i) = ws.iter().position(|w| !w.is_finite()) {
                    return Err(format!("weight of vertex {i} is not finite"));
                }
                Ok(Self::PerVertex(ws.clone()))
            }
            WeightValues::Sparse(entries) => {
                let mut dense = vec![0.0; vertex_count];
                for entry in entries {
                    let slot = dense.get_mut(entry.vertex as usize).ok_or_else(|| {
                        format!(
                            "weight for vertex {} but the mesh has {} vertices",
                            entry.vertex, vertex_count
                        )
                    })?;
                    if !entry.weight.is_finite() {
                        return Err(format!("weight of vertex {} is not finite", entry.vertex));
                    }
                    *slot += entry.weight;
                }
                Ok(Self::PerVertex(dense))
            }
        }
    }
}

/// Influence of one joint on a mesh instance
#[derive(Debug, Clone, PartialEq)]
pub struct JointInfluence {
    /// Skeleton node carrying the joint
    pub node: NodeIndex,
    pub joint: JointId,
    pub weights: Weights,
}

impl JointInfluence {
    pub fn new(node: NodeIndex, joint: JointId, weights: Weights) -> Self {
        Self {
            node,
            joint,
            weights,
        }
    }
}

/// A deformed vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinnedVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Per-vertex joint ids and weights in the GPU attribute layout
///
/// Unused slots have joint 0 and weight 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PackedWeights {
    pub joint_ids: [u32; MAX_WEIGHTS_PER_VERTEX],
    pub values: [f32; MAX_WEIGHTS_PER_VERTEX],
}

impl PackedWeights {
    /// Number of slots in use
    pub fn len(&self) -> usize {
        self.values.iter().filter(|&&w| w != 0.0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A mesh placed in an object and bound to its skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInstance {
    mesh: Arc<MeshData>,
    transform: Mat4,
    inverse_transform: Mat4,
    influences: Vec<JointInfluence>,
}

impl MeshInstance {
    pub fn new(mesh: Arc<MeshData>, transform: Mat4, influences: Vec<JointInfluence>) -> Self {
        Self {
            mesh,
            transform,
            inverse_transform: transform.inverse(),
            influences,
        }
    }

    /// Build an instance, resolving weight sets against the skeleton
    ///
    /// Every weight set must name a node that carries a joint.
    pub fn from_desc(
        desc: &InstanceDesc,
        meshes: &[Arc<MeshData>],
        skeleton: &Skeleton,
    ) -> Result<Self> {
        let mesh = meshes.get(desc.mesh).ok_or_else(|| {
            AnimError::InvalidMesh(format!(
                "instance refers to mesh {} but the object has {} meshes",
                desc.mesh,
                meshes.len()
            ))
        })?;

        let mut influences = Vec::with_capacity(desc.weights.len());
        for set in &desc.weights {
            let node = skeleton.find(&set.joint).ok_or_else(|| {
                AnimError::UnknownNode(format!(
                    "mesh '{}' is weighted to '{}'",
                    mesh.name, set.joint
                ))
            })?;
            let joint = skeleton
                .node(node)
                .and_then(|n| n.joint())
                .ok_or_else(|| AnimError::NotAJoint(set.joint.clone()))?;
            let weights =
                Weights::from_values(&set.weights, mesh.vertex_count()).map_err(|reason| {
                    AnimError::InvalidWeights {
                        mesh: mesh.name.clone(),
                        reason: format!("joint '{}': {}", set.joint, reason),
                    }
                })?;

            influences.push(JointInfluence::new(node, joint.id, weights));
        }

        debug!(
            "Mesh instance '{}' bound to {} joints",
            mesh.name,
            influences.len()
        );

        Ok(Self::new(
            Arc::clone(mesh),
            mat4_from_rows(&desc.transform),
            influences,
        ))
    }

    pub fn mesh(&self) -> &Arc<MeshData> {
        &self.mesh
    }

    /// Placement of the mesh relative to the object root
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn inverse_transform(&self) -> Mat4 {
        self.inverse_transform
    }

    pub fn influences(&self) -> &[JointInfluence] {
        &self.influences
    }

    /// Joint matrix as seen from this instance's space
    pub fn skinning_matrix(&self, joints: &[Mat4; MAX_JOINTS], joint: JointId) -> Mat4 {
        self.inverse_transform * joints[joint.index()]
    }

    /// Deform every vertex with the current joint matrices
    ///
    /// Each vertex is the weighted sum of its rest position transformed by
    /// every influencing joint. Sums whose total weight is not 1 are divided
    /// by the total; a vertex with no weight keeps its rest position and
    /// normal.
    pub fn skin(&self, joints: &[Mat4; MAX_JOINTS]) -> Vec<SkinnedVertex> {
        let matrices: Vec<(Mat4, Mat3)> = self
            .influences
            .iter()
            .map(|inf| {
                let m = self.skinning_matrix(joints, inf.joint);
                (m, Mat3::from_mat4(m))
            })
            .collect();

        self.mesh
            .vertices
            .iter()
            .enumerate()
            .map(|(i, vertex)| {
                let mut position = Vec3::ZERO;
                let mut normal = Vec3::ZERO;
                let mut total = 0.0f32;

                for (influence, (m, n)) in self.influences.iter().zip(&matrices) {
                    let w = influence.weights.get(i);
                    if w == 0.0 {
                        continue;
                    }
                    position += m.transform_point3(vertex.position) * w;
                    normal += (*n * vertex.normal) * w;
                    total += w;
                }

                if total == 0.0 {
                    return SkinnedVertex {
                        position: vertex.position,
                        normal: vertex.normal,
                    };
                }

                if (total - 1.0).abs() > f32::EPSILON {
                    position /= total;
                }

                SkinnedVertex {
                    position,
                    normal: normal.normalize_or_zero(),
                }
            })
            .collect()
    }

    /// Pack weights into the fixed per-vertex GPU layout
    ///
    /// Vertices with more than [`MAX_WEIGHTS_PER_VERTEX`] influences keep the
    /// heaviest ones.
    pub fn packed_weights(&self) -> Vec<PackedWeights> {
        let mut truncated = 0usize;

        let packed: Vec<PackedWeights> = (0..self.mesh.vertex_count())
            .map(|i| {
                let mut weights: Vec<(JointId, f32)> = self
                    .influences
                    .iter()
                    .map(|inf| (inf.joint, inf.weights.get(i)))
                    .filter(|&(_, w)| w != 0.0)
                    .collect();

                if weights.len() > MAX_WEIGHTS_PER_VERTEX {
                    truncated += 1;
                    weights.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
                    weights.truncate(MAX_WEIGHTS_PER_VERTEX);
                }

                let mut out = PackedWeights::default();
                for (slot, (joint, w)) in weights.into_iter().enumerate() {
                    out.joint_ids[slot] = joint.0;
                    out.values[slot] = w;
                }
                out
            })
            .collect();

        if truncated > 0 {
            warn!(
                "Mesh '{}': {} vertices have more than {} weights, keeping the heaviest",
                self.mesh.name, truncated, MAX_WEIGHTS_PER_VERTEX
            );
        }

        packed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{JointDesc, NodeDesc, SparseWeight, VertexDesc, WeightSetDesc, mat4_to_rows};

    fn mesh(count: usize) -> Arc<MeshData> {
        let vertices = (0..count)
            .map(|i| Vertex::new(Vec3::new(i as f32, 0.0, 0.0), Vec3::Y))
            .collect();
        Arc::new(MeshData::new("test", vertices, Vec::new()))
    }

    fn joints_with(pairs: &[(usize, Mat4)]) -> Box<[Mat4; MAX_JOINTS]> {
        let mut joints = Box::new([Mat4::IDENTITY; MAX_JOINTS]);
        for &(i, m) in pairs {
            joints[i] = m;
        }
        joints
    }

    fn skeleton() -> Skeleton {
        let nodes = vec![
            NodeDesc::new("root", Mat4::IDENTITY).with_children(vec![1, 2]),
            NodeDesc::new("left", Mat4::IDENTITY).with_joint(0),
            NodeDesc::new("right", Mat4::IDENTITY),
        ];
        Skeleton::from_descs(&nodes, &[JointDesc::new(Mat4::IDENTITY)]).unwrap()
    }

    #[test]
    fn test_single_joint_skinning() {
        let instance = MeshInstance::new(
            mesh(2),
            Mat4::IDENTITY,
            vec![JointInfluence::new(NodeIndex(1), JointId(3), Weights::Uniform(1.0))],
        );
        let joints = joints_with(&[(3, Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)))]);

        let skinned = instance.skin(&joints);
        assert!((skinned[1].position - Vec3::new(1.0, 2.0, 0.0)).length() < 0.001);
        assert!((skinned[1].normal - Vec3::Y).length() < 0.001);
    }

    #[test]
    fn test_partial_weights_renormalized() {
        // Two joints at 0.25 each behave like two joints at 0.5 each
        let influences = vec![
            JointInfluence::new(NodeIndex(1), JointId(0), Weights::Uniform(0.25)),
            JointInfluence::new(NodeIndex(2), JointId(1), Weights::Uniform(0.25)),
        ];
        let instance = MeshInstance::new(mesh(1), Mat4::IDENTITY, influences);
        let joints = joints_with(&[
            (0, Mat4::from_translation(Vec3::X)),
            (1, Mat4::from_translation(Vec3::Y)),
        ]);

        let skinned = instance.skin(&joints);
        assert!((skinned[0].position - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_zero_weight_keeps_rest_vertex() {
        let instance = MeshInstance::new(
            mesh(2),
            Mat4::IDENTITY,
            vec![JointInfluence::new(
                NodeIndex(1),
                JointId(0),
                Weights::PerVertex(vec![0.0, 1.0]),
            )],
        );
        let joints = joints_with(&[(0, Mat4::from_translation(Vec3::Z))]);

        let skinned = instance.skin(&joints);
        assert_eq!(skinned[0].position, Vec3::ZERO);
        assert_eq!(skinned[0].normal, Vec3::Y);
        assert!((skinned[1].position - Vec3::new(1.0, 0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_normals_renormalized() {
        let instance = MeshInstance::new(
            mesh(1),
            Mat4::IDENTITY,
            vec![JointInfluence::new(NodeIndex(1), JointId(0), Weights::Uniform(1.0))],
        );
        let joints = joints_with(&[(0, Mat4::from_scale(Vec3::splat(3.0)))]);

        let skinned = instance.skin(&joints);
        assert!((skinned[0].normal.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_instance_space() {
        let transform = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let instance = MeshInstance::new(
            mesh(1),
            transform,
            vec![JointInfluence::new(NodeIndex(1), JointId(0), Weights::Uniform(1.0))],
        );
        let joints = joints_with(&[]);

        assert!(
            instance
                .skinning_matrix(&joints, JointId(0))
                .abs_diff_eq(transform.inverse(), 1e-6)
        );
        assert!(instance.inverse_transform().abs_diff_eq(transform.inverse(), 1e-6));
    }

    #[test]
    fn test_packed_weights_keep_heaviest() {
        let influences = (0..10u32)
            .map(|j| {
                JointInfluence::new(
                    NodeIndex(1),
                    JointId(j),
                    Weights::Uniform(0.01 * (j + 1) as f32),
                )
            })
            .collect();
        let instance = MeshInstance::new(mesh(1), Mat4::IDENTITY, influences);

        let packed = instance.packed_weights();
        assert_eq!(packed[0].len(), MAX_WEIGHTS_PER_VERTEX);
        // The two lightest joints (0 and 1) are dropped
        assert!(!packed[0].joint_ids.contains(&0));
        assert!(!packed[0].joint_ids.contains(&1));
        assert_eq!(packed[0].joint_ids[0], 9);
    }

    #[test]
    fn test_packed_weights_sparse() {
        let instance = MeshInstance::new(
            mesh(2),
            Mat4::IDENTITY,
            vec![JointInfluence::new(
                NodeIndex(1),
                JointId(4),
                Weights::PerVertex(vec![0.0, 0.7]),
            )],
        );
        let packed = instance.packed_weights();
        assert!(packed[0].is_empty());
        assert_eq!(packed[1].joint_ids[0], 4);
        assert_eq!(packed[1].values[0], 0.7);
    }

    #[test]
    fn test_from_desc_resolves_joint_names() {
        let skeleton = skeleton();
        let desc = InstanceDesc {
            mesh: 0,
            transform: mat4_to_rows(&Mat4::IDENTITY),
            weights: vec![WeightSetDesc {
                joint: "left".to_string(),
                weights: WeightValues::Sparse(vec![SparseWeight {
                    vertex: 1,
                    weight: 0.5,
                }]),
            }],
        };

        let instance = MeshInstance::from_desc(&desc, &[mesh(2)], &skeleton).unwrap();
        assert_eq!(instance.influences()[0].node, NodeIndex(1));
        assert_eq!(instance.influences()[0].joint, JointId(0));
        assert_eq!(
            instance.influences()[0].weights,
            Weights::PerVertex(vec![0.0, 0.5])
        );
    }

    #[test]
    fn test_from_desc_rejects_bad_weights() {
        let skeleton = skeleton();
        let with = |joint: &str, weights: WeightValues| InstanceDesc {
            mesh: 0,
            transform: mat4_to_rows(&Mat4::IDENTITY),
            weights: vec![WeightSetDesc {
                joint: joint.to_string(),
                weights,
            }],
        };
        let meshes = [mesh(2)];

        assert!(matches!(
            MeshInstance::from_desc(
                &with("nobody", WeightValues::Uniform(1.0)),
                &meshes,
                &skeleton
            ),
            Err(AnimError::UnknownNode(_))
        ));
        assert!(matches!(
            MeshInstance::from_desc(
                &with("right", WeightValues::Uniform(1.0)),
                &meshes,
                &skeleton
            ),
            Err(AnimError::NotAJoint(_))
        ));
        assert!(matches!(
            MeshInstance::from_desc(
                &with("left", WeightValues::PerVertex(vec![1.0])),
                &meshes,
                &skeleton
            ),
            Err(AnimError::InvalidWeights { .. })
        ));
        assert!(matches!(
            MeshInstance::from_desc(
                &with(
                    "left",
                    WeightValues::Sparse(vec![SparseWeight {
                        vertex: 9,
                        weight: 1.0
                    }])
                ),
                &meshes,
                &skeleton
            ),
            Err(AnimError::InvalidWeights { .. })
        ));

        let mut missing_mesh = with("left", WeightValues::Uniform(1.0));
        missing_mesh.mesh = 3;
        assert!(matches!(
            MeshInstance::from_desc(&missing_mesh, &meshes, &skeleton),
            Err(AnimError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_mesh_from_desc_checks_faces() {
        let desc = MeshDesc {
            name: "tri".to_string(),
            vertices: vec![VertexDesc::default(); 3],
            faces: vec![[0, 1, 3]],
            material: None,
        };
        assert!(matches!(
            MeshData::from_desc(&desc, 0),
            Err(AnimError::InvalidMesh(_))
        ));

        let desc = MeshDesc {
            faces: vec![[0, 1, 2]],
            material: Some(0),
            ..desc
        };
        let mesh = MeshData::from_desc(&desc, 1).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }
}
