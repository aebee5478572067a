//! In-memory description of a serialized object asset
//!
//! These types mirror the converter's output one to one and carry no
//! validation of their own. [`SkinnedObject::from_asset`] turns them into a
//! checked runtime object.
//!
//! Matrices are stored row-major, quaternions as `[x, y, z, w]`.
//!
//! [`SkinnedObject::from_asset`]: crate::object::SkinnedObject::from_asset

use glam::{Mat4, Quat, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row-major 4x4 matrix as written by the converter
pub type RowMajorMat4 = [[f32; 4]; 4];

/// Row-major identity
pub const IDENTITY_ROWS: RowMajorMat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Convert a row-major matrix into a glam matrix
pub fn mat4_from_rows(rows: &RowMajorMat4) -> Mat4 {
    Mat4::from_cols_array_2d(rows).transpose()
}

/// Convert a glam matrix into row-major form
pub fn mat4_to_rows(m: &Mat4) -> RowMajorMat4 {
    m.transpose().to_cols_array_2d()
}

#[cfg(feature = "serde")]
fn identity_rows() -> RowMajorMat4 {
    IDENTITY_ROWS
}

/// A complete object asset
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectAsset {
    pub name: String,
    /// Flat node table; node 0 is the root
    pub hierarchy: Vec<NodeDesc>,
    /// Joint table indexed by joint id
    #[cfg_attr(feature = "serde", serde(default))]
    pub joints: Vec<JointDesc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub materials: Vec<MaterialDesc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub meshes: Vec<MeshDesc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub instances: Vec<InstanceDesc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub animations: Vec<AnimationDesc>,
}

/// A skeleton node
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeDesc {
    pub name: String,
    /// Bind-local transform relative to the parent
    #[cfg_attr(feature = "serde", serde(default = "identity_rows"))]
    pub transform: RowMajorMat4,
    /// Indices of child nodes in the node table
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub joint_id: Option<u32>,
}

impl NodeDesc {
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform: mat4_to_rows(&transform),
            children: Vec::new(),
            joint_id: None,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn with_joint(mut self, id: u32) -> Self {
        self.joint_id = Some(id);
        self
    }

    pub fn transform_matrix(&self) -> Mat4 {
        mat4_from_rows(&self.transform)
    }
}

/// Joint table entry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointDesc {
    pub inverse_bind: RowMajorMat4,
}

impl JointDesc {
    pub fn new(inverse_bind: Mat4) -> Self {
        Self {
            inverse_bind: mat4_to_rows(&inverse_bind),
        }
    }

    pub fn inverse_bind_matrix(&self) -> Mat4 {
        mat4_from_rows(&self.inverse_bind)
    }
}

/// Surface material
///
/// Texture payloads are a renderer concern and are not carried here.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MaterialDesc {
    pub name: String,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub shininess: f32,
}

/// A vertex of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexDesc {
    pub position: [f32; 3],
    #[cfg_attr(feature = "serde", serde(default))]
    pub normal: [f32; 3],
    #[cfg_attr(feature = "serde", serde(default))]
    pub uv: [f32; 2],
}

/// Triangle mesh geometry
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshDesc {
    pub name: String,
    pub vertices: Vec<VertexDesc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub faces: Vec<[u32; 3]>,
    /// Index into the material table
    #[cfg_attr(feature = "serde", serde(default))]
    pub material: Option<usize>,
}

/// Placement of a mesh relative to the object root, with its skin weights
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstanceDesc {
    /// Index into the mesh table
    pub mesh: usize,
    #[cfg_attr(feature = "serde", serde(default = "identity_rows"))]
    pub transform: RowMajorMat4,
    #[cfg_attr(feature = "serde", serde(default))]
    pub weights: Vec<WeightSetDesc>,
}

/// Influence of one joint node on a mesh instance
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeightSetDesc {
    /// Name of the skeleton node carrying the joint
    pub joint: String,
    pub weights: WeightValues,
}

/// Weight layouts accepted for a joint influence
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeightValues {
    /// One weight for every vertex of the mesh
    Uniform(f32),
    /// One weight per vertex, in vertex order
    PerVertex(Vec<f32>),
    /// Only the vertices listed are influenced
    Sparse(Vec<SparseWeight>),
}

/// A single vertex weight of a sparse weight set
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparseWeight {
    pub vertex: u32,
    pub weight: f32,
}

/// A named animation clip
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnimationDesc {
    pub name: String,
    /// Duration in ticks
    pub duration: f32,
    /// 0 means unspecified
    #[cfg_attr(feature = "serde", serde(default, alias = "tps"))]
    pub ticks_per_second: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub channels: Vec<ChannelDesc>,
}

/// Keyframes of one node in a clip
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelDesc {
    /// Index into the node table
    pub node: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: Vec<Vec3KeyDesc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation: Vec<QuatKeyDesc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scale: Vec<Vec3KeyDesc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3KeyDesc {
    pub time: f32,
    pub value: [f32; 3],
}

impl Vec3KeyDesc {
    pub fn new(time: f32, value: Vec3) -> Self {
        Self {
            time,
            value: value.to_array(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuatKeyDesc {
    pub time: f32,
    /// `[x, y, z, w]`
    pub value: [f32; 4],
}

impl QuatKeyDesc {
    pub fn new(time: f32, value: Quat) -> Self {
        Self {
            time,
            value: value.to_array(),
        }
    }
}

impl ObjectAsset {
    /// Parse an asset from JSON
    #[cfg(feature = "serde")]
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    /// Total number of keyframes across all clips
    pub fn keyframe_count(&self) -> usize {
        self.animations
            .iter()
            .flat_map(|a| &a.channels)
            .map(|c| c.position.len() + c.rotation.len() + c.scale.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_conversion() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let rows = mat4_to_rows(&m);

        // Translation sits in the last column of a row-major matrix
        assert_eq!(rows[0][3], 1.0);
        assert_eq!(rows[1][3], 2.0);
        assert_eq!(rows[2][3], 3.0);
        assert_eq!(rows[3], [0.0, 0.0, 0.0, 1.0]);

        assert_eq!(mat4_from_rows(&rows), m);
        assert_eq!(mat4_from_rows(&IDENTITY_ROWS), Mat4::IDENTITY);
    }

    #[test]
    fn test_quat_key_order() {
        let key = QuatKeyDesc::new(0.0, Quat::from_xyzw(0.1, 0.2, 0.3, 0.9));
        assert_eq!(key.value, [0.1, 0.2, 0.3, 0.9]);
    }

    #[test]
    fn test_keyframe_count() {
        let asset = ObjectAsset {
            animations: vec![AnimationDesc {
                name: "walk".to_string(),
                duration: 1.0,
                ticks_per_second: 1.0,
                channels: vec![ChannelDesc {
                    node: 0,
                    position: vec![Vec3KeyDesc::new(0.0, Vec3::ZERO); 2],
                    rotation: vec![QuatKeyDesc::new(0.0, Quat::IDENTITY)],
                    scale: Vec::new(),
                }],
            }],
            ..ObjectAsset::default()
        };
        assert_eq!(asset.keyframe_count(), 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_parse_json() {
        let json = r#"{
            "name": "worm",
            "hierarchy": [
                { "name": "root", "children": [1] },
                { "name": "tail", "joint_id": 0 }
            ],
            "joints": [
                { "inverse_bind": [[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]] }
            ],
            "instances": [
                { "mesh": 0, "weights": [
                    { "joint": "tail", "weights": { "uniform": 1.0 } },
                    { "joint": "tail", "weights": { "sparse": [{ "vertex": 2, "weight": 0.5 }] } }
                ] }
            ],
            "animations": [
                { "name": "wiggle", "duration": 10, "tps": 0 }
            ]
        }"#;

        let asset = ObjectAsset::from_json(json).unwrap();
        assert_eq!(asset.hierarchy.len(), 2);
        assert_eq!(asset.hierarchy[0].transform, IDENTITY_ROWS);
        assert_eq!(asset.hierarchy[1].joint_id, Some(0));
        assert_eq!(
            asset.instances[0].weights[0].weights,
            WeightValues::Uniform(1.0)
        );
        assert_eq!(
            asset.instances[0].weights[1].weights,
            WeightValues::Sparse(vec![SparseWeight {
                vertex: 2,
                weight: 0.5
            }])
        );
        assert_eq!(asset.animations[0].ticks_per_second, 0.0);
    }
}
