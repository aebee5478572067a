//! Skeleton node tree and pose evaluation
//!
//! Nodes live in an arena indexed by [`NodeIndex`]. Node 0 is always the
//! root. The structure is validated once at construction and never changes
//! afterwards; only the poses computed from it vary per frame.

use std::collections::HashMap;
use std::fmt;

use glam::Mat4;
use log::debug;

use crate::animation::{AnimationClip, BindComponents};
use crate::asset::{JointDesc, NodeDesc};
use crate::error::{AnimError, Result};

/// Size of the fixed joint matrix array uploaded to the renderer
pub const MAX_JOINTS: usize = 256;

/// Index of a node in a [`Skeleton`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

impl NodeIndex {
    /// The root node
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Slot of a joint in the joint matrix array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(pub u32);

impl JointId {
    /// Array index of this joint
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Joint data attached to a skeleton node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointBinding {
    pub id: JointId,
    /// Maps object space at bind time into this joint's local space
    pub inverse_bind: Mat4,
}

/// A node of the skeleton tree
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonNode {
    name: String,
    bind_local: Mat4,
    bind: BindComponents,
    joint: Option<JointBinding>,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
}

impl SkeletonNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind-local transform relative to the parent
    pub fn bind_local(&self) -> Mat4 {
        self.bind_local
    }

    /// Decomposed bind-local transform
    pub fn bind_components(&self) -> &BindComponents {
        &self.bind
    }

    pub fn joint(&self) -> Option<&JointBinding> {
        self.joint.as_ref()
    }

    pub fn is_joint(&self) -> bool {
        self.joint.is_some()
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }
}

/// One node visited during pose evaluation
#[derive(Debug, Clone, Copy)]
pub struct PoseVisit<'a> {
    pub index: NodeIndex,
    pub node: &'a SkeletonNode,
    /// World transform of the parent (the root transform for the root node)
    pub parent_world: Mat4,
    /// Local transform used for this evaluation
    pub local: Mat4,
    /// `parent_world * local`
    pub world: Mat4,
}

/// A validated tree of named nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    nodes: Vec<SkeletonNode>,
    names: HashMap<String, NodeIndex>,
    joint_count: usize,
}

impl Skeleton {
    /// Build and validate a skeleton from flat node and joint tables
    ///
    /// Node 0 is the root. Every other node must be listed as the child of
    /// exactly one node and be reachable from the root. Joint ids index
    /// `joints` and must be unique and below [`MAX_JOINTS`].
    pub fn from_descs(descs: &[NodeDesc], joints: &[JointDesc]) -> Result<Self> {
        if descs.is_empty() {
            return Err(AnimError::InvalidHierarchy(
                "hierarchy has no nodes".to_string(),
            ));
        }

        let count = descs.len();
        let mut parents: Vec<Option<NodeIndex>> = vec![None; count];

        for (i, desc) in descs.iter().enumerate() {
            for &child in &desc.children {
                if child >= count {
                    return Err(AnimError::InvalidHierarchy(format!(
                        "node '{}' lists child {} but the hierarchy has {} nodes",
                        desc.name, child, count
                    )));
                }
                if child == NodeIndex::ROOT.0 {
                    return Err(AnimError::InvalidHierarchy(format!(
                        "root node '{}' is listed as a child of '{}'",
                        descs[0].name, desc.name
                    )));
                }
                if let Some(existing) = parents[child] {
                    return Err(AnimError::InvalidHierarchy(format!(
                        "node '{}' has two parents: '{}' and '{}'",
                        descs[child].name, descs[existing.0].name, desc.name
                    )));
                }
                parents[child] = Some(NodeIndex(i));
            }
        }

        // With single parents and a parentless root, anything the root can't
        // reach is either an orphan or part of a detached cycle
        let mut reached = vec![false; count];
        let mut stack = vec![NodeIndex::ROOT.0];
        while let Some(i) = stack.pop() {
            reached[i] = true;
            stack.extend(descs[i].children.iter().copied());
        }
        if let Some(i) = reached.iter().position(|r| !r) {
            return Err(AnimError::InvalidHierarchy(format!(
                "node '{}' is not reachable from the root",
                descs[i].name
            )));
        }

        let mut names = HashMap::with_capacity(count);
        for (i, desc) in descs.iter().enumerate() {
            if names.insert(desc.name.clone(), NodeIndex(i)).is_some() {
                return Err(AnimError::DuplicateNodeName(desc.name.clone()));
            }
        }

        let mut joint_owner: HashMap<u32, usize> = HashMap::new();
        let mut nodes = Vec::with_capacity(count);
        for (i, desc) in descs.iter().enumerate() {
            let joint = match desc.joint_id {
                Some(id) => {
                    if id as usize >= MAX_JOINTS {
                        return Err(AnimError::TooManyJoints {
                            node: desc.name.clone(),
                            joint: id,
                            max: MAX_JOINTS,
                        });
                    }
                    let joint_desc =
                        joints
                            .get(id as usize)
                            .ok_or_else(|| AnimError::DanglingJoint {
                                node: desc.name.clone(),
                                joint: id,
                                available: joints.len(),
                            })?;
                    if let Some(&first) = joint_owner.get(&id) {
                        return Err(AnimError::DuplicateJoint {
                            joint: id,
                            first: descs[first].name.clone(),
                            second: desc.name.clone(),
                        });
                    }
                    joint_owner.insert(id, i);

                    Some(JointBinding {
                        id: JointId(id),
                        inverse_bind: joint_desc.inverse_bind_matrix(),
                    })
                }
                None => None,
            };

            let bind_local = desc.transform_matrix();
            nodes.push(SkeletonNode {
                name: desc.name.clone(),
                bind_local,
                bind: BindComponents::from_matrix(&bind_local),
                joint,
                parent: parents[i],
                children: desc.children.iter().map(|&c| NodeIndex(c)).collect(),
            });
        }

        debug!(
            "Built skeleton with {} nodes and {} joints",
            nodes.len(),
            joint_owner.len()
        );

        Ok(Self {
            nodes,
            names,
            joint_count: joint_owner.len(),
        })
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a validated skeleton
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes carrying a joint
    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    pub fn root(&self) -> &SkeletonNode {
        &self.nodes[NodeIndex::ROOT.0]
    }

    pub fn node(&self, index: NodeIndex) -> Option<&SkeletonNode> {
        self.nodes.get(index.0)
    }

    pub fn nodes(&self) -> &[SkeletonNode] {
        &self.nodes
    }

    /// Look up a node by name
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.names.get(name).copied()
    }

    /// Iterate over joint nodes in index order
    pub fn joints(&self) -> impl Iterator<Item = (NodeIndex, &JointBinding)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.joint.as_ref().map(|j| (NodeIndex(i), j)))
    }

    /// Depth of a node below the root
    pub fn depth(&self, index: NodeIndex) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(index.0).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent.0].parent;
        }
        depth
    }

    /// Evaluate the pose and call `visit` once per node
    ///
    /// Nodes are visited depth-first in preorder, children in insertion
    /// order, so a parent is always visited before its descendants. A node
    /// with a keyed track in `clip` uses the sampled transform at `time`
    /// (clip ticks); every other node uses its bind-local transform.
    pub fn evaluate_pose<F>(
        &self,
        root: Mat4,
        clip: Option<&AnimationClip>,
        time: f32,
        mut visit: F,
    ) where
        F: FnMut(&PoseVisit<'_>),
    {
        let mut stack = vec![(NodeIndex::ROOT, root)];

        while let Some((index, parent_world)) = stack.pop() {
            let node = &self.nodes[index.0];

            let local = clip
                .and_then(|c| c.track(index))
                .filter(|track| track.has_data())
                .map_or(node.bind_local, |track| track.sample(time, &node.bind));
            let world = parent_world * local;

            visit(&PoseVisit {
                index,
                node,
                parent_world,
                local,
                world,
            });

            // Reversed so the first child is popped first
            stack.extend(node.children.iter().rev().map(|&child| (child, world)));
        }
    }

    /// World transform of every node, indexed by [`NodeIndex`]
    pub fn pose(&self, root: Mat4, clip: Option<&AnimationClip>, time: f32) -> Vec<Mat4> {
        let mut world = vec![Mat4::IDENTITY; self.nodes.len()];
        self.evaluate_pose(root, clip, time, |v| world[v.index.0] = v.world);
        world
    }

    /// Bind-pose world transform of every node
    pub fn bind_pose(&self) -> Vec<Mat4> {
        self.pose(Mat4::IDENTITY, None, 0.0)
    }

    /// Inverse bind-pose world transform of every joint
    ///
    /// For a consistent asset these equal the stored inverse-bind matrices.
    pub fn compute_inverse_bind_matrices(&self) -> Vec<(JointId, Mat4)> {
        let bind_world = self.bind_pose();
        self.joints()
            .map(|(index, joint)| (joint.id, bind_world[index.0].inverse()))
            .collect()
    }

    /// Largest element-wise deviation between stored and computed
    /// inverse-bind matrices
    pub fn inverse_bind_error(&self) -> f32 {
        let computed = self.compute_inverse_bind_matrices();
        self.joints()
            .zip(computed)
            .map(|((_, joint), (_, inverse))| {
                (joint.inverse_bind - inverse)
                    .to_cols_array()
                    .iter()
                    .fold(0.0f32, |acc, v| acc.max(v.abs()))
            })
            .fold(0.0, f32::max)
    }
}
