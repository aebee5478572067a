//! Skinned objects
//!
//! A [`SkinnedObject`] is one creature type loaded from an asset: its
//! skeleton, clips, materials and mesh instances, plus the per-frame joint
//! matrix array handed to the renderer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Mat4, Vec3};
use log::{debug, trace};

use crate::animation::{AnimationClip, Keyframe, KeyframeTrack, PlaybackState};
use crate::asset::{AnimationDesc, MaterialDesc, ObjectAsset};
use crate::error::{AnimError, Result};
use crate::render::{DebugRenderer, DrawCommand, MeshRenderer, RenderPass};
use crate::skeleton::{MAX_JOINTS, NodeIndex, Skeleton};
use crate::skinning::{MeshData, MeshInstance, SkinnedVertex};

/// Materials are never rendered with a tighter specular highlight than this
pub const MIN_SHININESS: f32 = 16.0;

/// Edge length of the debug joint marker relative to a unit cube
pub const DEBUG_MARKER_SCALE: f32 = 0.05;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a clip owned by a specific [`SkinnedObject`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId {
    owner: u64,
    index: usize,
}

impl ClipId {
    /// Position of the clip in its object's clip list
    pub fn index(self) -> usize {
        self.index
    }
}

/// Surface parameters of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub emissive: Vec3,
    pub shininess: f32,
}

impl Material {
    /// Build a material, raising the shininess to [`MIN_SHININESS`]
    pub fn from_desc(desc: &MaterialDesc) -> Self {
        Self {
            name: desc.name.clone(),
            diffuse: Vec3::from_array(desc.diffuse),
            specular: Vec3::from_array(desc.specular),
            emissive: Vec3::from_array(desc.emissive),
            shininess: desc.shininess.max(MIN_SHININESS),
        }
    }
}

/// An animated, skinned creature
#[derive(Debug, Clone)]
pub struct SkinnedObject {
    id: u64,
    name: String,
    skeleton: Skeleton,
    clips: Vec<AnimationClip>,
    materials: Vec<Material>,
    meshes: Vec<Arc<MeshData>>,
    instances: Vec<MeshInstance>,
    joints: Box<[Mat4; MAX_JOINTS]>,
    playback: PlaybackState,
    debug: bool,
}

impl SkinnedObject {
    /// Build an object from a parsed asset
    ///
    /// Fails on any structural problem in the asset; no partially built
    /// object is ever returned.
    pub fn from_asset(asset: &ObjectAsset) -> Result<Self> {
        let materials: Vec<Material> = asset.materials.iter().map(Material::from_desc).collect();

        let meshes = asset
            .meshes
            .iter()
            .map(|m| MeshData::from_desc(m, materials.len()).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        let skeleton = Skeleton::from_descs(&asset.hierarchy, &asset.joints)?;

        let mut clips: Vec<AnimationClip> = Vec::with_capacity(asset.animations.len());
        for desc in &asset.animations {
            if clips.iter().any(|c| c.name() == desc.name) {
                return Err(AnimError::InvalidClip {
                    clip: desc.name.clone(),
                    reason: "another clip has the same name".to_string(),
                });
            }
            clips.push(build_clip(desc, &skeleton)?);
        }

        let instances = asset
            .instances
            .iter()
            .map(|i| MeshInstance::from_desc(i, &meshes, &skeleton))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Loaded object '{}': {} nodes, {} joints, {} clips, {} meshes, {} instances",
            asset.name,
            skeleton.len(),
            skeleton.joint_count(),
            clips.len(),
            meshes.len(),
            instances.len()
        );

        Ok(Self {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            name: asset.name.clone(),
            skeleton,
            clips,
            materials,
            meshes,
            instances,
            joints: Box::new([Mat4::IDENTITY; MAX_JOINTS]),
            playback: PlaybackState::bind_pose(),
            debug: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn meshes(&self) -> &[Arc<MeshData>] {
        &self.meshes
    }

    pub fn instances(&self) -> &[MeshInstance] {
        &self.instances
    }

    /// Handle of the clip with this name
    pub fn find_clip(&self, name: &str) -> Option<ClipId> {
        self.clips
            .iter()
            .position(|c| c.name() == name)
            .map(|index| ClipId {
                owner: self.id,
                index,
            })
    }

    /// Handles of all clips, in asset order
    pub fn clip_ids(&self) -> impl Iterator<Item = ClipId> + '_ {
        (0..self.clips.len()).map(|index| ClipId {
            owner: self.id,
            index,
        })
    }

    /// Clip with this name
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.name() == name)
    }

    /// Clip behind a handle
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to another object.
    pub fn clip_by_id(&self, id: ClipId) -> &AnimationClip {
        resolve_clip(self.id, &self.clips, id)
    }

    /// Evaluate the pose for this frame
    ///
    /// `time` is in seconds; the clip loops continuously. With no clip every
    /// node sits in its bind pose. Each joint slot receives
    /// `inverse(root) * world * inverse_bind`; slots no joint uses keep
    /// their value.
    ///
    /// # Panics
    ///
    /// Panics if `clip` belongs to another object.
    pub fn update(&mut self, root: Mat4, clip: Option<ClipId>, time: f32) {
        let Self {
            id,
            name,
            skeleton,
            clips,
            joints,
            playback,
            ..
        } = self;
        let clips: &[AnimationClip] = clips;

        let current = clip.map(|c| resolve_clip(*id, clips, c));
        let sample_time = current.map_or(0.0, |c| c.sample_time(time));

        *playback = match clip {
            Some(c) => PlaybackState::playing(c, sample_time),
            None => PlaybackState::bind_pose(),
        };

        let inverse_root = root.inverse();
        skeleton.evaluate_pose(root, current, sample_time, |visit| {
            if let Some(joint) = visit.node.joint() {
                joints[joint.id.index()] = inverse_root * visit.world * joint.inverse_bind;
            }
        });

        trace!(
            "Updated '{}' at {} ({})",
            name,
            sample_time,
            current.map_or("bind pose", AnimationClip::name)
        );
    }

    /// Current joint matrices, indexed by joint id
    pub fn skinning_matrices(&self) -> &[Mat4; MAX_JOINTS] {
        &self.joints
    }

    /// Joint matrices re-expressed in a mesh instance's space
    pub fn instance_joint_matrices(&self, instance: &MeshInstance) -> Box<[Mat4; MAX_JOINTS]> {
        let inverse = instance.inverse_transform();
        let mut out = Box::new([Mat4::IDENTITY; MAX_JOINTS]);
        for (slot, joint) in out.iter_mut().zip(self.joints.iter()) {
            *slot = inverse * *joint;
        }
        out
    }

    /// CPU-skinned vertices of every instance, in instance order
    pub fn skinned_vertices(&self) -> Vec<Vec<SkinnedVertex>> {
        self.instances
            .iter()
            .map(|i| i.skin(&self.joints))
            .collect()
    }

    /// Issue one draw per mesh instance
    ///
    /// In the color pass the skeleton is drawn as well when debug drawing is
    /// enabled.
    pub fn draw<R>(&self, root: Mat4, pass: RenderPass, renderer: &mut R)
    where
        R: MeshRenderer + DebugRenderer,
    {
        for instance in &self.instances {
            let joints = self.instance_joint_matrices(instance);
            let material = instance
                .mesh()
                .material
                .and_then(|m| self.materials.get(m));

            renderer.draw(&DrawCommand {
                pass,
                instance,
                material,
                model: root * instance.transform(),
                joints: &joints,
            });
        }

        if self.debug && pass == RenderPass::Color {
            self.draw_debug(root, renderer);
        }
    }

    /// Draw the skeleton at the pose of the last update
    ///
    /// Every node gets a marker; every non-root node gets a segment from its
    /// parent's origin to its own.
    pub fn draw_debug<R: DebugRenderer>(&self, root: Mat4, renderer: &mut R) {
        let clip = self.playback.clip.map(|c| self.clip_by_id(c));
        let marker = Mat4::from_scale(Vec3::splat(DEBUG_MARKER_SCALE));

        self.skeleton
            .evaluate_pose(root, clip, self.playback.sample_time, |visit| {
                renderer.joint_marker(visit.index, visit.world * marker);
                if visit.node.parent().is_some() {
                    renderer.bone_segment(
                        visit.index,
                        visit.parent_world,
                        Vec3::ZERO,
                        visit.local.w_axis.truncate(),
                    );
                }
            });
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Clip used by the last update
    pub fn current_clip(&self) -> Option<ClipId> {
        self.playback.clip
    }

    /// Sample time of the last update, in clip ticks
    pub fn current_time(&self) -> f32 {
        self.playback.sample_time
    }

    /// Joint node world positions of the last update
    pub fn joint_positions(&self, root: Mat4) -> Vec<(NodeIndex, Vec3)> {
        let clip = self.playback.clip.map(|c| self.clip_by_id(c));
        let mut out = Vec::with_capacity(self.skeleton.joint_count());
        self.skeleton
            .evaluate_pose(root, clip, self.playback.sample_time, |visit| {
                if visit.node.is_joint() {
                    out.push((visit.index, visit.world.w_axis.truncate()));
                }
            });
        out
    }
}

fn resolve_clip(owner: u64, clips: &[AnimationClip], id: ClipId) -> &AnimationClip {
    assert_eq!(
        id.owner, owner,
        "clip handle belongs to another object (owner {}, expected {})",
        id.owner, owner
    );
    &clips[id.index]
}

fn build_clip(desc: &AnimationDesc, skeleton: &Skeleton) -> Result<AnimationClip> {
    let mut clip = AnimationClip::new(
        desc.name.clone(),
        desc.duration,
        desc.ticks_per_second,
        skeleton.len(),
    )?;

    for channel in &desc.channels {
        let node = NodeIndex(channel.node);
        let track = KeyframeTrack::new(
            channel
                .position
                .iter()
                .map(|k| Keyframe::new(k.time, Vec3::from_array(k.value)))
                .collect(),
            channel
                .rotation
                .iter()
                .map(|k| Keyframe::new(k.time, glam::Quat::from_array(k.value)))
                .collect(),
            channel
                .scale
                .iter()
                .map(|k| Keyframe::new(k.time, Vec3::from_array(k.value)))
                .collect(),
        );

        clip.insert_track(node, track).map_err(|e| match e {
            AnimError::InvalidTrack { reason, .. } => AnimError::InvalidTrack {
                node: skeleton
                    .node(node)
                    .map_or_else(|| node.to_string(), |n| n.name().to_string()),
                reason: format!("clip '{}': {}", desc.name, reason),
            },
            other => other,
        })?;
    }

    debug!(
        "Clip '{}': {} ticks at {} ticks/s, {} animated nodes",
        clip.name(),
        clip.duration(),
        clip.ticks_per_second(),
        clip.animated_node_count()
    );

    Ok(clip)
}
