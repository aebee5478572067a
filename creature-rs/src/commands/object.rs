//! Skinned object command implementations

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use creature_anim::{NodeIndex, ObjectAsset, Skeleton, SkinnedObject};
use glam::Mat4;
use std::path::{Path, PathBuf};

use crate::utils::{
    NodeType, TreeNode, TreeOptions, add_table_row, create_table, format_matrix, format_seconds,
    format_vec3, load_document, render_tree,
};

/// Frame rate used when several frames are requested without `--fps`
const DEFAULT_FPS: f32 = 30.0;

#[derive(Subcommand)]
pub enum ObjectCommands {
    /// Display information about an object asset
    Info {
        /// Path to the asset (.json, .yaml or .yml)
        file: PathBuf,

        /// Show per-mesh and per-material details
        #[arg(short, long)]
        detailed: bool,
    },

    /// Display the skeleton as a tree
    Tree {
        /// Path to the asset (.json, .yaml or .yml)
        file: PathBuf,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Evaluate the pose and print joint positions
    Pose {
        /// Path to the asset (.json, .yaml or .yml)
        file: PathBuf,

        /// Clip to play; the bind pose is used when omitted
        #[arg(short, long)]
        clip: Option<String>,

        /// Start time in seconds
        #[arg(short, long, default_value_t = 0.0)]
        time: f32,

        /// Frames per second when stepping several frames
        #[arg(long)]
        fps: Option<f32>,

        /// Number of frames to evaluate
        #[arg(long, default_value_t = 1)]
        frames: usize,

        /// Also print the skinning matrix of every joint
        #[arg(short, long)]
        matrices: bool,
    },
}

pub fn execute(cmd: ObjectCommands) -> Result<()> {
    match cmd {
        ObjectCommands::Info { file, detailed } => handle_info(&file, detailed),
        ObjectCommands::Tree {
            file,
            depth,
            no_color,
        } => handle_tree(&file, depth, no_color),
        ObjectCommands::Pose {
            file,
            clip,
            time,
            fps,
            frames,
            matrices,
        } => handle_pose(&file, clip.as_deref(), time, fps, frames, matrices),
    }
}

/// Load and validate an object asset
fn load_object(path: &Path) -> Result<(ObjectAsset, SkinnedObject)> {
    let asset: ObjectAsset = load_document(path)?;
    let object = SkinnedObject::from_asset(&asset)
        .with_context(|| format!("Invalid object asset {}", path.display()))?;
    Ok((asset, object))
}

fn handle_info(path: &Path, detailed: bool) -> Result<()> {
    let (asset, object) = load_object(path)?;
    let skeleton = object.skeleton();

    println!("=== Object: {} ===", object.name());
    println!("Nodes:      {}", skeleton.len());
    println!("Joints:     {}", skeleton.joint_count());
    println!("Meshes:     {}", object.meshes().len());
    println!("Instances:  {}", object.instances().len());
    println!("Materials:  {}", object.materials().len());
    println!("Clips:      {}", object.clips().len());
    println!("Keyframes:  {}", asset.keyframe_count());

    if !object.clips().is_empty() {
        println!("\n=== Clips ===");
        let mut table = create_table(&["Name", "Ticks", "Ticks/s", "Length", "Animated nodes"]);
        for clip in object.clips() {
            add_table_row(
                &mut table,
                vec![
                    clip.name().to_string(),
                    format!("{:.2}", clip.duration()),
                    format!("{:.2}", clip.ticks_per_second()),
                    format_seconds(clip.duration_seconds()),
                    clip.animated_node_count().to_string(),
                ],
            );
        }
        table.printstd();
    }

    if detailed {
        println!("\n=== Meshes ===");
        let mut table = create_table(&["Name", "Vertices", "Triangles", "Material"]);
        for mesh in object.meshes() {
            let material = mesh
                .material
                .and_then(|i| object.materials().get(i))
                .map_or_else(|| "-".to_string(), |m| m.name.clone());
            add_table_row(
                &mut table,
                vec![
                    mesh.name.clone(),
                    mesh.vertex_count().to_string(),
                    mesh.triangle_count().to_string(),
                    material,
                ],
            );
        }
        table.printstd();

        if !object.materials().is_empty() {
            println!("\n=== Materials ===");
            let mut table = create_table(&["Name", "Diffuse", "Specular", "Shininess"]);
            for material in object.materials() {
                add_table_row(
                    &mut table,
                    vec![
                        material.name.clone(),
                        format_vec3(material.diffuse),
                        format_vec3(material.specular),
                        format!("{:.1}", material.shininess),
                    ],
                );
            }
            table.printstd();
        }

        println!("\n=== Bind Pose ===");
        let mut table = create_table(&["Node", "Joint", "Translation", "Scale"]);
        for row in bind_pose_rows(skeleton) {
            add_table_row(&mut table, row);
        }
        table.printstd();

        println!(
            "\nInverse bind error: {:.6}",
            skeleton.inverse_bind_error()
        );
    }

    Ok(())
}

fn bind_pose_rows(skeleton: &Skeleton) -> Vec<Vec<String>> {
    skeleton
        .nodes()
        .iter()
        .map(|node| {
            let bind = node.bind_components();
            vec![
                node.name().to_string(),
                node.joint().map_or_else(|| "-".to_string(), |j| j.id.to_string()),
                format_vec3(bind.translation),
                format_vec3(bind.scale),
            ]
        })
        .collect()
}

fn handle_tree(path: &Path, max_depth: Option<usize>, no_color: bool) -> Result<()> {
    let (_, object) = load_object(path)?;

    let root = build_tree(object.skeleton(), NodeIndex::ROOT);
    let options = TreeOptions {
        max_depth,
        no_color,
        ..TreeOptions::default()
    };

    print!("{}", render_tree(&root, &options));
    Ok(())
}

fn build_tree(skeleton: &Skeleton, index: NodeIndex) -> TreeNode {
    let Some(node) = skeleton.node(index) else {
        return TreeNode::new(format!("{index}"), NodeType::Node);
    };

    let node_type = if index == NodeIndex::ROOT {
        NodeType::Root
    } else if node.is_joint() {
        NodeType::Joint
    } else {
        NodeType::Node
    };

    let mut tree = TreeNode::new(node.name(), node_type);
    if let Some(joint) = node.joint() {
        tree = tree.with_metadata("joint", joint.id.to_string());
    }
    node.children()
        .iter()
        .fold(tree, |tree, &child| tree.add_child(build_tree(skeleton, child)))
}

fn handle_pose(
    path: &Path,
    clip_name: Option<&str>,
    start: f32,
    fps: Option<f32>,
    frames: usize,
    show_matrices: bool,
) -> Result<()> {
    let fps = fps.unwrap_or(DEFAULT_FPS);
    if !(fps.is_finite() && fps > 0.0) {
        bail!("Frame rate must be positive, got {fps}");
    }

    let (_, mut object) = load_object(path)?;
    let clip = match clip_name {
        Some(name) => Some(object.find_clip(name).with_context(|| {
            let available: Vec<&str> = object.clips().iter().map(|c| c.name()).collect();
            format!("No clip named '{name}' (available: {})", available.join(", "))
        })?),
        None => None,
    };

    for frame in 0..frames.max(1) {
        let time = start + frame as f32 / fps;
        object.update(Mat4::IDENTITY, clip, time);

        println!(
            "=== Frame {} (t = {:.3}s, tick {:.3}) ===",
            frame,
            time,
            object.current_time()
        );

        let mut table = create_table(&["Node", "Name", "Joint", "World position"]);
        for (index, position) in object.joint_positions(Mat4::IDENTITY) {
            let Some(node) = object.skeleton().node(index) else {
                continue;
            };
            let joint = node
                .joint()
                .map_or_else(|| "-".to_string(), |j| j.id.to_string());
            add_table_row(
                &mut table,
                vec![
                    index.to_string(),
                    node.name().to_string(),
                    joint,
                    format_vec3(position),
                ],
            );
        }
        table.printstd();

        if show_matrices {
            for (index, binding) in object.skeleton().joints() {
                let name = object.skeleton().node(index).map_or("", |n| n.name());
                println!("\nJoint {} ({name}):", binding.id);
                println!(
                    "{}",
                    format_matrix(&object.skinning_matrices()[binding.id.index()], "  ")
                );
            }
        }
    }

    Ok(())
}
