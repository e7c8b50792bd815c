//! Decoding of the stage bundle (glTF JSON or binary GLB).
//!
//! The bundle must be self-contained: buffers live in the GLB binary chunk or
//! in `data:` URIs. Mesh hierarchy, camera and clip are taken at index 0.

use std::io::Read;

use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;

use crate::animation::{
    AnimationClip, Interpolation, KeyframeTrack, Track, TrackData, TrackTarget,
};
use crate::camera::Projection;
use crate::scene::{Mesh, NodeGraph, Primitive, SceneNode, Transform};

const DEFAULT_BASE_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
const READ_CHUNK: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("glTF decode failed: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("asset read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset contains no scene")]
    NoScene,
    #[error("asset contains no mesh")]
    NoMesh,
    #[error("asset contains no camera")]
    NoCamera,
    #[error("asset contains no animation")]
    NoAnimation,
    #[error("animation '{0}' has no usable keyframes")]
    EmptyClip(String),
    #[error("node hierarchy is not a tree (node {0})")]
    CyclicHierarchy(usize),
}

/// Everything the stage needs from one decoded bundle.
#[derive(Clone, Debug)]
pub struct StageAsset {
    pub graph: NodeGraph,
    /// Node (local to `graph`) that carries camera 0.
    pub camera_node: usize,
    pub projection: Projection,
    pub clip: AnimationClip,
}

impl StageAsset {
    /// Parent of the camera node, the scope the camera animation is bound to.
    pub fn camera_parent(&self) -> Option<usize> {
        self.graph.nodes.get(self.camera_node).and_then(|n| n.parent)
    }
}

/// Byte counts reported while an asset streams in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    /// Completed percentage, when the total size is known.
    pub fn percent(&self) -> Option<f64> {
        self.total
            .filter(|&t| t > 0)
            .map(|t| self.loaded as f64 / t as f64 * 100.0)
    }
}

/// Read `reader` to the end, reporting progress after every chunk.
pub fn read_with_progress<R: Read>(
    mut reader: R,
    total: Option<u64>,
    mut on_progress: impl FnMut(LoadProgress),
) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        bytes.extend_from_slice(&chunk[..n]);
        on_progress(LoadProgress {
            loaded: bytes.len() as u64,
            total,
        });
    }
    Ok(bytes)
}

/// Decode a stage bundle from memory.
pub fn load_stage(bytes: &[u8]) -> Result<StageAsset, LoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, None, blob)?;
    let buffer_data =
        |buffer: gltf::Buffer<'_>| buffers.get(buffer.index()).map(|d| d.0.as_slice());

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(LoadError::NoScene)?;
    if document.meshes().next().is_none() {
        return Err(LoadError::NoMesh);
    }

    let graph = NodeGraph {
        nodes: read_nodes(&document)?,
        roots: scene.nodes().map(|n| n.index()).collect(),
        meshes: document
            .meshes()
            .map(|m| read_mesh(&m, &buffer_data))
            .collect(),
    };

    let (camera_node, projection) = document
        .nodes()
        .find_map(|n| {
            n.camera()
                .filter(|c| c.index() == 0)
                .map(|c| (n.index(), read_projection(&c)))
        })
        .ok_or(LoadError::NoCamera)?;

    let animation = document.animations().next().ok_or(LoadError::NoAnimation)?;
    let clip = read_clip(&animation, &buffer_data);
    if clip.tracks.is_empty() || !(clip.duration > 0.0) {
        return Err(LoadError::EmptyClip(clip.name));
    }

    log::info!(
        "[loader] nodes={} meshes={} camera_node={} clip='{}' duration={:.2}s tracks={}",
        graph.nodes.len(),
        graph.meshes.len(),
        camera_node,
        clip.name,
        clip.duration,
        clip.tracks.len()
    );

    Ok(StageAsset {
        graph,
        camera_node,
        projection,
        clip,
    })
}

fn read_nodes(document: &gltf::Document) -> Result<Vec<SceneNode>, LoadError> {
    let mut nodes: Vec<SceneNode> = document
        .nodes()
        .map(|n| {
            let (t, r, s) = n.transform().decomposed();
            SceneNode {
                name: n.name().map(str::to_owned),
                transform: Transform {
                    translation: Vec3::from(t),
                    rotation: Quat::from_array(r),
                    scale: Vec3::from(s),
                },
                parent: None,
                children: n.children().map(|c| c.index()).collect(),
                mesh: n.mesh().map(|m| m.index()),
            }
        })
        .collect();
    for parent in 0..nodes.len() {
        for child in nodes[parent].children.clone() {
            let Some(c) = nodes.get_mut(child) else {
                continue;
            };
            // A node listed under two parents, or under itself, is not a tree
            if child == parent || c.parent.is_some() {
                return Err(LoadError::CyclicHierarchy(child));
            }
            c.parent = Some(parent);
        }
    }
    // With single parents, a chain longer than the node count revisits a node
    for start in 0..nodes.len() {
        let mut cur = nodes[start].parent;
        let mut steps = 0;
        while let Some(i) = cur {
            steps += 1;
            if steps > nodes.len() {
                return Err(LoadError::CyclicHierarchy(start));
            }
            cur = nodes.get(i).and_then(|n| n.parent);
        }
    }
    Ok(nodes)
}

fn read_mesh<'a, F>(mesh: &gltf::Mesh<'_>, buffer_data: &F) -> Mesh
where
    F: Clone + Fn(gltf::Buffer<'_>) -> Option<&'a [u8]>,
{
    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "[loader] skipping non-triangle primitive {} of mesh {}",
                primitive.index(),
                mesh.index()
            );
            continue;
        }
        let reader = primitive.reader(buffer_data.clone());
        let positions: Vec<[f32; 3]> = match reader.read_positions() {
            Some(iter) => iter.collect(),
            None => continue,
        };
        let indices: Vec<u32> = reader
            .read_indices()
            .map(|i| i.into_u32().collect())
            .unwrap_or_else(|| (0..positions.len() as u32).collect());
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|iter| iter.collect())
            .unwrap_or_else(|| compute_normals(&positions, &indices));
        let material = primitive.material();
        let base_color = match material.index() {
            Some(_) => material.pbr_metallic_roughness().base_color_factor(),
            None => DEFAULT_BASE_COLOR,
        };
        primitives.push(Primitive {
            base_color,
            positions,
            normals,
            indices,
        });
    }
    Mesh {
        name: mesh.name().map(str::to_owned),
        primitives,
    }
}

/// Area-weighted vertex normals for primitives that ship without them.
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (
            Vec3::from(positions[a]),
            Vec3::from(positions[b]),
            Vec3::from(positions[c]),
        );
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

fn read_projection(camera: &gltf::Camera<'_>) -> Projection {
    match camera.projection() {
        gltf::camera::Projection::Perspective(p) => Projection::Perspective {
            fovy_radians: p.yfov(),
            aspect: p.aspect_ratio().unwrap_or(1.0),
            znear: p.znear(),
            zfar: p.zfar(),
        },
        gltf::camera::Projection::Orthographic(o) => Projection::Orthographic {
            xmag: o.xmag(),
            ymag: o.ymag(),
            znear: o.znear(),
            zfar: o.zfar(),
        },
    }
}

fn read_clip<'a, F>(animation: &gltf::Animation<'_>, buffer_data: &F) -> AnimationClip
where
    F: Clone + Fn(gltf::Buffer<'_>) -> Option<&'a [u8]>,
{
    let mut tracks = Vec::new();
    for channel in animation.channels() {
        let reader = channel.reader(buffer_data.clone());
        let target = channel.target();
        let Some(times) = reader.read_inputs().map(|i| i.collect::<Vec<f32>>()) else {
            continue;
        };
        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };
        let (target_path, data) = match reader.read_outputs() {
            Some(ReadOutputs::Translations(iter)) => (
                TrackTarget::Translation,
                TrackData::Vector3(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from).collect(),
                    interpolation,
                )),
            ),
            Some(ReadOutputs::Scales(iter)) => (
                TrackTarget::Scale,
                TrackData::Vector3(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from).collect(),
                    interpolation,
                )),
            ),
            Some(ReadOutputs::Rotations(iter)) => (
                TrackTarget::Rotation,
                TrackData::Quaternion(KeyframeTrack::new(
                    times,
                    iter.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                )),
            ),
            _ => {
                log::warn!(
                    "[loader] skipping unsupported channel on node {}",
                    target.node().index()
                );
                continue;
            }
        };
        tracks.push(Track {
            node: target.node().index(),
            target: target_path,
            data,
        });
    }
    AnimationClip::new(animation.name().unwrap_or("animation"), tracks)
}
