//! Scene graph: a node arena holding the stage hierarchy, its meshes and
//! the two fixed lights.

use glam::{Mat4, Quat, Vec3};

use crate::constants::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    pub name: Option<String>,
    pub transform: Transform,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Primitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

/// A self-contained node hierarchy; node indices are local to the graph.
#[derive(Clone, Debug, Default)]
pub struct NodeGraph {
    pub nodes: Vec<SceneNode>,
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: Vec3,
        intensity: f32,
    },
    Point {
        color: Vec3,
        intensity: f32,
        position: Vec3,
    },
}

impl Light {
    pub fn stage_ambient() -> Self {
        Light::Ambient {
            color: Vec3::from(AMBIENT_COLOR),
            intensity: AMBIENT_INTENSITY,
        }
    }

    pub fn stage_point() -> Self {
        Light::Point {
            color: Vec3::from(POINT_COLOR),
            intensity: POINT_INTENSITY,
            position: point_light_position(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub lights: Vec<Light>,
    revision: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped whenever geometry is added; renderers re-upload on change.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Append a hierarchy and return the offset added to its node indices.
    pub fn add_graph(&mut self, graph: NodeGraph) -> usize {
        let node_base = self.nodes.len();
        let mesh_base = self.meshes.len();
        self.nodes.extend(graph.nodes.into_iter().map(|mut n| {
            n.parent = n.parent.map(|p| p + node_base);
            n.children.iter_mut().for_each(|c| *c += node_base);
            n.mesh = n.mesh.map(|m| m + mesh_base);
            n
        }));
        self.roots.extend(graph.roots.into_iter().map(|r| r + node_base));
        self.meshes.extend(graph.meshes);
        self.revision += 1;
        node_base
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    #[inline]
    pub fn node(&self, index: usize) -> Option<&SceneNode> {
        self.nodes.get(index)
    }

    #[inline]
    pub fn node_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        self.nodes.get_mut(index)
    }

    /// True when `node` is `ancestor` or lies below it.
    pub fn is_in_subtree(&self, node: usize, ancestor: usize) -> bool {
        let mut cur = Some(node);
        for _ in 0..=self.nodes.len() {
            let Some(i) = cur else {
                break;
            };
            if i == ancestor {
                return true;
            }
            cur = self.nodes.get(i).and_then(|n| n.parent);
        }
        false
    }

    /// `(node, mesh)` pairs reachable from the roots, in traversal order.
    pub fn mesh_instances(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            let Some(node) = self.nodes.get(i) else {
                continue;
            };
            if std::mem::replace(&mut visited[i], true) {
                continue;
            }
            if let Some(m) = node.mesh.filter(|&m| m < self.meshes.len()) {
                out.push((i, m));
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// World matrix of every node, indexed like `nodes`.
    ///
    /// Nodes not reachable from a root keep their local matrix. Each node is
    /// visited once, so a malformed graph cannot stall the frame.
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut world: Vec<Mat4> = self.nodes.iter().map(|n| n.transform.matrix()).collect();
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, Mat4)> =
            self.roots.iter().map(|&r| (r, Mat4::IDENTITY)).collect();
        while let Some((i, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(i) else {
                continue;
            };
            if std::mem::replace(&mut visited[i], true) {
                continue;
            }
            let m = parent * node.transform.matrix();
            world[i] = m;
            stack.extend(node.children.iter().map(|&c| (c, m)));
        }
        world
    }
}
