// In-memory GLB fixtures for host-side tests.
//
// The stage fixture has a single triangle mesh (node 0) and a camera rig
// (node 1) whose child (node 2) carries the camera. The clip moves the rig
// from x=0 to x=10 over 10 seconds.

#![allow(dead_code)]

use serde_json::{json, Value};

pub const CLIP_DURATION: f32 = 10.0;
pub const RIG_END_X: f32 = 10.0;
pub const CAMERA_ASPECT: f32 = 1.5;

#[derive(Clone, Copy)]
pub struct Fixture {
    pub camera: bool,
    pub animation: bool,
    pub mesh: bool,
    /// The camera node lists the rig as its child, closing a loop.
    pub cyclic: bool,
    /// The mesh node also claims the camera node as a child.
    pub shared_child: bool,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            camera: true,
            animation: true,
            mesh: true,
            cyclic: false,
            shared_child: false,
        }
    }
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn pad_to_4(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}

fn binary_chunk() -> Vec<u8> {
    let mut bin = Vec::new();
    // positions, 36 bytes at 0
    bin.extend(f32_bytes(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]));
    // indices, 6 bytes at 36
    for i in [0u16, 1, 2] {
        bin.extend(i.to_le_bytes());
    }
    pad_to_4(&mut bin, 0);
    // key times, 8 bytes at 44
    bin.extend(f32_bytes(&[0.0, CLIP_DURATION]));
    // rig translations, 24 bytes at 52
    bin.extend(f32_bytes(&[0.0, 0.0, 0.0, RIG_END_X, 0.0, 0.0]));
    bin
}

fn document(fixture: Fixture, bin_len: usize) -> Value {
    let mut mesh_node = json!({ "name": "Floor" });
    if fixture.mesh {
        mesh_node["mesh"] = json!(0);
    }
    if fixture.shared_child {
        mesh_node["children"] = json!([2]);
    }
    let mut camera_node = json!({ "name": "Camera" });
    if fixture.camera {
        camera_node["camera"] = json!(0);
    }
    if fixture.cyclic {
        camera_node["children"] = json!([1]);
    }

    let mut doc = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 1] }],
        "nodes": [
            mesh_node,
            { "name": "CameraRig", "children": [2], "translation": [0.0, 0.0, 5.0] },
            camera_node
        ],
        "buffers": [{ "byteLength": bin_len }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 },
            { "buffer": 0, "byteOffset": 44, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 52, "byteLength": 24 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [CLIP_DURATION] },
            { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }
        ]
    });
    if fixture.mesh {
        doc["meshes"] = json!([{
            "name": "Floor",
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }]
        }]);
    }
    if fixture.camera {
        doc["cameras"] = json!([{
            "type": "perspective",
            "perspective": {
                "yfov": 0.8, "znear": 0.1, "zfar": 100.0, "aspectRatio": CAMERA_ASPECT
            }
        }]);
    }
    if fixture.animation {
        doc["animations"] = json!([{
            "name": "CameraMove",
            "channels": [{ "sampler": 0, "target": { "node": 1, "path": "translation" } }],
            "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }]
        }]);
    }
    doc
}

/// Assemble a binary glTF container.
pub fn build_glb(fixture: Fixture) -> Vec<u8> {
    let mut bin = binary_chunk();
    pad_to_4(&mut bin, 0);
    let mut json = serde_json::to_vec(&document(fixture, bin.len())).unwrap_or_default();
    pad_to_4(&mut json, b' ');

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend(b"glTF");
    glb.extend(2u32.to_le_bytes());
    glb.extend((total as u32).to_le_bytes());
    glb.extend((json.len() as u32).to_le_bytes());
    glb.extend(b"JSON");
    glb.extend(json);
    glb.extend((bin.len() as u32).to_le_bytes());
    glb.extend(b"BIN\0");
    glb.extend(bin);
    glb
}

pub fn stage_glb() -> Vec<u8> {
    build_glb(Fixture::default())
}
