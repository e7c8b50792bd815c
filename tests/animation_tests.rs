// Host-side tests for keyframe sampling and clip playback.

use glam::{Quat, Vec3};
use stage_core::animation::{
    AnimationClip, AnimationPlayer, Interpolation, KeyframeCursor, KeyframeTrack, Track, TrackData,
    TrackTarget,
};
use stage_core::scene::{NodeGraph, SceneNode};
use stage_core::Scene;
use std::sync::Arc;

fn ramp(interpolation: Interpolation) -> KeyframeTrack<f32> {
    KeyframeTrack::new(vec![0.0, 1.0, 3.0], vec![0.0, 10.0, 30.0], interpolation)
}

#[test]
fn linear_track_interpolates_and_clamps() {
    let track = ramp(Interpolation::Linear);
    let mut c = KeyframeCursor::default();
    assert_eq!(track.sample(0.5, &mut c), Some(5.0));
    assert_eq!(track.sample(2.0, &mut c), Some(20.0));
    assert_eq!(track.sample(-1.0, &mut c), Some(0.0));
    assert_eq!(track.sample(99.0, &mut c), Some(30.0));
    assert_eq!(track.end_time(), 3.0);
}

#[test]
fn step_track_holds_previous_key() {
    let track = ramp(Interpolation::Step);
    let mut c = KeyframeCursor::default();
    assert_eq!(track.sample(0.99, &mut c), Some(0.0));
    assert_eq!(track.sample(1.0, &mut c), Some(10.0));
    assert_eq!(track.sample(2.9, &mut c), Some(10.0));
}

#[test]
fn cursor_handles_backward_scrubbing() {
    let times: Vec<f32> = (0..100).map(|i| i as f32).collect();
    let values = times.clone();
    let track = KeyframeTrack::new(times, values, Interpolation::Linear);
    let mut c = KeyframeCursor::default();
    for t in [95.5, 2.25, 50.75, 49.5, 0.0, 98.0] {
        let v = track.sample(t, &mut c).unwrap();
        assert!((v - t).abs() < 1e-4, "sample({}) = {}", t, v);
    }
}

#[test]
fn cubic_spline_hits_keys_and_uses_tangents() {
    // [in, value, out] per key, zero tangents
    let track = KeyframeTrack::new(
        vec![0.0, 2.0],
        vec![0.0, 0.0, 0.0, 0.0, 4.0, 0.0],
        Interpolation::CubicSpline,
    );
    let mut c = KeyframeCursor::default();
    assert_eq!(track.sample(0.0, &mut c), Some(0.0));
    assert_eq!(track.sample(2.0, &mut c), Some(4.0));
    // Zero tangents: smoothstep midpoint
    assert!((track.sample(1.0, &mut c).unwrap() - 2.0).abs() < 1e-6);
}

#[test]
fn invalid_tracks_sample_nothing() {
    let empty: KeyframeTrack<f32> = KeyframeTrack::new(vec![], vec![], Interpolation::Linear);
    assert!(!empty.is_valid());
    assert_eq!(empty.sample(0.0, &mut KeyframeCursor::default()), None);
    let short = KeyframeTrack::new(vec![0.0, 1.0], vec![1.0, 2.0], Interpolation::CubicSpline);
    assert!(!short.is_valid());
}

#[test]
fn quaternion_tracks_slerp() {
    let end = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
    let track =
        KeyframeTrack::new(vec![0.0, 1.0], vec![Quat::IDENTITY, end], Interpolation::Linear);
    let q = track.sample(0.5, &mut KeyframeCursor::default()).unwrap();
    let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
    assert!(q.angle_between(expected) < 1e-4);
}

fn rig_scene() -> Scene {
    // 0: root, 1: rig (child of root), 2: unrelated sibling root
    let graph = NodeGraph {
        nodes: vec![
            SceneNode {
                children: vec![1],
                ..SceneNode::default()
            },
            SceneNode {
                parent: Some(0),
                ..SceneNode::default()
            },
            SceneNode::default(),
        ],
        roots: vec![0, 2],
        meshes: vec![],
    };
    let mut scene = Scene::new();
    scene.add_graph(graph);
    scene
}

fn slide_clip(node: usize) -> AnimationClip {
    AnimationClip::new(
        "slide",
        vec![Track {
            node,
            target: TrackTarget::Translation,
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, 4.0],
                vec![Vec3::ZERO, Vec3::new(8.0, 0.0, 0.0)],
                Interpolation::Linear,
            )),
        }],
    )
}

#[test]
fn clip_duration_is_latest_key() {
    let clip = slide_clip(1);
    assert_eq!(clip.duration, 4.0);
    assert_eq!(AnimationClip::new("empty", vec![]).duration, 0.0);
}

#[test]
fn paused_player_applies_set_time_without_advancing() {
    let mut scene = rig_scene();
    let mut player = AnimationPlayer::new(Arc::new(slide_clip(1)), Some(0), &scene, 0);
    assert!(player.is_paused());
    assert_eq!(player.bound_tracks(), 1);

    player.set_time(1.0);
    player.update(0.5, &mut scene);
    assert_eq!(player.time(), 1.0);
    assert!((scene.nodes[1].transform.translation.x - 2.0).abs() < 1e-6);
}

#[test]
fn playing_player_advances_and_loops() {
    let mut scene = rig_scene();
    let mut player = AnimationPlayer::new(Arc::new(slide_clip(1)), None, &scene, 0);
    player.play();
    player.update(3.0, &mut scene);
    assert!((player.time() - 3.0).abs() < 1e-6);
    player.update(2.0, &mut scene);
    assert!((player.time() - 1.0).abs() < 1e-6);
    assert!((scene.nodes[1].transform.translation.x - 2.0).abs() < 1e-5);
}

#[test]
fn time_scale_speeds_up_and_reverses_playback() {
    let mut scene = rig_scene();
    let mut player = AnimationPlayer::new(Arc::new(slide_clip(1)), None, &scene, 0);
    assert_eq!(player.time_scale(), 1.0);
    player.set_time_scale(2.0);
    player.play();
    player.update(1.5, &mut scene);
    assert!((player.time() - 3.0).abs() < 1e-6);

    // Backwards past the start wraps to the clip end
    player.set_time_scale(-1.0);
    player.update(3.5, &mut scene);
    assert!((player.time() - 3.5).abs() < 1e-6);

    // Paused players ignore the scale
    player.pause();
    player.update(1.0, &mut scene);
    assert!((player.time() - 3.5).abs() < 1e-6);
}

#[test]
fn tracks_outside_the_root_subtree_are_not_bound() {
    let mut scene = rig_scene();
    let player = AnimationPlayer::new(Arc::new(slide_clip(2)), Some(0), &scene, 0);
    assert_eq!(player.bound_tracks(), 0);
    let player = AnimationPlayer::new(Arc::new(slide_clip(7)), None, &scene, 0);
    assert_eq!(player.bound_tracks(), 0);

    let mut player = AnimationPlayer::new(Arc::new(slide_clip(2)), Some(0), &scene, 0);
    player.set_time(2.0);
    player.update(0.0, &mut scene);
    assert_eq!(scene.nodes[2].transform.translation, Vec3::ZERO);
}
