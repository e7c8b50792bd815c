// Host-side tests for resize throttling and camera aspect handling.

use glam::{Mat4, Vec3};
use instant::Instant;
use stage_core::viewport::{Throttle, ViewportManager};
use stage_core::{Camera, CameraMount, Projection, SurfaceSize};
use std::time::Duration;

const INTERVAL: Duration = Duration::from_millis(100);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn throttle_fires_leading_edge_then_trailing_once() {
    let t0 = Instant::now();
    let mut th = Throttle::new(INTERVAL);
    assert!(th.request(t0));
    assert!(!th.request(t0 + ms(30)));
    assert!(!th.request(t0 + ms(60)));
    assert!(th.is_pending());
    assert!(!th.poll(t0 + ms(90)));
    assert!(th.poll(t0 + ms(100)));
    assert!(!th.is_pending());
    assert!(!th.poll(t0 + ms(400)));
}

#[test]
fn throttle_allows_spaced_requests() {
    let t0 = Instant::now();
    let mut th = Throttle::new(INTERVAL);
    assert!(th.request(t0));
    assert!(th.request(t0 + ms(150)));
    assert!(th.request(t0 + ms(300)));
}

#[test]
fn manager_applies_latest_suppressed_size() {
    let t0 = Instant::now();
    let mut vp = ViewportManager::new(SurfaceSize::new(800, 600), INTERVAL);
    assert_eq!(vp.request(SurfaceSize::new(1000, 700), t0), Some(SurfaceSize::new(1000, 700)));
    assert_eq!(vp.request(SurfaceSize::new(1100, 700), t0 + ms(10)), None);
    assert_eq!(vp.request(SurfaceSize::new(1200, 700), t0 + ms(20)), None);
    assert_eq!(vp.size(), SurfaceSize::new(1000, 700));
    assert_eq!(vp.poll(t0 + ms(120)), Some(SurfaceSize::new(1200, 700)));
    assert_eq!(vp.size(), SurfaceSize::new(1200, 700));
}

#[test]
fn zero_sized_windows_are_ignored() {
    let t0 = Instant::now();
    let mut vp = ViewportManager::new(SurfaceSize::new(800, 600), INTERVAL);
    assert_eq!(vp.request(SurfaceSize::new(0, 600), t0), None);
    assert_eq!(vp.request(SurfaceSize::new(640, 0), t0), None);
    assert_eq!(vp.size(), SurfaceSize::new(800, 600));
    // The ignored requests did not consume the leading edge
    assert!(vp.request(SurfaceSize::new(640, 480), t0).is_some());
}

#[test]
fn apply_sets_perspective_aspect() {
    let mut vp = ViewportManager::new(SurfaceSize::new(800, 600), INTERVAL);
    vp.request(SurfaceSize::new(1920, 1080), Instant::now());
    let mut cam = Camera::placeholder(1.0);
    vp.apply_to(&mut cam);
    assert_eq!(cam.aspect(), Some(1920.0 / 1080.0));
    let expected = Mat4::perspective_rh(70f32.to_radians(), 1920.0 / 1080.0, 0.01, 1000.0);
    assert!(cam.projection_matrix().abs_diff_eq(expected, 1e-6));
}

#[test]
fn orthographic_cameras_keep_their_extents() {
    let proj = Projection::Orthographic {
        xmag: 2.0,
        ymag: 1.0,
        znear: 0.1,
        zfar: 10.0,
    };
    let mut cam = Camera::new(proj, CameraMount::Free(Mat4::IDENTITY));
    let vp = ViewportManager::new(SurfaceSize::new(1920, 1080), INTERVAL);
    vp.apply_to(&mut cam);
    assert_eq!(cam.aspect(), None);
    assert_eq!(cam.projection, proj);
}

#[test]
fn placeholder_camera_sits_at_z5() {
    let cam = Camera::placeholder(1.5);
    assert_eq!(cam.position(&[]), Vec3::new(0.0, 0.0, 5.0));
    let view = cam.view_matrix(&[]);
    assert!(view.transform_point3(Vec3::new(0.0, 0.0, 5.0)).length() < 1e-6);
}

#[test]
fn node_mounted_camera_follows_world_matrix() {
    let cam = Camera::new(
        Projection::Perspective {
            fovy_radians: 1.0,
            aspect: 1.0,
            znear: 0.1,
            zfar: None,
        },
        CameraMount::Node(1),
    );
    let world = [Mat4::IDENTITY, Mat4::from_translation(Vec3::new(3.0, 2.0, 1.0))];
    assert_eq!(cam.position(&world), Vec3::new(3.0, 2.0, 1.0));
    // Missing node falls back to the origin
    assert_eq!(cam.position(&world[..1]), Vec3::ZERO);
}

#[test]
fn surface_size_helpers() {
    assert!(SurfaceSize::new(0, 10).is_empty());
    assert!(!SurfaceSize::new(1, 1).is_empty());
    assert_eq!(SurfaceSize::new(1920, 1080).aspect(), 1920.0 / 1080.0);
}
