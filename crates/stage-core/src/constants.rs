use glam::Vec3;

// Shared tuning constants used by both web and native frontends.

// Scroll mapping
pub const SCROLL_RATIO: f64 = 0.000_05; // accumulated pixels -> clip fraction
pub const SCROLL_DAMPING: f64 = 0.05; // per-frame lerp weight toward the target
pub const SCROLL_DAMPING_RATE: f64 = 3.08; // per-second rate; matches 0.05/frame at 60 Hz

// Gesture normalization
pub const MOUSE_MULTIPLIER: f64 = 1.0;
pub const TOUCH_MULTIPLIER: f64 = 8.0;
pub const FIREFOX_MULTIPLIER: f64 = 15.0; // line-mode wheel deltas -> pixels
pub const KEY_STEP: f64 = 120.0; // pixels per arrow key press
pub const PAGE_KEY_MARGIN: f64 = 40.0; // page keys scroll viewport height minus this

// Viewport
pub const RESIZE_THROTTLE_MS: u64 = 100;

// Placeholder camera, replaced by the asset camera once loaded
pub const PLACEHOLDER_FOV_DEG: f32 = 70.0;
pub const PLACEHOLDER_ZNEAR: f32 = 0.01;
pub const PLACEHOLDER_ZFAR: f32 = 1000.0;
pub const PLACEHOLDER_POSITION: [f32; 3] = [0.0, 0.0, 5.0];

// Lighting
pub const AMBIENT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
pub const AMBIENT_INTENSITY: f32 = 0.8;
pub const POINT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
pub const POINT_INTENSITY: f32 = 0.2;
pub const POINT_POSITION: [f32; 3] = [10.0, -10.0, 40.0];

// Background, #F8EDE3 in sRGB
pub const CLEAR_COLOR_SRGB: [u8; 3] = [0xF8, 0xED, 0xE3];

// Asset
pub const DEFAULT_ASSET_PATH: &str = "stage.glb";
// Relative to the working directory of the desktop viewer
pub const NATIVE_ASSET_PATH: &str = "assets/stage.glb";

#[inline]
pub fn placeholder_position() -> Vec3 {
    Vec3::from(PLACEHOLDER_POSITION)
}

#[inline]
pub fn point_light_position() -> Vec3 {
    Vec3::from(POINT_POSITION)
}

/// Convert an 8-bit sRGB channel to linear space for the clear color.
#[inline]
pub fn srgb_to_linear(c: u8) -> f64 {
    let c = f64::from(c) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
