pub mod animation;
pub mod camera;
pub mod config;
pub mod constants;
pub mod loader;
pub mod render;
pub mod scene;
pub mod scroll;
pub mod smoothing;
pub mod stage;
pub mod timeline;
pub mod viewport;

pub static STAGE_WGSL: &str = include_str!("../shaders/stage.wgsl");

pub use camera::{Camera, CameraMount, Projection};
pub use config::{SmoothingMode, StageConfig};
pub use loader::{load_stage, read_with_progress, LoadError, LoadProgress, StageAsset};
pub use render::GpuRenderer;
pub use scene::{Light, Scene};
pub use scroll::{NormalizerOptions, ScrollEvent, ScrollNormalizer, ScrollState, WheelDeltaMode};
pub use stage::{FrameView, Renderer, Stage};
pub use viewport::SurfaceSize;
