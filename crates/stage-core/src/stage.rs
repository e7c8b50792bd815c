//! The stage context: owns scroll, animation, scene, camera and viewport
//! state and exposes one entry point per event source.
//!
//! Field ownership follows the event source that writes it: the scroll
//! handler writes the raw scroll position ([`Stage::scroll`]), the load
//! completion installs the asset once ([`Stage::install`]), resize events go
//! through the throttled viewport ([`Stage::request_resize`]), and the frame
//! step ([`Stage::frame`]) owns the smoothed value and animation time.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use instant::Instant;

use crate::animation::AnimationPlayer;
use crate::camera::{Camera, CameraMount};
use crate::config::StageConfig;
use crate::loader::StageAsset;
use crate::scene::{Light, Scene};
use crate::scroll::{ScrollEvent, ScrollNormalizer, ScrollState};
use crate::smoothing::Smoother;
use crate::timeline::map_time;
use crate::viewport::{SurfaceSize, ViewportManager};

/// What a renderer needs to draw one frame.
pub struct FrameView<'a> {
    pub scene: &'a Scene,
    /// World matrix per scene node.
    pub world: &'a [Mat4],
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
}

/// Output backend driven by [`Stage::frame`].
pub trait Renderer {
    type Error;

    /// Resize the output surface.
    fn resize(&mut self, size: SurfaceSize);

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), Self::Error>;
}

pub struct Stage {
    config: StageConfig,
    scroll: ScrollState,
    normalizer: ScrollNormalizer,
    smoother: Smoother,
    scene: Scene,
    camera: Camera,
    player: Option<AnimationPlayer>,
    viewport: ViewportManager,
    pending_surface: Option<SurfaceSize>,
}

impl Stage {
    /// A stage showing an empty scene through the placeholder camera.
    pub fn new(config: StageConfig, size: SurfaceSize) -> Self {
        let mut camera = Camera::placeholder(size.aspect());
        let viewport = ViewportManager::new(size, config.resize_throttle);
        viewport.apply_to(&mut camera);
        Self {
            scroll: ScrollState::new(config.scroll_ratio),
            normalizer: ScrollNormalizer::new(config.normalizer),
            smoother: Smoother::new(config.smoothing),
            scene: Scene::new(),
            camera,
            player: None,
            viewport,
            pending_surface: None,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn player(&self) -> Option<&AnimationPlayer> {
        self.player.as_ref()
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.player.is_some()
    }

    #[inline]
    pub fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    #[inline]
    pub fn smooth_percent(&self) -> f64 {
        self.smoother.value()
    }

    #[inline]
    pub fn viewport_size(&self) -> SurfaceSize {
        self.viewport.size()
    }

    #[inline]
    pub fn normalizer(&self) -> &ScrollNormalizer {
        &self.normalizer
    }

    /// Gesture normalizer; touch tracking state lives here.
    #[inline]
    pub fn normalizer_mut(&mut self) -> &mut ScrollNormalizer {
        &mut self.normalizer
    }

    /// Scroll handler entry point.
    pub fn scroll(&mut self, event: ScrollEvent) {
        self.scroll.apply(event);
    }

    /// Load completion entry point: add the stage hierarchy and lights, swap
    /// in the asset camera and bind a paused player to the camera's parent.
    pub fn install(&mut self, asset: StageAsset) {
        if self.is_loaded() {
            log::warn!("[stage] ignoring second install; a stage is already loaded");
            return;
        }
        let camera_parent = asset.camera_parent();
        let StageAsset {
            graph,
            camera_node,
            projection,
            clip,
        } = asset;

        let base = self.scene.add_graph(graph);
        self.scene.add_light(Light::stage_ambient());
        self.scene.add_light(Light::stage_point());

        self.camera = Camera::new(projection, CameraMount::Node(base + camera_node));
        self.viewport.apply_to(&mut self.camera);

        let mut player = AnimationPlayer::new(
            Arc::new(clip),
            camera_parent.map(|p| p + base),
            &self.scene,
            base,
        );
        player.play();
        player.pause();
        log::info!(
            "[stage] installed clip '{}' ({:.2}s, {} bound tracks), camera on node {}",
            player.clip().name,
            player.duration(),
            player.bound_tracks(),
            base + camera_node
        );
        self.player = Some(player);
    }

    /// Window resize entry point. Returns the size applied now, if not throttled.
    pub fn request_resize(&mut self, size: SurfaceSize, now: Instant) -> Option<SurfaceSize> {
        let applied = self.viewport.request(size, now)?;
        self.apply_size(applied);
        Some(applied)
    }

    /// Apply a throttled resize whose interval has elapsed.
    pub fn poll_resize(&mut self, now: Instant) -> Option<SurfaceSize> {
        let applied = self.viewport.poll(now)?;
        self.apply_size(applied);
        Some(applied)
    }

    fn apply_size(&mut self, size: SurfaceSize) {
        self.viewport.apply_to(&mut self.camera);
        self.pending_surface = Some(size);
    }

    /// Smooth the scroll value and pose the scene at the mapped clip time.
    /// Does nothing before the asset is installed.
    pub fn advance(&mut self, dt_sec: f64) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let smooth = self.smoother.step(self.scroll.percent(), dt_sec);
        if let Some(t) = map_time(smooth, player.duration()) {
            player.set_time(t);
        }
        player.update(dt_sec as f32, &mut self.scene);
    }

    /// Per-frame step: advance, apply due resizes, then render.
    pub fn frame<R: Renderer>(
        &mut self,
        dt_sec: f64,
        now: Instant,
        renderer: &mut R,
    ) -> Result<(), R::Error> {
        self.advance(dt_sec);
        self.poll_resize(now);
        if let Some(size) = self.pending_surface.take() {
            renderer.resize(size);
        }

        let world = self.scene.world_matrices();
        let frame = FrameView {
            scene: &self.scene,
            view: self.camera.view_matrix(&world),
            projection: self.camera.projection_matrix(),
            camera_position: self.camera.position(&world),
            world: &world,
        };
        renderer.render(&frame)
    }
}
