//! Keeps the camera aspect and the output surface in step with the window.

use std::time::Duration;

use instant::Instant;

use crate::camera::Camera;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Leading + trailing edge rate limiter.
///
/// The first request in a quiet period fires immediately; requests inside
/// the interval are remembered and fire once from [`Throttle::poll`] when the
/// interval has elapsed.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Instant>,
    pending: bool,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            pending: false,
        }
    }

    #[inline]
    fn ready(&self, now: Instant) -> bool {
        self.last_fired
            .map_or(true, |t| now >= t && now - t >= self.interval)
    }

    /// Returns true when the caller should act now.
    pub fn request(&mut self, now: Instant) -> bool {
        if self.ready(now) {
            self.last_fired = Some(now);
            self.pending = false;
            true
        } else {
            self.pending = true;
            false
        }
    }

    /// Returns true when a suppressed request is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.pending && self.ready(now) {
            self.last_fired = Some(now);
            self.pending = false;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Throttled window-size tracking.
#[derive(Clone, Debug)]
pub struct ViewportManager {
    throttle: Throttle,
    size: SurfaceSize,
    latest: SurfaceSize,
}

impl ViewportManager {
    pub fn new(initial: SurfaceSize, throttle: Duration) -> Self {
        Self {
            throttle: Throttle::new(throttle),
            size: initial,
            latest: initial,
        }
    }

    /// Size most recently applied to camera and surface.
    #[inline]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Record a window resize. Returns the size to apply now, if any.
    pub fn request(&mut self, size: SurfaceSize, now: Instant) -> Option<SurfaceSize> {
        if size.is_empty() {
            return None;
        }
        self.latest = size;
        self.throttle.request(now).then(|| self.commit())
    }

    /// Trailing edge: returns a suppressed size once the interval has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SurfaceSize> {
        self.throttle.poll(now).then(|| self.commit())
    }

    fn commit(&mut self) -> SurfaceSize {
        self.size = self.latest;
        self.size
    }

    /// Match the camera to the current size.
    pub fn apply_to(&self, camera: &mut Camera) {
        if self.size.is_empty() {
            return;
        }
        camera.set_aspect(self.size.aspect());
        camera.update_projection_matrix();
    }
}
