use crate::config::SmoothingMode;

/// First-order exponential follower for the scroll percentage.
///
/// Stepped once per rendered frame by the frame step, which is its only writer.
#[derive(Clone, Debug)]
pub struct Smoother {
    value: f64,
    mode: SmoothingMode,
}

impl Smoother {
    pub fn new(mode: SmoothingMode) -> Self {
        Self { value: 0.0, mode }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn mode(&self) -> SmoothingMode {
        self.mode
    }

    /// Lerp weight used for a step of `dt_sec` seconds, clamped to [0, 1].
    pub fn factor(&self, dt_sec: f64) -> f64 {
        let f = match self.mode {
            SmoothingMode::PerFrame { damping } => damping,
            SmoothingMode::TimeScaled { rate } => 1.0 - (-rate * dt_sec.max(0.0)).exp(),
        };
        f.clamp(0.0, 1.0)
    }

    /// Move toward `target` and return the new smoothed value.
    pub fn step(&mut self, target: f64, dt_sec: f64) -> f64 {
        self.value += (target - self.value) * self.factor(dt_sec);
        self.value
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(SmoothingMode::default())
    }
}
