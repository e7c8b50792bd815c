//! Runtime configuration for a stage.
//!
//! `StageConfig::default()` reproduces the shipped tuning from
//! [`crate::constants`]. Front ends may override individual fields (the web
//! build reads a few from the page URL) before handing the config to
//! [`crate::Stage::new`].

use std::time::Duration;

use crate::constants::*;
use crate::scroll::NormalizerOptions;

/// How the smoothed scroll value chases its target each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SmoothingMode {
    /// Fixed lerp weight per rendered frame; the lag depends on frame rate.
    PerFrame { damping: f64 },
    /// Weight derived from elapsed time: `1 - exp(-rate * dt)`.
    TimeScaled { rate: f64 },
}

impl Default for SmoothingMode {
    fn default() -> Self {
        SmoothingMode::PerFrame {
            damping: SCROLL_DAMPING,
        }
    }
}

#[derive(Clone, Debug)]
pub struct StageConfig {
    pub scroll_ratio: f64,
    pub smoothing: SmoothingMode,
    pub normalizer: NormalizerOptions,
    pub resize_throttle: Duration,
    pub asset_path: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            scroll_ratio: SCROLL_RATIO,
            smoothing: SmoothingMode::default(),
            normalizer: NormalizerOptions::default(),
            resize_throttle: Duration::from_millis(RESIZE_THROTTLE_MS),
            asset_path: DEFAULT_ASSET_PATH.to_string(),
        }
    }
}

impl StageConfig {
    /// Apply a `key=value` override, as read from a query string.
    ///
    /// Unknown keys and unparsable values are logged and ignored.
    pub fn apply_override(&mut self, key: &str, value: &str) {
        let parsed = value.parse::<f64>().ok().filter(|v| v.is_finite());
        match (key, parsed) {
            ("asset", _) if !value.is_empty() => self.asset_path = value.to_string(),
            ("ratio", Some(v)) => self.scroll_ratio = v,
            ("damping", Some(v)) if v > 0.0 && v < 1.0 => {
                self.smoothing = SmoothingMode::PerFrame { damping: v }
            }
            ("rate", Some(v)) if v > 0.0 => self.smoothing = SmoothingMode::TimeScaled { rate: v },
            ("touch", Some(v)) => self.normalizer.touch_multiplier = v,
            ("mouse", Some(v)) => self.normalizer.mouse_multiplier = v,
            _ => log::warn!("[config] ignoring override {}={}", key, value),
        }
    }

    /// Apply command-line arguments: `key=value` pairs go through
    /// [`Self::apply_override`], a bare argument names the asset.
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for arg in args {
            let arg = arg.as_ref();
            match arg.split_once('=') {
                Some((key, value)) => self.apply_override(key, value),
                None if !arg.is_empty() => self.asset_path = arg.to_string(),
                None => {}
            }
        }
    }
}
