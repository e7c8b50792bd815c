//! Scroll input: gesture normalization and accumulation.
//!
//! Raw input (wheel, touch drags, keys) is first normalized into a
//! [`ScrollEvent`] whose `delta_y` is positive when the content should move
//! down, i.e. when the user scrolls *up*. [`ScrollState`] then accumulates
//! `raw_position -= delta_y`, so scrolling down grows the position. The
//! position is unbounded in both directions.

use crate::constants::*;

/// One normalized scroll gesture step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollEvent {
    pub delta_y: f64,
}

/// Unit of a DOM `WheelEvent.deltaY`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelDeltaMode {
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    /// Map a DOM `deltaMode` value (0, 1, 2).
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => WheelDeltaMode::Line,
            2 => WheelDeltaMode::Page,
            _ => WheelDeltaMode::Pixel,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizerOptions {
    pub mouse_multiplier: f64,
    pub touch_multiplier: f64,
    pub firefox_multiplier: f64,
    pub key_step: f64,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            mouse_multiplier: MOUSE_MULTIPLIER,
            touch_multiplier: TOUCH_MULTIPLIER,
            firefox_multiplier: FIREFOX_MULTIPLIER,
            key_step: KEY_STEP,
        }
    }
}

/// Turns device input into [`ScrollEvent`]s.
///
/// Touch drags are stateful (the delta is measured against the previous
/// touch position), everything else is a pure mapping.
#[derive(Clone, Debug, Default)]
pub struct ScrollNormalizer {
    pub options: NormalizerOptions,
    touch_y: Option<f64>,
}

impl ScrollNormalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self {
            options,
            touch_y: None,
        }
    }

    /// Normalize a DOM wheel event. `dom_delta_y` is positive when scrolling down.
    pub fn wheel(
        &self,
        dom_delta_y: f64,
        mode: WheelDeltaMode,
        viewport_height: f64,
    ) -> ScrollEvent {
        let mut delta_y = -dom_delta_y;
        match mode {
            WheelDeltaMode::Pixel => {}
            WheelDeltaMode::Line => delta_y *= self.options.firefox_multiplier,
            WheelDeltaMode::Page => delta_y *= page_distance(viewport_height),
        }
        ScrollEvent {
            delta_y: delta_y * self.options.mouse_multiplier,
        }
    }

    /// Normalize a line-based wheel delta where positive means "scroll up"
    /// (winit's `LineDelta` convention).
    pub fn lines(&self, lines_up: f64) -> ScrollEvent {
        ScrollEvent {
            delta_y: lines_up * self.options.firefox_multiplier * self.options.mouse_multiplier,
        }
    }

    /// Normalize a pixel-based wheel delta where positive means "scroll up".
    pub fn pixels(&self, pixels_up: f64) -> ScrollEvent {
        ScrollEvent {
            delta_y: pixels_up * self.options.mouse_multiplier,
        }
    }

    pub fn touch_start(&mut self, page_y: f64) {
        self.touch_y = Some(page_y);
    }

    /// Returns `None` when no touch is in progress.
    pub fn touch_move(&mut self, page_y: f64) -> Option<ScrollEvent> {
        let start = self.touch_y.replace(page_y)?;
        Some(ScrollEvent {
            delta_y: (page_y - start) * self.options.touch_multiplier,
        })
    }

    pub fn touch_end(&mut self) {
        self.touch_y = None;
    }

    /// Normalize a keyboard key (DOM `KeyboardEvent.key` naming).
    pub fn key(&self, key: &str, shift: bool, viewport_height: f64) -> Option<ScrollEvent> {
        let page = page_distance(viewport_height);
        let delta_y = match key {
            "ArrowUp" | "ArrowLeft" => self.options.key_step,
            "ArrowDown" | "ArrowRight" => -self.options.key_step,
            "PageUp" => page,
            "PageDown" => -page,
            " " if shift => page,
            " " => -page,
            _ => return None,
        };
        Some(ScrollEvent { delta_y })
    }
}

#[inline]
fn page_distance(viewport_height: f64) -> f64 {
    (viewport_height - PAGE_KEY_MARGIN).max(0.0)
}

/// Accumulated scroll position. Written only by the scroll handler.
#[derive(Clone, Debug)]
pub struct ScrollState {
    raw_position: f64,
    ratio: f64,
}

impl ScrollState {
    pub fn new(ratio: f64) -> Self {
        Self {
            raw_position: 0.0,
            ratio,
        }
    }

    #[inline]
    pub fn apply(&mut self, event: ScrollEvent) {
        self.apply_delta(event.delta_y);
    }

    #[inline]
    pub fn apply_delta(&mut self, delta_y: f64) {
        self.raw_position -= delta_y;
    }

    #[inline]
    pub fn raw_position(&self) -> f64 {
        self.raw_position
    }

    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Fraction of the clip the accumulated scroll corresponds to (unbounded).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.raw_position * self.ratio
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(SCROLL_RATIO)
    }
}
