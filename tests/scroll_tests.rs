// Host-side tests for scroll normalization and accumulation.

use stage_core::constants::{FIREFOX_MULTIPLIER, KEY_STEP, SCROLL_RATIO, TOUCH_MULTIPLIER};
use stage_core::{NormalizerOptions, ScrollEvent, ScrollNormalizer, ScrollState, WheelDeltaMode};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn accumulation_is_the_negated_sum_of_deltas() {
    let mut s = ScrollState::default();
    for d in [-100.0, 40.0, -3.5, 0.0, 250.0] {
        s.apply(ScrollEvent { delta_y: d });
    }
    assert!(approx(s.raw_position(), -(-100.0 + 40.0 - 3.5 + 0.0 + 250.0)));
}

#[test]
fn position_is_unbounded_both_ways() {
    let mut s = ScrollState::default();
    s.apply_delta(-1.0e9);
    assert!(s.raw_position() > 0.0);
    assert!(s.percent() > 1.0);
    let mut s = ScrollState::default();
    s.apply_delta(1.0e9);
    assert!(s.percent() < -1.0);
}

#[test]
fn percent_is_position_times_ratio() {
    let mut s = ScrollState::new(SCROLL_RATIO);
    s.apply(ScrollEvent { delta_y: -1000.0 });
    assert!(approx(s.percent(), 0.05));
    // Pure: repeated reads agree
    assert_eq!(s.percent(), s.percent());
    assert_eq!(s.ratio(), SCROLL_RATIO);
}

#[test]
fn wheel_down_grows_the_position() {
    let n = ScrollNormalizer::default();
    let ev = n.wheel(100.0, WheelDeltaMode::Pixel, 800.0);
    assert!(approx(ev.delta_y, -100.0));
    let mut s = ScrollState::default();
    s.apply(ev);
    assert!(approx(s.raw_position(), 100.0));
}

#[test]
fn line_and_page_wheel_modes_scale_to_pixels() {
    let n = ScrollNormalizer::default();
    let lines = n.wheel(3.0, WheelDeltaMode::Line, 800.0);
    assert!(approx(lines.delta_y, -3.0 * FIREFOX_MULTIPLIER));
    let page = n.wheel(1.0, WheelDeltaMode::Page, 800.0);
    assert!(approx(page.delta_y, -760.0));
    assert_eq!(WheelDeltaMode::from_dom(1), WheelDeltaMode::Line);
    assert_eq!(WheelDeltaMode::from_dom(2), WheelDeltaMode::Page);
    assert_eq!(WheelDeltaMode::from_dom(0), WheelDeltaMode::Pixel);
    assert_eq!(WheelDeltaMode::from_dom(42), WheelDeltaMode::Pixel);
}

#[test]
fn native_line_and_pixel_deltas_use_scroll_up_convention() {
    let n = ScrollNormalizer::default();
    assert!(approx(n.lines(1.0).delta_y, FIREFOX_MULTIPLIER));
    assert!(approx(n.lines(-2.0).delta_y, -2.0 * FIREFOX_MULTIPLIER));
    assert!(approx(n.pixels(-30.0).delta_y, -30.0));
}

#[test]
fn mouse_multiplier_scales_wheel_input() {
    let n = ScrollNormalizer::new(NormalizerOptions {
        mouse_multiplier: 2.0,
        ..NormalizerOptions::default()
    });
    assert!(approx(n.wheel(10.0, WheelDeltaMode::Pixel, 800.0).delta_y, -20.0));
    assert!(approx(n.pixels(10.0).delta_y, 20.0));
}

#[test]
fn touch_drag_is_measured_against_previous_touch() {
    let mut n = ScrollNormalizer::default();
    assert_eq!(n.touch_move(10.0), None);

    n.touch_start(100.0);
    // Finger moves up by 10px: content scrolls down
    let ev = n.touch_move(90.0).unwrap();
    assert!(approx(ev.delta_y, -10.0 * TOUCH_MULTIPLIER));
    let ev = n.touch_move(95.0).unwrap();
    assert!(approx(ev.delta_y, 5.0 * TOUCH_MULTIPLIER));

    n.touch_end();
    assert_eq!(n.touch_move(50.0), None);
}

#[test]
fn keys_map_to_fixed_steps() {
    let n = ScrollNormalizer::default();
    let h = 1000.0;
    assert!(approx(n.key("ArrowDown", false, h).unwrap().delta_y, -KEY_STEP));
    assert!(approx(n.key("ArrowUp", false, h).unwrap().delta_y, KEY_STEP));
    assert!(approx(n.key("ArrowRight", false, h).unwrap().delta_y, -KEY_STEP));
    assert!(approx(n.key("PageDown", false, h).unwrap().delta_y, -960.0));
    assert!(approx(n.key("PageUp", false, h).unwrap().delta_y, 960.0));
    assert!(approx(n.key(" ", false, h).unwrap().delta_y, -960.0));
    assert!(approx(n.key(" ", true, h).unwrap().delta_y, 960.0));
    assert_eq!(n.key("a", false, h), None);
    // Tiny viewports never flip the page direction
    assert!(approx(n.key("PageDown", false, 10.0).unwrap().delta_y, 0.0));
}
