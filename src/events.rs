use instant::Instant;
use stage_core::{ScrollEvent, Stage, WheelDeltaMode};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom;

/// Register `handler` for `event` on `target`; the closure lives for the page.
fn listen<E>(
    target: &web::EventTarget,
    event: &str,
    passive: bool,
    handler: impl FnMut(E) + 'static,
) where
    E: wasm_bindgen::convert::FromWasmAbi + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    let opts = web::AddEventListenerOptions::new();
    opts.set_passive(passive);
    if target
        .add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &opts,
        )
        .is_err()
    {
        log::warn!("[events] could not listen for {}", event);
    }
    closure.forget();
}

#[inline]
fn viewport_height(window: &web::Window) -> f64 {
    dom::window_inner_size(window).height as f64
}

fn push(stage: &Rc<RefCell<Stage>>, event: ScrollEvent) {
    stage.borrow_mut().scroll(event);
}

/// Wheel, touch and keyboard input all feed the stage's scroll position.
pub fn wire_scroll_input(window: &web::Window, stage: Rc<RefCell<Stage>>) {
    let target: &web::EventTarget = window.as_ref();

    {
        let stage = stage.clone();
        let window = window.clone();
        listen(target, "wheel", true, move |ev: web::WheelEvent| {
            let height = viewport_height(&window);
            let event = stage.borrow().normalizer().wheel(
                ev.delta_y(),
                WheelDeltaMode::from_dom(ev.delta_mode()),
                height,
            );
            push(&stage, event);
        });
    }

    {
        let stage = stage.clone();
        listen(target, "touchstart", true, move |ev: web::TouchEvent| {
            if let Some(touch) = ev.target_touches().get(0) {
                stage
                    .borrow_mut()
                    .normalizer_mut()
                    .touch_start(touch.page_y() as f64);
            }
        });
    }

    {
        let stage = stage.clone();
        listen(target, "touchmove", true, move |ev: web::TouchEvent| {
            let Some(touch) = ev.target_touches().get(0) else {
                return;
            };
            let event = stage
                .borrow_mut()
                .normalizer_mut()
                .touch_move(touch.page_y() as f64);
            if let Some(event) = event {
                push(&stage, event);
            }
        });
    }

    {
        let stage = stage.clone();
        listen(target, "touchend", true, move |_: web::TouchEvent| {
            stage.borrow_mut().normalizer_mut().touch_end();
        });
    }

    {
        let window = window.clone();
        listen(target, "keydown", false, move |ev: web::KeyboardEvent| {
            let height = viewport_height(&window);
            let event = stage
                .borrow()
                .normalizer()
                .key(&ev.key(), ev.shift_key(), height);
            if let Some(event) = event {
                push(&stage, event);
            }
        });
    }
}

/// Window resizes go through the stage's throttled viewport.
pub fn wire_resize(window: &web::Window, stage: Rc<RefCell<Stage>>) {
    let w = window.clone();
    listen(window.as_ref(), "resize", true, move |_: web::Event| {
        let size = dom::window_inner_size(&w);
        if let Some(applied) = stage.borrow_mut().request_resize(size, Instant::now()) {
            log::info!("[events] resize {}x{}", applied.width, applied.height);
        }
    });
}
