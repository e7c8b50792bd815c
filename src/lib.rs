#![cfg(target_arch = "wasm32")]
use instant::Instant;
use stage_core::{load_stage, Stage};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod config;
mod constants;
mod dom;
mod events;
mod fetch;
mod frame;

use constants::{LOADING_SELECTOR, TUTORIAL_DISPLAY, TUTORIAL_SELECTOR};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("stage-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let config = config::from_location(&window);
    let asset_url = config.asset_path.clone();
    let size = dom::window_inner_size(&window);
    let canvas = dom::find_or_create_canvas(&document)?;

    // The stage is usable (placeholder camera, empty scene) before anything loads.
    let stage = Rc::new(RefCell::new(Stage::new(config, size)));
    events::wire_scroll_input(&window, stage.clone());
    events::wire_resize(&window, stage.clone());

    {
        let stage = stage.clone();
        let window = window.clone();
        spawn_local(async move {
            if let Err(e) = load_and_install(&window, &document, &asset_url, &stage).await {
                log::error!("[load] {}: {:?}", asset_url, e);
            }
        });
    }

    let renderer = match frame::WebRenderer::new(&canvas, size).await {
        Ok(r) => Some(r),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    };
    frame::start_loop(Rc::new(RefCell::new(frame::FrameContext {
        stage,
        renderer,
        last_instant: Instant::now(),
    })));
    Ok(())
}

async fn load_and_install(
    window: &web::Window,
    document: &web::Document,
    url: &str,
    stage: &Rc<RefCell<Stage>>,
) -> anyhow::Result<()> {
    let bytes = fetch::fetch_bytes(window, url).await?;
    let asset = load_stage(&bytes)?;
    dom::set_display(document, LOADING_SELECTOR, "none")?;
    dom::set_display(document, TUTORIAL_SELECTOR, TUTORIAL_DISPLAY)?;
    stage.borrow_mut().install(asset);
    Ok(())
}
