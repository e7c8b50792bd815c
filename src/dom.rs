use stage_core::SurfaceSize;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::{CANVAS_ID, CANVAS_STYLE};

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Window inner size in CSS pixels; empty if the window reports nothing usable.
pub fn window_inner_size(window: &web::Window) -> SurfaceSize {
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0).max(0.0) as u32
    };
    SurfaceSize::new(dim(window.inner_width()), dim(window.inner_height()))
}

/// Find `#stage-canvas`, creating it under `<body>` when the page has none.
pub fn find_or_create_canvas(document: &web::Document) -> anyhow::Result<web::HtmlCanvasElement> {
    if let Some(el) = document.get_element_by_id(CANVAS_ID) {
        return el
            .dyn_into::<web::HtmlCanvasElement>()
            .map_err(|e| anyhow::anyhow!("#{} is not a canvas: {:?}", CANVAS_ID, e));
    }
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    canvas.set_id(CANVAS_ID);
    _ = canvas.set_attribute("style", CANVAS_STYLE);
    let body = document.body().ok_or_else(|| anyhow::anyhow!("no body"))?;
    body.append_child(&canvas)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    log::info!("[dom] created #{}", CANVAS_ID);
    Ok(canvas)
}

#[inline]
pub fn set_canvas_size(canvas: &web::HtmlCanvasElement, size: SurfaceSize) {
    canvas.set_width(size.width.max(1));
    canvas.set_height(size.height.max(1));
}

/// Set `display` on the first element matching `selector`.
pub fn set_display(document: &web::Document, selector: &str, display: &str) -> anyhow::Result<()> {
    let el = document
        .query_selector(selector)
        .map_err(|e| anyhow::anyhow!("bad selector {}: {:?}", selector, e))?
        .ok_or_else(|| anyhow::anyhow!("missing {}", selector))?
        .dyn_into::<web::HtmlElement>()
        .map_err(|_| anyhow::anyhow!("{} is not an HTML element", selector))?;
    el.style()
        .set_property("display", display)
        .map_err(|e| anyhow::anyhow!("{:?}", e))
}
