use instant::Instant;
use stage_core::{FrameView, GpuRenderer, Renderer, Stage, SurfaceSize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom;

/// GPU renderer bound to the page canvas; keeps the canvas backing store in
/// step with the surface.
pub struct WebRenderer {
    canvas: web::HtmlCanvasElement,
    gpu: GpuRenderer,
}

impl WebRenderer {
    pub async fn new(canvas: &web::HtmlCanvasElement, size: SurfaceSize) -> anyhow::Result<Self> {
        dom::set_canvas_size(canvas, size);
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let gpu = GpuRenderer::new(&instance, surface, size).await?;
        Ok(Self {
            canvas: canvas.clone(),
            gpu,
        })
    }
}

impl Renderer for WebRenderer {
    type Error = wgpu::SurfaceError;

    fn resize(&mut self, size: SurfaceSize) {
        dom::set_canvas_size(&self.canvas, size);
        self.gpu.resize(size);
    }

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), wgpu::SurfaceError> {
        self.gpu.render(frame)
    }
}

pub struct FrameContext {
    pub stage: Rc<RefCell<Stage>>,
    pub renderer: Option<WebRenderer>,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f64();
        self.last_instant = now;

        let mut stage = self.stage.borrow_mut();
        let Some(renderer) = self.renderer.as_mut() else {
            // No GPU: keep the timeline and viewport moving anyway.
            stage.advance(dt_sec);
            stage.poll_resize(now);
            return;
        };
        match stage.frame(dt_sec, now, renderer) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.gpu.reconfigure();
            }
            Err(e) => log::error!("render error: {:?}", e),
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
