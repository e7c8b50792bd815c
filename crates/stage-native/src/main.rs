use std::fs::File;
use std::sync::Arc;
use std::thread;

use instant::Instant;
use winit::event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{EventLoopBuilder, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use stage_core::constants::NATIVE_ASSET_PATH;
use stage_core::{
    load_stage, read_with_progress, GpuRenderer, LoadError, Stage, StageAsset, StageConfig,
    SurfaceSize,
};

/// Sent from the loader thread once the asset has been decoded.
enum AppEvent {
    Loaded(Result<StageAsset, LoadError>),
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // stage-native [path] [key=value ...]
    let mut config = StageConfig {
        asset_path: NATIVE_ASSET_PATH.to_string(),
        ..StageConfig::default()
    };
    config.apply_args(std::env::args().skip(1));
    let path = config.asset_path.clone();

    let event_loop = EventLoopBuilder::<AppEvent>::with_user_event().build()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Stage (native)")
            .build(&event_loop)?,
    );

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(window.clone())?;
    let size = window_size(&window);
    let mut renderer = pollster::block_on(GpuRenderer::new(&instance, surface, size))?;
    let mut stage = Stage::new(config, size);

    spawn_loader(path, event_loop.create_proxy());

    let mut last_frame = Instant::now();
    let mut shift = false;
    event_loop.run(move |event, elwt| match event {
        Event::UserEvent(AppEvent::Loaded(result)) => match result {
            Ok(asset) => stage.install(asset),
            Err(e) => log::error!("[native] failed to load stage: {}", e),
        },
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(s) => {
                stage.request_resize(SurfaceSize::new(s.width, s.height), Instant::now());
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let normalizer = stage.normalizer_mut();
                let ev = match delta {
                    MouseScrollDelta::LineDelta(_, y) => normalizer.lines(y as f64),
                    MouseScrollDelta::PixelDelta(p) => normalizer.pixels(p.y),
                };
                stage.scroll(ev);
            }
            WindowEvent::ModifiersChanged(m) => shift = m.state().shift_key(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                let Some(name) = dom_key_name(&logical_key) else {
                    return;
                };
                let height = window_size(&window).height as f64;
                if let Some(ev) = stage.normalizer_mut().key(name, shift, height) {
                    stage.scroll(ev);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            let dt_sec = (now - last_frame).as_secs_f64();
            last_frame = now;
            match stage.frame(dt_sec, now, &mut renderer) {
                Ok(_) => window.request_redraw(),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    renderer.reconfigure()
                }
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::warn!("[native] frame skipped: {:?}", e),
            }
        }
        _ => {}
    })?;
    Ok(())
}

fn spawn_loader(path: String, proxy: EventLoopProxy<AppEvent>) {
    thread::spawn(move || {
        let result = File::open(&path)
            .and_then(|file| {
                let total = file.metadata().ok().map(|m| m.len());
                let mut last_logged = -1i64;
                read_with_progress(file, total, |p| {
                    if let Some(pct) = p.percent() {
                        let whole = pct as i64;
                        if whole != last_logged {
                            last_logged = whole;
                            log::info!("{}% loaded", whole);
                        }
                    }
                })
            })
            .map_err(LoadError::from)
            .and_then(|bytes| load_stage(&bytes));
        if proxy.send_event(AppEvent::Loaded(result)).is_err() {
            log::warn!("[native] event loop closed before {} finished loading", path);
        }
    });
}

/// Map winit keys onto the DOM key names the scroll normalizer understands.
fn dom_key_name(key: &Key) -> Option<&'static str> {
    match key {
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp"),
        Key::Named(NamedKey::ArrowDown) => Some("ArrowDown"),
        Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft"),
        Key::Named(NamedKey::ArrowRight) => Some("ArrowRight"),
        Key::Named(NamedKey::PageUp) => Some("PageUp"),
        Key::Named(NamedKey::PageDown) => Some("PageDown"),
        Key::Named(NamedKey::Space) => Some(" "),
        _ => None,
    }
}

fn window_size(window: &Window) -> SurfaceSize {
    let s = window.inner_size();
    SurfaceSize::new(s.width, s.height)
}
