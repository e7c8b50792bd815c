use js_sys::{Reflect, Uint8Array};
use stage_core::LoadProgress;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

use crate::constants::PROGRESS_LOG_STEP_PCT;

fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

/// Fetch `url` into memory, logging "N% loaded" as the body streams in.
///
/// Falls back to a single `arrayBuffer()` read when the response has no
/// readable body.
pub async fn fetch_bytes(window: &web::Window, url: &str) -> anyhow::Result<Vec<u8>> {
    let response: web::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    if !response.ok() {
        anyhow::bail!("GET {} failed: {} {}", url, response.status(), response.status_text());
    }
    let total = response
        .headers()
        .get("content-length")
        .ok()
        .flatten()
        .and_then(|v| v.parse::<u64>().ok());

    let Some(body) = response.body() else {
        let buf = JsFuture::from(response.array_buffer().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        return Ok(Uint8Array::new(&buf).to_vec());
    };

    let reader: web::ReadableStreamDefaultReader = body.get_reader().unchecked_into();
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut last_logged = -PROGRESS_LOG_STEP_PCT;
    loop {
        let chunk = JsFuture::from(reader.read()).await.map_err(js_err)?;
        let done = Reflect::get(&chunk, &JsValue::from_str("done"))
            .map_err(js_err)?
            .as_bool()
            .unwrap_or(true);
        if done {
            break;
        }
        let value = Reflect::get(&chunk, &JsValue::from_str("value")).map_err(js_err)?;
        bytes.extend_from_slice(&Uint8Array::new(&value).to_vec());

        let progress = LoadProgress {
            loaded: bytes.len() as u64,
            total,
        };
        if let Some(pct) = progress.percent() {
            if pct - last_logged >= PROGRESS_LOG_STEP_PCT {
                last_logged = pct.floor();
                log::info!("{}% loaded", pct.floor());
            }
        }
    }
    Ok(bytes)
}
