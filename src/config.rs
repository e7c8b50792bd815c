use stage_core::StageConfig;
use web_sys as web;

use crate::constants::QUERY_OVERRIDES;

/// Shipped config plus any overrides found in the page URL (`?touch=4` etc).
pub fn from_location(window: &web::Window) -> StageConfig {
    let mut config = StageConfig::default();
    let Ok(href) = window.location().href() else {
        return config;
    };
    let Ok(url) = web::Url::new(&href) else {
        return config;
    };
    let params = url.search_params();
    for key in QUERY_OVERRIDES {
        if let Some(value) = params.get(key) {
            log::info!("[config] override {}={}", key, value);
            config.apply_override(key, &value);
        }
    }
    config
}
