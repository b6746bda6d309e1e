#![deny(unsafe_code)]
//! WASM exports for the Crosswing color pipeline.
//!
//! The host page runs the capability probe (`CSS.supports` and
//! `navigator.userAgent`) and hands the results to `init_color_support`
//! once; every render afterwards uses the stored support level.

use crosswing_color::{
    build_hex_color, map_into_gamut, ColorError, ColorOptions, ColorSupport, OkLch, ProbeConfig,
    Theme,
};
use std::sync::OnceLock;
use wasm_bindgen::prelude::*;

static SUPPORT: OnceLock<ColorSupport> = OnceLock::new();

fn current_support() -> ColorSupport {
    SUPPORT.get().copied().unwrap_or_default()
}

fn parse_support_config(json: &str) -> Result<ProbeConfig, String> {
    if json.trim().is_empty() {
        return Ok(ProbeConfig::default());
    }
    serde_json::from_str(json).map_err(|e| format!("invalid support config: {e}"))
}

fn resolve_support(css_supports: bool, user_agent: &str, config: &ProbeConfig) -> ColorSupport {
    let detected = ColorSupport::detect(css_supports, user_agent, config);
    let stored = *SUPPORT.get_or_init(|| detected);
    if stored != detected {
        tracing::debug!(?stored, ?detected, "color support already initialized");
    }
    stored
}

fn render_hex(hex: &str, options_json: &str, support: ColorSupport) -> Result<String, String> {
    let options = if options_json.trim().is_empty() {
        ColorOptions::default()
    } else {
        let value: serde_json::Value =
            serde_json::from_str(options_json).map_err(|e| format!("invalid options: {e}"))?;
        ColorOptions::from_json(&value).map_err(|e| e.to_string())?
    };
    build_hex_color(hex, &options, support).map_err(|e| e.to_string())
}

fn render_theme(json: &str, support: ColorSupport) -> Result<String, ColorError> {
    if json.trim().is_empty() {
        return Ok(Theme::builtin().var_css(support));
    }
    Ok(Theme::from_json(json)?.var_css(support))
}

/// Stores the probe result. Later calls keep the first value and return it.
///
/// `config_json` holds `ProbeConfig` thresholds and may be empty for the
/// defaults.
#[wasm_bindgen]
pub fn init_color_support(
    css_supports: bool,
    user_agent: &str,
    config_json: &str,
) -> Result<bool, JsValue> {
    let config = parse_support_config(config_json).map_err(|e| JsValue::from_str(&e))?;
    Ok(resolve_support(css_supports, user_agent, &config).is_p3())
}

/// Whether renders target Display-P3. Defaults to true before init.
#[wasm_bindgen]
pub fn supports_p3() -> bool {
    current_support().is_p3()
}

/// Renders a hex color. `options_json` may be empty.
#[wasm_bindgen]
pub fn hex_color(hex: &str, options_json: &str) -> Result<String, JsValue> {
    render_hex(hex, options_json, current_support()).map_err(|e| JsValue::from_str(&e))
}

/// Gamut-maps an OKLCH color into sRGB and returns its hex.
#[wasm_bindgen]
pub fn gamut_hex(l: f64, c: f64, h: f64) -> String {
    map_into_gamut(OkLch { l, c, h })
}

/// CSS variable declarations for a theme document, or the built-in theme
/// when `json` is empty.
#[wasm_bindgen]
pub fn theme_css(json: &str) -> Result<String, JsValue> {
    render_theme(json, current_support()).map_err(|e| JsValue::from_str(&e.to_string()))
}
