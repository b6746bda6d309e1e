//! Render options accepted by color builders.
//!
//! Options can be built in code or read from a JSON object. The JSON reader
//! follows the lenient parameter style: a missing or wrongly-typed numeric
//! key is treated as absent rather than as an error.

use crate::builder::HexColor;
use crate::error::ColorError;
use serde_json::Value;

/// How a hue edit is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum HueShift {
    /// Rotate by this many degrees, wrapping into [0, 360).
    Rotate(f64),
    /// Take the hue of another color, keeping lightness and chroma.
    Match(HexColor),
}

/// Output shape of a rendered color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `color(display-p3 ...)` or `rgba(...)`, depending on support.
    #[default]
    Css,
    /// Plain `#rrggbb`. Alpha is ignored.
    Hex,
}

/// Options for rendering a builder. All edits act in OKLCH.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorOptions {
    /// Output alpha; defaults to 1.
    pub alpha: Option<f64>,
    /// `l *= 1 + lighten`.
    pub lighten: Option<f64>,
    /// `l *= 1 - darken`.
    pub darken: Option<f64>,
    pub hue: Option<HueShift>,
    /// `c *= 1 + saturate`.
    pub saturate: Option<f64>,
    /// `c *= 1 - desaturate`.
    pub desaturate: Option<f64>,
    pub format: Format,
}

impl ColorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_lighten(mut self, amount: f64) -> Self {
        self.lighten = Some(amount);
        self
    }

    pub fn with_darken(mut self, amount: f64) -> Self {
        self.darken = Some(amount);
        self
    }

    pub fn with_hue(mut self, hue: HueShift) -> Self {
        self.hue = Some(hue);
        self
    }

    pub fn with_saturate(mut self, amount: f64) -> Self {
        self.saturate = Some(amount);
        self
    }

    pub fn with_desaturate(mut self, amount: f64) -> Self {
        self.desaturate = Some(amount);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Alpha to render with (1 when unset).
    pub fn alpha_or_default(&self) -> f64 {
        self.alpha.unwrap_or(1.0)
    }

    /// True if any OKLCH edit is requested.
    pub fn has_transform(&self) -> bool {
        self.lighten.is_some()
            || self.darken.is_some()
            || self.hue.is_some()
            || self.saturate.is_some()
            || self.desaturate.is_some()
    }

    /// Reads options from a JSON object.
    ///
    /// Recognized keys: `alpha`, `lighten`, `darken`, `saturate`,
    /// `desaturate` (numbers), `hue` (number of degrees, or a hex string to
    /// match), `format` (`"hex"` or anything else for CSS). Only a malformed
    /// `hue` hex string is an error.
    pub fn from_json(params: &Value) -> Result<Self, ColorError> {
        let hue = match params.get("hue") {
            Some(Value::String(hex)) => Some(HueShift::Match(HexColor::new(hex)?)),
            Some(v) => v.as_f64().map(HueShift::Rotate),
            None => None,
        };
        let format = match params.get("format").and_then(Value::as_str) {
            Some("hex") => Format::Hex,
            _ => Format::Css,
        };
        Ok(Self {
            alpha: param_f64(params, "alpha"),
            lighten: param_f64(params, "lighten"),
            darken: param_f64(params, "darken"),
            hue,
            saturate: param_f64(params, "saturate"),
            desaturate: param_f64(params, "desaturate"),
            format,
        })
    }
}

/// Extracts a finite `f64` from `params[name]`; `None` if missing or wrong type.
fn param_f64(params: &Value, name: &str) -> Option<f64> {
    params
        .get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}
