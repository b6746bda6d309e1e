#![deny(unsafe_code)]
//! OKLCH color pipeline for the Crosswing design system.
//!
//! Provides color records and pure conversions between sRGB, Display-P3,
//! CIE XYZ, OKLab and OKLCh (`color`), strict hex parsing and CSS formatting
//! (`codec`), chroma-reducing gamut mapping into sRGB or Display-P3 (`gamut`),
//! Display-P3 capability detection (`support`), and the builder API that
//! renders theme colors as CSS strings (`builder`, `options`, `theme`).

pub mod builder;
pub mod codec;
pub mod color;
pub mod error;
pub mod gamut;
pub mod options;
pub mod support;
pub mod theme;

pub use builder::{
    build_hex_color, gradient, hex_color, static_var_color, var_color, ColorBuilder,
    GradientColor, HexColor, VarColor, VarValue,
};
pub use codec::{format_hex, format_hex_from_p3, hex_to_p3, parse_hex};
pub use color::{DisplayP3, LinearP3, LinearRgb, OkLab, OkLch, Srgb, Xyz};
pub use error::ColorError;
pub use gamut::{map_into, map_into_gamut, map_into_gamut_p3, map_into_gamut_srgb, Gamut};
pub use options::{ColorOptions, Format, HueShift};
pub use support::{ColorSupport, ProbeConfig};
pub use theme::{builder_var_css, Theme};
