//! Color builders: theme constants that render to CSS color strings.
//!
//! A builder wraps a base color and renders it on demand with optional
//! OKLCH edits and alpha. There are three kinds:
//!
//! - [`HexColor`]: a literal `#rrggbb` color.
//! - [`VarColor`]: a CSS custom property with light/dark fallback values.
//! - [`GradientColor`]: a `linear-gradient(...)` over other builders.
//!
//! Builders are immutable. [`VarColor::override_values`] returns a new
//! builder that keeps the variable name, so call sites referencing the
//! original keep working when a theme is tinted.

use crate::codec::{css_p3, css_rgba, format_alpha, parse_hex, raw_p3, raw_rgb};
use crate::color::{normalize_hue, srgb_to_oklch, srgb_to_p3, DisplayP3, OkLch, Srgb};
use crate::error::ColorError;
use crate::gamut::{map_into_gamut_p3, map_into_gamut_srgb};
use crate::options::{ColorOptions, Format, HueShift};
use crate::support::ColorSupport;
use std::borrow::Cow;

/// A builder over a literal hex color.
///
/// Keeps the normalized hex string plus the precomputed raw RGB
/// (`"r, g, b"`) and raw P3 (`"r g b"`) channel strings.
#[derive(Debug, Clone, PartialEq)]
pub struct HexColor {
    hex: String,
    rgb8: (u8, u8, u8),
    rgb: String,
    p3: DisplayP3,
    p3_raw: String,
}

impl HexColor {
    /// Parses a strict 6-digit hex color.
    pub fn new(hex: &str) -> Result<Self, ColorError> {
        Ok(Self::from_rgb8(parse_hex(hex)?))
    }

    /// Builds from 8-bit channels. Infallible.
    pub fn from_rgb8(rgb8: (u8, u8, u8)) -> Self {
        Self::with_p3(rgb8, srgb_to_p3(Srgb::from_rgb8(rgb8)).clamp())
    }

    /// Pairs an sRGB hex with separately mapped P3 channels, which may lie
    /// outside sRGB.
    fn with_p3(rgb8: (u8, u8, u8), p3: DisplayP3) -> Self {
        let (r, g, b) = rgb8;
        Self {
            hex: format!("#{r:02x}{g:02x}{b:02x}"),
            rgb8,
            rgb: raw_rgb(rgb8),
            p3,
            p3_raw: raw_p3(p3),
        }
    }

    /// Lowercase `#rrggbb`.
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Raw RGB channels, `"r, g, b"`, for use inside `rgba(...)`.
    pub fn rgb(&self) -> &str {
        &self.rgb
    }

    pub fn rgb8(&self) -> (u8, u8, u8) {
        self.rgb8
    }

    pub fn p3(&self) -> DisplayP3 {
        self.p3
    }

    /// Raw P3 channels, `"r g b"`, for use inside `color(display-p3 ...)`.
    pub fn p3_raw(&self) -> &str {
        &self.p3_raw
    }

    pub fn oklch(&self) -> OkLch {
        srgb_to_oklch(Srgb::from_rgb8(self.rgb8))
    }

    /// Applies the OKLCH edits in `options`, before any gamut mapping.
    ///
    /// Order: lighten, darken, hue, saturate, desaturate.
    pub fn adjust(&self, options: &ColorOptions) -> OkLch {
        let mut lch = self.oklch();
        if let Some(lighten) = options.lighten {
            lch.l *= 1.0 + lighten;
        }
        if let Some(darken) = options.darken {
            lch.l *= 1.0 - darken;
        }
        match &options.hue {
            Some(HueShift::Rotate(delta)) => lch.h = normalize_hue(lch.h + delta),
            Some(HueShift::Match(other)) => lch.h = other.oklch().h,
            None => {}
        }
        if let Some(saturate) = options.saturate {
            lch.c *= 1.0 + saturate;
        }
        if let Some(desaturate) = options.desaturate {
            lch.c *= 1.0 - desaturate;
        }
        lch
    }

    /// Returns the edited color, gamut-mapped back into displayable form.
    ///
    /// The hex comes from a search into sRGB and the P3 channels from a
    /// search into Display-P3, so P3 output keeps chroma that sRGB cannot
    /// show. Without edits this is the color itself.
    pub fn transformed(&self, options: &ColorOptions) -> Cow<'_, HexColor> {
        if !options.has_transform() {
            return Cow::Borrowed(self);
        }
        let lch = self.adjust(options);
        let rgb8 = map_into_gamut_srgb(lch).to_rgb8();
        Cow::Owned(HexColor::with_p3(rgb8, map_into_gamut_p3(lch)))
    }

    pub fn render(&self, options: &ColorOptions, support: ColorSupport) -> String {
        let color = self.transformed(options);
        match options.format {
            Format::Hex => color.hex.clone(),
            Format::Css => {
                let alpha = options.alpha_or_default();
                match support {
                    ColorSupport::DisplayP3 => css_p3(color.p3, alpha),
                    ColorSupport::Rgb => css_rgba(color.rgb8, alpha),
                }
            }
        }
    }
}

/// A light or dark value of a CSS variable.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    /// Emitted verbatim as the variable's value.
    Literal(String),
    /// Emitted as the builder's raw channels, or its full CSS color for
    /// static variables.
    Color(Box<ColorBuilder>),
}

impl VarValue {
    /// Whether the value is a channel list (or a reference to one) that
    /// composes inside `color(display-p3 var(--x) / a)` and `rgba(var(--x), a)`.
    fn is_channels(&self) -> bool {
        match self {
            VarValue::Literal(_) => true,
            VarValue::Color(builder) => match &**builder {
                ColorBuilder::Hex(_) => true,
                ColorBuilder::Var(var) => !var.is_static,
                ColorBuilder::Gradient(_) => false,
            },
        }
    }

    /// The value written into the variable declaration.
    pub fn css_value(&self, support: ColorSupport, is_static: bool) -> String {
        match self {
            VarValue::Literal(s) => s.clone(),
            VarValue::Color(builder) if is_static => {
                builder.render(&ColorOptions::default(), support)
            }
            VarValue::Color(builder) => match &**builder {
                ColorBuilder::Hex(hex) => match support {
                    ColorSupport::DisplayP3 => hex.p3_raw.clone(),
                    ColorSupport::Rgb => hex.rgb.clone(),
                },
                ColorBuilder::Var(var) => var.reference(),
                ColorBuilder::Gradient(_) => builder.render(&ColorOptions::default(), support),
            },
        }
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::Literal(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::Literal(s)
    }
}

impl From<HexColor> for VarValue {
    fn from(hex: HexColor) -> Self {
        VarValue::Color(Box::new(ColorBuilder::Hex(hex)))
    }
}

impl From<ColorBuilder> for VarValue {
    fn from(builder: ColorBuilder) -> Self {
        VarValue::Color(Box::new(builder))
    }
}

/// A builder over a CSS custom property.
#[derive(Debug, Clone, PartialEq)]
pub struct VarColor {
    name: String,
    light: VarValue,
    dark: Option<VarValue>,
    is_static: bool,
}

fn var_name(name: &str) -> String {
    if name.starts_with("--") {
        name.to_string()
    } else {
        format!("--{name}")
    }
}

impl VarColor {
    /// Creates a variable builder. `name` may be given with or without the
    /// leading `--`.
    ///
    /// Values must be channel lists: literals, hex colors or non-static
    /// variables. Gradients and static variables are rejected with
    /// [`ColorError::InvalidTheme`]; declare those with [`VarColor::new_static`].
    pub fn new(
        name: &str,
        light: impl Into<VarValue>,
        dark: Option<VarValue>,
    ) -> Result<Self, ColorError> {
        let color = Self {
            name: var_name(name),
            light: light.into(),
            dark,
            is_static: false,
        };
        color.check_values()?;
        Ok(color)
    }

    /// Creates a static variable: it renders as a bare `var(--x)` and its
    /// declared values are full CSS colors, so any value is accepted.
    pub fn new_static(name: &str, light: impl Into<VarValue>, dark: Option<VarValue>) -> Self {
        Self {
            name: var_name(name),
            light: light.into(),
            dark,
            is_static: true,
        }
    }

    fn check_values(&self) -> Result<(), ColorError> {
        if self.is_static {
            return Ok(());
        }
        let mut values = std::iter::once(&self.light).chain(self.dark.as_ref());
        if values.all(VarValue::is_channels) {
            Ok(())
        } else {
            Err(ColorError::InvalidTheme(format!(
                "variable {} holds a gradient or static variable; mark it static",
                self.name
            )))
        }
    }

    /// Variable name including the leading `--`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn light(&self) -> &VarValue {
        &self.light
    }

    pub fn dark(&self) -> Option<&VarValue> {
        self.dark.as_ref()
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// `var(--x)`.
    pub fn reference(&self) -> String {
        format!("var({})", self.name)
    }

    /// Returns a new builder with the same variable name and substituted
    /// values, checked the same way as [`VarColor::new`].
    pub fn override_values(
        &self,
        light: impl Into<VarValue>,
        dark: Option<VarValue>,
    ) -> Result<Self, ColorError> {
        let color = Self {
            name: self.name.clone(),
            light: light.into(),
            dark,
            is_static: self.is_static,
        };
        color.check_values()?;
        Ok(color)
    }

    pub fn render(&self, options: &ColorOptions, support: ColorSupport) -> String {
        if options.has_transform() || options.format == Format::Hex {
            tracing::debug!(
                var = %self.name,
                "color edits and hex format do not apply to CSS variables; ignoring"
            );
        }
        if self.is_static {
            return self.reference();
        }
        let alpha = format_alpha(options.alpha_or_default());
        match support {
            ColorSupport::DisplayP3 => format!("color(display-p3 {} / {alpha})", self.reference()),
            ColorSupport::Rgb => format!("rgba({}, {alpha})", self.reference()),
        }
    }
}

/// A `linear-gradient(...)` over color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientColor {
    direction: String,
    stops: Vec<ColorBuilder>,
}

impl GradientColor {
    /// Requires at least one stop.
    pub fn new(direction: &str, stops: Vec<ColorBuilder>) -> Result<Self, ColorError> {
        if stops.is_empty() {
            return Err(ColorError::EmptyGradient);
        }
        Ok(Self {
            direction: direction.to_string(),
            stops,
        })
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }

    pub fn stops(&self) -> &[ColorBuilder] {
        &self.stops
    }

    /// Renders each stop with the same options and joins them.
    pub fn render(&self, options: &ColorOptions, support: ColorSupport) -> String {
        let stops: Vec<String> = self
            .stops
            .iter()
            .map(|stop| stop.render(options, support))
            .collect();
        format!("linear-gradient({}, {})", self.direction, stops.join(", "))
    }
}

/// Any color builder.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorBuilder {
    Hex(HexColor),
    Var(VarColor),
    Gradient(GradientColor),
}

impl ColorBuilder {
    /// `"hex"`, `"var"` or `"gradient"`.
    pub fn kind(&self) -> &'static str {
        match self {
            ColorBuilder::Hex(_) => "hex",
            ColorBuilder::Var(_) => "var",
            ColorBuilder::Gradient(_) => "gradient",
        }
    }

    pub fn render(&self, options: &ColorOptions, support: ColorSupport) -> String {
        match self {
            ColorBuilder::Hex(b) => b.render(options, support),
            ColorBuilder::Var(b) => b.render(options, support),
            ColorBuilder::Gradient(b) => b.render(options, support),
        }
    }

    pub fn as_hex(&self) -> Option<&HexColor> {
        match self {
            ColorBuilder::Hex(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&VarColor> {
        match self {
            ColorBuilder::Var(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_gradient(&self) -> Option<&GradientColor> {
        match self {
            ColorBuilder::Gradient(b) => Some(b),
            _ => None,
        }
    }
}

impl From<HexColor> for ColorBuilder {
    fn from(b: HexColor) -> Self {
        ColorBuilder::Hex(b)
    }
}

impl From<VarColor> for ColorBuilder {
    fn from(b: VarColor) -> Self {
        ColorBuilder::Var(b)
    }
}

impl From<GradientColor> for ColorBuilder {
    fn from(b: GradientColor) -> Self {
        ColorBuilder::Gradient(b)
    }
}

/// Creates a hex builder.
pub fn hex_color(hex: &str) -> Result<ColorBuilder, ColorError> {
    HexColor::new(hex).map(ColorBuilder::Hex)
}

/// Creates a CSS variable builder with light and optional dark values.
pub fn var_color(
    name: &str,
    light: impl Into<VarValue>,
    dark: Option<VarValue>,
) -> Result<ColorBuilder, ColorError> {
    VarColor::new(name, light, dark).map(ColorBuilder::Var)
}

/// Creates a static CSS variable builder, rendered as a bare `var(--x)`.
pub fn static_var_color(
    name: &str,
    light: impl Into<VarValue>,
    dark: Option<VarValue>,
) -> ColorBuilder {
    ColorBuilder::Var(VarColor::new_static(name, light, dark))
}

/// Creates a linear-gradient builder over at least one stop.
pub fn gradient(direction: &str, stops: Vec<ColorBuilder>) -> Result<ColorBuilder, ColorError> {
    GradientColor::new(direction, stops).map(ColorBuilder::Gradient)
}

/// One-shot: parse `hex`, apply `options`, render.
pub fn build_hex_color(
    hex: &str,
    options: &ColorOptions,
    support: ColorSupport,
) -> Result<String, ColorError> {
    Ok(HexColor::new(hex)?.render(options, support))
}
