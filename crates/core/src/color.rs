//! Color types and conversion functions.
//!
//! Provides the color records the pipeline moves between (`Srgb`,
//! `LinearRgb`, `DisplayP3`, `LinearP3`, `Xyz`, `OkLab`, `OkLch`) and pure
//! conversion functions between them. Uses `f64` throughout for precision.
//!
//! Conversions are "blind": they never clamp, so RGB/P3 components may fall
//! outside [0, 1] until a caller clamps or gamut-maps them. Only
//! [`oklch_to_srgb`] clamps its output.

use crate::error::ColorError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"`. The hex round-trip has 8-bit
/// quantization (1/255 precision loss).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Linear sRGB color (gamma-decoded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearRgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Display-P3 color with components nominally in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayP3 {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Linear Display-P3 color (gamma-decoded).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearP3 {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// CIE XYZ tristimulus values, D65 white point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// OKLab perceptual color space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OkLab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// OKLCh (cylindrical form of OKLab). `h` is in degrees, [0, 360).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OkLch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl Srgb {
    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    ///
    /// Returns `ColorError::InvalidHex` if the input is not a valid 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Srgb, ColorError> {
        crate::codec::parse_hex(hex).map(Srgb::from_rgb8)
    }

    /// Builds a color from 8-bit channels.
    pub fn from_rgb8((r, g, b): (u8, u8, u8)) -> Srgb {
        Srgb {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Quantizes to 8-bit channels, clamping out-of-range components.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        (
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
        )
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        crate::codec::format_hex(self)
    }

    /// True if every component lies in [0, 1].
    pub fn in_gamut(self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl DisplayP3 {
    /// True if every component lies in [0, 1].
    pub fn in_gamut(self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    /// Clips every component into [0, 1].
    pub fn clamp(self) -> DisplayP3 {
        DisplayP3 {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }
}

fn channel_to_u8(c: f64) -> u8 {
    // NaN clamps to NaN and casts to 0.
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Multiplies a 3x3 matrix with a 3-element vector.
#[inline]
pub(crate) fn multiply(matrix: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    let [r0, r1, r2] = matrix;
    [
        r0[0] * v[0] + r0[1] * v[1] + r0[2] * v[2],
        r1[0] * v[0] + r1[1] * v[1] + r1[2] * v[2],
        r2[0] * v[0] + r2[1] * v[1] + r2[2] * v[2],
    ]
}

/// Multiplies two 3x3 matrices.
pub(crate) fn compose(lhs: &[[f64; 3]; 3], rhs: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| lhs[i][k] * rhs[k][j]).sum();
        }
    }
    out
}

#[rustfmt::skip]
pub(crate) const LINEAR_SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [ 0.41239079926595934, 0.357584339383878,   0.1804807884018343  ],
    [ 0.21263900587151027, 0.715168678767756,   0.07219231536073371 ],
    [ 0.01933081871559182, 0.11919477979462598, 0.9505321522496607  ],
];

#[rustfmt::skip]
pub(crate) const XYZ_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
    [  3.2409699419045226, -1.537383177570094,  -0.4986107602930034  ],
    [ -0.9692436362808796,  1.8759675015077202,  0.04155505740717559 ],
    [  0.05563007969699366, -0.20397695888897652, 1.0569715142428786 ],
];

#[rustfmt::skip]
pub(crate) const LINEAR_P3_TO_XYZ: [[f64; 3]; 3] = [
    [ 0.4865709486482162, 0.26566769316909306, 0.1982172852343625 ],
    [ 0.2289745640697488, 0.6917385218365064,  0.079286914093745  ],
    [ 0.0000000000000000, 0.04511338185890264, 1.043944368900976  ],
];

#[rustfmt::skip]
pub(crate) const XYZ_TO_LINEAR_P3: [[f64; 3]; 3] = [
    [  2.493496911941425,  -0.9313836179191239, -0.40271078445071684  ],
    [ -0.8294889695615747,  1.7626640603183463,  0.023624685841943577 ],
    [  0.03584583024378447, -0.07617238926804182, 0.9568845240076872  ],
];

/// Cubed LMS to linear sRGB, the second stage of the inverse OKLab transform.
#[rustfmt::skip]
pub(crate) const LMS_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
    [  4.0767416621, -3.3077115913,  0.2309699292 ],
    [ -1.2684380046,  2.6097574011, -0.3413193965 ],
    [ -0.0041960863, -0.7034186147,  1.7076147010 ],
];

/// Applies inverse sRGB gamma to a single component.
///
/// Mirrored around zero so out-of-range values stay total.
pub(crate) fn component_to_linear(c: f64) -> f64 {
    let magnitude = c.abs();
    if magnitude <= 0.04045 {
        c / 12.92
    } else {
        ((magnitude + 0.055) / 1.055).powf(2.4).copysign(c)
    }
}

/// Applies sRGB gamma to a single linear component.
pub(crate) fn linear_to_component(c: f64) -> f64 {
    let magnitude = c.abs();
    if magnitude <= 0.0031308 {
        c * 12.92
    } else {
        (1.055 * magnitude.powf(1.0 / 2.4) - 0.055).copysign(c)
    }
}

/// Converts sRGB to linear RGB by applying inverse sRGB gamma.
pub fn srgb_to_linear(c: Srgb) -> LinearRgb {
    LinearRgb {
        r: component_to_linear(c.r),
        g: component_to_linear(c.g),
        b: component_to_linear(c.b),
    }
}

/// Converts linear RGB to sRGB by applying sRGB gamma.
pub fn linear_to_srgb(c: LinearRgb) -> Srgb {
    Srgb {
        r: linear_to_component(c.r),
        g: linear_to_component(c.g),
        b: linear_to_component(c.b),
    }
}

/// Converts Display-P3 to linear P3. P3 shares the sRGB transfer curve.
pub fn p3_to_linear(c: DisplayP3) -> LinearP3 {
    LinearP3 {
        r: component_to_linear(c.r),
        g: component_to_linear(c.g),
        b: component_to_linear(c.b),
    }
}

/// Converts linear P3 to Display-P3.
pub fn linear_to_p3(c: LinearP3) -> DisplayP3 {
    DisplayP3 {
        r: linear_to_component(c.r),
        g: linear_to_component(c.g),
        b: linear_to_component(c.b),
    }
}

pub fn linear_srgb_to_xyz(c: LinearRgb) -> Xyz {
    let [x, y, z] = multiply(&LINEAR_SRGB_TO_XYZ, [c.r, c.g, c.b]);
    Xyz { x, y, z }
}

pub fn xyz_to_linear_srgb(c: Xyz) -> LinearRgb {
    let [r, g, b] = multiply(&XYZ_TO_LINEAR_SRGB, [c.x, c.y, c.z]);
    LinearRgb { r, g, b }
}

pub fn linear_p3_to_xyz(c: LinearP3) -> Xyz {
    let [x, y, z] = multiply(&LINEAR_P3_TO_XYZ, [c.r, c.g, c.b]);
    Xyz { x, y, z }
}

pub fn xyz_to_linear_p3(c: Xyz) -> LinearP3 {
    let [r, g, b] = multiply(&XYZ_TO_LINEAR_P3, [c.x, c.y, c.z]);
    LinearP3 { r, g, b }
}

/// Converts linear RGB to OKLab via the OKLab matrix transform.
pub fn linear_to_oklab(c: LinearRgb) -> OkLab {
    let l_ = 0.4122214708 * c.r + 0.5363325363 * c.g + 0.0514459929 * c.b;
    let m_ = 0.2119034982 * c.r + 0.6806995451 * c.g + 0.1073969566 * c.b;
    let s_ = 0.0883024619 * c.r + 0.2817188376 * c.g + 0.6299787005 * c.b;

    let l_c = l_.cbrt();
    let m_c = m_.cbrt();
    let s_c = s_.cbrt();

    OkLab {
        l: 0.2104542553 * l_c + 0.7936177850 * m_c - 0.0040720468 * s_c,
        a: 1.9779984951 * l_c - 2.4285922050 * m_c + 0.4505937099 * s_c,
        b: 0.0259040371 * l_c + 0.7827717662 * m_c - 0.8086757660 * s_c,
    }
}

/// Maps OKLab to the cubed LMS cone response (first stage of the inverse transform).
pub(crate) fn oklab_to_lms(c: OkLab) -> [f64; 3] {
    let l_ = c.l + 0.3963377774 * c.a + 0.2158037573 * c.b;
    let m_ = c.l - 0.1055613458 * c.a - 0.0638541728 * c.b;
    let s_ = c.l - 0.0894841775 * c.a - 1.2914855480 * c.b;
    [l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_]
}

/// Converts OKLab to linear RGB via the inverse OKLab matrix transform.
pub fn oklab_to_linear(c: OkLab) -> LinearRgb {
    let [r, g, b] = multiply(&LMS_TO_LINEAR_SRGB, oklab_to_lms(c));
    LinearRgb { r, g, b }
}

/// Converts OKLab to OKLCh (cylindrical form).
///
/// NaN guard: if chroma is less than 1e-10, hue is set to 0.0 to avoid
/// indeterminate `atan2(0, 0)` results.
pub fn oklab_to_oklch(c: OkLab) -> OkLch {
    let ch = (c.a * c.a + c.b * c.b).sqrt();
    let h = if ch < 1e-10 {
        0.0
    } else {
        normalize_hue(c.b.atan2(c.a).to_degrees())
    };
    OkLch { l: c.l, c: ch, h }
}

/// Converts OKLCh to OKLab.
pub fn oklch_to_oklab(c: OkLch) -> OkLab {
    let h_rad = c.h.to_radians();
    OkLab {
        l: c.l,
        a: c.c * h_rad.cos(),
        b: c.c * h_rad.sin(),
    }
}

/// Normalizes a hue angle to [0, 360). Negative angles wrap around.
pub fn normalize_hue(h: f64) -> f64 {
    let h = h.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// sRGB to OKLCh via sRGB -> linear -> OKLab -> OKLCh.
pub fn srgb_to_oklch(c: Srgb) -> OkLch {
    oklab_to_oklch(linear_to_oklab(srgb_to_linear(c)))
}

/// OKLCh to sRGB via OKLCh -> OKLab -> linear -> sRGB, with output clamped
/// to [0, 1].
pub fn oklch_to_srgb(c: OkLch) -> Srgb {
    let srgb = linear_to_srgb(oklab_to_linear(oklch_to_oklab(c)));
    Srgb {
        r: srgb.r.clamp(0.0, 1.0),
        g: srgb.g.clamp(0.0, 1.0),
        b: srgb.b.clamp(0.0, 1.0),
    }
}

/// sRGB to Display-P3 through XYZ. sRGB is a subset of P3, so the result is
/// in gamut up to float error.
pub fn srgb_to_p3(c: Srgb) -> DisplayP3 {
    linear_to_p3(xyz_to_linear_p3(linear_srgb_to_xyz(srgb_to_linear(c))))
}

/// Display-P3 to sRGB through XYZ. Unclamped: saturated P3 colors land
/// outside [0, 1].
pub fn p3_to_srgb(c: DisplayP3) -> Srgb {
    linear_to_srgb(xyz_to_linear_srgb(linear_p3_to_xyz(p3_to_linear(c))))
}

pub fn p3_to_oklch(c: DisplayP3) -> OkLch {
    let linear = xyz_to_linear_srgb(linear_p3_to_xyz(p3_to_linear(c)));
    oklab_to_oklch(linear_to_oklab(linear))
}

/// OKLCh to Display-P3, unclamped.
pub fn oklch_to_p3(c: OkLch) -> DisplayP3 {
    let linear = oklab_to_linear(oklch_to_oklab(c));
    linear_to_p3(xyz_to_linear_p3(linear_srgb_to_xyz(linear)))
}
