//! Gamut mapping from OKLCH into sRGB or Display-P3.
//!
//! Edited OKLCH colors (lightened, hue-shifted, saturated) frequently land
//! outside any displayable gamut. The mappers pull them back by
//! binary-searching chroma with lightness and hue held fixed, accepting a
//! candidate once it is either inside the target gamut or within one
//! just-noticeable difference of its clipped version.
//!
//! The search always runs against the gamut of the output: hex strings come
//! from an sRGB search, `color(display-p3 ...)` channels from a Display-P3
//! search. Neither result is clipped again afterwards.

use crate::codec::format_hex;
use crate::color::{
    component_to_linear, compose, linear_to_component, linear_to_oklab, multiply, oklab_to_lms,
    oklch_to_oklab, DisplayP3, LinearRgb, OkLab, OkLch, Srgb, LINEAR_P3_TO_XYZ,
    LINEAR_SRGB_TO_XYZ, LMS_TO_LINEAR_SRGB, XYZ_TO_LINEAR_P3, XYZ_TO_LINEAR_SRGB,
};
use std::sync::LazyLock;

/// Upper end of the OKLCH chroma range used to size the search tolerance.
pub const CHROMA_RANGE: f64 = 0.4;

/// Search stops once the chroma interval is narrower than this.
pub const CHROMA_EPSILON: f64 = CHROMA_RANGE / 4000.0;

/// Just-noticeable difference in OKLab distance.
pub const JND: f64 = 0.02;

/// Slack for float round-off when testing gamut containment.
const ROUNDING: f64 = 1e-9;

#[rustfmt::skip]
const IDENTITY: [[f64; 3]; 3] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

/// RGB gamut a color is mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gamut {
    Srgb,
    DisplayP3,
}

/// OKLab <-> gamma-encoded RGB converter for one gamut, with its matrix
/// chain collapsed.
///
/// OKLab goes to cubed LMS, then through `LMS -> linear sRGB [-> XYZ ->
/// linear P3]`, which is a single 3x3 product computed once per gamut.
#[derive(Debug)]
pub struct GamutConverter {
    gamut: Gamut,
    lms_to_linear: [[f64; 3]; 3],
    linear_to_linear_srgb: [[f64; 3]; 3],
}

static SRGB: LazyLock<GamutConverter> = LazyLock::new(|| GamutConverter::new(Gamut::Srgb));
static DISPLAY_P3: LazyLock<GamutConverter> =
    LazyLock::new(|| GamutConverter::new(Gamut::DisplayP3));

impl GamutConverter {
    fn new(gamut: Gamut) -> Self {
        match gamut {
            Gamut::Srgb => Self {
                gamut,
                lms_to_linear: LMS_TO_LINEAR_SRGB,
                linear_to_linear_srgb: IDENTITY,
            },
            Gamut::DisplayP3 => {
                let lms_to_xyz = compose(&LINEAR_SRGB_TO_XYZ, &LMS_TO_LINEAR_SRGB);
                Self {
                    gamut,
                    lms_to_linear: compose(&XYZ_TO_LINEAR_P3, &lms_to_xyz),
                    linear_to_linear_srgb: compose(&XYZ_TO_LINEAR_SRGB, &LINEAR_P3_TO_XYZ),
                }
            }
        }
    }

    /// Returns the process-wide converter for `gamut`, building it on first use.
    pub fn shared(gamut: Gamut) -> &'static GamutConverter {
        match gamut {
            Gamut::Srgb => &SRGB,
            Gamut::DisplayP3 => &DISPLAY_P3,
        }
    }

    pub fn gamut(&self) -> Gamut {
        self.gamut
    }

    /// Converts OKLab to gamma-encoded channels of the gamut, unclamped.
    pub fn oklab_to_rgb(&self, lab: OkLab) -> [f64; 3] {
        multiply(&self.lms_to_linear, oklab_to_lms(lab)).map(linear_to_component)
    }

    pub fn oklch_to_rgb(&self, lch: OkLch) -> [f64; 3] {
        self.oklab_to_rgb(oklch_to_oklab(lch))
    }

    /// Converts gamma-encoded channels of the gamut back to OKLab.
    pub fn rgb_to_oklab(&self, rgb: [f64; 3]) -> OkLab {
        let [r, g, b] = multiply(&self.linear_to_linear_srgb, rgb.map(component_to_linear));
        linear_to_oklab(LinearRgb { r, g, b })
    }
}

/// Replaces NaN/negative chroma and NaN hue so the search stays total.
fn sanitize(c: OkLch) -> OkLch {
    OkLch {
        l: if c.l.is_nan() { 0.0 } else { c.l },
        c: if c.c.is_nan() || c.c < 0.0 { 0.0 } else { c.c },
        h: if c.h.is_finite() { c.h } else { 0.0 },
    }
}

/// Euclidean OKLab distance (deltaEOK).
fn delta_e_ok(a: OkLab, b: OkLab) -> f64 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

fn in_unit(rgb: [f64; 3]) -> bool {
    rgb.iter()
        .all(|c| (-ROUNDING..=1.0 + ROUNDING).contains(c))
}

fn clamp_unit(rgb: [f64; 3]) -> [f64; 3] {
    rgb.map(|c| c.clamp(0.0, 1.0))
}

/// Maps an OKLCH color into `gamut`. Every returned channel is in [0, 1].
///
/// - `l <= 0` yields black and `l >= 1` yields white, skipping the search.
/// - Colors already in gamut are converted directly.
/// - Otherwise chroma is binary-searched in `[0, c]` until the interval is
///   narrower than [`CHROMA_EPSILON`].
pub fn map_into(color: OkLch, gamut: Gamut) -> [f64; 3] {
    let original = sanitize(color);
    if original.l <= 0.0 {
        return [0.0; 3];
    }
    if original.l >= 1.0 {
        return [1.0; 3];
    }

    let converter = GamutConverter::shared(gamut);
    let direct = converter.oklch_to_rgb(original);
    if in_unit(direct) {
        return clamp_unit(direct);
    }

    let mut candidate = original;
    let mut converted = direct;
    let mut start = 0.0;
    let mut end = original.c;
    let mut iterations = 0u32;

    while end - start > CHROMA_EPSILON {
        iterations += 1;
        candidate.c = (start + end) * 0.5;
        converted = converter.oklch_to_rgb(candidate);
        if in_unit(converted) {
            start = candidate.c;
            continue;
        }
        let clipped = converter.rgb_to_oklab(clamp_unit(converted));
        if delta_e_ok(oklch_to_oklab(candidate), clipped) <= JND {
            start = candidate.c;
        } else {
            end = candidate.c;
        }
    }

    tracing::trace!(
        ?gamut,
        l = original.l,
        c = original.c,
        h = original.h,
        mapped_c = candidate.c,
        iterations,
        "gamut search converged"
    );

    clamp_unit(converted)
}

/// Maps an OKLCH color into Display-P3.
pub fn map_into_gamut_p3(color: OkLch) -> DisplayP3 {
    let [r, g, b] = map_into(color, Gamut::DisplayP3);
    DisplayP3 { r, g, b }
}

/// Maps an OKLCH color into sRGB.
pub fn map_into_gamut_srgb(color: OkLch) -> Srgb {
    let [r, g, b] = map_into(color, Gamut::Srgb);
    Srgb { r, g, b }
}

/// Maps an OKLCH color into gamut and formats it as `#rrggbb`.
///
/// A hex string can only name sRGB colors, so the search runs against
/// sRGB and the hex is the search result itself.
pub fn map_into_gamut(color: OkLch) -> String {
    format_hex(map_into_gamut_srgb(color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{hex_to_p3, parse_hex};
    use crate::color::{oklch_to_p3, oklch_to_srgb, p3_to_oklch, p3_to_srgb, srgb_to_oklch};

    fn assert_in_unit(channels: [f64; 3]) {
        for ch in channels {
            assert!((0.0..=1.0).contains(&ch), "channel out of gamut: {ch}");
        }
    }

    fn hue_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn zero_lightness_is_black() {
        for (c, h) in [(0.0, 0.0), (0.3, 120.0), (5.0, 359.0)] {
            assert_eq!(map_into_gamut(OkLch { l: 0.0, c, h }), "#000000");
        }
        assert_eq!(
            map_into_gamut(OkLch {
                l: -0.5,
                c: 0.1,
                h: 10.0
            }),
            "#000000"
        );
    }

    #[test]
    fn full_lightness_is_white() {
        for (c, h) in [(0.0, 0.0), (0.3, 120.0)] {
            assert_eq!(map_into_gamut(OkLch { l: 1.0, c, h }), "#ffffff");
        }
        assert_eq!(
            map_into_gamut(OkLch {
                l: 2.0,
                c: 0.1,
                h: 10.0
            }),
            "#ffffff"
        );
        let p3 = map_into_gamut_p3(OkLch {
            l: 1.0,
            c: 0.3,
            h: 120.0,
        });
        assert_eq!((p3.r, p3.g, p3.b), (1.0, 1.0, 1.0));
    }

    #[test]
    fn nan_inputs_do_not_propagate() {
        let p3 = map_into_gamut_p3(OkLch {
            l: 0.5,
            c: f64::NAN,
            h: f64::NAN,
        });
        assert_in_unit([p3.r, p3.g, p3.b]);
        assert_eq!(
            map_into_gamut(OkLch {
                l: f64::NAN,
                c: 0.1,
                h: 0.0
            }),
            "#000000"
        );
    }

    #[test]
    fn in_gamut_color_is_returned_unchanged() {
        let original = OkLch {
            l: 0.6,
            c: 0.05,
            h: 220.0,
        };
        let mapped = map_into_gamut_p3(original);
        let direct = oklch_to_p3(original);
        assert!((mapped.r - direct.r).abs() < 1e-9);
        assert!((mapped.g - direct.g).abs() < 1e-9);
        assert!((mapped.b - direct.b).abs() < 1e-9);

        let mapped = map_into_gamut_srgb(original);
        let direct = oklch_to_srgb(original);
        assert!((mapped.r - direct.r).abs() < 1e-9);
        assert!((mapped.g - direct.g).abs() < 1e-9);
        assert!((mapped.b - direct.b).abs() < 1e-9);
    }

    #[test]
    fn hex_input_survives_mapping() {
        for hex in ["#7cb8d6", "#ff0000", "#00ff00", "#0000ff", "#808080"] {
            let lch = p3_to_oklch(hex_to_p3(hex).unwrap());
            assert_eq!(map_into_gamut(lch), hex);
        }
    }

    #[test]
    fn shared_converters_match_step_by_step_chains() {
        let lch = OkLch {
            l: 0.7,
            c: 0.25,
            h: 40.0,
        };
        let fast = GamutConverter::shared(Gamut::DisplayP3).oklch_to_rgb(lch);
        let slow = oklch_to_p3(lch);
        for (f, s) in fast.iter().zip([slow.r, slow.g, slow.b]) {
            assert!((f - s).abs() < 1e-9, "{f} vs {s}");
        }

        let back = GamutConverter::shared(Gamut::DisplayP3).rgb_to_oklab(fast);
        let expected = oklch_to_oklab(lch);
        assert!((back.l - expected.l).abs() < 1e-6);
        assert!((back.a - expected.a).abs() < 1e-6);
        assert!((back.b - expected.b).abs() < 1e-6);

        let lch = OkLch {
            l: 0.6,
            c: 0.05,
            h: 220.0,
        };
        let fast = GamutConverter::shared(Gamut::Srgb).oklch_to_rgb(lch);
        let slow = oklch_to_srgb(lch);
        for (f, s) in fast.iter().zip([slow.r, slow.g, slow.b]) {
            assert!((f - s).abs() < 1e-9, "{f} vs {s}");
        }
    }

    #[test]
    fn shared_converter_is_a_single_instance_per_gamut() {
        let a = GamutConverter::shared(Gamut::DisplayP3) as *const GamutConverter;
        let b = GamutConverter::shared(Gamut::DisplayP3) as *const GamutConverter;
        assert_eq!(a, b);
        assert_eq!(GamutConverter::shared(Gamut::Srgb).gamut(), Gamut::Srgb);
        assert_eq!(
            GamutConverter::shared(Gamut::DisplayP3).gamut(),
            Gamut::DisplayP3
        );
    }

    #[test]
    fn out_of_gamut_chroma_is_reduced_and_hue_kept() {
        let wild = OkLch {
            l: 0.7,
            c: 0.4,
            h: 150.0,
        };
        let mapped = map_into_gamut_p3(wild);
        assert_in_unit([mapped.r, mapped.g, mapped.b]);
        let back = p3_to_oklch(mapped);
        assert!(back.c < wild.c, "chroma not reduced: {}", back.c);
        assert!((back.l - wild.l).abs() < 0.05, "lightness drifted: {}", back.l);
        assert!(hue_distance(back.h, wild.h) < 5.0, "hue drifted: {}", back.h);
    }

    #[test]
    fn p3_result_keeps_wide_gamut_chroma() {
        // Saturated red: the P3 search ends past the sRGB boundary.
        let red = OkLch {
            l: 0.63,
            c: 0.4,
            h: 29.0,
        };
        let p3 = map_into_gamut_p3(red);
        assert!(!p3_to_srgb(p3).in_gamut(), "P3 result collapsed to sRGB");
        let srgb = map_into_gamut_srgb(red);
        assert!(p3_to_oklch(p3).c > srgb_to_oklch(srgb).c);
    }

    #[test]
    fn hex_is_the_srgb_search_result_without_extra_clipping() {
        for (l, h) in [(0.35, 225.0), (0.5, 300.0), (0.6, 150.0), (0.7, 30.0), (0.8, 100.0)] {
            let color = OkLch { l, c: 0.37, h };
            let searched = map_into_gamut_srgb(color);
            let hex = map_into_gamut(color);
            assert_eq!(hex, format_hex(searched));

            let searched_hue = srgb_to_oklch(searched).h;
            let hex_hue = srgb_to_oklch(Srgb::from_rgb8(parse_hex(&hex).unwrap())).h;
            assert!(
                hue_distance(searched_hue, hex_hue) < 3.0,
                "l={l} h={h}: searched {searched_hue}, hex {hex_hue}"
            );
        }
    }

    #[test]
    fn mapping_is_deterministic() {
        let c = OkLch {
            l: 0.55,
            c: 0.37,
            h: 300.0,
        };
        assert_eq!(map_into_gamut_p3(c), map_into_gamut_p3(c));
        assert_eq!(map_into_gamut(c), map_into_gamut(c));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mapped_color_is_always_in_gamut(
                l in 0.001_f64..0.999,
                c in 0.0_f64..=0.6,
                h in 0.0_f64..360.0,
            ) {
                for gamut in [Gamut::Srgb, Gamut::DisplayP3] {
                    for ch in map_into(OkLch { l, c, h }, gamut) {
                        prop_assert!(
                            (0.0..=1.0).contains(&ch),
                            "{gamut:?} channel {ch} for l={l} c={c} h={h}"
                        );
                    }
                }
            }

            #[test]
            fn mapped_chroma_never_exceeds_input(
                l in 0.05_f64..0.95,
                c in 0.0_f64..=0.5,
                h in 0.0_f64..360.0,
            ) {
                let mapped = p3_to_oklch(map_into_gamut_p3(OkLch { l, c, h }));
                prop_assert!(mapped.c <= c + 0.03, "mapped c {} > input c {c}", mapped.c);
                let mapped = srgb_to_oklch(map_into_gamut_srgb(OkLch { l, c, h }));
                prop_assert!(mapped.c <= c + 0.03, "mapped c {} > input c {c}", mapped.c);
            }
        }
    }
}
