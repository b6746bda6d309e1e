//! Hex parsing and CSS color string formatting.
//!
//! Input is always a strict `#rrggbb` (the `#` is optional). Output comes in
//! four shapes: lowercase `#rrggbb`, `color(display-p3 R G B / A)`,
//! `rgba(R, G, B, A)`, and the raw channel lists used as CSS custom-property
//! values.

use crate::color::{p3_to_srgb, srgb_to_p3, DisplayP3, Srgb};
use crate::error::ColorError;

/// Parses a strict 6-digit hex color into 8-bit channels.
///
/// Accepts an optional leading `#` and either case. Shorthand (`#fff`),
/// alpha (`#rrggbbaa`), named colors and functional notation are rejected.
pub fn parse_hex(hex: &str) -> Result<(u8, u8, u8), ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::invalid_hex(hex, "contains non-hex characters"));
    }
    if digits.len() != 6 {
        return Err(ColorError::invalid_hex(
            hex,
            format!("expected 6 hex digits, got {}", digits.len()),
        ));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|e| ColorError::invalid_hex(hex, e.to_string()))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

/// Formats an sRGB color as lowercase `#rrggbb`, clamping each channel.
pub fn format_hex(c: Srgb) -> String {
    let (r, g, b) = c.to_rgb8();
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Converts a Display-P3 color to sRGB and formats it as `#rrggbb`.
///
/// P3 colors outside sRGB are clipped per channel, which can shift their
/// hue. Use [`crate::gamut::map_into_gamut`] for colors that may be out of
/// sRGB.
pub fn format_hex_from_p3(p3: DisplayP3) -> String {
    format_hex(p3_to_srgb(p3))
}

/// Parses a hex color and converts it to Display-P3.
pub fn hex_to_p3(hex: &str) -> Result<DisplayP3, ColorError> {
    Srgb::from_hex(hex).map(srgb_to_p3)
}

/// Normalizes a hex string to lowercase `#rrggbb`.
pub fn normalize_hex(hex: &str) -> Result<String, ColorError> {
    let (r, g, b) = parse_hex(hex)?;
    Ok(format!("#{r:02x}{g:02x}{b:02x}"))
}

/// Comma-separated 8-bit channels, e.g. `"124, 184, 214"`.
pub fn raw_rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("{r}, {g}, {b}")
}

/// Space-separated P3 channels with 4 decimals, e.g. `"0.5294 0.7176 0.8275"`.
pub fn raw_p3(p3: DisplayP3) -> String {
    let p3 = p3.clamp();
    // Clamping can leave -0.0, which would print as "-0.0000".
    let ch = |v: f64| v + 0.0;
    format!("{:.4} {:.4} {:.4}", ch(p3.r), ch(p3.g), ch(p3.b))
}

/// `color(display-p3 R G B / A)`.
pub fn css_p3(p3: DisplayP3, alpha: f64) -> String {
    format!("color(display-p3 {} / {})", raw_p3(p3), format_alpha(alpha))
}

/// `rgba(R, G, B, A)` with 8-bit channels.
pub fn css_rgba(rgb: (u8, u8, u8), alpha: f64) -> String {
    format!("rgba({}, {})", raw_rgb(rgb), format_alpha(alpha))
}

/// Formats alpha using the shortest decimal form (`1`, `0.5`), clamped to [0, 1].
pub fn format_alpha(alpha: f64) -> String {
    let alpha = if alpha.is_nan() {
        1.0
    } else {
        alpha.clamp(0.0, 1.0)
    };
    format!("{}", alpha + 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_with_and_without_hash() {
        assert_eq!(parse_hex("#7CB8D6").unwrap(), (0x7c, 0xb8, 0xd6));
        assert_eq!(parse_hex("7cb8d6").unwrap(), (0x7c, 0xb8, 0xd6));
    }

    #[test]
    fn parse_hex_rejects_other_formats() {
        for bad in [
            "#fff",
            "#ff00ff00",
            "",
            "#",
            "red",
            "rgb(1, 2, 3)",
            "#gggggg",
            "#+f+f+f",
            "##ffffff",
            " #ffffff",
        ] {
            assert!(
                matches!(parse_hex(bad), Err(ColorError::InvalidHex { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn parse_hex_rejects_multibyte_input_without_panicking() {
        assert!(parse_hex("aéabc").is_err());
        assert!(parse_hex("ééé").is_err());
    }

    #[test]
    fn parse_hex_error_names_the_input() {
        let err = parse_hex("#abc").unwrap_err();
        assert!(err.to_string().contains("#abc"), "got: {err}");
        assert!(err.to_string().contains("got 3"), "got: {err}");
    }

    #[test]
    fn format_hex_clamps_and_lowercases() {
        let c = Srgb {
            r: 1.5,
            g: -0.1,
            b: 0.5,
        };
        assert_eq!(format_hex(c), "#ff0080");
    }

    #[test]
    fn format_hex_is_always_seven_chars() {
        let c = Srgb {
            r: 0.0,
            g: 0.01,
            b: 0.02,
        };
        let hex = format_hex(c);
        assert_eq!(hex.len(), 7);
        assert_eq!(hex, "#000305");
    }

    #[test]
    fn hex_p3_hex_round_trip_exact_for_known_colors() {
        for hex in ["#7cb8d6", "#000000", "#ffffff", "#ff0000", "#c0ffee", "#123456"] {
            let p3 = hex_to_p3(hex).unwrap();
            assert_eq!(format_hex_from_p3(p3), hex);
        }
    }

    #[test]
    fn format_hex_from_p3_clips_wide_gamut_colors() {
        let p3_green = DisplayP3 {
            r: 0.0,
            g: 1.0,
            b: 0.0,
        };
        assert_eq!(format_hex_from_p3(p3_green), "#00ff00");
    }

    #[test]
    fn normalize_hex_lowercases_and_adds_hash() {
        assert_eq!(normalize_hex("7CB8D6").unwrap(), "#7cb8d6");
    }

    #[test]
    fn raw_p3_uses_four_decimals_and_no_negative_zero() {
        let p3 = DisplayP3 {
            r: -0.00001,
            g: 0.5,
            b: 1.2,
        };
        assert_eq!(raw_p3(p3), "0.0000 0.5000 1.0000");
    }

    #[test]
    fn css_p3_shape() {
        let p3 = DisplayP3 {
            r: 0.25,
            g: 0.5,
            b: 0.75,
        };
        assert_eq!(css_p3(p3, 1.0), "color(display-p3 0.2500 0.5000 0.7500 / 1)");
        assert_eq!(css_p3(p3, 0.5), "color(display-p3 0.2500 0.5000 0.7500 / 0.5)");
    }

    #[test]
    fn css_rgba_shape() {
        assert_eq!(css_rgba((124, 184, 214), 1.0), "rgba(124, 184, 214, 1)");
        assert_eq!(css_rgba((0, 0, 0), 0.25), "rgba(0, 0, 0, 0.25)");
    }

    #[test]
    fn format_alpha_clamps_and_defaults_nan() {
        assert_eq!(format_alpha(2.0), "1");
        assert_eq!(format_alpha(-1.0), "0");
        assert_eq!(format_alpha(f64::NAN), "1");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hex_p3_round_trip_within_one_step(
                r in any::<u8>(),
                g in any::<u8>(),
                b in any::<u8>(),
            ) {
                let hex = format!("#{r:02x}{g:02x}{b:02x}");
                let back = parse_hex(&format_hex_from_p3(hex_to_p3(&hex).unwrap())).unwrap();
                prop_assert!((back.0 as i16 - r as i16).abs() <= 1);
                prop_assert!((back.1 as i16 - g as i16).abs() <= 1);
                prop_assert!((back.2 as i16 - b as i16).abs() <= 1);
            }
        }
    }
}
