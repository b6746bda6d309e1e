#![deny(unsafe_code)]
//! CLI binary for the Crosswing color pipeline.
//!
//! Subcommands:
//! - `convert <hex>`: show a color in sRGB, Display-P3, OKLab and OKLCH
//! - `color <hex>`: render a hex builder with transform options
//! - `gamut <l> <c> <h>`: map an OKLCH color into gamut and print its sRGB hex
//! - `theme [file]`: emit CSS variable declarations for a theme

mod error;

use clap::{Parser, Subcommand};
use crosswing_color::color::{linear_to_oklab, srgb_to_linear, srgb_to_oklch, srgb_to_p3};
use crosswing_color::{
    build_hex_color, map_into_gamut, map_into_gamut_p3, ColorOptions, ColorSupport, Format,
    HexColor, HueShift, OkLch, ProbeConfig, Srgb, Theme,
};
use error::CliError;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crosswing-color", about = "Crosswing OKLCH color pipeline CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Render for a display without Display-P3 support.
    #[arg(long, global = true)]
    rgb: bool,

    /// Resolve color support from this User-Agent string.
    #[arg(long, global = true, value_name = "UA")]
    user_agent: Option<String>,

    /// Probe thresholds as a JSON file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a hex color in every supported color space.
    Convert {
        /// Six-digit hex color, `#` optional.
        hex: String,
    },
    /// Render a hex color with transform options.
    Color {
        /// Six-digit hex color, `#` optional.
        hex: String,

        /// Alpha channel in [0, 1].
        #[arg(long)]
        alpha: Option<f64>,

        /// Relative lightness increase (0.1 = 10% lighter).
        #[arg(long)]
        lighten: Option<f64>,

        /// Relative lightness decrease.
        #[arg(long)]
        darken: Option<f64>,

        /// Hue rotation in degrees, or a hex color whose hue is copied.
        #[arg(long, allow_hyphen_values = true)]
        hue: Option<String>,

        /// Relative chroma increase.
        #[arg(long)]
        saturate: Option<f64>,

        /// Relative chroma decrease.
        #[arg(long)]
        desaturate: Option<f64>,

        /// Print the transformed hex instead of a CSS color.
        #[arg(long = "hex")]
        hex_output: bool,

        /// Options as a JSON object; replaces the individual flags.
        #[arg(long, conflicts_with_all = ["alpha", "lighten", "darken", "hue", "saturate", "desaturate", "hex_output"])]
        options: Option<String>,
    },
    /// Map an OKLCH color into gamut and print its sRGB hex.
    Gamut {
        /// Lightness in [0, 1].
        l: f64,
        /// Chroma.
        c: f64,
        /// Hue in degrees.
        h: f64,
    },
    /// Emit CSS variable declarations for a theme.
    Theme {
        /// Theme JSON file; the built-in theme when omitted.
        file: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))
}

fn load_probe_config(path: Option<&Path>) -> Result<ProbeConfig, CliError> {
    match path {
        None => Ok(ProbeConfig::default()),
        Some(path) => {
            let text = read_file(path)?;
            serde_json::from_str(&text)
                .map_err(|e| CliError::Input(format!("invalid --config JSON: {e}")))
        }
    }
}

fn resolve_support(
    rgb: bool,
    user_agent: Option<&str>,
    config: &ProbeConfig,
) -> ColorSupport {
    if rgb {
        return ColorSupport::Rgb;
    }
    match user_agent {
        Some(ua) => ColorSupport::detect(true, ua, config),
        None => ColorSupport::DisplayP3,
    }
}

fn load_theme(path: Option<&Path>) -> Result<Cow<'static, Theme>, CliError> {
    match path {
        None => Ok(Cow::Borrowed(Theme::builtin())),
        Some(path) => Ok(Cow::Owned(Theme::from_json(&read_file(path)?)?)),
    }
}

fn parse_hue(value: &str) -> Result<HueShift, CliError> {
    match value.parse::<f64>() {
        Ok(degrees) => Ok(HueShift::Rotate(degrees)),
        Err(_) => Ok(HueShift::Match(HexColor::new(value)?)),
    }
}

#[allow(clippy::too_many_arguments)]
fn flag_options(
    alpha: Option<f64>,
    lighten: Option<f64>,
    darken: Option<f64>,
    hue: Option<&str>,
    saturate: Option<f64>,
    desaturate: Option<f64>,
    hex_output: bool,
) -> Result<ColorOptions, CliError> {
    Ok(ColorOptions {
        alpha,
        lighten,
        darken,
        hue: hue.map(parse_hue).transpose()?,
        saturate,
        desaturate,
        format: if hex_output { Format::Hex } else { Format::Css },
    })
}

fn json_options(json: &str) -> Result<ColorOptions, CliError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| CliError::Input(format!("invalid --options JSON: {e}")))?;
    Ok(ColorOptions::from_json(&value)?)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_probe_config(cli.config.as_deref())?;
    let support = resolve_support(cli.rgb, cli.user_agent.as_deref(), &config);
    tracing::debug!(?support, "rendering");

    match cli.command {
        Command::Convert { hex } => {
            let srgb = Srgb::from_hex(&hex)?;
            let p3 = srgb_to_p3(srgb);
            let oklab = linear_to_oklab(srgb_to_linear(srgb));
            let oklch = srgb_to_oklch(srgb);
            if cli.json {
                let info = serde_json::json!({
                    "hex": srgb.to_hex(),
                    "rgb": srgb.to_rgb8(),
                    "p3": p3,
                    "oklab": oklab,
                    "oklch": oklch,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                let (r, g, b) = srgb.to_rgb8();
                println!("hex    {}", srgb.to_hex());
                println!("rgb    {r} {g} {b}");
                println!("p3     {:.4} {:.4} {:.4}", p3.r, p3.g, p3.b);
                println!("oklab  {:.4} {:.4} {:.4}", oklab.l, oklab.a, oklab.b);
                println!("oklch  {:.4} {:.4} {:.2}", oklch.l, oklch.c, oklch.h);
            }
        }
        Command::Color {
            hex,
            alpha,
            lighten,
            darken,
            hue,
            saturate,
            desaturate,
            hex_output,
            options,
        } => {
            let options = match options {
                Some(json) => json_options(&json)?,
                None => flag_options(
                    alpha,
                    lighten,
                    darken,
                    hue.as_deref(),
                    saturate,
                    desaturate,
                    hex_output,
                )?,
            };
            let css = build_hex_color(&hex, &options, support)?;
            if cli.json {
                let info = serde_json::json!({
                    "input": hex,
                    "support": support,
                    "value": css,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{css}");
            }
        }
        Command::Gamut { l, c, h } => {
            let color = OkLch { l, c, h };
            let hex = map_into_gamut(color);
            if cli.json {
                let info = serde_json::json!({
                    "input": color,
                    "p3": map_into_gamut_p3(color),
                    "hex": hex,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{hex}");
            }
        }
        Command::Theme { file } => {
            let theme = load_theme(file.as_deref())?;
            let css = theme.var_css(support);
            if cli.json {
                let defaults = ColorOptions::default();
                let colors: serde_json::Map<String, serde_json::Value> = theme
                    .names()
                    .map(|name| -> Result<(String, serde_json::Value), CliError> {
                        let value = theme.render(name, &defaults, support)?;
                        Ok((name.to_string(), serde_json::Value::String(value)))
                    })
                    .collect::<Result<_, _>>()?;
                let info = serde_json::json!({
                    "support": support,
                    "css": css,
                    "colors": colors,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print!("{css}");
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
