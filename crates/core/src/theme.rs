//! Named color themes and the CSS that declares their variables.
//!
//! A [`Theme`] is an ordered table of named builders. Variable builders in
//! it only render `var(--x)` references; [`builder_var_css`] produces the
//! stylesheet that declares those variables, with a
//! `prefers-color-scheme: dark` block for dark values.
//!
//! Themes load from JSON documents of the form:
//!
//! ```json
//! { "colors": [
//!     { "name": "blue", "type": "hex", "hex": "#7cb8d6" },
//!     { "name": "primary", "type": "var", "var": "--primary",
//!       "light": "#7cb8d6", "dark": "#4d8fb0" },
//!     { "name": "fade", "type": "gradient", "direction": "to right",
//!       "stops": [{ "type": "hex", "hex": "#000000" }, "#ffffff"] }
//! ] }
//! ```
//!
//! In values and stops, strings starting with `#` are hex colors; other
//! strings are literal CSS.

use crate::builder::{ColorBuilder, GradientColor, HexColor, VarColor, VarValue};
use crate::error::ColorError;
use crate::options::ColorOptions;
use crate::support::ColorSupport;
use serde::Deserialize;
use std::sync::LazyLock;

/// Emits the variable declarations for every var builder reachable from
/// `builders`, including those nested in values and gradient stops.
///
/// Variables are listed in first-seen order; when two builders share a
/// name, the later one's values win. Returns an empty string if no
/// variables are found.
pub fn builder_var_css(builders: &[&ColorBuilder], support: ColorSupport) -> String {
    let mut vars: Vec<&VarColor> = Vec::new();
    for builder in builders {
        collect_vars(builder, &mut vars);
    }
    if vars.is_empty() {
        return String::new();
    }

    let mut css = String::from(":root {\n");
    for var in &vars {
        css.push_str(&format!(
            "  {}: {};\n",
            var.name(),
            var.light().css_value(support, var.is_static())
        ));
    }
    css.push_str("}\n");

    let dark: Vec<String> = vars
        .iter()
        .filter_map(|var| {
            var.dark().map(|value| {
                format!(
                    "    {}: {};\n",
                    var.name(),
                    value.css_value(support, var.is_static())
                )
            })
        })
        .collect();
    if !dark.is_empty() {
        css.push_str("\n@media (prefers-color-scheme: dark) {\n  :root {\n");
        for line in dark {
            css.push_str(&line);
        }
        css.push_str("  }\n}\n");
    }
    css
}

fn collect_vars<'a>(builder: &'a ColorBuilder, vars: &mut Vec<&'a VarColor>) {
    match builder {
        ColorBuilder::Hex(_) => {}
        ColorBuilder::Var(var) => {
            for value in std::iter::once(var.light()).chain(var.dark()) {
                if let VarValue::Color(nested) = value {
                    collect_vars(nested, vars);
                }
            }
            match vars.iter().position(|seen| seen.name() == var.name()) {
                Some(i) => vars[i] = var,
                None => vars.push(var),
            }
        }
        ColorBuilder::Gradient(g) => {
            for stop in g.stops() {
                collect_vars(stop, vars);
            }
        }
    }
}

/// An ordered table of named color builders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    colors: Vec<(String, ColorBuilder)>,
}

static BUILTIN: LazyLock<Theme> = LazyLock::new(build_builtin);

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a named builder. Replacing keeps the original position.
    pub fn insert(&mut self, name: &str, builder: ColorBuilder) {
        match self.colors.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some((_, slot)) => *slot = builder,
            None => self.colors.push((name.to_string(), builder)),
        }
    }

    /// Looks up a builder by name.
    pub fn get(&self, name: &str) -> Result<&ColorBuilder, ColorError> {
        self.colors
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, b)| b)
            .ok_or_else(|| ColorError::UnknownColor(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.colors.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Renders a named color.
    pub fn render(
        &self,
        name: &str,
        options: &ColorOptions,
        support: ColorSupport,
    ) -> Result<String, ColorError> {
        Ok(self.get(name)?.render(options, support))
    }

    /// Returns a copy of the theme with the named variable's values
    /// overridden. The variable name, and so every `var(--x)` reference to
    /// it, is unchanged.
    pub fn tint(
        &self,
        name: &str,
        light: impl Into<VarValue>,
        dark: Option<VarValue>,
    ) -> Result<Theme, ColorError> {
        let var = self.get(name)?.as_var().ok_or_else(|| {
            ColorError::InvalidTheme(format!("'{name}' is not a CSS variable color"))
        })?;
        let mut tinted = self.clone();
        tinted.insert(name, var.override_values(light, dark)?.into());
        Ok(tinted)
    }

    /// Variable declarations for every builder in the theme.
    pub fn var_css(&self, support: ColorSupport) -> String {
        let builders: Vec<&ColorBuilder> = self.colors.iter().map(|(_, b)| b).collect();
        builder_var_css(&builders, support)
    }

    /// The built-in Crosswing palette, built once per process.
    pub fn builtin() -> &'static Theme {
        &BUILTIN
    }

    /// Parses a theme document.
    pub fn from_json(json: &str) -> Result<Theme, ColorError> {
        let doc: ThemeDoc =
            serde_json::from_str(json).map_err(|e| ColorError::InvalidTheme(e.to_string()))?;
        let mut theme = Theme::new();
        for entry in doc.colors {
            theme.insert(&entry.name, entry.spec.into_builder()?);
        }
        tracing::debug!(colors = theme.len(), "loaded theme");
        Ok(theme)
    }
}

#[derive(Deserialize)]
struct ThemeDoc {
    colors: Vec<NamedSpec>,
}

#[derive(Deserialize)]
struct NamedSpec {
    name: String,
    #[serde(flatten)]
    spec: BuilderSpec,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum BuilderSpec {
    Hex {
        hex: String,
    },
    Var {
        var: String,
        light: ValueSpec,
        #[serde(default)]
        dark: Option<ValueSpec>,
        #[serde(default, rename = "static")]
        is_static: bool,
    },
    Gradient {
        #[serde(default = "default_direction")]
        direction: String,
        stops: Vec<ValueSpec>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ValueSpec {
    Text(String),
    Builder(Box<BuilderSpec>),
}

fn default_direction() -> String {
    "to bottom".to_string()
}

impl BuilderSpec {
    fn into_builder(self) -> Result<ColorBuilder, ColorError> {
        match self {
            BuilderSpec::Hex { hex } => Ok(HexColor::new(&hex)?.into()),
            BuilderSpec::Var {
                var,
                light,
                dark,
                is_static,
            } => {
                let light = light.into_value()?;
                let dark = dark.map(ValueSpec::into_value).transpose()?;
                if is_static {
                    Ok(VarColor::new_static(&var, light, dark).into())
                } else {
                    Ok(VarColor::new(&var, light, dark)?.into())
                }
            }
            BuilderSpec::Gradient { direction, stops } => {
                let stops = stops
                    .into_iter()
                    .map(ValueSpec::into_stop)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GradientColor::new(&direction, stops)?.into())
            }
        }
    }
}

impl ValueSpec {
    fn into_value(self) -> Result<VarValue, ColorError> {
        match self {
            ValueSpec::Text(s) if s.starts_with('#') => Ok(HexColor::new(&s)?.into()),
            ValueSpec::Text(s) => Ok(VarValue::Literal(s)),
            ValueSpec::Builder(spec) => Ok((*spec).into_builder()?.into()),
        }
    }

    fn into_stop(self) -> Result<ColorBuilder, ColorError> {
        match self {
            ValueSpec::Text(s) => Ok(HexColor::new(&s)?.into()),
            ValueSpec::Builder(spec) => (*spec).into_builder(),
        }
    }
}

fn hex(value: &str) -> HexColor {
    HexColor::new(value).expect("builtin theme hex values are valid")
}

fn light_dark(name: &str, light: &str, dark: &str) -> ColorBuilder {
    VarColor::new(name, hex(light), Some(hex(dark).into()))
        .expect("builtin variables hold solid colors")
        .into()
}

fn build_builtin() -> Theme {
    let mut theme = Theme::new();
    for (name, value) in [
        ("black", "#000000"),
        ("white", "#ffffff"),
        ("gray", "#8e8e93"),
        ("blue", "#7cb8d6"),
        ("green", "#34c759"),
        ("red", "#ff3b30"),
        ("orange", "#ff9500"),
        ("yellow", "#ffcc00"),
    ] {
        theme.insert(name, hex(value).into());
    }

    theme.insert("primary", light_dark("--primary", "#7cb8d6", "#4d8fb0"));
    theme.insert("text", light_dark("--text", "#1c1c1e", "#f2f2f7"));
    theme.insert("background", light_dark("--background", "#ffffff", "#1c1c1e"));
    theme.insert(
        "separator",
        VarColor::new_static(
            "--separator",
            "rgba(0, 0, 0, 0.1)",
            Some("rgba(255, 255, 255, 0.15)".into()),
        )
        .into(),
    );
    theme.insert(
        "sunset",
        GradientColor::new("to right", vec![hex("#ff9500").into(), hex("#ff3b30").into()])
            .expect("builtin gradient has stops")
            .into(),
    );
    theme
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{hex_color, var_color};

    const P3: ColorSupport = ColorSupport::DisplayP3;
    const RGB: ColorSupport = ColorSupport::Rgb;

    #[test]
    fn same_name_different_values_each_emit_light_and_dark() {
        let a = var_color(
            "--accent",
            HexColor::new("#7cb8d6").unwrap(),
            Some(HexColor::new("#336699").unwrap().into()),
        )
        .unwrap();
        let b = var_color(
            "--accent",
            HexColor::new("#ff0000").unwrap(),
            Some(HexColor::new("#880000").unwrap().into()),
        )
        .unwrap();
        let css_a = builder_var_css(&[&a], RGB);
        let css_b = builder_var_css(&[&b], RGB);
        assert!(css_a.contains("--accent: 124, 184, 214;"), "got:\n{css_a}");
        assert!(css_a.contains("@media (prefers-color-scheme: dark)"));
        assert!(css_a.contains("--accent: 51, 102, 153;"), "got:\n{css_a}");
        assert!(css_b.contains("--accent: 255, 0, 0;"), "got:\n{css_b}");
        assert!(css_b.contains("@media (prefers-color-scheme: dark)"));
        assert!(css_b.contains("--accent: 136, 0, 0;"), "got:\n{css_b}");
    }

    #[test]
    fn later_builder_with_same_name_wins() {
        let a = var_color("--accent", "1 0 0", None).unwrap();
        let b = var_color("--accent", "0 1 0", None).unwrap();
        let css = builder_var_css(&[&a, &b], P3);
        assert_eq!(css, ":root {\n  --accent: 0 1 0;\n}\n");
    }

    #[test]
    fn no_dark_values_means_no_media_block() {
        let a = var_color("--a", "1 1 1", None).unwrap();
        let css = builder_var_css(&[&a], P3);
        assert!(!css.contains("@media"));
    }

    #[test]
    fn full_block_layout() {
        let a = var_color("--a", "1 1 1", Some("0 0 0".into())).unwrap();
        let css = builder_var_css(&[&a], P3);
        assert_eq!(
            css,
            ":root {\n  --a: 1 1 1;\n}\n\n@media (prefers-color-scheme: dark) {\n  :root {\n    --a: 0 0 0;\n  }\n}\n"
        );
    }

    #[test]
    fn hex_builders_contribute_nothing() {
        let h = hex_color("#ffffff").unwrap();
        assert_eq!(builder_var_css(&[&h], P3), "");
    }

    #[test]
    fn nested_vars_are_declared_before_their_users() {
        let base = var_color("--base", "1 1 1", None).unwrap();
        let alias = var_color("--alias", base, None).unwrap();
        let css = builder_var_css(&[&alias], P3);
        let base_pos = css.find("--base: 1 1 1;").expect("base declared");
        let alias_pos = css.find("--alias: var(--base);").expect("alias declared");
        assert!(base_pos < alias_pos, "got:\n{css}");
    }

    #[test]
    fn gradient_stops_are_scanned_for_vars() {
        let g = crate::builder::gradient(
            "to right",
            vec![var_color("--stop", "0 0 0", None).unwrap(), hex_color("#ffffff").unwrap()],
        )
        .unwrap();
        assert!(builder_var_css(&[&g], P3).contains("--stop: 0 0 0;"));
    }

    #[test]
    fn builtin_theme_is_shared_and_complete() {
        let theme = Theme::builtin();
        assert!(std::ptr::eq(theme, Theme::builtin()));
        for name in ["black", "white", "blue", "primary", "text", "separator", "sunset"] {
            assert!(theme.get(name).is_ok(), "missing {name}");
        }
        let css = theme.var_css(P3);
        assert!(css.contains("--primary:"));
        assert!(css.contains("--separator: rgba(0, 0, 0, 0.1);"), "got:\n{css}");
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }

    #[test]
    fn static_var_values_are_full_colors() {
        let s = crate::builder::static_var_color(
            "--shadow",
            HexColor::new("#000000").unwrap(),
            None,
        );
        let css = builder_var_css(&[&s], RGB);
        assert!(css.contains("--shadow: rgba(0, 0, 0, 1);"), "got:\n{css}");
    }

    #[test]
    fn unknown_color_is_an_error() {
        assert!(matches!(
            Theme::builtin().get("nope"),
            Err(ColorError::UnknownColor(_))
        ));
    }

    #[test]
    fn tint_overrides_values_but_not_references() {
        let theme = Theme::builtin();
        let tinted = theme
            .tint("primary", HexColor::new("#ff0000").unwrap(), None)
            .unwrap();
        let opts = ColorOptions::default();
        assert_eq!(
            theme.render("primary", &opts, P3).unwrap(),
            tinted.render("primary", &opts, P3).unwrap()
        );
        assert!(tinted.var_css(RGB).contains("--primary: 255, 0, 0;"));
        assert!(theme.var_css(RGB).contains("--primary: 124, 184, 214;"));
    }

    #[test]
    fn tint_rejects_non_var_colors() {
        let result = Theme::builtin().tint("blue", "1 1 1", None);
        assert!(matches!(result, Err(ColorError::InvalidTheme(_))));
    }

    #[test]
    fn from_json_builds_all_kinds_in_order() {
        let theme = Theme::from_json(
            r##"{ "colors": [
                { "name": "blue", "type": "hex", "hex": "#7CB8D6" },
                { "name": "primary", "type": "var", "var": "--primary",
                  "light": "#7cb8d6", "dark": "#4d8fb0" },
                { "name": "shadow", "type": "var", "var": "shadow",
                  "light": "rgba(0, 0, 0, 0.2)", "static": true },
                { "name": "fade", "type": "gradient", "direction": "to right",
                  "stops": [{ "type": "hex", "hex": "#000000" }, "#ffffff"] }
            ] }"##,
        )
        .unwrap();
        let names: Vec<&str> = theme.names().collect();
        assert_eq!(names, ["blue", "primary", "shadow", "fade"]);
        assert_eq!(theme.get("blue").unwrap().kind(), "hex");
        assert_eq!(theme.get("primary").unwrap().kind(), "var");
        let shadow = theme.get("shadow").unwrap().as_var().unwrap();
        assert!(shadow.is_static());
        assert_eq!(shadow.name(), "--shadow");
        assert_eq!(
            theme
                .render("fade", &ColorOptions::default(), RGB)
                .unwrap(),
            "linear-gradient(to right, rgba(0, 0, 0, 1), rgba(255, 255, 255, 1))"
        );
    }

    #[test]
    fn from_json_gradient_defaults_direction() {
        let theme = Theme::from_json(
            r##"{ "colors": [ { "name": "g", "type": "gradient", "stops": ["#000000"] } ] }"##,
        )
        .unwrap();
        assert_eq!(theme.get("g").unwrap().as_gradient().unwrap().direction(), "to bottom");
    }

    #[test]
    fn from_json_rejects_bad_hex_and_bad_shape() {
        let bad_hex = Theme::from_json(
            r##"{ "colors": [ { "name": "x", "type": "hex", "hex": "#fff" } ] }"##,
        );
        assert!(matches!(bad_hex, Err(ColorError::InvalidHex { .. })));

        let bad_type = Theme::from_json(
            r##"{ "colors": [ { "name": "x", "type": "plaid" } ] }"##,
        );
        assert!(matches!(bad_type, Err(ColorError::InvalidTheme(_))));

        let empty_gradient = Theme::from_json(
            r##"{ "colors": [ { "name": "x", "type": "gradient", "stops": [] } ] }"##,
        );
        assert!(matches!(empty_gradient, Err(ColorError::EmptyGradient)));
    }

    #[test]
    fn from_json_accepts_nested_builder_values() {
        let theme = Theme::from_json(
            r##"{ "colors": [
                { "name": "accent", "type": "var", "var": "--accent",
                  "light": { "type": "hex", "hex": "#7cb8d6" },
                  "dark": { "type": "var", "var": "--base", "light": "0 0 0" } }
            ] }"##,
        )
        .unwrap();
        let css = theme.var_css(RGB);
        assert!(css.contains("--accent: 124, 184, 214;"), "got:\n{css}");
        assert!(css.contains("--base: 0 0 0;"), "got:\n{css}");
        assert!(css.contains("--accent: var(--base);"), "got:\n{css}");
    }

    #[test]
    fn from_json_rejects_gradient_in_plain_var() {
        let result = Theme::from_json(
            r##"{ "colors": [
                { "name": "bg", "type": "var", "var": "--bg",
                  "light": { "type": "gradient", "stops": ["#000000", "#ffffff"] } }
            ] }"##,
        );
        assert!(matches!(result, Err(ColorError::InvalidTheme(_))));
    }

    #[test]
    fn from_json_accepts_gradient_in_static_var() {
        let theme = Theme::from_json(
            r##"{ "colors": [
                { "name": "bg", "type": "var", "var": "--bg", "static": true,
                  "light": { "type": "gradient", "direction": "to right",
                             "stops": ["#000000", "#ffffff"] } }
            ] }"##,
        )
        .unwrap();
        let css = theme.var_css(RGB);
        assert!(
            css.contains("--bg: linear-gradient(to right, rgba(0, 0, 0, 1), rgba(255, 255, 255, 1));"),
            "got:\n{css}"
        );
        assert_eq!(
            theme.render("bg", &ColorOptions::default(), P3).unwrap(),
            "var(--bg)"
        );
    }

    #[test]
    fn tint_rejects_gradient_on_plain_var() {
        let sunset = Theme::builtin().get("sunset").unwrap().clone();
        let result = Theme::builtin().tint("primary", sunset, None);
        assert!(matches!(result, Err(ColorError::InvalidTheme(_))));
    }
}
