//! Display-P3 capability detection.
//!
//! Rendering emits `color(display-p3 ...)` only when the host can display
//! it, and falls back to `rgba(...)` otherwise. The decision combines the
//! host's `CSS.supports('color: color(display-p3 1 1 1)')` answer with a
//! User-Agent allowlist, because some engine versions claim support but
//! render P3 colors incorrectly.

use serde::{Deserialize, Serialize};

/// Which CSS color syntax the host can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorSupport {
    /// `color(display-p3 r g b / a)`.
    #[default]
    DisplayP3,
    /// `rgba(r, g, b, a)`.
    Rgb,
}

/// Minimum engine versions trusted to render Display-P3.
///
/// Loaded from JSON with missing fields falling back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Minimum major version from `Chrome/<n>`.
    pub chrome_min_version: u32,
    /// Minimum WebKit build from `Safari/<n>`.
    pub safari_min_version: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            chrome_min_version: 114,
            safari_min_version: 604,
        }
    }
}

impl ColorSupport {
    /// Resolves support from the CSS probe and the User-Agent string.
    ///
    /// Chrome-based agents (which also advertise `Safari/`) are judged by
    /// their Chrome version, other WebKit agents by their Safari build.
    /// Agents matching neither token rely on the CSS probe alone.
    pub fn detect(css_supports_p3: bool, user_agent: &str, config: &ProbeConfig) -> Self {
        let support = if !css_supports_p3 {
            ColorSupport::Rgb
        } else if let Some(version) = token_version(user_agent, "Chrome/") {
            Self::from_flag(version >= config.chrome_min_version)
        } else if let Some(version) = token_version(user_agent, "Safari/") {
            Self::from_flag(version >= config.safari_min_version)
        } else {
            ColorSupport::DisplayP3
        };
        tracing::debug!(css_supports_p3, user_agent, ?support, "resolved color support");
        support
    }

    fn from_flag(p3: bool) -> Self {
        if p3 {
            ColorSupport::DisplayP3
        } else {
            ColorSupport::Rgb
        }
    }

    pub fn is_p3(self) -> bool {
        self == ColorSupport::DisplayP3
    }
}

/// Extracts the leading integer after `token` in `user_agent`.
fn token_version(user_agent: &str, token: &str) -> Option<u32> {
    let start = user_agent.find(token)? + token.len();
    let digits: String = user_agent[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
