//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top, so a
//! `site.toml` only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── site.toml        # Site configuration (optional)
//! ├── gallery.toml     # Gallery items (see crate::gallery)
//! ├── about.md         # About section body
//! └── assets/          # Copied verbatim to the output root
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! locale = "VE"                 # VE | ES, see crate::locale
//!
//! [site]
//! name = "Luthier de Cuatros"
//! title = "Luthier de Cuatros | Instrumentos Artesanales Venezolanos"
//! description = "..."
//! url = "https://tudominio.com/"
//! keywords = ["luthier", "cuatro venezolano"]
//! og_image = "/images/og-image.jpg"
//! twitter_handle = "@tucuenta"
//!
//! [hero]
//! headline = "Cuatros"
//! highlight = "Artesanales"
//! text = "..."
//!
//! [contact]
//! email = "contacto@luthier.com"
//! phone = "+584141234567"
//! address = "Caracas, Venezuela"
//! hours = "Lun - Vie: 9:00 - 18:00"
//! form_action = "https://formspree.io/f/xxxx"   # optional
//!
//! [social]
//! instagram = "https://instagram.com/tu_cuenta"
//!
//! [submission]
//! reset_after = "5s"            # success/error banner lifetime
//!
//! [theme]
//! default = "system"            # light | dark | system
//!
//! [colors.light]
//! background = "#F8F4EF"
//! # ...
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::contact::is_valid_email;
use crate::locale::{LocaleCode, LocaleConfig};
use crate::submission::DEFAULT_RESET_AFTER;
use crate::theme::ThemePreference;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Name of the config file within the content directory.
pub const CONFIG_FILENAME: &str = "site.toml";

/// Longest accepted banner reset delay.
const MAX_RESET_AFTER: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Regional validation tables for the contact form.
    pub locale: LocaleCode,
    /// Identity and SEO metadata.
    pub site: SiteMeta,
    /// Hero section copy.
    pub hero: HeroConfig,
    /// Contact details shown next to the form and in the footer.
    pub contact: ContactConfig,
    /// Social profile links.
    pub social: SocialLinks,
    /// Contact form submission behaviour.
    pub submission: SubmissionConfig,
    /// Theme defaults.
    pub theme: ThemeConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        if !(self.site.url.starts_with("https://") || self.site.url.starts_with("http://")) {
            return Err(ConfigError::Validation(
                "site.url must start with http:// or https://".into(),
            ));
        }
        if !is_valid_email(&self.contact.email) {
            return Err(ConfigError::Validation(
                "contact.email must be an email address".into(),
            ));
        }
        let reset = self.submission.reset_after;
        if reset.is_zero() || reset > MAX_RESET_AFTER {
            return Err(ConfigError::Validation(
                "submission.reset_after must be between 1ms and 60s".into(),
            ));
        }
        for (mode, scheme) in [("light", &self.colors.light), ("dark", &self.colors.dark)] {
            if let Some(key) = scheme.first_non_hex() {
                return Err(ConfigError::Validation(format!(
                    "colors.{mode}.{key} must be a #hex color"
                )));
            }
        }
        Ok(())
    }

    /// The regional tables selected by `locale`.
    pub fn locale_config(&self) -> LocaleConfig {
        LocaleConfig::for_code(self.locale)
    }
}

/// Identity and SEO metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    /// Business name (logo text, Open Graph site name).
    pub name: String,
    /// Document `<title>`.
    pub title: String,
    /// Meta description.
    pub description: String,
    /// Canonical URL.
    pub url: String,
    pub keywords: Vec<String>,
    /// Open Graph / Twitter card image.
    pub og_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_handle: Option<String>,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            name: "Luthier de Cuatros".to_string(),
            title: "Luthier de Cuatros | Instrumentos Artesanales Venezolanos".to_string(),
            description: "Luthier especializado en cuatros venezolanos artesanales. Instrumentos \
                          únicos hechos a mano con maderas seleccionadas y técnicas tradicionales."
                .to_string(),
            url: "https://tudominio.com/".to_string(),
            keywords: [
                "luthier",
                "cuatro venezolano",
                "instrumentos artesanales",
                "música tradicional",
                "luthería venezolana",
            ]
            .map(String::from)
            .to_vec(),
            og_image: "/images/og-image.jpg".to_string(),
            twitter_handle: None,
        }
    }
}

/// Hero section copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeroConfig {
    pub headline: String,
    /// Second line of the headline, in the accent color.
    pub highlight: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            headline: "Cuatros".to_string(),
            highlight: "Artesanales".to_string(),
            text: "Instrumentos únicos creados con técnicas tradicionales venezolanas. Cada \
                   cuatro cuenta una historia de pasión y dedicación artesanal."
                .to_string(),
            image: None,
        }
    }
}

/// Contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    /// Where the rendered form posts. Without it the form is display-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_action: Option<String>,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            email: "contacto@luthier.com".to_string(),
            phone: None,
            address: None,
            hours: None,
            form_action: None,
        }
    }
}

/// Social profile links; absent entries are not rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
}

impl SocialLinks {
    /// `(label, url)` pairs for the links that are set.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("Instagram", &self.instagram),
            ("Facebook", &self.facebook),
            ("YouTube", &self.youtube),
            ("WhatsApp", &self.whatsapp),
        ]
        .into_iter()
        .filter_map(|(label, url)| url.as_deref().map(|u| (label, u)))
        .collect()
    }
}

/// Contact form submission behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubmissionConfig {
    /// How long the success/error banner stays before the form returns to idle.
    #[serde(with = "humantime_serde")]
    pub reset_after: Duration,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            reset_after: DEFAULT_RESET_AFTER,
        }
    }
}

/// Theme defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Preference used until the visitor picks one.
    pub default: ThemePreference,
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background; also the browser `theme-color`.
    pub background: String,
    /// Primary text color.
    pub text: String,
    /// Muted/secondary text color (captions, footer).
    pub text_muted: String,
    /// Card and input borders.
    pub border: String,
    /// Headline highlight, active buttons, links.
    pub accent: String,
    /// Accent on hover.
    pub accent_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#F8F4EF".to_string(),
            text: "#2B2118".to_string(),
            text_muted: "#6B5B4B".to_string(),
            border: "#E2D6C8".to_string(),
            accent: "#B5651D".to_string(),
            accent_hover: "#8C4A12".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#22212C".to_string(),
            text: "#F2ECE4".to_string(),
            text_muted: "#A89F94".to_string(),
            border: "#3A3946".to_string(),
            accent: "#D9914A".to_string(),
            accent_hover: "#F0AE6B".to_string(),
        }
    }

    /// Name of the first value that isn't a `#rgb`/`#rrggbb` color.
    fn first_non_hex(&self) -> Option<&'static str> {
        [
            ("background", &self.background),
            ("text", &self.text),
            ("text_muted", &self.text_muted),
            ("border", &self.border),
            ("accent", &self.accent),
            ("accent_hover", &self.accent_hover),
        ]
        .into_iter()
        .find(|(_, value)| !is_hex_color(value))
        .map(|(key, _)| key)
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `site.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `site.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `site.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    if overlay.is_none() {
        tracing::debug!(root = %root.display(), "no {CONFIG_FILENAME}, using stock defaults");
    }
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Luthier Site Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Regional tables for the contact form: phone pattern, instrument catalog,
# budget bands, currency. "VE" (cuatro workshop) or "ES" (guitar workshop).
locale = "VE"

# ---------------------------------------------------------------------------
# Identity and SEO
# ---------------------------------------------------------------------------
[site]
name = "Luthier de Cuatros"
title = "Luthier de Cuatros | Instrumentos Artesanales Venezolanos"
description = "Luthier especializado en cuatros venezolanos artesanales. Instrumentos únicos hechos a mano con maderas seleccionadas y técnicas tradicionales."
# Canonical URL, also used for Open Graph.
url = "https://tudominio.com/"
keywords = ["luthier", "cuatro venezolano", "instrumentos artesanales", "música tradicional", "luthería venezolana"]
# Image for Open Graph and Twitter cards.
og_image = "/images/og-image.jpg"
# twitter_handle = "@tucuenta"

# ---------------------------------------------------------------------------
# Hero section
# ---------------------------------------------------------------------------
[hero]
headline = "Cuatros"
# Second headline line, rendered in the accent color.
highlight = "Artesanales"
text = "Instrumentos únicos creados con técnicas tradicionales venezolanas. Cada cuatro cuenta una historia de pasión y dedicación artesanal."
# image = "/images/hero-cuatro.jpg"

# ---------------------------------------------------------------------------
# Contact details
# ---------------------------------------------------------------------------
[contact]
email = "contacto@luthier.com"
# phone = "+584141234567"
# address = "Caracas, Venezuela"
# hours = "Lun - Vie: 9:00 - 18:00"
# Where the contact form posts (e.g. a form backend). Omit for display only.
# form_action = "https://example.com/contact"

# ---------------------------------------------------------------------------
# Social links (omit any you don't use)
# ---------------------------------------------------------------------------
[social]
# instagram = "https://instagram.com/tu_cuenta"
# facebook = "https://facebook.com/tu_pagina"
# youtube = "https://youtube.com/@tu_canal"
# whatsapp = "https://wa.me/584141234567"

# ---------------------------------------------------------------------------
# Contact form submission
# ---------------------------------------------------------------------------
[submission]
# How long the success/error banner stays before the form resets.
reset_after = "5s"

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
[theme]
# Used until the visitor picks one: "light", "dark" or "system".
default = "system"

# ---------------------------------------------------------------------------
# Colors - Light mode
# ---------------------------------------------------------------------------
[colors.light]
background = "#F8F4EF"
text = "#2B2118"
text_muted = "#6B5B4B"
border = "#E2D6C8"
accent = "#B5651D"
accent_hover = "#8C4A12"

# ---------------------------------------------------------------------------
# Colors - Dark mode
# ---------------------------------------------------------------------------
[colors.dark]
background = "#22212C"
text = "#F2ECE4"
text_muted = "#A89F94"
border = "#3A3946"
accent = "#D9914A"
accent_hover = "#F0AE6B"
"##
}

/// Generate CSS custom properties from color config.
///
/// The light scheme is the base. The dark scheme applies when the page is
/// explicitly dark (`data-theme="dark"`) or when it follows the system
/// (`data-theme="system"`) and the OS prefers dark.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
{light}
}}

:root[data-theme="dark"] {{
{dark}
}}

@media (prefers-color-scheme: dark) {{
    :root[data-theme="system"] {{
{dark_nested}
    }}
}}"#,
        light = color_vars(&colors.light, 1),
        dark = color_vars(&colors.dark, 1),
        dark_nested = color_vars(&colors.dark, 2),
    )
}

fn color_vars(scheme: &ColorScheme, depth: usize) -> String {
    let pad = "    ".repeat(depth);
    [
        ("--color-bg", &scheme.background),
        ("--color-text", &scheme.text),
        ("--color-text-muted", &scheme.text_muted),
        ("--color-border", &scheme.border),
        ("--color-accent", &scheme.accent),
        ("--color-accent-hover", &scheme.accent_hover),
    ]
    .iter()
    .map(|(name, value)| format!("{pad}{name}: {value};"))
    .collect::<Vec<_>>()
    .join("\n")
}
