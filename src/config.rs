use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::content::{ContentSource, SectionKey};
use crate::effects::Variant;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "HOLOZINE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "holozine.toml";

/// Site configuration, read from TOML. Every field has a default so an
/// absent or partial file still yields a working site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site_name: String,
    pub tagline: String,
    /// File path or `http(s)://` URL the server loads content from.
    pub content_source: String,
    /// Public path the raw content file is served at.
    pub content_url: String,
    pub content_dir: String,
    pub static_dir: String,
    /// Id of the scrollable element the coordinator observes.
    pub scroll_container: String,
    pub parallax_factor: f64,
    pub visibility_threshold: f64,
    pub variant: Variant,
    pub fetch_timeout_secs: u64,
    /// Section id → `#rrggbb` background tint.
    pub palette: BTreeMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site_name: "Holozine".to_string(),
            tagline: "Dispatches from the grid".to_string(),
            content_source: "website/content/maleficarum.json".to_string(),
            content_url: "/content/maleficarum.json".to_string(),
            content_dir: "website/content".to_string(),
            static_dir: "website/static".to_string(),
            scroll_container: "main-content".to_string(),
            parallax_factor: 0.2,
            visibility_threshold: 0.5,
            variant: Variant::Holographic,
            fetch_timeout_secs: 10,
            palette: default_palette(),
        }
    }
}

fn default_palette() -> BTreeMap<String, String> {
    [
        (SectionKey::Cover, "#00f6ff"),
        (SectionKey::Editorial, "#ff00ff"),
        (SectionKey::Culture, "#ffb000"),
        (SectionKey::Tech, "#00ff9c"),
        (SectionKey::Interview, "#8a5cff"),
        (SectionKey::Ads, "#ff3864"),
        (SectionKey::Lore, "#3d7bff"),
        (SectionKey::Visuals, "#f6ff00"),
    ]
    .iter()
    .map(|(k, c)| (k.id().to_string(), c.to_string()))
    .collect()
}

impl SiteConfig {
    /// Load from `$HOLOZINE_CONFIG`, else `holozine.toml`. A missing file is
    /// not an error; a malformed one is.
    pub fn load() -> Result<Self, String> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = Path::new(&path);
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        let config = Self::from_toml_str(&raw).map_err(|e| format!("{}: {}", path.display(), e))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, String> {
        let config: SiteConfig = toml::from_str(raw).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.source()?;
        if !self.content_url.starts_with('/') {
            return Err(format!("content_url must be an absolute path, got {:?}", self.content_url));
        }
        if !self.parallax_factor.is_finite() {
            return Err("parallax_factor must be a finite number".to_string());
        }
        if !(self.visibility_threshold > 0.0 && self.visibility_threshold <= 1.0) {
            return Err(format!(
                "visibility_threshold must be in (0, 1], got {}",
                self.visibility_threshold
            ));
        }
        if self.scroll_container.trim().is_empty() {
            return Err("scroll_container must not be empty".to_string());
        }
        for (key, color) in &self.palette {
            if SectionKey::from_id(key).is_none() {
                return Err(format!("palette names unknown section {:?}", key));
            }
            parse_hex_color(color).ok_or_else(|| format!("palette colour for {} is not #rrggbb: {:?}", key, color))?;
        }
        Ok(())
    }

    pub fn source(&self) -> Result<ContentSource, String> {
        ContentSource::parse(&self.content_source)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    /// Mount point for the content directory: the parent of `content_url`.
    pub fn content_mount(&self) -> String {
        match self.content_url.rfind('/') {
            Some(0) | None => "/".to_string(),
            Some(i) => self.content_url[..i].to_string(),
        }
    }

    pub fn color_for(&self, key: SectionKey) -> Option<u32> {
        self.palette.get(key.id()).and_then(|c| parse_hex_color(c))
    }
}

pub fn parse_hex_color(raw: &str) -> Option<u32> {
    let hex = raw.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
