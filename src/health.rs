use rocket::tokio::fs;
use serde::Serialize;
use std::sync::OnceLock;
use std::time::Instant;

use crate::config::SiteConfig;
use crate::content::{self, ContentSource, SectionKey};

/// Boot instant, set once at startup via `init_uptime()`
static BOOT_INSTANT: OnceLock<Instant> = OnceLock::new();

pub fn init_uptime() {
    let _ = BOOT_INSTANT.set(Instant::now());
}

fn uptime_secs() -> u64 {
    BOOT_INSTANT.get().map(|b| b.elapsed().as_secs()).unwrap_or(0)
}

// ── Data Structures ─────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub content: ContentCheck,
    pub resources: ResourceInfo,
    pub checked_at: String,
}

#[derive(Debug, Serialize)]
pub struct ContentCheck {
    /// "ok" or "error"
    pub status: &'static str,
    pub source: String,
    pub sections: Vec<SectionKey>,
    pub size_bytes: u64,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResourceInfo {
    pub uptime_secs: u64,
    pub uptime_human: String,
    pub os: String,
    pub version: String,
}

// ── Gather Functions ────────────────────────────────────────

/// Loads the content document the same way a page request does. The server
/// itself is "ok" whenever it can answer; content problems are reported
/// separately.
pub async fn gather(config: &SiteConfig) -> HealthReport {
    HealthReport {
        status: "ok",
        content: gather_content(config).await,
        resources: gather_resources(),
        checked_at: chrono::Utc::now().to_rfc3339(),
    }
}

async fn gather_content(config: &SiteConfig) -> ContentCheck {
    let source = match config.source() {
        Ok(s) => s,
        Err(e) => {
            return ContentCheck {
                status: "error",
                source: config.content_source.clone(),
                sections: Vec::new(),
                size_bytes: 0,
                error: Some(e),
            }
        }
    };

    let size_bytes = match &source {
        ContentSource::File(path) => fs::metadata(path).await.map(|m| m.len()).unwrap_or(0),
        ContentSource::Http(_) => 0,
    };

    match content::load(&source, config.fetch_timeout()).await {
        Ok(doc) => ContentCheck {
            status: "ok",
            source: source.describe(),
            sections: doc.sections.present(),
            size_bytes,
            error: None,
        },
        Err(e) => ContentCheck {
            status: "error",
            source: source.describe(),
            sections: Vec::new(),
            size_bytes,
            error: Some(e.to_string()),
        },
    }
}

fn gather_resources() -> ResourceInfo {
    let secs = uptime_secs();
    ResourceInfo {
        uptime_secs: secs,
        uptime_human: human_duration(secs),
        os: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

pub fn human_duration(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, mins)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
