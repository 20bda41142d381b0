use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use crate::config::SiteConfig;
use crate::content::{parse_response, ContentSource, RawResponse};

#[derive(Debug, Default, PartialEq)]
pub struct BootSummary {
    pub warnings: u32,
    pub errors: u32,
}

/// Run all boot checks. Call this before Rocket launches.
/// Aborts only if the served directories cannot be created; content
/// problems are warnings, since the page renders its error state instead.
pub fn run(config: &SiteConfig) {
    info!("Holozine boot check starting...");

    let summary = check(config);

    if summary.errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            summary.errors, summary.warnings
        );
        process::exit(1);
    }

    if summary.warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). The issue page may show its error state.",
            summary.warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}

pub fn check(config: &SiteConfig) -> BootSummary {
    let mut summary = BootSummary::default();

    // ── 1. Directories ─────────────────────────────────
    for dir in [&config.content_dir, &config.static_dir] {
        let path = Path::new(dir);
        if !path.exists() {
            match fs::create_dir_all(path) {
                Ok(_) => info!("  Created directory: {}", dir),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir, e);
                    summary.errors += 1;
                }
            }
        } else if !path.is_dir() {
            error!("  {} exists but is not a directory", dir);
            summary.errors += 1;
        }
    }

    // ── 2. Content source ──────────────────────────────
    match config.source() {
        Ok(ContentSource::File(path)) => {
            if !path.exists() {
                warn!("  Content file missing: {} (pages will show the error state)", path.display());
                summary.warnings += 1;
            } else {
                match fs::read_to_string(&path) {
                    Ok(raw) => {
                        match parse_response(&RawResponse::ok(raw)) {
                            Ok(doc) => info!("  Content file {} has {} section(s)", path.display(), doc.sections.present().len()),
                            Err(e) => {
                                warn!("  Content file {} does not parse: {}", path.display(), e);
                                summary.warnings += 1;
                            }
                        }
                    }
                    Err(e) => {
                        warn!("  Content file {} unreadable: {}", path.display(), e);
                        summary.warnings += 1;
                    }
                }

                // The raw file is served from content_dir; a source elsewhere
                // means the public content URL points at a different file.
                if !path.starts_with(&config.content_dir) {
                    warn!(
                        "  Content file {} is outside {} and will not be served at {}",
                        path.display(),
                        config.content_dir,
                        config.content_url
                    );
                    summary.warnings += 1;
                }
            }
        }
        Ok(ContentSource::Http(url)) => {
            info!("  Content is fetched remotely from {}", url);
        }
        Err(e) => {
            error!("  Invalid content source: {}", e);
            summary.errors += 1;
        }
    }

    summary
}
