use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::State;

use crate::config::SiteConfig;
use crate::content::{ContentDocument, SectionKey};
use crate::effects::Variant;
use crate::health::{self, HealthReport};
use crate::page::PageShell;
use crate::render;
use crate::seo;

/// Fetch, parse and inject into a fresh shell. Every request loads the
/// content once; nothing is cached between requests.
async fn load_page(config: &SiteConfig, page: &mut PageShell) -> Option<(ContentDocument, render::RenderReport)> {
    match config.source() {
        Ok(source) => render::load_and_render(&source, config.fetch_timeout(), page).await.ok(),
        Err(e) => {
            log::error!("Invalid content source {:?}: {}", config.content_source, e);
            render::render_error(page);
            None
        }
    }
}

// ── Issue page ─────────────────────────────────────────

#[get("/?<variant>")]
pub async fn issue(config: &State<SiteConfig>, variant: Option<&str>) -> RawHtml<String> {
    let variant = variant.and_then(Variant::from_str).unwrap_or(config.variant);

    let mut page = PageShell::standard();
    let loaded = load_page(config, &mut page).await;
    let meta = seo::build_meta(config, loaded.as_ref().map(|(doc, _)| doc));

    RawHtml(render::render_issue_page(config, variant, &page, &meta))
}

// ── Single section fragment ────────────────────────────

/// The fragment one section target would receive. Unknown keys, and
/// sections the document does not carry, are 404.
#[get("/section/<id>")]
pub async fn section(config: &State<SiteConfig>, id: &str) -> Option<RawHtml<String>> {
    let key = SectionKey::from_id(id)?;

    let mut page = PageShell::with_sections(&[key.id()]);
    if let Some((_, report)) = load_page(config, &mut page).await {
        if report.missing.contains(&key) {
            return None;
        }
    }

    page.inner_html(key.id()).map(|html| RawHtml(html.to_string()))
}

// ── Health ─────────────────────────────────────────────

#[get("/health")]
pub async fn health_check(config: &State<SiteConfig>) -> Json<HealthReport> {
    Json(health::gather(config).await)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![issue, section, health_check]
}
