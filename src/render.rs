use log::{error, warn};
use std::fmt;
use std::time::Duration;

use crate::config::SiteConfig;
use crate::content::{
    self, AdRecord, ArticleRecord, ContentDocument, ContentError, ContentSource, CoverRecord,
    InterviewRecord, SectionKey, Sections,
};
use crate::effects::{self, PaletteReactor, Variant};
use crate::page::{PageShell, RenderTargets};
use crate::scroll;

/// Written into every section when the content cannot be loaded.
pub const ERROR_FRAGMENT: &str = "<div class=\"content-card\"><h2>Error</h2><p>Could not load content. Please ensure the server is running and the path is correct.</p></div>";

// ── Escaping ───────────────────────────────────────────

pub fn html_escape(s: &str) -> String {
    Escaped(s).to_string()
}

/// Escapes on display, so content fields can go straight into `format!`.
/// There is no unescaped counterpart: every content field is text.
pub struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                _ => write!(f, "{}", c)?,
            }
        }
        Ok(())
    }
}

// ── Fragment builders ──────────────────────────────────

pub fn build_cover(cover: &CoverRecord) -> String {
    format!(
        "<div class=\"content-card\"><h1>{}</h1><p>{}</p></div>",
        Escaped(&cover.title),
        Escaped(&cover.blurb)
    )
}

/// Editorial leads with an `h1`; the other prose sections use `h2`.
pub fn build_article(article: &ArticleRecord, heading_tag: &str) -> String {
    format!(
        "<div class=\"content-card\"><{tag}>{}</{tag}><p>{}</p></div>",
        Escaped(&article.heading),
        Escaped(&article.body),
        tag = heading_tag
    )
}

pub fn build_interview(interview: &InterviewRecord) -> String {
    let pairs: String = interview
        .exchanges
        .iter()
        .map(|qa| format!("<dt>{}</dt><dd>{}</dd>", Escaped(&qa.question), Escaped(&qa.answer)))
        .collect();
    format!(
        "<div class=\"content-card\"><h2>Interview with {}</h2><dl>{}</dl></div>",
        Escaped(&interview.subject),
        pairs
    )
}

pub fn build_ads(ads: &[AdRecord]) -> String {
    let cards: String = ads
        .iter()
        .map(|ad| {
            format!(
                "<div class=\"ad-card\"><h3>{}</h3><p>{}</p></div>",
                Escaped(&ad.product),
                Escaped(&ad.copy)
            )
        })
        .collect();
    format!("<div class=\"ads-container\">{}</div>", cards)
}

pub fn build_visuals(prompts: &[String]) -> String {
    let cards: String = prompts
        .iter()
        .map(|p| format!("<div class=\"visual-card\"><p>{}</p></div>", Escaped(p)))
        .collect();
    format!("<div class=\"visuals-container\"><h2>Visual Prompts</h2>{}</div>", cards)
}

/// Fragment for one section, or `None` when the document lacks it.
pub fn build_fragment(sections: &Sections, key: SectionKey) -> Option<String> {
    match key {
        SectionKey::Cover => sections.cover.as_ref().map(build_cover),
        SectionKey::Editorial => sections.editorial.as_ref().map(|a| build_article(a, "h1")),
        SectionKey::Culture => sections.culture.as_ref().map(|a| build_article(a, "h2")),
        SectionKey::Tech => sections.tech.as_ref().map(|a| build_article(a, "h2")),
        SectionKey::Interview => sections.interview.as_ref().map(build_interview),
        SectionKey::Ads => sections.ads.as_deref().map(build_ads),
        SectionKey::Lore => sections.lore.as_ref().map(|a| build_article(a, "h2")),
        SectionKey::Visuals => sections.visuals.as_deref().map(build_visuals),
    }
}

// ── Injection ──────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Targets that received content.
    pub written: Vec<SectionKey>,
    /// Targets on the page whose section the document does not carry.
    pub missing: Vec<SectionKey>,
}

/// Write every section the document carries into its target. Targets not
/// on the page are skipped silently; targets without content are left
/// untouched and reported. All fragments are built before the first write.
pub fn render<T: RenderTargets + ?Sized>(document: &ContentDocument, targets: &mut T) -> RenderReport {
    let mut report = RenderReport::default();
    let mut pending: Vec<(SectionKey, String)> = Vec::new();

    for key in SectionKey::ALL {
        if !targets.has_target(key.id()) {
            continue;
        }
        match build_fragment(&document.sections, key) {
            Some(html) => pending.push((key, html)),
            None => {
                warn!("Section target #{} has no content in the document, leaving it empty", key);
                report.missing.push(key);
            }
        }
    }

    for (key, html) in pending {
        if targets.set_inner_html(key.id(), &html) {
            report.written.push(key);
        }
    }
    report
}

/// Overwrite every section on the page with the same error fragment.
pub fn render_error<T: RenderTargets + ?Sized>(targets: &mut T) {
    for id in targets.section_ids() {
        targets.set_inner_html(&id, ERROR_FRAGMENT);
    }
}

/// Fetch, parse and inject in one pass. On any failure the error is logged
/// and every section shows the error fragment; nothing is half-rendered.
pub async fn load_and_render<T: RenderTargets + ?Sized>(
    source: &ContentSource,
    timeout: Duration,
    targets: &mut T,
) -> Result<(ContentDocument, RenderReport), ContentError> {
    match content::load(source, timeout).await {
        Ok(document) => {
            let report = render(&document, targets);
            Ok((document, report))
        }
        Err(e) => {
            error!("Could not load or parse blog content from {}: {}", source.describe(), e);
            render_error(targets);
            Err(e)
        }
    }
}

// ── Page shell ─────────────────────────────────────────

/// The full issue page: navigation, the section slots as rendered, and the
/// scripts for the variant's effects.
pub fn render_issue_page(config: &SiteConfig, variant: Variant, page: &PageShell, seo_meta: &str) -> String {
    let nav_links: String = page
        .slots()
        .iter()
        .map(|s| {
            format!(
                "            <a href=\"#{}\" class=\"nav-link\">{}</a>\n",
                html_escape(&s.id),
                Escaped(&s.label)
            )
        })
        .collect();

    let sections: String = page
        .slots()
        .iter()
        .map(|s| {
            format!(
                "        <section id=\"{}\" class=\"blog-section\">{}</section>\n",
                html_escape(&s.id),
                s.inner_html
            )
        })
        .collect();

    let reactor = PaletteReactor::from_config(config);
    let site_name = &config.site_name;

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {seo_meta}
    <style>
        {base_css}
    </style>
</head>
<body class="variant-{variant}" data-variant="{variant}" data-container="{container}" data-threshold="{threshold}" data-parallax="{parallax}" data-palette="{palette}">
    {effect_markup}
    <header class="site-header">
        <h1 class="site-name"><a href="/">{site_name}</a></h1>
        <p class="site-tagline">{tagline}</p>
        <nav class="section-nav">
{nav_links}        </nav>
    </header>
    <main id="{container}" class="issue">
{sections}    </main>
    <footer class="site-footer"><p>&copy; {year} {site_name}</p></footer>
    {scripts}
</body>
</html>"#,
        seo_meta = seo_meta,
        base_css = DEFAULT_CSS,
        variant = variant.name(),
        container = html_escape(&config.scroll_container),
        threshold = config.visibility_threshold,
        parallax = config.parallax_factor,
        palette = html_escape(&reactor.palette_json()),
        effect_markup = effects::build_effect_markup(variant),
        site_name = Escaped(site_name),
        tagline = Escaped(&config.tagline),
        nav_links = nav_links,
        sections = sections,
        year = chrono::Utc::now().format("%Y"),
        scripts = effects::build_scripts(variant, scroll::CLIENT_JS),
    )
}

const DEFAULT_CSS: &str = r#"
        * { box-sizing: border-box; margin: 0; padding: 0; }
        html, body { height: 100%; }
        body { background: #05010d; color: #e8e6f0; font-family: 'Space Grotesk', system-ui, sans-serif; line-height: 1.6; overflow: hidden; }
        a { color: inherit; }
        #holographic-background { position: fixed; inset: 0; z-index: 0; pointer-events: none; }
        .site-header { position: fixed; top: 0; left: 0; bottom: 0; width: 220px; padding: 32px 24px; z-index: 2; }
        .site-name { font-size: 22px; letter-spacing: 0.08em; text-transform: uppercase; }
        .site-name a { text-decoration: none; }
        .site-tagline { font-size: 13px; opacity: 0.6; margin-bottom: 32px; }
        .section-nav { display: flex; flex-direction: column; gap: 8px; }
        .nav-link { text-decoration: none; opacity: 0.55; transition: opacity 0.2s, color 0.2s; }
        .nav-link.active { opacity: 1; color: #00f6ff; }
        .issue { position: relative; z-index: 1; height: 100vh; overflow-y: auto; margin-left: 220px; scroll-snap-type: y proximity; }
        .blog-section { min-height: 100vh; display: flex; align-items: center; justify-content: center; padding: 64px 48px; opacity: 0.35; transition: opacity 0.6s; scroll-snap-align: start; }
        .blog-section.visible { opacity: 1; }
        .content-card { max-width: 720px; padding: 40px; border: 1px solid rgba(0, 246, 255, 0.25); border-radius: 12px; background: rgba(10, 4, 24, 0.72); backdrop-filter: blur(6px); transform: translateY(var(--parallax, 0px)) var(--tilt, rotateX(0deg)); transition: border-color 0.4s, box-shadow 0.4s; }
        .content-card.active { border-color: rgba(0, 246, 255, 0.8); box-shadow: 0 0 32px rgba(0, 246, 255, 0.25); }
        .content-card h1 { font-size: 44px; line-height: 1.1; margin-bottom: 16px; }
        .content-card h2 { font-size: 28px; margin-bottom: 12px; }
        .content-card dl dt { font-weight: 600; margin-top: 16px; }
        .content-card dl dd { margin-left: 0; opacity: 0.85; }
        .ads-container, .visuals-container { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 20px; max-width: 960px; width: 100%; }
        .visuals-container h2 { grid-column: 1 / -1; }
        .ad-card, .visual-card { padding: 24px; border: 1px dashed rgba(255, 0, 255, 0.4); border-radius: 8px; background: rgba(10, 4, 24, 0.6); }
        .ad-card h3 { font-size: 18px; margin-bottom: 8px; }
        .visual-card p { font-style: italic; font-size: 14px; }
        .audio-toggle { position: fixed; right: 24px; bottom: 24px; z-index: 3; padding: 8px 16px; border: 1px solid #00f6ff; border-radius: 20px; background: transparent; color: #00f6ff; cursor: pointer; }
        .audio-toggle:disabled { opacity: 0.5; cursor: default; }
        .site-footer { position: fixed; right: 24px; top: 16px; z-index: 2; font-size: 12px; opacity: 0.5; }
        @media (max-width: 768px) {
            .site-header { position: static; width: auto; padding: 16px; }
            .section-nav { flex-direction: row; flex-wrap: wrap; }
            .issue { margin-left: 0; height: calc(100vh - 160px); }
            .blog-section { padding: 32px 16px; }
            .content-card { padding: 24px; }
            .content-card h1 { font-size: 32px; }
        }
"#;
