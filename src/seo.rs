use crate::config::SiteConfig;
use crate::content::ContentDocument;
use crate::render::html_escape;

/// Build the `<title>` and meta tags for the issue page. The cover, when the
/// document has one, supplies the title and description.
pub fn build_meta(config: &SiteConfig, document: Option<&ContentDocument>) -> String {
    let cover = document.and_then(|d| d.sections.cover.as_ref());

    let page_title = match cover {
        Some(c) if !c.title.trim().is_empty() => format!("{} — {}", c.title.trim(), config.site_name),
        _ => config.site_name.clone(),
    };
    let page_desc = match cover {
        Some(c) if !c.blurb.trim().is_empty() => truncate_chars(c.blurb.trim(), 160),
        _ => config.tagline.clone(),
    };

    let mut meta = format!(
        r#"<title>{}</title>
    <meta name="description" content="{}">"#,
        html_escape(&page_title),
        html_escape(&page_desc),
    );

    // Open Graph
    meta.push_str(&format!(
        r#"
    <meta property="og:title" content="{}">
    <meta property="og:description" content="{}">
    <meta property="og:site_name" content="{}">
    <meta property="og:type" content="article">"#,
        html_escape(&page_title),
        html_escape(&page_desc),
        html_escape(&config.site_name),
    ));

    meta
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max - 1).collect();
    format!("{}…", cut.trim_end())
}
