#![cfg(test)]

use rocket::http::Status;
use rocket::local::blocking::Client;
use std::path::Path;
use std::time::Duration;

use crate::config::SiteConfig;
use crate::content::{parse_response, ContentError, ContentSource, RawResponse, SectionKey};
use crate::page::{PageShell, RenderTargets};
use crate::render::{self, ERROR_FRAGMENT};

const FULL_ISSUE: &str = r#"<!-- issue 13 -->
```json
{
  "sections": {
    "cover": { "title": "Maleficarum", "blurb": "Hex & the city" },
    "editorial": { "title": "From the Desk", "article": "Welcome back." },
    "culture": { "headline": "Night Markets", "body": "Everything is for sale." },
    "tech": { "title": "Wetware", "text": "Patch notes." },
    "interview": {
      "subject": "The Archivist",
      "q_and_a": [
        { "Q": "What do you keep?", "A": "Everything." },
        { "Q": "Why?", "A": "Someone has to." }
      ]
    },
    "ads": [
      { "product": "NeuroMint", "copy": "Fresh thoughts." },
      { "product": "GhostVPN", "copy": "Be nowhere." }
    ],
    "lore_serial": { "chapter": "Chapter 7: The Well", "text": "It was deeper than before." },
    "visual_prompts": ["a cathedral made of routers", "rain on chrome"],
    "colophon": { "credits": "ignored" }
  }
}
```
"#;

/// A config rooted in a fresh temp dir, with the given content file written.
fn test_site(raw_content: Option<&str>) -> (tempfile::TempDir, SiteConfig) {
    let dir = tempfile::tempdir().unwrap();
    let content_dir = dir.path().join("content");
    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&content_dir).unwrap();
    std::fs::create_dir_all(&static_dir).unwrap();
    let content_file = content_dir.join("issue.json");
    if let Some(raw) = raw_content {
        std::fs::write(&content_file, raw).unwrap();
    }
    let config = SiteConfig {
        content_source: content_file.display().to_string(),
        content_url: "/content/issue.json".to_string(),
        content_dir: content_dir.display().to_string(),
        static_dir: static_dir.display().to_string(),
        ..SiteConfig::default()
    };
    (dir, config)
}

fn client(config: SiteConfig) -> Client {
    Client::tracked(crate::build(config)).expect("valid rocket instance")
}

fn parse(raw: &str) -> Result<crate::content::ContentDocument, ContentError> {
    parse_response(&RawResponse::ok(raw))
}

// ═══════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════

#[test]
fn full_issue_parses_every_section() {
    let doc = parse(FULL_ISSUE).unwrap();
    assert_eq!(doc.sections.present(), SectionKey::ALL.to_vec());

    let culture = doc.sections.culture.as_ref().unwrap();
    assert_eq!(culture.heading, "Night Markets");
    assert_eq!(culture.body, "Everything is for sale.");

    let lore = doc.sections.lore.as_ref().unwrap();
    assert_eq!(lore.heading, "Chapter 7: The Well");
    assert_eq!(lore.body, "It was deeper than before.");

    let interview = doc.sections.interview.as_ref().unwrap();
    assert_eq!(interview.exchanges.len(), 2);
    assert_eq!(interview.exchanges[1].answer, "Someone has to.");
    assert_eq!(doc.sections.visuals.as_ref().unwrap().len(), 2);
}

#[test]
fn prefix_and_suffix_noise_are_ignored() {
    let raw = "prefix-noise {\"sections\":{\"cover\":{\"title\":\"Issue 1\",\"blurb\":\"Welcome\"}}} suffix-noise";
    let doc = parse(raw).unwrap();
    assert_eq!(doc.sections.cover.unwrap().title, "Issue 1");
}

#[test]
fn heading_and_body_follow_field_precedence() {
    let raw = r#"{"sections":{"tech":{"chapter":"C","headline":"B","title":"A","text":"z","body":"y","article":"x"}}}"#;
    let tech = parse(raw).unwrap().sections.tech.unwrap();
    assert_eq!(tech.heading, "A");
    assert_eq!(tech.body, "x");

    let raw = r#"{"sections":{"tech":{"chapter":"C","headline":"B","text":"z","body":"y"}}}"#;
    let tech = parse(raw).unwrap().sections.tech.unwrap();
    assert_eq!(tech.heading, "B");
    assert_eq!(tech.body, "y");
}

#[test]
fn empty_heading_falls_through_to_next_field() {
    let raw = r#"{"sections":{"tech":{"title":"","headline":"Wetware","body":"Patch notes."}}}"#;
    let tech = parse(raw).unwrap().sections.tech.unwrap();
    assert_eq!(tech.heading, "Wetware");
    assert_eq!(tech.body, "Patch notes.");

    let raw = r#"{"sections":{"editorial":{"title":"","chapter":"Ch. 1","article":"","text":"x"}}}"#;
    let editorial = parse(raw).unwrap().sections.editorial.unwrap();
    assert_eq!(editorial.heading, "Ch. 1");
    assert_eq!(editorial.body, "x");
}

#[test]
fn article_with_only_empty_headings_is_rejected() {
    let raw = r#"{"sections":{"tech":{"title":"","headline":"","text":"x"}}}"#;
    assert!(matches!(parse(raw), Err(ContentError::Parse(_))));
}

#[test]
fn article_without_body_is_rejected() {
    let raw = r#"{"sections":{"editorial":{"title":"A"}}}"#;
    assert!(matches!(parse(raw), Err(ContentError::Parse(_))));
}

#[test]
fn wrong_section_shape_is_rejected() {
    let raw = r#"{"sections":{"ads":{"product":"single","copy":"not a list"}}}"#;
    assert!(matches!(parse(raw), Err(ContentError::Parse(_))));
}

// ═══════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════

#[test]
fn cover_example_renders_exactly() {
    let doc = parse(r#"{"sections":{"cover":{"title":"Issue 1","blurb":"Welcome"}}}"#).unwrap();
    let mut page = PageShell::standard();
    let report = render::render(&doc, &mut page);
    assert_eq!(report.written, vec![SectionKey::Cover]);
    assert_eq!(
        page.inner_html("cover"),
        Some("<div class=\"content-card\"><h1>Issue 1</h1><p>Welcome</p></div>")
    );
}

#[test]
fn render_writes_only_present_sections() {
    let doc = parse(r#"{"sections":{
        "cover":{"title":"T","blurb":"B"},
        "tech":{"title":"Wetware","article":"Patch notes."}
    }}"#)
    .unwrap();

    let mut page = PageShell::with_sections(&["cover", "tech", "culture", "colophon"]);
    page.set_inner_html("colophon", "<p>static</p>");

    let report = render::render(&doc, &mut page);
    assert_eq!(report.written, vec![SectionKey::Cover, SectionKey::Tech]);
    assert_eq!(report.missing, vec![SectionKey::Culture]);

    assert_eq!(page.slot("cover").unwrap().writes(), 1);
    assert_eq!(page.slot("tech").unwrap().writes(), 1);
    assert_eq!(
        page.inner_html("tech"),
        Some("<div class=\"content-card\"><h2>Wetware</h2><p>Patch notes.</p></div>")
    );
    // Target without content and unrelated element are untouched.
    assert_eq!(page.slot("culture").unwrap().writes(), 0);
    assert_eq!(page.inner_html("culture"), Some(""));
    assert_eq!(page.inner_html("colophon"), Some("<p>static</p>"));
    assert_eq!(page.slot("colophon").unwrap().writes(), 1);
}

#[test]
fn sections_without_targets_are_skipped() {
    let doc = parse(FULL_ISSUE).unwrap();
    let mut page = PageShell::with_sections(&["ads"]);
    let report = render::render(&doc, &mut page);
    assert_eq!(report.written, vec![SectionKey::Ads]);
    assert!(report.missing.is_empty());
    let ads = page.inner_html("ads").unwrap();
    assert!(ads.starts_with("<div class=\"ads-container\">"));
    assert_eq!(ads.matches("class=\"ad-card\"").count(), 2);
}

#[test]
fn full_issue_uses_expected_heading_levels() {
    let doc = parse(FULL_ISSUE).unwrap();
    let mut page = PageShell::standard();
    render::render(&doc, &mut page);

    assert!(page.inner_html("editorial").unwrap().contains("<h1>From the Desk</h1>"));
    assert!(page.inner_html("culture").unwrap().contains("<h2>Night Markets</h2>"));
    assert!(page.inner_html("lore").unwrap().contains("<h2>Chapter 7: The Well</h2>"));
    assert!(page.inner_html("cover").unwrap().contains("<p>Hex &amp; the city</p>"));
    assert!(page.inner_html("interview").unwrap().contains("<h2>Interview with The Archivist</h2>"));
    assert!(page.inner_html("visuals").unwrap().contains("<h2>Visual Prompts</h2>"));
    assert!(page.slots().iter().all(|s| s.writes() == 1));
}

#[test]
fn render_error_covers_every_section() {
    let mut page = PageShell::with_sections(&["cover", "tech", "colophon"]);
    render::render_error(&mut page);
    for slot in page.slots() {
        assert_eq!(slot.inner_html, ERROR_FRAGMENT);
    }
}

// ═══════════════════════════════════════════════════════════
// Load cycle
// ═══════════════════════════════════════════════════════════

fn assert_uniform_error(page: &PageShell) {
    for slot in page.slots() {
        assert_eq!(slot.inner_html, ERROR_FRAGMENT, "slot {} was partially rendered", slot.id);
        assert_eq!(slot.writes(), 1);
    }
}

#[rocket::async_test]
async fn missing_file_shows_error_everywhere() {
    let (_dir, config) = test_site(None);
    let mut page = PageShell::standard();
    let result = render::load_and_render(&config.source().unwrap(), Duration::from_secs(1), &mut page).await;
    assert!(matches!(result, Err(ContentError::Fetch { status: Some(404), .. })));
    assert_uniform_error(&page);
}

#[rocket::async_test]
async fn truncated_json_shows_same_error_as_fetch_failure() {
    let truncated = &FULL_ISSUE[..FULL_ISSUE.find("\"ads\"").unwrap()];
    let (_dir, config) = test_site(Some(truncated));
    let mut page = PageShell::standard();
    let result = render::load_and_render(&config.source().unwrap(), Duration::from_secs(1), &mut page).await;
    assert!(matches!(result, Err(ContentError::Parse(_))));
    assert_uniform_error(&page);
}

#[rocket::async_test]
async fn successful_load_writes_each_target_once() {
    let (_dir, config) = test_site(Some(FULL_ISSUE));
    let mut page = PageShell::standard();
    let (doc, report) = render::load_and_render(&config.source().unwrap(), Duration::from_secs(1), &mut page)
        .await
        .unwrap();
    assert_eq!(report.written.len(), 8);
    assert_eq!(doc.sections.cover.unwrap().title, "Maleficarum");
    assert!(page.slots().iter().all(|s| s.writes() == 1 && s.inner_html != ERROR_FRAGMENT));
}

#[rocket::async_test]
async fn unreachable_remote_source_is_fetch_error() {
    // Port 9 (discard) on localhost is closed on test machines.
    let source = ContentSource::parse("http://127.0.0.1:9/issue.json").unwrap();
    let mut page = PageShell::standard();
    let result = render::load_and_render(&source, Duration::from_secs(2), &mut page).await;
    assert!(matches!(result, Err(ContentError::Fetch { .. })));
    assert_uniform_error(&page);
}

// ═══════════════════════════════════════════════════════════
// Routes
// ═══════════════════════════════════════════════════════════

#[test]
fn issue_page_renders_content_into_slots() {
    let (_dir, config) = test_site(Some(FULL_ISSUE));
    let client = client(config);
    let resp = client.get("/").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let body = resp.into_string().unwrap();

    assert!(body.contains(
        "<section id=\"cover\" class=\"blog-section\"><div class=\"content-card\"><h1>Maleficarum</h1><p>Hex &amp; the city</p></div></section>"
    ));
    assert!(body.contains("<a href=\"#interview\" class=\"nav-link\">Interview</a>"));
    assert!(body.contains("<main id=\"main-content\" class=\"issue\">"));
    assert!(body.contains("data-threshold=\"0.5\""));
    assert!(body.contains("data-parallax=\"0.2\""));
    assert!(body.contains("<title>Maleficarum — Holozine</title>"));
    assert!(!body.contains(ERROR_FRAGMENT));
    // Default variant is holographic.
    assert!(body.contains("three.min.js"));
    assert!(body.contains("id=\"audio-toggle\""));
}

#[test]
fn issue_page_renders_prose_with_empty_title() {
    let raw = r#"{"sections":{"cover":{"title":"Issue 1","blurb":"Welcome"},"tech":{"title":"","headline":"Wetware","body":"Patch notes."}}}"#;
    let (_dir, config) = test_site(Some(raw));
    let client = client(config);
    let body = client.get("/").dispatch().into_string().unwrap();
    assert!(body.contains("<h2>Wetware</h2><p>Patch notes.</p>"));
    assert!(body.contains("<h1>Issue 1</h1>"));
    assert!(!body.contains(ERROR_FRAGMENT));
}

#[test]
fn issue_page_variant_query() {
    let (_dir, config) = test_site(Some(FULL_ISSUE));
    let client = client(config);

    let minimal = client.get("/?variant=minimal").dispatch().into_string().unwrap();
    assert!(minimal.contains("data-variant=\"minimal\""));
    assert!(!minimal.contains("three.min.js"));
    assert!(minimal.contains("<h1>Maleficarum</h1>"));

    let unknown = client.get("/?variant=neon").dispatch().into_string().unwrap();
    assert!(unknown.contains("data-variant=\"holographic\""));
}

#[test]
fn issue_page_with_missing_content_shows_error_in_every_section() {
    let (_dir, config) = test_site(None);
    let client = client(config);
    let body = client.get("/").dispatch().into_string().unwrap();
    assert_eq!(body.matches(ERROR_FRAGMENT).count(), SectionKey::ALL.len());
    assert!(!body.contains("<h1>Maleficarum</h1>"));
}

#[test]
fn section_route() {
    let (_dir, config) = test_site(Some(r#"{"sections":{"cover":{"title":"Issue 1","blurb":"Welcome"}}}"#));
    let client = client(config);

    let resp = client.get("/section/cover").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert_eq!(
        resp.into_string().unwrap(),
        "<div class=\"content-card\"><h1>Issue 1</h1><p>Welcome</p></div>"
    );

    assert_eq!(client.get("/section/tech").dispatch().status(), Status::NotFound);
    assert_eq!(client.get("/section/sidebar").dispatch().status(), Status::NotFound);
}

#[test]
fn section_route_on_load_failure_returns_error_fragment() {
    let (_dir, config) = test_site(Some("no json here"));
    let client = client(config);
    let resp = client.get("/section/tech").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert_eq!(resp.into_string().unwrap(), ERROR_FRAGMENT);
}

#[test]
fn content_api() {
    let (_dir, config) = test_site(Some(FULL_ISSUE));
    let client = client(config);
    let resp = client.get("/api/content").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let json: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(json["sections"]["cover"]["title"], "Maleficarum");
    assert_eq!(json["sections"]["lore_serial"]["title"], "Chapter 7: The Well");
    assert!(json["sections"].get("colophon").is_none());
}

#[test]
fn content_api_reports_failure() {
    let (_dir, config) = test_site(None);
    let client = client(config);
    let resp = client.get("/api/content").dispatch();
    assert_eq!(resp.status(), Status::BadGateway);
    let json: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(json["ok"], false);
    assert!(json["error"].as_str().unwrap().contains("404"));
}

#[test]
fn raw_content_file_is_served() {
    let (_dir, config) = test_site(Some(FULL_ISSUE));
    let client = client(config);
    let resp = client.get("/content/issue.json").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert_eq!(resp.into_string().unwrap(), FULL_ISSUE);
}

#[test]
fn health_route() {
    let (_dir, config) = test_site(Some(FULL_ISSUE));
    let client = client(config);
    let resp = client.get("/health").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let json: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["content"]["status"], "ok");
    assert_eq!(json["content"]["sections"].as_array().unwrap().len(), 8);
}

#[test]
fn unknown_path_uses_catcher() {
    let (_dir, config) = test_site(Some(FULL_ISSUE));
    let client = client(config);
    let resp = client.get("/no/such/page").dispatch();
    assert_eq!(resp.status(), Status::NotFound);
    assert!(resp.into_string().unwrap().contains("Page not found."));
}

#[test]
fn shipped_sample_issue_parses() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("website/content/maleficarum.json");
    let raw = std::fs::read_to_string(path).unwrap();
    let doc = parse(&raw).unwrap();
    assert_eq!(doc.sections.present(), SectionKey::ALL.to_vec());
}
