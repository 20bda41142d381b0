pub mod fetch;

use serde::{Deserialize, Serialize};

pub use fetch::{extract_json, load, parse_response, ContentSource, RawResponse};

// ── Section keys ───────────────────────────────────────

/// One content slot on the issue page. The order of `ALL` is the page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKey {
    Cover,
    Editorial,
    Culture,
    Tech,
    Interview,
    Ads,
    Lore,
    Visuals,
}

impl SectionKey {
    pub const ALL: [SectionKey; 8] = [
        SectionKey::Cover,
        SectionKey::Editorial,
        SectionKey::Culture,
        SectionKey::Tech,
        SectionKey::Interview,
        SectionKey::Ads,
        SectionKey::Lore,
        SectionKey::Visuals,
    ];

    /// DOM id of the render target for this section.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Editorial => "editorial",
            Self::Culture => "culture",
            Self::Tech => "tech",
            Self::Interview => "interview",
            Self::Ads => "ads",
            Self::Lore => "lore",
            Self::Visuals => "visuals",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id.trim())
    }

    /// Label shown in the navigation rail.
    pub fn nav_label(&self) -> &'static str {
        match self {
            Self::Cover => "Cover",
            Self::Editorial => "Editorial",
            Self::Culture => "Culture",
            Self::Tech => "Tech",
            Self::Interview => "Interview",
            Self::Ads => "Classifieds",
            Self::Lore => "Serial",
            Self::Visuals => "Visuals",
        }
    }
}

impl std::fmt::Display for SectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

// ── Errors ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ContentError {
    /// The source answered with a non-success status, or could not be
    /// reached at all (`status` is `None`).
    Fetch { status: Option<u16>, reason: String },
    /// No well-formed JSON object could be isolated from the body.
    Parse(String),
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch { status: Some(status), reason } => {
                write!(f, "HTTP error! status: {} ({})", status, reason)
            }
            Self::Fetch { status: None, reason } => write!(f, "content request failed: {}", reason),
            Self::Parse(msg) => write!(f, "content parse error: {}", msg),
        }
    }
}

impl std::error::Error for ContentError {}

// ── Document model ─────────────────────────────────────

/// The parsed content payload. Created once per page load and never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub sections: Sections,
}

/// Every known section, each with its own record type. Unknown keys in the
/// source are ignored; a present key with the wrong shape is a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<CoverRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editorial: Option<ArticleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<ArticleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech: Option<ArticleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview: Option<InterviewRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ads: Option<Vec<AdRecord>>,
    #[serde(rename = "lore_serial", alias = "lore", default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<ArticleRecord>,
    #[serde(rename = "visual_prompts", alias = "visuals", default, skip_serializing_if = "Option::is_none")]
    pub visuals: Option<Vec<String>>,
}

impl Sections {
    pub fn contains(&self, key: SectionKey) -> bool {
        match key {
            SectionKey::Cover => self.cover.is_some(),
            SectionKey::Editorial => self.editorial.is_some(),
            SectionKey::Culture => self.culture.is_some(),
            SectionKey::Tech => self.tech.is_some(),
            SectionKey::Interview => self.interview.is_some(),
            SectionKey::Ads => self.ads.is_some(),
            SectionKey::Lore => self.lore.is_some(),
            SectionKey::Visuals => self.visuals.is_some(),
        }
    }

    /// Keys present in the document, in page order.
    pub fn present(&self) -> Vec<SectionKey> {
        SectionKey::ALL
            .iter()
            .copied()
            .filter(|k| self.contains(*k))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverRecord {
    pub title: String,
    pub blurb: String,
}

/// Heading + body for the prose sections (editorial, culture, tech, lore).
///
/// Source files name these fields differently per section. The heading is
/// the first non-empty of `title`, `headline`, `chapter`; the body is the
/// first non-empty of `article`, `body`, `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArticle")]
pub struct ArticleRecord {
    #[serde(rename = "title")]
    pub heading: String,
    #[serde(rename = "article")]
    pub body: String,
}

/// Prose record as written in the source, before field precedence applies.
#[derive(Debug, Default, Deserialize)]
struct RawArticle {
    title: Option<String>,
    headline: Option<String>,
    chapter: Option<String>,
    article: Option<String>,
    body: Option<String>,
    text: Option<String>,
}

fn first_non_empty(candidates: [Option<String>; 3]) -> Option<String> {
    candidates.into_iter().flatten().find(|s| !s.trim().is_empty())
}

impl TryFrom<RawArticle> for ArticleRecord {
    type Error = String;

    fn try_from(raw: RawArticle) -> Result<Self, Self::Error> {
        let heading = first_non_empty([raw.title, raw.headline, raw.chapter])
            .ok_or_else(|| "prose section has no title, headline or chapter".to_string())?;
        let body = first_non_empty([raw.article, raw.body, raw.text])
            .ok_or_else(|| "prose section has no article, body or text".to_string())?;
        Ok(ArticleRecord { heading, body })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub subject: String,
    #[serde(rename = "q_and_a", default)]
    pub exchanges: Vec<QaPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    #[serde(rename = "Q", alias = "q")]
    pub question: String,
    #[serde(rename = "A", alias = "a")]
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    pub product: String,
    pub copy: String,
}
