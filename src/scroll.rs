use std::collections::HashMap;

use log::debug;

use crate::content::SectionKey;

/// Capability the coordinator uses to tint the background for the section
/// in view. Passed in explicitly; the coordinator never looks it up.
pub trait VisualReactor {
    fn set_color(&mut self, key: SectionKey);
}

/// For presentation variants without a background effect.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReactor;

impl VisualReactor for NoopReactor {
    fn set_color(&mut self, _key: SectionKey) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

/// One intersection observation: the fraction of a section inside the
/// scroll container.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub id: String,
    pub ratio: f64,
}

impl IntersectionEntry {
    pub fn new(id: &str, ratio: f64) -> Self {
        IntersectionEntry { id: id.to_string(), ratio }
    }
}

/// Geometry read once per animation frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub scroll_top: f64,
    /// Section id → the section's offset from the container top.
    pub section_tops: HashMap<String, f64>,
}

/// Vertical translation to apply to a section's card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardOffset {
    pub id: String,
    pub offset_px: f64,
}

#[derive(Debug, Clone)]
struct SectionState {
    id: String,
    visibility: Visibility,
    highlighted: bool,
}

#[derive(Debug, Clone)]
struct NavEntry {
    target: String,
    active: bool,
}

/// Tracks which sections are on screen, which navigation entry is active,
/// and coalesces scroll-driven parallax work to one pass per frame.
#[derive(Debug)]
pub struct ScrollCoordinator<R: VisualReactor> {
    sections: Vec<SectionState>,
    nav: Vec<NavEntry>,
    reactor: R,
    threshold: f64,
    parallax_factor: f64,
    frame_pending: bool,
    recomputes: u64,
}

impl<R: VisualReactor> ScrollCoordinator<R> {
    /// One navigation entry is created per section, pointing at `#id`.
    pub fn new(section_ids: &[String], reactor: R, threshold: f64, parallax_factor: f64) -> Self {
        ScrollCoordinator {
            sections: section_ids
                .iter()
                .map(|id| SectionState {
                    id: id.clone(),
                    visibility: Visibility::Hidden,
                    highlighted: false,
                })
                .collect(),
            nav: section_ids
                .iter()
                .map(|id| NavEntry { target: id.clone(), active: false })
                .collect(),
            reactor,
            threshold,
            parallax_factor,
            frame_pending: false,
            recomputes: 0,
        }
    }

    /// Apply a batch of observations in order.
    pub fn on_intersection(&mut self, entries: &[IntersectionEntry]) {
        for entry in entries {
            if entry.ratio >= self.threshold {
                self.enter(&entry.id);
            } else {
                self.exit(&entry.id);
            }
        }
    }

    fn enter(&mut self, id: &str) {
        let Some(section) = self.sections.iter_mut().find(|s| s.id == id) else {
            return;
        };
        if section.visibility == Visibility::Hidden {
            debug!("Section {} visible", id);
        }
        section.visibility = Visibility::Visible;
        section.highlighted = true;

        for nav in self.nav.iter_mut() {
            nav.active = false;
        }
        if let Some(nav) = self.nav.iter_mut().find(|n| n.target == id) {
            nav.active = true;
        }

        if let Some(key) = SectionKey::from_id(id) {
            self.reactor.set_color(key);
        }
    }

    /// Leaving view reverses visibility and highlight only; the active
    /// navigation entry changes on the next entry.
    fn exit(&mut self, id: &str) {
        let Some(section) = self.sections.iter_mut().find(|s| s.id == id) else {
            return;
        };
        if section.visibility == Visibility::Visible {
            debug!("Section {} hidden", id);
        }
        section.visibility = Visibility::Hidden;
        section.highlighted = false;
    }

    /// Returns true when the caller must schedule an animation frame. A
    /// scroll while a frame is already pending is dropped.
    pub fn on_scroll(&mut self) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Run the pending parallax pass. Frames that were not requested by
    /// `on_scroll` do nothing.
    pub fn on_frame(&mut self, layout: &Layout) -> Vec<CardOffset> {
        if !self.frame_pending {
            return Vec::new();
        }
        self.frame_pending = false;
        self.recomputes += 1;

        self.sections
            .iter()
            .filter_map(|s| {
                let top = layout.section_tops.get(&s.id)?;
                Some(CardOffset {
                    id: s.id.clone(),
                    offset_px: (layout.scroll_top - top) * self.parallax_factor,
                })
            })
            .collect()
    }

    pub fn visibility(&self, id: &str) -> Option<Visibility> {
        self.sections.iter().find(|s| s.id == id).map(|s| s.visibility)
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s.id == id && s.highlighted)
    }

    pub fn active_nav(&self) -> Option<&str> {
        self.nav.iter().find(|n| n.active).map(|n| n.target.as_str())
    }

    pub fn active_nav_count(&self) -> usize {
        self.nav.iter().filter(|n| n.active).count()
    }

    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn reactor(&self) -> &R {
        &self.reactor
    }
}

/// Browser side of the coordinator. Reads its settings from the `<body>`
/// data attributes and receives the reactor from the effect bootstrap.
pub const CLIENT_JS: &str = r##"
function startCoordinator(opts, reactor) {
    var container = document.getElementById(opts.container);
    var sections = document.querySelectorAll('.blog-section');
    var navLinks = document.querySelectorAll('.nav-link');
    var threshold = parseFloat(opts.threshold);
    var factor = parseFloat(opts.parallax);
    if (isNaN(threshold)) threshold = 0.5;
    if (isNaN(factor)) factor = 0.2;
    if (!container || !sections.length) return;

    if ('IntersectionObserver' in window) {
        var observer = new IntersectionObserver(function(entries) {
            entries.forEach(function(entry) {
                var card = entry.target.querySelector('.content-card');
                if (entry.isIntersecting && entry.intersectionRatio >= threshold) {
                    entry.target.classList.add('visible');
                    if (card) card.classList.add('active');
                    navLinks.forEach(function(link) { link.classList.remove('active'); });
                    var link = document.querySelector('.nav-link[href="#' + entry.target.id + '"]');
                    if (link) link.classList.add('active');
                    reactor.setColor(entry.target.id);
                } else {
                    entry.target.classList.remove('visible');
                    if (card) card.classList.remove('active');
                }
            });
        }, { root: container, threshold: threshold });
        sections.forEach(function(section) { observer.observe(section); });
    } else {
        sections.forEach(function(section) { section.classList.add('visible'); });
    }

    var ticking = false;
    container.addEventListener('scroll', function() {
        if (ticking) return;
        ticking = true;
        window.requestAnimationFrame(function() {
            var scrollTop = container.scrollTop;
            sections.forEach(function(section) {
                var card = section.querySelector('.content-card');
                if (!card) return;
                var offset = (scrollTop - section.offsetTop) * factor;
                card.style.setProperty('--parallax', offset + 'px');
            });
            ticking = false;
        });
    }, { passive: true });
}
"##;
