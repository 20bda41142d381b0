use crate::content::SectionKey;

/// The DOM surface the renderer writes into: elements addressed by id, plus
/// the set of all `.blog-section` elements used for the error state.
pub trait RenderTargets {
    fn has_target(&self, id: &str) -> bool;

    /// Replace the inner HTML of the element with `id`. Returns false when
    /// no such element exists.
    fn set_inner_html(&mut self, id: &str, html: &str) -> bool;

    /// Ids of every `.blog-section` element, in document order.
    fn section_ids(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub id: String,
    pub label: String,
    pub inner_html: String,
    writes: u32,
}

impl Slot {
    fn new(id: &str, label: &str) -> Self {
        Slot {
            id: id.to_string(),
            label: label.to_string(),
            inner_html: String::new(),
            writes: 0,
        }
    }

    /// How many times this slot was written since the shell was built.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

/// Server-side stand-in for the page's section elements. A fresh shell is
/// built for every page request, so each load cycle starts unwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct PageShell {
    slots: Vec<Slot>,
}

impl PageShell {
    /// One slot per known section key, in page order.
    pub fn standard() -> Self {
        PageShell {
            slots: SectionKey::ALL
                .iter()
                .map(|k| Slot::new(k.id(), k.nav_label()))
                .collect(),
        }
    }

    /// A shell with only the given section ids. Ids that are not section
    /// keys are still `.blog-section` elements and get the error state.
    pub fn with_sections(ids: &[&str]) -> Self {
        PageShell {
            slots: ids
                .iter()
                .map(|id| {
                    let label: &str = SectionKey::from_id(id).map(|k| k.nav_label()).unwrap_or(*id);
                    Slot::new(id, label)
                })
                .collect(),
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn inner_html(&self, id: &str) -> Option<&str> {
        self.slot(id).map(|s| s.inner_html.as_str())
    }
}

impl Default for PageShell {
    fn default() -> Self {
        Self::standard()
    }
}

impl RenderTargets for PageShell {
    fn has_target(&self, id: &str) -> bool {
        self.slot(id).is_some()
    }

    fn set_inner_html(&mut self, id: &str, html: &str) -> bool {
        match self.slots.iter_mut().find(|s| s.id == id) {
            Some(slot) => {
                slot.inner_html = html.to_string();
                slot.writes += 1;
                true
            }
            None => false,
        }
    }

    fn section_ids(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.id.clone()).collect()
    }
}
