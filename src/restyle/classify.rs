//! Paragraph role classification.
//!
//! Roles derive from the paragraph's style label plus a small amount of
//! state carried across paragraphs: whether the scan is inside the
//! references section, and whether a conclusion heading has been seen.
//! Converters emit bibliography entries as ordinary body text, so the
//! region state is what tells a reference entry apart from a paragraph.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::{normalize_label, Paragraph, StyleSheet};

static CAPTION_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(Figure|Fig\.|Table|图|表)\s*\d").unwrap());
static BIB_ENTRY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z].*\(\d{4}").unwrap());

/// Label used for paragraphs without a style.
pub const NORMAL_LABEL: &str = "normal";

const CAPTION_LABELS: &[&str] = &["caption", "imagecaption", "tablecaption"];
const GENERIC_BODY_LABELS: &[&str] = &["bodytext", "firstparagraph"];

/// Semantic role of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Document title
    Title,
    /// Author or date line under the title
    AuthorDate,
    /// The "Abstract" heading
    AbstractHeading,
    /// Abstract text
    AbstractBody,
    /// Section heading with its level (1 when the label has no digit)
    Heading(u8),
    /// Bibliography entry
    Reference,
    /// Ordinary body paragraph
    Body,
    /// Figure or table caption
    Caption,
}

/// Which part of the document the scan is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    /// Main text
    #[default]
    Body,
    /// Reference list
    References,
}

/// Region state machine driven one paragraph at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionTracker {
    region: Region,
    seen_conclusion: bool,
}

impl RegionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn seen_conclusion(&self) -> bool {
        self.seen_conclusion
    }

    /// Advance the state for a paragraph and return the region it falls in.
    pub fn observe(&mut self, label: &str, text: &str) -> Region {
        if is_heading_label(label) {
            let lower = text.to_lowercase();
            if lower.contains("conclusion") {
                self.seen_conclusion = true;
                self.region = Region::Body;
            } else if lower.contains("reference") || lower.contains("bibliography") {
                self.region = Region::References;
            } else {
                self.region = Region::Body;
            }
        } else if self.seen_conclusion
            && self.region == Region::Body
            && is_generic_body_label(label)
            && is_bib_entry(text)
        {
            // Reference list under a heading the engine did not style.
            self.region = Region::References;
        }
        self.region
    }
}

/// Heading labels start with `heading`.
pub fn is_heading_label(label: &str) -> bool {
    label.starts_with("heading")
}

/// Trailing digit of a heading label, 1 when absent.
pub fn heading_level(label: &str) -> u8 {
    label
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .filter(|d| *d > 0)
        .map(|d| d as u8)
        .unwrap_or(1)
}

pub fn is_caption_label(label: &str) -> bool {
    CAPTION_LABELS.contains(&label)
}

pub fn is_generic_body_label(label: &str) -> bool {
    GENERIC_BODY_LABELS.contains(&label)
}

/// Text opening with a figure or table number, in English or Chinese.
pub fn is_caption_text(text: &str) -> bool {
    CAPTION_TEXT_RE.is_match(text)
}

/// Text shaped like an author-year bibliography entry.
pub fn is_bib_entry(text: &str) -> bool {
    BIB_ENTRY_RE.is_match(text)
}

/// Whether a paragraph is a caption by label or by text.
pub fn is_caption(label: &str, text: &str) -> bool {
    is_caption_label(label) || is_caption_text(text)
}

/// Resolves style ids to normalized labels, reporting each unknown id once.
#[derive(Debug, Default)]
pub struct LabelResolver {
    reported: HashSet<String>,
}

impl LabelResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &mut self,
        styles: &StyleSheet,
        style_id: Option<&str>,
        diagnostics: &mut Diagnostics,
    ) -> String {
        let Some(id) = style_id else {
            return NORMAL_LABEL.to_string();
        };
        match styles.label_for(id) {
            Some(label) => label,
            None => {
                if !styles.is_empty() && self.reported.insert(id.to_string()) {
                    diagnostics.push(
                        DiagnosticKind::MissingStyle,
                        format!("paragraph style '{}' is not defined", id),
                    );
                }
                normalize_label(id)
            }
        }
    }
}

/// Role for a label and text given the current region.
///
/// Caption detection is not part of this mapping; see [`is_caption`].
pub fn role_for(label: &str, region: Region) -> Role {
    match label {
        "title" => Role::Title,
        "author" | "date" => Role::AuthorDate,
        "abstracttitle" => Role::AbstractHeading,
        "abstract" => Role::AbstractBody,
        l if is_heading_label(l) => Role::Heading(heading_level(l)),
        l if region == Region::References && is_generic_body_label(l) => Role::Reference,
        _ => Role::Body,
    }
}

/// Stateful classifier over a sequence of paragraphs.
#[derive(Debug, Default)]
pub struct Classifier {
    tracker: RegionTracker,
    labels: LabelResolver,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: continue with an existing label cache.
    pub fn with_labels(mut self, labels: LabelResolver) -> Self {
        self.labels = labels;
        self
    }

    /// Hand the label cache back so later passes report each missing style once.
    pub fn into_labels(self) -> LabelResolver {
        self.labels
    }

    /// Label of a paragraph's style.
    pub fn label(
        &mut self,
        styles: &StyleSheet,
        paragraph: &Paragraph,
        diagnostics: &mut Diagnostics,
    ) -> String {
        self.labels
            .resolve(styles, paragraph.properties.style.as_deref(), diagnostics)
    }

    /// Classify the next paragraph in document order.
    pub fn classify(
        &mut self,
        styles: &StyleSheet,
        paragraph: &Paragraph,
        diagnostics: &mut Diagnostics,
    ) -> Role {
        let label = self.label(styles, paragraph, diagnostics);
        let text = paragraph.text();
        let text = text.trim();
        let region = self.tracker.observe(&label, text);
        if is_caption(&label, text) {
            return Role::Caption;
        }
        role_for(&label, region)
    }

    pub fn tracker(&self) -> &RegionTracker {
        &self.tracker
    }
}
