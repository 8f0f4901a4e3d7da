//! Paragraph and run-level types.

use super::units;
use super::Element;
use serde::{Deserialize, Serialize};

/// A paragraph (`w:p`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Paragraph properties (`w:pPr`)
    pub properties: ParagraphProperties,

    /// Inline content in document order
    pub content: Vec<InlineContent>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph holding one plain run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Builder: set the paragraph style id.
    pub fn with_style(mut self, style_id: impl Into<String>) -> Self {
        self.properties.style = Some(style_id.into());
        self
    }

    /// Append a plain text run.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.content.push(InlineContent::Run(Run::text(text)));
    }

    /// Append a run.
    pub fn add_run(&mut self, run: Run) {
        self.content.push(InlineContent::Run(run));
    }

    /// Visible text of runs and hyperlinks; math is excluded.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.content {
            match item {
                InlineContent::Run(run) => run.collect_text(&mut out),
                InlineContent::Hyperlink(link) => {
                    for run in &link.runs {
                        run.collect_text(&mut out);
                    }
                }
                InlineContent::Math(_) | InlineContent::Other(_) => {}
            }
        }
        out
    }

    /// Number of runs, counting those inside hyperlinks.
    pub fn run_count(&self) -> usize {
        self.content
            .iter()
            .map(|c| match c {
                InlineContent::Run(_) => 1,
                InlineContent::Hyperlink(link) => link.runs.len(),
                _ => 0,
            })
            .sum()
    }

    /// All runs, including those inside hyperlinks, in document order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().flat_map(|c| {
            let runs: &[Run] = match c {
                InlineContent::Run(run) => std::slice::from_ref(run),
                InlineContent::Hyperlink(link) => &link.runs,
                _ => &[],
            };
            runs.iter()
        })
    }

    /// All runs mutably, including those inside hyperlinks.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.content.iter_mut().flat_map(|c| {
            let runs: &mut [Run] = match c {
                InlineContent::Run(run) => std::slice::from_mut(run),
                InlineContent::Hyperlink(link) => &mut link.runs,
                _ => &mut [],
            };
            runs.iter_mut()
        })
    }

    /// Check whether any run carries a drawing.
    pub fn has_drawing(&self) -> bool {
        self.runs().any(Run::has_drawing)
            || self.content.iter().any(|c| match c {
                InlineContent::Other(el) => el.contains("w:drawing") || el.contains("w:pict"),
                _ => false,
            })
    }

    /// Check whether the paragraph holds a display-math container.
    pub fn has_display_math(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, InlineContent::Math(el) if el.contains("m:oMathPara")))
    }

    /// Check for any non-text payload: drawings, math, or embedded objects.
    pub fn has_embedded_object(&self) -> bool {
        self.has_drawing()
            || self.content.iter().any(|c| match c {
                InlineContent::Math(_) => true,
                InlineContent::Other(el) => el.contains("w:object") || el.contains("m:oMath"),
                _ => false,
            })
            || self.runs().any(|r| {
                r.content
                    .iter()
                    .any(|rc| matches!(rc, RunContent::Other(el) if el.contains("w:object") || el.contains("w:pict")))
            })
    }

    /// Check whether the paragraph has no visible text and no embedded object.
    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty() && !self.has_embedded_object()
    }
}

/// Inline content within a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineContent {
    /// A text run
    Run(Run),

    /// A hyperlink wrapping runs
    Hyperlink(Hyperlink),

    /// An Office Math container (`m:oMath` or `m:oMathPara`)
    Math(Element),

    /// Anything else (bookmarks, fields, content controls, ...)
    Other(Element),
}

/// A hyperlink (`w:hyperlink`) whose children are all runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hyperlink {
    /// Raw attributes (`r:id`, `w:anchor`, ...)
    pub attributes: Vec<(String, String)>,

    /// Wrapped runs
    pub runs: Vec<Run>,
}

/// A run of content with shared formatting (`w:r`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Run properties (`w:rPr`)
    pub properties: RunProperties,

    /// Run children in document order
    pub content: Vec<RunContent>,
}

impl Run {
    /// Create a new empty run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a run holding one text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            properties: RunProperties::default(),
            content: vec![RunContent::Text(text.into())],
        }
    }

    /// Builder: append run content.
    pub fn with(mut self, item: RunContent) -> Self {
        self.content.push(item);
        self
    }

    /// Builder: replace the properties.
    pub fn with_properties(mut self, properties: RunProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Visible text of this run.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for item in &self.content {
            match item {
                RunContent::Text(t) => out.push_str(t),
                RunContent::Tab => out.push('\t'),
                RunContent::Break(kind) => {
                    if kind.as_deref().map_or(true, |k| k == "textWrapping") {
                        out.push('\n');
                    }
                }
                _ => {}
            }
        }
    }

    /// Check whether this run carries a drawing.
    pub fn has_drawing(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, RunContent::Drawing(_)))
    }
}

/// Content inside a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RunContent {
    /// Text (`w:t`)
    Text(String),
    /// Tab character (`w:tab`)
    Tab,
    /// Break (`w:br`) with optional `w:type`
    Break(Option<String>),
    /// Inline or anchored drawing (`w:drawing`)
    Drawing(Element),
    /// Complex field marker (`w:fldChar`)
    FieldChar(FieldCharType),
    /// Field instruction (`w:instrText`)
    InstrText(String),
    /// Anything else
    Other(Element),
}

/// Complex field marker kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCharType {
    /// Field start
    Begin,
    /// Separator between instruction and cached result
    Separate,
    /// Field end
    End,
}

impl FieldCharType {
    /// Attribute value used in `w:fldCharType`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCharType::Begin => "begin",
            FieldCharType::Separate => "separate",
            FieldCharType::End => "end",
        }
    }

    /// Parse a `w:fldCharType` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "begin" => Some(FieldCharType::Begin),
            "separate" => Some(FieldCharType::Separate),
            "end" => Some(FieldCharType::End),
            _ => None,
        }
    }
}

/// Run formatting (`w:rPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    /// Character style id (`w:rStyle`)
    pub style: Option<String>,

    /// Font families (`w:rFonts`)
    pub fonts: Option<FontSet>,

    /// Bold (`w:b`)
    pub bold: Option<bool>,

    /// Italic (`w:i`)
    pub italic: Option<bool>,

    /// Hex color without `#` (`w:color`)
    pub color: Option<String>,

    /// Theme attributes that accompanied `w:color`
    pub color_theme: Vec<(String, String)>,

    /// Size in half-points (`w:sz`)
    pub size: Option<u32>,

    /// Uninterpreted property elements
    pub extra: Vec<Element>,
}

impl RunProperties {
    /// Check whether no property is set.
    pub fn is_empty(&self) -> bool {
        self.style.is_none()
            && self.fonts.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.color.is_none()
            && self.size.is_none()
            && self.extra.is_empty()
    }

    /// Primary (ASCII) font family.
    pub fn font_name(&self) -> Option<&str> {
        self.fonts.as_ref().and_then(|f| f.ascii.as_deref())
    }

    /// Set the primary font and its East-Asian fallback.
    pub fn set_font(&mut self, font: &str, east_asia: &str) {
        let fonts = self.fonts.get_or_insert_with(FontSet::default);
        fonts.ascii = Some(font.to_string());
        fonts.h_ansi = Some(font.to_string());
        fonts.east_asia = Some(east_asia.to_string());
        // Theme fonts take precedence over explicit families when present.
        fonts
            .other
            .retain(|(k, _)| !matches!(k.as_str(), "w:asciiTheme" | "w:hAnsiTheme" | "w:eastAsiaTheme"));
    }

    /// Size in points.
    pub fn size_pt(&self) -> Option<f32> {
        self.size.map(|hp| hp as f32 / 2.0)
    }

    /// Set the size in points.
    pub fn set_size_pt(&mut self, pt: f32) {
        self.size = Some(units::pt_to_half_points(pt));
    }

    /// Set an explicit color, dropping theme color attributes.
    pub fn set_color(&mut self, hex: &str) {
        self.color = Some(hex.to_string());
        self.color_theme.clear();
    }
}

/// Font families of a run (`w:rFonts`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSet {
    /// `w:ascii`
    pub ascii: Option<String>,
    /// `w:hAnsi`
    pub h_ansi: Option<String>,
    /// `w:eastAsia`
    pub east_asia: Option<String>,
    /// `w:cs`
    pub cs: Option<String>,
    /// Other attributes (theme fonts, hints)
    pub other: Vec<(String, String)>,
}

/// Paragraph formatting (`w:pPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProperties {
    /// Paragraph style id (`w:pStyle`)
    pub style: Option<String>,

    /// Widow/orphan control (`w:widowControl`)
    pub widow_control: Option<bool>,

    /// Custom tab stops (`w:tabs`)
    pub tabs: Vec<TabStop>,

    /// Line and paragraph spacing (`w:spacing`)
    pub spacing: Option<Spacing>,

    /// Indentation (`w:ind`)
    pub indent: Option<Indent>,

    /// Justification (`w:jc`)
    pub alignment: Option<Alignment>,

    /// Uninterpreted property elements
    pub extra: Vec<Element>,
}

impl ParagraphProperties {
    /// Check whether no property is set.
    pub fn is_empty(&self) -> bool {
        self.style.is_none()
            && self.widow_control.is_none()
            && self.tabs.is_empty()
            && self.spacing.is_none()
            && self.indent.is_none()
            && self.alignment.is_none()
            && self.extra.is_empty()
    }

    /// Set line spacing as a multiple of single spacing.
    pub fn set_line_spacing(&mut self, multiplier: f32) {
        let spacing = self.spacing.get_or_insert_with(Spacing::default);
        spacing.line = Some(units::line_multiple(multiplier));
        spacing.line_rule = Some(LineRule::Auto);
    }

    /// Set line spacing plus space before/after in points.
    pub fn set_spacing(&mut self, multiplier: f32, before_pt: f32, after_pt: f32) {
        self.set_line_spacing(multiplier);
        self.set_space_around(before_pt, after_pt);
    }

    /// Set space before/after in points, leaving line spacing alone.
    pub fn set_space_around(&mut self, before_pt: f32, after_pt: f32) {
        let spacing = self.spacing.get_or_insert_with(Spacing::default);
        spacing.before = Some(units::pt_to_twips(before_pt));
        spacing.after = Some(units::pt_to_twips(after_pt));
    }

    /// Configured line value, if any.
    pub fn line_spacing(&self) -> Option<u32> {
        self.spacing.as_ref().and_then(|s| s.line)
    }

    /// Set the first-line indent in twips; negative values are hanging.
    pub fn set_first_line_indent(&mut self, twips: i32) {
        self.indent.get_or_insert_with(Indent::default).first_line = Some(twips);
    }

    /// Set the left indent in twips.
    pub fn set_left_indent(&mut self, twips: i32) {
        self.indent.get_or_insert_with(Indent::default).left = Some(twips);
    }

    /// Set the right indent in twips.
    pub fn set_right_indent(&mut self, twips: i32) {
        self.indent.get_or_insert_with(Indent::default).right = Some(twips);
    }

    /// Left indent in twips (0 when unset).
    pub fn left_indent(&self) -> i32 {
        self.indent.as_ref().and_then(|i| i.left).unwrap_or(0)
    }
}

/// Paragraph spacing (`w:spacing`), lengths in twips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spacing {
    /// Space before
    pub before: Option<u32>,
    /// Space after
    pub after: Option<u32>,
    /// Line value; 240ths of a line when the rule is `auto`
    pub line: Option<u32>,
    /// Line rule
    pub line_rule: Option<LineRule>,
    /// Other attributes (autospacing flags, line-unit variants)
    pub other: Vec<(String, String)>,
}

/// Interpretation of `Spacing::line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineRule {
    /// Multiple of single spacing
    Auto,
    /// Exact height in twips
    Exact,
    /// Minimum height in twips
    AtLeast,
}

impl LineRule {
    /// Attribute value used in `w:lineRule`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineRule::Auto => "auto",
            LineRule::Exact => "exact",
            LineRule::AtLeast => "atLeast",
        }
    }

    /// Parse a `w:lineRule` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(LineRule::Auto),
            "exact" => Some(LineRule::Exact),
            "atLeast" => Some(LineRule::AtLeast),
            _ => None,
        }
    }
}

/// Paragraph indentation (`w:ind`), lengths in twips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indent {
    /// Left (start) indent
    pub left: Option<i32>,
    /// Right (end) indent
    pub right: Option<i32>,
    /// First-line indent; negative means hanging
    pub first_line: Option<i32>,
    /// Other attributes (character-unit variants)
    pub other: Vec<(String, String)>,
}

/// A custom tab stop (`w:tab` inside `w:tabs`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabStop {
    /// Stop kind
    pub alignment: TabAlignment,
    /// Position in twips
    pub position: i32,
    /// Leader character (`w:leader`)
    pub leader: Option<String>,
}

impl TabStop {
    /// A right-aligned stop at `position` twips.
    pub fn right(position: i32) -> Self {
        Self {
            alignment: TabAlignment::Right,
            position,
            leader: None,
        }
    }
}

/// Tab stop kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabAlignment {
    /// Left
    Left,
    /// Center
    Center,
    /// Right
    Right,
    /// Decimal point
    Decimal,
    /// Vertical bar
    Bar,
    /// Clears an inherited stop
    Clear,
}

impl TabAlignment {
    /// Attribute value used in `w:val`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TabAlignment::Left => "left",
            TabAlignment::Center => "center",
            TabAlignment::Right => "right",
            TabAlignment::Decimal => "decimal",
            TabAlignment::Bar => "bar",
            TabAlignment::Clear => "clear",
        }
    }

    /// Parse a `w:val` value; unknown kinds read as left.
    pub fn parse(value: &str) -> Self {
        match value {
            "center" => TabAlignment::Center,
            "right" | "end" => TabAlignment::Right,
            "decimal" => TabAlignment::Decimal,
            "bar" => TabAlignment::Bar,
            "clear" => TabAlignment::Clear,
            _ => TabAlignment::Left,
        }
    }
}

/// Paragraph or table justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
    /// Distributed alignment
    Distribute,
}

impl Alignment {
    /// Attribute value used in `w:jc`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
            Alignment::Distribute => "distribute",
        }
    }

    /// Parse a `w:jc` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" => Some(Alignment::Justify),
            "distribute" => Some(Alignment::Distribute),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_text() {
        let mut p = Paragraph::new();
        p.add_text("Hello ");
        p.add_run(Run::text("world").with(RunContent::Tab));
        p.content.push(InlineContent::Hyperlink(Hyperlink {
            attributes: vec![],
            runs: vec![Run::text("link")],
        }));
        p.content
            .push(InlineContent::Math(Element::new("m:oMath").with_text("x")));

        assert_eq!(p.text(), "Hello world\tlink");
        assert_eq!(p.run_count(), 3);
    }

    #[test]
    fn test_empty_detection() {
        assert!(Paragraph::new().is_empty());
        assert!(Paragraph::with_text("   ").is_empty());

        let mut p = Paragraph::new();
        p.add_run(Run::new().with(RunContent::Drawing(Element::new("w:drawing"))));
        assert!(!p.is_empty());

        let mut p = Paragraph::new();
        p.content
            .push(InlineContent::Math(Element::new("m:oMathPara")));
        assert!(!p.is_empty());
        assert!(p.has_display_math());
    }

    #[test]
    fn test_font_setter_drops_theme() {
        let mut props = RunProperties::default();
        props.fonts = Some(FontSet {
            other: vec![("w:asciiTheme".into(), "minorHAnsi".into())],
            ..Default::default()
        });
        props.set_font("Times New Roman", "宋体");

        let fonts = props.fonts.as_ref().unwrap();
        assert_eq!(fonts.ascii.as_deref(), Some("Times New Roman"));
        assert_eq!(fonts.east_asia.as_deref(), Some("宋体"));
        assert!(fonts.other.is_empty());
    }

    #[test]
    fn test_spacing_units() {
        let mut props = ParagraphProperties::default();
        props.set_spacing(1.5, 6.0, 6.0);
        let spacing = props.spacing.unwrap();
        assert_eq!(spacing.line, Some(360));
        assert_eq!(spacing.before, Some(120));
        assert_eq!(spacing.after, Some(120));
        assert_eq!(spacing.line_rule, Some(LineRule::Auto));
    }

    #[test]
    fn test_runs_mut_reaches_hyperlinks() {
        let mut p = Paragraph::with_text("a");
        p.content.push(InlineContent::Hyperlink(Hyperlink {
            attributes: vec![],
            runs: vec![Run::text("b")],
        }));
        for run in p.runs_mut() {
            run.properties.bold = Some(true);
        }
        assert!(p.runs().all(|r| r.properties.bold == Some(true)));
    }
}
