//! Typed document model → element tree.

use super::schema::{self, ordered};
use crate::model::{
    Block, Border, BorderSet, CellProperties, Element, FontSet, Hyperlink, Indent,
    InlineContent, PageMargins, PageSize, Paragraph, ParagraphProperties, Run, RunContent,
    RunProperties, SectionProperties, Spacing, StyleDefinition, StyleSheet, TabStop, Table,
    TableCell, TableProperties, TableRow,
};

fn val(name: &str, value: impl Into<String>) -> Element {
    Element::new(name).with_attr("w:val", value)
}

fn toggle(name: &str, on: bool) -> Element {
    if on {
        Element::new(name)
    } else {
        val(name, "0")
    }
}

pub(crate) fn blocks(blocks: &[Block]) -> Vec<Element> {
    blocks.iter().map(block).collect()
}

pub(crate) fn block(block: &Block) -> Element {
    match block {
        Block::Paragraph(p) => paragraph(p),
        Block::Table(t) => table(t),
        Block::Other(e) => e.clone(),
    }
}

pub(crate) fn paragraph(para: &Paragraph) -> Element {
    let mut element = Element::new("w:p");
    if !para.properties.is_empty() {
        element.push(paragraph_properties(&para.properties));
    }
    for item in &para.content {
        element.push(match item {
            InlineContent::Run(r) => run(r),
            InlineContent::Hyperlink(link) => hyperlink(link),
            InlineContent::Math(e) | InlineContent::Other(e) => e.clone(),
        });
    }
    element
}

fn hyperlink(link: &Hyperlink) -> Element {
    let mut element = Element::new("w:hyperlink");
    element.attributes = link.attributes.clone();
    for r in &link.runs {
        element.push(run(r));
    }
    element
}

pub(crate) fn run(run: &Run) -> Element {
    let mut element = Element::new("w:r");
    if !run.properties.is_empty() {
        element.push(run_properties(&run.properties));
    }
    for item in &run.content {
        element.push(match item {
            RunContent::Text(t) => Element::new("w:t")
                .with_attr("xml:space", "preserve")
                .with_text(t.as_str()),
            RunContent::Tab => Element::new("w:tab"),
            RunContent::Break(kind) => {
                let br = Element::new("w:br");
                match kind {
                    Some(k) => br.with_attr("w:type", k.as_str()),
                    None => br,
                }
            }
            RunContent::FieldChar(kind) => {
                Element::new("w:fldChar").with_attr("w:fldCharType", kind.as_str())
            }
            RunContent::InstrText(t) => Element::new("w:instrText")
                .with_attr("xml:space", "preserve")
                .with_text(t.as_str()),
            RunContent::Drawing(e) | RunContent::Other(e) => e.clone(),
        });
    }
    element
}

pub(crate) fn run_properties(props: &RunProperties) -> Element {
    let mut children = props.extra.clone();
    if let Some(style) = &props.style {
        children.push(val("w:rStyle", style.as_str()));
    }
    if let Some(fonts) = &props.fonts {
        children.push(font_set(fonts));
    }
    if let Some(bold) = props.bold {
        children.push(toggle("w:b", bold));
    }
    if let Some(italic) = props.italic {
        children.push(toggle("w:i", italic));
    }
    if let Some(color) = &props.color {
        let mut element = val("w:color", color.as_str());
        element.attributes.extend(props.color_theme.iter().cloned());
        children.push(element);
    }
    if let Some(size) = props.size {
        children.push(val("w:sz", size.to_string()));
    }
    ordered("w:rPr", schema::RUN_PROPERTIES, children)
}

fn font_set(fonts: &FontSet) -> Element {
    let mut element = Element::new("w:rFonts");
    let named = [
        ("w:ascii", &fonts.ascii),
        ("w:hAnsi", &fonts.h_ansi),
        ("w:eastAsia", &fonts.east_asia),
        ("w:cs", &fonts.cs),
    ];
    for (key, value) in named {
        if let Some(value) = value {
            element.set_attr(key, value.as_str());
        }
    }
    for (key, value) in &fonts.other {
        element.set_attr(key.as_str(), value.as_str());
    }
    element
}

pub(crate) fn paragraph_properties(props: &ParagraphProperties) -> Element {
    let mut children = props.extra.clone();
    if let Some(style) = &props.style {
        children.push(val("w:pStyle", style.as_str()));
    }
    if let Some(widow) = props.widow_control {
        children.push(toggle("w:widowControl", widow));
    }
    if !props.tabs.is_empty() {
        let mut tabs = Element::new("w:tabs");
        for stop in &props.tabs {
            tabs.push(tab_stop(stop));
        }
        children.push(tabs);
    }
    if let Some(spacing) = &props.spacing {
        children.push(spacing_element(spacing));
    }
    if let Some(indent) = &props.indent {
        children.push(indent_element(indent));
    }
    if let Some(alignment) = props.alignment {
        children.push(val("w:jc", alignment.as_str()));
    }
    ordered("w:pPr", schema::PARAGRAPH_PROPERTIES, children)
}

fn tab_stop(stop: &TabStop) -> Element {
    let element = val("w:tab", stop.alignment.as_str());
    let element = match &stop.leader {
        Some(leader) => element.with_attr("w:leader", leader.as_str()),
        None => element,
    };
    element.with_attr("w:pos", stop.position.to_string())
}

fn spacing_element(spacing: &Spacing) -> Element {
    let mut element = Element::new("w:spacing");
    if let Some(before) = spacing.before {
        element.set_attr("w:before", before.to_string());
    }
    if let Some(after) = spacing.after {
        element.set_attr("w:after", after.to_string());
    }
    if let Some(line) = spacing.line {
        element.set_attr("w:line", line.to_string());
    }
    if let Some(rule) = spacing.line_rule {
        element.set_attr("w:lineRule", rule.as_str());
    }
    for (key, value) in &spacing.other {
        element.set_attr(key.as_str(), value.as_str());
    }
    element
}

fn indent_element(indent: &Indent) -> Element {
    let mut element = Element::new("w:ind");
    if let Some(left) = indent.left {
        element.set_attr("w:left", left.to_string());
    }
    if let Some(right) = indent.right {
        element.set_attr("w:right", right.to_string());
    }
    match indent.first_line {
        Some(v) if v < 0 => element.set_attr("w:hanging", (-v).to_string()),
        Some(v) => element.set_attr("w:firstLine", v.to_string()),
        None => {}
    }
    for (key, value) in &indent.other {
        element.set_attr(key.as_str(), value.as_str());
    }
    element
}

pub(crate) fn table(table: &Table) -> Element {
    let mut element = Element::new("w:tbl");
    element.push(table_properties(&table.properties));
    if let Some(grid) = &table.grid {
        element.push(grid.clone());
    }
    for row in &table.rows {
        element.push(table_row(row));
    }
    for extra in &table.extra {
        element.push(extra.clone());
    }
    element
}

fn table_properties(props: &TableProperties) -> Element {
    let mut children = props.extra.clone();
    if let Some(style) = &props.style {
        children.push(val("w:tblStyle", style.as_str()));
    }
    if let Some(alignment) = props.alignment {
        children.push(val("w:jc", alignment.as_str()));
    }
    if let Some(borders) = &props.borders {
        children.push(border_set("w:tblBorders", borders));
    }
    ordered("w:tblPr", schema::TABLE_PROPERTIES, children)
}

fn table_row(row: &TableRow) -> Element {
    let mut element = Element::new("w:tr");
    for props in &row.properties {
        element.push(props.clone());
    }
    for cell in &row.cells {
        element.push(table_cell(cell));
    }
    for extra in &row.extra {
        element.push(extra.clone());
    }
    element
}

fn table_cell(cell: &TableCell) -> Element {
    let mut element = Element::new("w:tc");
    let props = cell_properties(&cell.properties);
    if props.elements().next().is_some() {
        element.push(props);
    }
    for child in blocks(&cell.blocks) {
        element.push(child);
    }
    // A cell must end with a paragraph.
    if !matches!(cell.blocks.last(), Some(Block::Paragraph(_))) {
        element.push(Element::new("w:p"));
    }
    element
}

fn cell_properties(props: &CellProperties) -> Element {
    let mut children = props.extra.clone();
    if let Some(borders) = &props.borders {
        children.push(border_set("w:tcBorders", borders));
    }
    ordered("w:tcPr", schema::CELL_PROPERTIES, children)
}

fn border_set(name: &str, set: &BorderSet) -> Element {
    let mut children = set.extra.clone();
    let edges = [
        ("w:top", &set.top),
        ("w:left", &set.left),
        ("w:bottom", &set.bottom),
        ("w:right", &set.right),
        ("w:insideH", &set.inside_h),
        ("w:insideV", &set.inside_v),
    ];
    for (edge, border) in edges {
        if let Some(border) = border {
            children.push(border_element(edge, border));
        }
    }
    ordered(name, schema::BORDERS, children)
}

fn border_element(name: &str, border: &Border) -> Element {
    let mut element = val(name, border.style.as_str());
    if let Some(size) = border.size {
        element.set_attr("w:sz", size.to_string());
    }
    if let Some(space) = border.space {
        element.set_attr("w:space", space.to_string());
    }
    if let Some(color) = &border.color {
        element.set_attr("w:color", color.as_str());
    }
    element
}

pub(crate) fn section_properties(section: &SectionProperties) -> Element {
    let mut children = section.extra.clone();
    for reference in &section.header_refs {
        children.push(
            Element::new("w:headerReference")
                .with_attr("w:type", reference.kind.as_str())
                .with_attr("r:id", reference.id.as_str()),
        );
    }
    for reference in &section.footer_refs {
        children.push(
            Element::new("w:footerReference")
                .with_attr("w:type", reference.kind.as_str())
                .with_attr("r:id", reference.id.as_str()),
        );
    }
    if let Some(size) = &section.page_size {
        children.push(page_size(size));
    }
    if let Some(margins) = &section.margins {
        children.push(page_margins(margins));
    }
    let mut element = ordered("w:sectPr", schema::SECTION_PROPERTIES, children);
    element.attributes = section.attributes.clone();
    element
}

fn page_size(size: &PageSize) -> Element {
    let element = Element::new("w:pgSz")
        .with_attr("w:w", size.width.to_string())
        .with_attr("w:h", size.height.to_string());
    match &size.orient {
        Some(orient) => element.with_attr("w:orient", orient.as_str()),
        None => element,
    }
}

fn page_margins(margins: &PageMargins) -> Element {
    Element::new("w:pgMar")
        .with_attr("w:top", margins.top.to_string())
        .with_attr("w:right", margins.right.to_string())
        .with_attr("w:bottom", margins.bottom.to_string())
        .with_attr("w:left", margins.left.to_string())
        .with_attr("w:header", margins.header.to_string())
        .with_attr("w:footer", margins.footer.to_string())
        .with_attr("w:gutter", margins.gutter.to_string())
}

pub(crate) fn style_sheet(sheet: &StyleSheet) -> Element {
    let mut element = Element::new("w:styles");
    element.attributes = if sheet.attributes.is_empty() {
        vec![("xmlns:w".to_string(), super::namespaces::WORDML.to_string())]
    } else {
        sheet.attributes.clone()
    };
    for prelude in &sheet.prelude {
        element.push(prelude.clone());
    }
    for style in &sheet.styles {
        element.push(style_definition(style));
    }
    element
}

fn style_definition(style: &StyleDefinition) -> Element {
    let mut children = style.extra.clone();
    if let Some(name) = &style.name {
        children.push(val("w:name", name.as_str()));
    }
    if let Some(based_on) = &style.based_on {
        children.push(val("w:basedOn", based_on.as_str()));
    }
    if let Some(props) = &style.paragraph {
        children.push(paragraph_properties(props));
    }
    if let Some(props) = &style.run {
        children.push(run_properties(props));
    }
    let mut element = ordered("w:style", schema::STYLE, children);
    element.set_attr("w:type", style.kind.as_str());
    element.set_attr("w:styleId", style.id.as_str());
    for (key, value) in &style.attributes {
        element.set_attr(key.as_str(), value.as_str());
    }
    element
}
