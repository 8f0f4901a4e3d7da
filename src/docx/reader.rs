//! Element tree → typed document model.

use crate::model::{
    Alignment, Block, Border, BorderSet, CellProperties, Element, FieldCharType, FontSet,
    Hyperlink, Indent, InlineContent, LineRule, Node, PageMargins, PageSize, Paragraph,
    ParagraphProperties, PartReference, Run, RunContent, RunProperties, SectionProperties,
    Spacing, StyleDefinition, StyleSheet, TabAlignment, TabStop, Table, TableCell,
    TableProperties, TableRow,
};

/// Convert block-level children (body, cell, header, footer) into blocks.
pub(crate) fn blocks(children: impl IntoIterator<Item = Element>) -> Vec<Block> {
    children.into_iter().map(block).collect()
}

pub(crate) fn block(element: Element) -> Block {
    match element.name.as_str() {
        "w:p" => Block::Paragraph(paragraph(element)),
        "w:tbl" => Block::Table(table(element)),
        _ => Block::Other(element),
    }
}

fn paragraph(element: Element) -> Paragraph {
    let mut para = Paragraph::new();
    for child in element.into_elements() {
        match child.name.as_str() {
            "w:pPr" => para.properties = paragraph_properties(child),
            "w:r" => para.content.push(InlineContent::Run(run(child))),
            "w:hyperlink" if child.elements().all(|e| e.name == "w:r") => {
                let attributes = child.attributes.clone();
                let runs = child.into_elements().map(run).collect();
                para.content
                    .push(InlineContent::Hyperlink(Hyperlink { attributes, runs }));
            }
            "m:oMathPara" | "m:oMath" => para.content.push(InlineContent::Math(child)),
            _ => para.content.push(InlineContent::Other(child)),
        }
    }
    para
}

fn run(element: Element) -> Run {
    let mut run = Run::new();
    for child in element.into_elements() {
        let item = match child.name.as_str() {
            "w:rPr" => {
                run.properties = run_properties(child);
                continue;
            }
            "w:t" => RunContent::Text(child.text()),
            "w:tab" if child.attributes.is_empty() => RunContent::Tab,
            "w:br" if child.attributes.iter().all(|(k, _)| k == "w:type") => {
                RunContent::Break(child.attr("w:type").map(str::to_string))
            }
            "w:drawing" => RunContent::Drawing(child),
            "w:fldChar" if child.attributes.len() == 1 && child.children.is_empty() => {
                match child.attr("w:fldCharType").and_then(FieldCharType::parse) {
                    Some(kind) => RunContent::FieldChar(kind),
                    None => RunContent::Other(child),
                }
            }
            "w:instrText" => RunContent::InstrText(child.text()),
            _ => RunContent::Other(child),
        };
        run.content.push(item);
    }
    run
}

/// OOXML on/off value: absent or anything but `0`/`false`/`off` is on.
fn toggle(element: &Element) -> bool {
    !matches!(element.attr("w:val"), Some("0" | "false" | "off"))
}

fn parse_num<T: std::str::FromStr>(element: &Element, key: &str) -> Option<T> {
    element.attr(key).and_then(|v| v.parse().ok())
}

pub(crate) fn run_properties(element: Element) -> RunProperties {
    let mut props = RunProperties::default();
    for child in element.into_elements() {
        match child.name.as_str() {
            "w:rStyle" => props.style = child.attr("w:val").map(str::to_string),
            "w:rFonts" => props.fonts = Some(font_set(&child)),
            "w:b" => props.bold = Some(toggle(&child)),
            "w:i" => props.italic = Some(toggle(&child)),
            "w:color" => {
                props.color = child.attr("w:val").map(str::to_string);
                props.color_theme = child
                    .attributes
                    .iter()
                    .filter(|(k, _)| k != "w:val")
                    .cloned()
                    .collect();
            }
            "w:sz" if parse_num::<u32>(&child, "w:val").is_some() => {
                props.size = parse_num(&child, "w:val");
            }
            _ => props.extra.push(child),
        }
    }
    props
}

fn font_set(element: &Element) -> FontSet {
    let mut fonts = FontSet::default();
    for (key, value) in &element.attributes {
        match key.as_str() {
            "w:ascii" => fonts.ascii = Some(value.clone()),
            "w:hAnsi" => fonts.h_ansi = Some(value.clone()),
            "w:eastAsia" => fonts.east_asia = Some(value.clone()),
            "w:cs" => fonts.cs = Some(value.clone()),
            _ => fonts.other.push((key.clone(), value.clone())),
        }
    }
    fonts
}

pub(crate) fn paragraph_properties(element: Element) -> ParagraphProperties {
    let mut props = ParagraphProperties::default();
    for child in element.into_elements() {
        match child.name.as_str() {
            "w:pStyle" => props.style = child.attr("w:val").map(str::to_string),
            "w:widowControl" => props.widow_control = Some(toggle(&child)),
            "w:tabs" => props.tabs = child.elements().filter_map(tab_stop).collect(),
            "w:spacing" => props.spacing = Some(spacing(&child)),
            "w:ind" => props.indent = Some(indent(&child)),
            "w:jc" => match child.attr("w:val").and_then(Alignment::parse) {
                Some(alignment) => props.alignment = Some(alignment),
                None => props.extra.push(child),
            },
            _ => props.extra.push(child),
        }
    }
    props
}

fn tab_stop(element: &Element) -> Option<TabStop> {
    Some(TabStop {
        alignment: TabAlignment::parse(element.attr("w:val").unwrap_or("left")),
        position: parse_num(element, "w:pos")?,
        leader: element.attr("w:leader").map(str::to_string),
    })
}

fn spacing(element: &Element) -> Spacing {
    let mut spacing = Spacing::default();
    for (key, value) in &element.attributes {
        match key.as_str() {
            "w:before" if value.parse::<u32>().is_ok() => spacing.before = value.parse().ok(),
            "w:after" if value.parse::<u32>().is_ok() => spacing.after = value.parse().ok(),
            "w:line" if value.parse::<u32>().is_ok() => spacing.line = value.parse().ok(),
            "w:lineRule" if LineRule::parse(value).is_some() => {
                spacing.line_rule = LineRule::parse(value)
            }
            _ => spacing.other.push((key.clone(), value.clone())),
        }
    }
    spacing
}

fn indent(element: &Element) -> Indent {
    let mut indent = Indent::default();
    for (key, value) in &element.attributes {
        let parsed = value.parse::<i32>().ok();
        match (key.as_str(), parsed) {
            ("w:left" | "w:start", Some(v)) => indent.left = Some(v),
            ("w:right" | "w:end", Some(v)) => indent.right = Some(v),
            ("w:firstLine", Some(v)) => indent.first_line = Some(v),
            ("w:hanging", Some(v)) => indent.first_line = Some(-v),
            _ => indent.other.push((key.clone(), value.clone())),
        }
    }
    indent
}

fn table(element: Element) -> Table {
    let mut table = Table::new();
    for child in element.into_elements() {
        match child.name.as_str() {
            "w:tblPr" => table.properties = table_properties(child),
            "w:tblGrid" => table.grid = Some(child),
            "w:tr" => table.rows.push(table_row(child)),
            _ => table.extra.push(child),
        }
    }
    table
}

fn table_properties(element: Element) -> TableProperties {
    let mut props = TableProperties::default();
    for child in element.into_elements() {
        match child.name.as_str() {
            "w:tblStyle" => props.style = child.attr("w:val").map(str::to_string),
            "w:jc" => match child.attr("w:val").and_then(Alignment::parse) {
                Some(alignment) => props.alignment = Some(alignment),
                None => props.extra.push(child),
            },
            "w:tblBorders" => props.borders = Some(border_set(child)),
            _ => props.extra.push(child),
        }
    }
    props
}

fn table_row(element: Element) -> TableRow {
    let mut row = TableRow::default();
    for child in element.into_elements() {
        match child.name.as_str() {
            "w:tblPrEx" | "w:trPr" => row.properties.push(child),
            "w:tc" => row.cells.push(table_cell(child)),
            _ => row.extra.push(child),
        }
    }
    row
}

fn table_cell(element: Element) -> TableCell {
    let mut cell = TableCell::default();
    let mut content = Vec::new();
    for child in element.into_elements() {
        if child.name == "w:tcPr" {
            cell.properties = cell_properties(child);
        } else {
            content.push(child);
        }
    }
    cell.blocks = blocks(content);
    cell
}

fn cell_properties(element: Element) -> CellProperties {
    let mut props = CellProperties::default();
    for child in element.into_elements() {
        if child.name == "w:tcBorders" {
            props.borders = Some(border_set(child));
        } else {
            props.extra.push(child);
        }
    }
    props
}

fn border_set(element: Element) -> BorderSet {
    let mut set = BorderSet::default();
    for child in element.into_elements() {
        let slot = match child.name.as_str() {
            "w:top" => &mut set.top,
            "w:left" | "w:start" => &mut set.left,
            "w:bottom" => &mut set.bottom,
            "w:right" | "w:end" => &mut set.right,
            "w:insideH" => &mut set.inside_h,
            "w:insideV" => &mut set.inside_v,
            _ => {
                set.extra.push(child);
                continue;
            }
        };
        *slot = Some(border(&child));
    }
    set
}

fn border(element: &Element) -> Border {
    Border {
        style: element.attr("w:val").unwrap_or("nil").to_string(),
        size: parse_num(element, "w:sz"),
        space: parse_num(element, "w:space"),
        color: element.attr("w:color").map(str::to_string),
    }
}

pub(crate) fn section_properties(element: Element) -> SectionProperties {
    let mut section = SectionProperties {
        attributes: element.attributes.clone(),
        ..Default::default()
    };
    for child in element.into_elements() {
        match child.name.as_str() {
            "w:headerReference" | "w:footerReference" => {
                let reference = PartReference {
                    kind: child.attr("w:type").unwrap_or("default").to_string(),
                    id: child.attr("r:id").unwrap_or_default().to_string(),
                };
                if child.name == "w:headerReference" {
                    section.header_refs.push(reference);
                } else {
                    section.footer_refs.push(reference);
                }
            }
            "w:pgSz" => match (parse_num(&child, "w:w"), parse_num(&child, "w:h")) {
                (Some(width), Some(height)) => {
                    section.page_size = Some(PageSize {
                        width,
                        height,
                        orient: child.attr("w:orient").map(str::to_string),
                    })
                }
                _ => section.extra.push(child),
            },
            "w:pgMar" => {
                let defaults = PageMargins::default();
                section.margins = Some(PageMargins {
                    top: parse_num(&child, "w:top").unwrap_or(defaults.top),
                    right: parse_num(&child, "w:right").unwrap_or(defaults.right),
                    bottom: parse_num(&child, "w:bottom").unwrap_or(defaults.bottom),
                    left: parse_num(&child, "w:left").unwrap_or(defaults.left),
                    header: parse_num(&child, "w:header").unwrap_or(defaults.header),
                    footer: parse_num(&child, "w:footer").unwrap_or(defaults.footer),
                    gutter: parse_num(&child, "w:gutter").unwrap_or(defaults.gutter),
                });
            }
            _ => section.extra.push(child),
        }
    }
    section
}

pub(crate) fn style_sheet(element: Element) -> StyleSheet {
    let mut sheet = StyleSheet {
        attributes: element.attributes.clone(),
        ..Default::default()
    };
    for child in element.into_elements() {
        if child.name == "w:style" {
            sheet.styles.push(style_definition(child));
        } else {
            sheet.prelude.push(child);
        }
    }
    sheet
}

fn style_definition(element: Element) -> StyleDefinition {
    let mut style = StyleDefinition::default();
    for (key, value) in &element.attributes {
        match key.as_str() {
            "w:type" => style.kind = value.clone(),
            "w:styleId" => style.id = value.clone(),
            _ => style.attributes.push((key.clone(), value.clone())),
        }
    }
    for child in element.into_elements() {
        match child.name.as_str() {
            "w:name" => style.name = child.attr("w:val").map(str::to_string),
            "w:basedOn" => style.based_on = child.attr("w:val").map(str::to_string),
            "w:pPr" => style.paragraph = Some(paragraph_properties(child)),
            "w:rPr" => style.run = Some(run_properties(child)),
            _ => style.extra.push(child),
        }
    }
    style
}

/// Split a body element into blocks and its trailing section properties.
pub(crate) fn body(element: Element) -> (Vec<Block>, Option<SectionProperties>) {
    let mut children: Vec<Element> = element
        .children
        .into_iter()
        .filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
        .collect();
    let section = match children.last() {
        Some(last) if last.name == "w:sectPr" => children.pop().map(section_properties),
        _ => None,
    };
    (blocks(children), section)
}
