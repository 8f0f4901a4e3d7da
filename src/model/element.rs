//! Generic XML element used for content the typed model does not interpret.

use serde::{Deserialize, Serialize};

/// An XML element with qualified name, attributes, and children.
///
/// Names keep their namespace prefix (`w:p`, `m:oMathPara`) exactly as they
/// appear in the package part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Qualified element name
    pub name: String,

    /// Attributes in document order
    pub attributes: Vec<(String, String)>,

    /// Child nodes in document order
    pub children: Vec<Node>,
}

/// A child node of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Node {
    /// Nested element
    Element(Element),
    /// Character data
    Text(String),
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder: add a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder: add a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Get an attribute value by qualified name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Iterate over child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Remove all child elements with the given name.
    pub fn remove_children(&mut self, name: &str) {
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if e.name == name));
    }

    /// Check whether this element or any descendant has the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.name == name || self.elements().any(|e| e.contains(name))
    }

    /// Concatenated character data of this element and all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Consume the element, returning only its child elements.
    pub fn into_elements(self) -> impl Iterator<Item = Element> {
        self.children.into_iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Local part of the qualified name (`w:p` → `p`).
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_replace() {
        let mut el = Element::new("w:jc").with_attr("w:val", "left");
        el.set_attr("w:val", "center");
        assert_eq!(el.attr("w:val"), Some("center"));
        assert_eq!(el.attributes.len(), 1);
    }

    #[test]
    fn test_contains_and_text() {
        let el = Element::new("w:p").with_child(
            Element::new("w:r").with_child(Element::new("w:t").with_text("Hello")),
        );
        assert!(el.contains("w:t"));
        assert!(!el.contains("w:drawing"));
        assert_eq!(el.text(), "Hello");
    }

    #[test]
    fn test_remove_children() {
        let mut el = Element::new("w:pPr")
            .with_child(Element::new("w:jc"))
            .with_child(Element::new("w:ind"))
            .with_child(Element::new("w:jc"));
        el.remove_children("w:jc");
        assert_eq!(el.elements().count(), 1);
        assert_eq!(el.local_name(), "pPr");
    }
}
