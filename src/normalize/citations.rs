//! Resolution of natbib citation commands against `\bibitem` labels.
//!
//! The conversion engine drops `\citet`/`\citep` when the bibliography is a
//! hand-written `thebibliography` environment, so citations are rendered to
//! plain author-year text before conversion.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::diagnostics::{DiagnosticKind, Diagnostics};

static BIBITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\bibitem\[([^\]]+)\]\{([^}]+)\}").unwrap());
static PAREN_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\((\d{4}[a-z]?)\)$").unwrap());
static CITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\(citet|citep|citealt|citealp|citeauthor|citeyear|cite)(\*?)((?:\[[^\]]*\]){0,2})\{([^}]+)\}",
    )
    .unwrap()
});
static NOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());
static BIBLIOGRAPHY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\begin\{thebibliography\}\{([^}]*)\}").unwrap());

/// One `\bibitem[label]{key}` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    /// Citation key
    pub key: String,
    /// Author text, cleaned
    pub author: String,
    /// Year with optional letter suffix; empty when the label had none
    pub year: String,
    /// Whether the label matched a known `Author(Year)` or `Author, Year` form
    pub parsed: bool,
}

impl BibEntry {
    /// Parse an entry from its label.
    pub fn from_label(key: &str, label: &str) -> Self {
        let label = label.trim();
        let (author, year, parsed) = if let Some(caps) = PAREN_LABEL_RE.captures(label) {
            (caps[1].trim().to_string(), caps[2].to_string(), true)
        } else if let Some((author, year)) = label.rsplit_once(',') {
            (author.trim().to_string(), year.trim().to_string(), true)
        } else {
            (label.to_string(), String::new(), false)
        };

        Self {
            key: key.trim().to_string(),
            author: clean_author(&author),
            year,
            parsed,
        }
    }
}

fn clean_author(author: &str) -> String {
    author
        .replace("et~al.", "et al.")
        .replace("et~al", "et al.")
        .replace(['{', '}'], "")
}

/// Key → entry lookup built from a source text.
#[derive(Debug, Clone, Default)]
pub struct Bibliography {
    entries: HashMap<String, BibEntry>,
}

impl Bibliography {
    /// Collect every labelled `\bibitem` in `source`.
    ///
    /// Labels that match no known form are kept with an empty year and
    /// reported.
    pub fn from_source(source: &str, diagnostics: &mut Diagnostics) -> Self {
        let mut entries = HashMap::new();
        for caps in BIBITEM_RE.captures_iter(source) {
            let entry = BibEntry::from_label(&caps[2], &caps[1]);
            if !entry.parsed {
                diagnostics.push(
                    DiagnosticKind::UnparsedBibLabel,
                    format!("bibitem '{}': label '{}' has no year", entry.key, caps[1].trim()),
                );
            }
            entries.insert(entry.key.clone(), entry);
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Citation command flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CiteStyle {
    Textual,
    Parenthetical,
    Bare,
    Author,
    Year,
}

impl CiteStyle {
    fn from_command(command: &str) -> Self {
        match command {
            "citet" => CiteStyle::Textual,
            "citealt" | "citealp" => CiteStyle::Bare,
            "citeauthor" => CiteStyle::Author,
            "citeyear" => CiteStyle::Year,
            _ => CiteStyle::Parenthetical,
        }
    }
}

/// Optional `[pre][post]` notes. A single bracket is the post note.
fn parse_notes(raw: &str) -> (String, String) {
    let notes: Vec<&str> = NOTE_RE
        .captures_iter(raw)
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim()))
        .collect();
    match notes.as_slice() {
        [post] => (String::new(), post.to_string()),
        [pre, post] => (pre.to_string(), post.to_string()),
        _ => (String::new(), String::new()),
    }
}

struct Resolver<'a> {
    bibliography: &'a Bibliography,
}

impl Resolver<'_> {
    /// Author and year for a key; unknown keys render as the key itself.
    fn lookup(&self, key: &str, diagnostics: &mut Diagnostics) -> (String, String) {
        match self.bibliography.get(key) {
            Some(entry) => (entry.author.clone(), entry.year.clone()),
            None => {
                diagnostics.push(
                    DiagnosticKind::UnknownCitationKey,
                    format!("no bibitem for citation key '{}'", key),
                );
                (key.to_string(), String::new())
            }
        }
    }

    fn render(&self, caps: &Captures, diagnostics: &mut Diagnostics) -> String {
        let style = CiteStyle::from_command(&caps[1]);
        let (pre, post) = parse_notes(caps.get(3).map(|m| m.as_str()).unwrap_or(""));
        let entries: Vec<(String, String, String)> = caps[4]
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|key| {
                let (author, year) = self.lookup(key, diagnostics);
                (key.to_string(), author, year)
            })
            .collect();

        let mut parts: Vec<String> = entries
            .iter()
            .map(|(key, author, year)| match style {
                CiteStyle::Textual if !year.is_empty() => format!("{} ({})", author, year),
                CiteStyle::Parenthetical | CiteStyle::Bare if !year.is_empty() => {
                    format!("{}, {}", author, year)
                }
                CiteStyle::Year if !year.is_empty() => year.clone(),
                CiteStyle::Year => key.clone(),
                _ => author.clone(),
            })
            .collect();

        if !post.is_empty() {
            if let Some(last) = parts.last_mut() {
                if style == CiteStyle::Textual && last.ends_with(')') {
                    last.pop();
                    last.push_str(&format!(", {})", post));
                } else {
                    last.push_str(&format!(", {}", post));
                }
            }
        }

        let joined = parts.join("; ");
        let body = if pre.is_empty() {
            joined
        } else {
            format!("{} {}", pre, joined)
        };
        match style {
            CiteStyle::Parenthetical => format!("({})", body),
            _ => body,
        }
    }
}

/// Rewrite citation commands to plain text.
///
/// Returns the rewritten source and the number of commands replaced. A
/// source without labelled `\bibitem`s is returned unchanged.
pub fn resolve_citations(source: &str, diagnostics: &mut Diagnostics) -> (String, usize) {
    let bibliography = Bibliography::from_source(source, diagnostics);
    if bibliography.is_empty() {
        return (source.to_string(), 0);
    }

    let resolver = Resolver {
        bibliography: &bibliography,
    };
    let mut count = 0;
    let text = CITE_RE
        .replace_all(source, |caps: &Captures| {
            count += 1;
            resolver.render(caps, diagnostics)
        })
        .into_owned();

    log::debug!(
        "Resolved {} citation commands against {} bibitems",
        count,
        bibliography.len()
    );
    (text, count)
}

/// Widest-label argument of `\begin{thebibliography}{...}`.
pub fn bibliography_label(source: &str) -> Option<String> {
    BIBLIOGRAPHY_RE
        .captures(source)
        .map(|caps| caps[1].trim().to_string())
        .filter(|label| !label.is_empty())
}
