//! Recursive `\input` / `\include` expansion.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::comments::comment_start;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Default nesting limit for inclusion expansion.
pub const MAX_INCLUDE_DEPTH: usize = 16;

static INCLUDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:input|include)\{([^}]+)\}").unwrap());

/// Expand inclusion directives in `source`, resolving names against `base_dir`.
///
/// Nested files resolve relative to their own directory. Directives that
/// cannot be expanded are left in place and reported.
pub fn expand_includes(
    source: &str,
    base_dir: &Path,
    max_depth: usize,
    diagnostics: &mut Diagnostics,
) -> String {
    expand(source, base_dir, 0, max_depth, diagnostics)
}

fn expand(
    source: &str,
    dir: &Path,
    depth: usize,
    max_depth: usize,
    diagnostics: &mut Diagnostics,
) -> String {
    let mut out = String::with_capacity(source.len());
    for (i, line) in source.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let limit = comment_start(line).unwrap_or(line.len());
        let (code, comment) = line.split_at(limit);
        let expanded = INCLUDE_RE.replace_all(code, |caps: &Captures| {
            resolve(caps, dir, depth, max_depth, diagnostics)
        });
        out.push_str(&expanded);
        out.push_str(comment);
    }
    out
}

fn resolve(
    caps: &Captures,
    dir: &Path,
    depth: usize,
    max_depth: usize,
    diagnostics: &mut Diagnostics,
) -> String {
    let directive = &caps[0];
    let mut name = caps[1].trim().to_string();
    if Path::new(&name).extension().is_none() {
        name.push_str(".tex");
    }
    let path = dir.join(&name);

    if depth >= max_depth {
        diagnostics.push(
            DiagnosticKind::IncludeDepthExceeded,
            format!("{} not expanded: nesting deeper than {}", path.display(), max_depth),
        );
        return directive.to_string();
    }

    match fs::read_to_string(&path) {
        Ok(content) => {
            log::debug!("Expanding {}", path.display());
            let sub_dir = path.parent().unwrap_or(dir);
            expand(&content, sub_dir, depth + 1, max_depth, diagnostics)
        }
        Err(e) => {
            diagnostics.push(
                DiagnosticKind::MissingInclude,
                format!("{}: {}", path.display(), e),
            );
            directive.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_present_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("intro.tex"), "Intro text").unwrap();

        let mut diags = Diagnostics::new();
        let out = expand_includes("A\n\\input{intro}\nB", dir.path(), MAX_INCLUDE_DEPTH, &mut diags);
        assert_eq!(out, "A\nIntro text\nB");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_missing_file_left_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut diags = Diagnostics::new();
        let out = expand_includes("\\input{missing}", dir.path(), MAX_INCLUDE_DEPTH, &mut diags);
        assert_eq!(out, "\\input{missing}");
        assert_eq!(diags.count(DiagnosticKind::MissingInclude), 1);
    }

    #[test]
    fn test_nested_resolves_relative_to_including_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("chapters")).unwrap();
        fs::write(dir.path().join("chapters/one.tex"), "One \\input{detail}").unwrap();
        fs::write(dir.path().join("chapters/detail.tex"), "deep").unwrap();

        let mut diags = Diagnostics::new();
        let out = expand_includes("\\include{chapters/one}", dir.path(), MAX_INCLUDE_DEPTH, &mut diags);
        assert_eq!(out, "One deep");
    }

    #[test]
    fn test_cycle_stops_at_depth_cap() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("loop.tex"), "x\\input{loop}").unwrap();

        let mut diags = Diagnostics::new();
        let out = expand_includes("\\input{loop}", dir.path(), 3, &mut diags);
        assert_eq!(out, "xxx\\input{loop}");
        assert_eq!(diags.count(DiagnosticKind::IncludeDepthExceeded), 1);
    }

    #[test]
    fn test_commented_directive_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut diags = Diagnostics::new();
        let out = expand_includes("text % \\input{old}", dir.path(), MAX_INCLUDE_DEPTH, &mut diags);
        assert_eq!(out, "text % \\input{old}");
        assert!(diags.is_empty());
    }
}
