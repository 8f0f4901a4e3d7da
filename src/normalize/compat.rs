//! Rewrites for constructs the conversion engine mishandles.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern and replacement (`${n}` group syntax), applied in order.
const REWRITES: &[(&str, &str)] = &[
    // \mathbb needs bbm for digits
    (r"\\mathbb\{(\d)\}", r"\mathbf{${1}}"),
    (r"\\boldsymbol\{([^}]+)\}", r"\mathbf{${1}}"),
    // Old-style font switches lose their content
    (r"\{\\em\s+([^}]+)\}", r"\emph{${1}}"),
    (r"\{\\bf\s+([^}]+)\}", r"\textbf{${1}}"),
    (r"\{\\it\s+([^}]+)\}", r"\textit{${1}}"),
    // threeparttable
    (r"\\begin\{threeparttable\}", ""),
    (r"\\end\{threeparttable\}", ""),
    (r"(?s)\\begin\{tablenotes\}.*?\\end\{tablenotes\}", ""),
    // fancyhdr
    (r"\\usepackage(\[[^\]]*\])?\{fancyhdr\}.*?\n", "\n"),
    (r"\\pagestyle\{fancy\}.*?\n", "\n"),
    (r"\\fancyhf\{\}.*?\n", "\n"),
    (r"\\renewcommand\{\\(head|foot)rulewidth\}.*?\n", "\n"),
    (r"\\[rlc]head\{.*?\}.*?\n", "\n"),
    (r"\\[rlc]foot\{.*?\}.*?\n", "\n"),
    (r"\\fancy(head|foot)(\[[^\]]*\])?\{.*?\}.*?\n", "\n"),
    // titlesec
    (r"\\titleformat\*?\{.*?\}.*?\n", "\n"),
    (r"\\titlespacing\*?\{.*?\}.*?\n", "\n"),
    (r"\\usepackage(\[[^\]]*\])?\{titlesec\}.*?\n", "\n"),
];

static COMPILED: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    REWRITES
        .iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
        .collect()
});

static AMSMATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\usepackage(\[[^\]]*\])?\{[^}]*\bamsmath\b[^}]*\}").unwrap());

const BEGIN_DOCUMENT: &str = "\\begin{document}";

/// Apply the fixed rewrite table, then ensure `amsmath` is loaded.
pub fn apply_compat_rewrites(source: &str) -> String {
    let mut text = source.to_string();
    for (re, replacement) in COMPILED.iter() {
        if re.is_match(&text) {
            text = re.replace_all(&text, *replacement).into_owned();
        }
    }
    inject_amsmath(&text)
}

/// Insert `\usepackage{amsmath}` before `\begin{document}` unless already present.
pub fn inject_amsmath(source: &str) -> String {
    if AMSMATH_RE.is_match(source) {
        return source.to_string();
    }
    match source.find(BEGIN_DOCUMENT) {
        Some(at) => {
            let mut out = String::with_capacity(source.len() + 24);
            out.push_str(&source[..at]);
            out.push_str("\\usepackage{amsmath}\n");
            out.push_str(&source[at..]);
            out
        }
        None => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_rewrites() {
        assert_eq!(apply_compat_rewrites(r"$\mathbb{1}$"), r"$\mathbf{1}$");
        assert_eq!(apply_compat_rewrites(r"$\mathbb{R}$"), r"$\mathbb{R}$");
        assert_eq!(apply_compat_rewrites(r"$\boldsymbol{x}$"), r"$\mathbf{x}$");
    }

    #[test]
    fn test_font_switches() {
        assert_eq!(
            apply_compat_rewrites(r"{\em word} {\bf strong} {\it slant}"),
            r"\emph{word} \textbf{strong} \textit{slant}"
        );
    }

    #[test]
    fn test_table_wrappers_removed() {
        let src = "\\begin{threeparttable}\nT\n\\begin{tablenotes}\n\\item n\n\\end{tablenotes}\n\\end{threeparttable}";
        assert_eq!(apply_compat_rewrites(src), "\nT\n\n");
    }

    #[test]
    fn test_header_setup_removed() {
        let src = "\\usepackage{fancyhdr}\n\\pagestyle{fancy}\n\\fancyhf{}\n\\fancyhead[L]{Title}\n\\rhead{x}\n\\titleformat{\\section}{\\bf}{}{0pt}{}\nBody";
        let out = apply_compat_rewrites(src);
        assert!(!out.contains("fancy"));
        assert!(!out.contains("rhead"));
        assert!(!out.contains("titleformat"));
        assert!(out.ends_with("Body"));
    }

    #[test]
    fn test_amsmath_injected_once() {
        let src = "\\documentclass{article}\n\\begin{document}\nx\n\\end{document}";
        let once = inject_amsmath(src);
        assert!(once.contains("\\usepackage{amsmath}\n\\begin{document}"));
        assert_eq!(inject_amsmath(&once), once);
        assert_eq!(apply_compat_rewrites(&once), once);
    }

    #[test]
    fn test_amsmath_detected_in_package_list() {
        let src = "\\usepackage[fleqn]{amssymb,amsmath}\n\\begin{document}";
        assert_eq!(inject_amsmath(src), src);
        // amssymb alone does not count.
        let src = "\\usepackage{amssymb}\n\\begin{document}";
        assert!(inject_amsmath(src).contains("\\usepackage{amsmath}"));
    }
}
