//! Comment stripping.

use once_cell::sync::Lazy;
use regex::Regex;

static VERBATIM_BEGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\begin\{(verbatim\*?|lstlisting|minted)\}").unwrap());

/// Byte offset of the first unescaped `%` on a line.
///
/// A `%` is escaped when preceded by an odd number of backslashes.
pub fn comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut backslashes = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\\' => backslashes += 1,
            b'%' if backslashes % 2 == 0 => return Some(i),
            _ => backslashes = 0,
        }
    }
    None
}

/// Remove comments line by line.
///
/// Trailing whitespace before a stripped comment is trimmed; lines that were
/// nothing but a comment are dropped. Lines inside verbatim-like
/// environments pass through untouched.
pub fn strip_comments(source: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut verbatim_end: Option<String> = None;

    for line in source.split('\n') {
        if let Some(end) = &verbatim_end {
            kept.push(line);
            if line.contains(end.as_str()) {
                verbatim_end = None;
            }
            continue;
        }

        let code = match comment_start(line) {
            None => line,
            Some(i) => {
                let code = line[..i].trim_end();
                if code.trim_start().is_empty() {
                    continue;
                }
                code
            }
        };
        kept.push(code);

        if let Some(caps) = VERBATIM_BEGIN.captures(code) {
            let end = format!("\\end{{{}}}", &caps[1]);
            let opened_at = caps.get(0).map(|m| m.end()).unwrap_or(0);
            if !code[opened_at..].contains(end.as_str()) {
                verbatim_end = Some(end);
            }
        }
    }

    kept.join("\n")
}
