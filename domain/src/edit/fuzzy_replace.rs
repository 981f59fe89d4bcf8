//! Tolerant fragment substitution.
//!
//! Callers (usually language models) reproduce the text they want to change
//! imperfectly: wrong line endings, trimmed or shifted indentation. [`replace`]
//! tries four strategies in a fixed order and returns on the first success:
//!
//! | # | Strategy | Compares |
//! |---|----------|----------|
//! | 1 | [`MatchStrategy::Exact`] | raw substring |
//! | 2 | [`MatchStrategy::NormalizedNewlines`] | substring after CRLF → LF |
//! | 3 | [`MatchStrategy::LineTrimmed`] | line windows, each line trimmed |
//! | 4 | [`MatchStrategy::IndentFlexible`] | line windows, common indent stripped |
//!
//! The order is a tie-break policy: a fragment that both windowed strategies
//! could match is always handled by the line-trimmed one.
//!
//! Windowed strategies re-indent the replacement at the splice point while
//! keeping the replacement's own relative indentation. Blank replacement
//! lines are emitted empty. The original line-ending convention is restored.

use crate::tool::value_objects::ToolError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplaceError {
    #[error("old_string not found in file")]
    NotFound,

    #[error("old_string must not be empty")]
    EmptyFragment,
}

impl From<ReplaceError> for ToolError {
    fn from(e: ReplaceError) -> Self {
        match e {
            ReplaceError::NotFound => ToolError::not_found(e.to_string()),
            ReplaceError::EmptyFragment => ToolError::validation_failed(e.to_string()),
        }
    }
}

/// One matching strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Exact,
    NormalizedNewlines,
    LineTrimmed,
    IndentFlexible,
}

impl MatchStrategy {
    /// All strategies, in precedence order
    pub const ALL: [MatchStrategy; 4] = [
        MatchStrategy::Exact,
        MatchStrategy::NormalizedNewlines,
        MatchStrategy::LineTrimmed,
        MatchStrategy::IndentFlexible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::NormalizedNewlines => "normalized_newlines",
            MatchStrategy::LineTrimmed => "line_trimmed",
            MatchStrategy::IndentFlexible => "indent_flexible",
        }
    }

    /// Apply this strategy alone. `None` means no match; content is untouched.
    pub fn apply(&self, content: &str, old: &str, new: &str, all: bool) -> Option<String> {
        if old.is_empty() {
            return None;
        }
        match self {
            MatchStrategy::Exact => exact(content, old, new, all),
            MatchStrategy::NormalizedNewlines => normalized_newlines(content, old, new, all),
            MatchStrategy::LineTrimmed => line_trimmed(content, old, new, all),
            MatchStrategy::IndentFlexible => indent_flexible(content, old, new, all),
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub content: String,
    pub strategy: MatchStrategy,
}

/// Replace `old` with `new` in `content`.
///
/// With `all = false` only the first match in document order is replaced.
pub fn replace(content: &str, old: &str, new: &str, all: bool) -> Result<Replacement, ReplaceError> {
    if old.is_empty() {
        return Err(ReplaceError::EmptyFragment);
    }
    MatchStrategy::ALL
        .iter()
        .find_map(|strategy| {
            strategy.apply(content, old, new, all).map(|replaced| Replacement {
                content: replaced,
                strategy: *strategy,
            })
        })
        .ok_or(ReplaceError::NotFound)
}

// ==================== Strategies ====================

fn exact(content: &str, old: &str, new: &str, all: bool) -> Option<String> {
    if !content.contains(old) {
        return None;
    }
    Some(if all {
        content.replace(old, new)
    } else {
        content.replacen(old, new, 1)
    })
}

fn normalized_newlines(content: &str, old: &str, new: &str, all: bool) -> Option<String> {
    let crlf = content.contains("\r\n");
    let replaced = exact(&normalize(content), &normalize(old), &normalize(new), all)?;
    Some(restore(replaced, crlf))
}

fn line_trimmed(content: &str, old: &str, new: &str, all: bool) -> Option<String> {
    let crlf = content.contains("\r\n");
    let content = normalize(content);
    let old = normalize(old);
    let new = normalize(new);

    let lines: Vec<&str> = content.split('\n').collect();
    let search = fragment_lines(&old);
    let replacement = fragment_lines(&new);

    let spliced = splice_windows(
        &lines,
        search.len(),
        all,
        |window| {
            window
                .iter()
                .zip(&search)
                .all(|(line, wanted)| line.trim() == wanted.trim())
        },
        |window| reindent(&replacement, leading_whitespace(window[0])),
    )?;
    Some(restore(spliced, crlf))
}

fn indent_flexible(content: &str, old: &str, new: &str, all: bool) -> Option<String> {
    let crlf = content.contains("\r\n");
    let content = normalize(content);
    let old = normalize(old);
    let new = normalize(new);

    let lines: Vec<&str> = content.split('\n').collect();
    let search = fragment_lines(&old);
    let replacement = fragment_lines(&new);

    let search_indent = min_indent(&search);
    let stripped: Vec<&str> = search.iter().map(|l| strip_indent(l, search_indent)).collect();

    let spliced = splice_windows(
        &lines,
        search.len(),
        all,
        |window| {
            let indent = min_indent(window);
            window.iter().zip(&stripped).all(|(line, wanted)| {
                (is_blank(line) && is_blank(wanted)) || strip_indent(line, indent) == *wanted
            })
        },
        |window| reindent(&replacement, block_indent(window)),
    )?;
    Some(restore(spliced, crlf))
}

// ==================== Helpers ====================

fn normalize(s: &str) -> String {
    s.replace("\r\n", "\n")
}

fn restore(s: String, crlf: bool) -> String {
    if crlf { s.replace('\n', "\r\n") } else { s }
}

/// Split a fragment into lines, dropping the empty line a trailing newline produces.
fn fragment_lines(fragment: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = fragment.split('\n').collect();
    if lines.len() > 1 && lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Slide a `width`-line window over `lines`, replacing matching windows.
///
/// Returns `None` if no window matched. Without `all`, scanning stops
/// replacing after the first match.
fn splice_windows<M, R>(lines: &[&str], width: usize, all: bool, matches: M, render: R) -> Option<String>
where
    M: Fn(&[&str]) -> bool,
    R: Fn(&[&str]) -> Vec<String>,
{
    if width == 0 || width > lines.len() {
        return None;
    }

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut replaced = false;
    let mut i = 0;
    while i < lines.len() {
        let window_fits = i + width <= lines.len();
        if (all || !replaced) && window_fits && matches(&lines[i..i + width]) {
            out.extend(render(&lines[i..i + width]));
            replaced = true;
            i += width;
        } else {
            out.push(lines[i].to_string());
            i += 1;
        }
    }

    replaced.then(|| out.join("\n"))
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn leading_whitespace(line: &str) -> &str {
    &line[..indent_width(line)]
}

/// Smallest indent across non-blank lines (0 if all are blank)
fn min_indent(lines: &[&str]) -> usize {
    lines
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0)
}

/// Strip up to `n` leading indent characters
fn strip_indent(line: &str, n: usize) -> &str {
    &line[indent_width(line).min(n)..]
}

/// The window's common indent, taken verbatim from its first non-blank line
fn block_indent<'a>(window: &[&'a str]) -> &'a str {
    let width = min_indent(window);
    window
        .iter()
        .copied()
        .find(|l| !is_blank(l))
        .map(|l| &l[..width])
        .unwrap_or("")
}

/// Emit replacement lines under `indent`, keeping their relative nesting
fn reindent(replacement: &[&str], indent: &str) -> Vec<String> {
    let base = min_indent(replacement);
    replacement
        .iter()
        .map(|line| {
            if is_blank(line) {
                String::new()
            } else {
                format!("{}{}", indent, strip_indent(line, base))
            }
        })
        .collect()
}
