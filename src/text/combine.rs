//! Re-joining of hard-wrapped comment prose.
//!
//! Each line keeps its position in the output: a line merged into an earlier
//! one is replaced by an empty placeholder and flagged in `combined`, so a
//! translation can later be laid back over the original line ranges.

/// Characters that end a sentence
const END_MARKS: &[char] = &['.', '!', '?', '。', '！', '？', '…'];

/// Output of [`combine_lines`], both vectors as long as the input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedLines {
    /// `true` where the line was merged into an earlier one
    pub combined: Vec<bool>,
    /// Merged text at surviving positions, `""` at merged positions
    pub lines: Vec<String>,
}

impl CombinedLines {
    /// Surviving lines joined with newlines
    ///
    /// Placeholders are skipped. A run of blank lines between two text lines
    /// becomes one empty line, so paragraphs stay apart; blank lines at either
    /// end are dropped.
    pub fn merged_text(&self) -> String {
        let mut out = String::new();
        let mut pending_break = false;
        for (line, &merged) in self.lines.iter().zip(&self.combined) {
            if merged {
                continue;
            }
            if line.trim().is_empty() {
                pending_break = !out.is_empty();
                continue;
            }
            if !out.is_empty() {
                out.push_str(if pending_break { "\n\n" } else { "\n" });
            }
            out.push_str(line);
            pending_break = false;
        }
        out
    }
}

/// Merge continuation lines into the line they continue
///
/// Line `i` is appended (with one space) to the most recent unmerged line
/// when that line starts with an upper-case letter and ends with an end mark,
/// and line `i` starts with a lower-case letter.
pub fn combine_lines<S: AsRef<str>>(lines: &[S]) -> CombinedLines {
    let mut out = CombinedLines {
        combined: Vec::with_capacity(lines.len()),
        lines: Vec::with_capacity(lines.len()),
    };
    let mut anchor: Option<usize> = None;

    for line in lines {
        let line = line.as_ref();

        if let Some(idx) = anchor {
            let prev = &out.lines[idx];
            if starts_upper(prev) && has_end_mark(prev) && starts_lower(line) {
                let merged = format!("{} {}", prev, line);
                out.lines[idx] = merged;
                out.lines.push(String::new());
                out.combined.push(true);
                continue;
            }
        }

        anchor = Some(out.lines.len());
        out.lines.push(line.to_string());
        out.combined.push(false);
    }

    out
}

fn starts_upper(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_uppercase)
}

fn starts_lower(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_lowercase)
}

fn has_end_mark(text: &str) -> bool {
    text.trim_end()
        .chars()
        .last()
        .is_some_and(|c| END_MARKS.contains(&c))
}
