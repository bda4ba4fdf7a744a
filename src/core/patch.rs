//! Parsed diff model and the parsers that build it.
//!
//! A [`ParsedPatchSet`] is produced either from unified-diff text ([`ParsedPatchSet::parse`])
//! or straight from a `git2::Diff` ([`ParsedPatchSet::from_diff`]). Both keep line content
//! as raw bytes including the line terminator, so a hunk can be replayed byte for byte.
//! A line followed by a "\ No newline at end of file" marker simply carries no terminator.
//!
//! # Public API
//! - [`ParsedPatchSet`], [`ParsedPatch`], [`Hunk`], [`Line`], [`LineKind`]
//! - [`Hunk::mirrored`]: the inverse hunk used to unstage or discard
//! - [`BINARY_PATCH_PLACEHOLDER`]: text shown instead of a binary patch

use crate::core::error::{Result, WorkbenchError};
use std::path::{Path, PathBuf};

/// Shown in place of patch text when either side is binary.
pub const BINARY_PATCH_PLACEHOLDER: &str = "Binary file, no textual diff available.";

const NO_NEWLINE_MARKER: &[u8] = b"\\ No newline at end of file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub content: Vec<u8>,
    pub kind: LineKind,
}

impl Line {
    pub fn new(kind: LineKind, content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            kind,
        }
    }

    pub fn has_terminator(&self) -> bool {
        self.content.ends_with(b"\n")
    }

    fn prefix(&self) -> u8 {
        match self.kind {
            LineKind::Context => b' ',
            LineKind::Added => b'+',
            LineKind::Removed => b'-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub source_start: usize,
    pub source_length: usize,
    pub target_start: usize,
    pub target_length: usize,
    pub section_header: String,
    pub lines: Vec<Line>,
}

impl Hunk {
    /// The inverse of this hunk: source and target ranges swap, added and removed
    /// lines swap, context lines stay as they are.
    pub fn mirrored(&self) -> Hunk {
        Hunk {
            source_start: self.target_start,
            source_length: self.target_length,
            target_start: self.source_start,
            target_length: self.source_length,
            section_header: self.section_header.clone(),
            lines: self
                .lines
                .iter()
                .map(|line| Line {
                    content: line.content.clone(),
                    kind: match line.kind {
                        LineKind::Added => LineKind::Removed,
                        LineKind::Removed => LineKind::Added,
                        LineKind::Context => LineKind::Context,
                    },
                })
                .collect(),
        }
    }

    /// Number of lines before the hunk that are copied through untouched.
    ///
    /// A zero-length source range names the line the hunk is inserted after.
    pub fn lines_before(&self) -> usize {
        if self.source_length == 0 {
            self.source_start
        } else {
            self.source_start.saturating_sub(1)
        }
    }

    pub fn added_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.kind == LineKind::Added)
            .count()
    }

    pub fn removed_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.kind == LineKind::Removed)
            .count()
    }

    pub fn header_line(&self) -> String {
        let mut header = format!(
            "@@ -{},{} +{},{} @@",
            self.source_start, self.source_length, self.target_start, self.target_length
        );
        if !self.section_header.is_empty() {
            header.push(' ');
            header.push_str(&self.section_header);
        }
        header
    }

    pub fn to_text(&self) -> String {
        let mut text = self.header_line();
        text.push('\n');
        for line in &self.lines {
            let mut bytes = vec![line.prefix()];
            bytes.extend_from_slice(&line.content);
            text.push_str(&String::from_utf8_lossy(&bytes));
            if !line.has_terminator() {
                text.push('\n');
                text.push_str(&String::from_utf8_lossy(NO_NEWLINE_MARKER));
                text.push('\n');
            }
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPatch {
    pub path: PathBuf,
    pub header: String,
    pub is_binary: bool,
    pub hunks: Vec<Hunk>,
}

impl ParsedPatch {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            header: String::new(),
            is_binary: false,
            hunks: Vec::new(),
        }
    }

    pub fn hunk(&self, index: usize) -> Result<&Hunk> {
        self.hunks
            .get(index)
            .ok_or_else(|| WorkbenchError::hunk_index_out_of_range(index, self.hunks.len()))
    }

    pub fn added_count(&self) -> usize {
        self.hunks.iter().map(Hunk::added_count).sum()
    }

    pub fn removed_count(&self) -> usize {
        self.hunks.iter().map(Hunk::removed_count).sum()
    }

    /// Patch text for display, or the binary placeholder
    pub fn display_text(&self) -> String {
        if self.is_binary {
            return BINARY_PATCH_PLACEHOLDER.to_string();
        }
        let mut text = self.header.clone();
        for hunk in &self.hunks {
            text.push_str(&hunk.to_text());
        }
        text
    }

    fn validate(&self) -> Result<()> {
        for pair in self.hunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.source_start <= prev.source_start
                || next.source_start < prev.source_start + prev.source_length
            {
                return Err(WorkbenchError::malformed_diff(format!(
                    "overlapping hunks in {} at source line {}",
                    self.path.display(),
                    next.source_start
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPatchSet {
    pub patches: Vec<ParsedPatch>,
}

impl ParsedPatchSet {
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn patch(&self, index: usize) -> Result<&ParsedPatch> {
        self.patches
            .get(index)
            .ok_or_else(|| WorkbenchError::patch_index_out_of_range(index, self.patches.len()))
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.patches.iter().position(|patch| patch.path == path)
    }

    /// Parse git-style unified diff text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut patches = Vec::new();
        let mut current: Option<ParsedPatch> = None;
        let mut hunk: Option<Hunk> = None;

        for raw in text.as_bytes().split_inclusive(|&b| b == b'\n') {
            let trimmed = trim_newline(raw);

            if trimmed.starts_with(b"diff --git ") {
                flush_hunk(&mut current, &mut hunk);
                if let Some(patch) = current.take() {
                    patches.push(patch);
                }
                let mut patch = ParsedPatch::new(path_from_git_header(trimmed));
                patch.header.push_str(&String::from_utf8_lossy(raw));
                current = Some(patch);
                continue;
            }

            if trimmed.starts_with(b"@@") {
                flush_hunk(&mut current, &mut hunk);
                if current.is_none() {
                    return Err(WorkbenchError::malformed_diff(
                        "hunk header before any file header",
                    ));
                }
                hunk = Some(parse_hunk_header(trimmed)?);
                continue;
            }

            if let Some(active) = hunk.as_mut() {
                match raw.first() {
                    Some(b'+') => active.lines.push(Line::new(LineKind::Added, &raw[1..])),
                    Some(b'-') => active.lines.push(Line::new(LineKind::Removed, &raw[1..])),
                    Some(b' ') => active.lines.push(Line::new(LineKind::Context, &raw[1..])),
                    Some(b'\\') if trimmed == NO_NEWLINE_MARKER => {
                        if let Some(last) = active.lines.last_mut() {
                            strip_terminator(&mut last.content);
                        }
                    }
                    // Some tools drop the leading space on empty context lines
                    Some(b'\n') => active.lines.push(Line::new(LineKind::Context, raw)),
                    _ => {
                        flush_hunk(&mut current, &mut hunk);
                        if let Some(patch) = current.as_mut() {
                            patch.header.push_str(&String::from_utf8_lossy(raw));
                        }
                    }
                }
                continue;
            }

            if let Some(patch) = current.as_mut() {
                if trimmed.starts_with(b"Binary files ") || trimmed == b"GIT binary patch" {
                    patch.is_binary = true;
                }
                if let Some(path) = trimmed.strip_prefix(b"+++ b/") {
                    patch.path = PathBuf::from(String::from_utf8_lossy(path).into_owned());
                }
                patch.header.push_str(&String::from_utf8_lossy(raw));
            }
        }

        flush_hunk(&mut current, &mut hunk);
        if let Some(patch) = current.take() {
            patches.push(patch);
        }

        for patch in &patches {
            patch.validate()?;
        }

        Ok(Self { patches })
    }

    /// Build the model from a live `git2::Diff`.
    pub fn from_diff(diff: &git2::Diff<'_>) -> Result<Self> {
        let mut patches = Vec::new();

        for (idx, delta) in diff.deltas().enumerate() {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .ok_or(WorkbenchError::InvalidUtf8Path)?
                .to_path_buf();
            let mut parsed = ParsedPatch::new(path);

            let patch = git2::Patch::from_diff(diff, idx)?;
            let Some(mut patch) = patch else {
                parsed.is_binary = delta.flags().is_binary();
                patches.push(parsed);
                continue;
            };

            if patch.delta().flags().is_binary() {
                parsed.is_binary = true;
                patches.push(parsed);
                continue;
            }

            let full = patch.to_buf()?;
            let full = String::from_utf8_lossy(&full);
            parsed.header = match full.find("\n@@") {
                Some(pos) => full[..pos + 1].to_string(),
                None => full.into_owned(),
            };

            for hunk_idx in 0..patch.num_hunks() {
                let (raw_hunk, line_count) = patch.hunk(hunk_idx)?;
                let mut hunk = Hunk {
                    source_start: raw_hunk.old_start() as usize,
                    source_length: raw_hunk.old_lines() as usize,
                    target_start: raw_hunk.new_start() as usize,
                    target_length: raw_hunk.new_lines() as usize,
                    section_header: section_header(trim_newline(raw_hunk.header())),
                    lines: Vec::with_capacity(line_count),
                };

                for line_idx in 0..line_count {
                    let line = patch.line_in_hunk(hunk_idx, line_idx)?;
                    let kind = match line.origin() {
                        '+' => LineKind::Added,
                        '-' => LineKind::Removed,
                        ' ' => LineKind::Context,
                        // End-of-file newline markers; the line before already has no terminator
                        _ => continue,
                    };
                    hunk.lines.push(Line::new(kind, line.content()));
                }

                parsed.hunks.push(hunk);
            }

            parsed.validate()?;
            patches.push(parsed);
        }

        Ok(Self { patches })
    }
}

fn flush_hunk(current: &mut Option<ParsedPatch>, hunk: &mut Option<Hunk>) {
    if let (Some(patch), Some(done)) = (current.as_mut(), hunk.take()) {
        patch.hunks.push(done);
    }
}

fn trim_newline(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

/// Drop the diff-text newline; a `\r` before it belongs to the line.
fn strip_terminator(content: &mut Vec<u8>) {
    if content.ends_with(b"\n") {
        content.pop();
    }
}

fn path_from_git_header(line: &[u8]) -> PathBuf {
    let text = String::from_utf8_lossy(line);
    let path = text.rsplit(" b/").next().unwrap_or("");
    PathBuf::from(path)
}

fn section_header(header: &[u8]) -> String {
    let text = String::from_utf8_lossy(header);
    match text.get(2..).and_then(|rest| rest.find("@@")) {
        Some(pos) => text[pos + 4..].trim().to_string(),
        None => String::new(),
    }
}

/// Parse `@@ -a,b +c,d @@ section`; a missing count means one line.
fn parse_hunk_header(line: &[u8]) -> Result<Hunk> {
    let text = String::from_utf8_lossy(line);
    let malformed = || WorkbenchError::malformed_diff(format!("bad hunk header: {text}"));

    let inner = text
        .strip_prefix("@@ ")
        .and_then(|rest| rest.split(" @@").next())
        .ok_or_else(malformed)?;
    let mut ranges = inner.split_whitespace();
    let source = ranges
        .next()
        .and_then(|r| r.strip_prefix('-'))
        .ok_or_else(malformed)?;
    let target = ranges
        .next()
        .and_then(|r| r.strip_prefix('+'))
        .ok_or_else(malformed)?;

    let parse_range = |range: &str| -> Option<(usize, usize)> {
        match range.split_once(',') {
            Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
            None => Some((range.parse().ok()?, 1)),
        }
    };
    let (source_start, source_length) = parse_range(source).ok_or_else(malformed)?;
    let (target_start, target_length) = parse_range(target).ok_or_else(malformed)?;

    Ok(Hunk {
        source_start,
        source_length,
        target_start,
        target_length,
        section_header: section_header(line),
        lines: Vec::new(),
    })
}
