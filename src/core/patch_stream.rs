//! Line-level replay of selected hunks over original content.
//!
//! [`reconstruct`] walks the original bytes line by line. Lines outside the hunks are
//! copied verbatim. Inside a hunk, context and removed lines advance the original, and
//! only context and added lines reach the output. Added lines take the terminator style
//! of the original when the original has used exactly one style so far; with mixed
//! styles they keep their own terminator.

use crate::core::patch::{Hunk, LineKind};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    /// Terminator style of a single line, None if it has no terminator
    pub fn of(line: &[u8]) -> Option<LineEnding> {
        if line.ends_with(b"\r\n") {
            Some(LineEnding::CrLf)
        } else if line.ends_with(b"\n") {
            Some(LineEnding::Lf)
        } else if line.ends_with(b"\r") {
            Some(LineEnding::Cr)
        } else {
            None
        }
    }

    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::Lf => b"\n",
            LineEnding::CrLf => b"\r\n",
            LineEnding::Cr => b"\r",
        }
    }

    fn len(self) -> usize {
        self.as_bytes().len()
    }
}

/// Counts of each terminator style observed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineEndingTally {
    pub lf: usize,
    pub crlf: usize,
    pub cr: usize,
}

impl LineEndingTally {
    pub fn observe(&mut self, line: &[u8]) {
        match LineEnding::of(line) {
            Some(LineEnding::Lf) => self.lf += 1,
            Some(LineEnding::CrLf) => self.crlf += 1,
            Some(LineEnding::Cr) => self.cr += 1,
            None => {}
        }
    }

    /// The only style seen so far. None when nothing was seen or styles are mixed.
    pub fn dominant(&self) -> Option<LineEnding> {
        match (self.lf > 0, self.crlf > 0, self.cr > 0) {
            (true, false, false) => Some(LineEnding::Lf),
            (false, true, false) => Some(LineEnding::CrLf),
            (false, false, true) => Some(LineEnding::Cr),
            _ => None,
        }
    }

    pub fn is_mixed(&self) -> bool {
        [self.lf, self.crlf, self.cr]
            .iter()
            .filter(|&&count| count > 0)
            .count()
            > 1
    }
}

/// Split content into lines on `\n`, each keeping its terminator (`\n` or `\r\n`).
/// A bare `\r` is line content; it can only end the final, unterminated line.
pub fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    content.split_inclusive(|&b| b == b'\n').collect()
}

/// Re-terminate `line` with `ending`, leaving unterminated lines alone
fn normalize(line: &[u8], ending: LineEnding) -> Cow<'_, [u8]> {
    if ending == LineEnding::Cr {
        return Cow::Borrowed(line);
    }
    match LineEnding::of(line) {
        Some(current @ (LineEnding::Lf | LineEnding::CrLf)) if current != ending => {
            let mut out = line[..line.len() - current.len()].to_vec();
            out.extend_from_slice(ending.as_bytes());
            Cow::Owned(out)
        }
        _ => Cow::Borrowed(line),
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Copying original lines up to the start of hunk `n`
    Before(usize),
    /// Replaying line `line` of hunk `hunk`
    Within { hunk: usize, line: usize },
    /// Copying the rest of the original
    After,
}

/// Lazy output of [`reconstruct`]. Consumed once.
pub struct PatchStream<'a> {
    original: Vec<&'a [u8]>,
    position: usize,
    hunks: &'a [Hunk],
    phase: Phase,
    tally: LineEndingTally,
}

impl<'a> PatchStream<'a> {
    fn read_original(&mut self) -> Option<&'a [u8]> {
        let line = self.original.get(self.position).copied()?;
        self.position += 1;
        self.tally.observe(line);
        Some(line)
    }

    /// Terminator counts over the original lines consumed so far
    pub fn tally(&self) -> LineEndingTally {
        self.tally
    }
}

impl<'a> Iterator for PatchStream<'a> {
    type Item = Cow<'a, [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.phase {
                Phase::Before(n) => {
                    let hunks = self.hunks;
                    let Some(hunk) = hunks.get(n) else {
                        self.phase = Phase::After;
                        continue;
                    };
                    if self.position < hunk.lines_before() {
                        match self.read_original() {
                            Some(line) => return Some(Cow::Borrowed(line)),
                            None => {
                                log::debug!(
                                    "Original ended before hunk at source line {}",
                                    hunk.source_start
                                );
                                self.phase = Phase::Within { hunk: n, line: 0 };
                            }
                        }
                    } else {
                        self.phase = Phase::Within { hunk: n, line: 0 };
                    }
                }
                Phase::Within { hunk, line } => {
                    let hunks = self.hunks;
                    let Some(current) = hunks[hunk].lines.get(line) else {
                        self.phase = Phase::Before(hunk + 1);
                        continue;
                    };
                    self.phase = Phase::Within {
                        hunk,
                        line: line + 1,
                    };

                    match current.kind {
                        LineKind::Removed => {
                            self.read_original();
                        }
                        LineKind::Context => {
                            let emitted = self
                                .read_original()
                                .unwrap_or(current.content.as_slice());
                            return Some(Cow::Borrowed(emitted));
                        }
                        LineKind::Added => {
                            let content = current.content.as_slice();
                            return Some(match self.tally.dominant() {
                                Some(ending) => normalize(content, ending),
                                None => {
                                    if self.tally.is_mixed() {
                                        log::trace!("Mixed line endings, keeping hunk terminator");
                                    }
                                    Cow::Borrowed(content)
                                }
                            });
                        }
                    }
                }
                Phase::After => {
                    return self.read_original().map(Cow::Borrowed);
                }
            }
        }
    }
}

/// Replay `hunks` (ordered, non-overlapping, in source coordinates) over `original`.
pub fn reconstruct<'a>(original: &'a [u8], hunks: &'a [Hunk]) -> PatchStream<'a> {
    PatchStream {
        original: split_lines(original),
        position: 0,
        hunks,
        phase: Phase::Before(0),
        tally: LineEndingTally::default(),
    }
}

/// Convenience wrapper collecting the stream into one buffer
pub fn reconstruct_to_vec(original: &[u8], hunks: &[Hunk]) -> Vec<u8> {
    let mut out = Vec::with_capacity(original.len());
    for line in reconstruct(original, hunks) {
        out.extend_from_slice(&line);
    }
    out
}
