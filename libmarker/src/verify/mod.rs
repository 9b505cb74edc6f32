mod parse;

use std::collections::HashSet;

use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::scan::MarkerHit;

/// Result of comparing reported hits with an expected output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The hits and the expected coordinates are the same set
    Pass,
    /// The first difference found
    Fail(Mismatch),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Pass`]
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Why a verification failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Mismatch {
    /// A non-empty line is not of the form `<int>, <int>`
    #[error("line {line} is not a coordinate pair: {content:?}")]
    MalformedLine {
        /// 1-based line number
        line: usize,
        /// the offending line, without its line ending
        content: String,
    },
    /// The expected output lists more coordinates than were reported
    #[error("expected output has more lines than the {hits} reported markers")]
    TooManyLines {
        /// number of reported hits
        hits: usize,
    },
    /// An expected coordinate was not reported
    #[error("expected marker ({0}) was not reported")]
    MissingHit(MarkerHit),
    /// An expected coordinate appears on more than one line
    #[error("expected marker ({hit}) is listed again on line {line}")]
    DuplicateExpected {
        /// the repeated coordinate
        hit: MarkerHit,
        /// 1-based line number of the repetition
        line: usize,
    },
    /// A reported hit has no matching line
    #[error("reported marker ({0}) is not in the expected output")]
    UnexpectedHit(MarkerHit),
    /// A hit was reported more than once
    #[error("marker ({0}) was reported more than once")]
    DuplicateHit(MarkerHit),
}

/// Compares `hits` with the contents of an expected output file
///
/// Each non-empty line of `expected` (lines end with `\n`, `\r\n` or `\r`) must read
/// `<int>, <int>`. The verification passes if the lines and the hits hold exactly the same
/// coordinates, each once, in any order. Lines are checked as they are read and the first
/// difference is returned:
///
/// - a line that does not parse fails with [`Mismatch::MalformedLine`]
/// - a line beyond the number of hits fails with [`Mismatch::TooManyLines`]
/// - a line naming an unreported coordinate fails with [`Mismatch::MissingHit`]
/// - a repeated line fails with [`Mismatch::DuplicateExpected`]
///
/// Hits left without a line fail with [`Mismatch::UnexpectedHit`].
///
/// ```rust
/// use libmarker::{verify, MarkerHit};
///
/// let hits = [MarkerHit::new(10, 20), MarkerHit::new(3, 4)];
/// assert!(verify(&hits, "3, 4\r\n10, 20\r\n").passed());
/// assert!(!verify(&hits, "10, 20\n").passed());
/// ```
#[must_use]
pub fn verify(hits: &[MarkerHit], expected: &str) -> Verdict {
    if let Some(hit) = hits.iter().duplicates().next() {
        return Verdict::Fail(Mismatch::DuplicateHit(*hit));
    }
    let reported: HashSet<MarkerHit> = hits.iter().copied().collect();
    let mut matched = HashSet::with_capacity(hits.len());

    for (count, (line, content)) in parse::non_empty_lines(expected).enumerate() {
        let Some(hit) = parse::parse_line(content) else {
            return Verdict::Fail(Mismatch::MalformedLine {
                line,
                content: content.to_owned(),
            });
        };
        if count >= hits.len() {
            return Verdict::Fail(Mismatch::TooManyLines { hits: hits.len() });
        }
        if !reported.contains(&hit) {
            return Verdict::Fail(Mismatch::MissingHit(hit));
        }
        if !matched.insert(hit) {
            return Verdict::Fail(Mismatch::DuplicateExpected { hit, line });
        }
    }

    if let Some(hit) = hits.iter().find(|hit| !matched.contains(*hit)) {
        debug!("{} of {} markers matched", matched.len(), hits.len());
        return Verdict::Fail(Mismatch::UnexpectedHit(*hit));
    }
    Verdict::Pass
}
