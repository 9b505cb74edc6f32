#![allow(clippy::module_name_repetitions)]

pub(crate) mod marker;

use std::{collections::HashSet, fmt::Display};

use bon::Builder;
use strum::IntoStaticStr;
use tracing::{debug, instrument, trace, warn};

use crate::{
    bitmap::{header::BitmapHeader, Bitmap},
    error::HeaderError,
    DEFAULT_CAPACITY,
};

/// Position of a detected marker
///
/// `x` grows rightwards and `y` downwards from the top-left pixel of the image as displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHit {
    /// column
    pub x: u32,
    /// row, counted from the top
    pub y: u32,
}

impl MarkerHit {
    /// Creates a new [`MarkerHit`]
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for MarkerHit {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Formats the hit the way expected output files list it: `x, y`
impl Display for MarkerHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// The result classification of a single scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum ScanOutcome {
    /// The buffer is a bitmap; holds the number of hits reported
    Success(usize),
    /// The buffer is not a bitmap, or its header describes data the buffer does not hold
    NotABitmap,
    /// The buffer could not be obtained at all
    ///
    /// Never produced by [`Scanner::scan`]; callers that load files report it
    Unreadable,
}

impl ScanOutcome {
    /// Returns the outcome name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Ordered, duplicate free list of marker hits bounded by a capacity
///
/// Hits are kept in raster order (top row first, left to right). If a scan finds more
/// distinct markers than the capacity allows, the first `capacity` hits are kept and the
/// list is flagged as truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHitList {
    hits: Vec<MarkerHit>,
    seen: HashSet<MarkerHit>,
    capacity: usize,
    truncated: bool,
}

impl MarkerHitList {
    /// Creates an empty list that accepts at most `capacity` hits
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            hits: Vec::new(),
            seen: HashSet::new(),
            capacity,
            truncated: false,
        }
    }

    /// Appends `hit` unless it is already present
    ///
    /// Returns `false` if the list is full, in which case it is flagged as truncated
    pub(crate) fn push(&mut self, hit: MarkerHit) -> bool {
        if self.seen.contains(&hit) {
            return true;
        }
        if self.hits.len() >= self.capacity {
            self.truncated = true;
            return false;
        }
        self.seen.insert(hit);
        self.hits.push(hit);
        true
    }

    /// Returns the hits in the order they were found
    #[must_use]
    pub fn as_slice(&self) -> &[MarkerHit] {
        &self.hits
    }

    /// Returns an iterator over the hits in the order they were found
    pub fn iter(&self) -> std::slice::Iter<'_, MarkerHit> {
        self.hits.iter()
    }

    /// Returns the number of hits
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns `true` if no hit was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns `true` if the list contains `hit`
    #[must_use]
    pub fn contains(&self, hit: &MarkerHit) -> bool {
        self.seen.contains(hit)
    }

    /// Returns the maximum number of hits this list accepts
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if more markers were found than the capacity allowed
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl Default for MarkerHitList {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AsRef<[MarkerHit]> for MarkerHitList {
    fn as_ref(&self) -> &[MarkerHit] {
        &self.hits
    }
}

impl<'a> IntoIterator for &'a MarkerHitList {
    type Item = &'a MarkerHit;
    type IntoIter = std::slice::Iter<'a, MarkerHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

/// Locates corner markers in BMP buffers
///
/// ```rust
/// use libmarker::{Scanner, ScanOutcome};
///
/// let scanner = Scanner::builder().capacity(10).build();
/// let (outcome, hits) = scanner.scan(b"not a bitmap");
/// assert_eq!(outcome, ScanOutcome::NotABitmap);
/// assert!(hits.is_empty());
/// ```
#[derive(Builder, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanner {
    /// Maximum number of hits reported by a single scan
    #[builder(default = DEFAULT_CAPACITY)]
    capacity: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Scanner {
    /// Returns the maximum number of hits reported by a single scan
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Scans `buffer` for markers
    ///
    /// Any byte sequence is accepted. Buffers that are not bitmaps, whose header is
    /// truncated, or whose header declares more pixel data than the buffer holds are
    /// reported as [`ScanOutcome::NotABitmap`] with an empty list. Otherwise the outcome is
    /// [`ScanOutcome::Success`] holding the length of the returned list.
    #[must_use]
    #[instrument(skip(buffer), fields(len = buffer.len()))]
    pub fn scan(&self, buffer: &[u8]) -> (ScanOutcome, MarkerHitList) {
        match self.find_markers(buffer) {
            Ok(hits) => {
                debug!("found {} markers", hits.len());
                (ScanOutcome::Success(hits.len()), hits)
            }
            Err(e) => {
                debug!("not a bitmap: {e}");
                (ScanOutcome::NotABitmap, MarkerHitList::new(self.capacity))
            }
        }
    }

    fn find_markers(&self, buffer: &[u8]) -> Result<MarkerHitList, HeaderError> {
        let header = BitmapHeader::parse(buffer)?;
        trace!("Header: {header:?}");
        let mut hits = MarkerHitList::new(self.capacity);
        if header.is_empty() {
            // the pixel data must still be in bounds, its format is irrelevant
            header.pixel_data_range(buffer.len())?;
            return Ok(hits);
        }

        let bitmap = Bitmap::new(header, buffer)?;
        for y in 0..bitmap.height() {
            for x in 0..bitmap.width() {
                let Some(corner) = marker::match_corner(&bitmap, x, y) else {
                    continue;
                };
                trace!(
                    "marker at ({x}, {y}), arm {}, thickness {}",
                    corner.arm,
                    corner.thickness
                );
                if !hits.push(MarkerHit::new(x, y)) {
                    warn!(
                        "more than {} markers found, ignoring the rest",
                        self.capacity
                    );
                    return Ok(hits);
                }
            }
        }
        Ok(hits)
    }
}
