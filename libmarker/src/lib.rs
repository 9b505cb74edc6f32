//! # libmarker
//!
//!
//! This library locates corner markers in uncompressed BMP images and verifies the reported
//! positions against expected output files.
//!
//! It works on in-memory buffers only: loading files, walking directories and printing results
//! are left to the caller (see the `markr` tool).
//!
//! ### Markers
//!
//! A marker is a solid black "L": a vertical arm rising from a corner pixel and a horizontal
//! arm extending right from the same pixel. Both arms have the same length `n >= 2` and the same
//! thickness `t < n`. The figure must be isolated: every pixel of the one pixel ring around its
//! bounding box that lies inside the image is non-black. A pixel is black when all of its color
//! channels are `0`; alpha is ignored.
//!
//! ```"not rust"
//!  .....
//!  .#...
//!  .#...     arm 3, thickness 1, reported at the bottom-left '#'
//!  .###.
//!  .....
//! ```
//!
//! Each marker is reported once, at its corner (the bottom-left pixel of the figure).
//! Coordinates are top-down: `(0, 0)` is the top-left pixel of the image as displayed,
//! regardless of whether the file stores its rows bottom-up (positive height) or top-down
//! (negative height).
//!
//! ### Supported bitmaps
//!
//! 24 bits per pixel uncompressed, and 32 bits per pixel either uncompressed or with bit field
//! masks in the conventional BGRA order. Both the Windows info header and the 12 byte OS/2 core
//! header are understood. Anything else is reported as
//! [`ScanOutcome::NotABitmap`], except images with zero pixels, which always scan successfully
//! with no hits.
//!
//! ### Usage
//!
//! ```rust
//! use libmarker::{verify, ScanOutcome, Scanner};
//!
//! // "BM" followed by a zero filled header declaring a 0x0 image
//! let mut buffer = vec![0u8; 54];
//! buffer[..2].copy_from_slice(b"BM");
//!
//! let (outcome, hits) = Scanner::default().scan(&buffer);
//! assert_eq!(outcome, ScanOutcome::Success(0));
//! assert!(verify(hits.as_slice(), "").passed());
//! ```
//!
//! ### Capacity
//!
//! A scan reports at most [`Scanner::capacity`] hits ([`DEFAULT_CAPACITY`] unless configured
//! through [`Scanner::builder`]). Hits beyond the capacity are dropped and the returned
//! [`MarkerHitList`] is flagged with [`MarkerHitList::is_truncated`].
//!

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

/// Module containing the BMP header parser and pixel view
pub mod bitmap;
mod error;
mod scan;
mod verify;

pub use bitmap::header::{BitmapHeader, PixelFormat};
pub use bitmap::Bitmap;
pub use error::HeaderError;
pub use scan::{MarkerHit, MarkerHitList, ScanOutcome, Scanner};
pub use verify::{verify, Mismatch, Verdict};

/// Default maximum number of hits reported by a single scan
pub const DEFAULT_CAPACITY: usize = 50;

/// Scans `buffer` with a default [`Scanner`]
///
/// See [`Scanner::scan`]
#[must_use]
pub fn scan(buffer: &[u8]) -> (ScanOutcome, MarkerHitList) {
    Scanner::default().scan(buffer)
}
