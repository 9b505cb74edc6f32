use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
/// Reasons a buffer is rejected as a bitmap
///
/// Every variant is reported as [`crate::ScanOutcome::NotABitmap`] by the scanner
pub enum HeaderError {
    /// The buffer does not start with the `BM` signature
    #[error("missing BM signature")]
    BadMagic,
    /// The buffer ends before a required header field
    #[error("buffer ends before header field '{field}'")]
    Truncated {
        /// name of the field that could not be read
        field: &'static str,
    },
    /// The header declares a negative image width
    #[error("negative image width")]
    NegativeWidth,
    /// Layout arithmetic does not fit in the address space
    #[error("bitmap layout overflows")]
    Overflow,
    /// The pixel data declared by the header extends past the end of the buffer
    #[error("pixel data needs {required} bytes but the buffer holds {available}")]
    PixelDataOutOfBounds {
        /// end of the pixel data as declared by the header
        required: usize,
        /// length of the buffer
        available: usize,
    },
    /// Bits per pixel other than 24 or 32
    #[error("unsupported bit depth: {0}")]
    UnsupportedDepth(u16),
    /// A compression method that is not uncompressed RGB or 32 bit bit fields
    #[error("unsupported compression method: {0}")]
    Compressed(u32),
}
