use std::ops::Range;

use nom::{
    bytes::complete::{tag, take},
    combinator::opt,
    number::complete::{le_i32, le_u16, le_u32},
    IResult,
};
use strum::IntoStaticStr;

use crate::error::HeaderError;

/// Signature at the start of every BMP file
pub(crate) const MAGIC: &[u8; 2] = b"BM";

/// Compression method for uncompressed RGB data
const BI_RGB: u32 = 0;
/// Compression method for bit field masks (only meaningful for 16 and 32 bpp)
const BI_BITFIELDS: u32 = 3;

/// Size of the OS/2 `BITMAPCOREHEADER`
const CORE_HEADER_SIZE: u32 = 12;

/// Parsed view of the fields of a BMP header needed to locate the pixel data
///
/// Only the fields the scanner depends on are kept. The layout read is:
/// ```"not rust"
/// offset  size  field
///      0     2  signature "BM"
///     10     4  pixel data offset
///     14     4  info header size
///     18     4  width (signed)
///     22     4  height (signed, negative for top-down rows)
///     28     2  bits per pixel
///     30     4  compression (optional, 0 when absent)
/// ```
/// When the info header size is 12 the file carries an OS/2 core header instead:
/// ```"not rust"
/// offset  size  field
///     18     2  width (unsigned)
///     20     2  height (unsigned, rows always bottom-up)
///     24     2  bits per pixel
/// ```
/// Core headers have no compression field and are read as uncompressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct BitmapHeader {
    /// Offset of the first pixel row from the start of the file
    pub pixel_data_offset: u32,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// `true` when the first stored row is the top row of the image
    pub top_down: bool,
    /// Bits per pixel
    pub bits_per_pixel: u16,
    /// Compression method
    pub compression: u32,
}

/// Pixel layouts the scanner can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum PixelFormat {
    /// 3 bytes per pixel, blue green red
    Bgr24,
    /// 4 bytes per pixel, blue green red alpha
    Bgra32,
}

impl PixelFormat {
    /// Number of bytes a single pixel occupies
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgr24 => 3,
            Self::Bgra32 => 4,
        }
    }

    /// Determines the pixel format from the header depth and compression
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::UnsupportedDepth`] or [`HeaderError::Compressed`] for layouts
    /// other than uncompressed 24 bpp and uncompressed or bit field 32 bpp
    pub const fn from_header(header: &BitmapHeader) -> Result<Self, HeaderError> {
        match (header.bits_per_pixel, header.compression) {
            (24, BI_RGB) => Ok(Self::Bgr24),
            (32, BI_RGB | BI_BITFIELDS) => Ok(Self::Bgra32),
            (24 | 32, c) => Err(HeaderError::Compressed(c)),
            (bpp, _) => Err(HeaderError::UnsupportedDepth(bpp)),
        }
    }

    /// Returns the format name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

// Runs a nom parser for a single header field, naming the field on failure
fn field<'a, O>(
    input: &'a [u8],
    name: &'static str,
    mut parser: impl FnMut(&'a [u8]) -> IResult<&'a [u8], O>,
) -> Result<(&'a [u8], O), HeaderError> {
    parser(input).map_err(|_| HeaderError::Truncated { field: name })
}

impl BitmapHeader {
    /// Parses the header at the start of `buffer`
    ///
    /// No byte past `buffer.len()` is read, regardless of what the header declares.
    ///
    /// # Errors
    ///
    /// - [`HeaderError::BadMagic`] if the buffer does not start with `BM`
    /// - [`HeaderError::Truncated`] if the buffer ends before a required field
    /// - [`HeaderError::NegativeWidth`] if the declared width is negative
    pub fn parse(buffer: &[u8]) -> Result<Self, HeaderError> {
        let (input, _) = tag::<_, _, nom::error::Error<&[u8]>>(MAGIC.as_slice())(buffer)
            .map_err(|_| HeaderError::BadMagic)?;
        // file size (4) and two reserved u16s
        let (input, _) = field(input, "file size", take(8usize))?;
        let (input, pixel_data_offset) = field(input, "pixel data offset", le_u32)?;
        let (input, info_header_size) = field(input, "info header size", le_u32)?;
        if info_header_size == CORE_HEADER_SIZE {
            return Self::parse_core(input, pixel_data_offset);
        }
        let (input, width) = field(input, "width", le_i32)?;
        let (input, height) = field(input, "height", le_i32)?;
        let (input, _) = field(input, "planes", take(2usize))?;
        let (input, bits_per_pixel) = field(input, "bits per pixel", le_u16)?;
        let (_, compression) = field(input, "compression", opt(le_u32))?;

        let width = u32::try_from(width).map_err(|_| HeaderError::NegativeWidth)?;
        Ok(Self {
            pixel_data_offset,
            width,
            height: height.unsigned_abs(),
            top_down: height < 0,
            bits_per_pixel,
            compression: compression.unwrap_or(BI_RGB),
        })
    }

    // fields following a 12 byte core header size
    fn parse_core(input: &[u8], pixel_data_offset: u32) -> Result<Self, HeaderError> {
        let (input, width) = field(input, "width", le_u16)?;
        let (input, height) = field(input, "height", le_u16)?;
        let (input, _) = field(input, "planes", take(2usize))?;
        let (_, bits_per_pixel) = field(input, "bits per pixel", le_u16)?;
        Ok(Self {
            pixel_data_offset,
            width: width.into(),
            height: height.into(),
            top_down: false,
            bits_per_pixel,
            compression: BI_RGB,
        })
    }

    /// Number of bytes per stored row, padded to a 4 byte boundary
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::Overflow`] if the stride does not fit in a `usize`
    pub fn stride(&self) -> Result<usize, HeaderError> {
        let bits = u64::from(self.width) * u64::from(self.bits_per_pixel);
        usize::try_from(bits.div_ceil(32) * 4).map_err(|_| HeaderError::Overflow)
    }

    /// Returns `true` if the image has no pixels
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte range of the pixel data, checked against a buffer of `available` bytes
    ///
    /// # Errors
    ///
    /// - [`HeaderError::Overflow`] if the range cannot be computed
    /// - [`HeaderError::PixelDataOutOfBounds`] if `pixel_data_offset + stride * height`
    ///   exceeds `available`
    pub fn pixel_data_range(&self, available: usize) -> Result<Range<usize>, HeaderError> {
        let start = usize::try_from(self.pixel_data_offset).map_err(|_| HeaderError::Overflow)?;
        let height = usize::try_from(self.height).map_err(|_| HeaderError::Overflow)?;
        let end = self
            .stride()?
            .checked_mul(height)
            .and_then(|len| start.checked_add(len))
            .ok_or(HeaderError::Overflow)?;
        if end > available {
            return Err(HeaderError::PixelDataOutOfBounds {
                required: end,
                available,
            });
        }
        Ok(start..end)
    }

    /// Returns the pixel data of `buffer` as declared by this header
    ///
    /// # Errors
    ///
    /// See [`Self::pixel_data_range`]
    pub fn pixel_data<'a>(&self, buffer: &'a [u8]) -> Result<&'a [u8], HeaderError> {
        let range = self.pixel_data_range(buffer.len())?;
        buffer.get(range).ok_or(HeaderError::Overflow)
    }
}
