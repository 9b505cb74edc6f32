#![allow(clippy::module_name_repetitions)]

pub(crate) mod header;

use header::{BitmapHeader, PixelFormat};
use tracing::trace;

use crate::error::HeaderError;

/// A read-only view over the pixel data of an uncompressed BMP buffer
///
/// Coordinates are top-down: `y = 0` is the first row of the image as displayed,
/// whichever order the rows are stored in.
#[derive(Debug, Clone, Copy)]
pub struct Bitmap<'a> {
    header: BitmapHeader,
    format: PixelFormat,
    stride: usize,
    pixels: &'a [u8],
}

impl<'a> Bitmap<'a> {
    /// Creates a view over `buffer` described by an already parsed `header`
    ///
    /// # Errors
    ///
    /// This function errors if the pixel data does not fit in the buffer or if the pixel
    /// layout is not supported. See [`BitmapHeader::pixel_data_range`] and
    /// [`PixelFormat::from_header`]
    pub fn new(header: BitmapHeader, buffer: &'a [u8]) -> Result<Self, HeaderError> {
        let pixels = header.pixel_data(buffer)?;
        let format = PixelFormat::from_header(&header)?;
        let stride = header.stride()?;
        trace!(
            "{}x{} {} bitmap, stride {stride}",
            header.width,
            header.height,
            format.as_str()
        );
        Ok(Self {
            header,
            format,
            stride,
            pixels,
        })
    }

    /// Parses the header of `buffer` and creates a view over its pixel data
    ///
    /// # Errors
    ///
    /// See [`BitmapHeader::parse`] and [`Self::new`]
    pub fn from_bytes(buffer: &'a [u8]) -> Result<Self, HeaderError> {
        Self::new(BitmapHeader::parse(buffer)?, buffer)
    }

    /// Returns the parsed header
    #[must_use]
    pub const fn header(&self) -> &BitmapHeader {
        &self.header
    }

    /// Returns the image width
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.header.width
    }

    /// Returns the image height
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.header.height
    }

    /// Returns the blue, green and red channels of the pixel at `(x, y)`
    ///
    /// Returns [`None`] outside the image
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let row = if self.header.top_down {
            y
        } else {
            self.height() - 1 - y
        };
        let start = usize::try_from(row)
            .ok()?
            .checked_mul(self.stride)?
            .checked_add(usize::try_from(x).ok()?.checked_mul(self.format.bytes_per_pixel())?)?;
        let channels = self.pixels.get(start..start.checked_add(3)?)?;
        <[u8; 3]>::try_from(channels).ok()
    }

    /// Returns `true` if the pixel at `(x, y)` is inside the image and all of its color
    /// channels are zero
    ///
    /// Takes signed coordinates so neighbours of edge pixels can be probed directly
    #[must_use]
    pub fn is_black(&self, x: i64, y: i64) -> bool {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return false;
        };
        self.pixel(x, y) == Some([0, 0, 0])
    }
}
