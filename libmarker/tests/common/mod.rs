#![allow(dead_code)]

use std::collections::HashSet;

pub const HEADER_LEN: usize = 54;

/// Builds uncompressed BMP buffers with white backgrounds and black pixels
pub struct BmpBuilder {
    width: u32,
    height: u32,
    bits_per_pixel: u16,
    top_down: bool,
    black: HashSet<(u32, u32)>,
}

impl BmpBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits_per_pixel: 24,
            top_down: false,
            black: HashSet::new(),
        }
    }

    pub fn bits_per_pixel(mut self, bits_per_pixel: u16) -> Self {
        self.bits_per_pixel = bits_per_pixel;
        self
    }

    pub fn top_down(mut self) -> Self {
        self.top_down = true;
        self
    }

    pub fn black(mut self, x: u32, y: u32) -> Self {
        self.black.insert((x, y));
        self
    }

    /// Draws a marker with its corner at `(x, y)` (top-down coordinates)
    pub fn marker(mut self, x: u32, y: u32, arm: u32, thickness: u32) -> Self {
        for u in x..x + arm {
            for v in y + 1 - arm..=y {
                if u < x + thickness || v + thickness > y {
                    self.black.insert((u, v));
                }
            }
        }
        self
    }

    pub fn stride(&self) -> usize {
        (self.width as usize * usize::from(self.bits_per_pixel)).div_ceil(32) * 4
    }

    pub fn build(&self) -> Vec<u8> {
        let bytes_per_pixel = usize::from(self.bits_per_pixel / 8);
        let stride = self.stride();
        let data_len = stride * self.height as usize;
        let height = i32::try_from(self.height).unwrap();

        let mut buf = Vec::with_capacity(HEADER_LEN + data_len);
        buf.extend_from_slice(b"BM");
        buf.extend_from_slice(&u32::try_from(HEADER_LEN + data_len).unwrap().to_le_bytes());
        buf.extend_from_slice(&[0; 4]);
        buf.extend_from_slice(&u32::try_from(HEADER_LEN).unwrap().to_le_bytes());
        buf.extend_from_slice(&40u32.to_le_bytes());
        buf.extend_from_slice(&i32::try_from(self.width).unwrap().to_le_bytes());
        buf.extend_from_slice(&(if self.top_down { -height } else { height }).to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&self.bits_per_pixel.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&u32::try_from(data_len).unwrap().to_le_bytes());
        buf.extend_from_slice(&[0; 16]);
        assert_eq!(buf.len(), HEADER_LEN);

        for row in 0..self.height {
            let y = if self.top_down {
                row
            } else {
                self.height - 1 - row
            };
            let mut data = vec![0u8; stride];
            for x in 0..self.width {
                if !self.black.contains(&(x, y)) {
                    let start = x as usize * bytes_per_pixel;
                    data[start..start + 3].fill(0xff);
                }
                if bytes_per_pixel == 4 {
                    // alpha is never inspected
                    data[x as usize * 4 + 3] = 0xff;
                }
            }
            buf.extend(data);
        }
        buf
    }
}
