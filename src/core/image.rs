//! CPU-side RGBA8 image used for framebuffer readback.

use super::ConsoleError;

/// Row order of a raw pixel buffer coming from a framebuffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowOrder {
    /// First row in memory is the top of the picture.
    TopDown,
    /// First row in memory is the bottom of the picture (GL-style origin).
    BottomUp,
}

/// Owned `width x height` RGBA8 pixel buffer, rows stored top-down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Allocates a transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Image {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
        }
    }

    fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * Self::BYTES_PER_PIXEL
    }

    /// Wraps an existing top-down RGBA8 buffer.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ConsoleError> {
        let expected = Self::byte_len(width, height);
        if data.len() != expected {
            return Err(ConsoleError::ShapeMismatch {
                what: "image data",
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Image {
            width,
            height,
            data,
        })
    }

    /// Wraps a buffer in the given row order, normalizing it to top-down.
    pub fn from_rows(
        width: u32,
        height: u32,
        data: Vec<u8>,
        order: RowOrder,
    ) -> Result<Self, ConsoleError> {
        let mut image = Self::from_raw(width, height, data)?;
        if order == RowOrder::BottomUp {
            image.flip_vertical();
        }
        Ok(image)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL)
    }

    /// Returns the RGBA value at `(x, y)`, or `None` if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[i..i + Self::BYTES_PER_PIXEL]);
        Some(px)
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + Self::BYTES_PER_PIXEL].copy_from_slice(&rgba);
        }
    }

    /// Contiguous RGBA8 data, rows top-down.
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    pub fn raw_data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Reverses row order in place. Swaps exactly `height / 2` row pairs;
    /// an odd middle row stays put. Returns the number of pairs swapped.
    pub fn flip_vertical(&mut self) -> usize {
        let stride = self.width as usize * Self::BYTES_PER_PIXEL;
        let height = self.height as usize;
        if stride == 0 {
            return 0;
        }
        let pairs = height / 2;
        for y in 0..pairs {
            let (upper, lower) = self.data.split_at_mut((height - 1 - y) * stride);
            upper[y * stride..(y + 1) * stride].swap_with_slice(&mut lower[..stride]);
        }
        pairs
    }
}
