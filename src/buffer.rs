//! Borrowed views over surface pixel memory.
//!
//! [`PixelSlice`] and [`PixelSliceMut`] are what a surface lock hands out.
//! They know the stride and pixel word size, so callers address pixels by
//! `(x, y)` instead of raw offsets, and they release the surface when
//! dropped.

use core::fmt;

use crate::pixel::ByteOrder;

// ---------------------------------------------------------------------------
// BufferError
// ---------------------------------------------------------------------------

/// Errors from forming a pixel view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BufferError {
    /// Data slice is too small for the given dimensions and stride.
    InsufficientData,
    /// Stride is smaller than `width * bytes_per_pixel`.
    StrideTooSmall,
    /// Width, height, or pixel size is zero or causes overflow.
    InvalidDimensions,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData => {
                write!(f, "data slice is too small for the given dimensions")
            }
            Self::StrideTooSmall => write!(f, "stride is smaller than width * bytes_per_pixel"),
            Self::InvalidDimensions => write!(f, "width or height is zero or causes overflow"),
        }
    }
}

impl core::error::Error for BufferError {}

/// Shape shared by both view types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Layout {
    width: u32,
    rows: u32,
    stride: usize,
    bytes_per_pixel: usize,
    byte_order: ByteOrder,
}

impl Layout {
    fn validate(self, len: usize) -> Result<Self, BufferError> {
        if !(1..=4).contains(&self.bytes_per_pixel) {
            return Err(BufferError::InvalidDimensions);
        }
        let min_stride = (self.width as usize)
            .checked_mul(self.bytes_per_pixel)
            .ok_or(BufferError::InvalidDimensions)?;
        if self.stride < min_stride {
            return Err(BufferError::StrideTooSmall);
        }
        if self.rows > 0 && len < required_bytes(self.rows, self.stride, min_stride)? {
            return Err(BufferError::InsufficientData);
        }
        Ok(self)
    }

    #[inline]
    fn row_range(&self, y: u32) -> core::ops::Range<usize> {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        let start = y as usize * self.stride;
        start..start + self.width as usize * self.bytes_per_pixel
    }

    #[inline]
    fn pixel_range(&self, x: u32, y: u32) -> core::ops::Range<usize> {
        assert!(
            x < self.width,
            "column index {x} out of bounds (width: {})",
            self.width
        );
        let start = self.row_range(y).start + x as usize * self.bytes_per_pixel;
        start..start + self.bytes_per_pixel
    }
}

// ---------------------------------------------------------------------------
// PixelSlice (borrowed, immutable)
// ---------------------------------------------------------------------------

/// Read-only view of locked surface memory.
#[non_exhaustive]
pub struct PixelSlice<'a> {
    data: &'a [u8],
    layout: Layout,
}

impl<'a> PixelSlice<'a> {
    /// Create a new pixel view with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the stride or data is too small, or if
    /// `bytes_per_pixel` is outside 1..=4.
    pub fn new(
        data: &'a [u8],
        width: u32,
        rows: u32,
        stride: usize,
        bytes_per_pixel: usize,
        byte_order: ByteOrder,
    ) -> Result<Self, BufferError> {
        let layout = Layout {
            width,
            rows,
            stride,
            bytes_per_pixel,
            byte_order,
        }
        .validate(data.len())?;
        Ok(Self { data, layout })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.layout.rows
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.stride
    }

    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.layout.bytes_per_pixel
    }

    /// Pixel bytes for row `y` (no padding, exactly `width * bpp` bytes).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        &self.data[self.layout.row_range(y)]
    }

    /// Raw pixel word at `(x, y)`, assembled in the view's byte order.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        let range = self.layout.pixel_range(x, y);
        self.layout.byte_order.read_word(&self.data[range])
    }

    /// Iterate the pixel words of row `y` from left to right.
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    pub fn row_pixels(&self, y: u32) -> impl Iterator<Item = u32> + '_ {
        let order = self.layout.byte_order;
        self.row(y)
            .chunks_exact(self.layout.bytes_per_pixel)
            .map(move |chunk| order.read_word(chunk))
    }
}

impl fmt::Debug for PixelSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelSlice({}x{}, {} bpp, stride {})",
            self.layout.width, self.layout.rows, self.layout.bytes_per_pixel, self.layout.stride
        )
    }
}

// ---------------------------------------------------------------------------
// PixelSliceMut (borrowed, mutable)
// ---------------------------------------------------------------------------

/// Mutable view of locked surface memory.
///
/// Same addressing as [`PixelSlice`], plus writes. Holding one borrows the
/// surface exclusively, so no other lock can overlap it.
#[non_exhaustive]
pub struct PixelSliceMut<'a> {
    data: &'a mut [u8],
    layout: Layout,
}

impl<'a> PixelSliceMut<'a> {
    /// Create a new mutable pixel view with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the stride or data is too small, or if
    /// `bytes_per_pixel` is outside 1..=4.
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        rows: u32,
        stride: usize,
        bytes_per_pixel: usize,
        byte_order: ByteOrder,
    ) -> Result<Self, BufferError> {
        let layout = Layout {
            width,
            rows,
            stride,
            bytes_per_pixel,
            byte_order,
        }
        .validate(data.len())?;
        Ok(Self { data, layout })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.layout.rows
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.stride
    }

    /// Pixel bytes for row `y` (immutable, no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        &self.data[self.layout.row_range(y)]
    }

    /// Mutable pixel bytes for row `y` (no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let range = self.layout.row_range(y);
        &mut self.data[range]
    }

    /// Raw pixel word at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        let range = self.layout.pixel_range(x, y);
        self.layout.byte_order.read_word(&self.data[range])
    }

    /// Store a raw pixel word at `(x, y)`. Bits above the pixel size are dropped.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, word: u32) {
        let range = self.layout.pixel_range(x, y);
        self.layout.byte_order.write_word(word, &mut self.data[range]);
    }

    /// Downgrade to a read-only view of the same memory.
    pub fn as_slice(&self) -> PixelSlice<'_> {
        PixelSlice {
            data: &*self.data,
            layout: self.layout,
        }
    }
}

impl fmt::Debug for PixelSliceMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelSliceMut({}x{}, {} bpp, stride {})",
            self.layout.width, self.layout.rows, self.layout.bytes_per_pixel, self.layout.stride
        )
    }
}

/// Minimum bytes needed: `(rows - 1) * stride + min_stride`.
fn required_bytes(rows: u32, stride: usize, min_stride: usize) -> Result<usize, BufferError> {
    let preceding = (rows as usize - 1)
        .checked_mul(stride)
        .ok_or(BufferError::InvalidDimensions)?;
    preceding
        .checked_add(min_stride)
        .ok_or(BufferError::InvalidDimensions)
}
