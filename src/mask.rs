//! Per-scanline opacity bitmasks for collision tests.

use alloc::vec::Vec;
use core::fmt;

use crate::error::CodecError;
use crate::surface::Surface;

/// Opacity of a surface, one `u64` word per scanline.
///
/// Bit `j` of row `i` is set when pixel `(j, i)` is opaque. Masks are built
/// once per image and shared read-only by every sprite showing it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Bitmask {
    width: u32,
    rows: Vec<u64>,
}

impl Bitmask {
    /// Widest surface a single mask word can describe.
    pub const MAX_WIDTH: u32 = u64::BITS;

    /// Compute the mask of `surface`.
    ///
    /// With a colorkey, a pixel is opaque when its raw value differs from
    /// the key. Without one, it is opaque when its alpha is at least 1
    /// (always, for layouts with no alpha channel).
    ///
    /// # Errors
    ///
    /// - [`CodecError::MaskTooWide`] if the surface is wider than 64 pixels.
    /// - [`CodecError::NotSupported`] if the surface cannot be locked.
    pub fn from_surface(surface: &Surface) -> Result<Self, CodecError> {
        let width = surface.width();
        if width > Self::MAX_WIDTH {
            return Err(CodecError::MaskTooWide { width });
        }
        let pixels = surface.lock()?;
        let colorkey = surface.colorkey();
        let mut rows = Vec::with_capacity(surface.height() as usize);
        for y in 0..surface.height() {
            let mut row = 0u64;
            for (x, value) in pixels.row_pixels(y).enumerate() {
                let opaque = match colorkey {
                    Some(key) => value != key,
                    None => surface.color_of(value).a >= 1,
                };
                if opaque {
                    row |= 1 << x;
                }
            }
            rows.push(row);
        }
        log::trace!("computed {}x{} mask", width, rows.len());
        Ok(Self { width, rows })
    }

    /// Build a mask from explicit scanline words.
    ///
    /// Bits at or above `width` are cleared.
    ///
    /// # Panics
    ///
    /// Panics if `width` exceeds [`MAX_WIDTH`](Self::MAX_WIDTH).
    pub fn from_rows(width: u32, rows: impl IntoIterator<Item = u64>) -> Self {
        assert!(
            width <= Self::MAX_WIDTH,
            "mask width {width} exceeds {}",
            Self::MAX_WIDTH
        );
        let keep = u64::MAX.checked_shr(Self::MAX_WIDTH - width).unwrap_or(0);
        Self {
            width,
            rows: rows.into_iter().map(|row| row & keep).collect(),
        }
    }

    /// A fully opaque `width x height` mask.
    pub fn filled(width: u32, height: u32) -> Self {
        Self::from_rows(width, (0..height).map(|_| u64::MAX))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Scanline words, top to bottom.
    #[inline]
    pub fn rows(&self) -> &[u64] {
        &self.rows
    }

    /// Whether pixel `(x, y)` is opaque; `false` outside the mask.
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width
            && self
                .rows
                .get(y as usize)
                .is_some_and(|row| row >> x & 1 == 1)
    }

    /// Number of opaque pixels.
    pub fn count(&self) -> u32 {
        self.rows.iter().map(|row| row.count_ones()).sum()
    }
}

impl fmt::Debug for Bitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bitmask({}x{}, {} set)",
            self.width,
            self.height(),
            self.count()
        )
    }
}
