//! Immutable codec configuration.

use crate::limits::ResourceLimits;
use crate::pixel::ByteOrder;

/// Configuration passed to every surface-building operation.
///
/// Replaces process-wide format tables: the byte order used to derive
/// channel masks, the scanline alignment used to compute pitch, and the
/// resource limits checked before allocation all travel with the call.
///
/// # Example
///
/// ```
/// use zensurface::{ByteOrder, CodecConfig, ResourceLimits};
///
/// let config = CodecConfig::new()
///     .with_byte_order(ByteOrder::Big)
///     .with_row_alignment(8)
///     .with_limits(ResourceLimits::none().with_max_pixels(1 << 20));
/// assert_eq!(config.pitch_for(3, 3), 16);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct CodecConfig {
    /// Byte order of multi-byte pixel words on new surfaces.
    pub byte_order: ByteOrder,
    // Always a power of two; only set through `with_row_alignment`.
    row_alignment: usize,
    /// Limits checked before a surface is allocated.
    pub limits: ResourceLimits,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::NATIVE,
            row_alignment: 4,
            limits: ResourceLimits::none(),
        }
    }
}

impl CodecConfig {
    /// Native byte order, 4-byte row alignment, no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the byte order used for new surfaces.
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Set the scanline alignment.
    ///
    /// Values that are not a power of two are rounded up to the next one;
    /// zero is treated as 1 (tightly packed rows). Alignments too large to
    /// round are clamped to the largest power of two.
    pub fn with_row_alignment(mut self, align: usize) -> Self {
        self.row_alignment = align
            .max(1)
            .checked_next_power_of_two()
            .unwrap_or(1 << (usize::BITS - 1));
        self
    }

    /// Scanline alignment in bytes, always a power of two.
    #[inline]
    pub const fn row_alignment(&self) -> usize {
        self.row_alignment
    }

    /// Set the resource limits.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Pitch in bytes for a row of `width` pixels at `bytes_per_pixel`.
    #[inline]
    pub const fn pitch_for(&self, width: u32, bytes_per_pixel: usize) -> usize {
        align_up(width as usize * bytes_per_pixel, self.row_alignment)
    }
}

/// Round `val` up to the next multiple of `align` (must be a power of 2).
const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}
