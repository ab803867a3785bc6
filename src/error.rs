//! Error type shared by the surface codec and mask builder.

use crate::buffer::BufferError;
use crate::limits::LimitExceeded;

/// Errors from surface construction, serialization, and mask building.
///
/// Every failing call returns before handing out a surface or byte buffer,
/// so a caller never observes partially written output.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Byte buffer length does not match `width * height * bytes_per_pixel`.
    #[error("buffer length {actual} does not equal format and resolution size {expected}")]
    SizeMismatch {
        /// Length implied by the dimensions and format.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// Unrecognized or unusable wire format name.
    #[error("unrecognized type of format")]
    InvalidFormat,
    /// Bit depth other than 8, 16, 24, or 32.
    #[error("invalid color depth: {0} bits per pixel")]
    UnsupportedDepth(u8),
    /// Surface layout cannot be expressed in the requested format.
    #[error("cannot create {format} data from a {bits_per_pixel}-bit surface")]
    FormatMismatch {
        /// Requested wire format name.
        format: &'static str,
        /// Bit depth of the surface.
        bits_per_pixel: u8,
    },
    /// The pixel buffer could not be allocated.
    #[error("could not allocate {bytes} bytes of pixel memory")]
    AllocationError {
        /// Requested allocation size.
        bytes: usize,
    },
    /// The surface has no directly readable pixel memory.
    #[error("surface pixels are not accessible from system memory")]
    NotSupported,
    /// The requested conversion is not implemented.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
    /// Width or height is zero or overflows the addressable size.
    #[error("resolution must be positive values")]
    InvalidDimensions,
    /// Pixel coordinates fall outside the surface.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} surface")]
    OutOfBounds {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Surface width.
        width: u32,
        /// Surface height.
        height: u32,
    },
    /// Surface is wider than one collision mask word.
    #[error("surface width {width} exceeds the 64-pixel mask word")]
    MaskTooWide {
        /// Surface width in pixels.
        width: u32,
    },
    /// A configured resource limit was exceeded.
    #[error(transparent)]
    Limit(#[from] LimitExceeded),
    /// A pixel view could not be formed over the surface memory.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
