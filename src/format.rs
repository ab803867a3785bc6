//! Named byte-buffer pixel formats.

use core::fmt;
use core::str::FromStr;

use crate::error::CodecError;

/// Channel layout of an external byte buffer.
///
/// These describe the *wire* representation handed to
/// [`from_bytes`](crate::from_bytes) and produced by
/// [`to_bytes`](crate::to_bytes). Surfaces keep their own packed layout
/// (see [`SurfaceFormat`](crate::SurfaceFormat)).
///
/// | Name           | Bytes | Layout                                   |
/// |----------------|-------|------------------------------------------|
/// | `P`            | 1     | palette index                            |
/// | `RGB`          | 3     | R, G, B                                  |
/// | `RGBA`         | 4     | R, G, B, A                               |
/// | `RGBAX`        | 4     | R, G, B, unused                          |
/// | `ARGB`         | 4     | A, R, G, B                               |
/// | `RGBX`         | 4     | R, G, B, A with colorkey ignored         |
/// | `RGBA_PREMULT` | 4     | premultiplied R, G, B, A (unimplemented) |
/// | `ARGB_PREMULT` | 4     | premultiplied A, R, G, B (unimplemented) |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    P,
    Rgb,
    Rgba,
    Rgbax,
    Argb,
    Rgbx,
    RgbaPremult,
    ArgbPremult,
}

impl PixelFormat {
    /// Every recognized format, in wire-name order.
    pub const ALL: [PixelFormat; 8] = [
        PixelFormat::P,
        PixelFormat::Rgb,
        PixelFormat::Rgba,
        PixelFormat::Rgbax,
        PixelFormat::Argb,
        PixelFormat::Rgbx,
        PixelFormat::RgbaPremult,
        PixelFormat::ArgbPremult,
    ];

    /// Look up a format by its exact wire name (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidFormat`] for any other string.
    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|format| format.name() == name)
            .ok_or(CodecError::InvalidFormat)
    }

    /// Wire name of this format.
    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::P => "P",
            PixelFormat::Rgb => "RGB",
            PixelFormat::Rgba => "RGBA",
            PixelFormat::Rgbax => "RGBAX",
            PixelFormat::Argb => "ARGB",
            PixelFormat::Rgbx => "RGBX",
            PixelFormat::RgbaPremult => "RGBA_PREMULT",
            PixelFormat::ArgbPremult => "ARGB_PREMULT",
        }
    }

    /// Bytes per pixel in the byte buffer.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::P => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba
            | PixelFormat::Rgbax
            | PixelFormat::Argb
            | PixelFormat::Rgbx
            | PixelFormat::RgbaPremult
            | PixelFormat::ArgbPremult => 4,
        }
    }

    /// Whether the fourth byte carries alpha on the way in.
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelFormat::Rgba
                | PixelFormat::Argb
                | PixelFormat::RgbaPremult
                | PixelFormat::ArgbPremult
        )
    }
}

impl FromStr for PixelFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
