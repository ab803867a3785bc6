//! Allocation caps for new surfaces.

use core::fmt;

/// Upper bounds a [`CodecConfig`](crate::CodecConfig) enforces before it
/// reserves pixel memory. Unset caps do not restrict anything.
///
/// ```
/// use zensurface::ResourceLimits;
///
/// // At most a 4K frame, and never more than 64 MiB of pixels.
/// let limits = ResourceLimits::none()
///     .with_max_width(3840)
///     .with_max_height(2160)
///     .with_max_memory(64 << 20);
/// assert!(limits.check_surface(1920, 1080, 1920 * 1080 * 4).is_ok());
/// assert!(limits.check_surface(4096, 16, 4096 * 16).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Cap on `width * height`.
    pub max_pixels: Option<u64>,
    /// Cap on the pixel buffer, counted with row padding (`pitch * height`).
    pub max_memory_bytes: Option<u64>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl ResourceLimits {
    /// Every surface size is accepted.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// `true` when no cap is set.
    pub fn is_unlimited(&self) -> bool {
        *self == Self::none()
    }

    /// Check a `width x height` surface occupying `bytes` of pixel memory.
    ///
    /// Caps are tested in the order width, height, pixel count, memory;
    /// the first one exceeded is reported.
    pub fn check_surface(&self, width: u32, height: u32, bytes: u64) -> Result<(), LimitExceeded> {
        let pixels = u64::from(width) * u64::from(height);
        let over = |cap: Option<u64>, actual: u64| cap.filter(|&max| actual > max);

        if let Some(max) = over(self.max_width.map(u64::from), width.into()) {
            Err(LimitExceeded::Width {
                actual: width,
                max: max as u32,
            })
        } else if let Some(max) = over(self.max_height.map(u64::from), height.into()) {
            Err(LimitExceeded::Height {
                actual: height,
                max: max as u32,
            })
        } else if let Some(max) = over(self.max_pixels, pixels) {
            Err(LimitExceeded::Pixels {
                actual: pixels,
                max,
            })
        } else if let Some(max) = over(self.max_memory_bytes, bytes) {
            Err(LimitExceeded::Memory { actual: bytes, max })
        } else {
            Ok(())
        }
    }
}

/// The cap a rejected surface ran into, with the requested and allowed values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LimitExceeded {
    Width { actual: u32, max: u32 },
    Height { actual: u32, max: u32 },
    Pixels { actual: u64, max: u64 },
    /// Padded buffer size in bytes.
    Memory { actual: u64, max: u64 },
}

impl fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (what, actual, max) = match *self {
            Self::Width { actual, max } => ("width", u64::from(actual), u64::from(max)),
            Self::Height { actual, max } => ("height", u64::from(actual), u64::from(max)),
            Self::Pixels { actual, max } => ("pixel count", actual, max),
            Self::Memory { actual, max } => ("pixel memory (bytes)", actual, max),
        };
        write!(f, "surface {what} {actual} is over the limit of {max}")
    }
}

impl core::error::Error for LimitExceeded {}
