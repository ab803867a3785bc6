//! Owned packed-pixel surface.

use alloc::vec::Vec;
use core::fmt;

use rgb::{Rgb, Rgba};

use crate::buffer::{PixelSlice, PixelSliceMut};
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::pixel::{Palette, SurfaceFormat};

/// Where a surface's pixel memory lives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Residency {
    /// Ordinary heap memory, readable through [`Surface::lock`].
    #[default]
    System,
    /// Memory owned by a device context; there are no readable bytes.
    Device,
}

/// A rectangular grid of packed pixels.
///
/// Rows are `pitch` bytes apart; `pitch` may exceed `width * bytes_per_pixel`
/// when the configured row alignment pads scanlines. Indexed (8-bit)
/// surfaces always carry a 256-entry palette, initially a grayscale ramp.
///
/// Raw pixel access goes through [`lock`](Self::lock) or
/// [`lock_mut`](Self::lock_mut), which return views that release the
/// surface when dropped.
#[derive(Clone)]
pub struct Surface {
    data: Vec<u8>,
    width: u32,
    height: u32,
    pitch: usize,
    format: SurfaceFormat,
    palette: Option<Palette>,
    colorkey: Option<u32>,
    residency: Residency,
}

impl Surface {
    /// Allocate a zero-filled surface.
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidDimensions`] if `width` or `height` is zero or
    ///   the buffer size overflows.
    /// - [`CodecError::Limit`] if the configured limits reject the size.
    /// - [`CodecError::AllocationError`] if the memory cannot be reserved.
    pub fn new(
        config: &CodecConfig,
        width: u32,
        height: u32,
        format: SurfaceFormat,
    ) -> Result<Self, CodecError> {
        let (pitch, len) = checked_size(config, width, height, &format)?;
        let data = alloc_zeroed(len)?;
        log::trace!(
            "allocated {width}x{height} surface, {} bpp, pitch {pitch}",
            format.bits_per_pixel()
        );
        Ok(Self {
            data,
            width,
            height,
            pitch,
            palette: format.is_indexed().then(Palette::grayscale),
            format,
            colorkey: None,
            residency: Residency::System,
        })
    }

    /// Describe a surface whose pixels live in a device context.
    ///
    /// No system memory is reserved; [`lock`](Self::lock) and every
    /// byte-level conversion fail with [`CodecError::NotSupported`].
    ///
    /// # Errors
    ///
    /// Same dimension and limit checks as [`new`](Self::new).
    pub fn new_device(
        config: &CodecConfig,
        width: u32,
        height: u32,
        format: SurfaceFormat,
    ) -> Result<Self, CodecError> {
        let (pitch, _) = checked_size(config, width, height, &format)?;
        Ok(Self {
            data: Vec::new(),
            width,
            height,
            pitch,
            palette: format.is_indexed().then(Palette::grayscale),
            format,
            colorkey: None,
            residency: Residency::Device,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Packed pixel layout.
    #[inline]
    pub fn format(&self) -> &SurfaceFormat {
        &self.format
    }

    #[inline]
    pub fn residency(&self) -> Residency {
        self.residency
    }

    /// Palette of an indexed surface; `None` for packed layouts.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Replace the palette of an indexed surface.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FormatMismatch`] if the surface is not 8-bit.
    pub fn set_palette(&mut self, palette: Palette) -> Result<(), CodecError> {
        if !self.format.is_indexed() {
            return Err(CodecError::FormatMismatch {
                format: "P",
                bits_per_pixel: self.format.bits_per_pixel(),
            });
        }
        self.palette = Some(palette);
        Ok(())
    }

    /// Raw pixel value treated as fully transparent, if any.
    #[inline]
    pub fn colorkey(&self) -> Option<u32> {
        self.colorkey
    }

    /// Set or clear the colorkey. For indexed surfaces the value is a palette index.
    pub fn set_colorkey(&mut self, colorkey: Option<u32>) {
        self.colorkey = colorkey;
    }

    /// Lock the pixel memory for reading.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::NotSupported`] for [`Residency::Device`] surfaces.
    pub fn lock(&self) -> Result<PixelSlice<'_>, CodecError> {
        self.check_resident()?;
        log::trace!("lock {}x{} surface for read", self.width, self.height);
        Ok(PixelSlice::new(
            &self.data,
            self.width,
            self.height,
            self.pitch,
            self.format.bytes_per_pixel(),
            self.format.byte_order(),
        )?)
    }

    /// Lock the pixel memory for writing.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::NotSupported`] for [`Residency::Device`] surfaces.
    pub fn lock_mut(&mut self) -> Result<PixelSliceMut<'_>, CodecError> {
        self.check_resident()?;
        log::trace!("lock {}x{} surface for write", self.width, self.height);
        Ok(PixelSliceMut::new(
            &mut self.data,
            self.width,
            self.height,
            self.pitch,
            self.format.bytes_per_pixel(),
            self.format.byte_order(),
        )?)
    }

    /// Raw pixel value at `(x, y)`.
    ///
    /// # Errors
    ///
    /// - [`CodecError::OutOfBounds`] if `(x, y)` is outside the surface.
    /// - [`CodecError::NotSupported`] for device-resident surfaces.
    pub fn pixel(&self, x: u32, y: u32) -> Result<u32, CodecError> {
        self.check_bounds(x, y)?;
        Ok(self.lock()?.pixel(x, y))
    }

    /// Store a raw pixel value at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Same as [`pixel`](Self::pixel).
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u32) -> Result<(), CodecError> {
        self.check_bounds(x, y)?;
        self.lock_mut()?.set_pixel(x, y, value);
        Ok(())
    }

    /// Color at `(x, y)` as 8-bit RGBA.
    ///
    /// Indexed pixels resolve through the palette with alpha 255; packed
    /// pixels decode their channels, with alpha 255 when the layout has none.
    /// The colorkey is not applied.
    pub fn get_at(&self, x: u32, y: u32) -> Result<Rgba<u8>, CodecError> {
        let value = self.pixel(x, y)?;
        Ok(self.color_of(value))
    }

    /// Map a color to the closest raw pixel value for this surface.
    pub fn map_rgba(&self, color: Rgba<u8>) -> u32 {
        match &self.palette {
            Some(palette) => palette.nearest(Rgb {
                r: color.r,
                g: color.g,
                b: color.b,
            }) as u32,
            None => self.format.encode(color),
        }
    }

    /// Decode a raw value without any colorkey handling.
    pub(crate) fn color_of(&self, value: u32) -> Rgba<u8> {
        match &self.palette {
            Some(palette) => {
                let Rgb { r, g, b } = palette.get(value as u8);
                Rgba { r, g, b, a: 255 }
            }
            None => self.format.decode(value),
        }
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<(), CodecError> {
        if x < self.width && y < self.height {
            Ok(())
        } else {
            Err(CodecError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    fn check_resident(&self) -> Result<(), CodecError> {
        match self.residency {
            Residency::System => Ok(()),
            Residency::Device => Err(CodecError::NotSupported),
        }
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Surface({}x{}, {} bpp, pitch {}, {:?})",
            self.width,
            self.height,
            self.format.bits_per_pixel(),
            self.pitch,
            self.residency
        )
    }
}

/// Validate dimensions against the config and return `(pitch, pitch * height)`.
fn checked_size(
    config: &CodecConfig,
    width: u32,
    height: u32,
    format: &SurfaceFormat,
) -> Result<(usize, usize), CodecError> {
    if width == 0 || height == 0 {
        return Err(CodecError::InvalidDimensions);
    }
    let bpp = format.bytes_per_pixel();
    // pitch_for rounds up without overflow checks.
    (width as usize)
        .checked_mul(bpp)
        .and_then(|row| row.checked_add(config.row_alignment()))
        .ok_or(CodecError::InvalidDimensions)?;
    let pitch = config.pitch_for(width, bpp);
    let len = pitch
        .checked_mul(height as usize)
        .ok_or(CodecError::InvalidDimensions)?;
    config.limits.check_surface(width, height, len as u64)?;
    Ok((pitch, len))
}

/// Reserve and zero `len` bytes, reporting failure instead of aborting.
pub(crate) fn alloc_zeroed(len: usize) -> Result<Vec<u8>, CodecError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| CodecError::AllocationError { bytes: len })?;
    data.resize(len, 0);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::{LimitExceeded, ResourceLimits};
    use crate::pixel::ByteOrder;
    use alloc::format;

    fn rgb565() -> SurfaceFormat {
        SurfaceFormat::from_masks(16, 0xF800, 0x07E0, 0x001F, 0, ByteOrder::Little).unwrap()
    }

    #[test]
    fn new_pads_pitch() {
        let surface = Surface::new(&CodecConfig::new(), 3, 2, SurfaceFormat::indexed()).unwrap();
        assert_eq!(surface.size(), (3, 2));
        assert_eq!(surface.pitch(), 4);
        assert_eq!(surface.lock().unwrap().row(1), &[0, 0, 0]);
        assert_eq!(surface.palette(), Some(&Palette::grayscale()));
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        let config = CodecConfig::new();
        assert_eq!(
            Surface::new(&config, 0, 1, rgb565()).unwrap_err(),
            CodecError::InvalidDimensions
        );
        assert_eq!(
            Surface::new(&config, 1, 0, rgb565()).unwrap_err(),
            CodecError::InvalidDimensions
        );
    }

    #[test]
    fn new_enforces_limits() {
        let config = CodecConfig::new().with_limits(ResourceLimits::none().with_max_memory(64));
        // 9 px * 2 bytes rounds to a 20-byte pitch; 4 rows = 80 bytes.
        let err = Surface::new(&config, 9, 4, rgb565()).unwrap_err();
        assert_eq!(
            err,
            CodecError::Limit(LimitExceeded::Memory {
                actual: 80,
                max: 64
            })
        );
        assert!(Surface::new(&config, 8, 4, rgb565()).is_ok());
    }

    #[test]
    fn packed_surface_has_no_palette() {
        let mut surface = Surface::new(&CodecConfig::new(), 2, 2, rgb565()).unwrap();
        assert!(surface.palette().is_none());
        assert!(matches!(
            surface.set_palette(Palette::grayscale()),
            Err(CodecError::FormatMismatch {
                bits_per_pixel: 16,
                ..
            })
        ));
    }

    #[test]
    fn pixel_round_trip_and_get_at() {
        let mut surface = Surface::new(&CodecConfig::new(), 2, 2, rgb565()).unwrap();
        let magenta = surface.map_rgba(Rgba {
            r: 255,
            g: 0,
            b: 255,
            a: 255,
        });
        surface.set_pixel(1, 0, magenta).unwrap();
        assert_eq!(surface.pixel(1, 0).unwrap(), 0xF81F);
        assert_eq!(
            surface.get_at(1, 0).unwrap(),
            Rgba {
                r: 248,
                g: 0,
                b: 248,
                a: 255
            }
        );
        assert_eq!(surface.pixel(0, 0).unwrap(), 0);
    }

    #[test]
    fn out_of_range_coordinates_are_errors() {
        let mut surface = Surface::new(&CodecConfig::new(), 3, 2, rgb565()).unwrap();
        let expected = CodecError::OutOfBounds {
            x: 3,
            y: 0,
            width: 3,
            height: 2,
        };
        assert_eq!(surface.pixel(3, 0).unwrap_err(), expected);
        assert_eq!(surface.get_at(3, 0).unwrap_err(), expected);
        assert!(matches!(
            surface.set_pixel(0, 2, 1),
            Err(CodecError::OutOfBounds { y: 2, .. })
        ));
        assert!(surface.pixel(u32::MAX, u32::MAX).is_err());
        assert_eq!(surface.pixel(2, 1).unwrap(), 0);
    }

    #[test]
    fn indexed_get_at_uses_palette() {
        let mut surface =
            Surface::new(&CodecConfig::new(), 2, 1, SurfaceFormat::indexed()).unwrap();
        let blue = Rgb { r: 0, g: 0, b: 200 };
        surface
            .set_palette(Palette::from_colors(&[Rgb { r: 0, g: 0, b: 0 }, blue]).unwrap())
            .unwrap();
        surface.set_pixel(1, 0, 1).unwrap();
        let opaque_blue = Rgba {
            r: 0,
            g: 0,
            b: 200,
            a: 255,
        };
        assert_eq!(surface.get_at(1, 0).unwrap(), opaque_blue);
        assert_eq!(surface.map_rgba(opaque_blue), 1);
    }

    #[test]
    fn device_surface_refuses_locks() {
        let mut surface =
            Surface::new_device(&CodecConfig::new(), 4, 4, SurfaceFormat::indexed()).unwrap();
        assert_eq!(surface.residency(), Residency::Device);
        assert_eq!(surface.lock().unwrap_err(), CodecError::NotSupported);
        assert_eq!(surface.lock_mut().unwrap_err(), CodecError::NotSupported);
        assert_eq!(surface.pixel(0, 0).unwrap_err(), CodecError::NotSupported);
    }

    #[test]
    fn colorkey_is_stored_raw() {
        let mut surface = Surface::new(&CodecConfig::new(), 1, 1, rgb565()).unwrap();
        assert_eq!(surface.colorkey(), None);
        surface.set_colorkey(Some(0xF81F));
        assert_eq!(surface.colorkey(), Some(0xF81F));
    }

    #[test]
    fn debug_format() {
        let surface = Surface::new(&CodecConfig::new(), 5, 3, rgb565()).unwrap();
        assert_eq!(
            format!("{surface:?}"),
            "Surface(5x3, 16 bpp, pitch 12, System)"
        );
    }
}
