//! Byte buffer <-> surface transcoding.
//!
//! [`from_bytes`] builds a surface from a tightly packed byte buffer in one
//! of the named [`PixelFormat`]s; [`to_bytes`] reads a surface back out.
//! Both accept a `flipped` flag that reverses scanline order, so a buffer
//! written bottom-up (as OpenGL reads it) round-trips when the same flag is
//! passed both ways.
//!
//! Known gaps, kept deliberately:
//! - `to_bytes(.., PixelFormat::P, true)` ignores the flip.
//! - `ARGB`, `RGBA_PREMULT` and `ARGB_PREMULT` output is not implemented.
//! - `RGBX` and the premultiplied formats cannot be used as input.

use alloc::vec::Vec;

use imgref::{ImgRef, ImgVec};
use rgb::Rgba;

use crate::buffer::PixelSlice;
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::format::PixelFormat;
use crate::pixel::{ByteOrder, SurfaceFormat};
use crate::surface::{Surface, alloc_zeroed};

/// Build a surface from a byte buffer.
///
/// `bytes` must hold exactly `width * height * format.bytes_per_pixel()`
/// bytes, rows top to bottom (bottom to top when `flipped`). The surface is
/// allocated with the pitch from `config`, and its channel masks are laid
/// out so that each wire byte lands in the same byte of the pixel word
/// under `config.byte_order`.
///
/// `P` input produces an 8-bit indexed surface with the default grayscale
/// palette; call [`Surface::set_palette`] to assign real colors.
///
/// # Errors
///
/// - [`CodecError::InvalidDimensions`] if `width` or `height` is zero.
/// - [`CodecError::InvalidFormat`] for formats that cannot be read
///   (`RGBX`, `RGBA_PREMULT`, `ARGB_PREMULT`).
/// - [`CodecError::SizeMismatch`] if the buffer length is wrong.
/// - [`CodecError::Limit`] / [`CodecError::AllocationError`] if the surface
///   cannot be allocated.
///
/// # Example
///
/// ```
/// use zensurface::{CodecConfig, PixelFormat, from_bytes, to_bytes};
///
/// let config = CodecConfig::default();
/// let rgb = [255u8, 0, 0, 0, 255, 0];
/// let surface = from_bytes(&config, &rgb, 2, 1, PixelFormat::Rgb, false)?;
/// assert_eq!(to_bytes(&surface, PixelFormat::Rgb, false)?, rgb);
/// # Ok::<(), zensurface::CodecError>(())
/// ```
pub fn from_bytes(
    config: &CodecConfig,
    bytes: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
    flipped: bool,
) -> Result<Surface, CodecError> {
    if width == 0 || height == 0 {
        return Err(CodecError::InvalidDimensions);
    }
    let layout = wire_layout(format, config.byte_order)?;
    let row_len = (width as usize)
        .checked_mul(format.bytes_per_pixel())
        .ok_or(CodecError::InvalidDimensions)?;
    let expected = row_len
        .checked_mul(height as usize)
        .ok_or(CodecError::InvalidDimensions)?;
    if bytes.len() != expected {
        return Err(CodecError::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    log::debug!("building {width}x{height} surface from {format} bytes (flipped: {flipped})");

    let mut surface = Surface::new(config, width, height, layout)?;
    {
        let mut pixels = surface.lock_mut()?;
        for (src_y, src) in bytes.chunks_exact(row_len).enumerate() {
            let dst_y = if flipped {
                height - 1 - src_y as u32
            } else {
                src_y as u32
            };
            pixels.row_mut(dst_y).copy_from_slice(src);
        }
    }
    Ok(surface)
}

/// Serialize a surface into a byte buffer.
///
/// Rows are written tightly packed, top to bottom (bottom to top when
/// `flipped`). Channels are decoded from the surface layout with their
/// precision loss restored, so a 5-bit channel holding 31 comes out as 248.
///
/// Alpha for `RGBA`: a surface with its own alpha channel reports it
/// as-is. Otherwise a colorkeyed surface yields 0 where the raw pixel equals
/// the colorkey and 255 elsewhere; without a colorkey alpha is 255. `RGBX`
/// is the same but never applies the colorkey.
///
/// `P` requires an 8-bit surface and copies indices unchanged; it ignores
/// `flipped`.
///
/// # Errors
///
/// - [`CodecError::NotSupported`] for device-resident surfaces.
/// - [`CodecError::FormatMismatch`] for `P` output from a non-8-bit surface.
/// - [`CodecError::NotImplemented`] for `ARGB`, `RGBA_PREMULT`, `ARGB_PREMULT`.
/// - [`CodecError::InvalidFormat`] for `RGBAX`, which has no output form.
/// - [`CodecError::UnsupportedDepth`] if the surface depth is not 8/16/24/32.
pub fn to_bytes(
    surface: &Surface,
    format: PixelFormat,
    flipped: bool,
) -> Result<Vec<u8>, CodecError> {
    let pixels = surface.lock()?;
    log::debug!(
        "serializing {}x{} surface to {format} bytes (flipped: {flipped})",
        surface.width(),
        surface.height()
    );
    match format {
        PixelFormat::P => indexed_bytes(surface, &pixels, flipped),
        PixelFormat::Rgb => channel_bytes(surface, &pixels, Output::Rgb, flipped),
        PixelFormat::Rgba => channel_bytes(
            surface,
            &pixels,
            Output::Rgba {
                honor_colorkey: true,
            },
            flipped,
        ),
        PixelFormat::Rgbx => channel_bytes(
            surface,
            &pixels,
            Output::Rgba {
                honor_colorkey: false,
            },
            flipped,
        ),
        PixelFormat::Argb | PixelFormat::RgbaPremult | PixelFormat::ArgbPremult => {
            Err(CodecError::NotImplemented(format.name()))
        }
        PixelFormat::Rgbax => Err(CodecError::InvalidFormat),
    }
}

impl Surface {
    /// Build an RGBA surface from decoded pixels, e.g. the output of an
    /// external image decoder.
    ///
    /// # Errors
    ///
    /// Same as [`from_bytes`] with [`PixelFormat::Rgba`].
    pub fn from_rgba_img(
        config: &CodecConfig,
        img: ImgRef<'_, Rgba<u8>>,
    ) -> Result<Self, CodecError> {
        let width = u32::try_from(img.width()).map_err(|_| CodecError::InvalidDimensions)?;
        let height = u32::try_from(img.height()).map_err(|_| CodecError::InvalidDimensions)?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(img.width() * img.height() * 4)
            .map_err(|_| CodecError::AllocationError {
                bytes: img.width() * img.height() * 4,
            })?;
        for row in img.rows() {
            for px in row {
                bytes.extend_from_slice(&[px.r, px.g, px.b, px.a]);
            }
        }
        from_bytes(config, &bytes, width, height, PixelFormat::Rgba, false)
    }

    /// Decode the whole surface into RGBA pixels with the `RGBA` alpha rules.
    ///
    /// # Errors
    ///
    /// Same as [`to_bytes`] with [`PixelFormat::Rgba`].
    pub fn to_rgba_img(&self) -> Result<ImgVec<Rgba<u8>>, CodecError> {
        let bytes = to_bytes(self, PixelFormat::Rgba, false)?;
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Rgba {
                r: c[0],
                g: c[1],
                b: c[2],
                a: c[3],
            })
            .collect();
        Ok(ImgVec::new(
            pixels,
            self.width() as usize,
            self.height() as usize,
        ))
    }
}

/// Channel byte positions within one wire pixel.
struct WireBytes {
    bits: u8,
    red: usize,
    green: usize,
    blue: usize,
    alpha: Option<usize>,
}

/// Surface layout that stores each wire byte at the same memory offset.
fn wire_layout(format: PixelFormat, order: ByteOrder) -> Result<SurfaceFormat, CodecError> {
    let bytes = match format {
        PixelFormat::P => return Ok(SurfaceFormat::indexed()),
        PixelFormat::Rgb => WireBytes {
            bits: 24,
            red: 0,
            green: 1,
            blue: 2,
            alpha: None,
        },
        // RGBAX carries a fourth byte that is not alpha.
        PixelFormat::Rgba | PixelFormat::Rgbax => WireBytes {
            bits: 32,
            red: 0,
            green: 1,
            blue: 2,
            alpha: format.has_alpha().then_some(3),
        },
        PixelFormat::Argb => WireBytes {
            bits: 32,
            red: 1,
            green: 2,
            blue: 3,
            alpha: format.has_alpha().then_some(0),
        },
        PixelFormat::Rgbx | PixelFormat::RgbaPremult | PixelFormat::ArgbPremult => {
            return Err(CodecError::InvalidFormat);
        }
    };
    let len = bytes.bits as usize / 8;
    let mask = |offset: usize| -> u32 {
        let shift = match order {
            ByteOrder::Little => 8 * offset,
            ByteOrder::Big => 8 * (len - 1 - offset),
        };
        0xFF << shift
    };
    SurfaceFormat::from_masks(
        bytes.bits,
        mask(bytes.red),
        mask(bytes.green),
        mask(bytes.blue),
        bytes.alpha.map_or(0, mask),
        order,
    )
}

#[derive(Clone, Copy)]
enum Output {
    Rgb,
    Rgba { honor_colorkey: bool },
}

impl Output {
    const fn bytes_per_pixel(self) -> usize {
        match self {
            Output::Rgb => 3,
            Output::Rgba { .. } => 4,
        }
    }
}

/// Source row for output row `y`.
#[inline]
fn source_row(y: usize, height: u32, flipped: bool) -> u32 {
    if flipped {
        height - 1 - y as u32
    } else {
        y as u32
    }
}

fn indexed_bytes(
    surface: &Surface,
    pixels: &PixelSlice<'_>,
    flipped: bool,
) -> Result<Vec<u8>, CodecError> {
    let format = surface.format();
    if !format.is_indexed() {
        return Err(CodecError::FormatMismatch {
            format: PixelFormat::P.name(),
            bits_per_pixel: format.bits_per_pixel(),
        });
    }
    if flipped {
        log::warn!("flipped output is not implemented for P; rows are written top to bottom");
    }
    let width = surface.width() as usize;
    let mut out = alloc_zeroed(width * surface.height() as usize)?;
    for (y, dst) in out.chunks_exact_mut(width).enumerate() {
        dst.copy_from_slice(pixels.row(y as u32));
    }
    Ok(out)
}

fn channel_bytes(
    surface: &Surface,
    pixels: &PixelSlice<'_>,
    output: Output,
    flipped: bool,
) -> Result<Vec<u8>, CodecError> {
    let format = surface.format();
    match format.bytes_per_pixel() {
        1..=4 => {}
        _ => return Err(CodecError::UnsupportedDepth(format.bits_per_pixel())),
    }
    let colorkey = match output {
        Output::Rgba {
            honor_colorkey: true,
        } if !format.has_alpha() => surface.colorkey(),
        _ => None,
    };

    let out_bpp = output.bytes_per_pixel();
    let row_len = surface.width() as usize * out_bpp;
    let mut out = alloc_zeroed(row_len * surface.height() as usize)?;
    for (y, dst_row) in out.chunks_exact_mut(row_len).enumerate() {
        let src_y = source_row(y, surface.height(), flipped);
        for (word, dst) in pixels.row_pixels(src_y).zip(dst_row.chunks_exact_mut(out_bpp)) {
            let color = surface.color_of(word);
            dst[0] = color.r;
            dst[1] = color.g;
            dst[2] = color.b;
            if let Output::Rgba { .. } = output {
                dst[3] = match colorkey {
                    Some(key) if word == key => 0,
                    Some(_) => 255,
                    None => color.a,
                };
            }
        }
    }
    Ok(out)
}
