//! Packed pixel layout of a surface.
//!
//! A [`SurfaceFormat`] describes how a pixel word stores its channels:
//! per-channel bit masks with derived shift and bit-loss counts, the byte
//! order of multi-byte words, and whether the surface is palette indexed.

use alloc::vec::Vec;

use rgb::{Rgb, Rgba};

use crate::error::CodecError;

/// Byte order of multi-byte pixel words in surface memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl ByteOrder {
    /// Byte order of the compilation target.
    pub const NATIVE: ByteOrder = if cfg!(target_endian = "big") {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    };

    /// Combine 1 to 4 bytes into a pixel word.
    ///
    /// Three-byte pixels are assembled the same way as wider words, so
    /// `[b0, b1, b2]` reads as `b0 | b1 << 8 | b2 << 16` little-endian and
    /// `b0 << 16 | b1 << 8 | b2` big-endian.
    #[inline]
    pub fn read_word(self, bytes: &[u8]) -> u32 {
        debug_assert!((1..=4).contains(&bytes.len()));
        match self {
            ByteOrder::Little => bytes
                .iter()
                .rev()
                .fold(0u32, |acc, &b| (acc << 8) | b as u32),
            ByteOrder::Big => bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32),
        }
    }

    /// Split a pixel word into `out.len()` bytes. Inverse of [`read_word`](Self::read_word).
    #[inline]
    pub fn write_word(self, word: u32, out: &mut [u8]) {
        debug_assert!((1..=4).contains(&out.len()));
        let n = out.len();
        for (i, byte) in out.iter_mut().enumerate() {
            let shift = match self {
                ByteOrder::Little => 8 * i,
                ByteOrder::Big => 8 * (n - 1 - i),
            };
            *byte = (word >> shift) as u8;
        }
    }
}

/// One channel of a packed pixel word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Channel {
    /// Bits of the pixel word holding this channel.
    pub mask: u32,
    /// Position of the lowest mask bit.
    pub shift: u8,
    /// Low-order bits dropped relative to an 8-bit channel.
    pub loss: u8,
}

impl Channel {
    /// An absent channel: empty mask, all 8 bits lost.
    pub const NONE: Channel = Channel {
        mask: 0,
        shift: 0,
        loss: 8,
    };

    /// Derive shift and loss from a bit mask.
    pub const fn from_mask(mask: u32) -> Self {
        if mask == 0 {
            return Self::NONE;
        }
        let shift = mask.trailing_zeros();
        let bits = (mask >> shift).count_ones();
        Self {
            mask,
            shift: shift as u8,
            loss: 8u32.saturating_sub(bits) as u8,
        }
    }

    /// Whether the channel occupies any bits.
    #[inline]
    pub const fn is_present(self) -> bool {
        self.mask != 0
    }

    /// Extract the channel from `word`, re-expanded to 8 bits.
    #[inline]
    pub const fn extract(self, word: u32) -> u8 {
        (((word & self.mask) >> self.shift) << self.loss) as u8
    }

    /// Pack an 8-bit value into this channel's bits.
    #[inline]
    pub const fn pack(self, value: u8) -> u32 {
        (((value as u32) >> self.loss) << self.shift) & self.mask
    }
}

/// Layout of the pixels stored in a [`Surface`](crate::Surface).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceFormat {
    bits_per_pixel: u8,
    byte_order: ByteOrder,
    red: Channel,
    green: Channel,
    blue: Channel,
    alpha: Channel,
}

impl SurfaceFormat {
    /// 8-bit palette-indexed layout.
    pub const fn indexed() -> Self {
        Self {
            bits_per_pixel: 8,
            byte_order: ByteOrder::NATIVE,
            red: Channel::NONE,
            green: Channel::NONE,
            blue: Channel::NONE,
            alpha: Channel::NONE,
        }
    }

    /// Packed layout from channel bit masks.
    ///
    /// A depth of 8 with all masks empty yields [`indexed`](Self::indexed).
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnsupportedDepth`] if `bits_per_pixel` is not 8, 16, 24, or 32.
    /// - [`CodecError::InvalidFormat`] if a mask reaches past the pixel word,
    ///   masks overlap, or an 8-bit layout carries masks.
    pub fn from_masks(
        bits_per_pixel: u8,
        rmask: u32,
        gmask: u32,
        bmask: u32,
        amask: u32,
        byte_order: ByteOrder,
    ) -> Result<Self, CodecError> {
        let masks = [rmask, gmask, bmask, amask];
        match bits_per_pixel {
            8 => {
                if masks.iter().any(|&m| m != 0) {
                    return Err(CodecError::InvalidFormat);
                }
                return Ok(Self::indexed());
            }
            16 | 24 | 32 => {}
            other => return Err(CodecError::UnsupportedDepth(other)),
        }
        let word_mask = u32::MAX >> (32 - bits_per_pixel as u32);
        let mut seen = 0u32;
        for mask in masks {
            if mask & !word_mask != 0 || mask & seen != 0 {
                return Err(CodecError::InvalidFormat);
            }
            seen |= mask;
        }
        Ok(Self {
            bits_per_pixel,
            byte_order,
            red: Channel::from_mask(rmask),
            green: Channel::from_mask(gmask),
            blue: Channel::from_mask(bmask),
            alpha: Channel::from_mask(amask),
        })
    }

    /// Bits per pixel (8, 16, 24, or 32).
    #[inline]
    pub const fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    /// Bytes per pixel (1 to 4).
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel as usize / 8
    }

    /// Byte order of multi-byte pixel words.
    #[inline]
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    #[inline]
    pub const fn red(&self) -> Channel {
        self.red
    }

    #[inline]
    pub const fn green(&self) -> Channel {
        self.green
    }

    #[inline]
    pub const fn blue(&self) -> Channel {
        self.blue
    }

    #[inline]
    pub const fn alpha(&self) -> Channel {
        self.alpha
    }

    /// Whether pixels are palette indices.
    #[inline]
    pub const fn is_indexed(&self) -> bool {
        self.bits_per_pixel == 8
    }

    /// Whether the pixel word has an alpha channel.
    #[inline]
    pub const fn has_alpha(&self) -> bool {
        self.alpha.is_present()
    }

    /// Decode a packed word. Alpha is 255 when the layout has none.
    ///
    /// Not meaningful for indexed layouts; use the surface palette instead.
    pub fn decode(&self, word: u32) -> Rgba<u8> {
        Rgba {
            r: self.red.extract(word),
            g: self.green.extract(word),
            b: self.blue.extract(word),
            a: if self.alpha.is_present() {
                self.alpha.extract(word)
            } else {
                255
            },
        }
    }

    /// Pack a color into a word, dropping precision the layout cannot hold.
    pub fn encode(&self, color: Rgba<u8>) -> u32 {
        self.red.pack(color.r)
            | self.green.pack(color.g)
            | self.blue.pack(color.b)
            | self.alpha.pack(color.a)
    }
}

/// Colors of an 8-bit indexed surface.
///
/// Always holds exactly [`Palette::LEN`] entries so that every index is
/// addressable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    /// Entries addressable by an 8-bit index.
    pub const LEN: usize = 256;

    /// Identity grayscale ramp: index `i` maps to `(i, i, i)`.
    pub fn grayscale() -> Self {
        let colors = (0..=255u8).map(|v| Rgb { r: v, g: v, b: v }).collect();
        Self { colors }
    }

    /// Build a palette from up to 256 colors; missing entries are black.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SizeMismatch`] if more than 256 colors are given.
    pub fn from_colors(colors: &[Rgb<u8>]) -> Result<Self, CodecError> {
        if colors.len() > Self::LEN {
            return Err(CodecError::SizeMismatch {
                expected: Self::LEN,
                actual: colors.len(),
            });
        }
        let mut padded = Vec::with_capacity(Self::LEN);
        padded.extend_from_slice(colors);
        padded.resize(Self::LEN, Rgb { r: 0, g: 0, b: 0 });
        Ok(Self { colors: padded })
    }

    /// Color at `index`.
    #[inline]
    pub fn get(&self, index: u8) -> Rgb<u8> {
        self.colors[index as usize]
    }

    /// All 256 entries.
    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    /// Index of the closest entry; exact matches win, ties go to the lowest index.
    pub fn nearest(&self, color: Rgb<u8>) -> u8 {
        let distance = |c: &Rgb<u8>| {
            let dr = c.r as i32 - color.r as i32;
            let dg = c.g as i32 - color.g as i32;
            let db = c.b as i32 - color.b as i32;
            dr * dr + dg * dg + db * db
        };
        let mut best = 0usize;
        let mut best_distance = i32::MAX;
        for (i, c) in self.colors.iter().enumerate() {
            let d = distance(c);
            if d < best_distance {
                best = i;
                best_distance = d;
                if d == 0 {
                    break;
                }
            }
        }
        best as u8
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_word_three_bytes() {
        assert_eq!(ByteOrder::Little.read_word(&[0x11, 0x22, 0x33]), 0x33_22_11);
        assert_eq!(ByteOrder::Big.read_word(&[0x11, 0x22, 0x33]), 0x11_22_33);
    }

    #[test]
    fn read_word_matches_from_bytes() {
        let bytes = [0xAA, 0xBB, 0xCC, 0xDD];
        assert_eq!(ByteOrder::Little.read_word(&bytes), u32::from_le_bytes(bytes));
        assert_eq!(ByteOrder::Big.read_word(&bytes), u32::from_be_bytes(bytes));
        assert_eq!(
            ByteOrder::Little.read_word(&bytes[..2]),
            u16::from_le_bytes([0xAA, 0xBB]) as u32
        );
    }

    #[test]
    fn write_word_inverts_read_word() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            for len in 1..=4 {
                let src = [0x01, 0x80, 0xFE, 0x7F];
                let word = order.read_word(&src[..len]);
                let mut out = [0u8; 4];
                order.write_word(word, &mut out[..len]);
                assert_eq!(out[..len], src[..len]);
            }
        }
    }

    #[test]
    fn native_matches_target() {
        let sample = 0x0102_0304u32.to_ne_bytes();
        assert_eq!(ByteOrder::NATIVE.read_word(&sample), 0x0102_0304);
    }

    #[test]
    fn channel_from_mask_565() {
        let red = Channel::from_mask(0xF800);
        assert_eq!((red.shift, red.loss), (11, 3));
        let green = Channel::from_mask(0x07E0);
        assert_eq!((green.shift, green.loss), (5, 2));
        let blue = Channel::from_mask(0x001F);
        assert_eq!((blue.shift, blue.loss), (0, 3));
    }

    #[test]
    fn empty_channel_loses_everything() {
        assert_eq!(Channel::from_mask(0), Channel::NONE);
        assert_eq!(Channel::NONE.extract(u32::MAX), 0);
        assert_eq!(Channel::NONE.pack(255), 0);
    }

    #[test]
    fn extract_restores_magnitude() {
        let red = Channel::from_mask(0xF800);
        // 5-bit 31 re-expands to 248.
        assert_eq!(red.extract(0xF800), 248);
        assert_eq!(red.pack(248), 0xF800);
        assert_eq!(red.pack(255), 0xF800);
    }

    #[test]
    fn from_masks_rgb565() {
        let format =
            SurfaceFormat::from_masks(16, 0xF800, 0x07E0, 0x001F, 0, ByteOrder::Little).unwrap();
        assert_eq!(format.bytes_per_pixel(), 2);
        assert!(!format.has_alpha());
        assert!(!format.is_indexed());
        let word = format.encode(Rgba {
            r: 255,
            g: 0,
            b: 255,
            a: 255,
        });
        assert_eq!(word, 0xF81F);
        assert_eq!(
            format.decode(word),
            Rgba {
                r: 248,
                g: 0,
                b: 248,
                a: 255
            }
        );
    }

    #[test]
    fn from_masks_rejects_bad_depths() {
        assert_eq!(
            SurfaceFormat::from_masks(12, 0, 0, 0, 0, ByteOrder::Little),
            Err(CodecError::UnsupportedDepth(12))
        );
        assert_eq!(
            SurfaceFormat::from_masks(8, 0xE0, 0x1C, 0x03, 0, ByteOrder::Little),
            Err(CodecError::InvalidFormat)
        );
        assert_eq!(
            SurfaceFormat::from_masks(8, 0, 0, 0, 0, ByteOrder::Big),
            Ok(SurfaceFormat::indexed())
        );
    }

    #[test]
    fn from_masks_rejects_overlap_and_overflow() {
        assert_eq!(
            SurfaceFormat::from_masks(16, 0xFF00, 0x0FF0, 0x000F, 0, ByteOrder::Little),
            Err(CodecError::InvalidFormat)
        );
        assert_eq!(
            SurfaceFormat::from_masks(24, 0xFF00_0000, 0xFF00, 0xFF, 0, ByteOrder::Little),
            Err(CodecError::InvalidFormat)
        );
    }

    #[test]
    fn decode_with_alpha() {
        let format = SurfaceFormat::from_masks(
            32,
            0x0000_00FF,
            0x0000_FF00,
            0x00FF_0000,
            0xFF00_0000,
            ByteOrder::Little,
        )
        .unwrap();
        assert!(format.has_alpha());
        assert_eq!(
            format.decode(0x8033_2211),
            Rgba {
                r: 0x11,
                g: 0x22,
                b: 0x33,
                a: 0x80
            }
        );
    }

    #[test]
    fn grayscale_palette() {
        let palette = Palette::grayscale();
        assert_eq!(palette.colors().len(), Palette::LEN);
        assert_eq!(palette.get(7), Rgb { r: 7, g: 7, b: 7 });
        assert_eq!(palette.nearest(Rgb { r: 9, g: 10, b: 11 }), 10);
    }

    #[test]
    fn palette_from_colors_pads_and_limits() {
        let red = Rgb { r: 255, g: 0, b: 0 };
        let palette = Palette::from_colors(&[red]).unwrap();
        assert_eq!(palette.get(0), red);
        assert_eq!(palette.get(255), Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(palette.nearest(Rgb { r: 200, g: 10, b: 0 }), 0);

        let too_many = alloc::vec![red; 257];
        assert!(matches!(
            Palette::from_colors(&too_many),
            Err(CodecError::SizeMismatch { actual: 257, .. })
        ));
    }
}
