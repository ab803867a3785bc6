//! Surfaces, raw pixel transcoding and bitmask sprite collision.
//!
//! This crate is the pixel core of a small 2D sprite layer:
//!
//! - [`Surface`]: a 2D pixel container with a [`SurfaceFormat`] (bit depth,
//!   channel masks, byte order), optional [`Palette`] and colorkey
//! - [`from_bytes`] / [`to_bytes`]: convert between surfaces and packed byte
//!   buffers named by a [`PixelFormat`] (`"RGB"`, `"RGBA"`, `"P"`, ...)
//! - [`Bitmask`]: per-scanline opacity derived from alpha or colorkey
//! - [`Sprite`] / [`SpriteGroup`]: positioned sprites with [`collide_mask`]
//!   and [`collide_all`]
//! - [`ImageIo`]: the seam where an image-file codec plugs in
//!
//! Allocation is governed by a [`CodecConfig`] carrying the native
//! [`ByteOrder`], scanline alignment and [`ResourceLimits`].
//!
//! ```
//! use std::sync::Arc;
//! use zensurface::euclid::default::Point2D;
//! use zensurface::{CodecConfig, PixelFormat, Sprite, SpriteImage, collide_mask, from_bytes};
//!
//! let opaque = [255u8; 4 * 4 * 4];
//! let surface = from_bytes(&CodecConfig::default(), &opaque, 4, 4, PixelFormat::Rgba, false)?;
//! let image = Arc::new(SpriteImage::new(surface)?);
//!
//! let a = Sprite::new(Arc::clone(&image), Point2D::new(0, 0));
//! let b = Sprite::new(Arc::clone(&image), Point2D::new(2, 2));
//! let c = Sprite::new(image, Point2D::new(4, 4));
//! assert!(collide_mask(&a, &b));
//! assert!(!collide_mask(&a, &c));
//! # Ok::<(), zensurface::CodecError>(())
//! ```

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
mod codec;
mod config;
mod error;
mod format;
mod limits;
mod mask;
mod pixel;
mod sprite;
mod surface;
mod traits;

pub use buffer::{BufferError, PixelSlice, PixelSliceMut};
pub use codec::{from_bytes, to_bytes};
pub use config::CodecConfig;
pub use error::CodecError;
pub use format::PixelFormat;
pub use limits::{LimitExceeded, ResourceLimits};
pub use mask::Bitmask;
pub use pixel::{ByteOrder, Channel, Palette, SurfaceFormat};
pub use sprite::{
    CollisionMap, Sprite, SpriteGroup, SpriteId, SpriteImage, collide_all, collide_mask,
};
pub use surface::{Residency, Surface};
pub use traits::{ImageIo, NoImageIo};

// Re-exports for callers building geometry and pixel data.
pub use euclid;
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb;
pub use rgb::{Rgb, Rgba};
