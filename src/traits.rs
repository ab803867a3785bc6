//! Seam for the external image-file codec.
//!
//! Decoding and encoding image files (PNG, GIF, ...) is not done here. An
//! implementation of [`ImageIo`] decodes into pixels and hands them over via
//! [`Surface::from_rgba_img`](crate::Surface::from_rgba_img) or
//! [`from_bytes`](crate::from_bytes), and reads surfaces back out with
//! [`Surface::to_rgba_img`](crate::Surface::to_rgba_img).

use crate::error::CodecError;
use crate::surface::Surface;

/// Loads image files into surfaces and saves surfaces to files.
///
/// Paths are plain strings so the trait stays usable without `std`.
pub trait ImageIo {
    /// Decode the file at `path` into a surface.
    fn load(&self, path: &str) -> Result<Surface, CodecError>;

    /// Encode `surface` and write it to `path`.
    fn save(&self, surface: &Surface, path: &str) -> Result<(), CodecError>;
}

/// The built-in [`ImageIo`]: no file formats are available, so both
/// directions return [`CodecError::NotImplemented`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoImageIo;

impl ImageIo for NoImageIo {
    fn load(&self, path: &str) -> Result<Surface, CodecError> {
        log::debug!("load({path}) requested without an image codec");
        Err(CodecError::NotImplemented("image loading"))
    }

    fn save(&self, surface: &Surface, path: &str) -> Result<(), CodecError> {
        log::debug!("save({surface:?}, {path}) requested without an image codec");
        Err(CodecError::NotImplemented("image saving"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::format::PixelFormat;
    use crate::pixel::SurfaceFormat;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    #[test]
    fn builtin_io_is_unimplemented() {
        let io = NoImageIo;
        assert_eq!(
            io.load("player1.gif").unwrap_err(),
            CodecError::NotImplemented("image loading")
        );
        let surface = Surface::new(&CodecConfig::new(), 1, 1, SurfaceFormat::indexed()).unwrap();
        assert_eq!(
            io.save(&surface, "out.png").unwrap_err(),
            CodecError::NotImplemented("image saving")
        );
    }

    /// Stores raw RGBA bytes keyed by path.
    #[derive(Default)]
    struct MemoryIo {
        files: RefCell<Vec<(String, u32, u32, Vec<u8>)>>,
    }

    impl ImageIo for MemoryIo {
        fn load(&self, path: &str) -> Result<Surface, CodecError> {
            let files = self.files.borrow();
            let (_, w, h, bytes) = files
                .iter()
                .find(|(p, ..)| p == path)
                .ok_or(CodecError::NotSupported)?;
            crate::from_bytes(&CodecConfig::new(), bytes, *w, *h, PixelFormat::Rgba, false)
        }

        fn save(&self, surface: &Surface, path: &str) -> Result<(), CodecError> {
            let bytes = crate::to_bytes(surface, PixelFormat::Rgba, false)?;
            self.files
                .borrow_mut()
                .push((String::from(path), surface.width(), surface.height(), bytes));
            Ok(())
        }
    }

    #[test]
    fn custom_io_round_trips_through_codec() {
        let io = MemoryIo::default();
        let rgba = [1u8, 2, 3, 255, 4, 5, 6, 0];
        let surface =
            crate::from_bytes(&CodecConfig::new(), &rgba, 2, 1, PixelFormat::Rgba, false).unwrap();
        io.save(&surface, "a").unwrap();
        let loaded = io.load("a").unwrap();
        assert_eq!(
            crate::to_bytes(&loaded, PixelFormat::Rgba, false).unwrap(),
            rgba
        );
    }
}
