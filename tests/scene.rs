//! End-to-end: decode raw buffers, build sprites, query collisions.

use std::sync::Arc;

use zensurface::euclid::default::{Point2D, Vector2D};
use zensurface::{
    ByteOrder, CodecConfig, CodecError, PixelFormat, Residency, Sprite, SpriteGroup, SpriteImage,
    Surface, SurfaceFormat, collide_all, from_bytes, to_bytes,
};

/// A `w x h` RGBA image, opaque where `opaque(x, y)` holds.
fn rgba_image(w: u32, h: u32, opaque: impl Fn(u32, u32) -> bool) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let a = if opaque(x, y) { 255 } else { 0 };
            bytes.extend_from_slice(&[x as u8, y as u8, 0x40, a]);
        }
    }
    bytes
}

fn sprite_image(
    config: &CodecConfig,
    w: u32,
    h: u32,
    opaque: impl Fn(u32, u32) -> bool,
) -> Arc<SpriteImage> {
    let bytes = rgba_image(w, h, opaque);
    let surface = from_bytes(config, &bytes, w, h, PixelFormat::Rgba, false).unwrap();
    Arc::new(SpriteImage::new(surface).unwrap())
}

#[test]
fn rgba_round_trip_in_both_byte_orders() {
    let bytes = rgba_image(7, 5, |x, y| (x + y) % 3 != 0);
    for order in [ByteOrder::Little, ByteOrder::Big] {
        let config = CodecConfig::new().with_byte_order(order);
        for flipped in [false, true] {
            let surface = from_bytes(&config, &bytes, 7, 5, PixelFormat::Rgba, flipped).unwrap();
            assert_eq!(surface.pitch(), 28);
            assert_eq!(to_bytes(&surface, PixelFormat::Rgba, flipped).unwrap(), bytes);
        }
    }
}

#[test]
fn format_names_parse() {
    for name in ["P", "RGB", "RGBA", "RGBAX", "ARGB", "RGBX", "RGBA_PREMULT", "ARGB_PREMULT"] {
        let format: PixelFormat = name.parse().unwrap();
        assert_eq!(format.name(), name);
    }
    assert_eq!("rgb".parse::<PixelFormat>().unwrap_err(), CodecError::InvalidFormat);
}

#[test]
fn ring_and_dot() {
    let config = CodecConfig::new();
    // 8x8 ring with a transparent 4x4 hole in the middle.
    let ring = sprite_image(&config, 8, 8, |x, y| !(2..6).contains(&x) || !(2..6).contains(&y));
    let dot = sprite_image(&config, 2, 2, |_, _| true);

    let mut group = SpriteGroup::new();
    let ring_id = group.insert(Sprite::new(ring, Point2D::new(10, 10)));
    let dot_id = group.insert(Sprite::new(dot, Point2D::new(13, 13)));

    // Inside the hole: rectangles overlap, pixels do not.
    assert!(group.collisions().is_empty());

    group.get_mut(dot_id).unwrap().translate(Vector2D::new(-2, 0));
    let map = group.collisions();
    assert!(map[&ring_id].contains(&dot_id));
    assert!(map[&dot_id].contains(&ring_id));

    // Fully outside to the left, touching the edge.
    group.move_to(dot_id, Point2D::new(8, 12));
    assert!(group.collisions().is_empty());
}

#[test]
fn colorkey_sprites_from_rgb() {
    let config = CodecConfig::new();
    // 4x1 strip: magenta key at both ends.
    let rgb = [255u8, 0, 255, 1, 1, 1, 2, 2, 2, 255, 0, 255];
    let mut surface = from_bytes(&config, &rgb, 4, 1, PixelFormat::Rgb, false).unwrap();
    let key = surface.pixel(0, 0).unwrap();
    surface.set_colorkey(Some(key));
    let image = Arc::new(SpriteImage::new(surface).unwrap());
    assert_eq!(image.mask().rows(), &[0b0110]);

    let sprites = [
        Sprite::new(Arc::clone(&image), Point2D::new(0, 0)),
        // Overlaps sprite 0 only where both are keyed out.
        Sprite::new(Arc::clone(&image), Point2D::new(3, 0)),
        // Opaque at world x 2..4, hitting sprite 0 at x=2 but missing sprite 1.
        Sprite::new(image, Point2D::new(1, 0)),
    ];
    let map = collide_all(&sprites);
    let ids: Vec<_> = map.keys().map(|id| id.index()).collect();
    assert_eq!(ids, [0, 2]);
    assert!(map.values().all(|s| s.len() == 1));
}

#[test]
fn device_surfaces_refuse_pixel_access() {
    let config = CodecConfig::new();
    let rgba = SurfaceFormat::from_masks(
        32,
        0x0000_00FF,
        0x0000_FF00,
        0x00FF_0000,
        0xFF00_0000,
        ByteOrder::Little,
    )
    .unwrap();
    let surface = Surface::new_device(&config, 4, 4, rgba).unwrap();
    assert_eq!(surface.residency(), Residency::Device);
    assert_eq!(
        to_bytes(&surface, PixelFormat::Rgba, false).unwrap_err(),
        CodecError::NotSupported
    );
    assert!(SpriteImage::new(surface).is_err());
}
