//! Positioned sprites and bitmask collision.
//!
//! A [`SpriteImage`] pairs a surface with its [`Bitmask`] and is shared via
//! [`Arc`] by every [`Sprite`] that shows it. Collision is two-phase: the
//! bounding rectangles must overlap with non-zero area, then the masks are
//! compared one scanline word at a time.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::sync::Arc;
use alloc::vec::Vec;

use euclid::default::{Point2D, Rect, Size2D, Vector2D};

use crate::error::CodecError;
use crate::mask::Bitmask;
use crate::surface::Surface;

/// An image together with its precomputed opacity mask.
#[derive(Debug)]
pub struct SpriteImage {
    surface: Surface,
    mask: Bitmask,
}

impl SpriteImage {
    /// Compute the mask of `surface` and keep both.
    ///
    /// # Errors
    ///
    /// Propagates [`Bitmask::from_surface`] errors.
    pub fn new(surface: Surface) -> Result<Self, CodecError> {
        let mask = Bitmask::from_surface(&surface)?;
        Ok(Self { surface, mask })
    }

    /// Pair a surface with a mask computed elsewhere.
    ///
    /// The mask is expected to match the surface size.
    pub fn with_mask(surface: Surface, mask: Bitmask) -> Self {
        debug_assert_eq!(
            (mask.width(), mask.height()),
            surface.size(),
            "mask size does not match surface"
        );
        Self { surface, mask }
    }

    #[inline]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[inline]
    pub fn mask(&self) -> &Bitmask {
        &self.mask
    }
}

/// One placed instance of a [`SpriteImage`].
#[derive(Clone, Debug)]
pub struct Sprite {
    image: Arc<SpriteImage>,
    position: Point2D<i32>,
}

impl Sprite {
    pub fn new(image: Arc<SpriteImage>, position: Point2D<i32>) -> Self {
        Self { image, position }
    }

    #[inline]
    pub fn image(&self) -> &Arc<SpriteImage> {
        &self.image
    }

    #[inline]
    pub fn mask(&self) -> &Bitmask {
        &self.image.mask
    }

    /// Top-left corner in world coordinates.
    #[inline]
    pub fn position(&self) -> Point2D<i32> {
        self.position
    }

    pub fn set_position(&mut self, position: Point2D<i32>) {
        self.position = position;
    }

    pub fn translate(&mut self, by: Vector2D<i32>) {
        self.position += by;
    }

    /// Bounding rectangle: the position plus the mask size.
    pub fn rect(&self) -> Rect<i32> {
        let mask = self.mask();
        Rect::new(
            self.position,
            Size2D::new(mask.width() as i32, mask.height() as i32),
        )
    }
}

/// Whether the opaque pixels of `a` and `b` overlap.
///
/// A sprite never collides with itself (the same reference), and sprites
/// whose rectangles only touch along an edge or corner never collide.
pub fn collide_mask(a: &Sprite, b: &Sprite) -> bool {
    // Widened so sprites near the edge of the i32 range cannot overflow.
    let (rect_a, rect_b) = (a.rect().to_i64(), b.rect().to_i64());
    if core::ptr::eq(a, b) || !rect_a.intersects(&rect_b) {
        return false;
    }

    // Scan from the sprite whose top edge is higher; `dx` is how far right
    // the lower sprite sits relative to it.
    let offset = rect_b.origin - rect_a.origin;
    let (upper, lower, dx, dy) = if offset.y >= 0 {
        (a, b, offset.x, offset.y)
    } else {
        (b, a, -offset.x, -offset.y)
    };

    let upper_rows = usize::try_from(dy)
        .ok()
        .and_then(|dy| upper.mask().rows().get(dy..))
        .unwrap_or(&[]);
    let lower_rows = lower.mask().rows();
    // zip stops at the shorter side, which is exactly the vertical overlap.
    upper_rows
        .iter()
        .zip(lower_rows)
        .any(|(&up, &low)| up & align(low, dx) != 0)
}

/// Move a scanline word `dx` pixels right (left when negative).
#[inline]
fn align(row: u64, dx: i64) -> u64 {
    let shift = u32::try_from(dx.unsigned_abs()).unwrap_or(u32::MAX);
    if dx >= 0 {
        row.checked_shl(shift).unwrap_or(0)
    } else {
        row.checked_shr(shift).unwrap_or(0)
    }
}

/// Handle of a sprite within a [`SpriteGroup`], or an index into the slice
/// given to [`collide_all`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpriteId(usize);

impl SpriteId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Sprites each sprite collides with. Sprites with no collisions are absent.
pub type CollisionMap = BTreeMap<SpriteId, BTreeSet<SpriteId>>;

/// Test every unordered pair of `sprites` once.
///
/// The result is symmetric: if `j` is in the set for `i`, `i` is in the
/// set for `j`. Ids are indices into `sprites`.
pub fn collide_all(sprites: &[Sprite]) -> CollisionMap {
    pairwise(sprites.iter().enumerate().map(|(i, s)| (SpriteId(i), s)))
}

fn pairwise<'a>(sprites: impl Iterator<Item = (SpriteId, &'a Sprite)>) -> CollisionMap {
    let sprites: Vec<_> = sprites.collect();
    let mut map = CollisionMap::new();
    for (i, &(id_a, a)) in sprites.iter().enumerate() {
        for &(id_b, b) in &sprites[i + 1..] {
            if collide_mask(a, b) {
                map.entry(id_a).or_default().insert(id_b);
                map.entry(id_b).or_default().insert(id_a);
            }
        }
    }
    log::trace!(
        "{} sprites tested, {} colliding",
        sprites.len(),
        map.len()
    );
    map
}

/// Owns the active sprites of a scene.
///
/// Ids stay valid until the sprite is removed and are never reused.
#[derive(Clone, Debug, Default)]
pub struct SpriteGroup {
    slots: Vec<Option<Sprite>>,
}

impl SpriteGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sprite and return its id.
    pub fn insert(&mut self, sprite: Sprite) -> SpriteId {
        self.slots.push(Some(sprite));
        SpriteId(self.slots.len() - 1)
    }

    /// Remove a sprite, returning it if it was present.
    pub fn remove(&mut self, id: SpriteId) -> Option<Sprite> {
        self.slots.get_mut(id.0).and_then(Option::take)
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Move a sprite. Returns `false` if the id is not in the group.
    pub fn move_to(&mut self, id: SpriteId, position: Point2D<i32>) -> bool {
        match self.get_mut(id) {
            Some(sprite) => {
                sprite.set_position(position);
                true
            }
            None => false,
        }
    }

    /// Number of active sprites.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active sprites in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (SpriteId(i), s)))
    }

    /// Collisions between all active sprites, computed once per call.
    pub fn collisions(&self) -> CollisionMap {
        pairwise(self.iter())
    }
}
