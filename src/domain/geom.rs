/// Pixel-space geometry shared by the simulation.
///
/// Positions and velocities are continuous (`Vec2`). Collision boxes are
/// integer rectangles built by truncating the continuous position toward
/// zero, so every overlap test in the game is exact integer arithmetic.
///
/// `Rect` edges follow the half-open convention: a rect covers
/// `[x, x + w) × [y, y + h)`, and two rects that merely share an edge do
/// not collide.

use std::ops::{Add, AddAssign, Mul};

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Grid cell containing this pixel position (floor division).
    pub fn cell(self, tile_size: i32) -> IVec {
        let ts = tile_size as f32;
        IVec::new((self.x / ts).floor() as i32, (self.y / ts).floor() as i32)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, o: Vec2) {
        self.x += o.x;
        self.y += o.y;
    }
}

/// Integer 2D coordinate: grid cells, tile-space offsets, pixel points.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct IVec {
    pub x: i32,
    pub y: i32,
}

impl IVec {
    pub const fn new(x: i32, y: i32) -> Self {
        IVec { x, y }
    }

    /// Pack into a single 64-bit map key (x in the high half).
    #[inline]
    pub fn key(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.y as u32 as u64)
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

impl Add for IVec {
    type Output = IVec;
    fn add(self, o: IVec) -> IVec {
        IVec::new(self.x + o.x, self.y + o.y)
    }
}

impl Mul<i32> for IVec {
    type Output = IVec;
    fn mul(self, k: i32) -> IVec {
        IVec::new(self.x * k, self.y * k)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Box at a continuous position, truncated toward zero.
    pub fn at(pos: Vec2, w: i32, h: i32) -> Self {
        Rect::new(pos.x as i32, pos.y as i32, w, h)
    }

    pub fn left(&self) -> i32 { self.x }
    pub fn right(&self) -> i32 { self.x + self.w }
    pub fn top(&self) -> i32 { self.y }
    pub fn bottom(&self) -> i32 { self.y + self.h }
    pub fn centerx(&self) -> i32 { self.x + self.w / 2 }
    pub fn centery(&self) -> i32 { self.y + self.h / 2 }

    pub fn center(&self) -> IVec {
        IVec::new(self.centerx(), self.centery())
    }

    pub fn midtop(&self) -> IVec {
        IVec::new(self.centerx(), self.y)
    }

    pub fn set_left(&mut self, v: i32) { self.x = v; }
    pub fn set_right(&mut self, v: i32) { self.x = v - self.w; }
    pub fn set_top(&mut self, v: i32) { self.y = v; }
    pub fn set_bottom(&mut self, v: i32) { self.y = v - self.h; }

    /// Strict overlap: shared edges do not count.
    pub fn collides(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(&self, p: IVec) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct_for_negatives() {
        let cells = [(0, 0), (-1, 5), (5, -1), (7, -3), (-1, -1), (i32::MIN, i32::MAX)];
        for (i, &(ax, ay)) in cells.iter().enumerate() {
            for &(bx, by) in &cells[i + 1..] {
                assert_ne!(IVec::new(ax, ay).key(), IVec::new(bx, by).key());
            }
        }
        assert_eq!(IVec::new(-1, 5).key(), 0xFFFF_FFFF_0000_0005);
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = Rect::new(0, 0, 16, 16);
        assert!(!a.collides(&Rect::new(16, 0, 16, 16)));
        assert!(!a.collides(&Rect::new(0, 16, 16, 16)));
        assert!(a.collides(&Rect::new(15, 15, 16, 16)));
    }

    #[test]
    fn rect_at_truncates_toward_zero() {
        assert_eq!(Rect::at(Vec2::new(3.9, -2.7), 4, 4), Rect::new(3, -2, 4, 4));
    }

    #[test]
    fn cell_uses_floor_division() {
        assert_eq!(Vec2::new(-0.5, 15.9).cell(16), IVec::new(-1, 0));
        assert_eq!(Vec2::new(32.0, 16.0).cell(16), IVec::new(2, 1));
    }

    #[test]
    fn edge_setters_move_origin() {
        let mut r = Rect::new(0, 0, 12, 18);
        r.set_right(48);
        assert_eq!(r.x, 36);
        r.set_bottom(81);
        assert_eq!(r.y, 63);
        assert_eq!(r.midtop(), IVec::new(42, 63));
    }
}
