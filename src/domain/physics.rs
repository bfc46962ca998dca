/// Axis-separated box-vs-tilemap movement.
///
/// ## Resolution order
///
/// Each update moves the body along X first, pushes it out of any solid
/// tile it now overlaps, then does the same along Y. Resolving the axes
/// separately keeps the body from snagging on the seam between two floor
/// tiles, and every clamp is idempotent per axis so the neighbor
/// iteration order does not change the outcome.
///
/// ## Floor contact
///
/// Landing snaps the bottom edge to `floor.top + 1`. The broad phase looks
/// at the 3×3 cells around the body's top-left corner, so a resting body
/// keeps drifting down under gravity until the floor row enters that
/// window again and it re-lands. Callers treat "airborne" as more than a
/// few frames without floor contact for this reason.

use super::entity::Collisions;
use super::geom::{Rect, Vec2};
use super::tilemap::Tilemap;

pub const GRAVITY: f32 = 0.15;
pub const MAX_FALL_SPEED: f32 = 5.0;

#[derive(Clone, Debug)]
pub struct PhysicsBody {
    pub pos: Vec2,
    pub size: (i32, i32),
    pub velocity: Vec2,
    pub collisions: Collisions,
    /// Facing left.
    pub flip: bool,
    pub last_movement: Vec2,
}

impl PhysicsBody {
    pub fn new(pos: Vec2, size: (i32, i32)) -> Self {
        PhysicsBody {
            pos,
            size,
            velocity: Vec2::ZERO,
            collisions: Collisions::default(),
            flip: false,
            last_movement: Vec2::ZERO,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, self.size.0, self.size.1)
    }

    /// Facing sign: -1 when flipped, +1 otherwise.
    pub fn facing(&self) -> i32 {
        if self.flip { -1 } else { 1 }
    }

    /// One frame of movement: requested `movement` plus own velocity,
    /// resolved against the solid tiles around the body.
    pub fn update(&mut self, tilemap: &Tilemap, movement: Vec2) {
        self.collisions = Collisions::default();
        let frame = movement + self.velocity;

        // ── X ──
        self.pos.x += frame.x;
        let mut rect = self.rect();
        for obstacle in tilemap.physics_rects_around(self.pos) {
            if rect.collides(&obstacle) {
                if frame.x > 0.0 {
                    rect.set_right(obstacle.left());
                    self.collisions.right = true;
                } else if frame.x < 0.0 {
                    rect.set_left(obstacle.right());
                    self.collisions.left = true;
                }
                self.pos.x = rect.x as f32;
            }
        }

        // ── Y ──
        self.pos.y += frame.y;
        let mut rect = self.rect();
        for obstacle in tilemap.physics_rects_around(self.pos) {
            if rect.collides(&obstacle) {
                if frame.y > 0.0 {
                    rect.set_bottom(obstacle.top() + 1);
                    self.collisions.bottom = true;
                } else if frame.y < 0.0 {
                    rect.set_top(obstacle.bottom());
                    self.collisions.top = true;
                }
                self.pos.y = rect.y as f32;
            }
        }

        if movement.x < 0.0 {
            self.flip = true;
        } else if movement.x > 0.0 {
            self.flip = false;
        }
        self.last_movement = movement;

        self.velocity.y = (self.velocity.y + GRAVITY).min(MAX_FALL_SPEED);
        if self.collisions.vertical() {
            self.velocity.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geom::IVec;
    use crate::domain::tile::{Tile, TileKind};

    fn map_with(cells: &[(i32, i32)]) -> Tilemap {
        let mut map = Tilemap::new(16);
        for &(x, y) in cells {
            map.add_tile(Tile::new(TileKind::Stone, IVec::new(x, y), 0, 16, false));
        }
        map
    }

    fn floor(y: i32) -> Tilemap {
        map_with(&(-2..8).map(|x| (x, y)).collect::<Vec<_>>())
    }

    #[test]
    fn lands_one_pixel_into_floor() {
        let map = floor(5);
        let mut body = PhysicsBody::new(Vec2::new(40.0, 63.5), (12, 18));
        body.velocity.y = 0.6;
        body.update(&map, Vec2::ZERO);
        assert!(body.collisions.bottom);
        assert_eq!(body.pos.y, 63.0);
        assert_eq!(body.rect().bottom(), 81);
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn resting_body_relands_within_a_few_frames() {
        let map = floor(5);
        let mut body = PhysicsBody::new(Vec2::new(40.0, 63.0), (12, 18));
        let mut airborne = 0;
        for _ in 0..60 {
            body.update(&map, Vec2::ZERO);
            if body.collisions.bottom {
                airborne = 0;
            } else {
                airborne += 1;
                assert!(airborne <= 4, "fell for {} frames", airborne);
            }
            assert!(body.pos.y < 64.0 + 5.0);
        }
    }

    #[test]
    fn wall_stops_horizontal_movement() {
        let map = map_with(&[(3, 0), (3, 1)]);
        let mut body = PhysicsBody::new(Vec2::new(30.0, 4.0), (12, 18));
        body.update(&map, Vec2::new(8.0, 0.0));
        assert!(body.collisions.right);
        assert_eq!(body.rect().right(), 48);
        assert!(!body.flip);

        let mut body = PhysicsBody::new(Vec2::new(66.0, 4.0), (12, 18));
        body.update(&map, Vec2::new(-8.0, 0.0));
        assert!(body.collisions.left);
        assert_eq!(body.rect().left(), 64);
        assert!(body.flip);
    }

    #[test]
    fn ceiling_zeroes_upward_velocity() {
        let map = map_with(&[(2, 0)]);
        let mut body = PhysicsBody::new(Vec2::new(34.0, 17.0), (12, 18));
        body.velocity.y = -3.0;
        body.update(&map, Vec2::ZERO);
        assert!(body.collisions.top);
        assert_eq!(body.rect().top(), 16);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn zero_movement_keeps_facing() {
        let map = Tilemap::new(16);
        let mut body = PhysicsBody::new(Vec2::ZERO, (12, 18));
        body.update(&map, Vec2::new(-1.0, 0.0));
        assert!(body.flip);
        body.update(&map, Vec2::ZERO);
        assert!(body.flip);
    }

    #[test]
    fn gravity_caps_at_terminal_speed() {
        let map = Tilemap::new(16);
        let mut body = PhysicsBody::new(Vec2::ZERO, (12, 18));
        for _ in 0..100 {
            body.update(&map, Vec2::ZERO);
        }
        assert_eq!(body.velocity.y, MAX_FALL_SPEED);
    }

    #[test]
    fn no_tunneling_through_single_tile_wall() {
        // One-tile-thick wall in column 4, body approaching from either side
        // at every speed up to a full tile per frame.
        let map = map_with(&[(4, 0), (4, 1), (4, 2)]);
        for step in 1..=16 {
            let speed = step as f32;
            let mut body = PhysicsBody::new(Vec2::new(40.0, 8.0), (12, 18));
            for _ in 0..8 {
                body.velocity.y = 0.0;
                body.update(&map, Vec2::new(speed, 0.0));
                assert!(body.rect().right() <= 64, "speed {} tunneled right", speed);
            }
            let mut body = PhysicsBody::new(Vec2::new(84.0, 8.0), (12, 18));
            for _ in 0..8 {
                body.velocity.y = 0.0;
                body.update(&map, Vec2::new(-speed, 0.0));
                assert!(body.rect().left() >= 80, "speed {} tunneled left", speed);
            }
        }
    }
}
