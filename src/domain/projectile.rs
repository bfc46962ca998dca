/// Horizontal bullets with a two-phase death.
///
/// A projectile that hits something is first marked removed: it stops
/// moving and sheds a handful of sparks. It only reports itself finished
/// once every spark has come to rest, so impacts stay visible for their
/// full duration.

use rand::Rng;

use super::animation::{self, AnimKey, Animation, Team};
use super::geom::{Rect, Vec2};
use super::particle::Spark;

pub const PROJECTILE_SIZE: (i32, i32) = (4, 4);
pub const PROJECTILE_SPEED: f32 = 3.0;
const IMPACT_SPARKS: usize = 4;

#[derive(Clone, Debug)]
pub struct Projectile {
    pub team: Team,
    /// Center of the projectile.
    pub pos: Vec2,
    /// Signed horizontal speed in px/frame.
    pub direction: f32,
    pub animation: Animation,
    pub sparks: Vec<Spark>,
    is_removed: bool,
}

impl Projectile {
    pub fn new(team: Team, pos: Vec2, direction: f32) -> Self {
        Projectile {
            team,
            pos,
            direction,
            animation: animation::animation(AnimKey::Projectile(team)),
            sparks: Vec::new(),
            is_removed: false,
        }
    }

    /// Bounding box centered on `pos`.
    pub fn rect(&self) -> Rect {
        let (w, h) = PROJECTILE_SIZE;
        Rect::at(Vec2::new(self.pos.x - w as f32 / 2.0, self.pos.y - h as f32 / 2.0), w, h)
    }

    pub fn is_removed(&self) -> bool {
        self.is_removed
    }

    /// Sign of travel: -1 or +1.
    pub fn heading(&self) -> i32 {
        if self.direction > 0.0 { 1 } else { -1 }
    }

    /// Pixel just ahead of the projectile, used for terrain probes.
    pub fn probe(&self, reach: i32) -> Vec2 {
        let r = self.rect();
        Vec2::new((r.centerx() + reach * self.heading()) as f32, r.centery() as f32)
    }

    /// Mark the projectile as spent and throw sparks back toward the
    /// shooter. Further calls are ignored.
    pub fn remove<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.is_removed {
            return;
        }
        self.is_removed = true;
        let back = if self.direction > 0.0 { std::f32::consts::PI } else { 0.0 };
        for _ in 0..IMPACT_SPARKS {
            let angle = rng.gen::<f32>() - 0.5 + back;
            let speed = 2.0 + rng.gen::<f32>();
            self.sparks.push(Spark::new(self.pos, angle, speed));
        }
    }

    /// Advance one frame. Returns true when the projectile can be dropped.
    pub fn update(&mut self) -> bool {
        if self.is_removed {
            self.sparks.retain_mut(|s| !s.update());
            return self.sparks.is_empty();
        }
        self.animation.update();
        self.pos.x += self.direction;
        self.animation.done
    }
}
