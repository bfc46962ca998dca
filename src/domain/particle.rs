/// Short-lived visual effects.
///
/// A `Particle` lives as long as its one-shot animation; a `Spark` lives
/// until its speed has decayed to zero. Whoever spawns them owns them and
/// drops them when `update` reports they are finished.

use rand::Rng;

use super::animation::{self, AnimKey, Animation};
use super::geom::Vec2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParticleKind {
    Dust,
    Leaf,
    Smoke,
}

impl ParticleKind {
    fn anim_key(self) -> AnimKey {
        match self {
            ParticleKind::Dust => AnimKey::Particle,
            ParticleKind::Leaf => AnimKey::Leaf,
            ParticleKind::Smoke => AnimKey::Smoke,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub animation: Animation,
}

impl Particle {
    pub fn new(kind: ParticleKind, pos: Vec2, velocity: Vec2, frame: u32) -> Self {
        let mut animation = animation::animation(kind.anim_key());
        animation.frame = frame;
        Particle { kind, pos, velocity, animation }
    }

    /// Move and animate. Returns true once the animation had already
    /// finished before this tick.
    pub fn update(&mut self) -> bool {
        let kill = self.animation.done;
        self.pos += self.velocity;
        self.animation.update();
        kill
    }

    pub fn done(&self) -> bool {
        self.animation.done
    }
}

/// Radial burst of dust particles (dash start / end).
pub fn burst<R: Rng + ?Sized>(rng: &mut R, center: Vec2, count: usize, out: &mut Vec<Particle>) {
    for _ in 0..count {
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        let speed = rng.gen::<f32>() * 0.5 + 0.5;
        out.push(Particle::new(
            ParticleKind::Dust,
            center,
            Vec2::new(angle.cos() * speed, angle.sin() * speed),
            rng.gen_range(0..=7),
        ));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Spark {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
}

impl Spark {
    pub fn new(pos: Vec2, angle: f32, speed: f32) -> Self {
        Spark { pos, angle, speed }
    }

    /// Returns true once the spark has come to rest.
    pub fn update(&mut self) -> bool {
        self.pos.x += self.angle.cos() * self.speed;
        self.pos.y += self.angle.sin() * self.speed;
        self.speed = (self.speed - 0.1).max(0.0);
        self.speed == 0.0
    }
}

/// Advance every particle and drop the finished ones.
pub fn update_all(particles: &mut Vec<Particle>) {
    particles.retain_mut(|p| !p.update());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn particle_outlives_animation_by_one_tick() {
        let mut p = Particle::new(ParticleKind::Dust, Vec2::ZERO, Vec2::new(1.0, 0.0), 0);
        let total = 4 * 6;
        let mut ticks = 0;
        while !p.update() {
            ticks += 1;
        }
        assert_eq!(ticks, total - 1);
        assert!(p.done());
        assert!(p.pos.x > 0.0);
    }

    #[test]
    fn spark_stops_after_speed_decays() {
        let mut s = Spark::new(Vec2::ZERO, 0.0, 0.35);
        assert!(!s.update());
        assert!(!s.update());
        assert!(!s.update());
        assert!(s.update());
        assert_eq!(s.speed, 0.0);
    }

    #[test]
    fn burst_spawns_requested_count() {
        let mut rng = StepRng::new(0, 1 << 30);
        let mut out = vec![];
        burst(&mut rng, Vec2::new(5.0, 5.0), 20, &mut out);
        assert_eq!(out.len(), 20);
        assert!(out.iter().all(|p| p.kind == ParticleKind::Dust && p.animation.frame <= 7));
    }
}
