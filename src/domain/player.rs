/// The player character.
///
/// ## Action priority (checked every frame)
///
///   dead > wall_slide > jump (airborne > 4 frames) > run / idle,
///   with run and idle swapped for their shooting variants while the
///   shot cooldown is active.
///
/// ## Timers
///
/// `dashing` is signed: its sign is the dash direction and it counts
/// toward zero. `shooting` is the shot cooldown. `air_time` counts frames
/// since the last floor contact.

use rand::Rng;

use super::animation::{self, AnimKey, Animation, PlayerAction, Team};
use super::entity::{PlayerInput, Spawn};
use super::geom::{Rect, Vec2};
use super::particle::{self, Particle, ParticleKind};
use super::physics::PhysicsBody;
use super::projectile::{Projectile, PROJECTILE_SPEED};
use super::tile::TileKind;
use super::tilemap::Tilemap;

pub const PLAYER_SIZE: (i32, i32) = (12, 18);
pub const PLAYER_START: Vec2 = Vec2::new(20.0, 50.0);

const JUMP_VELOCITY: f32 = -2.75;
const WALL_JUMP_KICK: f32 = 2.0;
const WALL_JUMP_VELOCITY: f32 = -3.0;
const WALL_SLIDE_MAX_FALL: f32 = 0.5;
const AIRBORNE_AFTER: u32 = 4;
const FALL_DEATH_AFTER: u32 = 120;
const DASH_FRAMES: i32 = 60;
const DASH_BURST_UNTIL: i32 = 50;
const DASH_SPEED: f32 = 8.0;
const DASH_BURST_PARTICLES: usize = 20;
const FRICTION: f32 = 0.1;
const SHOT_COOLDOWN: u32 = 8;
const MUZZLE_OFFSET: i32 = 10;

#[derive(Clone, Debug)]
pub struct Player {
    pub body: PhysicsBody,
    pub action: PlayerAction,
    pub animation: Animation,
    pub air_time: u32,
    pub jumps: u32,
    pub wall_slide: bool,
    pub dashing: i32,
    pub shooting: u32,
    pub dead: bool,
    pub dead_direction: i32,
    /// Dash dust owned by the player.
    pub particles: Vec<Particle>,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Player {
            body: PhysicsBody::new(pos, PLAYER_SIZE),
            action: PlayerAction::Idle,
            animation: animation::animation(AnimKey::Player(PlayerAction::Idle)),
            air_time: 0,
            jumps: 1,
            wall_slide: false,
            dashing: 0,
            shooting: 0,
            dead: false,
            dead_direction: 1,
            particles: Vec::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    /// Switch animation, restarting it only when the action changes.
    pub fn set_action(&mut self, action: PlayerAction) {
        if self.action != action {
            self.action = action;
            self.animation = animation::animation(AnimKey::Player(action));
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, tilemap: &Tilemap, input: &PlayerInput, rng: &mut R) {
        particle::update_all(&mut self.particles);

        if self.dead {
            self.set_action(PlayerAction::Dead);
            self.body.velocity.x = 0.0;
            self.body.update(tilemap, Vec2::ZERO);
            self.animation.update();
            return;
        }

        let movement = input.movement();
        self.body.update(tilemap, movement);
        self.animation.update();

        self.air_time += 1;
        if self.body.collisions.bottom {
            self.air_time = 0;
            self.jumps = 1;
        }

        if self.air_time > FALL_DEATH_AFTER {
            self.kill(1);
        }

        self.wall_slide = false;
        if self.body.collisions.horizontal() && self.air_time > AIRBORNE_AFTER {
            self.wall_slide = true;
            self.body.velocity.y = self.body.velocity.y.min(WALL_SLIDE_MAX_FALL);
            self.body.flip = !self.body.collisions.right;
            self.set_action(PlayerAction::WallSlide);
        }

        if !self.wall_slide {
            let action = if self.air_time > AIRBORNE_AFTER {
                PlayerAction::Jump
            } else if movement.x != 0.0 {
                if self.shooting > 0 { PlayerAction::RunShoot } else { PlayerAction::Run }
            } else if self.shooting > 0 {
                PlayerAction::StandShoot
            } else {
                PlayerAction::Idle
            };
            self.set_action(action);
            self.climb(tilemap, input);
        }

        self.update_dash(rng);

        let vx = &mut self.body.velocity.x;
        if *vx > 0.0 {
            *vx = (*vx - FRICTION).max(0.0);
        } else if *vx < 0.0 {
            *vx = (*vx + FRICTION).min(0.0);
        }

        self.shooting = self.shooting.saturating_sub(1);
    }

    /// A ladder in the column of the head cell overrides gravity.
    fn climb(&mut self, tilemap: &Tilemap, input: &PlayerInput) {
        let head = self.rect().midtop().as_vec2();
        let on_ladder = tilemap
            .tiles_around(head)
            .any(|(tile, off)| tile.kind == TileKind::Ladder && off.x == 0);
        if on_ladder {
            self.body.velocity.y = input.climb().unwrap_or(0.0);
            self.air_time = 0;
        }
    }

    fn update_dash<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let center = self.rect().center().as_vec2();

        if self.dashing.abs() == DASH_FRAMES || self.dashing.abs() == DASH_BURST_UNTIL {
            particle::burst(rng, center, DASH_BURST_PARTICLES, &mut self.particles);
        }

        self.dashing -= self.dashing.signum();

        if self.dashing.abs() > DASH_BURST_UNTIL {
            let sign = self.dashing.signum() as f32;
            self.body.velocity.x = sign * DASH_SPEED;
            if self.dashing.abs() == DASH_BURST_UNTIL + 1 {
                self.body.velocity.x *= 0.1;
            }
            let trail = Vec2::new(sign * rng.gen::<f32>() * 3.0, 0.0);
            self.particles.push(Particle::new(ParticleKind::Dust, center, trail, rng.gen_range(0..=7)));
        }
    }

    /// Ground jump, or wall jump away from the wall being pushed into.
    /// Returns whether a jump happened.
    pub fn jump(&mut self) -> bool {
        if self.dead {
            return false;
        }
        if self.wall_slide {
            let pushing = self.body.last_movement.x;
            let kick = if self.body.flip && pushing < 0.0 {
                WALL_JUMP_KICK
            } else if !self.body.flip && pushing > 0.0 {
                -WALL_JUMP_KICK
            } else {
                return false;
            };
            self.body.velocity = Vec2::new(kick, WALL_JUMP_VELOCITY);
            self.air_time = AIRBORNE_AFTER + 1;
            self.jumps = self.jumps.saturating_sub(1);
            return true;
        }
        if self.jumps > 0 {
            self.body.velocity.y = JUMP_VELOCITY;
            self.jumps -= 1;
            self.air_time = AIRBORNE_AFTER + 1;
            return true;
        }
        false
    }

    /// Start a dash in the facing direction unless one is running.
    pub fn dash(&mut self) -> bool {
        if self.dead || self.dashing != 0 {
            return false;
        }
        self.dashing = DASH_FRAMES * self.body.facing();
        true
    }

    /// Fire one projectile in the facing direction unless cooling down.
    pub fn shoot(&mut self, spawns: &mut Vec<Spawn>) -> bool {
        if self.dead || self.shooting > 0 {
            return false;
        }
        self.shooting = SHOT_COOLDOWN;
        let r = self.rect();
        let facing = self.body.facing();
        spawns.push(Spawn::Projectile(Projectile::new(
            Team::Player,
            Vec2::new((r.centerx() + MUZZLE_OFFSET * facing) as f32, (r.centery() + 2) as f32),
            PROJECTILE_SPEED * facing as f32,
        )));
        true
    }

    /// Returns true only for the call that actually killed the player.
    pub fn kill(&mut self, direction: i32) -> bool {
        let fresh = !self.dead;
        self.dead = true;
        self.dead_direction = direction;
        fresh
    }
}
