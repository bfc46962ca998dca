/// Enemy behaviour.
///
/// ## Patrol loop
///
/// An idle enemy rolls each frame for a walk burst. While walking it probes
/// the ground one step ahead at foot level: solid ground means keep going
/// (turning around on wall contact), a drop means turn around instead of
/// stepping off the ledge.
///
/// ## Shooting
///
/// The frame a walk burst ends, an enemy facing the player within a
/// 16 px vertical band fires once and holds the shoot pose for 20 frames.
///
/// ## Death
///
/// Dead enemies stop thinking but still fall under gravity. `update`
/// reports removal once the death animation has played out.

use rand::Rng;

use super::animation::{self, AnimKey, Animation, EnemyAction, Team};
use super::entity::Spawn;
use super::geom::{Rect, Vec2};
use super::physics::PhysicsBody;
use super::player::Player;
use super::projectile::{Projectile, PROJECTILE_SPEED};
use super::tilemap::Tilemap;

pub const ENEMY_SIZE: (i32, i32) = (12, 18);

const WALK_CHANCE: f32 = 0.05;
const WALK_MIN: u32 = 30;
const WALK_MAX: u32 = 120;
const WALK_SPEED: f32 = 0.5;
const LEDGE_PROBE_X: i32 = 7;
const LEDGE_PROBE_Y: f32 = 20.0;
const SIGHT_BAND: f32 = 16.0;
const SHOOT_POSE: u32 = 20;
const MUZZLE_OFFSET: i32 = 10;

#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: PhysicsBody,
    pub action: EnemyAction,
    pub animation: Animation,
    /// Frames left in the current walk burst.
    pub walking: u32,
    pub shooting: u32,
    pub dead: bool,
}

impl Enemy {
    pub fn new(pos: Vec2) -> Self {
        Enemy {
            body: PhysicsBody::new(pos, ENEMY_SIZE),
            action: EnemyAction::Idle,
            animation: animation::animation(AnimKey::Enemy(EnemyAction::Idle)),
            walking: 0,
            shooting: 0,
            dead: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn set_action(&mut self, action: EnemyAction) {
        if self.action != action {
            self.action = action;
            self.animation = animation::animation(AnimKey::Enemy(action));
        }
    }

    /// Returns true once a dead enemy is ready to be removed.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        tilemap: &Tilemap,
        player: &Player,
        rng: &mut R,
        spawns: &mut Vec<Spawn>,
    ) -> bool {
        if self.dead {
            self.set_action(EnemyAction::Dead);
            self.body.update(tilemap, Vec2::ZERO);
            self.animation.update();
            return self.animation.done;
        }

        let mut movement = Vec2::ZERO;
        if self.walking > 0 {
            let r = self.rect();
            let probe = Vec2::new(
                (r.centerx() + LEDGE_PROBE_X * self.body.facing()) as f32,
                self.body.pos.y + LEDGE_PROBE_Y,
            );
            if tilemap.solid_check(probe).is_some() {
                if self.body.collisions.horizontal() {
                    self.body.flip = !self.body.flip;
                }
                movement.x = WALK_SPEED * self.body.facing() as f32;
            } else {
                self.body.flip = !self.body.flip;
            }

            self.walking -= 1;
            if self.walking == 0 && !player.dead {
                self.take_aim(player, spawns);
            }
        } else if rng.gen::<f32>() < WALK_CHANCE {
            self.walking = rng.gen_range(WALK_MIN..=WALK_MAX);
        }

        self.shooting = self.shooting.saturating_sub(1);

        let action = if self.shooting > 0 {
            EnemyAction::Shoot
        } else if movement.x != 0.0 {
            EnemyAction::Run
        } else {
            EnemyAction::Idle
        };
        self.set_action(action);

        self.body.update(tilemap, movement);
        self.animation.update();
        false
    }

    fn take_aim(&mut self, player: &Player, spawns: &mut Vec<Spawn>) {
        let dx = player.body.pos.x - self.body.pos.x;
        let dy = player.body.pos.y - self.body.pos.y;
        if dy.abs() >= SIGHT_BAND {
            return;
        }
        let facing_player = (self.body.flip && dx < 0.0) || (!self.body.flip && dx > 0.0);
        if !facing_player {
            return;
        }
        let r = self.rect();
        let facing = self.body.facing();
        spawns.push(Spawn::Projectile(Projectile::new(
            Team::Enemy,
            Vec2::new((r.centerx() + MUZZLE_OFFSET * facing) as f32, (r.centery() + 2) as f32),
            PROJECTILE_SPEED * facing as f32,
        )));
        self.shooting = SHOOT_POSE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geom::IVec;
    use crate::domain::tile::{Tile, TileKind};
    use rand::rngs::mock::StepRng;

    fn floor(from: i32, to: i32) -> Tilemap {
        let mut m = Tilemap::new(16);
        for x in from..to {
            m.add_tile(Tile::new(TileKind::Grass, IVec::new(x, 5), 0, 16, false));
        }
        m
    }

    /// Never rolls a walk: every draw is near 1.0.
    fn lazy() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn zero_roll_starts_walking() {
        let map = floor(0, 10);
        let player = Player::new(Vec2::new(200.0, 0.0));
        let mut e = Enemy::new(Vec2::new(40.0, 63.0));
        let mut spawns = vec![];
        e.update(&map, &player, &mut StepRng::new(0, 0), &mut spawns);
        assert!((WALK_MIN..=WALK_MAX).contains(&e.walking), "walking = {}", e.walking);
        assert!(spawns.is_empty());
    }

    #[test]
    fn idle_without_roll() {
        let map = floor(0, 10);
        let player = Player::new(Vec2::new(200.0, 0.0));
        let mut e = Enemy::new(Vec2::new(40.0, 63.0));
        e.update(&map, &player, &mut lazy(), &mut vec![]);
        assert_eq!(e.walking, 0);
        assert_eq!(e.action, EnemyAction::Idle);
    }

    #[test]
    fn walks_forward_on_solid_ground() {
        let map = floor(0, 10);
        let player = Player::new(Vec2::new(0.0, -200.0));
        let mut e = Enemy::new(Vec2::new(40.0, 63.0));
        e.walking = 10;
        e.update(&map, &player, &mut lazy(), &mut vec![]);
        assert_eq!(e.body.pos.x, 40.5);
        assert_eq!(e.action, EnemyAction::Run);
        assert_eq!(e.walking, 9);
    }

    #[test]
    fn turns_at_ledge() {
        // Floor ends at x = 48; the probe at centerx + 7 = 53 finds nothing.
        let map = floor(0, 3);
        let player = Player::new(Vec2::new(0.0, -200.0));
        let mut e = Enemy::new(Vec2::new(40.0, 63.0));
        e.walking = 10;
        e.update(&map, &player, &mut lazy(), &mut vec![]);
        assert!(e.body.flip);
        assert_eq!(e.body.pos.x, 40.0);
    }

    #[test]
    fn fires_when_walk_ends_facing_player() {
        let map = floor(0, 10);
        let player = Player::new(Vec2::new(120.0, 60.0));
        let mut e = Enemy::new(Vec2::new(40.0, 63.0));
        e.walking = 1;
        let mut spawns = vec![];
        e.update(&map, &player, &mut lazy(), &mut spawns);
        assert_eq!(spawns.len(), 1);
        match &spawns[0] {
            Spawn::Projectile(p) => {
                assert_eq!(p.team, Team::Enemy);
                assert_eq!(p.direction, 3.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(e.shooting, SHOOT_POSE - 1);
        assert_eq!(e.action, EnemyAction::Shoot);
    }

    #[test]
    fn holds_fire_when_player_behind_or_dead() {
        let map = floor(0, 10);
        let mut player = Player::new(Vec2::new(0.0, 60.0));
        let mut e = Enemy::new(Vec2::new(40.0, 63.0));
        e.walking = 1;
        let mut spawns = vec![];
        e.update(&map, &player, &mut lazy(), &mut spawns);
        assert!(spawns.is_empty());

        player.body.pos.x = 120.0;
        player.dead = true;
        e.body.flip = false;
        e.walking = 1;
        e.update(&map, &player, &mut lazy(), &mut spawns);
        assert!(spawns.is_empty());
    }

    #[test]
    fn dead_enemy_reports_removal_after_animation() {
        let map = floor(0, 10);
        let player = Player::new(Vec2::ZERO);
        let mut e = Enemy::new(Vec2::new(40.0, 63.0));
        e.dead = true;
        let mut frames = 1;
        while !e.update(&map, &player, &mut lazy(), &mut vec![]) {
            frames += 1;
            assert!(frames < 100);
        }
        assert_eq!(e.action, EnemyAction::Dead);
        assert_eq!(frames, 8 * 2 - 1);
    }

    #[test]
    fn dead_enemy_falls_without_walking() {
        let map = Tilemap::new(16);
        let player = Player::new(Vec2::new(200.0, 0.0));
        let mut e = Enemy::new(Vec2::new(40.0, 10.0));
        e.dead = true;
        e.walking = 50;
        for _ in 0..4 {
            e.update(&map, &player, &mut StepRng::new(0, 0), &mut vec![]);
        }
        assert!(e.body.pos.y > 10.0, "y = {}", e.body.pos.y);
        assert_eq!(e.body.pos.x, 40.0);
        assert_eq!(e.walking, 50);
    }
}
