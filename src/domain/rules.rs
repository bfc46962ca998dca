/// Combat and scoring rules.
///
/// Pure queries: these decide WHAT a projectile hit or whether a trap
/// fires. Applying the outcome (kills, score, shake, sounds) is the
/// step's job.
///
/// ## Player projectile (first match wins)
/// ┌──────────────────────────────┬────────────────┬────────┬───────┐
/// │ Condition                     │ Outcome        │ Shake  │ Score │
/// ├──────────────────────────────┼────────────────┼────────┼───────┤
/// │ probe ahead is a barrel       │ explode barrel │ 25     │       │
/// │ probe ahead is other solid    │ spent          │ 8      │       │
/// │ overlaps a live enemy         │ enemy dies     │ 16     │ +10*  │
/// │ overlaps an intact portal,    │ portal falls   │ 25     │ +50   │
/// │   last hit                    │                │        │       │
/// │ overlaps an intact portal     │ spent          │ 8      │       │
/// │ otherwise                     │ keeps flying   │        │       │
/// └──────────────────────────────┴────────────────┴────────┴───────┘
/// * awarded when the death animation finishes and the enemy is removed.
///
/// ## Enemy projectile
/// ┌──────────────────────────────┬────────────────┬────────┐
/// │ probe ahead is solid          │ spent          │        │
/// │ overlaps the player           │ player dies    │ 16     │
/// │ otherwise                     │ keeps flying   │        │
/// └──────────────────────────────┴────────────────┴────────┘
///
/// A portal hit that drains the last durability does not spend the
/// projectile; every other hit does.

use super::ai::Enemy;
use super::geom::{IVec, Rect, Vec2};
use super::player::Player;
use super::projectile::Projectile;
use super::tile::{Tile, TileKind};
use super::tilemap::Tilemap;

pub const SCORE_ENEMY: u32 = 10;
pub const SCORE_PORTAL: u32 = 50;
pub const SCORE_AMMO: u32 = 20;

pub const SHAKE_SHOT: u32 = 4;
pub const SHAKE_WALL: u32 = 8;
pub const SHAKE_PORTAL_HIT: u32 = 8;
pub const SHAKE_ENEMY_HIT: u32 = 16;
pub const SHAKE_PLAYER_HIT: u32 = 16;
pub const SHAKE_BARREL: u32 = 25;
pub const SHAKE_PORTAL_DOWN: u32 = 25;
pub const SHAKE_TRAP: u32 = 25;

/// Terrain probe distance ahead of a projectile's center.
pub const PLAYER_SHOT_REACH: i32 = 3;
pub const ENEMY_SHOT_REACH: i32 = 2;

pub const CAMERA_EASE: f32 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerShot {
    Miss,
    Barrel(IVec),
    Wall,
    Enemy(usize),
    /// Index into the portal list.
    Portal(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyShot {
    Miss,
    Wall,
    Player,
}

pub fn classify_player_shot(
    projectile: &Projectile,
    tilemap: &Tilemap,
    enemies: &[Enemy],
    portals: &[Tile],
) -> PlayerShot {
    if let Some(tile) = tilemap.solid_check(projectile.probe(PLAYER_SHOT_REACH)) {
        return if tile.kind == TileKind::Barrel {
            PlayerShot::Barrel(tile.pos)
        } else {
            PlayerShot::Wall
        };
    }
    let rect = projectile.rect();
    if let Some(i) = enemies.iter().position(|e| !e.dead && rect.collides(&e.rect())) {
        return PlayerShot::Enemy(i);
    }
    if let Some(i) = portals.iter().position(|p| !p.is_destroyed() && rect.collides(&p.rect())) {
        return PlayerShot::Portal(i);
    }
    PlayerShot::Miss
}

pub fn classify_enemy_shot(projectile: &Projectile, tilemap: &Tilemap, player: &Player) -> EnemyShot {
    if tilemap.solid_check(projectile.probe(ENEMY_SHOT_REACH)).is_some() {
        EnemyShot::Wall
    } else if player.rect().collides(&projectile.rect()) {
        EnemyShot::Player
    } else {
        EnemyShot::Miss
    }
}

/// The player's feet: a half-tile strip centered under the body.
pub fn foot_rect(player: &Rect, tile_size: i32) -> Rect {
    Rect::new(
        player.centerx() - tile_size / 2,
        player.bottom() - tile_size / 2,
        tile_size,
        tile_size / 2,
    )
}

/// Does a trap cell catch the player's feet?
pub fn trap_triggered(player: &Rect, trap_cell: IVec, tile_size: i32) -> bool {
    let trap = Rect::new(trap_cell.x * tile_size, trap_cell.y * tile_size, tile_size, tile_size);
    foot_rect(player, tile_size).collides(&trap)
}

/// Screenshake only ever grows to the strongest recent event.
pub fn shake(current: u32, amount: u32) -> u32 {
    current.max(amount)
}

/// Ease the camera so the target sits a third in from the left and two
/// thirds down the view.
pub fn follow(scroll: Vec2, target: IVec, view: (i32, i32)) -> Vec2 {
    let goal_x = target.x as f32 - view.0 as f32 / 3.0;
    let goal_y = target.y as f32 - view.1 as f32 * 2.0 / 3.0;
    Vec2::new(
        scroll.x + (goal_x - scroll.x) / CAMERA_EASE,
        scroll.y + (goal_y - scroll.y) / CAMERA_EASE,
    )
}
