/// The step function: advances the world by one frame.
///
/// Menu phases only move the cursor and act on confirm. A play frame runs:
///   1. Screenshake decay and camera follow
///   2. Death delay (take a life once the delay runs out)
///   3. Player intents (jump, dash, shoot)
///   4. Tilemap effects (trees)
///   5. Barrel blasts
///   6. Projectile flight
///   7. Portals (may spawn enemies)
///   8. Enemies (may fire; finished corpses are scored and dropped)
///   9. Player
///  10. Cross-checks: enemy shots, player shots, traps, ammo, checkpoints
///
/// The fade advances after every frame in every phase; a queued phase
/// switch is applied at its midpoint. Menu input is ignored while a fade
/// is running.

use rand::Rng;

use crate::domain::ai::Enemy;
use crate::domain::entity::{FrameInput, Spawn};
use crate::domain::hazard;
use crate::domain::projectile::Projectile;
use crate::domain::rules::{self, EnemyShot, PlayerShot};
use crate::domain::tile::TileKind;
use crate::domain::tilemap::TilemapError;
use super::event::GameEvent;
use super::level;
use super::menu::MenuItem;
use super::world::{Phase, Switch, World, START_LIVES, VIEW_H, VIEW_W};

/// What one frame produced.
#[derive(Clone, Debug, Default)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
    /// An EXIT entry was chosen.
    pub quit: bool,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: Rng + ?Sized>(world: &mut World, input: &FrameInput, rng: &mut R) -> StepOutcome {
    let mut out = StepOutcome::default();

    match world.phase {
        Phase::Play => {
            if input.pause && !world.transition.is_active() && !world.dead {
                world.set_phase(Phase::Pause);
                log::info!("paused");
            } else {
                play_frame(world, input, rng, &mut out.events);
            }
        }
        Phase::Pause if input.pause && !world.transition.is_active() => {
            world.set_phase(Phase::Play);
            log::info!("resumed");
        }
        _ => menu_frame(world, input, &mut out),
    }

    world.transition.update();
    if world.transition.is_midpoint() {
        if let Some(switch) = world.pending.take() {
            apply_switch(world, switch, &mut out.events);
        }
    }

    out
}

// ══════════════════════════════════════════════════════════════
// Menus
// ══════════════════════════════════════════════════════════════

fn menu_frame(world: &mut World, input: &FrameInput, out: &mut StepOutcome) {
    if world.transition.is_active() {
        return;
    }
    if input.menu_up {
        world.menu.up();
        out.events.push(GameEvent::MenuMoved);
    }
    if input.menu_down {
        world.menu.down();
        out.events.push(GameEvent::MenuMoved);
    }
    // A direct pick outside the menu is ignored.
    let picked = input.menu_pick.is_some_and(|i| world.menu.select(i));
    if !input.confirm && !picked {
        return;
    }
    let Some(item) = world.menu.current() else {
        return;
    };
    out.events.push(GameEvent::MenuSelected);

    match item {
        MenuItem::Continue => {
            let level = world.store.progress().unwrap_or(0);
            world.begin(Switch::Play { level, fresh: true });
        }
        MenuItem::NewGame => {
            if let Err(e) = world.store.save_progress(0) {
                log::warn!("{e}");
            }
            world.begin(Switch::Play { level: 0, fresh: true });
        }
        MenuItem::Resume => world.set_phase(Phase::Play),
        MenuItem::Restart => {
            let level = world.level;
            world.begin(Switch::Play { level, fresh: true });
        }
        MenuItem::Back => {
            world.begin(Switch::Show(Phase::Start));
        }
        MenuItem::Exit => out.quit = true,
    }
}

fn apply_switch(world: &mut World, switch: Switch, events: &mut Vec<GameEvent>) {
    match switch {
        Switch::Play { level, fresh } => {
            if fresh {
                world.lives = START_LIVES;
                world.score = 0;
            }
            level::load_level(world, level);
            world.set_phase(Phase::Play);
            events.push(GameEvent::LevelLoaded { level });
        }
        Switch::Show(phase) => {
            log::info!("showing {:?}", phase);
            world.set_phase(phase);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Play frame
// ══════════════════════════════════════════════════════════════

fn play_frame<R: Rng + ?Sized>(world: &mut World, input: &FrameInput, rng: &mut R, events: &mut Vec<GameEvent>) {
    world.tick += 1;
    world.screenshake = world.screenshake.saturating_sub(1);
    world.scroll = rules::follow(world.scroll, world.player.rect().center(), (VIEW_W, VIEW_H));

    resolve_death_delay(world, events);
    resolve_intents(world, input, events);
    world.tilemap.update(rng);
    resolve_barrels(world, events);
    advance_projectiles(&mut world.player_projectiles);
    advance_projectiles(&mut world.enemy_projectiles);
    resolve_portals(world, rng, events);
    resolve_enemies(world, rng, events);
    world.player.update(&world.tilemap, &input.player, rng);

    resolve_enemy_shots(world, rng);
    resolve_player_shots(world, rng, events);
    resolve_traps(world);
    resolve_ammo(world, events);
    resolve_checkpoints(world, events);

    if world.player.dead && !world.dead {
        world.dead = true;
        events.push(GameEvent::PlayerKilled);
        log::debug!("player killed at {:?}", world.player.body.pos);
    }
}

fn bump_shake(world: &mut World, amount: u32) {
    world.screenshake = rules::shake(world.screenshake, amount);
}

// ══════════════════════════════════════════════════════════════
// Death
// ══════════════════════════════════════════════════════════════

fn resolve_death_delay(world: &mut World, events: &mut Vec<GameEvent>) {
    if !world.dead {
        return;
    }
    world.dead_delay = world.dead_delay.saturating_sub(1);
    if world.dead_delay > 0 || world.pending.is_some() {
        return;
    }
    let remaining = world.lives.saturating_sub(1);
    let switch = if remaining > 0 {
        Switch::Play { level: world.level, fresh: false }
    } else {
        Switch::Show(Phase::GameOver)
    };
    if world.begin(switch) {
        world.lives = remaining;
        events.push(GameEvent::LifeLost { lives: remaining });
        if remaining == 0 {
            events.push(GameEvent::GameOver);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Intents
// ══════════════════════════════════════════════════════════════

fn resolve_intents(world: &mut World, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if input.jump && world.player.jump() {
        events.push(GameEvent::Jumped);
    }
    if input.dash && world.player.dash() {
        events.push(GameEvent::Dashed);
    }
    if input.shoot {
        let mut spawns = Vec::new();
        if world.player.shoot(&mut spawns) {
            bump_shake(world, rules::SHAKE_SHOT);
            events.push(GameEvent::Shot);
            collect_projectiles(spawns, &mut world.player_projectiles);
        }
    }
}

fn collect_projectiles(spawns: Vec<Spawn>, into: &mut Vec<Projectile>) {
    for spawn in spawns {
        if let Spawn::Projectile(p) = spawn {
            into.push(p);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Hazards and entities
// ══════════════════════════════════════════════════════════════

fn resolve_barrels(world: &mut World, events: &mut Vec<GameEvent>) {
    for cell in world.tilemap.cells_of(TileKind::Barrel) {
        match hazard::update_barrel(&mut world.tilemap, cell, &mut world.player, &mut world.enemies) {
            Ok(report) => {
                if report.player_killed {
                    bump_shake(world, rules::SHAKE_BARREL);
                }
                for _ in 0..report.chained {
                    events.push(GameEvent::BarrelExploded);
                }
                if report.chained > 0 {
                    bump_shake(world, rules::SHAKE_BARREL);
                }
                for _ in 0..report.enemies_killed {
                    events.push(GameEvent::EnemyKilled);
                }
                if report.finished {
                    log::debug!("barrel at {:?} burnt out", cell);
                }
            }
            // Already gone this frame.
            Err(TilemapError::NoTile(_)) => {}
            Err(e) => log::warn!("barrel update failed: {e}"),
        }
    }
}

fn advance_projectiles(projectiles: &mut Vec<Projectile>) {
    projectiles.retain_mut(|p| !p.update());
}

fn resolve_portals<R: Rng + ?Sized>(world: &mut World, rng: &mut R, events: &mut Vec<GameEvent>) {
    let mut spawns = Vec::new();
    for portal in &mut world.portals {
        portal.update_portal(&world.player, rng, &mut spawns);
    }
    for spawn in spawns {
        if let Spawn::Enemy(pos) = spawn {
            log::debug!("portal spawned enemy at {:?}", pos);
            world.enemies.push(Enemy::new(pos));
            events.push(GameEvent::EnemySpawned);
        }
    }
}

fn resolve_enemies<R: Rng + ?Sized>(world: &mut World, rng: &mut R, events: &mut Vec<GameEvent>) {
    let mut spawns = Vec::new();
    let mut removed = 0u32;
    let tilemap = &world.tilemap;
    let player = &world.player;
    world.enemies.retain_mut(|enemy| {
        let finished = enemy.update(tilemap, player, rng, &mut spawns);
        if finished {
            removed += 1;
        }
        !finished
    });
    world.score += removed * rules::SCORE_ENEMY;
    for _ in 0..removed {
        events.push(GameEvent::EnemyRemoved);
    }
    collect_projectiles(spawns, &mut world.enemy_projectiles);
}

// ══════════════════════════════════════════════════════════════
// Cross-checks
// ══════════════════════════════════════════════════════════════

fn resolve_enemy_shots<R: Rng + ?Sized>(world: &mut World, rng: &mut R) {
    for p in world.enemy_projectiles.iter_mut().filter(|p| !p.is_removed()) {
        match rules::classify_enemy_shot(p, &world.tilemap, &world.player) {
            EnemyShot::Miss => {}
            EnemyShot::Wall => p.remove(rng),
            EnemyShot::Player => {
                p.remove(rng);
                world.player.kill(p.heading());
                world.screenshake = rules::shake(world.screenshake, rules::SHAKE_PLAYER_HIT);
            }
        }
    }
}

fn resolve_player_shots<R: Rng + ?Sized>(world: &mut World, rng: &mut R, events: &mut Vec<GameEvent>) {
    let mut shake = world.screenshake;
    for p in world.player_projectiles.iter_mut().filter(|p| !p.is_removed()) {
        match rules::classify_player_shot(p, &world.tilemap, &world.enemies, &world.portals) {
            PlayerShot::Miss => {}
            PlayerShot::Barrel(cell) => {
                p.remove(rng);
                shake = rules::shake(shake, rules::SHAKE_BARREL);
                if let Ok(barrel) = world.tilemap.tile_at_mut(cell) {
                    if barrel.explode() {
                        events.push(GameEvent::BarrelExploded);
                    }
                }
            }
            PlayerShot::Wall => {
                p.remove(rng);
                shake = rules::shake(shake, rules::SHAKE_WALL);
                events.push(GameEvent::WallHit);
            }
            PlayerShot::Enemy(i) => {
                p.remove(rng);
                world.enemies[i].dead = true;
                shake = rules::shake(shake, rules::SHAKE_ENEMY_HIT);
                events.push(GameEvent::EnemyKilled);
            }
            PlayerShot::Portal(i) => {
                if world.portals[i].destroy() {
                    shake = rules::shake(shake, rules::SHAKE_PORTAL_DOWN);
                    world.score += rules::SCORE_PORTAL;
                    events.push(GameEvent::PortalDestroyed);
                    log::debug!("portal {i} destroyed");
                } else {
                    p.remove(rng);
                    shake = rules::shake(shake, rules::SHAKE_PORTAL_HIT);
                    events.push(GameEvent::PortalHit);
                }
            }
        }
    }
    world.screenshake = shake;
}

fn resolve_traps(world: &mut World) {
    if world.player.dead {
        return;
    }
    let body = world.player.rect();
    let ts = world.tilemap.tile_size;
    let caught = world.tilemap
        .cells_of(TileKind::Trap)
        .into_iter()
        .any(|cell| rules::trap_triggered(&body, cell, ts));
    if caught {
        world.player.kill(0);
        bump_shake(world, rules::SHAKE_TRAP);
    }
}

fn resolve_ammo(world: &mut World, events: &mut Vec<GameEvent>) {
    if world.player.dead {
        return;
    }
    let body = world.player.rect();
    let before = world.ammo.len();
    world.ammo.retain(|a| !a.rect().collides(&body));
    for _ in world.ammo.len()..before {
        world.score += rules::SCORE_AMMO;
        events.push(GameEvent::AmmoPicked);
    }
}

fn resolve_checkpoints(world: &mut World, events: &mut Vec<GameEvent>) {
    if world.player.dead || world.pending.is_some() {
        return;
    }
    let body = world.player.rect();
    if !world.checkpoints.iter().any(|c| c.rect().collides(&body)) {
        return;
    }

    let next = world.level + 1;
    if world.store.level_exists(next) {
        if world.begin(Switch::Play { level: next, fresh: false }) {
            if let Err(e) = world.store.save_progress(next) {
                log::warn!("{e}");
            }
            events.push(GameEvent::CheckpointReached { level: next });
        }
    } else if world.begin(Switch::Show(Phase::MissionComplete)) {
        // The campaign is over; the next start begins from the top.
        if let Err(e) = world.store.save_progress(0) {
            log::warn!("{e}");
        }
        log::info!("mission complete after level {}", world.level);
        events.push(GameEvent::MissionComplete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::animation::Team;
    use crate::domain::geom::{IVec, Vec2};
    use crate::domain::player::Player;
    use crate::domain::tile::{Special, Tile};
    use crate::domain::tilemap::Tilemap;
    use rand::rngs::mock::StepRng;
    use std::fs;
    use std::path::Path;

    /// Draws near 1.0: enemies never start walking, portals never spawn.
    fn calm() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn config_in(dir: &Path) -> GameConfig {
        let mut cfg = GameConfig::default();
        cfg.maps_dir = dir.join("maps");
        cfg.progress_file = dir.join("level.txt");
        cfg
    }

    fn floor() -> Tilemap {
        let mut m = Tilemap::new(16);
        for x in 0..20 {
            m.add_tile(Tile::new(TileKind::Grass, IVec::new(x, 5), 0, 16, false));
        }
        m
    }

    /// A world already in play, player resting on the floor at x = 20.
    fn playing(dir: &Path) -> World {
        let mut w = World::new(&config_in(dir));
        w.phase = Phase::Play;
        w.tilemap = floor();
        w.player = Player::new(Vec2::new(20.0, 63.0));
        w
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn run_until(world: &mut World, mut done: impl FnMut(&World) -> bool) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..200 {
            if done(world) {
                return events;
            }
            events.extend(step(world, &idle(), &mut calm()).events);
        }
        panic!("condition never reached");
    }

    // ── Menus ──

    #[test]
    fn start_menu_navigation_and_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = World::new(&config_in(dir.path()));
        let out = step(&mut w, &FrameInput { menu_up: true, ..idle() }, &mut calm());
        assert_eq!(out.events, vec![GameEvent::MenuMoved]);
        assert_eq!(w.menu.current(), Some(MenuItem::Exit));
        let out = step(&mut w, &FrameInput { confirm: true, ..idle() }, &mut calm());
        assert!(out.quit);
    }

    #[test]
    fn digit_pick_selects_and_confirms() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = World::new(&config_in(dir.path()));
        let out = step(&mut w, &FrameInput { menu_pick: Some(7), ..idle() }, &mut calm());
        assert!(out.events.is_empty());
        assert_eq!(w.menu.selected(), 0);

        let out = step(&mut w, &FrameInput { menu_pick: Some(2), ..idle() }, &mut calm());
        assert_eq!(out.events, vec![GameEvent::MenuSelected]);
        assert!(out.quit);
    }

    #[test]
    fn new_game_fades_into_level_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = World::new(&config_in(dir.path()));
        w.lives = 1;
        w.score = 99;
        w.menu.select(1);
        step(&mut w, &FrameInput { confirm: true, ..idle() }, &mut calm());
        assert!(w.transition.is_active());
        assert_eq!(fs::read_to_string(dir.path().join("level.txt")).unwrap(), "0");

        // Cursor is frozen during the fade.
        step(&mut w, &FrameInput { menu_down: true, ..idle() }, &mut calm());
        assert_eq!(w.menu.selected(), 1);

        let events = run_until(&mut w, |w| w.phase == Phase::Play);
        assert!(events.contains(&GameEvent::LevelLoaded { level: 0 }));
        assert_eq!(w.lives, START_LIVES);
        assert_eq!(w.score, 0);
    }

    #[test]
    fn continue_resumes_saved_level() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("level.txt"), "2").unwrap();
        let mut w = World::new(&config_in(dir.path()));
        step(&mut w, &FrameInput { confirm: true, ..idle() }, &mut calm());
        run_until(&mut w, |w| w.phase == Phase::Play);
        assert_eq!(w.level, 2);
    }

    #[test]
    fn pause_toggles_without_fade() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        step(&mut w, &FrameInput { pause: true, ..idle() }, &mut calm());
        assert_eq!(w.phase, Phase::Pause);
        assert_eq!(w.menu.current(), Some(MenuItem::Resume));
        let tick = w.tick;
        step(&mut w, &idle(), &mut calm());
        assert_eq!(w.tick, tick);
        step(&mut w, &FrameInput { pause: true, ..idle() }, &mut calm());
        assert_eq!(w.phase, Phase::Play);

        step(&mut w, &FrameInput { pause: true, ..idle() }, &mut calm());
        step(&mut w, &FrameInput { confirm: true, ..idle() }, &mut calm());
        assert_eq!(w.phase, Phase::Play);
        assert!(!w.transition.is_active());
    }

    // ── Combat ──

    #[test]
    fn shot_enemy_scores_on_removal() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        w.enemies.push(Enemy::new(Vec2::new(40.0, 63.0)));

        let out = step(&mut w, &FrameInput { shoot: true, ..idle() }, &mut calm());
        assert!(out.events.contains(&GameEvent::Shot));
        assert!(out.events.contains(&GameEvent::EnemyKilled));
        assert!(w.enemies[0].dead);
        assert_eq!(w.screenshake, rules::SHAKE_ENEMY_HIT);
        assert_eq!(w.score, 0);

        let events = run_until(&mut w, |w| w.enemies.is_empty());
        assert!(events.contains(&GameEvent::EnemyRemoved));
        assert_eq!(w.score, rules::SCORE_ENEMY);
    }

    #[test]
    fn last_portal_hit_scores_and_shot_flies_on() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        let mut portal = Tile::portal(IVec::new(40, 56), 0, 16);
        if let Special::Portal(p) = &mut portal.special {
            p.durability = 1;
        }
        w.portals.push(portal);

        let out = step(&mut w, &FrameInput { shoot: true, ..idle() }, &mut calm());
        assert!(out.events.contains(&GameEvent::PortalDestroyed));
        assert_eq!(w.score, rules::SCORE_PORTAL);
        assert!(w.portals[0].is_destroyed());
        assert_eq!(w.player_projectiles.len(), 1);
        assert!(!w.player_projectiles[0].is_removed());
    }

    #[test]
    fn intact_portal_absorbs_shot() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        w.portals.push(Tile::portal(IVec::new(40, 56), 0, 16));
        let out = step(&mut w, &FrameInput { shoot: true, ..idle() }, &mut calm());
        assert!(out.events.contains(&GameEvent::PortalHit));
        assert!(w.player_projectiles[0].is_removed());
        assert_eq!(w.score, 0);
    }

    #[test]
    fn shot_barrel_explodes() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        w.tilemap.add_tile(Tile::barrel(IVec::new(2, 4), 16));
        let out = step(&mut w, &FrameInput { shoot: true, ..idle() }, &mut calm());
        assert!(out.events.contains(&GameEvent::BarrelExploded));
        assert!(w.tilemap.tile_at(IVec::new(2, 4)).unwrap().is_exploded());
        assert_eq!(w.screenshake, rules::SHAKE_BARREL);

        // Next frame the blast catches the player standing next to it.
        let out = step(&mut w, &idle(), &mut calm());
        assert!(out.events.contains(&GameEvent::PlayerKilled));
    }

    #[test]
    fn enemy_shot_kills_player() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        w.enemy_projectiles.push(Projectile::new(Team::Enemy, Vec2::new(34.0, 72.0), -3.0));
        let out = step(&mut w, &idle(), &mut calm());
        assert!(out.events.contains(&GameEvent::PlayerKilled));
        assert!(w.dead);
        assert_eq!(w.player.dead_direction, -1);
        assert_eq!(w.screenshake, rules::SHAKE_PLAYER_HIT);
    }

    #[test]
    fn trap_under_feet_kills() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        w.tilemap.add_tile(Tile::new(TileKind::Trap, IVec::new(1, 4), 0, 16, false));
        let out = step(&mut w, &idle(), &mut calm());
        assert!(out.events.contains(&GameEvent::PlayerKilled));
        assert_eq!(w.screenshake, rules::SHAKE_TRAP);
    }

    #[test]
    fn ammo_pickup_scores() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        w.ammo.push(Tile::new(TileKind::Ammo, IVec::new(24, 70), 0, 16, true));
        w.ammo.push(Tile::new(TileKind::Ammo, IVec::new(200, 70), 0, 16, true));
        let out = step(&mut w, &idle(), &mut calm());
        assert_eq!(out.events, vec![GameEvent::AmmoPicked]);
        assert_eq!(w.score, rules::SCORE_AMMO);
        assert_eq!(w.ammo.len(), 1);
    }

    // ── Lives and progression ──

    #[test]
    fn death_costs_one_life_then_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        w.score = 40;
        w.dead_delay = 3;
        w.player.kill(1);

        let events = run_until(&mut w, |w| w.pending.is_some());
        assert!(events.contains(&GameEvent::PlayerKilled));
        assert!(events.contains(&GameEvent::LifeLost { lives: 2 }));
        assert_eq!(w.lives, 2);

        let events = run_until(&mut w, |w| !w.dead);
        assert!(events.contains(&GameEvent::LevelLoaded { level: 0 }));
        assert_eq!(w.lives, 2);
        assert_eq!(w.score, 40);
        assert_eq!(w.phase, Phase::Play);
    }

    #[test]
    fn last_life_ends_in_game_over() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        w.lives = 1;
        w.dead_delay = 0;
        w.player.kill(0);
        let events = run_until(&mut w, |w| w.phase == Phase::GameOver);
        assert!(events.contains(&GameEvent::GameOver));
        assert_eq!(events.iter().filter(|e| matches!(e, GameEvent::LifeLost { .. })).count(), 1);
        assert_eq!(w.lives, 0);
        assert_eq!(w.menu.current(), Some(MenuItem::Restart));
    }

    #[test]
    fn checkpoint_advances_when_next_map_exists() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        Tilemap::new(16).save(&w.store.map_path(1)).unwrap();
        w.checkpoints.push(Tile::new(TileKind::Checkpoint, IVec::new(24, 60), 0, 16, true));

        let out = step(&mut w, &idle(), &mut calm());
        assert!(out.events.contains(&GameEvent::CheckpointReached { level: 1 }));
        assert_eq!(fs::read_to_string(dir.path().join("level.txt")).unwrap(), "1");

        // Still touching it: no second trigger.
        let out = step(&mut w, &idle(), &mut calm());
        assert!(!out.events.contains(&GameEvent::CheckpointReached { level: 1 }));

        run_until(&mut w, |w| w.level == 1);
        assert!(w.checkpoints.is_empty());
    }

    #[test]
    fn checkpoint_without_next_map_completes_mission() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = playing(dir.path());
        w.checkpoints.push(Tile::new(TileKind::Checkpoint, IVec::new(24, 60), 0, 16, true));
        let out = step(&mut w, &idle(), &mut calm());
        assert!(out.events.contains(&GameEvent::MissionComplete));
        run_until(&mut w, |w| w.phase == Phase::MissionComplete);
        assert_eq!(w.menu.current(), Some(MenuItem::Back));
        assert_eq!(fs::read_to_string(dir.path().join("level.txt")).unwrap(), "0");
    }
}
