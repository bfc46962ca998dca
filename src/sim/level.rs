/// Level loading.
///
/// ## Sources:
///   `<maps_dir>/<index>.json`, one tilemap per level. The campaign ends at
///   the first index with no file.
///
/// ## Markers pulled out of the map on load:
///   spawner 0 → player start      spawner 1 → enemy
///   portal    → enemy portal      checkpoint → level exit
///   ammo      → pickup
///
/// Everything else stays in the tilemap.

use std::path::PathBuf;

use crate::config::GameConfig;
use crate::domain::ai::Enemy;
use crate::domain::animation;
use crate::domain::player::{Player, PLAYER_START};
use crate::domain::tile::{Tile, TileKind};
use crate::domain::tilemap::{Tilemap, DEFAULT_TILE_SIZE};
use super::save::{self, SaveError};
use super::world::World;

/// Where level maps and campaign progress live.
#[derive(Clone, Debug)]
pub struct LevelStore {
    pub maps_dir: PathBuf,
    pub progress_file: PathBuf,
}

impl LevelStore {
    pub fn new(maps_dir: PathBuf, progress_file: PathBuf) -> Self {
        LevelStore { maps_dir, progress_file }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        LevelStore::new(config.maps_dir.clone(), config.progress_file.clone())
    }

    pub fn map_path(&self, level: usize) -> PathBuf {
        self.maps_dir.join(format!("{level}.json"))
    }

    pub fn level_exists(&self, level: usize) -> bool {
        self.map_path(level).is_file()
    }

    pub fn progress(&self) -> Option<usize> {
        save::load_progress(&self.progress_file)
    }

    pub fn save_progress(&self, level: usize) -> Result<(), SaveError> {
        save::save_progress(&self.progress_file, level)
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load a level into the world. Preserves score and lives.
pub fn load_level(world: &mut World, level: usize) {
    let path = world.store.map_path(level);
    let mut tilemap = Tilemap::new(DEFAULT_TILE_SIZE);
    if let Err(e) = tilemap.load(&path) {
        log::warn!("level {} unreadable, starting empty: {e}", path.display());
        tilemap = Tilemap::new(DEFAULT_TILE_SIZE);
    }
    let ts = tilemap.tile_size;

    world.level = level;
    world.player = Player::new(PLAYER_START);
    world.enemies.clear();
    world.portals.clear();
    world.player_projectiles.clear();
    world.enemy_projectiles.clear();

    for spawner in tilemap.extract(&variants(TileKind::Spawner), false) {
        let pos = spawner.pos.as_vec2();
        if spawner.variant == 0 {
            world.player = Player::new(pos);
        } else {
            world.enemies.push(Enemy::new(pos));
        }
    }

    world.portals = tilemap
        .extract(&variants(TileKind::Portal), false)
        .into_iter()
        .map(|p| Tile::portal(p.pos, p.variant, ts))
        .collect();
    world.checkpoints = offgrid(tilemap.extract(&variants(TileKind::Checkpoint), false));
    world.ammo = offgrid(tilemap.extract(&variants(TileKind::Ammo), false));

    world.tilemap = tilemap;
    world.dead = false;
    world.dead_delay = world.timing.dead_delay;
    world.screenshake = 0;
    world.snap_camera();

    log::info!(
        "level {level} loaded: {} tiles, {} enemies, {} portals",
        world.tilemap.len(),
        world.enemies.len(),
        world.portals.len(),
    );
}

fn variants(kind: TileKind) -> Vec<(TileKind, usize)> {
    (0..animation::variant_count(kind)).map(|v| (kind, v)).collect()
}

/// Extracted copies carry pixel positions; mark them as such.
fn offgrid(tiles: Vec<Tile>) -> Vec<Tile> {
    tiles
        .into_iter()
        .map(|mut t| {
            t.offgrid = true;
            t
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geom::{IVec, Vec2};

    fn world_in(dir: &std::path::Path) -> World {
        let mut cfg = GameConfig::default();
        cfg.maps_dir = dir.join("maps");
        cfg.progress_file = dir.join("level.txt");
        World::new(&cfg)
    }

    #[test]
    fn markers_become_entities() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = Tilemap::new(16);
        map.add_tile(Tile::new(TileKind::Grass, IVec::new(0, 5), 0, 16, false));
        map.add_offgrid_tile(Tile::new(TileKind::Spawner, IVec::new(30, 40), 0, 16, true));
        map.add_offgrid_tile(Tile::new(TileKind::Spawner, IVec::new(90, 40), 1, 16, true));
        map.add_offgrid_tile(Tile::new(TileKind::Portal, IVec::new(150, 48), 0, 16, true));
        map.add_offgrid_tile(Tile::new(TileKind::Checkpoint, IVec::new(300, 48), 0, 16, true));
        map.add_tile(Tile::new(TileKind::Ammo, IVec::new(3, 4), 0, 16, false));
        let mut world = world_in(dir.path());
        map.save(&world.store.map_path(2)).unwrap();

        world.screenshake = 9;
        world.dead = true;
        load_level(&mut world, 2);

        assert_eq!(world.level, 2);
        assert_eq!(world.player.body.pos, Vec2::new(30.0, 40.0));
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.portals.len(), 1);
        assert!(!world.portals[0].is_destroyed());
        assert_eq!(world.checkpoints.len(), 1);
        assert_eq!(world.ammo.len(), 1);
        assert_eq!(world.ammo[0].pos, IVec::new(48, 64));
        assert!(world.ammo[0].offgrid);
        // Only the grass is left behind.
        assert_eq!(world.tilemap.len(), 1);
        assert!(world.tilemap.offgrid_tiles().is_empty());
        assert!(!world.dead);
        assert_eq!(world.screenshake, 0);
    }

    #[test]
    fn missing_level_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = world_in(dir.path());
        world.enemies.push(Enemy::new(Vec2::ZERO));
        load_level(&mut world, 7);
        assert!(world.tilemap.is_empty());
        assert!(world.enemies.is_empty());
        assert_eq!(world.player.body.pos, PLAYER_START);
    }

    #[test]
    fn corrupt_level_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = world_in(dir.path());
        std::fs::create_dir_all(&world.store.maps_dir).unwrap();
        std::fs::write(world.store.map_path(0), "{ not json").unwrap();
        load_level(&mut world, 0);
        assert!(world.tilemap.is_empty());
        assert_eq!(world.tilemap.tile_size, DEFAULT_TILE_SIZE);
    }

    #[test]
    fn store_paths_and_progress() {
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path().join("maps"), dir.path().join("level.txt"));
        assert_eq!(store.map_path(3), dir.path().join("maps").join("3.json"));
        assert!(!store.level_exists(0));
        assert_eq!(store.progress(), None);
        store.save_progress(1).unwrap();
        assert_eq!(store.progress(), Some(1));
    }
}
