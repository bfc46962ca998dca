/// Stateful tiles: exploding barrels, enemy portals, leaf-shedding trees.
///
/// Each carries its runtime state as a `Special` payload on an ordinary
/// `Tile`, so the map stores them like any other tile and the level file
/// only records the marker.
///
/// ## Barrel blast
///
/// Once exploded, a barrel keeps acting for as long as its smoke plays:
/// every frame it sets off neighboring barrels and clears every other tile
/// in its 3×3 block. The kill zone (5×5 tiles centered on the barrel) is
/// applied on the first such frame only. When the smoke ends the barrel
/// tile itself is removed.

use rand::Rng;

use super::ai::Enemy;
use super::entity::Spawn;
use super::geom::{IVec, Rect, Vec2};
use super::particle::{Particle, ParticleKind};
use super::player::Player;
use super::tile::{Special, Tile, TileKind};
use super::tilemap::{Tilemap, TilemapError};

pub const PORTAL_DURABILITY: u32 = 300;
const PORTAL_SPAWN_CHANCE: f32 = 0.003;
const PORTAL_RANGE_TILES: i32 = 10;
const BLAST_RADIUS_TILES: i32 = 2;
const LEAF_RARITY: f32 = 49999.0;
const LEAF_DRIFT: Vec2 = Vec2::new(-0.1, 0.3);

// ══════════════════════════════════════════════════════════════
// State payloads
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct Barrel {
    pub exploded: bool,
    /// The kill zone has been applied.
    pub killed: bool,
    pub smoke: Option<Particle>,
}

impl Barrel {
    pub fn new() -> Self {
        Barrel::default()
    }
}

#[derive(Clone, Debug)]
pub struct Portal {
    pub durability: u32,
    pub smoke: Option<Particle>,
}

impl Portal {
    pub fn new(variant: usize) -> Self {
        // A portal saved as already destroyed stays inert.
        let durability = if variant == 0 { PORTAL_DURABILITY } else { 0 };
        Portal { durability, smoke: None }
    }
}

#[derive(Clone, Debug)]
pub struct Tree {
    /// Area leaves are born in.
    pub spawner: Rect,
    pub leaves: Vec<Particle>,
}

impl Tree {
    pub fn new(pos: IVec, variant: usize) -> Self {
        let spawner = if variant == 0 {
            Rect::new(pos.x + 7, pos.y + 4, 34, 21)
        } else {
            Rect::new(pos.x + 5, pos.y + 4, 29, 20)
        };
        Tree { spawner, leaves: Vec::new() }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let area = (self.spawner.w * self.spawner.h) as f32;
        if rng.gen::<f32>() * LEAF_RARITY < area {
            let pos = Vec2::new(
                self.spawner.x as f32 + rng.gen::<f32>() * self.spawner.w as f32,
                self.spawner.y as f32 + rng.gen::<f32>() * self.spawner.h as f32,
            );
            self.leaves.push(Particle::new(ParticleKind::Leaf, pos, LEAF_DRIFT, rng.gen_range(0..=20)));
        }
        self.leaves.retain_mut(|leaf| {
            let kill = leaf.update();
            leaf.pos.x += (leaf.animation.frame as f32 * 0.035).sin() * 0.3;
            !kill
        });
    }
}

// ══════════════════════════════════════════════════════════════
// Tile constructors and triggers
// ══════════════════════════════════════════════════════════════

impl Tile {
    #[allow(dead_code)]
    pub fn barrel(cell: IVec, size: i32) -> Tile {
        let mut t = Tile::new(TileKind::Barrel, cell, 0, size, false);
        t.special = Special::Barrel(Barrel::new());
        t
    }

    pub fn portal(pos: IVec, variant: usize, size: i32) -> Tile {
        let mut t = Tile::new(TileKind::Portal, pos, variant, size, true);
        t.special = Special::Portal(Portal::new(variant));
        t
    }

    /// Light a barrel. Returns true only on the first call.
    pub fn explode(&mut self) -> bool {
        let origin = self.pixel_pos().as_vec2();
        match &mut self.special {
            Special::Barrel(b) if !b.exploded => {
                b.exploded = true;
                b.smoke = Some(Particle::new(ParticleKind::Smoke, origin, Vec2::ZERO, 0));
                true
            }
            _ => false,
        }
    }

    pub fn is_exploded(&self) -> bool {
        matches!(&self.special, Special::Barrel(b) if b.exploded)
    }

    /// Land one hit on a portal. Returns true once durability is gone;
    /// only the hit that empties it flips the variant and puffs smoke.
    pub fn destroy(&mut self) -> bool {
        let center = self.rect().center().as_vec2();
        let Special::Portal(p) = &mut self.special else {
            return false;
        };
        if p.durability > 0 {
            p.durability -= 1;
            if p.durability == 0 {
                self.variant = 1;
                p.smoke = Some(Particle::new(ParticleKind::Smoke, center, Vec2::ZERO, 0));
            }
        }
        p.durability == 0
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(&self.special, Special::Portal(p) if p.durability == 0)
    }

    /// Per-frame portal logic: finish any smoke, and while active and the
    /// player is in range, occasionally request an enemy.
    pub fn update_portal<R: Rng + ?Sized>(&mut self, player: &Player, rng: &mut R, spawns: &mut Vec<Spawn>) {
        let active = self.variant == 0;
        let in_range = (player.rect().centerx() - self.rect().centerx()).abs() < self.size * PORTAL_RANGE_TILES;
        let pos = self.pos.as_vec2();
        let Special::Portal(p) = &mut self.special else {
            return;
        };
        if let Some(smoke) = &mut p.smoke {
            if smoke.update() {
                p.smoke = None;
            }
        }
        if active && in_range && rng.gen::<f32>() < PORTAL_SPAWN_CHANCE {
            spawns.push(Spawn::Enemy(pos));
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Barrel blast
// ══════════════════════════════════════════════════════════════

/// What one frame of a barrel's blast did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlastReport {
    pub player_killed: bool,
    pub enemies_killed: usize,
    /// Neighboring barrels set off this frame.
    pub chained: usize,
    /// Tiles cleared this frame.
    pub cleared: usize,
    /// The smoke ended and the barrel is gone.
    pub finished: bool,
}

/// Advance the barrel at `cell`. Unlit barrels do nothing.
pub fn update_barrel(
    tilemap: &mut Tilemap,
    cell: IVec,
    player: &mut Player,
    enemies: &mut [Enemy],
) -> Result<BlastReport, TilemapError> {
    let mut report = BlastReport::default();
    let ts = tilemap.tile_size;

    let (smoke_done, first_frame) = {
        let tile = tilemap.tile_at_mut(cell)?;
        match &mut tile.special {
            Special::Barrel(b) if b.exploded => {
                let done = match &mut b.smoke {
                    Some(smoke) => {
                        smoke.update();
                        smoke.done()
                    }
                    None => true,
                };
                let first = !b.killed;
                b.killed = true;
                (done, first)
            }
            _ => return Ok(report),
        }
    };

    let neighbors: Vec<(IVec, TileKind)> = tilemap
        .tiles_around((cell * ts).as_vec2())
        .map(|(t, _)| (t.pos, t.kind))
        .collect();
    for (pos, kind) in neighbors {
        if kind == TileKind::Barrel {
            if tilemap.tile_at_mut(pos)?.explode() {
                report.chained += 1;
            }
        } else if tilemap.remove_tile(pos).is_some() {
            report.cleared += 1;
        }
    }

    if first_frame {
        let zone = Rect::new(
            (cell.x - BLAST_RADIUS_TILES) * ts,
            (cell.y - BLAST_RADIUS_TILES) * ts,
            ts * (BLAST_RADIUS_TILES * 2 + 1),
            ts * (BLAST_RADIUS_TILES * 2 + 1),
        );
        if zone.collides(&player.rect()) {
            report.player_killed = player.kill(1);
        }
        for enemy in enemies.iter_mut() {
            if !enemy.dead && zone.collides(&enemy.rect()) {
                enemy.dead = true;
                report.enemies_killed += 1;
            }
        }
    }

    if smoke_done {
        tilemap.remove_tile(cell);
        report.finished = true;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn map_with_barrel() -> Tilemap {
        let mut m = Tilemap::new(16);
        m.add_tile(Tile::barrel(IVec::new(5, 5), 16));
        m
    }

    #[test]
    fn explode_is_idempotent() {
        let mut t = Tile::barrel(IVec::new(1, 2), 16);
        assert!(!t.is_exploded());
        assert!(t.explode());
        assert!(!t.explode());
        assert!(t.is_exploded());
        let Special::Barrel(b) = &t.special else { panic!() };
        assert_eq!(b.smoke.as_ref().map(|s| s.pos), Some(Vec2::new(16.0, 32.0)));
    }

    #[test]
    fn plain_tiles_ignore_triggers() {
        let mut t = Tile::new(TileKind::Grass, IVec::new(0, 0), 0, 16, false);
        assert!(!t.explode());
        assert!(!t.destroy());
        assert!(!t.is_destroyed());
    }

    #[test]
    fn unlit_barrel_is_inert() {
        let mut map = map_with_barrel();
        map.add_tile(Tile::new(TileKind::Grass, IVec::new(6, 5), 0, 16, false));
        let mut player = Player::new(Vec2::new(80.0, 80.0));
        let r = update_barrel(&mut map, IVec::new(5, 5), &mut player, &mut []).unwrap();
        assert_eq!(r, BlastReport::default());
        assert_eq!(map.len(), 2);
        assert!(!player.dead);
    }

    #[test]
    fn blast_kills_exactly_once() {
        let mut map = map_with_barrel();
        map.tile_at_mut(IVec::new(5, 5)).unwrap().explode();
        let mut player = Player::new(Vec2::new(70.0, 70.0));
        let mut enemies = vec![Enemy::new(Vec2::new(100.0, 90.0)), Enemy::new(Vec2::new(300.0, 90.0))];

        let mut kills = 0;
        let mut enemy_kills = 0;
        let mut frames = 0;
        loop {
            let r = update_barrel(&mut map, IVec::new(5, 5), &mut player, &mut enemies).unwrap();
            frames += 1;
            kills += r.player_killed as usize;
            enemy_kills += r.enemies_killed;
            // Revive between frames: a repeated kill would show up again.
            player.dead = false;
            if frames == 5 {
                // Relighting mid-smoke neither restarts the blast nor kills again.
                assert!(!map.tile_at_mut(IVec::new(5, 5)).unwrap().explode());
                enemies[0].dead = false;
            }
            if r.finished {
                break;
            }
            assert!(frames < 100);
        }
        assert_eq!(kills, 1);
        assert_eq!(enemy_kills, 1);
        assert!(!enemies[1].dead);
        assert!(map.get(IVec::new(5, 5)).is_none());
        assert_eq!(frames, 9 * 4 - 1);
    }

    #[test]
    fn blast_clears_neighbors_and_chains() {
        let mut map = map_with_barrel();
        map.add_tile(Tile::new(TileKind::Stone, IVec::new(4, 5), 0, 16, false));
        map.add_tile(Tile::new(TileKind::Ladder, IVec::new(6, 6), 0, 16, false));
        map.add_tile(Tile::new(TileKind::Stone, IVec::new(7, 5), 0, 16, false));
        map.add_tile(Tile::barrel(IVec::new(5, 4), 16));
        map.tile_at_mut(IVec::new(5, 5)).unwrap().explode();

        let mut player = Player::new(Vec2::new(-500.0, 0.0));
        let r = update_barrel(&mut map, IVec::new(5, 5), &mut player, &mut []).unwrap();
        assert_eq!(r.cleared, 2);
        assert_eq!(r.chained, 1);
        assert!(map.tile_at(IVec::new(5, 4)).unwrap().is_exploded());
        assert!(map.get(IVec::new(7, 5)).is_some());
        assert!(!player.dead);
    }

    #[test]
    fn portal_destroyed_on_300th_hit() {
        let mut p = Tile::portal(IVec::new(100, 50), 0, 16);
        for hit in 1..PORTAL_DURABILITY {
            assert!(!p.destroy(), "hit {}", hit);
            assert_eq!(p.variant, 0);
        }
        assert!(p.destroy());
        assert_eq!(p.variant, 1);
        assert!(p.is_destroyed());
        let Special::Portal(state) = &p.special else { panic!() };
        assert!(state.smoke.is_some());
    }

    #[test]
    fn portal_spawns_only_when_active_and_near() {
        let mut rng = StepRng::new(0, 0);
        let near = Player::new(Vec2::new(120.0, 50.0));
        let far = Player::new(Vec2::new(1000.0, 50.0));

        let mut portal = Tile::portal(IVec::new(100, 50), 0, 16);
        let mut spawns = vec![];
        portal.update_portal(&far, &mut rng, &mut spawns);
        assert!(spawns.is_empty());
        portal.update_portal(&near, &mut rng, &mut spawns);
        assert!(matches!(spawns.as_slice(), [Spawn::Enemy(p)] if *p == Vec2::new(100.0, 50.0)));

        let mut dead = Tile::portal(IVec::new(100, 50), 1, 16);
        spawns.clear();
        dead.update_portal(&near, &mut rng, &mut spawns);
        assert!(spawns.is_empty());
        assert!(dead.is_destroyed());
    }

    #[test]
    fn portal_smoke_clears_after_playing() {
        let mut rng = StepRng::new(u64::MAX, 0);
        let player = Player::new(Vec2::ZERO);
        let mut p = Tile::portal(IVec::new(0, 0), 0, 16);
        for _ in 0..PORTAL_DURABILITY {
            p.destroy();
        }
        for _ in 0..100 {
            p.update_portal(&player, &mut rng, &mut vec![]);
        }
        let Special::Portal(state) = &p.special else { panic!() };
        assert!(state.smoke.is_none());
    }

    #[test]
    fn tree_sheds_and_sways_leaves() {
        let mut tree = Tree::new(IVec::new(0, 0), 0);
        assert_eq!(tree.spawner, Rect::new(7, 4, 34, 21));
        // Zero draws always pass the area roll.
        let mut rng = StepRng::new(0, 0);
        tree.update(&mut rng);
        assert_eq!(tree.leaves.len(), 1);
        assert!(tree.leaves[0].pos.y > 4.0);

        let mut never = StepRng::new(u64::MAX, 0);
        for _ in 0..20 * 18 {
            tree.update(&mut never);
        }
        assert!(tree.leaves.is_empty());
    }
}
