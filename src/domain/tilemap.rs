/// Sparse tile grid plus free-floating (off-grid) tiles.
///
/// ## Storage
///
/// On-grid tiles live in a `HashMap` keyed by the packed cell coordinate
/// (`IVec::key`), so a cell holds at most one tile and lookups never
/// format strings. The `"x;y"` string keys exist only in the level file.
///
/// Off-grid tiles are an ordered list. They are never deduplicated:
/// two decorations may sit on the same pixel.
///
/// ## Neighborhood queries
///
/// `tiles_around` looks at the 3×3 block of cells around the cell that
/// contains a pixel position. Physics resolution and proximity checks
/// (ladders, barrel blasts) all go through it, so its row-major offset
/// order is the tie-break order for overlapping obstacles.
///
/// ## Level file
///
/// ```json
/// { "tilemap": { "3;7": {"type":"grass","pos":[3,7],"variant":1,"size":16,"offgrid":false} },
///   "offgrid_tiles": [ {"type":"tree","pos":[40,82],"variant":0,"size":16,"offgrid":true} ],
///   "tile_size": 16 }
/// ```
///
/// A missing file is an empty level, not an error.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::{IVec, Rect, Vec2};
use super::hazard::{Barrel, Tree};
use super::tile::{Special, Tile, TileKind, TileRecord};

pub const DEFAULT_TILE_SIZE: i32 = 16;

const NEIGHBOR_OFFSETS: [IVec; 9] = [
    IVec::new(-1, -1), IVec::new(0, -1), IVec::new(1, -1),
    IVec::new(-1, 0),  IVec::new(0, 0),  IVec::new(1, 0),
    IVec::new(-1, 1),  IVec::new(0, 1),  IVec::new(1, 1),
];

// Cardinal neighbor bits for autotiling.
const RIGHT: usize = 1;
const LEFT: usize = 2;
const DOWN: usize = 4;
const UP: usize = 8;

const CARDINALS: [(IVec, usize); 4] = [
    (IVec::new(1, 0), RIGHT),
    (IVec::new(-1, 0), LEFT),
    (IVec::new(0, 1), DOWN),
    (IVec::new(0, -1), UP),
];

/// Neighbor mask → variant. `None` leaves the variant untouched.
const AUTOTILE_MAP: [Option<usize>; 16] = {
    let mut t = [None; 16];
    t[RIGHT | DOWN] = Some(0);
    t[LEFT | RIGHT | DOWN] = Some(1);
    t[LEFT | DOWN] = Some(2);
    t[LEFT | UP | DOWN] = Some(3);
    t[LEFT | UP] = Some(4);
    t[LEFT | UP | RIGHT] = Some(5);
    t[UP | RIGHT] = Some(6);
    t[UP | DOWN | RIGHT] = Some(7);
    t[LEFT | UP | DOWN | RIGHT] = Some(8);
    t[LEFT | RIGHT] = Some(9);
    t[RIGHT] = Some(10);
    t[LEFT] = Some(11);
    t[UP | DOWN] = Some(12);
    t[DOWN] = Some(13);
    t[UP] = Some(14);
    t[0] = Some(15);
    t
};

#[derive(Debug, thiserror::Error)]
pub enum TilemapError {
    #[error("no tile at {0:?}")]
    NoTile(IVec),
    #[error("map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("map file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct MapFile {
    tilemap: BTreeMap<String, TileRecord>,
    offgrid_tiles: Vec<TileRecord>,
    #[serde(default = "default_tile_size")]
    tile_size: i32,
}

fn default_tile_size() -> i32 { DEFAULT_TILE_SIZE }

#[derive(Clone, Debug)]
pub struct Tilemap {
    pub tile_size: i32,
    tiles: HashMap<u64, Tile>,
    offgrid: Vec<Tile>,
}

impl Default for Tilemap {
    fn default() -> Self {
        Tilemap::new(DEFAULT_TILE_SIZE)
    }
}

impl Tilemap {
    pub fn new(tile_size: i32) -> Self {
        Tilemap { tile_size, tiles: HashMap::new(), offgrid: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.offgrid.is_empty()
    }

    /// On-grid tiles in arbitrary order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.values()
    }

    pub fn offgrid_tiles(&self) -> &[Tile] {
        &self.offgrid
    }

    // ── Mutation ──

    /// Place an on-grid tile, replacing whatever occupied its cell.
    pub fn add_tile(&mut self, tile: Tile) -> Option<Tile> {
        debug_assert!(!tile.offgrid);
        self.tiles.insert(tile.pos.key(), tile)
    }

    pub fn add_offgrid_tile(&mut self, tile: Tile) {
        debug_assert!(tile.offgrid);
        self.offgrid.push(tile);
    }

    pub fn remove_tile(&mut self, cell: IVec) -> Option<Tile> {
        self.tiles.remove(&cell.key())
    }

    /// Remove every off-grid tile whose bounds contain `point`.
    #[allow(dead_code)]
    pub fn remove_offgrid_at(&mut self, point: IVec) -> usize {
        let before = self.offgrid.len();
        self.offgrid.retain(|t| !t.rect().contains_point(point));
        before - self.offgrid.len()
    }

    // ── Lookup ──

    pub fn get(&self, cell: IVec) -> Option<&Tile> {
        self.tiles.get(&cell.key())
    }

    /// Tile at a grid cell. Callers are expected to have checked the cell;
    /// an empty cell is reported rather than silently ignored.
    #[allow(dead_code)]
    pub fn tile_at(&self, cell: IVec) -> Result<&Tile, TilemapError> {
        self.tiles.get(&cell.key()).ok_or(TilemapError::NoTile(cell))
    }

    pub fn tile_at_mut(&mut self, cell: IVec) -> Result<&mut Tile, TilemapError> {
        self.tiles.get_mut(&cell.key()).ok_or(TilemapError::NoTile(cell))
    }

    /// Tiles in the 3×3 block around the cell containing `pos`, paired
    /// with their offset from that cell.
    pub fn tiles_around(&self, pos: Vec2) -> impl Iterator<Item = (&Tile, IVec)> + '_ {
        let center = pos.cell(self.tile_size);
        NEIGHBOR_OFFSETS.iter().filter_map(move |&off| {
            self.tiles.get(&(center + off).key()).map(|t| (t, off))
        })
    }

    /// Collision boxes of the solid tiles around `pos`.
    pub fn physics_rects_around(&self, pos: Vec2) -> impl Iterator<Item = Rect> + '_ {
        let ts = self.tile_size;
        self.tiles_around(pos)
            .filter(|(t, _)| t.is_solid())
            .map(move |(t, _)| Rect::new(t.pos.x * ts, t.pos.y * ts, ts, ts))
    }

    /// Point probe: the solid tile covering `pos`, if any.
    pub fn solid_check(&self, pos: Vec2) -> Option<&Tile> {
        self.get(pos.cell(self.tile_size)).filter(|t| t.is_solid())
    }

    /// Grid cells holding tiles of `kind`, in row-major order.
    pub fn cells_of(&self, kind: TileKind) -> Vec<IVec> {
        let mut cells: Vec<IVec> = self.tiles.values()
            .filter(|t| t.kind == kind)
            .map(|t| t.pos)
            .collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }

    // ── Autotiling ──

    /// Recompute the variant of every autotiled tile from its cardinal
    /// neighbors of the same terrain family.
    #[allow(dead_code)]
    pub fn autotile(&mut self) {
        let mut updates = Vec::new();
        for tile in self.tiles.values() {
            if !tile.kind.is_autotile() {
                continue;
            }
            let mut mask = 0;
            for (off, bit) in CARDINALS {
                if let Some(n) = self.get(tile.pos + off) {
                    if n.kind == tile.kind || n.kind.is_autotile() {
                        mask |= bit;
                    }
                }
            }
            if let Some(variant) = AUTOTILE_MAP[mask] {
                updates.push((tile.pos, variant));
            }
        }
        for (cell, variant) in updates {
            if let Some(t) = self.tiles.get_mut(&cell.key()) {
                t.variant = variant;
            }
        }
    }

    // ── Extraction ──

    /// Copies of every tile whose (type, variant) is listed. On-grid
    /// copies are converted to pixel positions. Unless `keep`, the
    /// matches are removed from the map.
    pub fn extract(&mut self, pairs: &[(TileKind, usize)], keep: bool) -> Vec<Tile> {
        let wanted = |t: &Tile| pairs.contains(&(t.kind, t.variant));
        let mut matches = Vec::new();

        for t in self.offgrid.iter().filter(|t| wanted(*t)) {
            matches.push(t.plain_copy());
        }
        if !keep {
            self.offgrid.retain(|t| !wanted(t));
        }

        let mut cells: Vec<IVec> = self.tiles.values()
            .filter(|t| wanted(*t))
            .map(|t| t.pos)
            .collect();
        cells.sort_by_key(|c| (c.y, c.x));
        for cell in cells {
            let tile = if keep {
                self.tiles.get(&cell.key()).map(Tile::plain_copy)
            } else {
                self.tiles.remove(&cell.key())
            };
            if let Some(mut copy) = tile {
                copy.pos = copy.pos * self.tile_size;
                copy.special = Special::Plain;
                matches.push(copy);
            }
        }
        matches
    }

    // ── Per-frame ──

    /// Advance tile-owned effects (falling leaves).
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for tile in &mut self.offgrid {
            if let Special::Tree(tree) = &mut tile.special {
                tree.update(rng);
            }
        }
    }

    // ── Persistence ──

    #[allow(dead_code)]
    pub fn to_json(&self) -> Result<String, TilemapError> {
        let file = MapFile {
            tilemap: self.tiles.values()
                .map(|t| (format!("{};{}", t.pos.x, t.pos.y), t.record()))
                .collect(),
            offgrid_tiles: self.offgrid.iter().map(Tile::record).collect(),
            tile_size: self.tile_size,
        };
        Ok(serde_json::to_string(&file)?)
    }

    pub fn from_json(text: &str) -> Result<Tilemap, TilemapError> {
        let file: MapFile = serde_json::from_str(text)?;
        let mut map = Tilemap::new(file.tile_size);
        for rec in file.tilemap.values() {
            let mut tile = Tile::from(rec);
            tile.offgrid = false;
            map.add_tile(tile);
        }
        for rec in &file.offgrid_tiles {
            let mut tile = Tile::from(rec);
            tile.offgrid = true;
            map.add_offgrid_tile(tile);
        }
        map.rehydrate();
        Ok(map)
    }

    #[allow(dead_code)]
    pub fn save(&self, path: &Path) -> Result<(), TilemapError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Replace the contents with the level at `path`. A missing file
    /// leaves an empty map of the current tile size.
    pub fn load(&mut self, path: &Path) -> Result<(), TilemapError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                *self = Tilemap::from_json(&text)?;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                *self = Tilemap::new(self.tile_size);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Swap tree and barrel markers for their stateful counterparts.
    fn rehydrate(&mut self) {
        for tile in self.tiles.values_mut() {
            if tile.kind == TileKind::Barrel {
                tile.special = Special::Barrel(Barrel::new());
            }
        }
        for tile in &mut self.offgrid {
            if tile.kind == TileKind::Tree {
                tile.special = Special::Tree(Tree::new(tile.pos, tile.variant));
            }
        }
    }
}
