/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

use serde::{Deserialize, Deserializer, Serialize};

use super::animation;
use super::geom::{IVec, Rect};
use super::hazard::{Barrel, Portal, Tree};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Grass,      // Solid + Autotiled
    Stone,      // Solid + Autotiled
    Obstacle,   // Solid
    Bridge,     // Solid
    Barrel,     // Solid, explodes when shot
    Ladder,     // Climbable
    Trap,       // Kills on contact
    Decor,
    Tree,       // Drops leaves
    Spawner,    // Level-load marker: variant 0 = player, 1 = enemy
    Portal,     // Enemy spawner, destructible
    Cave,
    Checkpoint, // Level exit
    Ammo,       // Pickup
}

impl TileKind {
    #[cfg(test)]
    pub const ALL: [TileKind; 14] = [
        TileKind::Grass, TileKind::Stone, TileKind::Obstacle, TileKind::Bridge,
        TileKind::Barrel, TileKind::Ladder, TileKind::Trap, TileKind::Decor,
        TileKind::Tree, TileKind::Spawner, TileKind::Portal, TileKind::Cave,
        TileKind::Checkpoint, TileKind::Ammo,
    ];

    /// Does this tile take part in collision resolution?
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            TileKind::Grass | TileKind::Stone | TileKind::Obstacle | TileKind::Bridge | TileKind::Barrel
        )
    }

    /// Is the visual variant derived from neighbors?
    pub fn is_autotile(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }
}

/// Per-subtype runtime state carried by a tile.
#[derive(Clone, Debug)]
pub enum Special {
    Plain,
    Barrel(Barrel),
    Portal(Portal),
    Tree(Tree),
}

/// A placed tile. `pos` is a grid cell when on-grid, a pixel position
/// when off-grid.
#[derive(Clone, Debug)]
pub struct Tile {
    pub kind: TileKind,
    pub pos: IVec,
    pub variant: usize,
    pub size: i32,
    pub offgrid: bool,
    pub special: Special,
}

impl Tile {
    pub fn new(kind: TileKind, pos: IVec, variant: usize, size: i32, offgrid: bool) -> Self {
        Tile { kind, pos, variant, size, offgrid, special: Special::Plain }
    }

    /// Pixel-space bounds.
    pub fn rect(&self) -> Rect {
        if self.offgrid {
            let (w, h) = animation::tile_image_size(self.kind, self.variant, self.size);
            Rect::new(self.pos.x, self.pos.y, w, h)
        } else {
            Rect::new(self.pos.x * self.size, self.pos.y * self.size, self.size, self.size)
        }
    }

    /// Pixel position of the top-left corner.
    pub fn pixel_pos(&self) -> IVec {
        if self.offgrid { self.pos } else { self.pos * self.size }
    }

    pub fn record(&self) -> TileRecord {
        TileRecord {
            kind: self.kind,
            pos: [self.pos.x, self.pos.y],
            variant: self.variant,
            size: self.size,
            offgrid: self.offgrid,
        }
    }

    /// Same tile stripped of runtime state.
    pub fn plain_copy(&self) -> Tile {
        Tile::new(self.kind, self.pos, self.variant, self.size, self.offgrid)
    }

    pub fn is_solid(&self) -> bool {
        self.kind.is_solid()
    }
}

impl From<&TileRecord> for Tile {
    fn from(r: &TileRecord) -> Tile {
        Tile::new(r.kind, IVec::new(r.pos[0], r.pos[1]), r.variant, r.size, r.offgrid)
    }
}

// ── On-disk shape ──

fn default_size() -> i32 { 16 }

/// One tile as stored in a level file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    #[serde(rename = "type")]
    pub kind: TileKind,
    #[serde(deserialize_with = "de_pos")]
    pub pos: [i32; 2],
    pub variant: usize,
    #[serde(default = "default_size")]
    pub size: i32,
    #[serde(default)]
    pub offgrid: bool,
}

/// Positions written by older editors may be floats; truncate them.
fn de_pos<'de, D: Deserializer<'de>>(d: D) -> Result<[i32; 2], D::Error> {
    let raw = <[f64; 2]>::deserialize(d)?;
    Ok([raw[0] as i32, raw[1] as i32])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_set() {
        let solid: Vec<_> = TileKind::ALL.iter().filter(|k| k.is_solid()).collect();
        assert_eq!(solid.len(), 5);
        assert!(TileKind::Barrel.is_solid());
        assert!(!TileKind::Ladder.is_solid());
        assert!(!TileKind::Trap.is_solid());
    }

    #[test]
    fn autotile_types_are_solid() {
        for k in TileKind::ALL {
            if k.is_autotile() {
                assert!(k.is_solid(), "{:?}", k);
            }
        }
    }

    #[test]
    fn record_accepts_float_positions() {
        let r: TileRecord = serde_json::from_str(
            r#"{"type":"decor","pos":[12.7,40.0],"variant":2,"size":16,"offgrid":true}"#,
        ).unwrap();
        assert_eq!(r.pos, [12, 40]);
        assert_eq!(r.kind, TileKind::Decor);
    }

    #[test]
    fn record_fills_missing_fields() {
        let r: TileRecord = serde_json::from_str(r#"{"type":"grass","pos":[1,2],"variant":0}"#).unwrap();
        assert_eq!(r.size, 16);
        assert!(!r.offgrid);
    }

    #[test]
    fn grid_rect_scales_by_size() {
        let t = Tile::new(TileKind::Grass, IVec::new(2, 3), 0, 16, false);
        assert_eq!(t.rect(), Rect::new(32, 48, 16, 16));
        let o = Tile::new(TileKind::Portal, IVec::new(5, 7), 0, 16, true);
        assert_eq!(o.rect(), Rect::new(5, 7, 16, 32));
    }
}
