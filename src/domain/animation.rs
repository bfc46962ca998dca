/// Frame-driven animation and the built-in asset catalog.
///
/// The simulation never touches image data. It only needs to know how long
/// each animation runs (frame count × ticks per frame), whether it loops,
/// and how large each tile image is. The front end maps the same keys to
/// glyphs.

use super::tile::TileKind;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerAction {
    Idle,
    Run,
    Jump,
    WallSlide,
    StandShoot,
    RunShoot,
    Dead,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyAction {
    Idle,
    Run,
    Shoot,
    Dead,
}

/// Who fired a projectile.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Team {
    Player,
    Enemy,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnimKey {
    Player(PlayerAction),
    Enemy(EnemyAction),
    Projectile(Team),
    Particle,
    Leaf,
    Smoke,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    frames: u32,
    duration: u32,
    looping: bool,
    pub frame: u32,
    pub done: bool,
}

impl Animation {
    pub fn new(frames: u32, duration: u32, looping: bool) -> Self {
        Animation {
            frames: frames.max(1),
            duration: duration.max(1),
            looping,
            frame: 0,
            done: false,
        }
    }

    fn total(&self) -> u32 {
        self.frames * self.duration
    }

    /// Advance one tick.
    pub fn update(&mut self) {
        if self.looping {
            self.frame = (self.frame + 1) % self.total();
        } else {
            self.frame = (self.frame + 1).min(self.total() - 1);
            if self.frame == self.total() - 1 {
                self.done = true;
            }
        }
    }

    /// Index of the image currently shown.
    #[allow(dead_code)]
    pub fn image(&self) -> u32 {
        (self.frame / self.duration).min(self.frames - 1)
    }
}

// ── Catalog ──

/// (frames, ticks per frame, loop)
fn policy(key: AnimKey) -> (u32, u32, bool) {
    use AnimKey::*;
    match key {
        Player(PlayerAction::Idle) => (22, 10, true),
        Player(PlayerAction::Run) => (8, 4, true),
        Player(PlayerAction::Jump) => (4, 2, false),
        Player(PlayerAction::WallSlide) => (1, 10, true),
        Player(PlayerAction::StandShoot) => (4, 4, true),
        Player(PlayerAction::RunShoot) => (8, 4, true),
        Player(PlayerAction::Dead) => (10, 2, false),
        Enemy(EnemyAction::Idle) => (16, 10, true),
        Enemy(EnemyAction::Run) => (8, 8, true),
        Enemy(EnemyAction::Shoot) => (4, 1, true),
        Enemy(EnemyAction::Dead) => (8, 2, false),
        Projectile(_) => (4, 8, false),
        Particle => (4, 6, false),
        Leaf => (18, 20, false),
        Smoke => (9, 4, false),
    }
}

pub fn animation(key: AnimKey) -> Animation {
    let (frames, duration, looping) = policy(key);
    Animation::new(frames, duration, looping)
}

/// Pixel size of a tile image. On-grid tiles always fill one cell.
pub fn tile_image_size(kind: TileKind, variant: usize, tile_size: i32) -> (i32, i32) {
    match (kind, variant) {
        (TileKind::Tree, 0) => (48, 32),
        (TileKind::Tree, _) => (40, 32),
        (TileKind::Portal, _) => (16, 32),
        (TileKind::Cave, _) => (32, 32),
        (TileKind::Checkpoint, _) => (16, 32),
        (TileKind::Ammo, _) => (8, 8),
        (TileKind::Spawner, _) => (16, 16),
        (TileKind::Decor, _) => (16, 16),
        _ => (tile_size, tile_size),
    }
}

/// Number of image variants shipped for a tile type.
pub fn variant_count(kind: TileKind) -> usize {
    match kind {
        TileKind::Grass | TileKind::Stone => 16,
        TileKind::Barrel | TileKind::Ladder | TileKind::Trap | TileKind::Ammo => 1,
        TileKind::Tree | TileKind::Spawner | TileKind::Portal => 2,
        TileKind::Obstacle | TileKind::Bridge => 3,
        TileKind::Decor => 4,
        TileKind::Cave | TileKind::Checkpoint => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_finishes_on_last_tick() {
        let mut a = Animation::new(3, 2, false);
        for _ in 0..4 {
            a.update();
            assert!(!a.done);
        }
        a.update();
        assert!(a.done);
        assert_eq!(a.image(), 2);
        a.update();
        assert_eq!(a.frame, 5);
    }

    #[test]
    fn looping_wraps_and_never_finishes() {
        let mut a = Animation::new(2, 3, true);
        for _ in 0..6 { a.update(); }
        assert_eq!(a.frame, 0);
        assert!(!a.done);
    }
}
