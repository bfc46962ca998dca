/// World: the complete state of a running game.
///
/// ## Ownership
///
/// The world owns the tilemap and every live entity. Entities that the
/// level file only marks (spawners, portals, checkpoints, ammo) are pulled
/// out of the tilemap on load and kept in their own lists here.
///
/// ## Phase switches
///
/// Moving between phases (new game, reload after a death, next level,
/// menus) goes through a screen fade. `begin` records the switch and
/// starts the fade; the step applies it when the fade covers the screen.
/// Pausing and resuming are instant.
///
/// ## Camera
///
/// `scroll` is the world pixel at the top-left of the 320×180 view. It
/// eases toward the player every play frame.

use crate::config::{GameConfig, TimingConfig};
use crate::domain::ai::Enemy;
use crate::domain::geom::{IVec, Vec2};
use crate::domain::player::{Player, PLAYER_START};
use crate::domain::projectile::Projectile;
use crate::domain::tile::Tile;
use crate::domain::tilemap::{Tilemap, DEFAULT_TILE_SIZE};
use super::level::LevelStore;
use super::menu::Menu;
use super::transition::Transition;

pub const VIEW_W: i32 = 320;
pub const VIEW_H: i32 = 180;
pub const START_LIVES: u32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Start,
    Play,
    GameOver,
    Pause,
    MissionComplete,
}

/// A phase change waiting for the fade's midpoint.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Switch {
    /// Load a level and play it. `fresh` restores lives and clears score.
    Play { level: usize, fresh: bool },
    /// Show a menu phase.
    Show(Phase),
}

#[derive(Clone, Debug)]
pub struct World {
    pub phase: Phase,
    pub level: usize,
    pub lives: u32,
    pub score: u32,
    pub scroll: Vec2,
    pub screenshake: u32,
    pub tick: u64,

    pub tilemap: Tilemap,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub portals: Vec<Tile>,
    pub player_projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub checkpoints: Vec<Tile>,
    pub ammo: Vec<Tile>,

    /// The player has died and the life is about to be taken.
    pub dead: bool,
    pub dead_delay: u32,

    pub menu: Menu,
    pub transition: Transition,
    pub pending: Option<Switch>,
    pub timing: TimingConfig,
    pub store: LevelStore,
}

impl World {
    pub fn new(config: &GameConfig) -> Self {
        World {
            phase: Phase::Start,
            level: 0,
            lives: START_LIVES,
            score: 0,
            scroll: Vec2::ZERO,
            screenshake: 0,
            tick: 0,
            tilemap: Tilemap::new(DEFAULT_TILE_SIZE),
            player: Player::new(PLAYER_START),
            enemies: Vec::new(),
            portals: Vec::new(),
            player_projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            checkpoints: Vec::new(),
            ammo: Vec::new(),
            dead: false,
            dead_delay: config.timing.dead_delay,
            menu: Menu::for_phase(Phase::Start),
            transition: Transition::new(config.timing.transition_speed),
            pending: None,
            timing: config.timing.clone(),
            store: LevelStore::from_config(config),
        }
    }

    /// Queue a phase switch behind a fade. Refused while another switch is
    /// pending, so each trigger applies at most once.
    pub fn begin(&mut self, switch: Switch) -> bool {
        if self.pending.is_some() || !self.transition.start() {
            return false;
        }
        log::info!("transition toward {:?}", switch);
        self.pending = Some(switch);
        true
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.menu = Menu::for_phase(phase);
    }

    /// Integer scroll used for drawing.
    pub fn render_scroll(&self) -> IVec {
        IVec::new(self.scroll.x as i32, self.scroll.y as i32)
    }

    /// Put the camera straight on its goal, without easing.
    pub fn snap_camera(&mut self) {
        let c = self.player.rect().center();
        self.scroll = Vec2::new(
            c.x as f32 - VIEW_W as f32 / 3.0,
            c.y as f32 - VIEW_H as f32 * 2.0 / 3.0,
        );
    }
}
