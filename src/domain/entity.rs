/// Shared entity vocabulary: collision flags, per-frame intent, and the
/// spawn requests entity updates hand back to the game.

use super::geom::Vec2;
use super::projectile::Projectile;

/// Which sides touched solid terrain during the last update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Collisions {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Collisions {
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.top || self.bottom
    }
}

/// Held-direction state the player's update consumes. Built once per
/// frame by the front end; entity logic never reads devices itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl PlayerInput {
    /// Requested horizontal movement: -1, 0 or +1.
    pub fn horizontal(&self) -> f32 {
        (self.right as i32 - self.left as i32) as f32
    }

    /// Ladder climb velocity, or `None` when neither direction is held.
    pub fn climb(&self) -> Option<f32> {
        if self.up {
            Some(-1.0)
        } else if self.down {
            Some(1.0)
        } else {
            None
        }
    }

    pub fn movement(&self) -> Vec2 {
        Vec2::new(self.horizontal(), 0.0)
    }
}

/// Everything the front end read from devices this frame. `jump`, `dash`
/// and the menu keys are fresh presses; `shoot` is held. `menu_pick` is a
/// zero-based menu entry chosen directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub player: PlayerInput,
    pub jump: bool,
    pub dash: bool,
    pub shoot: bool,
    pub pause: bool,
    pub menu_up: bool,
    pub menu_down: bool,
    pub confirm: bool,
    pub menu_pick: Option<usize>,
}

/// Something an update wants added to the world. The game drains these
/// after the pass that produced them.
#[derive(Clone, Debug)]
pub enum Spawn {
    Projectile(Projectile),
    /// New enemy with its top-left corner at this pixel position.
    Enemy(Vec2),
}
