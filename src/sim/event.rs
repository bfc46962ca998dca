/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and effects.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Jump,
    Shoot,
    Hurt,
    Bomb,
    Explosion,
    Select,
    Hit,
    Dash,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    Dashed,
    Shot,
    PlayerKilled,
    EnemyKilled,
    /// A dead enemy finished its death animation and was scored.
    EnemyRemoved,
    EnemySpawned,
    BarrelExploded,
    WallHit,
    PortalHit,
    PortalDestroyed,
    AmmoPicked,
    CheckpointReached { level: usize },
    MissionComplete,
    LifeLost { lives: u32 },
    GameOver,
    LevelLoaded { level: usize },
    MenuMoved,
    MenuSelected,
}

impl GameEvent {
    /// Sound cue for this event, if it has one.
    pub fn cue(&self) -> Option<Cue> {
        match self {
            GameEvent::Jumped => Some(Cue::Jump),
            GameEvent::Dashed => Some(Cue::Dash),
            GameEvent::Shot => Some(Cue::Shoot),
            GameEvent::PlayerKilled => Some(Cue::Hurt),
            GameEvent::EnemyKilled | GameEvent::PortalHit | GameEvent::WallHit => Some(Cue::Hit),
            GameEvent::BarrelExploded => Some(Cue::Explosion),
            GameEvent::PortalDestroyed => Some(Cue::Bomb),
            GameEvent::AmmoPicked | GameEvent::MenuMoved | GameEvent::MenuSelected => Some(Cue::Select),
            _ => None,
        }
    }
}
