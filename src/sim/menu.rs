/// Vertical menus shown outside of play.

use super::world::Phase;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Continue,
    NewGame,
    Resume,
    Restart,
    Back,
    Exit,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Continue => "CONTINUE",
            MenuItem::NewGame => "NEW GAME",
            MenuItem::Resume => "RESUME",
            MenuItem::Restart => "RESTART",
            MenuItem::Back => "BACK",
            MenuItem::Exit => "EXIT",
        }
    }
}

pub const START: &[MenuItem] = &[MenuItem::Continue, MenuItem::NewGame, MenuItem::Exit];
pub const PAUSE: &[MenuItem] = &[MenuItem::Resume, MenuItem::Back, MenuItem::Exit];
pub const GAME_OVER: &[MenuItem] = &[MenuItem::Restart, MenuItem::Back, MenuItem::Exit];
pub const MISSION_COMPLETE: &[MenuItem] = &[MenuItem::Back, MenuItem::Exit];

#[derive(Clone, Debug)]
pub struct Menu {
    items: &'static [MenuItem],
    selected: usize,
}

impl Menu {
    pub fn new(items: &'static [MenuItem]) -> Self {
        Menu { items, selected: 0 }
    }

    /// The menu shown in a phase. Play has none.
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Start => Menu::new(START),
            Phase::Pause => Menu::new(PAUSE),
            Phase::GameOver => Menu::new(GAME_OVER),
            Phase::MissionComplete => Menu::new(MISSION_COMPLETE),
            Phase::Play => Menu::new(&[]),
        }
    }

    pub fn items(&self) -> &'static [MenuItem] {
        self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn current(&self) -> Option<MenuItem> {
        self.items.get(self.selected).copied()
    }

    pub fn up(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + self.items.len() - 1) % self.items.len();
        }
    }

    pub fn down(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    /// Jump to an entry. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_both_ways() {
        let mut m = Menu::new(START);
        m.up();
        assert_eq!(m.current(), Some(MenuItem::Exit));
        m.down();
        assert_eq!(m.selected(), 0);
        m.down();
        m.down();
        m.down();
        assert_eq!(m.current(), Some(MenuItem::Continue));
    }

    #[test]
    fn out_of_range_select_is_ignored() {
        let mut m = Menu::new(MISSION_COMPLETE);
        assert!(!m.select(2));
        assert_eq!(m.selected(), 0);
        assert!(m.select(1));
        assert_eq!(m.current(), Some(MenuItem::Exit));
    }

    #[test]
    fn play_has_no_menu() {
        let mut m = Menu::for_phase(Phase::Play);
        m.down();
        assert_eq!(m.current(), None);
        assert_eq!(Menu::for_phase(Phase::GameOver).items()[0].label(), "RESTART");
    }
}
