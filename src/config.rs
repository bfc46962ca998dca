/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.local/share/jojo`. Missing files or keys fall back to defaults.
/// Physics constants are deliberately absent: they live in the domain.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub maps_dir: PathBuf,
    pub progress_file: PathBuf,
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub frame_rate: u32,
    /// Frames between the player's death and the life being taken.
    pub dead_delay: u32,
    /// Fade step per frame; the fade runs from -255 to 255.
    pub transition_speed: i32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub dash: Vec<String>,
    pub shoot: Vec<String>,
    pub confirm: Vec<String>,
    pub pause: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_maps_dir")]
    maps_dir: String,
    #[serde(default = "default_progress_file")]
    progress_file: String,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_rate")]
    frame_rate: u32,
    #[serde(default = "default_dead_delay")]
    dead_delay: u32,
    #[serde(default = "default_transition_speed")]
    transition_speed: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_dash")]
    dash: Vec<String>,
    #[serde(default = "default_shoot")]
    shoot: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

// ── Defaults ──

fn default_maps_dir() -> String { "data/maps".into() }
fn default_progress_file() -> String { "data/level.txt".into() }

fn default_frame_rate() -> u32 { 60 }
fn default_dead_delay() -> u32 { 60 }
fn default_transition_speed() -> i32 { 10 }

fn default_jump() -> Vec<String> { vec!["A".into()] }
fn default_dash() -> Vec<String> { vec!["B".into(), "R1".into()] }
fn default_shoot() -> Vec<String> { vec!["X".into(), "Y".into()] }
fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            maps_dir: default_maps_dir(),
            progress_file: default_progress_file(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_rate: default_frame_rate(),
            dead_delay: default_dead_delay(),
            transition_speed: default_transition_speed(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            dash: default_dash(),
            shoot: default_shoot(),
            confirm: default_confirm(),
            pause: default_pause(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/jojo`.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config document directly. Invalid TOML yields defaults.
    #[allow(dead_code)]
    pub fn from_str(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg, &[]),
            Err(e) => {
                log::warn!("config.toml parse error, using defaults: {e}");
                GameConfig::default()
            }
        }
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let maps_dir = resolve_dir(&cfg.general.maps_dir, search_dirs);
        // The progress file lives next to the data it tracks, even if it
        // does not exist yet.
        let progress_file = resolve_file(&cfg.general.progress_file, search_dirs);

        GameConfig {
            maps_dir,
            progress_file,
            timing: TimingConfig {
                frame_rate: cfg.timing.frame_rate.max(1),
                dead_delay: cfg.timing.dead_delay,
                transition_speed: cfg.timing.transition_speed.max(1),
            },
            gamepad: GamepadConfig {
                jump: cfg.gamepad.jump,
                dash: cfg.gamepad.dash,
                shoot: cfg.gamepad.shoot,
                confirm: cfg.gamepad.confirm,
                pause: cfg.gamepad.pause,
            },
        }
    }
}

fn resolve_dir(raw: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    search_dirs.iter()
        .map(|d| d.join(raw))
        .find(|p| p.is_dir())
        .unwrap_or(path)
}

fn resolve_file(raw: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    search_dirs.iter()
        .map(|d| d.join(raw))
        .find(|p| p.parent().map_or(false, Path::is_dir))
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD + data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/jojo");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    log::info!("config loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    log::warn!("{} parse error, using defaults: {e}", path.display());
                    return TomlConfig::default();
                }
            },
            Err(e) => log::warn!("could not read {}: {e}", path.display()),
        }
    }
    TomlConfig::default()
}
