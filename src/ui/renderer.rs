/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// ## Scale
///
/// One terminal cell covers an 8×8 block of world pixels, so the 320×180
/// view is 40×23 cells. Everything is drawn back to front: terrain, clouds,
/// off-grid decoration, markers, enemies, projectiles, player, particles.
/// The screen fade darkens every color toward black.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use rand::Rng;

use crate::domain::animation::{EnemyAction, PlayerAction, Team};
use crate::domain::geom::{IVec, Rect, Vec2};
use crate::domain::particle::{Particle, ParticleKind};
use crate::domain::tile::{Special, Tile, TileKind};
use crate::sim::world::{Phase, World, START_LIVES, VIEW_H, VIEW_W};
use super::clouds::{Clouds, CLOUD_COUNT};

/// World pixels per terminal cell, both axes.
const PX: i32 = 8;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 1;

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const SKY: Color = Color::Rgb { r: 36, g: 48, b: 72 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const AMBER: Color = Color::Rgb { r: 255, g: 220, b: 50 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Differs from every real cell, forcing a repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Draw a glyph keeping the existing background.
    fn stamp(&mut self, x: usize, y: usize, ch: char, fg: Color) {
        let bg = self.get(x, y).bg;
        self.set(x, y, Cell::new(ch, fg, bg));
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Projection ──

/// Maps world pixels to buffer cells for one frame.
#[derive(Clone, Copy, Debug)]
struct View {
    origin: IVec,
    cols: usize,
    rows: usize,
}

impl View {
    fn cell_of(&self, px: i32, py: i32) -> Option<(usize, usize)> {
        let cx = (px - self.origin.x).div_euclid(PX);
        let cy = (py - self.origin.y).div_euclid(PX);
        if cx < 0 || cy < 0 || cx as usize >= self.cols || cy as usize >= self.rows {
            return None;
        }
        Some((cx as usize, cy as usize + MAP_ROW))
    }

    /// Every buffer cell a rectangle touches.
    fn cells_of(&self, r: &Rect) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        if r.w <= 0 || r.h <= 0 {
            return out;
        }
        let x0 = (r.left() - self.origin.x).div_euclid(PX);
        let x1 = (r.right() - 1 - self.origin.x).div_euclid(PX);
        let y0 = (r.top() - self.origin.y).div_euclid(PX);
        let y1 = (r.bottom() - 1 - self.origin.y).div_euclid(PX);
        for cy in y0.max(0)..=y1.min(self.rows as i32 - 1) {
            for cx in x0.max(0)..=x1.min(self.cols as i32 - 1) {
                out.push((cx as usize, cy as usize + MAP_ROW));
            }
        }
        out
    }

    /// World pixel at the center of a map cell.
    fn sample(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(
            (self.origin.x + col as i32 * PX + PX / 2) as f32,
            (self.origin.y + (row - MAP_ROW) as i32 * PX + PX / 2) as f32,
        )
    }
}

/// Nearer clouds are brighter.
fn cloud_shade(depth: f32) -> Color {
    let lift = (depth * 80.0) as u8;
    Color::Rgb { r: 60 + lift, g: 72 + lift, b: 96 + lift }
}

/// Shade the open sky cells under a cloud; terrain stays in front.
fn paint_cloud(buf: &mut FrameBuffer, view: &View, rect: &Rect, bg: Color) {
    for (x, y) in view.cells_of(rect) {
        let under = buf.get(x, y);
        if under.bg == SKY && under.ch == ' ' {
            buf.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

/// Darken a color toward black by a fade alpha (0 clear, 255 black).
fn fade(color: Color, alpha: u8) -> Color {
    if alpha == 0 {
        return color;
    }
    let keep = 255 - alpha as u16;
    let scale = |c: u8| (c as u16 * keep / 255) as u8;
    match color {
        Color::Rgb { r, g, b } => Color::Rgb { r: scale(r), g: scale(g), b: scale(b) },
        _ if alpha > 127 => Color::Black,
        other => other,
    }
}

fn tile_look(tile: &Tile) -> (char, Color, Color) {
    match tile.kind {
        TileKind::Grass => {
            // Variants whose top edge is open show the grass tuft.
            let open_top = matches!(tile.variant, 0 | 1 | 2 | 9 | 10 | 11 | 13 | 15);
            if open_top {
                ('▀', Color::Rgb { r: 90, g: 200, b: 70 }, Color::Rgb { r: 110, g: 75, b: 40 })
            } else {
                ('░', Color::Rgb { r: 140, g: 100, b: 55 }, Color::Rgb { r: 110, g: 75, b: 40 })
            }
        }
        TileKind::Stone => ('▓', Color::Rgb { r: 150, g: 150, b: 160 }, Color::Rgb { r: 80, g: 80, b: 90 }),
        TileKind::Obstacle => ('█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        TileKind::Bridge => ('═', Color::Rgb { r: 180, g: 130, b: 70 }, SKY),
        TileKind::Barrel if tile.is_exploded() => ('✸', AMBER, Color::Rgb { r: 160, g: 40, b: 20 }),
        TileKind::Barrel => ('◘', Color::Rgb { r: 230, g: 80, b: 40 }, Color::Rgb { r: 90, g: 40, b: 20 }),
        TileKind::Ladder => ('╫', Color::Rgb { r: 200, g: 160, b: 90 }, SKY),
        TileKind::Trap => ('▲', Color::Rgb { r: 220, g: 220, b: 230 }, SKY),
        TileKind::Tree => ('♣', Color::Rgb { r: 50, g: 150, b: 60 }, Color::Rgb { r: 25, g: 70, b: 35 }),
        TileKind::Decor => ('"', Color::Rgb { r: 120, g: 190, b: 90 }, SKY),
        TileKind::Cave => (' ', Color::Black, Color::Rgb { r: 15, g: 12, b: 20 }),
        TileKind::Portal if tile.variant == 0 => ('@', Color::Rgb { r: 200, g: 90, b: 255 }, Color::Rgb { r: 60, g: 20, b: 80 }),
        TileKind::Portal => ('▒', Color::DarkGrey, SKY),
        TileKind::Checkpoint => ('⚑', AMBER, SKY),
        TileKind::Ammo => ('•', AMBER, SKY),
        TileKind::Spawner => (' ', SKY, SKY),
    }
}

fn particle_look(p: &Particle) -> (char, Color) {
    match p.kind {
        ParticleKind::Dust => ('·', Color::Rgb { r: 230, g: 230, b: 230 }),
        ParticleKind::Leaf => ('`', Color::Rgb { r: 110, g: 200, b: 80 }),
        ParticleKind::Smoke => ('▒', Color::Rgb { r: 150, g: 150, b: 150 }),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    clouds: Clouds,
    /// The terminal reports key releases.
    enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            clouds: Clouds::new(&mut rand::thread_rng(), CLOUD_COUNT),
            enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn keyboard_enhanced(&self) -> bool {
        self.enhanced
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &World) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        match world.phase {
            Phase::Start => self.compose_start(world),
            Phase::Play => {
                self.clouds.update();
                self.compose_play(world);
            }
            Phase::Pause => {
                self.compose_play(world);
                self.compose_menu(world, "PAUSED", 6);
            }
            Phase::GameOver => {
                self.front.put_centered(3, "MISSION FAILED", Color::Rgb { r: 255, g: 60, b: 60 }, BASE_BG);
                self.front.put_centered(5, &format!("Score {:05}", world.score), Color::White, BASE_BG);
                self.compose_menu(world, "", 8);
            }
            Phase::MissionComplete => {
                self.front.put_centered(3, "MISSION COMPLETE", AMBER, BASE_BG);
                self.front.put_centered(5, &format!("Score {:05}", world.score), Color::White, BASE_BG);
                self.compose_menu(world, "", 8);
            }
        }

        let alpha = world.transition.alpha();
        if alpha > 0 {
            for cell in &mut self.front.cells {
                cell.fg = fade(cell.fg, alpha);
                cell.bg = fade(cell.bg, alpha);
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut need_move = true;
        let mut last_x = 0;
        let mut last_y = 0;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn view(&self, world: &World) -> View {
        let mut origin = world.render_scroll();
        if world.screenshake > 0 {
            let s = world.screenshake as f32;
            let mut rng = rand::thread_rng();
            origin.x += (rng.gen::<f32>() * s - s / 2.0) as i32;
            origin.y += (rng.gen::<f32>() * s - s / 2.0) as i32;
        }
        let max_cols = (VIEW_W / PX) as usize;
        let max_rows = ((VIEW_H + PX - 1) / PX) as usize;
        View {
            origin,
            cols: self.front.width.min(max_cols),
            rows: self.front.height.saturating_sub(MAP_ROW + 1).min(max_rows),
        }
    }

    fn compose_play(&mut self, w: &World) {
        let view = self.view(w);

        // ── HUD row ──
        let hearts: String = (0..START_LIVES)
            .map(|i| if i < w.lives { '♥' } else { '♡' })
            .collect();
        let hud = format!(" LEVEL {:<3} {}   SCORE {:05} ", w.level + 1, hearts, w.score);
        for x in 0..view.cols {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, HUD_BG));
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Terrain ──
        for row in MAP_ROW..MAP_ROW + view.rows {
            for col in 0..view.cols {
                let cell = view.sample(col, row).cell(w.tilemap.tile_size);
                let look = match w.tilemap.get(cell) {
                    Some(tile) => {
                        let (ch, fg, bg) = tile_look(tile);
                        Cell::new(ch, fg, bg)
                    }
                    None => Cell::new(' ', Color::White, SKY),
                };
                self.front.set(col, row, look);
            }
        }

        // ── Clouds, only where sky shows through ──
        for (rect, depth) in self.clouds.rects(view.origin, VIEW_W, VIEW_H) {
            paint_cloud(&mut self.front, &view, &rect, cloud_shade(depth));
        }

        // ── Off-grid decoration and markers ──
        for tile in w.tilemap.offgrid_tiles().iter().chain(&w.portals).chain(&w.checkpoints).chain(&w.ammo) {
            let (ch, fg, bg) = tile_look(tile);
            for (x, y) in view.cells_of(&tile.rect()) {
                self.front.set(x, y, Cell::new(ch, fg, bg));
            }
        }

        // ── Entities ──
        for enemy in &w.enemies {
            let ch = match enemy.action {
                EnemyAction::Dead => 'x',
                EnemyAction::Shoot => '⌐',
                _ if enemy.body.flip => '◄',
                _ => '►',
            };
            for (x, y) in view.cells_of(&enemy.rect()) {
                self.front.stamp(x, y, ch, Color::Rgb { r: 255, g: 90, b: 90 });
            }
        }

        for p in w.player_projectiles.iter().chain(&w.enemy_projectiles) {
            if !p.is_removed() {
                let fg = match p.team {
                    Team::Player => AMBER,
                    Team::Enemy => Color::Rgb { r: 255, g: 90, b: 90 },
                };
                if let Some((x, y)) = view.cell_of(p.pos.x as i32, p.pos.y as i32) {
                    self.front.stamp(x, y, '-', fg);
                }
            }
            for spark in &p.sparks {
                if let Some((x, y)) = view.cell_of(spark.pos.x as i32, spark.pos.y as i32) {
                    self.front.stamp(x, y, '*', Color::White);
                }
            }
        }

        let player_ch = match w.player.action {
            PlayerAction::Dead => 'X',
            PlayerAction::WallSlide => '‖',
            PlayerAction::Jump => '^',
            _ if w.player.body.flip => '◀',
            _ => '▶',
        };
        for (x, y) in view.cells_of(&w.player.rect()) {
            self.front.stamp(x, y, player_ch, Color::Rgb { r: 100, g: 200, b: 255 });
        }

        // ── Particles ──
        let mut particles: Vec<&Particle> = w.player.particles.iter().collect();
        for tile in w.tilemap.offgrid_tiles().iter().chain(&w.portals) {
            match &tile.special {
                Special::Tree(tree) => particles.extend(tree.leaves.iter()),
                Special::Portal(portal) => particles.extend(portal.smoke.iter()),
                _ => {}
            }
        }
        for tile in w.tilemap.tiles() {
            if let Special::Barrel(barrel) = &tile.special {
                particles.extend(barrel.smoke.iter());
            }
        }
        for p in particles {
            let (ch, fg) = particle_look(p);
            if let Some((x, y)) = view.cell_of(p.pos.x as i32, p.pos.y as i32) {
                self.front.stamp(x, y, ch, fg);
            }
        }
    }

    fn compose_start(&mut self, w: &World) {
        let title = [
            r"     _  ___     _  ___  ",
            r"    | |/ _ \   | |/ _ \ ",
            r" _  | | (_) |_ | | (_) |",
            r"| |_| |\___/| |_| |\___/ ",
            r" \___/       \___/      ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_centered(1 + i, line, AMBER, BASE_BG);
        }
        self.compose_menu(w, "", 8);

        let help = [
            "←→ move   ↑ jump   ↓ climb",
            "X shoot   C dash   ESC pause",
        ];
        for (i, line) in help.iter().enumerate() {
            self.front.put_centered(14 + i, line, Color::DarkGrey, BASE_BG);
        }
    }

    fn compose_menu(&mut self, w: &World, title: &str, top: usize) {
        if !title.is_empty() {
            self.front.put_centered(top, title, AMBER, BASE_BG);
        }
        for (i, item) in w.menu.items().iter().enumerate() {
            let selected = i == w.menu.selected();
            let label = if selected {
                format!("▸ {} ◂", item.label())
            } else {
                format!("  {}  ", item.label())
            };
            let fg = if selected { HI } else { Color::White };
            self.front.put_centered(top + 2 + i, &label, fg, BASE_BG);
        }
    }
}
