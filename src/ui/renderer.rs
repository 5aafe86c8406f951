/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// Entities live at float world positions; each is snapped to its nearest
/// map cell for drawing. One map cell = 2 terminal columns. World Y grows
/// upward, terminal rows grow downward, so the row index is flipped.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::animation::{Sheet, SpriteCell};
use crate::domain::entity::{AnimState, Facing};
use crate::domain::tile::Tile;
use crate::domain::units::{to_sprite_units, SPRITE_SIZE_WORLD_UNIT};
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// On VTE-based Linux terminals the inter-row gap pixels use the
    /// background color from the last Clear or the terminal's configured
    /// default. Using the SAME explicit RGB for both `Clear(ClearType::All)`
    /// and every cell's background keeps the gap color identical to the
    /// cell color, eliminating visible horizontal lines.
    const BASE_BG: Color = Color::Rgb { r: 16, g: 24, b: 16 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        if self.ch_len == 0 {
            return "";
        }
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
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
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Each map cell = 2 terminal columns.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
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
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Force a full repaint on the next render.
    pub fn invalidate(&mut self) {
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
        }

        // Phase change → clear for a clean transition
        let phase_changed = self.last_phase != Some(world.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();

        match world.phase {
            Phase::Title => self.compose_title(),
            Phase::Playing => self.compose_game(world),
            Phase::GameOver => {
                self.compose_game(world);
                self.compose_end_overlay(world, "✕  YOU  FELL  ✕", Color::Rgb { r: 255, g: 60, b: 60 });
            }
            Phase::Victory => {
                self.compose_game(world);
                self.compose_end_overlay(world, "★  GLADE  CLEARED  ★", Color::Rgb { r: 255, g: 220, b: 50 });
            }
        }

        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // IMPORTANT: Do NOT use ResetColor here — it resets to the terminal's
        // native default, which may differ from BASE_BG and cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell == prev {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        let buf_w = self.front.width;

        // ── HUD row ──
        let hearts: String = (0..w.combat.player_max_health)
            .map(|i| if (i as u32) < w.player.health { '♥' } else { '♡' })
            .take(20)
            .collect();
        let mut hud = format!(
            " Glade Fray   {}   Foes:{:<2} ",
            hearts,
            w.live_enemy_count()
        );
        if w.show_coords {
            hud.push_str(&format!(
                " @({:.1},{:.1})",
                to_sprite_units(w.player.pos.x),
                to_sprite_units(w.player.pos.y)
            ));
        }
        let hud_bg = Color::Rgb { r: 20, g: 40, b: 20 };
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::from_char(' ', Color::White, hud_bg));
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);

        // ── Map ──
        for gy in 0..w.level.rows() {
            let row = MAP_ROW + gy;
            if row >= self.front.height {
                break;
            }
            for gx in 0..w.level.cols() {
                let col = gx * CELL_W;
                if col + 1 >= buf_w {
                    break;
                }
                self.compose_tile(w, gx, gy, col, row);
            }
        }

        // ── Entities (drawn over tiles) ──
        for e in &w.enemies {
            if !e.is_alive() {
                continue; // corpses are not drawn
            }
            let (c0, c1, fg) = enemy_glyphs(e.kind.sheet(), e.anim.state(), e.anim.cell(e.kind.sheet()), e.facing);
            self.draw_entity(w, e.pos.x, e.pos.y, c0, c1, fg);
        }

        let p = &w.player;
        if p.is_alive() {
            let (c0, c1, fg) = hero_glyphs(p.anim.state(), p.anim.cell(Sheet::Hero), p.facing);
            self.draw_entity(w, p.pos.x, p.pos.y, c0, c1, fg);
        }

        // ── Transient effect (one per frame, from the queue) ──
        if let Some(fx) = &w.current_effect {
            let glyph = sword_glyph(fx.cell);
            self.draw_entity(w, fx.pos.x, fx.pos.y, glyph, ' ', Color::Rgb { r: 255, g: 230, b: 120 });
        }

        // ── Debug grid overlay ──
        if w.show_grid {
            for gy in 0..w.level.rows() {
                let row = MAP_ROW + gy;
                if row >= self.front.height {
                    break;
                }
                for gx in 0..w.level.cols() {
                    let col = gx * CELL_W + 1;
                    if col >= buf_w {
                        break;
                    }
                    let mut cell = self.front.get(col, row);
                    cell = Cell::from_char('·', Color::DarkGrey, cell.bg);
                    self.front.set(col, row, cell);
                }
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + w.level.rows() + 1;
        if msg_row < self.front.height && !w.message.is_empty() {
            let msg = format!(" ◈ {} ", w.message);
            let bar_bg = Color::Rgb { r: 200, g: 180, b: 50 };
            for x in 0..buf_w {
                self.front.set(x, msg_row, Cell::from_char(' ', Color::Black, bar_bg));
            }
            self.front.put_str(0, msg_row, &msg, Color::Black, bar_bg);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + w.level.rows() + 3;
        if help_row < self.front.height {
            let help = " ←→↑↓/WASD:Move  F/X:Attack  Space:Jump  M:Music  R:Restart  ESC:Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_tile(&mut self, w: &WorldState, gx: usize, gy: usize, col: usize, row: usize) {
        let (c0, c1, fg, bg) = match w.level.tile_at_grid(gx, gy) {
            Tile::Grass => (' ', ' ', Color::Reset, Color::Rgb { r: 22, g: 44, b: 22 }),
            Tile::Path => ('░', '░', Color::Rgb { r: 150, g: 120, b: 70 }, Color::Rgb { r: 90, g: 70, b: 40 }),
            Tile::Water => ('~', '~', Color::Rgb { r: 90, g: 160, b: 255 }, Color::Rgb { r: 10, g: 30, b: 80 }),
            Tile::Rock => ('▲', '▲', Color::Rgb { r: 150, g: 150, b: 150 }, Color::Rgb { r: 60, g: 60, b: 60 }),
            Tile::Tree => ('♠', '♠', Color::Rgb { r: 40, g: 160, b: 40 }, Color::Rgb { r: 10, g: 40, b: 10 }),
        };
        self.front.set(col, row, Cell::from_char(c0, fg, bg));
        self.front.set(col + 1, row, Cell::from_char(c1, fg, bg));
    }

    /// Draw a two-character entity glyph at a world position, snapped to
    /// the nearest map cell.
    fn draw_entity(&mut self, w: &WorldState, wx: f32, wy: f32, c0: char, c1: char, fg: Color) {
        let gx = (wx / SPRITE_SIZE_WORLD_UNIT).round() as i64;
        let gy_up = (wy / SPRITE_SIZE_WORLD_UNIT).round() as i64;
        if gx < 0 || gy_up < 0 || gx as usize >= w.level.cols() || gy_up as usize >= w.level.rows() {
            return;
        }
        let row = MAP_ROW + (w.level.rows() - 1 - gy_up as usize);
        let col = gx as usize * CELL_W;
        if row >= self.front.height || col + 1 >= self.front.width {
            return;
        }
        // Keep the tile's background under the entity
        let bg = self.front.get(col, row).bg;
        self.front.set(col, row, Cell::from_char(c0, fg, bg));
        self.front.set(col + 1, row, Cell::from_char(c1, fg, bg));
    }

    // ── Static screens ──

    fn compose_title(&mut self) {
        let title = [
            r"   ___  _            _       ___                ",
            r"  / __|| | __ _  __| | ___ | __| _ _  __ _  _  _ ",
            r" | (_ || |/ _` |/ _` |/ -_)| _| | '_|/ _` || || |",
            r"  \___||_|\__,_|\__,_|\___||_|  |_|  \__,_| \_, |",
            r"                                            |__/ ",
        ];

        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, Color::Rgb { r: 120, g: 255, b: 120 }, Color::Reset);
        }

        let subtitle = "◈◈  A fight in the forest glade  ◈◈";
        let sx = 2 + (title[1].len().saturating_sub(subtitle.len())) / 2;
        self.front.put_str(sx, 8, subtitle, Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset);

        let menu_base = 11;
        let hi = Color::Rgb { r: 80, g: 255, b: 80 };

        self.front.put_str(8, menu_base, "ENTER   Enter the glade", hi, Color::Reset);
        self.front.put_str(8, menu_base + 1, "  Q     Quit", Color::White, Color::Reset);

        let help = [
            "Controls",
            "  ←→↑↓ / WASD   Move          F/X  Attack",
            "  SPACE         Jump          M    Music on/off",
            "  G  Grid       P  Coords     R    Restart",
            "  Pad: D-pad/Stick Move   X/R1 Attack   A Jump",
        ];
        let help_base = menu_base + 3;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 {
                Color::Rgb { r: 255, g: 200, b: 50 }
            } else {
                Color::White
            };
            self.front.put_str(8, help_base + i, line, color, Color::Reset);
        }
    }

    /// Centered boxed banner over the frozen game view (game over / victory).
    fn compose_end_overlay(&mut self, w: &WorldState, label: &str, fg: Color) {
        let inner = label.chars().count() + 4;
        let top: String = std::iter::once('╔')
            .chain(std::iter::repeat('═').take(inner))
            .chain(std::iter::once('╗'))
            .collect();
        let mid = format!("║  {}  ║", label);
        let prompt = format!("║{:^w$}║", "R: Restart   ESC: Quit", w = inner);
        let bottom: String = std::iter::once('╚')
            .chain(std::iter::repeat('═').take(inner))
            .chain(std::iter::once('╝'))
            .collect();

        let view_cols = w.level.cols() * CELL_W;
        let cx = view_cols.saturating_sub(top.chars().count()) / 2;
        let cy = MAP_ROW + w.level.rows() / 2 - 1;
        let bg = Color::Rgb { r: 30, g: 30, b: 30 };
        self.front.put_str(cx, cy, &top, fg, bg);
        self.front.put_str(cx, cy + 1, &mid, fg, bg);
        self.front.put_str(cx, cy + 2, &prompt, Color::Rgb { r: 80, g: 255, b: 80 }, bg);
        self.front.put_str(cx, cy + 3, &bottom, fg, bg);
    }
}

// ── Entity glyphs ──

/// Hero: '@' body plus a second char animated from the sprite cell.
fn hero_glyphs(state: AnimState, cell: SpriteCell, facing: Facing) -> (char, char, Color) {
    let gold = Color::Rgb { r: 255, g: 210, b: 90 };
    let frame = frame_index(Sheet::Hero, state, cell);
    match state {
        AnimState::Idle => {
            let face = if facing == Facing::Left { '<' } else { '>' };
            ('@', face, gold)
        }
        AnimState::Running => {
            let legs = ['/', '|', '\\'][frame % 3];
            ('@', legs, gold)
        }
        AnimState::Jump => ('@', '^', gold),
        AnimState::Fight => {
            let blade = ['/', '-', '\\', '|'][frame % 4];
            ('@', blade, Color::Rgb { r: 255, g: 240, b: 160 })
        }
        AnimState::Dead => ('%', ' ', Color::Rgb { r: 140, g: 140, b: 140 }),
    }
}

/// Enemies: kind letter plus animated second char.
fn enemy_glyphs(sheet: Sheet, state: AnimState, cell: SpriteCell, facing: Facing) -> (char, char, Color) {
    let (body, color) = match sheet {
        Sheet::Skeleton => ('s', Color::Rgb { r: 220, g: 220, b: 200 }),
        Sheet::Monster => ('M', Color::Rgb { r: 255, g: 90, b: 90 }),
        _ => ('?', Color::White),
    };
    let frame = frame_index(sheet, state, cell);
    let second = match state {
        AnimState::Running | AnimState::Fight => ['/', '|', '\\', '|'][frame % 4],
        _ => {
            if frame % 2 == 0 {
                if facing == Facing::Left { '<' } else { '>' }
            } else {
                ' '
            }
        }
    };
    (body, second, color)
}

/// Sword-swing transient: slash direction follows the sheet column.
fn sword_glyph(cell: SpriteCell) -> char {
    match cell.col {
        0 => '/',
        1 => '-',
        2 => '\\',
        _ => '|',
    }
}

/// Position of a cell within its state's sequence (0 if not found).
fn frame_index(sheet: Sheet, state: AnimState, cell: SpriteCell) -> usize {
    sheet
        .sequence(state)
        .iter()
        .position(|c| *c == cell)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sword_glyphs_follow_sheet_columns() {
        assert_eq!(sword_glyph(SpriteCell { col: 0, row: 2 }), '/');
        assert_eq!(sword_glyph(SpriteCell { col: 1, row: 2 }), '-');
        assert_eq!(sword_glyph(SpriteCell { col: 2, row: 2 }), '\\');
        assert_eq!(sword_glyph(SpriteCell { col: 3, row: 2 }), '|');
    }

    #[test]
    fn running_hero_cycles_leg_glyphs() {
        let seq = Sheet::Hero.sequence(AnimState::Running);
        let mut seen = std::collections::HashSet::new();
        for &cell in seq {
            let (_, legs, _) = hero_glyphs(AnimState::Running, cell, Facing::Right);
            seen.insert(legs);
        }
        assert_eq!(seen.len(), seq.len());
    }

    #[test]
    fn dead_player_is_not_drawn() {
        let config = crate::config::GameConfig::default();
        let mut world = WorldState::new(config.combat.clone(), config.speed.clone());
        world.phase = Phase::Playing;

        let mut r = Renderer::new();
        r.front.resize(80, 30);

        let hero_cell = |r: &Renderer| {
            r.front
                .cells
                .iter()
                .any(|c| c.as_str() == "@" || c.as_str() == "%")
        };

        r.compose_game(&world);
        assert!(hero_cell(&r));

        world.player.lose_health(u32::MAX);
        r.front.clear();
        r.compose_game(&world);
        assert!(!hero_cell(&r));
    }
}
