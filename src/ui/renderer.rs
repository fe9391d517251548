/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer (array of Cell)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Every glyph drawn here is single-width, so a cell is exactly one column.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::solver::SolutionMode;
use crate::sim::app::{AppState, Screen};
use crate::store::{now_secs, LeaderboardEntry};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" cells, so the Clear colour
    /// and the cell colour always match.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 22, b: 32 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell, so every position gets diffed.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = if bg == Color::Reset { Self::BASE_BG } else { bg };
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

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Paint a full-width bar, then text on it.
    fn bar(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', fg, bg));
        }
        self.put_str(0, y, s, fg, bg);
    }
}

// ── Palette ──

const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const CYAN: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const RED: Color = Color::Rgb { r: 255, g: 90, b: 90 };
const DIM: Color = Color::DarkGrey;
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const CURSOR_BG: Color = Color::Rgb { r: 30, g: 60, b: 30 };
const TILE_BG: Color = Color::Rgb { r: 60, g: 45, b: 25 };

// ── Layout ──

const HUD_ROW: usize = 0;
const BODY_ROW: usize = 2;
/// Rows reserved below the body: gap, message bar, help bar.
const FOOTER_ROWS: usize = 3;
/// Terminal columns per grid letter.
const TILE_W: usize = 4;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
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
        self.sync_size();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Rows available to a scrolling list under a one-line heading.
    pub fn list_rows(&self) -> usize {
        self.term_h.saturating_sub(BODY_ROW + 2 + FOOTER_ROWS).max(1)
    }

    fn sync_size(&mut self) -> bool {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize == self.term_w && th as usize == self.term_h {
            return false;
        }
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        true
    }

    pub fn render(&mut self, app: &AppState) -> io::Result<()> {
        let resized = self.sync_size();
        if resized || self.last_screen != Some(app.screen) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(app.screen);
        }

        self.front.clear();
        self.compose_hud(app);
        match app.screen {
            Screen::Menu => self.compose_menu(app),
            Screen::Playing => self.compose_playing(app),
            Screen::ChallengeList => self.compose_challenge_list(app),
            Screen::Leaderboard => self.compose_leaderboard(app),
            Screen::GlobalBoard => self.compose_global(app),
        }
        self.compose_footer(app);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colours; ResetColor would fall back to the
        // terminal default, which need not match BASE_BG.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
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
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: shared chrome ──

    fn compose_hud(&mut self, app: &AppState) {
        let player = app.user.as_ref().map_or("not signed in", |u| u.label());
        let store = if app.store_ready { "online" } else { "offline" };
        let hud = format!(" WORDGRID  │  {player}  │  scores: {store} ");
        self.front.bar(HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_footer(&mut self, app: &AppState) {
        let h = self.front.height;
        if h < BODY_ROW + FOOTER_ROWS {
            return;
        }
        if !app.message.is_empty() {
            let msg = format!(" ◈ {} ", app.message);
            self.front.bar(h - 2, &msg, Color::Black, MSG_BG);
        }
        let help = match app.screen {
            Screen::Menu => " ENTER/S: Start  4-7: Size  L: Load  B: Board  G: Global  P: Populate  I: Sign in/out  Q: Quit",
            Screen::Playing => " Type a word  ENTER: Guess  BKSP: Delete  F2: Leaderboard  ESC: Stop",
            Screen::ChallengeList => " ↑↓: Select  ENTER: Play  B: Leaderboard  P: Populate  ESC: Back",
            Screen::Leaderboard | Screen::GlobalBoard => " ↑↓: Scroll  ESC: Back",
        };
        self.front.put_str(0, h - 1, help, DIM, Color::Reset);
    }

    // ── Compose: menu and last-game summary ──

    fn compose_menu(&mut self, app: &AppState) {
        let title = [
            "╔═══════════════════════════╗",
            "║     W O R D G R I D       ║",
            "╚═══════════════════════════╝",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(4, BODY_ROW + i, line, GOLD, Color::Reset);
        }

        let base = BODY_ROW + title.len() + 2;
        let size = format!("  4-7   Grid size: {0}x{0}", app.grid_size);
        let store_fg = if app.store_ready { Color::White } else { DIM };
        let sign = if app.user.is_some() { "  I     Sign out" } else { "  I     Sign in" };
        self.front.put_str(6, base, "ENTER   New game", GREEN, Color::Reset);
        self.front.put_str(6, base + 1, &size, Color::White, Color::Reset);
        self.front.put_str(6, base + 2, "  L     Load challenge", store_fg, Color::Reset);
        self.front.put_str(6, base + 3, "  G     Global leaderboard", store_fg, Color::Reset);
        self.front.put_str(6, base + 4, "  P     Populate sample challenges", store_fg, Color::Reset);
        let board_fg = if app.session.challenge().is_some() { store_fg } else { DIM };
        self.front.put_str(6, base + 5, "  B     Leaderboard for this challenge", board_fg, Color::Reset);
        let sign_fg = if app.identity_ready { CYAN } else { DIM };
        self.front.put_str(6, base + 6, sign, sign_fg, Color::Reset);
        self.front.put_str(6, base + 7, "  Q     Quit", Color::White, Color::Reset);

        // Last game, if any
        let s = &app.session;
        if s.solutions().is_empty() && s.found().is_empty() {
            return;
        }
        let top = base + 9;
        let summary = format!(
            "Last game: {} of {} words in {}",
            s.found().len(), s.solutions().len(), fmt_clock(s.elapsed()),
        );
        self.front.put_str(4, top, &summary, GOLD, Color::Reset);
        if let Some(c) = s.challenge() {
            self.front.put_str(4, top + 1, &format!("Challenge: {}", c.name), CYAN, Color::Reset);
        }
        if s.missed().is_empty() {
            self.front.put_str(4, top + 2, "You found every word!", GREEN, Color::Reset);
        } else {
            self.front.put_str(4, top + 2, "Missed:", RED, Color::Reset);
            let width = self.front.width.saturating_sub(8);
            let room = self.front.height.saturating_sub(top + 3 + FOOTER_ROWS);
            for (i, line) in wrap_words(s.missed(), width).iter().take(room).enumerate() {
                self.front.put_str(6, top + 3 + i, line, Color::White, Color::Reset);
            }
        }
    }

    // ── Compose: game in progress ──

    fn compose_playing(&mut self, app: &AppState) {
        let s = &app.session;
        let grid = s.grid();
        let n = grid.size();

        // Grid tiles, one letter centred per TILE_W columns
        for (r, row) in grid.rows().iter().enumerate() {
            let y = BODY_ROW + 1 + r * 2;
            for (c, &letter) in row.iter().enumerate() {
                let x = 2 + c * TILE_W;
                for dx in 0..TILE_W - 1 {
                    self.front.set(x + dx, y, Cell::new(' ', Color::White, TILE_BG));
                }
                self.front.set(x + 1, y, Cell::new(letter, GOLD, TILE_BG));
            }
        }

        let grid_h = n * 2;
        let below = BODY_ROW + 1 + grid_h + 1;
        self.front.put_str(2, below, &app.feedback, CYAN, Color::Reset);
        let line = format!("> {}_", app.input);
        self.front.put_str(2, below + 2, &line, Color::White, Color::Reset);

        // Side panel
        let px = 4 + n * TILE_W + 2;
        let timer = format!("Time   {}", fmt_clock(s.elapsed()));
        let score = format!("Found  {} / {}", s.found().len(), s.solutions().len());
        let clock_fg = if s.timer_active() { Color::White } else { DIM };
        self.front.put_str(px, BODY_ROW + 1, &timer, clock_fg, Color::Reset);
        self.front.put_str(px, BODY_ROW + 2, &score, GREEN, Color::Reset);
        let mode = match (s.mode(), s.challenge()) {
            (SolutionMode::Challenge, Some(c)) => format!("Challenge: {}", c.name),
            _ => "Free play".to_string(),
        };
        self.front.put_str(px, BODY_ROW + 3, &mode, CYAN, Color::Reset);

        let width = self.front.width.saturating_sub(px + 1);
        let room = self.front.height.saturating_sub(BODY_ROW + 5 + FOOTER_ROWS);
        for (i, line) in wrap_words(s.found(), width).iter().take(room).enumerate() {
            self.front.put_str(px, BODY_ROW + 5 + i, line, Color::White, Color::Reset);
        }
    }

    // ── Compose: lists ──

    fn compose_challenge_list(&mut self, app: &AppState) {
        self.front.put_str(2, BODY_ROW, "LOAD CHALLENGE", GOLD, Color::Reset);
        if app.challenges.is_empty() {
            self.front.put_str(4, BODY_ROW + 2, "No challenges yet. Press P to add the samples.", DIM, Color::Reset);
            return;
        }

        let visible = self.list_rows();
        let top = BODY_ROW + 2;
        let now = now_secs();
        for (i, row) in app.challenges.iter().enumerate().skip(app.scroll).take(visible) {
            let y = top + i - app.scroll;
            let c = &row.challenge;
            let high = match &row.high_score {
                Some(e) => format!("best {} by {}", e.score, e.user_name),
                None => "no scores yet".to_string(),
            };
            let size = c.grid.size();
            let mine = app.user.as_ref().is_some_and(|u| c.owner_id.as_deref() == Some(u.id.as_str()));
            let owner = if mine { "*" } else { " " };
            let text = format!(
                "{owner}{:<24} {size}x{size}  {:>3} words  {:<10} {high}",
                c.name, c.solutions.len(), fmt_age(now, c.created_at),
            );
            if i == app.cursor {
                self.front.bar(y, "", GREEN, CURSOR_BG);
                self.front.put_str(0, y, "▸", GREEN, CURSOR_BG);
                self.front.put_str(1, y, &text, GREEN, CURSOR_BG);
            } else {
                self.front.put_str(1, y, &text, Color::White, Color::Reset);
            }
        }
        if app.scroll + visible < app.challenges.len() {
            self.front.put_str(4, top + visible, "▼ ▼ ▼", DIM, Color::Reset);
        }
    }

    fn compose_leaderboard(&mut self, app: &AppState) {
        let title = format!("LEADERBOARD  {}", app.board_title);
        self.front.put_str(2, BODY_ROW, &title, GOLD, Color::Reset);
        let now = now_secs();
        for (i, e) in app.board.iter().enumerate().take(self.list_rows()) {
            let fg = if e.is_demo { DIM } else { Color::White };
            self.front.put_str(2, BODY_ROW + 2 + i, &entry_line(i + 1, e, now), fg, Color::Reset);
        }
    }

    fn compose_global(&mut self, app: &AppState) {
        self.front.put_str(2, BODY_ROW, "GLOBAL LEADERBOARD", GOLD, Color::Reset);
        if app.global.is_empty() {
            self.front.put_str(4, BODY_ROW + 2, "No challenges found.", DIM, Color::Reset);
            return;
        }

        let now = now_secs();
        let mut lines: Vec<(String, Color)> = vec![];
        for board in &app.global {
            let tag = if board.has_real_scores { "" } else { "  (sample scores)" };
            lines.push((format!("{}{tag}", board.challenge.name), CYAN));
            for (i, e) in board.entries.iter().enumerate() {
                let fg = if e.is_demo { DIM } else { Color::White };
                lines.push((entry_line(i + 1, e, now), fg));
            }
            lines.push((String::new(), Color::Reset));
        }

        let visible = self.list_rows();
        let scroll = app.global_scroll.min(lines.len().saturating_sub(1));
        for (i, (text, fg)) in lines.iter().skip(scroll).take(visible).enumerate() {
            self.front.put_str(2, BODY_ROW + 2 + i, text, *fg, Color::Reset);
        }
    }
}

fn entry_line(rank: usize, e: &LeaderboardEntry, now: u64) -> String {
    let demo = if e.is_demo { "  (demo)" } else { "" };
    format!("{rank:>3}. {:<20} {:>4}  {}{demo}", e.user_name, e.score, fmt_age(now, e.timestamp))
}

/// `m:ss`.
fn fmt_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn fmt_age(now: u64, then: u64) -> String {
    let age = now.saturating_sub(then);
    match age {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", age / 60),
        3600..=86_399 => format!("{}h ago", age / 3600),
        _ => format!("{}d ago", age / 86_400),
    }
}

/// Pack words into lines no wider than `width`, two spaces apart.
fn wrap_words(words: &[String], width: usize) -> Vec<String> {
    let mut lines = vec![];
    let mut line = String::new();
    for w in words {
        if !line.is_empty() && line.len() + 2 + w.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push_str("  ");
        }
        line.push_str(w);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn clock_format() {
        assert_eq!(fmt_clock(0), "0:00");
        assert_eq!(fmt_clock(65), "1:05");
        assert_eq!(fmt_clock(600), "10:00");
    }

    #[test]
    fn age_format() {
        assert_eq!(fmt_age(100, 90), "just now");
        assert_eq!(fmt_age(1000, 100), "15m ago");
        assert_eq!(fmt_age(90_000, 0), "1d ago");
        // Clock skew never underflows
        assert_eq!(fmt_age(0, 100), "just now");
    }

    #[test]
    fn wrap_packs_lines() {
        let lines = wrap_words(&words(&["BAT", "CAT", "HAT", "RAT"]), 10);
        assert_eq!(lines, vec!["BAT  CAT", "HAT  RAT"]);
        assert!(wrap_words(&[], 10).is_empty());
        // An overlong word still gets its own line
        assert_eq!(wrap_words(&words(&["ELEPHANT"]), 4), vec!["ELEPHANT"]);
    }

    #[test]
    fn demo_rows_are_marked() {
        let e = LeaderboardEntry {
            id: "d".into(),
            challenge_id: "c".into(),
            user_id: "u".into(),
            user_name: "Alice".into(),
            score: 42,
            timestamp: 0,
            is_demo: true,
        };
        let line = entry_line(1, &e, 0);
        assert!(line.starts_with("  1. Alice"));
        assert!(line.ends_with("(demo)"));
    }
}
