//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! Pure, no I/O. Only the visible rows below the skyline are drawn; the buffer
//! rows above it exist for spawning and never show on screen.

use crate::core::{GameSnapshot, MatrixSnapshot, Tetrimino};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Phase, PieceKind, TetrisColor, PLAYFIELD_WIDTH, SKYLINE};

const PLAYFIELD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

pub struct GameView {
    /// Playfield cell width in terminal columns.
    cell_w: u16,
    /// Playfield cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
    ghost: bool,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 roughly squares the cells in common terminal fonts
        Self::new(2, 1)
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
            ghost: true,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    pub fn with_ghost(mut self, ghost: bool) -> Self {
        self.ghost = ghost;
        self
    }

    /// Render into an existing framebuffer, resizing it to `viewport`.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let board_w = PLAYFIELD_WIDTH as u16 * self.cell_w;
        let board_h = SKYLINE as u16 * self.cell_h;
        let frame_w = board_w + 2;
        let frame_h = board_h + 2;

        let origin_x = viewport.width.saturating_sub(frame_w) / 2;
        let origin_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };
        let board = Board {
            view: self,
            x: origin_x + 1,
            y: origin_y + 1,
        };

        draw_border(
            fb,
            origin_x,
            origin_y,
            frame_w,
            frame_h,
            CellStyle::plain(Rgb::new(200, 200, 200), PANEL_BG),
        );

        let cells = snap.matrix_view();
        let ghost = self.ghost_cells(snap, &cells);
        for y in 0..SKYLINE {
            for x in 0..PLAYFIELD_WIDTH {
                let color = cells
                    .cell(x, y)
                    .map(|c| c.resolve())
                    .unwrap_or_default();
                if !color.is_empty() {
                    board.fill(fb, x, y, '█', CellStyle {
                        bold: true,
                        ..CellStyle::plain(color.into(), PLAYFIELD_BG)
                    });
                } else if ghost.contains(&(x, y)) {
                    board.fill(fb, x, y, '░', CellStyle {
                        dim: true,
                        ..CellStyle::plain(Rgb::new(140, 140, 140), PLAYFIELD_BG)
                    });
                } else {
                    board.fill(fb, x, y, '·', CellStyle {
                        dim: true,
                        ..CellStyle::plain(Rgb::new(90, 90, 100), PLAYFIELD_BG)
                    });
                }
            }
        }

        self.draw_side_panel(fb, snap, viewport, origin_x + frame_w + 2, origin_y);

        if snap.phase == Phase::GameOver {
            let text = "GAME OVER";
            let x = origin_x + frame_w.saturating_sub(text.len() as u16) / 2;
            let style = CellStyle {
                bold: true,
                ..CellStyle::plain(Rgb::new(255, 255, 255), PANEL_BG)
            };
            fb.put_str(x, origin_y + frame_h / 2, text, style);
        }
    }

    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    /// Visible cells of the landing preview that are not already covered.
    fn ghost_cells(&self, snap: &GameSnapshot, cells: &MatrixSnapshot) -> Vec<(u8, u8)> {
        let (Some(active), Some(ghost_y), true) = (snap.active, snap.ghost_y, self.ghost) else {
            return Vec::new();
        };
        if ghost_y == active.y {
            return Vec::new();
        }
        let landed = Tetrimino { y: ghost_y, ..active };
        landed
            .cells()
            .into_iter()
            .filter(|&(x, y)| x >= 0 && y >= 0 && y < SKYLINE as i8)
            .map(|(x, y)| (x as u8, y as u8))
            .filter(|&(x, y)| {
                cells
                    .cell(x, y)
                    .map_or(false, |c| c.background == TetrisColor::Empty)
            })
            .collect()
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        viewport: Viewport,
        panel_x: u16,
        top: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle {
            bold: true,
            ..CellStyle::plain(Rgb::new(220, 220, 220), PANEL_BG)
        };
        let value = CellStyle::plain(Rgb::new(200, 200, 200), PANEL_BG);

        let mut y = top;
        for (name, number) in [("SCORE", snap.score), ("LEVEL", snap.level), ("LINES", snap.lines)] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x, y + 1, number, value);
            y += 3;
        }

        fb.put_str(panel_x, y, "HOLD", label);
        let hold_style = if snap.can_hold {
            value
        } else {
            CellStyle { dim: true, ..value }
        };
        let hold = snap.hold.map_or_else(|| "-".to_string(), letter);
        fb.put_str(panel_x, y + 1, &hold, hold_style);
        y += 3;

        fb.put_str(panel_x, y, "NEXT", label);
        for (i, kind) in snap.next.iter().enumerate() {
            let style = if i == 0 { piece_style(*kind) } else { value };
            fb.put_str(panel_x, y + 1 + i as u16, &letter(*kind), style);
        }
        y += snap.next.len() as u16 + 2;

        fb.put_str(panel_x, y, "PHASE", label);
        fb.put_str(panel_x, y + 1, snap.phase.as_str(), value);
    }
}

fn letter(kind: PieceKind) -> String {
    kind.as_str().to_ascii_uppercase()
}

fn piece_style(kind: PieceKind) -> CellStyle {
    CellStyle {
        bold: true,
        ..CellStyle::plain(kind.color().into(), PANEL_BG)
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

/// Inner playfield area. Matrix row 0 is the bottom screen row.
struct Board<'a> {
    view: &'a GameView,
    x: u16,
    y: u16,
}

impl Board<'_> {
    fn fill(&self, fb: &mut FrameBuffer, cell_x: u8, cell_y: u8, ch: char, style: CellStyle) {
        let row = (SKYLINE - 1 - cell_y) as u16;
        let px = self.x + cell_x as u16 * self.view.cell_w;
        let py = self.y + row * self.view.cell_h;
        fb.fill_rect(px, py, self.view.cell_w, self.view.cell_h, ch, style);
    }
}
