/// Rendering layer — all terminal I/O lives here.
///
/// The core hands over a draw list in playfield units; this module scales it
/// onto the terminal grid and blits one glyph (or block) per item.  No game
/// logic is performed here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::DVec2;

use homing_shooter::entities::{DrawItem, EnemyLook, Sprite, World};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Cyan;
const C_ENEMY_BLOCK: Color = Color::Red;
const C_BULLET: Color = Color::Green;
const C_HUD: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// Idle cycle for the player, one glyph per animation frame.
const PLAYER_FRAMES: &[&str] = &["☺", "☻", "☺", "◉"];

// ── Viewport ─────────────────────────────────────────────────────────────────

/// Maps the logical playfield onto the terminal cells below the HUD row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Row 0 is the HUD, so the playfield gets `term_rows - 1` rows.
    pub fn new(term_cols: u16, term_rows: u16, width: f64, height: f64) -> Self {
        Self {
            cols: term_cols.max(1),
            rows: term_rows.saturating_sub(1).max(1),
            width,
            height,
        }
    }

    /// Terminal cell for a playfield point, or `None` when it is off screen.
    pub fn to_cell(&self, pos: DVec2) -> Option<(u16, u16)> {
        let col = (pos.x / self.width * self.cols as f64).floor();
        let row = (pos.y / self.height * self.rows as f64).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f64 || row >= self.rows as f64 {
            return None;
        }
        Some((col as u16, row as u16 + 1))
    }

    /// Playfield point at the top-left of a terminal cell (mouse reports).
    pub fn to_playfield(&self, col: u16, row: u16) -> DVec2 {
        let row = row.saturating_sub(1);
        DVec2::new(
            col as f64 * self.width / self.cols as f64,
            row as f64 * self.height / self.rows as f64,
        )
    }

    /// How many cells a playfield length covers horizontally and vertically.
    fn span(&self, len: f64) -> (u16, u16) {
        let w = (len / self.width * self.cols as f64).round().max(1.0);
        let h = (len / self.height * self.rows as f64).round().max(1.0);
        (w as u16, h as u16)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    world: &World,
    items: &[DrawItem],
    viewport: &Viewport,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_hud(out, world)?;

    for item in items {
        draw_item(out, item, world.config.enemy_hitbox, viewport)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, 0))?;
    out.flush()?;
    Ok(())
}

/// FPS readout goes in the terminal title, like a window title bar.
pub fn set_title<W: Write>(out: &mut W, fps: f64) -> std::io::Result<()> {
    out.queue(terminal::SetTitle(format!("Homing Shooter | {:.2}fps", fps)))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, world: &World) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!(
        "Enemies: {:>2}  Bullets: {:>4}",
        world.enemies.len(),
        world.bullets.len()
    )))?;

    out.queue(cursor::MoveTo(34, 0))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("WASD : Move   MOUSE : Aim & Shoot   Q : Quit"))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_item<W: Write>(
    out: &mut W,
    item: &DrawItem,
    hitbox: f64,
    viewport: &Viewport,
) -> std::io::Result<()> {
    let Some((col, row)) = viewport.to_cell(item.pos) else {
        return Ok(());
    };

    match item.sprite {
        Sprite::Player { frame } => {
            let glyph = PLAYER_FRAMES[frame % PLAYER_FRAMES.len()];
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_PLAYER))?;
            out.queue(Print(glyph))?;
        }
        Sprite::Enemy(EnemyLook::Sprite) => {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_ENEMY))?;
            out.queue(Print("Ѻ"))?;
        }
        Sprite::Enemy(EnemyLook::FilledRect) => {
            // Block the size of the hit box, clipped at the right and bottom.
            let (w, h) = viewport.span(hitbox);
            let w = w.min(viewport.cols - col);
            let h = h.min(viewport.rows + 1 - row);
            out.queue(style::SetForegroundColor(C_ENEMY_BLOCK))?;
            for dy in 0..h {
                out.queue(cursor::MoveTo(col, row + dy))?;
                out.queue(Print("█".repeat(w as usize)))?;
            }
        }
        Sprite::Bullet => {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_BULLET))?;
            out.queue(Print("•"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        // 128 columns, 72 playfield rows → 10 units per cell.
        Viewport::new(128, 73, 1280.0, 720.0)
    }

    #[test]
    fn playfield_rows_exclude_hud() {
        let v = viewport();
        assert_eq!(v.cols, 128);
        assert_eq!(v.rows, 72);
    }

    #[test]
    fn to_cell_scales_and_skips_hud_row() {
        let v = viewport();
        assert_eq!(v.to_cell(DVec2::new(0.0, 0.0)), Some((0, 1)));
        assert_eq!(v.to_cell(DVec2::new(105.0, 100.0)), Some((10, 11)));
        assert_eq!(v.to_cell(DVec2::new(1279.0, 719.0)), Some((127, 72)));
    }

    #[test]
    fn to_cell_rejects_off_screen() {
        let v = viewport();
        assert_eq!(v.to_cell(DVec2::new(-0.5, 10.0)), None);
        assert_eq!(v.to_cell(DVec2::new(10.0, 720.0)), None);
        assert_eq!(v.to_cell(DVec2::new(1280.0, 10.0)), None);
    }

    #[test]
    fn to_playfield_inverts_to_cell() {
        let v = viewport();
        let p = v.to_playfield(10, 11);
        assert_eq!(p, DVec2::new(100.0, 100.0));
        assert_eq!(v.to_cell(p), Some((10, 11)));
    }

    #[test]
    fn mouse_on_hud_row_maps_to_top_edge() {
        let v = viewport();
        assert_eq!(v.to_playfield(0, 0).y, 0.0);
    }

    #[test]
    fn span_is_at_least_one_cell() {
        let v = viewport();
        assert_eq!(v.span(32.0), (3, 3));
        assert_eq!(v.span(1.0), (1, 1));
    }

    #[test]
    fn render_writes_into_buffer() {
        let world = World::default();
        let items = homing_shooter::compute::render(&world);
        let mut buf: Vec<u8> = Vec::new();
        render(&mut buf, &world, &items, &viewport()).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("Enemies:  0"));
        assert!(text.contains("☺"));
    }
}
