mod display;

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use homing_shooter::compute::{advance, render};
use homing_shooter::config::{BulletRemoval, SimConfig};
use homing_shooter::entities::{FrameInput, MoveKeys, World};

use display::Viewport;

const FRAME: Duration = Duration::from_micros(16_667); // ≈60 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// 8 frames @ 60 FPS ≈ 133 ms, refreshed by any OS key-repeat ≥ 8 Hz.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[char], frame: u64) -> bool {
    keys.iter()
        .any(|c| is_held(key_frame, &KeyCode::Char(*c), frame))
}

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(author, version, about = "Terminal shooter with homing enemies")]
struct Cli {
    /// YAML file overriding the default tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for enemy placement (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Frames between shots while the button is held (0 = every frame)
    #[arg(long)]
    fire_interval: Option<u32>,

    /// Expire bullets at the playfield edge instead of after a fixed distance
    #[arg(long)]
    bounds_removal: bool,

    /// Where log output goes; the level comes from RUST_LOG
    #[arg(long, default_value = "homing_shooter.log")]
    log_file: PathBuf,
}

impl Cli {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_yaml_path(path)?,
            None => SimConfig::default(),
        };
        if let Some(interval) = self.fire_interval {
            config.fire_interval = interval;
        }
        if self.bounds_removal {
            config.bullet_removal = BulletRemoval::Bounds;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Logging is off unless `rust_log` (the RUST_LOG value) is set; the file is
/// only touched then.
fn init_logging(path: &Path, rust_log: Option<OsString>) -> Result<()> {
    if rust_log.is_none() {
        return Ok(());
    }
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Input model: every key press/repeat stamps the current frame into
/// `key_frame`; a key counts as held while its stamp is fresh (see
/// `HOLD_WINDOW`) or until its release event, on terminals that report them.
/// The pointer follows mouse moves and drags; the fire trigger is held from
/// left-button down to left-button up.
fn game_loop<W: Write>(
    out: &mut W,
    world: &mut World,
    rng: &mut StdRng,
) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut viewport = Viewport::new(cols, rows, world.config.width, world.config.height);

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut pointer = DVec2::ZERO;
    let mut fire_held = false;
    let mut frame: u64 = 0;

    let mut fps_window = Instant::now();
    let mut fps_frames: u32 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending events (non-blocking) ───────────────────────────
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(());
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(());
                            }
                            _ => {}
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                    pointer = viewport.to_playfield(column, row);
                    match kind {
                        MouseEventKind::Down(MouseButton::Left) => fire_held = true,
                        MouseEventKind::Up(MouseButton::Left) => fire_held = false,
                        _ => {}
                    }
                }
                Event::Resize(cols, rows) => {
                    viewport = Viewport::new(cols, rows, world.config.width, world.config.height);
                }
                _ => {}
            }
        }

        // ── Sample input and step ─────────────────────────────────────────────
        let input = FrameInput {
            keys: MoveKeys {
                up: any_held(&key_frame, &['w', 'W'], frame),
                down: any_held(&key_frame, &['s', 'S'], frame),
                left: any_held(&key_frame, &['a', 'A'], frame),
                right: any_held(&key_frame, &['d', 'D'], frame),
            },
            pointer,
            fire: fire_held,
        };

        advance(world, &input, rng);

        let items = render(world);
        display::render(out, world, &items, &viewport)?;

        fps_frames += 1;
        let window = fps_window.elapsed();
        if window >= Duration::from_secs(1) {
            display::set_title(out, fps_frames as f64 / window.as_secs_f64())?;
            fps_frames = 0;
            fps_window = Instant::now();
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Terminal setup ────────────────────────────────────────────────────────────

/// Raw mode, alternate screen, hidden cursor and mouse capture.  Returns
/// whether keyboard enhancement flags were pushed.
fn enter_terminal<W: Write>(out: &mut W) -> Result<bool> {
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    Ok(keyboard_enhanced)
}

/// Undo `enter_terminal`.  Safe after a partial setup; errors are ignored.
fn leave_terminal<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file, std::env::var_os("RUST_LOG"))?;

    // Startup errors are fatal and surface before the terminal is touched.
    let config = cli.sim_config()?;
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    log::info!("starting with {:?}", config);
    let mut world = World::new(config);

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    let mut keyboard_enhanced = false;
    let result = match enter_terminal(&mut out) {
        Ok(enhanced) => {
            keyboard_enhanced = enhanced;
            game_loop(&mut out, &mut world, &mut rng)
        }
        Err(err) => Err(err),
    };

    // Always restore the terminal, including after a failed setup
    leave_terminal(&mut out, keyboard_enhanced);

    log::info!("stopped after {} frames", world.frame);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_log_file_without_rust_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homing_shooter.log");
        init_logging(&path, None).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn held_key_expires_after_window() {
        let mut key_frame = HashMap::new();
        key_frame.insert(KeyCode::Char('w'), 10);
        assert!(any_held(&key_frame, &['w', 'W'], 10 + HOLD_WINDOW));
        assert!(!any_held(&key_frame, &['w', 'W'], 11 + HOLD_WINDOW));
        assert!(!any_held(&key_frame, &['s'], 10));
    }

    #[cfg(unix)]
    #[test]
    fn leave_terminal_restores_after_partial_setup() {
        // Nothing was entered; restoring must still emit the undo sequences.
        let mut buf: Vec<u8> = Vec::new();
        leave_terminal(&mut buf, false);
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("\x1b[?25h"));
        assert!(text.contains("\x1b[?1049l"));
    }
}
