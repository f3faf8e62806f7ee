/// All game entity types — pure data, no logic.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

// ── Visuals ───────────────────────────────────────────────────────────────────

/// How enemies are drawn.  Only the look differs; collision uses the
/// configured hit box either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyLook {
    /// The cropped gopher sprite.
    Sprite,
    /// A solid block the size of the hit box.
    FilledRect,
}

/// Visual reference handed to the renderer.  The core never loads images;
/// the front end decides what each variant looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sprite {
    /// One frame of the player's idle cycle.
    Player { frame: usize },
    Enemy(EnemyLook),
    Bullet,
}

// ── Player & enemy ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub pos: DVec2,
    pub speed: f64,
    pub anim_frame: usize,
    /// Frames since the animation last advanced.
    pub anim_cooldown: u32,
    pub sprite: Sprite,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub pos: DVec2,
    pub speed: f64,
    pub sprite: Sprite,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub pos: DVec2,
    /// Unit-length heading, fixed at spawn.
    pub dir: DVec2,
    pub speed: f64,
    /// Total distance covered since spawn.
    pub traveled: f64,
}

// ── Per-frame input ───────────────────────────────────────────────────────────

/// Movement keys held during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Everything the front end samples once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub keys: MoveKeys,
    /// Pointer position in playfield coordinates.
    pub pointer: DVec2,
    /// Level-triggered: true on every frame the fire button is down.
    pub fire: bool,
}

// ── Draw list ─────────────────────────────────────────────────────────────────

/// One blit request: draw `sprite` with its top-left corner at `pos`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub sprite: Sprite,
    pub pos: DVec2,
}

// ── Master state ──────────────────────────────────────────────────────────────

/// The whole simulation.  Owned by the caller and handed to
/// [`crate::compute::advance`] and [`crate::compute::render`] each frame.
#[derive(Clone, Debug)]
pub struct World {
    pub config: SimConfig,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    /// Frames left before the fire trigger is accepted again.
    pub fire_cooldown: u32,
    pub frame: u64,
}

impl World {
    /// Fresh world: player at the origin, no enemies, no bullets.
    pub fn new(config: SimConfig) -> Self {
        let player = Player {
            pos: DVec2::ZERO,
            speed: config.player_speed,
            anim_frame: 0,
            anim_cooldown: 0,
            sprite: Sprite::Player { frame: 0 },
        };
        Self {
            config,
            player,
            enemies: Vec::new(),
            bullets: Vec::new(),
            fire_cooldown: 0,
            frame: 0,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
