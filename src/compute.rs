/// Game-logic systems.
///
/// `advance` runs every system once, in a fixed order, against a caller-owned
/// `World`.  Each system is public so it can be exercised on its own.  The
/// only side effect besides mutating the world is the injected RNG.

use glam::DVec2;
use rand::Rng;

use crate::config::BulletRemoval;
use crate::entities::{Bullet, DrawItem, Enemy, FrameInput, MoveKeys, Sprite, World};
use crate::error::SimError;

// ── Frame entry points ───────────────────────────────────────────────────────

/// Advance the simulation by one frame.  All randomness comes through `rng`
/// so callers control determinism (tests use a seeded RNG).
pub fn advance(world: &mut World, input: &FrameInput, rng: &mut impl Rng) {
    log::trace!(
        "advance: frame={} enemies={} bullets={}",
        world.frame,
        world.enemies.len(),
        world.bullets.len()
    );

    move_player(world, &input.keys);

    if input.fire {
        fire(world, input.pointer);
    }
    world.fire_cooldown = world.fire_cooldown.saturating_sub(1);

    spawn_enemies(world, rng);
    seek_player(world);

    advance_bullets(world);
    prune_bullets(world);

    let hits = resolve_collisions(world);
    if hits > 0 {
        log::debug!("frame {}: {} hit(s)", world.frame, hits);
    }

    animate_player(world);

    world.frame += 1;
}

/// Draw list for the current state: player first, then enemies, then bullets.
pub fn render(world: &World) -> Vec<DrawItem> {
    let mut items = Vec::with_capacity(1 + world.enemies.len() + world.bullets.len());

    items.push(DrawItem {
        sprite: world.player.sprite,
        pos: world.player.pos,
    });
    items.extend(world.enemies.iter().map(|e| DrawItem {
        sprite: e.sprite,
        pos: e.pos,
    }));
    items.extend(world.bullets.iter().map(|b| DrawItem {
        sprite: Sprite::Bullet,
        pos: b.pos,
    }));

    items
}

// ── Movement & input ─────────────────────────────────────────────────────────

/// Step the player by its speed along each held axis.  Diagonals are not
/// normalized and nothing keeps the player on screen.
pub fn move_player(world: &mut World, keys: &MoveKeys) {
    let speed = world.player.speed;
    let pos = &mut world.player.pos;

    if keys.up {
        pos.y -= speed;
    }
    if keys.down {
        pos.y += speed;
    }
    if keys.left {
        pos.x -= speed;
    }
    if keys.right {
        pos.x += speed;
    }
}

// ── Bullets ──────────────────────────────────────────────────────────────────

/// Unit vector from `origin` to `target`.
pub fn direction_toward(origin: DVec2, target: DVec2) -> Result<DVec2, SimError> {
    (target - origin)
        .try_normalize()
        .ok_or(SimError::DegenerateDirection {
            x: origin.x,
            y: origin.y,
        })
}

/// Spawn one bullet at the muzzle heading for `target`.
///
/// Returns whether a bullet was created.  Nothing is spawned while the fire
/// cooldown is running or when `target` sits exactly on the muzzle.
pub fn fire(world: &mut World, target: DVec2) -> bool {
    if world.fire_cooldown > 0 {
        return false;
    }

    let origin = world.player.pos + world.config.muzzle_offset;
    let dir = match direction_toward(origin, target) {
        Ok(dir) => dir,
        Err(err) => {
            log::debug!("frame {}: shot skipped: {}", world.frame, err);
            return false;
        }
    };

    world.bullets.push(Bullet {
        pos: origin,
        dir,
        speed: world.config.bullet_speed,
        traveled: 0.0,
    });

    // +1 because `advance` ticks the cooldown down in this same frame.
    if world.config.fire_interval > 0 {
        world.fire_cooldown = world.config.fire_interval.saturating_add(1);
    }
    true
}

/// Move every bullet one step along its heading.
pub fn advance_bullets(world: &mut World) {
    for bullet in &mut world.bullets {
        bullet.traveled += bullet.speed;
        bullet.pos += bullet.dir * bullet.speed;
    }
}

/// Drop expired bullets, keeping survivors in their original order.
pub fn prune_bullets(world: &mut World) {
    let (width, height) = (world.config.width, world.config.height);

    match world.config.bullet_removal {
        BulletRemoval::Distance { max } => world.bullets.retain(|b| b.traveled <= max),
        BulletRemoval::Bounds => world.bullets.retain(|b| {
            (0.0..=width).contains(&b.pos.x) && (0.0..=height).contains(&b.pos.y)
        }),
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// Top up the enemy list by one when it is below the cap.  The position is
/// uniform over the whole playfield, player included.
pub fn spawn_enemies(world: &mut World, rng: &mut impl Rng) {
    if world.enemies.len() >= world.config.enemy_cap {
        return;
    }

    // Whole-unit coordinates, as a sprite grid would place them.
    let x = rng.gen_range(0..world.config.width.max(1.0) as u32);
    let y = rng.gen_range(0..world.config.height.max(1.0) as u32);

    world.enemies.push(Enemy {
        pos: DVec2::new(x as f64, y as f64),
        speed: world.config.enemy_speed,
        sprite: Sprite::Enemy(world.config.enemy_look),
    });
}

/// Greedy per-axis pursuit: each enemy steps its speed toward the player on
/// both axes independently.  No snapping, so an enemy may jitter around the
/// player by less than one step.
pub fn seek_player(world: &mut World) {
    let target = world.player.pos;

    for enemy in &mut world.enemies {
        enemy.pos.x = step_toward(enemy.pos.x, target.x, enemy.speed);
        enemy.pos.y = step_toward(enemy.pos.y, target.y, enemy.speed);
    }
}

fn step_toward(from: f64, to: f64, speed: f64) -> f64 {
    if from < to {
        from + speed
    } else if from > to {
        from - speed
    } else {
        from
    }
}

// ── Collision ────────────────────────────────────────────────────────────────

/// True when `point` lies strictly inside the square box at `corner`.
pub fn point_in_box(point: DVec2, corner: DVec2, size: f64) -> bool {
    point.x > corner.x
        && point.x < corner.x + size
        && point.y > corner.y
        && point.y < corner.y + size
}

/// Remove every bullet/enemy pair that overlaps this frame.
///
/// Scan pass: each bullet, in order, claims the first enemy that is still
/// unclaimed and whose hit box contains it.  Compaction pass: all claimed
/// entities are dropped together, so no index shifts during the scan.
/// Returns the number of pairs removed.
pub fn resolve_collisions(world: &mut World) -> usize {
    let size = world.config.enemy_hitbox;
    let mut spent_bullets = vec![false; world.bullets.len()];
    let mut dead_enemies = vec![false; world.enemies.len()];
    let mut hits = 0;

    for (bi, bullet) in world.bullets.iter().enumerate() {
        let target = world
            .enemies
            .iter()
            .enumerate()
            .find(|(ei, enemy)| !dead_enemies[*ei] && point_in_box(bullet.pos, enemy.pos, size));

        if let Some((ei, _)) = target {
            spent_bullets[bi] = true;
            dead_enemies[ei] = true;
            hits += 1;
        }
    }

    if hits == 0 {
        return 0;
    }

    let mut spent = spent_bullets.into_iter();
    world.bullets.retain(|_| !spent.next().unwrap_or(false));
    let mut dead = dead_enemies.into_iter();
    world.enemies.retain(|_| !dead.next().unwrap_or(false));

    hits
}

// ── Animation ────────────────────────────────────────────────────────────────

/// Cycle the player's idle animation, one frame every `anim_period` ticks.
pub fn animate_player(world: &mut World) {
    let player = &mut world.player;

    player.anim_cooldown += 1;
    if player.anim_cooldown >= world.config.anim_period {
        player.anim_frame += 1;
        player.anim_cooldown = 0;
    }
    if player.anim_frame >= world.config.anim_frames {
        player.anim_frame = 0;
    }

    player.sprite = Sprite::Player {
        frame: player.anim_frame,
    };
}
