use glam::DVec2;
use homing_shooter::config::SimConfig;
use homing_shooter::entities::*;

#[test]
fn new_world_is_empty_with_player_at_origin() {
    let w = World::new(SimConfig::default());
    assert_eq!(w.player.pos, DVec2::ZERO);
    assert_eq!(w.player.speed, 5.0);
    assert_eq!(w.player.sprite, Sprite::Player { frame: 0 });
    assert!(w.enemies.is_empty());
    assert!(w.bullets.is_empty());
    assert_eq!(w.frame, 0);
    assert_eq!(w.fire_cooldown, 0);
}

#[test]
fn player_speed_comes_from_config() {
    let config = SimConfig {
        player_speed: 3.5,
        ..SimConfig::default()
    };
    assert_eq!(World::new(config).player.speed, 3.5);
}

#[test]
fn default_input_is_idle() {
    let input = FrameInput::default();
    assert_eq!(input.keys, MoveKeys::default());
    assert!(!input.fire);
    assert_eq!(input.pointer, DVec2::ZERO);
}

#[test]
fn sprite_equality() {
    assert_eq!(Sprite::Player { frame: 2 }, Sprite::Player { frame: 2 });
    assert_ne!(Sprite::Player { frame: 2 }, Sprite::Player { frame: 3 });
    assert_ne!(
        Sprite::Enemy(EnemyLook::Sprite),
        Sprite::Enemy(EnemyLook::FilledRect)
    );
    assert_ne!(Sprite::Bullet, Sprite::Enemy(EnemyLook::Sprite));
}

#[test]
fn world_clone_is_independent() {
    let original = World::default();
    let mut cloned = original.clone();

    // Mutating the clone must not affect the original
    cloned.player.pos.x = 99.0;
    cloned.frame = 999;
    cloned.enemies.push(Enemy {
        pos: DVec2::new(5.0, 5.0),
        speed: 2.0,
        sprite: Sprite::Enemy(EnemyLook::Sprite),
    });

    assert_eq!(original.player.pos.x, 0.0);
    assert_eq!(original.frame, 0);
    assert!(original.enemies.is_empty());
}
