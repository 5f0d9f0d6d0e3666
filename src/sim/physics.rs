//! Per-frame ball physics
//!
//! Explicit Euler with ad-hoc collision response. Each stage is a separate
//! function so the invariants (terminal speed, wall clamp, pin impulse) can be
//! checked in isolation; [`step_ball`] runs them in order.

use glam::Vec2;
use rand::Rng;

use super::lattice::Pin;
use super::state::Ball;
use crate::config::BoardConfig;
use crate::sign;

/// Pin contact for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinHit {
    /// Index into the lattice
    pub pin_index: usize,
    /// Unit vector from pin center to ball center
    pub normal: Vec2,
}

/// Uniform sample in [-amplitude, amplitude), or 0 when the amplitude is not positive
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f32) -> f32 {
    if amplitude > 0.0 {
        rng.random_range(-amplitude..amplitude)
    } else {
        0.0
    }
}

/// Accumulate gravity, clamped to terminal speed
#[inline]
pub fn apply_gravity(vel: &mut Vec2, gravity: f32, vy_max: f32) {
    vel.y = (vel.y + gravity).min(vy_max);
}

/// Clamp to a side wall and kick toward the center
///
/// Returns true on wall contact. The kick keeps the current lateral speed if
/// it already exceeds `wall_kick`.
pub fn reflect_off_walls(pos: &mut Vec2, vel: &mut Vec2, config: &BoardConfig) -> bool {
    let r = config.radius;
    let right = config.width() - r;

    if pos.x <= r {
        pos.x = r;
    } else if pos.x >= right {
        pos.x = right;
    } else {
        return false;
    }

    let speed = config.wall_kick.max(vel.x.abs());
    vel.x = sign(config.center_x() - pos.x) * speed;
    vel.y *= config.wall_damp;
    true
}

/// First pin (in lattice order) overlapping the ball
///
/// Lattice order, not distance, decides between overlapping pins.
pub fn find_pin_hit(pos: Vec2, contact_radius: f32, pins: &[Pin]) -> Option<PinHit> {
    let contact_sq = contact_radius * contact_radius;

    pins.iter().enumerate().find_map(|(pin_index, pin)| {
        let delta = pos - pin.pos;
        let d2 = delta.length_squared();
        if d2 < contact_sq {
            let d = d2.sqrt();
            // Ball exactly on the pin: fall back to a unit divisor
            let d = if d > 0.0 { d } else { 1.0 };
            Some(PinHit {
                pin_index,
                normal: delta / d,
            })
        } else {
            None
        }
    })
}

/// Additive deflection: no positional correction, no velocity reversal
#[inline]
pub fn apply_pin_impulse(vel: &mut Vec2, normal: Vec2, jitter_x: f32, config: &BoardConfig) {
    vel.x += normal.x * config.pin_kick_x + jitter_x;
    vel.y += normal.y * config.pin_kick_y;
}

/// Advance one ball by one frame (everything except landing)
///
/// Order: gravity, integration, walls, friction, pins.
pub fn step_ball<R: Rng + ?Sized>(
    ball: &mut Ball,
    config: &BoardConfig,
    pins: &[Pin],
    rng: &mut R,
) -> Option<PinHit> {
    apply_gravity(&mut ball.vel, config.gravity, config.vy_max);

    ball.pos += ball.vel;

    reflect_off_walls(&mut ball.pos, &mut ball.vel, config);

    ball.vel.x *= config.friction;

    let hit = find_pin_hit(ball.pos, config.radius + config.pin_radius, pins);
    if let Some(hit) = hit {
        let jx = jitter(rng, config.pin_jitter);
        apply_pin_impulse(&mut ball.vel, hit.normal, jx, config);
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pin(x: f32, y: f32) -> Pin {
        Pin {
            pos: Vec2::new(x, y),
        }
    }

    #[test]
    fn test_gravity_clamps_to_terminal() {
        let mut vel = Vec2::new(0.0, 4.9);
        apply_gravity(&mut vel, 0.15, 5.0);
        assert_eq!(vel.y, 5.0);

        let mut vel = Vec2::new(0.0, 1.0);
        apply_gravity(&mut vel, 0.15, 5.0);
        assert!((vel.y - 1.15).abs() < 1e-6);
    }

    #[test]
    fn test_left_wall_kicks_right() {
        let config = BoardConfig::default();
        let mut pos = Vec2::new(2.0, 100.0);
        let mut vel = Vec2::new(-0.5, 4.0);

        assert!(reflect_off_walls(&mut pos, &mut vel, &config));
        assert_eq!(pos.x, config.radius);
        assert_eq!(vel.x, config.wall_kick);
        assert!((vel.y - 3.6).abs() < 1e-6);
    }

    #[test]
    fn test_right_wall_keeps_faster_speed() {
        let config = BoardConfig::default();
        let mut pos = Vec2::new(config.width() + 3.0, 100.0);
        let mut vel = Vec2::new(4.0, 2.0);

        assert!(reflect_off_walls(&mut pos, &mut vel, &config));
        assert_eq!(pos.x, config.width() - config.radius);
        assert_eq!(vel.x, -4.0);
    }

    #[test]
    fn test_no_wall_contact_in_open_space() {
        let config = BoardConfig::default();
        let mut pos = Vec2::new(200.0, 100.0);
        let mut vel = Vec2::new(1.0, 2.0);

        assert!(!reflect_off_walls(&mut pos, &mut vel, &config));
        assert_eq!(vel, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_first_pin_wins_over_nearest() {
        // Ball overlaps both pins; the second one is closer
        let pins = [pin(100.0, 100.0), pin(104.0, 100.0)];
        let hit = find_pin_hit(Vec2::new(105.0, 100.0), 10.0, &pins).unwrap();
        assert_eq!(hit.pin_index, 0);
        assert!((hit.normal - Vec2::X).length() < 1e-6);
    }

    #[test]
    fn test_pin_miss() {
        let pins = [pin(100.0, 100.0)];
        assert!(find_pin_hit(Vec2::new(110.0, 100.0), 10.0, &pins).is_none());
    }

    #[test]
    fn test_zero_distance_pin_is_finite() {
        let pins = [pin(50.0, 50.0)];
        let hit = find_pin_hit(Vec2::new(50.0, 50.0), 10.0, &pins).unwrap();
        assert_eq!(hit.normal, Vec2::ZERO);
    }

    #[test]
    fn test_pin_impulse_is_additive() {
        let config = BoardConfig::default();
        let mut vel = Vec2::new(1.0, 3.0);
        apply_pin_impulse(&mut vel, Vec2::new(0.6, -0.8), 0.1, &config);
        assert!((vel.x - (1.0 + 0.6 * 2.2 + 0.1)).abs() < 1e-5);
        assert!((vel.y - (3.0 - 0.8 * 0.3)).abs() < 1e-5);
    }

    #[test]
    fn test_jitter_zero_amplitude() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(jitter(&mut rng, 0.0), 0.0);
        for _ in 0..100 {
            let j = jitter(&mut rng, 0.4);
            assert!((-0.4..0.4).contains(&j));
        }
    }

    proptest! {
        #[test]
        fn prop_vy_never_exceeds_terminal(vy in -20.0f32..20.0, g in 0.0f32..2.0) {
            let mut vel = Vec2::new(0.0, vy);
            apply_gravity(&mut vel, g, 5.0);
            prop_assert!(vel.y <= 5.0);
        }

        #[test]
        fn prop_wall_clamp_points_to_center(
            x in -50.0f32..450.0,
            vx in -10.0f32..10.0,
            vy in 0.0f32..5.0,
        ) {
            let config = BoardConfig::default();
            let mut pos = Vec2::new(x, 200.0);
            let mut vel = Vec2::new(vx, vy);
            if reflect_off_walls(&mut pos, &mut vel, &config) {
                prop_assert!(pos.x >= config.radius);
                prop_assert!(pos.x <= config.width() - config.radius);
                let toward_center = config.center_x() - pos.x;
                prop_assert!(vel.x * toward_center > 0.0);
                prop_assert!(vel.x.abs() >= config.wall_kick);
            }
        }

        #[test]
        fn prop_step_keeps_ball_inside_walls(
            x in 0.0f32..400.0,
            vx in -6.0f32..6.0,
            seed in any::<u64>(),
        ) {
            let config = BoardConfig::default();
            let pins = crate::sim::generate_pins(&config);
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut ball = Ball::new(1, Vec2::new(x, 60.0), Vec2::new(vx, 0.0));
            for _ in 0..30 {
                step_ball(&mut ball, &config, &pins, &mut rng);
                prop_assert!(ball.pos.x >= config.radius);
                prop_assert!(ball.pos.x <= config.width() - config.radius);
            }
        }
    }
}
