//! Galton Board - a Plinko betting toy
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pin lattice, slots, allocations, ball physics, game state)
//! - `config`: Data-driven board configuration
//! - `input`: Form values to typed allocation requests
//! - `renderer`: WebGPU rendering pipeline

pub mod config;
pub mod input;
pub mod renderer;
pub mod sim;

pub use config::{BoardConfig, ConfigError};

/// Board defaults (units are pixels and frames)
pub mod consts {
    /// Pin rows (odd, so the last row is offset and the board has `cols` slots)
    pub const ROWS: u32 = 9;
    pub const COLS: u32 = 10;
    /// Distance between neighbouring pins, also the slot width
    pub const SPACING: f32 = 40.0;
    pub const BOARD_HEIGHT: f32 = 600.0;
    pub const SLOT_BAND_HEIGHT: f32 = 60.0;
    /// Y of the first pin row
    pub const PIN_TOP: f32 = 80.0;
    pub const PIN_RADIUS: f32 = 4.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 6.0;
    pub const SPAWN_Y: f32 = 50.0;
    /// Spawn vx is drawn from [-SPAWN_JITTER, SPAWN_JITTER)
    pub const SPAWN_JITTER: f32 = 0.5;
    /// Frames that must pass (strictly more) between two spawns
    pub const SPAWN_INTERVAL_FRAMES: u64 = 15;
    pub const MAX_BALLS: u32 = 100;

    /// Gravity (px/frame²)
    pub const GRAVITY: f32 = 0.15;
    /// Terminal vertical speed
    pub const VY_MAX: f32 = 5.0;
    /// Minimum lateral speed after touching a side wall (always toward center)
    pub const WALL_KICK: f32 = 2.8;
    /// Vertical damping on wall contact
    pub const WALL_DAMP: f32 = 0.9;
    /// Per-frame horizontal friction
    pub const FRICTION: f32 = 0.995;

    /// Pin deflection gains
    pub const PIN_KICK_X: f32 = 2.2;
    pub const PIN_KICK_Y: f32 = 0.3;
    pub const PIN_JITTER: f32 = 0.4;

    /// Vertical gap between stacked settled balls
    pub const SETTLE_GAP: f32 = 2.0;

    /// Number of (column, quantity) pairs the setup form offers
    pub const MAX_ALLOCATION_INPUTS: usize = 3;

    /// Slot payouts, left to right
    pub const PAYOUTS: [i64; 10] = [-90, 60, -50, 50, -60, 100, -40, 50, -90, 60];
}

/// Sign of `v` as -1.0, 0.0 or 1.0 (`f32::signum` maps zero to 1.0)
#[inline]
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
