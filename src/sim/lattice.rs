//! Staggered pin lattice

use glam::Vec2;

use crate::config::BoardConfig;

/// A fixed obstacle the balls deflect off
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pin {
    pub pos: Vec2,
}

/// Generate the pin lattice, row-major
///
/// Odd rows are shifted right by half a spacing so every row sits between the
/// pins of its neighbours. The order is significant: pin collision picks the
/// first overlapping pin in this order.
pub fn generate_pins(config: &BoardConfig) -> Vec<Pin> {
    let half = config.spacing / 2.0;
    let mut pins = Vec::with_capacity((config.rows * config.cols) as usize);

    for r in 0..config.rows {
        let offset = (r % 2) as f32 * half;
        let y = config.pin_top + r as f32 * config.spacing;
        for c in 0..config.cols {
            let x = half + c as f32 * config.spacing + offset;
            pins.push(Pin {
                pos: Vec2::new(x, y),
            });
        }
    }

    pins
}
