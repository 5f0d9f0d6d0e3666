//! Board tessellation
//!
//! Pure read of the game state: the same state always yields the same
//! triangle list. Coordinates stay in board pixels (y down); the pipeline maps
//! them to clip space.

use glam::Vec2;

use super::shapes::{CIRCLE_SEGMENTS, circle, rect};
use super::vertex::{Vertex, colors};
use crate::sim::{GamePhase, GameState, PayoutSign};

/// Height of the payout-colored strip along the top of each slot bin
const PAYOUT_STRIP_HEIGHT: f32 = 3.0;

fn payout_color(sign: PayoutSign) -> [f32; 4] {
    match sign {
        PayoutSign::Positive => colors::PAYOUT_POSITIVE,
        PayoutSign::Negative => colors::PAYOUT_NEGATIVE,
        PayoutSign::Neutral => colors::PAYOUT_NEUTRAL,
    }
}

/// Build the full frame, back to front
///
/// Order: setup highlight, pins, slot bins, settled balls, live balls.
pub fn build_scene(state: &GameState) -> Vec<Vertex> {
    let config = &state.config;
    let mut vertices = Vec::new();

    if state.phase == GamePhase::Setup {
        for allocation in state.plan.queue.iter() {
            vertices.extend(rect(
                Vec2::new(allocation.column as f32 * config.spacing, 0.0),
                Vec2::new(config.spacing, config.height),
                colors::COLUMN_HIGHLIGHT,
            ));
        }
    }

    for pin in &state.pins {
        vertices.extend(circle(pin.pos, config.pin_radius, colors::PIN, CIRCLE_SEGMENTS));
    }

    let slot_top = config.slot_top();
    for slot in state.slots.iter() {
        let x = slot.index as f32 * config.spacing;
        vertices.extend(rect(
            Vec2::new(x, slot_top),
            Vec2::new(config.spacing, config.slot_band_height),
            colors::SLOT_BIN,
        ));
        vertices.extend(rect(
            Vec2::new(x, slot_top),
            Vec2::new(config.spacing, PAYOUT_STRIP_HEIGHT),
            payout_color(slot.sign()),
        ));
    }

    for settled in &state.settled {
        vertices.extend(circle(settled.pos, config.radius, colors::BALL, CIRCLE_SEGMENTS));
    }

    for ball in &state.balls {
        vertices.extend(circle(ball.pos, config.radius, colors::BALL, CIRCLE_SEGMENTS));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::sim::AllocationRequest;

    const CIRCLE_VERTS: usize = (CIRCLE_SEGMENTS * 3) as usize;

    fn static_vertex_count(state: &GameState) -> usize {
        state.pins.len() * CIRCLE_VERTS + state.slots.len() * 12
    }

    #[test]
    fn test_empty_board() {
        let state = GameState::new(BoardConfig::default(), 1);
        assert_eq!(build_scene(&state).len(), static_vertex_count(&state));
    }

    #[test]
    fn test_highlight_only_in_setup() {
        let mut state = GameState::new(BoardConfig::default(), 1);
        state.stage_allocations(&[AllocationRequest::new(3, 2), AllocationRequest::new(7, 1)]);

        let verts = build_scene(&state);
        assert_eq!(verts.len(), static_vertex_count(&state) + 12);
        assert_eq!(verts[0].color, colors::COLUMN_HIGHLIGHT);
        assert_eq!(verts[0].position, [120.0, 0.0]);

        state.start().unwrap();
        let verts = build_scene(&state);
        assert!(verts.iter().all(|v| v.color != colors::COLUMN_HIGHLIGHT));
        // One ball in flight after start
        assert_eq!(verts.len(), static_vertex_count(&state) + CIRCLE_VERTS);
    }

    #[test]
    fn test_slot_strip_colors() {
        let state = GameState::new(BoardConfig::default(), 1);
        let verts = build_scene(&state);
        let slots_start = state.pins.len() * CIRCLE_VERTS;

        // Slot 0 pays -90, slot 1 pays +60
        assert_eq!(verts[slots_start].color, colors::SLOT_BIN);
        assert_eq!(verts[slots_start + 6].color, colors::PAYOUT_NEGATIVE);
        assert_eq!(verts[slots_start + 18].color, colors::PAYOUT_POSITIVE);
    }

    #[test]
    fn test_neutral_payout_color() {
        assert_eq!(payout_color(PayoutSign::Neutral), colors::PAYOUT_NEUTRAL);
    }
}
