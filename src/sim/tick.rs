//! Per-frame simulation tick
//!
//! One call per rendered frame: apply one-shot inputs, spawn from the queue,
//! step every ball, resolve landings, detect the end of the round.

use super::physics::step_ball;
use super::state::{GameEvent, GamePhase, GameState};

/// One-shot commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start the round with the staged allocations
    pub start: bool,
    /// Abandon everything and return to setup
    pub reset: bool,
}

/// Advance the board by one frame, returning what happened
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    if input.reset {
        state.reset();
    }

    state.time_ticks += 1;

    if input.start {
        match state.start() {
            // The opening ball is stepped in the next frame
            Ok(()) => return state.drain_events(),
            Err(e) => {
                log::warn!("Start rejected: {}", e);
                state.push_event(GameEvent::StartRejected(e));
            }
        }
    }

    if state.phase != GamePhase::Play {
        return state.drain_events();
    }

    // Periodic spawn from the queue head
    if !state.queue.is_empty()
        && state.time_ticks - state.last_spawn_tick > state.config.spawn_interval
    {
        state.spawn_ball();
        state.last_spawn_tick = state.time_ticks;
    }

    let slot_top = state.config.slot_top();
    let mut i = 0;
    while i < state.balls.len() {
        step_ball(
            &mut state.balls[i],
            &state.config,
            &state.pins,
            &mut state.rng,
        );

        if state.balls[i].pos.y > slot_top {
            let ball = state.balls.remove(i);
            state.settle(ball);
        } else {
            i += 1;
        }
    }

    if state.queue.is_empty() && state.balls.is_empty() {
        state.phase = GamePhase::Done;
        log::info!(
            "Round finished: score {} from {} balls",
            state.score,
            state.settled.len()
        );
        state.push_event(GameEvent::RoundFinished { score: state.score });
    }

    state.drain_events()
}

/// Tick until the round is done or `max_ticks` frames have run
///
/// Returns every event produced. Useful for headless play.
pub fn run_to_completion(state: &mut GameState, max_ticks: u64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let input = TickInput::default();
    for _ in 0..max_ticks {
        if state.phase != GamePhase::Play {
            break;
        }
        events.extend(tick(state, &input));
    }
    events
}
