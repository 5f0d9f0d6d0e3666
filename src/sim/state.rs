//! Game state and core simulation types
//!
//! [`GameState`] is the whole simulation context: one value per board, no
//! process-wide state, so any number of boards can run side by side.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;
use thiserror::Error;

use super::allocation::{AllocationError, AllocationPlan, AllocationQueue, AllocationRequest};
use super::lattice::{Pin, generate_pins};
use super::physics::jitter;
use super::slots::SlotTable;
use crate::config::BoardConfig;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Accepting allocations and start
    Setup,
    /// Balls are dropping
    Play,
    /// Everything has settled; waits for reset
    Done,
}

/// A ball in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2) -> Self {
        Self { id, pos, vel }
    }
}

/// Resting marker for a ball that reached a slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettledBall {
    pub pos: Vec2,
    pub slot: usize,
}

/// Why `start` was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("cannot start while in {0:?}")]
    NotInSetup(GamePhase),
    #[error(transparent)]
    Invalid(#[from] AllocationError),
}

/// Things that happened during a tick, for the shell to log and display
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started { balls: u64 },
    StartRejected(StartError),
    BallSpawned { id: u32, column: u32 },
    BallLanded { id: u32, slot: usize, payout: i64 },
    RoundFinished { score: i64 },
    Reset,
}

/// Validation readout for the setup form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationSummary {
    pub requested_total: u64,
    /// `max_balls - requested_total`, negative when over the cap
    pub remaining: i64,
    pub validation: Result<(), AllocationError>,
}

impl AllocationSummary {
    pub fn can_start(&self) -> bool {
        self.validation.is_ok()
    }
}

/// Per-slot tally in a [`RoundSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotTally {
    pub slot: usize,
    pub payout: i64,
    pub balls: u32,
}

/// Snapshot of a round's outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub seed: u64,
    pub phase: GamePhase,
    pub score: i64,
    pub frames: u64,
    pub settled: usize,
    pub slots: Vec<SlotTally>,
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: BoardConfig,
    /// Pin lattice (immutable for the session)
    pub pins: Vec<Pin>,
    pub slots: SlotTable,
    /// Seed the RNG stream was created from
    pub seed: u64,
    pub phase: GamePhase,
    /// Allocations staged from the setup form
    pub plan: AllocationPlan,
    /// Allocations still to spawn during play
    pub queue: AllocationQueue,
    /// Balls in flight
    pub balls: Vec<Ball>,
    /// Settled markers in landing order
    pub settled: Vec<SettledBall>,
    /// Stack height per slot
    pub settled_count: Vec<u32>,
    pub score: i64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Tick of the most recent spawn
    pub last_spawn_tick: u64,
    pub(super) rng: Pcg32,
    next_id: u32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a board in the setup phase
    ///
    /// The configuration is expected to have passed [`BoardConfig::validate`].
    pub fn new(config: BoardConfig, seed: u64) -> Self {
        let pins = generate_pins(&config);
        let slots = SlotTable::new(&config);
        let settled_count = vec![0; slots.len()];

        Self {
            config,
            pins,
            slots,
            seed,
            phase: GamePhase::Setup,
            plan: AllocationPlan::default(),
            queue: AllocationQueue::default(),
            balls: Vec::new(),
            settled: Vec::new(),
            settled_count,
            score: 0,
            time_ticks: 0,
            last_spawn_tick: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Allocate a new ball ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::Done
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Current validation readout for the staged plan
    pub fn allocation_summary(&self) -> AllocationSummary {
        AllocationSummary {
            requested_total: self.plan.requested_total,
            remaining: self.plan.remaining(self.config.max_balls),
            validation: self.plan.validate(self.config.max_balls, self.config.cols),
        }
    }

    /// Replace the staged allocations (setup only)
    ///
    /// The plan is kept even when invalid so pending columns can still be
    /// highlighted; validity only gates `start`.
    pub fn stage_allocations(&mut self, requests: &[AllocationRequest]) -> AllocationSummary {
        if self.phase == GamePhase::Setup {
            self.plan = AllocationPlan::new(requests);
        } else {
            log::warn!("Ignoring allocation change during {:?}", self.phase);
        }
        self.allocation_summary()
    }

    /// Begin dropping balls from the staged plan
    pub fn start(&mut self) -> Result<(), StartError> {
        if self.phase != GamePhase::Setup {
            return Err(StartError::NotInSetup(self.phase));
        }
        self.plan
            .validate(self.config.max_balls, self.config.cols)?;

        self.clear_round();
        self.queue = std::mem::take(&mut self.plan).queue;
        self.phase = GamePhase::Play;
        self.last_spawn_tick = self.time_ticks;

        let balls = self.queue.total_remaining();
        log::info!("Round started: {} balls in {} columns", balls, self.queue.len());
        self.push_event(GameEvent::Started { balls });

        self.spawn_ball();
        Ok(())
    }

    /// Return to setup from any phase, discarding everything transient
    pub fn reset(&mut self) {
        self.clear_round();
        self.plan = AllocationPlan::default();
        self.queue.clear();
        self.last_spawn_tick = 0;
        self.phase = GamePhase::Setup;
        log::info!("Board reset");
        self.push_event(GameEvent::Reset);
    }

    fn clear_round(&mut self) {
        self.score = 0;
        self.balls.clear();
        self.settled.clear();
        self.settled_count.iter_mut().for_each(|c| *c = 0);
    }

    /// Emit one ball from the head of the queue
    pub(crate) fn spawn_ball(&mut self) {
        let Some(column) = self.queue.pop_ball() else {
            return;
        };
        let id = self.next_entity_id();
        let x = (column as f32 + 0.5) * self.config.spacing;
        let vx = jitter(&mut self.rng, self.config.spawn_jitter);
        self.balls.push(Ball::new(
            id,
            Vec2::new(x, self.config.spawn_y),
            Vec2::new(vx, 0.0),
        ));
        self.push_event(GameEvent::BallSpawned { id, column });
    }

    /// Turn a ball that crossed into the slot band into a settled marker
    pub(crate) fn settle(&mut self, ball: Ball) {
        let slot = self.slots.index_for_x(ball.pos.x, self.config.spacing);
        let Some(count) = self.settled_count.get_mut(slot) else {
            log::warn!("Ball {} landed outside the slot table", ball.id);
            return;
        };
        let payout = self.slots.payout(slot);
        let r = self.config.radius;
        let pos = Vec2::new(
            (slot as f32 + 0.5) * self.config.spacing,
            self.config.slot_top() + r + *count as f32 * (r * 2.0 + self.config.settle_gap),
        );
        *count += 1;
        self.score += payout;
        self.settled.push(SettledBall { pos, slot });

        log::debug!("Ball {} landed in slot {} ({:+})", ball.id, slot, payout);
        self.push_event(GameEvent::BallLanded {
            id: ball.id,
            slot,
            payout,
        });
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            seed: self.seed,
            phase: self.phase,
            score: self.score,
            frames: self.time_ticks,
            settled: self.settled.len(),
            slots: self
                .slots
                .iter()
                .map(|s| SlotTally {
                    slot: s.index,
                    payout: s.payout,
                    balls: self.settled_count.get(s.index).copied().unwrap_or(0),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(column: u32, quantity: u32) -> AllocationRequest {
        AllocationRequest::new(column, quantity)
    }

    #[test]
    fn test_new_board_is_in_setup() {
        let state = GameState::new(BoardConfig::default(), 7);
        assert_eq!(state.phase, GamePhase::Setup);
        assert_eq!(state.pins.len(), 90);
        assert_eq!(state.settled_count.len(), 10);
        assert!(state.balls.is_empty());
    }

    #[test]
    fn test_start_spawns_first_ball() {
        let mut state = GameState::new(BoardConfig::default(), 7);
        assert!(state.stage_allocations(&[req(3, 2)]).can_start());
        state.start().unwrap();

        assert_eq!(state.phase, GamePhase::Play);
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.balls[0].pos, Vec2::new(140.0, 50.0));
        assert_eq!(state.balls[0].vel.y, 0.0);
        assert!(state.balls[0].vel.x.abs() <= 0.5);
        assert_eq!(state.queue.total_remaining(), 1);

        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::Started { balls: 2 });
        assert_eq!(events[1], GameEvent::BallSpawned { id: 1, column: 3 });
    }

    #[test]
    fn test_settle_scores_only_recorded_markers() {
        let mut state = GameState::new(BoardConfig::default(), 7);
        let landing = Vec2::new(230.0, state.config.slot_top() + 1.0);

        state.settle(Ball::new(1, landing, Vec2::ZERO));
        assert_eq!(state.score, 100);
        assert_eq!(state.settled.len(), 1);

        // A count table that no longer covers the slot records nothing
        state.settled_count.clear();
        state.settle(Ball::new(2, landing, Vec2::ZERO));
        assert_eq!(state.score, 100);
        assert_eq!(state.settled.len(), 1);
        let payout_sum: i64 = state.settled.iter().map(|s| state.slots.payout(s.slot)).sum();
        assert_eq!(state.score, payout_sum);
    }

    #[test]
    fn test_start_rejected_over_cap() {
        let mut state = GameState::new(BoardConfig::default(), 7);
        let summary = state.stage_allocations(&[req(0, 50), req(1, 51)]);
        assert!(!summary.can_start());
        assert_eq!(summary.remaining, -1);

        assert_eq!(
            state.start(),
            Err(StartError::Invalid(AllocationError::ExceedsMax {
                total: 101,
                max: 100
            }))
        );
        assert_eq!(state.phase, GamePhase::Setup);

        state.stage_allocations(&[req(0, 50), req(1, 50)]);
        assert!(state.start().is_ok());
    }

    #[test]
    fn test_start_rejected_without_allocations() {
        let mut state = GameState::new(BoardConfig::default(), 7);
        assert_eq!(state.start(), Err(StartError::Invalid(AllocationError::Empty)));
    }

    #[test]
    fn test_start_only_from_setup() {
        let mut state = GameState::new(BoardConfig::default(), 7);
        state.stage_allocations(&[req(0, 1)]);
        state.start().unwrap();
        assert_eq!(
            state.start(),
            Err(StartError::NotInSetup(GamePhase::Play))
        );
        // Staging is frozen outside setup
        state.stage_allocations(&[req(5, 9)]);
        assert!(!state.plan.targets(5));
    }

    #[test]
    fn test_settle_stacks_per_slot() {
        let mut state = GameState::new(BoardConfig::default(), 7);
        let r = state.config.radius;
        let top = state.config.slot_top();

        state.settle(Ball::new(1, Vec2::new(210.0, 545.0), Vec2::ZERO));
        state.settle(Ball::new(2, Vec2::new(215.0, 545.0), Vec2::ZERO));
        state.settle(Ball::new(3, Vec2::new(5.0, 545.0), Vec2::ZERO));

        assert_eq!(state.settled_count[5], 2);
        assert_eq!(state.settled_count[0], 1);
        assert_eq!(state.settled[0].pos, Vec2::new(220.0, top + r));
        assert_eq!(state.settled[1].pos, Vec2::new(220.0, top + r + 2.0 * r + 2.0));
        assert_eq!(state.score, 100 + 100 - 90);
    }

    #[test]
    fn test_summary_counts() {
        let mut state = GameState::new(BoardConfig::default(), 3);
        state.settle(Ball::new(1, Vec2::new(90.0, 545.0), Vec2::ZERO));
        let summary = state.summary();
        assert_eq!(summary.settled, 1);
        assert_eq!(summary.slots[2].balls, 1);
        assert_eq!(summary.slots[2].payout, -50);
        assert_eq!(summary.score, -50);
    }
}
