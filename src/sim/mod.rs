//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per rendered frame
//! - Seeded RNG only
//! - Stable iteration order (lattice order for pins, spawn order for balls)
//! - No rendering or platform dependencies

pub mod allocation;
pub mod lattice;
pub mod physics;
pub mod slots;
pub mod state;
pub mod tick;

pub use allocation::{
    Allocation, AllocationError, AllocationPlan, AllocationQueue, AllocationRequest,
};
pub use lattice::{Pin, generate_pins};
pub use physics::{PinHit, step_ball};
pub use slots::{PayoutSign, Slot, SlotTable};
pub use state::{
    AllocationSummary, Ball, GameEvent, GamePhase, GameState, RoundSummary, SettledBall,
    SlotTally, StartError,
};
pub use tick::{TickInput, run_to_completion, tick};
