//! Allocation queue: how many balls enter which column
//!
//! Requests come from the setup form (at most [`MAX_ALLOCATION_INPUTS`] pairs).
//! A column may appear only once in the queue: later requests for an already
//! claimed column are dropped, not merged, yet their quantity still counts
//! toward the requested total.

use std::collections::VecDeque;

use thiserror::Error;

use crate::consts::MAX_ALLOCATION_INPUTS;

/// A raw (column, quantity) pair as entered by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocationRequest {
    pub column: u32,
    pub quantity: u32,
}

impl AllocationRequest {
    pub fn new(column: u32, quantity: u32) -> Self {
        Self { column, quantity }
    }
}

/// Balls still to be dropped from one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub column: u32,
    pub remaining: u32,
}

/// Why an allocation plan cannot start a game
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("no balls allocated")]
    Empty,
    #[error("{total} balls requested, at most {max} allowed")]
    ExceedsMax { total: u64, max: u32 },
    #[error("column {column} is outside the board (0..{cols})")]
    ColumnOutOfRange { column: u32, cols: u32 },
}

/// Ordered queue of allocations, consumed head first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationQueue {
    entries: VecDeque<Allocation>,
}

impl AllocationQueue {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Allocation> {
        self.entries.iter()
    }

    pub fn head(&self) -> Option<&Allocation> {
        self.entries.front()
    }

    /// Balls not yet spawned across all entries
    pub fn total_remaining(&self) -> u64 {
        self.entries.iter().map(|a| a.remaining as u64).sum()
    }

    /// Take one ball from the head allocation, returning its column
    ///
    /// The head is dequeued once exhausted.
    pub fn pop_ball(&mut self) -> Option<u32> {
        let head = self.entries.front_mut()?;
        let column = head.column;
        head.remaining = head.remaining.saturating_sub(1);
        if head.remaining == 0 {
            self.entries.pop_front();
        }
        Some(column)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Result of planning a set of requests: the queue plus the requested total
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationPlan {
    pub queue: AllocationQueue,
    /// Sum of every positive request, dropped duplicates included
    pub requested_total: u64,
}

impl AllocationPlan {
    /// Build the queue from form requests
    ///
    /// Zero-quantity requests are ignored, only the first
    /// [`MAX_ALLOCATION_INPUTS`] requests are considered, and a repeated column
    /// keeps its first request.
    pub fn new(requests: &[AllocationRequest]) -> Self {
        if requests.len() > MAX_ALLOCATION_INPUTS {
            log::debug!(
                "Ignoring {} allocation requests past the first {}",
                requests.len() - MAX_ALLOCATION_INPUTS,
                MAX_ALLOCATION_INPUTS
            );
        }

        let mut plan = Self::default();
        for req in requests.iter().take(MAX_ALLOCATION_INPUTS) {
            if req.quantity == 0 {
                continue;
            }
            plan.requested_total += req.quantity as u64;
            if plan.queue.iter().any(|a| a.column == req.column) {
                log::debug!("Dropping duplicate allocation for column {}", req.column);
                continue;
            }
            plan.queue.entries.push_back(Allocation {
                column: req.column,
                remaining: req.quantity,
            });
        }
        plan
    }

    /// Check the plan against the board limits
    pub fn validate(&self, max_balls: u32, cols: u32) -> Result<(), AllocationError> {
        if self.requested_total == 0 {
            return Err(AllocationError::Empty);
        }
        if let Some(a) = self.queue.iter().find(|a| a.column >= cols) {
            return Err(AllocationError::ColumnOutOfRange {
                column: a.column,
                cols,
            });
        }
        if self.requested_total > max_balls as u64 {
            return Err(AllocationError::ExceedsMax {
                total: self.requested_total,
                max: max_balls,
            });
        }
        Ok(())
    }

    /// Balls left before hitting the cap (negative when over)
    pub fn remaining(&self, max_balls: u32) -> i64 {
        max_balls as i64 - self.requested_total as i64
    }

    /// Whether `column` has a pending allocation
    pub fn targets(&self, column: u32) -> bool {
        self.queue.iter().any(|a| a.column == column)
    }
}
