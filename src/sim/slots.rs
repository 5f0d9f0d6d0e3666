//! Scoring slots along the bottom of the board

use crate::config::BoardConfig;

/// Which way a slot moves the score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutSign {
    Positive,
    Negative,
    Neutral,
}

/// A bottom bin with a fixed payout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub payout: i64,
}

impl Slot {
    pub fn sign(&self) -> PayoutSign {
        match self.payout {
            p if p > 0 => PayoutSign::Positive,
            p if p < 0 => PayoutSign::Negative,
            _ => PayoutSign::Neutral,
        }
    }
}

/// Static slot index → payout mapping for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTable {
    slots: Vec<Slot>,
}

impl SlotTable {
    /// One slot per column; columns without a configured payout pay 0
    pub fn new(config: &BoardConfig) -> Self {
        let slots = (0..config.cols as usize)
            .map(|index| Slot {
                index,
                payout: config.payouts.get(index).copied().unwrap_or(0),
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Payout for a slot index (0 for unknown slots)
    pub fn payout(&self, index: usize) -> i64 {
        self.slots.get(index).map(|s| s.payout).unwrap_or(0)
    }

    /// Slot under horizontal position `x`, clamped to the board
    pub fn index_for_x(&self, x: f32, spacing: f32) -> usize {
        let last = self.slots.len().saturating_sub(1);
        let raw = (x / spacing).floor();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(last)
        }
    }
}
