//! Setup form adapter
//!
//! Turns the raw strings of the setup form into typed allocation requests.
//! The simulation never sees form values; the shell calls [`parse_form`] and
//! hands the result to `GameState::stage_allocations`.

use crate::sim::AllocationRequest;

/// One (column, quantity) row of the setup form, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormRow {
    pub column: String,
    pub quantity: String,
}

impl FormRow {
    pub fn new(column: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            quantity: quantity.into(),
        }
    }
}

/// Parse a quantity field
///
/// Blank, non-numeric and negative entries count as 0. Fractions are truncated.
pub fn parse_quantity(raw: &str) -> u32 {
    match raw.trim().parse::<f64>() {
        Ok(q) if q.is_finite() && q > 0.0 => q.min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// Parse a column selector value; anything unparseable selects column 0
pub fn parse_column(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

/// Convert every form row into a request, preserving order
pub fn parse_form(rows: &[FormRow]) -> Vec<AllocationRequest> {
    rows.iter()
        .map(|row| AllocationRequest::new(parse_column(&row.column), parse_quantity(&row.quantity)))
        .collect()
}
