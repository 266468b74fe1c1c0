//! Derived structures produced by the aggregator and consumed by the render layer.

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::Year;

/// Headline numbers for one election year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: Option<Year>,
    pub total_constituencies: usize,
    pub leading_party: Option<String>,
    pub leading_seats: u32,
    pub avg_turnout: Option<f64>,
}

/// Seats of one party across a set of years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatMatrixRow {
    pub party: String,
    pub seats: Vec<u32>,
    pub total: u32,
    /// Last year minus first year; `None` with fewer than two years.
    pub change: Option<i64>,
}

/// Seat swings between consecutive years, one series per party aligned with `labels`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwingSeries {
    pub labels: Vec<String>,
    pub swings: IndexMap<String, Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyGrowth {
    pub seats: Vec<u32>,
    pub baseline_index: usize,
    /// `None` before the baseline.
    pub growth: Vec<Option<f64>>,
}

/// Growth of several parties over the same sorted years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSeries {
    pub years: Vec<Year>,
    pub parties: IndexMap<String, PartyGrowth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTurnoutRow {
    pub state: String,
    pub turnouts: Vec<Option<f64>>,
    pub average: f64,
    /// Last minus first turnout; `None` when either end is missing.
    pub change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatShare {
    pub year: Year,
    pub seats_won: u32,
    pub total_seats: u32,
    pub percentage: f64,
}

/// Which party won a constituency in each year: one 0/1 series per party, aligned with `years`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectionHistory {
    pub years: Vec<Year>,
    pub winners: IndexMap<String, Vec<u32>>,
}

/// A constituency a party won.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WonSeatRow {
    pub year: Year,
    pub name: String,
    pub winner: Option<String>,
    pub margin_percent: Option<f64>,
}

/// Seats and vote share of parties within one state, aligned with `years`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatePartySeries {
    pub years: Vec<Year>,
    pub seats: IndexMap<String, Vec<u32>>,
    /// `None` where the backend had no figure.
    pub vote_share: IndexMap<String, Vec<Option<f64>>>,
}
