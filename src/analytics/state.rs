use indexmap::IndexMap;

use crate::analytics::rank::rank_by_value;
use crate::analytics::types::StateTurnoutRow;
use crate::analytics::utility::average_excluding_nulls;
use crate::model::{ConstituencyResult, TurnoutOverview, Year};

/// Seats per state, in order of first appearance. Records without a state are not counted.
pub fn group_seats_by_state(constituencies: &[ConstituencyResult]) -> IndexMap<String, u32> {
    count_states(constituencies.iter())
}

/// Seats won by `party` per state.
pub fn party_seats_by_state(
    constituencies: &[ConstituencyResult],
    party: &str,
) -> IndexMap<String, u32> {
    count_states(
        constituencies
            .iter()
            .filter(|c| c.party.as_deref() == Some(party)),
    )
}

fn count_states<'a, I>(constituencies: I) -> IndexMap<String, u32>
where
    I: Iterator<Item = &'a ConstituencyResult>,
{
    let mut seats: IndexMap<String, u32> = IndexMap::new();
    for state in constituencies.filter_map(|c| c.state.as_deref()) {
        if state.is_empty() {
            continue;
        }
        *seats.entry(state.to_string()).or_default() += 1;
    }
    seats
}

/// One table row per state, alphabetically. States whose series is entirely null are left out.
///
/// The change compares the first and last points of the series and is `None`
/// when either end is null.
pub fn state_turnout_rows(overview: &TurnoutOverview) -> Vec<StateTurnoutRow> {
    let mut states: Vec<&String> = overview.state_turnout.keys().collect();
    states.sort();

    states
        .into_iter()
        .filter_map(|state| {
            let turnouts = &overview.state_turnout[state];
            let average = average_excluding_nulls(turnouts)?;
            let change = match (turnouts.first(), turnouts.last()) {
                (Some(Some(first)), Some(Some(last))) => Some(last - first),
                _ => None,
            };
            Some(StateTurnoutRow {
                state: state.clone(),
                turnouts: turnouts.clone(),
                average,
                change,
            })
        })
        .collect()
}

/// States ranked by turnout in the latest year of the overview, highest first.
///
/// States with no value for that year are skipped.
pub fn latest_state_turnout(overview: &TurnoutOverview) -> Option<(Year, Vec<(String, f64)>)> {
    let (index, year) = overview
        .years
        .iter()
        .enumerate()
        .max_by_key(|(_, y)| **y)?;

    let values = overview.state_turnout.iter().filter_map(|(state, series)| {
        series
            .get(index)
            .copied()
            .flatten()
            .map(|t| (state.clone(), t))
    });

    Some((*year, rank_by_value(values)))
}
