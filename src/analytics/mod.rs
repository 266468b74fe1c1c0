//! Election analytics derived from already-fetched backend data.
//!
//! Everything here is a pure function of its input: no I/O, no retained state.
//! Empty input gives an empty or neutral result, and records missing a field
//! are left out of the aggregation they cannot contribute to.

pub mod drilldown;
pub mod growth;
pub mod margin;
pub mod rank;
pub mod series;
pub mod state;
pub mod summary;
pub mod swing;
pub mod types;
pub mod utility;

pub use drilldown::{
    constituency_states, constituency_timeline, election_history, latest_won_by_state, state_party_series,
    won_constituencies,
};
pub use growth::{first_nonzero_index, growth_by_party, percent_growth};
pub use margin::{MarginBucket, margin_bucket, margin_distribution, try_margin_bucket};
pub use rank::{leading_party, rank_by_value, rank_names_by_total, top_by_margin, top_by_turnout, top_n_by_value};
pub use series::{PartyPerformanceSeries, seat_matrix};
pub use state::{group_seats_by_state, latest_state_turnout, party_seats_by_state, state_turnout_rows};
pub use summary::{seat_share_series, top_parties_by_type, year_summary};
pub use swing::{consecutive_swings, seat_swing};
pub use utility::average_excluding_nulls;
