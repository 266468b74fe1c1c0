//! Dashboard pages.
//!
//! Each page has a pure `build` step that derives everything it shows from a
//! single backend response, and a `render` step that writes its charts and
//! tables into a directory.

use std::path::Path;

use anyhow::Result;
use indexmap::IndexMap;
use tracing::warn;

use crate::analytics::types::{
    ElectionHistory, GrowthSeries, SeatMatrixRow, SeatShare, StatePartySeries, StateTurnoutRow, SwingSeries,
    WonSeatRow, YearSummary,
};
use crate::analytics::{
    MarginBucket, PartyPerformanceSeries, consecutive_swings, constituency_timeline, election_history,
    group_seats_by_state, growth_by_party, latest_state_turnout, latest_won_by_state, margin_distribution,
    party_seats_by_state, rank_names_by_total, seat_matrix, seat_share_series, seat_swing, state_party_series,
    state_turnout_rows, top_by_margin, top_by_turnout, top_n_by_value, top_parties_by_type, won_constituencies,
    year_summary,
};
use crate::model::{
    ConstituencyHistory, ConstituencyResult, ConstituencyType, ConstituencyTypeBreakdown, ElectionYearResult,
    PartyComparison, PartyProfile, PartyTrends, StatePartyTrends, TurnoutOverview, Year, YearComparison,
};
use crate::output::append_record;
use crate::pipeline::Dispose;
use crate::render::{
    Axis, ChartHandle, ChartKind, ChartSpec, Color, Dataset, PageWriter, format_number, format_percent,
    palette_color, party_color, party_colors, percent_axis_bounds, render_page, slug,
};

const TURNOUT_PAD: f64 = 5.0;
const WON_SEATS_SHOWN: usize = 100;

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn year_label(year: Option<Year>) -> String {
    year.map_or_else(|| "unknown year".to_string(), |y| y.to_string())
}

fn format_change(change: Option<i64>) -> String {
    match change {
        Some(c) if c > 0 => format!("+{c}"),
        Some(c) => c.to_string(),
        None => "N/A".to_string(),
    }
}

fn single(color: &str) -> Color {
    Color::Single(color.to_string())
}

fn ranked_bar(
    w: &mut PageWriter,
    name: &str,
    title: String,
    label: &str,
    ranked: &[(String, u32)],
    color: Color,
) -> Result<()> {
    w.chart(
        name,
        &ChartSpec::new(ChartKind::Bar, title)
            .labels(ranked.iter().map(|(k, _)| k))
            .dataset(Dataset::values(label, ranked.iter().map(|(_, v)| *v), color))
            .y_axis(Axis::titled("Seats")),
    )
}

fn constituency_rows(constituencies: &[ConstituencyResult]) -> Vec<Vec<String>> {
    constituencies
        .iter()
        .map(|c| {
            vec![
                c.constituency.clone().unwrap_or_default(),
                c.state.clone().unwrap_or_default(),
                c.winner.clone().unwrap_or_default(),
                c.party.clone().unwrap_or_default(),
                c.margin.map(format_number).unwrap_or_default(),
                format_percent(c.margin_percent),
                format_percent(c.turnout),
            ]
        })
        .collect()
}

/// Headline figures and distributions for a single election year.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPage {
    pub summary: YearSummary,
    pub top_parties: Vec<(String, u32)>,
    pub top_states: Vec<(String, u32)>,
    /// Seats won by the leading party, per state.
    pub leader_states: Vec<(String, u32)>,
    pub margins: IndexMap<MarginBucket, u32>,
    pub widest_margins: Vec<ConstituencyResult>,
    pub highest_turnout: Vec<ConstituencyResult>,
}

impl SummaryPage {
    pub fn build(result: &ElectionYearResult) -> Self {
        let summary = year_summary(result);
        let leader_states = summary
            .leading_party
            .as_deref()
            .map(|party| top_n_by_value(party_seats_by_state(&result.constituencies, party), 10))
            .unwrap_or_default();

        Self {
            top_parties: top_n_by_value(
                result.party_seats.iter().map(|(p, s)| (p.clone(), *s)),
                10,
            ),
            top_states: top_n_by_value(group_seats_by_state(&result.constituencies), 10),
            leader_states,
            margins: margin_distribution(&result.constituencies),
            widest_margins: top_by_margin(&result.constituencies, 10)
                .into_iter()
                .cloned()
                .collect(),
            highest_turnout: top_by_turnout(&result.constituencies, 10)
                .into_iter()
                .cloned()
                .collect(),
            summary,
        }
    }

    pub fn render(&self, dir: &Path) -> Result<ChartHandle> {
        let year = year_label(self.summary.year);
        render_page(dir, |w| {
            let parties: Vec<&str> = self.top_parties.iter().map(|(p, _)| p.as_str()).collect();
            ranked_bar(
                w,
                "party_seats",
                format!("Top Parties by Seats ({year})"),
                "Seats Won",
                &self.top_parties,
                party_colors(&parties),
            )?;
            ranked_bar(
                w,
                "state_seats",
                format!("Top States by Seats ({year})"),
                "Number of Constituencies",
                &self.top_states,
                single(palette_color(0)),
            )?;
            if let Some(leader) = &self.summary.leading_party {
                ranked_bar(
                    w,
                    "leading_party_states",
                    format!("{leader}: Seats by State ({year})"),
                    "Seats Won",
                    &self.leader_states,
                    single(party_color(leader)),
                )?;
            }

            w.chart(
                "margin_distribution",
                &ChartSpec::new(ChartKind::Doughnut, format!("Victory Margin Distribution ({year})"))
                    .labels(self.margins.keys().map(|b| b.label()))
                    .dataset(Dataset::values(
                        "Seats",
                        self.margins.values().copied(),
                        Color::PerPoint(
                            (0..self.margins.len())
                                .map(|i| palette_color(i).to_string())
                                .collect(),
                        ),
                    )),
            )?;

            let columns = headers(&[
                "Constituency",
                "State",
                "Winner",
                "Party",
                "Margin",
                "Margin %",
                "Turnout %",
            ]);
            w.table("widest_margins", &columns, &constituency_rows(&self.widest_margins))?;
            w.table("highest_turnout", &columns, &constituency_rows(&self.highest_turnout))?;

            let s = &self.summary;
            w.table(
                "summary",
                &headers(&["Year", "Constituencies", "Leading Party", "Leading Seats", "Avg Turnout %"]),
                &[vec![
                    year.clone(),
                    s.total_constituencies.to_string(),
                    s.leading_party.clone().unwrap_or_else(|| "N/A".to_string()),
                    s.leading_seats.to_string(),
                    format_percent(s.avg_turnout),
                ]],
            )
        })
    }

    /// [`render`](Self::render), then appends the summary row to the `history` CSV.
    ///
    /// When the row cannot be written the page just rendered is disposed, so
    /// a failed run leaves no files behind.
    pub fn render_recorded(&self, dir: &Path, history: &Path) -> Result<ChartHandle> {
        let handle = self.render(dir)?;
        if let Err(e) = append_record(history, &self.summary) {
            if let Err(cleanup) = handle.dispose() {
                warn!(error = %cleanup, "Failed to remove page after history write failed");
            }
            return Err(e);
        }
        Ok(handle)
    }
}

/// Several election years side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct YearComparisonPage {
    pub years: Vec<Year>,
    /// Top 8 parties by seats over the selected years.
    pub performance: Vec<SeatMatrixRow>,
    /// Top 5 parties, swing between each pair of consecutive years.
    pub swings: SwingSeries,
    /// Seat change of every party from the first to the last selected year.
    pub net_swing: IndexMap<String, i64>,
    /// Top 15 parties.
    pub table: Vec<SeatMatrixRow>,
    pub turnout: Vec<(Year, f64)>,
}

impl YearComparisonPage {
    /// `selected` are the requested years; when empty, every year in the response is used.
    pub fn build(comparison: &YearComparison, selected: &[Year]) -> Self {
        let series = PartyPerformanceSeries::from_comparison(comparison);
        let mut years = if selected.is_empty() {
            series.years()
        } else {
            selected.to_vec()
        };
        years.sort_unstable();
        years.dedup();

        let net_swing = match (years.first(), years.last()) {
            (Some(first), Some(last)) if first != last => {
                seat_swing(&series.snapshot(*first), &series.snapshot(*last))
            }
            _ => IndexMap::new(),
        };

        let mut turnout: Vec<(Year, f64)> = comparison
            .turnout_comparison
            .iter()
            .filter_map(|t| Some((t.year?, t.avg_turnout?)))
            .collect();
        turnout.sort_by_key(|(year, _)| *year);

        Self {
            performance: seat_matrix(&series, &years, &series.top_parties(8)),
            swings: consecutive_swings(&series, &years, &series.top_parties(5)),
            net_swing,
            table: seat_matrix(&series, &years, &series.top_parties(15)),
            turnout,
            years,
        }
    }

    pub fn render(&self, dir: &Path) -> Result<ChartHandle> {
        render_page(dir, |w| {
            let mut performance =
                ChartSpec::new(ChartKind::Bar, "Party Performance Comparison").labels(&self.years);
            for row in &self.performance {
                performance = performance.dataset(Dataset::values(
                    &row.party,
                    row.seats.iter().copied(),
                    single(party_color(&row.party)),
                ));
            }
            w.chart("party_performance", &performance.y_axis(Axis::titled("Seats")))?;

            let mut swing =
                ChartSpec::new(ChartKind::Bar, "Seat Swing Analysis").labels(&self.swings.labels);
            for (party, deltas) in &self.swings.swings {
                swing = swing.dataset(Dataset::new(
                    party,
                    deltas.iter().map(|d| Some(*d as f64)).collect(),
                    single(party_color(party)),
                ));
            }
            w.chart("seat_swing", &swing.y_axis(Axis::titled("Seat Change")))?;

            let turnout: Vec<f64> = self.turnout.iter().map(|(_, t)| *t).collect();
            w.chart(
                "turnout",
                &ChartSpec::new(ChartKind::Bar, "Voter Turnout Comparison")
                    .labels(self.turnout.iter().map(|(y, _)| y))
                    .dataset(Dataset::values(
                        "Average Turnout (%)",
                        turnout.iter().copied(),
                        single(palette_color(0)),
                    ))
                    .y_axis(Axis::bounded(
                        "Turnout (%)",
                        percent_axis_bounds(turnout.iter().copied(), TURNOUT_PAD),
                    )),
            )?;

            let mut columns = vec!["Party".to_string()];
            columns.extend(self.years.iter().map(|y| y.to_string()));
            columns.push("Change".to_string());
            let rows: Vec<Vec<String>> = self
                .table
                .iter()
                .map(|row| {
                    let mut cells = vec![row.party.clone()];
                    cells.extend(row.seats.iter().map(|s| s.to_string()));
                    cells.push(format_change(row.change));
                    cells
                })
                .collect();
            w.table("comparison", &columns, &rows)?;

            let rows: Vec<Vec<String>> = self
                .net_swing
                .iter()
                .map(|(party, change)| vec![party.clone(), format_change(Some(*change))])
                .collect();
            w.table("net_swing", &headers(&["Party", "Change"]), &rows)
        })
    }
}

/// Selected parties compared across every year in the response.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyComparisonPage {
    pub growth: GrowthSeries,
    pub table: Vec<SeatMatrixRow>,
}

impl PartyComparisonPage {
    /// `selected` are the requested parties; when empty, the parties listed in the response are used.
    pub fn build(comparison: &PartyComparison, selected: &[String]) -> Self {
        let series = PartyPerformanceSeries::from_party_comparison(comparison);
        let parties = if selected.is_empty() {
            comparison.parties.clone()
        } else {
            selected.to_vec()
        };
        let growth = growth_by_party(&series, &parties);
        let table = seat_matrix(&series, &growth.years, &parties);
        Self { growth, table }
    }

    pub fn render(&self, dir: &Path) -> Result<ChartHandle> {
        render_page(dir, |w| {
            let mut seats = ChartSpec::new(ChartKind::Line, "Party Performance Comparison Across Elections")
                .labels(&self.growth.years);
            let mut growth = ChartSpec::new(ChartKind::Line, "Party Growth/Decline Trend (% Change)")
                .labels(&self.growth.years);
            for (party, g) in &self.growth.parties {
                let color = single(party_color(party));
                seats = seats.dataset(Dataset::values(party, g.seats.iter().copied(), color.clone()));
                growth = growth.dataset(Dataset::new(party, g.growth.clone(), color));
            }
            w.chart("party_seats", &seats.y_axis(Axis::titled("Seats")))?;
            w.chart("party_growth", &growth.y_axis(Axis::titled("Percentage Change")))?;

            let mut columns = vec!["Party".to_string()];
            columns.extend(self.growth.years.iter().map(|y| y.to_string()));
            columns.push("Total".to_string());
            let rows: Vec<Vec<String>> = self
                .table
                .iter()
                .map(|row| {
                    let mut cells = vec![row.party.clone()];
                    cells.extend(row.seats.iter().map(|s| s.to_string()));
                    cells.push(row.total.to_string());
                    cells
                })
                .collect();
            w.table("party_seats", &columns, &rows)
        })
    }
}

/// National and state-level turnout.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnoutPage {
    pub years: Vec<Year>,
    pub national: Vec<Option<f64>>,
    pub latest: Option<(Year, Vec<(String, f64)>)>,
    pub states: Vec<StateTurnoutRow>,
}

impl TurnoutPage {
    pub fn build(overview: &TurnoutOverview) -> Self {
        Self {
            years: overview.years.clone(),
            national: overview.avg_turnout.clone(),
            latest: latest_state_turnout(overview),
            states: state_turnout_rows(overview),
        }
    }

    pub fn render(&self, dir: &Path) -> Result<ChartHandle> {
        render_page(dir, |w| {
            w.chart(
                "national_turnout",
                &ChartSpec::new(ChartKind::Line, "National Voter Turnout Trend")
                    .labels(&self.years)
                    .dataset(Dataset::new(
                        "Average Turnout (%)",
                        self.national.clone(),
                        single(palette_color(0)),
                    ))
                    .y_axis(Axis::bounded(
                        "Turnout (%)",
                        percent_axis_bounds(self.national.iter().flatten().copied(), TURNOUT_PAD),
                    )),
            )?;

            if let Some((year, ranked)) = &self.latest {
                w.chart(
                    "state_turnout_latest",
                    &ChartSpec::new(ChartKind::Bar, format!("State-wise Turnout ({year})"))
                        .labels(ranked.iter().map(|(s, _)| s))
                        .dataset(Dataset::values(
                            "Turnout (%)",
                            ranked.iter().map(|(_, t)| *t),
                            single(palette_color(1)),
                        ))
                        .y_axis(Axis::bounded(
                            "Turnout (%)",
                            percent_axis_bounds(ranked.iter().map(|(_, t)| *t), TURNOUT_PAD),
                        )),
                )?;
            }

            let mut columns = vec!["State".to_string()];
            columns.extend(self.years.iter().map(|y| y.to_string()));
            columns.extend(headers(&["Average", "Change"]));
            let rows: Vec<Vec<String>> = self
                .states
                .iter()
                .map(|row| {
                    let mut cells = vec![row.state.clone()];
                    cells.extend(
                        (0..self.years.len()).map(|i| format_percent(row.turnouts.get(i).copied().flatten())),
                    );
                    cells.push(format_percent(Some(row.average)));
                    cells.push(format_percent(row.change));
                    cells
                })
                .collect();
            w.table("state_turnout", &columns, &rows)
        })
    }
}

/// One party's record across elections.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyPage {
    pub name: String,
    pub shares: Vec<SeatShare>,
    /// Constituencies won, latest year first.
    pub won: Vec<WonSeatRow>,
    /// Top 10 states by seats won in the latest election.
    pub latest_states: Option<(Year, Vec<(String, u32)>)>,
}

impl PartyPage {
    /// `requested` names the page when the response carries no name.
    ///
    /// `states` maps constituency names to states for seats whose record has no state.
    pub fn build(profile: &PartyProfile, requested: &str, states: &IndexMap<String, String>) -> Self {
        Self {
            name: profile.name.clone().unwrap_or_else(|| requested.to_string()),
            shares: seat_share_series(profile),
            won: won_constituencies(profile),
            latest_states: latest_won_by_state(profile, states, 10),
        }
    }

    pub fn render(&self, dir: &Path) -> Result<ChartHandle> {
        render_page(dir, |w| {
            let years: Vec<Year> = self.shares.iter().map(|s| s.year).collect();
            w.chart(
                "seat_performance",
                &ChartSpec::new(ChartKind::Bar, format!("{}: Seat Performance", self.name))
                    .labels(&years)
                    .dataset(Dataset::values(
                        "Seats Won",
                        self.shares.iter().map(|s| s.seats_won),
                        single(party_color(&self.name)),
                    ))
                    .dataset(Dataset::values(
                        "Total Seats",
                        self.shares.iter().map(|s| s.total_seats),
                        single(palette_color(7)),
                    ))
                    .y_axis(Axis::titled("Seats")),
            )?;

            let percentages: Vec<f64> = self.shares.iter().map(|s| s.percentage).collect();
            w.chart(
                "seat_share",
                &ChartSpec::new(ChartKind::Line, format!("{}: Percentage of Seats Won", self.name))
                    .labels(&years)
                    .dataset(Dataset::values(
                        "Percentage of Seats Won",
                        percentages.iter().copied(),
                        single(party_color(&self.name)),
                    ))
                    .y_axis(Axis::bounded(
                        "Seats Won (%)",
                        percent_axis_bounds(percentages.iter().copied(), TURNOUT_PAD),
                    )),
            )?;

            let rows: Vec<Vec<String>> = self
                .shares
                .iter()
                .map(|s| {
                    vec![
                        s.year.to_string(),
                        s.seats_won.to_string(),
                        s.total_seats.to_string(),
                        format_percent(Some(s.percentage)),
                    ]
                })
                .collect();
            w.table(
                "seat_share",
                &headers(&["Year", "Seats Won", "Total Seats", "Percentage"]),
                &rows,
            )?;

            if let Some((year, ranked)) = &self.latest_states {
                if !ranked.is_empty() {
                    w.chart(
                        "seats_by_state",
                        &ChartSpec::new(ChartKind::Bar, format!("{}: Seats by State ({year})", self.name))
                            .labels(ranked.iter().map(|(s, _)| s))
                            .dataset(Dataset::values(
                                "Seats Won",
                                ranked.iter().map(|(_, n)| *n),
                                single(party_color(&self.name)),
                            ))
                            .y_axis(Axis::titled("Seats"))
                            .horizontal(),
                    )?;
                }
            }

            let mut rows: Vec<Vec<String>> = self
                .won
                .iter()
                .take(WON_SEATS_SHOWN)
                .map(|seat| {
                    vec![
                        seat.year.to_string(),
                        seat.name.clone(),
                        seat.winner.clone().unwrap_or_else(|| "N/A".to_string()),
                        format_percent(seat.margin_percent),
                    ]
                })
                .collect();
            if self.won.len() > WON_SEATS_SHOWN {
                rows.push(vec![
                    String::new(),
                    format!("Showing {WON_SEATS_SHOWN} of {} constituencies", self.won.len()),
                    String::new(),
                    String::new(),
                ]);
            }
            w.table(
                "constituencies_won",
                &headers(&["Year", "Constituency", "Winner", "Margin %"]),
                &rows,
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSection {
    pub kind: String,
    pub seats_by_year: Vec<u32>,
    pub top_parties: Vec<(String, u32)>,
}

/// Results split by reservation category.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstituencyTypePage {
    pub years: Vec<Year>,
    pub sections: Vec<TypeSection>,
}

impl ConstituencyTypePage {
    /// Keeps only the category matching `filter` (`GEN`, `SC`, `ST`; case-insensitive) when given.
    pub fn build(breakdown: &ConstituencyTypeBreakdown, filter: Option<&str>) -> Self {
        let wanted = filter.map(ConstituencyType::from);
        let kinds: Vec<&String> = if breakdown.types.is_empty() {
            breakdown.data.keys().collect()
        } else {
            breakdown.types.iter().collect()
        };

        let sections = kinds
            .into_iter()
            .filter(|kind| {
                wanted
                    .as_ref()
                    .is_none_or(|w| *w == ConstituencyType::from(kind.as_str()))
            })
            .map(|kind| TypeSection {
                kind: kind.clone(),
                seats_by_year: breakdown
                    .data
                    .get(kind.as_str())
                    .map(|stats| stats.seats_by_year.clone())
                    .unwrap_or_default(),
                top_parties: top_parties_by_type(breakdown, kind, 5),
            })
            .collect();

        Self {
            years: breakdown.years.clone(),
            sections,
        }
    }

    pub fn render(&self, dir: &Path) -> Result<ChartHandle> {
        render_page(dir, |w| {
            let kinds: Vec<&str> = self.sections.iter().map(|s| s.kind.as_str()).collect();
            let latest = match self.years.last() {
                Some(year) => format!("Constituency Types ({year})"),
                None => "Constituency Types".to_string(),
            };
            w.chart(
                "seats_by_type",
                &ChartSpec::new(ChartKind::Pie, latest)
                    .labels(&kinds)
                    .dataset(Dataset::values(
                        "Constituencies",
                        self.sections
                            .iter()
                            .map(|s| s.seats_by_year.last().copied().unwrap_or(0)),
                        Color::PerPoint((0..kinds.len()).map(|i| palette_color(i).to_string()).collect()),
                    )),
            )?;

            let mut rows = Vec::new();
            for section in &self.sections {
                let parties: Vec<&str> = section.top_parties.iter().map(|(p, _)| p.as_str()).collect();
                ranked_bar(
                    w,
                    &format!("top_parties_{}", slug(&section.kind)),
                    format!("Top Parties in {} Constituencies", section.kind),
                    "Seats Won",
                    &section.top_parties,
                    party_colors(&parties),
                )?;
                for (rank, (party, seats)) in section.top_parties.iter().enumerate() {
                    rows.push(vec![
                        section.kind.clone(),
                        (rank + 1).to_string(),
                        party.clone(),
                        seats.to_string(),
                    ]);
                }
            }
            w.table("top_parties", &headers(&["Type", "Rank", "Party", "Seats"]), &rows)
        })
    }
}

/// All parties ranked by seats across elections, with the trends of the leading ones.
#[derive(Debug, Clone, PartialEq)]
pub struct PartiesPage {
    pub years: Vec<Year>,
    pub ranked: Vec<(String, u32)>,
    /// Seat series of the top 6 parties.
    pub major: IndexMap<String, Vec<u32>>,
}

impl PartiesPage {
    /// `listed` is every party the backend knows (`/parties`). Parties without
    /// a seat series follow the ranked ones alphabetically with 0 seats.
    pub fn build(trends: &PartyTrends, listed: &[String]) -> Self {
        let mut names: Vec<String> = if trends.parties.is_empty() {
            trends.seat_trends.keys().cloned().collect()
        } else {
            trends.parties.clone()
        };
        let mut extra: Vec<String> = listed
            .iter()
            .filter(|party| !names.contains(party) && !trends.seat_trends.contains_key(*party))
            .cloned()
            .collect();
        extra.sort();
        names.extend(extra);
        let total = |party: &str| -> u32 {
            trends
                .seat_trends
                .get(party)
                .map(|s| s.iter().sum())
                .unwrap_or(0)
        };

        let mut ranked: Vec<(String, u32)> = rank_names_by_total(&names, &trends.seat_trends)
            .into_iter()
            .map(|party| {
                let seats = total(&party);
                (party, seats)
            })
            .collect();
        if ranked.len() < names.len() {
            ranked.extend(
                names
                    .iter()
                    .filter(|party| !trends.seat_trends.contains_key(*party))
                    .map(|party| (party.clone(), 0)),
            );
        }
        let major = ranked
            .iter()
            .take(6)
            .filter_map(|(party, _)| {
                trends
                    .seat_trends
                    .get(party)
                    .map(|series| (party.clone(), series.clone()))
            })
            .collect();

        Self {
            years: trends.years.clone(),
            ranked,
            major,
        }
    }

    pub fn render(&self, dir: &Path) -> Result<ChartHandle> {
        render_page(dir, |w| {
            let mut chart =
                ChartSpec::new(ChartKind::Line, "Major Parties Performance Trend").labels(&self.years);
            for (party, seats) in &self.major {
                chart = chart.dataset(Dataset::values(
                    party,
                    seats.iter().copied(),
                    single(party_color(party)),
                ));
            }
            w.chart("major_party_trends", &chart.y_axis(Axis::titled("Seats")))?;

            let rows: Vec<Vec<String>> = self
                .ranked
                .iter()
                .enumerate()
                .map(|(i, (party, seats))| vec![(i + 1).to_string(), party.clone(), seats.to_string()])
                .collect();
            w.table("parties", &headers(&["Rank", "Party", "Total Seats"]), &rows)
        })
    }
}

/// One constituency's results across elections.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstituencyPage {
    pub name: String,
    /// Results in year order.
    pub timeline: Vec<ConstituencyResult>,
    pub history: ElectionHistory,
}

impl ConstituencyPage {
    /// `requested` names the page when the response carries no name.
    pub fn build(history: &ConstituencyHistory, requested: &str) -> Self {
        let timeline = constituency_timeline(history);
        Self {
            name: history.name.clone().unwrap_or_else(|| requested.to_string()),
            history: election_history(&timeline),
            timeline,
        }
    }

    pub fn render(&self, dir: &Path) -> Result<ChartHandle> {
        render_page(dir, |w| {
            let mut winners = ChartSpec::new(ChartKind::Bar, format!("Election History for {}", self.name))
                .labels(&self.history.years)
                .stacked();
            for (party, won) in &self.history.winners {
                winners = winners.dataset(Dataset::values(party, won.iter().copied(), single(party_color(party))));
            }
            w.chart("election_history", &winners.y_axis(Axis::bounded("Won", (0.0, 1.0))))?;

            let turnout: Vec<Option<f64>> = self.timeline.iter().map(|r| r.turnout).collect();
            w.chart(
                "turnout",
                &ChartSpec::new(ChartKind::Line, format!("Voter Turnout Trend for {}", self.name))
                    .labels(&self.history.years)
                    .dataset(Dataset::new("Voter Turnout (%)", turnout.clone(), single(palette_color(2))))
                    .y_axis(Axis::bounded(
                        "Turnout (%)",
                        percent_axis_bounds(turnout.iter().flatten().copied(), TURNOUT_PAD),
                    )),
            )?;

            let rows: Vec<Vec<String>> = self
                .timeline
                .iter()
                .rev()
                .map(|r| {
                    vec![
                        year_label(r.year),
                        r.winner.clone().unwrap_or_else(|| "N/A".to_string()),
                        r.party.clone().unwrap_or_else(|| "N/A".to_string()),
                        r.votes.map_or_else(|| "N/A".to_string(), format_number),
                        r.margin.map_or_else(|| "N/A".to_string(), format_number),
                        format_percent(r.margin_percent),
                        format_percent(r.turnout),
                    ]
                })
                .collect();
            w.table(
                "results",
                &headers(&["Year", "Winner", "Party", "Votes", "Margin", "Margin %", "Turnout %"]),
                &rows,
            )
        })
    }
}

/// Every constituency of one election, alphabetically, optionally narrowed to a state.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstituencyListPage {
    pub year: Option<Year>,
    pub constituencies: Vec<ConstituencyResult>,
}

impl ConstituencyListPage {
    /// `state` is matched case-insensitively. Records without a name are left out.
    pub fn build(result: &ElectionYearResult, state: Option<&str>) -> Self {
        let mut constituencies: Vec<ConstituencyResult> = result
            .constituencies
            .iter()
            .filter(|c| c.constituency.is_some())
            .filter(|c| {
                state.is_none_or(|wanted| {
                    c.state
                        .as_deref()
                        .is_some_and(|s| s.eq_ignore_ascii_case(wanted.trim()))
                })
            })
            .cloned()
            .collect();
        constituencies.sort_by(|a, b| a.constituency.cmp(&b.constituency));
        Self {
            year: result.year,
            constituencies,
        }
    }

    pub fn render(&self, dir: &Path) -> Result<ChartHandle> {
        render_page(dir, |w| {
            let rows: Vec<Vec<String>> = self
                .constituencies
                .iter()
                .map(|c| {
                    vec![
                        c.constituency.clone().unwrap_or_default(),
                        c.state.clone().unwrap_or_else(|| "N/A".to_string()),
                        c.kind.as_ref().map_or("GEN", |k| k.code()).to_string(),
                        c.winner.clone().unwrap_or_else(|| "N/A".to_string()),
                        c.party.clone().unwrap_or_else(|| "N/A".to_string()),
                    ]
                })
                .collect();
            w.table(
                "constituencies",
                &headers(&["Constituency", "State", "Type", "Winner", "Party"]),
                &rows,
            )
        })
    }
}

/// Party seats and vote share within one state.
#[derive(Debug, Clone, PartialEq)]
pub struct StatePartyPage {
    pub state: String,
    pub party: Option<String>,
    pub series: StatePartySeries,
}

impl StatePartyPage {
    pub fn build(trends: &StatePartyTrends, state: &str, party: Option<&str>) -> Self {
        Self {
            state: trends.state.clone().unwrap_or_else(|| state.to_string()),
            party: party.map(String::from),
            series: state_party_series(trends),
        }
    }

    fn subject(&self) -> String {
        match &self.party {
            Some(party) => format!("{party} in {}", self.state),
            None => format!("Parties in {}", self.state),
        }
    }

    pub fn render(&self, dir: &Path) -> Result<ChartHandle> {
        let subject = self.subject();
        render_page(dir, |w| {
            let mut seats =
                ChartSpec::new(ChartKind::Line, format!("Seats: {subject}")).labels(&self.series.years);
            for (party, series) in &self.series.seats {
                seats = seats.dataset(Dataset::values(party, series.iter().copied(), single(party_color(party))));
            }
            w.chart("seat_trends", &seats.y_axis(Axis::titled("Number of Seats")))?;

            let mut share =
                ChartSpec::new(ChartKind::Line, format!("Vote Share: {subject}")).labels(&self.series.years);
            for (party, series) in &self.series.vote_share {
                share = share.dataset(Dataset::new(party, series.clone(), single(party_color(party))));
            }
            w.chart("vote_share_trends", &share.y_axis(Axis::bounded("Vote Share (%)", (0.0, 100.0))))?;

            let mut columns = vec!["Election Year".to_string()];
            columns.extend(self.series.seats.keys().map(|p| format!("{p} Seats")));
            columns.extend(self.series.vote_share.keys().map(|p| format!("{p} Vote %")));
            let rows: Vec<Vec<String>> = self
                .series
                .years
                .iter()
                .enumerate()
                .map(|(i, year)| {
                    let mut cells = vec![year.to_string()];
                    cells.extend(
                        self.series
                            .seats
                            .values()
                            .map(|s| s.get(i).copied().unwrap_or(0).to_string()),
                    );
                    cells.extend(
                        self.series
                            .vote_share
                            .values()
                            .map(|s| format_percent(s.get(i).copied().flatten())),
                    );
                    cells
                })
                .collect();
            w.table("state_party", &columns, &rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PartyYearPerformance, TypeStats, WonSeat, YearSeats, YearTurnout};

    fn seat(state: &str, party: &str, margin_percent: f64) -> ConstituencyResult {
        ConstituencyResult {
            constituency: Some(format!("{state}-{party}-{margin_percent}")),
            state: Some(state.to_string()),
            party: Some(party.to_string()),
            margin_percent: Some(margin_percent),
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_page() {
        let result = ElectionYearResult {
            year: Some(2024),
            constituencies: vec![
                seat("Kerala", "P", 0.5),
                seat("Kerala", "Q", 25.0),
                seat("Goa", "P", 7.0),
            ],
            party_seats: [("P".to_string(), 2), ("Q".to_string(), 1)]
                .into_iter()
                .collect(),
            avg_turnout: None,
        };
        let page = SummaryPage::build(&result);
        assert_eq!(page.top_parties[0], ("P".to_string(), 2));
        assert_eq!(page.top_states[0], ("Kerala".to_string(), 2));
        assert_eq!(page.leader_states.len(), 2);
        assert_eq!(page.margins[&MarginBucket::VeryClose], 1);
        assert_eq!(page.margins[&MarginBucket::Landslide], 1);
        assert_eq!(page.widest_margins[0].party.as_deref(), Some("Q"));
        assert!(page.highest_turnout.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let handle = page.render(dir.path()).unwrap();
        let names: Vec<String> = handle
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.contains(&"margin_distribution.json".to_string()));
        assert!(names.contains(&"summary.csv".to_string()));

        let summary = std::fs::read_to_string(dir.path().join("summary.csv")).unwrap();
        assert_eq!(summary.lines().nth(1), Some("2024,3,P,2,N/A"));
    }

    #[test]
    fn test_year_comparison_page() {
        let mut performance = IndexMap::new();
        performance.insert(
            "P".to_string(),
            vec![
                YearSeats { year: Some(2019), seats: Some(303) },
                YearSeats { year: Some(2014), seats: Some(282) },
            ],
        );
        performance.insert(
            "Q".to_string(),
            vec![YearSeats { year: Some(2019), seats: Some(52) }],
        );
        let comparison = YearComparison {
            years: vec![2014, 2019],
            party_performance: performance,
            turnout_comparison: vec![
                YearTurnout { year: Some(2019), avg_turnout: Some(67.4) },
                YearTurnout { year: Some(2014), avg_turnout: Some(66.4) },
            ],
        };

        let page = YearComparisonPage::build(&comparison, &[2019, 2014]);
        assert_eq!(page.years, vec![2014, 2019]);
        assert_eq!(page.swings.labels, vec!["2014 to 2019"]);
        assert_eq!(page.swings.swings["P"], vec![21]);
        assert_eq!(page.swings.swings["Q"], vec![52]);
        assert_eq!(page.net_swing["Q"], 52);
        assert_eq!(page.table[1].seats, vec![0, 52]);
        assert_eq!(page.turnout, vec![(2014, 66.4), (2019, 67.4)]);

        let dir = tempfile::tempdir().unwrap();
        page.render(dir.path()).unwrap();
        let table = std::fs::read_to_string(dir.path().join("comparison.csv")).unwrap();
        assert_eq!(table, "Party,2014,2019,Change\nP,282,303,+21\nQ,0,52,+52\n");
    }

    #[test]
    fn test_party_comparison_growth_has_gaps() {
        let comparison: PartyComparison = crate::parser::parse_json(
            br#"{
                "parties": ["New"],
                "data": [
                    {"year": 2014, "party_seats": {"New": 0}},
                    {"year": 2019, "party_seats": {"New": 4}},
                    {"year": 2024, "party_seats": {"New": 8}}
                ]
            }"#,
        )
        .unwrap();
        let page = PartyComparisonPage::build(&comparison, &[]);
        assert_eq!(page.table[0].total, 12);

        let dir = tempfile::tempdir().unwrap();
        page.render(dir.path()).unwrap();
        let chart: serde_json::Value = serde_json::from_slice(
            &std::fs::read(dir.path().join("party_growth.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            chart["datasets"][0]["data"],
            serde_json::json!([null, 0.0, 100.0])
        );
    }

    #[test]
    fn test_constituency_type_filter() {
        let mut data = IndexMap::new();
        for (kind, party) in [("GEN", "P"), ("SC", "Q")] {
            let mut performance = IndexMap::new();
            performance.insert(party.to_string(), vec![10, 20]);
            data.insert(
                kind.to_string(),
                TypeStats {
                    seats_by_year: vec![412, 412],
                    party_performance: performance,
                    ..Default::default()
                },
            );
        }
        let breakdown = ConstituencyTypeBreakdown {
            types: vec!["GEN".to_string(), "SC".to_string()],
            years: vec![2019, 2024],
            data,
        };

        let all = ConstituencyTypePage::build(&breakdown, None);
        assert_eq!(all.sections.len(), 2);

        let sc = ConstituencyTypePage::build(&breakdown, Some("sc"));
        assert_eq!(sc.sections.len(), 1);
        assert_eq!(sc.sections[0].top_parties, vec![("Q".to_string(), 30)]);
    }

    #[test]
    fn test_parties_page_ranking() {
        let mut seat_trends = IndexMap::new();
        seat_trends.insert("Small".to_string(), vec![1, 2]);
        seat_trends.insert("Big".to_string(), vec![100, 200]);
        let trends = PartyTrends {
            parties: vec!["Small".to_string(), "Big".to_string(), "Unlisted".to_string()],
            years: vec![2019, 2024],
            seat_trends,
        };
        let listed = vec!["Zeta Front".to_string(), "Big".to_string(), "Alpha Sangh".to_string()];
        let page = PartiesPage::build(&trends, &listed);
        assert_eq!(page.ranked[0], ("Big".to_string(), 300));
        assert_eq!(page.major.len(), 2);
        let unranked: Vec<&str> = page.ranked[2..].iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(unranked, vec!["Unlisted", "Alpha Sangh", "Zeta Front"]);
        assert!(page.ranked[2..].iter().all(|(_, seats)| *seats == 0));
    }

    #[test]
    fn test_parties_page_without_trends_lists_parties() {
        let listed = vec!["Shiv Sena".to_string(), "Aam Aadmi Party".to_string()];
        let page = PartiesPage::build(&PartyTrends::default(), &listed);
        assert_eq!(
            page.ranked,
            vec![("Aam Aadmi Party".to_string(), 0), ("Shiv Sena".to_string(), 0)]
        );
        assert!(page.major.is_empty());
    }

    #[test]
    fn test_summary_history_failure_removes_page() {
        let result = ElectionYearResult {
            year: Some(2024),
            constituencies: vec![seat("Kerala", "P", 3.0)],
            party_seats: [("P".to_string(), 1)].into_iter().collect(),
            avg_turnout: Some(70.0),
        };
        let page = SummaryPage::build(&result);
        let out = tempfile::tempdir().unwrap();
        let dir = out.path().join("summary-2024");
        // A directory where the history file should be makes the append fail.
        let history = out.path().join("summary_history.csv");
        std::fs::create_dir(&history).unwrap();

        assert!(page.render_recorded(&dir, &history).is_err());
        let left: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert!(left.is_empty(), "{left:?}");

        std::fs::remove_dir(&history).unwrap();
        let handle = page.render_recorded(&dir, &history).unwrap();
        assert!(handle.files().iter().all(|f| f.exists()));
        let rows = std::fs::read_to_string(&history).unwrap();
        assert_eq!(rows.lines().count(), 2);
    }

    #[test]
    fn test_constituency_type_names_are_file_safe() {
        let mut data = IndexMap::new();
        let mut performance = IndexMap::new();
        performance.insert("P".to_string(), vec![3]);
        data.insert(
            "SC/ST".to_string(),
            TypeStats {
                seats_by_year: vec![131],
                party_performance: performance,
                ..Default::default()
            },
        );
        let breakdown = ConstituencyTypeBreakdown {
            types: vec!["SC/ST".to_string()],
            years: vec![2024],
            data,
        };

        let dir = tempfile::tempdir().unwrap();
        ConstituencyTypePage::build(&breakdown, None)
            .render(dir.path())
            .unwrap();
        assert!(dir.path().join("top_parties_sc-st.json").exists());
    }

    fn won(year: Year, names: &[&str]) -> PartyYearPerformance {
        PartyYearPerformance {
            year: Some(year),
            seats_won: Some(names.len() as u32),
            total_seats: Some(543),
            constituencies: names
                .iter()
                .map(|name| WonSeat {
                    name: Some(name.to_string()),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_party_page_won_seats_and_states() {
        let many: Vec<String> = (0..120).map(|i| format!("Seat {i:03}")).collect();
        let many: Vec<&str> = many.iter().map(String::as_str).collect();
        let profile = PartyProfile {
            name: Some("P".to_string()),
            performance: vec![won(2019, &many), won(2024, &["Mandi", "Agra", "Shimla"])],
        };
        let mut states = IndexMap::new();
        states.insert("Mandi".to_string(), "Himachal Pradesh".to_string());
        states.insert("Shimla".to_string(), "Himachal Pradesh".to_string());
        states.insert("Agra".to_string(), "Uttar Pradesh".to_string());

        let page = PartyPage::build(&profile, "p", &states);
        assert_eq!(page.won.len(), 123);
        assert_eq!(page.won[0].name, "Agra");
        assert_eq!(
            page.latest_states,
            Some((
                2024,
                vec![
                    ("Himachal Pradesh".to_string(), 2),
                    ("Uttar Pradesh".to_string(), 1)
                ]
            ))
        );

        let dir = tempfile::tempdir().unwrap();
        page.render(dir.path()).unwrap();
        let table = std::fs::read_to_string(dir.path().join("constituencies_won.csv")).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        // Header, 100 seats and the note.
        assert_eq!(lines.len(), 102);
        assert_eq!(lines[1], "2024,Agra,N/A,N/A");
        assert_eq!(lines[101], ",Showing 100 of 123 constituencies,,");
        assert!(dir.path().join("seats_by_state.json").exists());
    }

    #[test]
    fn test_constituency_page() {
        let history: ConstituencyHistory = crate::parser::parse_json(
            br#"{
                "name": "Amethi",
                "results": [
                    {"year": 2024, "party": "Q", "winner": "K", "votes": 539228, "margin": 167196, "turnout": "54.3%"},
                    {"year": 2014, "party": "P", "winner": "R", "votes": 408651, "turnout": 52.4},
                    {"year": 2019, "party": "Q", "winner": "S"}
                ]
            }"#,
        )
        .unwrap();
        let page = ConstituencyPage::build(&history, "amethi");
        assert_eq!(page.name, "Amethi");
        assert_eq!(page.history.years, vec![2014, 2019, 2024]);
        assert_eq!(page.history.winners["Q"], vec![0, 1, 1]);

        let dir = tempfile::tempdir().unwrap();
        page.render(dir.path()).unwrap();
        let table = std::fs::read_to_string(dir.path().join("results.csv")).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[1], "2024,K,Q,\"539,228\",\"167,196\",N/A,54.30");
        assert_eq!(lines[2], "2019,S,Q,N/A,N/A,N/A,N/A");

        let chart: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("turnout.json")).unwrap()).unwrap();
        assert_eq!(chart["datasets"][0]["data"], serde_json::json!([52.4, null, 54.3]));
        assert_eq!(chart["y_axis"]["min"], serde_json::json!(52.4 - 5.0));
    }

    #[test]
    fn test_constituency_list_page() {
        let result = ElectionYearResult {
            year: Some(2024),
            constituencies: vec![
                seat("Kerala", "P", 1.0),
                seat("Goa", "Q", 2.0),
                ConstituencyResult::default(),
                seat("Kerala", "Q", 0.5),
            ],
            ..Default::default()
        };
        let all = ConstituencyListPage::build(&result, None);
        assert_eq!(all.constituencies.len(), 3);
        assert_eq!(all.constituencies[0].state.as_deref(), Some("Goa"));

        let kerala = ConstituencyListPage::build(&result, Some("kerala"));
        assert_eq!(kerala.constituencies.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        kerala.render(dir.path()).unwrap();
        let table = std::fs::read_to_string(dir.path().join("constituencies.csv")).unwrap();
        assert_eq!(table.lines().nth(1), Some("Kerala-P-1,Kerala,GEN,N/A,P"));
    }

    #[test]
    fn test_state_party_page_keeps_vote_share_gaps() {
        let trends: StatePartyTrends = crate::parser::parse_json(
            br#"{
                "years": [2019, 2024],
                "seat_trends": {"P": [18, 22], "Q": [2]},
                "vote_share_trends": {"P": [40.1, null]}
            }"#,
        )
        .unwrap();
        let page = StatePartyPage::build(&trends, "Tamil Nadu", None);
        assert_eq!(page.series.seats["Q"], vec![2, 0]);

        let dir = tempfile::tempdir().unwrap();
        page.render(dir.path()).unwrap();
        let table = std::fs::read_to_string(dir.path().join("state_party.csv")).unwrap();
        assert_eq!(
            table,
            "Election Year,P Seats,Q Seats,P Vote %\n2019,18,2,40.10\n2024,22,0,N/A\n"
        );
        let chart: serde_json::Value = serde_json::from_slice(
            &std::fs::read(dir.path().join("vote_share_trends.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(chart["datasets"][0]["data"], serde_json::json!([40.1, null]));
        assert_eq!(chart["title"], "Vote Share: Parties in Tamil Nadu");
    }

    #[test]
    fn test_turnout_page_table() {
        let mut states = IndexMap::new();
        states.insert("Goa".to_string(), vec![Some(77.0), None]);
        let overview = TurnoutOverview {
            years: vec![2019, 2024],
            avg_turnout: vec![Some(67.4), Some(65.8)],
            state_turnout: states,
        };
        let page = TurnoutPage::build(&overview);
        assert!(page.latest.as_ref().unwrap().1.is_empty());

        let dir = tempfile::tempdir().unwrap();
        page.render(dir.path()).unwrap();
        let table = std::fs::read_to_string(dir.path().join("state_turnout.csv")).unwrap();
        assert_eq!(table, "State,2019,2024,Average,Change\nGoa,77.00,N/A,77.00,N/A\n");
    }
}
