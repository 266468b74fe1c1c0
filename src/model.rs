//! Typed shapes of the election backend's JSON responses.
//!
//! Every field is optional or defaulted at decode time; see [`crate::parser`]
//! for how malformed values are treated.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::parser;

/// An election year, e.g. `2024`.
pub type Year = u16;

/// Reservation category of a constituency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ConstituencyType {
    General,
    ScheduledCaste,
    ScheduledTribe,
    Other(String),
}

impl ConstituencyType {
    pub fn code(&self) -> &str {
        match self {
            ConstituencyType::General => "GEN",
            ConstituencyType::ScheduledCaste => "SC",
            ConstituencyType::ScheduledTribe => "ST",
            ConstituencyType::Other(code) => code,
        }
    }
}

impl From<&str> for ConstituencyType {
    fn from(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "GEN" | "GENERAL" => ConstituencyType::General,
            "SC" => ConstituencyType::ScheduledCaste,
            "ST" => ConstituencyType::ScheduledTribe,
            other => ConstituencyType::Other(other.to_string()),
        }
    }
}

fn constituency_type<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<ConstituencyType>, D::Error> {
    Ok(parser::text(d)?.map(|code| ConstituencyType::from(code.as_str())))
}

/// One seat in one election year.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConstituencyResult {
    /// Set on `/constituency/{name}` results; absent inside a single-year snapshot.
    #[serde(default, deserialize_with = "parser::year")]
    pub year: Option<Year>,
    #[serde(default, deserialize_with = "parser::text")]
    pub constituency: Option<String>,
    #[serde(default, deserialize_with = "parser::text")]
    pub state: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "constituency_type")]
    pub kind: Option<ConstituencyType>,
    #[serde(default, deserialize_with = "parser::text")]
    pub winner: Option<String>,
    #[serde(default, deserialize_with = "parser::text")]
    pub party: Option<String>,
    #[serde(default, deserialize_with = "parser::count")]
    pub votes: Option<u64>,
    #[serde(default, deserialize_with = "parser::count")]
    pub margin: Option<u64>,
    #[serde(default, deserialize_with = "parser::percent")]
    pub margin_percent: Option<f64>,
    #[serde(default, deserialize_with = "parser::percent")]
    pub turnout: Option<f64>,
}

/// Snapshot of one election year (`/election/{year}`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ElectionYearResult {
    #[serde(default, deserialize_with = "parser::year")]
    pub year: Option<Year>,
    #[serde(default, deserialize_with = "parser::records")]
    pub constituencies: Vec<ConstituencyResult>,
    #[serde(default, deserialize_with = "parser::seat_map")]
    pub party_seats: IndexMap<String, u32>,
    #[serde(default, deserialize_with = "parser::percent")]
    pub avg_turnout: Option<f64>,
}

/// National and state turnout across years (`/turnout`).
///
/// `avg_turnout` and each `state_turnout` series are aligned with `years`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TurnoutOverview {
    #[serde(default, deserialize_with = "parser::years")]
    pub years: Vec<Year>,
    #[serde(default, deserialize_with = "parser::nullable_series")]
    pub avg_turnout: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "parser::series_map")]
    pub state_turnout: IndexMap<String, Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct YearSeats {
    #[serde(default, deserialize_with = "parser::year")]
    pub year: Option<Year>,
    #[serde(default, deserialize_with = "parser::seats")]
    pub seats: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct YearTurnout {
    #[serde(default, deserialize_with = "parser::year")]
    pub year: Option<Year>,
    #[serde(default, deserialize_with = "parser::percent")]
    pub avg_turnout: Option<f64>,
}

/// Side-by-side comparison of several years (`/compare/years`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct YearComparison {
    #[serde(default, deserialize_with = "parser::years")]
    pub years: Vec<Year>,
    #[serde(default, deserialize_with = "parser::record_lists")]
    pub party_performance: IndexMap<String, Vec<YearSeats>>,
    #[serde(default, deserialize_with = "parser::records")]
    pub turnout_comparison: Vec<YearTurnout>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct YearPartySeats {
    #[serde(default, deserialize_with = "parser::year")]
    pub year: Option<Year>,
    #[serde(default, deserialize_with = "parser::seat_map")]
    pub party_seats: IndexMap<String, u32>,
}

/// Seats of selected parties across all years (`/compare/parties`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartyComparison {
    #[serde(default, deserialize_with = "parser::names")]
    pub parties: Vec<String>,
    #[serde(default, deserialize_with = "parser::records")]
    pub data: Vec<YearPartySeats>,
}

/// Seats per party per year, aligned with `years` (`/party-trends`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartyTrends {
    #[serde(default, deserialize_with = "parser::names")]
    pub parties: Vec<String>,
    #[serde(default, deserialize_with = "parser::years")]
    pub years: Vec<Year>,
    #[serde(default, deserialize_with = "parser::count_series_map")]
    pub seat_trends: IndexMap<String, Vec<u32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WonSeat {
    #[serde(default, deserialize_with = "parser::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "parser::text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "parser::text")]
    pub winner: Option<String>,
    #[serde(default, deserialize_with = "parser::percent")]
    pub margin_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartyYearPerformance {
    #[serde(default, deserialize_with = "parser::year")]
    pub year: Option<Year>,
    #[serde(default, deserialize_with = "parser::seats")]
    pub seats_won: Option<u32>,
    #[serde(default, deserialize_with = "parser::seats")]
    pub total_seats: Option<u32>,
    #[serde(default, deserialize_with = "parser::percent")]
    pub percentage: Option<f64>,
    #[serde(default, deserialize_with = "parser::records")]
    pub constituencies: Vec<WonSeat>,
}

/// One party's results over time (`/party/{name}`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartyProfile {
    #[serde(default, deserialize_with = "parser::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "parser::records")]
    pub performance: Vec<PartyYearPerformance>,
}

/// Per-type series, aligned with [`ConstituencyTypeBreakdown::years`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TypeStats {
    #[serde(default, deserialize_with = "parser::count_series")]
    pub seats_by_year: Vec<u32>,
    #[serde(default, deserialize_with = "parser::nullable_series")]
    pub turnout_by_year: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "parser::count_series_map")]
    pub party_performance: IndexMap<String, Vec<u32>>,
}

/// Results split by reservation category (`/constituency-types`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConstituencyTypeBreakdown {
    #[serde(default, deserialize_with = "parser::names")]
    pub types: Vec<String>,
    #[serde(default, deserialize_with = "parser::years")]
    pub years: Vec<Year>,
    #[serde(default, deserialize_with = "parser::record_map")]
    pub data: IndexMap<String, TypeStats>,
}

/// Every result of one constituency across elections (`/constituency/{name}`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConstituencyHistory {
    #[serde(default, deserialize_with = "parser::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "parser::records")]
    pub results: Vec<ConstituencyResult>,
}

/// Party seats and vote share within one state (`/state-party-trends`).
///
/// Each series is meant to line up with `years`; a `null` vote share is a gap.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatePartyTrends {
    #[serde(default, deserialize_with = "parser::text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "parser::names")]
    pub parties: Vec<String>,
    #[serde(default, deserialize_with = "parser::years")]
    pub years: Vec<Year>,
    #[serde(default, deserialize_with = "parser::count_series_map")]
    pub seat_trends: IndexMap<String, Vec<u32>>,
    #[serde(default, deserialize_with = "parser::series_map")]
    pub vote_share_trends: IndexMap<String, Vec<Option<f64>>>,
}

/// `/years`: non-year entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct YearList(#[serde(deserialize_with = "parser::years")] pub Vec<Year>);

/// `/parties` and `/states`: blank and non-string entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NameList(#[serde(deserialize_with = "parser::names")] pub Vec<String>);

impl NameList {
    /// The listed spelling of `wanted`, compared case-insensitively and ignoring surrounding whitespace.
    pub fn find(&self, wanted: &str) -> Option<&str> {
        let wanted = wanted.trim();
        self.0
            .iter()
            .find(|name| name.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lists() {
        let years: YearList = crate::parser::parse_json(br#"[2019, "2024", "soon", null]"#).unwrap();
        assert_eq!(years.0, vec![2019, 2024]);
        let names: NameList = crate::parser::parse_json(br#"["Kerala", "", 7, "Goa"]"#).unwrap();
        assert_eq!(names.0, vec!["Kerala", "Goa"]);
        assert_eq!(names.find(" kerala "), Some("Kerala"));
        assert_eq!(names.find("Bihar"), None);
    }

    #[test]
    fn test_constituency_history_decodes_results() {
        let body = br#"{
            "name": "Varanasi",
            "results": [
                {"year": "2019", "party": "P", "votes": "674,664", "turnout": "59.5%"},
                "garbage",
                {"year": 2014, "party": "P", "margin": 371784}
            ]
        }"#;
        let history: ConstituencyHistory = crate::parser::parse_json(body).unwrap();
        assert_eq!(history.name.as_deref(), Some("Varanasi"));
        assert_eq!(history.results.len(), 2);
        assert_eq!(history.results[0].year, Some(2019));
        assert_eq!(history.results[0].turnout, Some(59.5));
        assert_eq!(history.results[1].margin, Some(371_784));
    }

    #[test]
    fn test_state_party_trends_keep_vote_share_gaps() {
        let body = br#"{
            "parties": ["P", "Q"],
            "years": [2014, 2019],
            "seat_trends": {"P": [10, "12"]},
            "vote_share_trends": {"P": [41.2, null]}
        }"#;
        let trends: StatePartyTrends = crate::parser::parse_json(body).unwrap();
        assert_eq!(trends.seat_trends["P"], vec![10, 12]);
        assert_eq!(trends.vote_share_trends["P"], vec![Some(41.2), None]);
        assert_eq!(trends.state, None);
    }

    #[test]
    fn test_constituency_type_codes() {
        assert_eq!(ConstituencyType::from("gen"), ConstituencyType::General);
        assert_eq!(ConstituencyType::from("ST"), ConstituencyType::ScheduledTribe);
        assert_eq!(
            ConstituencyType::from("XX"),
            ConstituencyType::Other("XX".to_string())
        );
        assert_eq!(ConstituencyType::ScheduledCaste.code(), "SC");
    }

    #[test]
    fn test_year_comparison_decodes_nested_records() {
        let body = br#"{
            "years": [2014, 2019],
            "party_performance": {
                "P": [{"year": 2014, "seats": 282}, {"year": 2019, "seats": 303}],
                "Q": [{"year": "2019", "seats": "52"}]
            },
            "turnout_comparison": [{"year": 2014, "avg_turnout": 66.4}]
        }"#;
        let cmp: YearComparison = crate::parser::parse_json(body).unwrap();
        assert_eq!(cmp.party_performance["P"][1].seats, Some(303));
        assert_eq!(cmp.party_performance["Q"][0].year, Some(2019));
        assert_eq!(cmp.turnout_comparison[0].avg_turnout, Some(66.4));
    }

    #[test]
    fn test_constituency_types_skip_malformed_entries() {
        let body = br#"{
            "types": ["GEN", "SC"],
            "years": [2019, 2024],
            "data": {
                "GEN": {"seats_by_year": [412, 412], "party_performance": {"P": [200, 180]}},
                "SC": "broken"
            }
        }"#;
        let breakdown: ConstituencyTypeBreakdown = crate::parser::parse_json(body).unwrap();
        assert_eq!(breakdown.data.len(), 1);
        assert_eq!(breakdown.data["GEN"].party_performance["P"], vec![200, 180]);
        assert!(breakdown.data["GEN"].turnout_by_year.is_empty());
    }
}
