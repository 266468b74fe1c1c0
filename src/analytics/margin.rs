use indexmap::IndexMap;
use serde::Serialize;

use crate::model::ConstituencyResult;

/// How decisively a seat was won, by winning margin as a percentage of votes cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginBucket {
    VeryClose,
    Close,
    Moderate,
    Comfortable,
    Landslide,
}

impl MarginBucket {
    pub const ALL: [MarginBucket; 5] = [
        MarginBucket::VeryClose,
        MarginBucket::Close,
        MarginBucket::Moderate,
        MarginBucket::Comfortable,
        MarginBucket::Landslide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarginBucket::VeryClose => "very_close",
            MarginBucket::Close => "close",
            MarginBucket::Moderate => "moderate",
            MarginBucket::Comfortable => "comfortable",
            MarginBucket::Landslide => "landslide",
        }
    }

    /// Chart label.
    pub fn label(&self) -> &'static str {
        match self {
            MarginBucket::VeryClose => "Very Close (< 1%)",
            MarginBucket::Close => "Close (1-5%)",
            MarginBucket::Moderate => "Moderate (5-10%)",
            MarginBucket::Comfortable => "Comfortable (10-20%)",
            MarginBucket::Landslide => "Landslide (> 20%)",
        }
    }
}

/// Converts a margin percentage into a [`MarginBucket`].
///
/// | Range          | Bucket      |
/// |----------------|-------------|
/// | < 1            | very_close  |
/// | >= 1, < 5      | close       |
/// | >= 5, < 10     | moderate    |
/// | >= 10, < 20    | comfortable |
/// | >= 20          | landslide   |
///
/// `margin_percent` must not be NaN: NaN fails every comparison and would
/// land in `landslide`. Use [`try_margin_bucket`] for unchecked input.
pub fn margin_bucket(margin_percent: f64) -> MarginBucket {
    match margin_percent {
        m if m < 1.0 => MarginBucket::VeryClose,
        m if m < 5.0 => MarginBucket::Close,
        m if m < 10.0 => MarginBucket::Moderate,
        m if m < 20.0 => MarginBucket::Comfortable,
        _ => MarginBucket::Landslide,
    }
}

/// [`margin_bucket`] for finite margins; `None` for NaN and infinities.
pub fn try_margin_bucket(margin_percent: f64) -> Option<MarginBucket> {
    margin_percent
        .is_finite()
        .then(|| margin_bucket(margin_percent))
}

/// Seats per margin bucket. All five buckets are present, in bucket order.
/// Records without a finite margin are not counted.
pub fn margin_distribution(constituencies: &[ConstituencyResult]) -> IndexMap<MarginBucket, u32> {
    let mut counts: IndexMap<MarginBucket, u32> =
        MarginBucket::ALL.iter().map(|b| (*b, 0)).collect();

    for bucket in constituencies
        .iter()
        .filter_map(|c| c.margin_percent.and_then(try_margin_bucket))
    {
        *counts.entry(bucket).or_default() += 1;
    }

    counts
}
