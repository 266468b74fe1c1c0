//! Chart configurations and the files they are written to.
//!
//! A chart is emitted as a JSON document (`ChartSpec`) that a charting front
//! end can draw; tables are emitted as CSV. Everything written for one page is
//! tracked by a [`ChartHandle`] so it can be disposed before the next render.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::output::write_table;
use crate::pipeline::Dispose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Doughnut,
}

/// One color for the whole dataset, or one per point (pie slices, per-party bars).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Color {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    /// `None` is a gap and serializes as `null`.
    pub data: Vec<Option<f64>>,
    pub color: Color,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<Option<f64>>, color: Color) -> Self {
        Self {
            label: label.into(),
            data,
            color,
        }
    }

    /// A dataset with no gaps.
    pub fn values<I, V>(label: impl Into<String>, values: I, color: Color) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<f64>,
    {
        Self::new(label, values.into_iter().map(|v| Some(v.into())).collect(), color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Axis {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            min: None,
            max: None,
        }
    }

    pub fn bounded(title: impl Into<String>, (min, max): (f64, f64)) -> Self {
        Self {
            title: title.into(),
            min: Some(min),
            max: Some(max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<Axis>,
    /// Bar datasets drawn on top of each other.
    #[serde(skip_serializing_if = "is_false")]
    pub stacked: bool,
    /// Bars along the y axis.
    #[serde(skip_serializing_if = "is_false")]
    pub horizontal: bool,
    pub generated_at: DateTime<Utc>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            labels: Vec::new(),
            datasets: Vec::new(),
            y_axis: None,
            stacked: false,
            horizontal: false,
            generated_at: Utc::now(),
        }
    }

    pub fn labels<I, L>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: ToString,
    {
        self.labels = labels.into_iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn y_axis(mut self, axis: Axis) -> Self {
        self.y_axis = Some(axis);
        self
    }

    pub fn stacked(mut self) -> Self {
        self.stacked = true;
        self
    }

    pub fn horizontal(mut self) -> Self {
        self.horizontal = true;
        self
    }
}

/// Colors for the parties that appear most often in the results.
const PARTY_COLORS: &[(&str, &str)] = &[
    ("Bharatiya Janta Party", "#ff9933"),
    ("Bharatiya Janata Party", "#ff9933"),
    ("Indian National Congress", "#00bfff"),
    ("Communist Party Of India (MARXIST)", "#ff0000"),
    ("Communist Party Of India", "#ff0000"),
    ("Aam Aadmi Party", "#2ecc71"),
    ("All India Trinamool Congress", "#66bb6a"),
    ("Nationalist Congress Party", "#4d1a7f"),
    ("Dravida Munetra Kazhagam", "#d50000"),
    ("Samajwadi Party", "#ec407a"),
    ("Rashtriya Janata Dal", "#009688"),
    ("Bahujan Samaj Party", "#0d47a1"),
    ("Telugu Desam", "#ffeb3b"),
    ("Yuvajana Sramika Rythu Congress Party", "#7b1fa2"),
    ("Shiv Sena", "#ff5722"),
    ("Janata Dal (United)", "#43a047"),
    ("Shiromani Akali Dal", "#00695c"),
    ("Biju Janata Dal", "#795548"),
    ("Telangana Rashtra Samithi", "#e91e63"),
];

const PALETTE: [&str; 15] = [
    "#3498db", "#e74c3c", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#d35400", "#34495e",
    "#16a085", "#c0392b", "#27ae60", "#8e44ad", "#2980b9", "#f1c40f", "#e67e22",
];

/// Color for `party`.
///
/// Parties without a fixed color get a palette entry chosen from a hash of
/// the name, so a party keeps its color whatever its position in a chart.
pub fn party_color(party: &str) -> &'static str {
    PARTY_COLORS
        .iter()
        .find(|(name, _)| *name == party)
        .map(|(_, color)| *color)
        .unwrap_or_else(|| PALETTE[fnv1a(party) as usize % PALETTE.len()])
}

pub fn party_colors<S: AsRef<str>>(parties: &[S]) -> Color {
    Color::PerPoint(
        parties
            .iter()
            .map(|p| party_color(p.as_ref()).to_string())
            .collect(),
    )
}

/// Palette entry by position, for series that are not parties.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn fnv1a(s: &str) -> u32 {
    s.bytes().fold(0x811c_9dc5, |hash, b| {
        (hash ^ u32::from(b)).wrapping_mul(0x0100_0193)
    })
}

/// Y-axis range for percentages: `pad` around the data, clamped to `[0, 100]`.
///
/// No data gives the full range.
pub fn percent_axis_bounds<I: IntoIterator<Item = f64>>(values: I, pad: f64) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return (0.0, 100.0);
    }
    ((min - pad).max(0.0), (max + pad).min(100.0))
}

/// Lowercase, with every run of non-alphanumerics collapsed to `-`. Safe as a file or directory name.
pub fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// `1234567` → `"1,234,567"`.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Two decimals, or `"N/A"` when absent.
pub fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

/// The files written for one rendered page.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChartHandle {
    files: Vec<PathBuf>,
}

impl ChartHandle {
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Dispose for ChartHandle {
    /// Removes every file of the page. Files already gone are not an error.
    fn dispose(self) -> Result<()> {
        for path in &self.files {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "Chart file removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to remove {}", path.display()));
                }
            }
        }
        Ok(())
    }
}

/// Writes the charts and tables of one page into a directory.
pub struct PageWriter {
    dir: PathBuf,
    handle: ChartHandle,
}

impl PageWriter {
    pub fn chart(&mut self, name: &str, spec: &ChartSpec) -> Result<()> {
        let path = self.dir.join(format!("{name}.json"));
        let json = serde_json::to_vec_pretty(spec)?;
        std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        self.handle.files.push(path);
        Ok(())
    }

    pub fn table(&mut self, name: &str, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
        let path = self.dir.join(format!("{name}.csv"));
        write_table(&path, headers, rows)?;
        self.handle.files.push(path);
        Ok(())
    }
}

/// Runs `build` against a fresh [`PageWriter`] for `dir`.
///
/// If `build` fails, the files it already wrote are removed before the error is returned.
pub fn render_page<F>(dir: &Path, build: F) -> Result<ChartHandle>
where
    F: FnOnce(&mut PageWriter) -> Result<()>,
{
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let mut writer = PageWriter {
        dir: dir.to_path_buf(),
        handle: ChartHandle::default(),
    };
    match build(&mut writer) {
        Ok(()) => Ok(writer.handle),
        Err(e) => {
            if let Err(cleanup) = writer.handle.dispose() {
                warn!(error = %cleanup, "Failed to clean up partial page");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_party_colors() {
        assert_eq!(party_color("Bharatiya Janta Party"), "#ff9933");
        assert_eq!(party_color("Indian National Congress"), "#00bfff");
    }

    #[test]
    fn test_fallback_color_is_stable() {
        let color = party_color("Some Regional Front");
        assert!(PALETTE.contains(&color));
        assert_eq!(party_color("Some Regional Front"), color);
    }

    #[test]
    fn test_percent_axis_bounds() {
        assert_eq!(percent_axis_bounds([60.0, 70.0], 5.0), (55.0, 75.0));
        assert_eq!(percent_axis_bounds([2.0, 98.0], 5.0), (0.0, 100.0));
        assert_eq!(percent_axis_bounds(Vec::<f64>::new(), 5.0), (0.0, 100.0));
        assert_eq!(percent_axis_bounds([f64::NAN, 50.0], 1.0), (49.0, 51.0));
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Indian National Congress"), "indian-national-congress");
        assert_eq!(slug("Janata Dal (United)"), "janata-dal-united");
        assert_eq!(slug("SC/ST"), "sc-st");
        assert_eq!(slug("../etc"), "etc");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(65.789)), "65.79");
        assert_eq!(format_percent(None), "N/A");
    }

    #[test]
    fn test_gaps_serialize_as_null() {
        let spec = ChartSpec::new(ChartKind::Line, "Growth")
            .labels([2014, 2019])
            .dataset(Dataset::new("P", vec![None, Some(100.0)], Color::Single("#fff".into())));
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "line");
        assert_eq!(json["labels"], serde_json::json!(["2014", "2019"]));
        assert_eq!(json["datasets"][0]["data"], serde_json::json!([null, 100.0]));
        assert_eq!(json["datasets"][0]["color"], "#fff");
        assert!(json.get("y_axis").is_none());
        assert!(json.get("stacked").is_none());

        let json = serde_json::to_value(ChartSpec::new(ChartKind::Bar, "History").stacked()).unwrap();
        assert_eq!(json["stacked"], true);
    }

    #[test]
    fn test_render_page_and_dispose() {
        let dir = tempfile::tempdir().unwrap();
        let page_dir = dir.path().join("page");
        let handle = render_page(&page_dir, |w| {
            w.chart("seats", &ChartSpec::new(ChartKind::Bar, "Seats"))?;
            w.table("seats", &["Party".to_string()], &[vec!["P".to_string()]])
        })
        .unwrap();

        assert_eq!(handle.files().len(), 2);
        assert!(handle.files().iter().all(|p| p.exists()));

        let files = handle.files().to_vec();
        handle.dispose().unwrap();
        assert!(files.iter().all(|p| !p.exists()));
    }

    #[test]
    fn test_failed_page_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let result = render_page(dir.path(), |w| {
            w.chart("first", &ChartSpec::new(ChartKind::Pie, "First"))?;
            anyhow::bail!("aggregation went wrong")
        });
        assert!(result.is_err());
        assert!(!dir.path().join("first.json").exists());
    }
}
