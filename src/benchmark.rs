use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shots::ShotRecord;

/// Expected strokes returned when a benchmark or location has no data.
pub const DEFAULT_EXPECTED_STROKES: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DistanceBucket {
    #[serde(rename = "<50")]
    Under50,
    #[serde(rename = "50-100")]
    From50To100,
    #[serde(rename = "100-150")]
    From100To150,
    #[serde(rename = "150-200")]
    From150To200,
    #[serde(rename = "200-250")]
    From200To250,
    #[serde(rename = "250-300")]
    From250To300,
    #[serde(rename = "300+")]
    Over300,
}

impl DistanceBucket {
    pub const ALL: [DistanceBucket; 7] = [
        DistanceBucket::Under50,
        DistanceBucket::From50To100,
        DistanceBucket::From100To150,
        DistanceBucket::From150To200,
        DistanceBucket::From200To250,
        DistanceBucket::From250To300,
        DistanceBucket::Over300,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DistanceBucket::Under50 => "<50",
            DistanceBucket::From50To100 => "50-100",
            DistanceBucket::From100To150 => "100-150",
            DistanceBucket::From150To200 => "150-200",
            DistanceBucket::From200To250 => "200-250",
            DistanceBucket::From250To300 => "250-300",
            DistanceBucket::Over300 => "300+",
        }
    }

    /// Exclusive upper edge of the band; `None` for the open-ended last band.
    pub fn upper_bound(&self) -> Option<f64> {
        match self {
            DistanceBucket::Under50 => Some(50.0),
            DistanceBucket::From50To100 => Some(100.0),
            DistanceBucket::From100To150 => Some(150.0),
            DistanceBucket::From150To200 => Some(200.0),
            DistanceBucket::From200To250 => Some(250.0),
            DistanceBucket::From250To300 => Some(300.0),
            DistanceBucket::Over300 => None,
        }
    }
}

/// Bands are half-open: 50 belongs to `50-100`, 300 to `300+`.
/// Non-finite distances are treated as 0.
pub fn distance_to_bucket(distance: f64) -> DistanceBucket {
    let d = if distance.is_finite() { distance } else { 0.0 };
    DistanceBucket::ALL
        .into_iter()
        .find(|bucket| bucket.upper_bound().is_none_or(|upper| d < upper))
        .unwrap_or(DistanceBucket::Over300)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Tee,
    Fairway,
    Rough,
    Sand,
    Recovery,
    Putt,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Tee => "tee",
            Location::Fairway => "fairway",
            Location::Rough => "rough",
            Location::Sand => "sand",
            Location::Recovery => "recovery",
            Location::Putt => "putt",
        }
    }

    /// Strict variant used for table headers, where an unknown lie is a
    /// column to skip rather than a putt.
    pub fn parse(raw: &str) -> Option<Self> {
        LOCATION_ALIASES.get(raw.trim().to_lowercase().as_str()).copied()
    }
}

static LOCATION_ALIASES: Lazy<HashMap<&'static str, Location>> = Lazy::new(|| {
    HashMap::from([
        ("tee", Location::Tee),
        ("fairway", Location::Fairway),
        ("rough", Location::Rough),
        ("sand", Location::Sand),
        ("recovery", Location::Recovery),
        ("green", Location::Putt),
        ("putt", Location::Putt),
    ])
});

/// Unrecognized or empty values fall back to `putt`.
pub fn normalize_location(raw: &str) -> Location {
    Location::parse(raw).unwrap_or(Location::Putt)
}

/// Expected strokes to hole out, keyed by (location, distance band).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkTable {
    entries: BTreeMap<(Location, DistanceBucket), f64>,
}

impl BenchmarkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Location, DistanceBucket, f64)>,
    {
        let mut table = Self::new();
        for (location, bucket, expected) in entries {
            table.insert(location, bucket, expected);
        }
        table
    }

    /// Negative or non-finite values are ignored.
    pub fn insert(&mut self, location: Location, bucket: DistanceBucket, expected: f64) {
        if expected.is_finite() && expected >= 0.0 {
            self.entries.insert((location, bucket), expected);
        }
    }

    pub fn get(&self, location: Location, bucket: DistanceBucket) -> Option<f64> {
        self.entries.get(&(location, bucket)).copied()
    }

    /// Every stored value in (location, band) order.
    pub fn entries(&self) -> impl Iterator<Item = (Location, DistanceBucket, f64)> + '_ {
        self.entries
            .iter()
            .map(|((location, bucket), expected)| (*location, *bucket, *expected))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean over every band recorded for `location`.
    pub fn location_mean(&self, location: Location) -> Option<f64> {
        let values: Vec<f64> = self
            .entries
            .range((location, DistanceBucket::Under50)..=(location, DistanceBucket::Over300))
            .map(|(_, v)| *v)
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn lookup(&self, location: &str, distance: f64) -> f64 {
        let location = normalize_location(location);
        let bucket = distance_to_bucket(distance);
        self.get(location, bucket)
            .or_else(|| self.location_mean(location))
            .unwrap_or(DEFAULT_EXPECTED_STROKES)
    }

    /// Reads the wide CSV layout: a distance column followed by one column
    /// per lie. Blank cells, unparseable rows and unknown lie headers are
    /// skipped. Later rows landing in the same band overwrite earlier ones.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.headers().context("benchmark csv has no header row")?.clone();

        let columns: Vec<(usize, Location)> = headers
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(idx, name)| match Location::parse(name) {
                Some(location) => Some((idx, location)),
                None => {
                    log::warn!("benchmark column '{name}' is not a known lie, skipping");
                    None
                }
            })
            .collect();

        let mut table = Self::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("benchmark csv row {}", line + 2))?;
            let Some(distance) = record.get(0).and_then(|s| s.parse::<f64>().ok()) else {
                log::warn!("benchmark csv row {} has no numeric distance", line + 2);
                continue;
            };
            let bucket = distance_to_bucket(distance);
            for (idx, location) in &columns {
                let Some(expected) = record.get(*idx).and_then(|s| s.parse::<f64>().ok()) else {
                    continue;
                };
                table.insert(*location, bucket, expected);
            }
        }
        Ok(table)
    }

    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed opening benchmark {}", path.display()))?;
        Self::from_csv_reader(file).with_context(|| format!("failed reading {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkInfo {
    pub id: String,
    pub display_name: String,
    pub entries: usize,
}

/// Named benchmark tables; each id is queried independently.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRegistry {
    tables: HashMap<String, BenchmarkTable>,
    display_names: HashMap<String, String>,
}

impl BenchmarkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, display_name: Option<&str>, table: BenchmarkTable) {
        self.tables.insert(id.to_string(), table);
        self.display_names.insert(
            id.to_string(),
            display_name.unwrap_or(id).to_string(),
        );
    }

    /// Loads every configured file; a missing or broken file is logged and
    /// left out of the registry.
    pub fn load_sources<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>, &'a Path)>,
    {
        let mut registry = Self::new();
        for (id, display_name, path) in sources {
            match BenchmarkTable::load_csv(path) {
                Ok(table) => {
                    log::debug!("loaded benchmark '{id}' with {} entries", table.len());
                    registry.insert(id, display_name, table);
                }
                Err(err) => log::warn!("benchmark '{id}' unavailable: {err:#}"),
            }
        }
        registry
    }

    pub fn get(&self, id: &str) -> Option<&BenchmarkTable> {
        self.tables.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tables.contains_key(id)
    }

    pub fn display_name(&self, id: &str) -> &str {
        self.display_names
            .get(id)
            .map(String::as_str)
            .unwrap_or("Unknown")
    }

    pub fn available(&self) -> Vec<BenchmarkInfo> {
        let mut out: Vec<BenchmarkInfo> = self
            .tables
            .iter()
            .map(|(id, table)| BenchmarkInfo {
                id: id.clone(),
                display_name: self.display_name(id).to_string(),
                entries: table.len(),
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    pub fn lookup(&self, benchmark_id: &str, location: &str, distance: f64) -> f64 {
        match self.tables.get(benchmark_id) {
            Some(table) => table.lookup(location, distance),
            None => DEFAULT_EXPECTED_STROKES,
        }
    }

    /// `expected(start) - expected(end) - strokes`, where a penalty costs two strokes.
    pub fn compute_sg(
        &self,
        benchmark_id: &str,
        start_location: &str,
        start_distance: f64,
        end_location: &str,
        end_distance: f64,
        penalty: bool,
    ) -> f64 {
        let expected_start = self.lookup(benchmark_id, start_location, start_distance);
        let expected_end = self.lookup(benchmark_id, end_location, end_distance);
        let strokes_consumed = if penalty { 2.0 } else { 1.0 };
        expected_start - expected_end - strokes_consumed
    }

    pub fn compute_sg_for_shot(&self, benchmark_id: &str, shot: &ShotRecord) -> f64 {
        self.compute_sg(
            benchmark_id,
            &shot.starting_location,
            shot.start_distance_or_zero(),
            &shot.ending_location,
            shot.end_distance_or_zero(),
            shot.penalty,
        )
    }
}

/// A shot table annotated with SG from one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgDataset {
    pub benchmark_id: String,
    pub shots: Vec<ShotRecord>,
}

/// Returns a new table with SG and shot category filled in; the input is
/// left untouched, so switching benchmarks is just another call.
pub fn recompute_all(
    registry: &BenchmarkRegistry,
    shots: &[ShotRecord],
    benchmark_id: &str,
) -> SgDataset {
    if !registry.contains(benchmark_id) {
        log::warn!(
            "benchmark '{benchmark_id}' not loaded, every lookup uses {DEFAULT_EXPECTED_STROKES}"
        );
    }
    let shots = shots
        .par_iter()
        .map(|shot| {
            let mut out = shot.clone();
            out.strokes_gained = registry.compute_sg_for_shot(benchmark_id, shot);
            out.shot_category = Some(shot.category());
            out
        })
        .collect();
    SgDataset {
        benchmark_id: benchmark_id.to_string(),
        shots,
    }
}
