use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Largest hole, shot or score value accepted from a shot log; anything
/// beyond it is treated like any other unreadable number.
pub const MAX_COUNT_VALUE: f64 = 10_000.0;

/// Shots starting inside this distance (and off the tee and green) count as short game.
pub const SHORT_GAME_MAX_DISTANCE: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotCategory {
    Driving,
    Approach,
    ShortGame,
    Putting,
    Other,
}

impl ShotCategory {
    pub const ALL: [ShotCategory; 5] = [
        ShotCategory::Driving,
        ShotCategory::Approach,
        ShotCategory::ShortGame,
        ShotCategory::Putting,
        ShotCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShotCategory::Driving => "driving",
            ShotCategory::Approach => "approach",
            ShotCategory::ShortGame => "short_game",
            ShotCategory::Putting => "putting",
            ShotCategory::Other => "other",
        }
    }

    /// Loose match for labels found in exported shot logs ("Drive", "Short Game", "putt").
    pub fn from_label(raw: &str) -> Option<Self> {
        let s = raw.trim().to_lowercase().replace(['-', ' '], "_");
        if s.is_empty() {
            return None;
        }
        if s.contains("putt") {
            return Some(ShotCategory::Putting);
        }
        if s.contains("drive") || s.contains("driving") {
            return Some(ShotCategory::Driving);
        }
        if s.contains("approach") {
            return Some(ShotCategory::Approach);
        }
        if s.contains("short_game") || s == "chip" || s == "pitch" {
            return Some(ShotCategory::ShortGame);
        }
        Some(ShotCategory::Other)
    }
}

/// One stroke as recorded in the shot log.
///
/// Numeric fields are deserialized leniently: strings holding numbers are
/// accepted and anything unparseable becomes `None`/zero instead of failing
/// the whole table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub round_id: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub hole: u32,
    #[serde(default, alias = "shot_index", deserialize_with = "lenient_u32")]
    pub shot: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub score: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub starting_distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub starting_location: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ending_distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ending_location: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub penalty: bool,
    #[serde(default, deserialize_with = "lenient_sg")]
    pub strokes_gained: f64,
    #[serde(default, deserialize_with = "lenient_category")]
    pub shot_category: Option<ShotCategory>,
}

impl ShotRecord {
    /// Recorded category, or the one implied by shot index, lie and distance.
    pub fn category(&self) -> ShotCategory {
        self.shot_category.unwrap_or_else(|| {
            classify_shot(self.shot, &self.starting_location, self.starting_distance)
        })
    }

    pub fn start_distance_or_zero(&self) -> f64 {
        finite_or_zero(self.starting_distance)
    }

    pub fn end_distance_or_zero(&self) -> f64 {
        finite_or_zero(self.ending_distance)
    }

    pub fn starts_on_green(&self) -> bool {
        is_green(&self.starting_location)
    }

    pub fn ends_on_green(&self) -> bool {
        is_green(&self.ending_location)
    }
}

pub fn is_green(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "green" | "putt")
}

pub fn is_tee(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("tee")
}

/// Drive first, then putt, short game, approach; anything left is `Other`
/// (for example a re-teed ball after a penalty).
pub fn classify_shot(shot_index: u32, start_location: &str, start_distance: Option<f64>) -> ShotCategory {
    let from_tee = is_tee(start_location);
    if shot_index == 1 && from_tee {
        return ShotCategory::Driving;
    }
    if is_green(start_location) {
        return ShotCategory::Putting;
    }
    let distance = finite_or_zero(start_distance);
    if !from_tee && distance <= SHORT_GAME_MAX_DISTANCE {
        return ShotCategory::ShortGame;
    }
    if shot_index > 1 && !from_tee && distance > SHORT_GAME_MAX_DISTANCE {
        return ShotCategory::Approach;
    }
    ShotCategory::Other
}

pub fn finite_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

pub fn parse_shots_json(raw: &str) -> Result<Vec<ShotRecord>> {
    let rows: Option<Vec<ShotRecord>> =
        serde_json::from_str(raw).context("shot table is not a JSON array of shots")?;
    Ok(rows.unwrap_or_default())
}

pub fn load_shots_json(path: &Path) -> Result<Vec<ShotRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading shot table {}", path.display()))?;
    parse_shots_json(&raw).with_context(|| format!("failed parsing {}", path.display()))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

fn lenient_sg<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.unwrap_or(0.0))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    Ok(value
        .filter(|v| *v >= 0.0 && *v <= MAX_COUNT_VALUE)
        .map(|v| v.round() as u32)
        .unwrap_or(0))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        ),
        _ => false,
    })
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            // Sheets exports sometimes append a time part.
            let day = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
        }
        _ => None,
    })
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<ShotCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => ShotCategory::from_label(&s),
        _ => None,
    })
}

fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_follows_priority_order() {
        assert_eq!(classify_shot(1, "Tee", Some(410.0)), ShotCategory::Driving);
        assert_eq!(classify_shot(2, "Green", Some(12.0)), ShotCategory::Putting);
        assert_eq!(classify_shot(3, "Rough", Some(18.0)), ShotCategory::ShortGame);
        assert_eq!(classify_shot(2, "Fairway", Some(150.0)), ShotCategory::Approach);
        // Re-tee after a penalty is neither a drive nor an approach.
        assert_eq!(classify_shot(3, "Tee", Some(400.0)), ShotCategory::Other);
    }

    #[test]
    fn short_game_boundary_is_inclusive() {
        assert_eq!(classify_shot(2, "Sand", Some(25.0)), ShotCategory::ShortGame);
        assert_eq!(classify_shot(2, "Sand", Some(25.5)), ShotCategory::Approach);
    }

    #[test]
    fn malformed_fields_are_coerced() {
        let raw = r#"[{"round_id": 17, "hole": "4", "shot": 2, "score": "bad",
            "starting_distance": "n/a", "starting_location": " Fairway ",
            "ending_distance": "12.5", "ending_location": null, "penalty": "Yes",
            "strokes_gained": "", "date": "2026-03-14T09:00:00"}]"#;
        let rows = parse_shots_json(raw).expect("lenient parse");
        let shot = &rows[0];
        assert_eq!(shot.round_id, "17");
        assert_eq!(shot.hole, 4);
        assert_eq!(shot.score, 0);
        assert_eq!(shot.starting_distance, None);
        assert_eq!(shot.starting_location, "Fairway");
        assert_eq!(shot.ending_distance, Some(12.5));
        assert!(shot.ending_location.is_empty());
        assert!(shot.penalty);
        assert_eq!(shot.strokes_gained, 0.0);
        assert_eq!(shot.date, NaiveDate::from_ymd_opt(2026, 3, 14));
    }

    #[test]
    fn absurd_scores_are_dropped() {
        let raw = r#"[{"hole": 1, "shot": 1, "score": 4294967295},
            {"hole": 2, "shot": 1, "score": "1e12"}]"#;
        let rows = parse_shots_json(raw).expect("lenient parse");
        assert_eq!(rows[0].score, 0);
        assert_eq!(rows[1].score, 0);
    }

    #[test]
    fn null_table_is_empty() {
        assert!(parse_shots_json("null").expect("null parses").is_empty());
    }

    #[test]
    fn category_labels_are_loose() {
        assert_eq!(ShotCategory::from_label("Short Game"), Some(ShotCategory::ShortGame));
        assert_eq!(ShotCategory::from_label("Drive"), Some(ShotCategory::Driving));
        assert_eq!(ShotCategory::from_label("putting"), Some(ShotCategory::Putting));
        assert_eq!(ShotCategory::from_label("recovery"), Some(ShotCategory::Other));
        assert_eq!(ShotCategory::from_label("  "), None);
    }
}
