use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shots::ShotRecord;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParThresholds {
    pub par3_below: f64,
    pub par4_below: f64,
}

impl Default for ParThresholds {
    fn default() -> Self {
        Self {
            par3_below: 240.0,
            par4_below: 490.0,
        }
    }
}

/// Where hole par comes from. Shot logs carry no course data, so par is
/// normally inferred from the tee shot distance; a course card can replace
/// that without touching anything downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParSource {
    Inferred(ParThresholds),
    Course {
        pars: BTreeMap<u32, u32>,
        fallback: ParThresholds,
    },
}

impl Default for ParSource {
    fn default() -> Self {
        ParSource::Inferred(ParThresholds::default())
    }
}

impl ParSource {
    pub fn par_for(&self, hole: u32, first_shot_distance: Option<f64>) -> u32 {
        match self {
            ParSource::Inferred(thresholds) => infer_par(first_shot_distance, thresholds),
            ParSource::Course { pars, fallback } => pars
                .get(&hole)
                .copied()
                .unwrap_or_else(|| infer_par(first_shot_distance, fallback)),
        }
    }
}

/// Missing distance means par 3.
pub fn infer_par(first_shot_distance: Option<f64>, thresholds: &ParThresholds) -> u32 {
    match first_shot_distance {
        Some(d) if d.is_finite() => {
            if d < thresholds.par3_below {
                3
            } else if d < thresholds.par4_below {
                4
            } else {
                5
            }
        }
        _ => 3,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleAggregate {
    pub round_id: String,
    pub date: Option<NaiveDate>,
    pub hole: u32,
    pub hole_score: u32,
    pub shots: usize,
    pub hole_sg: f64,
    pub penalties: usize,
    pub putts: usize,
    pub par: u32,
    pub score_vs_par: i32,
    pub first_shot_distance: Option<f64>,
}

impl HoleAggregate {
    pub fn three_putt(&self) -> bool {
        self.putts >= 3
    }

    pub fn key(&self) -> (&str, u32) {
        (&self.round_id, self.hole)
    }
}

/// Shots of one (round, hole), sorted by shot index.
#[derive(Debug, Clone)]
pub struct HoleShots<'a> {
    pub round_id: &'a str,
    pub hole: u32,
    pub shots: Vec<&'a ShotRecord>,
}

impl<'a> HoleShots<'a> {
    pub fn first(&self) -> Option<&'a ShotRecord> {
        self.shots.first().copied()
    }
}

/// Groups in (round, hole) order; shot order inside a group is by index
/// with input order breaking ties.
pub fn group_holes(shots: &[ShotRecord]) -> Vec<HoleShots<'_>> {
    let mut groups: BTreeMap<(&str, u32), Vec<&ShotRecord>> = BTreeMap::new();
    for shot in shots {
        groups
            .entry((shot.round_id.as_str(), shot.hole))
            .or_default()
            .push(shot);
    }
    groups
        .into_iter()
        .map(|((round_id, hole), mut shots)| {
            shots.sort_by_key(|s| s.shot);
            HoleShots {
                round_id,
                hole,
                shots,
            }
        })
        .collect()
}

pub fn aggregate_group(group: &HoleShots<'_>, par_source: &ParSource) -> HoleAggregate {
    let hole_score = group.shots.iter().map(|s| s.score).max().unwrap_or(0);
    let first_shot_distance = group
        .first()
        .and_then(|s| s.starting_distance)
        .filter(|d| d.is_finite());
    let par = par_source.par_for(group.hole, first_shot_distance);
    HoleAggregate {
        round_id: group.round_id.to_string(),
        date: group.shots.iter().find_map(|s| s.date),
        hole: group.hole,
        hole_score,
        shots: group.shots.len(),
        hole_sg: group.shots.iter().map(|s| s.strokes_gained).sum(),
        penalties: group.shots.iter().filter(|s| s.penalty).count(),
        putts: group.shots.iter().filter(|s| s.starts_on_green()).count(),
        par,
        score_vs_par: score_vs_par(hole_score, par),
        first_shot_distance,
    }
}

/// Saturates instead of wrapping for out-of-range scores.
fn score_vs_par(hole_score: u32, par: u32) -> i32 {
    let diff = i64::from(hole_score) - i64::from(par);
    diff.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Recomputed from scratch on every call.
pub fn aggregate_holes(shots: &[ShotRecord], par_source: &ParSource) -> Vec<HoleAggregate> {
    group_holes(shots)
        .iter()
        .map(|group| aggregate_group(group, par_source))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTotal {
    pub round_id: String,
    pub date: Option<NaiveDate>,
    pub holes: usize,
    pub score: u32,
    pub score_vs_par: i32,
    pub sg: f64,
}

/// Per-round totals in play order (date, then round id).
pub fn round_totals(holes: &[HoleAggregate]) -> Vec<RoundTotal> {
    let mut by_round: BTreeMap<&str, RoundTotal> = BTreeMap::new();
    for hole in holes {
        let entry = by_round
            .entry(hole.round_id.as_str())
            .or_insert_with(|| RoundTotal {
                round_id: hole.round_id.clone(),
                date: hole.date,
                holes: 0,
                score: 0,
                score_vs_par: 0,
                sg: 0.0,
            });
        entry.holes += 1;
        entry.score = entry.score.saturating_add(hole.hole_score);
        entry.score_vs_par = entry.score_vs_par.saturating_add(hole.score_vs_par);
        entry.sg += hole.hole_sg;
        if entry.date.is_none() {
            entry.date = hole.date;
        }
    }
    let mut rounds: Vec<RoundTotal> = by_round.into_values().collect();
    rounds.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.round_id.cmp(&b.round_id)));
    rounds
}
