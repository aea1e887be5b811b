use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::benchmark::{DistanceBucket, distance_to_bucket};
use crate::shots::{ShotCategory, ShotRecord, finite_or_zero};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySg {
    pub category: ShotCategory,
    pub shots: usize,
    pub total_sg: f64,
    /// `total_sg` spread over every round in the table, not only the rounds
    /// that had a shot of this category.
    pub per_round: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSg {
    pub category: ShotCategory,
    pub bucket: DistanceBucket,
    pub shots: usize,
    pub total_sg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSg {
    pub round_id: String,
    pub date: Option<NaiveDate>,
    pub shots: usize,
    pub total_sg: f64,
}

/// SG on the shot types that tend to split good players from great ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SgSeparators {
    /// Putts from 3 to 6 (inclusive).
    pub putting_3_to_6: f64,
    pub approach_100_to_150: f64,
    pub approach_150_to_200: f64,
    /// Drives that finished in the fairway or rough without a penalty.
    pub playable_drives: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgProfile {
    pub total_sg: f64,
    pub rounds: usize,
    pub sg_per_round: f64,
    /// Every category, zero-filled, in `ShotCategory::ALL` order.
    pub categories: Vec<CategorySg>,
    /// Only (category, band) pairs that saw a shot, by category then band.
    pub buckets: Vec<BucketSg>,
    /// Per-round totals in play order (date, then round id).
    pub trend: Vec<RoundSg>,
    pub separators: SgSeparators,
}

/// Rolls per-shot SG up by category, starting-distance band and round.
/// Categories come from `ShotRecord::category`, so recorded labels win over
/// the classifier.
pub fn sg_profile(shots: &[ShotRecord]) -> SgProfile {
    let rounds: BTreeSet<&str> = shots.iter().map(|s| s.round_id.as_str()).collect();
    let round_count = rounds.len();
    let total_sg: f64 = shots.iter().map(|s| s.strokes_gained).sum();

    let mut by_category: BTreeMap<ShotCategory, (usize, f64)> = BTreeMap::new();
    let mut by_bucket: BTreeMap<(ShotCategory, DistanceBucket), (usize, f64)> = BTreeMap::new();
    for shot in shots {
        let category = shot.category();
        let cat = by_category.entry(category).or_default();
        cat.0 += 1;
        cat.1 += shot.strokes_gained;
        let bucket = distance_to_bucket(shot.start_distance_or_zero());
        let band = by_bucket.entry((category, bucket)).or_default();
        band.0 += 1;
        band.1 += shot.strokes_gained;
    }

    let categories = ShotCategory::ALL
        .into_iter()
        .map(|category| {
            let (count, sg) = by_category.get(&category).copied().unwrap_or_default();
            CategorySg {
                category,
                shots: count,
                total_sg: sg,
                per_round: per_round(sg, round_count),
            }
        })
        .collect();

    let buckets = by_bucket
        .into_iter()
        .map(|((category, bucket), (count, sg))| BucketSg {
            category,
            bucket,
            shots: count,
            total_sg: sg,
        })
        .collect();

    SgProfile {
        total_sg,
        rounds: round_count,
        sg_per_round: per_round(total_sg, round_count),
        categories,
        buckets,
        trend: sg_trend(shots),
        separators: sg_separators(shots),
    }
}

fn per_round(total: f64, rounds: usize) -> f64 {
    if rounds == 0 { 0.0 } else { total / rounds as f64 }
}

pub fn sg_trend(shots: &[ShotRecord]) -> Vec<RoundSg> {
    let mut by_round: BTreeMap<&str, RoundSg> = BTreeMap::new();
    for shot in shots {
        let entry = by_round
            .entry(shot.round_id.as_str())
            .or_insert_with(|| RoundSg {
                round_id: shot.round_id.clone(),
                date: None,
                shots: 0,
                total_sg: 0.0,
            });
        entry.shots += 1;
        entry.total_sg += shot.strokes_gained;
        if entry.date.is_none() {
            entry.date = shot.date;
        }
    }
    let mut trend: Vec<RoundSg> = by_round.into_values().collect();
    trend.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.round_id.cmp(&b.round_id)));
    trend
}

pub fn sg_separators(shots: &[ShotRecord]) -> SgSeparators {
    let mut out = SgSeparators::default();
    for shot in shots {
        let distance = finite_or_zero(shot.starting_distance);
        let sg = shot.strokes_gained;
        match shot.category() {
            ShotCategory::Putting if (3.0..=6.0).contains(&distance) => out.putting_3_to_6 += sg,
            ShotCategory::Approach if (100.0..150.0).contains(&distance) => {
                out.approach_100_to_150 += sg
            }
            ShotCategory::Approach if (150.0..200.0).contains(&distance) => {
                out.approach_150_to_200 += sg
            }
            ShotCategory::Driving if !shot.penalty && ends_in_play(&shot.ending_location) => {
                out.playable_drives += sg
            }
            _ => {}
        }
    }
    out
}

fn ends_in_play(location: &str) -> bool {
    matches!(location.trim().to_lowercase().as_str(), "fairway" | "rough")
}
