use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::benchmark::{BenchmarkRegistry, DistanceBucket, Location, recompute_all};
use crate::confidence::{
    ConfidenceResult, ConsistencyMetrics, PeriodComparison, SampleSize, bootstrap_ci,
    compare_periods, consistency_metrics, sample_size_category,
};
use crate::config::AnalyticsConfig;
use crate::holes::{HoleAggregate, RoundTotal, aggregate_holes, round_totals};
use crate::memo::{AnalysisCache, fingerprint};
use crate::mental::{MentalIndicators, mental_indicators};
use crate::root_cause::{ScoringReport, build_scoring_report};
use crate::sg_profile::{SgProfile, sg_profile};
use crate::shots::ShotRecord;
use crate::tiger5::{RoundTiger5, Tiger5Summary, tiger5_fails, tiger5_trend};

/// Everything the presentation layer renders for one shot table and benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub benchmark_id: String,
    pub benchmark_name: String,
    pub generated_at: DateTime<Utc>,
    pub shot_count: usize,
    pub holes: Vec<HoleAggregate>,
    pub rounds: Vec<RoundTotal>,
    pub sg: SgProfile,
    pub scoring: ScoringReport,
    pub mental: MentalIndicators,
    pub tiger5: Tiger5Summary,
    pub tiger5_trend: Vec<RoundTiger5>,
    pub round_sg: ConfidenceResult,
    pub round_score_vs_par: ConsistencyMetrics,
    pub sample_size: SampleSize,
    /// Last `recent_window` rounds against the earlier ones; `None` until
    /// both sides have at least one round.
    pub recent_vs_baseline: Option<PeriodComparison>,
}

pub fn build_report(
    config: &AnalyticsConfig,
    registry: &BenchmarkRegistry,
    shots: &[ShotRecord],
    benchmark_id: &str,
) -> AnalysisReport {
    let dataset = recompute_all(registry, shots, benchmark_id);
    let holes = aggregate_holes(&dataset.shots, &config.par_source());
    let rounds = round_totals(&holes);
    let scoring = build_scoring_report(&holes, &dataset.shots, &config.root_cause);
    let tiger5 = tiger5_fails(&holes, &dataset.shots);
    let tiger5_trend = tiger5_trend(&holes, &dataset.shots);

    let round_sg_values: Vec<f64> = rounds.iter().map(|r| r.sg).collect();
    let round_vs_par: Vec<f64> = rounds.iter().map(|r| r.score_vs_par as f64).collect();

    AnalysisReport {
        benchmark_id: benchmark_id.to_string(),
        benchmark_name: registry.display_name(benchmark_id).to_string(),
        generated_at: Utc::now(),
        shot_count: dataset.shots.len(),
        round_sg: bootstrap_ci(&round_sg_values, &config.confidence),
        round_score_vs_par: consistency_metrics(&round_vs_par),
        sample_size: sample_size_category(rounds.len()),
        recent_vs_baseline: recent_vs_baseline(&round_sg_values, config),
        sg: sg_profile(&dataset.shots),
        mental: mental_indicators(&holes),
        holes,
        rounds,
        scoring,
        tiger5,
        tiger5_trend,
    }
}

fn recent_vs_baseline(values: &[f64], config: &AnalyticsConfig) -> Option<PeriodComparison> {
    let window = config.recent_window;
    if window == 0 || values.len() <= window {
        return None;
    }
    let (baseline, current) = values.split_at(values.len() - window);
    Some(compare_periods(current, baseline, &config.confidence))
}

/// `build_report` memoized on the shot table, the benchmark's id and
/// contents, and the config. Editing a table file changes the key.
pub fn build_report_cached(
    cache: &mut AnalysisCache,
    config: &AnalyticsConfig,
    registry: &BenchmarkRegistry,
    shots: &[ShotRecord],
    benchmark_id: &str,
) -> Result<AnalysisReport> {
    let table: Vec<(Location, DistanceBucket, f64)> = registry
        .get(benchmark_id)
        .map(|t| t.entries().collect())
        .unwrap_or_default();
    let key = fingerprint("report", shots, &(benchmark_id, &table, config))?;
    cache.get_or_compute(&key, || build_report(config, registry, shots, benchmark_id))
}
