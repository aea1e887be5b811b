use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Grade {
    Low,
    Medium,
    High,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::High => "HIGH",
            Grade::Medium => "MEDIUM",
            Grade::Low => "LOW",
        }
    }
}

/// Round-count and interval-width cutoffs for the stability label. These
/// are domain conventions, not derived statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityThresholds {
    pub high_n: usize,
    pub medium_n: usize,
    pub tight_width: f64,
    pub moderate_width: f64,
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self {
            high_n: 15,
            medium_n: 10,
            tight_width: 0.5,
            moderate_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    pub n_threshold: usize,
    pub effect_threshold: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            n_threshold: 10,
            effect_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceSettings {
    pub resamples: usize,
    pub confidence: f64,
    pub seed: u64,
    pub stability: StabilityThresholds,
    pub label: LabelThresholds,
}

impl Default for ConfidenceSettings {
    fn default() -> Self {
        Self {
            resamples: 100,
            confidence: 0.95,
            seed: 42,
            stability: StabilityThresholds::default(),
            label: LabelThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub mean: f64,
    pub std: f64,
    pub lower: f64,
    pub upper: f64,
    pub width: f64,
    pub stability: Grade,
    pub n: usize,
}

pub fn stability(n: usize, width: f64) -> Grade {
    stability_with(n, width, &StabilityThresholds::default())
}

/// A NaN width never qualifies as tight or moderate.
pub fn stability_with(n: usize, width: f64, t: &StabilityThresholds) -> Grade {
    if n >= t.high_n && width <= t.tight_width {
        Grade::High
    } else if n >= t.medium_n || width <= t.moderate_width {
        Grade::Medium
    } else {
        Grade::Low
    }
}

pub fn confidence_label(n: usize, effect_size: f64, n_threshold: usize, effect_threshold: f64) -> Grade {
    let effect = if effect_size.is_finite() { effect_size.abs() } else { 0.0 };
    let n = n as f64;
    let n_threshold = n_threshold as f64;
    if n >= 1.5 * n_threshold && effect >= 2.0 * effect_threshold {
        Grade::High
    } else if n >= n_threshold || effect >= effect_threshold {
        Grade::Medium
    } else {
        Grade::Low
    }
}

fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); 0 below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Linear interpolation between closest ranks; `sorted` must be ascending.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Percentile bootstrap of the mean. Draws come from one `StdRng` stream
/// seeded with `settings.seed`, so identical input gives identical bounds.
/// Non-finite values are dropped before anything is computed.
pub fn bootstrap_ci(values: &[f64], settings: &ConfidenceSettings) -> ConfidenceResult {
    let data = finite_values(values);
    let n = data.len();
    let m = mean(&data);
    if n < 2 {
        return ConfidenceResult {
            mean: m,
            std: 0.0,
            lower: m,
            upper: m,
            width: 0.0,
            stability: Grade::Low,
            n,
        };
    }

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let resamples = settings.resamples.max(1);
    let mut means = Vec::with_capacity(resamples);
    for _ in 0..resamples {
        let mut total = 0.0;
        for _ in 0..n {
            total += data[rng.gen_range(0..n)];
        }
        means.push(total / n as f64);
    }
    means.sort_by(|a, b| a.total_cmp(b));

    let confidence = if settings.confidence.is_finite() {
        settings.confidence.clamp(0.0, 1.0)
    } else {
        0.95
    };
    let alpha = 1.0 - confidence;
    let lower = percentile(&means, alpha / 2.0 * 100.0);
    let upper = percentile(&means, (1.0 - alpha / 2.0) * 100.0);
    let width = upper - lower;

    ConfidenceResult {
        mean: m,
        std: sample_std(&data),
        lower,
        upper,
        width,
        stability: stability_with(n, width, &settings.stability),
        n,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    Substantial,
    Moderate,
    Small,
    Negligible,
}

impl EffectMagnitude {
    pub fn from_effect(effect_size: f64) -> Self {
        let e = if effect_size.is_finite() { effect_size.abs() } else { 0.0 };
        if e >= 0.8 {
            EffectMagnitude::Substantial
        } else if e >= 0.5 {
            EffectMagnitude::Moderate
        } else if e >= 0.2 {
            EffectMagnitude::Small
        } else {
            EffectMagnitude::Negligible
        }
    }
}

pub fn interpret_delta(delta: f64, effect_size: f64) -> String {
    let magnitude = match EffectMagnitude::from_effect(effect_size) {
        EffectMagnitude::Substantial => "Substantial",
        EffectMagnitude::Moderate => "Moderate",
        EffectMagnitude::Small => "Small",
        EffectMagnitude::Negligible => return "No meaningful change".to_string(),
    };
    let direction = if delta > 0.0 { "improvement" } else { "decline" };
    format!("{magnitude} {direction}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current: ConfidenceResult,
    pub baseline: ConfidenceResult,
    pub delta: f64,
    pub effect_size: f64,
    pub magnitude: EffectMagnitude,
    pub confidence: Grade,
    pub interpretation: String,
}

/// Delta of means normalized by the pooled standard deviation
/// (`sqrt((s1² + s2²) / 2)`); 0 when both periods have no spread.
pub fn compare_periods(
    current: &[f64],
    baseline: &[f64],
    settings: &ConfidenceSettings,
) -> PeriodComparison {
    let current_stats = bootstrap_ci(current, settings);
    let baseline_stats = bootstrap_ci(baseline, settings);
    let delta = current_stats.mean - baseline_stats.mean;
    let pooled = ((current_stats.std.powi(2) + baseline_stats.std.powi(2)) / 2.0).sqrt();
    let effect_size = if pooled > 0.0 { delta / pooled } else { 0.0 };
    PeriodComparison {
        confidence: confidence_label(
            current_stats.n.min(baseline_stats.n),
            delta,
            settings.label.n_threshold,
            settings.label.effect_threshold,
        ),
        magnitude: EffectMagnitude::from_effect(effect_size),
        interpretation: interpret_delta(delta, effect_size),
        current: current_stats,
        baseline: baseline_stats,
        delta,
        effect_size,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyMetrics {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub iqr: f64,
    pub range: f64,
    /// Coefficient of variation in percent; 0 when the mean is 0.
    pub cv: f64,
    pub n: usize,
}

pub fn consistency_metrics(values: &[f64]) -> ConsistencyMetrics {
    let data = sorted_copy(&finite_values(values));
    let n = data.len();
    let m = mean(&data);
    let median = percentile(&data, 50.0);
    if n < 2 {
        return ConsistencyMetrics {
            mean: m,
            median,
            std: 0.0,
            iqr: 0.0,
            range: 0.0,
            cv: 0.0,
            n,
        };
    }
    let std = sample_std(&data);
    ConsistencyMetrics {
        mean: m,
        median,
        std,
        iqr: percentile(&data, 75.0) - percentile(&data, 25.0),
        range: data[n - 1] - data[0],
        cv: if m != 0.0 { std / m * 100.0 } else { 0.0 },
        n,
    }
}

/// Drops `floor(n * proportion)` values from each end; plain mean below three values.
pub fn trimmed_mean(values: &[f64], proportion: f64) -> f64 {
    let data = sorted_copy(&finite_values(values));
    if data.len() < 3 {
        return mean(&data);
    }
    let p = if proportion.is_finite() { proportion.clamp(0.0, 0.5) } else { 0.0 };
    let cut = (data.len() as f64 * p).floor() as usize;
    if cut * 2 >= data.len() {
        return percentile(&data, 50.0);
    }
    mean(&data[cut..data.len() - cut])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleSize {
    Good,
    Adequate,
    Limited,
    #[serde(rename = "Very Limited")]
    VeryLimited,
}

pub fn sample_size_category(n: usize) -> SampleSize {
    match n {
        20.. => SampleSize::Good,
        10..=19 => SampleSize::Adequate,
        5..=9 => SampleSize::Limited,
        _ => SampleSize::VeryLimited,
    }
}

pub fn is_reliable(n: usize, width: Option<f64>) -> bool {
    if n < 5 {
        return false;
    }
    match width {
        Some(w) => stability(n, w) != Grade::Low,
        None => n >= 10,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StabilityBadge {
    pub grade: Grade,
    pub color: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    pub tooltip: Option<String>,
}

pub fn stability_badge(grade: Grade, n: Option<usize>) -> StabilityBadge {
    let (color, icon, label) = match grade {
        Grade::High => ("green", "✅", "High Confidence"),
        Grade::Medium => ("orange", "⚠️", "Moderate Confidence"),
        Grade::Low => ("red", "❌", "Low Confidence"),
    };
    StabilityBadge {
        grade,
        color,
        icon,
        label,
        tooltip: n.map(|n| format!("Based on {n} observations")),
    }
}
