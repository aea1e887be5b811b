use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::holes::{HoleAggregate, HoleShots, group_holes};
use crate::shots::{ShotCategory, ShotRecord};

pub const SHORT_PUTT_MAX: f64 = 6.0;
pub const MID_RANGE_PUTT_MAX: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "Double Bogey+")]
    DoubleBogeyPlus,
    #[serde(rename = "Bogey")]
    Bogey,
    #[serde(rename = "Underperformance")]
    Underperformance,
}

impl Section {
    /// Priority order; a hole belongs to the first section that accepts it.
    pub const ALL: [Section; 3] = [
        Section::DoubleBogeyPlus,
        Section::Bogey,
        Section::Underperformance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Section::DoubleBogeyPlus => "Double Bogey+",
            Section::Bogey => "Bogey",
            Section::Underperformance => "Underperformance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RootCauseCategory {
    #[serde(rename = "Short Putts")]
    ShortPutts,
    #[serde(rename = "Mid Range")]
    MidRange,
    #[serde(rename = "Lag Putts")]
    LagPutts,
    #[serde(rename = "Driving")]
    Driving,
    #[serde(rename = "Approach")]
    Approach,
    #[serde(rename = "Short Game")]
    ShortGame,
    #[serde(rename = "Recovery/Other")]
    RecoveryOther,
}

impl RootCauseCategory {
    pub const ALL: [RootCauseCategory; 7] = [
        RootCauseCategory::ShortPutts,
        RootCauseCategory::MidRange,
        RootCauseCategory::LagPutts,
        RootCauseCategory::Driving,
        RootCauseCategory::Approach,
        RootCauseCategory::ShortGame,
        RootCauseCategory::RecoveryOther,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RootCauseCategory::ShortPutts => "Short Putts",
            RootCauseCategory::MidRange => "Mid Range",
            RootCauseCategory::LagPutts => "Lag Putts",
            RootCauseCategory::Driving => "Driving",
            RootCauseCategory::Approach => "Approach",
            RootCauseCategory::ShortGame => "Short Game",
            RootCauseCategory::RecoveryOther => "Recovery/Other",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Putts split by starting distance, everything else by shot type.
pub fn classify_root_cause(category: ShotCategory, distance: f64) -> RootCauseCategory {
    match category {
        ShotCategory::Putting if distance <= SHORT_PUTT_MAX => RootCauseCategory::ShortPutts,
        ShotCategory::Putting if distance <= MID_RANGE_PUTT_MAX => RootCauseCategory::MidRange,
        ShotCategory::Putting => RootCauseCategory::LagPutts,
        ShotCategory::Driving => RootCauseCategory::Driving,
        ShotCategory::Approach => RootCauseCategory::Approach,
        ShotCategory::ShortGame => RootCauseCategory::ShortGame,
        ShotCategory::Other => RootCauseCategory::RecoveryOther,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootCauseSettings {
    /// Shots at or below this SG count as severe on Double Bogey+ holes.
    pub severe_sg_threshold: f64,
    pub multiple_severe_min: usize,
    pub three_putt_min: usize,
}

impl Default for RootCauseSettings {
    fn default() -> Self {
        Self {
            severe_sg_threshold: -0.5,
            multiple_severe_min: 2,
            three_putt_min: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCauseRecord {
    pub section: Section,
    pub root_cause: RootCauseCategory,
    pub round_id: String,
    pub date: Option<NaiveDate>,
    pub hole: u32,
    pub shot_number: u32,
    pub shot_type: ShotCategory,
    pub distance: f64,
    pub sg_value: f64,
    pub penalty: bool,
    pub ending_location: String,
    pub hole_score: u32,
    pub par: u32,
    pub score_vs_par: i32,
    pub putts: usize,
    pub penalties: usize,
    /// Double Bogey+ only.
    pub severe_shot_count: usize,
    pub multiple_severe: bool,
    /// Underperformance only.
    pub three_putt: bool,
    pub short_game_miss: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryTally {
    pub category: RootCauseCategory,
    pub count: usize,
    pub total_sg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    pub section: Section,
    pub total_holes: usize,
    pub root_causes: Vec<RootCauseRecord>,
    /// Always all seven categories, in `RootCauseCategory::ALL` order.
    pub categories: Vec<CategoryTally>,
    pub penalty_percentage: f64,
    pub severe_percentage: f64,
    pub multiple_severe_count: usize,
    pub three_putt_count: usize,
    pub short_game_miss_count: usize,
}

impl SectionResult {
    pub fn empty(section: Section) -> Self {
        Self {
            section,
            total_holes: 0,
            root_causes: Vec::new(),
            categories: empty_tallies(),
            penalty_percentage: 0.0,
            severe_percentage: 0.0,
            multiple_severe_count: 0,
            three_putt_count: 0,
            short_game_miss_count: 0,
        }
    }

    pub fn count(&self, category: RootCauseCategory) -> usize {
        self.categories[category.index()].count
    }

    pub fn sg(&self, category: RootCauseCategory) -> f64 {
        self.categories[category.index()].total_sg
    }

    fn from_records(section: Section, records: Vec<RootCauseRecord>) -> Self {
        let mut out = Self::empty(section);
        if records.is_empty() {
            return out;
        }
        for rc in &records {
            let tally = &mut out.categories[rc.root_cause.index()];
            tally.count += 1;
            tally.total_sg += rc.sg_value;
        }
        let total = records.len();
        let with_penalty = records.iter().filter(|rc| rc.penalties > 0).count();
        out.total_holes = total;
        match section {
            Section::DoubleBogeyPlus => {
                out.penalty_percentage = percentage(with_penalty, total);
                out.multiple_severe_count = records.iter().filter(|rc| rc.multiple_severe).count();
                out.severe_percentage = percentage(out.multiple_severe_count, total);
            }
            Section::Bogey => {
                out.penalty_percentage = percentage(with_penalty, total);
            }
            Section::Underperformance => {
                out.three_putt_count = records.iter().filter(|rc| rc.three_putt).count();
                out.short_game_miss_count =
                    records.iter().filter(|rc| rc.short_game_miss).count();
            }
        }
        out.root_causes = records;
        out
    }
}

fn empty_tallies() -> Vec<CategoryTally> {
    RootCauseCategory::ALL
        .iter()
        .map(|category| CategoryTally {
            category: *category,
            count: 0,
            total_sg: 0.0,
        })
        .collect()
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Worst (lowest) SG shot on the hole; the earliest shot wins ties.
/// Non-finite SG is compared as 0.
pub fn worst_shot<'a>(shots: &[&'a ShotRecord]) -> Option<&'a ShotRecord> {
    let mut worst: Option<(&'a ShotRecord, f64)> = None;
    for &shot in shots {
        let sg = sg_or_zero(shot.strokes_gained);
        match worst {
            Some((_, lowest)) if sg >= lowest => {}
            _ => worst = Some((shot, sg)),
        }
    }
    worst.map(|(shot, _)| shot)
}

fn sg_or_zero(sg: f64) -> f64 {
    if sg.is_finite() { sg } else { 0.0 }
}

pub fn detect_three_putt(shots: &[&ShotRecord], min_putts: usize) -> bool {
    shots.iter().filter(|s| s.starts_on_green()).count() >= min_putts
}

/// The hole's first short-game shot (lowest shot index) finished off the green.
pub fn detect_short_game_miss(shots: &[&ShotRecord]) -> bool {
    shots
        .iter()
        .filter(|s| s.category() == ShotCategory::ShortGame)
        .min_by_key(|s| s.shot)
        .is_some_and(|s| !s.ends_on_green())
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct HoleFlags {
    three_putt: bool,
    short_game_miss: bool,
}

/// Priority-ordered partition: score band first, then the underperformance
/// pattern for par-or-better holes. A hole lands in at most one section.
fn assign_section(
    hole: &HoleAggregate,
    shots: &[&ShotRecord],
    settings: &RootCauseSettings,
) -> Option<(Section, HoleFlags)> {
    Section::ALL.into_iter().find_map(|section| match section {
        Section::DoubleBogeyPlus if hole.score_vs_par >= 2 => Some((section, HoleFlags::default())),
        Section::Bogey if hole.score_vs_par == 1 => Some((section, HoleFlags::default())),
        Section::Underperformance if hole.score_vs_par <= 0 => {
            let flags = HoleFlags {
                three_putt: detect_three_putt(shots, settings.three_putt_min),
                short_game_miss: detect_short_game_miss(shots),
            };
            (flags.three_putt || flags.short_game_miss).then_some((section, flags))
        }
        _ => None,
    })
}

fn build_record(
    section: Section,
    hole: &HoleAggregate,
    shots: &[&ShotRecord],
    flags: HoleFlags,
    settings: &RootCauseSettings,
) -> Option<RootCauseRecord> {
    let worst = worst_shot(shots)?;
    let shot_type = worst.category();
    let distance = worst.start_distance_or_zero();
    let (severe_shot_count, multiple_severe) = if section == Section::DoubleBogeyPlus {
        let severe = shots
            .iter()
            .filter(|s| s.strokes_gained <= settings.severe_sg_threshold)
            .count();
        (severe, severe >= settings.multiple_severe_min)
    } else {
        (0, false)
    };
    Some(RootCauseRecord {
        section,
        root_cause: classify_root_cause(shot_type, distance),
        round_id: hole.round_id.clone(),
        date: hole.date,
        hole: hole.hole,
        shot_number: worst.shot,
        shot_type,
        distance,
        sg_value: sg_or_zero(worst.strokes_gained),
        penalty: worst.penalty,
        ending_location: worst.ending_location.clone(),
        hole_score: hole.hole_score,
        par: hole.par,
        score_vs_par: hole.score_vs_par,
        putts: hole.putts,
        penalties: hole.penalties,
        severe_shot_count,
        multiple_severe,
        three_putt: flags.three_putt,
        short_game_miss: flags.short_game_miss,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringAnalysis {
    pub double_bogey: SectionResult,
    pub bogey: SectionResult,
    pub underperformance: SectionResult,
}

impl ScoringAnalysis {
    pub fn sections(&self) -> [&SectionResult; 3] {
        [&self.double_bogey, &self.bogey, &self.underperformance]
    }

    pub fn section(&self, section: Section) -> &SectionResult {
        match section {
            Section::DoubleBogeyPlus => &self.double_bogey,
            Section::Bogey => &self.bogey,
            Section::Underperformance => &self.underperformance,
        }
    }
}

/// Classifies every hole and attributes one root cause per flagged hole.
/// `shots` must carry SG (see `benchmark::recompute_all`).
pub fn analyze(
    holes: &[HoleAggregate],
    shots: &[ShotRecord],
    settings: &RootCauseSettings,
) -> ScoringAnalysis {
    let groups = group_holes(shots);
    let by_key: HashMap<(&str, u32), &HoleShots<'_>> =
        groups.iter().map(|g| ((g.round_id, g.hole), g)).collect();

    let mut records: HashMap<Section, Vec<RootCauseRecord>> = HashMap::new();
    for hole in holes {
        let Some(group) = by_key.get(&hole.key()) else {
            continue;
        };
        let Some((section, flags)) = assign_section(hole, &group.shots, settings) else {
            continue;
        };
        if let Some(record) = build_record(section, hole, &group.shots, flags, settings) {
            records.entry(section).or_default().push(record);
        }
    }

    let mut take = |section: Section| {
        SectionResult::from_records(section, records.remove(&section).unwrap_or_default())
    };
    ScoringAnalysis {
        double_bogey: take(Section::DoubleBogeyPlus),
        bogey: take(Section::Bogey),
        underperformance: take(Section::Underperformance),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroCard {
    pub category: RootCauseCategory,
    pub count: usize,
    pub total_sg: f64,
    pub double_bogey_count: usize,
    pub bogey_count: usize,
    pub underperformance_count: usize,
}

pub fn hero_cards(analysis: &ScoringAnalysis) -> Vec<HeroCard> {
    RootCauseCategory::ALL
        .iter()
        .map(|category| {
            let db = analysis.double_bogey.count(*category);
            let b = analysis.bogey.count(*category);
            let up = analysis.underperformance.count(*category);
            HeroCard {
                category: *category,
                count: db + b + up,
                total_sg: analysis
                    .sections()
                    .iter()
                    .map(|s| s.sg(*category))
                    .sum(),
                double_bogey_count: db,
                bogey_count: b,
                underperformance_count: up,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRow {
    pub round_id: String,
    pub date: Option<NaiveDate>,
    /// Fail counts in `TrendData::categories` order.
    pub counts: Vec<usize>,
    pub total_fails: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendData {
    pub categories: Vec<RootCauseCategory>,
    pub rounds: Vec<TrendRow>,
}

/// Per-round fail counts across all sections, ordered by date then round id.
pub fn trend(analysis: &ScoringAnalysis) -> TrendData {
    let mut rows: HashMap<&str, TrendRow> = HashMap::new();
    for rc in analysis.sections().iter().flat_map(|s| s.root_causes.iter()) {
        let row = rows.entry(rc.round_id.as_str()).or_insert_with(|| TrendRow {
            round_id: rc.round_id.clone(),
            date: rc.date,
            counts: vec![0; RootCauseCategory::ALL.len()],
            total_fails: 0,
        });
        row.counts[rc.root_cause.index()] += 1;
        row.total_fails += 1;
    }
    let mut rounds: Vec<TrendRow> = rows.into_values().collect();
    rounds.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.round_id.cmp(&b.round_id)));
    TrendData {
        categories: RootCauseCategory::ALL.to_vec(),
        rounds,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyMetrics {
    pub bogey_with_penalty_pct: f64,
    pub double_bogey_with_penalty_pct: f64,
    pub double_bogey_multiple_severe_pct: f64,
    pub bogey_total: usize,
    pub double_bogey_total: usize,
}

pub fn penalty_metrics(analysis: &ScoringAnalysis) -> PenaltyMetrics {
    PenaltyMetrics {
        bogey_with_penalty_pct: analysis.bogey.penalty_percentage,
        double_bogey_with_penalty_pct: analysis.double_bogey.penalty_percentage,
        double_bogey_multiple_severe_pct: analysis.double_bogey.severe_percentage,
        bogey_total: analysis.bogey.total_holes,
        double_bogey_total: analysis.double_bogey.total_holes,
    }
}

/// Every root-cause record, Double Bogey+ first.
pub fn detail_table(analysis: &ScoringAnalysis) -> Vec<RootCauseRecord> {
    analysis
        .sections()
        .iter()
        .flat_map(|s| s.root_causes.iter().cloned())
        .collect()
}

pub fn filter_detail<'a>(
    records: &'a [RootCauseRecord],
    section: Option<Section>,
    category: Option<RootCauseCategory>,
) -> Vec<&'a RootCauseRecord> {
    records
        .iter()
        .filter(|rc| section.is_none_or(|s| rc.section == s))
        .filter(|rc| category.is_none_or(|c| rc.root_cause == c))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringSummary {
    pub total_holes: usize,
    pub scoring_average: f64,
    pub eagles: usize,
    pub birdies: usize,
    pub pars: usize,
    pub bogeys: usize,
    pub doubles_or_worse: usize,
    pub double_bogey_count: usize,
    pub bogey_count: usize,
    pub underperformance_count: usize,
    pub total_fails: usize,
}

pub fn scoring_summary(holes: &[HoleAggregate], analysis: &ScoringAnalysis) -> ScoringSummary {
    let count = |pred: fn(i32) -> bool| holes.iter().filter(|h| pred(h.score_vs_par)).count();
    let scoring_average = if holes.is_empty() {
        0.0
    } else {
        holes.iter().map(|h| h.hole_score as f64).sum::<f64>() / holes.len() as f64
    };
    let double_bogey_count = analysis.double_bogey.total_holes;
    let bogey_count = analysis.bogey.total_holes;
    let underperformance_count = analysis.underperformance.total_holes;
    ScoringSummary {
        total_holes: holes.len(),
        scoring_average,
        eagles: count(|d| d <= -2),
        birdies: count(|d| d == -1),
        pars: count(|d| d == 0),
        bogeys: count(|d| d == 1),
        doubles_or_worse: count(|d| d >= 2),
        double_bogey_count,
        bogey_count,
        underperformance_count,
        total_fails: double_bogey_count + bogey_count + underperformance_count,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringReport {
    pub analysis: ScoringAnalysis,
    pub hero_cards: Vec<HeroCard>,
    pub trend: TrendData,
    pub penalties: PenaltyMetrics,
    pub summary: ScoringSummary,
}

pub fn build_scoring_report(
    holes: &[HoleAggregate],
    shots: &[ShotRecord],
    settings: &RootCauseSettings,
) -> ScoringReport {
    let analysis = analyze(holes, shots, settings);
    ScoringReport {
        hero_cards: hero_cards(&analysis),
        trend: trend(&analysis),
        penalties: penalty_metrics(&analysis),
        summary: scoring_summary(holes, &analysis),
        analysis,
    }
}
