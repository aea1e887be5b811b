use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::holes::{HoleAggregate, HoleShots, group_holes, round_totals};
use crate::shots::{ShotCategory, ShotRecord};

/// A "scoring shot" is the first approach or short-game shot from inside this distance.
pub const SCORING_SHOT_MAX_DISTANCE: f64 = 125.0;

/// Blow-up hole rules. Each one is evaluated by `evaluate_rule`; there is no
/// other way to add a rule than a new variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailRule {
    #[serde(rename = "3 Putts")]
    ThreePutt,
    #[serde(rename = "Double Bogey")]
    DoubleBogey,
    #[serde(rename = "Par 5 Bogey")]
    Par5Bogey,
    #[serde(rename = "Missed Green")]
    MissedGreen,
    #[serde(rename = "125yd Bogey")]
    ScoringShotBogey,
}

impl FailRule {
    pub const ALL: [FailRule; 5] = [
        FailRule::ThreePutt,
        FailRule::DoubleBogey,
        FailRule::Par5Bogey,
        FailRule::MissedGreen,
        FailRule::ScoringShotBogey,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FailRule::ThreePutt => "3 Putts",
            FailRule::DoubleBogey => "Double Bogey",
            FailRule::Par5Bogey => "Par 5 Bogey",
            FailRule::MissedGreen => "Missed Green",
            FailRule::ScoringShotBogey => "125yd Bogey",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The hole is not an attempt for this rule.
    NotApplicable,
    Pass,
    Fail,
}

impl RuleOutcome {
    fn from_fail(failed: bool) -> Self {
        if failed { RuleOutcome::Fail } else { RuleOutcome::Pass }
    }
}

pub fn evaluate_rule(rule: FailRule, hole: &HoleAggregate, shots: &[&ShotRecord]) -> RuleOutcome {
    match rule {
        FailRule::ThreePutt => RuleOutcome::from_fail(hole.putts >= 3),
        FailRule::DoubleBogey => RuleOutcome::from_fail(hole.score_vs_par >= 2),
        FailRule::Par5Bogey => {
            if hole.par != 5 {
                return RuleOutcome::NotApplicable;
            }
            RuleOutcome::from_fail(hole.hole_score >= 6)
        }
        FailRule::MissedGreen => {
            let first_short_game = shots
                .iter()
                .filter(|s| s.category() == ShotCategory::ShortGame)
                .min_by_key(|s| s.shot);
            match first_short_game {
                Some(shot) => RuleOutcome::from_fail(!shot.ends_on_green()),
                None => RuleOutcome::NotApplicable,
            }
        }
        FailRule::ScoringShotBogey => {
            let scoring_shot = shots
                .iter()
                .filter(|s| matches!(s.category(), ShotCategory::Approach | ShotCategory::ShortGame))
                .filter(|s| s.start_distance_or_zero() <= SCORING_SHOT_MAX_DISTANCE)
                .min_by_key(|s| s.shot);
            match scoring_shot {
                Some(shot) => RuleOutcome::from_fail(
                    shot.strokes_gained < 0.0 && hole.hole_score > hole.par,
                ),
                None => RuleOutcome::NotApplicable,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleTally {
    pub rule: FailRule,
    pub attempts: usize,
    pub fails: usize,
    pub fail_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tiger5Summary {
    pub total_holes: usize,
    pub rules: Vec<RuleTally>,
    pub total_fails: usize,
    pub total_attempts: usize,
    pub grit_score: f64,
}

pub fn grit_score(total_attempts: usize, total_fails: usize) -> f64 {
    if total_attempts == 0 {
        return 100.0;
    }
    total_attempts.saturating_sub(total_fails) as f64 / total_attempts as f64 * 100.0
}

fn hole_index<'a>(groups: &'a [HoleShots<'a>]) -> HashMap<(&'a str, u32), &'a [&'a ShotRecord]> {
    groups
        .iter()
        .map(|g| ((g.round_id, g.hole), g.shots.as_slice()))
        .collect()
}

pub fn tiger5_fails(holes: &[HoleAggregate], shots: &[ShotRecord]) -> Tiger5Summary {
    let groups = group_holes(shots);
    let index = hole_index(&groups);

    let mut rules: Vec<RuleTally> = FailRule::ALL
        .iter()
        .map(|rule| RuleTally {
            rule: *rule,
            attempts: 0,
            fails: 0,
            fail_rate: 0.0,
        })
        .collect();

    for hole in holes {
        let hole_shots = index.get(&hole.key()).copied().unwrap_or(&[]);
        for tally in rules.iter_mut() {
            match evaluate_rule(tally.rule, hole, hole_shots) {
                RuleOutcome::NotApplicable => {}
                RuleOutcome::Pass => tally.attempts += 1,
                RuleOutcome::Fail => {
                    tally.attempts += 1;
                    tally.fails += 1;
                }
            }
        }
    }

    for tally in rules.iter_mut() {
        if tally.attempts > 0 {
            tally.fail_rate = tally.fails as f64 / tally.attempts as f64 * 100.0;
        }
    }
    let total_fails = rules.iter().map(|t| t.fails).sum();
    let total_attempts = rules.iter().map(|t| t.attempts).sum();
    Tiger5Summary {
        total_holes: holes.len(),
        rules,
        total_fails,
        total_attempts,
        grit_score: grit_score(total_attempts, total_fails),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTiger5 {
    pub round_id: String,
    pub summary: Tiger5Summary,
}

/// One summary per round, in play order.
pub fn tiger5_trend(holes: &[HoleAggregate], shots: &[ShotRecord]) -> Vec<RoundTiger5> {
    round_totals(holes)
        .into_iter()
        .map(|round| {
            let round_holes: Vec<HoleAggregate> = holes
                .iter()
                .filter(|h| h.round_id == round.round_id)
                .cloned()
                .collect();
            let round_shots: Vec<ShotRecord> = shots
                .iter()
                .filter(|s| s.round_id == round.round_id)
                .cloned()
                .collect();
            RoundTiger5 {
                summary: tiger5_fails(&round_holes, &round_shots),
                round_id: round.round_id,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailScenario {
    pub round_id: String,
    pub hole: u32,
    pub hole_score: u32,
    pub score_vs_par: i32,
    pub putts: usize,
    pub fails: Vec<FailRule>,
}

/// Holes that failed at least one rule, with the rules they failed.
pub fn fail_scenarios(holes: &[HoleAggregate], shots: &[ShotRecord]) -> Vec<FailScenario> {
    let groups = group_holes(shots);
    let index = hole_index(&groups);
    holes
        .iter()
        .filter_map(|hole| {
            let hole_shots = index.get(&hole.key()).copied().unwrap_or(&[]);
            let fails: Vec<FailRule> = FailRule::ALL
                .into_iter()
                .filter(|rule| evaluate_rule(*rule, hole, hole_shots) == RuleOutcome::Fail)
                .collect();
            (!fails.is_empty()).then(|| FailScenario {
                round_id: hole.round_id.clone(),
                hole: hole.hole,
                hole_score: hole.hole_score,
                score_vs_par: hole.score_vs_par,
                putts: hole.putts,
                fails,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GritLevel {
    Excellent,
    Good,
    #[serde(rename = "Needs Work")]
    NeedsWork,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GritInterpretation {
    pub level: GritLevel,
    pub color: &'static str,
    pub message: &'static str,
}

pub fn grit_interpretation(score: f64) -> GritInterpretation {
    if score >= 85.0 {
        GritInterpretation {
            level: GritLevel::Excellent,
            color: "green",
            message: "Outstanding avoidance of blowup holes",
        }
    } else if score >= 75.0 {
        GritInterpretation {
            level: GritLevel::Good,
            color: "blue",
            message: "Solid performance with occasional struggles",
        }
    } else if score >= 65.0 {
        GritInterpretation {
            level: GritLevel::NeedsWork,
            color: "orange",
            message: "Regular blowup holes hurting scoring",
        }
    } else {
        GritInterpretation {
            level: GritLevel::Critical,
            color: "red",
            message: "Frequent blowup holes, major improvement needed",
        }
    }
}
