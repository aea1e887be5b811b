use chrono::NaiveDate;

use fairway_sg::holes::{ParSource, aggregate_holes};
use fairway_sg::shots::ShotRecord;
use fairway_sg::tiger5::{
    FailRule, GritLevel, fail_scenarios, grit_interpretation, tiger5_fails, tiger5_trend,
};

fn hole(round: &str, date: &str, number: u32, score: u32, path: &[(&str, f64, f64)]) -> Vec<ShotRecord> {
    // each step is (start location, start distance, sg); the ball ends where the next step starts
    let mut out = Vec::new();
    for (idx, (location, distance, sg)) in path.iter().enumerate() {
        let (end_location, end_distance) = path
            .get(idx + 1)
            .map(|(l, d, _)| (*l, *d))
            .unwrap_or(("Hole", 0.0));
        out.push(ShotRecord {
            round_id: round.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            hole: number,
            shot: idx as u32 + 1,
            score,
            starting_location: location.to_string(),
            starting_distance: Some(*distance),
            ending_location: end_location.to_string(),
            ending_distance: Some(end_distance),
            strokes_gained: *sg,
            ..Default::default()
        });
    }
    out
}

fn sample() -> Vec<ShotRecord> {
    let mut shots = Vec::new();
    // par 5 bogey, approach from 110 lost strokes
    shots.extend(hole(
        "R1",
        "2026-05-01",
        1,
        6,
        &[
            ("Tee", 520.0, 0.0),
            ("Fairway", 260.0, -0.1),
            ("Fairway", 110.0, -0.3),
            ("Green", 30.0, 0.0),
            ("Green", 3.0, 0.0),
        ],
    ));
    // par 4 double, chip stayed in the rough
    shots.extend(hole(
        "R1",
        "2026-05-01",
        2,
        6,
        &[
            ("Tee", 400.0, 0.0),
            ("Rough", 150.0, -0.8),
            ("Rough", 20.0, -0.4),
            ("Rough", 10.0, -0.1),
            ("Green", 6.0, -0.5),
            ("Green", 1.0, 0.0),
        ],
    ));
    // par 3 three-putt bogey
    shots.extend(hole(
        "R0",
        "2026-04-01",
        1,
        4,
        &[
            ("Tee", 160.0, 0.1),
            ("Green", 40.0, -0.1),
            ("Green", 8.0, -0.4),
            ("Green", 2.0, 0.0),
        ],
    ));
    shots
}

#[test]
fn counts_attempts_and_fails_per_rule() {
    let shots = sample();
    let holes = aggregate_holes(&shots, &ParSource::default());
    let summary = tiger5_fails(&holes, &shots);
    assert_eq!(summary.total_holes, 3);

    let tally = |rule: FailRule| {
        let t = summary
            .rules
            .iter()
            .find(|t| t.rule == rule)
            .expect("every rule is reported");
        (t.attempts, t.fails)
    };
    assert_eq!(tally(FailRule::ThreePutt), (3, 1));
    assert_eq!(tally(FailRule::DoubleBogey), (3, 1));
    assert_eq!(tally(FailRule::Par5Bogey), (1, 1));
    assert_eq!(tally(FailRule::MissedGreen), (1, 1));
    assert_eq!(tally(FailRule::ScoringShotBogey), (2, 2));

    assert_eq!(summary.total_attempts, 10);
    assert_eq!(summary.total_fails, 6);
    assert!((summary.grit_score - 40.0).abs() < 1e-9);
    assert_eq!(grit_interpretation(summary.grit_score).level, GritLevel::Critical);
}

#[test]
fn scenarios_list_failed_rules_per_hole() {
    let shots = sample();
    let holes = aggregate_holes(&shots, &ParSource::default());
    let scenarios = fail_scenarios(&holes, &shots);
    let found: Vec<(&str, u32, Vec<FailRule>)> = scenarios
        .iter()
        .map(|s| (s.round_id.as_str(), s.hole, s.fails.clone()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("R0", 1, vec![FailRule::ThreePutt]),
            ("R1", 1, vec![FailRule::Par5Bogey, FailRule::ScoringShotBogey]),
            (
                "R1",
                2,
                vec![
                    FailRule::DoubleBogey,
                    FailRule::MissedGreen,
                    FailRule::ScoringShotBogey
                ]
            ),
        ]
    );
}

#[test]
fn trend_follows_play_order() {
    let shots = sample();
    let holes = aggregate_holes(&shots, &ParSource::default());
    let trend = tiger5_trend(&holes, &shots);
    let rounds: Vec<&str> = trend.iter().map(|r| r.round_id.as_str()).collect();
    assert_eq!(rounds, vec!["R0", "R1"]);
    assert_eq!(trend[0].summary.total_fails, 1);
    assert_eq!(trend[1].summary.total_fails, 5);
}

#[test]
fn no_holes_means_perfect_grit() {
    let summary = tiger5_fails(&[], &[]);
    assert_eq!(summary.total_attempts, 0);
    assert_eq!(summary.grit_score, 100.0);
    assert_eq!(summary.rules.len(), FailRule::ALL.len());
}
