use fairway_sg::holes::{HoleAggregate, ParSource, aggregate_holes, round_totals};
use fairway_sg::root_cause::{
    RootCauseCategory, RootCauseSettings, ScoringAnalysis, Section, analyze,
    build_scoring_report, detail_table, filter_detail, hero_cards, trend,
};
use fairway_sg::shots::ShotRecord;

struct Shot<'a> {
    from: (&'a str, f64),
    to: (&'a str, f64),
    sg: f64,
    penalty: bool,
}

fn s<'a>(from: (&'a str, f64), to: (&'a str, f64), sg: f64) -> Shot<'a> {
    Shot {
        from,
        to,
        sg,
        penalty: false,
    }
}

fn hole(round: &str, date: &str, number: u32, score: u32, shots: Vec<Shot<'_>>) -> Vec<ShotRecord> {
    shots
        .into_iter()
        .enumerate()
        .map(|(idx, shot)| ShotRecord {
            round_id: round.to_string(),
            date: chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            hole: number,
            shot: idx as u32 + 1,
            score,
            starting_location: shot.from.0.to_string(),
            starting_distance: Some(shot.from.1),
            ending_location: shot.to.0.to_string(),
            ending_distance: Some(shot.to.1),
            penalty: shot.penalty,
            strokes_gained: shot.sg,
            shot_category: None,
        })
        .collect()
}

/// Scores [5, 4, 3] against pars [4, 3, 3].
fn three_hole_round(third_hole_putts: usize) -> Vec<ShotRecord> {
    let mut shots = hole(
        "R1",
        "2026-04-01",
        1,
        5,
        vec![
            s(("Tee", 400.0), ("Fairway", 170.0), 0.2),
            s(("Fairway", 170.0), ("Rough", 40.0), -0.9),
            s(("Rough", 40.0), ("Green", 12.0), -0.3),
            s(("Green", 12.0), ("Green", 2.0), 0.1),
            s(("Green", 2.0), ("Hole", 0.0), 0.0),
        ],
    );
    shots.extend(hole(
        "R1",
        "2026-04-01",
        2,
        4,
        vec![
            s(("Tee", 150.0), ("Sand", 10.0), -0.4),
            s(("Sand", 10.0), ("Green", 9.0), -0.1),
            s(("Green", 9.0), ("Green", 1.0), -0.2),
            s(("Green", 1.0), ("Hole", 0.0), 0.0),
        ],
    ));
    let third = if third_hole_putts >= 3 {
        vec![
            s(("Tee", 150.0), ("Green", 35.0), 0.3),
            s(("Green", 35.0), ("Green", 8.0), -0.1),
            s(("Green", 8.0), ("Green", 1.0), -0.7),
            s(("Green", 1.0), ("Hole", 0.0), 0.0),
        ]
    } else {
        vec![
            s(("Tee", 150.0), ("Green", 20.0), 0.1),
            s(("Green", 20.0), ("Green", 2.0), 0.0),
            s(("Green", 2.0), ("Hole", 0.0), 0.0),
        ]
    };
    shots.extend(hole("R1", "2026-04-01", 3, 3, third));
    shots
}

fn run(shots: &[ShotRecord]) -> (Vec<HoleAggregate>, ScoringAnalysis) {
    let holes = aggregate_holes(shots, &ParSource::default());
    let analysis = analyze(&holes, shots, &RootCauseSettings::default());
    (holes, analysis)
}

#[test]
fn worst_shot_is_the_root_cause() {
    let (_, analysis) = run(&three_hole_round(2));
    let first = &analysis.bogey.root_causes[0];
    assert_eq!(first.hole, 1);
    assert_eq!(first.shot_number, 2);
    assert_eq!(first.sg_value, -0.9);
    assert_eq!(first.root_cause, RootCauseCategory::Approach);
}

#[test]
fn three_hole_round_sections() {
    let (holes, analysis) = run(&three_hole_round(2));
    let pars: Vec<u32> = holes.iter().map(|h| h.par).collect();
    let vs_par: Vec<i32> = holes.iter().map(|h| h.score_vs_par).collect();
    assert_eq!(pars, vec![4, 3, 3]);
    assert_eq!(vs_par, vec![1, 1, 0]);

    assert_eq!(analysis.double_bogey.total_holes, 0);
    let bogey_holes: Vec<u32> = analysis.bogey.root_causes.iter().map(|rc| rc.hole).collect();
    assert_eq!(bogey_holes, vec![1, 2]);
    assert!(analysis.underperformance.root_causes.is_empty());

    // hole 2: the tee shot found the sand and is the worst stroke
    let second = &analysis.bogey.root_causes[1];
    assert_eq!(second.shot_number, 1);
    assert_eq!(second.root_cause, RootCauseCategory::Driving);
}

#[test]
fn third_hole_three_putt_is_underperformance() {
    let (_, analysis) = run(&three_hole_round(3));
    assert_eq!(analysis.bogey.total_holes, 2);
    assert_eq!(analysis.underperformance.total_holes, 1);
    let rc = &analysis.underperformance.root_causes[0];
    assert_eq!(rc.hole, 3);
    assert!(rc.three_putt);
    assert!(!rc.short_game_miss);
    assert_eq!(rc.root_cause, RootCauseCategory::MidRange);
    assert_eq!(analysis.underperformance.three_putt_count, 1);
}

#[test]
fn double_bogey_hole_only_in_double_bogey_section() {
    let mut shots = hole(
        "R2",
        "2026-04-08",
        1,
        6,
        vec![
            Shot {
                penalty: true,
                ..s(("Tee", 400.0), ("Rough", 250.0), -1.2)
            },
            s(("Rough", 250.0), ("Fairway", 100.0), -0.6),
            s(("Fairway", 100.0), ("Green", 15.0), 0.0),
            s(("Green", 15.0), ("Green", 2.0), -0.1),
            s(("Green", 2.0), ("Hole", 0.0), 0.0),
        ],
    );
    // three putts, but the score puts it in Double Bogey+
    shots.extend(hole(
        "R2",
        "2026-04-08",
        2,
        7,
        vec![
            s(("Tee", 400.0), ("Fairway", 150.0), 0.0),
            s(("Fairway", 150.0), ("Green", 40.0), 0.0),
            s(("Green", 40.0), ("Green", 10.0), -0.2),
            s(("Green", 10.0), ("Green", 4.0), -0.4),
            s(("Green", 4.0), ("Hole", 0.0), -0.3),
        ],
    ));
    let (_, analysis) = run(&shots);
    assert_eq!(analysis.double_bogey.total_holes, 2);
    assert_eq!(analysis.bogey.total_holes, 0);
    assert_eq!(analysis.underperformance.total_holes, 0);

    let penalty_hole = &analysis.double_bogey.root_causes[0];
    assert_eq!(penalty_hole.root_cause, RootCauseCategory::Driving);
    assert!(penalty_hole.penalty);
    assert_eq!(penalty_hole.severe_shot_count, 2);
    assert!(penalty_hole.multiple_severe);

    let putting_hole = &analysis.double_bogey.root_causes[1];
    assert_eq!(putting_hole.root_cause, RootCauseCategory::MidRange);
    assert!(!putting_hole.multiple_severe);

    assert_eq!(analysis.double_bogey.penalty_percentage, 50.0);
    assert_eq!(analysis.double_bogey.severe_percentage, 50.0);
}

#[test]
fn missed_chip_on_par_hole_is_flagged() {
    let shots = hole(
        "R3",
        "2026-04-15",
        1,
        4,
        vec![
            s(("Tee", 380.0), ("Fairway", 120.0), 0.1),
            s(("Fairway", 120.0), ("Rough", 20.0), -0.2),
            s(("Rough", 20.0), ("Rough", 5.0), -0.5),
            s(("Rough", 5.0), ("Hole", 0.0), 0.8),
        ],
    );
    let (_, analysis) = run(&shots);
    assert_eq!(analysis.underperformance.total_holes, 1);
    let rc = &analysis.underperformance.root_causes[0];
    assert!(rc.short_game_miss);
    assert!(!rc.three_putt);
    assert_eq!(rc.root_cause, RootCauseCategory::ShortGame);
    assert_eq!(analysis.underperformance.short_game_miss_count, 1);
}

#[test]
fn shot_order_in_input_does_not_matter() {
    let mut shots = three_hole_round(3);
    shots.reverse();
    let (_, reversed) = run(&shots);
    let (_, ordered) = run(&three_hole_round(3));
    assert_eq!(detail_table(&reversed), detail_table(&ordered));
}

#[test]
fn hero_cards_sum_sections() {
    let mut shots = three_hole_round(3);
    shots.extend(hole(
        "R2",
        "2026-04-08",
        1,
        6,
        vec![
            s(("Tee", 400.0), ("Rough", 250.0), -1.2),
            s(("Rough", 250.0), ("Fairway", 100.0), -0.6),
            s(("Fairway", 100.0), ("Green", 15.0), 0.0),
            s(("Green", 15.0), ("Green", 2.0), -0.1),
            s(("Green", 2.0), ("Hole", 0.0), 0.0),
        ],
    ));
    let (_, analysis) = run(&shots);
    let cards = hero_cards(&analysis);
    assert_eq!(cards.len(), RootCauseCategory::ALL.len());
    for card in &cards {
        let from_sections: usize = analysis.sections().iter().map(|s| s.count(card.category)).sum();
        assert_eq!(card.count, from_sections);
        assert_eq!(
            card.count,
            card.double_bogey_count + card.bogey_count + card.underperformance_count
        );
    }
    let total: usize = cards.iter().map(|c| c.count).sum();
    assert_eq!(total, detail_table(&analysis).len());

    let trend = trend(&analysis);
    let rounds: Vec<&str> = trend.rounds.iter().map(|r| r.round_id.as_str()).collect();
    assert_eq!(rounds, vec!["R1", "R2"]);
    assert_eq!(trend.rounds[0].total_fails, 3);
    assert_eq!(trend.rounds[1].total_fails, 1);

    let driving = filter_detail(
        &detail_table(&analysis),
        Some(Section::DoubleBogeyPlus),
        Some(RootCauseCategory::Driving),
    )
    .len();
    assert_eq!(driving, 1);
}

#[test]
fn empty_shot_table_aggregates_to_nothing() {
    let holes = aggregate_holes(&[], &ParSource::default());
    assert!(holes.is_empty());
    assert!(round_totals(&holes).is_empty());
    assert!(round_totals(&[]).is_empty());
}

#[test]
fn empty_input_gives_empty_sections() {
    let report = build_scoring_report(&[], &[], &RootCauseSettings::default());
    for section in report.analysis.sections() {
        assert_eq!(section.total_holes, 0);
        assert!(section.root_causes.is_empty());
        assert_eq!(section.categories.len(), 7);
        assert!(section.categories.iter().all(|c| c.count == 0 && c.total_sg == 0.0));
        assert_eq!(section.penalty_percentage, 0.0);
    }
    assert!(report.hero_cards.iter().all(|c| c.count == 0));
    assert!(report.trend.rounds.is_empty());
    assert_eq!(report.summary.total_holes, 0);
    assert_eq!(report.summary.scoring_average, 0.0);
}

#[test]
fn scoring_summary_counts_score_types() {
    let shots = three_hole_round(3);
    let holes = aggregate_holes(&shots, &ParSource::default());
    let report = build_scoring_report(&holes, &shots, &RootCauseSettings::default());
    assert_eq!(report.summary.total_holes, 3);
    assert_eq!(report.summary.bogeys, 2);
    assert_eq!(report.summary.pars, 1);
    assert_eq!(report.summary.total_fails, 3);
    assert!((report.summary.scoring_average - 4.0).abs() < 1e-12);
}
