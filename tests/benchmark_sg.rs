use std::path::{Path, PathBuf};

use fairway_sg::benchmark::{
    BenchmarkRegistry, BenchmarkTable, DEFAULT_EXPECTED_STROKES, DistanceBucket, Location,
    distance_to_bucket, recompute_all,
};
use fairway_sg::shots::{ShotCategory, ShotRecord, load_shots_json};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn two_entry_registry() -> BenchmarkRegistry {
    let table = BenchmarkTable::from_entries([
        (Location::Fairway, DistanceBucket::From150To200, 3.0),
        (Location::Putt, DistanceBucket::Under50, 1.5),
    ]);
    let mut registry = BenchmarkRegistry::new();
    registry.insert("test", Some("Test Golfer"), table);
    registry
}

#[test]
fn sg_is_start_minus_end_minus_stroke() {
    let registry = two_entry_registry();
    let sg = registry.compute_sg("test", "fairway", 160.0, "green", 10.0, false);
    assert!((sg - 0.5).abs() < 1e-12);
}

#[test]
fn penalty_costs_two_strokes() {
    let registry = two_entry_registry();
    let sg = registry.compute_sg("test", "fairway", 160.0, "green", 10.0, true);
    assert!((sg + 0.5).abs() < 1e-12);
}

#[test]
fn bucket_edges_belong_to_the_upper_band() {
    assert_eq!(distance_to_bucket(49.9), DistanceBucket::Under50);
    assert_eq!(distance_to_bucket(50.0), DistanceBucket::From50To100);
    assert_eq!(distance_to_bucket(299.9), DistanceBucket::From250To300);
    assert_eq!(distance_to_bucket(300.0), DistanceBucket::Over300);
    assert_eq!(distance_to_bucket(f64::NAN), DistanceBucket::Under50);
    assert_eq!(distance_to_bucket(-5.0), DistanceBucket::Under50);
}

#[test]
fn lookups_fall_back_to_location_mean_then_default() {
    let registry = two_entry_registry();
    // fairway has only the 150-200 band, so any fairway distance resolves to it
    assert_eq!(registry.lookup("test", "fairway", 60.0), 3.0);
    assert_eq!(registry.lookup("test", "rough", 60.0), DEFAULT_EXPECTED_STROKES);
    // unknown lies are looked up as putts
    assert_eq!(registry.lookup("test", "cart path", 12.0), 1.5);
    assert_eq!(registry.lookup("missing", "fairway", 160.0), DEFAULT_EXPECTED_STROKES);
}

#[test]
fn unknown_benchmark_gives_minus_one_per_shot() {
    let registry = BenchmarkRegistry::new();
    let sg = registry.compute_sg("nope", "tee", 400.0, "fairway", 150.0, false);
    assert_eq!(sg, -1.0);
    assert_eq!(registry.display_name("nope"), "Unknown");
}

#[test]
fn lookups_are_deterministic() {
    let registry = two_entry_registry();
    let first = registry.compute_sg("test", "fairway", 175.0, "green", 22.0, false);
    for _ in 0..50 {
        let again = registry.compute_sg("test", "fairway", 175.0, "green", 22.0, false);
        assert_eq!(first.to_bits(), again.to_bits());
    }
}

#[test]
fn csv_skips_blanks_and_unknown_lies() {
    let table = BenchmarkTable::load_csv(&fixture_path("benchmark_small.csv"))
        .expect("fixture should load");
    assert_eq!(table.len(), 4);
    // the 40 row lands in the same band as the 0 row and wins
    assert_eq!(table.get(Location::Fairway, DistanceBucket::Under50), Some(2.6));
    assert_eq!(table.get(Location::Putt, DistanceBucket::Under50), Some(1.7));
    assert_eq!(table.get(Location::Tee, DistanceBucket::From100To150), Some(3.0));
    assert_eq!(table.get(Location::Putt, DistanceBucket::From100To150), None);
}

#[test]
fn registry_skips_missing_files() {
    let good = fixture_path("benchmark_small.csv");
    let missing = Path::new("/definitely/not/here.csv");
    let registry = BenchmarkRegistry::load_sources([
        ("small", Some("Small"), good.as_path()),
        ("gone", None, missing),
    ]);
    assert!(registry.contains("small"));
    assert!(!registry.contains("gone"));
    let ids: Vec<String> = registry.available().into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec!["small".to_string()]);
}

#[test]
fn recompute_fills_sg_and_leaves_input_alone() {
    let registry = two_entry_registry();
    let shots = vec![
        ShotRecord {
            round_id: "R1".to_string(),
            hole: 1,
            shot: 2,
            score: 4,
            starting_distance: Some(160.0),
            starting_location: "Fairway".to_string(),
            ending_distance: Some(10.0),
            ending_location: "Green".to_string(),
            ..Default::default()
        },
        ShotRecord {
            round_id: "R1".to_string(),
            hole: 1,
            shot: 3,
            score: 4,
            starting_distance: None,
            starting_location: "Green".to_string(),
            ending_distance: Some(f64::NAN),
            ending_location: "Hole".to_string(),
            ..Default::default()
        },
    ];
    let dataset = recompute_all(&registry, &shots, "test");
    assert_eq!(dataset.benchmark_id, "test");
    assert!((dataset.shots[0].strokes_gained - 0.5).abs() < 1e-12);
    assert_eq!(dataset.shots[0].shot_category, Some(ShotCategory::Approach));
    // missing and NaN distances are treated as 0
    assert!((dataset.shots[1].strokes_gained + 1.0).abs() < 1e-12);
    assert_eq!(dataset.shots[1].shot_category, Some(ShotCategory::Putting));
    assert_eq!(shots[0].strokes_gained, 0.0);
    assert_eq!(shots[0].shot_category, None);

    let again = recompute_all(&registry, &dataset.shots, "test");
    let bits = |rows: &[ShotRecord]| rows.iter().map(|s| s.strokes_gained.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&again.shots), bits(&dataset.shots));
}

#[test]
fn switching_benchmarks_recomputes_everything() {
    let shots = load_shots_json(&fixture_path("round_sample.json")).expect("fixture parses");
    let mut registry = two_entry_registry();
    registry.insert(
        "flat",
        None,
        BenchmarkTable::from_entries(
            DistanceBucket::ALL
                .into_iter()
                .flat_map(|b| {
                    [
                        Location::Tee,
                        Location::Fairway,
                        Location::Rough,
                        Location::Sand,
                        Location::Recovery,
                        Location::Putt,
                    ]
                    .into_iter()
                    .map(move |l| (l, b, 2.0))
                })
                .collect::<Vec<_>>(),
        ),
    );
    let flat = recompute_all(&registry, &shots, "flat");
    assert!(flat.shots.iter().all(|s| {
        let expected = if s.penalty { -2.0 } else { -1.0 };
        (s.strokes_gained - expected).abs() < 1e-12
    }));
    let test = recompute_all(&registry, &flat.shots, "test");
    assert_ne!(test.shots, flat.shots);
}
