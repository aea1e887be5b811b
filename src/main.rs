use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use fairway_sg::config;
use fairway_sg::confidence::stability_badge;
use fairway_sg::export::export_workbook;
use fairway_sg::memo::AnalysisCache;
use fairway_sg::report::{AnalysisReport, build_report_cached};
use fairway_sg::shots::load_shots_json;
use fairway_sg::tiger5::grit_interpretation;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let shots_path = args
        .first()
        .filter(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .ok_or_else(|| {
            anyhow!("usage: fairway_sg <shots.json> [--benchmark ID] [--config PATH] [--export PATH] [--cache PATH]")
        })?;

    let config_path = parse_path_arg(&args, "--config");
    let cfg = config::resolve_from_env(config_path.as_deref())?;
    let benchmark_id =
        parse_string_arg(&args, "--benchmark").unwrap_or_else(|| cfg.default_benchmark.clone());

    let registry = cfg.load_registry();
    for info in registry.available() {
        log::info!("benchmark {} ({}) entries={}", info.id, info.display_name, info.entries);
    }

    let shots = load_shots_json(&shots_path)?;
    log::info!("loaded {} shots from {}", shots.len(), shots_path.display());

    let mut cache = match parse_path_arg(&args, "--cache") {
        Some(path) => AnalysisCache::with_file(path),
        None => AnalysisCache::in_memory(),
    };
    let report = build_report_cached(&mut cache, &cfg, &registry, &shots, &benchmark_id)?;
    cache.save().context("save analysis cache")?;

    print_report(&report);

    if let Some(path) = parse_path_arg(&args, "--export") {
        let summary = export_workbook(&path, &report)?;
        log::info!(
            "exported {} holes, {} root causes, {} trend rounds to {}",
            summary.holes,
            summary.root_causes,
            summary.trend_rounds,
            path.display()
        );
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("Benchmark: {} ({})", report.benchmark_name, report.benchmark_id);
    println!(
        "Shots: {}  Holes: {}  Rounds: {}",
        report.shot_count,
        report.holes.len(),
        report.rounds.len()
    );

    let summary = &report.scoring.summary;
    println!(
        "Scoring avg {:.2}  eagles {}  birdies {}  pars {}  bogeys {}  doubles+ {}",
        summary.scoring_average,
        summary.eagles,
        summary.birdies,
        summary.pars,
        summary.bogeys,
        summary.doubles_or_worse
    );

    println!(
        "SG total {:+.2} over {} rounds ({:+.2} per round)",
        report.sg.total_sg, report.sg.rounds, report.sg.sg_per_round
    );
    for cat in report.sg.categories.iter().filter(|c| c.shots > 0) {
        println!(
            "  {:<11} {:>4} shots  SG {:+.2}  ({:+.2}/round)",
            cat.category.as_str(),
            cat.shots,
            cat.total_sg,
            cat.per_round
        );
    }

    let mental = &report.mental;
    println!(
        "Bounce back {:.0}% ({}/{})  Gas pedal {:.0}% ({}/{})  Bogey trains {}",
        mental.bounce_back.rate,
        mental.bounce_back.successes,
        mental.bounce_back.opportunities,
        mental.gas_pedal.rate,
        mental.gas_pedal.successes,
        mental.gas_pedal.opportunities,
        mental.bogey_train.trains
    );

    println!("Root causes:");
    for card in report.scoring.hero_cards.iter().filter(|c| c.count > 0) {
        println!(
            "  {:<16} {:>3}  SG {:+.2}  (DB+ {}, Bogey {}, Under {})",
            card.category.label(),
            card.count,
            card.total_sg,
            card.double_bogey_count,
            card.bogey_count,
            card.underperformance_count
        );
    }

    let grit = grit_interpretation(report.tiger5.grit_score);
    println!(
        "Tiger 5: {} fails / {} attempts, grit {:.1} ({})",
        report.tiger5.total_fails,
        report.tiger5.total_attempts,
        report.tiger5.grit_score,
        grit.message
    );
    for tally in &report.tiger5.rules {
        println!(
            "  {:<14} {:>3}/{:<3} {:.1}%",
            tally.rule.label(),
            tally.fails,
            tally.attempts,
            tally.fail_rate
        );
    }

    let ci = &report.round_sg;
    let badge = stability_badge(ci.stability, Some(ci.n));
    println!(
        "SG per round: {:+.2} [{:+.2}, {:+.2}] {} {}",
        ci.mean,
        ci.lower,
        ci.upper,
        badge.icon,
        badge.label
    );
    if let Some(cmp) = report.recent_vs_baseline.as_ref() {
        println!(
            "Recent vs baseline: {:+.2} (d={:.2}, {}) {}",
            cmp.delta,
            cmp.effect_size,
            cmp.confidence.as_str(),
            cmp.interpretation
        );
    }
}

fn parse_string_arg(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    parse_string_arg(args, flag).map(PathBuf::from)
}
