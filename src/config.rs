use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::benchmark::BenchmarkRegistry;
use crate::confidence::ConfidenceSettings;
use crate::holes::{ParSource, ParThresholds};
use crate::root_cause::RootCauseSettings;

pub const CONFIG_ENV: &str = "FAIRWAY_CONFIG";
pub const BENCHMARK_ENV: &str = "FAIRWAY_BENCHMARK";
pub const RESAMPLES_ENV: &str = "FAIRWAY_BOOTSTRAP_RESAMPLES";
pub const CONFIDENCE_LEVEL_ENV: &str = "FAIRWAY_CONFIDENCE_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSource {
    pub file: PathBuf,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub benchmarks: BTreeMap<String, BenchmarkSource>,
    pub default_benchmark: String,
    pub confidence: ConfidenceSettings,
    pub par: ParThresholds,
    /// Optional course card, hole number to par.
    pub course_pars: BTreeMap<u32, u32>,
    pub root_cause: RootCauseSettings,
    /// Most recent rounds compared against the rest.
    pub recent_window: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        let mut benchmarks = BTreeMap::new();
        benchmarks.insert(
            "scratch".to_string(),
            BenchmarkSource {
                file: PathBuf::from("assets/benchmarks/scratch.csv"),
                display_name: Some("Scratch Golfer".to_string()),
            },
        );
        Self {
            benchmarks,
            default_benchmark: "scratch".to_string(),
            confidence: ConfidenceSettings::default(),
            par: ParThresholds::default(),
            course_pars: BTreeMap::new(),
            root_cause: RootCauseSettings::default(),
            recent_window: 5,
        }
    }
}

impl AnalyticsConfig {
    pub fn par_source(&self) -> ParSource {
        if self.course_pars.is_empty() {
            ParSource::Inferred(self.par)
        } else {
            ParSource::Course {
                pars: self.course_pars.clone(),
                fallback: self.par,
            }
        }
    }

    pub fn load_registry(&self) -> BenchmarkRegistry {
        BenchmarkRegistry::load_sources(self.benchmarks.iter().map(|(id, source)| {
            (
                id.as_str(),
                source.display_name.as_deref(),
                source.file.as_path(),
            )
        }))
    }

    /// Applies overrides from `lookup`; unparseable values are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(id) = lookup(BENCHMARK_ENV) {
            self.default_benchmark = id.trim().to_string();
        }
        if let Some(raw) = lookup(RESAMPLES_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.confidence.resamples = n,
                _ => log::warn!("ignoring {RESAMPLES_ENV}={raw}"),
            }
        }
        if let Some(raw) = lookup(CONFIDENCE_LEVEL_ENV) {
            match raw.trim().parse::<f64>() {
                Ok(level) if level > 0.0 && level < 1.0 => self.confidence.confidence = level,
                _ => log::warn!("ignoring {CONFIDENCE_LEVEL_ENV}={raw}"),
            }
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    fn resolve_paths(&mut self, base: &Path) {
        for source in self.benchmarks.values_mut() {
            if source.file.is_relative() {
                source.file = base.join(&source.file);
            }
        }
    }
}

/// Reads a JSON config. No path, or a path that does not exist, gives the
/// defaults; a file that exists but does not parse is an error. Relative
/// benchmark paths resolve against the config file's directory.
pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    let Some(path) = path else {
        return Ok(AnalyticsConfig::default());
    };
    if !path.exists() {
        log::warn!("config {} not found, using defaults", path.display());
        return Ok(AnalyticsConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let mut config: AnalyticsConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parse config {}", path.display()))?;
    if let Some(dir) = path.parent() {
        config.resolve_paths(dir);
    }
    Ok(config)
}

/// Loads `.env`, then the config named by `explicit` or `FAIRWAY_CONFIG`,
/// then environment overrides.
pub fn resolve_from_env(explicit: Option<&Path>) -> Result<AnalyticsConfig> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let from_env = env::var(CONFIG_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    let path = explicit.map(Path::to_path_buf).or(from_env);
    let mut config = load_config(path.as_deref())?;
    config.apply_env_overrides();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AnalyticsConfig =
            serde_json::from_str(r#"{"default_benchmark":"pga","confidence":{"resamples":500}}"#)
                .unwrap();
        assert_eq!(config.default_benchmark, "pga");
        assert_eq!(config.confidence.resamples, 500);
        assert_eq!(config.confidence.seed, 42);
        assert_eq!(config.recent_window, 5);
        assert!(config.benchmarks.contains_key("scratch"));
    }

    #[test]
    fn overrides_skip_bad_values() {
        let mut config = AnalyticsConfig::default();
        config.apply_overrides_from(|key| match key {
            BENCHMARK_ENV => Some("tour".to_string()),
            RESAMPLES_ENV => Some("lots".to_string()),
            CONFIDENCE_LEVEL_ENV => Some("0.9".to_string()),
            _ => None,
        });
        assert_eq!(config.default_benchmark, "tour");
        assert_eq!(config.confidence.resamples, 100);
        assert_eq!(config.confidence.confidence, 0.9);
    }

    #[test]
    fn course_pars_switch_par_source() {
        let mut config = AnalyticsConfig::default();
        assert!(matches!(config.par_source(), ParSource::Inferred(_)));
        config.course_pars.insert(1, 4);
        assert!(matches!(config.par_source(), ParSource::Course { .. }));
    }
}
