use std::path::Path;
use std::time::{Duration, Instant};

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::assets::TesterAssets;
use crate::scenario::{Scenario, ScenarioCtx};
use crate::storage::TesterStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub description: String,
    pub store: String,
    pub passed: bool,
    pub steps: Vec<String>,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

pub struct ScenarioRunner<'a> {
    assets: &'a TesterAssets,
    store_dir: Option<&'a Path>,
    verbose: bool,
}

impl<'a> ScenarioRunner<'a> {
    pub const fn new(assets: &'a TesterAssets, store_dir: Option<&'a Path>, verbose: bool) -> Self {
        Self {
            assets,
            store_dir,
            verbose,
        }
    }

    pub fn run(&self, scenario: &Scenario) -> ScenarioResult {
        if self.verbose {
            println!("🧪 Running scenario: {}", scenario.key.bright_white());
        }
        let start = Instant::now();
        let mut steps = Vec::new();
        let mut failures = Vec::new();
        let mut store_label = "memory";

        match TesterStore::fresh(self.store_dir, scenario.key) {
            Ok(store) => {
                store_label = store.label();
                match ScenarioCtx::new(self.assets, store, self.verbose) {
                    Ok(mut ctx) => {
                        let outcome = (scenario.run)(&mut ctx);
                        steps = ctx.into_steps();
                        if let Err(err) = outcome {
                            failures.push(format!("{err:#}"));
                        }
                    }
                    Err(err) => failures.push(format!("setup failed: {err:#}")),
                }
            }
            Err(err) => failures.push(format!("store unavailable: {err}")),
        }

        let duration = start.elapsed();
        let passed = failures.is_empty();
        if passed {
            log::info!("scenario '{}' passed in {duration:?}", scenario.key);
        } else {
            log::warn!("scenario '{}' failed: {}", scenario.key, failures.join("; "));
        }
        ScenarioResult {
            scenario_name: scenario.key.to_string(),
            description: scenario.description.to_string(),
            store: store_label.to_string(),
            passed,
            steps,
            failures,
            duration,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(millis.max(0.0) / 1000.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::get_scenario;
    use anyhow::bail;

    fn failing(_: &mut ScenarioCtx<'_>) -> anyhow::Result<()> {
        bail!("deliberate failure")
    }

    #[test]
    fn every_bundled_scenario_passes_in_memory() {
        let assets = TesterAssets::load(None, None).expect("bundled assets");
        let runner = ScenarioRunner::new(&assets, None, false);
        for scenario in crate::scenario::catalog::SCENARIOS {
            let result = runner.run(scenario);
            assert!(result.passed, "{}: {:?}", result.scenario_name, result.failures);
            assert_eq!(result.store, "memory");
        }
    }

    #[test]
    fn failures_are_captured_not_propagated() {
        let assets = TesterAssets::load(None, None).expect("bundled assets");
        let runner = ScenarioRunner::new(&assets, None, false);
        let scenario = Scenario {
            key: "always-fails",
            description: "fails",
            run: failing,
        };
        let result = runner.run(&scenario);
        assert!(!result.passed);
        assert_eq!(result.failures, vec!["deliberate failure".to_string()]);
    }

    #[test]
    fn persistence_scenario_passes_on_disk() {
        let dir = std::env::temp_dir().join(format!(
            "carmod-runner-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let assets = TesterAssets::load(None, None).expect("bundled assets");
        let runner = ScenarioRunner::new(&assets, Some(&dir), false);
        let scenario = get_scenario("persistence").expect("persistence scenario");
        let result = runner.run(scenario);
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.store, "file");
        assert!(dir.join("persistence.json").exists());
    }

    #[test]
    fn result_serializes_duration_as_millis() {
        let result = ScenarioResult {
            scenario_name: "smoke".to_string(),
            description: String::new(),
            store: "memory".to_string(),
            passed: true,
            steps: Vec::new(),
            failures: Vec::new(),
            duration: Duration::from_millis(12),
        };
        let value = serde_json::to_value(&result).expect("serialize");
        assert!((value["duration"].as_f64().unwrap_or_default() - 12.0).abs() < 1e-6);
    }
}
