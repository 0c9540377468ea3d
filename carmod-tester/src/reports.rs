use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;

use crate::runner::ScenarioResult;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    total: usize,
    passed: usize,
    failed: usize,
    results: &'a [ScenarioResult],
}

fn tally(results: &[ScenarioResult]) -> (usize, usize, usize) {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    (total, passed, total - passed)
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (passed as f64 / total as f64) * 100.0
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    let (total, passed, failed) = tally(results);
    writeln!(out)?;
    writeln!(out, "{}", "📊 Customization Test Results".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;
    writeln!(out, "Total scenarios: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", failed.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(passed, total))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, result.scenario_name.bold())?;
        writeln!(out, "   {}", result.description)?;
        writeln!(out, "   Store: {}  Time: {:?}", result.store, result.duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let (total, passed, failed) = tally(results);
    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        total,
        passed,
        failed,
        results,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let (total, passed, failed) = tally(results);
    writeln!(out, "# Carmod Customization Test Results\n")?;
    writeln!(
        out,
        "_Generated {}_\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {failed}")?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(passed, total))?;
    writeln!(out, "## Detailed Results\n")?;

    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {}\n", status, result.scenario_name)?;
        writeln!(out, "{}\n", result.description)?;
        writeln!(out, "- **Store**: {}", result.store)?;
        writeln!(out, "- **Time**: {:?}", result.duration)?;
        if !result.steps.is_empty() {
            writeln!(out, "- **Steps**:")?;
            for step in &result.steps {
                writeln!(out, "  - {step}")?;
            }
        }
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<ScenarioResult> {
        vec![
            ScenarioResult {
                scenario_name: "smoke".to_string(),
                description: "Assemble the garage".to_string(),
                store: "memory".to_string(),
                passed: true,
                steps: vec!["assembled 3 vehicle(s)".to_string()],
                failures: Vec::new(),
                duration: Duration::from_millis(3),
            },
            ScenarioResult {
                scenario_name: "level-cap".to_string(),
                description: "Brake upgrades stop at level 5".to_string(),
                store: "file".to_string(),
                passed: false,
                steps: Vec::new(),
                failures: vec!["brake level overflowed to 6".to_string()],
                duration: Duration::from_millis(5),
            },
        ]
    }

    #[test]
    fn json_report_counts_results() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &results()).expect("json");
        let value: serde_json::Value = serde_json::from_slice(&buffer).expect("valid json");
        assert_eq!(value["total"], 2);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["results"][1]["scenario_name"], "level-cap");
    }

    #[test]
    fn markdown_report_lists_failures() {
        let mut buffer = Vec::new();
        generate_markdown_report(&mut buffer, &results()).expect("markdown");
        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.contains("# Carmod Customization Test Results"));
        assert!(text.contains("- **Success rate**: 50.0%"));
        assert!(text.contains("  - brake level overflowed to 6"));
    }

    #[test]
    fn console_report_names_each_scenario() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        generate_console_report(&mut buffer, &results(), Duration::from_millis(8))
            .expect("console");
        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.contains("✅ PASS smoke"));
        assert!(text.contains("❌ FAIL level-cap"));
    }

    #[test]
    fn success_rate_of_nothing_is_zero() {
        assert!(success_rate(0, 0).abs() < f64::EPSILON);
    }
}
