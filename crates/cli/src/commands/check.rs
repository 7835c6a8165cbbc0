//! The `check` subcommand: run every check and report per-service
//! results, persisting rate state between invocations.

use std::path::Path;

use aci_checks::checks::RuleSet;
use aci_checks::report::Severity;
use aci_checks::section::AgentOutput;
use aci_checks::store::FileValueStore;
use anyhow::{Context, Result};
use chrono::Utc;
use tabled::Tabled;

use crate::output::{color_severity, print_table, print_warning, OutputFormat};
use crate::runner::{self, PollOutcome, ServiceResult};

/// Row for the check-results table
#[derive(Tabled, serde::Serialize)]
struct ResultRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Metrics")]
    metrics: String,
}

pub fn run(
    raw: &str,
    rules: &RuleSet,
    state_path: &Path,
    service_filter: Option<&str>,
    details: bool,
    format: OutputFormat,
) -> Result<Severity> {
    let output = AgentOutput::parse(raw)?;
    let mut store = FileValueStore::load(state_path)
        .with_context(|| format!("failed to load state file {}", state_path.display()))?;

    let now = Utc::now().timestamp() as f64;
    let mut outcome = runner::check_all(&output, rules, &mut store, now);

    store
        .save()
        .with_context(|| format!("failed to save state file {}", state_path.display()))?;

    if let Some(name) = service_filter {
        outcome.results.retain(|result| result.name() == name);
    }

    render(&outcome, details, format);
    Ok(outcome.worst_severity())
}

fn render(outcome: &PollOutcome, details: bool, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            // Failures are already on stderr via the runner's logging.
            if let Ok(json) = serde_json::to_string_pretty(&outcome.results) {
                println!("{}", json);
            }
        }
        OutputFormat::Table => {
            for failure in &outcome.failures {
                print_warning(&format!("section {}: {}", failure.section, failure.error));
            }
            let rows: Vec<ResultRow> = outcome.results.iter().map(result_row).collect();
            print_table(&rows, format);
            if details {
                print_details(&outcome.results);
            }
            println!(
                "\nWorst severity: {}",
                color_severity(outcome.worst_severity())
            );
        }
    }
}

fn result_row(result: &ServiceResult) -> ResultRow {
    let summary = result
        .output
        .findings
        .iter()
        .map(|f| f.summary.as_str())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let metrics = result
        .output
        .metrics
        .iter()
        .map(|m| format!("{}={}", m.name, m.value))
        .collect::<Vec<_>>()
        .join(" ");
    ResultRow {
        service: result.name(),
        state: color_severity(result.output.worst_severity()),
        summary,
        metrics,
    }
}

fn print_details(results: &[ServiceResult]) {
    for result in results {
        let details: Vec<&str> = result
            .output
            .findings
            .iter()
            .filter_map(|f| f.details.as_deref())
            .collect();
        if details.is_empty() {
            continue;
        }
        println!("\n{}:", result.name());
        for block in details {
            for line in block.lines() {
                println!("  {}", line);
            }
        }
    }
}
