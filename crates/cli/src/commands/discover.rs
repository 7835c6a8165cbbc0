//! The `discover` subcommand: list the services discovery would create.

use aci_checks::checks::RuleSet;
use aci_checks::section::AgentOutput;
use anyhow::Result;
use tabled::Tabled;

use crate::output::{print_table, print_warning, OutputFormat};
use crate::runner;

/// Row for the discovered-services table
#[derive(Tabled, serde::Serialize)]
struct ServiceRow {
    #[tabled(rename = "Check")]
    check: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Labels")]
    labels: String,
}

pub fn run(raw: &str, rules: &RuleSet, format: OutputFormat) -> Result<()> {
    let output = AgentOutput::parse(raw)?;
    let (services, failures) = runner::discover_all(&output, rules);

    if matches!(format, OutputFormat::Table) {
        for failure in &failures {
            print_warning(&format!("section {}: {}", failure.section, failure.error));
        }
    }

    let rows: Vec<ServiceRow> = services
        .iter()
        .map(|discovered| ServiceRow {
            check: discovered.check.section_name().to_string(),
            service: discovered.name(),
            labels: discovered
                .service
                .labels
                .iter()
                .map(|l| format!("{}={}", l.key, l.value))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    print_table(&rows, format);

    if matches!(format, OutputFormat::Table) {
        println!("\nTotal: {} services", services.len());
    }
    Ok(())
}
