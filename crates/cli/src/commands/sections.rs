//! The `sections` subcommand: debug listing of the parsed agent output.

use aci_checks::section::AgentOutput;
use anyhow::Result;
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

/// Row for the sections table
#[derive(Tabled, serde::Serialize)]
struct SectionRow {
    #[tabled(rename = "Section")]
    name: String,
    #[tabled(rename = "Separator")]
    separator: String,
    #[tabled(rename = "Rows")]
    rows: usize,
}

pub fn run(raw: &str, format: OutputFormat) -> Result<()> {
    let output = AgentOutput::parse(raw)?;

    let rows: Vec<SectionRow> = output
        .sections()
        .iter()
        .map(|section| SectionRow {
            name: section.name.clone(),
            separator: match section.separator {
                Some(sep) => format!("sep({})", sep as u32),
                None => "whitespace".to_string(),
            },
            rows: section.rows.len(),
        })
        .collect();
    print_table(&rows, format);
    Ok(())
}
