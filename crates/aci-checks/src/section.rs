//! Recorded agent output framing.
//!
//! Agent output is a stream of `<<<section_name>>>` blocks. A header may
//! declare a single-character field separator as a decimal code point,
//! `<<<aci_tenants:sep(124)>>>`; sections without one split their lines on
//! runs of whitespace.

use crate::error::{ParseError, ParseResult};

/// One parsed section: its name, declared separator and field rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub separator: Option<char>,
    pub rows: Vec<Vec<String>>,
}

impl Section {
    fn new(name: String, separator: Option<char>) -> Self {
        Self {
            name,
            separator,
            rows: Vec::new(),
        }
    }

    /// Rows excluding `#`-prefixed header/comment lines.
    pub fn data_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows
            .iter()
            .filter(|row| !row.first().map(|f| f.starts_with('#')).unwrap_or(false))
            .map(|row| row.as_slice())
    }

    fn push_line(&mut self, line: &str) {
        let fields: Vec<String> = match self.separator {
            Some(sep) => line.split(sep).map(str::to_string).collect(),
            None => line.split_whitespace().map(str::to_string).collect(),
        };
        if !fields.is_empty() {
            self.rows.push(fields);
        }
    }
}

/// The full parsed agent output, sections in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOutput {
    sections: Vec<Section>,
}

impl AgentOutput {
    /// Parses raw agent output. Content before the first header is
    /// ignored; a malformed header aborts parsing.
    pub fn parse(raw: &str) -> ParseResult<Self> {
        let mut output = AgentOutput::default();

        for line in raw.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with("<<<") && line.ends_with(">>>") {
                let (name, separator) = parse_header(line)?;
                output.sections.push(Section::new(name, separator));
                continue;
            }
            match output.sections.last_mut() {
                Some(section) => section.push_line(line),
                None => {
                    tracing::debug!(line, "ignoring content before first section header");
                }
            }
        }

        Ok(output)
    }

    /// The first section with the given name, if present.
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

fn parse_header(line: &str) -> ParseResult<(String, Option<char>)> {
    let inner = &line[3..line.len() - 3];
    let (name, option) = match inner.split_once(':') {
        Some((name, option)) => (name, Some(option)),
        None => (inner, None),
    };

    let valid_name =
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_name {
        return Err(ParseError::Header {
            header: line.to_string(),
        });
    }

    let separator = match option {
        None => None,
        Some(option) => {
            let code = option
                .strip_prefix("sep(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|digits| digits.parse::<u32>().ok())
                .ok_or_else(|| ParseError::Header {
                    header: line.to_string(),
                })?;
            let sep = char::from_u32(code).ok_or_else(|| ParseError::Separator {
                section: name.to_string(),
                code,
            })?;
            Some(sep)
        }
    };

    Ok((name.to_string(), separator))
}
