//! Result types shared by every check: severities, findings, metrics,
//! discovered services and threshold evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Message emitted when a requested item is absent from the current poll.
pub const ITEM_NOT_FOUND: &str = "Sorry - item not found";

/// Check verdict, ordered by how bad it is.
///
/// The ordering drives worst-severity aggregation: `Crit` outranks
/// `Unknown`, which outranks `Warn`. Process exit codes use the
/// conventional numbering instead, see [`Severity::exit_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warn,
    Unknown,
    Crit,
}

impl Severity {
    /// Conventional monitoring exit code: OK=0, WARN=1, CRIT=2, UNKNOWN=3.
    pub fn exit_code(&self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warn => 1,
            Severity::Crit => 2,
            Severity::Unknown => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Ok => "OK",
            Severity::Warn => "WARN",
            Severity::Crit => "CRIT",
            Severity::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

/// A (warn, crit) threshold pair.
///
/// Upper levels trigger at `value >= threshold`, lower levels at
/// `value < threshold`. Inverted pairs are not rejected; the crit bound is
/// always consulted first, so a `warn > crit` pair degrades gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Levels {
    pub warn: f64,
    pub crit: f64,
}

impl Levels {
    pub fn new(warn: f64, crit: f64) -> Self {
        Self { warn, crit }
    }

    /// Severity of `value` against this pair read as upper bounds.
    pub fn evaluate_upper(&self, value: f64) -> Severity {
        if value >= self.crit {
            Severity::Crit
        } else if value >= self.warn {
            Severity::Warn
        } else {
            Severity::Ok
        }
    }

    /// Severity of `value` against this pair read as lower bounds.
    pub fn evaluate_lower(&self, value: f64) -> Severity {
        if value < self.crit {
            Severity::Crit
        } else if value < self.warn {
            Severity::Warn
        } else {
            Severity::Ok
        }
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.warn, self.crit)
    }
}

/// One evaluated statement about a service: severity plus human text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Finding {
    pub fn new(severity: Severity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            details: None,
        }
    }

    pub fn ok(summary: impl Into<String>) -> Self {
        Self::new(Severity::Ok, summary)
    }

    /// Notice semantics: the text is promoted to the summary only when
    /// the severity is not OK, otherwise it lives in the details.
    pub fn notice(severity: Severity, text: impl Into<String>) -> Self {
        let text = text.into();
        if severity == Severity::Ok {
            Self {
                severity,
                summary: String::new(),
                details: Some(text),
            }
        } else {
            Self::new(severity, text)
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// A numeric time-series sample with optional levels and boundaries.
/// Boundaries are open-ended per side; BGP rates carry only a lower one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_boundary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_boundary: Option<f64>,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            levels: None,
            min_boundary: None,
            max_boundary: None,
        }
    }

    pub fn with_levels(mut self, levels: (f64, f64)) -> Self {
        self.levels = Some(levels);
        self
    }

    pub fn with_boundaries(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_boundary = min;
        self.max_boundary = max;
        self
    }
}

/// A key/value label attached to a discovered service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLabel {
    pub key: String,
    pub value: String,
}

impl ServiceLabel {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A monitorable entity produced by discovery.
///
/// Fabric-wide services (health score, fault tally, version skew) carry no
/// item; per-entity services carry the transformed display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<ServiceLabel>,
}

impl Service {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: Some(item.into()),
            labels: Vec::new(),
        }
    }

    pub fn unnamed() -> Self {
        Self {
            item: None,
            labels: Vec::new(),
        }
    }

    pub fn with_labels(mut self, labels: Vec<ServiceLabel>) -> Self {
        self.labels = labels;
        self
    }
}

/// Everything one check invocation yields for one service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckOutput {
    pub findings: Vec<Finding>,
    pub metrics: Vec<Metric>,
}

impl CheckOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed UNKNOWN response for an item missing from the poll.
    pub fn item_not_found() -> Self {
        let mut out = Self::new();
        out.add_finding(Finding::new(Severity::Unknown, ITEM_NOT_FOUND));
        out
    }

    pub fn add_finding(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn add_metric(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }

    /// Worst severity across all findings; OK when there are none.
    pub fn worst_severity(&self) -> Severity {
        self.findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty() && self.metrics.is_empty()
    }
}

/// Renders a value without trailing zeros: 99 -> "99", 65.5 -> "65.5".
pub fn render_plain(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Renders a per-minute rate with two decimals, e.g. "0.50/min".
pub fn render_per_minute(value: f64) -> String {
    format!("{:.2}/min", value)
}

/// Evaluates `value` against optional upper and lower levels and produces
/// the finding plus the metric in one step.
///
/// The summary is `"{label}: {value}"` with a breach annotation appended
/// when a level fires. The metric carries the upper pair when present,
/// otherwise the lower pair.
pub fn check_levels(
    value: f64,
    upper: Option<Levels>,
    lower: Option<Levels>,
    metric_name: &str,
    label: &str,
    boundaries: (Option<f64>, Option<f64>),
    render: fn(f64) -> String,
) -> (Finding, Metric) {
    let upper_severity = upper.map(|l| l.evaluate_upper(value)).unwrap_or(Severity::Ok);
    let lower_severity = lower.map(|l| l.evaluate_lower(value)).unwrap_or(Severity::Ok);
    let severity = upper_severity.max(lower_severity);

    let mut summary = format!("{}: {}", label, render(value));
    if let Some(levels) = upper {
        if upper_severity > Severity::Ok {
            summary.push_str(&format!(
                " (warn/crit at {}/{})",
                render(levels.warn),
                render(levels.crit)
            ));
        }
    }
    if let Some(levels) = lower {
        if lower_severity > Severity::Ok {
            summary.push_str(&format!(
                " (warn/crit below {}/{})",
                render(levels.warn),
                render(levels.crit)
            ));
        }
    }

    let mut metric = Metric::new(metric_name, value).with_boundaries(boundaries.0, boundaries.1);
    if let Some(levels) = upper.or(lower) {
        metric = metric.with_levels(levels.as_tuple());
    }

    (Finding::new(severity, summary), metric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering_puts_crit_worst() {
        assert!(Severity::Crit > Severity::Unknown);
        assert!(Severity::Unknown > Severity::Warn);
        assert!(Severity::Warn > Severity::Ok);
    }

    #[test]
    fn test_severity_exit_codes() {
        assert_eq!(Severity::Ok.exit_code(), 0);
        assert_eq!(Severity::Warn.exit_code(), 1);
        assert_eq!(Severity::Crit.exit_code(), 2);
        assert_eq!(Severity::Unknown.exit_code(), 3);
    }

    #[test]
    fn test_upper_levels_trigger_at_threshold() {
        let levels = Levels::new(1.0, 12.0);
        assert_eq!(levels.evaluate_upper(0.99), Severity::Ok);
        assert_eq!(levels.evaluate_upper(1.0), Severity::Warn);
        assert_eq!(levels.evaluate_upper(12.0), Severity::Crit);
        assert_eq!(levels.evaluate_upper(65.5), Severity::Crit);
    }

    #[test]
    fn test_lower_levels_trigger_strictly_below() {
        let levels = Levels::new(95.0, 85.0);
        assert_eq!(levels.evaluate_lower(95.0), Severity::Ok);
        assert_eq!(levels.evaluate_lower(94.0), Severity::Warn);
        assert_eq!(levels.evaluate_lower(85.0), Severity::Warn);
        assert_eq!(levels.evaluate_lower(84.0), Severity::Crit);
    }

    #[test]
    fn test_check_levels_ok_has_no_annotation() {
        let (finding, metric) = check_levels(
            99.0,
            None,
            Some(Levels::new(95.0, 85.0)),
            "health",
            "Fabric Health Score",
            (Some(0.0), Some(100.0)),
            render_plain,
        );
        assert_eq!(finding.severity, Severity::Ok);
        assert_eq!(finding.summary, "Fabric Health Score: 99");
        assert_eq!(metric.name, "health");
        assert_eq!(metric.levels, Some((95.0, 85.0)));
        assert_eq!(metric.min_boundary, Some(0.0));
        assert_eq!(metric.max_boundary, Some(100.0));
    }

    #[test]
    fn test_check_levels_lower_breach_annotates() {
        let (finding, _) = check_levels(
            90.0,
            None,
            Some(Levels::new(95.0, 85.0)),
            "health",
            "Health Score",
            (None, None),
            render_plain,
        );
        assert_eq!(finding.severity, Severity::Warn);
        assert_eq!(finding.summary, "Health Score: 90 (warn/crit below 95/85)");
    }

    #[test]
    fn test_check_levels_upper_breach_annotates() {
        let (finding, metric) = check_levels(
            7.25,
            Some(Levels::new(1.0, 6.0)),
            None,
            "bgp_conn_drop",
            "BGP connection drop value",
            (Some(0.0), None),
            render_per_minute,
        );
        assert_eq!(finding.severity, Severity::Crit);
        assert_eq!(
            finding.summary,
            "BGP connection drop value: 7.25/min (warn/crit at 1.00/min/6.00/min)"
        );
        assert_eq!(metric.levels, Some((1.0, 6.0)));
        assert_eq!(metric.min_boundary, Some(0.0));
        assert_eq!(metric.max_boundary, None);
    }

    #[test]
    fn test_notice_demotes_text_at_ok() {
        let finding = Finding::notice(Severity::Ok, "RX alert: none, RX status: none");
        assert!(finding.summary.is_empty());
        assert_eq!(
            finding.details.as_deref(),
            Some("RX alert: none, RX status: none")
        );

        let finding = Finding::notice(Severity::Warn, "RX alert: high, RX status: warn");
        assert_eq!(finding.summary, "RX alert: high, RX status: warn");
    }

    #[test]
    fn test_worst_severity_aggregation() {
        let mut out = CheckOutput::new();
        assert_eq!(out.worst_severity(), Severity::Ok);
        out.add_finding(Finding::ok("fine"));
        out.add_finding(Finding::new(Severity::Warn, "wobbly"));
        assert_eq!(out.worst_severity(), Severity::Warn);
        out.add_finding(Finding::new(Severity::Crit, "broken"));
        assert_eq!(out.worst_severity(), Severity::Crit);
    }

    #[test]
    fn test_item_not_found_is_unknown() {
        let out = CheckOutput::item_not_found();
        assert_eq!(out.worst_severity(), Severity::Unknown);
        assert_eq!(out.findings[0].summary, ITEM_NOT_FOUND);
    }

    #[test]
    fn test_render_plain_trims_integral_values() {
        assert_eq!(render_plain(99.0), "99");
        assert_eq!(render_plain(65.5), "65.5");
        assert_eq!(render_plain(-2.25), "-2.25");
    }
}
