use crate::config::ReportFormat;
use crate::lineage::diagnostics::DiagnosticsCounter;
use crate::lineage::graph::GraphStatistics;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{Display, Write};

/// Summary of one build, for humans and for post-hoc sanity checks
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub source: String,
    pub statistics: GraphStatistics,
    pub diagnostics: DiagnosticsCounter,
    pub generated_at: DateTime<Utc>,
}

impl BuildReport {
    pub fn new(source: impl Into<String>, statistics: GraphStatistics, diagnostics: DiagnosticsCounter) -> Self {
        Self {
            source: source.into(),
            statistics,
            diagnostics,
            generated_at: Utc::now(),
        }
    }
}

/// Report generator for creating various output formats
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate report in the specified format
    pub fn generate(&self, report: &BuildReport, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => self.generate_json(report),
            ReportFormat::Markdown => Ok(self.generate_markdown(report)),
            ReportFormat::Text => Ok(self.generate_text(report)),
        }
    }

    fn generate_json(&self, report: &BuildReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    fn generate_markdown(&self, report: &BuildReport) -> String {
        let stats = &report.statistics;
        format!(
            r#"# Lineage Graph Report

**Source**: {}

## Graph
- **Nodes**: {}
- **Edges**: {}
- **Roots**: {}
- **Leaves**: {}

## Events Seen
{}

## Edges Created
{}

---
*Generated at: {}*
"#,
            report.source,
            stats.total_nodes,
            stats.total_edges,
            stats.root_nodes,
            stats.leaf_nodes,
            tally_lines(report.diagnostics.event_tally(), "- **", "**: "),
            tally_lines(report.diagnostics.edge_tally(), "- **", "**: "),
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }

    fn generate_text(&self, report: &BuildReport) -> String {
        let stats = &report.statistics;
        format!(
            r#"Lineage Graph Report
====================

Source: {}
Loaded graph with {} nodes and {} edges
Roots: {}, Leaves: {}

Event counts:
{}
Edge counts:
{}
Generated at: {}
"#,
            report.source,
            stats.total_nodes,
            stats.total_edges,
            stats.root_nodes,
            stats.leaf_nodes,
            tally_lines(report.diagnostics.event_tally(), "  ", ": "),
            tally_lines(report.diagnostics.edge_tally(), "  ", ": "),
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn tally_lines<'a, K: Display + 'a>(
    tally: impl IntoIterator<Item = (&'a K, &'a usize)>,
    prefix: &str,
    separator: &str,
) -> String {
    let mut lines = String::new();
    for (kind, count) in tally {
        let _ = writeln!(lines, "{}{}{}{}", prefix, kind, separator, count);
    }
    lines
}
