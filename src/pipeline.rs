use crate::config::Config;
use crate::export::GraphExporter;
use crate::lineage::{GraphSimplifier, LineageGraphBuilder, ProvenanceGraph};
use crate::recorder::EventLogReader;
use crate::reports::BuildReport;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// End-to-end flow: event log -> lineage graph -> simplified graph -> file
pub struct LineagePipeline {
    config: Config,
}

impl LineagePipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Read the event log and build the full provenance graph
    pub fn build<P: AsRef<Path>>(&self, input: P) -> Result<(ProvenanceGraph, BuildReport)> {
        let input = input.as_ref();
        let records = EventLogReader::new(input)
            .read()
            .with_context(|| format!("Failed to load event log from {:?}", input))?;

        let (graph, diagnostics) = LineageGraphBuilder::new().build(&records);

        info!("Event counts: {:?}", diagnostics.event_tally());
        info!("Edge counts: {:?}", diagnostics.edge_tally());

        let report = BuildReport::new(input.display().to_string(), graph.statistics(), diagnostics);
        Ok((graph, report))
    }

    /// Build, simplify and export. Nothing is written if any step fails.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<BuildReport> {
        let output = output.as_ref();
        let (graph, report) = self.build(input)?;

        let simplified = GraphSimplifier::new(self.config.display.clone()).simplify(&graph);

        GraphExporter::new(&self.config.export)
            .export(&simplified, output)
            .with_context(|| format!("Failed to export lineage graph to {:?}", output))?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportFormat;
    use crate::types::EdgeKind;
    use std::fs;
    use tempfile::TempDir;

    const LOG: &str = r#"{"mutations": {
        "1": {"tree": "x", "cost": 1.0, "loss": 0.5, "events": [{"type": "mutate", "child": "2", "time": 3}]},
        "2": {"tree": "x+1", "cost": 2.0, "loss": 0.3, "parent": "1", "events": []}
    }}"#;

    #[test]
    fn test_run_writes_export() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("pysr_recorder.json");
        let output = temp_dir.path().join("pysr_graph.graphml");
        fs::write(&input, LOG).unwrap();

        let report = LineagePipeline::new(Config::default()).run(&input, &output).unwrap();

        assert_eq!(report.statistics.total_nodes, 2);
        assert_eq!(report.statistics.total_edges, 2);
        assert_eq!(report.diagnostics.edges_created(EdgeKind::Mutate), 1);
        assert!(fs::read_to_string(&output).unwrap().contains("<graphml"));
    }

    #[test]
    fn test_run_with_json_export() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("pysr_recorder.json");
        let output = temp_dir.path().join("pysr_graph.json");
        fs::write(&input, LOG).unwrap();

        let mut config = Config::default();
        config.export.format = ExportFormat::Json;
        LineagePipeline::new(config).run(&input, &output).unwrap();

        let document: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(document["links"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_input_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("pysr_recorder.json");
        let output = temp_dir.path().join("pysr_graph.graphml");
        fs::write(&input, r#"{"mutations": {"one": {}}}"#).unwrap();

        let err = LineagePipeline::new(Config::default()).run(&input, &output).unwrap_err();

        assert!(format!("{:#}", err).contains("\"one\""));
        assert!(!output.exists());
    }
}
