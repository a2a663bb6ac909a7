use crate::config::{ExportFormat, ExportSettings};
use crate::error::{LineageError, Result};
use crate::export::formatters::{GraphFormatter, GraphMlFormatter, NodeLinkFormatter};
use crate::lineage::simplify::SimplifiedGraph;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Writes a simplified graph to disk in the configured format
pub struct GraphExporter {
    formatter: Box<dyn GraphFormatter>,
}

impl GraphExporter {
    pub fn new(settings: &ExportSettings) -> Self {
        let formatter: Box<dyn GraphFormatter> = match settings.format {
            ExportFormat::Graphml => Box::new(GraphMlFormatter),
            ExportFormat::Json => Box::new(NodeLinkFormatter {
                pretty: settings.pretty,
            }),
        };
        Self { formatter }
    }

    pub fn extension(&self) -> &'static str {
        self.formatter.extension()
    }

    /// Serialize fully in memory, then publish atomically
    pub fn export<P: AsRef<Path>>(&self, graph: &SimplifiedGraph, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.formatter.format(graph)?;

        write_atomic(path, content.as_bytes())?;

        info!(
            "Exported {} nodes and {} edges to {:?}",
            graph.node_count(),
            graph.edge_count(),
            path
        );
        Ok(())
    }
}

/// Write to a temporary file next to `path` and rename it into place.
/// On failure the temporary file is removed and `path` is left untouched.
///
/// The published file gets the same permissions a plain `fs::write` would
/// give it: those of the file being replaced, or the process umask default.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".evo-lineage")
        .make_in(dir, |tmp_path| {
            OpenOptions::new().write(true).create_new(true).open(tmp_path)
        })
        .map_err(|e| {
            LineageError::Export(format!("cannot create temporary file in {:?}: {}", dir, e))
        })?;
    debug!("Writing export to temporary file {:?}", tmp.path());

    if let Ok(existing) = fs::metadata(path) {
        if existing.is_file() {
            fs::set_permissions(tmp.path(), existing.permissions()).map_err(|e| {
                LineageError::Export(format!("cannot copy permissions of {:?}: {}", path, e))
            })?;
        }
    }

    tmp.write_all(contents)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| LineageError::Export(format!("cannot write {:?}: {}", tmp.path(), e)))?;

    tmp.persist(path)
        .map_err(|e| LineageError::Export(format!("cannot publish {:?}: {}", path, e.error)))?;

    Ok(())
}
