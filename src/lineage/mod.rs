pub mod builder;
pub mod diagnostics;
pub mod graph;
pub mod simplify;

pub use builder::{LineageEdge, LineageGraphBuilder, ProvenanceGraph};
pub use diagnostics::DiagnosticsCounter;
pub use graph::{GraphStatistics, LineageGraph, TypedEdge};
pub use simplify::{DisplayEdge, DisplayNode, GraphSimplifier, SimplifiedGraph};
