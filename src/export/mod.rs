pub mod formatters;
pub mod writer;

pub use formatters::{GraphFormatter, GraphMlFormatter, NodeLinkFormatter};
pub use writer::{write_atomic, GraphExporter};
