pub mod generator;

pub use generator::{BuildReport, ReportGenerator};
