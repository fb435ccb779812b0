//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod analysis;
mod tree;

pub use analysis::{Analysis, AnalysisReport, AnalysisService, SnapshotGraph};
pub use tree::{TreeReport, TreeService};
