//! Aggregation and statistics over club datasets.

pub mod aggregator;
pub mod stats;

pub use aggregator::{club_totals, merge, most_valuable, CombinedDataset};
pub use stats::{distribution, regress, summarize};
