//! Per-segment statistics, outcome probability tables
//! and the separation score of a segment assignment.

mod evaluator;
mod probability;
mod separation;
mod summary;


pub use evaluator::SegmentEvaluator;
pub use probability::{ProbabilityCell, ProbabilityTable, TableKind};
pub use separation::{OutcomeSeparation, SeparationScore};
pub use summary::{SegmentSummary, SummaryTable};
