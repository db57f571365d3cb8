//! Struct `Dataset` represents the records to be segmented,
//! and struct `FeatureMatrix` the numeric view of them.

// Provides feature declarations and columns.
pub(crate) mod feature;
// Provides dataset struct.
pub(crate) mod dataset;
// Provides a struct that reads a file.
pub(crate) mod reader;
// Provides the numeric matrix view.
pub(crate) mod matrix;


pub use feature::{Column, Feature, FeatureKind, FeatureSpec, Value};
pub use dataset::{Dataset, Record};
pub use reader::{DatasetReader, MissingPolicy, TargetRule};
pub use matrix::{Encoding, FeatureMatrix};
