#![warn(missing_docs)]

//!
//! A crate that segments a population of records
//! into a few discrete groups in two independent ways,
//! and evaluates how well each partition separates the population.
//!
//! - Supervised segmentation
//!     A classification tree is grown on a binary target,
//!     pruned by cross-validated cost-complexity,
//!     and each leaf becomes a segment described by a conjunctive rule.
//!     See [`DecisionTreeBuilder`] and [`DecisionTreeSegmenter`].
//!
//!
//! - Unsupervised segmentation
//!     The standardized features are clustered by k-means,
//!     with an elbow curve over the number of clusters.
//!     See [`KMeans`] and [`ElbowCurve`].
//!
//!
//! Both assignments go through the same [`SegmentEvaluator`],
//! which produces per-segment summaries,
//! joint and conditional probability tables against the target,
//! and a separation score.
//! [`Segmentation`] wires the whole run from a [`SegmentationConfig`].

pub mod prelude;

pub mod config;
pub mod decision_tree;
pub mod evaluation;
pub mod kmeans;
pub mod pipeline;
pub mod report;
pub mod sample;
pub mod segment;
pub mod standardizer;

mod common;
mod error;
mod warning;


pub use error::{Result, SegmentError};
pub use warning::Warning;
pub use segment::{SegmentAssignment, SegmentId, SegmentMethod};


// Records and their numeric view.
pub use sample::{
    Column,
    Dataset,
    DatasetReader,
    Encoding,
    Feature,
    FeatureKind,
    FeatureMatrix,
    FeatureSpec,
    MissingPolicy,
    Record,
    TargetRule,
    Value,
};

pub use standardizer::{standardize, Standardizer};


// Segmenters.
pub use decision_tree::{
    CpRow,
    CpTable,
    Criterion,
    CrossValidation,
    DecisionTreeBuilder,
    DecisionTreeSegmenter,
    LeafRule,
    PruneRule,
};
pub use kmeans::{elbow_curve, ElbowCurve, ElbowPoint, Init, KMeans, KMeansFit};


// Evaluation and orchestration.
pub use evaluation::{
    ProbabilityTable,
    SegmentEvaluator,
    SeparationScore,
    SummaryTable,
    TableKind,
};
pub use config::SegmentationConfig;
pub use pipeline::{Segmentation, SegmentationReport};
