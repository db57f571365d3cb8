//! Exports the segmenters, the evaluator and the data types.
//!
pub use crate::{
    Result,
    SegmentError,
    Warning,
};


pub use crate::sample::{
    // Reading ----------------------------------
    DatasetReader,
    MissingPolicy,
    TargetRule,


    // Records ----------------------------------
    Dataset,
    Record,
    Feature,
    FeatureKind,
    FeatureSpec,
    Value,


    // Numeric view -----------------------------
    Encoding,
    FeatureMatrix,
};


pub use crate::segment::{
    SegmentAssignment,
    SegmentId,
    SegmentMethod,
};


pub use crate::standardizer::Standardizer;


pub use crate::decision_tree::{
    // Supervised segmentation
    DecisionTreeBuilder,
    DecisionTreeSegmenter,
    Criterion,
    PruneRule,
    LeafRule,
};


pub use crate::kmeans::{
    // Unsupervised segmentation
    KMeans,
    KMeansFit,
    Init,
    ElbowCurve,
};


pub use crate::evaluation::{
    SegmentEvaluator,
    SummaryTable,
    ProbabilityTable,
    SeparationScore,
};


pub use crate::config::SegmentationConfig;
pub use crate::pipeline::{Segmentation, SegmentationReport};
