//! JSON configuration of a segmentation run.
//!
//! Every field is required.
//! The library builders carry defaults; a configuration file does not.
use serde::{Serialize, Deserialize};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Result, SegmentError};
use crate::decision_tree::{Criterion, DecisionTreeBuilder, PruneRule};
use crate::kmeans::{Init, KMeans};
use crate::sample::{
    DatasetReader,
    Encoding,
    FeatureSpec,
    MissingPolicy,
    TargetRule,
};


/// The target column and how it becomes binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Column name.
    pub column: String,
    /// Derivation rule.
    pub rule: TargetRule,
}


/// Parameters of the decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeConfig {
    /// See [`DecisionTreeBuilder::complexity_floor`].
    pub complexity_floor: f64,
    /// See [`DecisionTreeBuilder::min_split`].
    pub min_split: usize,
    /// See [`DecisionTreeBuilder::min_bucket`].
    pub min_bucket: usize,
    /// See [`DecisionTreeBuilder::max_depth`].
    pub max_depth: usize,
    /// See [`DecisionTreeBuilder::n_folds`].
    pub n_folds: usize,
    /// See [`DecisionTreeBuilder::criterion`].
    pub criterion: Criterion,
    /// See [`DecisionTreeBuilder::prune_rule`].
    pub prune_rule: PruneRule,
}


/// Parameters of k-means and of the elbow curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KMeansConfig {
    /// Number of clusters of the reported segmentation.
    pub k: usize,
    /// Largest `k` of the elbow curve.
    pub k_max: usize,
    /// See [`KMeans::max_iter`].
    pub max_iter: usize,
    /// See [`KMeans::tolerance`].
    pub tolerance: f64,
    /// See [`KMeans::n_init`].
    pub n_init: usize,
    /// See [`KMeans::init`].
    pub init: Init,
}


/// The configuration of a segmentation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentationConfig {
    /// The CSV file to read.
    pub input: PathBuf,
    /// The target.
    pub target: TargetConfig,
    /// The missing-value policy.
    pub missing: MissingPolicy,
    /// Every feature read from the file.
    pub schema: Vec<FeatureSpec>,
    /// Ordered predictors of the decision tree.
    pub predictors: Vec<String>,
    /// Features clustered by k-means and summarized by the evaluator.
    pub cluster_features: Vec<String>,
    /// Encoding of categorical cluster features.
    pub encoding: Encoding,
    /// Seed of the random generator threaded through the run.
    pub seed: u64,
    /// Decision tree parameters.
    pub tree: TreeConfig,
    /// K-means parameters.
    pub kmeans: KMeansConfig,
}


impl SegmentationConfig {
    /// Read and validate a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }


    /// Parse and validate a configuration.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }


    /// Check that the schema has no duplicate
    /// and that every referenced feature is declared.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for spec in &self.schema {
            if !seen.insert(spec.name.as_str()) {
                return Err(SegmentError::DuplicateFeature {
                    name: spec.name.clone(),
                });
            }
        }
        if self.predictors.is_empty() || self.cluster_features.is_empty() {
            return Err(SegmentError::InvalidParameter(
                "`predictors` and `cluster_features` must not be empty".into()
            ));
        }
        self.predictor_specs()?;
        self.cluster_specs()?;
        Ok(())
    }


    /// Returns the typed predictors, in order.
    pub fn predictor_specs(&self) -> Result<Vec<FeatureSpec>> {
        self.lookup(&self.predictors)
    }


    /// Returns the typed cluster features, in order.
    pub fn cluster_specs(&self) -> Result<Vec<FeatureSpec>> {
        self.lookup(&self.cluster_features)
    }


    fn lookup(&self, names: &[String]) -> Result<Vec<FeatureSpec>> {
        names.iter()
            .map(|name| {
                self.schema.iter()
                    .find(|spec| &spec.name == name)
                    .cloned()
                    .ok_or_else(|| SegmentError::MissingColumn {
                        name: name.clone(),
                    })
            })
            .collect()
    }


    /// Returns a reader of [`Self::input`] under this schema.
    pub fn reader(&self) -> DatasetReader<PathBuf> {
        DatasetReader::new()
            .file(self.input.clone())
            .has_header(true)
            .target(&self.target.column, self.target.rule.clone())
            .schema(self.schema.clone())
            .missing(self.missing.clone())
    }


    /// Returns the tree builder of this configuration.
    pub fn tree_builder(&self) -> Result<DecisionTreeBuilder> {
        let tree = &self.tree;
        let builder = DecisionTreeBuilder::new(self.predictor_specs()?)
            .complexity_floor(tree.complexity_floor)
            .min_split(tree.min_split)
            .min_bucket(tree.min_bucket)
            .max_depth(tree.max_depth)
            .n_folds(tree.n_folds)
            .criterion(tree.criterion)
            .prune_rule(tree.prune_rule);
        Ok(builder)
    }


    /// Returns the k-means parameters of this configuration.
    pub fn kmeans(&self) -> KMeans {
        let kmeans = &self.kmeans;
        KMeans::new(kmeans.k)
            .max_iter(kmeans.max_iter)
            .tolerance(kmeans.tolerance)
            .n_init(kmeans.n_init)
            .init(kmeans.init)
    }
}
