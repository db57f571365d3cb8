//! Wires a [`Dataset`] through the standardizer,
//! both segmenters and the evaluator.
use colored::Colorize;
use polars::prelude::*;
use rand::prelude::*;
use tracing::{debug, info};

use crate::{Dataset, FeatureMatrix, Result, Standardizer, Warning};
use crate::config::SegmentationConfig;
use crate::decision_tree::DecisionTreeSegmenter;
use crate::evaluation::*;
use crate::kmeans::{ElbowCurve, KMeansFit};
use crate::segment::{SegmentAssignment, SegmentMethod};


/// Every statistic of one segment assignment.
#[derive(Debug, Clone)]
pub struct MethodEvaluation {
    /// Per-segment statistics on the raw scale.
    pub summary: SummaryTable,
    /// Per-segment statistics on the standardized scale.
    pub scaled_summary: SummaryTable,
    /// `count / population`.
    pub joint: ProbabilityTable,
    /// `count / segment size`.
    pub conditional: ProbabilityTable,
    /// Separation of the raw-scale segment means.
    pub separation: SeparationScore,
    /// Separation within each target class.
    pub separation_by_outcome: Vec<OutcomeSeparation>,
}


impl MethodEvaluation {
    fn new(
        evaluator: &SegmentEvaluator<'_>,
        scaled: &FeatureMatrix,
        assignment: &SegmentAssignment,
    ) -> Result<Self>
    {
        let exclude: &[&str] = &[];
        let summary = evaluator.summary(assignment)?;
        let scaled_summary = evaluator.summary_of(scaled, assignment)?;
        let joint = evaluator.joint_probabilities(assignment)?;
        let conditional = evaluator.conditional_probabilities(assignment)?;
        let separation = evaluator.separation_score(&summary, exclude);
        let separation_by_outcome = evaluator
            .separation_by_outcome(assignment, exclude)?;

        Ok(Self {
            summary,
            scaled_summary,
            joint,
            conditional,
            separation,
            separation_by_outcome,
        })
    }
}


/// The complete output of a segmentation run.
#[derive(Debug, Clone)]
pub struct SegmentationReport {
    /// Number of records.
    pub n_records: usize,
    /// Number of records with a positive target.
    pub n_positive: usize,
    /// Fitted scaling of the cluster features.
    pub standardizer: Standardizer,
    /// Raw cluster-feature matrix.
    pub raw: FeatureMatrix,
    /// Standardized cluster-feature matrix.
    pub scaled: FeatureMatrix,
    /// The pruned tree.
    pub tree: DecisionTreeSegmenter,
    /// Leaf of each record.
    pub tree_assignment: SegmentAssignment,
    /// The k-means fit.
    pub kmeans: KMeansFit,
    /// The k-means objective for `k = 1..=k_max`.
    pub elbow: ElbowCurve,
    /// Statistics of the tree segments.
    pub tree_evaluation: MethodEvaluation,
    /// Statistics of the clusters.
    pub cluster_evaluation: MethodEvaluation,
    /// Records with both segment columns, raw values.
    pub annotated_raw: DataFrame,
    /// Target, standardized cluster features and both segment columns.
    pub annotated_scaled: DataFrame,
    /// Every recoverable condition met during the run.
    pub warnings: Vec<Warning>,
}


/// The orchestrator of a segmentation run.
///
/// # Example
/// ```no_run
/// use miniseg::prelude::*;
///
/// # fn run() -> miniseg::Result<()> {
/// let config = SegmentationConfig::from_file("config.json")?;
/// let dataset = config.reader().read()?;
/// let report = Segmentation::new(config).run(&dataset)?;
/// report.write("out")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Segmentation {
    config: SegmentationConfig,
    verbose: bool,
}


impl Segmentation {
    /// Construct a new run from a validated configuration.
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config, verbose: false }
    }


    /// Print the progress of the run.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }


    /// Run both segmentations on `dataset` and evaluate them.
    ///
    /// A single `StdRng` seeded by the configuration
    /// first shuffles the tree's folds and then seeds k-means.
    /// The elbow curve reseeds each `k` from the same seed.
    pub fn run(&self, dataset: &Dataset) -> Result<SegmentationReport> {
        let config = &self.config;
        let (n_records, _) = dataset.shape();
        info!("segmenting {n_records} records");


        let raw = FeatureMatrix::from_dataset(
            dataset, &config.cluster_specs()?, config.encoding
        )?;
        let standardizer = Standardizer::fit(&raw);
        let scaled = standardizer.transform(&raw)?;
        debug!("standardized {} cluster columns", scaled.n_cols());


        let mut rng = StdRng::seed_from_u64(config.seed);

        self.stage("Growing the decision tree");
        let tree = config.tree_builder()?
            .verbose(self.verbose)
            .fit(dataset, &mut rng)?;
        let tree_assignment = tree.assign_all(dataset)?;
        info!("decision tree: {} segments", tree.n_segments());


        self.stage("Clustering with k-means");
        let kmeans = config.kmeans().fit(&scaled, &mut rng)?;
        let k_max = config.kmeans.k_max.min(n_records);
        let elbow = config.kmeans().elbow_curve(&scaled, k_max, config.seed)?;
        info!(
            "k-means: k = {}, total within SS = {:.4}",
            kmeans.k(), kmeans.total_within_ss(),
        );


        self.stage("Evaluating segments");
        let evaluator = SegmentEvaluator::new(dataset, &raw)?;
        let tree_evaluation = MethodEvaluation::new(
            &evaluator, &scaled, &tree_assignment
        )?;
        let cluster_evaluation = MethodEvaluation::new(
            &evaluator, &scaled, kmeans.assignment()
        )?;


        let segments = [&tree_assignment, kmeans.assignment()];
        let annotated_raw = annotate(dataset.to_dataframe()?, &segments)?;

        let mut columns = vec![
            Series::new(dataset.target_name(), dataset.target()),
        ];
        columns.extend(scaled.to_series());
        let annotated_scaled = annotate(DataFrame::new(columns)?, &segments)?;


        let warnings = kmeans.warnings()
            .iter()
            .chain(elbow.warnings())
            .cloned()
            .collect::<Vec<_>>();

        Ok(SegmentationReport {
            n_records,
            n_positive: dataset.n_positive(),
            standardizer,
            raw,
            scaled,
            tree,
            tree_assignment,
            kmeans,
            elbow,
            tree_evaluation,
            cluster_evaluation,
            annotated_raw,
            annotated_scaled,
            warnings,
        })
    }


    fn stage(&self, name: &str) {
        if self.verbose {
            println!("{}", format!("[{name}]").bold().cyan());
        }
    }
}


/// Append one segment column per assignment.
fn annotate(mut df: DataFrame, segments: &[&SegmentAssignment])
    -> Result<DataFrame>
{
    for assignment in segments {
        let name = assignment.method().column_name();
        let ids = assignment.ids()
            .iter()
            .map(|id| id.0 as u64)
            .collect::<Vec<_>>();
        df.with_column(Series::new(name, ids))?;
    }
    Ok(df)
}


impl SegmentationReport {
    /// Returns the evaluation of `method`.
    pub fn evaluation(&self, method: SegmentMethod) -> &MethodEvaluation {
        match method {
            SegmentMethod::Tree => &self.tree_evaluation,
            SegmentMethod::Cluster => &self.cluster_evaluation,
        }
    }
}
