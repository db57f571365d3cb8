//! Writes a [`SegmentationReport`] as CSV tables and `report.json`.
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::{Result, Warning};
use crate::decision_tree::{CpRow, FeatureImportance};
use crate::evaluation::{OutcomeSeparation, SeparationScore};
use crate::pipeline::{MethodEvaluation, SegmentationReport};
use crate::segment::{SegmentAssignment, SegmentMethod};


#[derive(Serialize)]
struct MethodJson<'a> {
    method: SegmentMethod,
    n_segments: usize,
    sizes: Vec<usize>,
    separation: &'a SeparationScore,
    separation_by_outcome: &'a [OutcomeSeparation],
}


impl<'a> MethodJson<'a> {
    fn new(
        evaluation: &'a MethodEvaluation,
        assignment: &SegmentAssignment,
    ) -> Self
    {
        Self {
            method: assignment.method(),
            n_segments: assignment.n_segments(),
            sizes: assignment.sizes(),
            separation: &evaluation.separation,
            separation_by_outcome: &evaluation.separation_by_outcome,
        }
    }
}


#[derive(Serialize)]
struct TreeJson<'a> {
    #[serde(flatten)]
    segments: MethodJson<'a>,
    selected: &'a CpRow,
    importance: &'a [FeatureImportance],
}


#[derive(Serialize)]
struct ClusterJson<'a> {
    #[serde(flatten)]
    segments: MethodJson<'a>,
    total_within_ss: f64,
    between_ss: f64,
    total_ss: f64,
    n_iter: usize,
    converged: bool,
}


#[derive(Serialize)]
struct ReportJson<'a> {
    n_records: usize,
    n_positive: usize,
    tree: TreeJson<'a>,
    cluster: ClusterJson<'a>,
    warnings: &'a [Warning],
}


impl SegmentationReport {
    /// Write every table into `dir`, creating it if needed.
    /// Returns the written paths.
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut tables = vec![
            ("records_raw", self.annotated_raw.clone()),
            ("records_scaled", self.annotated_scaled.clone()),
            ("elbow", self.elbow_dataframe()?),
            ("cp_table", self.cp_dataframe()?),
            ("leaf_rules", self.rules_dataframe()?),
            ("feature_importance", self.importance_dataframe()?),
            ("centroids", self.centroids_dataframe()?),
        ]
        .into_iter()
        .map(|(name, df)| (name.to_string(), df))
        .collect::<Vec<_>>();

        for (prefix, method) in [
            ("tree", SegmentMethod::Tree),
            ("cluster", SegmentMethod::Cluster),
        ] {
            let evaluation = self.evaluation(method);
            tables.push((
                format!("{prefix}_summary"),
                evaluation.summary.to_dataframe()?,
            ));
            tables.push((
                format!("{prefix}_joint"),
                evaluation.joint.to_dataframe()?,
            ));
            tables.push((
                format!("{prefix}_conditional"),
                evaluation.conditional.to_dataframe()?,
            ));
        }


        let mut written = Vec::with_capacity(tables.len() + 1);
        for (name, mut df) in tables {
            let path = dir.join(format!("{name}.csv"));
            let mut file = File::create(&path)?;
            CsvWriter::new(&mut file).finish(&mut df)?;
            debug!("wrote {}", path.display());
            written.push(path);
        }


        let path = dir.join("report.json");
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, &self.json())?;
        debug!("wrote {}", path.display());
        written.push(path);

        Ok(written)
    }


    fn json(&self) -> ReportJson<'_> {
        ReportJson {
            n_records: self.n_records,
            n_positive: self.n_positive,
            tree: TreeJson {
                segments: MethodJson::new(
                    &self.tree_evaluation, &self.tree_assignment
                ),
                selected: self.tree.cp_table().selected(),
                importance: self.tree.importance(),
            },
            cluster: ClusterJson {
                segments: MethodJson::new(
                    &self.cluster_evaluation, self.kmeans.assignment()
                ),
                total_within_ss: self.kmeans.total_within_ss(),
                between_ss: self.kmeans.between_ss(),
                total_ss: self.kmeans.total_ss(),
                n_iter: self.kmeans.n_iter(),
                converged: self.kmeans.converged(),
            },
            warnings: &self.warnings,
        }
    }


    fn elbow_dataframe(&self) -> Result<DataFrame> {
        let points = self.elbow.points();
        let k = points.iter().map(|p| p.k as u64).collect::<Vec<_>>();
        let wss = points.iter()
            .map(|p| p.total_within_ss)
            .collect::<Vec<_>>();
        let df = DataFrame::new(vec![
            Series::new("k", k),
            Series::new("total_within_ss", wss),
        ])?;
        Ok(df)
    }


    fn cp_dataframe(&self) -> Result<DataFrame> {
        let table = self.tree.cp_table();
        let rows = table.rows();
        let column = |f: fn(&CpRow) -> f64| {
            rows.iter().map(f).collect::<Vec<_>>()
        };
        let n_split = rows.iter()
            .map(|r| r.n_split as u64)
            .collect::<Vec<_>>();
        let selected = (0..rows.len())
            .map(|k| k == table.selected_index())
            .collect::<Vec<_>>();

        let df = DataFrame::new(vec![
            Series::new("cp", column(|r| r.cp)),
            Series::new("n_split", n_split),
            Series::new("rel_error", column(|r| r.rel_error)),
            Series::new("xerror", column(|r| r.xerror)),
            Series::new("xstd", column(|r| r.xstd)),
            Series::new("selected", selected),
        ])?;
        Ok(df)
    }


    fn rules_dataframe(&self) -> Result<DataFrame> {
        let rules = self.tree.rules();
        let segment = rules.iter()
            .map(|r| r.segment().0 as u64)
            .collect::<Vec<_>>();
        let conditions = rules.iter()
            .map(|r| {
                let conditions = r.conditions()
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>();
                if conditions.is_empty() {
                    String::from("TRUE")
                } else {
                    conditions.join(" AND ")
                }
            })
            .collect::<Vec<_>>();
        let prediction = rules.iter()
            .map(|r| r.prediction())
            .collect::<Vec<_>>();
        let n = rules.iter()
            .map(|r| r.counts().n() as u64)
            .collect::<Vec<_>>();
        let n_positive = rules.iter()
            .map(|r| r.counts().positive as u64)
            .collect::<Vec<_>>();

        let df = DataFrame::new(vec![
            Series::new("segment", segment),
            Series::new("rule", conditions),
            Series::new("prediction", prediction),
            Series::new("n", n),
            Series::new("n_positive", n_positive),
        ])?;
        Ok(df)
    }


    fn importance_dataframe(&self) -> Result<DataFrame> {
        let importance = self.tree.importance();
        let feature = importance.iter()
            .map(|fi| fi.feature.as_str())
            .collect::<Vec<_>>();
        let value = importance.iter()
            .map(|fi| fi.importance)
            .collect::<Vec<_>>();
        let percent = importance.iter()
            .map(|fi| fi.percent)
            .collect::<Vec<_>>();

        let df = DataFrame::new(vec![
            Series::new("feature", feature),
            Series::new("importance", value),
            Series::new("percent", percent),
        ])?;
        Ok(df)
    }


    fn centroids_dataframe(&self) -> Result<DataFrame> {
        let centroids = self.kmeans.centroids_unscaled(&self.standardizer)?;
        let cluster = (1..=centroids.n_rows())
            .map(|c| c as u64)
            .collect::<Vec<_>>();

        let mut columns = vec![Series::new("cluster", cluster)];
        columns.extend(centroids.to_series());
        Ok(DataFrame::new(columns)?)
    }
}

