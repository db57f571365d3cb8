use rand::prelude::*;
use miniseg::prelude::*;

use std::fs;
use std::path::Path;


#[cfg(test)]
pub mod pipeline_tests {
    use super::*;


    const CONTRACTS: [&str; 3] = ["Month-to-month", "One year", "Two year"];


    /// Writes a synthetic customer table.
    /// Month-to-month customers with high charges churn most.
    fn write_customers(path: &Path, n: usize) {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut text = String::from("customerID,Contract,MonthlyCharges,tenure,Churn\n");
        for i in 0..n {
            let contract = CONTRACTS[rng.gen_range(0..3)];
            let charges = rng.gen_range(20.0..120.0_f64);
            let tenure = match contract {
                "Month-to-month" => rng.gen_range(1..24),
                "One year" => rng.gen_range(12..48),
                _ => rng.gen_range(24..72),
            };
            let base = if contract == "Month-to-month" { 0.4 } else { 0.05 };
            let extra = if charges > 80.0 { 0.4 } else { 0.0 };
            let risk = base + extra;
            let churn = if rng.gen_bool(risk) { "Yes" } else { "No" };
            text.push_str(&format!(
                "C{i:04},{contract},{charges:.2},{tenure},{churn}\n"
            ));
        }
        fs::write(path, text).unwrap();
    }


    fn config_json(input: &Path) -> String {
        format!(
            r#"{{
                "input": {input:?},
                "target": {{ "column": "Churn", "rule": {{ "label": {{ "positive": "Yes" }} }} }},
                "missing": "reject",
                "schema": [
                    {{ "name": "Contract", "kind": "categorical" }},
                    {{ "name": "MonthlyCharges", "kind": "numeric" }},
                    {{ "name": "tenure", "kind": "numeric" }}
                ],
                "predictors": ["Contract", "MonthlyCharges", "tenure"],
                "cluster_features": ["MonthlyCharges", "tenure", "Contract"],
                "encoding": "one_hot",
                "seed": 2024,
                "tree": {{
                    "complexity_floor": 0.01,
                    "min_split": 20,
                    "min_bucket": 7,
                    "max_depth": 30,
                    "n_folds": 10,
                    "criterion": "gini",
                    "prune_rule": "one_standard_error"
                }},
                "kmeans": {{
                    "k": 3,
                    "k_max": 6,
                    "max_iter": 300,
                    "tolerance": 0.0001,
                    "n_init": 5,
                    "init": "kmeans_plus_plus"
                }}
            }}"#,
            input = input.display().to_string(),
        )
    }


    #[test]
    fn parses_config() {
        let config = SegmentationConfig::from_json(&config_json(Path::new("c.csv")))
            .unwrap();
        assert_eq!(config.seed, 2024);
        assert_eq!(config.kmeans.init, Init::KMeansPlusPlus);
        assert_eq!(config.tree.prune_rule, PruneRule::OneStandardError);
        assert_eq!(config.encoding, Encoding::OneHot);
        assert_eq!(
            config.predictor_specs().unwrap()[0],
            FeatureSpec::categorical("Contract"),
        );
        assert_eq!(config.cluster_specs().unwrap().len(), 3);
    }


    #[test]
    fn rejects_incomplete_config() {
        let json = config_json(Path::new("c.csv"))
            .replace(r#""seed": 2024,"#, "");
        let err = SegmentationConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, SegmentError::Json(_)));

        let json = config_json(Path::new("c.csv"))
            .replace(r#""predictors": ["Contract","#, r#""predictors": ["Gender","#);
        let err = SegmentationConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, SegmentError::MissingColumn { .. }));

        let json = config_json(Path::new("c.csv"))
            .replace(r#""seed": 2024,"#, r#""seed": 2024, "colour": "red","#);
        let err = SegmentationConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, SegmentError::Json(_)));
    }


    #[test]
    fn full_run_writes_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("customers.csv");
        write_customers(&input, 300);

        let config = SegmentationConfig::from_json(&config_json(&input))
            .unwrap();
        let dataset = config.reader().read().unwrap();
        assert_eq!(dataset.shape(), (300, 3));

        let report = Segmentation::new(config.clone()).run(&dataset).unwrap();
        assert_eq!(report.n_records, 300);
        assert_eq!(report.tree_assignment.len(), 300);
        assert_eq!(report.kmeans.k(), 3);
        assert_eq!(report.elbow.points().len(), 6);
        assert_eq!(report.raw.n_cols(), 5);

        for method in [SegmentMethod::Tree, SegmentMethod::Cluster] {
            let evaluation = report.evaluation(method);
            let total = evaluation.joint.cells()
                .iter()
                .map(|c| c.probability)
                .sum::<f64>();
            assert!((total - 1.0).abs() < 1e-9);
            assert_eq!(evaluation.separation_by_outcome.len(), 2);
        }

        let columns = report.annotated_raw.get_column_names();
        assert!(columns.contains(&"tree_segment"));
        assert!(columns.contains(&"cluster_segment"));
        assert_eq!(report.annotated_scaled.height(), 300);


        let out = dir.path().join("out");
        let written = report.write(&out).unwrap();
        let names = [
            "records_raw.csv", "records_scaled.csv", "elbow.csv",
            "cp_table.csv", "leaf_rules.csv", "feature_importance.csv",
            "centroids.csv",
            "tree_summary.csv", "tree_joint.csv", "tree_conditional.csv",
            "cluster_summary.csv", "cluster_joint.csv", "cluster_conditional.csv",
            "report.json",
        ];
        assert_eq!(written.len(), names.len());
        for name in names {
            assert!(out.join(name).is_file(), "{name} is missing");
        }

        let text = fs::read_to_string(out.join("report.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["n_records"], 300);
        assert_eq!(json["cluster"]["n_segments"], 3);


        // The seed fixes the whole run.
        let again = Segmentation::new(config).run(&dataset).unwrap();
        assert_eq!(again.tree_assignment, report.tree_assignment);
        assert_eq!(again.kmeans.assignment(), report.kmeans.assignment());
    }
}
