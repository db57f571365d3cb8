use polars::prelude::*;
use miniseg::prelude::*;

use std::fs;


#[cfg(test)]
pub mod dataset_tests {
    use super::*;


    fn customers() -> DataFrame {
        df!(
            "Churn"          => ["No", "Yes", "No", "No", "Yes", "No", "Yes", "No"],
            "Contract"       => [
                "Month-to-month", "Month-to-month", "One year", "Two year",
                "Month-to-month", "One year", "Month-to-month", "Two year",
            ],
            "MonthlyCharges" => [29.85, 70.70, 56.95, 42.30, 99.65, 53.85, 89.10, 25.25],
            "tenure"         => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        ).unwrap()
    }


    fn reader() -> DatasetReader<String> {
        DatasetReader::new()
            .feature(FeatureSpec::categorical("Contract"))
            .feature(FeatureSpec::numeric("MonthlyCharges"))
    }


    #[test]
    fn label_target() {
        let dataset = reader()
            .target("Churn", TargetRule::Label { positive: "Yes".into() })
            .read_dataframe(&customers())
            .unwrap();

        assert_eq!(dataset.shape(), (8, 2));
        assert_eq!(dataset.n_positive(), 3);
        assert_eq!(dataset.target_name(), "Churn");

        let levels = dataset["Contract"].levels().unwrap();
        assert_eq!(levels, ["Month-to-month", "One year", "Two year"]);
        assert_eq!(
            dataset.record(2).value("Contract").unwrap(),
            Value::Categorical("One year"),
        );
    }


    #[test]
    fn quantile_target_is_strictly_above() {
        // The 0.75-quantile of 1..=8 is 6.25.
        let dataset = reader()
            .target("tenure", TargetRule::Quantile { q: 0.75 })
            .read_dataframe(&customers())
            .unwrap();

        let expected = [false, false, false, false, false, false, true, true];
        assert_eq!(dataset.target(), &expected[..]);
    }


    #[test]
    fn threshold_target() {
        let dataset = reader()
            .target("tenure", TargetRule::Threshold { value: 4.0 })
            .read_dataframe(&customers())
            .unwrap();
        assert_eq!(dataset.n_positive(), 4);
        assert!(!dataset.target()[3]);
    }


    #[test]
    fn missing_target_column() {
        let err = reader()
            .target("Churned", TargetRule::Boolean)
            .read_dataframe(&customers())
            .unwrap_err();
        assert!(matches!(err, SegmentError::MissingColumn { .. }));
    }


    #[test]
    fn rejects_non_finite_values() {
        let err = Dataset::new(
            "y",
            vec![true, false],
            vec![Feature::numeric("x", vec![1.0, f64::NAN])],
        ).unwrap_err();
        assert!(matches!(err, SegmentError::NonFinite { row: 1, .. }));
    }


    #[test]
    #[should_panic(expected = "row 2 is out of range")]
    fn record_out_of_range() {
        let dataset = Dataset::new(
            "y",
            vec![true, false],
            vec![Feature::numeric("x", vec![1.0, 2.0])],
        ).unwrap();
        let _ = dataset.record(2);
    }


    #[test]
    fn rejects_unknown_levels() {
        let err = Feature::categorical("region", ["north", "south"], ["north", "west"])
            .unwrap_err();
        assert!(matches!(err, SegmentError::UnknownLevel { .. }));
    }


    #[test]
    fn rejects_empty_and_duplicate() {
        let err = Dataset::new("y", Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, SegmentError::EmptyDataset));

        let err = Dataset::new(
            "y",
            vec![true],
            vec![Feature::numeric("x", vec![1.0]), Feature::numeric("x", vec![2.0])],
        ).unwrap_err();
        assert!(matches!(err, SegmentError::DuplicateFeature { .. }));
    }


    #[test]
    fn kind_mismatch() {
        let dataset = reader()
            .target("Churn", TargetRule::Label { positive: "Yes".into() })
            .read_dataframe(&customers())
            .unwrap();
        let err = dataset.resolve(&[FeatureSpec::numeric("Contract")])
            .unwrap_err();
        assert!(matches!(err, SegmentError::KindMismatch { .. }));
    }


    #[test]
    fn missing_value_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.csv");
        fs::write(
            &path,
            "Churn,MonthlyCharges\n\
             1,29.85\n\
             0,\n\
             1,70.70\n",
        ).unwrap();

        let err = DatasetReader::new()
            .file(&path)
            .target("Churn", TargetRule::Boolean)
            .feature(FeatureSpec::numeric("MonthlyCharges"))
            .read()
            .unwrap_err();
        assert!(matches!(err, SegmentError::MissingValue { row: 1, .. }));


        let dataset = DatasetReader::new()
            .file(&path)
            .target("Churn", TargetRule::Boolean)
            .feature(FeatureSpec::numeric("MonthlyCharges"))
            .missing(MissingPolicy::Sentinel {
                numeric: -1.0,
                categorical: "unknown".into(),
            })
            .read()
            .unwrap();
        assert_eq!(dataset.target(), &[true, false, true][..]);
        assert_eq!(dataset["MonthlyCharges"].as_f64(1), -1.0);


        let df = df!(
            "Churn" => ["Yes", "No", "Yes"],
            "x"     => [1.0, f64::NAN, f64::INFINITY]
        ).unwrap();
        let reader = DatasetReader::<String>::new()
            .target("Churn", TargetRule::Label { positive: "Yes".into() })
            .feature(FeatureSpec::numeric("x"));

        let err = reader.read_dataframe(&df).unwrap_err();
        assert!(matches!(err, SegmentError::NonFinite { row: 1, .. }));

        let dataset = reader
            .missing(MissingPolicy::Sentinel {
                numeric: 0.0,
                categorical: "unknown".into(),
            })
            .read_dataframe(&df)
            .unwrap();
        assert_eq!(dataset["x"].as_f64(0), 1.0);
        assert_eq!(dataset["x"].as_f64(1), 0.0);
        assert_eq!(dataset["x"].as_f64(2), 0.0);
    }


    #[test]
    fn one_hot_matrix() {
        let dataset = reader()
            .target("Churn", TargetRule::Label { positive: "Yes".into() })
            .read_dataframe(&customers())
            .unwrap();
        let matrix = FeatureMatrix::from_dataset(
            &dataset, &dataset.schema(), Encoding::OneHot
        ).unwrap();

        assert_eq!(matrix.shape(), (8, 4));
        assert_eq!(
            matrix.names(),
            [
                "Contract=Month-to-month",
                "Contract=One year",
                "Contract=Two year",
                "MonthlyCharges",
            ],
        );
        assert_eq!(matrix.row(3).to_vec(), vec![0.0, 0.0, 1.0, 42.30]);


        let ordinal = FeatureMatrix::from_dataset(
            &dataset, &dataset.schema(), Encoding::Ordinal
        ).unwrap();
        assert_eq!(ordinal.row(3).to_vec(), vec![2.0, 42.30]);
    }
}
