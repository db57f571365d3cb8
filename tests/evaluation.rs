use ndarray::Array2;
use miniseg::prelude::*;
use miniseg::TableKind;


#[cfg(test)]
pub mod evaluation_tests {
    use super::*;


    /// Builds `(segment, negatives, positives)` blocks in order.
    /// Feature `level` equals the segment id, `flat` is constant.
    fn blocks(spec: &[(usize, usize, usize)])
        -> (Dataset, FeatureMatrix, SegmentAssignment)
    {
        let mut target = Vec::new();
        let mut ids = Vec::new();
        for &(segment, negative, positive) in spec {
            for k in 0..negative + positive {
                target.push(k >= negative);
                ids.push(SegmentId(segment));
            }
        }
        let n = target.len();
        let level = ids.iter().map(|id| id.0 as f64).collect::<Vec<_>>();
        let flat = vec![1.0; n];

        let dataset = Dataset::new(
            "churn",
            target,
            vec![
                Feature::numeric("level", level.clone()),
                Feature::numeric("flat", flat.clone()),
            ],
        ).unwrap();
        let values = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 { level[i] } else { flat[i] }
        });
        let raw = FeatureMatrix::new(
            vec!["level".into(), "flat".into()], values
        ).unwrap();
        let n_segments = spec.iter().map(|s| s.0).max().unwrap_or(0);
        let assignment = SegmentAssignment::new(
            SegmentMethod::Tree, ids, n_segments
        ).unwrap();

        (dataset, raw, assignment)
    }


    #[test]
    fn probability_tables() {
        let (dataset, raw, assignment) = blocks(&[
            (1, 30, 10),
            (2, 5, 45),
            (3, 20, 20),
        ]);
        let evaluator = SegmentEvaluator::new(&dataset, &raw).unwrap();

        let joint = evaluator.joint_probabilities(&assignment).unwrap();
        assert_eq!(joint.kind(), TableKind::Joint);
        assert_eq!(joint.cells().len(), 6);
        let total = joint.cells().iter().map(|c| c.probability).sum::<f64>();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((joint.probability(SegmentId(2), true) - 45.0 / 110.0).abs() < 1e-12);
        assert_eq!(joint.get(SegmentId(1), false).unwrap().count, 30);

        let conditional = evaluator.conditional_probabilities(&assignment).unwrap();
        assert!((conditional.probability(SegmentId(2), true) - 0.9).abs() < 1e-12);
        for segment in assignment.segments() {
            let sum = conditional.probability(segment, false)
                + conditional.probability(segment, true);
            assert!((sum - 1.0).abs() < 1e-9);
        }

        let order = joint.cells()
            .iter()
            .map(|c| (c.segment.0, c.target))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![(1, false), (1, true), (2, false), (2, true), (3, false), (3, true)],
        );
    }


    #[test]
    fn empty_segment_has_zero_row() {
        let (dataset, raw, _) = blocks(&[(1, 3, 1), (2, 1, 3)]);
        let ids = dataset.records()
            .map(|r| if r.row() < 4 { SegmentId(1) } else { SegmentId(3) })
            .collect();
        let assignment = SegmentAssignment::new(SegmentMethod::Cluster, ids, 3)
            .unwrap();
        let evaluator = SegmentEvaluator::new(&dataset, &raw).unwrap();

        let conditional = evaluator.conditional_probabilities(&assignment).unwrap();
        assert_eq!(conditional.probability(SegmentId(2), false), 0.0);
        assert_eq!(conditional.probability(SegmentId(2), true), 0.0);

        let summary = evaluator.summary(&assignment).unwrap();
        let empty = summary.get(SegmentId(2)).unwrap();
        assert_eq!(empty.count, 0);
        assert_eq!(empty.percent_positive, 0.0);
        assert_eq!(empty.mean, vec![0.0, 0.0]);
    }


    #[test]
    fn summary_statistics() {
        let (dataset, raw, assignment) = blocks(&[(1, 3, 1), (2, 0, 1)]);
        let evaluator = SegmentEvaluator::new(&dataset, &raw).unwrap();
        let summary = evaluator.summary(&assignment).unwrap();

        assert_eq!(summary.features(), ["level", "flat"]);
        let first = summary.get(SegmentId(1)).unwrap();
        assert_eq!(first.count, 4);
        assert_eq!(first.mean, vec![1.0, 1.0]);
        assert!((first.percent_positive - 25.0).abs() < 1e-12);

        // A single record has zero spread.
        let single = summary.get(SegmentId(2)).unwrap();
        assert_eq!(single.count, 1);
        assert_eq!(single.std, vec![0.0, 0.0]);
        assert_eq!(single.percent_positive, 100.0);

        let df = summary.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
    }


    #[test]
    fn separation_scores() {
        let (dataset, raw, assignment) = blocks(&[
            (1, 2, 2),
            (2, 2, 2),
            (3, 2, 2),
        ]);
        let evaluator = SegmentEvaluator::new(&dataset, &raw).unwrap();
        let summary = evaluator.summary(&assignment).unwrap();

        // Segment means of `level` are 1, 2, 3.
        let exclude: &[&str] = &[];
        let score = evaluator.separation_score(&summary, exclude);
        assert!((score.of("level").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(score.of("flat"), Some(0.0));
        assert!((score.total - 1.0).abs() < 1e-12);
        assert!((score.mean - 0.5).abs() < 1e-12);

        let score = evaluator.separation_score(&summary, &["flat"]);
        assert_eq!(score.features, vec!["level".to_string()]);
        assert!((score.mean - 1.0).abs() < 1e-12);
    }


    #[test]
    fn single_segment_does_not_separate() {
        let (dataset, raw, assignment) = blocks(&[(1, 5, 5)]);
        let evaluator = SegmentEvaluator::new(&dataset, &raw).unwrap();
        let summary = evaluator.summary(&assignment).unwrap();

        let score = evaluator.separation_score(&summary, &["flat"]);
        assert_eq!(score.total, 0.0);
    }


    #[test]
    fn separation_within_outcomes() {
        let (dataset, raw, assignment) = blocks(&[(1, 4, 1), (2, 1, 4)]);
        let evaluator = SegmentEvaluator::new(&dataset, &raw).unwrap();

        let exclude: &[&str] = &[];
        let by_outcome = evaluator.separation_by_outcome(&assignment, exclude)
            .unwrap();
        assert_eq!(by_outcome.len(), 2);
        assert!(!by_outcome[0].target);
        assert!(by_outcome[1].target);
        assert_eq!(by_outcome[0].n_records, 5);
        assert_eq!(by_outcome[1].n_records, 5);

        // Both classes still span segments 1 and 2.
        for outcome in &by_outcome {
            assert!((outcome.score.of("level").unwrap() - 0.5).abs() < 1e-12);
        }
    }


    #[test]
    fn rejects_misaligned_assignment() {
        let (dataset, raw, _) = blocks(&[(1, 2, 2)]);
        let short = SegmentAssignment::new(
            SegmentMethod::Tree, vec![SegmentId(1); 3], 1
        ).unwrap();
        let evaluator = SegmentEvaluator::new(&dataset, &raw).unwrap();

        let err = evaluator.summary(&short).unwrap_err();
        assert!(matches!(err, SegmentError::LengthMismatch { .. }));
        let err = evaluator.joint_probabilities(&short).unwrap_err();
        assert!(matches!(err, SegmentError::LengthMismatch { .. }));
    }
}
