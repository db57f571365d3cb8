use rand::prelude::*;
use miniseg::prelude::*;
use miniseg::decision_tree::Clause;


#[cfg(test)]
pub mod dtree_tests {
    use super::*;


    /// `flag == yes` decides the target exactly;
    /// `noise` has the same parity pattern but no threshold separates it.
    fn flagged() -> Dataset {
        let n = 100;
        let flag = (0..n)
            .map(|i| if i % 2 == 0 { "yes" } else { "no" })
            .collect::<Vec<_>>();
        let target = (0..n).map(|i| i % 2 == 0).collect::<Vec<_>>();
        let noise = (0..n).map(|i| ((i * 37) % 100) as f64).collect();

        Dataset::new(
            "churn",
            target,
            vec![
                Feature::categorical("flag", ["no", "yes"], flag).unwrap(),
                Feature::numeric("noise", noise),
            ],
        ).unwrap()
    }


    /// A threshold on `x` with one flipped label out of ten.
    fn noisy() -> Dataset {
        let n = 200;
        let x = (0..n).map(|i| i as f64 / n as f64).collect::<Vec<_>>();
        let target = x.iter()
            .enumerate()
            .map(|(i, &x)| (x > 0.5) ^ (i % 10 == 0))
            .collect::<Vec<_>>();
        let region = (0..n)
            .map(|i| ["east", "north", "west"][i % 3])
            .collect::<Vec<_>>();

        Dataset::new(
            "churn",
            target,
            vec![
                Feature::numeric("x", x),
                Feature::categorical("region", ["east", "north", "west"], region)
                    .unwrap(),
            ],
        ).unwrap()
    }


    fn specs(dataset: &Dataset) -> Vec<FeatureSpec> {
        dataset.schema()
    }


    #[test]
    fn perfect_predictor_gives_two_pure_leaves() {
        let dataset = flagged();
        let mut rng = StdRng::seed_from_u64(1234);
        let tree = DecisionTreeBuilder::new(specs(&dataset))
            .fit(&dataset, &mut rng)
            .unwrap();

        assert_eq!(tree.n_segments(), 2);
        assert_eq!(tree.cp_table().selected().n_split, 1);

        for rule in tree.rules() {
            assert!(rule.counts().is_pure());
            assert_eq!(rule.conditions().len(), 1);
            assert_eq!(rule.conditions()[0].feature, "flag");
        }

        let importance = tree.importance();
        assert_eq!(importance[0].feature, "flag");
        assert!((importance[0].percent - 100.0).abs() < 1e-9);
    }


    #[test]
    fn single_class_gives_one_segment() {
        let n = 50;
        let dataset = Dataset::new(
            "churn",
            vec![false; n],
            vec![Feature::numeric("x", (0..n).map(|i| i as f64).collect())],
        ).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTreeBuilder::new(specs(&dataset))
            .fit(&dataset, &mut rng)
            .unwrap();

        assert_eq!(tree.n_segments(), 1);
        assert_eq!(tree.cp_table().rows().len(), 1);
        assert_eq!(tree.cp_table().selected().rel_error, 0.0);
        assert!(tree.rules()[0].conditions().is_empty());

        let assignment = tree.assign_all(&dataset).unwrap();
        assert!(assignment.ids().iter().all(|&id| id == SegmentId(1)));
    }


    #[test]
    fn constant_feature_is_never_split() {
        let base = flagged();
        let n = base.shape().0;
        let mut features = vec![Feature::numeric("constant", vec![5.0; n])];
        features.extend(base.features().iter().cloned());
        let dataset = Dataset::new("churn", base.target().to_vec(), features)
            .unwrap();

        let mut rng = StdRng::seed_from_u64(99);
        let tree = DecisionTreeBuilder::new(specs(&dataset))
            .fit(&dataset, &mut rng)
            .unwrap();

        let uses_constant = tree.rules()
            .iter()
            .flat_map(|rule| rule.conditions())
            .any(|c| c.feature == "constant");
        assert!(!uses_constant);

        let constant = tree.importance()
            .iter()
            .find(|fi| fi.feature == "constant")
            .unwrap();
        assert_eq!(constant.importance, 0.0);
    }


    #[test]
    fn categorical_split_groups_levels() {
        let levels = ["a", "b", "c", "d"];
        let n = 80;
        let region = (0..n).map(|i| levels[i % 4]).collect::<Vec<_>>();
        let target = (0..n).map(|i| i % 4 < 2).collect::<Vec<_>>();
        let dataset = Dataset::new(
            "churn",
            target,
            vec![Feature::categorical("region", levels, region).unwrap()],
        ).unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        let tree = DecisionTreeBuilder::new(specs(&dataset))
            .fit(&dataset, &mut rng)
            .unwrap();
        assert_eq!(tree.n_segments(), 2);

        let rules = tree.rules();
        let clause = |k: usize| rules[k].conditions()[0].clause.clone();
        assert_eq!(clause(0), Clause::OneOf { levels: vec!["c".into(), "d".into()] });
        assert_eq!(clause(1), Clause::OneOf { levels: vec!["a".into(), "b".into()] });
        assert!(!rules[0].prediction());
        assert!(rules[1].prediction());
    }


    #[test]
    fn every_record_matches_exactly_one_rule() {
        let dataset = noisy();
        let mut rng = StdRng::seed_from_u64(2024);
        let tree = DecisionTreeBuilder::new(specs(&dataset))
            .complexity_floor(0.001)
            .fit(&dataset, &mut rng)
            .unwrap();

        let assignment = tree.assign_all(&dataset).unwrap();
        assert_eq!(assignment.len(), dataset.shape().0);
        assert_eq!(assignment.n_segments(), tree.n_segments());
        assert_eq!(assignment.sizes().iter().sum::<usize>(), dataset.shape().0);

        for record in dataset.records() {
            let matched = tree.rules()
                .iter()
                .filter(|rule| rule.matches(&record).unwrap())
                .map(|rule| rule.segment())
                .collect::<Vec<_>>();
            assert_eq!(matched, vec![assignment[record.row()]]);
        }

        let leaf_total = tree.rules()
            .iter()
            .map(|rule| rule.counts().n())
            .sum::<usize>();
        assert_eq!(leaf_total, dataset.shape().0);
    }


    #[test]
    fn cp_table_is_nested() {
        let dataset = noisy();
        let mut rng = StdRng::seed_from_u64(7);
        let tree = DecisionTreeBuilder::new(specs(&dataset))
            .complexity_floor(0.0)
            .min_split(2)
            .min_bucket(1)
            .fit(&dataset, &mut rng)
            .unwrap();

        let rows = tree.cp_table().rows();
        assert_eq!(rows[0].n_split, 0);
        assert!((rows[0].rel_error - 1.0).abs() < 1e-12);
        for pair in rows.windows(2) {
            assert!(pair[0].n_split < pair[1].n_split);
            assert!(pair[0].cp >= pair[1].cp);
            assert!(pair[0].rel_error >= pair[1].rel_error - 1e-12);
        }
    }


    #[test]
    fn one_standard_error_is_no_larger() {
        let dataset = noisy();
        let fit = |rule| {
            let mut rng = StdRng::seed_from_u64(11);
            DecisionTreeBuilder::new(specs(&dataset))
                .complexity_floor(0.0)
                .prune_rule(rule)
                .fit(&dataset, &mut rng)
                .unwrap()
        };
        let min = fit(PruneRule::MinXError);
        let one_se = fit(PruneRule::OneStandardError);

        assert_eq!(min.cp_table().rows(), one_se.cp_table().rows());
        assert!(one_se.n_segments() <= min.n_segments());
    }


    #[test]
    fn same_seed_same_tree() {
        let dataset = noisy();
        let fit = || {
            let mut rng = StdRng::seed_from_u64(31);
            DecisionTreeBuilder::new(specs(&dataset))
                .criterion(Criterion::Entropy)
                .fit(&dataset, &mut rng)
                .unwrap()
        };
        let (a, b) = (fit(), fit());

        assert_eq!(a.cp_table(), b.cp_table());
        assert_eq!(a.rules(), b.rules());
        assert_eq!(a.assign_all(&dataset).unwrap(), b.assign_all(&dataset).unwrap());
    }


    #[test]
    fn rules_apply_to_new_records() {
        let dataset = flagged();
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTreeBuilder::new(specs(&dataset))
            .fit(&dataset, &mut rng)
            .unwrap();

        let fresh = Dataset::new(
            "churn",
            vec![true, false],
            vec![
                Feature::categorical("flag", ["no", "yes"], ["yes", "no"]).unwrap(),
                Feature::numeric("noise", vec![1000.0, -1000.0]),
            ],
        ).unwrap();
        assert!(tree.predict(&fresh.record(0)).unwrap());
        assert!(!tree.predict(&fresh.record(1)).unwrap());
        assert_ne!(
            tree.assign(&fresh.record(0)).unwrap(),
            tree.assign(&fresh.record(1)).unwrap(),
        );
    }


    #[test]
    fn unplaceable_record_is_an_error() {
        let dataset = flagged();
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTreeBuilder::new(specs(&dataset))
            .fit(&dataset, &mut rng)
            .unwrap();

        // `maybe` was never seen in training, so no leaf covers it.
        let fresh = Dataset::new(
            "churn",
            vec![true, false],
            vec![
                Feature::categorical("flag", ["maybe", "no", "yes"], ["yes", "maybe"])
                    .unwrap(),
                Feature::numeric("noise", vec![0.0, 0.0]),
            ],
        ).unwrap();

        assert!(tree.assign(&fresh.record(0)).is_ok());
        let err = tree.assign(&fresh.record(1)).unwrap_err();
        match err {
            SegmentError::RuleViolation { row, matched } => {
                assert_eq!(row, 1);
                assert!(matched.is_empty());
            },
            other => panic!("unexpected error: {other}"),
        }

        let err = tree.assign_all(&fresh).unwrap_err();
        assert!(matches!(err, SegmentError::RuleViolation { row: 1, .. }));
        assert!(tree.predict(&fresh.record(1)).is_err());
    }


    #[test]
    fn invalid_parameters() {
        let dataset = flagged();
        let mut rng = StdRng::seed_from_u64(0);

        let err = DecisionTreeBuilder::new(specs(&dataset))
            .n_folds(1)
            .fit(&dataset, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SegmentError::InvalidParameter(_)));

        let err = DecisionTreeBuilder::new(vec![FeatureSpec::numeric("age")])
            .fit(&dataset, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SegmentError::MissingColumn { .. }));

        let err = DecisionTreeBuilder::new(vec![FeatureSpec::numeric("flag")])
            .fit(&dataset, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SegmentError::KindMismatch { .. }));
    }
}
