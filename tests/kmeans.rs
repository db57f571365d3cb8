use ndarray::{array, Array2};
use rand::prelude::*;
use rand_distr::Normal;
use miniseg::prelude::*;
use miniseg::elbow_curve;


#[cfg(test)]
pub mod kmeans_tests {
    use super::*;


    fn matrix(values: Array2<f64>) -> FeatureMatrix {
        let names = (0..values.ncols())
            .map(|j| format!("x{j}"))
            .collect::<Vec<_>>();
        FeatureMatrix::new(names, values).unwrap()
    }


    /// Three tight blobs far from each other.
    fn blobs(per_blob: usize, seed: u64) -> FeatureMatrix {
        let centers = [(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)];
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, 1.0).unwrap();

        let mut values = Array2::zeros((3 * per_blob, 2));
        for (b, (cx, cy)) in centers.iter().enumerate() {
            for i in 0..per_blob {
                let mut row = values.row_mut(b * per_blob + i);
                row[0] = cx + noise.sample(&mut rng);
                row[1] = cy + noise.sample(&mut rng);
            }
        }
        matrix(values)
    }


    #[test]
    fn two_obvious_clusters() {
        let raw = matrix(array![[1.0], [2.0], [8.0], [9.0]]);
        let standardizer = Standardizer::fit(&raw);
        let scaled = standardizer.transform(&raw).unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let fit = KMeans::new(2)
            .n_init(1)
            .fit(&scaled, &mut rng)
            .unwrap();

        assert!(fit.converged());
        assert!(fit.warnings().is_empty());
        let ids = fit.assignment().ids().to_vec();
        assert_eq!(ids, vec![SegmentId(1), SegmentId(1), SegmentId(2), SegmentId(2)]);

        let centroids = fit.centroids_unscaled(&standardizer).unwrap();
        assert!((centroids.values()[[0, 0]] - 1.5).abs() < 1e-9);
        assert!((centroids.values()[[1, 0]] - 8.5).abs() < 1e-9);
        assert_eq!(fit.sizes(), &[2, 2]);
    }


    #[test]
    fn sums_of_squares_add_up() {
        let x = blobs(20, 1);
        let mut rng = StdRng::seed_from_u64(8);
        let fit = KMeans::new(3).n_init(10).fit(&x, &mut rng).unwrap();

        let within = fit.within_ss().iter().sum::<f64>();
        assert!((within - fit.total_within_ss()).abs() < 1e-9);
        assert!(
            (fit.total_ss() - fit.total_within_ss() - fit.between_ss()).abs()
                < 1e-9
        );
        assert_eq!(fit.sizes().iter().sum::<usize>(), x.n_rows());
        assert_eq!(fit.sizes(), &[20, 20, 20]);
    }


    #[test]
    fn same_seed_same_fit() {
        let x = blobs(30, 2);
        let fit = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            KMeans::new(4).fit(&x, &mut rng).unwrap()
        };
        let (a, b) = (fit(77), fit(77));

        assert_eq!(a.assignment(), b.assignment());
        assert_eq!(a.centroids(), b.centroids());
        assert_eq!(a.total_within_ss(), b.total_within_ss());
    }


    #[test]
    fn ids_follow_first_appearance() {
        let x = blobs(10, 3);
        let mut rng = StdRng::seed_from_u64(4);
        let fit = KMeans::new(3).n_init(10).fit(&x, &mut rng).unwrap();

        let ids = fit.assignment().ids();
        assert_eq!(ids[0], SegmentId(1));
        assert_eq!(ids[10], SegmentId(2));
        assert_eq!(ids[20], SegmentId(3));
        for (i, row) in x.values().rows().into_iter().enumerate() {
            assert_eq!(fit.predict(row), ids[i]);
        }
    }


    #[test]
    fn empty_clusters_are_reseeded() {
        // Any three rows include two equal ones,
        // so one centroid is always left without records.
        let x = matrix(array![[0.0], [0.0], [0.0], [0.0], [10.0]]);
        let fit = |seed, max_iter| {
            let mut rng = StdRng::seed_from_u64(seed);
            KMeans::new(3)
                .init(Init::RandomRows)
                .n_init(1)
                .max_iter(max_iter)
                .fit(&x, &mut rng)
                .unwrap()
        };

        let mut n_reseeded = 0;
        for seed in 0..32 {
            let full = fit(seed, 50);

            // Labels settle at once, reseeding or not.
            assert!(full.converged());
            assert!(full.n_iter() <= 2);
            let capped = full.warnings()
                .iter()
                .any(|w| matches!(w, Warning::NonConvergence { .. }));
            assert!(!capped);
            assert_eq!(full.sizes().iter().sum::<usize>(), 5);
            assert!(full.total_within_ss().abs() < 1e-12);

            // A centroid is only ever moved onto the far row.
            let reseeds = full.warnings()
                .iter()
                .filter_map(|w| match w {
                    Warning::EmptyClusterReseeded { k: 3, row, .. } => Some(*row),
                    _ => None,
                })
                .collect::<Vec<_>>();
            assert!(reseeds.len() <= 1);
            if reseeds.is_empty() { continue; }
            assert_eq!(reseeds, vec![4]);
            n_reseeded += 1;

            // The reseed moves a label, so one iteration is not enough.
            let short = fit(seed, 1);
            assert!(!short.converged());
            let capped = short.warnings()
                .iter()
                .any(|w| matches!(w, Warning::NonConvergence { k: 3, iterations: 1 }));
            assert!(capped);
        }
        assert!(n_reseeded > 0);
    }


    #[test]
    fn elbow_curve_decreases_on_blobs() {
        let x = blobs(30, 5);
        let curve = KMeans::new(1)
            .n_init(10)
            .elbow_curve(&x, 5, 17)
            .unwrap();

        let points = curve.points();
        assert_eq!(points.len(), 5);
        assert_eq!(
            points.iter().map(|p| p.k).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5],
        );
        assert!(curve.is_monotone());
        for pair in points.windows(2) {
            assert!(pair[1].total_within_ss <= pair[0].total_within_ss);
        }

        // Three blobs: the drop after k = 3 is small.
        let gain = |k: usize| points[k - 2].total_within_ss - points[k - 1].total_within_ss;
        assert!(gain(3) > 10.0 * gain(4));
    }


    #[test]
    fn elbow_curve_with_defaults() {
        let x = blobs(10, 9);
        let a = elbow_curve(&x, 4, 3).unwrap();
        let b = elbow_curve(&x, 4, 3).unwrap();
        assert_eq!(a, b);

        let err = elbow_curve(&x, 31, 3).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidParameter(_)));
    }


    #[test]
    fn invalid_k() {
        let x = blobs(2, 0);
        let mut rng = StdRng::seed_from_u64(0);

        let err = KMeans::new(0).fit(&x, &mut rng).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidParameter(_)));

        let err = KMeans::new(7).fit(&x, &mut rng).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidParameter(_)));
    }
}
