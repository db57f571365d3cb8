use ndarray::{array, Array2};
use miniseg::prelude::*;
use miniseg::standardize;


#[cfg(test)]
pub mod standardizer_tests {
    use super::*;


    fn matrix(values: Array2<f64>) -> FeatureMatrix {
        let names = (0..values.ncols())
            .map(|j| format!("x{j}"))
            .collect::<Vec<_>>();
        FeatureMatrix::new(names, values).unwrap()
    }


    #[test]
    fn zero_mean_unit_variance() {
        let raw = matrix(array![
            [1.0, 10.0],
            [2.0, 20.0],
            [3.0, 60.0],
            [6.0, 30.0],
        ]);
        let standardizer = Standardizer::fit(&raw);
        let scaled = standardizer.transform(&raw).unwrap();

        for column in scaled.values().columns() {
            let n = column.len() as f64;
            let mean = column.sum() / n;
            let var = column.iter()
                .map(|x| (x - mean).powi(2))
                .sum::<f64>() / (n - 1.0);
            assert!(mean.abs() < 1e-12, "mean is {mean}");
            assert!((var - 1.0).abs() < 1e-12, "variance is {var}");
        }
    }


    #[test]
    fn inverse_recovers_raw_values() {
        let raw = matrix(array![
            [29.85, 1.0, 0.0],
            [56.95, 34.0, 1.0],
            [53.85, 2.0, 0.0],
            [42.30, 45.0, 1.0],
            [70.70, 2.0, 0.0],
        ]);
        let standardizer = Standardizer::fit(&raw);
        let scaled = standardizer.transform(&raw).unwrap();
        let restored = standardizer.inverse_transform(&scaled).unwrap();

        assert_eq!(restored.names(), raw.names());
        for (a, b) in restored.values().iter().zip(raw.values()) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }


    #[test]
    fn constant_column_becomes_zero() {
        let raw = matrix(array![
            [5.0, 1.0],
            [5.0, 2.0],
            [5.0, 3.0],
        ]);
        let standardizer = Standardizer::fit(&raw);
        assert_eq!(standardizer.scale()[0], 1.0);

        let scaled = standardizer.transform(&raw).unwrap();
        assert!(scaled.column(0).iter().all(|&x| x == 0.0));

        let restored = standardizer.inverse_transform(&scaled).unwrap();
        assert!(restored.column(0).iter().all(|&x| x == 5.0));
    }


    #[test]
    fn single_row_is_centered() {
        let raw = matrix(array![[3.0, -2.0]]);
        let (scaled, mean, scale) = standardize(&raw);

        assert_eq!(mean, vec![3.0, -2.0]);
        assert_eq!(scale, vec![1.0, 1.0]);
        assert!(scaled.values().iter().all(|&x| x == 0.0));
    }


    #[test]
    fn rejects_other_columns() {
        let raw = matrix(array![[1.0, 2.0], [3.0, 4.0]]);
        let other = matrix(array![[1.0], [2.0]]);
        let standardizer = Standardizer::fit(&raw);

        let err = standardizer.transform(&other).unwrap_err();
        assert!(matches!(err, SegmentError::LengthMismatch { .. }));
    }
}
