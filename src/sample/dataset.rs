use polars::prelude::*;

use std::collections::{HashMap, HashSet};
use std::ops::Index;

use crate::{Result, SegmentError};
use super::feature::*;


/// An immutable, ordered collection of records
/// sharing an explicit feature schema.
///
/// Each record holds a binary target and one value per feature.
/// Every later stage reads a `Dataset` by row position,
/// so the row order is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub(super) target_name: String,
    pub(super) target: Vec<bool>,
    pub(super) features: Vec<Feature>,
    pub(super) name_to_index: HashMap<String, usize>,
    pub(super) n_sample: usize,
}


impl Dataset {
    /// Construct a new `Dataset`.
    ///
    /// Fails if there is no record, if a feature name is repeated,
    /// if some column length differs from the target length,
    /// or if a numeric value is not finite.
    pub fn new<S: ToString>(
        target_name: S,
        target: Vec<bool>,
        features: Vec<Feature>,
    ) -> Result<Self>
    {
        let n_sample = target.len();
        if n_sample == 0 {
            return Err(SegmentError::EmptyDataset);
        }


        let mut name_to_index = HashMap::with_capacity(features.len());
        for (i, feature) in features.iter().enumerate() {
            if name_to_index.insert(feature.name.clone(), i).is_some() {
                return Err(SegmentError::DuplicateFeature {
                    name: feature.name.clone(),
                });
            }

            if feature.column.len() != n_sample {
                return Err(SegmentError::LengthMismatch {
                    what: "feature column",
                    expected: n_sample,
                    found: feature.column.len(),
                });
            }

            match &feature.column {
                Column::Numeric(values) => {
                    let bad = values.iter().position(|x| !x.is_finite());
                    if let Some(row) = bad {
                        return Err(SegmentError::NonFinite {
                            feature: feature.name.clone(),
                            row,
                        });
                    }
                },
                Column::Categorical { levels, codes } => {
                    if let Some(&c) = codes.iter().find(|&&c| c >= levels.len()) {
                        return Err(SegmentError::UnknownLevel {
                            feature: feature.name.clone(),
                            value: format!("#{c}"),
                        });
                    }
                    let distinct = levels.iter().collect::<HashSet<_>>();
                    if distinct.len() != levels.len() {
                        return Err(SegmentError::InvalidParameter(format!(
                            "categorical feature `{}` declares \
                             a level more than once",
                            feature.name
                        )));
                    }
                },
            }
        }


        let dataset = Self {
            target_name: target_name.to_string(),
            target,
            features,
            name_to_index,
            n_sample,
        };
        Ok(dataset)
    }


    /// Returns the pair of the number of records and
    /// the number of features.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_sample, self.features.len())
    }


    /// Returns the name of the target column.
    #[inline]
    pub fn target_name(&self) -> &str {
        &self.target_name
    }


    /// Returns the target values.
    #[inline]
    pub fn target(&self) -> &[bool] {
        &self.target[..]
    }


    /// Returns the number of records with a positive target.
    pub fn n_positive(&self) -> usize {
        self.target.iter().filter(|&&y| y).count()
    }


    /// Returns the features.
    #[inline]
    pub fn features(&self) -> &[Feature] {
        &self.features[..]
    }


    /// Returns the schema, i.e., the list of `(name, kind)` pairs.
    pub fn schema(&self) -> Vec<FeatureSpec> {
        self.features.iter()
            .map(Feature::spec)
            .collect()
    }


    /// Returns the feature named `name`.
    pub fn feature(&self, name: &str) -> Result<&Feature> {
        self.name_to_index.get(name)
            .map(|&k| &self.features[k])
            .ok_or_else(|| SegmentError::MissingColumn {
                name: name.to_string(),
            })
    }


    /// Returns the position of the feature named `name`.
    pub fn position(&self, name: &str) -> Result<usize> {
        self.name_to_index.get(name)
            .copied()
            .ok_or_else(|| SegmentError::MissingColumn {
                name: name.to_string(),
            })
    }


    /// Check that every `spec` exists with the declared kind
    /// and return their positions.
    pub fn resolve(&self, specs: &[FeatureSpec]) -> Result<Vec<usize>> {
        specs.iter()
            .map(|spec| {
                let k = self.position(&spec.name)?;
                let found = self.features[k].column.kind();
                if found != spec.kind {
                    return Err(SegmentError::KindMismatch {
                        name: spec.name.clone(),
                        expected: spec.kind.to_string(),
                        found: found.to_string(),
                    });
                }
                Ok(k)
            })
            .collect()
    }


    /// Returns the `row`-th record.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not smaller than the number of records,
    /// as slice indexing does.
    /// Use [`Dataset::records`] to walk every record.
    #[inline]
    pub fn record(&self, row: usize) -> Record<'_> {
        assert!(row < self.n_sample, "row {row} is out of range");
        Record { dataset: self, row }
    }


    /// Returns an iterator over the records in row order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        (0..self.n_sample).map(move |row| Record { dataset: self, row })
    }


    /// Returns the dataset restricted to `rows`, in the given order.
    pub fn subset(&self, rows: &[usize]) -> Result<Self> {
        let target = rows.iter()
            .map(|&i| self.target[i])
            .collect::<Vec<_>>();
        let features = self.features.iter()
            .map(|feat| Feature {
                name: feat.name.clone(),
                column: feat.column.subset(rows),
            })
            .collect::<Vec<_>>();

        Self::new(&self.target_name, target, features)
    }


    /// Convert into a `polars::DataFrame`.
    /// The target is the first column, followed by the features.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.features.len() + 1);
        columns.push(Series::new(&self.target_name, &self.target[..]));
        for feature in &self.features {
            let series = match &feature.column {
                Column::Numeric(values) => {
                    Series::new(&feature.name, &values[..])
                },
                Column::Categorical { levels, codes } => {
                    let values = codes.iter()
                        .map(|&c| levels[c].as_str())
                        .collect::<Vec<_>>();
                    Series::new(&feature.name, values)
                },
            };
            columns.push(series);
        }
        Ok(DataFrame::new(columns)?)
    }
}


impl<S> Index<S> for Dataset
    where S: AsRef<str>
{
    type Output = Column;


    /// Returns the column named `name`.
    /// Panics if no such feature exists.
    fn index(&self, name: S) -> &Self::Output {
        let name: &str = name.as_ref();
        let k = *self.name_to_index.get(name)
            .unwrap_or_else(|| panic!("The feature `{name}` does not exist"));
        &self.features[k].column
    }
}


/// A borrowed view of one record of a [`Dataset`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    dataset: &'a Dataset,
    row: usize,
}


impl<'a> Record<'a> {
    /// Returns the row position of this record.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }


    /// Returns the target value.
    #[inline]
    pub fn target(&self) -> bool {
        self.dataset.target[self.row]
    }


    /// Returns the value of the feature named `name`.
    pub fn value(&self, name: &str) -> Result<Value<'a>> {
        let feature = self.dataset.feature(name)?;
        Ok(feature.column.value(self.row))
    }


    /// Returns the values of all features in schema order.
    pub fn values(&self) -> Vec<Value<'a>> {
        self.dataset.features.iter()
            .map(|feat| feat.column.value(self.row))
            .collect()
    }


    /// Returns the dataset this record belongs to.
    #[inline]
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }
}
