use serde::{Serialize, Deserialize};

use std::fmt;
use std::collections::HashMap;

use crate::{Result, SegmentError};


/// The kind of values a feature takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Real-valued feature.
    Numeric,
    /// Feature taking one of a closed set of levels.
    Categorical,
}


impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        };
        write!(f, "{name}")
    }
}


/// A typed feature declaration: `(name, kind)`.
///
/// An ordered list of `FeatureSpec`s is the model specification
/// passed to the tree builder and to [`FeatureMatrix`](super::FeatureMatrix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureSpec {
    /// Feature (column) name.
    pub name: String,
    /// Feature kind.
    pub kind: FeatureKind,
}


impl FeatureSpec {
    /// A numeric feature named `name`.
    pub fn numeric<S: ToString>(name: S) -> Self {
        Self { name: name.to_string(), kind: FeatureKind::Numeric }
    }


    /// A categorical feature named `name`.
    pub fn categorical<S: ToString>(name: S) -> Self {
        Self { name: name.to_string(), kind: FeatureKind::Categorical }
    }
}


/// Values of a single feature over all records.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric values.
    Numeric(Vec<f64>),
    /// Categorical values, stored as codes into `levels`.
    Categorical {
        /// The declared levels.
        levels: Vec<String>,
        /// `codes[i]` is the level index of the `i`-th record.
        codes: Vec<usize>,
    },
}


impl Column {
    /// Build a categorical column from raw values.
    /// Every value must be one of `levels`.
    pub fn categorical<L, V>(feature: &str, levels: L, values: V)
        -> Result<Self>
        where L: IntoIterator,
              L::Item: ToString,
              V: IntoIterator,
              V::Item: AsRef<str>,
    {
        let levels = levels.into_iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>();
        let index = levels.iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect::<HashMap<_, _>>();

        let codes = values.into_iter()
            .map(|v| {
                let v = v.as_ref();
                index.get(v)
                    .copied()
                    .ok_or_else(|| SegmentError::UnknownLevel {
                        feature: feature.to_string(),
                        value: v.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::Categorical { levels, codes })
    }


    /// Returns the kind of this column.
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Numeric(_) => FeatureKind::Numeric,
            Self::Categorical { .. } => FeatureKind::Categorical,
        }
    }


    /// Returns the number of records.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Categorical { codes, .. } => codes.len(),
        }
    }


    /// Returns `true` if the column has no record.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /// Returns the value at `row`.
    pub fn value(&self, row: usize) -> Value<'_> {
        match self {
            Self::Numeric(values) => Value::Numeric(values[row]),
            Self::Categorical { levels, codes } => {
                Value::Categorical(&levels[codes[row]])
            },
        }
    }


    /// Returns the value at `row` as a number.
    /// Categorical values are returned as their level index.
    #[inline]
    pub fn as_f64(&self, row: usize) -> f64 {
        match self {
            Self::Numeric(values) => values[row],
            Self::Categorical { codes, .. } => codes[row] as f64,
        }
    }


    /// Returns the declared levels, or `None` for numeric columns.
    pub fn levels(&self) -> Option<&[String]> {
        match self {
            Self::Numeric(_) => None,
            Self::Categorical { levels, .. } => Some(&levels[..]),
        }
    }


    /// Returns the number of distinct values that actually occur.
    pub fn distinct_value_count(&self) -> usize {
        match self {
            Self::Numeric(values) => {
                let mut values = values.clone();
                values.sort_by(|a, b| a.total_cmp(b));
                values.dedup();
                values.len()
            },
            Self::Categorical { levels, codes } => {
                let mut seen = vec![false; levels.len()];
                codes.iter().for_each(|&c| { seen[c] = true; });
                seen.into_iter().filter(|&s| s).count()
            },
        }
    }


    /// Returns the column restricted to `rows`, in the given order.
    pub(crate) fn subset(&self, rows: &[usize]) -> Self {
        match self {
            Self::Numeric(values) => {
                Self::Numeric(rows.iter().map(|&i| values[i]).collect())
            },
            Self::Categorical { levels, codes } => {
                Self::Categorical {
                    levels: levels.clone(),
                    codes: rows.iter().map(|&i| codes[i]).collect(),
                }
            },
        }
    }
}


/// A single feature value of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// Numeric value.
    Numeric(f64),
    /// Categorical level.
    Categorical(&'a str),
}


impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(x) => write!(f, "{x}"),
            Self::Categorical(level) => write!(f, "{level}"),
        }
    }
}


/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub(crate) name: String,
    pub(crate) column: Column,
}


impl Feature {
    /// Construct a numeric feature.
    pub fn numeric<S: ToString>(name: S, values: Vec<f64>) -> Self {
        Self { name: name.to_string(), column: Column::Numeric(values) }
    }


    /// Construct a categorical feature from raw values.
    /// See [`Column::categorical`].
    pub fn categorical<S, L, V>(name: S, levels: L, values: V)
        -> Result<Self>
        where S: ToString,
              L: IntoIterator,
              L::Item: ToString,
              V: IntoIterator,
              V::Item: AsRef<str>,
    {
        let name = name.to_string();
        let column = Column::categorical(&name, levels, values)?;
        Ok(Self { name, column })
    }


    /// Construct a feature from a column.
    pub fn new<S: ToString>(name: S, column: Column) -> Self {
        Self { name: name.to_string(), column }
    }


    /// Returns the feature name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }


    /// Returns the column.
    #[inline]
    pub fn column(&self) -> &Column {
        &self.column
    }


    /// Returns the declaration of this feature.
    pub fn spec(&self) -> FeatureSpec {
        FeatureSpec { name: self.name.clone(), kind: self.column.kind() }
    }
}
