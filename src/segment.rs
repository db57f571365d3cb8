//! Segment identifiers and per-record segment assignments.
use serde::{Serialize, Deserialize};

use std::fmt;
use std::ops::Index;

use crate::{Result, SegmentError};


/// Identifier of a segment.
/// Segment ids start from `1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SegmentId(pub usize);


impl From<usize> for SegmentId {
    #[inline]
    fn from(id: usize) -> Self {
        Self(id)
    }
}


impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


/// The method that produced a [`SegmentAssignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMethod {
    /// Leaves of a pruned decision tree.
    Tree,
    /// Clusters of k-means.
    Cluster,
}


impl SegmentMethod {
    /// Column name used for this method in the annotated tables.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Tree => "tree_segment",
            Self::Cluster => "cluster_segment",
        }
    }
}


impl fmt::Display for SegmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tree => "Decision tree",
            Self::Cluster => "K-means",
        };
        write!(f, "{name}")
    }
}


/// A mapping from record position to segment id.
///
/// Tree-based and cluster-based assignments of the same dataset
/// live side by side and never share an id space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentAssignment {
    method: SegmentMethod,
    ids: Vec<SegmentId>,
    n_segments: usize,
}


impl SegmentAssignment {
    /// Construct a new assignment.
    /// Every id must lie in `1..=n_segments`.
    pub fn new(
        method: SegmentMethod,
        ids: Vec<SegmentId>,
        n_segments: usize,
    ) -> Result<Self>
    {
        if let Some(bad) = ids.iter().find(|id| id.0 == 0 || id.0 > n_segments) {
            return Err(SegmentError::InvalidParameter(format!(
                "segment id {bad} is outside 1..={n_segments}"
            )));
        }
        Ok(Self { method, ids, n_segments })
    }


    /// Returns the method that produced this assignment.
    #[inline]
    pub fn method(&self) -> SegmentMethod {
        self.method
    }


    /// Returns the number of segments.
    #[inline]
    pub fn n_segments(&self) -> usize {
        self.n_segments
    }


    /// Returns the segment ids `1..=n_segments`.
    pub fn segments(&self) -> impl Iterator<Item = SegmentId> {
        (1..=self.n_segments).map(SegmentId)
    }


    /// Returns the number of assigned records.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }


    /// Returns `true` if no record is assigned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }


    /// Returns the per-record ids.
    #[inline]
    pub fn ids(&self) -> &[SegmentId] {
        &self.ids[..]
    }


    /// Returns the number of records in each segment.
    /// The `i`-th entry is the size of segment `i + 1`.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0_usize; self.n_segments];
        for id in &self.ids {
            sizes[id.0 - 1] += 1;
        }
        sizes
    }


    /// Returns the row indices of the records in `segment`.
    pub fn rows_of(&self, segment: SegmentId) -> Vec<usize> {
        self.ids.iter()
            .enumerate()
            .filter_map(|(i, id)| (*id == segment).then_some(i))
            .collect()
    }


    /// Returns the assignment restricted to the given rows,
    /// keeping the segment id space.
    pub fn subset(&self, rows: &[usize]) -> Self {
        let ids = rows.iter()
            .map(|&i| self.ids[i])
            .collect();
        Self { method: self.method, ids, n_segments: self.n_segments }
    }


    /// Check that this assignment covers exactly `n_sample` records.
    pub(crate) fn check_len(&self, n_sample: usize) -> Result<()> {
        if self.ids.len() != n_sample {
            return Err(SegmentError::LengthMismatch {
                what: "segment assignment",
                expected: n_sample,
                found: self.ids.len(),
            });
        }
        Ok(())
    }
}


impl Index<usize> for SegmentAssignment {
    type Output = SegmentId;
    #[inline]
    fn index(&self, row: usize) -> &Self::Output {
        &self.ids[row]
    }
}
