//! The complexity-parameter table of a pruning sequence.
use serde::{Serialize, Deserialize};

use std::fmt;


/// How the final row of the [`CpTable`] is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneRule {
    /// The first row (fewest splits) attaining the minimum `xerror`.
    MinXError,
    /// The first row whose `xerror` is within one `xstd`
    /// of the minimum.
    OneStandardError,
}


impl fmt::Display for PruneRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MinXError => "minimum xerror",
            Self::OneStandardError => "one standard error",
        };
        write!(f, "{name}")
    }
}


/// One candidate subtree of the pruning sequence.
///
/// Errors are relative to the misclassification count
/// of the root node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CpRow {
    /// Relative complexity parameter.
    pub cp: f64,
    /// Number of splits of the subtree.
    pub n_split: usize,
    /// Relative training error of the subtree.
    pub rel_error: f64,
    /// Relative cross-validated error.
    pub xerror: f64,
    /// Standard error of `xerror`.
    pub xstd: f64,
}


/// Rows ordered from the root alone (largest `cp`)
/// to the largest candidate subtree (smallest `cp`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpTable {
    rows: Vec<CpRow>,
    selected: usize,
}


impl CpTable {
    /// Construct a table and choose a row by `rule`.
    pub(super) fn new(rows: Vec<CpRow>, rule: PruneRule) -> Self {
        let selected = select(&rows, rule);
        Self { rows, selected }
    }


    /// Returns the rows.
    #[inline]
    pub fn rows(&self) -> &[CpRow] {
        &self.rows[..]
    }


    /// Returns the position of the chosen row.
    #[inline]
    pub fn selected_index(&self) -> usize {
        self.selected
    }


    /// Returns the chosen row.
    #[inline]
    pub fn selected(&self) -> &CpRow {
        &self.rows[self.selected]
    }
}


/// Returns the position of the row chosen by `rule`.
/// Ties are broken in favor of the earlier row, i.e., fewer splits.
fn select(rows: &[CpRow], rule: PruneRule) -> usize {
    let best = rows.iter()
        .enumerate()
        .fold(0, |best, (k, row)| {
            if row.xerror < rows[best].xerror { k } else { best }
        });

    match rule {
        PruneRule::MinXError => best,
        PruneRule::OneStandardError => {
            let bound = rows[best].xerror + rows[best].xstd;
            rows.iter()
                .position(|row| row.xerror <= bound)
                .unwrap_or(best)
        },
    }
}


impl fmt::Display for CpTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>4}  {:>10}  {:>7}  {:>9}  {:>9}  {:>9}",
            "", "CP", "nsplit", "rel error", "xerror", "xstd",
        )?;
        for (k, row) in self.rows.iter().enumerate() {
            let mark = if k == self.selected { "*" } else { " " };
            writeln!(
                f,
                "{:>3}{mark}  {:>10.6}  {:>7}  {:>9.5}  {:>9.5}  {:>9.5}",
                k + 1, row.cp, row.n_split, row.rel_error, row.xerror, row.xstd,
            )?;
        }
        Ok(())
    }
}
