//! Group-wise mean expression

use ndarray::{Array2, ArrayView2};

use super::GroupMeans;
use crate::data::{ExpressionMatrix, SampleGroups};
use crate::error::Result;

/// Mean of each gene over the given columns of each group.
///
/// `columns[g]` lists the column indices of group `g`; a column may appear
/// more than once (bootstrap draws) and then counts once per occurrence.
/// Every group must have at least one column.
pub fn group_means_from_columns(values: ArrayView2<f64>, columns: &[Vec<usize>]) -> Array2<f64> {
    let n_genes = values.nrows();
    let mut means = Array2::zeros((n_genes, columns.len()));

    for (g, cols) in columns.iter().enumerate() {
        let n = cols.len() as f64;
        for i in 0..n_genes {
            let sum: f64 = cols.iter().map(|&j| values[[i, j]]).sum();
            means[[i, g]] = sum / n;
        }
    }

    means
}

/// Arithmetic mean expression of every gene within every group.
///
/// Columns are matched to groups by sample identifier. Fails with
/// `InvalidGrouping` when the assignment and the matrix columns differ.
pub fn compute_group_means(matrix: &ExpressionMatrix, groups: &SampleGroups) -> Result<GroupMeans> {
    let columns = groups.resolve_columns(matrix.sample_ids())?;
    let means = group_means_from_columns(matrix.values(), &columns);

    log::debug!(
        "Computed group means for {} genes over {} groups ({:?} samples per group)",
        matrix.n_genes(),
        groups.n_groups(),
        groups.group_sizes()
    );

    GroupMeans::new(matrix.gene_ids().to_vec(), groups.groups().to_vec(), means)
}
