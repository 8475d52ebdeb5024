//! Specificity index of every gene for every group

use ndarray::{Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;

use super::{GroupMeans, SpecificityTable};
use crate::error::{Result, SpecificityError};

pub(crate) fn validate_floor(floor: f64) -> Result<()> {
    if !floor.is_finite() || floor < 0.0 {
        return Err(SpecificityError::InvalidParameter {
            reason: format!("floor must be a finite value >= 0, got {}", floor),
        });
    }
    Ok(())
}

pub(crate) fn validate_group_count(n_groups: usize) -> Result<()> {
    if n_groups < 2 {
        return Err(SpecificityError::InvalidGrouping {
            reason: format!(
                "specificity needs at least two groups to compare, got {}",
                n_groups
            ),
        });
    }
    Ok(())
}

/// Scores of one gene across all groups, written into `out`.
///
/// `scratch` holds the floored means and must have the same length as `row`.
fn score_gene(row: ArrayView1<f64>, floor: f64, scratch: &mut [f64], out: &mut [f64]) {
    for (c, &v) in scratch.iter_mut().zip(row.iter()) {
        *c = v.max(floor);
    }

    let n_others = (scratch.len() - 1) as f64;
    for (g, score) in out.iter_mut().enumerate() {
        let expr_g = scratch[g];
        if expr_g > 0.0 {
            let raw: f64 = scratch
                .iter()
                .enumerate()
                .filter(|&(o, _)| o != g)
                .map(|(_, &expr_o)| 1.0 - expr_o / expr_g)
                .sum();
            *score = (raw / n_others).clamp(0.0, 1.0);
        } else {
            // not expressed in this group, so not specific to it
            *score = 0.0;
        }
    }
}

/// Score a genes x groups mean matrix on the current thread
pub(crate) fn score_matrix(means: ArrayView2<f64>, floor: f64) -> Array2<f64> {
    let (n_genes, n_groups) = means.dim();
    let mut scores = Array2::zeros((n_genes, n_groups));
    let mut scratch = vec![0.0; n_groups];
    let mut out = vec![0.0; n_groups];

    for i in 0..n_genes {
        score_gene(means.row(i), floor, &mut scratch, &mut out);
        for (j, &s) in out.iter().enumerate() {
            scores[[i, j]] = s;
        }
    }

    scores
}

/// Score a genes x groups mean matrix with genes spread over the rayon pool
fn score_matrix_par(means: ArrayView2<f64>, floor: f64) -> Array2<f64> {
    let (n_genes, n_groups) = means.dim();

    let rows: Vec<Vec<f64>> = (0..n_genes)
        .into_par_iter()
        .map(|i| {
            let mut scratch = vec![0.0; n_groups];
            let mut out = vec![0.0; n_groups];
            score_gene(means.row(i), floor, &mut scratch, &mut out);
            out
        })
        .collect();

    let mut scores = Array2::zeros((n_genes, n_groups));
    for (i, row) in rows.into_iter().enumerate() {
        for (j, s) in row.into_iter().enumerate() {
            scores[[i, j]] = s;
        }
    }
    scores
}

/// Specificity index of every gene for every group.
///
/// Each group mean is first raised to `floor`. With `n` groups, the score of
/// gene `x` for group `g` is
///
/// ```text
/// SI(x, g) = sum_{o != g} (1 - expr(o) / expr(g)) / (n - 1)
/// ```
///
/// clipped into [0, 1], and 0 when `expr(g) == 0`. A score of 1 means the gene
/// is expressed in `g` only; near 0 means uniform or no expression.
pub fn specificity_index(group_means: &GroupMeans, floor: f64) -> Result<SpecificityTable> {
    validate_floor(floor)?;
    validate_group_count(group_means.n_groups())?;

    let scores = score_matrix_par(group_means.means(), floor);

    Ok(SpecificityTable::from_parts(
        group_means.gene_ids().to_vec(),
        group_means.groups().to_vec(),
        scores,
        floor,
        None,
    ))
}
