//! Ranking genes by specificity

use std::cmp::Ordering;

use super::{GroupTopGenes, RankedGene, SpecificityTable, TopGenes};
use crate::error::{Result, SpecificityError};

/// Descending by score with NaN last
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Gene indices of one group ordered by descending score.
///
/// The sort is stable, so genes with equal scores keep their input order.
pub fn rank_genes(table: &SpecificityTable, group_idx: usize) -> Vec<usize> {
    let scores = table.group_scores(group_idx);
    let mut order: Vec<usize> = (0..table.n_genes()).collect();
    order.sort_by(|&a, &b| descending(scores[a], scores[b]));
    order
}

/// The `n` most specific genes of every group.
///
/// Groups come out in table column order; each list holds at most `n` genes
/// (all genes if the table has fewer). `n == 0` is rejected.
pub fn top_n_genes_per_group(table: &SpecificityTable, n: usize) -> Result<TopGenes> {
    if n == 0 {
        return Err(SpecificityError::InvalidParameter {
            reason: "number of top genes must be at least 1".to_string(),
        });
    }

    let groups = table
        .groups()
        .iter()
        .enumerate()
        .map(|(j, group)| {
            let scores = table.group_scores(j);
            let genes = rank_genes(table, j)
                .into_iter()
                .take(n)
                .map(|i| RankedGene {
                    gene_id: table.gene_ids()[i].clone(),
                    score: scores[i],
                })
                .collect();
            GroupTopGenes {
                group: group.clone(),
                genes,
            }
        })
        .collect();

    Ok(TopGenes { n, groups })
}
