//! Result tables produced by the specificity engine

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecificityError, SpecificityWarning};

fn check_dims(n_rows: usize, n_cols: usize, gene_ids: &[String], groups: &[String]) -> Result<()> {
    if gene_ids.len() != n_rows {
        return Err(SpecificityError::DimensionMismatch {
            expected: format!("{} gene IDs", n_rows),
            got: format!("{} gene IDs", gene_ids.len()),
        });
    }
    if groups.len() != n_cols {
        return Err(SpecificityError::DimensionMismatch {
            expected: format!("{} groups", n_cols),
            got: format!("{} groups", groups.len()),
        });
    }
    Ok(())
}

/// Per-gene mean expression within each group (genes x groups)
#[derive(Debug, Clone)]
pub struct GroupMeans {
    gene_ids: Vec<String>,
    groups: Vec<String>,
    means: Array2<f64>,
}

impl GroupMeans {
    pub fn new(gene_ids: Vec<String>, groups: Vec<String>, means: Array2<f64>) -> Result<Self> {
        check_dims(means.nrows(), means.ncols(), &gene_ids, &groups)?;
        Ok(Self {
            gene_ids,
            groups,
            means,
        })
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn means(&self) -> ArrayView2<'_, f64> {
        self.means.view()
    }

    pub fn n_genes(&self) -> usize {
        self.means.nrows()
    }

    pub fn n_groups(&self) -> usize {
        self.means.ncols()
    }

    /// Mean of one gene in one group, looked up by name
    pub fn mean(&self, gene_id: &str, group: &str) -> Option<f64> {
        let i = self.gene_ids.iter().position(|g| g == gene_id)?;
        let j = self.groups.iter().position(|g| g == group)?;
        Some(self.means[[i, j]])
    }
}

/// Specificity scores in [0, 1] for every gene (rows) and group (columns).
///
/// Rows follow the input gene order, columns the group order of the
/// [`SampleGroups`](crate::data::SampleGroups) the table was computed from.
#[derive(Debug, Clone)]
pub struct SpecificityTable {
    gene_ids: Vec<String>,
    groups: Vec<String>,
    scores: Array2<f64>,
    floor: f64,
    /// Number of bootstrap replicates averaged, `None` for a direct computation
    iterations: Option<usize>,
    /// Non-fatal conditions met while computing the table
    warnings: Vec<SpecificityWarning>,
}

impl SpecificityTable {
    /// Wrap a precomputed score matrix (e.g. one read back from disk)
    pub fn new(gene_ids: Vec<String>, groups: Vec<String>, scores: Array2<f64>) -> Result<Self> {
        check_dims(scores.nrows(), scores.ncols(), &gene_ids, &groups)?;
        Ok(Self {
            gene_ids,
            groups,
            scores,
            floor: 0.0,
            iterations: None,
            warnings: Vec::new(),
        })
    }

    pub(crate) fn from_parts(
        gene_ids: Vec<String>,
        groups: Vec<String>,
        scores: Array2<f64>,
        floor: f64,
        iterations: Option<usize>,
    ) -> Self {
        Self {
            gene_ids,
            groups,
            scores,
            floor,
            iterations,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn with_warnings(mut self, warnings: Vec<SpecificityWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn scores(&self) -> ArrayView2<'_, f64> {
        self.scores.view()
    }

    pub fn n_genes(&self) -> usize {
        self.scores.nrows()
    }

    pub fn n_groups(&self) -> usize {
        self.scores.ncols()
    }

    /// Expression floor applied before scoring
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Bootstrap replicate count, if the table is a resampled estimate
    pub fn iterations(&self) -> Option<usize> {
        self.iterations
    }

    /// Warnings raised by the computation, e.g. degenerate groups
    pub fn warnings(&self) -> &[SpecificityWarning] {
        &self.warnings
    }

    pub fn group_index(&self, group: &str) -> Option<usize> {
        self.groups.iter().position(|g| g == group)
    }

    pub fn gene_index(&self, gene_id: &str) -> Option<usize> {
        self.gene_ids.iter().position(|g| g == gene_id)
    }

    /// Score of one gene for one group, looked up by name
    pub fn score(&self, gene_id: &str, group: &str) -> Option<f64> {
        Some(self.scores[[self.gene_index(gene_id)?, self.group_index(group)?]])
    }

    /// Scores of every gene for one group
    pub fn group_scores(&self, group_idx: usize) -> ArrayView1<'_, f64> {
        self.scores.column(group_idx)
    }

    /// Scores of one gene for every group
    pub fn gene_scores(&self, gene_idx: usize) -> ArrayView1<'_, f64> {
        self.scores.row(gene_idx)
    }

    /// Per-group summary at a score threshold
    pub fn summary(&self, threshold: f64) -> TableSummary {
        let groups = self
            .groups
            .iter()
            .enumerate()
            .map(|(j, group)| {
                let column = self.scores.column(j);
                let specific_genes = column.iter().filter(|&&s| s >= threshold).count();
                let best = column
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.is_finite())
                    .fold(None, |best: Option<(usize, f64)>, (i, &s)| match best {
                        Some((_, b)) if b >= s => best,
                        _ => Some((i, s)),
                    });
                GroupSummary {
                    group: group.clone(),
                    specific_genes,
                    top_gene: best.map(|(i, s)| (self.gene_ids[i].clone(), s)),
                }
            })
            .collect();

        TableSummary {
            total_genes: self.n_genes(),
            threshold,
            iterations: self.iterations,
            groups,
        }
    }
}

/// Summary line for one group
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub group: String,
    /// Genes scoring at or above the threshold
    pub specific_genes: usize,
    /// Highest scoring gene and its score
    pub top_gene: Option<(String, f64)>,
}

/// Summary of a specificity table
#[derive(Debug, Clone)]
pub struct TableSummary {
    pub total_genes: usize,
    pub threshold: f64,
    pub iterations: Option<usize>,
    pub groups: Vec<GroupSummary>,
}

impl std::fmt::Display for TableSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Specificity Index Summary")?;
        writeln!(f, "=========================")?;
        writeln!(f, "Total genes: {}", self.total_genes)?;
        match self.iterations {
            Some(n) => writeln!(f, "Bootstrap replicates: {}", n)?,
            None => writeln!(f, "Bootstrap replicates: none")?,
        }
        writeln!(f, "Genes with SI >= {}:", self.threshold)?;
        for g in &self.groups {
            match &g.top_gene {
                Some((gene, score)) => writeln!(
                    f,
                    "  {}: {} (top: {} = {:.4})",
                    g.group, g.specific_genes, gene, score
                )?,
                None => writeln!(f, "  {}: {}", g.group, g.specific_genes)?,
            }
        }
        Ok(())
    }
}

/// One ranked gene in a top-N list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedGene {
    pub gene_id: String,
    pub score: f64,
}

/// Top-N list for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTopGenes {
    pub group: String,
    pub genes: Vec<RankedGene>,
}

/// Most specific genes per group, groups in table column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopGenes {
    pub n: usize,
    pub groups: Vec<GroupTopGenes>,
}

impl TopGenes {
    /// Ordered gene identifiers for a group
    pub fn gene_ids(&self, group: &str) -> Option<Vec<&str>> {
        self.groups
            .iter()
            .find(|g| g.group == group)
            .map(|g| g.genes.iter().map(|r| r.gene_id.as_str()).collect())
    }
}
