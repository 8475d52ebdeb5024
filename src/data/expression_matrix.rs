//! Expression matrix representation (genes x samples)

use std::collections::{HashMap, HashSet};

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Result, SpecificityError};

/// Deduplicate names by appending _1, _2, etc. to repeated occurrences.
///
/// A suffix already taken by another name (original or renamed) is skipped,
/// so the result is always unique.
fn deduplicate_names(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut has_duplicates = false;
    for name in &names {
        if !taken.insert(name.clone()) {
            has_duplicates = true;
        }
    }
    if !has_duplicates {
        return names;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(names.len());
    for name in names {
        let count = seen.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            result.push(name);
            continue;
        }

        let mut suffix = *count - 1;
        let mut new_name = format!("{}_{}", name, suffix);
        while taken.contains(&new_name) {
            suffix += 1;
            new_name = format!("{}_{}", name, suffix);
        }
        *count = suffix + 1;
        taken.insert(new_name.clone());
        log::warn!("Duplicate gene name '{}' renamed to '{}'", name, new_name);
        result.push(new_name);
    }
    result
}

/// Normalized expression values, rows are genes and columns are samples.
///
/// Values are expected to be length/depth normalized already (RPKM, TPM, ...).
/// Negative values are tolerated since some normalizations produce them;
/// the specificity floor clips them away.
#[derive(Debug, Clone)]
pub struct ExpressionMatrix {
    values: Array2<f64>,
    gene_ids: Vec<String>,
    sample_ids: Vec<String>,
}

impl ExpressionMatrix {
    /// Create a new expression matrix from raw data
    pub fn new(values: Array2<f64>, gene_ids: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let (n_genes, n_samples) = values.dim();

        if gene_ids.len() != n_genes {
            return Err(SpecificityError::DimensionMismatch {
                expected: format!("{} gene IDs", n_genes),
                got: format!("{} gene IDs", gene_ids.len()),
            });
        }

        if sample_ids.len() != n_samples {
            return Err(SpecificityError::DimensionMismatch {
                expected: format!("{} sample IDs", n_samples),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }

        if let Some(pos) = values.iter().position(|x| !x.is_finite()) {
            let (gene, sample) = (pos / n_samples.max(1), pos % n_samples.max(1));
            return Err(SpecificityError::InvalidMatrix {
                reason: format!(
                    "non-finite value for gene '{}' in sample '{}'",
                    gene_ids[gene], sample_ids[sample]
                ),
            });
        }

        {
            let mut seen = HashSet::new();
            for id in &sample_ids {
                if !seen.insert(id) {
                    return Err(SpecificityError::InvalidMatrix {
                        reason: format!("duplicate sample ID '{}'", id),
                    });
                }
            }
        }

        let gene_ids = deduplicate_names(gene_ids);

        Ok(Self {
            values,
            gene_ids,
            sample_ids,
        })
    }

    /// Number of genes
    pub fn n_genes(&self) -> usize {
        self.values.nrows()
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    /// Expression values as a view
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Values for a specific gene across all samples
    pub fn gene_values(&self, gene_idx: usize) -> ArrayView1<'_, f64> {
        self.values.row(gene_idx)
    }

    pub fn gene_index(&self, gene_id: &str) -> Option<usize> {
        self.gene_ids.iter().position(|id| id == gene_id)
    }

    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    /// Keep genes reaching `min_value` in at least `min_samples` samples
    pub fn filter_low_expression(&self, min_value: f64, min_samples: usize) -> Result<Self> {
        let keep_genes: Vec<usize> = (0..self.n_genes())
            .filter(|&i| {
                let above = self.values.row(i).iter().filter(|&&x| x >= min_value).count();
                above >= min_samples
            })
            .collect();

        if keep_genes.is_empty() {
            return Err(SpecificityError::EmptyData {
                reason: "No genes passed the expression filter".to_string(),
            });
        }

        log::debug!(
            "Expression filter kept {} of {} genes (min value {}, min samples {})",
            keep_genes.len(),
            self.n_genes(),
            min_value,
            min_samples
        );

        self.subset_genes(&keep_genes)
    }

    /// Subset to specific samples, in the given order
    pub fn subset_samples(&self, sample_indices: &[usize]) -> Result<Self> {
        let new_values = self.values.select(Axis(1), sample_indices);
        let new_sample_ids: Vec<String> = sample_indices
            .iter()
            .map(|&i| self.sample_ids[i].clone())
            .collect();

        Self::new(new_values, self.gene_ids.clone(), new_sample_ids)
    }

    /// Subset to specific genes, in the given order
    pub fn subset_genes(&self, gene_indices: &[usize]) -> Result<Self> {
        let new_values = self.values.select(Axis(0), gene_indices);
        let new_gene_ids: Vec<String> = gene_indices
            .iter()
            .map(|&i| self.gene_ids[i].clone())
            .collect();

        Self::new(new_values, new_gene_ids, self.sample_ids.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_matrix_creation() {
        let values = array![[10.0, 20.0, 30.0], [5.0, 15.0, 25.0]];
        let matrix = ExpressionMatrix::new(values, ids("gene", 2), ids("s", 3)).unwrap();
        assert_eq!(matrix.n_genes(), 2);
        assert_eq!(matrix.n_samples(), 3);
        assert_eq!(matrix.sample_index("s3"), Some(2));
        assert_eq!(matrix.gene_values(1).to_vec(), vec![5.0, 15.0, 25.0]);
    }

    #[test]
    fn test_non_finite_rejected() {
        let values = array![[10.0, f64::NAN], [5.0, 15.0]];
        let result = ExpressionMatrix::new(values, ids("gene", 2), ids("s", 2));
        assert!(matches!(result, Err(SpecificityError::InvalidMatrix { .. })));
    }

    #[test]
    fn test_negative_values_accepted() {
        let values = array![[-0.5, 2.0], [5.0, 15.0]];
        assert!(ExpressionMatrix::new(values, ids("gene", 2), ids("s", 2)).is_ok());
    }

    #[test]
    fn test_dimension_mismatch() {
        let values = array![[1.0, 2.0], [3.0, 4.0]];
        let result = ExpressionMatrix::new(values, ids("gene", 3), ids("s", 2));
        assert!(matches!(result, Err(SpecificityError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_duplicate_genes_renamed() {
        let values = array![[1.0], [2.0], [3.0]];
        let genes = vec!["a".to_string(), "a".to_string(), "b".to_string()];
        let matrix = ExpressionMatrix::new(values, genes, ids("s", 1)).unwrap();
        assert_eq!(matrix.gene_ids(), &["a", "a_1", "b"]);
    }

    #[test]
    fn test_renamed_gene_does_not_collide() {
        let values = array![[1.0], [2.0], [3.0], [4.0]];
        let genes: Vec<String> = ["a", "a", "a_1", "a"].iter().map(|s| s.to_string()).collect();
        let matrix = ExpressionMatrix::new(values, genes, ids("s", 1)).unwrap();
        assert_eq!(matrix.gene_ids(), &["a", "a_2", "a_1", "a_3"]);

        let unique: HashSet<&String> = matrix.gene_ids().iter().collect();
        assert_eq!(unique.len(), matrix.n_genes());
        assert_eq!(matrix.gene_index("a_1"), Some(2));
    }

    #[test]
    fn test_duplicate_samples_rejected() {
        let values = array![[1.0, 2.0]];
        let samples = vec!["s1".to_string(), "s1".to_string()];
        assert!(ExpressionMatrix::new(values, ids("gene", 1), samples).is_err());
    }

    #[test]
    fn test_filter_low_expression() {
        let values = array![[0.0, 0.0, 1.0], [5.0, 6.0, 7.0], [0.5, 2.0, 3.0]];
        let matrix = ExpressionMatrix::new(values, ids("gene", 3), ids("s", 3)).unwrap();
        let filtered = matrix.filter_low_expression(1.0, 2).unwrap();
        assert_eq!(filtered.gene_ids(), &["gene2", "gene3"]);

        assert!(matrix.filter_low_expression(100.0, 1).is_err());
    }

    #[test]
    fn test_subset_samples() {
        let values = array![[1.0, 2.0, 3.0]];
        let matrix = ExpressionMatrix::new(values, ids("gene", 1), ids("s", 3)).unwrap();
        let sub = matrix.subset_samples(&[2, 0]).unwrap();
        assert_eq!(sub.sample_ids(), &["s3", "s1"]);
        assert_eq!(sub.gene_values(0).to_vec(), vec![3.0, 1.0]);
    }
}
