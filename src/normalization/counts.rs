//! Length-normalized expression units
//!
//! RPKM (Reads Per Kilobase per Million mapped reads) and TPM (Transcripts
//! Per Million) from raw counts and gene lengths.

use ndarray::{Array2, ArrayView2, Axis};

use crate::error::{Result, SpecificityError};

fn check_lengths(n_genes: usize, gene_lengths: &[f64]) -> Result<()> {
    if gene_lengths.len() != n_genes {
        return Err(SpecificityError::InvalidInput {
            reason: format!(
                "Gene lengths count ({}) doesn't match gene count ({})",
                gene_lengths.len(),
                n_genes
            ),
        });
    }
    if let Some(&bad) = gene_lengths.iter().find(|&&l| !(l > 0.0) || !l.is_finite()) {
        return Err(SpecificityError::InvalidInput {
            reason: format!("Gene lengths must be positive, got {}", bad),
        });
    }
    Ok(())
}

/// Reads Per Kilobase per Million mapped reads.
///
/// `RPKM = count * 1e9 / (library_size * length_bp)`, with the library size
/// being the column sum. Samples without reads come out as all zeros.
pub fn rpkm(counts: ArrayView2<f64>, gene_lengths: &[f64]) -> Result<Array2<f64>> {
    let (n_genes, n_samples) = counts.dim();
    check_lengths(n_genes, gene_lengths)?;

    let library_sizes: Vec<f64> = counts.axis_iter(Axis(1)).map(|col| col.sum()).collect();

    let mut result = Array2::zeros((n_genes, n_samples));
    for j in 0..n_samples {
        let lib_size = library_sizes[j];
        if lib_size <= 0.0 {
            log::warn!("Sample {} has no reads; its RPKM values are all zero", j);
            continue;
        }
        for i in 0..n_genes {
            result[[i, j]] = counts[[i, j]] * 1e9 / (lib_size * gene_lengths[i]);
        }
    }

    Ok(result)
}

/// Transcripts Per Million.
///
/// Counts are divided by gene length in kilobases, then each sample is
/// rescaled so its values sum to one million.
pub fn tpm(counts: ArrayView2<f64>, gene_lengths: &[f64]) -> Result<Array2<f64>> {
    let (n_genes, n_samples) = counts.dim();
    check_lengths(n_genes, gene_lengths)?;

    let mut result = counts.to_owned();
    for i in 0..n_genes {
        let length_kb = gene_lengths[i] / 1000.0;
        result.row_mut(i).mapv_inplace(|v| v / length_kb);
    }

    for j in 0..n_samples {
        let total: f64 = result.column(j).sum();
        if total <= 0.0 {
            log::warn!("Sample {} has no reads; its TPM values are all zero", j);
            result.column_mut(j).fill(0.0);
            continue;
        }
        result.column_mut(j).mapv_inplace(|v| v * 1e6 / total);
    }

    Ok(result)
}
