//! Length normalization of raw count data

mod counts;

pub use counts::{rpkm, tpm};

/// Supported length-normalized units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationMethod {
    Rpkm,
    Tpm,
}

impl std::str::FromStr for NormalizationMethod {
    type Err = crate::error::SpecificityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rpkm" | "fpkm" => Ok(NormalizationMethod::Rpkm),
            "tpm" => Ok(NormalizationMethod::Tpm),
            other => Err(crate::error::SpecificityError::InvalidParameter {
                reason: format!("Unknown normalization method '{}'. Use: rpkm or tpm", other),
            }),
        }
    }
}

/// Apply a normalization method to a genes x samples count matrix
pub fn normalize(
    counts: ndarray::ArrayView2<f64>,
    gene_lengths: &[f64],
    method: NormalizationMethod,
) -> crate::error::Result<ndarray::Array2<f64>> {
    match method {
        NormalizationMethod::Rpkm => rpkm(counts, gene_lengths),
        NormalizationMethod::Tpm => tpm(counts, gene_lengths),
    }
}
