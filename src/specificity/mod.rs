//! Specificity Index engine
//!
//! Group means, the specificity index, its bootstrap-resampled estimate and
//! per-group gene ranking.

mod bootstrap;
mod index;
mod means;
mod ranking;
mod table;

pub use bootstrap::{resample_group_columns, specificity_index_with_resampling, DEFAULT_ITERATIONS};
pub use index::specificity_index;
pub use means::{compute_group_means, group_means_from_columns};
pub use ranking::{rank_genes, top_n_genes_per_group};
pub use table::{GroupMeans, GroupSummary, GroupTopGenes, RankedGene, SpecificityTable, TableSummary, TopGenes};

/// Configurable parameters for a specificity run.
#[derive(Debug, Clone)]
pub struct SpecificityParams {
    /// Group means below this value are raised to it before scoring
    pub floor: f64,
    /// Average over within-group bootstrap replicates instead of scoring once
    pub bootstrap: bool,
    /// Number of bootstrap replicates
    pub iterations: usize,
    /// Seed for the bootstrap generator
    pub seed: u32,
}

impl Default for SpecificityParams {
    fn default() -> Self {
        Self {
            floor: 0.0,
            bootstrap: false,
            iterations: DEFAULT_ITERATIONS,
            seed: 1,
        }
    }
}
