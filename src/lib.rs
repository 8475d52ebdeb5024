//! rust_specificity: cell-type specificity index for gene expression
//!
//! Scores how selectively each gene is expressed in each group of samples
//! (cell type, tissue, species, ...) relative to all other groups, optionally
//! stabilised by bootstrap resampling within groups, and ranks the most
//! specific genes per group.
//!
//! # Example
//!
//! ```ignore
//! use rust_specificity::prelude::*;
//!
//! let matrix = read_expression_matrix("rpkm.tsv")?;
//! let metadata = read_metadata("samples.tsv")?;
//! let groups = metadata.to_sample_groups("cell_type")?;
//!
//! let mut rng = RMersenneTwister::new(1);
//! let table = specificity_index_with_resampling(&matrix, &groups, 0.0, 1000, &mut rng)?;
//! let top = top_n_genes_per_group(&table, 20)?;
//! ```

pub mod cli;
pub mod data;
pub mod error;
pub mod io;
pub mod normalization;
pub mod rng;
pub mod specificity;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data::{ExpressionMatrix, SampleGroups, SampleMetadata};
    pub use crate::error::{Result, SpecificityError, SpecificityWarning};
    pub use crate::io::{
        read_expression_matrix, read_metadata, read_specificity_table, write_specificity_table, write_top_genes,
        SpecificityReport,
    };
    pub use crate::normalization::{rpkm, tpm, NormalizationMethod};
    pub use crate::rng::RMersenneTwister;
    pub use crate::specificity::{
        compute_group_means, specificity_index, specificity_index_with_resampling, top_n_genes_per_group,
        GroupMeans, SpecificityParams, SpecificityTable, TopGenes,
    };
}

use prelude::*;

/// Compute the specificity table for a matrix and grouping.
///
/// Scores group means directly, or averages `params.iterations` bootstrap
/// replicates seeded from `params.seed` when `params.bootstrap` is set.
pub fn run_specificity(
    matrix: &ExpressionMatrix,
    groups: &SampleGroups,
    params: &SpecificityParams,
) -> Result<SpecificityTable> {
    log::info!(
        "Scoring {} genes across {} groups: {}",
        matrix.n_genes(),
        groups.n_groups(),
        groups.groups().join(", ")
    );

    if params.bootstrap {
        let mut rng = RMersenneTwister::new(params.seed);
        specificity_index_with_resampling(matrix, groups, params.floor, params.iterations, &mut rng)
    } else {
        let warnings = groups.warnings();
        for warning in &warnings {
            log::warn!("{}", warning);
        }
        let means = compute_group_means(matrix, groups)?;
        Ok(specificity_index(&means, params.floor)?.with_warnings(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn cerebellum() -> (ExpressionMatrix, SampleMetadata) {
        let matrix = ExpressionMatrix::new(
            array![
                [0.1, 0.0, 0.3, 45.0, 52.0, 38.0, 0.2, 0.0],   // Gabra6: granule
                [30.0, 41.0, 25.0, 0.5, 0.0, 1.0, 0.0, 0.3],   // Pcp2: purkinje
                [2.0, 1.0, 3.0, 0.0, 1.0, 0.0, 22.0, 18.0],    // Pvalb-like: basket
                [50.0, 48.0, 55.0, 51.0, 49.0, 52.0, 50.0, 47.0], // Actb: housekeeping
                [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],      // silent
            ],
            strings(&["Gabra6", "Pcp2", "Pvalb", "Actb", "Silent"]),
            strings(&["pc1", "pc2", "pc3", "gc1", "gc2", "gc3", "bc1", "bc2"]),
        )
        .unwrap();

        let mut metadata = SampleMetadata::new(matrix.sample_ids().to_vec());
        metadata
            .add_condition(
                "cell_type",
                strings(&["purkinje", "purkinje", "purkinje", "granule", "granule", "granule", "basket", "basket"]),
            )
            .unwrap();
        (matrix, metadata)
    }

    #[test]
    fn test_full_pipeline() {
        let (matrix, metadata) = cerebellum();
        let groups = metadata.to_sample_groups("cell_type").unwrap();

        let params = SpecificityParams {
            bootstrap: true,
            iterations: 200,
            seed: 2019,
            ..Default::default()
        };
        let table = run_specificity(&matrix, &groups, &params).unwrap();

        assert_eq!(table.groups(), &["purkinje", "granule", "basket"]);
        assert_eq!(table.iterations(), Some(200));
        assert!(table.scores().iter().all(|&s| (0.0..=1.0).contains(&s)));

        let top = top_n_genes_per_group(&table, 1).unwrap();
        assert_eq!(top.gene_ids("purkinje").unwrap(), vec!["Pcp2"]);
        assert_eq!(top.gene_ids("granule").unwrap(), vec!["Gabra6"]);
        assert_eq!(top.gene_ids("basket").unwrap(), vec!["Pvalb"]);

        assert!(table.score("Actb", "granule").unwrap() < 0.1);
        assert_eq!(table.score("Silent", "basket"), Some(0.0));

        println!("{}", table.summary(0.5));
    }

    #[test]
    fn test_direct_and_bootstrap_agree_on_ranking() {
        let (matrix, metadata) = cerebellum();
        let groups = metadata.to_sample_groups("cell_type").unwrap();

        let direct = run_specificity(&matrix, &groups, &SpecificityParams::default()).unwrap();
        assert_eq!(direct.iterations(), None);

        let boot = run_specificity(
            &matrix,
            &groups,
            &SpecificityParams {
                bootstrap: true,
                iterations: 100,
                ..Default::default()
            },
        )
        .unwrap();

        let top_direct = top_n_genes_per_group(&direct, 2).unwrap();
        let top_boot = top_n_genes_per_group(&boot, 2).unwrap();
        for group in direct.groups() {
            assert_eq!(top_direct.gene_ids(group).unwrap()[0], top_boot.gene_ids(group).unwrap()[0]);
        }
    }

    #[test]
    fn test_degenerate_group_reported_on_both_paths() {
        let (matrix, _) = cerebellum();
        let labels = strings(&["purkinje", "purkinje", "purkinje", "granule", "granule", "granule", "basket", "glia"]);
        let groups = SampleGroups::from_labels(matrix.sample_ids(), &labels).unwrap();
        let expected = vec![
            SpecificityWarning::DegenerateGroup {
                group: "basket".to_string(),
                sample: "bc1".to_string(),
            },
            SpecificityWarning::DegenerateGroup {
                group: "glia".to_string(),
                sample: "bc2".to_string(),
            },
        ];

        let direct = run_specificity(&matrix, &groups, &SpecificityParams::default()).unwrap();
        assert_eq!(direct.warnings(), expected.as_slice());

        let params = SpecificityParams {
            bootstrap: true,
            iterations: 20,
            ..Default::default()
        };
        let boot = run_specificity(&matrix, &groups, &params).unwrap();
        assert_eq!(boot.warnings(), expected.as_slice());
    }

    #[test]
    fn test_concrete_two_group_scenario() {
        let matrix = ExpressionMatrix::new(
            array![[10.0, 10.0, 0.0, 0.0], [5.0, 5.0, 5.0, 5.0]],
            strings(&["gene1", "gene2"]),
            strings(&["s1", "s2", "s3", "s4"]),
        )
        .unwrap();
        let groups = SampleGroups::from_labels(matrix.sample_ids(), &strings(&["A", "A", "B", "B"])).unwrap();

        let means = compute_group_means(&matrix, &groups).unwrap();
        assert_eq!(means.means(), array![[10.0, 0.0], [5.0, 5.0]]);

        let table = specificity_index(&means, 0.0).unwrap();
        assert_eq!(table.scores(), array![[1.0, 0.0], [0.0, 0.0]]);
    }
}
