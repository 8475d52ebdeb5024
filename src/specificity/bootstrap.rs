//! Bootstrap-resampled specificity index
//!
//! Samples are redrawn with replacement within each group, group means and
//! scores are recomputed per replicate, and the replicate score tables are
//! averaged element-wise.
//!
//! One distinct child seed per replicate is drawn from the caller's generator
//! before any work starts, so every replicate owns its own stream. Replicates
//! run on the rayon pool in fixed-size chunks whose partial sums are reduced
//! in chunk order; the result therefore depends only on the seed and the
//! inputs, not on the number of threads.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use super::index::{score_matrix, validate_floor, validate_group_count};
use super::means::group_means_from_columns;
use super::SpecificityTable;
use crate::data::{ExpressionMatrix, SampleGroups};
use crate::error::{Result, SpecificityError};
use crate::rng::RMersenneTwister;

/// Replicates accumulated sequentially per parallel task
const REPLICATES_PER_CHUNK: usize = 16;

/// Default number of bootstrap replicates
pub const DEFAULT_ITERATIONS: usize = 1000;

/// Redraw, with replacement, as many columns as each group has from that
/// group's own columns
pub fn resample_group_columns(columns: &[Vec<usize>], rng: &mut RMersenneTwister) -> Vec<Vec<usize>> {
    columns
        .iter()
        .map(|cols| {
            rng.sample_with_replacement(cols.len(), cols.len())
                .into_iter()
                .map(|k| cols[k])
                .collect()
        })
        .collect()
}

/// Scores of a single bootstrap replicate
fn bootstrap_replicate(
    values: ArrayView2<f64>,
    columns: &[Vec<usize>],
    floor: f64,
    rng: &mut RMersenneTwister,
) -> Array2<f64> {
    let resampled = resample_group_columns(columns, rng);
    let means = group_means_from_columns(values, &resampled);
    score_matrix(means.view(), floor)
}

/// Specificity index averaged over `iterations` within-group bootstrap replicates.
///
/// Fails with `InvalidParameter` for `iterations < 1` or a negative floor and
/// with `InvalidGrouping` when `groups` does not cover exactly the matrix
/// columns. Single-sample groups are logged as degenerate and resample to
/// themselves.
pub fn specificity_index_with_resampling(
    matrix: &ExpressionMatrix,
    groups: &SampleGroups,
    floor: f64,
    iterations: usize,
    rng: &mut RMersenneTwister,
) -> Result<SpecificityTable> {
    if iterations < 1 {
        return Err(SpecificityError::InvalidParameter {
            reason: "bootstrap iterations must be at least 1".to_string(),
        });
    }
    validate_floor(floor)?;
    validate_group_count(groups.n_groups())?;

    let columns = groups.resolve_columns(matrix.sample_ids())?;
    let warnings = groups.warnings();
    for warning in &warnings {
        log::warn!("{}", warning);
    }

    let seeds = rng.distinct_seeds(iterations);
    let values = matrix.values();
    let shape = (matrix.n_genes(), groups.n_groups());

    log::info!(
        "Bootstrapping specificity index: {} replicates, {} genes, {} groups",
        iterations,
        shape.0,
        shape.1
    );

    let partial_sums: Vec<Array2<f64>> = seeds
        .par_chunks(REPLICATES_PER_CHUNK)
        .map(|chunk| {
            let mut acc: Array2<f64> = Array2::zeros(shape);
            for &seed in chunk {
                let mut replicate_rng = RMersenneTwister::new(seed);
                acc += &bootstrap_replicate(values, &columns, floor, &mut replicate_rng);
            }
            acc
        })
        .collect();

    let mut total: Array2<f64> = Array2::zeros(shape);
    for partial in &partial_sums {
        total += partial;
    }
    total /= iterations as f64;

    Ok(SpecificityTable::from_parts(
        matrix.gene_ids().to_vec(),
        groups.groups().to_vec(),
        total,
        floor,
        Some(iterations),
    )
    .with_warnings(warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpecificityWarning;
    use crate::specificity::{compute_group_means, specificity_index, GroupMeans};
    use ndarray::array;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn cell_type_data() -> (ExpressionMatrix, SampleGroups) {
        let matrix = ExpressionMatrix::new(
            array![
                [12.0, 9.0, 15.0, 0.5, 0.0, 1.0, 0.0],
                [3.0, 4.0, 2.0, 3.5, 4.5, 2.5, 3.0],
                [0.0, 0.0, 0.2, 8.0, 7.0, 9.5, 0.1],
                [1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 7.0],
            ],
            strings(&["Calb1", "Actb", "Gabra6", "Pvalb"]),
            strings(&["p1", "p2", "p3", "g1", "g2", "g3", "b1"]),
        )
        .unwrap();
        let groups = SampleGroups::from_labels(
            matrix.sample_ids(),
            &strings(&["purkinje", "purkinje", "purkinje", "granule", "granule", "granule", "basket"]),
        )
        .unwrap();
        (matrix, groups)
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let (matrix, groups) = cell_type_data();
        let mut rng = RMersenneTwister::new(1);
        let result = specificity_index_with_resampling(&matrix, &groups, 0.0, 0, &mut rng);
        assert!(matches!(result, Err(SpecificityError::InvalidParameter { .. })));
    }

    #[test]
    fn test_negative_floor_rejected() {
        let (matrix, groups) = cell_type_data();
        let mut rng = RMersenneTwister::new(1);
        let result = specificity_index_with_resampling(&matrix, &groups, -1.0, 10, &mut rng);
        assert!(matches!(result, Err(SpecificityError::InvalidParameter { .. })));
    }

    #[test]
    fn test_same_seed_identical_output() {
        let (matrix, groups) = cell_type_data();
        let a = specificity_index_with_resampling(&matrix, &groups, 0.0, 100, &mut RMersenneTwister::new(2024)).unwrap();
        let b = specificity_index_with_resampling(&matrix, &groups, 0.0, 100, &mut RMersenneTwister::new(2024)).unwrap();
        assert_eq!(a.scores(), b.scores());
        assert_eq!(a.iterations(), Some(100));
    }

    #[test]
    fn test_independent_of_thread_count() {
        let (matrix, groups) = cell_type_data();
        let run = |threads: usize| {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
            pool.install(|| {
                specificity_index_with_resampling(&matrix, &groups, 0.0, 75, &mut RMersenneTwister::new(9))
                    .unwrap()
                    .scores()
                    .to_owned()
            })
        };
        assert_eq!(run(1), run(4));
    }

    #[test]
    fn test_single_iteration_is_one_resampled_index() {
        let (matrix, groups) = cell_type_data();
        let seed = 77;

        let table = specificity_index_with_resampling(&matrix, &groups, 0.0, 1, &mut RMersenneTwister::new(seed)).unwrap();

        // Rebuild the one replicate by hand from the first child stream
        let mut child = RMersenneTwister::new(seed).split();
        let columns = groups.resolve_columns(matrix.sample_ids()).unwrap();
        let resampled = resample_group_columns(&columns, &mut child);
        let means = GroupMeans::new(
            matrix.gene_ids().to_vec(),
            groups.groups().to_vec(),
            group_means_from_columns(matrix.values(), &resampled),
        )
        .unwrap();
        let expected = specificity_index(&means, 0.0).unwrap();

        assert_eq!(table.scores(), expected.scores());
    }

    #[test]
    fn test_resampling_stays_within_groups() {
        let columns = vec![vec![0, 1, 2], vec![3, 4], vec![5]];
        let mut rng = RMersenneTwister::new(5);
        for _ in 0..50 {
            let resampled = resample_group_columns(&columns, &mut rng);
            for (orig, drawn) in columns.iter().zip(resampled.iter()) {
                assert_eq!(orig.len(), drawn.len());
                assert!(drawn.iter().all(|c| orig.contains(c)));
            }
        }
    }

    #[test]
    fn test_single_sample_groups_match_direct() {
        // Every group has one sample, so every replicate equals the data
        let matrix = ExpressionMatrix::new(
            array![[7.0, 1.0, 0.0], [2.0, 2.0, 3.0]],
            strings(&["gene1", "gene2"]),
            strings(&["a1", "b1", "c1"]),
        )
        .unwrap();
        let groups = SampleGroups::from_labels(matrix.sample_ids(), &strings(&["A", "B", "C"])).unwrap();

        let direct = specificity_index(&compute_group_means(&matrix, &groups).unwrap(), 0.0).unwrap();
        let boot = specificity_index_with_resampling(&matrix, &groups, 0.0, 100, &mut RMersenneTwister::new(3)).unwrap();

        for (d, b) in direct.scores().iter().zip(boot.scores().iter()) {
            assert!((d - b).abs() < 1e-12, "direct {} vs bootstrap {}", d, b);
        }
    }

    #[test]
    fn test_degenerate_group_contribution_is_fixed() {
        // Group C has one sample with value 7 and a specific gene; other
        // groups are constant so resampling cannot move any score.
        let matrix = ExpressionMatrix::new(
            array![[0.0, 0.0, 0.0, 0.0, 7.0], [5.0, 5.0, 5.0, 5.0, 7.0]],
            strings(&["geneC", "gene2"]),
            strings(&["a1", "a2", "b1", "b2", "c1"]),
        )
        .unwrap();
        let groups = SampleGroups::from_labels(matrix.sample_ids(), &strings(&["A", "A", "B", "B", "C"])).unwrap();
        assert_eq!(groups.degenerate_groups(), vec!["C"]);

        let direct = specificity_index(&compute_group_means(&matrix, &groups).unwrap(), 0.0).unwrap();
        let boot = specificity_index_with_resampling(&matrix, &groups, 0.0, 100, &mut RMersenneTwister::new(11)).unwrap();

        assert_eq!(
            boot.warnings(),
            &[SpecificityWarning::DegenerateGroup {
                group: "C".to_string(),
                sample: "c1".to_string(),
            }]
        );
        assert!(direct.warnings().is_empty());
        assert_eq!(boot.score("geneC", "C"), Some(1.0));
        let d = direct.score("gene2", "C").unwrap();
        let b = boot.score("gene2", "C").unwrap();
        assert!((d - b).abs() < 1e-12);
    }

    #[test]
    fn test_bootstrap_scores_within_unit_interval() {
        let (matrix, groups) = cell_type_data();
        let table = specificity_index_with_resampling(&matrix, &groups, 0.0, 200, &mut RMersenneTwister::new(123)).unwrap();
        assert!(table.scores().iter().all(|&s| (0.0..=1.0).contains(&s)));
        // Gabra6 is granule-specific in every replicate up to small noise
        assert!(table.score("Gabra6", "granule").unwrap() > 0.9);
        assert_eq!(table.groups(), &["purkinje", "granule", "basket"]);
    }
}
