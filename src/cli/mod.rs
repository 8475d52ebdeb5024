//! Command-line interface for rust_specificity

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rust_specificity")]
#[command(version)]
#[command(about = "Cell-type specificity index of gene expression")]
#[command(disable_help_flag = true)]
#[command(disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the specificity index of every gene for every group
    #[command(
        about = "Compute the specificity index",
        long_about = "Compute the specificity index of every gene for every group.\n\n\
            Group means are taken per gene, floored, and compared across groups.\n\
            With --bootstrap, samples are redrawn with replacement within each group\n\
            and the scores of all replicates are averaged.",
        after_long_help = "\
Examples:
  # Direct computation grouped by the cell_type column
  rust_specificity si -e rpkm.tsv -m samples.tsv -g cell_type -o si.tsv

  # 1000 bootstrap replicates, top 20 genes per cell type
  rust_specificity si -e rpkm.tsv -m samples.tsv --bootstrap --iterations 1000 \\
    --seed 1 --top 20 --top-output top20.tsv

  # Group by species instead, keep the group means and a JSON report
  rust_specificity si -e rpkm.tsv -m samples.tsv -g species \\
    --means means.tsv --json si.json"
    )]
    Si {
        /// Path to expression matrix (TSV or CSV)
        #[arg(short, long,
            long_help = "Path to the expression matrix.\n\
                Format: first column = gene IDs, remaining columns = normalized expression\n\
                (RPKM/TPM) per sample. Tab or comma delimiters are auto-detected.")]
        expression: String,

        /// Path to sample metadata (TSV or CSV)
        #[arg(short, long,
            long_help = "Path to sample metadata.\n\
                Format: first column = sample IDs (matching the expression matrix columns),\n\
                remaining columns = categorical annotations such as cell type or species.")]
        metadata: String,

        /// Metadata column that defines the groups [default: cell_type]
        #[arg(short, long, default_value = "cell_type")]
        group_by: String,

        /// Expression floor applied to group means [default: 0]
        #[arg(long, default_value = "0")]
        floor: f64,

        /// Average over within-group bootstrap replicates
        #[arg(long)]
        bootstrap: bool,

        /// Number of bootstrap replicates [default: 1000]
        #[arg(long, default_value = "1000")]
        iterations: usize,

        /// Seed for bootstrap resampling [default: 1]
        #[arg(long, default_value = "1")]
        seed: u32,

        /// Drop genes below this value in too many samples (see --min-samples)
        #[arg(long, value_name = "VALUE")]
        min_expression: Option<f64>,

        /// Samples that must reach --min-expression to keep a gene [default: 1]
        #[arg(long, default_value = "1")]
        min_samples: usize,

        /// Output file path [default: specificity_index.tsv]
        #[arg(short, long, default_value = "specificity_index.tsv")]
        output: String,

        /// Also write group means to this file
        #[arg(long, value_name = "FILE")]
        means: Option<String>,

        /// Number of top genes per group to report
        #[arg(long, value_name = "N")]
        top: Option<usize>,

        /// Output path for the top genes [default: top_genes.tsv]
        #[arg(long, default_value = "top_genes.tsv")]
        top_output: String,

        /// Also write a JSON report to this file
        #[arg(long, value_name = "FILE")]
        json: Option<String>,

        /// Number of threads (0 = auto) [default: 0]
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,
    },

    /// Rank the most specific genes of an existing specificity table
    #[command(
        long_about = "Rank the most specific genes per group from a specificity table\n\
            written by `si`. Ties keep the input gene order.",
        after_long_help = "\
Examples:
  rust_specificity top -i si.tsv -n 20 -o top20.tsv
  rust_specificity top -i si.tsv -n 100 -o top100.tsv"
    )]
    Top {
        /// Path to a specificity table
        #[arg(short, long)]
        input: String,

        /// Genes per group [default: 20]
        #[arg(short, long, default_value = "20")]
        n: usize,

        /// Output file path [default: top_genes.tsv]
        #[arg(short, long, default_value = "top_genes.tsv")]
        output: String,
    },

    /// Convert raw counts to length-normalized expression
    #[command(
        long_about = "Convert raw counts to RPKM or TPM using gene lengths.\n\n\
            The result is a valid expression matrix for `si`.",
        after_long_help = "\
Examples:
  rust_specificity normalize -c counts.tsv -l lengths.tsv -o rpkm.tsv
  rust_specificity normalize -c counts.tsv -l lengths.tsv --method tpm -o tpm.tsv"
    )]
    Normalize {
        /// Path to raw count matrix
        #[arg(short, long)]
        counts: String,

        /// Path to gene lengths (gene_id, length in bp)
        #[arg(short, long)]
        lengths: String,

        /// Normalization method [default: rpkm]
        #[arg(long, default_value = "rpkm",
            long_help = "Normalization method.\n\
                rpkm: reads per kilobase per million mapped reads\n\
                tpm:  transcripts per million")]
        method: String,

        /// Output file path [default: normalized.tsv]
        #[arg(short, long, default_value = "normalized.tsv")]
        output: String,
    },
}
