//! rust_specificity command-line interface

use std::str::FromStr;

use clap::Parser;
use log::{info, LevelFilter};

use rust_specificity::cli::{Cli, Commands};
use rust_specificity::io::{
    align_gene_lengths, read_gene_lengths, write_group_means, write_matrix, write_specificity_json,
};
use rust_specificity::normalization::normalize;
use rust_specificity::prelude::*;
use rust_specificity::run_specificity;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let first_positional = args.iter().skip(1).find(|a| !a.starts_with('-'));
    let subcommands = ["si", "top", "normalize", "help"];
    let has_subcommand = first_positional.map_or(false, |a| subcommands.contains(&a.as_str()));

    if !has_subcommand {
        if args.len() == 1 {
            print_no_args();
            return;
        }
        if args.iter().any(|a| a == "--help") {
            print_long_help();
            return;
        }
        if args.iter().any(|a| a == "-h") {
            print_short_help();
            return;
        }
        if args.iter().any(|a| a == "-V" || a == "--version") {
            println!("rust_specificity {}", VERSION);
            return;
        }
        print_no_args();
        return;
    }

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Some(Commands::Si {
            expression,
            metadata,
            group_by,
            floor,
            bootstrap,
            iterations,
            seed,
            min_expression,
            min_samples,
            output,
            means,
            top,
            top_output,
            json,
            threads,
        }) => {
            let params = SpecificityParams {
                floor,
                bootstrap,
                iterations,
                seed,
            };
            let outputs = SiOutputs {
                table: &output,
                means: means.as_deref(),
                top,
                top_table: &top_output,
                json: json.as_deref(),
            };
            configure_threads(threads);
            run_si(
                &expression,
                &metadata,
                &group_by,
                &params,
                min_expression.map(|v| (v, min_samples)),
                &outputs,
            )
        }
        Some(Commands::Top { input, n, output }) => run_top(&input, n, &output),
        Some(Commands::Normalize {
            counts,
            lengths,
            method,
            output,
        }) => run_normalize(&counts, &lengths, &method, &output),
        None => {
            print_no_args();
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Custom help output
// ---------------------------------------------------------------------------

fn print_no_args() {
    println!("rust_specificity v{}", VERSION);
    println!("Run `rust_specificity -h` for usage or `rust_specificity --help` for detailed information.");
}

fn print_short_help() {
    println!("rust_specificity v{}", VERSION);
    println!();
    println!("Usage: rust_specificity <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  si         Compute the specificity index");
    println!("  top        Rank the most specific genes per group");
    println!("  normalize  Convert raw counts to RPKM or TPM");
    println!();
    println!("Run `rust_specificity <COMMAND> -h` for command-specific options.");
}

fn print_long_help() {
    println!("rust_specificity v{}", VERSION);
    println!("Cell-type specificity index of gene expression");
    println!();
    println!("Usage: rust_specificity <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  si         Compute the specificity index of every gene for every group");
    println!("               - Grouping by any metadata column (cell type, species, ...)");
    println!("               - Expression floor on group means");
    println!("               - Within-group bootstrap averaging, reproducible by seed");
    println!("               - Optional top-N ranking and JSON report");
    println!("  top        Rank the most specific genes per group from an SI table");
    println!("  normalize  Convert raw counts to RPKM or TPM using gene lengths");
    println!();
    println!("Global Options:");
    println!("  -v, --verbose    Enable verbose output");
    println!("  -h               Print short help");
    println!("      --help       Print detailed help");
    println!("  -V, --version    Print version");
    println!();
    println!("Examples:");
    println!("  rust_specificity si -e rpkm.tsv -m samples.tsv -g cell_type -o si.tsv");
    println!();
    println!("  rust_specificity si -e rpkm.tsv -m samples.tsv --bootstrap --iterations 1000 \\");
    println!("    --seed 1 --top 20 --top-output top20.tsv");
    println!();
    println!("  rust_specificity top -i si.tsv -n 100 -o top100.tsv");
    println!();
    println!("  rust_specificity normalize -c counts.tsv -l lengths.tsv --method tpm -o tpm.tsv");
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

struct SiOutputs<'a> {
    table: &'a str,
    means: Option<&'a str>,
    top: Option<usize>,
    top_table: &'a str,
    json: Option<&'a str>,
}

fn configure_threads(threads: usize) {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }
}

fn run_si(
    expression_path: &str,
    metadata_path: &str,
    group_by: &str,
    params: &SpecificityParams,
    expression_filter: Option<(f64, usize)>,
    outputs: &SiOutputs,
) -> Result<()> {
    info!("Loading expression matrix from: {}", expression_path);
    let mut matrix = read_expression_matrix(expression_path)?;
    info!("  {} genes, {} samples", matrix.n_genes(), matrix.n_samples());

    if let Some((min_value, min_samples)) = expression_filter {
        matrix = matrix.filter_low_expression(min_value, min_samples)?;
        info!(
            "  {} genes expressed at >= {} in >= {} samples",
            matrix.n_genes(),
            min_value,
            min_samples
        );
    }

    info!("Loading metadata from: {}", metadata_path);
    let metadata = read_metadata(metadata_path)?;
    let groups = metadata.to_sample_groups(group_by)?;
    info!("Grouping by '{}': {} groups", group_by, groups.n_groups());

    if params.bootstrap {
        info!(
            "Bootstrapping {} replicates (seed {}, floor {})...",
            params.iterations, params.seed, params.floor
        );
    } else {
        info!("Computing specificity index (floor {})...", params.floor);
    }
    let table = run_specificity(&matrix, &groups, params)?;

    info!("Writing specificity index to: {}", outputs.table);
    write_specificity_table(outputs.table, &table)?;

    if let Some(means_path) = outputs.means {
        info!("Writing group means to: {}", means_path);
        let means = compute_group_means(&matrix, &groups)?;
        write_group_means(means_path, &means)?;
    }

    let top = match outputs.top {
        Some(n) => {
            let top = top_n_genes_per_group(&table, n)?;
            info!("Writing top {} genes per group to: {}", n, outputs.top_table);
            write_top_genes(outputs.top_table, &top)?;
            Some(top)
        }
        None => None,
    };

    if let Some(json_path) = outputs.json {
        info!("Writing JSON report to: {}", json_path);
        let mut report = SpecificityReport::new(&table, Some(params.seed));
        if let Some(top) = top {
            report = report.with_top_genes(top);
        }
        write_specificity_json(json_path, &report)?;
    }

    println!("\n{}", table.summary(0.5));
    Ok(())
}

fn run_top(input_path: &str, n: usize, output_path: &str) -> Result<()> {
    info!("Loading specificity table from: {}", input_path);
    let table = read_specificity_table(input_path)?;
    info!("  {} genes, {} groups", table.n_genes(), table.n_groups());

    let top = top_n_genes_per_group(&table, n)?;

    info!("Writing top {} genes per group to: {}", n, output_path);
    write_top_genes(output_path, &top)?;

    for group in &top.groups {
        let ids: Vec<&str> = group.genes.iter().take(5).map(|g| g.gene_id.as_str()).collect();
        info!("  {}: {}", group.group, ids.join(", "));
    }

    info!("Done!");
    Ok(())
}

fn run_normalize(counts_path: &str, lengths_path: &str, method: &str, output_path: &str) -> Result<()> {
    let method = NormalizationMethod::from_str(method)?;

    info!("Loading count matrix from: {}", counts_path);
    let counts = read_expression_matrix(counts_path)?;
    info!("  {} genes, {} samples", counts.n_genes(), counts.n_samples());

    info!("Loading gene lengths from: {}", lengths_path);
    let lengths = read_gene_lengths(lengths_path)?;
    let lengths = align_gene_lengths(&lengths, counts.gene_ids())?;

    info!("Normalizing counts ({:?})...", method);
    let normalized = normalize(counts.values(), &lengths, method)?;

    info!("Writing normalized expression to: {}", output_path);
    write_matrix(
        output_path,
        "gene_id",
        counts.gene_ids(),
        counts.sample_ids(),
        normalized.view(),
        4,
    )?;

    info!("Done!");
    Ok(())
}
