//! Input/Output for expression tables and specificity results

mod report;
mod tables;

pub use report::{write_specificity_json, SpecificityRecord, SpecificityReport};
pub use tables::{
    align_gene_lengths, read_expression_matrix, read_gene_lengths, read_metadata, read_specificity_table,
    write_group_means, write_matrix, write_specificity_table, write_top_genes,
};
