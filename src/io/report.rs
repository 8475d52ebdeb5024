//! JSON report of a specificity run

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::specificity::{SpecificityTable, TopGenes};

/// Scores of one gene, in report group order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificityRecord {
    pub gene_id: String,
    pub scores: Vec<f64>,
}

/// Serializable snapshot of a specificity table and how it was produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificityReport {
    pub groups: Vec<String>,
    pub floor: f64,
    /// Bootstrap replicates, absent for a direct computation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    pub genes: Vec<SpecificityRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_genes: Option<TopGenes>,
}

impl SpecificityReport {
    pub fn new(table: &SpecificityTable, seed: Option<u32>) -> Self {
        let genes = table
            .gene_ids()
            .iter()
            .enumerate()
            .map(|(i, gene_id)| SpecificityRecord {
                gene_id: gene_id.clone(),
                scores: table.gene_scores(i).to_vec(),
            })
            .collect();

        Self {
            groups: table.groups().to_vec(),
            floor: table.floor(),
            iterations: table.iterations(),
            seed: table.iterations().and(seed),
            genes,
            top_genes: None,
        }
    }

    pub fn with_top_genes(mut self, top: TopGenes) -> Self {
        self.top_genes = Some(top);
        self
    }
}

/// Write a report as pretty-printed JSON
pub fn write_specificity_json<P: AsRef<Path>>(path: P, report: &SpecificityReport) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
