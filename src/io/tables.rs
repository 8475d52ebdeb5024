//! Delimited-text reading and writing for matrices, metadata and result tables

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::{Array2, ArrayView2};

use crate::data::{ExpressionMatrix, SampleMetadata};
use crate::error::{Result, SpecificityError};
use crate::specificity::{GroupMeans, SpecificityTable, TopGenes};

/// Detect tab or comma from the first non-comment line
fn detect_delimiter<P: AsRef<Path>>(path: P) -> Result<u8> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        return Ok(if line.contains('\t') { b'\t' } else { b',' });
    }
    Err(SpecificityError::EmptyData {
        reason: "Empty input file".to_string(),
    })
}

fn open_reader<P: AsRef<Path>>(path: P) -> Result<csv::Reader<File>> {
    let delimiter = detect_delimiter(&path)?;
    let reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)?;
    Ok(reader)
}

fn parse_value(raw: &str, allow_missing: bool) -> Option<f64> {
    match raw {
        "NA" | "NaN" | "nan" | "" if allow_missing => Some(f64::NAN),
        _ => raw.parse::<f64>().ok(),
    }
}

/// Numeric table with a leading identifier column.
///
/// A header one field shorter than the data rows (row names without a
/// header cell) is accepted; every header field is then a column name.
fn read_numeric_table<P: AsRef<Path>>(
    path: P,
    allow_missing: bool,
) -> Result<(Vec<String>, Vec<String>, Array2<f64>)> {
    let mut reader = open_reader(path)?;
    let mut records = reader.records();

    let header = records.next().ok_or_else(|| SpecificityError::EmptyData {
        reason: "Empty table file".to_string(),
    })??;
    let header: Vec<String> = header.iter().map(|s| s.to_string()).collect();

    let mut row_ids: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut col_names: Option<Vec<String>> = None;

    for record in records {
        let record = record?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let names = col_names.get_or_insert_with(|| {
            if header.len() + 1 == record.len() {
                header.clone()
            } else {
                header.iter().skip(1).cloned().collect()
            }
        });

        if record.len() != names.len() + 1 {
            return Err(SpecificityError::InvalidMatrix {
                reason: format!(
                    "Row {} has {} columns, expected {}",
                    row_ids.len() + 1,
                    record.len(),
                    names.len() + 1
                ),
            });
        }

        let id = record.get(0).unwrap_or_default().to_string();
        let values: Result<Vec<f64>> = record
            .iter()
            .skip(1)
            .map(|s| {
                parse_value(s, allow_missing).ok_or_else(|| SpecificityError::InvalidMatrix {
                    reason: format!("Invalid numeric value '{}' for '{}'", s, id),
                })
            })
            .collect();

        row_ids.push(id);
        rows.push(values?);
    }

    if row_ids.is_empty() {
        return Err(SpecificityError::EmptyData {
            reason: "No data rows found".to_string(),
        });
    }

    let col_names = col_names.unwrap_or_default();
    let mut values = Array2::zeros((row_ids.len(), col_names.len()));
    for (i, row) in rows.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            values[[i, j]] = v;
        }
    }

    Ok((row_ids, col_names, values))
}

/// Read an expression matrix.
///
/// First column gene IDs, header row sample IDs; tab or comma delimited
/// (auto-detected). Values must already be normalized.
pub fn read_expression_matrix<P: AsRef<Path>>(path: P) -> Result<ExpressionMatrix> {
    let (gene_ids, sample_ids, values) = read_numeric_table(path, false)?;
    ExpressionMatrix::new(values, gene_ids, sample_ids)
}

/// Read sample metadata: first column sample IDs, remaining columns categorical
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<SampleMetadata> {
    let mut reader = open_reader(path)?;
    let mut records = reader.records();

    let header = records.next().ok_or_else(|| SpecificityError::EmptyData {
        reason: "Empty metadata file".to_string(),
    })??;
    let condition_names: Vec<String> = header.iter().skip(1).map(|s| s.to_string()).collect();

    let mut sample_ids: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<String>> = vec![Vec::new(); condition_names.len()];

    for record in records {
        let record = record?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        if record.len() != condition_names.len() + 1 {
            return Err(SpecificityError::InvalidMetadata {
                reason: format!(
                    "Row has {} columns, expected {}",
                    record.len(),
                    condition_names.len() + 1
                ),
            });
        }

        sample_ids.push(record.get(0).unwrap_or_default().to_string());
        for (column, value) in columns.iter_mut().zip(record.iter().skip(1)) {
            column.push(value.to_string());
        }
    }

    if sample_ids.is_empty() {
        return Err(SpecificityError::EmptyData {
            reason: "No samples found in metadata".to_string(),
        });
    }

    let mut metadata = SampleMetadata::new(sample_ids);
    for (name, values) in condition_names.iter().zip(columns) {
        metadata.add_condition(name, values)?;
    }

    Ok(metadata)
}

/// Read gene lengths (`gene_id`, length in bp).
///
/// A header row is optional; the first row counts as one only when its
/// length field holds no digits (e.g. `length`).
pub fn read_gene_lengths<P: AsRef<Path>>(path: P) -> Result<HashMap<String, f64>> {
    let mut reader = open_reader(path)?;
    let mut lengths = HashMap::new();

    for (line_no, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() < 2 {
            return Err(SpecificityError::InvalidInput {
                reason: format!("Gene length row {} has fewer than 2 columns", line_no + 1),
            });
        }
        let gene = record.get(0).unwrap_or_default();
        let raw = record.get(1).unwrap_or_default();
        match raw.parse::<f64>() {
            Ok(length) => {
                lengths.insert(gene.to_string(), length);
            }
            Err(_) if line_no == 0 && !raw.chars().any(|c| c.is_ascii_digit()) => {
                log::debug!("Skipping gene length header row ('{}', '{}')", gene, raw);
                continue;
            }
            Err(_) => {
                return Err(SpecificityError::InvalidInput {
                    reason: format!("Invalid gene length '{}' for '{}'", raw, gene),
                })
            }
        }
    }

    Ok(lengths)
}

/// Gene lengths in the order of `gene_ids`; every gene must have one
pub fn align_gene_lengths(lengths: &HashMap<String, f64>, gene_ids: &[String]) -> Result<Vec<f64>> {
    let missing: Vec<&str> = gene_ids
        .iter()
        .filter(|g| !lengths.contains_key(g.as_str()))
        .map(|g| g.as_str())
        .collect();
    if !missing.is_empty() {
        let shown: Vec<&str> = missing.iter().take(5).copied().collect();
        return Err(SpecificityError::InvalidInput {
            reason: format!(
                "{} genes have no length (e.g. {})",
                missing.len(),
                shown.join(", ")
            ),
        });
    }
    Ok(gene_ids.iter().map(|g| lengths[g.as_str()]).collect())
}

/// Write a numeric matrix as TSV with an identifier column
pub fn write_matrix<P: AsRef<Path>>(
    path: P,
    id_header: &str,
    row_ids: &[String],
    col_names: &[String],
    values: ArrayView2<f64>,
    precision: usize,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;

    let mut header = Vec::with_capacity(col_names.len() + 1);
    header.push(id_header.to_string());
    header.extend(col_names.iter().cloned());
    writer.write_record(&header)?;

    for (i, id) in row_ids.iter().enumerate() {
        let mut record = Vec::with_capacity(col_names.len() + 1);
        record.push(id.clone());
        record.extend(values.row(i).iter().map(|v| {
            if v.is_nan() {
                "NA".to_string()
            } else {
                format!("{:.*}", precision, v)
            }
        }));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write group means: `gene_id` then one column per group
pub fn write_group_means<P: AsRef<Path>>(path: P, means: &GroupMeans) -> Result<()> {
    write_matrix(path, "gene_id", means.gene_ids(), means.groups(), means.means(), 6)
}

/// Write a specificity table: `gene_id` then one column per group
pub fn write_specificity_table<P: AsRef<Path>>(path: P, table: &SpecificityTable) -> Result<()> {
    write_matrix(path, "gene_id", table.gene_ids(), table.groups(), table.scores(), 6)
}

/// Read a specificity table written by [`write_specificity_table`]
pub fn read_specificity_table<P: AsRef<Path>>(path: P) -> Result<SpecificityTable> {
    let (gene_ids, groups, scores) = read_numeric_table(path, true)?;
    SpecificityTable::new(gene_ids, groups, scores)
}

/// Write top genes in long format: `group`, `rank`, `gene_id`, `score`
pub fn write_top_genes<P: AsRef<Path>>(path: P, top: &TopGenes) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    writer.write_record(["group", "rank", "gene_id", "score"])?;

    for group in &top.groups {
        for (rank, gene) in group.genes.iter().enumerate() {
            writer.write_record(&[
                group.group.clone(),
                (rank + 1).to_string(),
                gene.gene_id.clone(),
                format!("{:.6}", gene.score),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}
