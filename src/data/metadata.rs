//! Sample metadata: categorical annotations per sample

use std::collections::HashMap;

use super::SampleGroups;
use crate::error::{Result, SpecificityError};

/// Sample metadata with named categorical columns (cell type, species, ...)
#[derive(Debug, Clone)]
pub struct SampleMetadata {
    sample_ids: Vec<String>,
    /// Column name -> value for each sample
    conditions: HashMap<String, Vec<String>>,
    /// Column names in insertion order
    column_order: Vec<String>,
}

impl SampleMetadata {
    /// Create new sample metadata
    pub fn new(sample_ids: Vec<String>) -> Self {
        {
            let mut seen = std::collections::HashSet::new();
            for id in &sample_ids {
                if !seen.insert(id) {
                    log::warn!("Duplicate sample ID detected: '{}'. Sample IDs should be unique.", id);
                }
            }
        }
        Self {
            sample_ids,
            conditions: HashMap::new(),
            column_order: Vec::new(),
        }
    }

    /// Add a categorical column, replacing any column with the same name
    pub fn add_condition(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.sample_ids.len() {
            return Err(SpecificityError::DimensionMismatch {
                expected: format!("{} values", self.sample_ids.len()),
                got: format!("{} values", values.len()),
            });
        }
        if self.conditions.insert(name.to_string(), values).is_none() {
            self.column_order.push(name.to_string());
        }
        Ok(())
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Values of a column, one per sample
    pub fn condition(&self, name: &str) -> Option<&Vec<String>> {
        self.conditions.get(name)
    }

    /// Column names in the order they were added
    pub fn condition_names(&self) -> Vec<&str> {
        self.column_order.iter().map(|s| s.as_str()).collect()
    }

    /// Distinct values of a column in first-appearance order
    pub fn levels(&self, name: &str) -> Option<Vec<String>> {
        self.conditions.get(name).map(|values| {
            let mut unique: Vec<String> = Vec::new();
            for v in values {
                if !unique.contains(v) {
                    unique.push(v.clone());
                }
            }
            unique
        })
    }

    /// Sample indices carrying a specific value in a column
    pub fn samples_with_level(&self, name: &str, level: &str) -> Vec<usize> {
        self.conditions
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.as_str() == level)
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Build the sample grouping defined by one column
    pub fn to_sample_groups(&self, name: &str) -> Result<SampleGroups> {
        let labels = self.conditions.get(name).ok_or_else(|| SpecificityError::InvalidMetadata {
            reason: format!(
                "column '{}' not found in metadata (available: {})",
                name,
                self.column_order.join(", ")
            ),
        })?;
        SampleGroups::from_labels(&self.sample_ids, labels)
    }
}
