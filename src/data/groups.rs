//! Sample-to-group assignment with a fixed, enumerated set of group keys

use std::collections::{HashMap, HashSet};

use crate::error::{Result, SpecificityError, SpecificityWarning};

/// Assignment of samples to groups (cell types).
///
/// Group keys are enumerated once at construction, in first-appearance order,
/// and that order fixes the column order of every table computed from this
/// grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGroups {
    /// (sample_id, group index) in assignment order
    assignments: Vec<(String, usize)>,
    /// Distinct group labels in first-appearance order
    groups: Vec<String>,
}

impl SampleGroups {
    /// Create a grouping from (sample_id, group_label) pairs
    pub fn new(assignments: Vec<(String, String)>) -> Result<Self> {
        if assignments.is_empty() {
            return Err(SpecificityError::InvalidGrouping {
                reason: "no samples in group assignment".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<String> = Vec::new();
        let mut resolved = Vec::with_capacity(assignments.len());

        for (sample, label) in assignments {
            if !seen.insert(sample.clone()) {
                return Err(SpecificityError::InvalidGrouping {
                    reason: format!("sample '{}' is assigned more than once", sample),
                });
            }
            let idx = *group_index.entry(label.clone()).or_insert_with(|| {
                groups.push(label);
                groups.len() - 1
            });
            resolved.push((sample, idx));
        }

        Ok(Self {
            assignments: resolved,
            groups,
        })
    }

    /// Create a grouping from parallel slices of sample ids and labels
    pub fn from_labels(sample_ids: &[String], labels: &[String]) -> Result<Self> {
        if sample_ids.len() != labels.len() {
            return Err(SpecificityError::DimensionMismatch {
                expected: format!("{} group labels", sample_ids.len()),
                got: format!("{} group labels", labels.len()),
            });
        }
        Self::new(
            sample_ids
                .iter()
                .cloned()
                .zip(labels.iter().cloned())
                .collect(),
        )
    }

    /// Distinct group labels in first-appearance order
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn n_samples(&self) -> usize {
        self.assignments.len()
    }

    /// Sample ids in assignment order
    pub fn sample_ids(&self) -> Vec<&str> {
        self.assignments.iter().map(|(s, _)| s.as_str()).collect()
    }

    /// Group label of a sample
    pub fn group_of(&self, sample_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(s, _)| s == sample_id)
            .map(|(_, g)| self.groups[*g].as_str())
    }

    /// Number of samples per group, in group order
    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.groups.len()];
        for (_, g) in &self.assignments {
            sizes[*g] += 1;
        }
        sizes
    }

    /// Groups with exactly one member sample
    pub fn degenerate_groups(&self) -> Vec<&str> {
        self.group_sizes()
            .iter()
            .zip(self.groups.iter())
            .filter(|(&n, _)| n == 1)
            .map(|(_, g)| g.as_str())
            .collect()
    }

    /// Non-fatal conditions of this grouping
    pub fn warnings(&self) -> Vec<SpecificityWarning> {
        self.degenerate_groups()
            .into_iter()
            .map(|group| {
                let sample = self
                    .assignments
                    .iter()
                    .find(|(_, g)| self.groups[*g] == group)
                    .map(|(s, _)| s.clone())
                    .unwrap_or_default();
                SpecificityWarning::DegenerateGroup {
                    group: group.to_string(),
                    sample,
                }
            })
            .collect()
    }

    /// Resolve the grouping against matrix columns.
    ///
    /// Returns, for each group in group order, the indices of its columns in
    /// `column_ids` (ascending). The assignment must cover exactly the
    /// columns: no missing and no extra samples.
    pub fn resolve_columns(&self, column_ids: &[String]) -> Result<Vec<Vec<usize>>> {
        let column_index: HashMap<&str, usize> = column_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let missing_in_matrix: Vec<&str> = self
            .assignments
            .iter()
            .map(|(s, _)| s.as_str())
            .filter(|s| !column_index.contains_key(s))
            .collect();

        let assigned: HashSet<&str> = self.assignments.iter().map(|(s, _)| s.as_str()).collect();
        let missing_in_groups: Vec<&str> = column_ids
            .iter()
            .map(|s| s.as_str())
            .filter(|s| !assigned.contains(s))
            .collect();

        if !missing_in_matrix.is_empty() || !missing_in_groups.is_empty() {
            let mut msg = String::from("group assignment does not match the matrix columns.");
            if !missing_in_matrix.is_empty() {
                msg.push_str(&format!(" Assigned but not in matrix: {:?}.", missing_in_matrix));
            }
            if !missing_in_groups.is_empty() {
                msg.push_str(&format!(" In matrix but not assigned: {:?}.", missing_in_groups));
            }
            return Err(SpecificityError::InvalidGrouping { reason: msg });
        }

        let mut columns: Vec<Vec<usize>> = vec![Vec::new(); self.groups.len()];
        for (sample, g) in &self.assignments {
            columns[*g].push(column_index[sample.as_str()]);
        }
        for cols in columns.iter_mut() {
            cols.sort_unstable();
        }

        Ok(columns)
    }
}
