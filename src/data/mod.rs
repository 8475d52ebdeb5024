//! Data structures for specificity analysis

mod expression_matrix;
mod groups;
mod metadata;

pub use expression_matrix::ExpressionMatrix;
pub use groups::SampleGroups;
pub use metadata::SampleMetadata;
