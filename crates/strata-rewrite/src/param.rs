//! Parameter builders.

use strata_core::SqlValue;

/// Carries the rewritten parameters for a statement.
///
/// `Standard` keeps one flat list every route unit receives unchanged.
/// `Grouped` (multi-row INSERT) keeps one group per original value row; the
/// route-aware engine slices groups per unit against the original data
/// nodes.
#[derive(Debug, Clone)]
pub enum ParameterBuilder {
    Standard { parameters: Vec<SqlValue> },
    Grouped { groups: Vec<Vec<SqlValue>> },
}

impl ParameterBuilder {
    /// The full parameter list, in original order.
    pub fn parameters(&self) -> Vec<SqlValue> {
        match self {
            ParameterBuilder::Standard { parameters } => parameters.clone(),
            ParameterBuilder::Grouped { groups } => {
                groups.iter().flat_map(|group| group.iter().cloned()).collect()
            }
        }
    }

    /// The parameters of one value-row group.
    pub fn group(&self, index: usize) -> &[SqlValue] {
        match self {
            ParameterBuilder::Standard { .. } => &[],
            ParameterBuilder::Grouped { groups } => {
                groups.get(index).map(Vec::as_slice).unwrap_or(&[])
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ParameterBuilder::Standard { parameters } => parameters.is_empty(),
            ParameterBuilder::Grouped { groups } => groups.iter().all(Vec::is_empty),
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, ParameterBuilder::Grouped { .. })
    }
}
