//! Result-container tree and the flattening extractor.
//!
//! A build's attached results form a tree: a node either holds outcomes
//! directly (single-module builds) or aggregates the containers of
//! sub-builds (multi-module or downstream aggregation). The extractor turns
//! any such tree into one flat, order-preserving outcome sequence.

use serde::{Deserialize, Serialize};

use crate::outcome::SqTestOutcome;

/// A node of a build's result tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum SqResultContainer {
    /// Outcomes recorded directly on this node.
    Leaf(Vec<SqTestOutcome>),
    /// Containers of sub-builds, in sub-build order.
    Aggregate(Vec<SqResultContainer>),
}

impl SqResultContainer {
    /// Flatten the tree depth-first into a single outcome sequence.
    ///
    /// Order is deterministic for a fixed tree: leaf outcomes appear in
    /// recording order, siblings in declaration order. Each node is visited
    /// exactly once.
    pub fn flatten(&self) -> Vec<SqTestOutcome> {
        let mut outcomes = Vec::with_capacity(self.len());
        self.collect_into(&mut outcomes);
        outcomes
    }

    /// Total count of leaf outcomes in the tree.
    pub fn len(&self) -> usize {
        match self {
            SqResultContainer::Leaf(outcomes) => outcomes.len(),
            SqResultContainer::Aggregate(children) => children.iter().map(|c| c.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect_into(&self, outcomes: &mut Vec<SqTestOutcome>) {
        match self {
            SqResultContainer::Leaf(leaf) => outcomes.extend(leaf.iter().cloned()),
            SqResultContainer::Aggregate(children) => {
                for child in children {
                    child.collect_into(outcomes);
                }
            }
        }
    }
}

/// Extract the outcomes of a build that may not have any result container.
///
/// Absence of tests is a valid, reportable build state: `None` yields an
/// empty sequence, not an error.
pub fn collect_outcomes(container: Option<&SqResultContainer>) -> Vec<SqTestOutcome> {
    match container {
        Some(container) => container.flatten(),
        None => Vec::new(),
    }
}
