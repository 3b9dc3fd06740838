use crate::data::dataset::Category;
use crate::errors::TreeError;
use nalgebra::DMatrix;
use std::fmt::Write;

/// Pre-order position of a node, the root being `0`.
pub type NodeId = usize;

/// Decision tree node
///
/// A `Decision` node owns its children; branches keep the order in which
/// their values first appeared among the rows that reached the node.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode<XT: Category, YT: Category> {
    Leaf {
        value: YT,
    },
    Decision {
        attribute: String,
        column: usize,
        gain: f64,
        branches: Vec<(XT, TreeNode<XT, YT>)>,
    },
}

/// A node reached during [`TreeNode::walk`].
pub struct Visit<'a, XT: Category, YT: Category> {
    pub id: NodeId,
    /// The parent's id and the value on the edge leading here.
    pub parent: Option<(NodeId, &'a XT)>,
    pub depth: usize,
    pub node: &'a TreeNode<XT, YT>,
}

impl<XT: Category, YT: Category> TreeNode<XT, YT> {
    pub fn leaf(value: YT) -> Self {
        Self::Leaf { value }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Decision { branches, .. } => {
                1 + branches
                    .iter()
                    .map(|(_, child)| child.depth())
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Decision { branches, .. } => {
                branches.iter().map(|(_, child)| child.n_leaves()).sum()
            }
        }
    }

    /// The child reached through `value`, if this is a decision node with
    /// such a branch.
    pub fn branch(&self, value: &XT) -> Option<&TreeNode<XT, YT>> {
        match self {
            Self::Leaf { .. } => None,
            Self::Decision { branches, .. } => branches
                .iter()
                .find(|(branch_value, _)| branch_value == value)
                .map(|(_, child)| child),
        }
    }

    /// Visits every node depth-first in pre-order.
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&Visit<'a, XT, YT>),
    {
        let mut next_id = 0;
        self.walk_from(None, 0, &mut next_id, &mut visit);
    }

    fn walk_from<'a, F>(
        &'a self,
        parent: Option<(NodeId, &'a XT)>,
        depth: usize,
        next_id: &mut NodeId,
        visit: &mut F,
    ) where
        F: FnMut(&Visit<'a, XT, YT>),
    {
        let id = *next_id;
        *next_id += 1;
        visit(&Visit {
            id,
            parent,
            depth,
            node: self,
        });

        if let Self::Decision { branches, .. } = self {
            for (value, child) in branches {
                child.walk_from(Some((id, value)), depth + 1, next_id, visit);
            }
        }
    }

    /// Gains of every decision node, keyed by node id.
    pub fn gain_record(&self) -> GainRecord {
        let mut entries = Vec::new();
        self.walk(|visit| {
            if let Self::Decision {
                attribute, gain, ..
            } = visit.node
            {
                entries.push(GainEntry {
                    node: visit.id,
                    attribute: attribute.clone(),
                    gain: *gain,
                });
            }
        });
        GainRecord { entries }
    }

    /// Follows the branches matching row `row` of `x` down to a leaf.
    pub fn classify(&self, x: &DMatrix<XT>, row: usize) -> Result<&YT, TreeError> {
        match self {
            Self::Leaf { value } => Ok(value),
            Self::Decision {
                attribute, column, ..
            } => {
                if *column >= x.ncols() {
                    return Err(TreeError::WidthMismatch {
                        expected: column + 1,
                        found: x.ncols(),
                    });
                }
                let value = &x[(row, *column)];
                self.branch(value)
                    .ok_or_else(|| TreeError::UnseenValue {
                        attribute: attribute.clone(),
                        value: value.to_string(),
                    })?
                    .classify(x, row)
            }
        }
    }

    /// Renders the tree as a Graphviz `digraph`.
    ///
    /// Decision nodes are labelled with their attribute and information gain,
    /// leaves are drawn as filled ellipses and every edge carries the
    /// attribute value it stands for.
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph \"Decision Tree\" {\n");
        // Writing into a `String` cannot fail.
        self.walk(|visit| {
            match visit.node {
                Self::Decision {
                    attribute, gain, ..
                } => writeln!(
                    dot,
                    "\tnode_{} [ label = \"{}? (IG: {:.2})\" ];",
                    visit.id,
                    escape(attribute),
                    gain
                )
                .ok(),
                Self::Leaf { value } => writeln!(
                    dot,
                    "\tnode_{} [ label = \"{}\", {LEAF_STYLE} ];",
                    visit.id,
                    escape(&value.to_string())
                )
                .ok(),
            };
            if let Some((parent, value)) = visit.parent {
                writeln!(
                    dot,
                    "\tnode_{} -> node_{} [ label = \"{}\" ];",
                    parent,
                    visit.id,
                    escape(&value.to_string())
                )
                .ok();
            }
        });
        dot.push('}');
        dot.push('\n');
        dot
    }
}

const LEAF_STYLE: &str = "shape = ellipse, style = filled, fillcolor = lightblue";

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Clone, Debug, PartialEq)]
pub struct GainEntry {
    pub node: NodeId,
    pub attribute: String,
    pub gain: f64,
}

/// Information gain of each decision node.
///
/// Entries are keyed by node id, so two nodes splitting on attributes with
/// the same name keep separate gains.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GainRecord {
    entries: Vec<GainEntry>,
}

impl GainRecord {
    pub fn get(&self, node: NodeId) -> Option<f64> {
        self.entries
            .binary_search_by_key(&node, |entry| entry.node)
            .ok()
            .map(|index| self.entries[index].gain)
    }

    /// All gains recorded for decision nodes named `attribute`, in pre-order.
    pub fn by_attribute(&self, attribute: &str) -> Vec<f64> {
        self.entries
            .iter()
            .filter(|entry| entry.attribute == attribute)
            .map(|entry| entry.gain)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GainEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
