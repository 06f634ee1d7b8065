//! Result-set tree assembler.
//!
//! Stored procedures hand back an ordered list of flat result sets. A [`Layout`] says which set
//! holds the roots and how later sets hang off earlier ones through linking columns; `assemble`
//! turns the sets into [`TreeNode`]s that serialize straight into the response envelope.
//!
//! Result-set order is a positional contract with the procedure. The assembler can detect a
//! missing set or a missing column it reads, but not two sets returned in swapped order.

pub mod layout;
pub mod naming;
pub mod tree;
pub mod value;

use serde_json::{Map, Value};
use thiserror::Error;

pub use layout::{EmptyPolicy, Join, Layout, Link, Pluck, Roots};
pub use tree::{Branch, TreeNode};

use value::{column, compare, link_key};

/// One database row: column name to JSON value.
pub type Row = Map<String, Value>;

/// One positional result set, fully materialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Render every row as a childless node (flat list endpoints).
    pub fn into_nodes(self) -> Vec<TreeNode> {
        self.rows
            .into_iter()
            .map(|row| TreeNode::leaf(row, None))
            .collect()
    }
}

impl From<Vec<Row>> for ResultSet {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<Row> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The procedure's output does not match what the layout reads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("procedure returned {actual} result set(s) but the layout reads {expected}")]
    MissingResultSet { expected: usize, actual: usize },

    #[error("result set {set}, row {row} has no column '{column}'")]
    MissingColumn {
        set: usize,
        row: usize,
        column: &'static str,
    },

    #[error("result set {set}, row {row} has no columns")]
    EmptyRow { set: usize, row: usize },

    #[error("result set {set} has {rows} rows but its children attach to a single parent")]
    AmbiguousParent { set: usize, rows: usize },
}

/// Assemble every root row of `layout` into a tree.
pub fn assemble(sets: &[ResultSet], layout: &Layout) -> Result<Vec<TreeNode>, AssembleError> {
    let expected = layout.expected_sets();
    if sets.len() < expected {
        return Err(AssembleError::MissingResultSet {
            expected,
            actual: sets.len(),
        });
    }

    let roots = &layout.roots;
    if let Some(col) = roots.order_by {
        require_column(sets, roots.set, col)?;
    }

    for link in &layout.links {
        match link.join {
            Join::Key => {
                require_column(sets, link.parent_set, link.parent_column)?;
                require_column(sets, link.child_set, link.child_column)?;
            }
            Join::Sole => {
                let rows = sets[link.parent_set].len();
                if rows > 1 {
                    return Err(AssembleError::AmbiguousParent {
                        set: link.parent_set,
                        rows,
                    });
                }
            }
        }
        if let Some(col) = link.order_by {
            require_column(sets, link.child_set, col)?;
        }
        match link.pluck {
            Some(Pluck::Column(col)) => require_column(sets, link.child_set, col)?,
            Some(Pluck::First) => require_any_column(sets, link.child_set)?,
            None => {}
        }
    }

    let rows = sets[roots.set].rows();

    let mut selected: Vec<usize> = (0..rows.len())
        .filter(|&i| match roots.absent {
            Some(col) => column(&rows[i], col).map_or(true, Value::is_null),
            None => true,
        })
        .collect();

    if let Some(col) = roots.order_by {
        selected.sort_by(|&a, &b| compare(column(&rows[a], col), column(&rows[b], col)));
    }

    let mut path = Vec::new();
    Ok(selected
        .into_iter()
        .map(|idx| build(sets, layout, roots.set, idx, roots.fields, &mut path))
        .collect())
}

/// Assemble a single-entity read. `Ok(None)` means the root set was empty (not found).
pub fn assemble_single(
    sets: &[ResultSet],
    layout: &Layout,
) -> Result<Option<TreeNode>, AssembleError> {
    Ok(assemble(sets, layout)?.into_iter().next())
}

fn require_column(
    sets: &[ResultSet],
    set: usize,
    name: &'static str,
) -> Result<(), AssembleError> {
    for (row_idx, row) in sets[set].rows().iter().enumerate() {
        if column(row, name).is_none() {
            return Err(AssembleError::MissingColumn {
                set,
                row: row_idx,
                column: name,
            });
        }
    }
    Ok(())
}

fn require_any_column(sets: &[ResultSet], set: usize) -> Result<(), AssembleError> {
    match sets[set].rows().iter().position(|row| row.is_empty()) {
        Some(row) => Err(AssembleError::EmptyRow { set, row }),
        None => Ok(()),
    }
}

// Each link is applied at most once along a root-to-leaf path, so a self-referencing link
// yields exactly two levels.
fn build(
    sets: &[ResultSet],
    layout: &Layout,
    set: usize,
    idx: usize,
    fields: Option<&'static [&'static str]>,
    path: &mut Vec<usize>,
) -> TreeNode {
    let row = &sets[set].rows()[idx];
    let mut node = TreeNode::leaf(row.clone(), fields);

    for (link_idx, link) in layout.links.iter().enumerate() {
        if link.parent_set != set || path.contains(&link_idx) {
            continue;
        }

        let child_rows = sets[link.child_set].rows();
        let candidates = (0..child_rows.len())
            .filter(|&c| !(link.child_set == set && c == idx));
        let mut matches: Vec<usize> = match link.join {
            Join::Sole => candidates.collect(),
            Join::Key => match column(row, link.parent_column).and_then(link_key) {
                None => Vec::new(),
                Some(key) => candidates
                    .filter(|&c| {
                        column(&child_rows[c], link.child_column)
                            .and_then(link_key)
                            .is_some_and(|k| k == key)
                    })
                    .collect(),
            },
        };

        if let Some(col) = link.order_by {
            matches.sort_by(|&a, &b| {
                compare(column(&child_rows[a], col), column(&child_rows[b], col))
            });
        }

        path.push(link_idx);
        let nodes = matches
            .into_iter()
            .map(|c| build(sets, layout, link.child_set, c, link.fields, path))
            .collect();
        path.pop();

        node.branches.push(Branch {
            field: link.field,
            empty: link.empty,
            pluck: link.pluck,
            nodes,
        });
    }

    node
}
