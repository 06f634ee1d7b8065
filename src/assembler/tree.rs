use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use super::layout::{EmptyPolicy, Pluck};
use super::naming::to_camel_case;
use super::value::column;
use super::Row;

/// A named child collection of a [`TreeNode`].
#[derive(Debug, Clone)]
pub struct Branch {
    pub(crate) field: &'static str,
    pub(crate) empty: EmptyPolicy,
    pub(crate) pluck: Option<Pluck>,
    pub(crate) nodes: Vec<TreeNode>,
}

impl Branch {
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }
}

/// A row decorated with its child collections.
///
/// The full row is kept so a node can be flattened back; field projection, plucking and
/// camelCase naming are applied only when serializing.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) row: Row,
    pub(crate) fields: Option<&'static [&'static str]>,
    pub(crate) branches: Vec<Branch>,
}

impl TreeNode {
    pub(crate) fn leaf(row: Row, fields: Option<&'static [&'static str]>) -> Self {
        Self {
            row,
            fields,
            branches: Vec::new(),
        }
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        column(&self.row, name)
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Child nodes under `field`, if the layout declared that link for this node.
    pub fn branch(&self, field: &str) -> Option<&[TreeNode]> {
        self.branches
            .iter()
            .find(|b| b.field == field)
            .map(|b| b.nodes.as_slice())
    }

    // Plucked columns are checked by `assemble` before any node is built.
    fn plucked(&self, pluck: Pluck) -> &Value {
        let value = match pluck {
            Pluck::Column(col) => self.get(col),
            Pluck::First => self.row.values().next(),
        };
        value.unwrap_or(&Value::Null)
    }

    pub fn into_row(self) -> Row {
        self.row
    }

    fn rendered_columns(&self) -> impl Iterator<Item = (&String, &Value)> {
        let fields = self.fields;
        self.row.iter().filter(move |(key, _)| match fields {
            Some(fields) => fields.contains(&key.as_str()),
            None => true,
        })
    }
}

impl From<Row> for TreeNode {
    fn from(row: Row) -> Self {
        TreeNode::leaf(row, None)
    }
}

impl Serialize for TreeNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        for (key, value) in self.rendered_columns() {
            map.serialize_entry(&to_camel_case(key), value)?;
        }

        for branch in &self.branches {
            if branch.nodes.is_empty() && branch.empty == EmptyPolicy::Omit {
                continue;
            }
            match branch.pluck {
                Some(pluck) => {
                    let values: Vec<&Value> =
                        branch.nodes.iter().map(|node| node.plucked(pluck)).collect();
                    map.serialize_entry(branch.field, &values)?;
                }
                None => map.serialize_entry(branch.field, &branch.nodes)?,
            }
        }

        map.end()
    }
}
