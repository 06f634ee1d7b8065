//! Declarative description of how a procedure's result sets nest.

/// What to render when a parent has no matching children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Render `[]`.
    EmptyList,
    /// Leave the field out of the parent object.
    Omit,
}

/// How child rows are matched to a parent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// Child rows whose child column equals the parent's parent column.
    Key,
    /// Every child row belongs to the only row of the parent set.
    Sole,
}

/// What a plucked child collection renders for each child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pluck {
    Column(&'static str),
    /// The first column of the row, whatever its name.
    First,
}

/// Selects the top-level rows of an assembly.
#[derive(Debug, Clone)]
pub struct Roots {
    pub(crate) set: usize,
    pub(crate) absent: Option<&'static str>,
    pub(crate) order_by: Option<&'static str>,
    pub(crate) fields: Option<&'static [&'static str]>,
}

impl Roots {
    /// Every row of result set `set`, in database order.
    pub fn set(set: usize) -> Self {
        Self {
            set,
            absent: None,
            order_by: None,
            fields: None,
        }
    }

    /// Keep only rows where `column` is null or missing (self-referencing trees).
    pub fn where_absent(mut self, column: &'static str) -> Self {
        self.absent = Some(column);
        self
    }

    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_by = Some(column);
        self
    }

    /// Restrict the rendered columns.
    pub fn fields(mut self, fields: &'static [&'static str]) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// One parent/child association between two result sets (or a set and itself).
#[derive(Debug, Clone)]
pub struct Link {
    pub(crate) field: &'static str,
    pub(crate) parent_set: usize,
    pub(crate) parent_column: &'static str,
    pub(crate) child_set: usize,
    pub(crate) child_column: &'static str,
    pub(crate) join: Join,
    pub(crate) order_by: Option<&'static str>,
    pub(crate) fields: Option<&'static [&'static str]>,
    pub(crate) pluck: Option<Pluck>,
    pub(crate) empty: EmptyPolicy,
}

impl Link {
    /// Child collection rendered under `field` (already in wire naming).
    ///
    /// Defaults to linking set 0 to set 1 on the same column name; use `parent`/`child` to set
    /// the real columns.
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            parent_set: 0,
            parent_column: "",
            child_set: 1,
            child_column: "",
            join: Join::Key,
            order_by: None,
            fields: None,
            pluck: None,
            empty: EmptyPolicy::EmptyList,
        }
    }

    pub fn parent(mut self, set: usize, column: &'static str) -> Self {
        self.parent_set = set;
        self.parent_column = column;
        self.join = Join::Key;
        self
    }

    pub fn child(mut self, set: usize, column: &'static str) -> Self {
        self.child_set = set;
        self.child_column = column;
        self.join = Join::Key;
        self
    }

    /// Attach every row of `set` to the single row of the parent set, with no link column.
    ///
    /// For single-entity reads whose child sets carry no key back to the root. A parent set
    /// with more than one row is a contract violation.
    pub fn all_rows_of(mut self, set: usize) -> Self {
        self.child_set = set;
        self.parent_column = "";
        self.child_column = "";
        self.join = Join::Sole;
        self
    }

    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_by = Some(column);
        self
    }

    pub fn fields(mut self, fields: &'static [&'static str]) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Render each child as the bare value of `column` instead of an object.
    pub fn pluck(mut self, column: &'static str) -> Self {
        self.pluck = Some(Pluck::Column(column));
        self
    }

    /// Render each child as its first column (single-column sets of unnamed values).
    pub fn pluck_first(mut self) -> Self {
        self.pluck = Some(Pluck::First);
        self
    }

    pub fn omit_when_empty(mut self) -> Self {
        self.empty = EmptyPolicy::Omit;
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }
}

/// Root selector plus ordered links for one procedure's result sets.
#[derive(Debug, Clone)]
pub struct Layout {
    pub(crate) roots: Roots,
    pub(crate) links: Vec<Link>,
}

impl Layout {
    pub fn new(roots: Roots) -> Self {
        Self {
            roots,
            links: Vec::new(),
        }
    }

    /// A single result set rendered as a flat list.
    pub fn flat() -> Self {
        Self::new(Roots::set(0))
    }

    pub fn link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of result sets the procedure must return for this layout.
    pub fn expected_sets(&self) -> usize {
        self.links
            .iter()
            .flat_map(|l| [l.parent_set, l.child_set])
            .chain(std::iter::once(self.roots.set))
            .max()
            .map_or(0, |max| max + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_sets_counts_highest_index() {
        assert_eq!(Layout::flat().expected_sets(), 1);

        let layout = Layout::new(Roots::set(0))
            .link(Link::new("a").parent(0, "Id").child(1, "ParentId"))
            .link(Link::new("b").parent(1, "Id").child(4, "ParentId"));
        assert_eq!(layout.expected_sets(), 5);
    }

    #[test]
    fn sole_parent_link_counts_its_child_set() {
        let layout = Layout::new(Roots::set(0)).link(Link::new("urls").all_rows_of(3).pluck_first());
        assert_eq!(layout.expected_sets(), 4);
        assert_eq!(layout.links()[0].join, Join::Sole);
        assert_eq!(layout.links()[0].pluck, Some(Pluck::First));
    }

    #[test]
    fn self_link_needs_one_set() {
        let layout = Layout::new(Roots::set(0).where_absent("MainMenuId"))
            .link(Link::new("submenu").parent(0, "MenuId").child(0, "MainMenuId"));
        assert_eq!(layout.expected_sets(), 1);
    }
}
