//! Population specification: which related records to fetch, and which of
//! their fields, so that nested filter predicates can be evaluated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filter::{AttributePath, Filter};

/// Tree of relations/components to populate, keyed by attribute name.
///
/// Keys are ordered, so two specs built from the same input are equal and
/// serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PopulateSpec(BTreeMap<String, PopulateNode>);

/// One populated attribute.
///
/// An empty `fields` list with a present node means "traverse only": the
/// relation is joined but none of its scalars were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulateNode {
    /// Scalar fields to select, deduplicated, in first-occurrence order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "PopulateSpec::is_empty")]
    pub populate: PopulateSpec,
}

impl PopulateSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spec with a single top-level node.
    #[must_use]
    pub fn single(name: impl Into<String>, node: PopulateNode) -> Self {
        Self(BTreeMap::from([(name.into(), node)]))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PopulateNode> {
        self.0.get(name)
    }

    /// Node reached by following `path` from the root.
    #[must_use]
    pub fn node_at(&self, path: &[&str]) -> Option<&PopulateNode> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.get(first)?, |node, segment| node.populate.get(segment))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PopulateNode)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Union of two specs.
    ///
    /// Nodes present in both are merged recursively; field lists keep the
    /// order of `self` and append unseen fields of `other` after it.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (name, node) in other.0 {
            let merged = match self.0.remove(&name) {
                Some(existing) => existing.merge(node),
                None => node,
            };
            self.0.insert(name, merged);
        }
        self
    }

    /// A filter whose populate derivation yields this spec again.
    ///
    /// Every requested field becomes a `not_null` leaf on its full dotted path;
    /// a node without fields and without children becomes a `not_null` leaf on
    /// the node itself.
    #[must_use]
    pub fn implied_filter(&self) -> Filter {
        let mut leaves = Vec::new();
        self.collect_implied(&[], &mut leaves);
        Filter::And(leaves)
    }

    fn collect_implied(&self, prefix: &[&str], out: &mut Vec<Filter>) {
        for (name, node) in self.iter() {
            let mut path: Vec<&str> = prefix.to_vec();
            path.push(name);

            if node.fields.is_empty() && node.populate.is_empty() {
                out.push(Filter::not_null(AttributePath::from_segments(
                    path.iter().copied(),
                )));
                continue;
            }
            for field in &node.fields {
                out.push(Filter::not_null(AttributePath::from_segments(
                    path.iter().copied().chain([field.as_str()]),
                )));
            }
            node.populate.collect_implied(&path, out);
        }
    }
}

impl PopulateNode {
    #[must_use]
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = Self::default();
        for field in fields {
            node.push_field(field.into());
        }
        node
    }

    #[must_use]
    pub fn with_child(mut self, name: impl Into<String>, child: PopulateNode) -> Self {
        self.populate = self.populate.merge(PopulateSpec::single(name, child));
        self
    }

    /// Append a field unless it is already selected.
    pub fn push_field(&mut self, field: String) {
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }

    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for field in other.fields {
            self.push_field(field);
        }
        self.populate = self.populate.merge(other.populate);
        self
    }
}
