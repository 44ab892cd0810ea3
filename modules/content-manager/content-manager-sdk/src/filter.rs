//! Filter expressions over content-type attributes.
//!
//! A [`Filter`] is a tree of `and` / `or` / `not` combinators with
//! [`Predicate`] leaves. Leaf paths are dotted and may cross relation,
//! component and media boundaries (`author.name`, `seo.meta.title`).
//!
//! Filters serve two purposes: they are forwarded to the entity manager as
//! query clauses, and they are evaluated in memory against a record
//! ([`Filter::matches`]) to decide whether a conditional grant applies.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dotted attribute path, e.g. `author.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AttributePath(Vec<String>);

impl AttributePath {
    /// Parse a dotted path. Empty segments are ignored.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for AttributePath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for AttributePath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl From<AttributePath> for String {
    fn from(path: AttributePath) -> Self {
        path.to_string()
    }
}

/// Comparison operator of a filter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
    Null,
    NotNull,
}

/// A single `path op value` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub path: AttributePath,
    pub op: Operator,
    /// Operand. Ignored by `null` / `not_null`.
    #[serde(default)]
    pub value: Value,
}

/// Filter expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Leaf(Predicate),
}

impl Filter {
    #[must_use]
    pub fn leaf(path: impl Into<AttributePath>, op: Operator, value: impl Into<Value>) -> Self {
        Self::Leaf(Predicate {
            path: path.into(),
            op,
            value: value.into(),
        })
    }

    #[must_use]
    pub fn eq(path: impl Into<AttributePath>, value: impl Into<Value>) -> Self {
        Self::leaf(path, Operator::Eq, value)
    }

    #[must_use]
    pub fn is_in<I, V>(path: impl Into<AttributePath>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::leaf(
            path,
            Operator::In,
            Value::Array(values.into_iter().map(Into::into).collect()),
        )
    }

    #[must_use]
    pub fn not_null(path: impl Into<AttributePath>) -> Self {
        Self::leaf(path, Operator::NotNull, Value::Null)
    }

    #[must_use]
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    #[must_use]
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    #[must_use]
    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Leaf predicates in pre-order (left to right, parents before children).
    #[must_use]
    pub fn leaves(&self) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match self {
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            Self::Not(inner) => inner.collect_leaves(out),
            Self::Leaf(predicate) => out.push(predicate),
        }
    }

    /// Keep only the leaves accepted by `keep`.
    ///
    /// Combinators left without children are removed as well; `None` means the
    /// whole expression was pruned.
    #[must_use]
    pub fn retain_leaves<F>(self, keep: &mut F) -> Option<Self>
    where
        F: FnMut(&Predicate) -> bool,
    {
        match self {
            Self::And(children) => {
                let kept: Vec<Self> = children
                    .into_iter()
                    .filter_map(|child| child.retain_leaves(keep))
                    .collect();
                (!kept.is_empty()).then_some(Self::And(kept))
            }
            Self::Or(children) => {
                let kept: Vec<Self> = children
                    .into_iter()
                    .filter_map(|child| child.retain_leaves(keep))
                    .collect();
                (!kept.is_empty()).then_some(Self::Or(kept))
            }
            Self::Not(inner) => inner.retain_leaves(keep).map(Self::not),
            Self::Leaf(predicate) => keep(&predicate).then_some(Self::Leaf(predicate)),
        }
    }

    /// Rewrite every leaf, keeping the combinator structure.
    #[must_use]
    pub fn map_leaves<F>(self, f: &mut F) -> Self
    where
        F: FnMut(Predicate) -> Predicate,
    {
        match self {
            Self::And(children) => {
                Self::And(children.into_iter().map(|c| c.map_leaves(f)).collect())
            }
            Self::Or(children) => Self::Or(children.into_iter().map(|c| c.map_leaves(f)).collect()),
            Self::Not(inner) => Self::not(inner.map_leaves(f)),
            Self::Leaf(predicate) => Self::Leaf(f(predicate)),
        }
    }

    /// Evaluate the filter against a JSON record.
    ///
    /// Arrays met along a path (to-many relations, repeatable components) match
    /// when any element matches. A missing attribute reads as `null`. An empty
    /// `and` holds, an empty `or` does not.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Self::And(children) => children.iter().all(|c| c.matches(record)),
            Self::Or(children) => children.iter().any(|c| c.matches(record)),
            Self::Not(inner) => !inner.matches(record),
            Self::Leaf(predicate) => predicate.matches(record),
        }
    }
}

impl Predicate {
    /// Evaluate this predicate against a JSON record.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        let mut candidates = Vec::new();
        resolve(record, self.path.segments(), &mut candidates);

        match self.op {
            Operator::Null => candidates.is_empty() || candidates.iter().any(|v| v.is_null()),
            Operator::NotNull => candidates.iter().any(|v| !v.is_null()),
            Operator::Ne => !candidates.iter().any(|v| values_equal(v, &self.value)),
            Operator::NotIn => !candidates.iter().any(|v| is_member(v, &self.value)),
            op => candidates.iter().any(|v| compare_one(op, v, &self.value)),
        }
    }
}

static NULL: Value = Value::Null;

fn resolve<'a>(value: &'a Value, segments: &[String], out: &mut Vec<&'a Value>) {
    if let Value::Array(items) = value {
        for item in items {
            resolve(item, segments, out);
        }
        return;
    }
    let Some((head, rest)) = segments.split_first() else {
        out.push(value);
        return;
    };
    match value {
        Value::Object(map) => match map.get(head) {
            Some(next) => resolve(next, rest, out),
            None => out.push(&NULL),
        },
        _ => out.push(&NULL),
    }
}

fn compare_one(op: Operator, candidate: &Value, operand: &Value) -> bool {
    match op {
        Operator::Eq => values_equal(candidate, operand),
        Operator::In => is_member(candidate, operand),
        Operator::Lt => order(candidate, operand) == Some(Ordering::Less),
        Operator::Lte => matches!(
            order(candidate, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::Gt => order(candidate, operand) == Some(Ordering::Greater),
        Operator::Gte => matches!(
            order(candidate, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Contains => {
            str_pair(candidate, operand).is_some_and(|(text, needle)| text.contains(needle))
        }
        Operator::StartsWith => {
            str_pair(candidate, operand).is_some_and(|(text, needle)| text.starts_with(needle))
        }
        Operator::EndsWith => {
            str_pair(candidate, operand).is_some_and(|(text, needle)| text.ends_with(needle))
        }
        // handled over the whole candidate set by the caller
        Operator::Ne | Operator::NotIn | Operator::Null | Operator::NotNull => false,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => order(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}

fn is_member(candidate: &Value, operand: &Value) -> bool {
    match operand {
        Value::Array(values) => values.iter().any(|v| values_equal(candidate, v)),
        single => values_equal(candidate, single),
    }
}

fn order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(lhs), Value::Number(rhs)) => lhs.as_f64()?.partial_cmp(&rhs.as_f64()?),
        (Value::String(lhs), Value::String(rhs)) => Some(lhs.cmp(rhs)),
        _ => None,
    }
}

fn str_pair<'a>(candidate: &'a Value, operand: &'a Value) -> Option<(&'a str, &'a str)> {
    Some((candidate.as_str()?, operand.as_str()?))
}
