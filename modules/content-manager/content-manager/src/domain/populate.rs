//! Derive the population needed to evaluate a filter.
//!
//! Every filter leaf is resolved one path segment at a time against the
//! schema graph. Relation, media and component segments open a populate node;
//! a terminal scalar reached through at least one hop becomes a selected field
//! of its parent node. Dynamic zones and polymorphic relations have no static
//! target, so resolution stops there and the leaf is reported as inconclusive.
//! The same holds for a relation whose target schema is not registered.

use content_manager_sdk::{
    AttributeKind, AttributePath, ContentTypeSchema, Filter, MEDIA_UID, PopulateNode,
    PopulateSpec, RelationTarget, SchemaRegistry,
};

/// Result of a derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateDerivation {
    pub populate: PopulateSpec,
    /// Leaf paths that could not be fully resolved, in filter order.
    pub inconclusive: Vec<AttributePath>,
}

/// Populate spec needed to evaluate `filter` against records of `schema`.
#[must_use]
pub fn derive(
    filter: &Filter,
    schema: &ContentTypeSchema,
    registry: &dyn SchemaRegistry,
) -> PopulateSpec {
    derive_with_report(filter, schema, registry).populate
}

/// Like [`derive`], also reporting the leaves resolution gave up on.
#[must_use]
pub fn derive_with_report(
    filter: &Filter,
    schema: &ContentTypeSchema,
    registry: &dyn SchemaRegistry,
) -> PopulateDerivation {
    filter
        .leaves()
        .into_iter()
        .fold(PopulateDerivation::default(), |mut acc, predicate| {
            let (node, conclusive) = resolve(predicate.path.segments(), schema, registry);
            // scalars on the root schema need no population
            acc.populate = acc.populate.merge(node.populate);
            if !conclusive {
                tracing::debug!(
                    uid = schema.uid(),
                    path = %predicate.path,
                    "Filter path cannot be resolved for population"
                );
                acc.inconclusive.push(predicate.path.clone());
            }
            acc
        })
}

/// Contribution of `segments` at the level of `schema`: selected scalar fields
/// and child nodes, plus whether the whole path resolved.
fn resolve(
    segments: &[String],
    schema: &ContentTypeSchema,
    registry: &dyn SchemaRegistry,
) -> (PopulateNode, bool) {
    let Some((head, rest)) = segments.split_first() else {
        return (PopulateNode::default(), true);
    };
    let _span =
        tracing::trace_span!("populate.segment", uid = schema.uid(), segment = %head).entered();

    let Some(attribute) = schema.attribute(head) else {
        return (PopulateNode::default(), false);
    };

    let target = match &attribute.kind {
        AttributeKind::Scalar => {
            return if rest.is_empty() {
                (PopulateNode::with_fields([head.as_str()]), true)
            } else {
                (PopulateNode::default(), false)
            };
        }
        AttributeKind::Relation(RelationTarget::Polymorphic)
        | AttributeKind::DynamicZone { .. } => {
            return (PopulateNode::default(), false);
        }
        AttributeKind::Relation(RelationTarget::Fixed(target)) => target.as_str(),
        AttributeKind::Media => MEDIA_UID,
        AttributeKind::Component { component, .. } => component.as_str(),
    };

    let (child, conclusive) = if rest.is_empty() {
        (PopulateNode::default(), true)
    } else {
        let Ok(target_schema) = registry.schema_of(target) else {
            return (PopulateNode::default(), false);
        };
        resolve(rest, &target_schema, registry)
    };

    (
        PopulateNode::default().with_child(head.as_str(), child),
        conclusive,
    )
}
