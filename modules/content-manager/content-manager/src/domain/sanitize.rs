//! Write-input sanitization pipeline.
//!
//! Input goes through a fixed sequence of filtering stages and is stamped
//! with audit metadata last. [`InputPipeline::run`] is the only way this crate
//! produces a [`SanitizedInput`], so the order cannot be rearranged by callers.

use content_manager_sdk::{AuditStamp, ContentTypeSchema, Entity, SanitizedInput};
use serde_json::{Map, Value};

use super::permission::PermissionChecker;

/// One filtering step of the input pipeline.
pub trait InputStage {
    fn name(&self) -> &'static str;

    /// Remove disallowed attributes. Stages never add or rewrite values.
    fn apply(&self, input: Map<String, Value>) -> Map<String, Value>;
}

/// Drops attributes that are unknown to the schema, not writable, or reserved
/// for the system.
pub struct WritableAttributes<'a> {
    schema: &'a ContentTypeSchema,
}

impl<'a> WritableAttributes<'a> {
    #[must_use]
    pub fn new(schema: &'a ContentTypeSchema) -> Self {
        Self { schema }
    }
}

impl InputStage for WritableAttributes<'_> {
    fn name(&self) -> &'static str {
        "writable_attributes"
    }

    fn apply(&self, input: Map<String, Value>) -> Map<String, Value> {
        input
            .into_iter()
            .filter(|(name, _)| self.schema.is_writable(name))
            .collect()
    }
}

/// Which permission set the caller writes with.
pub enum WriteMode<'e> {
    Create,
    /// Update of an existing entry; only grants matching it count.
    Update(&'e Entity),
}

/// Drops attributes the caller's create/update grants do not cover.
pub struct PermittedFields<'c, 'e> {
    checker: &'c PermissionChecker<'c>,
    mode: WriteMode<'e>,
}

impl<'c, 'e> PermittedFields<'c, 'e> {
    #[must_use]
    pub fn new(checker: &'c PermissionChecker<'c>, mode: WriteMode<'e>) -> Self {
        Self { checker, mode }
    }
}

impl InputStage for PermittedFields<'_, '_> {
    fn name(&self) -> &'static str {
        match self.mode {
            WriteMode::Create => "permitted_create_fields",
            WriteMode::Update(_) => "permitted_update_fields",
        }
    }

    fn apply(&self, input: Map<String, Value>) -> Map<String, Value> {
        match self.mode {
            WriteMode::Create => self.checker.sanitize_create_input(input),
            WriteMode::Update(existing) => self.checker.sanitize_update_input(existing)(input),
        }
    }
}

/// Writable filter, then permission filter, then audit stamp.
pub struct InputPipeline<'a> {
    stages: [&'a dyn InputStage; 2],
}

impl<'a> InputPipeline<'a> {
    #[must_use]
    pub fn new(
        writable: &'a WritableAttributes<'a>,
        permitted: &'a PermittedFields<'a, 'a>,
    ) -> Self {
        Self {
            stages: [writable, permitted],
        }
    }

    /// Run every stage in order and stamp the result.
    #[must_use]
    pub fn run(&self, input: Map<String, Value>, stamp: &AuditStamp) -> SanitizedInput {
        let filtered = self.stages.iter().fold(input, |acc, stage| {
            let before = acc.len();
            let out = stage.apply(acc);
            tracing::trace!(
                stage = stage.name(),
                dropped = before.saturating_sub(out.len()),
                "Input stage applied"
            );
            out
        });
        SanitizedInput::stamped(filtered, stamp)
    }
}
