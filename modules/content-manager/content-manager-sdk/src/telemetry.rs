//! Fire-and-forget product telemetry.

use serde_json::Value;

/// Event names emitted by the content manager.
pub mod events {
    /// The first record of a content type was created.
    pub const DID_CREATE_FIRST_ENTRY: &str = "didCreateFirstContentTypeEntry";
}

/// Telemetry transport.
///
/// `emit` must not block and must not fail; delivery problems are the sink's
/// business.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: &str, properties: Value);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn emit(&self, _event: &str, _properties: Value) {}
}
