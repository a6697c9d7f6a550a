//! REST collaborator boundary.
//!
//! Persistence is delegated to an external resource client; the form only
//! depends on the call shape. Implementations live with the view layer (or
//! in tests as in-memory doubles).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Request shape for a resource call.
#[derive(Clone, Debug, Default)]
pub struct ResourceRequest {
    /// Record identifier, when addressing an existing record.
    pub id: Option<String>,
    /// Document payload for writes.
    pub data: Option<Value>,
    /// Metadata payload (version ids, correction flags).
    pub meta: Option<Value>,
    /// Client-side cache hint for reads.
    pub cache_for: Option<Duration>,
}

impl ResourceRequest {
    /// A read request for one record.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// A write request carrying a document and its metadata.
    pub fn write(id: Option<String>, data: Value, meta: Value) -> Self {
        Self {
            id,
            data: Some(data),
            meta: Some(meta),
            cache_for: None,
        }
    }
}

/// Result shape delivered by a resource call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceOutcome {
    /// True when the call failed.
    pub error: bool,
    /// Failure description, when `error` is set.
    pub message: Option<String>,
    /// Response document.
    pub data: Value,
    /// Response metadata.
    pub meta: Value,
}

impl ResourceOutcome {
    /// A successful outcome.
    pub fn ok(data: Value, meta: Value) -> Self {
        Self {
            error: false,
            message: None,
            data,
            meta,
        }
    }

    /// A failed outcome.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: Some(message.into()),
            data: Value::Null,
            meta: Value::Null,
        }
    }
}

/// The call contract a form's save path consumes.
///
/// No retry policy lives here; retries, cancellation, and caching belong to
/// the implementing collaborator.
pub trait ResourceClient {
    /// Fetch a record (or, without an id, the collection metadata).
    fn get(&self, request: ResourceRequest) -> ResourceOutcome;

    /// Persist a record.
    fn put(&self, request: ResourceRequest) -> ResourceOutcome;
}
