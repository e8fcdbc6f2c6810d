//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent between the logging macros,
//! the test capture layer and anything that parses emitted events.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Change-tree and codec identifiers
pub const FIELD_KEY: &str = "key";
pub const FIELD_STEP: &str = "step";
pub const FIELD_CLASS: &str = "class";
pub const FIELD_CODEC: &str = "codec";

// Collection sizes
pub const FIELD_CHILD_COUNT: &str = "child_count";
pub const FIELD_HOP_COUNT: &str = "hop_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
/// A child was dropped during best-effort enumeration
pub const EVENT_SKIP: &str = "skip";
