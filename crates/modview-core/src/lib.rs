//! ModView Core - change-tree model and codec contract
//!
//! This crate provides the foundations the projection layer is built on:
//! - Schema-level change trees (`ChangeNode`, `Payload`, `NodeKey`)
//! - The `Codec` contract translating schema nodes into application values
//! - A reference `SchemaCodec` with a bounded interning cache
//! - Error facility, logging facility and configuration

pub mod codec;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod schema;
pub mod tree;

pub use modview_core_types as core_types;

// Re-export commonly used types
pub use codec::{Addressability, ChildCodec, Codec, CodecKind, Step, StepTarget};
pub use config::ProjectionConfig;
pub use errors::{ExError, ExErrorKind, ProjectionError, Result};
pub use schema::{CaseNode, CodecCache, DataObject, SchemaCodec, SchemaNode};
pub use tree::{ChangeKind, ChangeNode, NodeKey, Payload, PayloadBody, PayloadShape};
