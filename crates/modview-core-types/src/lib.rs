//! Core types shared across modview facilities
//!
//! This crate provides the foundational vocabulary used by both the error
//! facility and the logging facility:
//!
//! - **Schema constants**: canonical field keys and event names

pub mod schema;
