//! HTTP routes for the worker's external introspection surface.
//!
//! This is a thin I/O wrapper around the pipeline's read-only accessors;
//! the pipeline itself owns no HTTP surface.

pub mod health;
pub mod test_email;
