//! Shared CLI plumbing for the server and client demo binaries.

pub mod args;
pub mod tracing_setup;
