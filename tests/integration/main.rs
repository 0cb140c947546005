//! Integration tests for the analysis pipeline
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! fetch → analyze → store cycle end-to-end.

mod pipeline_tests;
mod store_tests;
