//! Service layer for business logic
//!
//! This module provides a clean abstraction layer between the CLI and the
//! graph engine. Services own the cluster handle and the per-request policy
//! (options, timeouts) and report errors with `anyhow` context.

pub mod graph_service;

pub use graph_service::GraphService;
