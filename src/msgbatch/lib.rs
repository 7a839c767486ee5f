//! # msgbatch Architecture
//!
//! msgbatch drafts, submits and tracks Message Batches jobs. The terminal menu is
//! one client of a library that knows nothing about terminals.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Prompts, menus, table rendering                          │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Owns the gateway and the monitored batches               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Draft editing, import, submit, monitor, manage           │
//! │  - Returns `Result<CmdResult>`, never prints                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Gateway Layer (gateway/)                                   │
//! │  - BatchGateway trait                                       │
//! │  - HttpGateway (production), InMemoryGateway (testing)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes plain Rust values and returns
//! `Result<CmdResult>`. It never writes to stdout/stderr and never exits the
//! process. Diagnostics go through `tracing`; user-facing text goes into
//! [`commands::CmdMessage`]s that the client decides how to show.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: unit tests against [`gateway::memory::InMemoryGateway`].
//! 2. **API**: dispatch tests.
//! 3. **Gateway**: `tests/` drives [`gateway::http::HttpGateway`] against a mock server.
//! 4. **CLI**: scripted prompts in, captured output out.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic for each operation
//! - [`gateway`]: Remote service abstraction and implementations
//! - [`model`]: Core data types (`BatchItem`, `Draft`, `BatchStatusSnapshot`)
//! - [`config`]: Environment configuration
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
