//! # Stagehand Architecture
//!
//! Stagehand synchronizes files between a set of named directory
//! "environments" — a local workspace, developer sandboxes, a production
//! tree — guarding every transfer with conflict detection, pre-overwrite
//! backups and a durable operation history. It is a **UI-agnostic library**
//! with a thin CLI client, not a CLI application with some library code.
//!
//! ## Layers
//!
//! ```text
//! CLI (main.rs, args.rs)         parses args, renders reports, exit codes
//!            │
//! API (api.rs)                   facade; owns collaborators + caller identity
//!            │
//! Commands (commands/*.rs)       push / pull / restore / compare / listing
//!            │
//! Services                       diff (conflicts + hashing), backup
//!                                (archives + retention), ledger (history),
//!                                audit (log sink), registry (env lookup)
//! ```
//!
//! From `api.rs` inward, code takes plain arguments, returns structured
//! reports, and never writes to stdout/stderr or exits. The same core could
//! serve an HTTP front-end unchanged.
//!
//! ## Key behaviors
//!
//! - Push fans out to many targets; each target succeeds or fails on its
//!   own, and each file within a target succeeds or fails on its own. The
//!   caller always gets a complete per-target, per-file report, never one
//!   pass/fail bit.
//! - Conflicts are detected by modification time (fast, metadata-only) and
//!   block a transfer unless forced; content-hash comparison is a separate,
//!   read-only facility.
//! - Backups snapshot the files a transfer is about to overwrite, as
//!   compressed archives in one flat directory with a retention cap.
//! - Every completed transfer lands in a JSON-backed ledger, newest-first,
//!   capped, queryable by user/action and aggregated into stats.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade — entry point for all operations
//! - [`commands`]: business logic per operation
//! - [`diff`]: conflict detection and content comparison
//! - [`backup`]: backup archives and retention
//! - [`ledger`]: durable operation history
//! - [`audit`]: append-only audit log sink
//! - [`registry`]: environment name → path resolution
//! - [`model`]: shared record and report types
//! - [`config`]: settings loading for the CLI client
//! - [`error`]: error types

pub mod api;
pub mod audit;
pub mod backup;
pub mod commands;
pub mod config;
pub mod diff;
pub mod error;
pub mod ledger;
pub mod model;
pub mod registry;
