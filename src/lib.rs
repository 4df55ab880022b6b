//! Client library and CLI for the grid manager's WAPI file operations.
//!
//! The core is the two-phase file transfer and long-running task lifecycle:
//! uploading local files through `uploadinit`, submitting jobs that consume
//! the upload token, polling CSV import tasks, and downloading artifacts
//! that must be acknowledged with `downloadcomplete`.
//!
//! # Modules
//!
//! - `transport`: the `Transport` trait every request goes through
//! - `http_utils`: `reqwest` implementation of `Transport`
//! - `retry`: bounded exponential backoff for transient failures
//! - `url_rewrite`: host normalization of server-issued URLs
//! - `cancel`: cooperative cancellation
//! - `fileop`: upload, download, job submission and task polling
//! - `client`: high-level operations; `blocking` wraps them for sync callers
//! - `model`: CSV import file checks and output records
//! - `commands`, `actions`, `cli`: the `wapictl` command-line interface

pub mod actions;
pub mod blocking;
pub mod cancel;
pub mod cli;
pub mod client;
pub mod commands;
pub mod configuration;
pub mod error;
pub mod error_utils;
pub mod exit_codes;
pub mod fileop;
pub mod format;
pub mod http_utils;
pub mod model;
pub mod retry;
pub mod transport;
pub mod url_rewrite;
