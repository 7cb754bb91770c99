//! joycal library - Joystick calibration profile database.
//!
//! This library exposes the core functionality of the `joycal` CLI for use in
//! tests and by other applications that apply calibrations to devices.
//!
//! # Modules
//!
//! - `db`: Profile keys, the file codec, the in-memory store and directory reconciliation
//! - `error`: Error types with user-recoverable hints
//! - `config`: Settings file and default paths
//! - `logging`: Tracing subscriber setup
//! - `cli`: Command-line definitions
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
