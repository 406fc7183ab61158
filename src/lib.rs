//! Tasktimer - a hierarchical task timer
//!
//! This library provides the core functionality for Tasktimer, including:
//! - Data models for tasks and timeslots
//! - The in-memory store and the mutation operations on it
//! - The derived view: durations, activity, ancestry and task trees
//! - The tracker, which applies mutations and notifies listeners
//! - Snapshot persistence and configuration
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use tasktimer::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(2);
//!     }
//! }
//! ```

pub mod cli;
pub mod db;
pub mod models;
pub mod repo;
pub mod tracker;
pub mod utils;
pub mod view;
