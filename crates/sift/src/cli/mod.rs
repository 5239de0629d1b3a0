//! CLI module for sift
//!
//! Config resolution, the non-interactive modes (`--filter`,
//! `--list-rules`) and the interactive picker.

pub mod config;
pub mod error;
pub mod pick;
pub mod rules;
pub mod tui;
