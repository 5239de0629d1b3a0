//! Reusable TUI widgets

pub mod action_bar;
