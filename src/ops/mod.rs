//! High-level operations.
//!
//! This module contains the implementation of logmodel commands.

pub mod render;
pub mod replay;

pub use render::{render_summary, render_tree, summarize, RenderOptions, Summary};
pub use replay::{feed, parse_events, read_events, replay, replay_file, ReplayOptions};
