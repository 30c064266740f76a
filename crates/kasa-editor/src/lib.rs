//! # kasa-editor — Editor core for kasa
//!
//! This crate contains the fundamental building blocks of the editor:
//!
//! - **[`position`]** — `Position` (line, col), 0-indexed and ordered
//! - **[`row`]** — one line of text with its rendered form and highlight tags
//! - **[`buffer`]** — the row vector with editing, dirty tracking, and filetype
//! - **[`syntax`]** — per-row highlighting with block-comment propagation
//! - **[`mode`]** — vi-style modal editing (`Normal`, `Insert`, `Visual`, `VisualLine`)
//! - **[`selection`]** — visual-mode anchors, extraction, and range deletion
//! - **[`undo`]** — snapshot stacks with keystroke coalescing
//! - **[`word`]** — separator-class word motions
//! - **[`editor`]** — the state aggregate and per-mode key dispatch
//! - **[`command`]** — `:` command parsing
//! - **[`search`]** — incremental `/` search sessions
//! - **[`config`]** — `.kasarc` loading
//! - **[`file`]** — line-based load/save
//!
//! The binary crate wires an [`editor::Editor`] to a `kasa_term::Terminal`
//! and owns the render loop and prompts.

pub mod buffer;
pub mod command;
pub mod config;
pub mod editor;
pub mod file;
pub mod mode;
pub mod position;
pub mod row;
pub mod search;
pub mod selection;
pub mod syntax;
pub mod undo;
pub mod word;

pub use buffer::Buffer;
pub use editor::{Action, CommandOutcome, Editor};
pub use mode::Mode;
pub use position::Position;
