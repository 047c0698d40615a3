// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::Renderer)
    clippy::module_name_repetitions
)]

//! # mdviewer
//!
//! A terminal markdown viewer and editor with a live HTML preview.
//!
//! - Source, split and rendered view modes
//! - Debounced re-rendering while typing
//! - Unsaved-changes guard on open and reload
//! - Change detection for the file on disk
//!
//! ## Architecture
//!
//! mdviewer uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions that return effects
//! - **View**: Render to terminal
//!
//! File reads and the watch run on a separate host thread that talks to
//! the display over channels.
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`config`]: Launch mode and file resolution
//! - [`document`]: The loaded markdown file
//! - [`editor`]: Editable source buffer
//! - [`highlight`]: Syntax highlighting for code blocks
//! - [`host`]: File access worker
//! - [`render`]: Markdown to HTML
//! - [`ui`]: Terminal UI components
//! - [`watcher`]: File watching

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod highlight;
pub mod host;
pub mod render;
pub mod ui;
pub mod watcher;
