//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions, returning [`Effect`]s instead of
//!   performing them
//! - [`Controller`]: Runs effects against the host and the renderer
//! - [`App::run`]: Terminal event loop

mod effects;
mod event_loop;
mod input;
mod mode;
mod model;
mod update;

pub use effects::{Controller, RENDER_DEBOUNCE_MS};
pub use event_loop::RenderDebouncer;
pub use mode::{Panes, UnknownViewMode, ViewMode};
pub use model::{
    APP_NAME, FOOTER_ROWS, GuardedAction, LoadPurpose, Model, PendingLoad, Prompt, ToastLevel,
};
pub use update::{Effect, Message, update};

use crate::config::LaunchOptions;

/// Owns the launch settings and runs the interactive viewer.
#[derive(Debug, Clone)]
pub struct App {
    launch: LaunchOptions,
}

impl App {
    pub const fn new(launch: LaunchOptions) -> Self {
        Self { launch }
    }
}
