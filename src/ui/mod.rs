//! Terminal UI components.
//!
//! Draws the source pane and the rendered preview for the current view
//! mode, the status bar with the mode selector and refresh affordance,
//! alerts, and the modal prompts.

mod overlays;
mod preview;
mod render;
mod status;

pub use preview::preview_lines;
pub use render::{PaneAreas, line_number_width, pane_areas, render, visible_start};
pub use status::{REFRESH_HINT, mode_selector};
