use crate::app::{Effect, Message, Model, ToastLevel, update};
use crate::host::{HostPort, HostRequest};
use crate::render::Renderer;

use super::event_loop::RenderDebouncer;
use super::model::Prompt;

/// Delay between the last edit and the preview render.
pub const RENDER_DEBOUNCE_MS: u64 = 200;

/// Owns the model and carries out the effects `update` asks for.
///
/// Generic over the host so tests can record requests instead of
/// reading files.
pub struct Controller<H: HostPort> {
    model: Model,
    host: H,
    renderer: Renderer,
    debouncer: RenderDebouncer,
}

impl<H: HostPort> Controller<H> {
    pub fn new(model: Model, host: H, renderer: Renderer) -> Self {
        Self {
            model,
            host,
            renderer,
            debouncer: RenderDebouncer::new(RENDER_DEBOUNCE_MS),
        }
    }

    pub const fn model(&self) -> &Model {
        &self.model
    }

    pub(super) const fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Whether an edit is waiting for the preview to catch up.
    pub const fn render_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Apply `msg` at time `now_ms` and run the resulting effects.
    pub fn dispatch(&mut self, msg: Message, now_ms: u64) {
        let (model, effects) = update(std::mem::take(&mut self.model), msg);
        self.model = model;
        for effect in effects {
            self.apply(effect, now_ms);
        }
    }

    /// Fire the debounced render if its quiet period has elapsed.
    ///
    /// Returns `true` when a render ran.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.debouncer.take_ready(now_ms) {
            self.dispatch(Message::RenderDue, now_ms);
            return true;
        }
        false
    }

    fn apply(&mut self, effect: Effect, now_ms: u64) {
        match effect {
            Effect::Confirm { prompt, action } => {
                self.model.prompt = Some(Prompt::Confirm {
                    message: prompt.to_string(),
                    action,
                });
            }
            Effect::PickFile => {
                self.model.prompt = Some(Prompt::OpenPath {
                    input: String::new(),
                });
            }
            Effect::ReadFile { ticket, path } => {
                if let Err(err) = self.host.request(HostRequest::Read { ticket, path }) {
                    tracing::warn!(%err, "could not reach host");
                    self.model
                        .show_toast(ToastLevel::Warning, format!("File access unavailable: {err}"));
                }
            }
            Effect::Alert(message) => self.model.show_toast(ToastLevel::Error, message),
            Effect::ScheduleRender => self.debouncer.queue(now_ms),
            Effect::RenderNow => {
                self.debouncer.cancel();
                self.render_preview();
            }
        }
    }

    fn render_preview(&mut self) {
        let source = self.model.buffer.text();
        self.model.rendered_html = self.renderer.render(&source, self.model.current_dir());
        let max = self.model.preview_line_count().saturating_sub(1);
        self.model.preview_scroll = self.model.preview_scroll.min(max);
    }
}

impl<H: HostPort> std::fmt::Debug for Controller<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("model", &self.model)
            .field("render_pending", &self.debouncer.is_pending())
            .finish_non_exhaustive()
    }
}
