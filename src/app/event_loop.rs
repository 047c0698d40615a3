use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::SetTitle;
use ratatui::DefaultTerminal;

use crate::app::{App, Controller, Message, Model};
use crate::host::{self, HostHandle};
use crate::render::Renderer;

use super::input;

/// How long the loop waits for input when nothing else is due. Bounds
/// the latency of host events.
const IDLE_POLL_MS: u64 = 50;

/// Holds back a render until edits have been quiet for `delay_ms`.
#[derive(Debug)]
pub struct RenderDebouncer {
    delay_ms: u64,
    queued_at: Option<u64>,
}

impl RenderDebouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            queued_at: None,
        }
    }

    /// Start or restart the quiet period at `now_ms`.
    pub const fn queue(&mut self, now_ms: u64) {
        self.queued_at = Some(now_ms);
    }

    /// Whether the quiet period has elapsed. Fires at most once per queue.
    pub fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(queued_at) = self.queued_at else {
            return false;
        };
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.queued_at = None;
            return true;
        }
        false
    }

    pub const fn cancel(&mut self) {
        self.queued_at = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.queued_at.is_some()
    }
}

impl App {
    /// Start the host, take over the terminal and run until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the host thread cannot start, the terminal
    /// cannot be initialised, or drawing fails.
    pub fn run(&mut self) -> Result<()> {
        let host = host::spawn(self.launch.clone()).context("Failed to start file host")?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; mdviewer requires an interactive terminal")?;
        let size = terminal.size()?;
        let model = Model::new(self.launch.mode, (size.width, size.height));
        let mut controller = Controller::new(model, host, Renderer::new());

        let result = execute!(stdout(), EnableBracketedPaste)
            .context("Failed to enable bracketed paste")
            .and_then(|()| Self::event_loop(&mut terminal, &mut controller));

        let _ = execute!(stdout(), DisableBracketedPaste);
        ratatui::restore();

        result
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        controller: &mut Controller<HostHandle>,
    ) -> Result<()> {
        let start = Instant::now();
        let elapsed_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut needs_render = true;
        let mut shown_title = String::new();

        loop {
            let now_ms = elapsed_ms();

            for event in controller.host().drain_events() {
                controller.dispatch(Message::from(event), now_ms);
                needs_render = true;
            }

            if controller.tick(now_ms) {
                needs_render = true;
            }

            if controller.model_mut().expire_toast(Instant::now()) {
                needs_render = true;
            }

            let poll_ms = if needs_render {
                0
            } else if controller.render_pending() {
                10
            } else {
                IDLE_POLL_MS
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Drain bursts (key repeat, paste) before drawing once.
                loop {
                    let event = event::read()?;
                    if let Some(msg) = input::handle_event(&event, controller.model()) {
                        tracing::trace!(?msg, "input");
                        controller.dispatch(msg, elapsed_ms());
                        needs_render = true;
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }

            if needs_render {
                let title = controller.model().title();
                if title != shown_title {
                    execute!(stdout(), SetTitle(&title))?;
                    shown_title = title;
                }
                terminal.draw(|frame| crate::ui::render(controller.model(), frame))?;
                needs_render = false;
            }

            if controller.model().should_quit {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debouncer_waits_for_quiet_period() {
        let mut debouncer = RenderDebouncer::new(200);
        debouncer.queue(1_000);
        assert!(!debouncer.take_ready(1_199));
        assert!(debouncer.take_ready(1_200));
        assert!(!debouncer.take_ready(1_500), "fires once per queue");
    }

    #[test]
    fn test_requeue_restarts_timer() {
        let mut debouncer = RenderDebouncer::new(200);
        debouncer.queue(0);
        debouncer.queue(150);
        assert!(!debouncer.take_ready(250));
        assert!(debouncer.take_ready(350));
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut debouncer = RenderDebouncer::new(200);
        debouncer.queue(0);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.take_ready(1_000));
    }
}
