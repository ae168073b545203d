//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Driver`]: Platform-specific I/O
//!
//! One input event or one received frame is fully processed before the next
//! is looked at. A failed send is logged and surfaced on the status line; the
//! optimistic append it belongs to stays in the transcript.

use chatwho_core::env::Environment;

use crate::{App, AppAction, AppEvent, Driver};

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Open the room channel before the first cycle.
    pub connect_on_start: bool,
    /// Upper bound on frames drained per cycle, so input stays responsive
    /// while a large backlog arrives.
    pub max_frames_per_cycle: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { connect_on_start: true, max_frames_per_cycle: 64 }
    }
}

/// Generic runtime that orchestrates App and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for identifier generation
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App<E>,
    config: RuntimeConfig,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a new runtime with the given driver and app.
    pub fn new(driver: D, app: App<E>, config: RuntimeConfig) -> Self {
        Self { driver, app, config }
    }

    /// Run the main event loop.
    ///
    /// This is the core orchestration loop that:
    /// 1. Polls for input events from the driver
    /// 2. Receives frames from the room channel
    /// 3. Executes the actions the App returns
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails. Channel errors are reported to
    /// the App instead.
    pub async fn run(mut self) -> Result<App<E>, D::Error> {
        self.driver.render(&self.app)?;

        let mut should_quit = self.config.connect_on_start && self.connect().await?;

        while !should_quit {
            should_quit = self.process_cycle().await?;
        }

        self.driver.stop();
        Ok(self.app)
    }

    /// Open the room channel.
    ///
    /// Returns `true` if the application should quit.
    pub async fn connect(&mut self) -> Result<bool, D::Error> {
        let actions = self.app.connect();
        self.process_actions(actions).await
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    pub async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        match self.driver.poll_event().await {
            Ok(Some(event)) => {
                if self.dispatch(event).await? {
                    return Ok(true);
                }
            },
            Ok(None) => {},
            Err(e) => {
                tracing::warn!(error = %e, "failed to poll input");
                if self.dispatch(AppEvent::Error { message: e.to_string() }).await? {
                    return Ok(true);
                }
            },
        }

        let mut drained = 0;
        while drained < self.config.max_frames_per_cycle && self.driver.is_connected() {
            let Some(raw) = self.driver.recv_frame().await else {
                break;
            };
            drained += 1;
            if self.dispatch(AppEvent::FrameReceived(raw)).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn dispatch(&mut self, event: AppEvent) -> Result<bool, D::Error> {
        let actions = self.app.handle(event);
        self.process_actions(actions).await
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Connect { room } => {
                        pending_actions.extend(self.app.handle(AppEvent::Connecting));
                        let event = match self.driver.connect(&room).await {
                            Ok(()) => {
                                tracing::info!("Connected to room {}", room);
                                AppEvent::Connected
                            },
                            Err(e) => {
                                tracing::warn!(error = %e, "failed to connect to room {}", room);
                                AppEvent::Disconnected { reason: e.to_string() }
                            },
                        };
                        pending_actions.extend(self.app.handle(event));
                    },
                    AppAction::SendFrame(frame) => {
                        let kind = frame.kind();
                        if let Err(e) = self.driver.send_frame(frame).await {
                            tracing::warn!(error = %e, %kind, "failed to send frame");
                            self.app.set_status(format!("Send failed: {e}"));
                            pending_actions.push(AppAction::Render);
                        }
                    },
                }
            }
        }
        Ok(false)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App<E> {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App<E> {
        &mut self.app
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
