//! The single-threaded loop that feeds the timer.
//!
//! User input, due ticks and auto-starts all arrive here and are
//! dispatched one at a time, so the timer state has exactly one writer.

use crate::app::{App, TimerSnapshot};
use crate::effects::{Alerts, EffectRunner};
use crate::event::{self, EventResult};
use crate::persistence::SharedStore;
use crate::scheduler::{Due, Scheduler};
use crate::status;
use crate::timer::Effect;
use chrono::{DateTime, Local};
use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long to block when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    Line(String),
    InputClosed,
}

pub struct Driver<A: Alerts, W: Write> {
    app: App,
    store: SharedStore,
    runner: EffectRunner<A>,
    scheduler: Scheduler,
    out: W,
}

impl<A: Alerts, W: Write> Driver<A, W> {
    pub fn new(app: App, store: SharedStore, runner: EffectRunner<A>, out: W) -> Self {
        Self {
            app,
            store,
            runner,
            scheduler: Scheduler::default(),
            out,
        }
    }

    #[cfg(test)]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Runs until the user quits or input closes.
    pub fn run(&mut self, events: Receiver<DriverEvent>) -> io::Result<()> {
        info!("timer ready");
        loop {
            let timeout = self
                .scheduler
                .next_deadline()
                .map(|at| at.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_POLL);

            match events.recv_timeout(timeout) {
                Ok(DriverEvent::Line(line)) => {
                    if self.handle_line(&line, Local::now(), Instant::now())?.is_break() {
                        break;
                    }
                }
                Ok(DriverEvent::InputClosed) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
            self.run_due(Local::now(), Instant::now());
        }
        debug!("driver stopped");
        Ok(())
    }

    /// Parses and handles one line of input.
    pub fn handle_line(
        &mut self,
        line: &str,
        now: DateTime<Local>,
        instant: Instant,
    ) -> io::Result<ControlFlow<()>> {
        let command = match event::parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(ControlFlow::Continue(())),
            Err(err) => {
                writeln!(self.out, "{err}")?;
                return Ok(ControlFlow::Continue(()));
            }
        };

        match event::handle_command(&mut self.app, &self.store, command, now) {
            EventResult::Quit => return Ok(ControlFlow::Break(())),
            EventResult::StateChanged(effects) => self.apply(effects, instant),
            EventResult::Message(text) => {
                writeln!(self.out, "{text}")?;
                // Commands such as `rm` may also have cleared the active task.
                self.scheduler.sync_ticking(self.app.state().is_running, instant);
            }
            EventResult::Continue => {}
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Dispatches every tick and auto-start that is due at `instant`.
    /// Effects are anchored to each item's own deadline.
    pub fn run_due(&mut self, now: DateTime<Local>, instant: Instant) {
        while let Some((at, due)) = self.scheduler.pop_due(instant) {
            let effects = match due {
                Due::Tick => self.app.on_tick(now),
                Due::AutoStart { token } => {
                    debug!(token, "auto-start due");
                    self.app.on_auto_start(token, now)
                }
            };
            self.apply(effects, at);
        }
    }

    fn apply(&mut self, effects: Vec<Effect>, instant: Instant) {
        self.runner
            .apply(effects, self.app.settings(), &mut self.scheduler, instant);
        self.scheduler.sync_ticking(self.app.state().is_running, instant);
    }
}

/// Forwards stdin lines to the driver.
pub fn spawn_input(tx: Sender<DriverEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(DriverEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(DriverEvent::InputClosed);
    })
}

/// Prints every snapshot as an in-place status line.
pub fn spawn_renderer(snapshots: Receiver<TimerSnapshot>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stdout = io::stdout();
        for snapshot in snapshots {
            let line = format!(
                "\r\x1b[2K{}  {}",
                status::format_status(&snapshot),
                status::format_progress(&snapshot)
            );
            if stdout
                .write_all(line.as_bytes())
                .and_then(|_| stdout.flush())
                .is_err()
            {
                break;
            }
        }
    })
}
