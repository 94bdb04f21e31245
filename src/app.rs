//! Main application state: the timer, its active profile and settings.

use crate::models::{Settings, TimerMode, TimerProfile};
use crate::persistence::StoreError;
use crate::profiles;
use crate::timer::{reduce, Action, Context, Effect, TimerState};
use chrono::{DateTime, Local};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only view of the timer for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub time_remaining: u32,
    pub total_time: u32,
    pub current_pomodoro: u32,
    pub pomodoros_per_cycle: u32,
    pub is_running: bool,
    pub active_task_id: Option<String>,
    pub profile_name: String,
}

impl TimerSnapshot {
    /// Elapsed share of the current interval, 0.0 to 1.0.
    pub fn progress(&self) -> f32 {
        if self.total_time == 0 {
            return 1.0;
        }
        1.0 - (self.time_remaining as f32 / self.total_time as f32)
    }
}

/// Owns the single timer state and serializes every transition through it.
pub struct App {
    state: TimerState,
    profile: TimerProfile,
    settings: Settings,
    auto_start_delay: Duration,
    subscribers: Vec<Sender<TimerSnapshot>>,
}

impl App {
    /// Creates an idle timer for the profile the settings point at.
    pub fn new(settings: Settings, auto_start_delay: Duration) -> Self {
        let profile =
            profiles::resolve_or_default(&settings.active_profile_id, &settings.custom_profiles);
        Self {
            state: TimerState::new(&profile),
            profile,
            settings,
            auto_start_delay,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn profile(&self) -> &TimerProfile {
        &self.profile
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.state.mode,
            time_remaining: self.state.time_remaining,
            total_time: self.state.total_time,
            current_pomodoro: self.state.current_pomodoro,
            pomodoros_per_cycle: self.profile.pomodoros_per_cycle,
            is_running: self.state.is_running,
            active_task_id: self.state.active_task_id.clone(),
            profile_name: self.profile.name.clone(),
        }
    }

    /// Registers an observer that receives a snapshot after every change.
    pub fn subscribe(&mut self) -> Receiver<TimerSnapshot> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    /// Runs one action through the reducer and returns its effects.
    pub fn dispatch(&mut self, action: Action, now: DateTime<Local>) -> Vec<Effect> {
        let ctx = Context {
            profile: &self.profile,
            auto_start_breaks: self.settings.auto_start_breaks,
            auto_start_work: self.settings.auto_start_work,
            auto_start_delay: self.auto_start_delay,
            now,
        };
        let transition = reduce(&self.state, action, &ctx);
        let changed = transition.state != self.state;
        self.state = transition.state;
        if changed {
            self.notify();
        }
        transition.effects
    }

    pub fn on_tick(&mut self, now: DateTime<Local>) -> Vec<Effect> {
        self.dispatch(Action::Tick, now)
    }

    pub fn on_start(&mut self, now: DateTime<Local>) -> Vec<Effect> {
        self.dispatch(Action::Start, now)
    }

    pub fn on_pause(&mut self, now: DateTime<Local>) -> Vec<Effect> {
        self.dispatch(Action::Pause, now)
    }

    pub fn on_reset(&mut self, now: DateTime<Local>) -> Vec<Effect> {
        self.dispatch(Action::Reset, now)
    }

    pub fn on_skip_break(&mut self, now: DateTime<Local>) -> Vec<Effect> {
        self.dispatch(Action::SkipBreak, now)
    }

    pub fn on_select_task(&mut self, task_id: Option<String>, now: DateTime<Local>) -> Vec<Effect> {
        self.dispatch(Action::SelectTask(task_id), now)
    }

    pub fn on_auto_start(&mut self, token: u64, now: DateTime<Local>) -> Vec<Effect> {
        self.dispatch(Action::AutoStart { token }, now)
    }

    /// Adopts new settings. The timer is only reset when the resolved
    /// profile actually changes; otherwise notices and the ambient loop
    /// already in flight are brought in line with the new toggles.
    pub fn apply_settings(&mut self, settings: Settings, now: DateTime<Local>) -> Vec<Effect> {
        let profile =
            profiles::resolve_or_default(&settings.active_profile_id, &settings.custom_profiles);
        let previous = std::mem::replace(&mut self.settings, settings);
        if profile == self.profile {
            return self.realign_alerts(&previous);
        }
        self.profile = profile;
        let effects = self.dispatch(Action::ApplyProfile, now);
        // Same-length profiles leave the state equal; observers still need the new name.
        self.notify();
        effects
    }

    fn realign_alerts(&self, previous: &Settings) -> Vec<Effect> {
        let mut effects = Vec::new();
        let running = self.state.is_running && self.state.mode != TimerMode::Idle;

        match (previous.notifications_enabled, self.settings.notifications_enabled) {
            (true, false) => effects.push(Effect::CancelEndNotice),
            (false, true) if running => effects.push(Effect::ScheduleEndNotice {
                mode: self.state.mode,
                after_secs: self.state.time_remaining,
            }),
            _ => {}
        }

        let (before, after) = (previous.ambient(), self.settings.ambient());
        if before != after {
            if before.is_some() {
                effects.push(Effect::StopAmbient);
            }
            if after.is_some() && running && self.state.mode == TimerMode::Work {
                effects.push(Effect::StartAmbient);
            }
        }
        effects
    }
}
