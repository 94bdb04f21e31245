//! Timer state machine.
//!
//! [`reduce`] is a pure function of `(state, action, context)`: it never
//! touches the store, the clock or the OS. Everything that has to happen
//! outside the machine is returned as a list of [`Effect`]s, which the
//! caller interprets (see `effects.rs`).
//!
//! ```text
//! Idle --start--> Work --0--> ShortBreak --0--> Work ... Work --0--> LongBreak --0--> Work
//!   ^                                                                          |
//!   +------------------------------ reset / apply profile ---------------------+
//! ```

use crate::models::{day_key, CompletedSession, TimerMode, TimerProfile};
use chrono::{DateTime, Local, NaiveDate, Utc};
use std::time::Duration;

/// Mutable timer state. Only [`reduce`] produces new values.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerState {
    pub mode: TimerMode,
    /// Seconds left in the current interval.
    pub time_remaining: u32,
    /// Length of the current interval in seconds.
    pub total_time: u32,
    /// Position within the cycle, starting at 1.
    pub current_pomodoro: u32,
    pub is_running: bool,
    pub active_task_id: Option<String>,
    /// Set by Start; cleared by reset and by recording the session.
    pub session_started_at: Option<DateTime<Utc>>,
    /// True once the zero of the current interval has been handled.
    pub completion_handled: bool,
    /// Token of the auto-start waiting to fire.
    pub pending_auto_start: Option<u64>,
    next_token: u64,
}

impl TimerState {
    /// Idle state sized for the profile's work duration.
    pub fn new(profile: &TimerProfile) -> Self {
        let total_time = profile.seconds_for(TimerMode::Work);
        Self {
            mode: TimerMode::Idle,
            time_remaining: total_time,
            total_time,
            current_pomodoro: 1,
            is_running: false,
            active_task_id: None,
            session_started_at: None,
            completion_handled: false,
            pending_auto_start: None,
            next_token: 0,
        }
    }

    fn enter(&mut self, mode: TimerMode, profile: &TimerProfile) {
        self.mode = mode;
        self.total_time = profile.seconds_for(mode);
        self.time_remaining = self.total_time;
        self.completion_handled = false;
    }

    fn completion_due(&self) -> bool {
        self.mode != TimerMode::Idle && self.time_remaining == 0 && !self.completion_handled
    }

    fn cancel_auto_start(&mut self, effects: &mut Vec<Effect>) {
        if self.pending_auto_start.take().is_some() {
            effects.push(Effect::CancelAutoStart);
        }
    }

    fn allocate_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }
}

/// Inputs to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Start,
    Pause,
    Reset,
    /// One elapsed second.
    Tick,
    SkipBreak,
    SelectTask(Option<String>),
    /// Re-initialise from the profile in the context.
    ApplyProfile,
    /// A scheduled auto-start firing.
    AutoStart { token: u64 },
}

/// A durable write requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    AppendSession(CompletedSession),
    IncrementPomodoro { date: NaiveDate, work_minutes: u32 },
    CreditTask { task_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Start,
    Pause,
    Reset,
    Skip,
}

/// Side effects for the caller to run after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Persist(StoreWrite),
    ScheduleAutoStart { token: u64, delay: Duration },
    CancelAutoStart,
    ScheduleEndNotice { mode: TimerMode, after_secs: u32 },
    CancelEndNotice,
    PlayAlarm { finished: TimerMode },
    StartAmbient,
    StopAmbient,
    Haptic(HapticKind),
}

/// Everything a transition may read besides the state itself.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    pub profile: &'a TimerProfile,
    pub auto_start_breaks: bool,
    pub auto_start_work: bool,
    pub auto_start_delay: Duration,
    pub now: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: TimerState,
    pub effects: Vec<Effect>,
}

/// Applies one action and returns the next state plus its effects.
///
/// Actions that make no sense in the current state (skipping while
/// working, ticking while paused, a stale auto-start) leave the state
/// unchanged and produce no effects.
pub fn reduce(state: &TimerState, action: Action, ctx: &Context<'_>) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match action {
        Action::Start => {
            next.cancel_auto_start(&mut effects);
            start(&mut next, ctx, &mut effects);
            effects.push(Effect::Haptic(HapticKind::Start));
        }
        Action::AutoStart { token } => {
            if next.pending_auto_start == Some(token) && !next.is_running {
                next.pending_auto_start = None;
                start(&mut next, ctx, &mut effects);
            }
        }
        Action::Pause => {
            next.cancel_auto_start(&mut effects);
            next.is_running = false;
            effects.push(Effect::CancelEndNotice);
            effects.push(Effect::StopAmbient);
            effects.push(Effect::Haptic(HapticKind::Pause));
        }
        Action::Tick => {
            if next.is_running {
                next.time_remaining = next.time_remaining.saturating_sub(1);
                if next.completion_due() {
                    complete(&mut next, ctx, &mut effects);
                }
            }
        }
        Action::Reset => {
            idle(&mut next, ctx.profile, &mut effects);
            effects.push(Effect::Haptic(HapticKind::Reset));
        }
        Action::SkipBreak => {
            if next.mode.is_break() {
                next.cancel_auto_start(&mut effects);
                next.enter(TimerMode::Work, ctx.profile);
                effects.push(Effect::CancelEndNotice);
                if next.is_running {
                    next.session_started_at = Some(ctx.now.with_timezone(&Utc));
                    effects.push(Effect::ScheduleEndNotice {
                        mode: next.mode,
                        after_secs: next.time_remaining,
                    });
                    effects.push(Effect::StartAmbient);
                } else {
                    next.session_started_at = None;
                }
                effects.push(Effect::Haptic(HapticKind::Skip));
            }
        }
        Action::SelectTask(task_id) => {
            next.active_task_id = task_id;
        }
        Action::ApplyProfile => {
            idle(&mut next, ctx.profile, &mut effects);
        }
    }

    Transition {
        state: next,
        effects,
    }
}

fn start(state: &mut TimerState, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
    if state.mode == TimerMode::Idle {
        state.enter(TimerMode::Work, ctx.profile);
    }
    state.is_running = true;
    state.session_started_at = Some(ctx.now.with_timezone(&Utc));
    effects.push(Effect::ScheduleEndNotice {
        mode: state.mode,
        after_secs: state.time_remaining,
    });
    if state.mode == TimerMode::Work {
        effects.push(Effect::StartAmbient);
    }
}

fn idle(state: &mut TimerState, profile: &TimerProfile, effects: &mut Vec<Effect>) {
    state.cancel_auto_start(effects);
    state.is_running = false;
    state.enter(TimerMode::Idle, profile);
    state.current_pomodoro = 1;
    state.session_started_at = None;
    effects.push(Effect::CancelEndNotice);
    effects.push(Effect::StopAmbient);
}

/// The completion boundary: runs once when a non-idle interval hits zero.
fn complete(state: &mut TimerState, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
    let profile = ctx.profile;
    let finished = state.mode;
    state.is_running = false;
    state.completion_handled = true;

    if let (Some(started_at), Some(kind)) = (state.session_started_at.take(), finished.session_kind())
    {
        effects.push(Effect::Persist(StoreWrite::AppendSession(
            CompletedSession::new(
                state.active_task_id.clone(),
                started_at,
                ctx.now.with_timezone(&Utc),
                profile.minutes_for(finished),
                kind,
            ),
        )));
    }

    let auto_start = if finished == TimerMode::Work {
        effects.push(Effect::Persist(StoreWrite::IncrementPomodoro {
            date: day_key(ctx.now),
            work_minutes: profile.work_duration,
        }));
        if let Some(task_id) = &state.active_task_id {
            effects.push(Effect::Persist(StoreWrite::CreditTask {
                task_id: task_id.clone(),
            }));
        }
        effects.push(Effect::StopAmbient);

        if state.current_pomodoro >= profile.pomodoros_per_cycle {
            state.current_pomodoro = 1;
            state.enter(TimerMode::LongBreak, profile);
        } else {
            state.current_pomodoro += 1;
            state.enter(TimerMode::ShortBreak, profile);
        }
        ctx.auto_start_breaks
    } else {
        state.enter(TimerMode::Work, profile);
        ctx.auto_start_work
    };

    effects.push(Effect::PlayAlarm { finished });

    if auto_start {
        let token = state.allocate_token();
        state.pending_auto_start = Some(token);
        effects.push(Effect::ScheduleAutoStart {
            token,
            delay: ctx.auto_start_delay,
        });
    }
}
