//! Data models for the Pomotrack application.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of interval the timer is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    /// No active interval, ready to start work.
    #[default]
    Idle,
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    /// Returns true for short and long breaks.
    pub fn is_break(self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }

    /// The session kind recorded when an interval of this mode finishes.
    pub fn session_kind(self) -> Option<SessionKind> {
        match self {
            Self::Idle => None,
            Self::Work => Some(SessionKind::Work),
            Self::ShortBreak => Some(SessionKind::ShortBreak),
            Self::LongBreak => Some(SessionKind::LongBreak),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Work => "Focus",
            Self::ShortBreak => "Short break",
            Self::LongBreak => "Long break",
        }
    }
}

/// Kind of a finished interval in the session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::ShortBreak => "shortBreak",
            Self::LongBreak => "longBreak",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(Self::Work),
            "shortBreak" => Ok(Self::ShortBreak),
            "longBreak" => Ok(Self::LongBreak),
            other => Err(format!("unknown session kind '{other}'")),
        }
    }
}

/// A named set of interval durations (minutes) and cycle length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerProfile {
    pub id: String,
    pub name: String,
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    /// Work intervals per cycle; the last one is followed by a long break.
    pub pomodoros_per_cycle: u32,
    pub description: String,
    #[serde(default)]
    pub is_custom: bool,
}

impl TimerProfile {
    /// Duration of the given mode in minutes. Idle uses the work duration.
    pub fn minutes_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Idle | TimerMode::Work => self.work_duration,
            TimerMode::ShortBreak => self.short_break_duration,
            TimerMode::LongBreak => self.long_break_duration,
        }
    }

    /// Duration of the given mode in seconds.
    pub fn seconds_for(&self, mode: TimerMode) -> u32 {
        self.minutes_for(mode) * 60
    }
}

/// Selectable alarm played when an interval finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlarmSound {
    #[default]
    Bell,
    Chime,
    Digital,
    Gentle,
}

/// Background loop played while a work interval runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AmbientSound {
    Rain,
    Cafe,
    WhiteNoise,
    None,
}

/// User preferences, stored as a single JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub active_profile_id: String,
    pub custom_profiles: Vec<TimerProfile>,
    /// Start a break automatically after a work interval.
    pub auto_start_breaks: bool,
    /// Start work automatically after a break.
    pub auto_start_work: bool,
    /// Hide manual reset while a work interval is active.
    pub strict_mode: bool,
    pub sound_enabled: bool,
    pub selected_alarm_sound: AlarmSound,
    pub haptic_enabled: bool,
    pub ambient_sound_enabled: bool,
    pub selected_ambient_sound: Option<AmbientSound>,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_profile_id: crate::profiles::DEFAULT_PROFILE_ID.to_string(),
            custom_profiles: Vec::new(),
            auto_start_breaks: true,
            auto_start_work: false,
            strict_mode: false,
            sound_enabled: true,
            selected_alarm_sound: AlarmSound::default(),
            haptic_enabled: true,
            ambient_sound_enabled: false,
            selected_ambient_sound: None,
            notifications_enabled: true,
        }
    }
}

impl Settings {
    /// The ambient loop to play during work, if one is enabled and selected.
    pub fn ambient(&self) -> Option<AmbientSound> {
        if !self.ambient_sound_enabled {
            return None;
        }
        self.selected_ambient_sound
            .filter(|sound| *sound != AmbientSound::None)
    }
}

/// A unit of work pomodoros can be credited to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub estimated_pomodoros: u32,
    pub completed_pomodoros: u32,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a fresh, uncompleted task.
    pub fn new(title: impl Into<String>, estimated_pomodoros: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            estimated_pomodoros,
            completed_pomodoros: 0,
            is_completed: false,
            created_at: now,
            completed_at: None,
        }
    }
}

/// Statistics for one local calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayStats {
    pub date: NaiveDate,
    pub completed_pomodoros: u32,
    pub total_work_minutes: u32,
    /// Ids of tasks marked complete on this day.
    pub completed_tasks: Vec<String>,
}

impl DayStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            completed_pomodoros: 0,
            total_work_minutes: 0,
            completed_tasks: Vec::new(),
        }
    }
}

/// A finished interval in the session history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedSession {
    pub id: String,
    pub task_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub kind: SessionKind,
}

impl CompletedSession {
    pub fn new(
        task_id: Option<String>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        duration_minutes: u32,
        kind: SessionKind,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_id,
            started_at,
            completed_at,
            duration_minutes,
            kind,
        }
    }
}

/// Key for day statistics: the local calendar date of `now`.
pub fn day_key(now: DateTime<Local>) -> NaiveDate {
    now.date_naive()
}
