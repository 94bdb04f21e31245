//! Built-in and custom timer profiles.

use crate::models::TimerProfile;
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_PROFILE_ID: &str = "classic";

/// Bounds applied when a user creates a custom profile.
pub struct ProfileLimits {
    pub work_duration: RangeInclusive<u32>,
    pub short_break_duration: RangeInclusive<u32>,
    pub long_break_duration: RangeInclusive<u32>,
    pub pomodoros_per_cycle: RangeInclusive<u32>,
    pub name_max_len: usize,
}

pub const PROFILE_LIMITS: ProfileLimits = ProfileLimits {
    work_duration: 1..=120,
    short_break_duration: 1..=30,
    long_break_duration: 5..=60,
    pomodoros_per_cycle: 2..=6,
    name_max_len: 30,
};

/// Allowed estimate for a task, in pomodoros.
pub const TASK_ESTIMATE: RangeInclusive<u32> = 1..=10;

#[derive(Error, Debug, PartialEq)]
pub enum ProfileError {
    #[error("Profile name must not be empty")]
    EmptyName,
    #[error("Profile name is longer than {0} characters")]
    NameTooLong(usize),
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },
}

fn builtin(
    id: &str,
    name: &str,
    durations: (u32, u32, u32),
    pomodoros_per_cycle: u32,
    description: &str,
) -> TimerProfile {
    let (work_duration, short_break_duration, long_break_duration) = durations;
    TimerProfile {
        id: id.to_string(),
        name: name.to_string(),
        work_duration,
        short_break_duration,
        long_break_duration,
        pomodoros_per_cycle,
        description: description.to_string(),
        is_custom: false,
    }
}

/// The fixed profiles shipped with the app.
pub fn builtin_profiles() -> Vec<TimerProfile> {
    vec![
        builtin(
            "classic",
            "Classic",
            (25, 5, 20),
            4,
            "The standard technique. Fits most tasks.",
        ),
        builtin(
            "deep-work",
            "Deep Work",
            (50, 10, 30),
            4,
            "For cognitively heavy tasks: programming, analysis, research.",
        ),
        builtin(
            "creative",
            "Creative",
            (45, 15, 30),
            4,
            "For creative tasks where getting into flow takes a while.",
        ),
        builtin(
            "learning",
            "Learning",
            (45, 15, 30),
            4,
            "For studying new material, with breaks to let it settle.",
        ),
    ]
}

/// Looks a profile up by id, built-ins first, then the custom list.
pub fn resolve(id: &str, custom: &[TimerProfile]) -> Option<TimerProfile> {
    builtin_profiles()
        .into_iter()
        .find(|p| p.id == id)
        .or_else(|| custom.iter().find(|p| p.id == id).cloned())
}

/// Like [`resolve`], falling back to the default built-in profile.
pub fn resolve_or_default(id: &str, custom: &[TimerProfile]) -> TimerProfile {
    if let Some(profile) = resolve(id, custom) {
        return profile;
    }
    warn!(profile_id = id, "unknown profile, using default");
    builtin_profiles()
        .into_iter()
        .find(|p| p.id == DEFAULT_PROFILE_ID)
        .unwrap_or_else(|| builtin("classic", "Classic", (25, 5, 20), 4, ""))
}

/// All selectable profiles, built-ins first.
pub fn all_profiles(custom: &[TimerProfile]) -> Vec<TimerProfile> {
    let mut profiles = builtin_profiles();
    profiles.extend(custom.iter().cloned());
    profiles
}

fn check_range(
    field: &'static str,
    range: &RangeInclusive<u32>,
    value: u32,
) -> Result<(), ProfileError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ProfileError::OutOfRange {
            field,
            min: *range.start(),
            max: *range.end(),
            value,
        })
    }
}

/// Builds a validated custom profile.
pub fn create_custom_profile(
    name: &str,
    work_duration: u32,
    short_break_duration: u32,
    long_break_duration: u32,
    pomodoros_per_cycle: u32,
) -> Result<TimerProfile, ProfileError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProfileError::EmptyName);
    }
    if name.chars().count() > PROFILE_LIMITS.name_max_len {
        return Err(ProfileError::NameTooLong(PROFILE_LIMITS.name_max_len));
    }
    check_range("work duration", &PROFILE_LIMITS.work_duration, work_duration)?;
    check_range(
        "short break duration",
        &PROFILE_LIMITS.short_break_duration,
        short_break_duration,
    )?;
    check_range(
        "long break duration",
        &PROFILE_LIMITS.long_break_duration,
        long_break_duration,
    )?;
    check_range(
        "pomodoros per cycle",
        &PROFILE_LIMITS.pomodoros_per_cycle,
        pomodoros_per_cycle,
    )?;

    Ok(TimerProfile {
        id: format!("custom-{}", uuid::Uuid::new_v4().simple()),
        name: name.to_string(),
        work_duration,
        short_break_duration,
        long_break_duration,
        pomodoros_per_cycle,
        description: "Custom profile".to_string(),
        is_custom: true,
    })
}

/// Checks a task estimate against [`TASK_ESTIMATE`].
pub fn validate_estimate(estimate: u32) -> Result<(), ProfileError> {
    check_range("estimated pomodoros", &TASK_ESTIMATE, estimate)
}
