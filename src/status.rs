//! Text rendering of timer snapshots and daily statistics.

use crate::app::TimerSnapshot;
use crate::models::{DayStats, TimerMode};

const BAR_WIDTH: usize = 20;

/// Formats time in MM:SS format.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn mode_icon(mode: TimerMode) -> &'static str {
    match mode {
        TimerMode::Idle | TimerMode::Work => "🍅",
        TimerMode::ShortBreak | TimerMode::LongBreak => "☕",
    }
}

/// One-line summary of the timer.
pub fn format_status(snapshot: &TimerSnapshot) -> String {
    if snapshot.mode == TimerMode::Idle {
        return format!(
            "{}  Ready to focus ({}, {})",
            mode_icon(snapshot.mode),
            snapshot.profile_name,
            format_time(snapshot.time_remaining)
        );
    }

    let icon = if snapshot.is_running {
        mode_icon(snapshot.mode)
    } else {
        "⏸"
    };
    let paused = if snapshot.is_running { "" } else { " (paused)" };
    let task = match &snapshot.active_task_id {
        Some(id) => format!("  task {}", id.get(..8).unwrap_or(id)),
        None => String::new(),
    };
    format!(
        "{}  {} {}{}  [{}/{}]{}",
        icon,
        snapshot.mode.label(),
        format_time(snapshot.time_remaining),
        paused,
        snapshot.current_pomodoro,
        snapshot.pomodoros_per_cycle,
        task
    )
}

/// Formats the progress bar.
pub fn format_progress(snapshot: &TimerSnapshot) -> String {
    if snapshot.mode == TimerMode::Idle {
        return format!("{}  0%", "░".repeat(BAR_WIDTH));
    }
    let pct = snapshot.progress().clamp(0.0, 1.0);
    let filled = (pct * BAR_WIDTH as f32).round() as usize;
    format!(
        "{}{}  {}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        (pct * 100.0).round() as u32
    )
}

/// Formats a day's statistics.
pub fn format_day(stats: &DayStats) -> String {
    if stats.completed_pomodoros == 0 {
        return "Today: —  0 (0 min)".to_string();
    }
    let tomatoes = "🍅".repeat(stats.completed_pomodoros.min(10) as usize);
    let extra = if stats.completed_pomodoros > 10 {
        format!("+{}", stats.completed_pomodoros - 10)
    } else {
        String::new()
    };
    format!(
        "Today: {}{}  {} ({} min)",
        tomatoes, extra, stats.completed_pomodoros, stats.total_work_minutes
    )
}
