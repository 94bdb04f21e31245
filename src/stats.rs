//! Streak and totals over the stored daily statistics.

use crate::models::DayStats;
use crate::persistence::Store;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;

const STREAK_LOOKBACK_DAYS: u64 = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub today: DayStats,
    pub streak: u32,
    pub total_pomodoros: u32,
}

/// Consecutive days with at least one finished pomodoro, counted back
/// from `today`. A today without pomodoros yet does not break the streak.
pub fn current_streak(stats: &[DayStats], today: NaiveDate) -> u32 {
    let by_date: HashMap<NaiveDate, u32> = stats
        .iter()
        .map(|day| (day.date, day.completed_pomodoros))
        .collect();
    let count = |date: NaiveDate| by_date.get(&date).copied().unwrap_or(0);

    let mut streak = 0;
    for offset in 0..STREAK_LOOKBACK_DAYS {
        let Some(date) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };
        if count(date) > 0 {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }
    streak
}

pub fn total_pomodoros(stats: &[DayStats]) -> u32 {
    stats.iter().map(|day| day.completed_pomodoros).sum()
}

pub fn summary(store: &Store, today: NaiveDate) -> Summary {
    let all = store.all_day_stats();
    Summary {
        today: store.day_stats(today),
        streak: current_streak(&all, today),
        total_pomodoros: total_pomodoros(&all),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32, pomodoros: u32) -> DayStats {
        DayStats {
            completed_pomodoros: pomodoros,
            ..DayStats::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_streak_counts_back_from_today() {
        let stats = vec![day(2024, 3, 10, 2), day(2024, 3, 9, 1), day(2024, 3, 8, 4)];
        assert_eq!(current_streak(&stats, today()), 3);
    }

    #[test]
    fn test_empty_today_does_not_break_streak() {
        let stats = vec![day(2024, 3, 9, 1), day(2024, 3, 8, 4)];
        assert_eq!(current_streak(&stats, today()), 2);
    }

    #[test]
    fn test_gap_ends_streak() {
        let stats = vec![day(2024, 3, 10, 1), day(2024, 3, 8, 4), day(2024, 3, 7, 1)];
        assert_eq!(current_streak(&stats, today()), 1);

        let zero_row = vec![day(2024, 3, 10, 1), day(2024, 3, 9, 0), day(2024, 3, 8, 3)];
        assert_eq!(current_streak(&zero_row, today()), 1);
    }

    #[test]
    fn test_streak_crosses_month_boundary() {
        let stats = vec![day(2024, 3, 1, 1), day(2024, 2, 29, 1), day(2024, 2, 28, 1)];
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(current_streak(&stats, today), 3);
    }

    #[test]
    fn test_streak_is_bounded() {
        let start = today();
        let stats: Vec<DayStats> = (0..400)
            .map(|offset| DayStats {
                completed_pomodoros: 1,
                ..DayStats::new(start - Days::new(offset))
            })
            .collect();
        assert_eq!(current_streak(&stats, start), 365);
    }

    #[test]
    fn test_no_history() {
        assert_eq!(current_streak(&[], today()), 0);
        assert_eq!(total_pomodoros(&[]), 0);
    }

    #[test]
    fn test_summary_reads_store() {
        let store = Store::open_in_memory().unwrap();
        store.increment_pomodoro(today(), 25).unwrap();
        store.increment_pomodoro(today(), 25).unwrap();
        store
            .increment_pomodoro(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), 50)
            .unwrap();
        store
            .increment_pomodoro(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 25)
            .unwrap();

        let summary = summary(&store, today());
        assert_eq!(summary.today.completed_pomodoros, 2);
        assert_eq!(summary.today.total_work_minutes, 50);
        assert_eq!(summary.streak, 2);
        assert_eq!(summary.total_pomodoros, 4);
    }
}
