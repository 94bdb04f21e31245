//! SQLite persistence for tasks, settings, daily statistics and history.
//!
//! Reads never fail: a broken or missing record is logged and replaced by
//! its default, so the timer always starts from a usable state. Writes
//! return [`StoreError`] to the caller.

use crate::models::{CompletedSession, DayStats, SessionKind, Settings, Task};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::warn;

/// Number of finished sessions kept in the history.
pub const SESSION_HISTORY_LIMIT: usize = 100;

const KEY_SETTINGS: &str = "settings";
const KEY_TODAY_TASKS: &str = "today_tasks";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryCreation(#[source] std::io::Error),
    #[error("Invalid session kind: {0}")]
    SessionKind(String),
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Store shared between the driver, the recorder and command handling.
pub type SharedStore = Arc<Mutex<Store>>;

/// Locks a shared store, mapping poisoning to [`StoreError::Poisoned`].
pub fn lock(store: &SharedStore) -> Result<MutexGuard<'_, Store>, StoreError> {
    store.lock().map_err(|_| StoreError::Poisoned)
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (or creates) the database at `path`, initializing tables if needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::DirectoryCreation)?;
        }

        let conn = Connection::open(path)?;
        Self::initialize_tables(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    fn initialize_tables(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                estimated_pomodoros INTEGER NOT NULL,
                completed_pomodoros INTEGER NOT NULL DEFAULT 0,
                is_completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                completed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS daily_stats (
                date TEXT PRIMARY KEY,
                completed_pomodoros INTEGER NOT NULL DEFAULT 0,
                total_work_minutes INTEGER NOT NULL DEFAULT 0,
                completed_tasks TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE IF NOT EXISTS sessions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                task_id TEXT,
                started_at TEXT NOT NULL,
                completed_at TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                kind TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    // ── Preferences ──────────────────────────────────────────────────

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, json],
        )?;
        Ok(())
    }

    /// Loads settings, returning defaults if none are saved or they are unreadable.
    pub fn settings(&self) -> Settings {
        or_default(
            "settings",
            self.load_json::<Settings>(KEY_SETTINGS)
                .map(Option::unwrap_or_default),
        )
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.save_json(KEY_SETTINGS, settings)
    }

    /// Applies `update` to the stored settings and returns the saved result.
    pub fn update_settings<F>(&self, update: F) -> Result<Settings, StoreError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings();
        update(&mut settings);
        self.save_settings(&settings)?;
        Ok(settings)
    }

    pub fn today_task_ids(&self) -> Vec<String> {
        or_default(
            "today tasks",
            self.load_json::<Vec<String>>(KEY_TODAY_TASKS)
                .map(Option::unwrap_or_default),
        )
    }

    pub fn set_today_task_ids(&self, ids: &[String]) -> Result<(), StoreError> {
        self.save_json(KEY_TODAY_TASKS, ids)
    }

    /// Adds a task to today's selection; a no-op if it is already there.
    pub fn add_today_task(&self, task_id: &str) -> Result<(), StoreError> {
        let mut ids = self.today_task_ids();
        if !ids.iter().any(|id| id == task_id) {
            ids.push(task_id.to_string());
            self.set_today_task_ids(&ids)?;
        }
        Ok(())
    }

    pub fn remove_today_task(&self, task_id: &str) -> Result<(), StoreError> {
        let mut ids = self.today_task_ids();
        ids.retain(|id| id != task_id);
        self.set_today_task_ids(&ids)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    fn try_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, estimated_pomodoros, completed_pomodoros,
                    is_completed, created_at, completed_at
             FROM tasks ORDER BY rowid",
        )?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> Vec<Task> {
        or_default("tasks", self.try_tasks())
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.tasks().into_iter().find(|t| t.id == task_id)
    }

    fn insert_task(conn: &Connection, task: &Task) -> Result<(), StoreError> {
        conn.execute(
            "INSERT OR REPLACE INTO tasks
                (id, title, estimated_pomodoros, completed_pomodoros,
                 is_completed, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.id,
                task.title,
                task.estimated_pomodoros,
                task.completed_pomodoros,
                task.is_completed,
                task.created_at,
                task.completed_at,
            ],
        )?;
        Ok(())
    }

    /// Replaces the whole task list.
    pub fn set_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM tasks", [])?;
        for task in tasks {
            Self::insert_task(&tx, task)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn add_task(&self, task: &Task) -> Result<(), StoreError> {
        Self::insert_task(&self.conn, task)
    }

    /// Applies `update` to the task with `task_id`. Returns false if there is no such task.
    pub fn update_task<F>(&self, task_id: &str, update: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut Task),
    {
        let Some(mut task) = self.try_tasks()?.into_iter().find(|t| t.id == task_id) else {
            return Ok(false);
        };
        update(&mut task);
        // Keep the id stable so the row is updated in place.
        task.id = task_id.to_string();
        self.conn.execute(
            "UPDATE tasks SET title = ?2, estimated_pomodoros = ?3, completed_pomodoros = ?4,
                    is_completed = ?5, created_at = ?6, completed_at = ?7
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.estimated_pomodoros,
                task.completed_pomodoros,
                task.is_completed,
                task.created_at,
                task.completed_at,
            ],
        )?;
        Ok(true)
    }

    /// Deletes a task and drops it from today's selection.
    pub fn delete_task(&self, task_id: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", [task_id])?;
        self.remove_today_task(task_id)
    }

    /// Toggles a task's completion. Completing it also records the id in
    /// the statistics for the day of `now`. Returns the new completion flag,
    /// or `None` if the task does not exist.
    pub fn complete_task(
        &self,
        task_id: &str,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<bool>, StoreError> {
        let mut completed = false;
        let found = self.update_task(task_id, |task| {
            task.is_completed = !task.is_completed;
            task.completed_at = task.is_completed.then_some(now);
            completed = task.is_completed;
        })?;
        if !found {
            return Ok(None);
        }
        if completed {
            self.update_day_stats(date, |stats| {
                if !stats.completed_tasks.iter().any(|id| id == task_id) {
                    stats.completed_tasks.push(task_id.to_string());
                }
            })?;
        }
        Ok(Some(completed))
    }

    // ── Statistics ───────────────────────────────────────────────────

    fn try_day_stats(&self, date: NaiveDate) -> Result<DayStats, StoreError> {
        let result = self
            .conn
            .query_row(
                "SELECT date, completed_pomodoros, total_work_minutes, completed_tasks
                 FROM daily_stats WHERE date = ?1",
                [date],
                day_stats_from_row,
            )
            .optional()?;

        match result {
            Some((stats, tasks_json)) => Ok(DayStats {
                completed_tasks: serde_json::from_str(&tasks_json)?,
                ..stats
            }),
            None => Ok(DayStats::new(date)),
        }
    }

    /// Statistics for `date`, zeroed if nothing was recorded.
    pub fn day_stats(&self, date: NaiveDate) -> DayStats {
        or_default_with("day stats", self.try_day_stats(date), || {
            DayStats::new(date)
        })
    }

    fn try_all_day_stats(&self) -> Result<Vec<DayStats>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, completed_pomodoros, total_work_minutes, completed_tasks
             FROM daily_stats ORDER BY date",
        )?;
        let rows = stmt
            .query_map([], day_stats_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(stats, tasks_json)| -> Result<DayStats, StoreError> {
                Ok(DayStats {
                    completed_tasks: serde_json::from_str(&tasks_json)?,
                    ..stats
                })
            })
            .collect()
    }

    /// Every recorded day, oldest first.
    pub fn all_day_stats(&self) -> Vec<DayStats> {
        or_default("all day stats", self.try_all_day_stats())
    }

    /// Applies `update` to the record for `date`, creating it if needed.
    pub fn update_day_stats<F>(&self, date: NaiveDate, update: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut DayStats),
    {
        let mut stats = self.try_day_stats(date)?;
        update(&mut stats);
        let tasks_json = serde_json::to_string(&stats.completed_tasks)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO daily_stats
                (date, completed_pomodoros, total_work_minutes, completed_tasks)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                date,
                stats.completed_pomodoros,
                stats.total_work_minutes,
                tasks_json
            ],
        )?;
        Ok(())
    }

    /// Counts one finished work interval of `work_minutes` for `date`.
    pub fn increment_pomodoro(&self, date: NaiveDate, work_minutes: u32) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO daily_stats (date, completed_pomodoros, total_work_minutes)
             VALUES (?1, 1, ?2)
             ON CONFLICT(date) DO UPDATE SET
                completed_pomodoros = completed_pomodoros + 1,
                total_work_minutes = total_work_minutes + excluded.total_work_minutes",
            params![date, work_minutes],
        )?;
        Ok(())
    }

    // ── Session history ──────────────────────────────────────────────

    fn try_sessions(&self) -> Result<Vec<CompletedSession>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, started_at, completed_at, duration_minutes, kind
             FROM sessions ORDER BY seq",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    CompletedSession {
                        id: row.get(0)?,
                        task_id: row.get(1)?,
                        started_at: row.get(2)?,
                        completed_at: row.get(3)?,
                        duration_minutes: row.get(4)?,
                        kind: SessionKind::Work,
                    },
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(session, kind)| -> Result<CompletedSession, StoreError> {
                let kind = kind.parse().map_err(StoreError::SessionKind)?;
                Ok(CompletedSession { kind, ..session })
            })
            .collect()
    }

    /// Finished sessions, oldest first.
    pub fn sessions(&self) -> Vec<CompletedSession> {
        or_default("sessions", self.try_sessions())
    }

    /// Appends a session and evicts the oldest beyond [`SESSION_HISTORY_LIMIT`].
    pub fn add_session(&self, session: &CompletedSession) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO sessions
                (id, task_id, started_at, completed_at, duration_minutes, kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id,
                session.task_id,
                session.started_at,
                session.completed_at,
                session.duration_minutes,
                session.kind.as_str(),
            ],
        )?;
        tx.execute(
            "DELETE FROM sessions WHERE seq NOT IN
                (SELECT seq FROM sessions ORDER BY seq DESC LIMIT ?1)",
            [SESSION_HISTORY_LIMIT as i64],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Removes every task, preference, statistic and session.
    pub fn clear_all_data(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "DELETE FROM preferences;
             DELETE FROM tasks;
             DELETE FROM daily_stats;
             DELETE FROM sessions;",
        )?;
        Ok(())
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        estimated_pomodoros: row.get(2)?,
        completed_pomodoros: row.get(3)?,
        is_completed: row.get(4)?,
        created_at: row.get(5)?,
        completed_at: row.get(6)?,
    })
}

fn day_stats_from_row(row: &Row<'_>) -> rusqlite::Result<(DayStats, String)> {
    Ok((
        DayStats {
            date: row.get(0)?,
            completed_pomodoros: row.get(1)?,
            total_work_minutes: row.get(2)?,
            completed_tasks: Vec::new(),
        },
        row.get(3)?,
    ))
}

fn or_default<T: Default>(what: &str, result: Result<T, StoreError>) -> T {
    or_default_with(what, result, T::default)
}

fn or_default_with<T>(what: &str, result: Result<T, StoreError>, default: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|error| {
        warn!(%error, "failed to read {what}, using default");
        default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap()
    }

    fn session(n: u32) -> CompletedSession {
        let mut s = CompletedSession::new(None, ts(9), ts(10), 25, SessionKind::Work);
        s.id = format!("s{n}");
        s
    }

    #[test]
    fn test_database_creation() {
        let db = Store::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pomotrack.db");
        let store = Store::open(&path).unwrap();
        store.increment_pomodoro(date(15), 25).unwrap();
        drop(store);

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.day_stats(date(15)).completed_pomodoros, 1);
    }

    #[test]
    fn test_settings_save_and_load() {
        let db = Store::open_in_memory().unwrap();

        // Default settings should be returned when nothing is saved
        assert_eq!(db.settings(), Settings::default());

        let custom = Settings {
            active_profile_id: "deep-work".to_string(),
            auto_start_breaks: false,
            sound_enabled: false,
            ..Settings::default()
        };
        db.save_settings(&custom).unwrap();
        assert_eq!(db.settings(), custom);
    }

    #[test]
    fn test_update_settings_merges() {
        let db = Store::open_in_memory().unwrap();
        db.update_settings(|s| s.strict_mode = true).unwrap();
        let saved = db.update_settings(|s| s.auto_start_work = true).unwrap();

        assert!(saved.strict_mode);
        assert!(saved.auto_start_work);
        assert_eq!(db.settings(), saved);
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_default() {
        let db = Store::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO preferences (key, value) VALUES ('settings', 'not json')",
                [],
            )
            .unwrap();
        assert_eq!(db.settings(), Settings::default());
    }

    #[test]
    fn test_task_crud() {
        let db = Store::open_in_memory().unwrap();
        assert!(db.tasks().is_empty());

        let first = Task::new("First", 2, ts(8));
        let second = Task::new("Second", 4, ts(9));
        db.add_task(&first).unwrap();
        db.add_task(&second).unwrap();

        let tasks = db.tasks();
        assert_eq!(tasks, vec![first.clone(), second.clone()]);

        let updated = db
            .update_task(&first.id, |t| t.completed_pomodoros += 1)
            .unwrap();
        assert!(updated);
        assert_eq!(db.task(&first.id).unwrap().completed_pomodoros, 1);
        assert!(!db.update_task("missing", |_| {}).unwrap());

        db.delete_task(&first.id).unwrap();
        assert_eq!(db.tasks(), vec![second]);
    }

    #[test]
    fn test_set_tasks_replaces_list() {
        let db = Store::open_in_memory().unwrap();
        db.add_task(&Task::new("Old", 1, ts(8))).unwrap();

        let fresh = vec![Task::new("A", 1, ts(9)), Task::new("B", 3, ts(10))];
        db.set_tasks(&fresh).unwrap();
        assert_eq!(db.tasks(), fresh);
    }

    #[test]
    fn test_today_task_ids() {
        let db = Store::open_in_memory().unwrap();
        assert!(db.today_task_ids().is_empty());

        db.add_today_task("a").unwrap();
        db.add_today_task("b").unwrap();
        db.add_today_task("a").unwrap();
        assert_eq!(db.today_task_ids(), vec!["a", "b"]);

        db.remove_today_task("a").unwrap();
        assert_eq!(db.today_task_ids(), vec!["b"]);

        db.set_today_task_ids(&["c".to_string()]).unwrap();
        assert_eq!(db.today_task_ids(), vec!["c"]);
    }

    #[test]
    fn test_delete_task_removes_from_today() {
        let db = Store::open_in_memory().unwrap();
        let task = Task::new("Today", 1, ts(8));
        db.add_task(&task).unwrap();
        db.add_today_task(&task.id).unwrap();

        db.delete_task(&task.id).unwrap();
        assert!(db.today_task_ids().is_empty());
    }

    #[test]
    fn test_complete_task_records_day() {
        let db = Store::open_in_memory().unwrap();
        let task = Task::new("Ship it", 2, ts(8));
        db.add_task(&task).unwrap();

        assert_eq!(db.complete_task(&task.id, date(15), ts(11)).unwrap(), Some(true));
        let done = db.task(&task.id).unwrap();
        assert!(done.is_completed);
        assert_eq!(done.completed_at, Some(ts(11)));
        assert_eq!(db.day_stats(date(15)).completed_tasks, vec![task.id.clone()]);

        // Toggling back clears the task but keeps the day's record.
        assert_eq!(db.complete_task(&task.id, date(15), ts(12)).unwrap(), Some(false));
        let reopened = db.task(&task.id).unwrap();
        assert!(!reopened.is_completed);
        assert_eq!(reopened.completed_at, None);

        db.complete_task(&task.id, date(15), ts(13)).unwrap();
        assert_eq!(db.day_stats(date(15)).completed_tasks.len(), 1);

        assert_eq!(db.complete_task("missing", date(15), ts(13)).unwrap(), None);
    }

    #[test]
    fn test_daily_stats_for_nonexistent_date() {
        let db = Store::open_in_memory().unwrap();
        let stats = db.day_stats(date(15));
        assert_eq!(stats, DayStats::new(date(15)));
    }

    #[test]
    fn test_increment_pomodoro() {
        let db = Store::open_in_memory().unwrap();
        db.increment_pomodoro(date(15), 25).unwrap();
        db.increment_pomodoro(date(15), 50).unwrap();
        db.increment_pomodoro(date(16), 25).unwrap();

        let stats = db.day_stats(date(15));
        assert_eq!(stats.completed_pomodoros, 2);
        assert_eq!(stats.total_work_minutes, 75);
        assert_eq!(db.day_stats(date(16)).completed_pomodoros, 1);
    }

    #[test]
    fn test_update_day_stats() {
        let db = Store::open_in_memory().unwrap();
        db.increment_pomodoro(date(15), 25).unwrap();
        db.update_day_stats(date(15), |s| s.completed_tasks.push("t1".to_string()))
            .unwrap();

        let stats = db.day_stats(date(15));
        assert_eq!(stats.completed_pomodoros, 1);
        assert_eq!(stats.completed_tasks, vec!["t1"]);
    }

    #[test]
    fn test_all_day_stats_ordered_by_date() {
        let db = Store::open_in_memory().unwrap();
        db.increment_pomodoro(date(20), 25).unwrap();
        db.increment_pomodoro(date(3), 25).unwrap();

        let all = db.all_day_stats();
        let dates: Vec<_> = all.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(3), date(20)]);
    }

    #[test]
    fn test_sessions_append_and_load() {
        let db = Store::open_in_memory().unwrap();
        let mut brk = CompletedSession::new(
            Some("t1".to_string()),
            ts(10),
            ts(11),
            5,
            SessionKind::ShortBreak,
        );
        brk.id = "b".to_string();
        db.add_session(&session(1)).unwrap();
        db.add_session(&brk).unwrap();

        let sessions = db.sessions();
        assert_eq!(sessions, vec![session(1), brk]);
    }

    #[test]
    fn test_session_history_is_capped() {
        let db = Store::open_in_memory().unwrap();
        for n in 0..SESSION_HISTORY_LIMIT as u32 {
            db.add_session(&session(n)).unwrap();
        }
        assert_eq!(db.sessions().len(), SESSION_HISTORY_LIMIT);

        db.add_session(&session(100)).unwrap();
        let sessions = db.sessions();
        assert_eq!(sessions.len(), SESSION_HISTORY_LIMIT);
        assert_eq!(sessions.first().unwrap().id, "s1");
        assert_eq!(sessions.last().unwrap().id, "s100");
    }

    #[test]
    fn test_clear_all_data() {
        let db = Store::open_in_memory().unwrap();
        db.add_task(&Task::new("Gone", 1, ts(8))).unwrap();
        db.add_today_task("x").unwrap();
        db.update_settings(|s| s.strict_mode = true).unwrap();
        db.increment_pomodoro(date(15), 25).unwrap();
        db.add_session(&session(1)).unwrap();

        db.clear_all_data().unwrap();

        assert!(db.tasks().is_empty());
        assert!(db.today_task_ids().is_empty());
        assert_eq!(db.settings(), Settings::default());
        assert_eq!(db.day_stats(date(15)), DayStats::new(date(15)));
        assert!(db.sessions().is_empty());
    }
}
