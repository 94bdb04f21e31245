//! Terminal command parsing and handling.

use crate::app::App;
use crate::models::{day_key, AlarmSound, AmbientSound, Settings, Task, TimerMode};
use crate::persistence::{lock, SharedStore, Store, StoreError};
use crate::profiles::{self, ProfileError};
use crate::stats;
use crate::status;
use crate::timer::Effect;
use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  start | pause | reset | skip        control the timer
  task <id> | task none               pick the task credited for focus time
  add <title> [estimate]              add a task to today's list
  done <id> | rm <id> | today <id>    toggle done, delete, toggle today
  estimate <id> <n>                   change a task's estimate
  tasks                               list tasks
  profile <id> | profiles             switch or list timer profiles
  newprofile <name> <work> <short> <long> <cycle>
  stats | history                     statistics and recent sessions
  clear done | clear all              drop finished tasks, or wipe all data
  set <flag> on|off                   auto-breaks auto-work strict sound
                                      haptics ambient notifications
  alarm <sound>                       bell chime digital gentle
  ambient <sound>                     rain cafe whiteNoise none
  status | help | quit";

const ALARM_USAGE: &str = "alarm bell|chime|digital|gentle";
const AMBIENT_USAGE: &str = "ambient rain|cafe|whiteNoise|none";

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown setting: {0}")]
    UnknownFlag(String),
    #[error("Not a number: {0}")]
    NotANumber(String),
}

/// A boolean preference that `set` can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    AutoBreaks,
    AutoWork,
    Strict,
    Sound,
    Haptics,
    Ambient,
    Notifications,
}

impl Flag {
    fn parse(s: &str) -> Result<Self, CommandError> {
        match s {
            "auto-breaks" => Ok(Self::AutoBreaks),
            "auto-work" => Ok(Self::AutoWork),
            "strict" => Ok(Self::Strict),
            "sound" => Ok(Self::Sound),
            "haptics" => Ok(Self::Haptics),
            "ambient" => Ok(Self::Ambient),
            "notifications" => Ok(Self::Notifications),
            other => Err(CommandError::UnknownFlag(other.to_string())),
        }
    }

    fn field(self, settings: &mut Settings) -> &mut bool {
        match self {
            Self::AutoBreaks => &mut settings.auto_start_breaks,
            Self::AutoWork => &mut settings.auto_start_work,
            Self::Strict => &mut settings.strict_mode,
            Self::Sound => &mut settings.sound_enabled,
            Self::Haptics => &mut settings.haptic_enabled,
            Self::Ambient => &mut settings.ambient_sound_enabled,
            Self::Notifications => &mut settings.notifications_enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    Skip,
    SelectTask(Option<String>),
    AddTask { title: String, estimate: u32 },
    ToggleDone(String),
    RemoveTask(String),
    ToggleToday(String),
    SetEstimate { id: String, estimate: u32 },
    ListTasks,
    SwitchProfile(String),
    ListProfiles,
    NewProfile {
        name: String,
        work: u32,
        short_break: u32,
        long_break: u32,
        cycle: u32,
    },
    Stats,
    History,
    ClearDone,
    ClearAll,
    Set { flag: Flag, on: bool },
    Alarm(AlarmSound),
    Ambient(AmbientSound),
    Status,
    Help,
    Quit,
}

fn number(s: &str) -> Result<u32, CommandError> {
    s.parse()
        .map_err(|_| CommandError::NotANumber(s.to_string()))
}

fn one_arg(args: &[&str], usage: &'static str) -> Result<String, CommandError> {
    match args {
        [arg] => Ok(arg.to_string()),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn alarm_sound(s: &str) -> Option<AlarmSound> {
    match s {
        "bell" => Some(AlarmSound::Bell),
        "chime" => Some(AlarmSound::Chime),
        "digital" => Some(AlarmSound::Digital),
        "gentle" => Some(AlarmSound::Gentle),
        _ => None,
    }
}

fn ambient_sound(s: &str) -> Option<AmbientSound> {
    match s {
        "rain" => Some(AmbientSound::Rain),
        "cafe" => Some(AmbientSound::Cafe),
        "whiteNoise" | "white-noise" => Some(AmbientSound::WhiteNoise),
        "none" => Some(AmbientSound::None),
        _ => None,
    }
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match head {
        "start" => Command::Start,
        "pause" => Command::Pause,
        "reset" => Command::Reset,
        "skip" => Command::Skip,
        "task" => match one_arg(args, "task <id>|none")?.as_str() {
            "none" => Command::SelectTask(None),
            id => Command::SelectTask(Some(id.to_string())),
        },
        "add" => {
            let (title_words, estimate) = match args.split_last() {
                Some((last, rest)) if !rest.is_empty() && last.parse::<u32>().is_ok() => {
                    (rest, number(last)?)
                }
                _ => (args, 1),
            };
            if title_words.is_empty() {
                return Err(CommandError::Usage("add <title> [estimate]"));
            }
            Command::AddTask {
                title: title_words.join(" "),
                estimate,
            }
        }
        "done" => Command::ToggleDone(one_arg(args, "done <id>")?),
        "rm" => Command::RemoveTask(one_arg(args, "rm <id>")?),
        "today" => Command::ToggleToday(one_arg(args, "today <id>")?),
        "estimate" => match args {
            [id, n] => Command::SetEstimate {
                id: id.to_string(),
                estimate: number(n)?,
            },
            _ => return Err(CommandError::Usage("estimate <id> <n>")),
        },
        "tasks" => Command::ListTasks,
        "profile" => Command::SwitchProfile(one_arg(args, "profile <id>")?),
        "profiles" => Command::ListProfiles,
        "newprofile" => match args {
            [name @ .., w, s, l, c] if !name.is_empty() => Command::NewProfile {
                name: name.join(" "),
                work: number(w)?,
                short_break: number(s)?,
                long_break: number(l)?,
                cycle: number(c)?,
            },
            _ => {
                return Err(CommandError::Usage(
                    "newprofile <name> <work> <short> <long> <cycle>",
                ))
            }
        },
        "stats" => Command::Stats,
        "history" => Command::History,
        "clear" => match args {
            ["done"] => Command::ClearDone,
            ["all"] => Command::ClearAll,
            _ => return Err(CommandError::Usage("clear done|all")),
        },
        "set" => match args {
            [flag, "on"] => Command::Set {
                flag: Flag::parse(flag)?,
                on: true,
            },
            [flag, "off"] => Command::Set {
                flag: Flag::parse(flag)?,
                on: false,
            },
            _ => return Err(CommandError::Usage("set <flag> on|off")),
        },
        "alarm" => match args {
            [name] => match alarm_sound(name) {
                Some(sound) => Command::Alarm(sound),
                None => return Err(CommandError::Usage(ALARM_USAGE)),
            },
            _ => return Err(CommandError::Usage(ALARM_USAGE)),
        },
        "ambient" => match args {
            [name] => match ambient_sound(name) {
                Some(sound) => Command::Ambient(sound),
                None => return Err(CommandError::Usage(AMBIENT_USAGE)),
            },
            _ => return Err(CommandError::Usage(AMBIENT_USAGE)),
        },
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Result of handling a command.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResult {
    /// Nothing to report.
    Continue,
    /// User requested quit.
    Quit,
    /// The timer changed; effects still need to run.
    StateChanged(Vec<Effect>),
    /// Text for the user.
    Message(String),
}

impl From<StoreError> for EventResult {
    fn from(err: StoreError) -> Self {
        EventResult::Message(format!("Could not save: {err}"))
    }
}

impl From<ProfileError> for EventResult {
    fn from(err: ProfileError) -> Self {
        EventResult::Message(err.to_string())
    }
}

/// Finds a task by id or unique id prefix.
fn find_task(store: &Store, key: &str) -> Result<Task, EventResult> {
    if let Some(task) = store.task(key) {
        return Ok(task);
    }
    let tasks = store.tasks();
    let matches: Vec<&Task> = tasks.iter().filter(|t| t.id.starts_with(key)).collect();
    match matches.as_slice() {
        [task] => Ok((*task).clone()),
        [] => Err(EventResult::Message(format!("No task matches {key}"))),
        _ => Err(EventResult::Message(format!("{key} matches several tasks"))),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Handles a parsed command against the app and store.
pub fn handle_command(
    app: &mut App,
    store: &SharedStore,
    command: Command,
    now: DateTime<Local>,
) -> EventResult {
    match run(app, store, command, now) {
        Ok(result) | Err(result) => result,
    }
}

fn run(
    app: &mut App,
    store: &SharedStore,
    command: Command,
    now: DateTime<Local>,
) -> Result<EventResult, EventResult> {
    let result = match command {
        Command::Start => EventResult::StateChanged(app.on_start(now)),
        Command::Pause => EventResult::StateChanged(app.on_pause(now)),
        Command::Reset => {
            if app.settings().strict_mode && app.state().mode == TimerMode::Work {
                return Ok(EventResult::Message(
                    "Strict mode is on: finish the pomodoro first".to_string(),
                ));
            }
            EventResult::StateChanged(app.on_reset(now))
        }
        Command::Skip => {
            if !app.state().mode.is_break() {
                return Ok(EventResult::Message("Nothing to skip".to_string()));
            }
            EventResult::StateChanged(app.on_skip_break(now))
        }
        Command::SelectTask(None) => EventResult::StateChanged(app.on_select_task(None, now)),
        Command::SelectTask(Some(key)) => {
            let task = find_task(&*lock(store)?, &key)?;
            if task.is_completed {
                return Ok(EventResult::Message(format!(
                    "\"{}\" is already done",
                    task.title
                )));
            }
            EventResult::StateChanged(app.on_select_task(Some(task.id), now))
        }
        Command::AddTask { title, estimate } => {
            profiles::validate_estimate(estimate)?;
            let task = Task::new(title, estimate, now.with_timezone(&Utc));
            let store = lock(store)?;
            store.add_task(&task)?;
            store.add_today_task(&task.id)?;
            EventResult::Message(format!("Added {} \"{}\"", short_id(&task.id), task.title))
        }
        Command::ToggleDone(key) => {
            let store = lock(store)?;
            let task = find_task(&store, &key)?;
            let done = store.complete_task(&task.id, day_key(now), now.with_timezone(&Utc))?;
            let verb = if done == Some(true) { "Completed" } else { "Reopened" };
            EventResult::Message(format!("{verb} \"{}\"", task.title))
        }
        Command::RemoveTask(key) => {
            let task = {
                let store = lock(store)?;
                let task = find_task(&store, &key)?;
                store.delete_task(&task.id)?;
                task
            };
            if app.state().active_task_id.as_deref() == Some(task.id.as_str()) {
                app.on_select_task(None, now);
            }
            EventResult::Message(format!("Deleted \"{}\"", task.title))
        }
        Command::ToggleToday(key) => {
            let store = lock(store)?;
            let task = find_task(&store, &key)?;
            if store.today_task_ids().contains(&task.id) {
                store.remove_today_task(&task.id)?;
                EventResult::Message(format!("\"{}\" removed from today", task.title))
            } else {
                store.add_today_task(&task.id)?;
                EventResult::Message(format!("\"{}\" added to today", task.title))
            }
        }
        Command::SetEstimate { id, estimate } => {
            profiles::validate_estimate(estimate)?;
            let store = lock(store)?;
            let task = find_task(&store, &id)?;
            store.update_task(&task.id, |t| t.estimated_pomodoros = estimate)?;
            EventResult::Message(format!("\"{}\" estimated at {estimate}", task.title))
        }
        Command::ListTasks => {
            let store = lock(store)?;
            EventResult::Message(format_tasks(app, &store.tasks(), &store.today_task_ids()))
        }
        Command::SwitchProfile(id) => {
            if profiles::resolve(&id, &app.settings().custom_profiles).is_none() {
                return Ok(EventResult::Message(format!("Unknown profile: {id}")));
            }
            let settings = lock(store)?.update_settings(|s| s.active_profile_id = id)?;
            EventResult::StateChanged(app.apply_settings(settings, now))
        }
        Command::ListProfiles => {
            let mut out = String::new();
            for profile in profiles::all_profiles(&app.settings().custom_profiles) {
                let marker = if profile.id == app.profile().id { "*" } else { " " };
                let _ = writeln!(
                    out,
                    "{marker} {:<24} {:>3}/{:>2}/{:>2} x{}  {} - {}",
                    profile.id,
                    profile.work_duration,
                    profile.short_break_duration,
                    profile.long_break_duration,
                    profile.pomodoros_per_cycle,
                    profile.name,
                    profile.description
                );
            }
            EventResult::Message(out.trim_end().to_string())
        }
        Command::NewProfile {
            name,
            work,
            short_break,
            long_break,
            cycle,
        } => {
            let profile =
                profiles::create_custom_profile(&name, work, short_break, long_break, cycle)?;
            let id = profile.id.clone();
            let settings = lock(store)?.update_settings(|s| s.custom_profiles.push(profile))?;
            app.apply_settings(settings, now);
            EventResult::Message(format!("Created profile {id}"))
        }
        Command::Stats => {
            let summary = stats::summary(&*lock(store)?, day_key(now));
            EventResult::Message(format!(
                "{}\nStreak: {} day(s)  Total: {} pomodoro(s)  Tasks done today: {}",
                status::format_day(&summary.today),
                summary.streak,
                summary.total_pomodoros,
                summary.today.completed_tasks.len()
            ))
        }
        Command::History => {
            let sessions = lock(store)?.sessions();
            if sessions.is_empty() {
                return Ok(EventResult::Message("No sessions yet".to_string()));
            }
            let mut out = String::new();
            for session in sessions.iter().rev().take(10) {
                let _ = writeln!(
                    out,
                    "{}  {:<10} {:>3} min",
                    session.completed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    session.kind.as_str(),
                    session.duration_minutes
                );
            }
            EventResult::Message(out.trim_end().to_string())
        }
        Command::ClearDone => {
            let store = lock(store)?;
            let (done, open): (Vec<Task>, Vec<Task>) =
                store.tasks().into_iter().partition(|t| t.is_completed);
            store.set_tasks(&open)?;
            for task in &done {
                store.remove_today_task(&task.id)?;
            }
            EventResult::Message(format!("Removed {} finished task(s)", done.len()))
        }
        Command::ClearAll => {
            let settings = {
                let store = lock(store)?;
                store.clear_all_data()?;
                store.settings()
            };
            let mut effects = app.on_select_task(None, now);
            effects.extend(app.apply_settings(settings, now));
            effects.extend(app.on_reset(now));
            EventResult::StateChanged(effects)
        }
        Command::Set { flag, on } => {
            let settings = lock(store)?.update_settings(|s| *flag.field(s) = on)?;
            settings_changed(app.apply_settings(settings, now))
        }
        Command::Alarm(sound) => {
            let settings = lock(store)?.update_settings(|s| s.selected_alarm_sound = sound)?;
            settings_changed(app.apply_settings(settings, now))
        }
        Command::Ambient(sound) => {
            // Picking a real sound also switches the loop on; `none` leaves the flag alone.
            let settings = lock(store)?.update_settings(|s| {
                s.selected_ambient_sound = Some(sound);
                if sound != AmbientSound::None {
                    s.ambient_sound_enabled = true;
                }
            })?;
            settings_changed(app.apply_settings(settings, now))
        }
        Command::Status => {
            let snapshot = app.snapshot();
            EventResult::Message(format!(
                "{}\n{}",
                status::format_status(&snapshot),
                status::format_progress(&snapshot)
            ))
        }
        Command::Help => EventResult::Message(HELP.to_string()),
        Command::Quit => EventResult::Quit,
    };
    Ok(result)
}

fn settings_changed(effects: Vec<Effect>) -> EventResult {
    if effects.is_empty() {
        EventResult::Continue
    } else {
        EventResult::StateChanged(effects)
    }
}

fn format_tasks(app: &App, tasks: &[Task], today: &[String]) -> String {
    if tasks.is_empty() {
        return "No tasks yet".to_string();
    }
    let active = app.state().active_task_id.as_deref();
    let mut out = String::new();
    for task in tasks {
        let check = if task.is_completed { "x" } else { " " };
        let flags = match (active == Some(task.id.as_str()), today.contains(&task.id)) {
            (true, _) => "▶",
            (false, true) => "•",
            (false, false) => " ",
        };
        let _ = writeln!(
            out,
            "{flags} [{check}] {}  {}  {}/{}",
            short_id(&task.id),
            task.title,
            task.completed_pomodoros,
            task.estimated_pomodoros
        );
    }
    out.trim_end().to_string()
}
