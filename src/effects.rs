//! Runs the side effects the timer asks for.
//!
//! Durable writes go to the recorder, auto-start deadlines to the
//! scheduler, and everything user-facing (notices, sounds, haptics) to an
//! [`Alerts`] implementation. Alert failures are logged here and never
//! reach the timer.

use crate::audio::{AudioError, AudioPlayer};
use crate::models::{AlarmSound, AmbientSound, Settings, TimerMode};
use crate::notifications::NoticeScheduler;
use crate::recorder::RecorderHandle;
use crate::scheduler::Scheduler;
use crate::timer::{Effect, HapticKind};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("Audio output unavailable")]
    NoAudio,
}

/// OS services the timer can poke at interval boundaries.
pub trait Alerts {
    fn schedule_end_notice(&mut self, mode: TimerMode, after_secs: u32) -> Result<(), AlertError>;
    fn cancel_end_notice(&mut self) -> Result<(), AlertError>;
    fn play_alarm(&mut self, sound: AlarmSound) -> Result<(), AlertError>;
    fn start_ambient(&mut self, sound: AmbientSound) -> Result<(), AlertError>;
    fn stop_ambient(&mut self) -> Result<(), AlertError>;
    fn haptic(&mut self, kind: HapticKind) -> Result<(), AlertError>;
}

pub struct EffectRunner<A: Alerts> {
    recorder: RecorderHandle,
    alerts: A,
}

impl<A: Alerts> EffectRunner<A> {
    pub fn new(recorder: RecorderHandle, alerts: A) -> Self {
        Self { recorder, alerts }
    }

    /// Interprets `effects` in order, gating alerts by `settings`.
    pub fn apply(
        &mut self,
        effects: Vec<Effect>,
        settings: &Settings,
        scheduler: &mut Scheduler,
        now: Instant,
    ) {
        for effect in effects {
            let result = match &effect {
                Effect::Persist(write) => {
                    self.recorder.submit(write.clone());
                    Ok(())
                }
                Effect::ScheduleAutoStart { token, delay } => {
                    debug!(token, ?delay, "auto-start scheduled");
                    scheduler.schedule_auto_start(*token, *delay, now);
                    Ok(())
                }
                Effect::CancelAutoStart => {
                    scheduler.cancel_auto_start();
                    Ok(())
                }
                Effect::ScheduleEndNotice { mode, after_secs } => {
                    if settings.notifications_enabled {
                        self.alerts.schedule_end_notice(*mode, *after_secs)
                    } else {
                        Ok(())
                    }
                }
                Effect::CancelEndNotice => self.alerts.cancel_end_notice(),
                Effect::PlayAlarm { finished } => {
                    debug!(?finished, "interval finished");
                    if settings.sound_enabled {
                        self.alerts.play_alarm(settings.selected_alarm_sound)
                    } else {
                        Ok(())
                    }
                }
                Effect::StartAmbient => match settings.ambient() {
                    Some(sound) => self.alerts.start_ambient(sound),
                    None => Ok(()),
                },
                Effect::StopAmbient => self.alerts.stop_ambient(),
                Effect::Haptic(kind) => {
                    if settings.haptic_enabled {
                        self.alerts.haptic(*kind)
                    } else {
                        Ok(())
                    }
                }
            };

            if let Err(error) = result {
                warn!(%error, ?effect, "side effect failed");
            }
        }
    }

    #[cfg(test)]
    pub fn alerts(&self) -> &A {
        &self.alerts
    }
}

/// Alerts backed by the desktop: rodio for sound, notify-rust for notices.
pub struct DesktopAlerts {
    audio: Option<AudioPlayer>,
    notices: NoticeScheduler,
}

impl DesktopAlerts {
    /// Audio is optional; without an output device only notices work.
    pub fn new() -> Self {
        let audio = match AudioPlayer::new() {
            Ok(player) => Some(player),
            Err(error) => {
                warn!(%error, "audio output unavailable");
                None
            }
        };
        Self {
            audio,
            notices: NoticeScheduler::new(),
        }
    }

    fn audio(&mut self) -> Result<&mut AudioPlayer, AlertError> {
        self.audio.as_mut().ok_or(AlertError::NoAudio)
    }
}

impl Default for DesktopAlerts {
    fn default() -> Self {
        Self::new()
    }
}

impl Alerts for DesktopAlerts {
    fn schedule_end_notice(&mut self, mode: TimerMode, after_secs: u32) -> Result<(), AlertError> {
        self.notices.schedule(mode, after_secs);
        Ok(())
    }

    fn cancel_end_notice(&mut self) -> Result<(), AlertError> {
        self.notices.cancel();
        Ok(())
    }

    fn play_alarm(&mut self, sound: AlarmSound) -> Result<(), AlertError> {
        Ok(self.audio()?.play_alarm(sound)?)
    }

    fn start_ambient(&mut self, sound: AmbientSound) -> Result<(), AlertError> {
        Ok(self.audio()?.start_ambient(sound)?)
    }

    fn stop_ambient(&mut self) -> Result<(), AlertError> {
        if let Some(audio) = self.audio.as_mut() {
            audio.stop_ambient();
        }
        Ok(())
    }

    fn haptic(&mut self, kind: HapticKind) -> Result<(), AlertError> {
        // Desktops have no actuator; keep the event visible in traces.
        trace!(?kind, "haptic feedback");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every alert call.
    #[derive(Debug, Default)]
    pub struct RecordingAlerts {
        pub calls: Vec<String>,
        pub fail_alarm: bool,
    }

    impl Alerts for RecordingAlerts {
        fn schedule_end_notice(
            &mut self,
            mode: TimerMode,
            after_secs: u32,
        ) -> Result<(), AlertError> {
            self.calls.push(format!("notice {mode:?} {after_secs}"));
            Ok(())
        }

        fn cancel_end_notice(&mut self) -> Result<(), AlertError> {
            self.calls.push("cancel notice".to_string());
            Ok(())
        }

        fn play_alarm(&mut self, sound: AlarmSound) -> Result<(), AlertError> {
            self.calls.push(format!("alarm {sound:?}"));
            if self.fail_alarm {
                return Err(AlertError::NoAudio);
            }
            Ok(())
        }

        fn start_ambient(&mut self, sound: AmbientSound) -> Result<(), AlertError> {
            self.calls.push(format!("ambient {sound:?}"));
            Ok(())
        }

        fn stop_ambient(&mut self) -> Result<(), AlertError> {
            self.calls.push("stop ambient".to_string());
            Ok(())
        }

        fn haptic(&mut self, kind: HapticKind) -> Result<(), AlertError> {
            self.calls.push(format!("haptic {kind:?}"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingAlerts;
    use super::*;
    use crate::persistence::Store;
    use crate::recorder::Recorder;
    use crate::timer::StoreWrite;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn runner() -> (
        EffectRunner<RecordingAlerts>,
        crate::persistence::SharedStore,
        std::thread::JoinHandle<()>,
    ) {
        let store = Store::open_in_memory().unwrap().into_shared();
        let (recorder, worker) = Recorder::spawn(store.clone());
        (
            EffectRunner::new(recorder, RecordingAlerts::default()),
            store,
            worker,
        )
    }

    #[test]
    fn test_alerts_follow_settings() {
        let (mut runner, _store, _worker) = runner();
        let mut scheduler = Scheduler::default();
        let effects = vec![
            Effect::ScheduleEndNotice {
                mode: TimerMode::Work,
                after_secs: 1500,
            },
            Effect::StartAmbient,
            Effect::Haptic(HapticKind::Start),
            Effect::PlayAlarm {
                finished: TimerMode::Work,
            },
        ];

        let quiet = Settings {
            notifications_enabled: false,
            sound_enabled: false,
            haptic_enabled: false,
            ..Settings::default()
        };
        runner.apply(effects.clone(), &quiet, &mut scheduler, Instant::now());
        assert!(runner.alerts().calls.is_empty());

        let loud = Settings {
            ambient_sound_enabled: true,
            selected_ambient_sound: Some(AmbientSound::Rain),
            selected_alarm_sound: AlarmSound::Chime,
            ..Settings::default()
        };
        runner.apply(effects, &loud, &mut scheduler, Instant::now());
        assert_eq!(
            runner.alerts().calls,
            vec![
                "notice Work 1500",
                "ambient Rain",
                "haptic Start",
                "alarm Chime"
            ]
        );
    }

    #[test]
    fn test_auto_start_goes_to_scheduler() {
        let (mut runner, _store, _worker) = runner();
        let mut scheduler = Scheduler::default();
        let now = Instant::now();

        runner.apply(
            vec![Effect::ScheduleAutoStart {
                token: 3,
                delay: Duration::from_secs(5),
            }],
            &Settings::default(),
            &mut scheduler,
            now,
        );
        assert_eq!(scheduler.next_deadline(), Some(now + Duration::from_secs(5)));

        runner.apply(
            vec![Effect::CancelAutoStart],
            &Settings::default(),
            &mut scheduler,
            now,
        );
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_failed_alert_does_not_stop_later_effects() {
        let (mut runner, store, worker) = runner();
        runner.alerts.fail_alarm = true;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        runner.apply(
            vec![
                Effect::PlayAlarm {
                    finished: TimerMode::Work,
                },
                Effect::Persist(StoreWrite::IncrementPomodoro {
                    date,
                    work_minutes: 25,
                }),
                Effect::StopAmbient,
            ],
            &Settings::default(),
            &mut Scheduler::default(),
            Instant::now(),
        );
        assert_eq!(runner.alerts().calls, vec!["alarm Bell", "stop ambient"]);

        drop(runner);
        worker.join().unwrap();
        assert_eq!(
            store.lock().unwrap().day_stats(date).completed_pomodoros,
            1
        );
    }
}
