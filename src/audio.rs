//! Alarm tones and the ambient loop.

use crate::models::{AlarmSound, AmbientSound};
use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("Failed to play audio: {0}")]
    Play(#[from] rodio::PlayError),
}

/// Two tones separated by a short gap.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Chime {
    first_hz: f32,
    second_hz: f32,
    first_ms: u64,
    second_ms: u64,
    volume: f32,
}

fn chime_for(sound: AlarmSound) -> Chime {
    match sound {
        AlarmSound::Bell => Chime {
            first_hz: 880.0,
            second_hz: 1046.5,
            first_ms: 150,
            second_ms: 200,
            volume: 0.3,
        },
        AlarmSound::Chime => Chime {
            first_hz: 659.25,
            second_hz: 987.77,
            first_ms: 200,
            second_ms: 300,
            volume: 0.3,
        },
        AlarmSound::Digital => Chime {
            first_hz: 1200.0,
            second_hz: 1200.0,
            first_ms: 80,
            second_ms: 80,
            volume: 0.25,
        },
        AlarmSound::Gentle => Chime {
            first_hz: 440.0,
            second_hz: 523.25,
            first_ms: 300,
            second_ms: 400,
            volume: 0.15,
        },
    }
}

/// Base frequency of the ambient drone. `None` has no loop.
fn ambient_hz(sound: AmbientSound) -> Option<f32> {
    match sound {
        AmbientSound::Rain => Some(110.0),
        AmbientSound::Cafe => Some(164.81),
        AmbientSound::WhiteNoise => Some(220.0),
        AmbientSound::None => None,
    }
}

pub struct AudioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    ambient: Option<Sink>,
}

impl AudioPlayer {
    /// Opens the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            ambient: None,
        })
    }

    /// Plays the completion alarm in the background.
    pub fn play_alarm(&self, sound: AlarmSound) -> Result<(), AudioError> {
        let chime = chime_for(sound);
        let sink = Sink::try_new(&self.handle)?;

        let tone1 = SineWave::new(chime.first_hz)
            .take_duration(Duration::from_millis(chime.first_ms))
            .amplify(chime.volume);
        let silence = Zero::<f32>::new(1, 44100).take_duration(Duration::from_millis(50));
        let tone2 = SineWave::new(chime.second_hz)
            .take_duration(Duration::from_millis(chime.second_ms))
            .amplify(chime.volume);

        sink.append(tone1);
        sink.append(silence);
        sink.append(tone2);
        sink.detach();
        Ok(())
    }

    /// Starts the ambient loop, replacing any loop already playing.
    pub fn start_ambient(&mut self, sound: AmbientSound) -> Result<(), AudioError> {
        self.stop_ambient();
        let Some(hz) = ambient_hz(sound) else {
            return Ok(());
        };

        let sink = Sink::try_new(&self.handle)?;
        sink.append(SineWave::new(hz).amplify(0.05));
        debug!(?sound, "ambient loop started");
        self.ambient = Some(sink);
        Ok(())
    }

    pub fn stop_ambient(&mut self) {
        if let Some(sink) = self.ambient.take() {
            sink.stop();
            debug!("ambient loop stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_player_creation() {
        // This test may fail on systems without audio output
        // That's acceptable for CI environments
        match AudioPlayer::new() {
            Ok(_) => println!("Audio player created successfully"),
            Err(e) => println!("Audio player creation failed (expected on CI): {}", e),
        }
    }

    #[test]
    fn test_each_alarm_sound_is_distinct() {
        let sounds = [
            AlarmSound::Bell,
            AlarmSound::Chime,
            AlarmSound::Digital,
            AlarmSound::Gentle,
        ];
        for (i, a) in sounds.iter().enumerate() {
            for b in &sounds[i + 1..] {
                assert_ne!(chime_for(*a), chime_for(*b));
            }
        }
    }

    #[test]
    fn test_ambient_none_has_no_tone() {
        assert_eq!(ambient_hz(AmbientSound::None), None);
        assert!(ambient_hz(AmbientSound::Rain).is_some());
    }
}
