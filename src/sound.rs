use std::io::{
    IsTerminal,
    Write,
};

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    ButtonClick,
    CorrectAnswer,
    IncorrectAnswer,
    KeyboardKey,
}

impl SoundCue {
    /// Relative loudness of each cue before the user volume is applied.
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundCue::ButtonClick => 0.3,
            SoundCue::CorrectAnswer => 0.6,
            SoundCue::IncorrectAnswer => 0.5,
            SoundCue::KeyboardKey => 0.2,
        }
    }
}

pub trait SoundBackend: Send {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn play(&mut self, cue: SoundCue, volume: f32) -> std::io::Result<()>;
}

/// Rings the terminal bell on stderr. Only the answer cues make noise,
/// a bell per keystroke would be unbearable.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl SoundBackend for TerminalBell {
    fn name(&self) -> &'static str {
        "terminal bell"
    }

    fn is_available(&self) -> bool {
        std::io::stderr().is_terminal()
    }

    fn play(&mut self, cue: SoundCue, volume: f32) -> std::io::Result<()> {
        if volume <= 0.0 {
            return Ok(());
        }
        match cue {
            SoundCue::CorrectAnswer | SoundCue::IncorrectAnswer => {
                let mut stderr = std::io::stderr().lock();
                stderr.write_all(b"\x07")?;
                stderr.flush()
            }
            SoundCue::ButtonClick | SoundCue::KeyboardKey => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct Silent;

impl SoundBackend for Silent {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn play(&mut self, _cue: SoundCue, _volume: f32) -> std::io::Result<()> {
        Ok(())
    }
}

/// Feedback cues for the study loop. The backend is chosen once: the primary
/// if it reports itself usable, otherwise the fallback. Playback errors are
/// logged and never reach the caller.
pub struct FeedbackSounds {
    backend: Box<dyn SoundBackend>,
    enabled: bool,
    volume: f32,
}

impl FeedbackSounds {
    pub fn new(primary: Box<dyn SoundBackend>, fallback: Box<dyn SoundBackend>, settings: &Settings) -> Self {
        let backend = if primary.is_available() {
            primary
        } else {
            log::debug!("Sound backend {} unavailable, using {}", primary.name(), fallback.name());
            fallback
        };

        Self { backend, enabled: settings.sound_enabled, volume: settings.volume.clamp(0.0, 1.0) }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(Box::new(TerminalBell), Box::new(Silent), settings)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn play(&mut self, cue: SoundCue) {
        if !self.enabled || self.volume <= 0.0 {
            return;
        }
        let volume = cue.base_volume() * self.volume;
        if let Err(e) = self.backend.play(cue, volume) {
            log::warn!("Failed to play {:?} on {}: {}", cue, self.backend.name(), e);
        }
    }
}
