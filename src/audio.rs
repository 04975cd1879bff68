//! Ambient audio track.
//!
//! The track itself lives outside the core behind [`AudioSink`]. The core
//! owns the volume param (faded by timeline tweens) and the playback state.
//!
//! Starting playback can be refused by the platform (autoplay policies, no
//! output device). A refusal is logged and leaves the track `NotStarted`;
//! the next explicit user request tries again.

use crate::easing::Ease;
use crate::error::AudioError;
use crate::param::Param;
use crate::timeline::{Cue, Sequence, TimelineScheduler};

/// Volume reached by a fade-in.
pub const FADE_IN_VOLUME: f32 = 0.6;
/// Default fade-in length when toggled by the user.
pub const DEFAULT_FADE_IN: f32 = 4.5;
/// Default fade-out length when toggled by the user.
pub const DEFAULT_FADE_OUT: f32 = 2.0;

/// Audio side effects scheduled by timelines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCue {
    /// Start playback if needed and fade the volume up.
    FadeIn { duration: f32 },
    /// Fade the volume to silence, then pause.
    FadeOut { duration: f32 },
    /// Pause the sink. Scheduled at the end of a fade-out.
    Pause,
}

/// External audio output for the ambient track.
pub trait AudioSink {
    /// Begin or resume playback.
    fn play(&mut self) -> Result<(), AudioError>;
    /// Pause playback, keeping position.
    fn pause(&mut self);
    /// Set output volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
}

/// Where the underlying sink is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    NotStarted,
    Playing,
    Paused,
}

/// The ambient track: sink, fading volume and playback state.
pub struct AudioTrack {
    sink: Option<Box<dyn AudioSink>>,
    volume: Param,
    playback: PlaybackState,
    audible: bool,
}

impl AudioTrack {
    /// Wrap a loaded sink. `None` (asset missing) makes every call a no-op.
    pub fn new(sink: Option<Box<dyn AudioSink>>) -> Self {
        if sink.is_none() {
            log::warn!("audio: no ambient track loaded, sound disabled");
        }
        Self {
            sink,
            volume: Param::bounded(0.0, 0.0, 1.0),
            playback: PlaybackState::NotStarted,
            audible: false,
        }
    }

    /// Playback state of the sink.
    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    /// Whether the user currently wants sound (last fade was a fade-in).
    pub fn is_audible(&self) -> bool {
        self.audible
    }

    /// Current faded volume.
    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    /// Whether an audio asset is present.
    pub fn is_loaded(&self) -> bool {
        self.sink.is_some()
    }

    /// Start playback if needed and fade up to [`FADE_IN_VOLUME`].
    ///
    /// A refused `play` leaves the track silent, so the next toggle asks again.
    pub fn fade_in(&mut self, scheduler: &mut TimelineScheduler, duration: f32) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if self.playback != PlaybackState::Playing {
            if let Err(e) = sink.play() {
                log::warn!("audio: {}", e);
                return;
            }
            self.playback = PlaybackState::Playing;
        }
        self.audible = true;
        scheduler.play(Sequence::new("audio fade in").to(
            &self.volume.handle(),
            0.0,
            duration,
            FADE_IN_VOLUME,
            Ease::PowerInOut(2),
        ));
    }

    /// Fade to silence, then pause.
    pub fn fade_out(&mut self, scheduler: &mut TimelineScheduler, duration: f32) {
        if self.sink.is_none() {
            return;
        }
        self.audible = false;
        scheduler.play(
            Sequence::new("audio fade out")
                .to(&self.volume.handle(), 0.0, duration, 0.0, Ease::PowerInOut(2))
                .on_complete([Cue::Audio(AudioCue::Pause)]),
        );
    }

    /// Sound toggle: fade out if audible, otherwise fade in.
    pub fn toggle(&mut self, scheduler: &mut TimelineScheduler) {
        if self.audible {
            self.fade_out(scheduler, DEFAULT_FADE_OUT);
        } else {
            self.fade_in(scheduler, DEFAULT_FADE_IN);
        }
    }

    /// Apply a cue fired by a timeline.
    pub fn handle(&mut self, cue: AudioCue, scheduler: &mut TimelineScheduler) {
        match cue {
            AudioCue::FadeIn { duration } => self.fade_in(scheduler, duration),
            AudioCue::FadeOut { duration } => self.fade_out(scheduler, duration),
            AudioCue::Pause => self.pause(),
        }
    }

    /// Push the faded volume to the sink. Call once per frame.
    pub fn sync(&mut self) {
        let volume = self.volume.get();
        if let Some(sink) = self.sink.as_mut() {
            sink.set_volume(volume);
        }
    }

    fn pause(&mut self) {
        // A fade-in may have restarted the track while the fade-out ran
        if self.audible {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            if self.playback == PlaybackState::Playing {
                sink.pause();
                self.playback = PlaybackState::Paused;
            }
        }
    }
}

impl std::fmt::Debug for AudioTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioTrack")
            .field("loaded", &self.sink.is_some())
            .field("volume", &self.volume.get())
            .field("playback", &self.playback)
            .field("audible", &self.audible)
            .finish()
    }
}
