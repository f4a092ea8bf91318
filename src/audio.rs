use std::collections::HashMap;
use std::time::Duration;

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

/// Named sound cues, each a short synthesized tone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Cue {
    ButtonClick,
    CriticalWarning,
    GameOver,
}

/// Per-trigger playback options.
#[derive(Clone, Copy, Debug)]
pub struct PlayOptions {
    pub looped: bool,
    pub volume: f32,
}

impl Default for PlayOptions {
    fn default() -> Self {
        PlayOptions {
            looped: false,
            volume: 1.0,
        }
    }
}

/// Dispatches sound cues over the default audio device. The device and the
/// per-cue sinks are created lazily on first use; every failure is logged
/// and swallowed so a machine without audio keeps the rest of the panel
/// fully functional.
pub struct AudioManager {
    // Kept alive for the lifetime of the manager; dropping it kills playback.
    output: Option<(OutputStream, OutputStreamHandle)>,
    device_failed: bool,
    muted: bool,
    sinks: HashMap<Cue, Sink>,
}

impl AudioManager {
    pub fn new() -> Self {
        AudioManager {
            output: None,
            device_failed: false,
            muted: false,
            sinks: HashMap::new(),
        }
    }

    /// A manager that never opens a device. Used for `--mute` and tests.
    pub fn muted() -> Self {
        AudioManager {
            muted: true,
            ..AudioManager::new()
        }
    }

    fn handle(&mut self) -> Option<OutputStreamHandle> {
        if self.muted || self.device_failed {
            return None;
        }
        if self.output.is_none() {
            match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    debug!("audio output opened");
                    self.output = Some((stream, handle));
                }
                Err(error) => {
                    warn!(%error, "audio unavailable, continuing muted");
                    self.device_failed = true;
                    return None;
                }
            }
        }
        self.output.as_ref().map(|(_, handle)| handle.clone())
    }

    /// Triggers a cue, restarting it from the beginning if it is already
    /// playing.
    pub fn play(&mut self, cue: Cue, options: PlayOptions) {
        let Some(handle) = self.handle() else {
            return;
        };
        if let Some(previous) = self.sinks.remove(&cue) {
            previous.stop();
        }
        let sink = match Sink::try_new(&handle) {
            Ok(sink) => sink,
            Err(error) => {
                warn!(%error, ?cue, "could not start cue");
                return;
            }
        };
        sink.set_volume(options.volume);
        append_cue(&sink, cue, options.looped);
        self.sinks.insert(cue, sink);
    }

    /// Stops a cue, rewinding it and clearing any loop.
    pub fn stop(&mut self, cue: Cue) {
        if let Some(sink) = self.sinks.remove(&cue) {
            sink.stop();
        }
    }
}

/// Queues the waveform for a cue on a sink.
fn append_cue(sink: &Sink, cue: Cue, looped: bool) {
    match cue {
        Cue::ButtonClick => {
            sink.append(tone(880.0, 35, 0.6));
        }
        Cue::CriticalWarning => {
            if looped {
                sink.append(SineWave::new(1000.0).amplify(0.35));
            } else {
                sink.append(tone(1000.0, 120, 0.35));
            }
        }
        Cue::GameOver => {
            // Descending two-tone, played once.
            sink.append(tone(660.0, 180, 0.5));
            sink.append(tone(330.0, 350, 0.5));
        }
    }
}

fn tone(frequency: f32, millis: u64, amplitude: f32) -> impl Source<Item = f32> {
    SineWave::new(frequency)
        .take_duration(Duration::from_millis(millis))
        .amplify(amplitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muted_manager_swallows_triggers() {
        let mut audio = AudioManager::muted();
        audio.play(Cue::ButtonClick, PlayOptions::default());
        audio.play(
            Cue::CriticalWarning,
            PlayOptions {
                looped: true,
                volume: 0.5,
            },
        );
        audio.stop(Cue::CriticalWarning);
        assert!(audio.sinks.is_empty());
    }
}
