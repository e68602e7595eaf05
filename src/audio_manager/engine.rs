// Playback engine seam: one audio element per track plus the events it raises.
use crate::error::Result;
use std::collections::VecDeque;

/// Events raised by the audio element, drained by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Enough data is buffered to play through.
    CanPlayThrough,
    Playing,
    Paused,
    /// Natural end of the track.
    Ended,
    TimeUpdate { current_time: f64, duration: f64 },
    Error(String),
}

pub trait PlaybackEngine {
    /// Pauses and detaches the previous element, then binds a fresh one to
    /// `url`. Playback starts once the element reports it can play through.
    fn load(&mut self, url: &str, volume: f64) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f64);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn is_loaded(&self) -> bool;
    /// Releases the element without loading a replacement.
    fn unload(&mut self);
    fn drain_events(&mut self) -> Vec<PlaybackEvent>;
}

/// Stream URL as handed to the audio element, rewritten through `proxy` when
/// one is configured.
pub fn proxied_stream_url(url: &str, proxy: Option<&str>) -> String {
    match proxy.map(str::trim).filter(|prefix| !prefix.is_empty()) {
        Some(prefix) => format!("{prefix}{}", urlencoding::encode(url)),
        None => url.to_string(),
    }
}

/// Engine without audio output. It keeps the same state and raises the same
/// events as a browser element, which is enough for native hosts and tests.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    src: Option<String>,
    paused: bool,
    volume: f64,
    current_time: f64,
    duration: f64,
    loads: Vec<String>,
    events: VecDeque<PlaybackEvent>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self {
            paused: true,
            volume: 1.0,
            ..Self::default()
        }
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Every URL bound so far, oldest first.
    pub fn loads(&self) -> &[String] {
        &self.loads
    }

    /// Simulates playback progress.
    pub fn advance_time(&mut self, seconds: f64) {
        if self.src.is_none() {
            return;
        }
        self.current_time = (self.current_time + seconds).min(self.duration.max(0.0));
        self.events.push_back(PlaybackEvent::TimeUpdate {
            current_time: self.current_time,
            duration: self.duration,
        });
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    /// Simulates the track running out.
    pub fn finish_track(&mut self) {
        if self.src.is_some() {
            self.paused = true;
            self.current_time = self.duration;
            self.events.push_back(PlaybackEvent::Paused);
            self.events.push_back(PlaybackEvent::Ended);
        }
    }

    /// Simulates a media error on the bound element.
    pub fn fail(&mut self, message: &str) {
        if self.src.is_some() {
            self.paused = true;
            self.events.push_back(PlaybackEvent::Error(message.to_string()));
        }
    }
}

impl PlaybackEngine for HeadlessEngine {
    fn load(&mut self, url: &str, volume: f64) -> Result<()> {
        self.unload();
        self.src = Some(url.to_string());
        self.loads.push(url.to_string());
        self.volume = volume.clamp(0.0, 1.0);
        self.events.push_back(PlaybackEvent::CanPlayThrough);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.src.is_some() && self.paused {
            self.paused = false;
            self.events.push_back(PlaybackEvent::Playing);
        }
        Ok(())
    }

    fn pause(&mut self) {
        if self.src.is_some() && !self.paused {
            self.paused = true;
            self.events.push_back(PlaybackEvent::Paused);
        }
    }

    fn seek(&mut self, seconds: f64) {
        if self.src.is_some() {
            self.current_time = seconds.max(0.0);
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_loaded(&self) -> bool {
        self.src.is_some()
    }

    fn unload(&mut self) {
        // Events from a detached element never reach the controller.
        self.events.clear();
        self.src = None;
        self.paused = true;
        self.current_time = 0.0;
        self.duration = 0.0;
    }

    fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_prefix_wraps_encoded_stream_url() {
        assert_eq!(
            proxied_stream_url(
                "https://cdn.example/a b.mp3?x=1",
                Some("https://proxy.example/stream?url=")
            ),
            "https://proxy.example/stream?url=https%3A%2F%2Fcdn.example%2Fa%20b.mp3%3Fx%3D1"
        );
    }

    #[test]
    fn no_or_blank_proxy_leaves_url_untouched() {
        let url = "https://cdn.example/a.mp3";
        assert_eq!(proxied_stream_url(url, None), url);
        assert_eq!(proxied_stream_url(url, Some("  ")), url);
    }

    #[test]
    fn loading_detaches_previous_track() {
        let mut engine = HeadlessEngine::new();
        engine.load("one", 0.5).unwrap();
        engine.play().unwrap();
        engine.set_duration(100.0);
        engine.advance_time(10.0);

        engine.load("two", 0.5).unwrap();
        assert_eq!(engine.src(), Some("two"));
        assert!(engine.is_paused());
        assert_eq!(engine.current_time(), 0.0);
        assert_eq!(engine.drain_events(), vec![PlaybackEvent::CanPlayThrough]);
        assert_eq!(engine.loads(), &["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn transport_is_ignored_without_a_track() {
        let mut engine = HeadlessEngine::new();
        engine.play().unwrap();
        engine.seek(30.0);
        engine.finish_track();
        assert!(engine.drain_events().is_empty());
        assert_eq!(engine.current_time(), 0.0);
    }
}
