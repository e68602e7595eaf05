// Browser engine: a fresh `HtmlAudioElement` per track, listeners feeding a
// shared event queue that the controller drains.
use super::engine::{PlaybackEngine, PlaybackEvent};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::HtmlAudioElement;

type EventQueue = Rc<RefCell<VecDeque<PlaybackEvent>>>;

struct BoundElement {
    audio: HtmlAudioElement,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
}

impl BoundElement {
    fn detach(self) {
        let _ = self.audio.pause();
        for (name, callback) in &self.listeners {
            let _ = self
                .audio
                .remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        }
        self.audio.set_src("");
        let _ = self.audio.remove_attribute("src");
        self.audio.load();
    }
}

#[derive(Default)]
pub struct WebAudioEngine {
    element: Option<BoundElement>,
    events: EventQueue,
}

impl WebAudioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn audio(&self) -> Option<&HtmlAudioElement> {
        self.element.as_ref().map(|element| &element.audio)
    }
}

fn media_error_message(audio: &HtmlAudioElement) -> String {
    match audio.error().map(|error| error.code()) {
        Some(1) => "Playback was aborted before the stream loaded.".to_string(),
        Some(2) => "Network error while loading this stream.".to_string(),
        Some(3) => "Audio playback failed due to a decode error.".to_string(),
        Some(4) => "Failed to load audio because no supported source was found.".to_string(),
        _ => "Unable to load this audio source.".to_string(),
    }
}

fn listen<F>(audio: &HtmlAudioElement, name: &'static str, handler: F) -> (&'static str, Closure<dyn FnMut()>)
where
    F: FnMut() + 'static,
{
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
    let _ = audio.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
    (name, callback)
}

fn push_on(events: &EventQueue, event: PlaybackEvent) -> impl FnMut() + 'static {
    let events = events.clone();
    move || events.borrow_mut().push_back(event.clone())
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

impl PlaybackEngine for WebAudioEngine {
    fn load(&mut self, url: &str, volume: f64) -> Result<()> {
        self.unload();

        let audio = HtmlAudioElement::new().map_err(|e| Error::Playback(format!("{e:?}")))?;
        audio.set_cross_origin(Some("anonymous"));
        audio.set_volume(volume.clamp(0.0, 1.0));

        let events = &self.events;
        let mut listeners = vec![
            listen(&audio, "canplaythrough", push_on(events, PlaybackEvent::CanPlayThrough)),
            listen(&audio, "play", push_on(events, PlaybackEvent::Playing)),
            listen(&audio, "pause", push_on(events, PlaybackEvent::Paused)),
            listen(&audio, "ended", push_on(events, PlaybackEvent::Ended)),
        ];
        for name in ["timeupdate", "loadedmetadata"] {
            let queue = events.clone();
            let element = audio.clone();
            listeners.push(listen(&audio, name, move || {
                queue.borrow_mut().push_back(PlaybackEvent::TimeUpdate {
                    current_time: finite_or_zero(element.current_time()),
                    duration: finite_or_zero(element.duration()),
                });
            }));
        }
        {
            let queue = events.clone();
            let element = audio.clone();
            listeners.push(listen(&audio, "error", move || {
                queue
                    .borrow_mut()
                    .push_back(PlaybackEvent::Error(media_error_message(&element)));
            }));
        }

        audio.set_src(url);
        self.element = Some(BoundElement { audio, listeners });
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let Some(audio) = self.audio() else {
            return Ok(());
        };
        let promise: js_sys::Promise = audio
            .play()
            .map_err(|e| Error::Playback(format!("{e:?}")))?;
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                tracing::warn!("Audio element refused to play: {err:?}");
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(audio) = self.audio() {
            let _ = audio.pause();
        }
    }

    fn seek(&mut self, seconds: f64) {
        if let Some(audio) = self.audio() {
            audio.set_current_time(seconds.max(0.0));
        }
    }

    fn set_volume(&mut self, volume: f64) {
        if let Some(audio) = self.audio() {
            audio.set_volume(volume.clamp(0.0, 1.0));
        }
    }

    fn current_time(&self) -> f64 {
        self.audio()
            .map(|audio| finite_or_zero(audio.current_time()))
            .unwrap_or(0.0)
    }

    fn duration(&self) -> f64 {
        self.audio()
            .map(|audio| finite_or_zero(audio.duration()))
            .unwrap_or(0.0)
    }

    fn is_loaded(&self) -> bool {
        self.element.is_some()
    }

    fn unload(&mut self) {
        if let Some(element) = self.element.take() {
            element.detach();
        }
        self.events.borrow_mut().clear();
    }

    fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.events.borrow_mut().drain(..).collect()
    }
}
