//! Station playback: song queue, engine seam and the controller tying them
//! to a `StationSource`.

pub mod controller;
pub mod engine;
pub mod queue;
#[cfg(target_arch = "wasm32")]
pub mod web_engine;

pub use controller::{PlayerState, StationController};
pub use engine::{proxied_stream_url, HeadlessEngine, PlaybackEngine, PlaybackEvent};
pub use queue::{dedupe_songs, SongQueue};
#[cfg(target_arch = "wasm32")]
pub use web_engine::WebAudioEngine;
