//! Musico: music discovery and internet-radio streaming client.
//!
//! Release metadata comes from MusicBrainz, cover art from the Cover Art
//! Archive with a fallback lookup route, and station audio from a Jango-style
//! stations API played through a single rebinding audio element.

pub mod api;
pub mod audio_manager;
pub mod cache;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod utils;

pub use error::{Error, Result};
