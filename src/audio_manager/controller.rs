// Station/queue controller: station selection, queue navigation and the
// playback state machine on top of a `PlaybackEngine`.
use super::engine::{proxied_stream_url, PlaybackEngine, PlaybackEvent};
use super::queue::{wrap_next, wrap_previous, SongQueue};
use crate::api::jango::StationSource;
use crate::api::models::{Song, Station};
use crate::error::Result;
use rand::Rng;

/// Songs requested when a station is selected.
pub const STATION_QUEUE_SIZE: usize = 100;
/// Songs requested when play is pressed with nothing queued.
pub const BOOTSTRAP_QUEUE_SIZE: usize = 10;
/// Songs requested when topping up a short queue.
pub const REFILL_SIZE: usize = 20;

pub const STATIONS_UNAVAILABLE: &str =
    "Unable to connect to music service. Please check your API configuration.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
}

pub struct StationController<S, E> {
    source: S,
    engine: E,
    proxy_url: Option<String>,
    stations: Vec<Station>,
    selected: Option<Station>,
    queue: SongQueue,
    current: Option<Song>,
    state: PlayerState,
    volume: f64,
    current_time: f64,
    duration: f64,
    api_error: Option<String>,
    playback_error: Option<String>,
}

impl<S: StationSource, E: PlaybackEngine> StationController<S, E> {
    pub fn new(source: S, engine: E) -> Self {
        Self {
            source,
            engine,
            proxy_url: None,
            stations: Vec::new(),
            selected: None,
            queue: SongQueue::default(),
            current: None,
            state: PlayerState::Idle,
            volume: 0.5,
            current_time: 0.0,
            duration: 0.0,
            api_error: None,
            playback_error: None,
        }
    }

    pub fn with_proxy(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url.filter(|url| !url.trim().is_empty());
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn selected_station(&self) -> Option<&Station> {
        self.selected.as_ref()
    }

    pub fn queue(&self) -> &SongQueue {
        &self.queue
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Banner shown when the stations API cannot be reached.
    pub fn api_error(&self) -> Option<&str> {
        self.api_error.as_deref()
    }

    pub fn playback_error(&self) -> Option<&str> {
        self.playback_error.as_deref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn set_stations(&mut self, stations: Vec<Station>) {
        self.stations = stations;
    }

    pub async fn load_stations(&mut self) -> Result<&[Station]> {
        self.api_error = None;
        match self.source.stations().await {
            Ok(stations) => {
                tracing::info!("Loaded {} stations", stations.len());
                self.stations = stations;
                Ok(&self.stations)
            }
            Err(err) => {
                tracing::error!("Error fetching stations: {err}");
                self.api_error = Some(STATIONS_UNAVAILABLE.to_string());
                Err(err)
            }
        }
    }

    pub fn filter_stations(&self, query: &str) -> Vec<&Station> {
        self.stations
            .iter()
            .filter(|station| station.matches(query))
            .collect()
    }

    /// Fetches a fresh queue for `station` and starts its first song.
    pub async fn select_station(&mut self, station: Station) {
        tracing::info!("Selecting station {} ({})", station.name, station.id);
        self.selected = Some(station.clone());
        self.state = PlayerState::Loading;

        let songs = self.fetch_queue(station.id, STATION_QUEUE_SIZE).await;
        self.queue = SongQueue::new(songs);
        if self.queue.is_empty() {
            self.stop();
        } else {
            self.play_current();
        }
    }

    pub async fn toggle_play_pause(&mut self) {
        let Some(station_id) = self.selected.as_ref().map(|station| station.id) else {
            return;
        };

        if self.engine.is_loaded() {
            if self.state == PlayerState::Playing {
                self.engine.pause();
                self.state = PlayerState::Paused;
            } else {
                self.start_engine();
            }
        } else if self.current.is_some() {
            self.play_current();
        } else {
            let songs = self.fetch_queue(station_id, BOOTSTRAP_QUEUE_SIZE).await;
            self.queue = SongQueue::new(songs);
            if !self.queue.is_empty() {
                self.play_current();
            }
        }
    }

    pub async fn play_next(&mut self) {
        let Some(station_id) = self.selected.as_ref().map(|station| station.id) else {
            return;
        };
        if self.queue.is_empty() {
            return;
        }

        if self.queue.needs_refill() {
            match self.source.songs(station_id, REFILL_SIZE).await {
                Ok(more) => {
                    let added = self.queue.extend_unique(more);
                    tracing::debug!("Topped up queue for station {station_id} with {added} songs");
                }
                Err(err) => {
                    tracing::warn!("Could not top up queue for station {station_id}: {err}");
                }
            }
        }

        self.queue.advance();
        self.play_current();
    }

    pub fn play_previous(&mut self) {
        if self.selected.is_none() || self.queue.is_empty() {
            return;
        }
        self.queue.retreat();
        self.play_current();
    }

    pub fn play_random_song(&mut self) {
        let mut rng = rand::thread_rng();
        self.play_random_song_with(&mut rng);
    }

    pub fn play_random_song_with<R: Rng>(&mut self, rng: &mut R) {
        if self.selected.is_none() {
            return;
        }
        if let Some(index) = self.queue.random_index(rng) {
            self.queue.jump_to(index);
            self.play_current();
        }
    }

    pub async fn play_random_station(&mut self) {
        if self.stations.is_empty() {
            return;
        }
        let index = rand::thread_rng().gen_range(0..self.stations.len());
        let station = self.stations[index].clone();
        self.select_station(station).await;
    }

    pub async fn play_next_station(&mut self) {
        if let Some(station) = self.neighbour_station(true) {
            self.select_station(station).await;
        }
    }

    pub async fn play_previous_station(&mut self) {
        if let Some(station) = self.neighbour_station(false) {
            self.select_station(station).await;
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        self.engine.set_volume(self.volume);
    }

    pub fn seek(&mut self, seconds: f64) {
        if self.engine.is_loaded() {
            self.engine.seek(seconds);
            self.current_time = self.engine.current_time();
        }
    }

    /// Applies everything the engine raised since the last call.
    pub async fn pump_events(&mut self) {
        for event in self.engine.drain_events() {
            self.handle_event(event).await;
        }
    }

    pub async fn handle_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::CanPlayThrough => self.start_engine(),
            PlaybackEvent::Playing => {
                if self.engine.is_loaded() {
                    self.state = PlayerState::Playing;
                }
            }
            PlaybackEvent::Paused => {
                if self.state == PlayerState::Playing {
                    self.state = PlayerState::Paused;
                }
            }
            PlaybackEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                self.current_time = current_time;
                self.duration = if duration.is_finite() { duration } else { 0.0 };
            }
            PlaybackEvent::Error(message) => {
                tracing::warn!("Playback error: {message}");
                self.playback_error = Some(message);
                self.state = PlayerState::Paused;
            }
            PlaybackEvent::Ended => {
                self.state = PlayerState::Paused;
                self.play_next().await;
            }
        }
    }

    async fn fetch_queue(&self, station_id: u64, count: usize) -> Vec<Song> {
        match self.source.songs(station_id, count).await {
            Ok(songs) => songs,
            Err(err) => {
                tracing::error!("Error fetching song queue for station {station_id}: {err}");
                Vec::new()
            }
        }
    }

    fn play_current(&mut self) {
        let Some(song) = self.queue.current().cloned() else {
            return;
        };
        let url = proxied_stream_url(&song.stream_url, self.proxy_url.as_deref());
        tracing::info!("Now playing {} - {}", song.artist, song.title);

        self.current = Some(song);
        self.current_time = 0.0;
        self.duration = 0.0;
        self.playback_error = None;
        match self.engine.load(&url, self.volume) {
            Ok(()) => self.state = PlayerState::Loading,
            Err(err) => {
                tracing::warn!("Failed to load stream {url}: {err}");
                self.playback_error = Some(err.to_string());
                self.state = PlayerState::Paused;
            }
        }
    }

    fn start_engine(&mut self) {
        match self.engine.play() {
            Ok(()) => self.state = PlayerState::Playing,
            Err(err) => {
                tracing::warn!("Failed to start playback: {err}");
                self.playback_error = Some(err.to_string());
                self.state = PlayerState::Paused;
            }
        }
    }

    fn stop(&mut self) {
        self.engine.unload();
        self.current = None;
        self.state = PlayerState::Idle;
    }

    fn neighbour_station(&self, forward: bool) -> Option<Station> {
        let selected = self.selected.as_ref()?;
        if self.stations.is_empty() {
            return None;
        }
        let position = self
            .stations
            .iter()
            .position(|station| station.id == selected.id);
        let index = match (position, forward) {
            (Some(position), true) => wrap_next(position, self.stations.len()),
            (Some(position), false) => wrap_previous(position, self.stations.len()),
            (None, _) => 0,
        };
        self.stations.get(index).cloned()
    }
}
