// Stations and per-station song queues from the Jango stations API.
use super::http::get_json;
use super::models::{Song, SongsResponse, Station, StationsResponse};
use crate::db::AppSettings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Anything that can list stations and hand out songs for one.
#[async_trait(?Send)]
pub trait StationSource {
    async fn stations(&self) -> Result<Vec<Station>>;
    async fn songs(&self, station_id: u64, count: usize) -> Result<Vec<Song>>;
}

#[derive(Debug, Clone)]
pub struct JangoClient {
    base_url: String,
    timeout: Duration,
}

impl JangoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.jango_api_url.clone())
            .with_timeout(Duration::from_secs(settings.stations_timeout_secs))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn stations_url(&self) -> String {
        format!("{}/stations", self.base_url)
    }

    fn songs_url(&self, station_id: u64, count: usize) -> String {
        format!("{}/stations/{station_id}/songs?count={count}", self.base_url)
    }
}

#[async_trait(?Send)]
impl StationSource for JangoClient {
    async fn stations(&self) -> Result<Vec<Station>> {
        let response: StationsResponse = get_json(&self.stations_url(), None, self.timeout).await?;
        if !response.success {
            return Err(Error::api(
                response
                    .error
                    .unwrap_or_else(|| "Station list request was not successful".to_string()),
            ));
        }
        tracing::debug!("Fetched {} stations", response.stations.len());
        Ok(response.stations)
    }

    async fn songs(&self, station_id: u64, count: usize) -> Result<Vec<Song>> {
        let url = self.songs_url(station_id, count);
        let response: SongsResponse = get_json(&url, None, self.timeout).await?;
        if !response.success {
            return Err(Error::api(response.error.unwrap_or_else(|| {
                format!("Song request for station {station_id} was not successful")
            })));
        }
        tracing::debug!(
            "Fetched {} songs for station {station_id}",
            response.songs.len()
        );
        Ok(response.songs)
    }
}
