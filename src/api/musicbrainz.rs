// Release metadata from MusicBrainz, cache-first.
use super::http::get_json;
use super::models::Release;
use crate::cache::{keys, ExpiringCache, RELEASE_TTL};
use crate::db::{AppSettings, KeyValueStore};
use crate::diagnostics::log_perf;
use crate::error::Result;
use chrono::Utc;
use std::time::Duration;

const RELEASE_INCLUDES: &str = "artist-credits+recordings+labels+tags+genres+ratings";

pub struct ReleaseLoader<S> {
    base_url: String,
    user_agent: String,
    timeout: Duration,
    cache: ExpiringCache<S>,
}

impl<S: KeyValueStore> ReleaseLoader<S> {
    pub fn new(cache: ExpiringCache<S>) -> Self {
        Self::from_settings(&AppSettings::default(), cache)
    }

    pub fn from_settings(settings: &AppSettings, cache: ExpiringCache<S>) -> Self {
        Self {
            base_url: settings.musicbrainz_api_url.trim_end_matches('/').to_string(),
            user_agent: settings.user_agent.clone(),
            timeout: Duration::from_secs(settings.release_timeout_secs),
            cache,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn release_url(&self, release_id: &str) -> String {
        format!(
            "{}/release/{}?inc={RELEASE_INCLUDES}&fmt=json",
            self.base_url,
            urlencoding::encode(release_id)
        )
    }

    /// Returns the cached release when fresh, otherwise fetches and caches it
    /// for an hour.
    pub async fn load_release(&self, release_id: &str) -> Result<Release> {
        let cache_key = keys::release(release_id);
        if let Some(release) = self.cache.get::<Release>(&cache_key) {
            tracing::debug!("Release {release_id} served from cache");
            return Ok(release);
        }

        let started_at = Utc::now();
        let url = self.release_url(release_id);
        let release: Release = match get_json(&url, Some(&self.user_agent), self.timeout).await {
            Ok(release) => release,
            Err(err) => {
                tracing::error!("Error loading release {release_id}: {err}");
                return Err(err);
            }
        };
        log_perf("load_release", started_at, release_id);

        if let Err(err) = self.cache.set(&cache_key, &release, RELEASE_TTL) {
            tracing::warn!("Failed to cache release {release_id}: {err}");
        }
        Ok(release)
    }
}
