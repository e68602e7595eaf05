// Cover art lookup: Cover Art Archive first, the cover route as fallback.
use super::http::{get_json, probe};
use super::models::Release;
use crate::cache::{keys, ExpiringCache, COVER_TTL};
use crate::db::{AppSettings, KeyValueStore};
use crate::diagnostics::log_perf;
use crate::error::{Error, Result};
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct CoverRouteResponse {
    #[serde(default, rename = "coverUrl")]
    cover_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct CoverResolver<S> {
    archive_url: String,
    route_url: String,
    user_agent: String,
    primary_timeout: Duration,
    fallback_timeout: Duration,
    cache: ExpiringCache<S>,
}

impl<S: KeyValueStore> CoverResolver<S> {
    pub fn new(cache: ExpiringCache<S>) -> Self {
        Self::from_settings(&AppSettings::default(), cache)
    }

    pub fn from_settings(settings: &AppSettings, cache: ExpiringCache<S>) -> Self {
        Self {
            archive_url: settings.cover_archive_url.trim_end_matches('/').to_string(),
            route_url: settings.cover_route_url.trim_end_matches('/').to_string(),
            user_agent: settings.user_agent.clone(),
            primary_timeout: Duration::from_secs(settings.cover_timeout_secs),
            fallback_timeout: Duration::from_secs(settings.cover_fallback_timeout_secs),
            cache,
        }
    }

    pub fn with_archive_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.archive_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_route_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.route_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeouts(mut self, primary: Duration, fallback: Duration) -> Self {
        self.primary_timeout = primary;
        self.fallback_timeout = fallback;
        self
    }

    pub fn archive_front_url(&self, release_id: &str) -> String {
        format!(
            "{}/release/{}/front",
            self.archive_url,
            urlencoding::encode(release_id)
        )
    }

    pub fn route_lookup_url(&self, artist: &str, album: &str) -> String {
        format!(
            "{}/{}/{}",
            self.route_url,
            urlencoding::encode(artist),
            urlencoding::encode(album)
        )
    }

    pub async fn resolve_release(&self, release: &Release) -> Option<String> {
        self.resolve(&release.id, &release.artist_display(), &release.title)
            .await
    }

    /// Cover URL for a release, or `None` when neither source has one. The
    /// caller shows a placeholder in that case.
    pub async fn resolve(&self, release_id: &str, artist: &str, album: &str) -> Option<String> {
        let cache_key = keys::cover(release_id);
        if let Some(url) = self.cache.get::<String>(&cache_key) {
            tracing::debug!("Cover for {release_id} served from cache");
            return Some(url);
        }

        let started_at = Utc::now();
        let resolved = match self.lookup_archive(release_id).await {
            Ok(url) => Some(url),
            Err(err) => {
                if err.is_timeout() {
                    tracing::info!("Cover fetch timed out for {release_id}, trying fallback");
                } else {
                    tracing::warn!("Cover Art Archive lookup failed for {release_id}: {err}");
                }
                match self.lookup_route(artist, album).await {
                    Ok(url) => Some(url),
                    Err(err) => {
                        tracing::warn!("Fallback cover lookup failed for {release_id}: {err}");
                        None
                    }
                }
            }
        };
        log_perf("resolve_cover", started_at, release_id);

        let url = resolved?;
        if let Err(err) = self.cache.set(&cache_key, &url, COVER_TTL) {
            tracing::warn!("Failed to cache cover for {release_id}: {err}");
        }
        Some(url)
    }

    async fn lookup_archive(&self, release_id: &str) -> Result<String> {
        let url = self.archive_front_url(release_id);
        probe(&url, Some(&self.user_agent), self.primary_timeout).await?;
        Ok(url)
    }

    async fn lookup_route(&self, artist: &str, album: &str) -> Result<String> {
        let url = self.route_lookup_url(artist, album);
        let response: CoverRouteResponse = get_json(&url, None, self.fallback_timeout).await?;
        match response.cover_url.filter(|url| !url.trim().is_empty()) {
            Some(url) => Ok(url),
            None => Err(Error::api(
                response
                    .error
                    .unwrap_or_else(|| "No cover found".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn resolver() -> CoverResolver<MemoryStore> {
        CoverResolver::new(ExpiringCache::new(MemoryStore::new()))
            .with_archive_url("https://coverartarchive.org/")
            .with_route_url("http://localhost:3000/api/cover")
    }

    #[test]
    fn archive_url_uses_release_front() {
        assert_eq!(
            resolver().archive_front_url("76df3287"),
            "https://coverartarchive.org/release/76df3287/front"
        );
    }

    #[test]
    fn route_url_encodes_path_segments() {
        assert_eq!(
            resolver().route_lookup_url("AC/DC", "Back in Black"),
            "http://localhost:3000/api/cover/AC%2FDC/Back%20in%20Black"
        );
    }
}
