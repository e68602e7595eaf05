use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

const SETTINGS_KEY: &str = "musico.app_settings";

pub const JANGO_API_URL_ENV: &str = "MUSICO_JANGO_API_URL";
pub const PROXY_API_URL_ENV: &str = "MUSICO_PROXY_API_URL";
pub const COVER_ROUTE_URL_ENV: &str = "MUSICO_COVER_ROUTE_URL";
pub const USER_AGENT_ENV: &str = "MUSICO_USER_AGENT";

/// Persistent string-to-string storage, the same shape as browser
/// `localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Volatile store for tests and hosts that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.remove(key);
        Ok(())
    }
}

/// SQLite-backed store used on desktop targets.
#[cfg(not(target_arch = "wasm32"))]
pub struct SqliteStore {
    conn: Mutex<rusqlite::Connection>,
}

#[cfg(not(target_arch = "wasm32"))]
impl SqliteStore {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = rusqlite::Connection::open(path.as_ref())?;
        Self::initialize(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::initialize(conn)
    }

    /// Opens `musico.db` in the platform data directory, falling back to the
    /// working directory when none is known.
    pub fn open_default() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join("musico"))
            .unwrap_or_else(|| std::path::PathBuf::from(".musico"));
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| Error::storage(format!("Failed to create {}: {e}", data_dir.display())))?;
        Self::open(data_dir.join("musico.db"))
    }

    fn initialize(conn: rusqlite::Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for SqliteStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        use rusqlite::OptionalExtension;

        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// Browser `localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| Error::storage(format!("{e:?}")))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| Error::storage(format!("{e:?}")))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        LocalStorage::raw()
            .remove_item(key)
            .map_err(|e| Error::storage(format!("{e:?}")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub type DefaultStore = SqliteStore;
#[cfg(target_arch = "wasm32")]
pub type DefaultStore = LocalStore;

#[cfg(not(target_arch = "wasm32"))]
pub fn open_default_store() -> Result<DefaultStore> {
    SqliteStore::open_default()
}

#[cfg(target_arch = "wasm32")]
pub fn open_default_store() -> Result<DefaultStore> {
    Ok(LocalStore)
}

/// App settings stored in the key-value store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub jango_api_url: String,
    pub proxy_api_url: Option<String>,
    pub musicbrainz_api_url: String,
    pub cover_archive_url: String,
    pub cover_route_url: String,
    pub user_agent: String,
    pub volume: f64,
    pub stations_timeout_secs: u64,
    pub release_timeout_secs: u64,
    pub cover_timeout_secs: u64,
    pub cover_fallback_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            jango_api_url: "https://jango-psi.vercel.app".to_string(),
            proxy_api_url: None,
            musicbrainz_api_url: "https://musicbrainz.org/ws/2".to_string(),
            cover_archive_url: "https://coverartarchive.org".to_string(),
            cover_route_url: "http://localhost:3000/api/cover".to_string(),
            user_agent: "Musico/1.0 ( https://github.com/musico )".to_string(),
            volume: 0.5,
            stations_timeout_secs: 10,
            release_timeout_secs: 10,
            cover_timeout_secs: 5,
            cover_fallback_timeout_secs: 5,
        }
    }
}

impl AppSettings {
    /// Applies overrides from `lookup`, normally `std::env::var`. Blank values
    /// are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(url) = pick(JANGO_API_URL_ENV) {
            self.jango_api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = pick(PROXY_API_URL_ENV) {
            self.proxy_api_url = Some(url);
        }
        if let Some(url) = pick(COVER_ROUTE_URL_ENV) {
            self.cover_route_url = url.trim_end_matches('/').to_string();
        }
        if let Some(agent) = pick(USER_AGENT_ENV) {
            self.user_agent = agent;
        }
    }
}

pub fn save_settings<S: KeyValueStore + ?Sized>(store: &S, settings: &AppSettings) -> Result<()> {
    let settings_json = serde_json::to_string(settings)?;
    store.set_item(SETTINGS_KEY, &settings_json)
}

/// Persisted settings, or defaults when nothing usable is stored.
pub fn load_settings<S: KeyValueStore + ?Sized>(store: &S) -> Result<AppSettings> {
    match store.get_item(SETTINGS_KEY)? {
        Some(json) => match serde_json::from_str(&json) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::warn!("Ignoring unreadable stored settings: {err}");
                Ok(AppSettings::default())
            }
        },
        None => Ok(AppSettings::default()),
    }
}

/// Stored settings with process environment overrides applied on top.
#[cfg_attr(target_arch = "wasm32", allow(unused_mut))]
pub fn load_effective_settings<S: KeyValueStore + ?Sized>(store: &S) -> Result<AppSettings> {
    let mut settings = load_settings(store)?;
    #[cfg(not(target_arch = "wasm32"))]
    settings.apply_overrides(|name| std::env::var(name).ok());
    Ok(settings)
}
