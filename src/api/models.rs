use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: u64,
    pub name: String,
}

impl Station {
    /// Case-insensitive substring match on the display name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty() || self.name.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Song {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub album: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artist: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub album_art: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub station: String,
    #[serde(rename = "song")]
    pub title: String,
    #[serde(rename = "url")]
    pub stream_url: String,
}

impl Song {
    /// Identity used for queue de-duplication.
    pub fn dedup_key(&self) -> (&str, &str) {
        (self.title.as_str(), self.artist.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StationsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SongsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default)]
    pub error: Option<String>,
}

/// MusicBrainz release with the `artist-credits+recordings+labels+tags+genres+ratings`
/// includes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Release {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub disambiguation: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub label_info: Vec<LabelInfo>,
    #[serde(default)]
    pub release_group: Option<ReleaseGroup>,
    #[serde(default)]
    pub media: Vec<Medium>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ArtistCredit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<CreditedArtist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CreditedArtist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Genre {
    pub name: String,
    #[serde(default)]
    pub count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Rating {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub votes_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct LabelInfo {
    #[serde(default)]
    pub catalog_number: Option<String>,
    #[serde(default)]
    pub label: Option<Label>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    #[serde(default, rename = "primary-type", alias = "type")]
    pub primary_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Medium {
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Track {
    #[serde(default, deserialize_with = "string_or_number")]
    pub number: String,
    pub title: String,
    #[serde(default)]
    pub length: Option<u64>,
}

impl Release {
    /// Credited artists joined for display.
    pub fn artist_display(&self) -> String {
        if self.artist_credit.is_empty() {
            return "Unknown Artist".to_string();
        }

        self.artist_credit
            .iter()
            .map(|credit| {
                credit
                    .name
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .or_else(|| credit.artist.as_ref().and_then(|a| a.name.as_deref()))
                    .unwrap_or("Unknown")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.label_info
            .iter()
            .filter_map(|info| info.label.as_ref().map(|label| label.name.as_str()))
            .collect()
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.media.iter().flat_map(|medium| medium.tracks.iter())
    }

    pub fn release_type(&self) -> Option<&str> {
        self.release_group
            .as_ref()
            .and_then(|group| group.primary_type.as_deref())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => text,
        Some(serde_json::Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}
