pub mod covers;
mod http;
pub mod jango;
pub mod models;
pub mod musicbrainz;

pub use covers::CoverResolver;
pub use jango::{JangoClient, StationSource};
pub use models::*;
pub use musicbrainz::ReleaseLoader;
