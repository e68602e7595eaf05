#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use clap::{Parser, Subcommand};
    use musico::api::{CoverResolver, JangoClient, ReleaseLoader, StationSource};
    use musico::audio_manager::{proxied_stream_url, HeadlessEngine, StationController};
    use musico::cache::ExpiringCache;
    use musico::db::{self, AppSettings};
    use musico::utils::format_track_length;
    use tracing_subscriber::EnvFilter;

    #[derive(Debug, Parser)]
    #[command(name = "musico", version, about = "Music discovery and radio streaming client")]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Debug, Subcommand)]
    enum Command {
        /// List stations, optionally filtered by name
        Stations {
            #[arg(short, long)]
            search: Option<String>,
        },
        /// Print the de-duplicated song queue of a station
        Queue {
            station_id: u64,
            #[arg(short, long, default_value_t = musico::audio_manager::controller::STATION_QUEUE_SIZE)]
            count: usize,
        },
        /// Show release details and its cover
        Release { id: String },
        /// Resolve a cover URL for a release
        Cover {
            release_id: String,
            #[arg(long)]
            artist: String,
            #[arg(long)]
            album: String,
        },
        /// Tune into a station and print what would be playing
        Tune {
            station_id: u64,
            #[arg(long, default_value_t = 0)]
            skip: usize,
        },
    }

    fn init_tracing() {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("musico=info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
        init_tracing();
        let cli = Cli::parse();

        let store = db::open_default_store()?;
        let settings: AppSettings = db::load_effective_settings(&store)?;
        let cache = ExpiringCache::new(store);
        let stations = JangoClient::from_settings(&settings);

        match cli.command {
            Command::Stations { search } => {
                let mut controller = StationController::new(stations, HeadlessEngine::new());
                if controller.load_stations().await.is_err() {
                    if let Some(banner) = controller.api_error() {
                        eprintln!("{banner}");
                    }
                    return Ok(());
                }
                for station in controller.filter_stations(search.as_deref().unwrap_or("")) {
                    println!("{:>6}  {}", station.id, station.name);
                }
            }
            Command::Queue { station_id, count } => {
                let songs = musico::audio_manager::dedupe_songs(stations.songs(station_id, count).await?);
                for (index, song) in songs.iter().enumerate() {
                    println!("{:>3}. {} - {} ({})", index + 1, song.artist, song.title, song.album);
                }
            }
            Command::Release { id } => {
                let loader = ReleaseLoader::from_settings(&settings, cache.clone());
                let covers = CoverResolver::from_settings(&settings, cache);
                let release = loader.load_release(&id).await?;

                println!("{} by {}", release.title, release.artist_display());
                if let Some(kind) = release.release_type() {
                    println!("Type:    {kind}");
                }
                if let Some(date) = release.date.as_deref() {
                    println!("Date:    {date}");
                }
                if let Some(country) = release.country.as_deref() {
                    println!("Country: {country}");
                }
                let labels = release.label_names();
                if !labels.is_empty() {
                    println!("Label:   {}", labels.join(", "));
                }
                if let Some(value) = release.rating.as_ref().and_then(|rating| rating.value) {
                    println!("Rating:  {value}");
                }
                let genres: Vec<_> = release.genres.iter().map(|g| g.name.as_str()).collect();
                if !genres.is_empty() {
                    println!("Genres:  {}", genres.join(", "));
                }
                let tags: Vec<_> = release.tags.iter().map(|t| t.name.as_str()).collect();
                if !tags.is_empty() {
                    println!("Tags:    {}", tags.join(", "));
                }
                for track in release.tracks() {
                    println!(
                        "  {}. {} {}",
                        track.number,
                        track.title,
                        format_track_length(track.length)
                    );
                }
                match covers.resolve_release(&release).await {
                    Some(url) => println!("Cover:   {url}"),
                    None => println!("Cover:   (none)"),
                }
            }
            Command::Cover {
                release_id,
                artist,
                album,
            } => {
                let covers = CoverResolver::from_settings(&settings, cache);
                match covers.resolve(&release_id, &artist, &album).await {
                    Some(url) => println!("{url}"),
                    None => println!("No cover found"),
                }
            }
            Command::Tune { station_id, skip } => {
                let mut controller = StationController::new(stations, HeadlessEngine::new())
                    .with_proxy(settings.proxy_api_url.clone())
                    .with_volume(settings.volume);
                if controller.load_stations().await.is_err() {
                    if let Some(banner) = controller.api_error() {
                        eprintln!("{banner}");
                    }
                }
                let station = controller
                    .stations()
                    .iter()
                    .find(|station| station.id == station_id)
                    .cloned()
                    .unwrap_or(musico::api::Station {
                        id: station_id,
                        name: format!("Station {station_id}"),
                    });

                controller.select_station(station).await;
                controller.pump_events().await;
                for _ in 0..skip {
                    controller.play_next().await;
                    controller.pump_events().await;
                }

                match controller.current_song() {
                    Some(song) => {
                        println!("Now playing: {} - {}", song.artist, song.title);
                        println!(
                            "Stream:      {}",
                            proxied_stream_url(&song.stream_url, settings.proxy_api_url.as_deref())
                        );
                        println!(
                            "Queue:       {}/{}",
                            controller.queue().index() + 1,
                            controller.queue().len()
                        );
                    }
                    None => println!("Nothing to play on station {station_id}"),
                }
            }
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    if let Err(err) = cli::run().await {
        eprintln!("musico: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
