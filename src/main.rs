use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use walkpath::api::AppState;
use walkpath::exercise;
use walkpath::location_resolver::LocationInput;
use walkpath::models::{HealthProfile, UserLocation, UserProfile, WalkingPath};
use walkpath::speech::NoticeKind;
use walkpath::{SearchOptions, WalkConfig, telemetry, web};

#[derive(Parser)]
#[command(
    name = "walkpath",
    version,
    about = "Walking path recommendations near you",
    long_about = "Finds walking paths around a location, filters them for a fitness profile and explains each pick in Korean."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to ~/.config/walkpath/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(clap::Args)]
struct LocationArgs {
    /// Latitude in decimal degrees
    #[arg(long, requires = "lng", conflicts_with = "address")]
    lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, requires = "lat")]
    lng: Option<f64>,

    /// Address to geocode instead of coordinates
    #[arg(long)]
    address: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List paths closest to a location
    Nearby {
        #[command(flatten)]
        location: LocationArgs,

        #[arg(long)]
        radius_km: Option<f64>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Recommend paths for a fitness profile
    Recommend {
        #[command(flatten)]
        location: LocationArgs,

        #[arg(long)]
        age: Option<u32>,

        /// beginner, intermediate or advanced
        #[arg(long, default_value = "beginner")]
        fitness: String,

        /// Preferred distance in km
        #[arg(long, default_value_t = 3.0)]
        distance: f64,

        /// Free-text health conditions
        #[arg(long, default_value = "")]
        conditions: String,

        /// health, weight, stress or leisure
        #[arg(long, default_value = "health")]
        goal: String,

        /// Use a random profile instead of the profile flags
        #[arg(long)]
        random: bool,

        #[arg(long)]
        radius_km: Option<f64>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Exercise intensity advice from a health checkup JSON file
    Exercise {
        /// JSON file with one health profile row; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Look up an address
    Geocode { address: String },

    /// Synthesize speech for a text
    Speak {
        text: String,

        /// Where to write the MP3 audio
        #[arg(long, short = 'o', default_value = "walkpath.mp3")]
        output: PathBuf,
    },

    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, short = 'p', default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = WalkConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    let _telemetry = telemetry::init(&config.logging)?;

    let state = web::build_state(&config)?;

    match cli.command {
        Command::Nearby {
            location,
            radius_km,
            limit,
        } => {
            let location = resolve(&state, location).await?;
            let paths = state
                .service
                .nearby_paths(&location, SearchOptions { radius_km, limit })
                .await?;
            if cli.json {
                print_json(&paths)?;
            } else {
                println!("Found {} paths near {}:", paths.len(), location.address);
                print_paths(&paths);
            }
        }
        Command::Recommend {
            location,
            age,
            fitness,
            distance,
            conditions,
            goal,
            random,
            radius_km,
            limit,
        } => {
            let profile = if random {
                UserProfile::random()
            } else {
                UserProfile::new(
                    age.unwrap_or(walkpath::models::DEFAULT_AGE),
                    parse_choice(&fitness, "fitness")?,
                    distance,
                    conditions,
                    parse_choice(&goal, "goal")?,
                )
            };
            profile.validate()?;

            let location = resolve(&state, location).await?;
            let result = state
                .service
                .recommend(&profile, &location, SearchOptions { radius_km, limit })
                .await?;

            if cli.json {
                print_json(&result)?;
            } else {
                println!(
                    "{}세 / {} / {} 기준, {} 주변 추천:",
                    profile.age,
                    profile.fitness_level.label(),
                    profile.walking_goal.label(),
                    location.address
                );
                if let Some(message) = &result.message {
                    println!("  {message}");
                }
                print_paths(&result.paths);
            }
        }
        Command::Exercise { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?,
            };
            let health: HealthProfile =
                serde_json::from_str(&raw).context("Invalid health profile JSON")?;
            let advice = exercise::recommend(&health);

            if cli.json {
                print_json(&advice)?;
            } else {
                println!(
                    "{} (최대심박수 {}bpm, 목표 {}-{}bpm)",
                    advice.intensity_label,
                    advice.max_heart_rate,
                    advice.heart_rate_range.min,
                    advice.heart_rate_range.max
                );
                println!(
                    "  {}-{}분, {}, 속도 {:.1}-{:.1}km/h",
                    advice.duration_minutes.0,
                    advice.duration_minutes.1,
                    advice.frequency,
                    advice.speed.min_kmh,
                    advice.speed.max_kmh
                );
                println!("  {}", advice.reasoning);
                for precaution in &advice.precautions {
                    println!("  - {precaution}");
                }
            }
        }
        Command::Geocode { address } => {
            let location = state.resolver.resolve(LocationInput::Address(address)).await?;
            if cli.json {
                print_json(&location)?;
            } else {
                println!(
                    "{} ({:.4}, {:.4})",
                    location.address, location.latitude, location.longitude
                );
            }
        }
        Command::Speak { text, output } => {
            let Some(narrator) = &state.narrator else {
                bail!("Speech is not configured; set speech.api_key");
            };
            let mut narrator = narrator.lock().await;
            let notice = narrator.speak(&text).await;
            if notice.kind == NoticeKind::Error {
                bail!("{}", notice.message);
            }
            if let Some(audio) = narrator.current_audio() {
                std::fs::write(&output, audio)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                info!("Wrote {} bytes of audio to {}", audio.len(), output.display());
            }
            narrator.finish();
            println!("{}", output.display());
        }
        Command::Serve { host, port } => {
            web::run(state, &host, port).await?;
        }
    }

    Ok(())
}

async fn resolve(state: &AppState, args: LocationArgs) -> Result<UserLocation> {
    let input = match (args.lat, args.lng, args.address) {
        (Some(lat), Some(lng), _) => LocationInput::Coordinates(lat, lng),
        (_, _, Some(address)) => LocationInput::Address(address),
        _ => {
            let fallback = state.resolver.fallback().clone();
            info!("No location given, using {}", fallback.address);
            return Ok(fallback);
        }
    };
    Ok(state.resolver.resolve(input).await?)
}

fn parse_choice<T: DeserializeOwned>(value: &str, field: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .with_context(|| format!("Invalid {field}: {value}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_paths(paths: &[WalkingPath]) {
    for path in paths {
        let away = path
            .distance_from_user_km
            .map(|km| format!("{km:.1}km 거리"))
            .unwrap_or_default();
        println!(
            "  - {} [{}] {:.1}km, 약 {}분 {}",
            path.name, path.difficulty_label, path.distance_km, path.duration_minutes, away
        );
        if !path.recommendation.is_empty() {
            println!("    {}", path.recommendation);
        }
        for market in &path.nearby_markets {
            println!("    시장: {} ({:.1}km)", market.name, market.distance_km);
        }
    }
}
