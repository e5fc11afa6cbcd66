//! CLI entry point for the air quality engine.
//!
//! Provides subcommands for computing the current index at a location,
//! generating forecasts and synthesized history, sampling locations on an
//! interval, and probing upstream providers.

use airq_engine::forecast::generator::ForecastGenerator;
use airq_engine::forecast::history::generate_history;
use airq_engine::forecast::types::ForecastBaseline;
use airq_engine::index::calculator::compute_index;
use airq_engine::index::scale::category;
use airq_engine::index::types::IndexResult;
use airq_engine::output::{IndexRecord, append_record, print_json};
use airq_engine::providers::{
    GroundProvider, OpenAqClient, OpenWeatherClient, SatelliteProvider, TempoClient,
    WeatherProvider, synthetic,
};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::ffi::OsStr;
use std::path::Path;
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "airq_engine")]
#[command(about = "Air quality index and forecast engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the current air quality index for a location
    Current {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Also generate the 7-day forecast seeded with the computed index
        #[arg(short, long, default_value_t = false)]
        forecast: bool,

        /// Optional CSV file to append the result to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Generate the 7-day forecast from a synthesized baseline
    Forecast {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Synthesize a historical series for a location
    History {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Number of past days to synthesize
        #[arg(short, long, default_value_t = 7)]
        days: u64,
    },
    /// Sample one or more locations on an interval, appending CSV records
    Watch {
        /// Locations as "lat,lon" pairs
        #[arg(value_name = "LAT,LON", required = true)]
        locations: Vec<String>,

        /// Directory to save CSV files (one per location per day)
        #[arg(short, long, default_value = "samples")]
        output_dir: String,

        /// Maximum number of concurrent location fetches
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,

        /// Sample rate: query each location every X seconds
        #[arg(short = 'r', long, default_value_t = 60)]
        sample_rate: u64,

        /// Number of samples to collect (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 1)]
        num_samples: usize,
    },
    /// Probe upstream providers and report reachability
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/airq_engine.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("airq_engine.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Current {
            lat,
            lon,
            forecast,
            output,
        } => {
            let result = fetch_current_index(lat, lon).await;
            info!(
                index = result.scaled_index,
                category = category(result.scaled_index),
                "Current air quality"
            );
            print_json(&result)?;

            if forecast {
                let generator = ForecastGenerator::new(OpenWeatherClient::from_env());
                let days = generator.generate(lat, lon, Some(&result)).await;
                print_json(&days)?;
            }

            if let Some(path) = output {
                append_record(&path, &IndexRecord::from_result(lat, lon, &result))?;
            }
        }
        Commands::Forecast { lat, lon } => {
            let generator = ForecastGenerator::new(OpenWeatherClient::from_env());
            let days = generator.generate(lat, lon, None).await;
            print_json(&days)?;
        }
        Commands::History { lat, lon, days } => {
            let result = fetch_current_index(lat, lon).await;
            let history = generate_history(&ForecastBaseline::from_index(&result), days);
            print_json(&history)?;
        }
        Commands::Watch {
            locations,
            output_dir,
            concurrency,
            sample_rate,
            num_samples,
        } => {
            let locations = locations
                .iter()
                .map(|s| parse_location(s))
                .collect::<Result<Vec<_>>>()?;

            watch(&locations, &output_dir, concurrency, sample_rate, num_samples).await?;
        }
        Commands::Health => {
            let tempo = TempoClient::from_env();
            let weather = OpenWeatherClient::from_env();

            let (tempo_ok, weather_ok) =
                tokio::join!(tempo.health_check(), weather.health_check());

            info!(tempo = tempo_ok, weather = weather_ok, "Provider health");
            print_json(&json!({
                "tempo": tempo_ok,
                "weather": weather_ok,
                "engine": true,
            }))?;
        }
    }

    Ok(())
}

/// Parses a "lat,lon" pair in decimal degrees.
fn parse_location(raw: &str) -> Result<(f64, f64)> {
    let (lat, lon) = raw
        .split_once(',')
        .with_context(|| format!("expected LAT,LON, got '{raw}'"))?;

    Ok((
        lat.trim().parse().with_context(|| format!("bad latitude in '{raw}'"))?,
        lon.trim().parse().with_context(|| format!("bad longitude in '{raw}'"))?,
    ))
}

/// Fetches all three upstream sources concurrently and computes the index.
///
/// Provider errors degrade to synthesized inputs, so this always yields a
/// complete result.
#[tracing::instrument]
async fn fetch_current_index(lat: f64, lon: f64) -> IndexResult {
    let tempo = TempoClient::from_env();
    let openaq = OpenAqClient::from_env();
    let weather = OpenWeatherClient::from_env();

    let (satellite, ground, observation) = tokio::join!(
        tempo.satellite_readings(lat, lon),
        openaq.ground_readings(lat, lon),
        weather.current_weather(lat, lon),
    );

    let satellite = satellite.unwrap_or_else(|e| {
        warn!(error = %e, "satellite provider failed, synthesizing");
        synthetic::satellite_bundle(lat, lon)
    });
    let ground = ground.unwrap_or_else(|e| {
        warn!(error = %e, "ground provider failed, synthesizing");
        synthetic::ground_bundle(lat, lon)
    });
    let observation = observation.unwrap_or_else(|e| {
        warn!(error = %e, "weather provider failed, synthesizing");
        synthetic::current_weather(lat, lon)
    });

    compute_index(Some(&satellite), Some(&ground), &observation)
}

/// Samples every location at a configurable interval with bounded
/// concurrency, appending one CSV row per location per round.
#[tracing::instrument(skip(locations), fields(output_dir, concurrency, sample_rate, num_samples))]
async fn watch(
    locations: &[(f64, f64)],
    output_dir: &str,
    concurrency: usize,
    sample_rate: u64,
    num_samples: usize,
) -> Result<()> {
    info!(location_count = locations.len(), "Locations ready for sampling");

    if num_samples == 0 {
        info!(sample_rate, "Sampling infinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, sample_rate, "Starting sample collection");
    }

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(output_dir)?;

    let semaphore = std::sync::Arc::new(tokio::sync::Semaphore::new(concurrency));

    let mut sample_count = 0;

    loop {
        // Check if we've reached the sample limit (0 = infinite)
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }

        sample_count += 1;

        info!(
            sample = sample_count,
            total = if num_samples == 0 {
                None
            } else {
                Some(num_samples)
            },
            "Starting sample round"
        );

        let mut tasks = vec![];

        for &(lat, lon) in locations {
            let sem = semaphore.clone();
            let output_dir = output_dir.to_string();

            let location_span = tracing::info_span!("process_location", lat, lon);

            let task = tokio::spawn(
                async move {
                    let _permit = sem.acquire().await.unwrap();

                    // Per-location directory with date-based CSV files
                    let date = Utc::now().format("%Y-%m-%d").to_string();
                    let location_dir = format!("{}/location={}_{}", output_dir, lat, lon);

                    if let Err(e) = std::fs::create_dir_all(&location_dir) {
                        error!(dir = %location_dir, error = %e, "Failed to create location directory");
                        return;
                    }

                    let output_file = format!("{}/date={}.csv", location_dir, date);

                    let result = fetch_current_index(lat, lon).await;
                    let record = IndexRecord::from_result(lat, lon, &result);

                    if let Err(e) = append_record(&output_file, &record) {
                        error!(error = %e, "Failed to write record for location");
                    } else {
                        info!(index = result.scaled_index, "Location sampled");
                    }
                }
                .instrument(location_span),
            );

            tasks.push(task);
        }

        // Wait for all tasks to complete
        for task in tasks {
            let _ = task.await;
        }

        // If not the last sample, wait before next iteration
        if num_samples == 0 || sample_count < num_samples {
            info!(sample_rate, "Waiting before next sample");
            tokio::time::sleep(tokio::time::Duration::from_secs(sample_rate)).await;
        }
    }

    info!(output_dir, "Finished sampling all locations");
    Ok(())
}
